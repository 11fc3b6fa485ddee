//! PDF writing and saving operations.
//!
//! This module provides safe PDF writing with:
//! - Atomic writes (write to temp file, then rename)
//! - Compression support
//! - Parent directory creation
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdfagenda::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.save(&doc, Path::new("pta_soukai_merged.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{PdfAgendaError, Result};
use crate::utils::format_file_size;

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Compress the PDF before writing.
    pub compress: bool,

    /// Renumber objects before writing.
    pub optimize: bool,

    /// Create missing parent directories.
    pub create_dirs: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compress: true,
            optimize: true,
            create_dirs: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Whether compression was applied.
    pub compressed: bool,

    /// Whether optimization was applied.
    pub optimized: bool,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer without atomic writes.
    pub fn non_atomic() -> Self {
        Self::with_options(WriteOptions {
            atomic: false,
            ..Default::default()
        })
    }

    /// Create a writer that leaves streams uncompressed.
    pub fn without_compression() -> Self {
        Self::with_options(WriteOptions {
            compress: false,
            ..Default::default()
        })
    }

    /// Serialize a document to bytes in memory.
    ///
    /// The writer's compression option is ignored here; the document is
    /// serialized exactly as it stands.
    ///
    /// # Errors
    ///
    /// Returns an error if `lopdf` fails to serialize the document.
    pub fn to_bytes(&self, doc: &mut Document) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| PdfAgendaError::merge_failed(format!("Failed to serialize PDF: {e}")))?;
        Ok(bytes)
    }

    /// Save a PDF document to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Output directory cannot be created
    /// - Insufficient permissions
    /// - Disk full
    /// - Write operation fails
    pub async fn save(&self, doc: &Document, path: &Path) -> Result<()> {
        self.save_with_stats(doc, path).await.map(|_| ())
    }

    /// Save a PDF and return statistics about the operation.
    ///
    /// Serialization runs on a blocking task.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfagenda::io::writer::PdfWriter;
    /// # use lopdf::Document;
    /// # use std::path::Path;
    /// # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// let writer = PdfWriter::new();
    /// let stats = writer.save_with_stats(&doc, Path::new("out.pdf")).await?;
    /// println!("Wrote {} in {:?}", stats.format_file_size(), stats.write_time);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn save_with_stats(&self, doc: &Document, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();
        let mut doc = doc.clone();

        task::spawn_blocking(move || write_document(&mut doc, path_buf, &options))
            .await
            .map_err(|e| PdfAgendaError::other(format!("Write task failed: {e}")))?
    }

    /// Check if a file can be written to the given path.
    ///
    /// Performs pre-flight checks without actually writing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory doesn't exist and directory creation is off
    /// - Parent directory is not writable
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        match tokio::fs::metadata(parent).await {
            Ok(metadata) if metadata.permissions().readonly() => {
                Err(PdfAgendaError::invalid_config(format!(
                    "Output directory is not writable: {}",
                    parent.display()
                )))
            }
            Ok(_) => Ok(()),
            Err(_) if self.options.create_dirs => Ok(()),
            Err(_) => Err(PdfAgendaError::invalid_config(format!(
                "Output directory does not exist: {}",
                parent.display()
            ))),
        }
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

fn write_document(
    doc: &mut Document,
    path: PathBuf,
    options: &WriteOptions,
) -> Result<WriteStatistics> {
    let start = Instant::now();

    if options.compress {
        doc.compress();
    }

    if options.optimize {
        doc.renumber_objects();
    }

    if options.create_dirs
        && let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent).map_err(|e| PdfAgendaError::FailedToCreateOutput {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let write_path = if options.atomic {
        path.with_extension("tmp")
    } else {
        path.clone()
    };

    let file =
        std::fs::File::create(&write_path).map_err(|e| PdfAgendaError::FailedToCreateOutput {
            path: write_path.clone(),
            source: e,
        })?;

    let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);

    doc.save_to(&mut writer)
        .map_err(|e| PdfAgendaError::FailedToWrite {
            path: write_path.clone(),
            source: std::io::Error::other(e),
        })?;

    writer.flush().map_err(|e| PdfAgendaError::FailedToWrite {
        path: write_path.clone(),
        source: e,
    })?;
    drop(writer);

    if options.atomic {
        std::fs::rename(&write_path, &path).map_err(|e| PdfAgendaError::FailedToWrite {
            path: path.clone(),
            source: e,
        })?;
    }

    let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    Ok(WriteStatistics {
        write_time: start.elapsed(),
        file_size,
        output_path: path,
        compressed: options.compress,
        optimized: options.optimize,
    })
}
