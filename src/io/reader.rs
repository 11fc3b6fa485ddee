//! PDF reading.
//!
//! Reading is split in two: [`PdfReader::read_all`] pulls raw bytes off disk
//! concurrently, and the [`DocumentSource`] impl parses them with `lopdf`
//! when the annotator asks for it.
//!
//! # Examples
//!
//! ```no_run
//! use pdfagenda::io::reader::PdfReader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let files = reader.read_all(&paths, 4).await?;
//! println!("Read {} files", files.len());
//! # Ok(())
//! # }
//! ```

use futures::stream::{self, StreamExt, TryStreamExt};
use lopdf::Document;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::annotate::DocumentSource;
use crate::error::{PdfAgendaError, Result};
use crate::utils::format_file_size;

/// Raw bytes of one input file.
#[derive(Debug, Clone)]
pub struct InputFile {
    /// Path the bytes were read from.
    pub path: PathBuf,

    /// File contents.
    pub bytes: Vec<u8>,
}

impl InputFile {
    /// File size in bytes.
    pub fn file_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size())
    }
}

/// Reads input files and parses them as PDF documents.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Check that `path` names a readable regular file.
    ///
    /// # Errors
    ///
    /// - [`PdfAgendaError::FileNotFound`] if nothing exists at `path`
    /// - [`PdfAgendaError::NotAFile`] if `path` is a directory or similar
    /// - [`PdfAgendaError::FileNotAccessible`] for any other I/O failure
    pub async fn check_path(path: &Path) -> Result<()> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|err| Self::access_error(path, err))?;

        if !metadata.is_file() {
            return Err(PdfAgendaError::not_a_file(path.to_path_buf()));
        }

        Ok(())
    }

    /// Read a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is missing, not a file, or unreadable.
    pub async fn read(&self, path: &Path) -> Result<InputFile> {
        Self::check_path(path).await?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| Self::access_error(path, err))?;

        Ok(InputFile {
            path: path.to_path_buf(),
            bytes,
        })
    }

    /// Read every file, at most `jobs` at a time.
    ///
    /// Results come back in the order of `paths`. The first failure aborts
    /// the whole batch.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfagenda::io::reader::PdfReader;
    /// # use std::path::PathBuf;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let reader = PdfReader::new();
    /// let paths = vec![PathBuf::from("agenda.pdf"), PathBuf::from("budget.pdf")];
    /// let files = reader.read_all(&paths, 2).await?;
    /// assert_eq!(files[0].path, paths[0]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn read_all(&self, paths: &[PathBuf], jobs: usize) -> Result<Vec<InputFile>> {
        let jobs = jobs.max(1);

        let tasks = paths.iter().map(|path| {
            let reader = self.clone();
            async move { reader.read(path).await }
        });

        stream::iter(tasks).buffered(jobs).try_collect().await
    }

    fn access_error(path: &Path, err: std::io::Error) -> PdfAgendaError {
        match err.kind() {
            ErrorKind::NotFound => PdfAgendaError::file_not_found(path.to_path_buf()),
            _ => PdfAgendaError::FileNotAccessible {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

impl DocumentSource for PdfReader {
    type Document = Document;

    fn load(&self, bytes: &[u8]) -> std::result::Result<Document, String> {
        let document = Document::load_mem(bytes).map_err(|err| {
            let msg = err.to_string();
            if msg.contains("encrypt") || msg.contains("password") {
                format!("document is encrypted ({msg})")
            } else {
                msg
            }
        })?;

        // lopdf loads a locked file as an empty shell instead of failing
        if document.trailer.has(b"Encrypt") && document.encryption_state.is_none() {
            return Err("document is encrypted and requires a password".to_string());
        }

        document
            .catalog()
            .map_err(|err| format!("document catalog is missing ({err})"))?;

        Ok(document)
    }

    fn page_count(&self, document: &Document) -> usize {
        document.get_pages().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::label::DocumentLabel;
    use crate::annotate::{MergeAnnotator, SourceDocument};
    use lopdf::{Object, StringFormat, dictionary};
    use tempfile::TempDir;

    fn pdf_bytes(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let kids: Vec<lopdf::Object> = (0..pages)
            .map(|_| {
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                })
                .into()
            })
            .collect();

        doc.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
            }
            .into(),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn write_pdf(dir: &TempDir, name: &str, pages: usize) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, pdf_bytes(pages)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_read_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_pdf(&temp_dir, "agenda.pdf", 2);

        let file = PdfReader::new().read(&path).await.unwrap();
        assert_eq!(file.path, path);
        assert!(file.file_size() > 0);
        assert!(file.bytes.starts_with(b"%PDF-1.5"));
    }

    #[tokio::test]
    async fn test_read_nonexistent_file() {
        let result = PdfReader::new().read(Path::new("/nonexistent.pdf")).await;
        assert!(matches!(result, Err(PdfAgendaError::FileNotFound { .. })));
    }

    #[tokio::test]
    async fn test_read_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = PdfReader::new().read(temp_dir.path()).await;
        assert!(matches!(result, Err(PdfAgendaError::NotAFile { .. })));
    }

    #[tokio::test]
    async fn test_read_all_keeps_order() {
        let temp_dir = TempDir::new().unwrap();
        let paths: Vec<_> = (1..=5)
            .map(|n| write_pdf(&temp_dir, &format!("doc{n}.pdf"), n))
            .collect();

        let files = PdfReader::new().read_all(&paths, 3).await.unwrap();

        let read_paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(read_paths, paths);
    }

    #[tokio::test]
    async fn test_read_all_fails_on_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let good = write_pdf(&temp_dir, "good.pdf", 1);
        let missing = temp_dir.path().join("missing.pdf");

        let result = PdfReader::new().read_all(&[good, missing.clone()], 2).await;
        match result {
            Err(PdfAgendaError::FileNotFound { path }) => assert_eq!(path, missing),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_load_counts_pages() {
        let reader = PdfReader::new();
        let doc = reader.load(&pdf_bytes(3)).unwrap();
        assert_eq!(reader.page_count(&doc), 3);
    }

    fn locked_pdf_bytes(pages: usize) -> Vec<u8> {
        let mut doc = Document::load_mem(&pdf_bytes(pages)).unwrap();
        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
            "O" => Object::String(vec![0x11; 32], StringFormat::Hexadecimal),
            "U" => Object::String(vec![0x22; 32], StringFormat::Hexadecimal),
            "P" => Object::Integer(-44),
        });
        let file_id = Object::String(vec![0x33; 16], StringFormat::Hexadecimal);
        doc.trailer.set("Encrypt", encrypt_id);
        doc.trailer.set("ID", vec![file_id.clone(), file_id]);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_load_rejects_password_protected() {
        let err = PdfReader::new().load(&locked_pdf_bytes(3)).unwrap_err();
        assert!(err.contains("encrypted"), "{err}");
    }

    #[test]
    fn test_locked_document_aborts_merge() {
        let sources = [
            SourceDocument::new("open.pdf", pdf_bytes(2), DocumentLabel::NONE),
            SourceDocument::new("locked.pdf", locked_pdf_bytes(3), DocumentLabel::NONE),
        ];

        let result = MergeAnnotator::default().merge(&PdfReader::new(), &sources);
        match result {
            Err(PdfAgendaError::UnreadableDocument { index, name, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(name, "locked.pdf");
            }
            other => panic!("expected UnreadableDocument, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_missing_catalog() {
        let mut doc = Document::load_mem(&pdf_bytes(1)).unwrap();
        doc.trailer.set("Root", Object::Reference((999, 0)));

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        assert!(PdfReader::new().load(&bytes).is_err());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let reader = PdfReader::new();
        assert!(reader.load(b"this is not a pdf").is_err());
        assert!(reader.load(&[]).is_err());
    }
}
