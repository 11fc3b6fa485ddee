//! Configuration module for pdfagenda.
//!
//! This module turns CLI arguments and an optional JSON manifest into a
//! validated configuration that drives the merge. It handles:
//! - Parsing `[KIND[:N]@]PATH` input arguments
//! - Loading manifests and resolving their relative paths
//! - Validation of argument combinations
//! - Application of defaults

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::annotate::label::{DocumentLabel, LabelKind, LabelPages};
use crate::annotate::numbering::PageNumbering;
use crate::error::PdfAgendaError;
use crate::render::FontSource;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "pta_soukai_merged.pdf";

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - content streams are written as-is.
    None,
    /// Compress content streams (default).
    #[default]
    Standard,
    /// Compress content streams and strip embedded page thumbnails (`/Thumb`).
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PdfAgendaError;

    /// Parse compression level from string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string doesn't match a valid compression level.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfAgendaError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// PDF metadata to set on the output document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
            subject: to_string_opt(subject),
            keywords: to_string_opt(keywords),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// One input document: where to read it and how to label it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentInput {
    /// Path to the PDF file.
    pub path: PathBuf,
    /// Section label for the document's pages.
    #[serde(default)]
    pub label: DocumentLabel,
}

impl DocumentInput {
    /// An unlabeled document.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            label: DocumentLabel::NONE,
        }
    }

    /// A labeled document.
    pub fn labeled(path: impl Into<PathBuf>, label: DocumentLabel) -> Self {
        Self {
            path: path.into(),
            label,
        }
    }

    /// Display name used in reports and errors.
    pub fn name(&self) -> String {
        self.path.display().to_string()
    }
}

impl FromStr for DocumentInput {
    type Err = PdfAgendaError;

    /// Parse an `[KIND[:N]@]PATH` argument.
    ///
    /// The prefix before the first `@` is only treated as a label when it
    /// names a known kind, so paths that contain `@` still work.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfagenda::config::DocumentInput;
    /// use pdfagenda::annotate::label::{DocumentLabel, LabelKind};
    ///
    /// let input: DocumentInput = "agenda:2@motion.pdf".parse().unwrap();
    /// assert_eq!(input.label, DocumentLabel::new(LabelKind::Agenda, 2));
    ///
    /// let plain: DocumentInput = "notes@2024.pdf".parse().unwrap();
    /// assert_eq!(plain.label, DocumentLabel::NONE);
    /// ```
    fn from_str(s: &str) -> crate::Result<Self> {
        let Some((prefix, path)) = s.split_once('@') else {
            return Ok(Self::new(s));
        };

        let (kind_str, number_str) = match prefix.split_once(':') {
            Some((kind, number)) => (kind, Some(number)),
            None => (prefix, None),
        };

        let Ok(kind) = LabelKind::from_str(kind_str) else {
            return Ok(Self::new(s));
        };

        if path.is_empty() {
            return Err(PdfAgendaError::invalid_input_spec(s, "missing file path"));
        }

        let number = number_str
            .map(|n| {
                n.parse::<u32>().map_err(|_| {
                    PdfAgendaError::invalid_input_spec(s, format!("invalid label number '{n}'"))
                })
            })
            .transpose()?;

        let label = DocumentLabel { kind, number };
        label
            .validate()
            .map_err(|e| PdfAgendaError::invalid_input_spec(s, e.to_string()))?;

        Ok(Self::labeled(path, label))
    }
}

/// A JSON description of a merge.
///
/// ```json
/// {
///   "documents": [
///     { "path": "agenda.pdf", "label": { "kind": "agenda", "number": 1 } },
///     { "path": "cover.pdf" }
///   ],
///   "numbering": { "startPage": 2 },
///   "labelPages": "first"
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Documents in merge order.
    #[serde(default)]
    pub documents: Vec<DocumentInput>,
    /// Numbering settings; defaults apply when absent.
    #[serde(default)]
    pub numbering: Option<PageNumbering>,
    /// Which pages of labeled documents carry the label.
    #[serde(default)]
    pub label_pages: Option<LabelPages>,
}

impl Manifest {
    /// Parse a manifest, resolving relative document paths against `base_dir`.
    pub fn parse(json: &str, base_dir: &Path) -> Result<Self> {
        let mut manifest: Self =
            serde_json::from_str(json).context("Manifest is not valid JSON")?;

        for document in &mut manifest.documents {
            if document.path.as_os_str().is_empty() {
                bail!("Manifest document has an empty path");
            }
            document
                .label
                .validate()
                .with_context(|| format!("Invalid label for {}", document.path.display()))?;
            if document.path.is_relative() {
                document.path = base_dir.join(&document.path);
            }
        }

        Ok(manifest)
    }

    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`PdfAgendaError::InvalidManifest`] if the file cannot be read
    /// or does not describe a valid merge.
    pub async fn load(path: &Path) -> crate::Result<Self> {
        let invalid = |err: anyhow::Error| PdfAgendaError::InvalidManifest {
            path: path.to_path_buf(),
            reason: format!("{err:#}"),
        };

        let json = tokio::fs::read_to_string(path)
            .await
            .context("Failed to read manifest")
            .map_err(invalid)?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse(&json, base_dir).map_err(invalid)
    }
}

/// Complete configuration for a merge.
///
/// This structure contains all settings needed to perform a merge,
/// derived and validated from CLI arguments and the manifest.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input documents (in merge order).
    pub documents: Vec<DocumentInput>,

    /// Output PDF file path.
    pub output: PathBuf,

    /// Page numbering settings.
    pub numbering: PageNumbering,

    /// Which pages of labeled documents carry the label.
    pub label_pages: LabelPages,

    /// Font used for page numbers and labels.
    pub font: FontSource,

    /// Dry run mode - plan without creating output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Metadata to set on output document.
    pub metadata: Metadata,

    /// Number of concurrent reads (None = auto-detect).
    pub jobs: Option<usize>,
}

impl Config {
    /// A configuration with defaults for everything but the documents.
    pub fn new(documents: Vec<DocumentInput>) -> Self {
        Self {
            documents,
            output: PathBuf::from(DEFAULT_OUTPUT),
            numbering: PageNumbering::default(),
            label_pages: LabelPages::default(),
            font: FontSource::default(),
            dry_run: false,
            verbose: false,
            overwrite_mode: OverwriteMode::default(),
            quiet: false,
            compression: CompressionLevel::default(),
            metadata: Metadata::default(),
            jobs: None,
        }
    }

    /// Input paths in merge order.
    pub fn input_paths(&self) -> Vec<PathBuf> {
        self.documents.iter().map(|d| d.path.clone()).collect()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input documents are specified
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The output path is also an input
    /// - The numbering range or a label is invalid
    pub fn validate(&self) -> Result<()> {
        if self.documents.is_empty() {
            bail!("No input documents specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            bail!("Number of jobs must be at least 1");
        }

        for document in &self.documents {
            if document.path == self.output {
                bail!(
                    "Output file cannot be the same as an input file: {}",
                    self.output.display()
                );
            }
            document.label.validate()?;
        }

        self.numbering.validate()?;

        Ok(())
    }

    /// Get the effective number of concurrent reads.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}
