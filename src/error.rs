//! Error types for pdfagenda.
//!
//! Every failure is terminal for the current merge: nothing is retried and
//! no partially assembled document is ever handed back.
//!
//! # Error Categories
//!
//! - **Input Errors**: no documents, missing files, unreadable PDFs
//! - **Font Errors**: the stamping font could not be loaded or lacks glyphs
//! - **Configuration Errors**: invalid numbering ranges, labels or flags
//! - **Output Errors**: the merged document could not be written

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfagenda operations.
pub type Result<T> = std::result::Result<T, PdfAgendaError>;

/// Main error type for pdfagenda operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfAgendaError {
    /// No documents were supplied.
    #[error("No input documents specified for merging")]
    EmptyInput,

    /// A document's bytes could not be parsed as a PDF.
    #[error("Failed to read document #{} ({name})\n  Reason: {reason}", .index + 1)]
    UnreadableDocument {
        /// Zero-based position of the document in merge order.
        index: usize,
        /// Display name of the document (usually its path).
        name: String,
        /// Why the document could not be read.
        reason: String,
    },

    /// The font used for page numbers and labels could not be embedded.
    #[error("Font unavailable: {font}\n  Reason: {reason}")]
    FontUnavailable {
        /// Font name or path.
        font: String,
        /// Why the font cannot be used.
        reason: String,
    },

    /// Input file was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input file is not accessible (permission denied, etc.).
    #[error("Cannot access file: {}\n  Reason: {source}", .path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Input path exists but is not a regular file.
    #[error("Not a file: {}", .path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// An input argument of the form `[KIND[:N]@]PATH` could not be parsed.
    #[error("Invalid input '{spec}': {reason}")]
    InvalidInputSpec {
        /// The raw argument.
        spec: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The JSON manifest could not be read or parsed.
    #[error("Invalid manifest: {}\n  Reason: {reason}", .path.display())]
    InvalidManifest {
        /// Path to the manifest file.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Assembling the merged document failed.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Metadata operation failed.
    #[error("Failed to set metadata: {reason}")]
    MetadataFailed {
        /// Details about the failure.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfAgendaError {
    fn from(err: lopdf::Error) -> Self {
        Self::merge_failed(err.to_string())
    }
}

impl From<anyhow::Error> for PdfAgendaError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(format!("{err:#}"))
    }
}

impl PdfAgendaError {
    /// Create an UnreadableDocument error.
    pub fn unreadable_document(
        index: usize,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnreadableDocument {
            index,
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a FontUnavailable error.
    pub fn font_unavailable(font: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FontUnavailable {
            font: font.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create an InvalidInputSpec error.
    pub fn invalid_input_spec(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInputSpec {
            spec: spec.into(),
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error should stop all processing immediately.
    ///
    /// Every merge error aborts the run; this distinguishes errors that also
    /// make a retry with the same inputs pointless.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput
                | Self::FontUnavailable { .. }
                | Self::FailedToCreateOutput { .. }
                | Self::FailedToWrite { .. }
                | Self::Cancelled
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::EmptyInput => 1,
            Self::InvalidConfig { .. } => 1,
            Self::InvalidInputSpec { .. } => 1,
            Self::InvalidManifest { .. } => 1,
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::UnreadableDocument { .. } => 3,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::Io { .. } => 5,
            Self::FontUnavailable { .. } => 6,
            Self::MergeFailed { .. } => 6,
            Self::MetadataFailed { .. } => 6,
            Self::Cancelled => 130, // SIGINT
            Self::Other { .. } => 1,
        }
    }
}
