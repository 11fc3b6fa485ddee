//! PDF merging operations.
//!
//! This module turns a plan from [`crate::annotate`] into a real document:
//! - Page copying with inherited attributes flattened
//! - Stamping page numbers and labels
//! - Metadata management
//! - Compression and cleanup
//!
//! # Examples
//!
//! ```no_run
//! use pdfagenda::config::{Config, DocumentInput};
//! use pdfagenda::merge::Merger;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new(vec![
//!     DocumentInput::new("cover.pdf"),
//!     "agenda:1@agenda.pdf".parse()?,
//!     "attachment@budget.pdf".parse()?,
//! ]);
//!
//! let result = Merger::new().merge(&config).await?;
//! println!("Merged {} pages", result.statistics.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod merger;
pub mod metadata;
pub mod pages;

pub use merger::{MergePreview, MergeResult, MergeStatistics, Merger};
pub use metadata::MetadataManager;
pub use pages::PageCopier;

use crate::config::Config;
use crate::error::Result;
use lopdf::Document;

/// Merge and annotate the documents named by `config`.
///
/// Convenience function that creates a merger and performs the merge.
///
/// # Errors
///
/// Returns an error if any merge step fails.
pub async fn merge_pdfs(config: &Config) -> Result<(Document, MergeStatistics)> {
    let result = Merger::new().merge(config).await?;
    Ok((result.document, result.statistics))
}
