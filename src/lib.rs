//! pdfagenda - Merge meeting materials into one annotated PDF.
//!
//! This library concatenates PDF documents and stamps two kinds of
//! annotation onto the merged pages:
//!
//! - Page numbers over a configurable window, in one of three formats
//! - Section labels such as 第1号議案 or 添付資料2 in a box at the top left
//!
//! Planning is pure: [`annotate::MergeAnnotator`] turns page counts and
//! labels into a [`annotate::MergePlan`] without touching any PDF. The
//! [`merge`] module then copies pages and renders the plan.
//!
//! # Examples
//!
//! ## Basic Merge
//!
//! ```no_run
//! use pdfagenda::merge;
//! use pdfagenda::config::{Config, DocumentInput};
//! use pdfagenda::annotate::numbering::NumberFormat;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::new(vec![
//!     DocumentInput::new("cover.pdf"),
//!     "agenda@motion1.pdf".parse()?,
//!     "agenda@motion2.pdf".parse()?,
//! ]);
//! config.numbering.start_page = 2;
//! config.numbering.format = NumberFormat::Dashed;
//!
//! let (document, stats) = merge::merge_pdfs(&config).await?;
//! println!("Created {} page document", stats.total_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Planning Only
//!
//! ```
//! use pdfagenda::annotate::{DocumentLayout, MergeAnnotator};
//! use pdfagenda::annotate::label::{DocumentLabel, LabelKind};
//! use pdfagenda::annotate::numbering::PageNumbering;
//!
//! let plan = MergeAnnotator::new(PageNumbering::default())
//!     .plan(&[
//!         DocumentLayout::new(1, DocumentLabel::NONE),
//!         DocumentLayout::new(2, DocumentLabel::auto(LabelKind::Agenda)),
//!     ])
//!     .unwrap();
//!
//! assert_eq!(plan.total_pages(), 3);
//! assert_eq!(plan.pages[1].label(), Some("第1号議案"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod annotate;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod render;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{PdfAgendaError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
