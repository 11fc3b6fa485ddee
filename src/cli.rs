//! CLI argument parsing for pdfagenda.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, manifest merging and help text generation.
//!
//! # Examples
//!
//! ```no_run
//! use pdfagenda::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! println!("Merging {} inputs", cli.inputs.len());
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use crate::annotate::label::LabelPages;
use crate::annotate::numbering::{NumberFormat, NumberPosition, NumberSize, PageNumbering};
use crate::config::{
    CompressionLevel, Config, DEFAULT_OUTPUT, DocumentInput, Manifest, Metadata, OverwriteMode,
};
use crate::error::{PdfAgendaError, Result};
use crate::render::FontSource;
use crate::utils::expand_document_globs;

/// Merge meeting materials into one PDF with page numbers and agenda labels.
///
/// Documents are concatenated in order. Every output page can carry a page
/// number, and documents can be labeled as agenda items (第N号議案),
/// attachments (添付資料N) or reference material (参考資料N).
#[derive(Parser, Debug)]
#[command(name = "pdfagenda")]
#[command(version)]
#[command(about = "Merge PDF meeting materials and stamp page numbers and agenda labels", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input PDF files to merge (in order)
    ///
    /// Each input is `[KIND[:N]@]PATH` where KIND is agenda, attachment,
    /// reference or none. Without N, labels of the same kind are numbered
    /// 1, 2, 3... in order. Unlabeled inputs may be glob patterns.
    ///
    /// Examples:
    ///   pdfagenda cover.pdf agenda@motion1.pdf agenda@motion2.pdf
    ///   pdfagenda cover.pdf agenda:3@budget.pdf attachment@sheets/*.pdf
    #[arg(value_name = "INPUT", required_unless_present = "manifest")]
    pub inputs: Vec<String>,

    /// Output PDF file path
    ///
    /// Use --force to overwrite existing files without confirmation.
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Read documents, numbering and labels from a JSON manifest
    ///
    /// Relative paths in the manifest resolve against its directory.
    /// Manifest documents come before positional inputs, and command-line
    /// numbering flags override manifest values.
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Do not stamp page numbers
    #[arg(long)]
    pub no_page_numbers: bool,

    /// First output page (1-based) that gets a number; it is printed as 1
    #[arg(long, value_name = "N")]
    pub start_page: Option<u32>,

    /// Last output page that gets a number (default: the last page)
    #[arg(long, value_name = "N")]
    pub end_page: Option<u32>,

    /// Page number format
    ///
    /// - plain: "7"
    /// - dashed: "- 7 -"
    /// - suffixed: "7 ページ"
    #[arg(long, value_name = "FORMAT")]
    #[arg(value_parser = ["plain", "dashed", "suffixed"])]
    pub number_format: Option<String>,

    /// Where page numbers go
    #[arg(long, value_name = "POSITION")]
    #[arg(value_parser = ["top", "bottom"])]
    pub number_position: Option<String>,

    /// Page number font size (small 8pt, medium 10pt, large 14pt)
    #[arg(long, value_name = "SIZE")]
    #[arg(value_parser = ["small", "medium", "large"])]
    pub number_size: Option<String>,

    /// Which pages of a labeled document carry its label
    #[arg(long, value_name = "PAGES")]
    #[arg(value_parser = ["all", "first"])]
    pub label_pages: Option<String>,

    /// TrueType font to embed for numbers and labels
    ///
    /// By default a standard Japanese font is referenced without embedding
    /// and the viewer substitutes one.
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Dry run - read inputs and preview the merge without creating output
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - show the merge plan and detailed statistics
    #[arg(short, long)]
    pub verbose: bool,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Compression level for output PDF
    ///
    /// - none: No compression
    /// - standard: Compress content streams (default)
    /// - maximum: Also drop embedded page thumbnails
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Set title metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Set subject metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Set keywords metadata for output PDF (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Number of input files read concurrently
    ///
    /// Default is number of CPU cores. Use 1 for sequential reads.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// This method performs the following:
    /// - Loads the manifest, if any
    /// - Parses `[KIND[:N]@]PATH` inputs and expands glob patterns
    /// - Applies numbering flags over manifest numbering
    /// - Resolves overwrite mode and metadata
    /// - Validates the resulting configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The manifest cannot be read or parsed
    /// - An input argument is malformed or a pattern matches nothing
    /// - An option value is invalid
    /// - Configuration validation fails
    pub async fn to_config(&self) -> Result<Config> {
        let manifest = match &self.manifest {
            Some(path) => Manifest::load(path).await?,
            None => Manifest::default(),
        };

        let positional = self
            .inputs
            .iter()
            .map(|input| DocumentInput::from_str(input))
            .collect::<Result<Vec<_>>>()?;
        let documents = expand_document_globs(manifest.documents.into_iter().chain(positional))?;

        let numbering = self.numbering(manifest.numbering.unwrap_or_default())?;
        let label_pages = match &self.label_pages {
            Some(pages) => LabelPages::from_str(pages)?,
            None => manifest.label_pages.unwrap_or_default(),
        };

        let compression = CompressionLevel::from_str(&self.compression)?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let metadata = Metadata::new(
            self.title.clone(),
            self.author.clone(),
            self.subject.clone(),
            self.keywords.clone(),
        );

        let config = Config {
            documents,
            output: self.output.clone(),
            numbering,
            label_pages,
            font: self
                .font
                .clone()
                .map_or(FontSource::Builtin, FontSource::File),
            dry_run: self.dry_run,
            verbose: self.verbose,
            overwrite_mode,
            quiet: self.quiet,
            compression,
            metadata,
            jobs: self.jobs,
        };

        config.validate().map_err(|e| {
            PdfAgendaError::invalid_config(format!("Configuration validation failed: {e:#}"))
        })?;

        Ok(config)
    }

    /// Apply numbering flags on top of `base`.
    fn numbering(&self, base: PageNumbering) -> Result<PageNumbering> {
        let mut numbering = base;

        if self.no_page_numbers {
            numbering.enabled = false;
        }
        if let Some(start) = self.start_page {
            numbering.start_page = start;
        }
        if let Some(end) = self.end_page {
            numbering.end_page = Some(end);
        }
        if let Some(format) = &self.number_format {
            numbering.format = NumberFormat::from_str(format)?;
        }
        if let Some(position) = &self.number_position {
            numbering.position = NumberPosition::from_str(position)?;
        }
        if let Some(size) = &self.number_size {
            numbering.size = NumberSize::from_str(size)?;
        }

        Ok(numbering)
    }

    /// Validate CLI arguments before processing.
    ///
    /// Performs early validation that doesn't require file I/O.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() && self.manifest.is_none() {
            return Err(PdfAgendaError::invalid_config(
                "No input files or manifest specified",
            ));
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err(PdfAgendaError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        if let Some(start) = self.start_page
            && start == 0
        {
            return Err(PdfAgendaError::invalid_config(
                "Start page must be positive (1-indexed)",
            ));
        }

        Ok(())
    }
}
