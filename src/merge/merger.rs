//! Core merge implementation.
//!
//! Reads the inputs, plans the merge with [`MergeAnnotator`], then copies
//! pages into a fresh document and stamps the planned page numbers and
//! labels onto them.

use lopdf::{Document, ObjectId, dictionary};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::annotate::{MergeAnnotator, MergePlan, SourceDocument};
use crate::config::{CompressionLevel, Config};
use crate::error::{PdfAgendaError, Result};
use crate::io::{InputFile, PdfReader};
use crate::merge::metadata::MetadataManager;
use crate::merge::pages::{self, PageCopier};
use crate::render::{PageStamper, StampFont, render_draws};
use crate::utils::format_file_size;

/// Statistics about a merge operation.
#[derive(Debug, Clone)]
pub struct MergeStatistics {
    /// Number of PDFs merged.
    pub files_merged: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Pages that received a page number.
    pub pages_numbered: usize,

    /// Pages that received a label.
    pub pages_labeled: usize,

    /// Total time taken for merge.
    pub merge_time: Duration,

    /// Time taken to read all inputs.
    pub load_time: Duration,

    /// Total size of input files.
    pub input_size: u64,

    /// Whether compression was applied.
    pub compressed: bool,

    /// Font used for stamping.
    pub font: String,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

/// Result of a merge operation.
#[derive(Debug)]
pub struct MergeResult {
    /// The merged PDF document.
    pub document: Document,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,

    /// The plan the document was built from.
    pub plan: MergePlan,

    /// Paths of files that were merged, in order.
    pub merged_files: Vec<PathBuf>,
}

/// What a merge would do, without building anything.
#[derive(Debug, Clone)]
pub struct MergePreview {
    /// Input paths, in merge order.
    pub files: Vec<PathBuf>,

    /// Pages per input, in merge order.
    pub page_counts: Vec<usize>,

    /// The planned page copies and draws.
    pub plan: MergePlan,

    /// Total size of input files.
    pub input_size: u64,

    /// Font that would be used for stamping.
    pub font: String,
}

/// Inputs read, parsed and planned; nothing built yet.
struct Prepared {
    files: Vec<PathBuf>,
    documents: Vec<Document>,
    plan: MergePlan,
    font: StampFont,
    input_size: u64,
    load_time: Duration,
}

/// PDF merger that combines and annotates documents.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    reader: PdfReader,
    page_copier: PageCopier,
    metadata_manager: MetadataManager,
}

impl Merger {
    /// Create a new merger with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge and annotate the documents named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An input file cannot be read or is not a PDF
    /// - The stamping font is unavailable or misses a glyph
    /// - The output document cannot be assembled
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfagenda::merge::Merger;
    /// # use pdfagenda::config::Config;
    /// # async fn example(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    /// let result = Merger::new().merge(&config).await?;
    /// println!(
    ///     "Merged {} files into {} pages",
    ///     result.statistics.files_merged, result.statistics.total_pages
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub async fn merge(&self, config: &Config) -> Result<MergeResult> {
        let merge_start = Instant::now();
        let prepared = self.prepare(config).await?;

        let font_name = prepared.font.display_name().to_string();
        let mut document = self.assemble(prepared.documents, &prepared.plan, prepared.font)?;

        self.metadata_manager
            .set_metadata(&mut document, &config.metadata)?;
        finalize(&mut document, config.compression);

        let statistics = MergeStatistics {
            files_merged: prepared.files.len(),
            total_pages: prepared.plan.total_pages(),
            pages_numbered: prepared.plan.numbered_pages(),
            pages_labeled: prepared.plan.labeled_pages(),
            merge_time: merge_start.elapsed(),
            load_time: prepared.load_time,
            input_size: prepared.input_size,
            compressed: config.compression != CompressionLevel::None,
            font: font_name,
        };

        Ok(MergeResult {
            document,
            statistics,
            plan: prepared.plan,
            merged_files: prepared.files,
        })
    }

    /// Read and plan the merge without building the output.
    ///
    /// Fails for exactly the same inputs, fonts and settings as
    /// [`Merger::merge`].
    pub async fn preview(&self, config: &Config) -> Result<MergePreview> {
        let prepared = self.prepare(config).await?;

        let page_counts = prepared
            .documents
            .iter()
            .map(|doc| doc.get_pages().len())
            .collect();

        Ok(MergePreview {
            page_counts,
            font: prepared.font.display_name().to_string(),
            files: prepared.files,
            plan: prepared.plan,
            input_size: prepared.input_size,
        })
    }

    async fn prepare(&self, config: &Config) -> Result<Prepared> {
        if config.documents.is_empty() {
            return Err(PdfAgendaError::EmptyInput);
        }

        let load_start = Instant::now();
        let inputs = self
            .reader
            .read_all(&config.input_paths(), config.effective_jobs())
            .await?;
        let load_time = load_start.elapsed();

        let font = StampFont::load(&config.font).await?;

        let files: Vec<PathBuf> = inputs.iter().map(|input| input.path.clone()).collect();
        let input_size = inputs.iter().map(InputFile::file_size).sum();
        let sources: Vec<SourceDocument> = inputs
            .into_iter()
            .zip(&config.documents)
            .map(|(input, document)| {
                SourceDocument::new(input.path.display().to_string(), input.bytes, document.label)
            })
            .collect();

        let annotator =
            MergeAnnotator::new(config.numbering).with_label_pages(config.label_pages);
        let output = annotator.merge(&self.reader, &sources)?;

        check_coverage(&font, &output.plan)?;

        Ok(Prepared {
            files,
            documents: output.documents,
            plan: output.plan,
            font,
            input_size,
            load_time,
        })
    }

    /// Copy planned pages into a fresh document and stamp them.
    fn assemble(
        &self,
        documents: Vec<Document>,
        plan: &MergePlan,
        font: StampFont,
    ) -> Result<Document> {
        let mut output = Document::with_version("1.7");
        let pages_id = output.new_object_id();

        let mut page_ids: Vec<Vec<ObjectId>> = Vec::with_capacity(documents.len());
        for source in documents {
            page_ids.push(self.page_copier.copy_into(&mut output, source)?);
        }

        let mut stamper = PageStamper::new(font);
        let mut kids = Vec::with_capacity(plan.total_pages());

        for instruction in &plan.pages {
            let page_id = page_ids
                .get(instruction.document_index)
                .and_then(|ids| ids.get(instruction.page_index))
                .copied()
                .ok_or_else(|| {
                    PdfAgendaError::merge_failed(format!(
                        "Page {} of document #{} is missing",
                        instruction.page_index + 1,
                        instruction.document_index + 1
                    ))
                })?;

            let page_box = pages::page_box(&output, page_id);
            render_draws(&mut stamper, page_id, &page_box, &instruction.draws)?;
            kids.push(page_id);
        }

        self.page_copier
            .attach_pages(&mut output, pages_id, &kids)?;
        let catalog_id = output.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        output.trailer.set("Root", catalog_id);

        stamper.finish(&mut output)?;

        Ok(output)
    }
}

/// Fail early if the font cannot draw some planned text.
fn check_coverage(font: &StampFont, plan: &MergePlan) -> Result<()> {
    let texts: BTreeSet<&str> = plan
        .pages
        .iter()
        .flat_map(|page| &page.draws)
        .filter_map(|draw| draw.text())
        .collect();

    texts.into_iter().try_for_each(|text| font.check_coverage(text))
}

/// Drop unreachable objects, compress as configured and renumber.
fn finalize(document: &mut Document, compression: CompressionLevel) {
    document.prune_objects();

    match compression {
        CompressionLevel::None => {}
        CompressionLevel::Standard => document.compress(),
        CompressionLevel::Maximum => {
            strip_thumbnails(document);
            document.prune_objects();
            document.compress();
        }
    }

    document.renumber_objects();
}

/// Remove embedded page thumbnails; viewers regenerate them.
fn strip_thumbnails(document: &mut Document) {
    let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
    for page_id in page_ids {
        if let Ok(page) = document.get_dictionary_mut(page_id) {
            page.remove(b"Thumb");
        }
    }
}
