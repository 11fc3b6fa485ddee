//! Merge-and-annotate planning.
//!
//! [`MergeAnnotator`] turns an ordered list of source documents into a
//! [`MergePlan`]: for every output page, which source page to copy and what
//! to draw on it. Planning is a single linear pass with one running counter
//! (the absolute page index) and no I/O. Loading bytes goes through a
//! [`DocumentSource`]; drawing is left to the caller.
//!
//! # Examples
//!
//! ```
//! use pdfagenda::annotate::{DocumentLayout, MergeAnnotator};
//! use pdfagenda::annotate::label::{DocumentLabel, LabelKind};
//! use pdfagenda::annotate::numbering::PageNumbering;
//!
//! let annotator = MergeAnnotator::new(PageNumbering::default());
//! let plan = annotator
//!     .plan(&[
//!         DocumentLayout::new(3, DocumentLabel::NONE),
//!         DocumentLayout::new(2, DocumentLabel::new(LabelKind::Attachment, 1)),
//!     ])
//!     .unwrap();
//!
//! assert_eq!(plan.total_pages(), 5);
//! assert_eq!(plan.labeled_pages(), 2);
//! ```

pub mod geometry;
pub mod label;
pub mod numbering;

use crate::error::{PdfAgendaError, Result};
use geometry::{Anchor, Color};
use label::{DocumentLabel, LabelCounter, LabelPages};
use numbering::PageNumbering;

/// Loads raw document bytes into something with countable pages.
pub trait DocumentSource {
    /// Loaded document handle.
    type Document;

    /// Parse `bytes`. The error string explains why they are unreadable.
    fn load(&self, bytes: &[u8]) -> std::result::Result<Self::Document, String>;

    /// Number of pages in a loaded document.
    fn page_count(&self, document: &Self::Document) -> usize;
}

/// One input document, in merge order.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Display identity, used in errors and reports.
    pub name: String,
    /// Raw document bytes.
    pub bytes: Vec<u8>,
    /// Section label for the document's pages.
    pub label: DocumentLabel,
}

impl SourceDocument {
    /// Create a source document.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, label: DocumentLabel) -> Self {
        Self {
            name: name.into(),
            bytes,
            label,
        }
    }
}

/// What the planner needs to know about a document once it is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentLayout {
    /// Number of pages.
    pub page_count: usize,
    /// Section label.
    pub label: DocumentLabel,
}

impl DocumentLayout {
    /// Create a layout.
    pub fn new(page_count: usize, label: DocumentLabel) -> Self {
        Self { page_count, label }
    }
}

/// Why something is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawRole {
    /// Page number text.
    PageNumber,
    /// Label box or label text.
    Label,
}

/// One drawing operation on an output page.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawInstruction {
    /// Draw a single line of text with its baseline starting at `at`.
    Text {
        /// Why the text is drawn.
        role: DrawRole,
        /// The text itself.
        text: String,
        /// Baseline start.
        at: Anchor,
        /// Font size in points.
        font_size: f32,
        /// Fill color.
        color: Color,
    },
    /// Stroke an unfilled rectangle.
    Rectangle {
        /// Why the rectangle is drawn.
        role: DrawRole,
        /// Bottom-left corner.
        origin: Anchor,
        /// Width in points.
        width: f32,
        /// Height in points.
        height: f32,
        /// Border color.
        border_color: Color,
        /// Border width in points.
        border_width: f32,
    },
}

impl DrawInstruction {
    /// Role of this draw.
    pub fn role(&self) -> DrawRole {
        match self {
            Self::Text { role, .. } | Self::Rectangle { role, .. } => *role,
        }
    }

    /// The text, for text draws.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::Rectangle { .. } => None,
        }
    }
}

/// Copy one source page into the output and draw on it.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInstruction {
    /// Index of the source document in merge order.
    pub document_index: usize,
    /// Zero-based page index inside that document.
    pub page_index: usize,
    /// One-based position of the page in the merged output.
    pub absolute_page: u32,
    /// Draws for this page, in order.
    pub draws: Vec<DrawInstruction>,
}

impl PageInstruction {
    /// The printed page number text, if this page is numbered.
    pub fn page_number(&self) -> Option<&str> {
        self.draws
            .iter()
            .find(|d| d.role() == DrawRole::PageNumber)
            .and_then(DrawInstruction::text)
    }

    /// The label text, if this page is labeled.
    pub fn label(&self) -> Option<&str> {
        self.draws
            .iter()
            .filter(|d| d.role() == DrawRole::Label)
            .find_map(DrawInstruction::text)
    }
}

/// The ordered page instructions for one merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergePlan {
    /// One entry per output page, in output order.
    pub pages: Vec<PageInstruction>,
}

impl MergePlan {
    /// Total pages in the merged output.
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    /// Number of pages that receive a page number.
    pub fn numbered_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.page_number().is_some()).count()
    }

    /// Number of pages that receive a label.
    pub fn labeled_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.label().is_some()).count()
    }

    /// Source `(document, page)` pairs in copy order.
    pub fn copy_order(&self) -> Vec<(usize, usize)> {
        self.pages
            .iter()
            .map(|p| (p.document_index, p.page_index))
            .collect()
    }

    /// The absolute page range `(first, last)` occupied by a document, or
    /// `None` if it contributed no pages.
    pub fn document_span(&self, document_index: usize) -> Option<(u32, u32)> {
        let mut pages = self
            .pages
            .iter()
            .filter(|p| p.document_index == document_index)
            .map(|p| p.absolute_page);
        let first = pages.next()?;
        Some((first, pages.last().unwrap_or(first)))
    }
}

/// Loaded documents together with the plan built over them.
#[derive(Debug)]
pub struct MergedOutput<D> {
    /// Loaded documents, one per input, in merge order.
    pub documents: Vec<D>,
    /// Page instructions referencing `documents` by index.
    pub plan: MergePlan,
}

/// Plans page copies and annotations for a merge.
#[derive(Debug, Clone, Default)]
pub struct MergeAnnotator {
    numbering: PageNumbering,
    label_pages: LabelPages,
}

impl MergeAnnotator {
    /// Create an annotator that labels every page of labeled documents.
    pub fn new(numbering: PageNumbering) -> Self {
        Self {
            numbering,
            label_pages: LabelPages::All,
        }
    }

    /// Restrict which pages of a labeled document are labeled.
    pub fn with_label_pages(mut self, label_pages: LabelPages) -> Self {
        self.label_pages = label_pages;
        self
    }

    /// Load every document through `source` and plan the merge.
    ///
    /// Loading stops at the first unreadable document and nothing is
    /// returned for the documents before it.
    ///
    /// # Errors
    ///
    /// - [`PdfAgendaError::EmptyInput`] if `documents` is empty
    /// - [`PdfAgendaError::UnreadableDocument`] naming the first document
    ///   `source` rejects
    /// - [`PdfAgendaError::InvalidConfig`] for invalid numbering or labels
    pub fn merge<S: DocumentSource>(
        &self,
        source: &S,
        documents: &[SourceDocument],
    ) -> Result<MergedOutput<S::Document>> {
        if documents.is_empty() {
            return Err(PdfAgendaError::EmptyInput);
        }
        self.validate(documents.iter().map(|d| &d.label))?;

        let mut loaded = Vec::with_capacity(documents.len());
        let mut layouts = Vec::with_capacity(documents.len());

        for (index, document) in documents.iter().enumerate() {
            let doc = source.load(&document.bytes).map_err(|reason| {
                PdfAgendaError::unreadable_document(index, document.name.clone(), reason)
            })?;
            layouts.push(DocumentLayout::new(source.page_count(&doc), document.label));
            loaded.push(doc);
        }

        let plan = self.plan(&layouts)?;

        Ok(MergedOutput {
            documents: loaded,
            plan,
        })
    }

    /// Plan a merge over documents whose page counts are already known.
    pub fn plan(&self, layouts: &[DocumentLayout]) -> Result<MergePlan> {
        if layouts.is_empty() {
            return Err(PdfAgendaError::EmptyInput);
        }
        self.validate(layouts.iter().map(|l| &l.label))?;

        let total_pages = total_pages(layouts);
        let mut counter = LabelCounter::default();
        let mut pages = Vec::with_capacity(total_pages as usize);
        let mut absolute_page = 0u32;

        for (document_index, layout) in layouts.iter().enumerate() {
            let label_text = counter
                .next(&layout.label)
                .and_then(|n| layout.label.kind.render(n));

            for page_index in 0..layout.page_count {
                absolute_page += 1;
                let mut draws = Vec::new();

                if let Some(n) = self.numbering.printed_number(absolute_page, total_pages) {
                    draws.push(self.page_number_draw(n));
                }

                if let Some(text) = &label_text
                    && self.label_pages.includes(page_index)
                {
                    draws.extend(label_draws(text));
                }

                pages.push(PageInstruction {
                    document_index,
                    page_index,
                    absolute_page,
                    draws,
                });
            }
        }

        Ok(MergePlan { pages })
    }

    fn validate<'a>(&self, labels: impl Iterator<Item = &'a DocumentLabel>) -> Result<()> {
        self.numbering.validate()?;
        for label in labels {
            label.validate()?;
        }
        Ok(())
    }

    fn page_number_draw(&self, n: u32) -> DrawInstruction {
        DrawInstruction::Text {
            role: DrawRole::PageNumber,
            text: self.numbering.format.render(n),
            at: self.numbering.position.anchor(),
            font_size: self.numbering.size.points(),
            color: Color::BLACK,
        }
    }
}

/// Sum of page counts; the default end of the numbering window.
pub fn total_pages(layouts: &[DocumentLayout]) -> u32 {
    layouts.iter().map(|l| l.page_count as u32).sum()
}

fn label_draws(text: &str) -> [DrawInstruction; 2] {
    [
        DrawInstruction::Rectangle {
            role: DrawRole::Label,
            origin: label::box_anchor(),
            width: label::box_width(text),
            height: label::BOX_HEIGHT,
            border_color: Color::BLACK,
            border_width: label::BORDER_WIDTH,
        },
        DrawInstruction::Text {
            role: DrawRole::Label,
            text: text.to_string(),
            at: label::text_anchor(),
            font_size: label::FONT_SIZE,
            color: Color::DARK_GRAY,
        },
    ]
}
