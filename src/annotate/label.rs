//! Section labels stamped in the top-left corner of a document's pages.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::geometry::{Anchor, Offset};
use crate::error::{PdfAgendaError, Result};

/// Approximate advance per character used to size the label box.
pub const CHAR_WIDTH: f32 = 12.0;

/// Horizontal padding added to the label box width.
pub const BOX_PADDING: f32 = 20.0;

/// Label box height.
pub const BOX_HEIGHT: f32 = 24.0;

/// Distance from the left edge to the box.
pub const BOX_LEFT: f32 = 20.0;

/// Distance from the top edge to the box's bottom side.
pub const BOX_TOP: f32 = 40.0;

/// Text baseline inset from the box's bottom-left corner.
pub const TEXT_INSET_X: f32 = 10.0;
/// See [`TEXT_INSET_X`].
pub const TEXT_INSET_Y: f32 = 7.0;

/// Label text size.
pub const FONT_SIZE: f32 = 12.0;

/// Border stroke width.
pub const BORDER_WIDTH: f32 = 1.0;

/// Kind of section a document represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    /// No label is stamped.
    #[default]
    None,
    /// `第{n}号議案`
    Agenda,
    /// `添付資料{n}`
    Attachment,
    /// `参考資料{n}`
    Reference,
}

impl LabelKind {
    /// Render the label text for number `n`; `None` for [`LabelKind::None`].
    pub fn render(&self, n: u32) -> Option<String> {
        match self {
            Self::None => None,
            Self::Agenda => Some(format!("第{n}号議案")),
            Self::Attachment => Some(format!("添付資料{n}")),
            Self::Reference => Some(format!("参考資料{n}")),
        }
    }

    /// Lowercase keyword used on the command line and in manifests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Agenda => "agenda",
            Self::Attachment => "attachment",
            Self::Reference => "reference",
        }
    }
}

impl FromStr for LabelKind {
    type Err = PdfAgendaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "agenda" => Ok(Self::Agenda),
            "attachment" => Ok(Self::Attachment),
            "reference" => Ok(Self::Reference),
            _ => Err(PdfAgendaError::invalid_config(format!(
                "Invalid label kind: {s}. Must be one of: none, agenda, attachment, reference"
            ))),
        }
    }
}

/// Label configuration attached to one source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentLabel {
    /// Which label family.
    #[serde(default)]
    pub kind: LabelKind,
    /// Explicit number; when absent the running counter for `kind` is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
}

impl DocumentLabel {
    /// No label.
    pub const NONE: Self = Self {
        kind: LabelKind::None,
        number: None,
    };

    /// A label with an explicit number.
    pub fn new(kind: LabelKind, number: u32) -> Self {
        Self {
            kind,
            number: Some(number),
        }
    }

    /// A label numbered by the running counter.
    pub fn auto(kind: LabelKind) -> Self {
        Self { kind, number: None }
    }

    /// Check that explicit numbers are positive and only used with a kind.
    pub fn validate(&self) -> Result<()> {
        match (self.kind, self.number) {
            (_, Some(0)) => Err(PdfAgendaError::invalid_config(
                "Label numbers must be positive",
            )),
            (LabelKind::None, Some(n)) => Err(PdfAgendaError::invalid_config(format!(
                "Label number {n} given without a label kind"
            ))),
            _ => Ok(()),
        }
    }
}

/// Which pages of a labeled document carry the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPages {
    /// Every page of the document.
    #[default]
    All,
    /// Only the document's first page.
    First,
}

impl LabelPages {
    /// Whether the page at `page_index` (0-based, within its document) is labeled.
    pub fn includes(&self, page_index: usize) -> bool {
        match self {
            Self::All => true,
            Self::First => page_index == 0,
        }
    }
}

impl FromStr for LabelPages {
    type Err = PdfAgendaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "first" => Ok(Self::First),
            _ => Err(PdfAgendaError::invalid_config(format!(
                "Invalid label pages: {s}. Must be all or first"
            ))),
        }
    }
}

/// Approximate width of the box around `text`.
///
/// Counts characters, not glyph advances, so full-width text is sized the
/// same as Latin text of equal length.
pub fn box_width(text: &str) -> f32 {
    text.chars().count() as f32 * CHAR_WIDTH + BOX_PADDING
}

/// Bottom-left corner of the label box.
pub fn box_anchor() -> Anchor {
    Anchor::new(Offset::FromStart(BOX_LEFT), Offset::FromEnd(BOX_TOP))
}

/// Baseline start of the label text.
pub fn text_anchor() -> Anchor {
    Anchor::new(
        Offset::FromStart(BOX_LEFT + TEXT_INSET_X),
        Offset::FromEnd(BOX_TOP - TEXT_INSET_Y),
    )
}

/// Per-kind running label counter for a single merge pass.
#[derive(Debug, Default)]
pub(crate) struct LabelCounter {
    agenda: u32,
    attachment: u32,
    reference: u32,
}

impl LabelCounter {
    /// Count one more document of `label.kind` and return its effective
    /// number, or `None` when the document is unlabeled.
    pub(crate) fn next(&mut self, label: &DocumentLabel) -> Option<u32> {
        let slot = match label.kind {
            LabelKind::None => return None,
            LabelKind::Agenda => &mut self.agenda,
            LabelKind::Attachment => &mut self.attachment,
            LabelKind::Reference => &mut self.reference,
        };
        *slot += 1;
        Some(label.number.unwrap_or(*slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LabelKind::Agenda, 3, "第3号議案")]
    #[case(LabelKind::Attachment, 1, "添付資料1")]
    #[case(LabelKind::Reference, 12, "参考資料12")]
    fn test_label_text(#[case] kind: LabelKind, #[case] n: u32, #[case] expected: &str) {
        assert_eq!(kind.render(n).as_deref(), Some(expected));
    }

    #[test]
    fn test_none_renders_nothing() {
        assert_eq!(LabelKind::None.render(1), None);
    }

    #[test]
    fn test_box_width_counts_chars_not_bytes() {
        // 5 chars, 15 UTF-8 bytes
        assert_eq!(box_width("第3号議案"), 5.0 * 12.0 + 20.0);
        assert_eq!(box_width("添付資料10"), 6.0 * 12.0 + 20.0);
    }

    #[test]
    fn test_text_sits_inside_box() {
        let bx = box_anchor();
        let tx = text_anchor();
        assert_eq!(bx.x, Offset::FromStart(20.0));
        assert_eq!(bx.y, Offset::FromEnd(40.0));
        assert_eq!(tx.x, Offset::FromStart(30.0));
        assert_eq!(tx.y, Offset::FromEnd(33.0));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(LabelKind::from_str("Agenda").unwrap(), LabelKind::Agenda);
        assert_eq!(LabelKind::from_str("none").unwrap(), LabelKind::None);
        assert!(LabelKind::from_str("appendix").is_err());
    }

    #[test]
    fn test_label_validation() {
        assert!(DocumentLabel::NONE.validate().is_ok());
        assert!(DocumentLabel::new(LabelKind::Agenda, 2).validate().is_ok());
        assert!(DocumentLabel::auto(LabelKind::Reference).validate().is_ok());
        assert!(DocumentLabel::new(LabelKind::Agenda, 0).validate().is_err());
        assert!(DocumentLabel::new(LabelKind::None, 4).validate().is_err());
    }

    #[test]
    fn test_label_pages() {
        assert!(LabelPages::All.includes(5));
        assert!(LabelPages::First.includes(0));
        assert!(!LabelPages::First.includes(1));
    }

    #[test]
    fn test_counter_is_per_kind() {
        let mut counter = LabelCounter::default();
        assert_eq!(counter.next(&DocumentLabel::auto(LabelKind::Agenda)), Some(1));
        assert_eq!(counter.next(&DocumentLabel::NONE), None);
        assert_eq!(counter.next(&DocumentLabel::auto(LabelKind::Attachment)), Some(1));
        assert_eq!(counter.next(&DocumentLabel::auto(LabelKind::Agenda)), Some(2));
    }

    #[test]
    fn test_explicit_number_still_counts_document() {
        let mut counter = LabelCounter::default();
        assert_eq!(counter.next(&DocumentLabel::new(LabelKind::Agenda, 7)), Some(7));
        assert_eq!(counter.next(&DocumentLabel::auto(LabelKind::Agenda)), Some(2));
    }

    #[test]
    fn test_deserialize_label() {
        let label: DocumentLabel =
            serde_json::from_str(r#"{ "kind": "attachment", "number": 3 }"#).unwrap();
        assert_eq!(label, DocumentLabel::new(LabelKind::Attachment, 3));

        let auto: DocumentLabel = serde_json::from_str(r#"{ "kind": "agenda" }"#).unwrap();
        assert_eq!(auto, DocumentLabel::auto(LabelKind::Agenda));
    }
}
