//! Page number configuration and rendering.
//!
//! Numbering works on the absolute page index of the merged output, never
//! on a page index inside one source document.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::geometry::{Anchor, Offset};
use crate::error::{PdfAgendaError, Result};

/// Horizontal shift from the page center to the start of the number text.
pub const CENTER_OFFSET: f32 = 10.0;

/// Baseline distance from the bottom edge for [`NumberPosition::Bottom`].
pub const BOTTOM_MARGIN: f32 = 20.0;

/// Baseline distance from the top edge for [`NumberPosition::Top`].
pub const TOP_MARGIN: f32 = 30.0;

/// How a printed page number is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    /// `"7"`
    #[default]
    Plain,
    /// `"- 7 -"`
    Dashed,
    /// `"7 ページ"`
    Suffixed,
}

impl NumberFormat {
    /// Render `n` in this format.
    pub fn render(&self, n: u32) -> String {
        match self {
            Self::Plain => n.to_string(),
            Self::Dashed => format!("- {n} -"),
            Self::Suffixed => format!("{n} ページ"),
        }
    }
}

impl FromStr for NumberFormat {
    type Err = PdfAgendaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "dashed" => Ok(Self::Dashed),
            "suffixed" => Ok(Self::Suffixed),
            _ => Err(PdfAgendaError::invalid_config(format!(
                "Invalid number format: {s}. Must be one of: plain, dashed, suffixed"
            ))),
        }
    }
}

/// Vertical slot for page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberPosition {
    /// Header area.
    Top,
    /// Footer area.
    #[default]
    Bottom,
}

impl NumberPosition {
    /// Where the number's baseline starts.
    pub fn anchor(&self) -> Anchor {
        let y = match self {
            Self::Top => Offset::FromEnd(TOP_MARGIN),
            Self::Bottom => Offset::FromStart(BOTTOM_MARGIN),
        };
        Anchor::new(Offset::FromCenter(-CENTER_OFFSET), y)
    }
}

impl FromStr for NumberPosition {
    type Err = PdfAgendaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            _ => Err(PdfAgendaError::invalid_config(format!(
                "Invalid number position: {s}. Must be top or bottom"
            ))),
        }
    }
}

/// Font size class for page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberSize {
    /// 8 pt.
    Small,
    /// 10 pt.
    #[default]
    Medium,
    /// 14 pt.
    Large,
}

impl NumberSize {
    /// Font size in points.
    pub fn points(&self) -> f32 {
        match self {
            Self::Small => 8.0,
            Self::Medium => 10.0,
            Self::Large => 14.0,
        }
    }
}

impl FromStr for NumberSize {
    type Err = PdfAgendaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(PdfAgendaError::invalid_config(format!(
                "Invalid number size: {s}. Must be one of: small, medium, large"
            ))),
        }
    }
}

/// Page numbering settings for one merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageNumbering {
    /// Whether page numbers are stamped at all.
    pub enabled: bool,
    /// First absolute page (1-based) that receives a number; it prints as 1.
    pub start_page: u32,
    /// Last absolute page (inclusive). `None` means the last page of the merge.
    pub end_page: Option<u32>,
    /// Text format.
    pub format: NumberFormat,
    /// Header or footer.
    pub position: NumberPosition,
    /// Font size class.
    pub size: NumberSize,
}

impl Default for PageNumbering {
    fn default() -> Self {
        Self {
            enabled: true,
            start_page: 1,
            end_page: None,
            format: NumberFormat::default(),
            position: NumberPosition::default(),
            size: NumberSize::default(),
        }
    }
}

impl PageNumbering {
    /// Numbering switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Check the range for logical errors.
    ///
    /// An `end_page` past the end of the merged output is not an error; it is
    /// clamped when the window is computed.
    pub fn validate(&self) -> Result<()> {
        if self.start_page == 0 {
            return Err(PdfAgendaError::invalid_config(
                "Start page must be positive (1-indexed)",
            ));
        }

        if let Some(end) = self.end_page
            && end < self.start_page
        {
            return Err(PdfAgendaError::invalid_config(format!(
                "Invalid numbering range {}-{end}: start page must be less than or equal to end page",
                self.start_page
            )));
        }

        Ok(())
    }

    /// The inclusive absolute page window that receives numbers, clamped to
    /// `total_pages`. `None` when numbering is off or the window is empty.
    pub fn window(&self, total_pages: u32) -> Option<(u32, u32)> {
        if !self.enabled {
            return None;
        }

        let end = self.end_page.unwrap_or(total_pages).min(total_pages);
        (self.start_page >= 1 && self.start_page <= end).then_some((self.start_page, end))
    }

    /// The number printed on `absolute_page`, if that page is numbered.
    pub fn printed_number(&self, absolute_page: u32, total_pages: u32) -> Option<u32> {
        let (start, end) = self.window(total_pages)?;
        (start..=end)
            .contains(&absolute_page)
            .then(|| absolute_page - start + 1)
    }
}
