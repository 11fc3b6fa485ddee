//! Drawing page numbers and labels onto PDF pages.
//!
//! The planner emits page-size independent [`DrawInstruction`]s. This module
//! resolves them against a concrete page box and hands them to a
//! [`TextRenderer`]. [`PageStamper`] is the renderer that writes real PDF
//! content streams.

pub mod font;
pub mod stamp;

pub use font::{FontSource, StampFont};
pub use stamp::PageStamper;

use lopdf::ObjectId;

use crate::annotate::DrawInstruction;
use crate::annotate::geometry::{Color, PageBox, Point, Rect};
use crate::error::Result;

/// Something that can draw text and rectangles on a page.
pub trait TextRenderer {
    /// Draw one line of text with its baseline starting at `at`.
    fn draw_text(
        &mut self,
        page: ObjectId,
        text: &str,
        at: Point,
        font_size: f32,
        color: Color,
    ) -> Result<()>;

    /// Stroke the outline of `rect`.
    fn draw_rectangle(
        &mut self,
        page: ObjectId,
        rect: Rect,
        border_color: Color,
        border_width: f32,
    ) -> Result<()>;
}

/// Resolve `draws` against `page_box` and send them to `renderer` in order.
pub fn render_draws<R: TextRenderer + ?Sized>(
    renderer: &mut R,
    page: ObjectId,
    page_box: &PageBox,
    draws: &[DrawInstruction],
) -> Result<()> {
    for draw in draws {
        match draw {
            DrawInstruction::Text {
                text,
                at,
                font_size,
                color,
                ..
            } => renderer.draw_text(page, text, at.resolve(page_box), *font_size, *color)?,
            DrawInstruction::Rectangle {
                origin,
                width,
                height,
                border_color,
                border_width,
                ..
            } => renderer.draw_rectangle(
                page,
                Rect {
                    origin: origin.resolve(page_box),
                    width: *width,
                    height: *height,
                },
                *border_color,
                *border_width,
            )?,
        }
    }
    Ok(())
}
