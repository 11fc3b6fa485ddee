//! Writes stamped text and boxes into page content streams.
//!
//! Operators are buffered per page while the merge plan is rendered. On
//! [`PageStamper::finish`] every touched page gets its original content
//! wrapped in `q ... Q`, so a leftover transformation matrix or color in the
//! source page cannot leak into the stamp, and one new content stream
//! appended after it.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::BTreeMap;

use super::{StampFont, TextRenderer};
use crate::annotate::geometry::{Color, Point, Rect};
use crate::error::{PdfAgendaError, Result};

/// Resource name the stamping font is registered under on each page.
pub const FONT_RESOURCE: &str = "FAgenda";

/// A [`TextRenderer`] that produces PDF content streams.
#[derive(Debug)]
pub struct PageStamper {
    font: StampFont,
    pages: BTreeMap<ObjectId, Vec<Operation>>,
}

impl PageStamper {
    /// Create a stamper drawing with `font`.
    pub fn new(font: StampFont) -> Self {
        Self {
            font,
            pages: BTreeMap::new(),
        }
    }

    /// Number of pages with at least one pending draw.
    pub fn stamped_pages(&self) -> usize {
        self.pages.len()
    }

    /// Write the buffered draws into `doc`.
    ///
    /// Installs the font once, then updates every touched page's
    /// `Contents` and `Resources`. Returns the number of pages stamped.
    ///
    /// # Errors
    ///
    /// Returns an error if a page object is missing or malformed.
    pub fn finish(self, doc: &mut Document) -> Result<usize> {
        if self.pages.is_empty() {
            return Ok(0);
        }

        let font_id = self.font.install(doc)?;
        let save_state_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let stamped = self.pages.len();

        for (page_id, operations) in self.pages {
            let mut content = b"Q\n".to_vec();
            content.extend(Content { operations }.encode()?);
            let stamp_id = doc.add_object(Stream::new(Dictionary::new(), content));

            wrap_contents(doc, page_id, save_state_id, stamp_id)?;
            register_font(doc, page_id, font_id)?;
        }

        Ok(stamped)
    }

    fn operations(&mut self, page: ObjectId) -> &mut Vec<Operation> {
        self.pages.entry(page).or_default()
    }
}

impl TextRenderer for PageStamper {
    fn draw_text(
        &mut self,
        page: ObjectId,
        text: &str,
        at: Point,
        font_size: f32,
        color: Color,
    ) -> Result<()> {
        let encoded = self.font.encode_object(text)?;
        self.operations(page).extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![FONT_RESOURCE.into(), font_size.into()]),
            Operation::new("rg", vec![color.r.into(), color.g.into(), color.b.into()]),
            Operation::new("Td", vec![at.x.into(), at.y.into()]),
            Operation::new("Tj", vec![encoded]),
            Operation::new("ET", vec![]),
        ]);
        Ok(())
    }

    fn draw_rectangle(
        &mut self,
        page: ObjectId,
        rect: Rect,
        border_color: Color,
        border_width: f32,
    ) -> Result<()> {
        self.operations(page).extend([
            Operation::new("q", vec![]),
            Operation::new("w", vec![border_width.into()]),
            Operation::new(
                "RG",
                vec![
                    border_color.r.into(),
                    border_color.g.into(),
                    border_color.b.into(),
                ],
            ),
            Operation::new(
                "re",
                vec![
                    rect.origin.x.into(),
                    rect.origin.y.into(),
                    rect.width.into(),
                    rect.height.into(),
                ],
            ),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }
}

fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary> {
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PdfAgendaError::merge_failed(format!("Page {page_id:?} is unusable: {e}")))
}

/// Turn the page's `Contents` into `[save, ...existing, stamp]`.
fn wrap_contents(
    doc: &mut Document,
    page_id: ObjectId,
    save_state_id: ObjectId,
    stamp_id: ObjectId,
) -> Result<()> {
    let existing = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"Contents").ok())
        .cloned();

    let mut contents = vec![Object::Reference(save_state_id)];
    match existing {
        Some(Object::Reference(id)) => match doc.get_object(id) {
            Ok(Object::Array(items)) => contents.extend(items.iter().cloned()),
            _ => contents.push(Object::Reference(id)),
        },
        Some(Object::Array(items)) => contents.extend(items),
        _ => {}
    }
    contents.push(Object::Reference(stamp_id));

    page_dict_mut(doc, page_id)?.set("Contents", contents);
    Ok(())
}

/// Add the stamping font to the page's `/Resources /Font` dictionary.
///
/// Referenced resource and font dictionaries are copied inline so that
/// pages sharing them are not affected.
fn register_font(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> Result<()> {
    let mut resources = match doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"Resources").ok())
    {
        Some(Object::Dictionary(dict)) => dict.clone(),
        Some(Object::Reference(id)) => doc.get_dictionary(*id).cloned().unwrap_or_default(),
        _ => Dictionary::new(),
    };

    let mut fonts = match resources.get(b"Font") {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).cloned().unwrap_or_default(),
        _ => Dictionary::new(),
    };
    fonts.set(FONT_RESOURCE, font_id);
    resources.set("Font", fonts);

    page_dict_mut(doc, page_id)?.set("Resources", resources);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    /// One page whose content and resources are indirect objects.
    fn single_page_document() -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            b"1 0 0 1 50 50 cm 0 0 1 rg".to_vec(),
        ));
        let helvetica_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => helvetica_id },
        });
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        doc.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }
            .into(),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        (doc, page_id)
    }

    fn stream_content(doc: &Document, obj: &Object) -> Vec<u8> {
        let id = obj.as_reference().unwrap();
        doc.get_object(id).unwrap().as_stream().unwrap().content.clone()
    }

    #[test]
    fn test_finish_without_draws_changes_nothing() {
        let (mut doc, _) = single_page_document();
        let before = doc.objects.len();

        let stamped = PageStamper::new(StampFont::builtin())
            .finish(&mut doc)
            .unwrap();

        assert_eq!(stamped, 0);
        assert_eq!(doc.objects.len(), before);
    }

    #[test]
    fn test_stamp_wraps_existing_content() {
        let (mut doc, page_id) = single_page_document();

        let mut stamper = PageStamper::new(StampFont::builtin());
        stamper
            .draw_text(page_id, "1", Point { x: 287.5, y: 20.0 }, 10.0, Color::BLACK)
            .unwrap();
        assert_eq!(stamper.stamped_pages(), 1);
        assert_eq!(stamper.finish(&mut doc).unwrap(), 1);

        let page = doc.get_dictionary(page_id).unwrap();
        let contents = page.get(b"Contents").unwrap().as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(stream_content(&doc, &contents[0]), b"q\n");
        assert_eq!(
            stream_content(&doc, &contents[1]),
            b"1 0 0 1 50 50 cm 0 0 1 rg"
        );

        let stamp = stream_content(&doc, &contents[2]);
        assert!(stamp.starts_with(b"Q\n"));
        let ops = Content::decode(&stamp[2..]).unwrap().operations;
        let operators: Vec<_> = ops.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(operators, vec!["BT", "Tf", "rg", "Td", "Tj", "ET"]);
    }

    #[test]
    fn test_stamp_registers_font_alongside_existing_fonts() {
        let (mut doc, page_id) = single_page_document();

        let mut stamper = PageStamper::new(StampFont::builtin());
        stamper
            .draw_rectangle(
                page_id,
                Rect {
                    origin: Point { x: 20.0, y: 802.0 },
                    width: 80.0,
                    height: 24.0,
                },
                Color::BLACK,
                1.0,
            )
            .unwrap();
        stamper.finish(&mut doc).unwrap();

        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.has(b"F1"));
        assert!(fonts.has(FONT_RESOURCE.as_bytes()));
    }

    #[test]
    fn test_page_without_contents_or_resources() {
        let mut doc = Document::with_version("1.5");
        let page_id = doc.add_object(dictionary! { "Type" => "Page" });

        let mut stamper = PageStamper::new(StampFont::builtin());
        stamper
            .draw_text(page_id, "2", Point { x: 0.0, y: 0.0 }, 8.0, Color::BLACK)
            .unwrap();
        stamper.finish(&mut doc).unwrap();

        let page = doc.get_dictionary(page_id).unwrap();
        assert_eq!(page.get(b"Contents").unwrap().as_array().unwrap().len(), 2);
        assert!(page.get(b"Resources").unwrap().as_dict().unwrap().has(b"Font"));
    }
}
