//! Page copying and page tree assembly.
//!
//! Source pages are moved into the output document whole. Attributes a page
//! inherits from its old page tree are copied onto the page itself first,
//! because the old tree does not come along.

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::annotate::geometry::PageBox;
use crate::error::{PdfAgendaError, Result};

/// Page attributes that may be inherited from an ancestor `Pages` node.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Upper bound on page tree depth, guarding against `Parent` cycles.
const MAX_TREE_DEPTH: usize = 64;

/// Moves pages between documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageCopier;

impl PageCopier {
    /// Create a new page copier.
    pub fn new() -> Self {
        Self
    }

    /// Move every object of `source` into `output`.
    ///
    /// The source's objects are renumbered past `output.max_id` so no ids
    /// collide. Returns the source's page ids, in page order, as they are
    /// numbered in `output`.
    ///
    /// # Errors
    ///
    /// Returns an error if a page object is not a dictionary.
    pub fn copy_into(&self, output: &mut Document, mut source: Document) -> Result<Vec<ObjectId>> {
        flatten_inherited(&mut source)?;

        source.renumber_objects_with(output.max_id + 1);
        output.max_id = output.max_id.max(source.max_id);

        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
        output.objects.extend(source.objects);

        Ok(page_ids)
    }

    /// Make `pages_id` the page tree root holding `kids`, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if one of `kids` is not a page dictionary.
    pub fn attach_pages(
        &self,
        output: &mut Document,
        pages_id: ObjectId,
        kids: &[ObjectId],
    ) -> Result<()> {
        for &page_id in kids {
            page_dict_mut(output, page_id)?.set("Parent", pages_id);
        }

        let mut pages = Dictionary::new();
        pages.set("Type", "Pages");
        pages.set(
            "Kids",
            kids.iter()
                .map(|&id| Object::Reference(id))
                .collect::<Vec<_>>(),
        );
        pages.set("Count", kids.len() as i64);
        output.objects.insert(pages_id, Object::Dictionary(pages));

        Ok(())
    }
}

/// Copy inherited attributes onto every page of `doc`.
///
/// Returns the number of pages that changed.
pub fn flatten_inherited(doc: &mut Document) -> Result<usize> {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let mut changed = 0;

    for page_id in page_ids {
        let inherited = inherited_attributes(doc, page_id);
        if inherited.is_empty() {
            continue;
        }

        let page = page_dict_mut(doc, page_id)?;
        for (key, value) in inherited {
            page.set(key, value);
        }
        changed += 1;
    }

    Ok(changed)
}

fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };

    let mut missing: Vec<&'static [u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut found = Vec::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let Some(node) = parent.and_then(|id| doc.get_dictionary(id).ok()) else {
            break;
        };
        if missing.is_empty() {
            break;
        }

        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    found
}

/// The page's MediaBox, or US Letter if it has none that is usable.
pub fn page_box(doc: &Document, page_id: ObjectId) -> PageBox {
    doc.get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"MediaBox").ok())
        .and_then(|obj| match obj {
            Object::Reference(id) => doc.get_object(*id).ok(),
            other => Some(other),
        })
        .and_then(|obj| obj.as_array().ok())
        .and_then(|values| parse_box(values))
        .unwrap_or(PageBox::LETTER)
}

fn parse_box(values: &[Object]) -> Option<PageBox> {
    let [x0, y0, x1, y1] = values else {
        return None;
    };
    let page_box = PageBox::from_corners(
        x0.as_float().ok()?,
        y0.as_float().ok()?,
        x1.as_float().ok()?,
        y1.as_float().ok()?,
    );
    (page_box.width() > 0.0 && page_box.height() > 0.0).then_some(page_box)
}

fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary> {
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PdfAgendaError::merge_failed(format!("Page {page_id:?} is unusable: {e}")))
}
