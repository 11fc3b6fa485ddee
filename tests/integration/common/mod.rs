//! Shared helpers for the integration tests.
//!
//! Input PDFs are generated on the fly with `lopdf`. Only fonts are checked
//! in under `tests/fixtures/`.

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use pdfagenda::config::{Config, DocumentInput, OverwriteMode};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A4 portrait, in points.
pub const A4: (i64, i64) = (595, 842);

/// US Letter landscape, in points.
pub const LETTER_LANDSCAPE: (i64, i64) = (792, 612);

/// Write a PDF with `pages` pages of size `media_box` into `dir`.
///
/// The MediaBox sits on the page tree root so that copying has to
/// resolve inherited attributes.
pub fn write_pdf(dir: &TempDir, name: &str, pages: usize, media_box: (i64, i64)) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|i| {
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                format!("BT /F1 12 Tf 72 500 Td (page {i}) Tj ET").into_bytes(),
            ));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), media_box.0.into(), media_box.1.into()],
            "Resources" => dictionary! {},
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.path().join(name);
    doc.save(&path).expect("Failed to write test PDF");
    path
}

/// Path to a file under `tests/fixtures/`.
pub fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

/// A quiet configuration writing to `output`.
pub fn quiet_config(documents: Vec<DocumentInput>, output: &Path) -> Config {
    Config {
        output: output.to_path_buf(),
        quiet: true,
        overwrite_mode: OverwriteMode::Force,
        ..Config::new(documents)
    }
}

/// Every `Td` position on a page, in content order.
pub fn text_positions(doc: &Document, page_id: ObjectId) -> Vec<(f32, f32)> {
    let bytes = doc.get_page_content(page_id).expect("page content");
    let content = Content::decode(&bytes).expect("decodable content");

    content
        .operations
        .iter()
        .filter(|op| op.operator == "Td")
        .filter_map(|op| match op.operands.as_slice() {
            [x, y] => Some((x.as_float().ok()?, y.as_float().ok()?)),
            _ => None,
        })
        .collect()
}

/// The font a page's resources register under `name`.
pub fn page_font(doc: &Document, page_id: ObjectId, name: &str) -> Option<Dictionary> {
    let resolve = |object: &Object| match object {
        Object::Reference(id) => doc.get_dictionary(*id).ok().cloned(),
        Object::Dictionary(dict) => Some(dict.clone()),
        _ => None,
    };

    let page = doc.get_dictionary(page_id).ok()?;
    let resources = resolve(page.get(b"Resources").ok()?)?;
    let fonts = resolve(resources.get(b"Font").ok()?)?;
    resolve(fonts.get(name.as_bytes()).ok()?)
}

/// Names of the fonts in a page's resources.
pub fn font_names(doc: &Document, page_id: ObjectId) -> Vec<String> {
    let resolve = |object: &Object| match object {
        Object::Reference(id) => doc.get_dictionary(*id).ok().cloned(),
        Object::Dictionary(dict) => Some(dict.clone()),
        _ => None,
    };

    doc.get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"Resources").ok())
        .and_then(resolve)
        .and_then(|resources| resources.get(b"Font").ok().and_then(resolve))
        .map(|fonts| {
            fonts
                .iter()
                .map(|(name, _)| String::from_utf8_lossy(name).into_owned())
                .collect()
        })
        .unwrap_or_default()
}
