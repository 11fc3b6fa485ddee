//! PDF metadata management.
//!
//! Writes the document Info dictionary: title, author, subject, keywords,
//! creator, producer and dates. Text that is not plain ASCII is stored as
//! UTF-16BE with a byte order mark so Japanese titles survive.

use crate::config::Metadata;
use crate::error::{PdfAgendaError, Result};
use lopdf::{Dictionary, Document, Object, StringFormat};
use std::time::{SystemTime, UNIX_EPOCH};

/// Value written to `/Creator` and `/Producer`.
pub const PRODUCER: &str = "pdfagenda";

const UTF16_BOM: [u8; 2] = [0xFE, 0xFF];

/// Manager for PDF metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Set metadata on a document.
    ///
    /// Only non-empty fields are set. Nothing is written when `metadata`
    /// is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the Info dictionary cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfagenda::merge::metadata::MetadataManager;
    /// # use pdfagenda::config::Metadata;
    /// # use lopdf::Document;
    /// # fn example(mut doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// let metadata = Metadata::new(
    ///     Some("令和6年度 PTA総会資料".to_string()),
    ///     Some("PTA本部".to_string()),
    ///     None,
    ///     None,
    /// );
    /// MetadataManager::new().set_metadata(&mut doc, &metadata)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_metadata(&self, doc: &mut Document, metadata: &Metadata) -> Result<()> {
        if metadata.is_empty() {
            return Ok(());
        }

        let info_id = match doc.trailer.get(b"Info").and_then(Object::as_reference) {
            Ok(id) => id,
            Err(_) => {
                let id = doc.add_object(Dictionary::new());
                doc.trailer.set("Info", id);
                id
            }
        };

        let info = doc
            .get_object_mut(info_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| PdfAgendaError::MetadataFailed {
                reason: format!("Info dictionary is unusable: {e}"),
            })?;

        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Keywords", &metadata.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                info.set(key, text_string(value));
            }
        }

        info.set("Creator", text_string(PRODUCER));
        info.set("Producer", text_string(PRODUCER));

        let date = format_pdf_date(SystemTime::now());
        info.set("CreationDate", text_string(&date));
        info.set("ModDate", text_string(&date));

        Ok(())
    }

    /// Read metadata back from a document's Info dictionary.
    pub fn get_metadata(&self, doc: &Document) -> Metadata {
        let Some(info) = doc
            .trailer
            .get(b"Info")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .ok()
        else {
            return Metadata::default();
        };

        let field = |key: &[u8]| match info.get(key) {
            Ok(Object::String(bytes, _)) => decode_text_string(bytes),
            _ => None,
        };

        Metadata::new(
            field(b"Title"),
            field(b"Author"),
            field(b"Subject"),
            field(b"Keywords"),
        )
    }

    /// Check if a document has an Info dictionary.
    pub fn has_metadata(&self, doc: &Document) -> bool {
        doc.trailer.has(b"Info")
    }
}

/// Encode a PDF text string: literal for ASCII, UTF-16BE otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }

    let mut bytes = UTF16_BOM.to_vec();
    bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn decode_text_string(bytes: &[u8]) -> Option<String> {
    match bytes.strip_prefix(&UTF16_BOM) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        None => String::from_utf8(bytes.to_vec()).ok(),
    }
}

/// Format a SystemTime as a PDF date string in UTC (`D:YYYYMMDDHHmmSSZ`).
fn format_pdf_date(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let days = (secs / 86_400) as i64;
    let (year, month, day) = civil_from_days(days);
    let rem = secs % 86_400;

    format!(
        "D:{year:04}{month:02}{day:02}{:02}{:02}{:02}Z",
        rem / 3_600,
        (rem % 3_600) / 60,
        rem % 60
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
