//! The font used for page numbers and labels.
//!
//! Two flavours are supported:
//!
//! - **Builtin**: a non-embedded Type0 font over the Adobe-Japan1 collection
//!   with the `UniJIS-UTF16-H` CMap. Strings are plain UTF-16BE and the
//!   viewer substitutes its own Japanese Mincho face. Nothing can go wrong
//!   loading it.
//! - **Embedded**: a TrueType face read from disk with `ttf-parser` and
//!   embedded whole as a `CIDFontType2` with `Identity-H` encoding, so
//!   strings are glyph ids.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{PdfAgendaError, Result};

/// PostScript name of the builtin CID-keyed font.
pub const BUILTIN_FONT_NAME: &str = "KozMinPr6N-Regular";

/// Predefined CMap used with the builtin font.
pub const BUILTIN_CMAP: &str = "UniJIS-UTF16-H";

/// Where the stamping font comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSource {
    /// Non-embedded Japanese CID font.
    #[default]
    Builtin,
    /// A TrueType font file to embed.
    File(PathBuf),
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => write!(f, "{BUILTIN_FONT_NAME} (builtin)"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A loaded font ready to encode text and write itself into a document.
#[derive(Debug, Clone)]
pub struct StampFont {
    program: FontProgram,
    /// Glyph ids drawn so far, with the character each one stands for.
    used_glyphs: BTreeMap<u16, char>,
}

#[derive(Debug, Clone)]
enum FontProgram {
    Builtin,
    Embedded { name: String, data: Vec<u8> },
}

impl StampFont {
    /// The builtin Japanese font.
    pub fn builtin() -> Self {
        Self {
            program: FontProgram::Builtin,
            used_glyphs: BTreeMap::new(),
        }
    }

    /// Parse TrueType font data for embedding.
    ///
    /// # Errors
    ///
    /// Returns [`PdfAgendaError::FontUnavailable`] if the data is not a
    /// TrueType-outline font.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| PdfAgendaError::font_unavailable(&name, e.to_string()))?;

        if face.tables().glyf.is_none() {
            return Err(PdfAgendaError::font_unavailable(
                &name,
                "only fonts with TrueType outlines can be embedded",
            ));
        }

        Ok(Self {
            program: FontProgram::Embedded { name, data },
            used_glyphs: BTreeMap::new(),
        })
    }

    /// Resolve a [`FontSource`].
    ///
    /// # Errors
    ///
    /// Returns [`PdfAgendaError::FontUnavailable`] if the font file cannot be
    /// read or parsed.
    pub async fn load(source: &FontSource) -> Result<Self> {
        match source {
            FontSource::Builtin => Ok(Self::builtin()),
            FontSource::File(path) => {
                let data = tokio::fs::read(path).await.map_err(|e| {
                    PdfAgendaError::font_unavailable(path.display().to_string(), e.to_string())
                })?;
                Self::from_bytes(path.display().to_string(), data)
            }
        }
    }

    /// Name used in reports.
    pub fn display_name(&self) -> &str {
        match &self.program {
            FontProgram::Builtin => BUILTIN_FONT_NAME,
            FontProgram::Embedded { name, .. } => name,
        }
    }

    /// Whether the font program is written into the output.
    pub fn is_embedded(&self) -> bool {
        matches!(self.program, FontProgram::Embedded { .. })
    }

    /// Check that every character of `text` can be drawn.
    ///
    /// # Errors
    ///
    /// Returns [`PdfAgendaError::FontUnavailable`] naming the first
    /// character the face has no glyph for.
    pub fn check_coverage(&self, text: &str) -> Result<()> {
        let FontProgram::Embedded { name, data } = &self.program else {
            return Ok(());
        };
        let face = parse_face(name, data)?;

        match text.chars().find(|&ch| face.glyph_index(ch).is_none()) {
            Some(ch) => Err(PdfAgendaError::font_unavailable(
                name,
                format!("no glyph for '{ch}' (U+{:04X})", ch as u32),
            )),
            None => Ok(()),
        }
    }

    /// Encode `text` as the bytes of a PDF string for this font.
    ///
    /// # Errors
    ///
    /// Returns [`PdfAgendaError::FontUnavailable`] if an embedded face has
    /// no glyph for one of the characters.
    pub fn encode(&mut self, text: &str) -> Result<Vec<u8>> {
        match &self.program {
            FontProgram::Builtin => Ok(text
                .encode_utf16()
                .flat_map(|unit| unit.to_be_bytes())
                .collect()),
            FontProgram::Embedded { name, data } => {
                let face = parse_face(name, data)?;
                let mut bytes = Vec::with_capacity(text.len() * 2);
                for ch in text.chars() {
                    let gid = face.glyph_index(ch).ok_or_else(|| {
                        PdfAgendaError::font_unavailable(
                            name.as_str(),
                            format!("no glyph for '{ch}' (U+{:04X})", ch as u32),
                        )
                    })?;
                    self.used_glyphs.insert(gid.0, ch);
                    bytes.extend_from_slice(&gid.0.to_be_bytes());
                }
                Ok(bytes)
            }
        }
    }

    /// Encode `text` as a hexadecimal PDF string object.
    pub fn encode_object(&mut self, text: &str) -> Result<Object> {
        Ok(Object::String(self.encode(text)?, StringFormat::Hexadecimal))
    }

    /// Write the font objects into `doc` and return the Type0 font's id.
    pub fn install(&self, doc: &mut Document) -> Result<ObjectId> {
        match &self.program {
            FontProgram::Builtin => Ok(install_builtin(doc)),
            FontProgram::Embedded { name, data } => {
                install_embedded(doc, name, data, &self.used_glyphs)
            }
        }
    }
}

fn parse_face<'a>(name: &str, data: &'a [u8]) -> Result<ttf_parser::Face<'a>> {
    ttf_parser::Face::parse(data, 0)
        .map_err(|e| PdfAgendaError::font_unavailable(name, e.to_string()))
}

fn ints(values: &[i64]) -> Object {
    Object::Array(values.iter().map(|&v| Object::Integer(v)).collect())
}

fn install_builtin(doc: &mut Document) -> ObjectId {
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => BUILTIN_FONT_NAME,
        "Flags" => 4,
        "FontBBox" => ints(&[-437, -340, 1147, 1317]),
        "ItalicAngle" => 0,
        "Ascent" => 880,
        "Descent" => -120,
        "CapHeight" => 742,
        "StemV" => 80,
    });

    // CIDs 1-95 are proportional Latin and 231-632 half-width forms.
    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType0",
        "BaseFont" => BUILTIN_FONT_NAME,
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Japan1"),
            "Supplement" => 6,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => 1000,
        "W" => ints(&[1, 95, 500, 231, 632, 500]),
    });

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => Object::Name(format!("{BUILTIN_FONT_NAME}-{BUILTIN_CMAP}").into_bytes()),
        "Encoding" => BUILTIN_CMAP,
        "DescendantFonts" => vec![Object::Reference(cid_font_id)],
    })
}

fn install_embedded(
    doc: &mut Document,
    name: &str,
    data: &[u8],
    used_glyphs: &BTreeMap<u16, char>,
) -> Result<ObjectId> {
    let face = parse_face(name, data)?;
    let base_font = postscript_name(&face, Path::new(name));
    let scale = 1000.0 / f32::from(face.units_per_em().max(1));
    let to_pdf_units = |v: i16| (f32::from(v) * scale).round() as i64;

    let bbox = face.global_bounding_box();
    let cap_height = face.capital_height().unwrap_or(face.ascender());

    let font_file_id = doc.add_object(Stream::new(
        dictionary! { "Length1" => data.len() as i64 },
        data.to_vec(),
    ));

    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_font.as_str(),
        "Flags" => 4,
        "FontBBox" => ints(&[
            to_pdf_units(bbox.x_min),
            to_pdf_units(bbox.y_min),
            to_pdf_units(bbox.x_max),
            to_pdf_units(bbox.y_max),
        ]),
        "ItalicAngle" => 0,
        "Ascent" => to_pdf_units(face.ascender()),
        "Descent" => to_pdf_units(face.descender()),
        "CapHeight" => to_pdf_units(cap_height),
        "StemV" => 80,
        "FontFile2" => font_file_id,
    });

    let mut widths = Vec::with_capacity(used_glyphs.len() * 2);
    for &gid in used_glyphs.keys() {
        let advance = face
            .glyph_hor_advance(ttf_parser::GlyphId(gid))
            .unwrap_or(face.units_per_em());
        let width = (f32::from(advance) * scale).round() as i64;
        widths.push(Object::Integer(i64::from(gid)));
        widths.push(Object::Array(vec![Object::Integer(width)]));
    }

    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => base_font.as_str(),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor_id,
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });

    let to_unicode_id = doc.add_object(Stream::new(
        Dictionary::new(),
        to_unicode_cmap(used_glyphs).into_bytes(),
    ));

    Ok(doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => base_font.as_str(),
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_font_id)],
        "ToUnicode" => to_unicode_id,
    }))
}

fn postscript_name(face: &ttf_parser::Face<'_>, path: &Path) -> String {
    let from_table = face
        .names()
        .into_iter()
        .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
        .and_then(|n| n.to_string());

    let raw = from_table
        .or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "EmbeddedFont".to_string());

    let sanitized: String = raw
        .chars()
        .filter(|c| c.is_ascii_graphic() && !"()<>[]{}/%#".contains(*c))
        .collect();

    if sanitized.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        sanitized
    }
}

/// Build a ToUnicode CMap mapping glyph ids back to characters.
fn to_unicode_cmap(glyphs: &BTreeMap<u16, char>) -> String {
    let entries: Vec<(u16, char)> = glyphs.iter().map(|(&g, &c)| (g, c)).collect();

    let mut out = String::new();
    out.push_str("/CIDInit /ProcSet findresource begin\n");
    out.push_str("12 dict begin\n");
    out.push_str("begincmap\n");
    out.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
    out.push_str("/CMapName /Adobe-Identity-UCS def\n");
    out.push_str("/CMapType 2 def\n");
    out.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

    // bfchar blocks hold at most 100 entries
    for chunk in entries.chunks(100) {
        out.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, ch) in chunk {
            let mut units = [0u16; 2];
            let hex: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{u:04X}"))
                .collect();
            out.push_str(&format!("<{gid:04X}> <{hex}>\n"));
        }
        out.push_str("endbfchar\n");
    }

    out.push_str("endcmap\n");
    out.push_str("CMapName currentdict /CMap defineresource pop\n");
    out.push_str("end\nend\n");
    out
}
