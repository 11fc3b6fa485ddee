//! End-to-end merges: read, stamp, write and read back.

use lopdf::Document;
use pdfagenda::annotate::label::{DocumentLabel, LabelKind, LabelPages};
use pdfagenda::annotate::numbering::{NumberFormat, NumberPosition, PageNumbering};
use pdfagenda::config::{CompressionLevel, DocumentInput, Metadata};
use pdfagenda::error::PdfAgendaError;
use pdfagenda::io::PdfWriter;
use pdfagenda::merge::{MetadataManager, merge_pdfs};
use pdfagenda::render::FontSource;
use tempfile::TempDir;

use crate::common::{
    A4, LETTER_LANDSCAPE, fixture_path, font_names, page_font, quiet_config, text_positions,
    write_pdf,
};

#[tokio::test]
async fn test_merge_stamps_numbers_and_labels_on_mixed_sizes() {
    let temp_dir = TempDir::new().unwrap();
    let cover = write_pdf(&temp_dir, "cover.pdf", 1, A4);
    let motion = write_pdf(&temp_dir, "motion.pdf", 2, LETTER_LANDSCAPE);
    let output = temp_dir.path().join("merged.pdf");

    let mut config = quiet_config(
        vec![
            DocumentInput::new(&cover),
            DocumentInput::labeled(&motion, DocumentLabel::auto(LabelKind::Agenda)),
        ],
        &output,
    );
    config.numbering.start_page = 2;

    let (document, stats) = merge_pdfs(&config).await.unwrap();
    assert_eq!(stats.files_merged, 2);
    assert_eq!(stats.total_pages, 3);
    assert_eq!(stats.pages_numbered, 2);
    assert_eq!(stats.pages_labeled, 2);

    PdfWriter::new().save(&document, &output).await.unwrap();
    let written = Document::load(&output).unwrap();
    let pages: Vec<_> = written.get_pages().into_values().collect();
    assert_eq!(pages.len(), 3);

    // Cover page is outside the numbering window and unlabeled
    assert_eq!(text_positions(&written, pages[0]), vec![(72.0, 500.0)]);
    assert!(!font_names(&written, pages[0]).contains(&"FAgenda".to_string()));

    for &page_id in &pages[1..] {
        let positions = text_positions(&written, page_id);
        assert_eq!(positions[0], (72.0, 500.0));
        assert!(positions.contains(&(386.0, 20.0)), "{positions:?}");
        assert!(positions.contains(&(30.0, 579.0)), "{positions:?}");
        assert!(font_names(&written, page_id).contains(&"FAgenda".to_string()));
    }
}

#[tokio::test]
async fn test_header_numbers_follow_page_height() {
    let temp_dir = TempDir::new().unwrap();
    let a4 = write_pdf(&temp_dir, "a4.pdf", 1, A4);
    let letter = write_pdf(&temp_dir, "letter.pdf", 1, LETTER_LANDSCAPE);

    let mut config = quiet_config(
        vec![DocumentInput::new(&a4), DocumentInput::new(&letter)],
        &temp_dir.path().join("out.pdf"),
    );
    config.numbering.position = NumberPosition::Top;
    config.compression = CompressionLevel::None;

    let (document, _) = merge_pdfs(&config).await.unwrap();
    let pages: Vec<_> = document.get_pages().into_values().collect();

    assert!(text_positions(&document, pages[0]).contains(&(287.5, 812.0)));
    assert!(text_positions(&document, pages[1]).contains(&(386.0, 582.0)));
}

#[tokio::test]
async fn test_label_on_first_page_only() {
    let temp_dir = TempDir::new().unwrap();
    let budget = write_pdf(&temp_dir, "budget.pdf", 3, A4);

    let mut config = quiet_config(
        vec![DocumentInput::labeled(
            &budget,
            DocumentLabel::new(LabelKind::Attachment, 2),
        )],
        &temp_dir.path().join("out.pdf"),
    );
    config.numbering = PageNumbering::disabled();
    config.label_pages = LabelPages::First;

    let (document, stats) = merge_pdfs(&config).await.unwrap();
    assert_eq!(stats.pages_numbered, 0);
    assert_eq!(stats.pages_labeled, 1);

    let pages: Vec<_> = document.get_pages().into_values().collect();
    assert!(text_positions(&document, pages[0]).contains(&(30.0, 809.0)));
    assert_eq!(text_positions(&document, pages[1]), vec![(72.0, 500.0)]);
    assert_eq!(text_positions(&document, pages[2]), vec![(72.0, 500.0)]);
}

#[tokio::test]
async fn test_metadata_survives_write() {
    let temp_dir = TempDir::new().unwrap();
    let only = write_pdf(&temp_dir, "only.pdf", 1, A4);
    let output = temp_dir.path().join("out.pdf");

    let mut config = quiet_config(vec![DocumentInput::new(&only)], &output);
    config.metadata = Metadata::new(
        Some("令和6年度 PTA総会資料".to_string()),
        Some("PTA".to_string()),
        None,
        None,
    );

    let (document, _) = merge_pdfs(&config).await.unwrap();
    PdfWriter::new().save(&document, &output).await.unwrap();

    let written = Document::load(&output).unwrap();
    let metadata = MetadataManager::new().get_metadata(&written);
    assert_eq!(metadata.title.as_deref(), Some("令和6年度 PTA総会資料"));
    assert_eq!(metadata.author.as_deref(), Some("PTA"));
}

#[tokio::test]
async fn test_merge_same_file_twice() {
    let temp_dir = TempDir::new().unwrap();
    let agenda = write_pdf(&temp_dir, "agenda.pdf", 2, A4);

    let config = quiet_config(
        vec![
            DocumentInput::labeled(&agenda, DocumentLabel::auto(LabelKind::Agenda)),
            DocumentInput::labeled(&agenda, DocumentLabel::auto(LabelKind::Agenda)),
        ],
        &temp_dir.path().join("out.pdf"),
    );

    let (document, stats) = merge_pdfs(&config).await.unwrap();
    assert_eq!(stats.total_pages, 4);
    assert_eq!(document.get_pages().len(), 4);
}

#[tokio::test]
async fn test_merge_embeds_truetype_font() {
    let temp_dir = TempDir::new().unwrap();
    let minutes = write_pdf(&temp_dir, "minutes.pdf", 2, A4);
    let output = temp_dir.path().join("out.pdf");

    let mut config = quiet_config(vec![DocumentInput::new(&minutes)], &output);
    config.font = FontSource::File(fixture_path("Montserrat-Regular.ttf"));
    config.numbering.format = NumberFormat::Dashed;

    let (document, stats) = merge_pdfs(&config).await.unwrap();
    assert_eq!(stats.pages_numbered, 2);

    PdfWriter::new().save(&document, &output).await.unwrap();
    let written = Document::load(&output).unwrap();
    let pages: Vec<_> = written.get_pages().into_values().collect();

    let type0 = page_font(&written, pages[0], "FAgenda").unwrap();
    assert_eq!(type0.get(b"Subtype").unwrap().as_name().unwrap(), b"Type0");
    assert_eq!(
        type0.get(b"Encoding").unwrap().as_name().unwrap(),
        b"Identity-H"
    );

    let descendants = type0.get(b"DescendantFonts").unwrap().as_array().unwrap();
    let cid_font = written
        .get_dictionary(descendants[0].as_reference().unwrap())
        .unwrap();
    assert_eq!(
        cid_font.get(b"Subtype").unwrap().as_name().unwrap(),
        b"CIDFontType2"
    );
    // "- 1 -" and "- 2 -" use four glyphs: '-', ' ', '1' and '2'
    assert_eq!(cid_font.get(b"W").unwrap().as_array().unwrap().len(), 8);

    let to_unicode = type0.get(b"ToUnicode").unwrap().as_reference().unwrap();
    let cmap_stream = written.get_object(to_unicode).unwrap().as_stream().unwrap();
    let cmap = cmap_stream
        .decompressed_content()
        .unwrap_or_else(|_| cmap_stream.content.clone());
    let cmap = String::from_utf8(cmap).unwrap();
    assert!(cmap.contains("4 beginbfchar"), "{cmap}");
    for code in ["<002D>", "<0020>", "<0031>", "<0032>"] {
        assert!(cmap.contains(code), "{code} missing from {cmap}");
    }

    // Both pages share the one installed font
    let second = page_font(&written, pages[1], "FAgenda").unwrap();
    assert_eq!(second, type0);
}

#[tokio::test]
async fn test_embedded_font_without_japanese_glyphs_rejects_labels() {
    let temp_dir = TempDir::new().unwrap();
    let motion = write_pdf(&temp_dir, "motion.pdf", 1, A4);

    let mut config = quiet_config(
        vec![DocumentInput::labeled(
            &motion,
            DocumentLabel::auto(LabelKind::Agenda),
        )],
        &temp_dir.path().join("out.pdf"),
    );
    config.font = FontSource::File(fixture_path("Montserrat-Regular.ttf"));

    let err = merge_pdfs(&config).await.unwrap_err();
    assert!(matches!(err, PdfAgendaError::FontUnavailable { .. }));
    assert!(err.to_string().contains("no glyph for '第'"), "{err}");
}
