//! Integration tests for error handling and edge cases.

use clap::Parser;
use pdfagenda::cli::Cli;
use pdfagenda::config::DocumentInput;
use pdfagenda::error::PdfAgendaError;
use pdfagenda::merge::merge_pdfs;
use pdfagenda::render::FontSource;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::{A4, quiet_config, write_pdf};

#[tokio::test]
async fn test_error_nonexistent_input() {
    let temp_dir = TempDir::new().unwrap();
    let config = quiet_config(
        vec![DocumentInput::new("/nonexistent/file.pdf")],
        &temp_dir.path().join("out.pdf"),
    );

    let err = merge_pdfs(&config).await.unwrap_err();
    assert!(matches!(err, PdfAgendaError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_error_directory_input() {
    let temp_dir = TempDir::new().unwrap();
    let config = quiet_config(
        vec![DocumentInput::new(temp_dir.path())],
        &temp_dir.path().join("out.pdf"),
    );

    let err = merge_pdfs(&config).await.unwrap_err();
    assert!(matches!(err, PdfAgendaError::NotAFile { .. }));
}

#[tokio::test]
async fn test_error_corrupt_pdf_names_position() {
    let temp_dir = TempDir::new().unwrap();
    let good = write_pdf(&temp_dir, "good.pdf", 1, A4);
    let corrupt = temp_dir.path().join("corrupt.pdf");
    std::fs::write(&corrupt, b"not a pdf at all").unwrap();

    let config = quiet_config(
        vec![
            DocumentInput::new(&good),
            DocumentInput::new(&good),
            DocumentInput::new(&corrupt),
        ],
        &temp_dir.path().join("out.pdf"),
    );

    let err = merge_pdfs(&config).await.unwrap_err();
    match &err {
        PdfAgendaError::UnreadableDocument { index, name, .. } => {
            assert_eq!(*index, 2);
            assert!(name.ends_with("corrupt.pdf"));
        }
        other => panic!("expected UnreadableDocument, got {other:?}"),
    }
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("#3"));
}

#[tokio::test]
async fn test_error_unusable_font_file() {
    let temp_dir = TempDir::new().unwrap();
    let good = write_pdf(&temp_dir, "good.pdf", 1, A4);
    let font = temp_dir.path().join("broken.ttf");
    std::fs::write(&font, b"definitely not a font").unwrap();

    let mut config = quiet_config(vec![DocumentInput::new(&good)], &temp_dir.path().join("o.pdf"));
    config.font = FontSource::File(font);

    let err = merge_pdfs(&config).await.unwrap_err();
    assert!(matches!(err, PdfAgendaError::FontUnavailable { .. }));
}

#[tokio::test]
async fn test_error_glob_without_matches() {
    let temp_dir = TempDir::new().unwrap();
    let pattern = format!("{}/*.pdf", temp_dir.path().display());

    let cli = Cli::parse_from(["pdfagenda", pattern.as_str()]);
    let err = cli.to_config().await.unwrap_err();
    assert!(matches!(err, PdfAgendaError::InvalidInputSpec { .. }));
}

#[tokio::test]
async fn test_error_invalid_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let manifest = temp_dir.path().join("soukai.json");
    std::fs::write(&manifest, r#"{ "documents": [ { "path": "a.pdf", "label": { "kind": "minutes" } } ] }"#)
        .unwrap();

    let cli = Cli::parse_from([
        "pdfagenda".to_string(),
        "--manifest".to_string(),
        manifest.display().to_string(),
    ]);
    let err = cli.to_config().await.unwrap_err();
    assert!(matches!(err, PdfAgendaError::InvalidManifest { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_error_output_matches_input() {
    let config = quiet_config(
        vec![DocumentInput::new("agenda.pdf")],
        &PathBuf::from("agenda.pdf"),
    );
    assert!(config.validate().is_err());
}
