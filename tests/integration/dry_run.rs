//! Integration tests for dry run mode.

use clap::Parser;
use pdfagenda::annotate::label::{DocumentLabel, LabelKind};
use pdfagenda::cli::Cli;
use pdfagenda::config::DocumentInput;
use pdfagenda::merge::Merger;
use pdfagenda::output::document_lines;
use tempfile::TempDir;

use crate::common::{A4, quiet_config, write_pdf};

#[tokio::test]
async fn test_preview_does_not_create_output() {
    let temp_dir = TempDir::new().unwrap();
    let cover = write_pdf(&temp_dir, "cover.pdf", 2, A4);
    let rules = write_pdf(&temp_dir, "rules.pdf", 3, A4);
    let output = temp_dir.path().join("merged.pdf");

    let mut config = quiet_config(
        vec![
            DocumentInput::new(&cover),
            DocumentInput::labeled(&rules, DocumentLabel::new(LabelKind::Reference, 4)),
        ],
        &output,
    );
    config.dry_run = true;

    let preview = Merger::new().preview(&config).await.unwrap();
    assert_eq!(preview.page_counts, vec![2, 3]);
    assert_eq!(preview.plan.total_pages(), 5);
    assert_eq!(preview.plan.labeled_pages(), 3);
    assert!(!output.exists(), "Dry run should not create output");

    let lines = document_lines(&["cover.pdf", "rules.pdf"], &preview.plan);
    assert_eq!(lines[1], "rules.pdf (pages 3-5) [参考資料4]");
}

#[tokio::test]
async fn test_cli_dry_run_flag_reaches_preview() {
    let temp_dir = TempDir::new().unwrap();
    let agenda = write_pdf(&temp_dir, "agenda.pdf", 1, A4);
    let output = temp_dir.path().join("merged.pdf");

    let cli = Cli::parse_from([
        "pdfagenda".to_string(),
        "--dry-run".to_string(),
        "--quiet".to_string(),
        "-o".to_string(),
        output.display().to_string(),
        format!("agenda@{}", agenda.display()),
    ]);
    let config = cli.to_config().await.unwrap();
    assert!(config.dry_run);
    assert!(config.should_print());

    let preview = Merger::new().preview(&config).await.unwrap();
    assert_eq!(preview.plan.pages[0].label(), Some("第1号議案"));
    assert_eq!(preview.plan.pages[0].page_number(), Some("1"));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_preview_fails_like_merge_on_missing_input() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = quiet_config(
        vec![DocumentInput::new(temp_dir.path().join("missing.pdf"))],
        &temp_dir.path().join("merged.pdf"),
    );
    config.dry_run = true;

    assert!(Merger::new().preview(&config).await.is_err());
    assert!(Merger::new().merge(&config).await.is_err());
}
