//! pdfagenda - Merge meeting materials into one annotated PDF.
//!
//! A CLI tool that concatenates PDFs and stamps page numbers and agenda labels.

use clap::Parser;
use std::process;

use pdfagenda::cli::Cli;
use pdfagenda::config::{CompressionLevel, Config, OverwriteMode};
use pdfagenda::error::PdfAgendaError;
use pdfagenda::io::{PdfWriter, WriteOptions};
use pdfagenda::merge::Merger;
use pdfagenda::output::{
    OutputFormatter, display_merge_statistics, display_plan, display_preview,
    display_write_statistics,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), PdfAgendaError> {
    cli.validate()?;
    let config = cli.to_config().await?;

    let formatter = OutputFormatter::from_config(&config);

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfagenda::NAME, pdfagenda::VERSION));
        formatter.blank_line();
    }

    formatter.info(&format!("Reading {} document(s)...", config.documents.len()));
    let merger = Merger::new();

    if config.dry_run {
        let preview = merger.preview(&config).await?;
        display_preview(&formatter, &preview);

        formatter.blank_line();
        formatter.success("Dry run completed successfully");
        formatter.info(&format!("  Output would be: {}", config.output.display()));
        formatter.info("  Run without --dry-run to create the merged PDF");
        return Ok(());
    }

    let writer = PdfWriter::with_options(WriteOptions {
        compress: config.compression != CompressionLevel::None,
        ..Default::default()
    });
    writer.can_write(&config.output).await?;
    handle_output_overwrite(&config, &formatter, &writer).await?;

    let result = merger.merge(&config).await?;

    if formatter.is_verbose() {
        display_plan(&formatter, &result.merged_files, &result.plan);
        formatter.blank_line();
    }
    display_merge_statistics(&formatter, &result.statistics);

    formatter.info(&format!("Writing to: {}", config.output.display()));
    let write_stats = writer
        .save_with_stats(&result.document, &config.output)
        .await?;

    formatter.blank_line();
    display_write_statistics(&formatter, &write_stats);

    if formatter.is_verbose() && !config.metadata.is_empty() {
        formatter.detail("Metadata", "Set");
    }

    Ok(())
}

/// Handle output file overwrite scenarios.
async fn handle_output_overwrite(
    config: &Config,
    formatter: &OutputFormatter,
    writer: &PdfWriter,
) -> Result<(), PdfAgendaError> {
    if !writer.exists(&config.output).await {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(PdfAgendaError::output_exists(config.output.clone())),
        OverwriteMode::Prompt => {
            // No one to ask in quiet mode
            if formatter.is_quiet() {
                return Err(PdfAgendaError::output_exists(config.output.clone()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| PdfAgendaError::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(())
            } else {
                Err(PdfAgendaError::Cancelled)
            }
        }
    }
}
