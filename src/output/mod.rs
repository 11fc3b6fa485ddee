//! Output formatting and display for pdfagenda.
//!
//! This module handles all user-facing output including:
//! - Formatted status messages
//! - The merge plan preview
//! - Summary reports
//! - Quiet and verbose modes
//!
//! # Examples
//!
//! ```no_run
//! use pdfagenda::output::OutputFormatter;
//! use pdfagenda::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Starting merge operation");
//! formatter.success("Merge completed successfully");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::annotate::MergePlan;
use crate::io::WriteStatistics;
use crate::merge::{MergePreview, MergeStatistics};
use crate::utils::format_file_size;
use std::path::Path;

/// One line per input: its page span in the output and its label.
pub fn document_lines(files: &[impl AsRef<Path>], plan: &MergePlan) -> Vec<String> {
    files
        .iter()
        .enumerate()
        .map(|(index, file)| {
            let span = match plan.document_span(index) {
                Some((first, last)) if first == last => format!("page {first}"),
                Some((first, last)) => format!("pages {first}-{last}"),
                None => "no pages".to_string(),
            };
            let label = plan
                .pages
                .iter()
                .filter(|page| page.document_index == index)
                .find_map(|page| page.label());

            match label {
                Some(label) => format!("{} ({span}) [{label}]", file.as_ref().display()),
                None => format!("{} ({span})", file.as_ref().display()),
            }
        })
        .collect()
}

/// Which output pages carry which printed numbers.
pub fn numbering_summary(plan: &MergePlan) -> String {
    let mut numbered = plan
        .pages
        .iter()
        .filter_map(|page| Some((page.absolute_page, page.page_number()?)));

    let Some(first) = numbered.next() else {
        return "Page numbers: none".to_string();
    };
    let last = numbered.last().unwrap_or(first);

    if first.0 == last.0 {
        format!("Page numbers: page {} prints \"{}\"", first.0, first.1)
    } else {
        format!(
            "Page numbers: pages {}-{} print \"{}\" to \"{}\"",
            first.0, last.0, first.1, last.1
        )
    }
}

/// Display the merge plan to the user.
pub fn display_plan(formatter: &OutputFormatter, files: &[impl AsRef<Path>], plan: &MergePlan) {
    formatter.section("Merge plan:");
    for (index, line) in document_lines(files, plan).iter().enumerate() {
        formatter.list_item(index + 1, line);
    }
    formatter.blank_line();
    formatter.info(&format!("  {}", numbering_summary(plan)));
    formatter.info(&format!("  Labels: {} page(s)", plan.labeled_pages()));
    formatter.info(&format!(
        "  Total pages in merged document: {}",
        plan.total_pages()
    ));
}

/// Display a dry-run preview.
pub fn display_preview(formatter: &OutputFormatter, preview: &MergePreview) {
    display_plan(formatter, &preview.files, &preview.plan);
    formatter.detail("Font", &preview.font);
    formatter.detail("Input size", &format_file_size(preview.input_size));
}

/// Display merge statistics to the user.
pub fn display_merge_statistics(formatter: &OutputFormatter, stats: &MergeStatistics) {
    formatter.success(&format!(
        "Merged {} file(s): {} pages, {} numbered, {} labeled",
        stats.files_merged, stats.total_pages, stats.pages_numbered, stats.pages_labeled
    ));
    formatter.detail("Input size", &stats.format_input_size());
    formatter.detail("Font", &stats.font);
    formatter.detail(
        "Read time",
        &format!("{:.2}s", stats.load_time.as_secs_f64()),
    );
    formatter.detail(
        "Merge time",
        &format!("{:.2}s", stats.merge_time.as_secs_f64()),
    );
    formatter.detail("Compressed", if stats.compressed { "yes" } else { "no" });
}

/// Display write statistics to the user.
pub fn display_write_statistics(formatter: &OutputFormatter, stats: &WriteStatistics) {
    formatter.success(&format!(
        "Wrote {} ({})",
        stats.output_path.display(),
        stats.format_file_size()
    ));
    formatter.detail(
        "Write time",
        &format!("{:.2}s", stats.write_time.as_secs_f64()),
    );
}
