//! Small helpers shared by the CLI and the library.

use crate::config::DocumentInput;
use crate::error::{PdfAgendaError, Result};
use std::path::PathBuf;

/// Expand glob patterns in input paths, keeping argument order.
///
/// A path without glob metacharacters, or one naming an existing file, is
/// passed through untouched so that a missing file surfaces later as
/// [`PdfAgendaError::FileNotFound`] and `資料[1].pdf` stays literal. A pattern
/// expands to its matches in lexical order; every match inherits the
/// pattern's label.
///
/// # Errors
///
/// Returns an error if a pattern is malformed or matches nothing.
pub fn expand_document_globs<T>(inputs: T) -> Result<Vec<DocumentInput>>
where
    T: IntoIterator<Item = DocumentInput>,
{
    let mut expanded = Vec::new();

    for input in inputs {
        let pattern = input.path.to_string_lossy().into_owned();
        if !is_glob_pattern(&pattern) || input.path.is_file() {
            expanded.push(input);
            continue;
        }

        let matches = collect_paths_for_pattern(&pattern)?;
        if matches.is_empty() {
            return Err(PdfAgendaError::invalid_input_spec(
                pattern,
                "pattern matched no files",
            ));
        }

        expanded.extend(
            matches
                .into_iter()
                .map(|path| DocumentInput::labeled(path, input.label)),
        );
    }

    Ok(expanded)
}

fn is_glob_pattern(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern)
        .map_err(|err| PdfAgendaError::invalid_input_spec(pattern, err.to_string()))?;

    let mut resolved_paths = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| PdfAgendaError::other(err.to_string()))?;
        if path.is_file() {
            resolved_paths.push(path);
        }
    }

    Ok(resolved_paths)
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
