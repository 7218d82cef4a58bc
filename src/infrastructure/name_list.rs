// Dashboard name list - newline separated names read from a file
use anyhow::{Context, Result};
use std::path::Path;

pub fn load_names(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dashboard names from {}", path.display()))?;
    Ok(parse_names(&contents))
}

/// One name per line; surrounding whitespace is dropped and blank lines skipped.
pub fn parse_names(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// File name without directory or extension, used to name the status report.
pub fn input_base_name(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
