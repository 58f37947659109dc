//! Utility functions for versedex
//!
//! This module provides common utility functions used throughout the project.

use crate::error::{Result, VersedexError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Opening marker wrapped around highlighted spans
pub const HIGHLIGHT_PRE_TAG: &str = "<strong>";

/// Closing marker wrapped around highlighted spans
pub const HIGHLIGHT_POST_TAG: &str = "</strong>";

fn highlight_regex() -> &'static Regex {
    static HIGHLIGHT: OnceLock<Regex> = OnceLock::new();
    HIGHLIGHT.get_or_init(|| {
        Regex::new(r"<strong>(.*?)</strong>").expect("highlight pattern is valid")
    })
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = std::env::var_os("HOME") {
            let rest = rest.trim_start_matches(['/', '\\']);
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

/// Format file size in human readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Calculate progress percentage
pub fn calculate_progress(current: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        (current as f32 / total as f32) * 100.0
    }
}

/// Number of chunks of at most `chunk_size` needed for `total` items
pub fn chunk_count(total: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        0
    } else {
        total.div_ceil(chunk_size)
    }
}

/// Create directory if it doesn't exist
pub fn ensure_directory<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path).map_err(VersedexError::Io)?;
    }

    Ok(())
}

/// Replace highlight markers with ANSI bold for terminal output
pub fn highlight_to_ansi(text: &str) -> String {
    highlight_regex()
        .replace_all(text, "\x1b[1m$1\x1b[0m")
        .into_owned()
}

/// Remove highlight markers, keeping the highlighted words
pub fn strip_highlight(text: &str) -> String {
    highlight_regex().replace_all(text, "$1").into_owned()
}

/// Words wrapped in highlight markers, in order of appearance
pub fn highlighted_terms(text: &str) -> Vec<String> {
    highlight_regex()
        .captures_iter(text)
        .map(|cap| cap[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_size_formatting() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1048576), "1.0 MB");
    }

    #[test]
    fn test_progress_calculation() {
        assert_eq!(calculate_progress(0, 100), 0.0);
        assert_eq!(calculate_progress(50, 100), 50.0);
        assert_eq!(calculate_progress(0, 0), 0.0); // Edge case
    }

    #[test]
    fn test_chunk_count() {
        assert_eq!(chunk_count(0, 50), 0);
        assert_eq!(chunk_count(50, 50), 1);
        assert_eq!(chunk_count(51, 50), 2);
        assert_eq!(chunk_count(31102, 50), 623);
        assert_eq!(chunk_count(10, 0), 0);
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path.sqlite"), PathBuf::from("/abs/path.sqlite"));

        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(
                expand_home("~/.local/share/openlp/bibles/RST.sqlite"),
                PathBuf::from(home).join(".local/share/openlp/bibles/RST.sqlite")
            );
        }
    }

    #[test]
    fn test_highlight_rendering() {
        let fragment = "In the <strong>beginning</strong> God created the <strong>heavens</strong>";
        assert_eq!(
            strip_highlight(fragment),
            "In the beginning God created the heavens"
        );
        assert_eq!(highlighted_terms(fragment), vec!["beginning", "heavens"]);
        assert_eq!(
            highlight_to_ansi("<strong>God</strong> said"),
            "\x1b[1mGod\x1b[0m said"
        );
    }

    #[test]
    fn test_ensure_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("data").join("out");
        ensure_directory(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
