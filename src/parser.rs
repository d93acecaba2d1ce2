use crate::date::{parse_metadata_date, MetadataError};
use crate::locales::LocaleTable;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENTRY_SEPARATOR: &str = "==========";

const BOM: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read clippings file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse clippings entry: {0}")]
    Entry(#[from] MetadataError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    InvalidEntry,
    EmptyHighlight,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::InvalidEntry => write!(f, "invalid entry"),
            SkipReason::EmptyHighlight => write!(f, "empty highlight"),
        }
    }
}

/// Why an entry did not produce a highlight.
#[derive(Debug, Error, PartialEq)]
pub enum EntryError {
    /// Expected noise in an export; the run continues.
    #[error("skipped entry: {0}")]
    Skip(SkipReason),
    /// The export or the locale table is unusable; the run stops.
    #[error(transparent)]
    Abort(#[from] MetadataError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClippingEntry {
    pub book_title: String,
    pub book_author: String,
    pub filename: String,
    pub date: Option<NaiveDateTime>,
    pub text: String,
}

/// Reads the export, drops a leading byte-order mark and splits it into raw entries.
pub fn read_raw_clippings(path: &Path) -> Result<Vec<String>, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|e| ParseError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(split_entries(&content))
}

pub fn split_entries(content: &str) -> Vec<String> {
    let content = content.strip_prefix(BOM).unwrap_or(content);

    let mut entries = Vec::new();
    let mut current = String::new();

    // `lines` also drops the '\r' of CRLF exports
    for line in content.lines() {
        if line == ENTRY_SEPARATOR {
            entries.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    entries.push(current);

    entries
}

pub fn parse_entry(raw: &str, locales: &LocaleTable) -> Result<ClippingEntry, EntryError> {
    let lines: Vec<&str> = raw.trim().lines().collect();

    let non_blank = lines.iter().filter(|l| !l.trim().is_empty()).count();
    if non_blank < 3 {
        return Err(EntryError::Skip(SkipReason::InvalidEntry));
    }

    let book_info = lines[0].trim_start_matches(BOM);
    let (book_title, book_author) = split_book_info(book_info);

    let date = parse_metadata_date(lines[1], locales)?;

    // line 3 is the blank separator
    let text = lines[3.min(lines.len())..].join("\n").trim().to_string();

    if text.is_empty() {
        return Err(EntryError::Skip(SkipReason::EmptyHighlight));
    }

    Ok(ClippingEntry {
        filename: safe_filename(&book_title, &book_author),
        book_title,
        book_author,
        date,
        text,
    })
}

/// Splits `Title (Author)` on `(`; without one the whole line is both title and author.
fn split_book_info(line: &str) -> (String, String) {
    let mut parts = line.split('(');
    let first = parts.next().unwrap_or_default();

    match parts.next() {
        Some(second) => (
            first.trim().to_string(),
            second.trim().trim_end_matches(')').to_string(),
        ),
        None => (line.to_string(), line.to_string()),
    }
}

fn is_filename_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, ' ' | '-' | '_' | 'Ё' | 'ё' | 'А'..='я')
}

/// `<Title> - <Author>.md` with every character outside the allow-list dropped.
pub fn safe_filename(title: &str, author: &str) -> String {
    let name: String = format!("{} - {}", title.trim(), author.trim())
        .chars()
        .filter(|&c| is_filename_char(c))
        .collect();

    format!("{}.md", name)
}
