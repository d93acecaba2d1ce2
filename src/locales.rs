use crate::models::LocalePhrase;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum LocaleError {
    #[error("Failed to list locale directory {path}: {source}")]
    ListFailed {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("Failed to read locale file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid locale JSON in {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Locale file {0} is missing required field added_on")]
    MissingAddedOn(PathBuf),
}

/// Read-only phrase table, ordered by language tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleTable {
    phrases: Vec<LocalePhrase>,
}

impl LocaleTable {
    pub fn new(mut phrases: Vec<LocalePhrase>) -> Self {
        phrases.sort_by(|a, b| a.language_tag.cmp(&b.language_tag));
        LocaleTable { phrases }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LocalePhrase> {
        self.phrases.iter()
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// First phrase contained in `text`, in table order.
    pub fn find_in(&self, text: &str) -> Option<&LocalePhrase> {
        self.phrases
            .iter()
            .find(|p| text.contains(p.added_on_phrase.as_str()))
    }
}

/// Loads every `*.json` file directly inside `dir`; the file stem is the language tag.
pub fn load_locales(dir: &Path) -> Result<LocaleTable, LocaleError> {
    let mut phrases = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| LocaleError::ListFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();

        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|e| LocaleError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut phrase = parse_locale(&content, path)?;
        phrase.language_tag = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        debug!(language = %phrase.language_tag, phrase = %phrase.added_on_phrase, "loaded locale");
        phrases.push(phrase);
    }

    Ok(LocaleTable::new(phrases))
}

fn parse_locale(content: &str, path: &Path) -> Result<LocalePhrase, LocaleError> {
    let phrase: LocalePhrase =
        serde_json::from_str(content).map_err(|e| LocaleError::InvalidJson {
            path: path.to_path_buf(),
            source: e,
        })?;

    if phrase.added_on_phrase.is_empty() {
        return Err(LocaleError::MissingAddedOn(path.to_path_buf()));
    }

    Ok(phrase)
}
