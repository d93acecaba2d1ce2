use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    /// `None` when the export's date text could not be parsed.
    pub date: Option<NaiveDateTime>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub filename: String,
    pub first_highlight_date: Option<NaiveDateTime>,
    pub last_highlight_date: Option<NaiveDateTime>,
    pub highlights: Vec<Highlight>,
}

/// Which books the user asked to export.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    All,
    /// 0-based positions, in the order they were given.
    Indices(Vec<usize>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Books(pub Vec<Book>);

impl Books {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Book> {
        self.0.iter()
    }

    pub fn filter_by_selection(&self, selection: &Selection) -> Books {
        match selection {
            Selection::All => self.clone(),
            Selection::Indices(indices) => {
                let mut seen = HashSet::new();
                Books(
                    indices
                        .iter()
                        .filter(|&&idx| seen.insert(idx))
                        .filter_map(|&idx| self.0.get(idx).cloned())
                        .collect(),
                )
            }
        }
    }
}

/// One locale's phrase that precedes the date in a metadata line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocalePhrase {
    #[serde(skip)]
    pub language_tag: String,
    #[serde(rename = "added_on", default)]
    pub added_on_phrase: String,
}
