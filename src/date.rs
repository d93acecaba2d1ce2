use crate::locales::LocaleTable;
use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::warn;

const METADATA_SEPARATOR: &str = " | ";

/// Connector particles in inflected Russian dates ("1 декабря 2013 г. в 19:49:48").
const CONNECTOR_WORDS: [&str; 2] = [" г. ", " в "];

const DATE_LAYOUTS: [&str; 3] = [
    "%A, %B %d, %Y %I:%M:%S %p",
    "%A, %B %d, %Y %H:%M:%S",
    "%A, %d %B %Y %H:%M:%S",
];

const RUSSIAN_NAMES: [(&str, &str); 31] = [
    ("понедельник", "Monday"),
    ("вторник", "Tuesday"),
    ("среда", "Wednesday"),
    ("четверг", "Thursday"),
    ("пятница", "Friday"),
    ("суббота", "Saturday"),
    ("воскресенье", "Sunday"),
    ("января", "January"),
    ("февраля", "February"),
    ("марта", "March"),
    ("апреля", "April"),
    ("мая", "May"),
    ("июня", "June"),
    ("июля", "July"),
    ("августа", "August"),
    ("сентября", "September"),
    ("октября", "October"),
    ("ноября", "November"),
    ("декабря", "December"),
    ("январь", "January"),
    ("февраль", "February"),
    ("март", "March"),
    ("апрель", "April"),
    ("май", "May"),
    ("июнь", "June"),
    ("июль", "July"),
    ("август", "August"),
    ("сентябрь", "September"),
    ("октябрь", "October"),
    ("ноябрь", "November"),
    ("декабрь", "December"),
];

#[derive(Debug, Error, PartialEq)]
pub enum MetadataError {
    #[error("Malformed metadata line: '{0}'")]
    MalformedMetadata(String),
    #[error("No known locale phrase found in '{0}'")]
    UnrecognizedLocale(String),
}

/// Parses the date out of a metadata line such as
/// `- Your Highlight Location 1293-1294 | Added on Sunday, December 1, 2013 7:49:48 PM`.
///
/// An unparseable date text yields `Ok(None)`; only a missing separator or
/// an unknown locale phrase is an error.
pub fn parse_metadata_date(
    meta_line: &str,
    locales: &LocaleTable,
) -> Result<Option<NaiveDateTime>, MetadataError> {
    let segments: Vec<&str> = meta_line.split(METADATA_SEPARATOR).collect();
    if segments.len() < 2 {
        return Err(MetadataError::MalformedMetadata(meta_line.to_string()));
    }

    let date_part = segments[segments.len() - 1].trim();

    let date_text = locales
        .find_in(date_part)
        .and_then(|phrase| date_part.split(phrase.added_on_phrase.as_str()).nth(1))
        .map(str::trim)
        .unwrap_or_default();

    if date_text.is_empty() {
        return Err(MetadataError::UnrecognizedLocale(date_part.to_string()));
    }

    let date_text = normalize_connectors(date_text);
    let parsed = parse_date_text(&date_text);

    if parsed.is_none() {
        warn!(date = %date_text, "unrecognized date format, highlight date left unknown");
    }

    Ok(parsed)
}

fn normalize_connectors(text: &str) -> String {
    CONNECTOR_WORDS
        .iter()
        .fold(text.to_string(), |acc, word| acc.replace(word, " "))
}

/// Tries every layout as-is, then again with Russian names translated.
pub fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    try_layouts(text).or_else(|| try_layouts(&translate_russian(text)))
}

fn try_layouts(text: &str) -> Option<NaiveDateTime> {
    DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
}

fn translate_russian(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let (stem, comma) = match word.strip_suffix(',') {
                Some(stem) => (stem, ","),
                None => (word, ""),
            };
            let lower = stem.to_lowercase();
            match RUSSIAN_NAMES.iter().find(|(ru, _)| *ru == lower) {
                Some((_, en)) => format!("{}{}", en, comma),
                None => word.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
