use crate::locales::LocaleTable;
use crate::models::{Book, Books, Highlight};
use crate::parser::{parse_entry, ClippingEntry, EntryError, ParseError};
use std::collections::HashMap;
use tracing::{debug, info};

/// Groups entries into books keyed by the exact `(title, author)` pair.
///
/// Books come out in order of first sighting and keep their highlights in
/// input order. No normalization is applied to the key.
pub fn aggregate<I>(entries: I) -> Books
where
    I: IntoIterator<Item = ClippingEntry>,
{
    let mut books: Vec<Book> = Vec::new();
    let mut positions: HashMap<(String, String), usize> = HashMap::new();

    for entry in entries {
        let key = (entry.book_title.clone(), entry.book_author.clone());

        let pos = *positions.entry(key).or_insert_with(|| {
            books.push(Book {
                title: entry.book_title.clone(),
                author: entry.book_author.clone(),
                filename: entry.filename.clone(),
                first_highlight_date: entry.date,
                last_highlight_date: entry.date,
                highlights: Vec::new(),
            });
            books.len() - 1
        });

        let book = &mut books[pos];
        book.last_highlight_date = entry.date;
        book.highlights.push(Highlight {
            date: entry.date,
            text: entry.text,
        });
    }

    Books(books)
}

/// Parses every raw entry and aggregates the result.
///
/// Skipped entries are dropped; the first aborting entry fails the whole run.
pub fn parse_clippings(raw_entries: &[String], locales: &LocaleTable) -> Result<Books, ParseError> {
    let mut entries = Vec::with_capacity(raw_entries.len());
    let mut skipped = 0;

    for raw in raw_entries {
        match parse_entry(raw, locales) {
            Ok(entry) => entries.push(entry),
            Err(EntryError::Skip(reason)) => {
                skipped += 1;
                debug!(%reason, "skipping clippings entry");
            }
            Err(EntryError::Abort(e)) => return Err(e.into()),
        }
    }

    let books = aggregate(entries);
    info!(books = books.len(), skipped, "parsed clippings");

    Ok(books)
}
