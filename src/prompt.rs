use crate::models::{Books, Selection};
use std::collections::HashSet;
use std::io::{BufRead, Write};
use thiserror::Error;

const PROMPT_LABEL: &str = "Input one or more numbers, separated by a space (0 for all): ";

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("Empty selection")]
    Empty,
    #[error("Not a number: '{0}'")]
    NotANumber(String),
    #[error("Value out of range: {value} (expected 1..={max})")]
    OutOfRange { value: usize, max: usize },
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Prompt closed before a selection was made")]
    Closed,
}

/// `[1] Title - Author`, one line per book.
pub fn list_books(books: &Books) -> String {
    books
        .iter()
        .enumerate()
        .map(|(i, book)| format!("[{}] {} - {}\n", i + 1, book.title, book.author))
        .collect()
}

/// Accepts `0` for every book, or 1-based positions separated by spaces.
///
/// Repeated positions are kept once, at their first occurrence.
pub fn validate_selection(input: &str, book_count: usize) -> Result<Selection, SelectionError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();

    match tokens.as_slice() {
        [] => return Err(SelectionError::Empty),
        ["0"] => return Ok(Selection::All),
        _ => {}
    }

    let mut seen = HashSet::new();
    tokens
        .iter()
        .map(|token| {
            let value: usize = token
                .parse()
                .map_err(|_| SelectionError::NotANumber(token.to_string()))?;
            if value == 0 || value > book_count {
                return Err(SelectionError::OutOfRange {
                    value,
                    max: book_count,
                });
            }
            Ok(value - 1)
        })
        .filter(|idx| idx.as_ref().map_or(true, |i| seen.insert(*i)))
        .collect::<Result<Vec<_>, _>>()
        .map(Selection::Indices)
}

/// Lists the books and asks until the answer validates.
pub fn run<R: BufRead, W: Write>(
    books: &Books,
    input: &mut R,
    output: &mut W,
) -> Result<Selection, PromptError> {
    writeln!(output, "{}", list_books(books))?;

    loop {
        write!(output, "{}", PROMPT_LABEL)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed);
        }

        match validate_selection(&line, books.len()) {
            Ok(selection) => {
                writeln!(output, "Selected value: {}", line.trim())?;
                return Ok(selection);
            }
            Err(e) => writeln!(output, "{}", e)?,
        }
    }
}
