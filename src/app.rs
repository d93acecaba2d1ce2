use crate::aggregate::parse_clippings;
use crate::config::Config;
use crate::error::AppError;
use crate::export::{load_template, read_existing_export, write_books, ExportSummary};
use crate::locales::load_locales;
use crate::parser::read_raw_clippings;
use crate::prompt;
use std::io::{BufRead, Write};
use tracing::{info, warn};

/// Runs the whole export: parse, ask which books, then create or append files.
///
/// Fails fast; files written before an error are left in place.
pub fn run<R: BufRead, W: Write>(
    config: &Config,
    input: &mut R,
    output: &mut W,
) -> Result<ExportSummary, AppError> {
    if !config.input_path.exists() {
        return Err(AppError::MissingInput(config.input_path.clone()));
    }

    let locales = load_locales(&config.languages_dir)?;
    if locales.is_empty() {
        warn!(dir = %config.languages_dir.display(), "no locale files found, every dated entry will be rejected");
    }
    let template = load_template(config.template_path.as_deref())?;

    let raw_entries = read_raw_clippings(&config.input_path)?;
    let books = parse_clippings(&raw_entries, &locales)?;

    if books.is_empty() {
        info!(input = %config.input_path.display(), "no highlights found");
        return Ok(ExportSummary::default());
    }

    let selection = prompt::run(&books, input, output)?;
    let requested = books.filter_by_selection(&selection);

    let existing = read_existing_export(&config.output_dir)?;
    let summary = write_books(&config.output_dir, &requested, &existing, &template)?;

    info!(
        created = summary.created,
        appended = summary.appended,
        skipped = summary.skipped,
        "export finished"
    );

    Ok(summary)
}
