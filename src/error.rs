use crate::export::ExportError;
use crate::locales::LocaleError;
use crate::parser::ParseError;
use crate::prompt::PromptError;
use std::path::PathBuf;
use thiserror::Error;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PROCESSING_ERROR: i32 = 1;
pub const EXIT_BAD_INPUT: i32 = 2;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Input file does not exist: {0}")]
    MissingInput(PathBuf),
    #[error("Error loading locale table: {0}")]
    Locale(#[from] LocaleError),
    #[error("Error processing kindle clippings from input file: {0}")]
    Parse(#[from] ParseError),
    #[error("Error prompting user for books: {0}")]
    Prompt(#[from] PromptError),
    #[error("Error writing books to output directory: {0}")]
    Export(#[from] ExportError),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::MissingInput(_) | AppError::Locale(_) | AppError::Parse(_) => EXIT_BAD_INPUT,
            AppError::Prompt(_) | AppError::Export(_) => EXIT_PROCESSING_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::MetadataError;

    #[test]
    fn test_exit_codes() {
        let missing = AppError::MissingInput(PathBuf::from("My Clippings.txt"));
        let corrupt = AppError::from(ParseError::Entry(MetadataError::MalformedMetadata(
            "x".to_string(),
        )));
        let closed = AppError::from(PromptError::Closed);

        assert_eq!(missing.exit_code(), EXIT_BAD_INPUT);
        assert_eq!(corrupt.exit_code(), EXIT_BAD_INPUT);
        assert_eq!(closed.exit_code(), EXIT_PROCESSING_ERROR);
    }

    #[test]
    fn test_message_names_the_path() {
        let missing = AppError::MissingInput(PathBuf::from("My Clippings.txt"));

        assert_eq!(missing.to_string(), "Input file does not exist: My Clippings.txt");
    }
}
