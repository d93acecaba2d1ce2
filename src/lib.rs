pub mod aggregate;
pub mod app;
pub mod config;
pub mod date;
pub mod error;
pub mod export;
pub mod hash;
pub mod locales;
pub mod models;
pub mod parser;
pub mod prompt;
