use clap::Parser;
use std::path::PathBuf;

const DEFAULT_INPUT_PATH: &str = "My Clippings.txt";
const DEFAULT_OUTPUT_DIR: &str = "./highlights";
const DEFAULT_LANGUAGES_DIR: &str = "languages";

#[derive(Parser, Debug)]
#[command(name = "kindle-highlights")]
#[command(about = "Convert Kindle clippings into per-book Markdown notes")]
pub struct CliArgs {
    /// Path to My Clippings.txt
    #[arg(short, long)]
    pub input: Option<String>,

    /// Output directory for the Markdown notes
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub languages_dir: PathBuf,
    pub template_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        let cli = CliArgs::parse();
        Self::from_args(cli, |key| std::env::var(key).ok())
    }

    fn from_args<F>(cli: CliArgs, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let input_path = cli
            .input
            .or_else(|| env("KINDLE_INPUT"))
            .unwrap_or_else(|| DEFAULT_INPUT_PATH.to_string());

        let output_dir = cli
            .output
            .or_else(|| env("HIGHLIGHTS_OUTPUT"))
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());

        let languages_dir =
            env("KINDLE_LANGUAGES_DIR").unwrap_or_else(|| DEFAULT_LANGUAGES_DIR.to_string());

        Config {
            input_path: PathBuf::from(input_path),
            output_dir: PathBuf::from(output_dir),
            languages_dir: PathBuf::from(languages_dir),
            template_path: env("HIGHLIGHTS_TEMPLATE").map(PathBuf::from),
        }
    }
}
