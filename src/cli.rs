use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::pipeline::{DEFAULT_FILTERED_OUTPUT, DEFAULT_FULL_OUTPUT};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Prepare SDO campaign survey exports for analysis",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Recode, classify and merge a survey export into the full and filtered tables
    Run(RunArgs),
    /// Print value counts for the condition and merged columns without writing tables
    Summary(SummaryArgs),
    /// Write the built-in manifest as YAML
    Manifest(ManifestArgs),
    /// List the output columns declared by a manifest
    Columns(ColumnsArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Survey export to read (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Destination of the table with every column
    #[arg(long = "full-output", default_value = DEFAULT_FULL_OUTPUT)]
    pub full_output: PathBuf,
    /// Destination of the table without per-block columns
    #[arg(long = "filtered-output", default_value = DEFAULT_FILTERED_OUTPUT)]
    pub filtered_output: PathBuf,
    /// Manifest YAML overriding the built-in column layout
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,
    /// CSV delimiter character for reading input
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Delimiter to use for output (defaults to the input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Print the condition distribution after writing
    #[arg(long)]
    pub summary: bool,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Survey export to read (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Manifest YAML overriding the built-in column layout
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Emit the summary as JSON instead of a table
    #[arg(long)]
    pub json: bool,
    /// Maximum distinct values to display per column (0 = all)
    #[arg(long, default_value_t = 0)]
    pub top: usize,
}

#[derive(Debug, Args)]
pub struct ManifestArgs {
    /// Destination YAML file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    /// Manifest YAML overriding the built-in column layout
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,
    /// Only list the filtered table's columns
    #[arg(long)]
    pub filtered: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_single_chars() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("semicolon"), Ok(b';'));
        assert_eq!(parse_delimiter(":"), Ok(b':'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn run_defaults_to_campaign_output_names() {
        let cli = Cli::try_parse_from(["survey-prep", "run", "-i", "export.csv"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.full_output, PathBuf::from(DEFAULT_FULL_OUTPUT));
        assert_eq!(args.filtered_output, PathBuf::from(DEFAULT_FILTERED_OUTPUT));
        assert!(!args.summary);
    }
}
