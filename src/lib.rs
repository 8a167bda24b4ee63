pub mod cli;
pub mod columns;
pub mod condition;
pub mod data;
pub mod error;
pub mod frame;
pub mod io_utils;
pub mod manifest;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod project;
pub mod recode;
pub mod scale;
pub mod summary;
pub mod table;

use std::{env, io::Write, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands},
    manifest::Manifest,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("survey_prep", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => pipeline::execute(&args),
        Commands::Summary(args) => summary::execute(&args),
        Commands::Manifest(args) => handle_manifest(&args),
        Commands::Columns(args) => columns::execute(&args),
    }
}

fn handle_manifest(args: &cli::ManifestArgs) -> Result<()> {
    let manifest = Manifest::builtin();
    match &args.output {
        Some(path) => {
            manifest
                .save(path)
                .with_context(|| format!("Writing manifest to {path:?}"))?;
            info!(
                "Manifest with {} block(s) and {} item(s) written to {:?}",
                manifest.blocks.len(),
                manifest.items.len(),
                path
            );
        }
        None => {
            let yaml = manifest.to_yaml()?;
            std::io::stdout()
                .write_all(yaml.as_bytes())
                .context("Writing manifest to stdout")?;
        }
    }
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
