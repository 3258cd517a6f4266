//! CLI module for docvoice
//!
//! Subcommands:
//! - `parse`: parse a document and print its structure
//! - `stream`: print structure chunks as JSON lines
//! - `build`: build a structure from an extractor's token handoff
//! - `presets`: list the bundled parser presets

pub mod build;
pub mod parse;
pub mod presets;
pub mod stream;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::domain::parsing::{
    ConfigPreset, DocumentStructureParser, ErrorHandlingStrategy, ParserInput, SourceFormat,
};
use crate::infrastructure::logging;
use crate::infrastructure::parsing::ParserFactory;

/// docvoice - document structure parser for text-to-speech
#[derive(Parser)]
#[command(name = "docvoice")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse a document and print its structure
    Parse(parse::ParseArgs),

    /// Stream structure chunks as JSON lines
    Stream(stream::StreamArgs),

    /// Build a structure from extracted tokens (JSON)
    Build(build::BuildArgs),

    /// List the bundled parser presets
    Presets(presets::PresetsArgs),
}

/// Options shared by commands that run the parser
#[derive(Args, Clone, Debug, Default)]
pub struct ParserArgs {
    /// Configuration file layered over config/default and config/local
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Start from a bundled preset instead of the configured parser settings
    #[arg(long)]
    pub preset: Option<ConfigPreset>,

    /// Error handling strategy (strict, lenient, recover)
    #[arg(long)]
    pub strategy: Option<ErrorHandlingStrategy>,

    /// Heading depths that open a chapter, comma separated
    #[arg(long, value_delimiter = ',')]
    pub chapter_levels: Option<Vec<u8>>,
}

impl ParserArgs {
    /// Load the application config and apply the command line overrides
    pub fn resolve(&self) -> anyhow::Result<AppConfig> {
        dotenvy::dotenv().ok();

        let mut config = AppConfig::load_from(self.config.as_deref())
            .context("Failed to load configuration")?;

        if let Some(preset) = self.preset {
            config.parser = preset.config();
        }
        if let Some(strategy) = self.strategy {
            config.parser.error_handling_strategy = strategy;
        }
        if let Some(levels) = &self.chapter_levels {
            config.parser.chapter_header_levels = levels.clone();
        }

        Ok(config)
    }
}

/// Install logging, then build a parser and read the input file
pub(crate) async fn prepare(
    config: AppConfig,
    file: &Path,
) -> anyhow::Result<(Arc<dyn DocumentStructureParser>, ParserInput)> {
    logging::init_logging(&config.logging);

    let filename = file.to_string_lossy().into_owned();
    let format = ParserFactory::detect_from_filename(&filename).unwrap_or(SourceFormat::PlainText);
    let parser = ParserFactory::create(format, config.parser)?;

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    Ok((parser, ParserInput::named(filename, bytes)))
}
