//! Build command - builds a structure from an extractor's token handoff

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Deserialize;
use tracing::info;

use crate::domain::document::{DocumentMetadata, DocumentStructure};
use crate::domain::parsing::Token;
use crate::infrastructure::logging;
use crate::infrastructure::parsing::StructurePipeline;

use super::ParserArgs;

/// Arguments for the build command
#[derive(Args, Clone, Debug)]
pub struct BuildArgs {
    /// JSON file with `raw`, `tokens` and optional `metadata`
    pub file: PathBuf,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub parser: ParserArgs,
}

/// Output of an EPUB/PDF extractor
#[derive(Debug, Deserialize)]
struct TokenHandoff {
    raw: String,
    tokens: Vec<Token>,
    /// Container metadata (OPF, PDF info); fills gaps the token scan leaves
    #[serde(default)]
    metadata: Option<DocumentMetadata>,
}

pub async fn run(args: BuildArgs) -> anyhow::Result<()> {
    let config = args.parser.resolve()?;
    logging::init_logging(&config.logging);

    let pipeline = StructurePipeline::new(config.parser)?;
    let json = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let structure = build(&pipeline, &json)?;
    info!(
        "Built {} ({} chapters, confidence {:.2})",
        args.file.display(),
        structure.total_chapters,
        structure.confidence
    );

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&structure)?
    } else {
        serde_json::to_string(&structure)?
    };
    writeln!(io::stdout(), "{}", rendered)?;

    Ok(())
}

fn build(pipeline: &StructurePipeline, json: &str) -> anyhow::Result<DocumentStructure> {
    let handoff: TokenHandoff = serde_json::from_str(json).context("Invalid token handoff")?;

    let structure = match handoff.metadata {
        Some(metadata) => pipeline.from_tokens_with_metadata(&handoff.tokens, &handoff.raw, metadata)?,
        None => pipeline.from_tokens(&handoff.tokens, &handoff.raw)?,
    };

    Ok(structure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parsing::ParserConfig;

    fn pipeline() -> StructurePipeline {
        StructurePipeline::new(ParserConfig::default()).unwrap()
    }

    #[test]
    fn test_build_with_container_metadata() {
        let json = r###"{
            "raw": "## Opening\n\nThe first chapter begins here.",
            "tokens": [
                {"kind": "heading", "text": "Opening", "raw": "## Opening", "depth": 2,
                 "position": {"start": 0, "end": 10, "line": 1, "column": 1}},
                {"kind": "paragraph", "text": "The first chapter begins here.",
                 "raw": "The first chapter begins here.",
                 "position": {"start": 12, "end": 42, "line": 3, "column": 1}}
            ],
            "metadata": {"title": "Moby Dick", "author": "Herman Melville", "language": "en"}
        }"###;

        let structure = build(&pipeline(), json).unwrap();

        assert_eq!(structure.total_chapters, 1);
        assert_eq!(structure.metadata.title, "Moby Dick");
        assert_eq!(structure.metadata.author.as_deref(), Some("Herman Melville"));
        assert_eq!(structure.metadata.language.as_deref(), Some("en"));
        assert!(structure.metadata.word_count > 0);
    }

    #[test]
    fn test_build_without_metadata() {
        let json = r#"{"raw": "Loose text.", "tokens": [{"kind": "paragraph", "text": "Loose text.",
            "raw": "Loose text.", "position": {"start": 0, "end": 11, "line": 1, "column": 1}}]}"#;

        let structure = build(&pipeline(), json).unwrap();

        assert!(structure.metadata.is_untitled());
        assert_eq!(structure.total_paragraphs, 1);
    }

    #[test]
    fn test_build_rejects_malformed_handoff() {
        let err = build(&pipeline(), r#"{"tokens": []}"#).unwrap_err();
        assert!(err.to_string().contains("Invalid token handoff"));
    }
}
