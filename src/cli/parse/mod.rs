//! Parse command - prints a document structure as JSON or a summary

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use tracing::info;

use crate::domain::document::DocumentStructure;
use crate::domain::parsing::{DocumentStructureParser, ParserConfig, ParserInput};
use crate::infrastructure::parsing::StreamingController;

use super::ParserArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Summary,
}

/// Arguments for the parse command
#[derive(Args, Clone, Debug)]
pub struct ParseArgs {
    /// Document to parse
    pub file: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub parser: ParserArgs,
}

pub async fn run(args: ParseArgs) -> anyhow::Result<()> {
    let config = args.parser.resolve()?;
    let parser_config = config.parser.clone();
    let (parser, input) = super::prepare(config, &args.file).await?;

    execute(&args, &parser_config, parser.as_ref(), input, &mut io::stdout()).await
}

/// Parses eagerly, or writes JSON-line chunks when streaming is enabled or
/// the input reaches the streaming threshold.
async fn execute(
    args: &ParseArgs,
    config: &ParserConfig,
    parser: &dyn DocumentStructureParser,
    input: ParserInput,
    out: &mut impl io::Write,
) -> anyhow::Result<()> {
    if StreamingController::should_stream(config, input.byte_len()) {
        info!(
            "Streaming {} ({} bytes, threshold {})",
            args.file.display(),
            input.byte_len(),
            config.streaming_threshold
        );
        let chunks = parser.parse_stream(input).await?;
        return super::stream::write_chunks(chunks, out).await;
    }

    let structure = parser.parse(input).await?;
    info!(
        "Parsed {} ({} chapters, confidence {:.2})",
        args.file.display(),
        structure.total_chapters,
        structure.confidence
    );

    let rendered = match args.output {
        OutputFormat::Json if args.pretty => serde_json::to_string_pretty(&structure)?,
        OutputFormat::Json => serde_json::to_string(&structure)?,
        OutputFormat::Summary => render_summary(&structure),
    };
    writeln!(out, "{}", rendered)?;

    Ok(())
}

/// Human readable overview of a parsed document
pub fn render_summary(structure: &DocumentStructure) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Title:      {}", structure.metadata.title);
    if let Some(author) = &structure.metadata.author {
        let _ = writeln!(out, "Author:     {}", author);
    }
    let _ = writeln!(out, "Chapters:   {}", structure.total_chapters);
    let _ = writeln!(out, "Paragraphs: {}", structure.total_paragraphs);
    let _ = writeln!(out, "Sentences:  {}", structure.total_sentences);
    let _ = writeln!(out, "Words:      {}", structure.total_word_count);
    let _ = writeln!(out, "Duration:   {:.1}s", structure.estimated_total_duration);
    let _ = writeln!(out, "Confidence: {:.2}", structure.confidence);
    if !structure.stats.paragraphs_by_type.is_empty() {
        let by_type: Vec<String> = structure
            .stats
            .paragraphs_by_type
            .iter()
            .map(|(kind, count)| format!("{} {}", kind.as_str(), count))
            .collect();
        let _ = writeln!(out, "By type:    {}", by_type.join(", "));
    }
    if !structure.elements.is_empty() {
        let mut by_kind: BTreeMap<&str, usize> = BTreeMap::new();
        for element in &structure.elements {
            *by_kind.entry(element.element_type.as_str()).or_insert(0) += 1;
        }
        let elements: Vec<String> = by_kind
            .iter()
            .map(|(kind, count)| format!("{} {}", kind, count))
            .collect();
        let _ = writeln!(out, "Elements:   {}", elements.join(", "));
    }
    let _ = writeln!(
        out,
        "Validation: {} errors, {} warnings (score {:.2})",
        structure.validation.errors.len(),
        structure.validation.warnings.len(),
        structure.validation.score
    );

    for chapter in &structure.chapters {
        let _ = writeln!(
            out,
            "  {:>3}. [H{}] {} ({} paragraphs, {} words)",
            chapter.position + 1,
            chapter.level,
            chapter.title,
            chapter.paragraphs.len(),
            chapter.word_count
        );
    }

    for issue in structure
        .validation
        .errors
        .iter()
        .chain(structure.validation.warnings.iter())
    {
        let _ = writeln!(out, "  ! {}: {}", issue.code, issue.message);
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parsing::{MarkdownDocumentParser, StructurePipeline};

    const BOOK: &str = "# Book\n\n## One\n\nFirst chapter text.\n\n## Two\n\nSecond chapter text.";

    fn args() -> ParseArgs {
        ParseArgs {
            file: PathBuf::from("book.md"),
            output: OutputFormat::Json,
            pretty: false,
            parser: Default::default(),
        }
    }

    async fn run_with(config: ParserConfig) -> Vec<serde_json::Value> {
        let parser = MarkdownDocumentParser::new(config.clone()).unwrap();
        let mut out = Vec::new();

        execute(&args(), &config, &parser, ParserInput::named("book.md", BOOK), &mut out)
            .await
            .unwrap();

        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_render_summary() {
        let pipeline = StructurePipeline::new(ParserConfig::default()).unwrap();
        let structure = pipeline
            .parse_text("# Guide\n\n## Setup\n\nInstall the tool first. Then run it.")
            .unwrap();

        let summary = render_summary(&structure);

        assert!(summary.starts_with("Title:      Guide"));
        assert!(summary.contains("Chapters:   1"));
        assert!(summary.contains("Sentences:  2"));
        assert!(summary.contains("[H2] Setup"));
    }

    #[test]
    fn test_summary_counts_by_type() {
        let config = ParserConfig {
            include_code_blocks: true,
            ..ParserConfig::default()
        };
        let pipeline = StructurePipeline::new(config).unwrap();
        let structure = pipeline
            .parse_text("## Setup\n\nRun this.\n\n```sh\nmake\n```\n\nSee [docs](https://example.com).")
            .unwrap();

        let summary = render_summary(&structure);

        assert!(summary.contains("By type:    "));
        assert!(summary.contains("text 2, code 1"));
        assert!(summary.contains("Elements:   "));
        assert!(summary.contains("link 1"));
    }

    #[tokio::test]
    async fn test_default_config_writes_one_structure() {
        let lines = run_with(ParserConfig::default()).await;

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["total_chapters"], 2);
    }

    #[tokio::test]
    async fn test_enable_streaming_writes_chunks() {
        let lines = run_with(ParserConfig::default().with_streaming(true)).await;

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["sequence"], 0);
        assert!(lines.iter().all(|line| line.get("total_chapters").is_none()));
    }

    #[tokio::test]
    async fn test_threshold_selects_streaming() {
        let config = ParserConfig {
            streaming_threshold: BOOK.len(),
            ..ParserConfig::default()
        };
        assert_eq!(run_with(config).await.len(), 4);

        let config = ParserConfig {
            streaming_threshold: BOOK.len() + 1,
            ..ParserConfig::default()
        };
        assert_eq!(run_with(config).await.len(), 1);
    }

    #[test]
    fn test_summary_lists_validation_issues() {
        let pipeline = StructurePipeline::new(ParserConfig::default()).unwrap();
        let structure = pipeline.parse_text("Just some loose prose here.").unwrap();

        let summary = render_summary(&structure);

        assert!(summary.contains("! NO_CHAPTERS"));
    }
}
