//! Stream command - prints structure chunks as JSON lines

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use futures::StreamExt;
use tracing::debug;

use crate::domain::parsing::StructureStream;

use super::ParserArgs;

/// Arguments for the stream command
#[derive(Args, Clone, Debug)]
pub struct StreamArgs {
    /// Document to stream
    pub file: PathBuf,

    /// Source lines per chunk when the document has no chapters
    #[arg(long)]
    pub chunk_size: Option<usize>,

    #[command(flatten)]
    pub parser: ParserArgs,
}

pub async fn run(args: StreamArgs) -> anyhow::Result<()> {
    let mut config = args.parser.resolve()?;
    config.parser.enable_streaming = true;
    if let Some(lines) = args.chunk_size {
        config.parser.max_chunk_size = lines;
    }

    let (parser, input) = super::prepare(config, &args.file).await?;

    let chunks = parser.parse_stream(input).await?;
    write_chunks(chunks, &mut std::io::stdout()).await
}

/// Writes each chunk as one JSON line, stopping at the first error
pub(crate) async fn write_chunks(mut chunks: StructureStream, out: &mut impl Write) -> anyhow::Result<()> {
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        debug!("Chunk {} ({})", chunk.sequence, chunk.payload.kind());
        writeln!(out, "{}", serde_json::to_string(&chunk)?)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prepare_reads_file() {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        write!(file, "## One\n\nFirst chapter text.\n\n## Two\n\nSecond chapter text.").unwrap();

        let config = ParserArgs::default().resolve().unwrap();
        let (parser, input) = super::super::prepare(config, file.path()).await.unwrap();

        let chunks: Vec<_> = parser.parse_stream(input).await.unwrap().collect().await;
        let kinds: Vec<_> = chunks
            .iter()
            .map(|c| c.as_ref().unwrap().payload.kind())
            .collect();

        assert_eq!(kinds, vec!["metadata", "chapter", "chapter", "complete"]);
    }
}
