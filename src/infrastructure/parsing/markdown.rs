//! Markdown document structure parser

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::document::DocumentStructure;
use crate::domain::parsing::{DocumentStructureParser, ParserConfig, ParserInput, StructureStream};
use crate::domain::{ErrorCode, ParseError};

use super::pipeline::StructurePipeline;
use super::streaming::StreamingController;

/// Parser for Markdown and plain text sources
#[derive(Debug, Clone)]
pub struct MarkdownDocumentParser {
    pipeline: Arc<StructurePipeline>,
}

impl MarkdownDocumentParser {
    pub fn new(config: ParserConfig) -> Result<Self, ParseError> {
        Ok(Self {
            pipeline: Arc::new(StructurePipeline::new(config)?),
        })
    }

    pub fn with_defaults() -> Result<Self, ParseError> {
        Self::new(ParserConfig::default())
    }

    pub fn pipeline(&self) -> &StructurePipeline {
        &self.pipeline
    }

    /// Container check, size check, then UTF-8 decoding
    fn decode(&self, input: ParserInput) -> Result<String, ParseError> {
        if let Some(format) = input.format().filter(|f| f.needs_extractor()) {
            return Err(ParseError::new(
                ErrorCode::InvalidInput,
                format!("{} input cannot be read as Markdown text", format),
            )
            .with_suggestion("Build from extracted tokens with StructurePipeline::from_tokens"));
        }

        self.pipeline.check_size(input.byte_len())?;

        if let Some(filename) = &input.filename {
            debug!("Decoding {} ({} bytes)", filename, input.byte_len());
        }

        input.content.into_text()
    }

    /// Controller over already decoded input
    pub fn controller(&self, input: ParserInput) -> Result<StreamingController, ParseError> {
        let content = self.decode(input)?;
        Ok(StreamingController::new(self.pipeline.clone(), content))
    }
}

#[async_trait]
impl DocumentStructureParser for MarkdownDocumentParser {
    fn supported_extensions(&self) -> &[&str] {
        &["md", "markdown", "mdown", "mkd", "txt", "text"]
    }

    fn supported_mime_types(&self) -> &[&str] {
        &["text/markdown", "text/x-markdown", "text/plain"]
    }

    async fn parse(&self, input: ParserInput) -> Result<DocumentStructure, ParseError> {
        let content = self.decode(input)?;
        self.pipeline.parse_text(&content)
    }

    async fn parse_stream(&self, input: ParserInput) -> Result<StructureStream, ParseError> {
        Ok(self.controller(input)?.into_stream())
    }
}
