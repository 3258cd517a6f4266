//! Factory for document structure parsers

use std::sync::Arc;

use crate::domain::parsing::{
    detect_format_from_filename, detect_format_from_mime, DocumentStructureParser, ParserConfig,
    SourceFormat,
};
use crate::domain::ParseError;

use super::markdown::MarkdownDocumentParser;

/// Creates parsers per source format
#[derive(Debug, Default)]
pub struct ParserFactory;

impl ParserFactory {
    /// Create a parser for the given format.
    ///
    /// EPUB and PDF need a container extractor that hands tokens to
    /// `StructurePipeline::from_tokens`; they are reported as unsupported here.
    pub fn create(
        format: SourceFormat,
        config: ParserConfig,
    ) -> Result<Arc<dyn DocumentStructureParser>, ParseError> {
        if format.needs_extractor() {
            return Err(ParseError::unsupported_format(format).with_suggestion(
                "Extract the container into tokens and build with StructurePipeline::from_tokens",
            ));
        }

        Ok(Arc::new(MarkdownDocumentParser::new(config)?))
    }

    /// Create a parser for a filename, detecting its format
    pub fn for_filename(
        filename: &str,
        config: ParserConfig,
    ) -> Result<Arc<dyn DocumentStructureParser>, ParseError> {
        let format = detect_format_from_filename(filename)
            .ok_or_else(|| ParseError::unsupported_format(filename))?;
        Self::create(format, config)
    }

    pub fn detect_from_filename(filename: &str) -> Option<SourceFormat> {
        detect_format_from_filename(filename)
    }

    pub fn detect_from_mime(mime: &str) -> Option<SourceFormat> {
        detect_format_from_mime(mime)
    }

    pub fn supported_formats() -> Vec<SourceFormat> {
        vec![SourceFormat::Markdown, SourceFormat::PlainText]
    }
}
