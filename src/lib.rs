//! docvoice
//!
//! Converts documents into one uniform hierarchy for text-to-speech:
//! document -> chapters -> paragraphs -> sentences. Markdown is parsed
//! natively; container formats hand tokens to the same pipeline.
//!
//! ```no_run
//! use docvoice::{MarkdownDocumentParser, ParserConfig, StructurePipeline};
//!
//! let pipeline = StructurePipeline::new(ParserConfig::default())?;
//! let structure = pipeline.parse_text("## Intro\n\nHello there, listener.")?;
//! assert_eq!(structure.total_chapters, 1);
//! # let _ = MarkdownDocumentParser::with_defaults()?;
//! # Ok::<(), docvoice::ParseError>(())
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::document::DocumentStructure;
pub use domain::parsing::{ConfigPreset, DocumentStructureParser, ErrorHandlingStrategy, ParserConfig};
pub use domain::{ErrorCode, ParseError};
pub use infrastructure::parsing::{MarkdownDocumentParser, ParserFactory, StructurePipeline};
