//! Parsing domain types and traits
//!
//! This module provides:
//! - `ParserConfig` and presets consumed by the structure pipeline
//! - `Token` types handed over by tokenizers and external extractors
//! - `DocumentStructureParser` trait with eager and streaming entry points

pub mod config;
pub mod parser;
pub mod stream;
pub mod token;
pub mod validation;

pub use config::{ConfigPreset, ErrorHandlingStrategy, ParserConfig, DEFAULT_MAX_FILE_SIZE};
pub use parser::{DocumentStructureParser, ParserContent, ParserInput, SourceFormat};
pub use stream::{
    ChunkPayload, LineWindow, StreamChunk, StreamSummary, StructureStream, PROGRESS_CAP,
    PROGRESS_COMPLETE,
};
pub use token::{
    InlineNode, ListData, ListItem, TableData, Token, TokenDetail, TokenKind, TokenPosition,
};
pub use validation::{detect_format_from_filename, detect_format_from_mime, validate_parser_config};
