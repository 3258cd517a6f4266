//! Document structure parsing infrastructure
//!
//! Implementations of the Markdown structure pipeline: tokenization,
//! sentence segmentation, chapter building, element and metadata extraction,
//! confidence scoring, validation and streaming delivery.

pub mod builder;
pub mod elements;
pub mod factory;
pub mod markdown;
pub mod metadata;
pub mod pipeline;
pub mod scorer;
pub mod segmentation;
pub mod streaming;
pub mod tokenizer;
pub mod validator;

pub use builder::{paragraph_type_for, BuiltChapters, ChapterBuilder};
pub use elements::ElementExtractor;
pub use factory::ParserFactory;
pub use markdown::MarkdownDocumentParser;
pub use metadata::MetadataExtractor;
pub use pipeline::StructurePipeline;
pub use scorer::{ConfidenceScorer, ScoreInput, OVERRIDE_LADDER};
pub use segmentation::{count_words, extract_sentences, has_formatting, SentenceSegmenter};
pub use streaming::StreamingController;
pub use tokenizer::{MarkdownTokenizer, TokenStream};
pub use validator::StructureValidator;
