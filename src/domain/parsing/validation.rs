//! Validation helpers for parsing

use regex::Regex;

use crate::domain::ParseError;

use super::config::ParserConfig;
use super::parser::SourceFormat;

/// Detect source format from filename extension
pub fn detect_format_from_filename(filename: &str) -> Option<SourceFormat> {
    let guess = mime_guess::from_path(filename);

    if let Some(format) = guess.iter().find_map(|m| detect_format_from_mime(m.as_ref())) {
        return Some(format);
    }

    let (_, ext) = filename.rsplit_once('.')?;

    match ext.to_lowercase().as_str() {
        "md" | "markdown" | "mdown" | "mkd" => Some(SourceFormat::Markdown),
        "txt" | "text" => Some(SourceFormat::PlainText),
        "epub" => Some(SourceFormat::Epub),
        "pdf" => Some(SourceFormat::Pdf),
        _ => None,
    }
}

/// Detect source format from MIME type
pub fn detect_format_from_mime(mime: &str) -> Option<SourceFormat> {
    let mime_lower = mime.to_lowercase();

    if mime_lower.starts_with("text/markdown") || mime_lower.starts_with("text/x-markdown") {
        return Some(SourceFormat::Markdown);
    }

    if mime_lower.starts_with("text/plain") {
        return Some(SourceFormat::PlainText);
    }

    if mime_lower.starts_with("application/epub+zip") {
        return Some(SourceFormat::Epub);
    }

    if mime_lower.starts_with("application/pdf") {
        return Some(SourceFormat::Pdf);
    }

    None
}

/// Validate a parser configuration
pub fn validate_parser_config(config: &ParserConfig) -> Result<(), ParseError> {
    if !(0.0..=1.0).contains(&config.confidence_threshold) {
        return Err(ParseError::invalid_configuration(format!(
            "confidence_threshold must be between 0 and 1, got {}",
            config.confidence_threshold
        )));
    }

    if config.chapter_header_levels.is_empty() {
        return Err(ParseError::invalid_configuration(
            "chapter_header_levels cannot be empty",
        ));
    }

    if let Some(level) = config
        .chapter_header_levels
        .iter()
        .find(|l| !(1..=6).contains(*l))
    {
        return Err(ParseError::invalid_configuration(format!(
            "chapter header level {} is outside 1-6",
            level
        )));
    }

    if config.min_sentence_length > config.max_sentence_length {
        return Err(ParseError::invalid_configuration(
            "min_sentence_length cannot exceed max_sentence_length",
        ));
    }

    if config.sentence_boundary_patterns.is_empty() {
        return Err(ParseError::invalid_configuration(
            "at least one sentence boundary pattern is required",
        ));
    }

    for pattern in &config.sentence_boundary_patterns {
        Regex::new(pattern).map_err(|e| {
            ParseError::invalid_configuration(format!(
                "invalid sentence boundary pattern '{}': {}",
                pattern, e
            ))
        })?;
    }

    if config.max_chunk_size == 0 {
        return Err(ParseError::invalid_configuration(
            "max_chunk_size must be greater than 0",
        ));
    }

    if config.max_file_size == 0 {
        return Err(ParseError::invalid_configuration(
            "max_file_size must be greater than 0",
        ));
    }

    if config.max_nesting_depth == 0 {
        return Err(ParseError::invalid_configuration(
            "max_nesting_depth must be greater than 0",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    #[test]
    fn test_detect_format_from_filename() {
        assert_eq!(
            detect_format_from_filename("book.md"),
            Some(SourceFormat::Markdown)
        );
        assert_eq!(
            detect_format_from_filename("BOOK.MARKDOWN"),
            Some(SourceFormat::Markdown)
        );
        assert_eq!(
            detect_format_from_filename("notes.txt"),
            Some(SourceFormat::PlainText)
        );
        assert_eq!(
            detect_format_from_filename("novel.epub"),
            Some(SourceFormat::Epub)
        );
        assert_eq!(
            detect_format_from_filename("paper.pdf"),
            Some(SourceFormat::Pdf)
        );
        assert_eq!(detect_format_from_filename("image.png"), None);
        assert_eq!(detect_format_from_filename("noextension"), None);
    }

    #[test]
    fn test_detect_format_from_mime() {
        assert_eq!(
            detect_format_from_mime("text/markdown; charset=utf-8"),
            Some(SourceFormat::Markdown)
        );
        assert_eq!(
            detect_format_from_mime("text/plain"),
            Some(SourceFormat::PlainText)
        );
        assert_eq!(
            detect_format_from_mime("application/epub+zip"),
            Some(SourceFormat::Epub)
        );
        assert_eq!(detect_format_from_mime("image/png"), None);
    }

    #[test]
    fn test_validate_threshold() {
        let config = ParserConfig::default().with_confidence_threshold(1.5);
        let err = validate_parser_config(&config).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_validate_chapter_levels() {
        assert!(validate_parser_config(&ParserConfig::default().with_chapter_levels(vec![])).is_err());
        assert!(validate_parser_config(&ParserConfig::default().with_chapter_levels(vec![0])).is_err());
        assert!(validate_parser_config(&ParserConfig::default().with_chapter_levels(vec![7])).is_err());
        assert!(validate_parser_config(&ParserConfig::default().with_chapter_levels(vec![1, 6])).is_ok());
    }

    #[test]
    fn test_validate_sentence_lengths() {
        let config = ParserConfig::default().with_sentence_lengths(50, 10);
        assert!(validate_parser_config(&config).is_err());
    }

    #[test]
    fn test_validate_boundary_patterns() {
        let empty = ParserConfig::default().with_boundary_patterns(vec![]);
        assert!(validate_parser_config(&empty).is_err());

        let broken = ParserConfig::default().with_boundary_patterns(vec!["[.!?".to_string()]);
        let err = validate_parser_config(&broken).unwrap_err();
        assert!(err.message.contains("invalid sentence boundary pattern"));
    }

    #[test]
    fn test_validate_sizes() {
        assert!(validate_parser_config(&ParserConfig::default().with_max_chunk_size(0)).is_err());
        assert!(validate_parser_config(&ParserConfig::default().with_max_file_size(0)).is_err());
        assert!(validate_parser_config(&ParserConfig::default().with_max_nesting_depth(0)).is_err());
    }
}
