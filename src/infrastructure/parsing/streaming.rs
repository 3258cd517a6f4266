//! Streaming delivery of a parsed structure
//!
//! Chunks are produced on demand: a metadata chunk from a header scan, one
//! chunk per chapter, fixed line windows when no chapters were found, then a
//! completion chunk at progress 100.
//!
//! Chapter chunks come from one full eager parse run on the first pull after
//! the metadata chunk, so memory use on that path is that of a normal parse.
//! Only the line-window fallback reads the source incrementally.

use std::sync::Arc;
use std::vec;

use futures::stream;
use tracing::{debug, warn};

use crate::domain::document::{Chapter, DocumentStructure};
use crate::domain::parsing::{
    ChunkPayload, LineWindow, ParserConfig, StreamChunk, StreamSummary, StructureStream,
    PROGRESS_CAP, PROGRESS_COMPLETE,
};
use crate::domain::ParseError;

use super::pipeline::StructurePipeline;

/// Progress after `done` of `total` units, capped below completion
fn progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return PROGRESS_CAP;
    }
    let scaled = done.min(total) * PROGRESS_CAP as usize / total;
    scaled as u8
}

enum Phase {
    Metadata,
    Parse,
    Chapters {
        chapters: vec::IntoIter<Chapter>,
        total: usize,
        emitted: usize,
        summary: StreamSummary,
    },
    Lines {
        offset: usize,
        lines_done: usize,
        total_lines: usize,
        summary: StreamSummary,
    },
    Complete(StreamSummary),
    Done,
}

struct StreamState {
    pipeline: Arc<StructurePipeline>,
    content: String,
    sequence: usize,
    phase: Phase,
}

impl StreamState {
    fn emit(&mut self, progress: u8, payload: ChunkPayload) -> StreamChunk {
        let chunk = StreamChunk::new(self.sequence, progress, payload);
        self.sequence += 1;
        chunk
    }

    fn next_chunk(&mut self) -> Option<Result<StreamChunk, ParseError>> {
        loop {
            match std::mem::replace(&mut self.phase, Phase::Done) {
                Phase::Metadata => {
                    let metadata = self.pipeline.scan_metadata(&self.content);
                    self.phase = Phase::Parse;
                    return Some(Ok(self.emit(0, ChunkPayload::Metadata(metadata))));
                }
                Phase::Parse => match self.pipeline.parse_text(&self.content) {
                    Ok(structure) if !structure.chapters.is_empty() => {
                        debug!("Streaming {} chapters", structure.chapters.len());
                        self.phase = chapter_phase(structure);
                    }
                    Ok(_) => {
                        debug!("No chapters found, streaming line windows");
                        self.phase = Phase::Lines {
                            offset: 0,
                            lines_done: 0,
                            total_lines: self.content.lines().count(),
                            summary: StreamSummary::default(),
                        };
                    }
                    Err(err) => {
                        warn!("Streaming parse failed: {}", err);
                        return Some(Err(err));
                    }
                },
                Phase::Chapters {
                    mut chapters,
                    total,
                    emitted,
                    summary,
                } => match chapters.next() {
                    Some(chapter) => {
                        self.phase = Phase::Chapters {
                            chapters,
                            total,
                            emitted: emitted + 1,
                            summary,
                        };
                        let progress = progress(emitted + 1, total);
                        return Some(Ok(self.emit(progress, ChunkPayload::Chapter(Box::new(chapter)))));
                    }
                    None => self.phase = Phase::Complete(summary),
                },
                Phase::Lines {
                    offset,
                    lines_done,
                    total_lines,
                    mut summary,
                } => {
                    if offset >= self.content.len() {
                        self.phase = Phase::Complete(summary);
                        continue;
                    }

                    let (window, consumed) = self.window(offset, lines_done, summary.total_windows);
                    let lines_done = window.end_line;

                    summary.total_windows += 1;
                    summary.total_sentences += window.sentences.len();
                    summary.total_word_count += window.word_count;
                    summary.estimated_total_duration +=
                        window.sentences.iter().map(|s| s.estimated_duration).sum::<f64>();

                    self.phase = Phase::Lines {
                        offset: offset + consumed,
                        lines_done,
                        total_lines,
                        summary,
                    };
                    let progress = progress(lines_done, total_lines);
                    return Some(Ok(self.emit(progress, ChunkPayload::Lines(window))));
                }
                Phase::Complete(summary) => {
                    return Some(Ok(self.emit(PROGRESS_COMPLETE, ChunkPayload::Complete(summary))));
                }
                Phase::Done => return None,
            }
        }
    }

    /// Next window of at most `max_chunk_size` lines starting at `offset`
    fn window(&self, offset: usize, lines_done: usize, index: usize) -> (LineWindow, usize) {
        let max_lines = self.pipeline.config().max_chunk_size;
        let rest = self.content.get(offset..).unwrap_or_default();

        let mut consumed = 0;
        let mut lines = Vec::new();
        for line in rest.split_inclusive('\n').take(max_lines) {
            consumed += line.len();
            lines.push(line.trim_end_matches(['\n', '\r']));
        }

        let text = lines.join("\n");
        let sentences = self.pipeline.segment(&text, &format!("window-{}", index + 1));
        let word_count = sentences.iter().map(|s| s.word_count).sum();

        let window = LineWindow {
            start_line: lines_done + 1,
            end_line: lines_done + lines.len(),
            text,
            sentences,
            word_count,
        };

        (window, consumed)
    }
}

fn chapter_phase(structure: DocumentStructure) -> Phase {
    let summary = StreamSummary {
        total_chapters: structure.total_chapters,
        total_windows: 0,
        total_sentences: structure.total_sentences,
        total_word_count: structure.total_word_count,
        estimated_total_duration: structure.estimated_total_duration,
        confidence: Some(structure.confidence),
    };

    Phase::Chapters {
        total: structure.chapters.len(),
        chapters: structure.chapters.into_iter(),
        emitted: 0,
        summary,
    }
}

/// Delivers one document as a pull-based chunk stream, or as a complete
/// structure on request
#[derive(Debug, Clone)]
pub struct StreamingController {
    pipeline: Arc<StructurePipeline>,
    content: String,
}

impl StreamingController {
    pub fn new(pipeline: Arc<StructurePipeline>, content: impl Into<String>) -> Self {
        Self {
            pipeline,
            content: content.into(),
        }
    }

    /// Whether input of this size should be delivered as a stream
    pub fn should_stream(config: &ParserConfig, size: usize) -> bool {
        config.enable_streaming || size >= config.streaming_threshold
    }

    /// The fully materialized structure. Falls back to a minimal line-based
    /// structure when parsing fails.
    pub fn structure(&self) -> DocumentStructure {
        self.pipeline
            .parse_text(&self.content)
            .unwrap_or_else(|err| {
                warn!("Parse failed, returning minimal structure: {}", err);
                self.pipeline.fallback_structure(&self.content, &err)
            })
    }

    pub fn into_stream(self) -> StructureStream {
        let state = StreamState {
            pipeline: self.pipeline,
            content: self.content,
            sequence: 0,
            phase: Phase::Metadata,
        };

        Box::pin(stream::unfold(state, |mut state| async move {
            let item = state.next_chunk()?;
            Some((item, state))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parsing::ErrorHandlingStrategy;
    use crate::domain::ErrorCode;
    use futures::StreamExt;

    fn controller(config: ParserConfig, content: &str) -> StreamingController {
        let pipeline = Arc::new(StructurePipeline::new(config).unwrap());
        StreamingController::new(pipeline, content)
    }

    async fn collect(controller: StreamingController) -> Vec<Result<StreamChunk, ParseError>> {
        controller.into_stream().collect().await
    }

    fn assert_ordered(chunks: &[StreamChunk]) {
        for (index, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.sequence, index);
        }

        for pair in chunks.windows(2) {
            assert!(pair[0].progress <= pair[1].progress);
        }

        let (last, rest) = chunks.split_last().unwrap();
        assert!(last.is_complete());
        assert_eq!(last.progress, PROGRESS_COMPLETE);
        assert!(rest.iter().all(|c| c.progress <= PROGRESS_CAP));
    }

    #[tokio::test]
    async fn test_chapter_chunks() {
        let content = "# Book\n\n## One\n\nFirst chapter text.\n\n## Two\n\nSecond chapter text.\n\n## Three\n\nThird chapter text.";
        let chunks: Vec<StreamChunk> = collect(controller(ParserConfig::default(), content))
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();

        let kinds: Vec<&str> = chunks.iter().map(|c| c.payload.kind()).collect();
        assert_eq!(
            kinds,
            vec!["metadata", "chapter", "chapter", "chapter", "complete"]
        );
        assert_ordered(&chunks);

        match &chunks[0].payload {
            ChunkPayload::Metadata(metadata) => assert_eq!(metadata.title, "Book"),
            other => panic!("unexpected payload {:?}", other),
        }

        match &chunks[4].payload {
            ChunkPayload::Complete(summary) => {
                assert_eq!(summary.total_chapters, 3);
                assert_eq!(summary.total_sentences, 3);
                assert!(summary.confidence.is_some());
            }
            other => panic!("unexpected payload {:?}", other),
        }
        assert_eq!(chunks[3].progress, PROGRESS_CAP);
    }

    #[tokio::test]
    async fn test_line_window_fallback() {
        let content = (1..=5)
            .map(|i| format!("Line number {} of the text.", i))
            .collect::<Vec<_>>()
            .join("\n");
        let config = ParserConfig::default().with_max_chunk_size(2);

        let chunks: Vec<StreamChunk> = collect(controller(config, &content))
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();

        let windows: Vec<&LineWindow> = chunks
            .iter()
            .filter_map(|c| match &c.payload {
                ChunkPayload::Lines(window) => Some(window),
                _ => None,
            })
            .collect();

        assert_eq!(windows.len(), 3);
        assert_eq!((windows[0].start_line, windows[0].end_line), (1, 2));
        assert_eq!((windows[2].start_line, windows[2].end_line), (5, 5));
        assert_eq!(windows[2].text, "Line number 5 of the text.");
        assert_ordered(&chunks);

        match &chunks.last().unwrap().payload {
            ChunkPayload::Complete(summary) => {
                assert_eq!(summary.total_windows, 3);
                assert_eq!(summary.total_chapters, 0);
                assert_eq!(summary.total_sentences, 5);
                assert_eq!(summary.total_word_count, 30);
                assert!(summary.confidence.is_none());
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_content_streams_metadata_and_completion() {
        let chunks: Vec<StreamChunk> = collect(controller(ParserConfig::default(), ""))
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();

        let kinds: Vec<&str> = chunks.iter().map(|c| c.payload.kind()).collect();
        assert_eq!(kinds, vec!["metadata", "complete"]);
    }

    #[tokio::test]
    async fn test_parse_error_ends_stream() {
        let config = ParserConfig::default().with_strategy(ErrorHandlingStrategy::Strict);
        let results = collect(controller(config, "")).await;

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert_eq!(results[1].as_ref().unwrap_err().code, ErrorCode::EmptyContent);
    }

    #[tokio::test]
    async fn test_consumer_can_stop_early() {
        let content = "## One\n\nText one here.\n\n## Two\n\nText two here.";
        let mut stream = controller(ParserConfig::default(), content).into_stream();

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.payload.kind(), "metadata");
        drop(stream);
    }

    #[test]
    fn test_structure_accessor_falls_back() {
        let config = ParserConfig::default()
            .with_strategy(ErrorHandlingStrategy::Strict)
            .with_max_nesting_depth(2);
        let structure = controller(config, "> > > quoted text in here.").structure();

        assert_eq!(structure.total_chapters, 0);
        assert_eq!(structure.total_paragraphs, 1);
        assert!(structure.processing_metrics.processing_errors[0].contains("NESTING_TOO_DEEP"));
    }

    #[test]
    fn test_should_stream() {
        let config = ParserConfig::default();
        assert!(!StreamingController::should_stream(&config, 10));
        assert!(StreamingController::should_stream(&config, config.streaming_threshold));
        assert!(StreamingController::should_stream(&config.with_streaming(true), 10));
    }

    #[test]
    fn test_progress_is_capped() {
        assert_eq!(progress(0, 4), 0);
        assert_eq!(progress(4, 4), PROGRESS_CAP);
        assert_eq!(progress(10, 4), PROGRESS_CAP);
        assert!(progress(1, 3) < progress(2, 3));
    }
}
