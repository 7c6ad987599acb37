//! Accumulates streamed response text; only the accumulated text is ever
//! handed to the extractor, never the individual deltas.

use crate::extractor;
use kaiwa_core::Suggestion;

#[derive(Debug, Clone, Default)]
pub struct ResponseAccumulator {
    text: String,
    chunks: usize,
}

impl ResponseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next delta from the stream
    pub fn push(&mut self, delta: &str) {
        self.text.push_str(delta);
        self.chunks += 1;
    }

    /// Text accumulated so far
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Suggestions found in the text accumulated so far
    pub fn suggestions(&self) -> Vec<Suggestion> {
        extractor::extract(&self.text)
    }

    /// Consume the accumulator once the stream has ended
    pub fn finish(self) -> Vec<Suggestion> {
        extractor::extract(&self.text)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.chunks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_stream_has_no_suggestions_until_closed() {
        let mut acc = ResponseAccumulator::new();
        acc.push("Sure! [{\"englishText\": \"Good ");
        assert!(acc.suggestions().is_empty());

        acc.push("luck\", \"japaneseText\": \"頑張って\"}");
        assert!(acc.suggestions().is_empty());

        acc.push("]");
        assert_eq!(acc.chunk_count(), 3);
        let suggestions = acc.finish();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].english_text, "Good luck");
    }

    #[test]
    fn test_clear_resets() {
        let mut acc = ResponseAccumulator::new();
        acc.push("[1]");
        acc.clear();
        assert_eq!(acc.text(), "");
        assert_eq!(acc.chunk_count(), 0);
    }
}
