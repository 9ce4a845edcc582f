//! Recursive character text chunking
//!
//! Splits a text blob into overlapping substrings bounded by a maximum
//! size, preferring structural separators (paragraph breaks, then line
//! breaks, then spaces) and falling back to character boundaries so that
//! splitting always terminates.
//!
//! All sizes are measured in `char`s, never bytes, so multi-byte UTF-8
//! input never panics on a slice boundary.

use crate::error::{CoreError, CoreResult};

/// Default separator priority, coarsest first. The trailing empty string
/// splits at arbitrary character boundaries and guarantees termination.
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Recursive character text splitter with overlap.
///
/// Chunks are emitted in document order and each chunk after the first
/// starts with the trailing pieces of the previous chunk (up to `overlap`
/// chars) so entities mentioned near a boundary are extractable from at
/// least one chunk.
#[derive(Debug, Clone)]
pub struct TextChunker {
    max_size: usize,
    overlap: usize,
    separators: Vec<String>,
}

impl TextChunker {
    /// Create a chunker with the default separator priority.
    ///
    /// Fails fast with [`CoreError::InvalidChunkConfig`] when `max_size`
    /// is zero or `overlap >= max_size`; parameters are never clamped.
    pub fn new(max_size: usize, overlap: usize) -> CoreResult<Self> {
        Self::with_separators(
            max_size,
            overlap,
            DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Create a chunker with a custom separator priority, coarsest first.
    pub fn with_separators(
        max_size: usize,
        overlap: usize,
        separators: Vec<String>,
    ) -> CoreResult<Self> {
        if max_size == 0 {
            return Err(CoreError::InvalidChunkConfig(
                "max_size must be greater than zero".to_string(),
            ));
        }
        if overlap >= max_size {
            return Err(CoreError::InvalidChunkConfig(format!(
                "overlap ({}) must be smaller than max_size ({})",
                overlap, max_size
            )));
        }
        Ok(Self {
            max_size,
            overlap,
            separators,
        })
    }

    /// Maximum chunk size in chars.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Overlap budget in chars.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into chunks of at most `max_size` chars.
    ///
    /// Empty input yields an empty vec; input no longer than `max_size`
    /// yields a single chunk with no overlap applied. Deterministic for a
    /// given `(text, max_size, overlap, separators)`.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        if char_len(text) <= self.max_size {
            return vec![text.to_string()];
        }

        let pieces = self.split_recursive(text, &self.separators);
        self.assemble(pieces)
    }

    /// Recursively break `text` into pieces no longer than `max_size`,
    /// trying the highest-priority separator first. Separators stay
    /// attached to the preceding piece so concatenating all pieces
    /// reproduces the input exactly.
    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        if char_len(text) <= self.max_size {
            return vec![text.to_string()];
        }

        let Some((separator, rest)) = separators.split_first() else {
            // Separator list exhausted without reaching the empty-string
            // fallback: hard-split at max_size boundaries.
            return hard_split(text, self.max_size);
        };

        if separator.is_empty() {
            // Character-level fallback; single chars always fit.
            return text.chars().map(String::from).collect();
        }

        let mut pieces = Vec::new();
        for part in split_keep_separator(text, separator) {
            if char_len(&part) <= self.max_size {
                pieces.push(part);
            } else {
                pieces.extend(self.split_recursive(&part, rest));
            }
        }
        pieces
    }

    /// Greedily pack pieces into chunks, carrying a trailing-piece overlap
    /// between consecutive chunks.
    fn assemble(&self, pieces: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: Vec<String> = Vec::new();
        let mut window_len = 0usize;

        for piece in pieces {
            let piece_len = char_len(&piece);

            if window_len + piece_len > self.max_size && !window.is_empty() {
                chunks.push(window.concat());

                // Retain a suffix of pieces within the overlap budget; also
                // make room so the incoming piece fits.
                while window_len > self.overlap
                    || (window_len + piece_len > self.max_size && window_len > 0)
                {
                    let removed = window.remove(0);
                    window_len -= char_len(&removed);
                }
            }

            window_len += piece_len;
            window.push(piece);
        }

        if !window.is_empty() {
            chunks.push(window.concat());
        }
        chunks
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split on `separator`, keeping the separator attached to the end of the
/// piece that precedes it.
fn split_keep_separator(text: &str, separator: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(index) = rest.find(separator) {
        let end = index + separator.len();
        parts.push(rest[..end].to_string());
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        parts.push(rest.to_string());
    }
    parts
}

/// Last-resort split at fixed char boundaries.
fn hard_split(text: &str, max_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_size)
        .map(|window| window.iter().collect())
        .collect()
}
