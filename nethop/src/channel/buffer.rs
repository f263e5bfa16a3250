//! Read buffer with tail-window pattern search.
//!
//! Output arrives in arbitrary chunks. Rather than rescanning everything
//! after each chunk, only the region that has not been searched yet plus
//! `search_depth` bytes of overlap is searched, so a match split across
//! chunks is still found.

use bytes::BytesMut;
use regex::bytes::Regex;

/// Accumulates unread channel output and finds the first pattern match.
#[derive(Debug)]
pub struct PatternBuffer {
    /// Unread output.
    buffer: BytesMut,

    /// Bytes already searched without a match.
    scanned: usize,

    /// Overlap kept when resuming a search.
    search_depth: usize,
}

impl PatternBuffer {
    /// Create a new pattern buffer.
    ///
    /// `search_depth` bounds how far back a resumed search starts; it must
    /// exceed the longest match expected to straddle two chunks.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            scanned: 0,
            search_depth,
        }
    }

    /// Append newly received output.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Find the first match of `pattern` in the unread output.
    ///
    /// Returns the offset just past the match.
    pub fn find(&mut self, pattern: &Regex) -> Option<usize> {
        let start = self.scanned.saturating_sub(self.search_depth);
        match pattern.find(&self.buffer[start..]) {
            Some(m) => Some(start + m.end()),
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }

    /// Remove and return the first `end` bytes; the rest stays unread.
    pub fn split_through(&mut self, end: usize) -> Vec<u8> {
        let end = end.min(self.buffer.len());
        self.scanned = 0;
        self.buffer.split_to(end).to_vec()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_and_split() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"show run\r\nhostname r1\r\nr1#rest");

        let pattern = Regex::new(r"r1#").unwrap();
        let end = buffer.find(&pattern).unwrap();
        assert_eq!(buffer.split_through(end), b"show run\r\nhostname r1\r\nr1#");
        assert_eq!(buffer.as_slice(), b"rest");
    }

    #[test]
    fn test_match_split_across_chunks() {
        let mut buffer = PatternBuffer::new(16);
        let pattern = Regex::new(r"--More--").unwrap();

        buffer.extend(&[b'x'; 200]);
        buffer.extend(b" --Mo");
        assert!(buffer.find(&pattern).is_none());

        buffer.extend(b"re--");
        let end = buffer.find(&pattern).unwrap();
        assert_eq!(end, buffer.len());
    }

    #[test]
    fn test_first_match_wins() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"page one --More-- page two --More--");

        let pattern = Regex::new(r"--More--").unwrap();
        let end = buffer.find(&pattern).unwrap();
        assert_eq!(buffer.split_through(end), b"page one --More--");

        let end = buffer.find(&pattern).unwrap();
        assert_eq!(buffer.split_through(end), b" page two --More--");
        assert!(buffer.is_empty());
    }
}
