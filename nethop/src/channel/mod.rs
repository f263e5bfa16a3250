//! Channel layer for pattern-driven reads over an interactive shell.
//!
//! The hop logic only needs two primitives from the outer session: write
//! raw bytes, and read until a pattern matches. [`SessionChannel`] is that
//! seam; [`PtyChannel`] implements it over a russh PTY shell.

mod buffer;
mod patterns;
mod pty;
#[cfg(test)]
pub(crate) mod scripted;

use std::future::Future;

use regex::bytes::Regex;

use crate::error::Result;

pub use buffer::PatternBuffer;
pub use patterns::{PromptContext, Section, TerminationDetector, extract_hostname, prompt_pattern};
pub use pty::{PtyChannel, PtyConfig};

/// An already-authenticated interactive channel.
///
/// Implementations own the timeout: `read_until` fails with
/// [`ChannelError::PatternTimeout`](crate::error::ChannelError::PatternTimeout)
/// when the pattern does not show up in time.
pub trait SessionChannel: Send {
    /// Send raw bytes on the channel.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Wait until `pattern` matches the unread input and return everything
    /// consumed, up to and including the match. Input after the match stays
    /// buffered for the next read.
    fn read_until(&mut self, pattern: &Regex) -> impl Future<Output = Result<String>> + Send;
}
