//! In-memory channel replaying canned device output, for tests.

use std::time::Duration;

use regex::bytes::Regex;

use super::{PatternBuffer, SessionChannel};
use crate::error::{ChannelError, Result};

/// Replays a fixed transcript and records everything written to it.
///
/// A read whose pattern never matches the remaining output fails the way a
/// real channel would after its timeout.
pub(crate) struct ScriptedChannel {
    buffer: PatternBuffer,
    writes: Vec<Vec<u8>>,
    timeout: Duration,
}

impl ScriptedChannel {
    pub(crate) fn new(output: &str) -> Self {
        let mut buffer = PatternBuffer::default();
        buffer.extend(output.as_bytes());
        Self {
            buffer,
            writes: Vec::new(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Everything written so far, one entry per write.
    pub(crate) fn writes(&self) -> Vec<String> {
        self.writes
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// Number of writes exactly equal to `data`.
    pub(crate) fn count_writes(&self, data: &str) -> usize {
        self.writes.iter().filter(|w| w.as_slice() == data.as_bytes()).count()
    }

    /// Output not consumed by any read.
    pub(crate) fn unread(&self) -> String {
        String::from_utf8_lossy(self.buffer.as_slice()).into_owned()
    }
}

impl SessionChannel for ScriptedChannel {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.writes.push(data.to_vec());
        Ok(())
    }

    async fn read_until(&mut self, pattern: &Regex) -> Result<String> {
        match self.buffer.find(pattern) {
            Some(end) => {
                let data = self.buffer.split_through(end);
                Ok(String::from_utf8_lossy(&data).into_owned())
            }
            None => Err(ChannelError::PatternTimeout(self.timeout).into()),
        }
    }
}
