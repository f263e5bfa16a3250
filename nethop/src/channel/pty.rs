//! PTY shell channel on top of a russh session.

use std::time::Duration;

use log::{debug, trace};
use regex::bytes::Regex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};
use tokio::time::Instant;

use super::SessionChannel;
use super::buffer::PatternBuffer;
use crate::error::{ChannelError, Result};

/// Configuration for PTY channel behavior.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    /// Timeout for each pattern read.
    pub timeout: Duration,

    /// Search depth for pattern matching.
    pub search_depth: usize,

    /// Terminal width.
    pub terminal_width: u32,

    /// Terminal height.
    pub terminal_height: u32,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            search_depth: 1000,
            terminal_width: 511,
            terminal_height: 24,
        }
    }
}

/// Interactive shell channel with pattern-based reads.
pub struct PtyChannel {
    channel: Channel<Msg>,
    buffer: PatternBuffer,
    timeout: Duration,
}

impl PtyChannel {
    /// Wrap an open channel that already has a PTY and a shell.
    pub fn new(channel: Channel<Msg>, config: &PtyConfig) -> Self {
        Self {
            channel,
            buffer: PatternBuffer::new(config.search_depth),
            timeout: config.timeout,
        }
    }

    /// Get the read timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Set the read timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Output received but not consumed by a read.
    pub fn pending(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Close the channel.
    pub async fn close(&self) -> Result<()> {
        if !self.buffer.is_empty() {
            debug!("closing with {} unread bytes", self.buffer.len());
        }
        self.channel.close().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}

impl SessionChannel for PtyChannel {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        trace!("pty write: {} bytes", data.len());
        self.channel.data(data).await.map_err(ChannelError::Ssh)?;
        Ok(())
    }

    async fn read_until(&mut self, pattern: &Regex) -> Result<String> {
        let deadline = Instant::now() + self.timeout;

        loop {
            if let Some(end) = self.buffer.find(pattern) {
                let data = self.buffer.split_through(end);
                trace!("pty read matched after {} bytes", data.len());
                return Ok(String::from_utf8_lossy(&data).into_owned());
            }

            let msg = tokio::time::timeout_at(deadline, self.channel.wait())
                .await
                .map_err(|_| {
                    debug!("pattern timeout, {} bytes unmatched", self.buffer.len());
                    ChannelError::PatternTimeout(self.timeout)
                })?;

            match msg {
                Some(ChannelMsg::Data { data }) => self.buffer.extend(&data),
                Some(ChannelMsg::ExtendedData { data, .. }) => self.buffer.extend(&data),
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    return Err(ChannelError::Closed.into());
                }
                Some(_) => {}
            }
        }
    }
}
