//! Hop driver: nested login, paged command capture and cleanup.
//!
//! The driver borrows an already-authenticated outer session for its whole
//! lifetime, so two hops can never interleave on the same channel. Hops over
//! several elements run one after another on the same driver:
//!
//! ```rust,no_run
//! use nethop::{ElementDescriptor, ExecOutcome, HopDriver, JumpSessionBuilder};
//!
//! # async fn example(elements: Vec<ElementDescriptor>) -> Result<(), nethop::Error> {
//! let mut session = JumpSessionBuilder::new("10.1.1.1")
//!     .username("admin")
//!     .password("secret")
//!     .open()
//!     .await?;
//!
//! let mut driver = HopDriver::new(&mut session)?;
//! for element in &elements {
//!     match driver.exec(element, &["show run"]).await? {
//!         ExecOutcome::Completed(response) => println!("{}", response.result),
//!         ExecOutcome::Skipped(failure) => eprintln!("{}: {}", element.address, failure),
//!     }
//!     print!("{}", driver.log().text());
//! }
//! # Ok(())
//! # }
//! ```

mod connector;
mod diagnostics;
mod executor;
mod response;
mod sanitize;

use std::time::Instant;

use log::debug;
use regex::bytes::Regex;

use crate::channel::SessionChannel;
use crate::element::ElementDescriptor;
use crate::error::{ChannelError, Result};
use crate::profile::HopProfile;

pub use crate::channel::PromptContext;
pub use diagnostics::HopLog;
pub use response::{
    CommandTranscript, ExecOutcome, HopFailure, HopOutcome, HopResponse, RawOutput,
};
pub use sanitize::{DEFAULT_EXTRACTION_COMMAND, Sanitizer, sanitize};

/// Drives nested logins and command capture over one outer session.
pub struct HopDriver<'a, C: SessionChannel> {
    /// The outer session, borrowed for the driver's lifetime.
    channel: &'a mut C,

    /// Prompt and marker vocabulary.
    profile: HopProfile,

    /// Diagnostics of the current `exec`.
    log: HopLog,

    /// Matches any prompt terminator.
    terminator: Regex,
}

impl<'a, C: SessionChannel> HopDriver<'a, C> {
    /// Create a driver using the Cisco IOS profile.
    pub fn new(channel: &'a mut C) -> Result<Self> {
        Self::with_profile(channel, HopProfile::cisco_ios())
    }

    /// Create a driver with a custom profile.
    ///
    /// Fails if the profile's prompt terminators do not form a valid pattern.
    pub fn with_profile(channel: &'a mut C, profile: HopProfile) -> Result<Self> {
        let terminator =
            Regex::new(&profile.terminator_class()).map_err(ChannelError::InvalidPattern)?;
        Ok(Self {
            channel,
            profile,
            log: HopLog::new(),
            terminator,
        })
    }

    /// Diagnostics recorded since the last `exec` started.
    pub fn log(&self) -> &HopLog {
        &self.log
    }

    /// Log, connect, run `commands`, exit and sanitize.
    ///
    /// Starts a fresh log. Unreachable elements and rejected credentials are
    /// returned as [`ExecOutcome::Skipped`] with nothing sent after the
    /// login attempt; timeouts and transport errors are returned as `Err`.
    pub async fn exec(
        &mut self,
        element: &ElementDescriptor,
        commands: &[&str],
    ) -> Result<ExecOutcome> {
        self.log = HopLog::new();
        let start = Instant::now();

        let context = match self.connect_hop(element).await? {
            HopOutcome::Connected(context) => context,
            HopOutcome::Failed(failure) => return Ok(ExecOutcome::Skipped(failure)),
        };

        let output = self.run_commands(&context, commands).await?;
        let raw_result = output.raw();
        let result = Sanitizer::for_profile(&self.profile)
            .with_echoes(commands)
            .sanitize(&raw_result);

        let elapsed = start.elapsed();
        debug!(
            "{}: {} command(s) in {:?}, {} bytes",
            element.address,
            commands.len(),
            elapsed,
            result.len()
        );

        Ok(ExecOutcome::Completed(HopResponse {
            address: element.address.clone(),
            hostname: output.hostname.clone(),
            commands: commands.iter().map(|c| c.to_string()).collect(),
            unavailable: output.unavailable(),
            result,
            raw_result,
            elapsed,
        }))
    }
}
