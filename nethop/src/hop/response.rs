//! Results of driving a hop.

use std::fmt;
use std::time::Duration;

use super::PromptContext;

/// Why a hop was abandoned before any command ran.
///
/// Both are recoverable for the caller: move on to the next element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopFailure {
    /// Connection timed out or was refused by the element.
    HostUnreachable,
    /// The element rejected the credentials. The jump host prompt has been
    /// restored before this is returned.
    AuthFailed,
}

impl fmt::Display for HopFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HopFailure::HostUnreachable => f.write_str("host unreachable"),
            HopFailure::AuthFailed => f.write_str("authentication failed"),
        }
    }
}

/// Result of the nested login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HopOutcome {
    /// Logged in; the nested prompt is known.
    Connected(PromptContext),
    /// Login did not succeed; skip this element.
    Failed(HopFailure),
}

/// Raw capture of one command.
#[derive(Debug, Clone, Default)]
pub struct CommandTranscript {
    /// The command that was sent.
    pub command: String,

    /// Everything the device printed, pagination markers included, trailing
    /// prompt excluded.
    pub raw: String,

    /// Number of pagination markers answered.
    pub pages: usize,

    /// The device reported invalid input for this command.
    pub unavailable: bool,
}

impl CommandTranscript {
    pub(crate) fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            ..Default::default()
        }
    }
}

/// Raw output of a command batch on one element.
#[derive(Debug, Clone, Default)]
pub struct RawOutput {
    /// Hostname of the element the commands ran on.
    pub hostname: Option<String>,

    /// One transcript per command, in order.
    pub transcripts: Vec<CommandTranscript>,
}

impl RawOutput {
    /// All transcripts concatenated.
    pub fn raw(&self) -> String {
        self.transcripts.iter().map(|t| t.raw.as_str()).collect()
    }

    /// Commands the device did not accept.
    pub fn unavailable(&self) -> Vec<String> {
        self.transcripts
            .iter()
            .filter(|t| t.unavailable)
            .map(|t| t.command.clone())
            .collect()
    }
}

/// Sanitized output from an element.
#[derive(Debug, Clone)]
pub struct HopResponse {
    /// Address of the element.
    pub address: String,

    /// Hostname from the element's prompt.
    pub hostname: Option<String>,

    /// Commands that were executed.
    pub commands: Vec<String>,

    /// Sanitized output.
    pub result: String,

    /// Output before sanitizing.
    pub raw_result: String,

    /// Commands the device reported as invalid input. Their output is still
    /// part of `result`.
    pub unavailable: Vec<String>,

    /// Time from the start of the login to the exit command.
    pub elapsed: Duration,
}

impl HopResponse {
    /// True when every command was accepted.
    pub fn is_success(&self) -> bool {
        self.unavailable.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.result.lines()
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.result.contains(pattern)
    }
}

impl fmt::Display for HopResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.result)
    }
}

/// Result of a full `exec` on one element.
#[derive(Debug, Clone)]
pub enum ExecOutcome {
    Completed(HopResponse),
    Skipped(HopFailure),
}

impl ExecOutcome {
    pub fn response(&self) -> Option<&HopResponse> {
        match self {
            ExecOutcome::Completed(response) => Some(response),
            ExecOutcome::Skipped(_) => None,
        }
    }

    pub fn failure(&self) -> Option<HopFailure> {
        match self {
            ExecOutcome::Completed(_) => None,
            ExecOutcome::Skipped(failure) => Some(*failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_output_concatenates_in_order() {
        let mut first = CommandTranscript::new("show version");
        first.raw.push_str("IOS\r\n");
        let mut second = CommandTranscript::new("show bogus");
        second.raw.push_str("% Invalid input detected\r\n");
        second.unavailable = true;

        let output = RawOutput {
            hostname: Some("r1".into()),
            transcripts: vec![first, second],
        };
        assert_eq!(output.raw(), "IOS\r\n% Invalid input detected\r\n");
        assert_eq!(output.unavailable(), vec!["show bogus".to_string()]);
    }

    #[test]
    fn test_outcome_accessors() {
        let skipped = ExecOutcome::Skipped(HopFailure::AuthFailed);
        assert!(skipped.response().is_none());
        assert_eq!(skipped.failure(), Some(HopFailure::AuthFailed));
        assert_eq!(HopFailure::HostUnreachable.to_string(), "host unreachable");
    }
}
