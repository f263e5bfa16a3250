//! Diagnostics collected while driving a hop.

use log::warn;

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// Append-only list of diagnostic lines for one `exec` call.
///
/// Every line is also emitted through the `log` facade as it is recorded,
/// so an operator watching the console sees progress live.
#[derive(Debug, Clone, Default)]
pub struct HopLog {
    lines: Vec<String>,
}

impl HopLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic line.
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        warn!("{}", line);
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All lines, each terminated by the platform line separator.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push_str(LINE_ENDING);
        }
        text
    }

    /// Whether any line mentions `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}
