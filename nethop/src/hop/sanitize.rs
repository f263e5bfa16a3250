//! Turns a raw transcript into clean command output.

use memchr::memmem;
use vte::{Parser, Perform};

use crate::profile::HopProfile;

/// Command whose echo is removed by [`sanitize`].
pub const DEFAULT_EXTRACTION_COMMAND: &str = "show run";

/// Leftover of an erase-to-end-of-line sequence whose ESC byte was lost.
const ERASE_LINE_ARTIFACT: &str = "[K";

/// Clean `raw` using the Cisco IOS pagination marker and removing the echo
/// of [`DEFAULT_EXTRACTION_COMMAND`].
///
/// ```rust
/// use nethop::hop::sanitize;
///
/// let raw = "show run\r\ninterface Gi0 --More--end\r\n";
/// assert_eq!(sanitize(raw), "interface Gi0\nend");
/// ```
pub fn sanitize(raw: &str) -> String {
    Sanitizer::default().sanitize(raw)
}

/// Output sanitizer.
///
/// Steps, in order: drop echoed commands, drop escape sequences, control
/// bytes and erase-line artifacts, drop pagination markers with the filler
/// the device prints to erase them, trim. Markers are removed last so that
/// stripping can never reassemble one, which keeps the sanitizer idempotent.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    pagination_marker: String,
    echoes: Vec<String>,
}

impl Sanitizer {
    pub fn new(pagination_marker: impl Into<String>) -> Self {
        Self {
            pagination_marker: pagination_marker.into(),
            echoes: Vec::new(),
        }
    }

    pub fn for_profile(profile: &HopProfile) -> Self {
        Self::new(profile.pagination_marker.clone())
    }

    /// Also remove the device's echo of `command`.
    pub fn with_echo(mut self, command: impl Into<String>) -> Self {
        self.echoes.push(command.into());
        self
    }

    pub fn with_echoes<S: AsRef<str>>(mut self, commands: &[S]) -> Self {
        self.echoes
            .extend(commands.iter().map(|c| c.as_ref().to_string()));
        self
    }

    pub fn sanitize(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        for echo in self.echoes.iter().filter(|e| !e.is_empty()) {
            text = text.replace(&format!("{}\r\n", echo), "");
        }

        let mut text = strip_control(&text);
        while text.contains(ERASE_LINE_ARTIFACT) {
            text = text.replace(ERASE_LINE_ARTIFACT, "");
        }

        strip_pagination(&text, &self.pagination_marker)
            .trim()
            .to_string()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::for_profile(&HopProfile::cisco_ios()).with_echo(DEFAULT_EXTRACTION_COMMAND)
    }
}

/// First character the device prints after the pagination filler.
fn is_content(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '*' | '!' | '\n')
}

/// Skip the blanks the device printed over a marker. Control bytes are
/// already gone at this point.
fn skip_filler(s: &str) -> &str {
    s.trim_start_matches(|c: char| !is_content(c))
}

/// Remove each pagination marker, the blanks before it and the filler after
/// it. A marker that interrupted a line leaves a line break behind.
fn strip_pagination(text: &str, marker: &str) -> String {
    if marker.is_empty() {
        return text.to_string();
    }

    let finder = memmem::Finder::new(marker.as_bytes());
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = finder.find(rest.as_bytes()) {
        out.push_str(rest[..pos].trim_end_matches([' ', '\t']));

        let after = skip_filler(&rest[pos + marker.len()..]);

        if !out.is_empty() && !out.ends_with('\n') && !after.is_empty() && !after.starts_with('\n')
        {
            out.push('\n');
        }
        rest = after;
    }

    out.push_str(rest);
    out
}

/// Keeps printable text, newlines and tabs.
struct ControlStripper {
    out: String,
}

impl Perform for ControlStripper {
    fn print(&mut self, c: char) {
        self.out.push(c);
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\t') {
            self.out.push(byte as char);
        }
    }
}

fn strip_control(text: &str) -> String {
    let mut parser = Parser::new();
    let mut stripper = ControlStripper {
        out: String::with_capacity(text.len()),
    };
    parser.advance(&mut stripper, text.as_bytes());
    stripper.out
}
