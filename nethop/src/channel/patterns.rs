//! Prompt capture and termination detection.
//!
//! A command's output is finished when the device prints an end-of-config
//! marker or one of the known prompts comes back. A pagination marker
//! always wins over both: if the device says there is more, we ask for more.

use regex::bytes::Regex;

use crate::error::{ChannelError, Result};
use crate::profile::HopProfile;

/// Prompts captured during a hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    /// Address of the nested element.
    pub address: String,

    /// Hostname in the jump host's prompt.
    pub outer_hostname: Option<String>,

    /// Hostname in the nested element's prompt.
    pub nested_hostname: Option<String>,
}

/// How a section read from the channel ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Pagination marker present; the device is waiting for a keystroke.
    More,
    /// A known prompt came back, starting at byte offset `start`.
    Prompt { start: usize },
    /// The end-of-config marker was printed; a prompt follows.
    EndOfConfig,
    /// None of the above.
    Incomplete,
}

/// Extract the hostname from text ending in a prompt.
///
/// Takes the line holding the last prompt terminator and returns what
/// precedes the terminator, without surrounding whitespace or control bytes.
pub fn extract_hostname(text: &str, terminators: &[char]) -> Option<String> {
    let end = text.rfind(|c: char| terminators.contains(&c))?;
    let line = text[..end].rsplit('\n').next().unwrap_or_default();
    let hostname = line.trim_matches(|c: char| c.is_whitespace() || c.is_control());
    (!hostname.is_empty()).then(|| hostname.to_string())
}

/// Pattern matching a hostname's prompt, including sub-mode suffixes such
/// as `(config-if)`.
pub fn prompt_pattern(hostname: &str, terminator_class: &str) -> String {
    format!(r"{}[\w()\-]*{}", regex::escape(hostname), terminator_class)
}

/// Termination patterns for one hop.
#[derive(Debug, Clone)]
pub struct TerminationDetector {
    pagination: Option<Regex>,
    end_of_config: Option<Regex>,
    prompt: Regex,
    read_pattern: Regex,
}

impl TerminationDetector {
    /// Build the pattern set from the profile and the captured prompts.
    pub fn new(profile: &HopProfile, context: &PromptContext) -> Result<Self> {
        let class = profile.terminator_class();

        let mut prompts: Vec<String> = Vec::new();
        for hostname in [&context.nested_hostname, &context.outer_hostname]
            .into_iter()
            .flatten()
        {
            let pattern = prompt_pattern(hostname, &class);
            if !prompts.contains(&pattern) {
                prompts.push(pattern);
            }
        }
        if prompts.is_empty() {
            prompts.push(class);
        }
        let prompt_alternation = alternation(&prompts);

        let pagination = (!profile.pagination_marker.is_empty())
            .then(|| regex::escape(&profile.pagination_marker));

        let end_markers: Vec<String> = profile
            .end_markers
            .iter()
            .filter(|m| !m.is_empty())
            .map(|m| regex::escape(m))
            .collect();
        let end_of_config = (!end_markers.is_empty()).then(|| alternation(&end_markers));

        let mut read_parts = Vec::with_capacity(3);
        read_parts.extend(pagination.clone());
        read_parts.extend(end_of_config.clone());
        read_parts.push(prompt_alternation.clone());

        Ok(Self {
            pagination: pagination.as_deref().map(compile).transpose()?,
            end_of_config: end_of_config.as_deref().map(compile).transpose()?,
            prompt: compile(&prompt_alternation)?,
            read_pattern: compile(&alternation(&read_parts))?,
        })
    }

    /// Pattern to read until: pagination marker or any termination pattern.
    pub fn read_pattern(&self) -> &Regex {
        &self.read_pattern
    }

    /// Classify a section returned by a read.
    ///
    /// The pagination marker takes precedence: a section holding both the
    /// marker and a termination match still asks for the next page.
    pub fn classify(&self, section: &[u8]) -> Section {
        if self.pagination.as_ref().is_some_and(|p| p.is_match(section)) {
            return Section::More;
        }
        if let Some(m) = self.prompt.find_iter(section).last() {
            return Section::Prompt { start: m.start() };
        }
        if self.end_of_config.as_ref().is_some_and(|p| p.is_match(section)) {
            return Section::EndOfConfig;
        }
        Section::Incomplete
    }
}

fn alternation(parts: &[String]) -> String {
    parts
        .iter()
        .map(|p| format!("(?:{})", p))
        .collect::<Vec<_>>()
        .join("|")
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ChannelError::InvalidPattern(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(outer: Option<&str>, nested: Option<&str>) -> PromptContext {
        PromptContext {
            address: "10.0.0.5".to_string(),
            outer_hostname: outer.map(str::to_string),
            nested_hostname: nested.map(str::to_string),
        }
    }

    fn detector(outer: Option<&str>, nested: Option<&str>) -> TerminationDetector {
        TerminationDetector::new(&HopProfile::cisco_ios(), &context(outer, nested)).unwrap()
    }

    #[test]
    fn test_extract_hostname() {
        let t = ['#', '>'];
        assert_eq!(extract_hostname("router1#", &t).as_deref(), Some("router1"));
        assert_eq!(
            extract_hostname("ssh 10.0.0.5\np@ss\nrouter1#", &t).as_deref(),
            Some("router1")
        );
        assert_eq!(
            extract_hostname("\r\nWelcome\r\n\r\nedge-sw/2>", &t).as_deref(),
            Some("edge-sw/2")
        );
        assert_eq!(extract_hostname("\r\n#", &t), None);
        assert_eq!(extract_hostname("no prompt here", &t), None);
    }

    #[test]
    fn test_prompt_terminates() {
        let d = detector(Some("manager"), Some("router1"));
        assert_eq!(
            d.classify(b"end\r\nrouter1#"),
            Section::Prompt { start: 5 }
        );
        assert!(matches!(d.classify(b"\r\nrouter1(config)#"), Section::Prompt { .. }));
        assert!(matches!(d.classify(b"\r\nmanager#"), Section::Prompt { .. }));
        assert_eq!(d.classify(b"hostname router1\r\n"), Section::Incomplete);
    }

    #[test]
    fn test_bare_terminator_does_not_terminate() {
        let d = detector(Some("manager"), Some("router1"));
        assert_eq!(d.classify(b"banner motd > keep out\r\n"), Section::Incomplete);
        assert!(!d.read_pattern().is_match(b"banner motd > keep out\r\n"));
    }

    #[test]
    fn test_end_of_config() {
        let d = detector(Some("manager"), Some("router1"));
        assert_eq!(d.classify(b"!\r\nend\r\n"), Section::EndOfConfig);
        assert_eq!(d.classify(b"\x08\x08end\r\n"), Section::EndOfConfig);
        // "end" inside a word is not the end of the config
        assert_eq!(d.classify(b" description backend\r\n"), Section::Incomplete);
    }

    #[test]
    fn test_pagination_precedence() {
        let d = detector(Some("manager"), Some("router1"));
        assert_eq!(d.classify(b"interface Gi0 --More--"), Section::More);
        assert_eq!(d.classify(b"\nend\r\n --More--"), Section::More);
        assert_eq!(d.classify(b"router1# --More--"), Section::More);
        assert!(d.read_pattern().is_match(b"\nend\r\n"));
    }

    #[test]
    fn test_hostname_metacharacters_escaped() {
        let d = detector(None, Some("core.r1+(a)"));
        assert!(matches!(d.classify(b"\r\ncore.r1+(a)#"), Section::Prompt { .. }));
        // '.' and '+' must be literal
        assert_eq!(d.classify(b"\r\ncoreXr11(a)#"), Section::Incomplete);
    }

    #[test]
    fn test_unknown_hostnames_fall_back_to_terminator() {
        let d = detector(None, None);
        assert!(matches!(d.classify(b"output\r\nanything#"), Section::Prompt { .. }));
        assert!(d.read_pattern().is_match(b"x>"));
    }

    #[test]
    fn test_profile_without_pagination() {
        let profile = HopProfile::new("plain").with_end_marker("\nend\r\n");
        let d = TerminationDetector::new(&profile, &context(None, Some("sw1"))).unwrap();
        assert_eq!(d.classify(b"--More--"), Section::Incomplete);
        assert!(matches!(d.classify(b"\r\nsw1>"), Section::Prompt { .. }));
    }
}
