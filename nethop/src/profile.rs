//! Device profiles: the fixed vocabulary of prompts and markers a nested
//! element's CLI speaks.

/// Markers and keystrokes used while driving a nested element.
///
/// The defaults describe Cisco IOS style devices. Each entry can be
/// overridden for devices with a different vocabulary.
///
/// ```rust
/// use nethop::HopProfile;
///
/// let profile = HopProfile::cisco_ios()
///     .with_pagination_marker("-- More --")
///     .with_invalid_input_marker("% Unknown command");
/// assert_eq!(profile.pagination_marker, "-- More --");
/// ```
#[derive(Debug, Clone)]
pub struct HopProfile {
    /// Profile name.
    pub name: String,

    /// Characters that end a prompt.
    pub prompt_terminators: Vec<char>,

    /// "More output available" indicator.
    pub pagination_marker: String,

    /// Keystroke answering the pagination marker.
    pub continuation: String,

    /// Literal texts marking the end of a configuration listing.
    pub end_markers: Vec<String>,

    /// Texts meaning the nested login was rejected.
    pub auth_failure_markers: Vec<String>,

    /// Texts meaning the element could not be reached.
    pub unreachable_markers: Vec<String>,

    /// Texts meaning the device did not accept a command.
    pub invalid_input_markers: Vec<String>,

    /// Control byte that aborts a stuck login prompt.
    pub interrupt: u8,

    /// Command that leaves the nested element.
    pub exit_command: String,
}

impl HopProfile {
    /// Create an empty profile; every marker must be added explicitly.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt_terminators: vec!['#', '>'],
            pagination_marker: String::new(),
            continuation: " ".to_string(),
            end_markers: vec![],
            auth_failure_markers: vec![],
            unreachable_markers: vec![],
            invalid_input_markers: vec![],
            interrupt: 0x03,
            exit_command: "exit".to_string(),
        }
    }

    /// Cisco IOS and look-alikes.
    pub fn cisco_ios() -> Self {
        Self::new("cisco_ios")
            .with_pagination_marker("--More--")
            .with_end_marker("\nend\r\n")
            .with_end_marker("\x08end\r\n")
            .with_auth_failure_marker("Authentication failed")
            .with_unreachable_marker("% Connection timed out; remote host not responding")
            .with_unreachable_marker("% Connection refused by remote host")
            .with_invalid_input_marker("Invalid input detected")
    }

    pub fn with_prompt_terminators(mut self, terminators: &[char]) -> Self {
        self.prompt_terminators = terminators.to_vec();
        self
    }

    pub fn with_pagination_marker(mut self, marker: impl Into<String>) -> Self {
        self.pagination_marker = marker.into();
        self
    }

    pub fn with_continuation(mut self, keystroke: impl Into<String>) -> Self {
        self.continuation = keystroke.into();
        self
    }

    pub fn with_end_marker(mut self, marker: impl Into<String>) -> Self {
        self.end_markers.push(marker.into());
        self
    }

    pub fn with_auth_failure_marker(mut self, marker: impl Into<String>) -> Self {
        self.auth_failure_markers.push(marker.into());
        self
    }

    pub fn with_unreachable_marker(mut self, marker: impl Into<String>) -> Self {
        self.unreachable_markers.push(marker.into());
        self
    }

    pub fn with_invalid_input_marker(mut self, marker: impl Into<String>) -> Self {
        self.invalid_input_markers.push(marker.into());
        self
    }

    pub fn with_interrupt(mut self, byte: u8) -> Self {
        self.interrupt = byte;
        self
    }

    pub fn with_exit_command(mut self, command: impl Into<String>) -> Self {
        self.exit_command = command.into();
        self
    }

    /// Regex character class matching any prompt terminator, e.g. `[#>]`.
    pub(crate) fn terminator_class(&self) -> String {
        let escaped: String = self
            .prompt_terminators
            .iter()
            .map(|c| regex::escape(&c.to_string()))
            .collect();
        format!("[{}]", escaped)
    }

    /// Returns the first auth failure marker contained in `text`.
    pub fn auth_failure_in<'a>(&'a self, text: &str) -> Option<&'a str> {
        first_contained(&self.auth_failure_markers, text)
    }

    /// Returns the first unreachable marker contained in `text`.
    pub fn unreachable_in<'a>(&'a self, text: &str) -> Option<&'a str> {
        first_contained(&self.unreachable_markers, text)
    }

    /// Returns the first invalid-input marker contained in `text`.
    pub fn invalid_input_in<'a>(&'a self, text: &str) -> Option<&'a str> {
        first_contained(&self.invalid_input_markers, text)
    }
}

impl Default for HopProfile {
    fn default() -> Self {
        Self::cisco_ios()
    }
}

fn first_contained<'a>(markers: &'a [String], text: &str) -> Option<&'a str> {
    markers
        .iter()
        .find(|m| !m.is_empty() && text.contains(m.as_str()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cisco_defaults() {
        let profile = HopProfile::default();
        assert_eq!(profile.name, "cisco_ios");
        assert_eq!(profile.pagination_marker, "--More--");
        assert_eq!(profile.end_markers.len(), 2);
        assert_eq!(profile.interrupt, 0x03);

        let class = regex::Regex::new(&profile.terminator_class()).unwrap();
        assert!(class.is_match("router1#"));
        assert!(class.is_match("router1>"));
        assert!(!class.is_match("router1$"));
    }

    #[test]
    fn test_marker_lookup() {
        let profile = HopProfile::cisco_ios();
        assert_eq!(
            profile.unreachable_in("\r\n% Connection refused by remote host\r\nmgr#"),
            Some("% Connection refused by remote host")
        );
        assert_eq!(
            profile.auth_failure_in("Password:\r\n% Authentication failed."),
            Some("Authentication failed")
        );
        assert!(profile.invalid_input_in("router1#").is_none());
    }

    #[test]
    fn test_empty_profile_matches_nothing() {
        let profile = HopProfile::new("bare").with_auth_failure_marker("");
        assert!(profile.auth_failure_in("anything").is_none());
    }
}
