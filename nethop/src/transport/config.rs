//! Jump host connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::channel::PtyConfig;

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Default)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys.
    Strict,

    /// Accept and learn unknown keys, reject changed keys.
    #[default]
    AcceptNew,

    /// Accept all keys without checking. For lab use only.
    Disabled,
}

/// Authentication method for the jump host.
#[derive(Debug)]
pub enum AuthMethod {
    /// No authentication (for testing only).
    None,

    /// Password authentication.
    Password(SecretString),

    /// Private key authentication.
    PrivateKey {
        /// Path to the private key file.
        path: PathBuf,
        /// Optional passphrase for encrypted keys.
        passphrase: Option<SecretString>,
    },
}

/// Connection settings for the jump host (the outer session).
#[derive(Debug)]
pub struct JumpHostConfig {
    /// Hostname or IP address.
    pub host: String,

    /// SSH port (default: 22).
    pub port: u16,

    /// Username for authentication.
    pub username: String,

    /// Authentication method.
    pub auth: AuthMethod,

    /// Timeout for connecting, and for every pattern read on the shell.
    pub timeout: Duration,

    /// Terminal width for the PTY.
    pub terminal_width: u32,

    /// Terminal height for the PTY.
    pub terminal_height: u32,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts; `None` uses the user's default file.
    pub known_hosts_path: Option<PathBuf>,

    /// Bytes sent once the shell is open. Must not submit a line, or the
    /// shell prints a second prompt.
    pub wake_sequence: Vec<u8>,
}

impl JumpHostConfig {
    /// Socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// PTY settings derived from this configuration.
    pub fn pty_config(&self) -> PtyConfig {
        PtyConfig {
            timeout: self.timeout,
            terminal_width: self.terminal_width,
            terminal_height: self.terminal_height,
            ..PtyConfig::default()
        }
    }
}
