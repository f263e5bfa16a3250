//! The outer session: an interactive shell on the jump host.

use std::path::PathBuf;
use std::time::Duration;

use log::debug;
use regex::bytes::Regex;
use secrecy::SecretString;

use super::config::{AuthMethod, HostKeyVerification, JumpHostConfig};
use super::ssh::SshTransport;
use crate::channel::{PtyChannel, SessionChannel};
use crate::error::{ConfigError, Result};

/// Open shell on the jump host, ready to hop from.
///
/// Implements [`SessionChannel`], so a [`HopDriver`](crate::HopDriver) can
/// borrow it directly.
pub struct JumpSession {
    transport: SshTransport,
    channel: PtyChannel,
}

impl JumpSession {
    /// Connect, authenticate, open a shell and nudge the prompt.
    pub async fn open(config: &JumpHostConfig) -> Result<Self> {
        let transport = SshTransport::connect(config).await?;
        let mut channel = transport.open_shell(config).await?;

        wake(&mut channel, &config.wake_sequence).await?;
        debug!("shell open on {}", config.socket_addr());

        Ok(Self { transport, channel })
    }

    /// Timeout applied to every read.
    pub fn timeout(&self) -> Duration {
        self.channel.timeout()
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.channel.set_timeout(timeout);
    }

    pub fn channel(&self) -> &PtyChannel {
        &self.channel
    }

    /// Close the shell and disconnect.
    pub async fn close(self) -> Result<()> {
        self.channel.close().await?;
        self.transport.close().await
    }
}

impl SessionChannel for JumpSession {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.channel.write(data).await
    }

    async fn read_until(&mut self, pattern: &Regex) -> Result<String> {
        self.channel.read_until(pattern).await
    }
}

/// Builder for [`JumpSession`].
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use nethop::JumpSessionBuilder;
///
/// # async fn example() -> Result<(), nethop::Error> {
/// let session = JumpSessionBuilder::new("10.1.1.1")
///     .username("admin")
///     .password("secret")
///     .timeout(Duration::from_secs(10))
///     .open()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct JumpSessionBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: AuthMethod,
    timeout: Duration,
    terminal_width: u32,
    terminal_height: u32,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    wake_sequence: Vec<u8>,
}

impl JumpSessionBuilder {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: AuthMethod::None,
            timeout: Duration::from_secs(30),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            wake_sequence: b" ".to_vec(),
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Use password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Password(secret(password));
        self
    }

    /// Use private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        };
        self
    }

    /// Use private key authentication with an encrypted key.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: Some(secret(passphrase)),
        };
        self
    }

    /// Timeout for connecting and for every read on the shell.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Bytes sent right after the shell opens (default: a single space).
    ///
    /// Must not make the shell print another prompt: the first hop reads
    /// the jump host prompt once, and a second one would be taken for the
    /// element's.
    pub fn wake_sequence(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.wake_sequence = bytes.into();
        self
    }

    /// Validate and produce the configuration without connecting.
    pub fn build(self) -> Result<JumpHostConfig> {
        let username = self.username.ok_or_else(|| ConfigError::Invalid {
            message: "Username is required".to_string(),
        })?;

        Ok(JumpHostConfig {
            host: self.host,
            port: self.port,
            username,
            auth: self.auth,
            timeout: self.timeout,
            terminal_width: self.terminal_width,
            terminal_height: self.terminal_height,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
            wake_sequence: self.wake_sequence,
        })
    }

    /// Build the configuration and open the session.
    pub async fn open(self) -> Result<JumpSession> {
        let config = self.build()?;
        JumpSession::open(&config).await
    }
}

/// Nudge a freshly opened shell without submitting a line.
async fn wake<C: SessionChannel>(channel: &mut C, sequence: &[u8]) -> Result<()> {
    if sequence.is_empty() {
        return Ok(());
    }
    channel.write(sequence).await
}

fn secret(value: impl Into<String>) -> SecretString {
    SecretString::new(value.into().into_boxed_str())
}
