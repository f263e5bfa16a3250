//! Error types for nethop.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for nethop operations.
///
/// Hop outcomes that the caller is expected to recover from (an unreachable
/// element, rejected credentials) are not errors; see
/// [`HopFailure`](crate::hop::HopFailure).
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Element or profile configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Transport layer errors (connection to the jump host, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// The jump host rejected our credentials
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// The host key differs from the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// The host is not in known_hosts and strict checking is enabled
    #[error("Host key for {host}:{port} is unknown")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connecting took longer than the configured timeout
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors (pattern matching over the shell channel).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Pattern matching timed out
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Configuration errors. These are fatal for the element they describe.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Authentication mode is neither `Password` nor `Username:Password`
    #[error("Unknown authentication mode '{value}'")]
    InvalidAuthMode { value: String },

    /// Connect method is neither `ssh` nor `telnet`
    #[error("Unknown connect method '{value}'")]
    InvalidConnectMethod { value: String },

    /// `Username:Password` authentication without a username
    #[error("Element {address} uses username authentication but has no username")]
    MissingUsername { address: String },

    /// Required builder field was not set
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Result type alias using nethop's Error.
pub type Result<T> = std::result::Result<T, Error>;
