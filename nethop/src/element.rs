//! Descriptors for the nested network elements reached through the jump host.

use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

/// Command used on the jump host to reach the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectMethod {
    Ssh,
    Telnet,
}

impl ConnectMethod {
    /// The command word typed on the jump host (`ssh` or `telnet`).
    pub fn command(&self) -> &'static str {
        match self {
            ConnectMethod::Ssh => "ssh",
            ConnectMethod::Telnet => "telnet",
        }
    }
}

impl FromStr for ConnectMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ssh" => Ok(ConnectMethod::Ssh),
            "telnet" => Ok(ConnectMethod::Telnet),
            _ => Err(ConfigError::InvalidConnectMethod {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ConnectMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

/// How the element asks for credentials after the connect command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Only a password prompt (typical for `ssh user@...` style logins).
    PasswordOnly,
    /// Username prompt followed by a password prompt (typical for telnet).
    UsernamePassword,
}

impl FromStr for AuthMode {
    type Err = ConfigError;

    /// Accepts the inventory spellings `Password` and `Username:Password`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Password" | "password" => Ok(AuthMode::PasswordOnly),
            "Username:Password" | "username:password" => Ok(AuthMode::UsernamePassword),
            _ => Err(ConfigError::InvalidAuthMode {
                value: s.to_string(),
            }),
        }
    }
}

/// Credentials typed into the nested login.
///
/// A username only exists for [`AuthMode::UsernamePassword`].
#[derive(Debug)]
pub enum Credentials {
    Password(SecretString),
    UsernamePassword {
        username: String,
        password: SecretString,
    },
}

impl Credentials {
    pub fn auth_mode(&self) -> AuthMode {
        match self {
            Credentials::Password(_) => AuthMode::PasswordOnly,
            Credentials::UsernamePassword { .. } => AuthMode::UsernamePassword,
        }
    }
}

/// A network element reachable from the jump host.
#[derive(Debug)]
pub struct ElementDescriptor {
    /// `ssh` or `telnet`.
    pub connect_method: ConnectMethod,

    /// Credentials for the nested login.
    pub credentials: Credentials,

    /// Address handed to the connect command.
    pub address: String,
}

impl ElementDescriptor {
    /// Element that only prompts for a password.
    pub fn password_only(
        connect_method: ConnectMethod,
        address: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            connect_method,
            credentials: Credentials::Password(secret(password)),
            address: address.into(),
        }
    }

    /// Element that prompts for a username and then a password.
    pub fn with_username(
        connect_method: ConnectMethod,
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            connect_method,
            credentials: Credentials::UsernamePassword {
                username: username.into(),
                password: secret(password),
            },
            address: address.into(),
        }
    }

    /// Build a descriptor from loose parts, validating that a username is
    /// present exactly when the mode needs one.
    pub fn new(
        connect_method: ConnectMethod,
        auth_mode: AuthMode,
        username: Option<String>,
        password: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let address = address.into();
        match auth_mode {
            AuthMode::PasswordOnly => Ok(Self::password_only(connect_method, address, password)),
            AuthMode::UsernamePassword => match username.filter(|u| !u.is_empty()) {
                Some(username) => Ok(Self::with_username(
                    connect_method,
                    address,
                    username,
                    password,
                )),
                None => Err(ConfigError::MissingUsername { address }),
            },
        }
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.credentials.auth_mode()
    }
}

/// An inventory row as stored on disk, before validation.
///
/// ```rust
/// use nethop::element::{ElementDescriptor, ElementRecord};
///
/// let record = ElementRecord {
///     line: "telnet".into(),
///     authentication: "Username:Password".into(),
///     username: Some("admin".into()),
///     password: "secret".into(),
///     ip_address: "172.16.0.1".into(),
/// };
/// let element = ElementDescriptor::try_from(record).unwrap();
/// assert_eq!(element.address, "172.16.0.1");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ElementRecord {
    /// Connect method, `ssh` or `telnet`.
    pub line: String,
    /// `Password` or `Username:Password`.
    pub authentication: String,
    #[serde(default)]
    pub username: Option<String>,
    pub password: String,
    pub ip_address: String,
}

impl TryFrom<ElementRecord> for ElementDescriptor {
    type Error = ConfigError;

    fn try_from(record: ElementRecord) -> Result<Self, Self::Error> {
        let connect_method = record.line.parse()?;
        let auth_mode = record.authentication.parse()?;
        ElementDescriptor::new(
            connect_method,
            auth_mode,
            record.username,
            record.password,
            record.ip_address,
        )
    }
}

fn secret(value: impl Into<String>) -> SecretString {
    SecretString::new(value.into().into_boxed_str())
}
