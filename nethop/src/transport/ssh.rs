//! SSH connection to the jump host.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use russh::client::{self, Handle};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use secrecy::ExposeSecret;

use super::config::{AuthMethod, HostKeyVerification, JumpHostConfig};
use crate::channel::PtyChannel;
use crate::error::{Result, TransportError};

/// Authenticated SSH connection to the jump host.
pub struct SshTransport {
    session: Handle<HostKeyGuard>,
}

impl SshTransport {
    /// Connect to the jump host and log in.
    ///
    /// Rejected credentials come back as
    /// [`TransportError::AuthenticationFailed`] so the caller can decide what
    /// to do with the run.
    pub async fn connect(config: &JumpHostConfig) -> Result<Self> {
        let guard = HostKeyGuard::new(config);
        let rejection = guard.rejection.clone();

        let ssh_config = Arc::new(client::Config {
            inactivity_timeout: Some(config.timeout),
            ..Default::default()
        });

        debug!("connecting to jump host {}", config.socket_addr());
        let handshake = client::connect(ssh_config, (config.host.as_str(), config.port), guard);
        let mut session = match tokio::time::timeout(config.timeout, handshake).await {
            Err(_) => return Err(TransportError::Timeout(config.timeout).into()),
            Ok(Err(e)) => {
                let reason = take_rejection(&rejection).unwrap_or(TransportError::Ssh(e));
                return Err(reason.into());
            }
            Ok(Ok(session)) => session,
        };

        if !login(&mut session, config).await? {
            return Err(TransportError::AuthenticationFailed {
                user: config.username.clone(),
            }
            .into());
        }
        debug!("logged in to {} as {}", config.host, config.username);

        Ok(Self { session })
    }

    /// Open the interactive shell the hops are typed into.
    pub async fn open_shell(&self, config: &JumpHostConfig) -> Result<PtyChannel> {
        let channel = self
            .session
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;

        // no terminal modes: the element's CLI handles its own echo
        channel
            .request_pty(
                true,
                "vt100",
                config.terminal_width,
                config.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(TransportError::Ssh)?;
        channel
            .request_shell(true)
            .await
            .map_err(TransportError::Ssh)?;

        Ok(PtyChannel::new(channel, &config.pty_config()))
    }

    pub async fn close(self) -> Result<()> {
        self.session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

/// Try the configured credentials once. `Ok(false)` means the server said no.
async fn login(session: &mut Handle<HostKeyGuard>, config: &JumpHostConfig) -> Result<bool> {
    let user = config.username.as_str();
    let result = match &config.auth {
        AuthMethod::None => session.authenticate_none(user).await,
        AuthMethod::Password(password) => {
            session
                .authenticate_password(user, password.expose_secret())
                .await
        }
        AuthMethod::PrivateKey { path, passphrase } => {
            let key = load_secret_key(path, passphrase.as_ref().map(|p| p.expose_secret()))
                .map_err(|e| TransportError::Key(format!("{}: {}", path.display(), e)))?;
            let hash_alg = session
                .best_supported_rsa_hash()
                .await
                .map_err(TransportError::Ssh)?
                .flatten();
            session
                .authenticate_publickey(user, PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg))
                .await
        }
    };

    Ok(result.map_err(TransportError::Ssh)?.success())
}

fn take_rejection(slot: &Mutex<Option<TransportError>>) -> Option<TransportError> {
    slot.lock().ok().and_then(|mut rejection| rejection.take())
}

/// Where the jump host's key stands against known_hosts.
enum KeyStatus {
    Known,
    Unknown,
}

/// Host key policy for the jump host connection.
///
/// russh only sees a yes/no answer; the reason for a refusal is parked in
/// `rejection` for `connect` to report.
struct HostKeyGuard {
    host: String,
    port: u16,
    policy: HostKeyVerification,
    known_hosts: Option<PathBuf>,
    rejection: Arc<Mutex<Option<TransportError>>>,
}

impl HostKeyGuard {
    fn new(config: &JumpHostConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            policy: config.host_key_verification.clone(),
            known_hosts: config.known_hosts_path.clone(),
            rejection: Arc::new(Mutex::new(None)),
        }
    }

    fn status(&self, key: &PublicKey) -> std::result::Result<KeyStatus, TransportError> {
        let checked = match &self.known_hosts {
            Some(path) => russh::keys::check_known_hosts_path(&self.host, self.port, key, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, key),
        };

        match checked {
            Ok(true) => Ok(KeyStatus::Known),
            Ok(false) => Ok(KeyStatus::Unknown),
            Err(russh::keys::Error::KeyChanged { line }) => Err(TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            }),
            Err(e) => Err(TransportError::KnownHosts(e.to_string())),
        }
    }

    fn remember(&self, key: &PublicKey) {
        let learned = match &self.known_hosts {
            Some(path) => {
                russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, key, path)
            }
            None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, key),
        };
        match learned {
            Ok(()) => info!("learned host key for {}:{}", self.host, self.port),
            // the connection still goes ahead, the key is just asked about again next time
            Err(e) => warn!("could not record host key for {}: {}", self.host, e),
        }
    }

    /// Apply the policy. `Err` carries the reason the key is refused.
    fn verify(&self, key: &PublicKey) -> std::result::Result<(), TransportError> {
        if matches!(self.policy, HostKeyVerification::Disabled) {
            return Ok(());
        }

        match (self.status(key)?, &self.policy) {
            (KeyStatus::Known, _) => Ok(()),
            (KeyStatus::Unknown, HostKeyVerification::AcceptNew) => {
                self.remember(key);
                Ok(())
            }
            (KeyStatus::Unknown, _) => Err(TransportError::HostKeyUnknown {
                host: self.host.clone(),
                port: self.port,
            }),
        }
    }
}

impl client::Handler for HostKeyGuard {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match self.verify(server_public_key) {
            Ok(()) => Ok(true),
            Err(reason) => {
                warn!("refusing host key of {}: {}", self.host, reason);
                if let Ok(mut slot) = self.rejection.lock() {
                    *slot = Some(reason);
                }
                Ok(false)
            }
        }
    }
}
