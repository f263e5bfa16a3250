//! SSH transport to the jump host.
//!
//! Connection setup, authentication and host key checks wrap russh;
//! [`JumpSession`] is the resulting shell, ready to hop from.

pub mod config;
mod session;
mod ssh;

pub use config::{AuthMethod, HostKeyVerification, JumpHostConfig};
pub use session::{JumpSession, JumpSessionBuilder};
pub use ssh::SshTransport;
