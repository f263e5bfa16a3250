//! # nethop
//!
//! Async configuration collection from network elements reached through a
//! jump host.
//!
//! nethop opens one SSH shell on a management host, then logs in to each
//! element from that shell with `ssh` or `telnet`, runs commands while
//! answering `--More--` pagination, exits back to the jump host and hands
//! back cleaned output plus a per-element diagnostic log.
//!
//! ## Features
//!
//! - Async SSH to the jump host via russh
//! - Nested logins with password-only or username/password credentials
//! - Prompt tracking for both the jump host and the element
//! - Pagination answering and transcript sanitizing
//! - Unreachable hosts and rejected logins reported without tearing down
//!   the outer session
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nethop::{ConnectMethod, ElementDescriptor, ExecOutcome, HopDriver, JumpSessionBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), nethop::Error> {
//!     let mut session = JumpSessionBuilder::new("10.1.1.1")
//!         .username("admin")
//!         .password("secret")
//!         .open()
//!         .await?;
//!
//!     let element = ElementDescriptor::password_only(ConnectMethod::Ssh, "10.0.0.5", "enable");
//!
//!     let mut driver = HopDriver::new(&mut session)?;
//!     if let ExecOutcome::Completed(response) = driver.exec(&element, &["show run"]).await? {
//!         println!("{}", response.result);
//!     }
//!     print!("{}", driver.log().text());
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod element;
pub mod error;
pub mod hop;
pub mod profile;
pub mod transport;

pub use channel::{PromptContext, PtyChannel, SessionChannel};
pub use element::{AuthMode, ConnectMethod, Credentials, ElementDescriptor, ElementRecord};
pub use error::Error;
pub use hop::{
    CommandTranscript, DEFAULT_EXTRACTION_COMMAND, ExecOutcome, HopDriver, HopFailure, HopLog,
    HopOutcome, HopResponse, RawOutput, Sanitizer, sanitize,
};
pub use profile::HopProfile;
pub use transport::{AuthMethod, HostKeyVerification, JumpHostConfig, JumpSession, JumpSessionBuilder};
