//! Nested login into the target element.

use log::debug;
use regex::bytes::Regex;
use secrecy::{ExposeSecret, SecretString};

use super::{HopDriver, HopFailure, HopOutcome};
use crate::channel::{PromptContext, SessionChannel, extract_hostname};
use crate::element::{Credentials, ElementDescriptor};
use crate::error::{ChannelError, Result};

impl<C: SessionChannel> HopDriver<'_, C> {
    /// Log in to `element` from the jump host prompt.
    ///
    /// Captures the jump host's prompt, types the connect command and the
    /// credentials, then classifies the reply. On rejected credentials the
    /// stuck login is interrupted and the jump host prompt drained before
    /// returning, so the next element can be tried on the same channel.
    pub async fn connect_hop(&mut self, element: &ElementDescriptor) -> Result<HopOutcome> {
        let terminators = self.profile.prompt_terminators.clone();

        let entry = self.channel.read_until(&self.terminator).await?;
        let outer_hostname = extract_hostname(&entry, &terminators);
        debug!("jump host prompt: {:?}", outer_hostname);

        let connect = format!("{} {}\n", element.connect_method.command(), element.address);
        self.channel.write(connect.as_bytes()).await?;

        match &element.credentials {
            Credentials::UsernamePassword { username, password } => {
                self.channel.write(format!("{}\n", username).as_bytes()).await?;
                self.send_secret(password).await?;
            }
            Credentials::Password(password) => self.send_secret(password).await?,
        }

        let welcome_pattern = self.welcome_pattern()?;
        let welcome = self.channel.read_until(&welcome_pattern).await?;

        if self.profile.unreachable_in(&welcome).is_some() {
            self.log.push(format!("{} host down", element.address));
            return Ok(HopOutcome::Failed(HopFailure::HostUnreachable));
        }

        if self.profile.auth_failure_in(&welcome).is_some() {
            self.log
                .push(format!("{} authentication failed", element.address));
            self.channel.write(&[self.profile.interrupt]).await?;
            self.channel.read_until(&self.terminator).await?;
            return Ok(HopOutcome::Failed(HopFailure::AuthFailed));
        }

        let nested_hostname = extract_hostname(&welcome, &terminators);
        debug!("{}: logged in, prompt {:?}", element.address, nested_hostname);

        Ok(HopOutcome::Connected(PromptContext {
            address: element.address.clone(),
            outer_hostname,
            nested_hostname,
        }))
    }

    async fn send_secret(&mut self, secret: &SecretString) -> Result<()> {
        let line = format!("{}\n", secret.expose_secret());
        self.channel.write(line.as_bytes()).await
    }

    /// A prompt terminator or any authentication failure marker.
    fn welcome_pattern(&self) -> Result<Regex> {
        let mut parts = vec![self.profile.terminator_class()];
        parts.extend(
            self.profile
                .auth_failure_markers
                .iter()
                .filter(|m| !m.is_empty())
                .map(|m| regex::escape(m)),
        );
        Regex::new(&parts.join("|")).map_err(|e| ChannelError::InvalidPattern(e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::scripted::ScriptedChannel;
    use crate::element::ConnectMethod;

    #[tokio::test]
    async fn test_password_only_sends_no_username() {
        let mut channel = ScriptedChannel::new("manager#ssh 10.0.0.5\r\nPassword: \r\nrouter1#");
        let element = ElementDescriptor::password_only(ConnectMethod::Ssh, "10.0.0.5", "p@ss");

        let mut driver = HopDriver::new(&mut channel).unwrap();
        let outcome = driver.connect_hop(&element).await.unwrap();

        assert_eq!(
            outcome,
            HopOutcome::Connected(PromptContext {
                address: "10.0.0.5".into(),
                outer_hostname: Some("manager".into()),
                nested_hostname: Some("router1".into()),
            })
        );
        assert_eq!(channel.writes(), vec!["ssh 10.0.0.5\n", "p@ss\n"]);
    }

    #[tokio::test]
    async fn test_username_then_password() {
        let mut channel = ScriptedChannel::new(
            "mgr>telnet 172.16.0.1\r\nUsername: admin\r\nPassword: \r\nsw-3>",
        );
        let element = ElementDescriptor::with_username(
            ConnectMethod::Telnet,
            "172.16.0.1",
            "admin",
            "secret",
        );

        let mut driver = HopDriver::new(&mut channel).unwrap();
        let outcome = driver.connect_hop(&element).await.unwrap();

        match outcome {
            HopOutcome::Connected(context) => {
                assert_eq!(context.outer_hostname.as_deref(), Some("mgr"));
                assert_eq!(context.nested_hostname.as_deref(), Some("sw-3"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(
            channel.writes(),
            vec!["telnet 172.16.0.1\n", "admin\n", "secret\n"]
        );
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let mut channel = ScriptedChannel::new(
            "manager#ssh 10.0.0.9\r\n% Connection refused by remote host\r\nmanager#",
        );
        let element = ElementDescriptor::password_only(ConnectMethod::Ssh, "10.0.0.9", "pw");

        let mut driver = HopDriver::new(&mut channel).unwrap();
        let outcome = driver.connect_hop(&element).await.unwrap();

        assert_eq!(outcome, HopOutcome::Failed(HopFailure::HostUnreachable));
        assert_eq!(driver.log().lines(), ["10.0.0.9 host down"]);
        assert_eq!(channel.writes().len(), 2);
    }

    #[tokio::test]
    async fn test_auth_failure_resynchronizes() {
        let mut channel = ScriptedChannel::new(concat!(
            "manager#",
            "ssh 10.0.0.7\r\nPassword: \r\n% Authentication failed.\r\nPassword: ",
            "^C\r\nmanager#",
            "next",
        ));
        let element = ElementDescriptor::password_only(ConnectMethod::Ssh, "10.0.0.7", "wrong");

        let mut driver = HopDriver::new(&mut channel).unwrap();
        let outcome = driver.connect_hop(&element).await.unwrap();

        assert_eq!(outcome, HopOutcome::Failed(HopFailure::AuthFailed));
        assert!(driver.log().contains("10.0.0.7"));
        assert_eq!(channel.writes().last().map(String::as_str), Some("\x03"));
        // the jump host prompt was drained, later output is untouched
        assert_eq!(channel.unread(), "next");
    }

    #[test]
    fn test_rejected_username_login() {
        let mut channel = ScriptedChannel::new(concat!(
            "mgr>",
            "telnet 172.16.0.1\r\nUsername: admin\r\nPassword: \r\n",
            "% Authentication failed.\r\n\r\nUsername: ",
            "^C\r\nmgr>",
        ));
        let element =
            ElementDescriptor::with_username(ConnectMethod::Telnet, "172.16.0.1", "admin", "no");

        let mut driver = HopDriver::new(&mut channel).unwrap();
        let outcome = tokio_test::block_on(driver.connect_hop(&element)).unwrap();

        assert_eq!(outcome, HopOutcome::Failed(HopFailure::AuthFailed));
        assert_eq!(driver.log().lines(), ["172.16.0.1 authentication failed"]);
        assert_eq!(channel.unread(), "");
    }

    #[tokio::test]
    async fn test_hostname_with_metacharacters() {
        let mut channel = ScriptedChannel::new("lab.mgr#ssh 10.0.0.1\r\ncore+r1(a)#");
        let element = ElementDescriptor::password_only(ConnectMethod::Ssh, "10.0.0.1", "pw");

        let mut driver = HopDriver::new(&mut channel).unwrap();
        match driver.connect_hop(&element).await.unwrap() {
            HopOutcome::Connected(context) => {
                assert_eq!(context.outer_hostname.as_deref(), Some("lab.mgr"));
                assert_eq!(context.nested_hostname.as_deref(), Some("core+r1(a)"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}
