//! Paged command capture on a logged-in element.

use log::{debug, trace};

use super::{CommandTranscript, HopDriver, RawOutput};
use crate::channel::{PromptContext, Section, SessionChannel, TerminationDetector};
use crate::error::Result;

impl<C: SessionChannel> HopDriver<'_, C> {
    /// Run one command on the element, then leave it.
    pub async fn run_command(&mut self, context: &PromptContext, command: &str) -> Result<RawOutput> {
        self.run_commands(context, &[command]).await
    }

    /// Run `commands` in order on the element reached by
    /// [`connect_hop`](Self::connect_hop), answering every pagination
    /// marker, then send the exit command.
    ///
    /// Commands the device rejects are logged and their output kept.
    pub async fn run_commands(
        &mut self,
        context: &PromptContext,
        commands: &[&str],
    ) -> Result<RawOutput> {
        let detector = TerminationDetector::new(&self.profile, context)?;

        let mut transcripts = Vec::with_capacity(commands.len());
        for command in commands {
            let transcript = self.run_paged(context, &detector, command).await?;
            debug!(
                "{}: `{}` done, {} page(s), {} bytes",
                context.address,
                command,
                transcript.pages + 1,
                transcript.raw.len()
            );
            transcripts.push(transcript);
        }

        let exit = format!("{}\n", self.profile.exit_command);
        self.channel.write(exit.as_bytes()).await?;

        Ok(RawOutput {
            hostname: context.nested_hostname.clone(),
            transcripts,
        })
    }

    async fn run_paged(
        &mut self,
        context: &PromptContext,
        detector: &TerminationDetector,
        command: &str,
    ) -> Result<CommandTranscript> {
        let mut transcript = CommandTranscript::new(command);
        self.channel.write(format!("{}\n", command).as_bytes()).await?;

        loop {
            let section = self.channel.read_until(detector.read_pattern()).await?;
            let kind = detector.classify(section.as_bytes());
            trace!("section {:?}: {} bytes", kind, section.len());

            match kind {
                // the prompt is not output; drop it
                Section::Prompt { start } => {
                    transcript.raw.push_str(section.get(..start).unwrap_or(&section))
                }
                _ => transcript.raw.push_str(&section),
            }

            if !transcript.unavailable && self.profile.invalid_input_in(&transcript.raw).is_some() {
                transcript.unavailable = true;
                self.log.push(format!(
                    "{} command `{}` not available",
                    context.address, command
                ));
            }

            match kind {
                Section::More => {
                    transcript.pages += 1;
                    self.channel.write(self.profile.continuation.as_bytes()).await?;
                }
                Section::Prompt { .. } => break,
                Section::EndOfConfig => {
                    self.channel.read_until(&self.terminator).await?;
                    break;
                }
                Section::Incomplete => {}
            }
        }

        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::scripted::ScriptedChannel;

    fn context() -> PromptContext {
        PromptContext {
            address: "10.0.0.5".into(),
            outer_hostname: Some("manager".into()),
            nested_hostname: Some("router1".into()),
        }
    }

    #[tokio::test]
    async fn test_single_page() {
        let mut channel =
            ScriptedChannel::new("show clock\r\n*12:00:00.000 UTC Mon Oct 19 2026\r\nrouter1#");

        let mut driver = HopDriver::new(&mut channel).unwrap();
        let output = driver.run_command(&context(), "show clock").await.unwrap();

        assert_eq!(output.raw(), "show clock\r\n*12:00:00.000 UTC Mon Oct 19 2026\r\n");
        assert_eq!(output.transcripts[0].pages, 0);
        assert_eq!(output.hostname.as_deref(), Some("router1"));
        assert_eq!(channel.count_writes(" "), 0);
        assert_eq!(channel.writes(), vec!["show clock\n", "exit\n"]);
    }

    #[tokio::test]
    async fn test_n_pages_then_end_of_config() {
        let mut channel = ScriptedChannel::new(concat!(
            "show run\r\nseg-1\r\n --More--",
            " seg-2\r\n --More--",
            " seg-3\r\n --More--",
            " seg-4\r\nend\r\n",
            "router1#",
        ));

        let mut driver = HopDriver::new(&mut channel).unwrap();
        let output = driver.run_command(&context(), "show run").await.unwrap();

        assert_eq!(channel.count_writes(" "), 3);
        assert_eq!(output.transcripts[0].pages, 3);

        let raw = output.raw();
        let positions: Vec<usize> = ["seg-1", "seg-2", "seg-3", "seg-4", "\nend\r\n"]
            .iter()
            .map(|s| raw.find(s).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        // the prompt after "end" was drained before exiting
        assert_eq!(channel.unread(), "");
        assert_eq!(channel.writes().last().map(String::as_str), Some("exit\n"));
    }

    #[tokio::test]
    async fn test_commands_run_sequentially() {
        let mut channel = ScriptedChannel::new(concat!(
            "show version\r\nCisco IOS 15.2\r\nrouter1#",
            "show clock\r\n12:00:00\r\nrouter1#",
        ));

        let mut driver = HopDriver::new(&mut channel).unwrap();
        let output = driver
            .run_commands(&context(), &["show version", "show clock"])
            .await
            .unwrap();

        assert_eq!(output.transcripts.len(), 2);
        assert_eq!(output.transcripts[1].command, "show clock");
        assert_eq!(
            channel.writes(),
            vec!["show version\n", "show clock\n", "exit\n"]
        );
    }

    #[tokio::test]
    async fn test_invalid_input_logged_and_kept() {
        let mut channel = ScriptedChannel::new(concat!(
            "show bogus\r\n",
            "              ^\r\n% Invalid input detected at '^' marker.\r\n\r\n",
            "router1#",
            "show clock\r\n12:00:00\r\nrouter1#",
        ));

        let mut driver = HopDriver::new(&mut channel).unwrap();
        let output = driver
            .run_commands(&context(), &["show bogus", "show clock"])
            .await
            .unwrap();

        assert_eq!(output.unavailable(), vec!["show bogus".to_string()]);
        assert!(output.raw().contains("% Invalid input detected"));
        assert_eq!(
            driver.log().lines(),
            ["10.0.0.5 command `show bogus` not available"]
        );
    }

    #[tokio::test]
    async fn test_return_to_outer_prompt_terminates() {
        let mut channel =
            ScriptedChannel::new("show run\r\n\r\nConnection closed by foreign host.\r\nmanager#");

        let mut driver = HopDriver::new(&mut channel).unwrap();
        let output = driver.run_command(&context(), "show run").await.unwrap();
        assert!(output.raw().ends_with("foreign host.\r\n"));
    }

    #[tokio::test]
    async fn test_section_without_terminator_times_out() {
        let mut channel = ScriptedChannel::new("show run\r\nhostname router1\r\n");

        let mut driver = HopDriver::new(&mut channel).unwrap();
        assert!(driver.run_command(&context(), "show run").await.is_err());
        // exit is never sent on a failed hop
        assert_eq!(channel.writes(), vec!["show run\n"]);
    }
}
