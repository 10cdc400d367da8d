//! Command templates run on behalf of a mode.
//!
//! A template is a command string where `%%` (or `%1`) stands for the chosen
//! target, e.g. `paste-buffer -b '%%'`. The host parses and queues the
//! rendered command; the engine never executes anything itself.

use crate::error::CommandError;

/// Host-side command parsing and queueing.
pub trait CommandHost {
    type Command;

    /// Returns `false` when there is no client to act for.
    fn has_client(&self) -> bool {
        true
    }

    /// Parses a rendered command; the error is a human-readable cause.
    fn parse(&mut self, command: &str) -> Result<Self::Command, String>;

    /// Queues a parsed command for asynchronous execution.
    fn enqueue(&mut self, command: Self::Command);

    /// Shows a transient message to the user.
    fn status_message(&mut self, message: &str);
}

/// Replaces every `%%` and `%1` in `template` with `target`.
pub fn template_replace(template: &str, target: &str) -> String {
    let mut out = String::with_capacity(template.len() + target.len());
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '%' && matches!(chars.peek(), Some('%' | '1')) {
            chars.next();
            out.push_str(target);
        } else {
            out.push(ch);
        }
    }
    out
}

/// Renders `template` for `target` and queues it on `host`.
///
/// A blank rendering queues nothing and is not reported. A parse failure
/// is shown to the user as a status message and returned.
pub fn run_command<H>(host: &mut H, template: &str, target: &str) -> Result<(), CommandError>
where
    H: CommandHost + ?Sized,
{
    let command = template_replace(template, target);
    if command.trim().is_empty() {
        return Err(CommandError::Empty);
    }

    match host.parse(&command) {
        Ok(parsed) => {
            log::debug!("queueing command: {command}");
            host.enqueue(parsed);
            Ok(())
        }
        Err(cause) => {
            let err = CommandError::parse(cause);
            host.status_message(&err.to_string());
            Err(err)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Accepts any command whose first word is in `known`.
    #[derive(Default)]
    pub(crate) struct RecordingHost {
        pub(crate) known: Vec<&'static str>,
        pub(crate) queued: Vec<String>,
        pub(crate) messages: Vec<String>,
        pub(crate) detached: bool,
    }

    impl RecordingHost {
        pub(crate) fn knowing(known: &[&'static str]) -> Self {
            Self {
                known: known.to_vec(),
                ..Self::default()
            }
        }
    }

    impl CommandHost for RecordingHost {
        type Command = String;

        fn has_client(&self) -> bool {
            !self.detached
        }

        fn parse(&mut self, command: &str) -> Result<String, String> {
            let name = command.split_whitespace().next().unwrap_or_default();
            if self.known.contains(&name) {
                Ok(command.to_string())
            } else {
                Err(format!("unknown command: {name}"))
            }
        }

        fn enqueue(&mut self, command: String) {
            self.queued.push(command);
        }

        fn status_message(&mut self, message: &str) {
            self.messages.push(message.to_string());
        }
    }

    #[test]
    fn replaces_every_placeholder() {
        assert_eq!(
            template_replace("paste-buffer -b '%%'; show '%1'", "buffer0"),
            "paste-buffer -b 'buffer0'; show 'buffer0'"
        );
    }

    #[test]
    fn other_percent_sequences_are_literal() {
        assert_eq!(template_replace("echo 50%2 %", "x"), "echo 50%2 %");
    }

    #[test]
    fn queues_parsed_command() {
        let mut host = RecordingHost::knowing(&["select-window"]);
        let result = run_command(&mut host, "select-window -t '%%'", "main:1");
        assert_eq!(result, Ok(()));
        assert_eq!(host.queued, vec!["select-window -t 'main:1'".to_string()]);
        assert!(host.messages.is_empty());
    }

    #[test]
    fn parse_failure_is_reported_and_not_queued() {
        let mut host = RecordingHost::knowing(&["select-window"]);
        let result = run_command(&mut host, "frobnicate '%%'", "main");
        assert_eq!(result, Err(CommandError::parse("unknown command: frobnicate")));
        assert_eq!(host.messages, vec!["Unknown command: frobnicate".to_string()]);
        assert!(host.queued.is_empty());
    }

    #[test]
    fn blank_command_is_silent() {
        let mut host = RecordingHost::knowing(&[]);
        assert_eq!(run_command(&mut host, " %%", ""), Err(CommandError::Empty));
        assert!(host.messages.is_empty());
    }
}
