/// Failure to enter a mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModeTreeError {
    /// The host has no client to attach the mode to.
    #[error("no client available")]
    NoClient,

    /// A mode must offer at least one sort order.
    #[error("sort list is empty")]
    EmptySortList,
}

/// Failure to turn a command template into a queued command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The rendered template was empty; nothing to run.
    #[error("command is empty")]
    Empty,

    /// The host's parser rejected the rendered command.
    #[error("{}", capitalize(cause))]
    Parse { cause: String },
}

impl CommandError {
    pub fn parse(cause: impl Into<String>) -> Self {
        Self::Parse {
            cause: cause.into(),
        }
    }
}

fn capitalize(cause: &str) -> String {
    let mut chars = cause.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
