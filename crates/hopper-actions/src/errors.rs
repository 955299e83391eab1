//! Error types for rule handling and dispatch.

use hopper_settings::SettingsError;

/// Errors surfaced by the rule store and the dispatcher.
///
/// "No rule matched" is not an error; see [`crate::Outcome`].
#[derive(Debug, thiserror::Error)]
pub enum ActionsError {
    /// A rule definition was rejected (empty pattern or command).
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// A regex pattern failed to compile.
    #[error("invalid pattern \"{pattern}\": {source}")]
    RegexCompile {
        /// The offending pattern.
        pattern: String,
        /// Compiler diagnostic.
        #[source]
        source: regex::Error,
    },

    /// A regex rule matched but its command template could not be expanded.
    #[error("failed to expand command \"{template}\": {reason}")]
    RegexExpansion {
        /// The command template.
        template: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The expanded command could not be launched.
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    /// Persisting rules to the channel failed.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Failures launching a command line.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    /// The command line has unbalanced quotes or a dangling escape.
    #[error("failed to parse command line \"{command}\"")]
    Parse {
        /// The command line as given.
        command: String,
    },

    /// The command line contained no program.
    #[error("command line is empty")]
    Empty,

    /// The operating system refused to start the program.
    #[error("failed to execute \"{program}\": {source}")]
    Launch {
        /// Program name (first word of the command line).
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for rule and dispatch operations.
pub type Result<T> = std::result::Result<T, ActionsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expansion_error_display() {
        let err = ActionsError::RegexExpansion {
            template: r"open \q".into(),
            reason: r"unknown escape sequence '\q'".into(),
        };
        assert_eq!(
            err.to_string(),
            r#"failed to expand command "open \q": unknown escape sequence '\q'"#
        );
    }

    #[test]
    fn compile_error_keeps_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = ActionsError::RegexCompile {
            pattern: "(".into(),
            source,
        };
        assert!(err.to_string().starts_with("invalid pattern \"(\""));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn spawn_error_is_transparent() {
        let err: ActionsError = SpawnError::Launch {
            program: "no-such-helper".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        }
        .into();
        assert!(matches!(err, ActionsError::Spawn(SpawnError::Launch { .. })));
        assert_eq!(
            err.to_string(),
            "failed to execute \"no-such-helper\": not found"
        );
    }

    #[test]
    fn empty_and_parse_display() {
        assert_eq!(SpawnError::Empty.to_string(), "command line is empty");
        let err = SpawnError::Parse {
            command: "echo 'x".into(),
        };
        assert!(err.to_string().contains("echo 'x"));
    }
}
