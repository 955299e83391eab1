//! Environment expansion applied to a command after template expansion.

/// Resolves variables such as `$HOME` or `~` in a command line.
pub trait VariableExpander: Send + Sync {
    /// Return `command` with variables resolved.
    fn expand(&self, command: &str) -> String;
}

/// Resolves against the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentExpander;

impl VariableExpander for EnvironmentExpander {
    fn expand(&self, command: &str) -> String {
        hopper_core::text::expand_variables(command)
    }
}

/// Leaves commands untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityExpander;

impl VariableExpander for IdentityExpander {
    fn expand(&self, command: &str) -> String {
        command.to_owned()
    }
}
