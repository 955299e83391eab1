//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use hopper_actions::{LaunchContext, RuleKind};

/// Dispatch text to commands using prefix and regex rules.
#[derive(Parser, Debug)]
#[command(name = "hopper", version, about)]
pub struct Cli {
    /// Log filter (overrides the settings file; `RUST_LOG` wins over both).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Display to launch commands on.
    #[arg(long, global = true)]
    pub display: Option<String>,

    /// Working directory for launched commands.
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch the command the first matching rule produces.
    Run {
        /// Input text; several words are joined with spaces.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Print the command that `run` would launch.
    Resolve {
        /// Input text; several words are joined with spaces.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// List rules in match order.
    List,
    /// Add a rule.
    Add {
        /// How the pattern is matched.
        #[arg(long, value_enum, default_value_t = KindArg::Prefix)]
        kind: KindArg,
        /// Prefix literal or regular expression.
        pattern: String,
        /// Command template (`%s`/`%S` for prefix rules, `\N` for regex rules).
        command: String,
    },
    /// Remove a rule by id.
    Remove {
        /// Rule id as shown by `list`.
        #[arg(allow_negative_numbers = true)]
        id: i32,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    Prefix,
    Regex,
}

impl From<KindArg> for RuleKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Prefix => Self::Prefix,
            KindArg::Regex => Self::Regex,
        }
    }
}

impl Cli {
    pub fn launch_context(&self) -> LaunchContext {
        LaunchContext {
            display: self.display.clone(),
            working_directory: self.cwd.clone(),
        }
    }
}

pub fn join_text(words: &[String]) -> String {
    words.join(" ")
}
