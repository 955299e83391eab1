//! # hopper
//!
//! Command-line front end: loads settings, opens the rule channel, and
//! dispatches, resolves, lists, adds or removes rules.

#![deny(unsafe_code)]

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use hopper_actions::{Dispatcher, Outcome, RuleId, RuleStoreRegistry};
use hopper_settings::PropertyChannel;

use crate::cli::{Cli, Command, join_text};

fn main() -> Result<ExitCode> {
    let args = Cli::parse();

    // Settings come first: they carry the log level.
    let settings = hopper_settings::load_settings().unwrap_or_default();
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(settings.logging.level.as_str());
    hopper_core::logging::init_subscriber(level);

    let channel_path = settings.channel.resolved_path();
    let channel = PropertyChannel::from_settings(&settings.channel)
        .with_context(|| format!("failed to open rule channel {}", channel_path.display()))?;
    tracing::debug!(path = %channel_path.display(), "rule channel opened");

    let registry = RuleStoreRegistry::new(Arc::new(channel));
    let store = registry.acquire();
    let dispatcher = Dispatcher::from_settings(&settings.spawn);

    let code = match &args.command {
        Command::Run { text } => {
            let text = join_text(text);
            match dispatcher.execute(&store, &text, &args.launch_context())? {
                Outcome::Succeeded => ExitCode::SUCCESS,
                Outcome::NoRuleMatched => {
                    eprintln!("no rule matches {text:?}");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Resolve { text } => {
            let text = join_text(text);
            match dispatcher.resolve(&mut store.lock(), &text)? {
                Some(resolved) => {
                    println!("{}", resolved.command);
                    ExitCode::SUCCESS
                }
                None => {
                    eprintln!("no rule matches {text:?}");
                    ExitCode::FAILURE
                }
            }
        }
        Command::List => {
            for rule in store.lock().rules() {
                println!(
                    "{:>4}  {:<6}  {}  ->  {}",
                    rule.id(),
                    rule.kind(),
                    rule.pattern(),
                    rule.command()
                );
            }
            ExitCode::SUCCESS
        }
        Command::Add {
            kind,
            pattern,
            command,
        } => {
            let id = store
                .lock()
                .add_rule((*kind).into(), pattern, command)
                .context("failed to add rule")?;
            println!("{id}");
            ExitCode::SUCCESS
        }
        Command::Remove { id } => {
            if store.lock().remove_rule(RuleId::new(*id))? {
                ExitCode::SUCCESS
            } else {
                eprintln!("no rule with id {id}");
                ExitCode::FAILURE
            }
        }
    };

    registry.release(store);
    Ok(code)
}
