//! # hopper-actions
//!
//! Turns free-form input such as `!w rust` or `https://example.com` into a
//! launched command, using an ordered list of user-editable rules.
//!
//! ## Module Overview
//!
//! - [`types`]: [`Rule`], [`RuleKind`], [`RuleId`]
//! - [`defaults`]: the rules written on first run
//! - [`keys`]: channel key layout (`/actions/action-<id>/<field>`)
//! - [`store`]: [`RuleStore`]: load, save, sort, live updates, editing
//! - [`registry`]: [`RuleStoreRegistry`] / [`RuleStoreHandle`]: shared,
//!   reference-counted store wired to channel notifications
//! - [`matcher`]: prefix and lazily-compiled regex matching
//! - [`expander`]: `%s`/`%S`/`%%` and `\N`/`\g<name>` template expansion
//! - [`variables`]: environment expansion of the final command
//! - [`spawn`]: [`CommandSpawner`] seam and the fire-and-forget [`ShellSpawner`]
//! - [`dispatcher`]: [`Dispatcher::execute`], the single entry point
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hopper_actions::{Dispatcher, LaunchContext, Outcome, RuleStoreRegistry};
//! use hopper_settings::{load_settings, PropertyChannel};
//!
//! let settings = load_settings().unwrap_or_default();
//! let channel = Arc::new(PropertyChannel::from_settings(&settings.channel).unwrap());
//! let registry = RuleStoreRegistry::new(channel);
//! let store = registry.acquire();
//!
//! let dispatcher = Dispatcher::from_settings(&settings.spawn);
//! match dispatcher.execute(&store, "!w rust", &LaunchContext::default()) {
//!     Ok(Outcome::Succeeded) => {}
//!     Ok(Outcome::NoRuleMatched) => println!("no rule for that"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```
//!
//! ## Crate Position
//!
//! Depends on hopper-core and hopper-settings. Depended on by the hopper binary.

#![deny(unsafe_code)]

pub mod defaults;
pub mod dispatcher;
pub mod errors;
pub mod expander;
pub mod keys;
pub mod matcher;
pub mod registry;
pub mod spawn;
pub mod store;
pub mod types;
pub mod variables;

pub use dispatcher::{Dispatcher, Outcome, ResolvedCommand};
pub use errors::{ActionsError, Result, SpawnError};
pub use registry::{RuleStoreHandle, RuleStoreRegistry};
pub use spawn::{CommandSpawner, LaunchContext, ShellSpawner};
pub use store::RuleStore;
pub use types::{Rule, RuleId, RuleKind};
pub use variables::{EnvironmentExpander, IdentityExpander, VariableExpander};
