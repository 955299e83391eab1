//! # hopper-settings
//!
//! Configuration for the Hopper dispatcher, in two parts:
//!
//! 1. **Settings** ([`HopperSettings`]): where the rule channel lives, how
//!    commands are spawned, and the log level. Loaded from three layers in
//!    priority order:
//!    - compiled defaults ([`HopperSettings::default()`])
//!    - the user file `~/.hopper/settings.json` (deep-merged over defaults)
//!    - `HOPPER_*` environment variables (highest priority)
//! 2. **Property channel** ([`ConfigChannel`], [`PropertyChannel`]): a
//!    hierarchical key-value store with typed values and synchronous change
//!    notifications. The rule store persists its rules here.
//!
//! # Usage
//!
//! ```no_run
//! use hopper_settings::{load_settings, ConfigChannel, PropertyChannel};
//!
//! let settings = load_settings().unwrap_or_default();
//! let channel = PropertyChannel::from_settings(&settings.channel).unwrap();
//! println!("{} rules persisted", channel.get_int_array("/actions").unwrap_or_default().len());
//! ```
//!
//! ## Crate Position
//!
//! Standalone (no hopper crate dependencies).
//! Depended on by: hopper-actions and the hopper binary.

#![deny(unsafe_code)]

pub mod channel;
pub mod errors;
pub mod loader;
pub mod types;

pub use channel::{
    BlockedWatch, ConfigChannel, PropertyChannel, PropertyValue, WatchCallback, WatchId,
};
pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, hopper_home, load_settings, load_settings_from_path, settings_path};
pub use types::*;
