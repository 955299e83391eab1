//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so a user
//! file only needs the fields it changes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::loader::hopper_home;

/// Default name of the channel that stores the dispatch rules.
pub const DEFAULT_CHANNEL_NAME: &str = "hopper-actions";

/// Root settings type.
///
/// ```json
/// {
///   "channel": { "name": "hopper-actions" },
///   "spawn": { "inheritDisplay": true },
///   "logging": { "level": "warn" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HopperSettings {
    /// Location of the property channel holding the rules.
    pub channel: ChannelSettings,
    /// Process spawning options.
    pub spawn: SpawnSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl HopperSettings {
    /// Repair values that would leave the dispatcher unusable.
    ///
    /// Called automatically during loading. Bad values are replaced with
    /// their defaults and a warning, rather than rejected.
    pub fn validate(&mut self) {
        if self.channel.name.trim().is_empty() {
            tracing::warn!("channel name is empty, using {DEFAULT_CHANNEL_NAME}");
            self.channel.name = DEFAULT_CHANNEL_NAME.to_string();
        }
        if self.channel.name.contains('/') {
            let sanitized = self.channel.name.replace('/', "-");
            tracing::warn!(name = %self.channel.name, %sanitized, "channel name contains '/'");
            self.channel.name = sanitized;
        }
        if self.logging.level.trim().is_empty() {
            self.logging.level = LoggingSettings::default().level;
        }
    }
}

/// Property channel location.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelSettings {
    /// Channel name; selects `~/.hopper/channels/<name>.json`.
    pub name: String,
    /// Explicit file path, overriding the name-derived location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_CHANNEL_NAME.to_string(),
            path: None,
        }
    }
}

impl ChannelSettings {
    /// File backing the channel.
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => PathBuf::from(path),
            None => hopper_home()
                .join("channels")
                .join(format!("{}.json", self.name)),
        }
    }
}

/// Process spawning options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpawnSettings {
    /// Working directory for launched commands (inherits ours when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    /// Pass the launch context's display through as `DISPLAY`.
    pub inherit_display: bool,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            working_directory: None,
            inherit_display: true,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default `tracing` filter directive (e.g. `"warn"`, `"hopper_actions=debug"`).
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}
