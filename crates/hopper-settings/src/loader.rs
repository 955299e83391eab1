//! Layered settings loading.
//!
//! Later layers win:
//! 1. compiled [`HopperSettings::default()`]
//! 2. `~/.hopper/settings.json`, deep-merged over the defaults
//! 3. `HOPPER_*` environment variables
//!
//! The result is passed through [`HopperSettings::validate`].

use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::HopperSettings;

/// Root of Hopper's per-user state (`~/.hopper`).
pub fn hopper_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".hopper")
}

/// Path of the user settings file (`~/.hopper/settings.json`).
pub fn settings_path() -> PathBuf {
    hopper_home().join("settings.json")
}

/// Load settings from [`settings_path`].
pub fn load_settings() -> Result<HopperSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings with `path` as the user layer.
///
/// A missing file contributes nothing; unreadable files and malformed JSON
/// are errors.
pub fn load_settings_from_path(path: &Path) -> Result<HopperSettings> {
    let mut layered = serde_json::to_value(HopperSettings::default())?;

    match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!(path = %path.display(), "merging user settings");
            layered = deep_merge(layered, serde_json::from_str(&content)?);
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no user settings file");
        }
        Err(e) => return Err(e.into()),
    }

    let mut settings: HopperSettings = serde_json::from_value(layered)?;
    apply_env_overrides(&mut settings);
    settings.validate();
    Ok(settings)
}

/// Merge `source` over `target`.
///
/// Objects merge key by key, recursively. Any other `source` value replaces
/// the target outright, except `null`, which leaves the target untouched.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (target, Value::Null) => target,
        (Value::Object(target), Value::Object(source)) => Value::Object(merge_maps(target, source)),
        (_, source) => source,
    }
}

fn merge_maps(mut target: Map<String, Value>, source: Map<String, Value>) -> Map<String, Value> {
    for (key, value) in source {
        let merged = match target.remove(&key) {
            Some(existing) => deep_merge(existing, value),
            None if value.is_null() => continue,
            None => value,
        };
        let _ = target.insert(key, merged);
    }
    target
}

/// Apply `HOPPER_*` environment overrides.
///
/// Empty values are ignored, and so are booleans that do not parse (with a
/// warning).
pub fn apply_env_overrides(settings: &mut HopperSettings) {
    if let Some(v) = env_value("HOPPER_CHANNEL_NAME") {
        settings.channel.name = v;
    }
    if let Some(v) = env_value("HOPPER_CHANNEL_PATH") {
        settings.channel.path = Some(v);
    }
    if let Some(v) = env_value("HOPPER_SPAWN_CWD") {
        settings.spawn.working_directory = Some(v);
    }
    if let Some(v) = env_value("HOPPER_LOG_LEVEL") {
        settings.logging.level = v;
    }

    if let Ok(raw) = std::env::var("HOPPER_INHERIT_DISPLAY") {
        match parse_bool(&raw) {
            Some(v) => settings.spawn.inherit_display = v,
            None => warn!(name = "HOPPER_INHERIT_DISPLAY", value = %raw, "ignoring invalid boolean"),
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    let value = std::env::var(name).ok().filter(|v| !v.is_empty())?;
    debug!(name, "settings override from environment");
    Some(value)
}

/// Parse a boolean flag.
///
/// Case-insensitive `true`/`1`/`yes`/`on` and `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
