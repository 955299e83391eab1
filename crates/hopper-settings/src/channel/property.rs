//! In-memory property channel with optional JSON file backing.
//!
//! The backing file is a flat JSON object mapping keys to values:
//!
//! ```json
//! {
//!   "/actions": [2, 3],
//!   "/actions/action-2/type": 0,
//!   "/actions/action-2/pattern": "!w"
//! }
//! ```
//!
//! Entries whose value is not an int, string or int array are skipped with a
//! warning when the file is read, so one bad entry does not hide the rest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ConfigChannel, PropertyValue, WatchCallback, WatchId};
use crate::errors::{Result, SettingsError};
use crate::types::ChannelSettings;

type Properties = BTreeMap<String, PropertyValue>;
type SharedCallback = Arc<dyn Fn(&str, Option<&PropertyValue>) + Send + Sync>;

struct Watcher {
    id: WatchId,
    blocked: u32,
    callback: SharedCallback,
}

/// Reference [`ConfigChannel`] implementation.
///
/// Writes are persisted immediately when the channel is file-backed.
pub struct PropertyChannel {
    path: Option<PathBuf>,
    properties: Mutex<Properties>,
    watchers: Mutex<Vec<Watcher>>,
    next_watch_id: AtomicU64,
}

impl std::fmt::Debug for PropertyChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyChannel")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl PropertyChannel {
    /// A channel that lives only in memory.
    pub fn in_memory() -> Self {
        Self::with_properties(None, Properties::new())
    }

    /// Open a file-backed channel. A missing file starts an empty channel.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let properties = read_properties(&path)?;
        debug!(path = %path.display(), keys = properties.len(), "opened property channel");
        Ok(Self::with_properties(Some(path), properties))
    }

    /// Open the channel described by `settings`.
    pub fn from_settings(settings: &ChannelSettings) -> Result<Self> {
        Self::open(settings.resolved_path())
    }

    fn with_properties(path: Option<PathBuf>, properties: Properties) -> Self {
        Self {
            path,
            properties: Mutex::new(properties),
            watchers: Mutex::new(Vec::new()),
            next_watch_id: AtomicU64::new(1),
        }
    }

    /// The backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// All keys currently set, in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.properties.lock().keys().cloned().collect()
    }

    /// Re-read the backing file and notify watchers of every difference.
    ///
    /// This is how edits made to the file by another process reach the
    /// watchers. Returns the number of keys that changed. In-memory channels
    /// have nothing to reload and return 0.
    pub fn reload(&self) -> Result<usize> {
        let Some(path) = &self.path else {
            return Ok(0);
        };
        let fresh = read_properties(path)?;

        let changes: Vec<(String, Option<PropertyValue>)> = {
            let mut current = self.properties.lock();
            let mut changes: Vec<_> = fresh
                .iter()
                .filter(|(key, value)| current.get(*key) != Some(*value))
                .map(|(key, value)| (key.clone(), Some(value.clone())))
                .collect();
            changes.extend(
                current
                    .keys()
                    .filter(|key| !fresh.contains_key(*key))
                    .map(|key| (key.clone(), None)),
            );
            *current = fresh;
            changes
        };

        debug!(path = %path.display(), changed = changes.len(), "reloaded property channel");
        for (key, value) in &changes {
            self.notify(key, value.as_ref());
        }
        Ok(changes.len())
    }

    fn persist(&self, properties: &Properties) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(properties)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    fn notify(&self, key: &str, value: Option<&PropertyValue>) {
        let callbacks: Vec<SharedCallback> = self
            .watchers
            .lock()
            .iter()
            .filter(|w| w.blocked == 0)
            .map(|w| Arc::clone(&w.callback))
            .collect();
        for callback in callbacks {
            callback(key, value);
        }
    }

    fn update_watcher(&self, id: WatchId, f: impl FnOnce(&mut Watcher)) {
        if let Some(watcher) = self.watchers.lock().iter_mut().find(|w| w.id == id) {
            f(watcher);
        }
    }
}

impl ConfigChannel for PropertyChannel {
    fn has_property(&self, key: &str) -> bool {
        self.properties.lock().contains_key(key)
    }

    fn get(&self, key: &str) -> Option<PropertyValue> {
        self.properties.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: PropertyValue) -> Result<()> {
        {
            let mut properties = self.properties.lock();
            if properties.get(key) == Some(&value) {
                return Ok(());
            }
            let previous = properties.insert(key.to_owned(), value.clone());
            if let Err(error) = self.persist(&properties) {
                match previous {
                    Some(previous) => {
                        let _ = properties.insert(key.to_owned(), previous);
                    }
                    None => {
                        let _ = properties.remove(key);
                    }
                }
                return Err(error);
            }
        }
        self.notify(key, Some(&value));
        Ok(())
    }

    fn reset_property(&self, key: &str, recursive: bool) -> Result<()> {
        let removed: Vec<String> = {
            let mut properties = self.properties.lock();
            let subtree = format!("{key}/");
            let doomed: Vec<String> = properties
                .keys()
                .filter(|k| *k == key || (recursive && k.starts_with(&subtree)))
                .cloned()
                .collect();
            if doomed.is_empty() {
                return Ok(());
            }
            let taken: Vec<(String, PropertyValue)> = doomed
                .into_iter()
                .filter_map(|k| properties.remove_entry(&k))
                .collect();
            if let Err(error) = self.persist(&properties) {
                properties.extend(taken);
                return Err(error);
            }
            taken.into_iter().map(|(k, _)| k).collect()
        };
        for k in &removed {
            self.notify(k, None);
        }
        Ok(())
    }

    fn watch(&self, callback: WatchCallback) -> WatchId {
        let id = WatchId(self.next_watch_id.fetch_add(1, Ordering::Relaxed));
        self.watchers.lock().push(Watcher {
            id,
            blocked: 0,
            callback: Arc::from(callback),
        });
        id
    }

    fn unwatch(&self, id: WatchId) {
        self.watchers.lock().retain(|w| w.id != id);
    }

    fn block_watch(&self, id: WatchId) {
        self.update_watcher(id, |w| w.blocked += 1);
    }

    fn unblock_watch(&self, id: WatchId) {
        self.update_watcher(id, |w| w.blocked = w.blocked.saturating_sub(1));
    }
}

fn read_properties(path: &Path) -> Result<Properties> {
    if !path.exists() {
        return Ok(Properties::new());
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Properties::new());
    }
    let Value::Object(entries) = serde_json::from_str::<Value>(&content)? else {
        return Err(SettingsError::InvalidValue(format!(
            "{} does not contain a JSON object",
            path.display()
        )));
    };

    let mut properties = Properties::new();
    for (key, raw) in &entries {
        match PropertyValue::from_json(raw) {
            Some(value) => {
                let _ = properties.insert(key.clone(), value);
            }
            None => warn!(%key, path = %path.display(), "skipping unsupported channel value"),
        }
    }
    Ok(properties)
}
