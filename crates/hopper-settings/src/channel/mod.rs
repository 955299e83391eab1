//! Hierarchical key-value channel with change notifications.
//!
//! Keys are `/`-separated paths such as `/actions/action-3/pattern`.
//! Watchers receive `(key, Some(new_value))` when a key is written and
//! `(key, None)` when it is removed. Delivery is synchronous, on the thread
//! that made the change, and never while the channel holds its own locks.

mod property;
mod value;

pub use property::PropertyChannel;
pub use value::PropertyValue;

use crate::errors::Result;

/// Identifier of a registered watch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WatchId(pub(crate) u64);

/// Change callback: `(key, new value or None when removed)`.
pub type WatchCallback = Box<dyn Fn(&str, Option<&PropertyValue>) + Send + Sync>;

/// A configuration store the rule store can persist to and listen on.
pub trait ConfigChannel: Send + Sync {
    /// Whether `key` holds a value.
    fn has_property(&self, key: &str) -> bool;

    /// Current value of `key`.
    fn get(&self, key: &str) -> Option<PropertyValue>;

    /// Store `value` under `key`, notifying watchers if it changed.
    fn set(&self, key: &str, value: PropertyValue) -> Result<()>;

    /// Remove `key`, and every key below it when `recursive`.
    fn reset_property(&self, key: &str, recursive: bool) -> Result<()>;

    /// Register a change callback.
    fn watch(&self, callback: WatchCallback) -> WatchId;

    /// Remove a change callback. Unknown ids are ignored.
    fn unwatch(&self, id: WatchId);

    /// Suspend delivery to `id`. Calls nest; each needs an unblock.
    fn block_watch(&self, id: WatchId);

    /// Undo one [`block_watch`](Self::block_watch).
    fn unblock_watch(&self, id: WatchId);

    /// `key` as an integer; `None` if missing or not an `Int`.
    fn get_int(&self, key: &str) -> Option<i32> {
        self.get(key).and_then(|v| v.as_int())
    }

    /// `key` as a string; `None` if missing or not a `String`.
    fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// `key` as an integer array; `None` if missing or not an `IntArray`.
    fn get_int_array(&self, key: &str) -> Option<Vec<i32>> {
        match self.get(key)? {
            PropertyValue::IntArray(v) => Some(v),
            _ => None,
        }
    }

    /// Store an integer.
    fn set_int(&self, key: &str, value: i32) -> Result<()> {
        self.set(key, PropertyValue::Int(value))
    }

    /// Store a string.
    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.set(key, PropertyValue::String(value.to_owned()))
    }

    /// Store an integer array.
    fn set_int_array(&self, key: &str, value: Vec<i32>) -> Result<()> {
        self.set(key, PropertyValue::IntArray(value))
    }
}

/// Keeps a watch blocked until dropped.
pub struct BlockedWatch<'a> {
    channel: &'a dyn ConfigChannel,
    id: WatchId,
}

impl<'a> BlockedWatch<'a> {
    /// Block `id` on `channel` for the lifetime of the guard.
    pub fn new(channel: &'a dyn ConfigChannel, id: WatchId) -> Self {
        channel.block_watch(id);
        Self { channel, id }
    }
}

impl Drop for BlockedWatch<'_> {
    fn drop(&mut self) {
        self.channel.unblock_watch(self.id);
    }
}
