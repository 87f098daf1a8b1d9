//! A process-wide table of string properties.
//!
//! Sessions publish their driver address here so that code running inside a
//! session can find it, and remove it when they end.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The property table.
static PROPERTIES: Mutex<BTreeMap<String, String>> = Mutex::new(BTreeMap::new());

/// Locks the table, ignoring poisoning since every write leaves it consistent.
fn table() -> MutexGuard<'static, BTreeMap<String, String>> {
    PROPERTIES.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sets a property, returning its previous value.
pub fn set(key: &str, value: impl Into<String>) -> Option<String> {
    table().insert(key.to_string(), value.into())
}

/// Returns the value of a property.
#[must_use]
pub fn get(key: &str) -> Option<String> {
    table().get(key).cloned()
}

/// Removes a property, returning its value.
pub fn remove(key: &str) -> Option<String> {
    table().remove(key)
}

/// Whether a property is set.
#[must_use]
pub fn contains(key: &str) -> bool {
    table().contains_key(key)
}
