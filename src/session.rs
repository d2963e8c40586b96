//! Session store seam.
//!
//! The host framework owns session lifecycle. The gate only reads and, after
//! a successful Basic login, writes [`SESSION_USERNAME_KEY`].

use std::collections::HashMap;

/// Session key holding the username of a client that passed the gate.
pub const SESSION_USERNAME_KEY: &str = "moat_username";

/// A key-value store scoped to one client session.
///
/// Two concurrent requests sharing a session may both write
/// [`SESSION_USERNAME_KEY`]; the last write wins and implementations need no
/// extra locking for the gate's sake.
pub trait SessionStore {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String);
}

impl SessionStore for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }
}
