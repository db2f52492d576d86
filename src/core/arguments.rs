// src/core/arguments.rs

//! Named script arguments and their command-line rendering.

/// An insertion-ordered map of named script arguments.
///
/// Each entry becomes one command-line token of the form `"key"="value"`,
/// quotes included, in the order the keys were first set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentMap {
    entries: Vec<(String, String)>,
}

impl ArgumentMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`. An existing key keeps its position and gets the new value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// The value set for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no argument has been set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders every entry as a `"key"="value"` token.
    /// Values are not escaped; embedded quotes are passed through as-is.
    pub fn to_command_list(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(key, value)| format!("\"{}\"=\"{}\"", key, value))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ArgumentMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for ArgumentMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}
