use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};

/// API keys handed out round-robin, one per request attempt.
pub struct KeyRing {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl KeyRing {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            keys,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn next_key(&self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed);
        Some(self.keys[idx % self.keys.len()].as_str())
    }
}

/// Reads `primary` as a comma separated list, then `{primary}_2` through
/// `{primary}_10`. Blank entries are skipped.
pub fn keys_from_env(primary: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Ok(raw) = env::var(primary) {
        keys.extend(split_keys(&raw));
    }
    for idx in 2..=10 {
        if let Ok(value) = env::var(format!("{}_{}", primary, idx)) {
            keys.extend(split_keys(&value));
        }
    }
    keys
}

fn split_keys(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
}
