use crate::error::ConfigError;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Opaque identifier for a group of related messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupKey(usize);

impl GroupKey {
    pub fn id(&self) -> usize {
        self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
struct KeyRegistry {
    ids: HashMap<String, GroupKey>,
    labels: Vec<String>,
}

/// Key string to `GroupKey` assignments shared by every stream of a run.
/// Cloning shares the same registry.
#[derive(Debug, Clone, Default)]
pub struct GroupKeyTable {
    inner: Arc<Mutex<KeyRegistry>>,
}

impl GroupKeyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `key`, assigning the next one on first sight
    pub fn key_for(&self, key: &str) -> GroupKey {
        let mut registry = self.inner.lock();
        if let Some(id) = registry.ids.get(key) {
            return *id;
        }
        let id = GroupKey(registry.labels.len());
        registry.ids.insert(key.to_string(), id);
        registry.labels.push(key.to_string());
        id
    }

    /// The key string a `GroupKey` was assigned for
    pub fn label(&self, key: GroupKey) -> Option<String> {
        self.inner.lock().labels.get(key.0).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Derives a group key from message text using an ordered list of patterns
#[derive(Debug, Clone)]
pub struct SeparatorTracker {
    patterns: Vec<Regex>,
    table: GroupKeyTable,
}

impl SeparatorTracker {
    pub fn new(table: GroupKeyTable) -> Self {
        SeparatorTracker {
            patterns: Vec::new(),
            table,
        }
    }

    /// Replace the configured patterns
    pub fn set_patterns<I, S>(&mut self, patterns: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|e| ConfigError::invalid_pattern(p, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("installed {} separator patterns", compiled.len());
        self.patterns = compiled;
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        !self.patterns.is_empty()
    }

    pub fn table(&self) -> &GroupKeyTable {
        &self.table
    }

    pub fn group_key(&self, message: &str) -> Option<GroupKey> {
        for pattern in &self.patterns {
            if let Some(captures) = pattern.captures(message) {
                // First participating group, or the whole match
                let key = captures
                    .iter()
                    .skip(1)
                    .flatten()
                    .next()
                    .or_else(|| captures.get(0))
                    .map(|m| m.as_str())?;
                return Some(self.table.key_for(key));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_patterns_gives_no_key() {
        let tracker = SeparatorTracker::new(GroupKeyTable::new());
        assert!(!tracker.is_configured());
        assert_eq!(tracker.group_key("anything"), None);
    }

    #[test]
    fn test_capture_group_is_key() {
        let mut tracker = SeparatorTracker::new(GroupKeyTable::new());
        tracker.set_patterns([r"task (\d+)"]).unwrap();

        let a = tracker.group_key("start task 12 now").unwrap();
        let b = tracker.group_key("task 12 finished").unwrap();
        let c = tracker.group_key("task 13 started").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(tracker.table().label(a).as_deref(), Some("12"));
        assert_eq!(tracker.group_key("unrelated"), None);
    }

    #[test]
    fn test_whole_match_without_groups() {
        let mut tracker = SeparatorTracker::new(GroupKeyTable::new());
        tracker.set_patterns([r"onCreate|onDestroy"]).unwrap();
        let key = tracker.group_key("Activity onDestroy called").unwrap();
        assert_eq!(tracker.table().label(key).as_deref(), Some("onDestroy"));
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        let mut tracker = SeparatorTracker::new(GroupKeyTable::new());
        tracker.set_patterns([r"user=(\w+)", r"session=(\w+)"]).unwrap();
        let key = tracker.group_key("session=abc user=bob").unwrap();
        assert_eq!(tracker.table().label(key).as_deref(), Some("bob"));
    }

    #[test]
    fn test_set_patterns_replaces() {
        let mut tracker = SeparatorTracker::new(GroupKeyTable::new());
        tracker.set_patterns(["alpha"]).unwrap();
        tracker.set_patterns(["beta"]).unwrap();
        assert_eq!(tracker.group_key("alpha"), None);
        assert!(tracker.group_key("beta").is_some());
    }

    #[test]
    fn test_table_shared_between_trackers() {
        let table = GroupKeyTable::new();
        let mut first = SeparatorTracker::new(table.clone());
        let mut second = SeparatorTracker::new(table.clone());
        first.set_patterns([r"id=(\d+)"]).unwrap();
        second.set_patterns([r"id=(\d+)"]).unwrap();

        assert_eq!(first.group_key("id=7"), second.group_key("id=7"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_ids_are_small_and_sequential() {
        let table = GroupKeyTable::new();
        assert_eq!(table.key_for("a").id(), 0);
        assert_eq!(table.key_for("b").id(), 1);
        assert_eq!(table.key_for("a").id(), 0);
        assert_eq!(table.key_for("c").to_string(), "#2");
    }
}
