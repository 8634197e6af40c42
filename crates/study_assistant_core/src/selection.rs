//! crates/study_assistant_core/src/selection.rs
//!
//! The selection set over the source collection. The set is persisted to the
//! durable storage tier on every mutation and reconciled against the live
//! source ids on load, so it is always a subset of the current collection.

use std::collections::HashSet;

/// A set of selected source ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Adds `id` if absent, removes it if present.
    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    pub fn insert(&mut self, id: &str) {
        self.ids.insert(id.to_string());
    }

    pub fn remove(&mut self, id: &str) {
        self.ids.remove(id);
    }

    /// Select-all with toggle semantics: if every current id is already
    /// selected, clear the set; otherwise select all current ids.
    ///
    /// With an empty `current_ids` the "all selected" test is vacuously true,
    /// so the set is cleared and stays empty on repeated calls.
    pub fn toggle_all<'a, I>(&mut self, current_ids: I)
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        let all_selected = current_ids.clone().into_iter().all(|id| self.ids.contains(id));
        if all_selected {
            self.ids.clear();
        } else {
            self.ids = current_ids.into_iter().map(str::to_string).collect();
        }
    }

    /// Intersects the set with the live source ids. Dangling ids are dropped;
    /// nothing is ever added.
    pub fn reconcile<'a, I>(&mut self, current_ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let live: HashSet<&str> = current_ids.into_iter().collect();
        self.ids.retain(|id| live.contains(id.as_str()));
    }

    /// Serializes to the JSON array stored under the `selectedSources` slot.
    pub fn to_json(&self) -> String {
        let mut ids: Vec<&String> = self.ids.iter().collect();
        ids.sort();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    /// Parses a persisted value. Anything unreadable yields an empty set.
    pub fn from_json(raw: &str) -> Self {
        let ids: HashSet<String> = serde_json::from_str::<Vec<String>>(raw)
            .map(|v| v.into_iter().collect())
            .unwrap_or_default();
        Self { ids }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_then_removes() {
        let mut set = SelectionSet::new();
        set.toggle("a");
        assert!(set.contains("a"));
        set.toggle("a");
        assert!(!set.contains("a"));
    }

    #[test]
    fn toggle_all_selects_everything_when_any_is_unselected() {
        let mut set = SelectionSet::new();
        set.insert("a");
        set.toggle_all(["a", "b", "c"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn toggle_all_clears_when_everything_is_selected() {
        let mut set = SelectionSet::new();
        set.toggle_all(["a", "b"]);
        set.toggle_all(["a", "b"]);
        assert!(set.is_empty());
    }

    #[test]
    fn toggle_all_twice_restores_the_empty_set() {
        // select-all then select-all again with no source change toggles back.
        let mut set = SelectionSet::new();
        let before = set.clone();
        set.toggle_all(["a", "b"]);
        set.toggle_all(["a", "b"]);
        assert_eq!(set, before);
    }

    #[test]
    fn toggle_all_on_empty_source_list_stays_empty() {
        let mut set = SelectionSet::new();
        set.toggle_all(std::iter::empty::<&str>());
        assert!(set.is_empty());
        set.toggle_all(std::iter::empty::<&str>());
        assert!(set.is_empty());
    }

    #[test]
    fn reconcile_drops_dangling_ids_and_never_adds() {
        let mut set = SelectionSet::from_json(r#"["a","b","stale"]"#);
        set.reconcile(["a", "b", "c"]);
        assert!(set.contains("a"));
        assert!(set.contains("b"));
        assert!(!set.contains("stale"));
        assert!(!set.contains("c"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn persisted_round_trip() {
        let mut set = SelectionSet::new();
        set.insert("s1");
        set.insert("s2");
        assert_eq!(SelectionSet::from_json(&set.to_json()), set);
    }

    #[test]
    fn garbage_persisted_value_is_an_empty_set() {
        assert!(SelectionSet::from_json("not json").is_empty());
        assert!(SelectionSet::from_json(r#"{"a":1}"#).is_empty());
    }
}
