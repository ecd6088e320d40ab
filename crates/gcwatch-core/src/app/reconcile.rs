//! Reconcile - ポーリング結果と直前のスナップショットをキーで突き合わせる

use std::collections::BTreeMap;

use crate::domain::{GcJobStatus, StoreDiff};

/// Replace `current` with `incoming` and return what changed.
///
/// Records are keyed by `store`. If `incoming` repeats a key the last
/// occurrence wins, so the resulting collection never holds duplicates.
pub fn reconcile(
    current: &mut BTreeMap<String, GcJobStatus>,
    incoming: Vec<GcJobStatus>,
) -> StoreDiff {
    let mut next = BTreeMap::new();
    for record in incoming {
        next.insert(record.store.clone(), record);
    }

    let mut diff = StoreDiff::default();
    for (key, record) in &next {
        match current.get(key) {
            None => diff.added.push(key.clone()),
            Some(previous) if previous != record => diff.updated.push(key.clone()),
            Some(_) => {}
        }
    }
    diff.removed = current
        .keys()
        .filter(|key| !next.contains_key(*key))
        .cloned()
        .collect();

    *current = next;
    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(store: &str, schedule: Option<&str>) -> GcJobStatus {
        let mut job = GcJobStatus::new(store);
        job.schedule = schedule.map(str::to_string);
        job
    }

    #[test]
    fn first_load_adds_everything() {
        let mut current = BTreeMap::new();
        let diff = reconcile(&mut current, vec![job("b", None), job("a", None)]);

        assert_eq!(diff.added, vec!["a", "b"]);
        assert!(diff.updated.is_empty());
        assert!(diff.removed.is_empty());
        assert_eq!(current.len(), 2);
    }

    #[test]
    fn detects_added_updated_removed() {
        let mut current = BTreeMap::new();
        reconcile(
            &mut current,
            vec![job("a", None), job("b", Some("daily")), job("c", None)],
        );

        let diff = reconcile(
            &mut current,
            vec![job("a", None), job("b", Some("weekly")), job("d", None)],
        );

        assert_eq!(diff.added, vec!["d"]);
        assert_eq!(diff.updated, vec!["b"]);
        assert_eq!(diff.removed, vec!["c"]);
        assert_eq!(
            current.keys().cloned().collect::<Vec<_>>(),
            vec!["a", "b", "d"]
        );
    }

    #[test]
    fn identical_response_yields_empty_diff() {
        let mut current = BTreeMap::new();
        reconcile(&mut current, vec![job("a", Some("daily"))]);
        let diff = reconcile(&mut current, vec![job("a", Some("daily"))]);
        assert!(diff.is_empty());
    }

    #[test]
    fn duplicate_keys_collapse_to_last_occurrence() {
        let mut current = BTreeMap::new();
        let diff = reconcile(
            &mut current,
            vec![job("a", Some("daily")), job("a", Some("hourly"))],
        );

        assert_eq!(diff.added, vec!["a"]);
        assert_eq!(current.len(), 1);
        assert_eq!(current["a"].schedule.as_deref(), Some("hourly"));
    }

    #[test]
    fn empty_response_removes_all() {
        let mut current = BTreeMap::new();
        reconcile(&mut current, vec![job("a", None), job("b", None)]);
        let diff = reconcile(&mut current, vec![]);
        assert_eq!(diff.removed, vec!["a", "b"]);
        assert!(current.is_empty());
    }
}
