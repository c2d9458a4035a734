use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

/// Immutable view of the selection at one point in time.
///
/// Cloning is cheap. Two snapshots taken without a mutation in between
/// share the same allocation, which is what [`SelectionSnapshot::same_as`]
/// checks.
#[derive(Debug, Clone)]
pub struct SelectionSnapshot<Id> {
    ids: Arc<HashSet<Id>>,
}

impl<Id: Eq + Hash> SelectionSnapshot<Id> {
    fn new(ids: HashSet<Id>) -> Self {
        Self { ids: Arc::new(ids) }
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Id> {
        self.ids.iter()
    }

    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ids, &other.ids)
    }
}

impl<Id: Eq + Hash> PartialEq for SelectionSnapshot<Id> {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other) || *self.ids == *other.ids
    }
}

impl<Id: Eq + Hash> Eq for SelectionSnapshot<Id> {}

/// Everything the user has marked, independent of the active filter.
#[derive(Debug)]
pub struct SelectionStore<Id> {
    current: SelectionSnapshot<Id>,
}

impl<Id: Eq + Hash + Clone> SelectionStore<Id> {
    pub fn new() -> Self {
        Self {
            current: SelectionSnapshot::new(HashSet::new()),
        }
    }

    pub fn snapshot(&self) -> SelectionSnapshot<Id> {
        self.current.clone()
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.current.contains(id)
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn toggle(&mut self, id: Id) {
        let mut next = (*self.current.ids).clone();
        if !next.remove(&id) {
            next.insert(id);
        }
        self.current = SelectionSnapshot::new(next);
    }

    pub fn select_many<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = Id>,
    {
        let missing: Vec<Id> = ids
            .into_iter()
            .filter(|id| !self.current.contains(id))
            .collect();
        if missing.is_empty() {
            return;
        }

        let mut next = (*self.current.ids).clone();
        next.extend(missing);
        self.current = SelectionSnapshot::new(next);
    }

    pub fn deselect_many<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a Id>,
        Id: 'a,
    {
        let present: Vec<&Id> = ids
            .into_iter()
            .filter(|id| self.current.contains(id))
            .collect();
        if present.is_empty() {
            return;
        }

        let mut next = (*self.current.ids).clone();
        for id in present {
            next.remove(id);
        }
        self.current = SelectionSnapshot::new(next);
    }

    /// Keeps only the ids for which `keep` returns true. Used to drop ids
    /// whose items left the underlying collection.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Id) -> bool,
    {
        if self.current.iter().all(|id| keep(id)) {
            return;
        }

        let next = self.current.iter().filter(|id| keep(id)).cloned().collect();
        self.current = SelectionSnapshot::new(next);
    }

    pub fn clear(&mut self) {
        if self.current.is_empty() {
            return;
        }
        self.current = SelectionSnapshot::new(HashSet::new());
    }
}

impl<Id: Eq + Hash + Clone> Default for SelectionStore<Id> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut store = SelectionStore::new();

        store.toggle("a");
        assert!(store.contains(&"a"));
        assert_eq!(store.len(), 1);

        store.toggle("a");
        assert!(!store.contains(&"a"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_mutation_publishes_new_snapshot() {
        let mut store = SelectionStore::new();
        let before = store.snapshot();

        store.toggle(1u64);
        let after = store.snapshot();

        assert!(!before.same_as(&after));
        assert!(before.is_empty());
        assert!(after.contains(&1));
    }

    #[test]
    fn test_select_many_is_a_union() {
        let mut store = SelectionStore::new();
        store.toggle(1u64);

        store.select_many([1, 2, 3]);

        assert_eq!(store.len(), 3);
        assert!(store.contains(&2));
        assert!(store.contains(&3));
    }

    #[test]
    fn test_select_many_without_new_ids_keeps_snapshot() {
        let mut store = SelectionStore::new();
        store.select_many([1u64, 2]);
        let before = store.snapshot();

        store.select_many([2, 1]);

        assert!(before.same_as(&store.snapshot()));
    }

    #[test]
    fn test_deselect_many_is_a_difference() {
        let mut store = SelectionStore::new();
        store.select_many([1u64, 2, 3, 4]);

        store.deselect_many(&[2, 4, 9]);

        assert_eq!(store.len(), 2);
        assert!(store.contains(&1));
        assert!(store.contains(&3));
    }

    #[test]
    fn test_clear_on_empty_store_is_a_noop() {
        let mut store: SelectionStore<u64> = SelectionStore::new();
        let before = store.snapshot();

        store.clear();

        let after = store.snapshot();
        assert!(before.same_as(&after));
        assert_eq!(before, after);
        assert!(after.is_empty());
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut store = SelectionStore::new();
        store.select_many(["a", "b"]);

        store.clear();

        assert!(store.is_empty());
    }

    #[test]
    fn test_retain_drops_stale_ids() {
        let mut store = SelectionStore::new();
        store.select_many([1u64, 2, 3]);

        store.retain(|id| *id != 2);

        assert_eq!(store.len(), 2);
        assert!(!store.contains(&2));
    }

    #[test]
    fn test_old_snapshot_is_unaffected_by_later_mutation() {
        let mut store = SelectionStore::new();
        store.select_many(["a", "b"]);
        let held = store.snapshot();

        store.deselect_many(&["a"]);

        assert!(held.contains(&"a"));
        assert!(!store.contains(&"a"));
    }

    #[test]
    fn test_snapshots_compare_by_value() {
        let mut left = SelectionStore::new();
        let mut right = SelectionStore::new();
        left.select_many([1u64, 2]);
        right.toggle(2);
        right.toggle(1);

        assert_eq!(left.snapshot(), right.snapshot());
        assert!(!left.snapshot().same_as(&right.snapshot()));
    }
}
