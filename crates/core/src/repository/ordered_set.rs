//! Sorted, duplicate-free container backing the in-memory repository.

use crate::domain::Ordered;

/// A `Vec` kept sorted by [`Ordered::sort_key`], rejecting items equal to
/// one already present.
///
/// Equality and sort key may be different fields (authors are equal by id
/// but sorted by name), so duplicates are detected by equality and the
/// insertion point by binary search on the key. Items with equal keys keep
/// their insertion order.
#[derive(Debug, Clone)]
pub struct OrderedSet<T> {
    items: Vec<T>,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Ordered + PartialEq> OrderedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert in sort position. Returns false (and drops `item`) if an equal
    /// item is already stored.
    pub fn insert(&mut self, item: T) -> bool {
        if self.items.contains(&item) {
            return false;
        }
        let key = item.sort_key();
        let at = self.items.partition_point(|existing| existing.sort_key() <= key);
        self.items.insert(at, item);
        true
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|item| predicate(*item))
    }

    /// Mutable access for updating fields that do not affect the sort key.
    pub fn find_mut(&mut self, predicate: impl Fn(&T) -> bool) -> Option<&mut T> {
        self.items.iter_mut().find(|item| predicate(&**item))
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Remove the first item matching `predicate`.
    pub fn remove_where(&mut self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        let at = self.items.iter().position(predicate)?;
        Some(self.items.remove(at))
    }

    /// Remove every item matching `predicate`, returning them.
    pub fn drain_where(&mut self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let (removed, kept): (Vec<T>, Vec<T>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| predicate(item));
        self.items = kept;
        removed
    }
}

impl<T> OrderedSet<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Author, Podcast};

    #[test]
    fn test_insert_keeps_sort_order() {
        let mut set = OrderedSet::new();
        set.insert(Podcast::new(3, 1, "c").unwrap());
        set.insert(Podcast::new(1, 1, "a").unwrap());
        set.insert(Podcast::new(2, 1, "b").unwrap());

        let ids: Vec<_> = set.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicates_rejected_by_equality() {
        let mut set = OrderedSet::new();
        assert!(set.insert(Author::new(1, "Joe Toste").unwrap()));
        // same id, different name: still the same author
        assert!(!set.insert(Author::new(1, "Someone Else").unwrap()));
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().unwrap().name(), "Joe Toste");
    }

    #[test]
    fn test_authors_sorted_by_name() {
        let mut set = OrderedSet::new();
        set.insert(Author::new(1, "USA Radio").unwrap());
        set.insert(Author::new(2, "Brian Denny").unwrap());
        set.insert(Author::new(3, "Joe Toste").unwrap());

        let names: Vec<_> = set.iter().map(|a| a.name().to_string()).collect();
        assert_eq!(names, vec!["Brian Denny", "Joe Toste", "USA Radio"]);
    }

    #[test]
    fn test_equal_keys_keep_insertion_order() {
        let mut set = OrderedSet::new();
        set.insert(Author::new(5, "Same").unwrap());
        set.insert(Author::new(2, "Same").unwrap());
        let ids: Vec<_> = set.iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec![5, 2]);
    }

    #[test]
    fn test_remove_and_drain() {
        let mut set = OrderedSet::new();
        for id in 1..=5 {
            set.insert(Podcast::new(id, id % 2, "p").unwrap());
        }
        assert_eq!(set.remove_where(|p| p.id() == 3).map(|p| p.id()), Some(3));
        assert!(set.remove_where(|p| p.id() == 3).is_none());

        let odd_author = set.drain_where(|p| p.author_id() == 1);
        assert_eq!(odd_author.len(), 2);
        let ids: Vec<_> = set.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![2, 4]);
    }
}
