//! Named entity pools.
//!
//! Each pool is a dense `Vec` plus a `HashMap` from name to index. Removal
//! swaps the victim with the last element and re-indexes the survivor in the
//! same call, so the map and the sequence never disagree. Order is not
//! preserved across removals.

use std::collections::HashMap;

/// A name of this many bytes or more is rejected.
pub const NAME_LENGTH_LIMIT: usize = 100;
pub const MAX_NAME_LEN: usize = NAME_LENGTH_LIMIT - 1;

pub trait Named {
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("name '{0}' already exists")]
    DuplicateName(String),
    #[error("name '{name}' is longer than {max} bytes")]
    NameTooLong { name: String, max: usize },
    #[error("name is empty")]
    EmptyName,
    #[error("'{0}' not found")]
    NotFound(String),
    #[error("'{0}' is protected and cannot be removed or renamed")]
    Protected(String),
}

pub type Result<T> = std::result::Result<T, PoolError>;

pub struct NamedPool<T> {
    kind: &'static str,
    items: Vec<T>,
    index: HashMap<String, usize>,
    protected: Option<String>,
    warnings: bool,
}

impl<T: Named> NamedPool<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            items: Vec::new(),
            index: HashMap::new(),
            protected: None,
            warnings: true,
        }
    }

    /// Marks one name as permanently resident: it can be inserted like any
    /// other, but `remove` and `rename` refuse it.
    pub fn with_protected(mut self, name: impl Into<String>) -> Self {
        self.protected = Some(name.into());
        self
    }

    pub fn set_warnings(&mut self, enabled: bool) {
        self.warnings = enabled;
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.protected.as_deref() == Some(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.index_of(name).map(|i| &self.items[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.index_of(name).map(move |i| &mut self.items[i])
    }

    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(|item| item.name())
    }

    /// Checks a candidate name in the order duplicate, length, emptiness.
    pub fn validate_name(&self, name: &str) -> Result<()> {
        if self.index.contains_key(name) {
            return Err(PoolError::DuplicateName(name.to_string()));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(PoolError::NameTooLong {
                name: name.to_string(),
                max: MAX_NAME_LEN,
            });
        }
        if name.is_empty() {
            return Err(PoolError::EmptyName);
        }
        Ok(())
    }

    pub fn insert(&mut self, item: T) -> Result<&mut T> {
        if let Err(err) = self.validate_name(item.name()) {
            return Err(self.report(err));
        }
        let slot = self.items.len();
        self.index.insert(item.name().to_string(), slot);
        self.items.push(item);
        Ok(&mut self.items[slot])
    }

    /// Swap-removes the entity called `name` and returns it.
    pub fn remove(&mut self, name: &str) -> Result<T> {
        if self.is_protected(name) {
            return Err(self.report(PoolError::Protected(name.to_string())));
        }
        let Some(slot) = self.index.remove(name) else {
            return Err(self.report(PoolError::NotFound(name.to_string())));
        };
        let removed = self.items.swap_remove(slot);
        if let Some(moved) = self.items.get(slot) {
            self.index.insert(moved.name().to_string(), slot);
        }
        Ok(removed)
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        if self.is_protected(old) {
            return Err(self.report(PoolError::Protected(old.to_string())));
        }
        let Some(slot) = self.index_of(old) else {
            return Err(self.report(PoolError::NotFound(old.to_string())));
        };
        if let Err(err) = self.validate_name(new) {
            return Err(self.report(err));
        }
        self.index.remove(old);
        self.index.insert(new.to_string(), slot);
        self.items[slot].set_name(new.to_string());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    fn report(&self, err: PoolError) -> PoolError {
        if self.warnings {
            log::warn!("[{}] {}", self.kind, err);
        }
        err
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        assert_eq!(self.items.len(), self.index.len());
        for (position, item) in self.items.iter().enumerate() {
            assert_eq!(self.index.get(item.name()), Some(&position));
        }
    }
}

impl<'a, T> IntoIterator for &'a NamedPool<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Entry {
        name: String,
        value: u32,
    }

    impl Entry {
        fn new(name: &str, value: u32) -> Self {
            Self {
                name: name.to_string(),
                value,
            }
        }
    }

    impl Named for Entry {
        fn name(&self) -> &str {
            &self.name
        }

        fn set_name(&mut self, name: String) {
            self.name = name;
        }
    }

    fn pool() -> NamedPool<Entry> {
        let mut pool = NamedPool::new("Entry");
        pool.set_warnings(false);
        pool
    }

    #[test]
    fn index_stays_consistent_across_insert_and_remove() {
        let mut pool = pool();
        let names: Vec<String> = (0..16).map(|i| format!("entry{i}")).collect();
        for (i, name) in names.iter().enumerate() {
            pool.insert(Entry::new(name, i as u32)).unwrap();
            pool.assert_consistent();
        }
        for name in ["entry0", "entry15", "entry7", "entry3", "entry8", "entry1"] {
            let removed = pool.remove(name).unwrap();
            assert_eq!(removed.name, name);
            pool.assert_consistent();
        }
        pool.insert(Entry::new("entry0", 99)).unwrap();
        pool.assert_consistent();
        assert_eq!(pool.len(), 11);
        assert_eq!(pool.get("entry0").map(|e| e.value), Some(99));
        assert_eq!(pool.get("entry2").map(|e| e.value), Some(2));
    }

    #[test]
    fn remove_re_indexes_swapped_survivor() {
        let mut pool = pool();
        for name in ["a", "b", "c"] {
            pool.insert(Entry::new(name, 0)).unwrap();
        }
        pool.remove("a").unwrap();
        assert_eq!(pool.index_of("c"), Some(0));
        assert_eq!(pool.get_index(0).map(|e| e.name.as_str()), Some("c"));
        pool.remove("c").unwrap();
        assert_eq!(pool.index_of("b"), Some(0));
        pool.remove("b").unwrap();
        assert!(pool.is_empty());
        pool.assert_consistent();
    }

    #[test]
    fn duplicate_insert_leaves_pool_unchanged() {
        let mut pool = pool();
        pool.insert(Entry::new("cube", 1)).unwrap();
        let err = pool.insert(Entry::new("cube", 2)).unwrap_err();
        assert_eq!(err, PoolError::DuplicateName("cube".to_string()));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get("cube").map(|e| e.value), Some(1));
    }

    #[test]
    fn unknown_remove_leaves_pool_unchanged() {
        let mut pool = pool();
        pool.insert(Entry::new("cube", 1)).unwrap();
        assert_eq!(
            pool.remove("sphere").unwrap_err(),
            PoolError::NotFound("sphere".to_string())
        );
        assert_eq!(pool.len(), 1);
        assert!(matches!(pool.remove(""), Err(PoolError::NotFound(_))));
    }

    #[test]
    fn name_length_boundary() {
        let mut pool = pool();
        let longest = "n".repeat(MAX_NAME_LEN);
        assert!(pool.insert(Entry::new(&longest, 0)).is_ok());

        let too_long = "n".repeat(MAX_NAME_LEN + 1);
        let err = pool.insert(Entry::new(&too_long, 0)).unwrap_err();
        assert!(matches!(err, PoolError::NameTooLong { max: MAX_NAME_LEN, .. }));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut pool = pool();
        assert_eq!(
            pool.insert(Entry::new("", 0)).unwrap_err(),
            PoolError::EmptyName
        );
        assert!(pool.is_empty());
    }

    #[test]
    fn protected_entry_survives_remove_and_rename() {
        let mut pool = pool().with_protected("keep");
        pool.insert(Entry::new("keep", 0)).unwrap();
        pool.insert(Entry::new("other", 1)).unwrap();
        assert_eq!(
            pool.remove("keep").unwrap_err(),
            PoolError::Protected("keep".to_string())
        );
        assert!(pool.rename("keep", "renamed").is_err());
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.index_of("keep"), Some(0));
    }

    #[test]
    fn rename_moves_the_map_entry() {
        let mut pool = pool();
        pool.insert(Entry::new("old", 5)).unwrap();
        pool.insert(Entry::new("taken", 6)).unwrap();
        assert!(matches!(
            pool.rename("old", "taken"),
            Err(PoolError::DuplicateName(_))
        ));
        pool.rename("old", "new").unwrap();
        assert!(!pool.contains("old"));
        assert_eq!(pool.get("new").map(|e| e.value), Some(5));
        pool.assert_consistent();
    }
}
