use std::{collections::HashMap, marker::PhantomData};

// 1. The ID (Handle)
// Just a number plus a type tag, so a Handle<Model> can't index textures.
pub struct Handle<T> {
    pub id: u64,
    marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            marker: PhantomData,
        }
    }
}

// Manual impls: derives would wrongly require T: Clone/Eq/Hash/Debug.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle({})", self.id)
    }
}

impl<T> std::hash::Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// 2. The Storage
// Assets are written once at load time and only read while rendering.
pub struct Assets<T> {
    storage: HashMap<u64, T>,
    next_id: u64,
}

impl<T> Default for Assets<T> {
    fn default() -> Self {
        Self {
            storage: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<T> Assets<T> {
    pub fn add(&mut self, asset: T) -> Handle<T> {
        let id = self.next_id;
        self.next_id += 1;
        self.storage.insert(id, asset);
        Handle::new(id)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.storage.get(&handle.id)
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.storage.contains_key(&handle.id)
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Drops every asset. Handles handed out earlier stop resolving.
    pub fn clear(&mut self) {
        self.storage.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_and_resolve() {
        let mut assets = Assets::default();
        let a = assets.add("cube");
        let b = assets.add("plane");
        assert_ne!(a, b);
        assert_eq!(assets.get(b), Some(&"plane"));
    }

    #[test]
    fn cleared_handles_miss() {
        let mut assets = Assets::default();
        let a = assets.add(1u32);
        assets.clear();
        assert!(!assets.contains(a));
        assert!(assets.is_empty());
    }
}
