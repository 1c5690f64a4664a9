//! Resource storage.
//!
//! The server keeps two kinds of resources:
//!
//! | Scope | Marker Trait | Lifetime | Access |
//! |-------|--------------|----------|--------|
//! | Global | [`GlobalResource`] | Server | Shared `Arc<T>`, read-only |
//! | Build-time | [`Resource`] | Until removed | `&mut T` during `build()`/`ready()` |
//!
//! Build-time resources let plugins cooperate while the server is being
//! assembled (for example, provider plugins registering model loaders). A
//! plugin typically removes its build-time resource in `ready()` and publishes
//! the finished value as a global.

use core::any::{Any, TypeId};
use hashbrown::HashMap;
use std::sync::Arc;

/// Marker for any value that can be stored in [`Resources`].
pub trait Resource: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Resource for T {}

/// Marker for server-lifetime, read-only resources.
///
/// Global resources are handed out as `Arc<T>` so they can be moved into
/// spawned tasks and request handlers.
pub trait GlobalResource: Send + Sync + 'static {}

/// Type-keyed container for mutable, build-time resources.
#[derive(Default)]
pub struct Resources {
    entries: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl core::fmt::Debug for Resources {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Resources")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl Resources {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Inserts a resource, returning the previous value of the same type.
    pub fn insert<R: Resource>(&mut self, resource: R) -> Option<R> {
        self.entries
            .insert(TypeId::of::<R>(), Box::new(resource))
            .and_then(|old| old.downcast::<R>().ok())
            .map(|boxed| *boxed)
    }

    /// Returns true if a resource of type `R` exists.
    #[must_use]
    pub fn contains<R: Resource>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<R>())
    }

    /// Gets a reference to a resource.
    #[must_use]
    pub fn get<R: Resource>(&self) -> Option<&R> {
        self.entries
            .get(&TypeId::of::<R>())
            .and_then(|boxed| boxed.downcast_ref::<R>())
    }

    /// Gets a mutable reference to a resource.
    #[must_use]
    pub fn get_mut<R: Resource>(&mut self) -> Option<&mut R> {
        self.entries
            .get_mut(&TypeId::of::<R>())
            .and_then(|boxed| boxed.downcast_mut::<R>())
    }

    /// Removes a resource and returns it.
    pub fn remove<R: Resource>(&mut self) -> Option<R> {
        self.entries
            .remove(&TypeId::of::<R>())
            .and_then(|boxed| boxed.downcast::<R>().ok())
            .map(|boxed| *boxed)
    }

    /// Returns the number of stored resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no resources are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Type-keyed container for shared, read-only resources.
#[derive(Default)]
pub struct Globals {
    entries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl core::fmt::Debug for Globals {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Globals")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl Globals {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Inserts a global, returning the previous handle of the same type.
    pub fn insert<R: GlobalResource>(&mut self, resource: R) -> Option<Arc<R>> {
        self.insert_arc(Arc::new(resource))
    }

    /// Inserts an already shared global.
    pub fn insert_arc<R: GlobalResource>(&mut self, resource: Arc<R>) -> Option<Arc<R>> {
        self.entries
            .insert(TypeId::of::<R>(), resource)
            .and_then(|old| old.downcast::<R>().ok())
    }

    /// Returns true if a global of type `R` exists.
    #[must_use]
    pub fn contains<R: GlobalResource>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<R>())
    }

    /// Returns a shared handle to a global.
    #[must_use]
    pub fn get<R: GlobalResource>(&self) -> Option<Arc<R>> {
        self.entries
            .get(&TypeId::of::<R>())
            .and_then(|shared| Arc::clone(shared).downcast::<R>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Counter(u32);

    #[derive(Debug, PartialEq)]
    struct Label(&'static str);
    impl GlobalResource for Label {}

    #[test]
    fn insert_replaces_and_returns_previous() {
        let mut resources = Resources::new();
        assert!(resources.insert(Counter(1)).is_none());
        assert_eq!(resources.insert(Counter(2)), Some(Counter(1)));
        assert_eq!(resources.get::<Counter>(), Some(&Counter(2)));
    }

    #[test]
    fn get_mut_and_remove() {
        let mut resources = Resources::new();
        resources.insert(Counter(1));
        resources.get_mut::<Counter>().unwrap().0 += 4;
        assert_eq!(resources.remove::<Counter>(), Some(Counter(5)));
        assert!(resources.is_empty());
    }

    #[test]
    fn globals_hand_out_shared_handles() {
        let mut globals = Globals::new();
        globals.insert(Label("paris"));

        let first = globals.get::<Label>().unwrap();
        let second = globals.get::<Label>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, Label("paris"));
    }
}
