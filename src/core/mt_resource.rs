//! # Multi-Threaded Resource
//!
//! A shared handle to a value behind a read-write lock, used for state that both the
//! streaming worker and the render thread touch.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted handle with read-write locking.
///
/// `MtResource` is how loaded chunks are shared between the streaming worker and the
/// render thread: the chunk map hands out clones of the handle while its own lock is held
/// only for the lookup, and the caller then locks the individual value for as long as it
/// needs it.
///
/// # Examples
///
/// ```
/// use voxel_world::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let counter_clone = counter.clone();
///
/// let handle = std::thread::spawn(move || {
///     *counter_clone.get_mut() += 1;
/// });
///
/// handle.join().unwrap();
/// assert_eq!(*counter.get(), 1);
/// ```
///
/// # Performance Considerations
/// - Read operations (`get()`) can occur concurrently
/// - Write operations (`get_mut()`) are exclusive and will block other operations
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a guard that allows reading the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned, i.e. another thread panicked while holding it.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().expect("resource lock poisoned")
    }

    /// Returns a guard that allows modifying the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned, i.e. another thread panicked while holding it.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().expect("resource lock poisoned")
    }

    /// Returns `true` if both handles point at the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}
