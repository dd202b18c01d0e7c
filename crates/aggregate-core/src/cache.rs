// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Per-type memoization.
//!
//! [`TypeCache`] builds a value at most once per [`TypeId`], even when many
//! threads ask for the same type for the first time concurrently.
//!
//! # Access Paths
//!
//! ```text
//! get_or_try_create(type)
//!   │
//!   ├── snapshot.load() has type ──────────────► return (no lock)
//!   │
//!   └── lock creation mutex
//!         ├── snapshot.load() has type ────────► return (built by another caller)
//!         └── build, copy snapshot + insert, store, return
//! ```
//!
//! Readers never block: the snapshot is an immutable map behind
//! [`ArcSwap`] and is replaced wholesale on insert. Only first accesses
//! serialize through the creation mutex. Failed builds are not cached, so the
//! next caller retries.

use std::{
    any::{TypeId, type_name},
    collections::HashMap,
    convert::Infallible,
    fmt,
    sync::Arc
};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::metadata::AggregateMetadata;

/// Memoized metadata, one entry per aggregate type.
pub type MetadataCache = TypeCache<AggregateMetadata>;

/// Values memoized per type.
pub struct TypeCache<V> {
    entries:  ArcSwap<HashMap<TypeId, Arc<V>>>,
    creation: Mutex<()>
}

impl<V> TypeCache<V> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries:  ArcSwap::from_pointee(HashMap::new()),
            creation: Mutex::new(())
        }
    }

    /// Cached value for `ty`, without building.
    #[must_use]
    pub fn get(&self, ty: TypeId) -> Option<Arc<V>> {
        self.entries.load().get(&ty).cloned()
    }

    /// Cached value for `ty`, built by `create` on first access.
    ///
    /// `create` runs at most once per type across all threads unless it
    /// fails, in which case nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns the error of `create`.
    pub fn get_or_try_create<E>(
        &self,
        ty: TypeId,
        create: impl FnOnce() -> Result<V, E>
    ) -> Result<Arc<V>, E> {
        if let Some(value) = self.get(ty) {
            trace!(type_id = ?ty, "type cache hit");
            return Ok(value);
        }

        let _guard = self.creation.lock();
        if let Some(value) = self.get(ty) {
            trace!(type_id = ?ty, "type cache filled while waiting");
            return Ok(value);
        }

        debug!(type_id = ?ty, "type cache miss, building entry");
        let value = Arc::new(create()?);
        let mut next = HashMap::clone(&self.entries.load());
        next.insert(ty, Arc::clone(&value));
        self.entries.store(Arc::new(next));
        Ok(value)
    }

    /// Typed form of [`get_or_try_create`](Self::get_or_try_create).
    ///
    /// # Errors
    ///
    /// Returns the error of `create`.
    pub fn get_or_try_create_for<T: ?Sized + 'static, E>(
        &self,
        create: impl FnOnce() -> Result<V, E>
    ) -> Result<Arc<V>, E> {
        let ty = TypeId::of::<T>();
        if let Some(value) = self.get(ty) {
            trace!(ty = type_name::<T>(), "type cache hit");
            return Ok(value);
        }
        self.get_or_try_create(ty, || {
            debug!(ty = type_name::<T>(), "building type cache entry");
            create()
        })
    }

    /// Cached value for `ty`, built by an infallible `create` on first access.
    pub fn get_or_create(&self, ty: TypeId, create: impl FnOnce() -> V) -> Arc<V> {
        match self.get_or_try_create(ty, || Ok::<_, Infallible>(create())) {
            Ok(value) => value,
            Err(never) => match never {}
        }
    }

    /// Drop the entry for `ty`. Returns `true` when one was cached.
    pub fn invalidate(&self, ty: TypeId) -> bool {
        let _guard = self.creation.lock();
        let current = self.entries.load();
        if !current.contains_key(&ty) {
            return false;
        }
        let mut next = HashMap::clone(&current);
        next.remove(&ty);
        self.entries.store(Arc::new(next));
        debug!(type_id = ?ty, "type cache entry invalidated");
        true
    }

    /// Drop every entry.
    ///
    /// Waits for a build in progress, so its result is dropped as well.
    pub fn clear(&self) {
        let _guard = self.creation.lock();
        self.entries.store(Arc::new(HashMap::new()));
        debug!("type cache cleared");
    }

    /// Check if `ty` is cached.
    #[must_use]
    pub fn contains(&self, ty: TypeId) -> bool {
        self.entries.load().contains_key(&ty)
    }

    /// Number of cached types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    /// Check if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }
}

impl<V> Default for TypeCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for TypeCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCache")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Barrier,
            atomic::{AtomicUsize, Ordering}
        },
        thread
    };

    use super::*;

    #[test]
    fn builds_once_and_shares() {
        let cache = TypeCache::<String>::new();
        let first = cache.get_or_create(TypeId::of::<u8>(), || "u8".to_owned());
        let second = cache.get_or_create(TypeId::of::<u8>(), || unreachable!("cached"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = TypeCache::<u32>::new();
        let failed: Result<_, &str> = cache.get_or_try_create_for::<u8, _>(|| Err("boom"));
        assert_eq!(failed.err(), Some("boom"));
        assert!(cache.is_empty());

        let built = cache.get_or_try_create_for::<u8, &str>(|| Ok(7)).expect("builds");
        assert_eq!(*built, 7);
        assert!(cache.contains(TypeId::of::<u8>()));
    }

    #[test]
    fn invalidate_and_clear() {
        let cache = TypeCache::<u32>::new();
        cache.get_or_create(TypeId::of::<u8>(), || 1);
        cache.get_or_create(TypeId::of::<u16>(), || 2);

        assert!(cache.invalidate(TypeId::of::<u8>()));
        assert!(!cache.invalidate(TypeId::of::<u8>()));
        assert!(cache.get(TypeId::of::<u8>()).is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_first_access_builds_once() {
        const THREADS: usize = 16;

        let cache = TypeCache::<usize>::new();
        let builds = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);

        let values: Vec<Arc<usize>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        cache.get_or_create(TypeId::of::<String>(), || {
                            builds.fetch_add(1, Ordering::SeqCst);
                            thread::yield_now();
                            99
                        })
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("thread finished"))
                .collect()
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(values.iter().all(|value| Arc::ptr_eq(value, &values[0])));
    }
}
