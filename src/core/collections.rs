//! Collection aliases shared by the mesh and its algorithms.
//!
//! Keeping the concrete container choices behind aliases lets the arena
//! backend be switched with a Cargo feature and keeps hashing consistent
//! across modules.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

#[cfg(not(feature = "dense-slotmap"))]
use slotmap::SlotMap;

#[cfg(feature = "dense-slotmap")]
use slotmap::DenseSlotMap;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Arena backing every entity collection of a [`Mesh`](crate::core::mesh::Mesh).
///
/// # Feature Flags
///
/// - **default**: `DenseSlotMap` (via the default `dense-slotmap` feature)
/// - **--no-default-features**: `SlotMap`
///
/// Both backends hand out generational keys, so a key to a removed entity
/// never resolves to a different entity that later reuses the slot.
#[cfg(not(feature = "dense-slotmap"))]
pub type StorageMap<K, V> = SlotMap<K, V>;

/// Arena backing every entity collection of a [`Mesh`](crate::core::mesh::Mesh).
///
/// # Feature Flags
///
/// - **default**: `DenseSlotMap` (via the default `dense-slotmap` feature)
/// - **--no-default-features**: `SlotMap`
///
/// Both backends hand out generational keys, so a key to a removed entity
/// never resolves to a different entity that later reuses the slot.
#[cfg(feature = "dense-slotmap")]
pub type StorageMap<K, V> = DenseSlotMap<K, V>;

// =============================================================================
// HASHING AND SMALL BUFFERS
// =============================================================================

/// Hash map with the non-cryptographic Fx hasher; keys are slotmap handles.
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Hash set with the non-cryptographic Fx hasher.
pub type FastHashSet<T> = FxHashSet<T>;

/// Stack-allocated buffer that spills to the heap past `N` elements.
///
/// Used for per-entity constraint ownership lists, which almost always hold
/// zero, one or two entries.
///
/// # Examples
///
/// ```rust
/// use cdt_mesh::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<u32, 2> = SmallBuffer::new();
/// buffer.push(1);
/// buffer.push(2);
/// assert!(!buffer.spilled());
/// buffer.push(3);
/// assert!(buffer.spilled());
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Creates a [`FastHashSet`] with room for `capacity` elements.
#[must_use]
pub fn fast_hash_set_with_capacity<T>(capacity: usize) -> FastHashSet<T> {
    FastHashSet::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

/// Creates a [`FastHashMap`] with room for `capacity` entries.
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}
