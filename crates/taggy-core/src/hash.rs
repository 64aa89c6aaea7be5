//! Fx-hashed collection aliases.
//!
//! The registry and the drop deduplication are keyed by file paths, which
//! never come from an adversarial source, so the faster non-DoS-resistant
//! Fx hasher from `rustc-hash` is used throughout the workspace.
//!
//! ```
//! use taggy_core::{FxHashMap, fx_hash_map};
//!
//! let mut sizes: FxHashMap<&str, u64> = fx_hash_map();
//! sizes.insert("/music/a.mp3", 4_096);
//! assert_eq!(sizes.get("/music/a.mp3"), Some(&4_096));
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates an empty [`FxHashMap`].
#[inline]
#[must_use]
pub fn fx_hash_map<K, V>() -> FxHashMap<K, V> {
    FxHashMap::default()
}

/// Creates an empty [`FxHashSet`].
#[inline]
#[must_use]
pub fn fx_hash_set<V>() -> FxHashSet<V> {
    FxHashSet::default()
}

/// Creates an [`FxHashSet`] able to hold `capacity` entries without
/// reallocating.
#[inline]
#[must_use]
pub fn fx_hash_set_with_capacity<V>(capacity: usize) -> FxHashSet<V> {
    FxHashSet::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}
