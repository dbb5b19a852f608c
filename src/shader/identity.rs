//! Identity Table
//!
//! Durable mapping between shader content hashes and the pipeline handles the
//! driver instantiated for them. A hash maps to many handles when the same
//! code is compiled into several pipeline objects; the reverse map gives the
//! O(1) handle → hash lookup needed at draw time.
//!
//! Entries live until the driver reports the pipeline destroyed
//! ([`IdentityTable::evict`]); a title may compile thousands of variants and
//! any live handle may be rebound at any time.

use parking_lot::{RwLock, RwLockReadGuard};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::ids::{PipelineHandle, ShaderHash};

/// Handles sharing one hash. Almost always one or two.
pub type HandleList = SmallVec<[PipelineHandle; 2]>;

// Internal data structure, protected by a lock.
#[derive(Debug, Default)]
pub struct IdentityInner {
    pub handles_by_hash: FxHashMap<ShaderHash, HandleList>,
    pub hash_by_handle: FxHashMap<PipelineHandle, ShaderHash>,
}

impl IdentityInner {
    fn detach(&mut self, handle: PipelineHandle, hash: ShaderHash) {
        if let Some(handles) = self.handles_by_hash.get_mut(&hash) {
            handles.retain(|h| *h != handle);
            if handles.is_empty() {
                self.handles_by_hash.remove(&hash);
            }
        }
    }
}

/// Thread-safe hash ⇄ handle table for one shader stage.
///
/// Draw-time resolves only take the read side of the lock; writers are the
/// comparatively rare pipeline init/destroy events.
#[derive(Debug, Default)]
pub struct IdentityTable {
    inner: RwLock<IdentityInner>,
}

impl IdentityTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// [Write] Associates `handle` with `hash`.
    ///
    /// Idempotent: binding the same pair twice changes nothing. Returns `true`
    /// when the pair was newly recorded. If the driver recycled `handle` for
    /// different code, the stale association is dropped first.
    pub fn bind(&self, hash: ShaderHash, handle: PipelineHandle) -> bool {
        if handle.is_null() {
            return false;
        }

        let mut guard = self.inner.write();
        match guard.hash_by_handle.insert(handle, hash) {
            Some(previous) if previous == hash => return false,
            Some(previous) => guard.detach(handle, previous),
            None => {}
        }
        guard.handles_by_hash.entry(hash).or_default().push(handle);
        true
    }

    /// [Read] Reverse lookup used by the gate. `None` for the null handle and
    /// for handles never bound.
    #[inline]
    pub fn resolve(&self, handle: PipelineHandle) -> Option<ShaderHash> {
        if handle.is_null() {
            return None;
        }
        self.inner.read().hash_by_handle.get(&handle).copied()
    }

    /// [Write] Forgets a destroyed pipeline. Returns the hash it resolved to.
    pub fn evict(&self, handle: PipelineHandle) -> Option<ShaderHash> {
        let mut guard = self.inner.write();
        let hash = guard.hash_by_handle.remove(&handle)?;
        guard.detach(handle, hash);
        Some(hash)
    }

    /// [Read] Handles currently instantiated for `hash`.
    #[must_use]
    pub fn handles(&self, hash: ShaderHash) -> HandleList {
        self.inner
            .read()
            .handles_by_hash
            .get(&hash)
            .cloned()
            .unwrap_or_default()
    }

    /// [Read] Snapshot of every known hash.
    ///
    /// The copy is taken under the read lock, so concurrent inserts are either
    /// fully visible or not at all. Iterate it as often as needed.
    #[must_use]
    pub fn all_hashes(&self) -> Vec<ShaderHash> {
        self.inner.read().handles_by_hash.keys().copied().collect()
    }

    #[must_use]
    pub fn contains(&self, hash: ShaderHash) -> bool {
        self.inner.read().handles_by_hash.contains_key(&hash)
    }

    /// Number of distinct hashes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().handles_by_hash.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().handles_by_hash.is_empty()
    }

    /// Number of live handles across all hashes.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        self.inner.read().hash_by_handle.len()
    }

    /// [Read - Advanced] Acquires a read-lock guard for batch inspection.
    pub fn read_lock(&self) -> RwLockReadGuard<'_, IdentityInner> {
        self.inner.read()
    }
}
