//! Code-address → hash bridge between the create and init pipeline events.
//!
//! The shader byte code is only readable while the pipeline is being created;
//! the realized handle only exists once it has been initialized. The hash is
//! computed in the first callback, parked here under the code buffer's
//! address, and picked up by the second.
//!
//! Several pipelines may be built from one code buffer with their create and
//! init events interleaved, so entries are counted: each record is matched by
//! exactly one consume, and the entry leaves the map when the last pending
//! init has taken it.

use rustc_hash::FxHashMap;

use super::ids::{CodeAddress, ShaderHash};

#[derive(Debug, Clone, Copy)]
struct Pending {
    hash: ShaderHash,
    count: u32,
}

/// Transient code address → hash map.
///
/// Not synchronized; the owner serializes access.
#[derive(Debug, Default)]
pub struct HashCache {
    entries: FxHashMap<CodeAddress, Pending>,
}

impl HashCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks a hash for the code buffer at `code`. Recording the same address
    /// again adds one more pending init; a different hash replaces the stored
    /// one, since the buffer was rewritten in between.
    pub fn record(&mut self, code: CodeAddress, hash: ShaderHash) {
        let pending = self
            .entries
            .entry(code)
            .or_insert(Pending { hash, count: 0 });
        pending.hash = hash;
        pending.count = pending.count.saturating_add(1);
    }

    /// Takes one pending hash for `code`, if a create event was observed.
    pub fn consume(&mut self, code: CodeAddress) -> Option<ShaderHash> {
        let pending = self.entries.get_mut(&code)?;
        let hash = pending.hash;
        pending.count -= 1;
        if pending.count == 0 {
            self.entries.remove(&code);
        }
        Some(hash)
    }

    /// Number of distinct code buffers with a pending init.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
