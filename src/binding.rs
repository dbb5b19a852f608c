//! Binding Tracker
//!
//! Remembers, per command recording context, the pipeline handle most
//! recently bound to each tracked stage.
//!
//! Contexts are spread over a fixed set of shards keyed by the context id's
//! hash, and every context owns its own slot of atomics inside its shard.
//! A shard is write-locked only when one of its contexts first shows up or is
//! forgotten, so a new or torn-down context stalls at most the contexts that
//! share its shard. Binds and draw-time reads take only their shard's read
//! lock.
//!
//! At each frame boundary slots are reset in place, so steady-state recording
//! does not allocate. A slot that saw no bind during the whole frame that just
//! ended is removed instead: hosts that mint a fresh context id per command
//! buffer do not grow the tracker without bound.

use std::hash::BuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::shader::{CommandContextId, PerStage, PipelineHandle, ShaderStage};

const SHARDS: usize = 16;

#[derive(Debug, Default)]
struct ContextSlot {
    bound: [AtomicU64; ShaderStage::COUNT],
    /// Frame of the most recent bind.
    last_bind: AtomicU64,
}

impl ContextSlot {
    #[inline]
    fn store(&self, stage: ShaderStage, handle: PipelineHandle, frame: u64) {
        // A context is recorded by one thread at a time.
        self.bound[stage.index()].store(handle.raw(), Ordering::Relaxed);
        self.last_bind.store(frame, Ordering::Relaxed);
    }

    #[inline]
    fn load(&self, stage: ShaderStage) -> PipelineHandle {
        PipelineHandle::new(self.bound[stage.index()].load(Ordering::Relaxed))
    }

    fn reset(&self) {
        for slot in &self.bound {
            slot.store(0, Ordering::Relaxed);
        }
    }

    fn idle_since(&self, frame: u64) -> bool {
        self.last_bind.load(Ordering::Relaxed) < frame
    }
}

type Shard = RwLock<FxHashMap<CommandContextId, ContextSlot>>;

/// Per-context, per-stage last bound pipeline.
#[derive(Debug, Default)]
pub struct BindingTracker {
    shards: [Shard; SHARDS],
    /// Frames ended so far; stamps each bind.
    frame: AtomicU64,
}

impl BindingTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn shard(&self, context: CommandContextId) -> &Shard {
        &self.shards[FxBuildHasher.hash_one(context) as usize % SHARDS]
    }

    /// Records `handle` as bound to `stage` on `context`, overwriting the
    /// previous binding for that stage only.
    pub fn set_bound(&self, context: CommandContextId, stage: ShaderStage, handle: PipelineHandle) {
        let frame = self.frame.load(Ordering::Relaxed);
        let shard = self.shard(context);
        {
            let contexts = shard.read();
            if let Some(slot) = contexts.get(&context) {
                slot.store(stage, handle, frame);
                return;
            }
        }

        let mut contexts = shard.write();
        contexts.entry(context).or_default().store(stage, handle, frame);
    }

    /// Handle bound to `stage` on `context` this frame, or the null handle.
    #[inline]
    pub fn get_bound(&self, context: CommandContextId, stage: ShaderStage) -> PipelineHandle {
        self.shard(context)
            .read()
            .get(&context)
            .map_or(PipelineHandle::NULL, |slot| slot.load(stage))
    }

    /// All tracked stages of `context` in one lookup. `None` if the context
    /// has no slot.
    #[inline]
    pub fn bound(&self, context: CommandContextId) -> Option<PerStage<PipelineHandle>> {
        let contexts = self.shard(context).read();
        let slot = contexts.get(&context)?;
        Some(PerStage::from_fn(|stage| slot.load(stage)))
    }

    /// Frame boundary: every context reads as "nothing bound" until its next
    /// bind. Contexts that did not bind anything during the ending frame are
    /// dropped.
    pub fn clear_all(&self) {
        let ended = self.frame.fetch_add(1, Ordering::Relaxed);
        let mut pruned = 0;

        for shard in &self.shards {
            let mut any_idle = false;
            for slot in shard.read().values() {
                slot.reset();
                any_idle |= slot.idle_since(ended);
            }
            if any_idle {
                let mut contexts = shard.write();
                let before = contexts.len();
                contexts.retain(|_, slot| !slot.idle_since(ended));
                pruned += before - contexts.len();
            }
        }

        if pruned > 0 {
            log::trace!("dropped {pruned} idle recording contexts");
        }
    }

    /// Drops the slot of a context the host has torn down.
    pub fn forget(&self, context: CommandContextId) -> bool {
        self.shard(context).write().remove(&context).is_some()
    }

    /// Number of contexts with a slot (including ones idle this frame).
    #[must_use]
    pub fn context_count(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }
}
