//! Hunting Session
//!
//! Operator-driven search for one shader among everything the title binds.
//!
//! # Lifecycle
//!
//! ```text
//!   Inactive ──toggle──▶ Collecting ──window elapsed──▶ Browsing
//!      ▲                     │                             │
//!      └───────toggle────────┴───────────toggle────────────┘
//! ```
//!
//! While active, every distinct hash bound on the session's stage is appended
//! in first-seen order; that order is the traversal order. Browsing moves a
//! cursor over the collected hashes and the gate hides whatever is under it,
//! so the operator can watch the shader disappear from the scene.
//!
//! Nothing here survives toggling the session off.

use rustc_hash::FxHashSet;

use crate::shader::{PerStage, ShaderHash, ShaderStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HuntingState {
    #[default]
    Inactive,
    Collecting,
    Browsing,
}

/// Hunting state for one shader stage.
#[derive(Debug)]
pub struct HuntingSession {
    stage: ShaderStage,
    state: HuntingState,
    collected: Vec<ShaderHash>,
    seen: FxHashSet<ShaderHash>,
    cursor: Option<usize>,
    marked: FxHashSet<ShaderHash>,
    frames_remaining: u32,
    hide_marked: bool,
}

impl HuntingSession {
    #[must_use]
    pub fn new(stage: ShaderStage) -> Self {
        Self {
            stage,
            state: HuntingState::Inactive,
            collected: Vec::new(),
            seen: FxHashSet::default(),
            cursor: None,
            marked: FxHashSet::default(),
            frames_remaining: 0,
            hide_marked: false,
        }
    }

    #[must_use]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    #[must_use]
    pub fn state(&self) -> HuntingState {
        self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state != HuntingState::Inactive
    }

    #[must_use]
    pub fn is_browsing(&self) -> bool {
        self.state == HuntingState::Browsing
    }

    // ── Transitions ──────────────────────────────────────────────────────────

    /// Starts a fresh session that collects for `collection_frames` presented
    /// frames before browsing. Zero browses right away.
    pub fn start(&mut self, collection_frames: u32) {
        self.reset();
        self.frames_remaining = collection_frames;
        self.state = if collection_frames == 0 {
            HuntingState::Browsing
        } else {
            HuntingState::Collecting
        };
        log::debug!("{} shader hunting started", self.stage.name());
    }

    /// Ends the session, discarding everything it collected.
    pub fn stop(&mut self) {
        if self.is_active() {
            log::debug!(
                "{} shader hunting stopped after {} shaders",
                self.stage.name(),
                self.collected.len()
            );
        }
        self.reset();
    }

    pub fn toggle(&mut self, collection_frames: u32) -> HuntingState {
        if self.is_active() {
            self.stop();
        } else {
            self.start(collection_frames);
        }
        self.state
    }

    /// Counts down the collection window. Returns `true` when this frame
    /// switched the session to browsing.
    pub fn advance_frame(&mut self) -> bool {
        if self.state != HuntingState::Collecting {
            return false;
        }
        self.frames_remaining = self.frames_remaining.saturating_sub(1);
        if self.frames_remaining == 0 {
            self.state = HuntingState::Browsing;
            log::debug!(
                "{} shader hunting: collected {} shaders, browsing",
                self.stage.name(),
                self.collected.len()
            );
            return true;
        }
        false
    }

    #[must_use]
    pub fn frames_remaining(&self) -> u32 {
        self.frames_remaining
    }

    fn reset(&mut self) {
        self.state = HuntingState::Inactive;
        self.collected.clear();
        self.seen.clear();
        self.cursor = None;
        self.marked.clear();
        self.frames_remaining = 0;
        self.hide_marked = false;
    }

    // ── Collection ───────────────────────────────────────────────────────────

    /// Appends `hash` if the session is active and has not seen it yet.
    pub fn observe(&mut self, hash: ShaderHash) -> bool {
        if !self.is_active() || !self.seen.insert(hash) {
            return false;
        }
        self.collected.push(hash);
        true
    }

    /// Collected hashes in first-seen order.
    #[must_use]
    pub fn collected(&self) -> &[ShaderHash] {
        &self.collected
    }

    #[must_use]
    pub fn collected_count(&self) -> usize {
        self.collected.len()
    }

    // ── Cursor ───────────────────────────────────────────────────────────────

    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[must_use]
    pub fn cursor_hash(&self) -> Option<ShaderHash> {
        self.cursor.map(|i| self.collected[i])
    }

    /// Moves the cursor to `index` (editor list selection).
    pub fn set_cursor(&mut self, index: usize) -> bool {
        if !self.is_browsing() || index >= self.collected.len() {
            return false;
        }
        self.cursor = Some(index);
        true
    }

    /// Circular step forward. From no selection, lands on the first hash.
    pub fn step_next(&mut self) -> Option<ShaderHash> {
        let len = self.browsable_len()?;
        self.cursor = Some(self.cursor.map_or(0, |i| (i + 1) % len));
        self.cursor_hash()
    }

    /// Circular step backward. From no selection, lands on the last hash.
    pub fn step_previous(&mut self) -> Option<ShaderHash> {
        let len = self.browsable_len()?;
        self.cursor = Some(match self.cursor {
            None | Some(0) => len - 1,
            Some(i) => i - 1,
        });
        self.cursor_hash()
    }

    /// Steps forward to the next marked hash; no-op if none is collected.
    pub fn step_next_marked(&mut self) -> Option<ShaderHash> {
        let len = self.browsable_len()?;
        let start = self.cursor.unwrap_or(len - 1);
        let found = (1..=len)
            .map(|k| (start + k) % len)
            .find(|&i| self.marked.contains(&self.collected[i]))?;
        self.cursor = Some(found);
        self.cursor_hash()
    }

    /// Steps backward to the previous marked hash; no-op if none is collected.
    pub fn step_previous_marked(&mut self) -> Option<ShaderHash> {
        let len = self.browsable_len()?;
        let start = self.cursor.unwrap_or(0);
        let found = (1..=len)
            .map(|k| (start + len - k) % len)
            .find(|&i| self.marked.contains(&self.collected[i]))?;
        self.cursor = Some(found);
        self.cursor_hash()
    }

    fn browsable_len(&self) -> Option<usize> {
        (self.is_browsing() && !self.collected.is_empty()).then_some(self.collected.len())
    }

    // ── Marks ────────────────────────────────────────────────────────────────

    /// Marks or unmarks the hash under the cursor. Returns the new mark state.
    pub fn toggle_mark(&mut self) -> Option<bool> {
        if !self.is_browsing() {
            return None;
        }
        let hash = self.cursor_hash()?;
        if self.marked.remove(&hash) {
            Some(false)
        } else {
            self.marked.insert(hash);
            Some(true)
        }
    }

    #[must_use]
    pub fn is_marked(&self, hash: ShaderHash) -> bool {
        self.marked.contains(&hash)
    }

    #[must_use]
    pub fn marked(&self) -> &FxHashSet<ShaderHash> {
        &self.marked
    }

    #[must_use]
    pub fn marked_count(&self) -> usize {
        self.marked.len()
    }

    /// Pre-marks hashes, e.g. the members of a group being edited. Marks may
    /// name hashes not collected (yet).
    pub fn set_marked(&mut self, hashes: impl IntoIterator<Item = ShaderHash>) {
        if self.is_active() {
            self.marked = hashes.into_iter().collect();
        }
    }

    #[must_use]
    pub fn hides_marked(&self) -> bool {
        self.hide_marked
    }

    /// Also hide every marked hash while browsing.
    pub fn toggle_hide_marked(&mut self) -> bool {
        if self.is_active() {
            self.hide_marked = !self.hide_marked;
        }
        self.hide_marked
    }

    // ── Gate view ────────────────────────────────────────────────────────────

    /// Whether a draw using `hash` on this stage is hidden by the session.
    #[must_use]
    pub fn blocks(&self, hash: ShaderHash) -> bool {
        self.is_browsing()
            && (self.cursor_hash() == Some(hash) || (self.hide_marked && self.marked.contains(&hash)))
    }

    /// Immutable copy of what the gate needs from this session.
    #[must_use]
    pub fn focus(&self) -> StageFocus {
        if !self.is_browsing() {
            return StageFocus::default();
        }
        StageFocus {
            cursor: self.cursor_hash(),
            hidden: if self.hide_marked {
                self.marked.clone()
            } else {
                FxHashSet::default()
            },
        }
    }
}

/// Hashes a browsing session hides on one stage.
#[derive(Debug, Clone, Default)]
pub struct StageFocus {
    pub cursor: Option<ShaderHash>,
    pub hidden: FxHashSet<ShaderHash>,
}

impl StageFocus {
    #[inline]
    #[must_use]
    pub fn blocks(&self, hash: ShaderHash) -> bool {
        self.cursor == Some(hash) || self.hidden.contains(&hash)
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.cursor.is_none() && self.hidden.is_empty()
    }
}

/// Published hunting focus of every stage, read by the gate.
#[derive(Debug, Clone, Default)]
pub struct HuntFocus {
    pub stages: PerStage<StageFocus>,
}

impl HuntFocus {
    #[inline]
    #[must_use]
    pub fn blocks(&self, stage: ShaderStage, hash: ShaderHash) -> bool {
        self.stages[stage].blocks(hash)
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.stages.iter().all(|(_, focus)| focus.is_idle())
    }
}
