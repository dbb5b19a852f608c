//! Engine Core Module
//!
//! [`ToggleEngine`] is the single object the host integration owns for as long
//! as the add-on is attached. It receives every pipeline lifecycle, bind, draw
//! and present callback, and exposes the operations the editor drives.
//!
//! # Architecture
//!
//! - **Hash cache**: create → init hand-off of code hashes
//! - **Identity tables**: hash ⇄ handle, one per tracked stage
//! - **Binding tracker**: per-context bound handles, reset every frame
//! - **Hunting sessions**: one per tracked stage, published to the gate as a
//!   [`HuntFocus`] snapshot
//! - **Toggle groups**: registry behind a mutex, published to the gate as a
//!   [`GroupSnapshot`]
//!
//! # Example
//!
//! ```rust,ignore
//! let engine = ToggleEngine::new(ToggleSettings::default());
//!
//! // pipeline lifecycle
//! engine.on_pipeline_create(&subobjects);
//! engine.on_pipeline_init(&subobjects, handle);
//!
//! // recording
//! engine.on_bind_pipeline(ctx, PipelineStage::Pixel, handle);
//! if engine.on_draw(ctx) {
//!     // skip the draw
//! }
//!
//! // end of frame
//! engine.process_hotkeys(&keyboard);
//! engine.on_frame_present();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::binding::BindingTracker;
use crate::errors::{Result, ToggleError};
use crate::gate;
use crate::groups::{GroupId, GroupSnapshot, ToggleGroup, ToggleGroupRegistry};
use crate::hotkey::KeyInput;
use crate::hunting::{HuntFocus, HuntingSession, HuntingState};
use crate::settings::{HuntAction, Keybind, ToggleSettings};
use crate::shader::{
    CodeAddress, CommandContextId, HashCache, IdentityTable, IndirectCommand, PerStage,
    PipelineHandle, PipelineStage, PipelineSubobject, ShaderHash, ShaderStage,
};
use crate::snapshot::Published;
use crate::status::{EngineStatus, HuntingStatus};

/// Shader identification and draw-call gating engine.
///
/// All methods take `&self`; the engine is shared between the host's render,
/// worker and UI threads.
pub struct ToggleEngine {
    settings: RwLock<ToggleSettings>,

    hash_cache: Mutex<HashCache>,
    identities: PerStage<IdentityTable>,
    bindings: BindingTracker,

    hunting: PerStage<Mutex<HuntingSession>>,
    hunting_active: AtomicBool,
    focus: Published<HuntFocus>,

    registry: Mutex<ToggleGroupRegistry>,
    groups: Published<GroupSnapshot>,
    editing: Mutex<Option<GroupId>>,
}

impl Default for ToggleEngine {
    fn default() -> Self {
        Self::new(ToggleSettings::default())
    }
}

impl ToggleEngine {
    #[must_use]
    pub fn new(settings: ToggleSettings) -> Self {
        Self::with_groups(settings, Vec::new())
    }

    /// Creates an engine with groups already loaded by the configuration
    /// layer.
    #[must_use]
    pub fn with_groups(mut settings: ToggleSettings, groups: impl IntoIterator<Item = ToggleGroup>) -> Self {
        settings.sanitize();
        let registry = ToggleGroupRegistry::from_groups(groups);
        let snapshot = registry.snapshot();
        log::info!("shader toggler attached with {} toggle groups", registry.len());

        Self {
            settings: RwLock::new(settings),
            hash_cache: Mutex::new(HashCache::new()),
            identities: PerStage::from_fn(|_| IdentityTable::new()),
            bindings: BindingTracker::new(),
            hunting: PerStage::from_fn(|stage| Mutex::new(HuntingSession::new(stage))),
            hunting_active: AtomicBool::new(false),
            focus: Published::new(HuntFocus::default()),
            registry: Mutex::new(registry),
            groups: Published::new(snapshot),
            editing: Mutex::new(None),
        }
    }

    // ========================================================================
    // Host Events: Pipeline Lifecycle
    // ========================================================================

    /// Hashes every shader in a pipeline about to be created. The code buffers
    /// may be unreadable once the driver takes them.
    pub fn on_pipeline_create(&self, subobjects: &[PipelineSubobject<'_>]) {
        for sub in subobjects.iter().filter(|s| s.kind.is_shader() && !s.code.is_empty()) {
            let hash = ShaderHash::of_code(sub.code);
            self.hash_cache.lock().record(CodeAddress::of(sub.code), hash);
        }
    }

    /// Commits the hashes of a realized pipeline's vertex and pixel shaders to
    /// the identity tables. The parked hashes are released even when the
    /// pipeline failed to realize.
    pub fn on_pipeline_init(&self, subobjects: &[PipelineSubobject<'_>], handle: PipelineHandle) {
        for sub in subobjects.iter().filter(|s| s.kind.is_shader() && !s.code.is_empty()) {
            let consumed = self.hash_cache.lock().consume(CodeAddress::of(sub.code));
            if handle.is_null() {
                continue;
            }
            let Some(stage) = sub.kind.watched() else {
                continue;
            };
            let Some(hash) = consumed else {
                log::trace!(
                    "no create event seen for {:?} of pipeline {:#x}",
                    sub.kind,
                    handle.raw()
                );
                continue;
            };
            if self.identities[stage].bind(hash, handle) {
                log::trace!("{} shader {hash} -> pipeline {:#x}", stage.name(), handle.raw());
            }
        }
    }

    /// Forgets a pipeline the driver destroyed.
    pub fn on_pipeline_destroy(&self, handle: PipelineHandle) {
        for stage in ShaderStage::ALL {
            self.identities[stage].evict(handle);
        }
    }

    // ========================================================================
    // Host Events: Recording
    // ========================================================================

    pub fn on_bind_pipeline(&self, context: CommandContextId, stages: PipelineStage, handle: PipelineHandle) {
        let Some(stage) = stages.watched() else {
            return;
        };
        self.bindings.set_bound(context, stage, handle);

        if self.hunting_active.load(Ordering::Acquire)
            && let Some(hash) = self.identities[stage].resolve(handle)
        {
            self.hunting[stage].lock().observe(hash);
        }
    }

    /// Returns `true` when the draw must be skipped.
    #[inline]
    pub fn on_draw(&self, context: CommandContextId) -> bool {
        self.should_block(context)
    }

    #[inline]
    pub fn on_draw_indexed(&self, context: CommandContextId) -> bool {
        self.should_block(context)
    }

    /// Indirect draws are gated like direct ones; indirect dispatches never
    /// are.
    #[inline]
    pub fn on_draw_or_dispatch_indirect(&self, context: CommandContextId, command: IndirectCommand) -> bool {
        command.is_draw() && self.should_block(context)
    }

    pub fn should_block(&self, context: CommandContextId) -> bool {
        let Some(bound) = self.bindings.bound(context) else {
            return false;
        };
        gate::should_block(&bound, &self.identities, &self.groups.load(), &self.focus.load())
    }

    /// The host tore down a command context.
    ///
    /// Optional: a context that binds nothing for a whole frame is dropped at
    /// the next present anyway. Calling this frees the slot right away.
    pub fn on_context_destroy(&self, context: CommandContextId) {
        self.bindings.forget(context);
    }

    // ========================================================================
    // Host Events: Frame Boundary
    // ========================================================================

    /// Ends the frame: advances hunting collection windows, resets every
    /// context's bindings and drops contexts that bound nothing this frame.
    pub fn on_frame_present(&self) {
        let mut transitioned = false;
        for stage in ShaderStage::ALL {
            transitioned |= self.hunting[stage].lock().advance_frame();
        }
        if transitioned {
            self.publish_focus();
        }
        self.bindings.clear_all();
    }

    /// Applies this frame's key presses: hunting keybindings and group
    /// hotkeys. The hotkey of the group being edited also toggles hiding its
    /// marked shaders.
    pub fn process_hotkeys(&self, input: &dyn KeyInput) {
        let (toggle_hunting, actions) = {
            let settings = self.settings.read();
            let toggle = settings.keybinding(Keybind::ToggleHunting).is_pressed(input);
            let actions: SmallVec<[(ShaderStage, HuntAction); 4]> = Keybind::ALL
                .into_iter()
                .filter(|&kb| settings.keybinding(kb).is_pressed(input))
                .filter_map(Keybind::hunt_action)
                .collect();
            (toggle, actions)
        };

        if toggle_hunting {
            self.toggle_hunting();
        }
        for (stage, action) in actions {
            self.hunt(stage, action);
        }

        let pressed = self.registry.lock().hotkey_matches(|combo| combo.is_pressed(input));
        let editing = *self.editing.lock();
        for id in pressed {
            if let Ok(enabled) = self.toggle_group(id) {
                log::debug!("toggle group {id} {}", if enabled { "enabled" } else { "disabled" });
            }
            if editing == Some(id) {
                self.toggle_hide_marked();
            }
        }
    }

    // ========================================================================
    // Hunting
    // ========================================================================

    #[must_use]
    pub fn is_hunting(&self) -> bool {
        self.hunting_active.load(Ordering::Acquire)
    }

    /// Starts a fresh hunting session on every tracked stage.
    pub fn start_hunting(&self) {
        let frames = self.settings.read().collection_frames;
        for stage in ShaderStage::ALL {
            self.hunting[stage].lock().start(frames);
        }
        self.hunting_active.store(true, Ordering::Release);
        self.publish_focus();
    }

    /// Ends hunting, discarding collected and marked shaders and abandoning
    /// any group edit.
    pub fn stop_hunting(&self) {
        self.hunting_active.store(false, Ordering::Release);
        for stage in ShaderStage::ALL {
            self.hunting[stage].lock().stop();
        }
        self.editing.lock().take();
        self.publish_focus();
    }

    /// Returns whether hunting is now active.
    pub fn toggle_hunting(&self) -> bool {
        if self.is_hunting() {
            self.stop_hunting();
            false
        } else {
            self.start_hunting();
            true
        }
    }

    #[must_use]
    pub fn hunting_state(&self, stage: ShaderStage) -> HuntingState {
        self.hunting[stage].lock().state()
    }

    pub fn step_next(&self, stage: ShaderStage) -> Option<ShaderHash> {
        self.with_session(stage, HuntingSession::step_next)
    }

    pub fn step_previous(&self, stage: ShaderStage) -> Option<ShaderHash> {
        self.with_session(stage, HuntingSession::step_previous)
    }

    pub fn step_next_marked(&self, stage: ShaderStage) -> Option<ShaderHash> {
        self.with_session(stage, HuntingSession::step_next_marked)
    }

    pub fn step_previous_marked(&self, stage: ShaderStage) -> Option<ShaderHash> {
        self.with_session(stage, HuntingSession::step_previous_marked)
    }

    /// Marks or unmarks the shader under the cursor. `None` without a cursor.
    pub fn toggle_mark(&self, stage: ShaderStage) -> Option<bool> {
        self.with_session(stage, HuntingSession::toggle_mark)
    }

    /// Selects the `index`-th collected shader.
    pub fn set_cursor(&self, stage: ShaderStage, index: usize) -> bool {
        self.with_session(stage, |session| session.set_cursor(index))
    }

    /// Flips hiding of marked shaders on every stage; returns the pixel
    /// stage's new setting.
    pub fn toggle_hide_marked(&self) -> bool {
        let mut hidden = false;
        for stage in ShaderStage::ALL {
            hidden = self.hunting[stage].lock().toggle_hide_marked();
        }
        self.publish_focus();
        hidden
    }

    /// Runs one keybound hunting action.
    pub fn hunt(&self, stage: ShaderStage, action: HuntAction) {
        match action {
            HuntAction::Previous => {
                self.step_previous(stage);
            }
            HuntAction::Next => {
                self.step_next(stage);
            }
            HuntAction::PreviousMarked => {
                self.step_previous_marked(stage);
            }
            HuntAction::NextMarked => {
                self.step_next_marked(stage);
            }
            HuntAction::ToggleMark => {
                self.toggle_mark(stage);
            }
        }
    }

    #[must_use]
    pub fn cursor_hash(&self, stage: ShaderStage) -> Option<ShaderHash> {
        self.hunting[stage].lock().cursor_hash()
    }

    /// Collected hashes in traversal order.
    #[must_use]
    pub fn collected_hashes(&self, stage: ShaderStage) -> Vec<ShaderHash> {
        self.hunting[stage].lock().collected().to_vec()
    }

    #[must_use]
    pub fn marked_hashes(&self, stage: ShaderStage) -> Vec<ShaderHash> {
        self.hunting[stage].lock().marked().iter().copied().collect()
    }

    fn with_session<R>(&self, stage: ShaderStage, f: impl FnOnce(&mut HuntingSession) -> R) -> R {
        let result = f(&mut *self.hunting[stage].lock());
        self.publish_focus();
        result
    }

    fn publish_focus(&self) {
        // Vertex before pixel; no other path holds two session locks.
        let sessions = PerStage::from_fn(|stage| self.hunting[stage].lock());
        self.focus.store(HuntFocus {
            stages: PerStage::from_fn(|stage| sessions[stage].focus()),
        });
    }

    // ========================================================================
    // Toggle Groups
    // ========================================================================

    pub fn add_group(&self, name: impl Into<String>) -> GroupId {
        self.with_registry(|registry| registry.add(name))
    }

    pub fn insert_group(&self, group: ToggleGroup) -> GroupId {
        self.with_registry(|registry| registry.insert(group))
    }

    pub fn remove_group(&self, id: GroupId) -> Result<ToggleGroup> {
        let removed = self.with_registry(|registry| registry.remove(id))?;
        if *self.editing.lock() == Some(id) {
            self.stop_hunting();
        }
        Ok(removed)
    }

    pub fn set_group_enabled(&self, id: GroupId, enabled: bool) -> Result<()> {
        self.with_registry(|registry| registry.set_enabled(id, enabled))
    }

    pub fn toggle_group(&self, id: GroupId) -> Result<bool> {
        self.with_registry(|registry| registry.toggle(id))
    }

    pub fn set_group_hashes(&self, id: GroupId, stage: ShaderStage, hashes: FxHashSet<ShaderHash>) -> Result<()> {
        self.with_registry(|registry| registry.set_hashes(id, stage, hashes))
    }

    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<ToggleGroup> {
        self.registry.lock().get(id).cloned()
    }

    #[must_use]
    pub fn groups(&self) -> Vec<ToggleGroup> {
        self.registry.lock().iter().cloned().collect()
    }

    /// Serializes every group for the persistence layer.
    pub fn export_groups_json(&self) -> Result<String> {
        ToggleGroup::list_to_json(&self.groups())
    }

    /// Replaces every group with the ones in `json`. Returns how many were
    /// loaded.
    pub fn import_groups_json(&self, json: &str) -> Result<usize> {
        let groups = ToggleGroup::list_from_json(json)?;
        if self.editing.lock().is_some() {
            self.stop_hunting();
        }
        Ok(self.with_registry(|registry| {
            *registry = ToggleGroupRegistry::from_groups(groups);
            registry.len()
        }))
    }

    fn with_registry<R>(&self, f: impl FnOnce(&mut ToggleGroupRegistry) -> R) -> R {
        let mut registry = self.registry.lock();
        let result = f(&mut registry);
        self.groups.store(registry.snapshot());
        result
    }

    // ========================================================================
    // Group Editing
    // ========================================================================

    /// Starts hunting with the group's shaders pre-marked, so stepping through
    /// marked shaders walks the group's current members.
    pub fn begin_group_edit(&self, id: GroupId) -> Result<()> {
        let group = self.group(id).ok_or(ToggleError::UnknownGroup(id))?;
        self.start_hunting();
        for stage in ShaderStage::ALL {
            self.hunting[stage]
                .lock()
                .set_marked(group.hashes(stage).iter().copied());
        }
        *self.editing.lock() = Some(id);
        self.publish_focus();
        log::info!("editing toggle group {id} '{}'", group.name);
        Ok(())
    }

    /// Finishes the edit. With `save`, the marked shaders become the group's
    /// members. Hunting stops either way.
    pub fn end_group_edit(&self, save: bool) -> Result<GroupId> {
        let id = self.editing.lock().take().ok_or(ToggleError::NotEditing)?;

        let saved = if save {
            let mut marked = PerStage::from_fn(|stage| self.hunting[stage].lock().marked().clone());
            self.with_registry(|registry| {
                ShaderStage::ALL
                    .into_iter()
                    .try_for_each(|stage| registry.set_hashes(id, stage, std::mem::take(&mut marked[stage])))
            })
        } else {
            Ok(())
        };

        self.stop_hunting();
        saved.map(|()| id)
    }

    #[must_use]
    pub fn editing_group(&self) -> Option<GroupId> {
        *self.editing.lock()
    }

    // ========================================================================
    // Settings & Inspection
    // ========================================================================

    #[must_use]
    pub fn settings(&self) -> ToggleSettings {
        self.settings.read().clone()
    }

    /// Applies new settings. A running collection window keeps its length.
    pub fn set_settings(&self, mut settings: ToggleSettings) {
        settings.sanitize();
        *self.settings.write() = settings;
    }

    #[must_use]
    pub fn identities(&self, stage: ShaderStage) -> &IdentityTable {
        &self.identities[stage]
    }

    #[must_use]
    pub fn bindings(&self) -> &BindingTracker {
        &self.bindings
    }

    /// Cached hashes still waiting for their init event.
    #[must_use]
    pub fn pending_hashes(&self) -> usize {
        self.hash_cache.lock().len()
    }

    #[must_use]
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            stages: PerStage::from_fn(|stage| HuntingStatus::of(&self.hunting[stage].lock())),
            enabled_groups: self.registry.lock().iter().filter(|g| g.enabled).count(),
            editing_group: *self.editing.lock(),
        }
    }

    /// Overlay text, when the overlay is enabled in the settings.
    #[must_use]
    pub fn overlay_text(&self) -> Option<String> {
        self.settings
            .read()
            .osd_visible
            .then(|| self.status().to_string())
    }
}
