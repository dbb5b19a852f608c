//! Toggle Groups
//!
//! User-authored suppression groups: a name, an enable flag, a hotkey and the
//! vertex / pixel shader hashes whose draws are dropped while the group is
//! enabled. The rendering-policy fields are carried for the resource-binding
//! collaborator and ignored by the gate.
//!
//! The gate never sees the registry itself. Every mutation publishes a fresh
//! [`GroupSnapshot`] (the union of all enabled groups' hashes per stage), so a
//! draw evaluated mid-edit observes either the old or the new state, never a
//! half-updated set.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ToggleError};
use crate::hotkey::KeyCombo;
use crate::shader::{PerStage, ShaderHash, ShaderStage};

pub type GroupId = u32;

/// Point in the frame at which a group's effects are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InvocationPoint {
    BeforeDraw,
    #[default]
    AfterDraw,
    OnPresent,
}

/// Which render targets a group's effects may bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResolutionMatch {
    #[default]
    Any,
    Swapchain,
    Exact {
        width: u32,
        height: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleGroup {
    pub id: GroupId,
    pub name: String,
    pub enabled: bool,
    pub hotkey: Option<KeyCombo>,
    pub vertex_hashes: FxHashSet<ShaderHash>,
    pub pixel_hashes: FxHashSet<ShaderHash>,

    // Rendering policy
    pub render_target_index: u32,
    pub invocation: InvocationPoint,
    pub resolution: ResolutionMatch,
}

impl ToggleGroup {
    #[must_use]
    pub fn new(id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn hashes(&self, stage: ShaderStage) -> &FxHashSet<ShaderHash> {
        match stage {
            ShaderStage::Vertex => &self.vertex_hashes,
            ShaderStage::Pixel => &self.pixel_hashes,
        }
    }

    pub fn hashes_mut(&mut self, stage: ShaderStage) -> &mut FxHashSet<ShaderHash> {
        match stage {
            ShaderStage::Vertex => &mut self.vertex_hashes,
            ShaderStage::Pixel => &mut self.pixel_hashes,
        }
    }

    #[must_use]
    pub fn contains(&self, stage: ShaderStage, hash: ShaderHash) -> bool {
        self.hashes(stage).contains(&hash)
    }

    /// Parses a list of groups as stored by the persistence layer.
    pub fn list_from_json(json: &str) -> Result<Vec<ToggleGroup>> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn list_to_json(groups: &[ToggleGroup]) -> Result<String> {
        Ok(serde_json::to_string_pretty(groups)?)
    }
}

/// Union of the hashes of all enabled groups, per stage.
#[derive(Debug, Clone, Default)]
pub struct GroupSnapshot {
    active: PerStage<FxHashSet<ShaderHash>>,
}

impl GroupSnapshot {
    #[must_use]
    pub fn from_groups<'a>(groups: impl IntoIterator<Item = &'a ToggleGroup>) -> Self {
        let mut snapshot = Self::default();
        for group in groups.into_iter().filter(|g| g.enabled) {
            for stage in ShaderStage::ALL {
                snapshot.active[stage].extend(group.hashes(stage).iter().copied());
            }
        }
        snapshot
    }

    #[inline]
    #[must_use]
    pub fn blocks(&self, stage: ShaderStage, hash: ShaderHash) -> bool {
        self.active[stage].contains(&hash)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.iter().all(|(_, set)| set.is_empty())
    }
}

/// Ordered collection of toggle groups.
#[derive(Debug, Clone, Default)]
pub struct ToggleGroupRegistry {
    groups: Vec<ToggleGroup>,
    next_id: GroupId,
}

impl ToggleGroupRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from loaded groups. Duplicate ids are reassigned.
    #[must_use]
    pub fn from_groups(groups: impl IntoIterator<Item = ToggleGroup>) -> Self {
        let mut registry = Self::new();
        for group in groups {
            registry.insert(group);
        }
        registry
    }

    /// Creates an empty, disabled group.
    pub fn add(&mut self, name: impl Into<String>) -> GroupId {
        let id = self.next_id;
        self.insert(ToggleGroup::new(id, name))
    }

    /// Inserts a group, keeping its id unless another group already uses it.
    pub fn insert(&mut self, mut group: ToggleGroup) -> GroupId {
        if self.get(group.id).is_some() {
            group.id = self.next_id;
        }
        self.next_id = self.next_id.max(group.id.saturating_add(1));
        let id = group.id;
        log::debug!("toggle group {id} '{}' registered", group.name);
        self.groups.push(group);
        id
    }

    pub fn remove(&mut self, id: GroupId) -> Result<ToggleGroup> {
        let index = self
            .groups
            .iter()
            .position(|g| g.id == id)
            .ok_or(ToggleError::UnknownGroup(id))?;
        Ok(self.groups.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: GroupId) -> Option<&ToggleGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn get_mut(&mut self, id: GroupId) -> Result<&mut ToggleGroup> {
        self.groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(ToggleError::UnknownGroup(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToggleGroup> {
        self.groups.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn set_enabled(&mut self, id: GroupId, enabled: bool) -> Result<()> {
        self.get_mut(id)?.enabled = enabled;
        Ok(())
    }

    /// Flips a group's enable flag and returns the new value.
    pub fn toggle(&mut self, id: GroupId) -> Result<bool> {
        let group = self.get_mut(id)?;
        group.enabled = !group.enabled;
        Ok(group.enabled)
    }

    pub fn set_hashes(
        &mut self,
        id: GroupId,
        stage: ShaderStage,
        hashes: FxHashSet<ShaderHash>,
    ) -> Result<()> {
        *self.get_mut(id)?.hashes_mut(stage) = hashes;
        Ok(())
    }

    /// Ids of the groups whose hotkey satisfies `pressed`.
    pub fn hotkey_matches(&self, mut pressed: impl FnMut(KeyCombo) -> bool) -> Vec<GroupId> {
        self.groups
            .iter()
            .filter(|g| g.hotkey.is_some_and(&mut pressed))
            .map(|g| g.id)
            .collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> GroupSnapshot {
        GroupSnapshot::from_groups(&self.groups)
    }
}
