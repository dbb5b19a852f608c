//! Gate evaluator tests
//!
//! Tests for:
//! - Group membership blocks per stage
//! - Hunting focus blocks with no groups
//! - Unknown and null handles never block
//! - Group snapshots only carry enabled groups

use rustc_hash::FxHashSet;
use shader_toggler::gate::should_block;
use shader_toggler::hunting::{HuntFocus, StageFocus};
use shader_toggler::{
    GroupSnapshot, IdentityTable, PerStage, PipelineHandle, ShaderHash, ShaderStage, ToggleGroup,
};

// ============================================================================
// Helpers
// ============================================================================

const X: ShaderHash = ShaderHash(0x1111);
const Y: ShaderHash = ShaderHash(0x2222);

struct Fixture {
    identities: PerStage<IdentityTable>,
}

impl Fixture {
    /// Vertex handle 1 → X, 2 → Y; pixel handle 11 → X, 12 → Y.
    fn new() -> Self {
        let identities = PerStage::from_fn(|_| IdentityTable::new());
        identities[ShaderStage::Vertex].bind(X, PipelineHandle::new(1));
        identities[ShaderStage::Vertex].bind(Y, PipelineHandle::new(2));
        identities[ShaderStage::Pixel].bind(X, PipelineHandle::new(11));
        identities[ShaderStage::Pixel].bind(Y, PipelineHandle::new(12));
        Self { identities }
    }

    fn blocks(&self, vertex: u64, pixel: u64, groups: &GroupSnapshot, focus: &HuntFocus) -> bool {
        let bound = PerStage::from_fn(|stage| match stage {
            ShaderStage::Vertex => PipelineHandle::new(vertex),
            ShaderStage::Pixel => PipelineHandle::new(pixel),
        });
        should_block(&bound, &self.identities, groups, focus)
    }
}

fn group(stage: ShaderStage, hash: ShaderHash, enabled: bool) -> ToggleGroup {
    let mut group = ToggleGroup::new(0, "test");
    group.enabled = enabled;
    group.hashes_mut(stage).insert(hash);
    group
}

fn cursor_on(stage: ShaderStage, hash: ShaderHash) -> HuntFocus {
    let mut focus = HuntFocus::default();
    focus.stages[stage] = StageFocus {
        cursor: Some(hash),
        hidden: FxHashSet::default(),
    };
    focus
}

// ============================================================================
// Groups
// ============================================================================

#[test]
fn enabled_group_blocks_its_pixel_hash() {
    let fx = Fixture::new();
    let groups = GroupSnapshot::from_groups(&[group(ShaderStage::Pixel, X, true)]);
    let idle = HuntFocus::default();

    assert!(fx.blocks(0, 11, &groups, &idle));
    assert!(!fx.blocks(0, 12, &groups, &idle));
}

#[test]
fn disabled_group_blocks_nothing() {
    let fx = Fixture::new();
    let groups = GroupSnapshot::from_groups(&[group(ShaderStage::Pixel, X, false)]);

    assert!(groups.is_empty());
    assert!(!fx.blocks(0, 11, &groups, &HuntFocus::default()));
}

#[test]
fn group_hash_is_matched_per_stage() {
    let fx = Fixture::new();
    let groups = GroupSnapshot::from_groups(&[group(ShaderStage::Vertex, X, true)]);
    let idle = HuntFocus::default();

    // X bound on pixel only: the vertex group does not apply.
    assert!(!fx.blocks(2, 11, &groups, &idle));
    assert!(fx.blocks(1, 12, &groups, &idle));
}

#[test]
fn any_stage_match_blocks() {
    let fx = Fixture::new();
    let groups = GroupSnapshot::from_groups(&[
        group(ShaderStage::Vertex, Y, true),
        group(ShaderStage::Pixel, X, true),
    ]);
    let idle = HuntFocus::default();

    assert!(fx.blocks(2, 12, &groups, &idle));
    assert!(fx.blocks(1, 11, &groups, &idle));
    assert!(!fx.blocks(1, 12, &groups, &idle));
}

// ============================================================================
// Hunting Focus
// ============================================================================

#[test]
fn cursor_blocks_without_groups() {
    let fx = Fixture::new();
    let groups = GroupSnapshot::default();

    assert!(fx.blocks(2, 0, &groups, &cursor_on(ShaderStage::Vertex, Y)));
    assert!(!fx.blocks(1, 0, &groups, &cursor_on(ShaderStage::Vertex, Y)));
    assert!(!fx.blocks(0, 12, &groups, &cursor_on(ShaderStage::Vertex, Y)));
}

#[test]
fn hidden_marks_block() {
    let fx = Fixture::new();
    let mut focus = HuntFocus::default();
    focus.stages[ShaderStage::Pixel].hidden.insert(X);

    assert!(fx.blocks(0, 11, &GroupSnapshot::default(), &focus));
    assert!(!fx.blocks(0, 12, &GroupSnapshot::default(), &focus));
}

// ============================================================================
// Unknown Handles
// ============================================================================

#[test]
fn unknown_handle_never_blocks() {
    let fx = Fixture::new();
    let groups = GroupSnapshot::from_groups(&[
        group(ShaderStage::Vertex, X, true),
        group(ShaderStage::Pixel, X, true),
    ]);

    assert!(!fx.blocks(77, 88, &groups, &cursor_on(ShaderStage::Pixel, X)));
}

#[test]
fn nothing_bound_never_blocks() {
    let fx = Fixture::new();
    let groups = GroupSnapshot::from_groups(&[group(ShaderStage::Pixel, X, true)]);

    assert!(!fx.blocks(0, 0, &groups, &cursor_on(ShaderStage::Pixel, X)));
}
