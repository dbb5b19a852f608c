//! Gate Evaluator
//!
//! The allow/deny decision taken on every draw, indexed draw and indirect
//! draw. A draw is blocked when, for any tracked stage, the bound pipeline
//! resolves to a hash that
//!
//! - belongs to an enabled toggle group, or
//! - is under a browsing hunting session's cursor (or marked while that
//!   session hides its marks).
//!
//! Unresolved handles contribute nothing, so anything unknown draws. The
//! function allocates nothing and takes at most one identity read lock per
//! stage.

use crate::groups::GroupSnapshot;
use crate::hunting::HuntFocus;
use crate::shader::{IdentityTable, PerStage, PipelineHandle, ShaderStage};

#[inline]
#[must_use]
pub fn should_block(
    bound: &PerStage<PipelineHandle>,
    identities: &PerStage<IdentityTable>,
    groups: &GroupSnapshot,
    focus: &HuntFocus,
) -> bool {
    if groups.is_empty() && focus.is_idle() {
        return false;
    }

    ShaderStage::ALL.into_iter().any(|stage| {
        identities[stage]
            .resolve(bound[stage])
            .is_some_and(|hash| groups.blocks(stage, hash) || focus.blocks(stage, hash))
    })
}
