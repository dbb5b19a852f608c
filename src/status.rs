//! On-screen status summary of the hunting workflow.

use std::fmt;

use crate::groups::GroupId;
use crate::hunting::{HuntingSession, HuntingState};
use crate::shader::{PerStage, ShaderStage};

/// Progress of one stage's hunting session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuntingStatus {
    pub stage: ShaderStage,
    pub state: HuntingState,
    pub collected: usize,
    pub marked: usize,
    /// 1-based cursor position, `None` without a selection.
    pub position: Option<usize>,
    pub frames_remaining: u32,
}

impl HuntingStatus {
    #[must_use]
    pub fn of(session: &HuntingSession) -> Self {
        Self {
            stage: session.stage(),
            state: session.state(),
            collected: session.collected_count(),
            marked: session.marked_count(),
            position: session.cursor().map(|i| i + 1),
            frames_remaining: session.frames_remaining(),
        }
    }
}

impl fmt::Display for HuntingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = self.stage.name();
        write!(
            f,
            "# of {stage} shaders gathered: {}. In hunting mode: {}",
            self.collected,
            self.state != HuntingState::Inactive
        )?;
        match self.state {
            HuntingState::Inactive => Ok(()),
            HuntingState::Collecting => {
                write!(f, "\nCollecting {stage} shaders, {} frames left", self.frames_remaining)
            }
            HuntingState::Browsing => {
                write!(f, "\n# of {stage} shaders marked: {}", self.marked)?;
                if let Some(position) = self.position {
                    write!(f, "\nCurrent selected {stage} shader: {position} / {}", self.collected)?;
                }
                Ok(())
            }
        }
    }
}

/// Everything the overlay shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStatus {
    pub stages: PerStage<HuntingStatus>,
    pub enabled_groups: usize,
    pub editing_group: Option<GroupId>,
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.stages[ShaderStage::Vertex], self.stages[ShaderStage::Pixel])?;
        write!(f, "\n# of toggle groups enabled: {}", self.enabled_groups)?;
        if let Some(id) = self.editing_group {
            write!(f, "\nEditing toggle group {id}")?;
        }
        Ok(())
    }
}
