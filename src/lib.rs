#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Shader identification and draw-call gating.
//!
//! The engine fingerprints every vertex and pixel shader a title creates,
//! follows which pipeline each command context has bound, and decides on every
//! draw whether to let it through. Draws are dropped when their shaders belong
//! to an enabled toggle group or sit under the cursor of a hunting session.

pub mod binding;
pub mod engine;
pub mod errors;
pub mod gate;
pub mod groups;
pub mod hotkey;
pub mod hunting;
pub mod settings;
pub mod shader;
pub mod snapshot;
pub mod status;

pub use binding::BindingTracker;
pub use engine::ToggleEngine;
pub use errors::{Result, ToggleError};
pub use groups::{GroupId, GroupSnapshot, InvocationPoint, ResolutionMatch, ToggleGroup, ToggleGroupRegistry};
pub use hotkey::{KeyCombo, KeyInput, Modifiers};
pub use hunting::{HuntFocus, HuntingSession, HuntingState};
pub use settings::{HuntAction, Keybind, ToggleSettings};
pub use shader::{
    CommandContextId, IdentityTable, IndirectCommand, PerStage, PipelineHandle, PipelineStage,
    PipelineSubobject, ShaderHash, ShaderStage, SubobjectType,
};
pub use status::{EngineStatus, HuntingStatus};
