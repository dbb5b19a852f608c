//! Error Types
//!
//! This module defines the error types used at the configuration boundary of
//! the toggler.
//!
//! # Overview
//!
//! The host callbacks (`on_draw`, `on_bind_pipeline`, …) never fail: every
//! miss degrades to "allow the draw". [`ToggleError`] only covers operations
//! driven by the editor or the configuration collaborator:
//! - Unknown toggle group ids
//! - Malformed key combinations
//! - Settings / group JSON that does not parse
//!
//! # Usage
//!
//! ```rust,ignore
//! use shader_toggler::errors::{Result, ToggleError};
//!
//! fn load(json: &str) -> Result<ToggleSettings> {
//!     ToggleSettings::from_json(json)
//! }
//! ```

use thiserror::Error;

use crate::groups::GroupId;

/// The main error type for the toggler.
#[derive(Error, Debug)]
pub enum ToggleError {
    // ========================================================================
    // Group Errors
    // ========================================================================
    /// No toggle group with this id is registered.
    #[error("Unknown toggle group: {0}")]
    UnknownGroup(GroupId),

    /// A group-edit operation was requested while no group is being edited.
    #[error("No toggle group is being edited")]
    NotEditing,

    // ========================================================================
    // Input Errors
    // ========================================================================
    /// A key combination string could not be parsed.
    #[error("Invalid key combination: '{0}'")]
    InvalidKeyCombo(String),

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// JSON parse or encode error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Alias for `Result<T, ToggleError>`.
pub type Result<T> = std::result::Result<T, ToggleError>;
