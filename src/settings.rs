//! Toggler Settings
//!
//! User-tunable parameters of the hunting workflow. The persistence
//! collaborator owns where these live; this module only converts them to and
//! from JSON.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use shader_toggler::{ToggleEngine, ToggleSettings};
//!
//! let settings = ToggleSettings::from_json(&stored_json)?;
//! let engine = ToggleEngine::new(settings);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::hotkey::{KeyCombo, Modifiers, vk};
use crate::shader::ShaderStage;

pub const MIN_COLLECTION_FRAMES: u32 = 10;
pub const MAX_COLLECTION_FRAMES: u32 = 1000;
pub const DEFAULT_COLLECTION_FRAMES: u32 = 250;

/// Hunting actions that can be bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Keybind {
    ToggleHunting,
    PixelShaderPrevious,
    PixelShaderNext,
    PixelShaderMarkedPrevious,
    PixelShaderMarkedNext,
    PixelShaderMark,
    VertexShaderPrevious,
    VertexShaderNext,
    VertexShaderMarkedPrevious,
    VertexShaderMarkedNext,
    VertexShaderMark,
}

/// What a stage-specific [`Keybind`] does to its hunting session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuntAction {
    Previous,
    Next,
    PreviousMarked,
    NextMarked,
    ToggleMark,
}

impl Keybind {
    pub const ALL: [Keybind; 11] = [
        Keybind::ToggleHunting,
        Keybind::PixelShaderPrevious,
        Keybind::PixelShaderNext,
        Keybind::PixelShaderMarkedPrevious,
        Keybind::PixelShaderMarkedNext,
        Keybind::PixelShaderMark,
        Keybind::VertexShaderPrevious,
        Keybind::VertexShaderNext,
        Keybind::VertexShaderMarkedPrevious,
        Keybind::VertexShaderMarkedNext,
        Keybind::VertexShaderMark,
    ];

    /// Numpad 1/2/3 drive pixel shaders, numpad 4/5/6 vertex shaders; Ctrl
    /// restricts stepping to marked shaders. End toggles hunting.
    #[must_use]
    pub fn default_combo(self) -> KeyCombo {
        let numpad = |n: u32| (vk::NUMPAD0 + n) as u8;
        match self {
            Keybind::ToggleHunting => KeyCombo::key(vk::END as u8),
            Keybind::PixelShaderPrevious => KeyCombo::key(numpad(1)),
            Keybind::PixelShaderNext => KeyCombo::key(numpad(2)),
            Keybind::PixelShaderMarkedPrevious => KeyCombo::new(numpad(1), Modifiers::CTRL),
            Keybind::PixelShaderMarkedNext => KeyCombo::new(numpad(2), Modifiers::CTRL),
            Keybind::PixelShaderMark => KeyCombo::key(numpad(3)),
            Keybind::VertexShaderPrevious => KeyCombo::key(numpad(4)),
            Keybind::VertexShaderNext => KeyCombo::key(numpad(5)),
            Keybind::VertexShaderMarkedPrevious => KeyCombo::new(numpad(4), Modifiers::CTRL),
            Keybind::VertexShaderMarkedNext => KeyCombo::new(numpad(5), Modifiers::CTRL),
            Keybind::VertexShaderMark => KeyCombo::key(numpad(6)),
        }
    }

    /// The stage and action of a hunting keybind; `None` for
    /// [`Keybind::ToggleHunting`].
    #[must_use]
    pub fn hunt_action(self) -> Option<(ShaderStage, HuntAction)> {
        use ShaderStage::{Pixel, Vertex};
        Some(match self {
            Keybind::ToggleHunting => return None,
            Keybind::PixelShaderPrevious => (Pixel, HuntAction::Previous),
            Keybind::PixelShaderNext => (Pixel, HuntAction::Next),
            Keybind::PixelShaderMarkedPrevious => (Pixel, HuntAction::PreviousMarked),
            Keybind::PixelShaderMarkedNext => (Pixel, HuntAction::NextMarked),
            Keybind::PixelShaderMark => (Pixel, HuntAction::ToggleMark),
            Keybind::VertexShaderPrevious => (Vertex, HuntAction::Previous),
            Keybind::VertexShaderNext => (Vertex, HuntAction::Next),
            Keybind::VertexShaderMarkedPrevious => (Vertex, HuntAction::PreviousMarked),
            Keybind::VertexShaderMarkedNext => (Vertex, HuntAction::NextMarked),
            Keybind::VertexShaderMark => (Vertex, HuntAction::ToggleMark),
        })
    }
}

/// Settings of the hunting workflow and on-screen info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleSettings {
    /// Number of presented frames a hunting session collects shaders before
    /// browsing starts. Raise it for shaders that are only used occasionally.
    pub collection_frames: u32,
    /// Whether the hunting status overlay is shown.
    pub osd_visible: bool,
    /// Overrides of the default hunting keybindings.
    pub keybindings: BTreeMap<Keybind, KeyCombo>,
}

impl Default for ToggleSettings {
    fn default() -> Self {
        Self {
            collection_frames: DEFAULT_COLLECTION_FRAMES,
            osd_visible: false,
            keybindings: Keybind::ALL
                .into_iter()
                .map(|kb| (kb, kb.default_combo()))
                .collect(),
        }
    }
}

impl ToggleSettings {
    /// Parses settings, filling omitted fields with defaults and clamping the
    /// collection window into range.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn sanitize(&mut self) {
        let clamped = self
            .collection_frames
            .clamp(MIN_COLLECTION_FRAMES, MAX_COLLECTION_FRAMES);
        if clamped != self.collection_frames {
            log::warn!(
                "collection_frames {} out of range, using {clamped}",
                self.collection_frames
            );
            self.collection_frames = clamped;
        }
    }

    /// The combo bound to `keybind`, falling back to its default.
    #[must_use]
    pub fn keybinding(&self, keybind: Keybind) -> KeyCombo {
        self.keybindings
            .get(&keybind)
            .copied()
            .unwrap_or_else(|| keybind.default_combo())
    }

    pub fn set_keybinding(&mut self, keybind: Keybind, combo: KeyCombo) {
        self.keybindings.insert(keybind, combo);
    }
}
