//! Keyboard shortcuts.
//!
//! A [`KeyCombo`] packs a virtual-key code and its Ctrl / Shift / Alt
//! modifiers into a single `u32` (`key | ctrl << 8 | shift << 16 | alt << 24`),
//! the layout toggle-group hotkeys have always been stored in. Key state comes
//! from the host through [`KeyInput`].

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::errors::ToggleError;

/// Virtual-key codes of the modifier keys.
pub mod vk {
    pub const SHIFT: u32 = 0x10;
    pub const CONTROL: u32 = 0x11;
    pub const MENU: u32 = 0x12;
    pub const END: u32 = 0x23;
    pub const NUMPAD0: u32 = 0x60;
}

/// Keyboard state as reported by the host once per frame.
pub trait KeyInput {
    /// The key went down this frame.
    fn is_key_pressed(&self, key: u32) -> bool;
    /// The key is currently held.
    fn is_key_down(&self, key: u32) -> bool;
}

/// A [`KeyInput`] with nothing pressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl KeyInput for NoInput {
    fn is_key_pressed(&self, _key: u32) -> bool {
        false
    }

    fn is_key_down(&self, _key: u32) -> bool {
        false
    }
}

bitflags! {
    /// Modifier bits in their packed positions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u32 {
        const CTRL = 1 << 8;
        const SHIFT = 1 << 16;
        const ALT = 1 << 24;
    }
}

/// A virtual key plus modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyCombo(u32);

impl KeyCombo {
    #[must_use]
    pub fn new(key: u8, modifiers: Modifiers) -> Self {
        Self(u32::from(key) | modifiers.bits())
    }

    #[must_use]
    pub fn key(key: u8) -> Self {
        Self::new(key, Modifiers::empty())
    }

    /// Rebuilds a combo from its packed form, dropping unknown bits.
    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        Self((bits & 0xFF) | Modifiers::from_bits_truncate(bits).bits())
    }

    #[must_use]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn key_code(self) -> u32 {
        self.0 & 0xFF
    }

    #[must_use]
    pub fn modifiers(self) -> Modifiers {
        Modifiers::from_bits_truncate(self.0)
    }

    /// The key went down this frame with exactly this combo's modifiers held.
    pub fn is_pressed(self, input: &dyn KeyInput) -> bool {
        let key = self.key_code();
        if key == 0 || !input.is_key_pressed(key) {
            return false;
        }

        let modifiers = self.modifiers();
        input.is_key_down(vk::CONTROL) == modifiers.contains(Modifiers::CTRL)
            && input.is_key_down(vk::SHIFT) == modifiers.contains(Modifiers::SHIFT)
            && input.is_key_down(vk::MENU) == modifiers.contains(Modifiers::ALT)
    }
}

const NAMED_KEYS: &[(u32, &str)] = &[
    (0x08, "Backspace"),
    (0x09, "Tab"),
    (0x0D, "Enter"),
    (0x13, "Pause"),
    (0x14, "CapsLock"),
    (0x1B, "Escape"),
    (0x20, "Space"),
    (0x21, "PageUp"),
    (0x22, "PageDown"),
    (0x23, "End"),
    (0x24, "Home"),
    (0x25, "Left"),
    (0x26, "Up"),
    (0x27, "Right"),
    (0x28, "Down"),
    (0x2C, "PrintScreen"),
    (0x2D, "Insert"),
    (0x2E, "Delete"),
    (0x6A, "Multiply"),
    (0x6B, "Add"),
    (0x6D, "Subtract"),
    (0x6E, "Decimal"),
    (0x6F, "Divide"),
    (0x90, "NumLock"),
    (0x91, "ScrollLock"),
];

fn key_name(code: u32) -> String {
    match code {
        0x30..=0x39 | 0x41..=0x5A => char::from(code as u8).to_string(),
        0x60..=0x69 => format!("Numpad{}", code - 0x60),
        0x70..=0x87 => format!("F{}", code - 0x6F),
        _ => NAMED_KEYS
            .iter()
            .find(|(c, _)| *c == code)
            .map_or_else(|| format!("{code:#04X}"), |(_, name)| (*name).to_string()),
    }
}

fn parse_key(name: &str) -> Option<u32> {
    let upper = name.to_ascii_uppercase();
    let bytes = upper.as_bytes();
    if bytes.len() == 1 && bytes[0].is_ascii_alphanumeric() {
        return Some(u32::from(bytes[0]));
    }
    if let Some(n) = upper.strip_prefix("NUMPAD")
        && let Ok(n) = n.parse::<u32>()
        && n <= 9
    {
        return Some(0x60 + n);
    }
    if let Some(n) = upper.strip_prefix('F')
        && let Ok(n) = n.parse::<u32>()
        && (1..=24).contains(&n)
    {
        return Some(0x6F + n);
    }
    if let Some(hex) = upper.strip_prefix("0X") {
        return u32::from_str_radix(hex, 16).ok().filter(|c| (1..=0xFF).contains(c));
    }
    NAMED_KEYS
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(c, _)| *c)
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = self.modifiers();
        if modifiers.contains(Modifiers::CTRL) {
            f.write_str("Ctrl+")?;
        }
        if modifiers.contains(Modifiers::SHIFT) {
            f.write_str("Shift+")?;
        }
        if modifiers.contains(Modifiers::ALT) {
            f.write_str("Alt+")?;
        }
        f.write_str(&key_name(self.key_code()))
    }
}

impl FromStr for KeyCombo {
    type Err = ToggleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ToggleError::InvalidKeyCombo(s.to_string());

        let mut modifiers = Modifiers::empty();
        let mut key = None;
        for part in s.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= Modifiers::CTRL,
                "shift" => modifiers |= Modifiers::SHIFT,
                "alt" => modifiers |= Modifiers::ALT,
                _ if key.is_none() => key = Some(parse_key(part).ok_or_else(invalid)?),
                _ => return Err(invalid()),
            }
        }

        let key = key.ok_or_else(invalid)?;
        Ok(Self::new(key as u8, modifiers))
    }
}

impl TryFrom<String> for KeyCombo {
    type Error = ToggleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyCombo> for String {
    fn from(combo: KeyCombo) -> Self {
        combo.to_string()
    }
}
