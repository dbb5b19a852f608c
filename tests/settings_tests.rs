//! Configuration tests
//!
//! Tests for:
//! - ToggleSettings defaults, JSON round trip and clamping
//! - Keybinding overrides and fallbacks
//! - ToggleGroup JSON (hotkey strings, policy fields, missing fields)
//! - ToggleGroupRegistry ids and snapshots

use anyhow::Result;
use shader_toggler::settings::{
    DEFAULT_COLLECTION_FRAMES, MAX_COLLECTION_FRAMES, MIN_COLLECTION_FRAMES,
};
use shader_toggler::{
    InvocationPoint, KeyCombo, Keybind, Modifiers, ResolutionMatch, ShaderHash, ShaderStage,
    ToggleError, ToggleGroup, ToggleGroupRegistry, ToggleSettings,
};

// ============================================================================
// ToggleSettings
// ============================================================================

#[test]
fn default_settings() {
    let settings = ToggleSettings::default();

    assert_eq!(settings.collection_frames, DEFAULT_COLLECTION_FRAMES);
    assert!(!settings.osd_visible);
    assert_eq!(settings.keybinding(Keybind::ToggleHunting), KeyCombo::key(0x23));
    assert_eq!(
        settings.keybinding(Keybind::PixelShaderMarkedNext),
        KeyCombo::new(0x62, Modifiers::CTRL)
    );
    assert_eq!(settings.keybinding(Keybind::VertexShaderMark), KeyCombo::key(0x66));
}

#[test]
fn settings_round_trip() -> Result<()> {
    let mut settings = ToggleSettings::default();
    settings.collection_frames = 500;
    settings.osd_visible = true;
    settings.set_keybinding(Keybind::PixelShaderNext, "Ctrl+Shift+F5".parse()?);

    let json = settings.to_json()?;
    assert!(json.contains("Ctrl+Shift+F5"));
    assert_eq!(ToggleSettings::from_json(&json)?, settings);
    Ok(())
}

#[test]
fn missing_fields_take_defaults() -> Result<()> {
    let settings = ToggleSettings::from_json(r#"{ "osd_visible": true }"#)?;

    assert!(settings.osd_visible);
    assert_eq!(settings.collection_frames, DEFAULT_COLLECTION_FRAMES);
    assert_eq!(settings.keybinding(Keybind::PixelShaderMark), KeyCombo::key(0x63));
    Ok(())
}

#[test]
fn collection_frames_are_clamped() -> Result<()> {
    let low = ToggleSettings::from_json(r#"{ "collection_frames": 1 }"#)?;
    let high = ToggleSettings::from_json(r#"{ "collection_frames": 100000 }"#)?;

    assert_eq!(low.collection_frames, MIN_COLLECTION_FRAMES);
    assert_eq!(high.collection_frames, MAX_COLLECTION_FRAMES);
    Ok(())
}

#[test]
fn partial_keybindings_fall_back_to_defaults() -> Result<()> {
    let settings =
        ToggleSettings::from_json(r#"{ "keybindings": { "ToggleHunting": "Alt+H" } }"#)?;

    assert_eq!(
        settings.keybinding(Keybind::ToggleHunting),
        KeyCombo::new(b'H', Modifiers::ALT)
    );
    assert_eq!(settings.keybinding(Keybind::PixelShaderNext), KeyCombo::key(0x62));
    Ok(())
}

#[test]
fn invalid_key_combo_is_rejected() {
    let result = ToggleSettings::from_json(r#"{ "keybindings": { "ToggleHunting": "Hyper+?" } }"#);

    assert!(matches!(result, Err(ToggleError::JsonError(_))));
    assert!(matches!(
        "Hyper+?".parse::<KeyCombo>(),
        Err(ToggleError::InvalidKeyCombo(_))
    ));
}

// ============================================================================
// ToggleGroup JSON
// ============================================================================

#[test]
fn group_json_round_trip() -> Result<()> {
    let mut group = ToggleGroup::new(3, "Depth of field");
    group.enabled = true;
    group.hotkey = Some(KeyCombo::new(0x74, Modifiers::SHIFT));
    group.vertex_hashes.insert(ShaderHash(0xDEAD_BEEF));
    group.pixel_hashes.extend([ShaderHash(1), ShaderHash(2)]);
    group.render_target_index = 1;
    group.invocation = InvocationPoint::BeforeDraw;
    group.resolution = ResolutionMatch::Exact {
        width: 1920,
        height: 1080,
    };

    let json = ToggleGroup::list_to_json(std::slice::from_ref(&group))?;
    assert!(json.contains("Shift+F5"));
    assert!(json.contains(&0xDEAD_BEEF_u32.to_string()));

    let restored = ToggleGroup::list_from_json(&json)?;
    assert_eq!(restored, vec![group]);
    Ok(())
}

#[test]
fn sparse_group_json_takes_defaults() -> Result<()> {
    let groups = ToggleGroup::list_from_json(r#"[{ "id": 1, "name": "HUD", "pixel_hashes": [42] }]"#)?;

    let group = &groups[0];
    assert!(!group.enabled);
    assert!(group.hotkey.is_none());
    assert!(group.contains(ShaderStage::Pixel, ShaderHash(42)));
    assert!(group.vertex_hashes.is_empty());
    assert_eq!(group.invocation, InvocationPoint::AfterDraw);
    assert_eq!(group.resolution, ResolutionMatch::Any);
    Ok(())
}

#[test]
fn malformed_group_json_is_an_error() {
    assert!(matches!(
        ToggleGroup::list_from_json("{ not json"),
        Err(ToggleError::JsonError(_))
    ));
}

// ============================================================================
// ToggleGroupRegistry
// ============================================================================

#[test]
fn registry_assigns_fresh_ids() {
    let mut registry = ToggleGroupRegistry::new();

    let a = registry.add("a");
    let b = registry.add("b");
    let c = registry.insert(ToggleGroup::new(a, "duplicate"));

    assert_ne!(a, b);
    assert_ne!(c, a);
    assert_ne!(c, b);
    assert_eq!(registry.len(), 3);
}

#[test]
fn loaded_ids_are_kept() {
    let mut registry =
        ToggleGroupRegistry::from_groups([ToggleGroup::new(7, "x"), ToggleGroup::new(2, "y")]);

    assert!(registry.get(7).is_some());
    assert!(registry.get(2).is_some());
    assert_eq!(registry.add("z"), 8);
}

#[test]
fn snapshot_unions_enabled_groups() {
    let mut registry = ToggleGroupRegistry::new();
    let a = registry.add("a");
    let b = registry.add("b");
    let c = registry.add("c");
    registry.get_mut(a).unwrap().pixel_hashes.insert(ShaderHash(1));
    registry.get_mut(b).unwrap().pixel_hashes.insert(ShaderHash(2));
    registry.get_mut(c).unwrap().vertex_hashes.insert(ShaderHash(3));
    registry.set_enabled(a, true).unwrap();
    registry.set_enabled(c, true).unwrap();

    let snapshot = registry.snapshot();

    assert!(snapshot.blocks(ShaderStage::Pixel, ShaderHash(1)));
    assert!(!snapshot.blocks(ShaderStage::Pixel, ShaderHash(2)));
    assert!(snapshot.blocks(ShaderStage::Vertex, ShaderHash(3)));
    assert!(!snapshot.blocks(ShaderStage::Pixel, ShaderHash(3)));
}

#[test]
fn hotkey_matches_only_bound_groups() {
    let mut registry = ToggleGroupRegistry::new();
    let a = registry.add("a");
    registry.add("no hotkey");
    registry.get_mut(a).unwrap().hotkey = Some(KeyCombo::key(0x70));

    let pressed = registry.hotkey_matches(|combo| combo == KeyCombo::key(0x70));

    assert_eq!(pressed, vec![a]);
}
