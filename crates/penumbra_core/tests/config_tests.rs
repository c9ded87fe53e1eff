use penumbra_core::config::*;

#[test]
fn empty_file_gives_defaults() {
    let config = RendererConfig::from_toml_str("").unwrap();
    assert_eq!(config, RendererConfig::default());
    assert_eq!(config.shadows.atlas_size, 4096);
    assert_eq!(config.window.width, 1280);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let config = RendererConfig::from_toml_str(
        r#"
        [window]
        title = "demo"

        [lighting]
        debug_view = "shadow_atlas"
        "#,
    )
    .unwrap();

    assert_eq!(config.window.title, "demo");
    assert_eq!(config.window.height, 720);
    assert_eq!(config.lighting.debug_view, DebugView::ShadowAtlas);
}

#[test]
fn uneven_atlas_grid_is_rejected() {
    let err = RendererConfig::from_toml_str(
        r#"
        [shadows]
        atlas_size = 1000
        tiles_per_row = 3
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn inverted_camera_planes_are_rejected() {
    let mut config = RendererConfig::default();
    config.camera.near = 10.0;
    config.camera.far = 1.0;
    assert!(config.validate().is_err());
}

#[test]
fn bad_toml_is_a_parse_error() {
    let err = RendererConfig::from_toml_str("[window").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let config = RendererConfig::load("does/not/exist/penumbra.toml").unwrap();
    assert_eq!(config, RendererConfig::default());
}

#[test]
fn debug_view_cycles() {
    assert_eq!(DebugView::ShadowAtlas.next(), DebugView::Final);
    assert_eq!(DebugView::Final.next(), DebugView::Position);
}
