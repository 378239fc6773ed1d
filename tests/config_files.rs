//! Settings and asset manifests read from real files.
use std::fs;
use std::path::PathBuf;

use tempfile::{tempdir, TempDir};
use wgpu_instancing::asset::AssetPaths;
use wgpu_instancing::renderer::RenderingMode;
use wgpu_instancing::settings::RenderSettings;

fn write(dir: &TempDir, relative: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn settings_file_is_parsed_and_validated() {
    let dir = tempdir().unwrap();
    let path = write(
        &dir,
        "settings.json",
        r#"{
            "title": "Instancing",
            "resolution": { "width": 800, "height": 600 },
            "present_mode": "mailbox",
            "rendering_mode": "debug_fill",
            "clear_color": [0.2, 0.3, 1.5, 1.0],
            "camera": { "fov_degrees": 70.0 },
            "assets": "data/assets.json"
        }"#,
    );

    let settings = RenderSettings::load_from_path(&path);

    assert_eq!(settings.title, "Instancing");
    assert_eq!(settings.resolution.width, 800);
    assert_eq!(settings.rendering_mode, RenderingMode::DebugFill);
    assert_eq!(settings.clear_color, [0.2, 0.3, 1.0, 1.0]);
    assert_eq!(settings.camera.fov_degrees, 70.0);
    assert_eq!(settings.assets, PathBuf::from("data/assets.json"));
    assert_eq!(
        settings.present_mode(&[wgpu::PresentMode::Fifo, wgpu::PresentMode::Mailbox]),
        wgpu::PresentMode::Mailbox
    );
}

#[test]
fn malformed_settings_fall_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "settings.json", "{ \"resolution\": ");

    assert_eq!(RenderSettings::load_from_path(&path), RenderSettings::default());
}

#[test]
fn manifest_resolves_relative_to_its_directory() {
    let dir = tempdir().unwrap();
    write(&dir, "models/crate.gltf", "{}");
    write(&dir, "skybox/right.jpg", "");
    let manifest = write(
        &dir,
        "assets.json",
        r#"{ "entries": [
            { "key": "model", "path": "models/crate.gltf" },
            { "key": "skybox", "path": "skybox" },
            { "key": "skybox_right", "path": "skybox/right.jpg" },
            { "key": "skybox_left", "path": "skybox/left.jpg" }
        ] }"#,
    );

    let assets = AssetPaths::load_from_path(&manifest);

    assert_eq!(assets.len(), 3);
    assert_eq!(
        assets.get("model"),
        Some(dir.path().join("models/crate.gltf").as_path())
    );
    assert_eq!(
        assets.get("skybox_right"),
        Some(dir.path().join("skybox").join("right.jpg").as_path())
    );
    assert!(!assets.contains("skybox_left"));
}

#[test]
fn malformed_manifest_is_an_error() {
    assert!(AssetPaths::from_manifest_str("[1, 2", ".").is_err());
}
