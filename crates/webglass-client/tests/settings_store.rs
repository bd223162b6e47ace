#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;
use std::path::PathBuf;

use webglass_client::settings::{JsonFileStore, MemoryStore, Quality, Settings, SettingsStore, Theme};
use webglass_core::ErrorClass;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("webglass-test-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let _ = fs::remove_file(&path);
    path
}

#[test]
fn missing_file_yields_defaults() {
    let store = JsonFileStore::new(scratch("missing.json"));
    let s = store.load().unwrap();
    assert_eq!(s, Settings::default());
    assert_eq!(s.fps_limit, 10);
    assert!(s.auto_fill_forms);
    assert!(s.highlight_elements);
    assert!(!s.debug_mode);
}

#[test]
fn save_then_load() {
    let path = scratch("roundtrip.json");
    let store = JsonFileStore::new(&path);
    let s = Settings {
        quality: Quality::High,
        fps_limit: 30,
        theme: Theme::Dark,
        highlight_elements: false,
        debug_mode: true,
        auto_fill_forms: false,
    };
    store.save(&s).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"fpsLimit\": 30"));
    assert!(raw.contains("\"autoFillForms\": false"));
    assert_eq!(store.load().unwrap(), s);
}

#[test]
fn partial_file_fills_in_defaults() {
    let path = scratch("partial.json");
    fs::write(&path, r#"{"fpsLimit": 5, "theme": "system"}"#).unwrap();
    let s = JsonFileStore::new(&path).load().unwrap();
    assert_eq!(s.fps_limit, 5);
    assert_eq!(s.theme, Theme::System);
    assert_eq!(s.quality, Quality::Medium);
}

#[test]
fn corrupt_file_is_a_config_error_with_fallback() {
    let path = scratch("corrupt.json");
    fs::write(&path, "{ nope").unwrap();
    let store = JsonFileStore::new(&path);
    assert_eq!(store.load().unwrap_err().class(), ErrorClass::Config);
    assert_eq!(store.load_or_default(), Settings::default());
}

#[test]
fn effective_fps_is_clamped() {
    let s = Settings {
        fps_limit: 0,
        ..Settings::default()
    };
    assert_eq!(s.effective_fps(), 1);
    let s = Settings {
        fps_limit: 240,
        ..Settings::default()
    };
    assert_eq!(s.effective_fps(), 60);
}

#[test]
fn memory_store_clones_share_state() {
    let a = MemoryStore::new();
    let b = a.clone();
    assert_eq!(b.saved(), None);
    a.save(&Settings {
        debug_mode: true,
        ..Settings::default()
    })
    .unwrap();
    assert!(b.load().unwrap().debug_mode);
}
