//! End-to-end provisioning tests for the engine, run against scratch
//! directories with no docker daemon involved.

use clawbox_core::engine::{ENV_FILE, OVERLAY_FILE};
use clawbox_core::Engine;
use clawbox_schema::Settings;
use std::path::Path;

fn settings_in(root: &Path) -> Settings {
    Settings {
        config_dir: root.join("config"),
        workspace_dir: root.join("workspace"),
        gateway_port: 18789,
        bridge_port: 18790,
        gateway_bind: "lan".to_owned(),
        gateway_token: None,
        image: "openclaw:local".to_owned(),
        extra_mounts: None,
        home_volume: None,
        apt_packages: None,
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn prepare_creates_directories_and_env_file() {
    let root = tempfile::tempdir().unwrap();
    let settings = settings_in(root.path());
    let engine = Engine::new(settings.clone(), root.path(), "docker-compose.yml");

    let prepared = engine.prepare().unwrap();

    assert!(settings.config_dir.is_dir());
    assert!(settings.workspace_dir.is_dir());
    assert!(!prepared.overlay_written);
    assert!(!root.path().join(OVERLAY_FILE).exists());

    let env = read(&root.path().join(ENV_FILE));
    assert!(env.contains("CLAWBOX_IMAGE=openclaw:local\n"));
    assert!(env.contains("CLAWBOX_GATEWAY_PORT=18789\n"));
    // Undefined keys are never written.
    assert!(!env.contains("CLAWBOX_EXTRA_MOUNTS"));
    assert!(!env.contains("CLAWBOX_HOME_VOLUME"));
}

#[test]
fn prepare_provisions_a_hex_token_when_absent() {
    let root = tempfile::tempdir().unwrap();
    let engine = Engine::new(settings_in(root.path()), root.path(), "docker-compose.yml");

    let prepared = engine.prepare().unwrap();
    let token = prepared.settings.gateway_token.unwrap();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    let env = read(&root.path().join(ENV_FILE));
    assert!(env.contains(&format!("CLAWBOX_GATEWAY_TOKEN={token}\n")));
}

#[test]
fn prepare_reuses_the_token_persisted_in_env_file() {
    let root = tempfile::tempdir().unwrap();
    let engine = Engine::new(settings_in(root.path()), root.path(), "docker-compose.yml");

    let first = engine.prepare().unwrap().settings.gateway_token.unwrap();
    let second = engine.prepare().unwrap().settings.gateway_token.unwrap();
    assert_eq!(first, second, "re-running must not rotate the secret");

    let env = read(&root.path().join(ENV_FILE));
    assert!(env.contains(&format!("CLAWBOX_GATEWAY_TOKEN={first}\n")));
}

#[test]
fn environment_token_overrides_the_persisted_one() {
    let root = tempfile::tempdir().unwrap();
    let engine = Engine::new(settings_in(root.path()), root.path(), "docker-compose.yml");
    let _ = engine.prepare().unwrap();

    let mut settings = settings_in(root.path());
    settings.gateway_token = Some("from-env".to_owned());
    let engine = Engine::new(settings, root.path(), "docker-compose.yml");
    let prepared = engine.prepare().unwrap();
    assert_eq!(prepared.settings.gateway_token.as_deref(), Some("from-env"));
    assert!(read(&root.path().join(ENV_FILE)).contains("CLAWBOX_GATEWAY_TOKEN=from-env\n"));
}

#[test]
fn prepare_keeps_a_supplied_token() {
    let root = tempfile::tempdir().unwrap();
    let mut settings = settings_in(root.path());
    settings.gateway_token = Some("pinned-token".to_owned());
    let engine = Engine::new(settings, root.path(), "docker-compose.yml");

    let prepared = engine.prepare().unwrap();
    assert_eq!(prepared.settings.gateway_token.as_deref(), Some("pinned-token"));
}

#[test]
fn prepare_with_volume_sources_writes_a_deterministic_overlay() {
    let root = tempfile::tempdir().unwrap();
    let mut settings = settings_in(root.path());
    settings.home_volume = Some("claw-home".to_owned());
    settings.extra_mounts = Some(" /models:/home/node/models , ".to_owned());
    let engine = Engine::new(settings, root.path(), "docker-compose.yml");

    let prepared = engine.prepare().unwrap();
    assert!(prepared.overlay_written);
    assert_eq!(
        prepared.compose_files,
        [Path::new("docker-compose.yml"), Path::new(OVERLAY_FILE)]
    );

    let first = read(&root.path().join(OVERLAY_FILE));
    assert!(first.contains("claw-home:/home/node"));
    assert!(first.contains("/models:/home/node/models"));
    assert!(first.contains("claw-home: null"));

    let _ = engine.prepare().unwrap();
    assert_eq!(read(&root.path().join(OVERLAY_FILE)), first);
}

#[test]
fn prepare_preserves_hand_edits_in_env_file() {
    let root = tempfile::tempdir().unwrap();
    let mut settings = settings_in(root.path());
    settings.gateway_token = Some("tok".to_owned());
    let engine = Engine::new(settings, root.path(), "docker-compose.yml");

    std::fs::write(
        root.path().join(ENV_FILE),
        "# my notes\nMY_CUSTOM=value\nCLAWBOX_IMAGE=stale\n",
    )
    .unwrap();

    let _ = engine.prepare().unwrap();
    let env = read(&root.path().join(ENV_FILE));
    assert!(env.starts_with("# my notes\nMY_CUSTOM=value\nCLAWBOX_IMAGE=openclaw:local\n"));

    // With a pinned token the whole operation is idempotent.
    let _ = engine.prepare().unwrap();
    assert_eq!(read(&root.path().join(ENV_FILE)), env);
}
