//! Integration tests for the domain manager and the built-in domains.

use deskcfg::paths::ConfigPaths;
use deskcfg::{ConfigError, Manager, Provider, register_builtin_domains};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;

/// Helper to create an initialized manager with the built-in domains.
fn setup(temp: &TempDir) -> Manager {
    let manager = Manager::with_paths(ConfigPaths::with_base_dir(temp.path()));
    manager.initialize().expect("Failed to initialize manager");
    register_builtin_domains(&manager).expect("Failed to register domains");
    manager.load_all().expect("Failed to load domains");
    manager
}

#[test]
fn list_domains_is_sorted() {
    let temp = TempDir::new().unwrap();
    let manager = setup(&temp);
    assert_eq!(manager.list_domains(), vec!["cli", "shell"]);
}

#[test]
fn set_then_get_round_trips() {
    let temp = TempDir::new().unwrap();
    let manager = setup(&temp);

    manager.set("cli", "theme.opacity", json!(0.75)).unwrap();
    assert_eq!(manager.get("cli", "theme.opacity").unwrap(), json!(0.75));

    manager
        .set("shell", "bar.modules", json!(["clock", "tray"]))
        .unwrap();
    assert_eq!(
        manager.get("shell", "bar.modules").unwrap(),
        json!(["clock", "tray"])
    );
}

#[test]
fn rejected_set_keeps_prior_value() {
    let temp = TempDir::new().unwrap();
    let manager = setup(&temp);

    let err = manager.set("cli", "scheme.mode", json!("blue")).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed(_)));
    assert!(err.to_string().contains("must be one of"));
    assert_eq!(manager.get("cli", "scheme.mode").unwrap(), json!("dark"));

    let err = manager.set("shell", "bar.height", json!(4)).unwrap_err();
    assert!(err.to_string().contains(">= 16"), "got: {}", err);
    assert_eq!(manager.get("shell", "bar.height").unwrap(), json!(32));

    let err = manager
        .set("cli", "screenshot.quality", json!("high"))
        .unwrap_err();
    assert!(err.to_string().contains("must be of type integer"));
    assert_eq!(manager.get("cli", "screenshot.quality").unwrap(), json!(90));
}

#[test]
fn schema_override_closes_theme_to_enum() {
    let temp = TempDir::new().unwrap();
    let schema_dir = temp.path().join("schemas");
    std::fs::create_dir_all(&schema_dir).unwrap();
    std::fs::write(
        schema_dir.join("cli.schema.json"),
        r#"{
            "type": "object",
            "properties": {
                "theme": {"type": "string", "enum": ["dark", "light"]}
            }
        }"#,
    )
    .unwrap();

    let manager = setup(&temp);
    let err = manager.set("cli", "theme", json!("blue")).unwrap_err();
    assert!(err.to_string().contains("must be one of"));
    manager.set("cli", "theme", json!("light")).unwrap();
    assert_eq!(manager.get("cli", "theme").unwrap(), json!("light"));
}

#[test]
fn empty_path_set_cannot_replace_domain() {
    let temp = TempDir::new().unwrap();
    let manager = setup(&temp);

    for domain in ["cli", "shell"] {
        let err = manager.set(domain, "", Value::Null).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPath { .. }), "{}: {}", domain, err);
    }
    assert_eq!(manager.get("shell", "bar.height").unwrap(), json!(32));
    assert!(manager.get_all("shell").unwrap().is_object());
}

#[test]
fn missing_path_is_reported() {
    let temp = TempDir::new().unwrap();
    let manager = setup(&temp);

    let err = manager.get("cli", "nonexistent.path").unwrap_err();
    assert_eq!(err.to_string(), "path not found: nonexistent.path");
}

#[test]
fn unknown_domain_is_reported() {
    let temp = TempDir::new().unwrap();
    let manager = setup(&temp);

    let err = manager.validate("unknown").unwrap_err();
    assert_eq!(err.to_string(), "unknown configuration domain: unknown");
    assert!(manager.get("unknown", "a").is_err());
    assert!(manager.save("unknown").is_err());
}

#[test]
fn set_all_validates_whole_tree() {
    let temp = TempDir::new().unwrap();
    let manager = setup(&temp);

    let mut tree = manager.get_all("shell").unwrap();
    tree["launcher"]["max_results"] = json!(500);
    let err = manager.set_all("shell", tree.clone()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed(_)));
    assert_eq!(manager.get("shell", "launcher.max_results").unwrap(), json!(8));

    tree["launcher"]["max_results"] = json!(20);
    manager.set_all("shell", tree).unwrap();
    assert_eq!(
        manager.get("shell", "launcher.max_results").unwrap(),
        json!(20)
    );
}

#[test]
fn shell_domain_saves_flattened_file() {
    let temp = TempDir::new().unwrap();
    let manager = setup(&temp);

    manager.set("shell", "font.family", json!("Iosevka")).unwrap();
    manager.save("shell").unwrap();

    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(temp.path().join("shell.json")).unwrap())
            .unwrap();
    assert_eq!(written["font.family"], "Iosevka");
    assert_eq!(written["bar.height"], 32);

    let reloaded = setup(&temp);
    assert_eq!(
        reloaded.get("shell", "font.family").unwrap(),
        json!("Iosevka")
    );
}

#[test]
fn get_all_domains_returns_every_tree() {
    let temp = TempDir::new().unwrap();
    let manager = setup(&temp);

    let trees = manager.get_all_domains().unwrap();
    assert_eq!(trees.len(), 2);
    assert_eq!(trees["cli"]["version"], "1.0");
    assert_eq!(trees["shell"]["bar"]["position"], "top");
}

#[test]
fn validate_all_passes_on_defaults() {
    let temp = TempDir::new().unwrap();
    let manager = setup(&temp);
    manager.validate_all().unwrap();
}

#[test]
fn load_all_isolates_broken_domain() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("shell.json"), "{ not json").unwrap();
    std::fs::write(
        temp.path().join("config.json"),
        r#"{"scheme": {"default": "nord"}}"#,
    )
    .unwrap();

    let manager = Manager::with_paths(ConfigPaths::with_base_dir(temp.path()));
    manager.initialize().unwrap();
    register_builtin_domains(&manager).unwrap();

    let err = manager.load_all().unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("1 of 2 domain(s) failed"), "got: {}", message);
    assert!(message.contains("shell: "));
    assert!(!message.contains("cli: "));
    assert_eq!(manager.get("cli", "scheme.default").unwrap(), json!("nord"));
}

/// Provider whose save can be made to fail.
struct FlakyProvider {
    name: &'static str,
    fail: bool,
    saved: AtomicBool,
}

impl FlakyProvider {
    fn new(name: &'static str, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail,
            saved: AtomicBool::new(false),
        })
    }
}

impl Provider for FlakyProvider {
    fn domain(&self) -> &str {
        self.name
    }
    fn config_path(&self) -> std::path::PathBuf {
        std::path::PathBuf::from(format!("{}.json", self.name))
    }
    fn initialize(&self) -> deskcfg::Result<()> {
        Ok(())
    }
    fn schema(&self) -> deskcfg::Result<Option<deskcfg::Schema>> {
        Ok(None)
    }
    fn load(&self) -> deskcfg::Result<()> {
        Ok(())
    }
    fn save(&self) -> deskcfg::Result<()> {
        if self.fail {
            return Err(ConfigError::PathNotFound("disk".to_string()));
        }
        self.saved.store(true, Ordering::SeqCst);
        Ok(())
    }
    fn get(&self, path: &str) -> deskcfg::Result<Value> {
        Err(ConfigError::PathNotFound(path.to_string()))
    }
    fn set(&self, _path: &str, _value: Value) -> deskcfg::Result<()> {
        Ok(())
    }
    fn get_all(&self) -> deskcfg::Result<Value> {
        Ok(json!({}))
    }
    fn set_all(&self, _tree: Value) -> deskcfg::Result<()> {
        Ok(())
    }
    fn validate(&self) -> deskcfg::Result<()> {
        Ok(())
    }
}

#[test]
fn save_all_attempts_every_domain() {
    let temp = TempDir::new().unwrap();
    let manager = Manager::with_paths(ConfigPaths::with_base_dir(temp.path()));
    manager.initialize().unwrap();

    // "alpha" sorts first, so a short-circuit would skip "beta".
    let alpha = FlakyProvider::new("alpha", true);
    let beta = FlakyProvider::new("beta", false);
    manager.register_provider("alpha", alpha.clone()).unwrap();
    manager.register_provider("beta", beta.clone()).unwrap();

    let err = manager.save_all().unwrap_err();
    assert_eq!(err.failed_domains(), vec!["alpha"]);
    assert!(err.to_string().contains("alpha: path not found: disk"));
    assert!(!err.to_string().contains("beta"));
    assert!(beta.saved.load(Ordering::SeqCst));
}

#[test]
fn schema_less_domain_skips_validation() {
    let temp = TempDir::new().unwrap();
    let manager = Manager::with_paths(ConfigPaths::with_base_dir(temp.path()));
    manager.initialize().unwrap();
    manager
        .register_provider("plain", FlakyProvider::new("plain", false))
        .unwrap();

    assert!(manager.schema("plain").is_none());
    manager.set("plain", "anything", json!([1, 2, 3])).unwrap();
}

#[test]
fn paths_are_locked_after_initialize() {
    let temp = TempDir::new().unwrap();
    let manager = Manager::with_paths(ConfigPaths::with_base_dir(temp.path()));
    manager
        .set_paths(ConfigPaths::with_base_dir(temp.path().join("other")))
        .unwrap();
    manager.initialize().unwrap();
    assert!(temp.path().join("other").is_dir());

    let err = manager
        .set_paths(ConfigPaths::with_base_dir(temp.path()))
        .unwrap_err();
    assert!(matches!(err, ConfigError::PathsLocked));
}

#[test]
fn backup_copies_domain_file() {
    let temp = TempDir::new().unwrap();
    let manager = setup(&temp);

    manager.set("cli", "clipboard.max_items", json!(250)).unwrap();
    manager.save("cli").unwrap();

    let backup = manager.backup("cli").unwrap();
    assert!(backup.starts_with(temp.path().join("backups")));
    let name = backup.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("cli-") && name.ends_with(".json"));

    let copied: Value = serde_json::from_str(&std::fs::read_to_string(&backup).unwrap()).unwrap();
    assert_eq!(copied["clipboard"]["max_items"], 250);
}

#[test]
fn backup_without_file_fails() {
    let temp = TempDir::new().unwrap();
    let manager = setup(&temp);
    assert!(matches!(
        manager.backup("cli").unwrap_err(),
        ConfigError::Io { .. }
    ));
}
