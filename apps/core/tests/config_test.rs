use std::time::{SystemTime, UNIX_EPOCH};

use nsfilter_core::config::{self, Config, ConfigError};
use nsfilter_core::coordinator::FilterOptions;

fn scratch_path(name: &str) -> std::path::PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("nsfilter-config-{unique}-{name}"))
}

#[test]
fn accepts_default_config() {
    let cfg = Config::default();
    assert_eq!(cfg.announce_delay_ms, 1000);
    assert_eq!(cfg.filter_attribute, "data-filter");
    assert!(cfg.config_path.to_string_lossy().ends_with("config.toml"));
    assert!(config::validate(&cfg).is_ok());
}

#[test]
fn rejects_delay_out_of_range() {
    for delay in [0, 49, 10_001] {
        let cfg = Config {
            announce_delay_ms: delay,
            ..Default::default()
        };
        assert!(matches!(config::validate(&cfg), Err(ConfigError::Invalid(_))));
    }
}

#[test]
fn rejects_attribute_with_selector_syntax() {
    let cfg = Config {
        filter_attribute: "data-filter]".to_string(),
        ..Default::default()
    };
    assert!(config::validate(&cfg).is_err());
}

#[test]
fn rejects_unknown_log_level() {
    let cfg = Config {
        log_level: "verbose".to_string(),
        ..Default::default()
    };
    assert!(matches!(config::validate(&cfg), Err(ConfigError::Invalid(_))));

    for level in ["off", "error", "WARN", "debug", "trace"] {
        let cfg = Config {
            log_level: level.to_string(),
            ..Default::default()
        };
        assert!(config::validate(&cfg).is_ok(), "level {level}");
    }
}

#[test]
fn missing_file_yields_defaults_at_requested_path() {
    let path = scratch_path("absent.toml");
    let cfg = config::load(Some(&path)).unwrap();

    assert_eq!(cfg.config_path, path);
    assert_eq!(cfg.announce_delay_ms, 1000);
}

#[test]
fn loads_partial_toml() {
    let path = scratch_path("partial.toml");
    std::fs::write(&path, "announce_delay_ms = 400\nfilter_attribute = \" data-search \"\n").unwrap();

    let cfg = config::load(Some(&path)).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(cfg.announce_delay_ms, 400);
    assert_eq!(cfg.filter_attribute, "data-search");
    assert_eq!(cfg.log_level, "info");

    let options = FilterOptions::from(&cfg);
    assert_eq!(options.announce_delay.as_millis(), 400);
    assert_eq!(options.filter_attribute, "data-search");
}

#[test]
fn loads_json5() {
    let path = scratch_path("settings.json5");
    std::fs::write(&path, "{ log_level: 'debug', /* quieter */ announce_delay_ms: 750 }").unwrap();

    let cfg = config::load(Some(&path)).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(cfg.log_level, "debug");
    assert_eq!(cfg.announce_delay_ms, 750);
}

#[test]
fn invalid_values_in_file_are_rejected() {
    let path = scratch_path("invalid.toml");
    std::fs::write(&path, "announce_delay_ms = 5\n").unwrap();

    let result = config::load(Some(&path));
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn save_then_load_keeps_values() {
    let dir = scratch_path("saved");
    let cfg = Config {
        announce_delay_ms: 1200,
        filter_attribute: "data-namespace".to_string(),
        config_path: dir.join("config.toml"),
        ..Default::default()
    };

    config::save(&cfg).unwrap();
    let loaded = config::load(Some(&cfg.config_path)).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();

    assert_eq!(loaded, cfg);
}
