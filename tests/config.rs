// tests/config.rs
use moving_window::config::{load_settings_default, load_settings_from, Settings};
use std::{env, fs};

const ENV_KEYS: [&str; 5] = [
    "WINDOW_CONFIG_PATH",
    "WINDOW_MS",
    "WINDOW_REPORT_INTERVAL_MS",
    "WINDOW_BIND_ADDR",
    "WINDOW_AGGREGATORS",
];

fn clear_env() {
    for k in ENV_KEYS {
        env::remove_var(k);
    }
}

#[test]
fn load_from_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("window.toml");
    fs::write(
        &p,
        r#"
window_ms = 1500
aggregators = ["sum", "count"]
"#,
    )
    .unwrap();

    let s = load_settings_from(&p).unwrap();
    assert_eq!(s.window_ms, 1500);
    assert_eq!(s.report_interval_ms, 1000);
    assert_eq!(s.aggregators, vec!["sum".to_string(), "count".to_string()]);
    let names: Vec<String> = s
        .build_aggregators()
        .unwrap()
        .iter()
        .map(|a| a.name().to_string())
        .collect();
    assert_eq!(names, vec!["sum", "count"]);
}

#[test]
fn broken_toml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("window.toml");
    fs::write(&p, "window_ms = \"soon\"").unwrap();
    assert!(load_settings_from(&p).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    // 1) Nothing present -> defaults
    assert_eq!(load_settings_default().unwrap(), Settings::default());

    // 2) Fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("window.toml"), "window_ms = 2000").unwrap();
    assert_eq!(load_settings_default().unwrap().window_ms, 2000);

    // 3) Explicit path wins
    let p_env = tmp.path().join("other.toml");
    fs::write(&p_env, "window_ms = 7000").unwrap();
    env::set_var("WINDOW_CONFIG_PATH", p_env.display().to_string());
    assert_eq!(load_settings_default().unwrap().window_ms, 7000);

    // 4) Missing explicit path is an error
    env::set_var("WINDOW_CONFIG_PATH", tmp.path().join("missing.toml"));
    assert!(load_settings_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn env_overrides_apply_and_are_validated() {
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    env::set_var("WINDOW_MS", "250");
    env::set_var("WINDOW_BIND_ADDR", "127.0.0.1:9000");
    env::set_var("WINDOW_AGGREGATORS", "max, min");
    let s = load_settings_default().unwrap();
    assert_eq!(s.window_ms, 250);
    assert_eq!(s.bind_addr, "127.0.0.1:9000");
    assert_eq!(s.aggregators, vec!["max".to_string(), "min".to_string()]);

    env::set_var("WINDOW_MS", "0");
    assert!(load_settings_default().is_err());

    env::set_var("WINDOW_MS", "abc");
    assert!(load_settings_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}
