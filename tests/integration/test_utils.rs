//! Shared test utilities for integration tests
//!
//! Models used across suites, float comparison, and isolation of the
//! environment variables the config loader reads.

use lazyve::model::Universe;
use lazyve::types::{ElementId, Value};
use std::sync::Mutex;
use tempfile::TempDir;

/// Serializes every test that touches HOME, XDG_CONFIG_HOME or LAZYVE_*.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const TOLERANCE: f64 = 1e-9;

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "expected {}, got {}",
        expected,
        actual
    );
}

/// Flips of a fair coin until heads, counting from 1.
pub fn recursive_geometric(u: &Universe) -> ElementId {
    lazyve::demos::flips_until_heads(u, 0.5, 1)
}

/// `a`, `b` fair coins and `c = a || b`, with `c` observed true.
pub fn observed_or(u: &Universe) -> (ElementId, ElementId, ElementId) {
    let a = u.flip(0.5);
    let b = u.flip(0.5);
    let c = u.apply2(a, b, |x, y| {
        Value::Bool(x.as_bool().unwrap_or(false) || y.as_bool().unwrap_or(false))
    });
    u.observe(c, true);
    (a, b, c)
}

struct EnvState {
    home: Option<String>,
    xdg_config_home: Option<String>,
    lazyve: Vec<(String, String)>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            home: std::env::var("HOME").ok(),
            xdg_config_home: std::env::var("XDG_CONFIG_HOME").ok(),
            lazyve: std::env::vars()
                .filter(|(k, _)| k.starts_with("LAZYVE_"))
                .collect(),
        }
    }

    fn restore(self) {
        restore_var("HOME", self.home);
        restore_var("XDG_CONFIG_HOME", self.xdg_config_home);
        for (key, _) in std::env::vars().filter(|(k, _)| k.starts_with("LAZYVE_")) {
            std::env::remove_var(key);
        }
        for (key, value) in self.lazyve {
            std::env::set_var(key, value);
        }
    }
}

fn restore_var(key: &str, value: Option<String>) {
    match value {
        Some(v) => std::env::set_var(key, v),
        None => std::env::remove_var(key),
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME inside `test_dir` and no `LAZYVE_*`
/// variables set. The original environment is restored afterwards.
pub fn with_isolated_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let home = test_dir.path().join("home");
    let config_home = test_dir.path().join("config");
    std::fs::create_dir_all(&home).unwrap();
    std::fs::create_dir_all(&config_home).unwrap();

    std::env::set_var("HOME", &home);
    std::env::set_var("XDG_CONFIG_HOME", &config_home);
    for (key, _) in std::env::vars().filter(|(k, _)| k.starts_with("LAZYVE_")) {
        std::env::remove_var(key);
    }

    let result = f();

    env_state.restore();
    result
}
