//! Contract fixture loader.
//!
//! Loads golden files from `contracts/http/` and checks response bodies against them.

use std::path::{Path, PathBuf};

use serde_json::Value;

/// Load a JSON fixture file relative to the workspace root.
///
/// # Example
/// ```no_run
/// use gazette_testing::fixture::Fixture;
/// let val = Fixture::load("contracts/http/cron/cleanup_empty.json");
/// ```
pub struct Fixture;

impl Fixture {
    /// Load and parse a fixture JSON file at `workspace_root/path`.
    ///
    /// Panics if the file is missing or invalid JSON.
    pub fn load(relative_path: &str) -> Value {
        let full_path = workspace_root().join(relative_path);
        let contents = std::fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("fixture not found at {}: {}", full_path.display(), e));
        serde_json::from_str(&contents)
            .unwrap_or_else(|e| panic!("invalid JSON in fixture {}: {}", relative_path, e))
    }

    /// Assert that `actual` has the same shape as the fixture: every key the fixture
    /// names is present with the same JSON type. Values equal to the string `"*"` in the
    /// fixture match anything; other scalars must match exactly.
    pub fn assert_matches(relative_path: &str, actual: &Value) {
        let expected = Self::load(relative_path);
        if let Err(path) = matches(&expected, actual, "$") {
            panic!(
                "response does not match fixture {} at {}\nexpected: {}\nactual: {}",
                relative_path, path, expected, actual
            );
        }
    }
}

fn workspace_root() -> PathBuf {
    std::env::var("CARGO_MANIFEST_DIR")
        .map(|dir| {
            // Walk up from crate dir to workspace root
            let p = Path::new(&dir);
            p.ancestors()
                .find(|a| a.join("Cargo.lock").exists() || a.join("contracts").is_dir())
                .unwrap_or(p)
                .to_path_buf()
        })
        .unwrap_or_else(|_| std::env::current_dir().unwrap())
}

fn matches(expected: &Value, actual: &Value, path: &str) -> Result<(), String> {
    match (expected, actual) {
        (Value::String(s), _) if s == "*" => Ok(()),
        (Value::Object(e), Value::Object(a)) => {
            for (key, ev) in e {
                let av = a.get(key).ok_or_else(|| format!("{path}.{key}"))?;
                matches(ev, av, &format!("{path}.{key}"))?;
            }
            Ok(())
        }
        (Value::Array(e), Value::Array(a)) => {
            if e.len() != a.len() {
                return Err(format!("{path} (length)"));
            }
            for (i, (ev, av)) in e.iter().zip(a).enumerate() {
                matches(ev, av, &format!("{path}[{i}]"))?;
            }
            Ok(())
        }
        (e, a) if e == a => Ok(()),
        _ => Err(path.to_string()),
    }
}
