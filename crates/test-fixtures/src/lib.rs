//! Test fixture loader for Vigil golden scenarios, plus builders and
//! in-memory sinks used by integration tests across crates.

pub mod builders;
pub mod sinks;
pub mod traces;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use vigil_core::models::{RetrievedChunk, RiskLevel};

/// Root directory of the test-fixtures crate.
fn fixtures_root() -> PathBuf {
    // Works from any crate in the workspace: walk up to find test-fixtures.
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);

    while !path.join("test-fixtures").exists() {
        if !path.pop() {
            panic!(
                "Could not find test-fixtures directory from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("test-fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// List all JSON files in a fixture subdirectory, sorted by name.
pub fn list_fixtures(subdir: &str) -> Vec<PathBuf> {
    let dir = fixtures_root().join(subdir);
    if !dir.exists() {
        return Vec::new();
    }
    let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("Failed to read directory {}: {}", dir.display(), e))
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            path.extension()
                .is_some_and(|ext| ext == "json")
                .then_some(path)
        })
        .collect();
    paths.sort();
    paths
}

/// A golden detector scenario: one answer, its evidence and the expected
/// verdict.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectorScenario {
    pub name: String,
    pub answer: String,
    pub confidence: f64,
    pub chunks: Vec<RetrievedChunk>,
    pub expected_risk: RiskLevel,
    pub expected_flagged: bool,
    /// Contradiction rule ids that must fire.
    #[serde(default)]
    pub expected_rules: Vec<String>,
}

/// Every scenario under `golden/detector/`.
pub fn detector_scenarios() -> Vec<DetectorScenario> {
    list_fixtures("golden/detector")
        .iter()
        .map(|p| {
            let rel = p
                .strip_prefix(fixtures_root())
                .unwrap_or(p)
                .to_string_lossy()
                .into_owned();
            load_fixture(&rel)
        })
        .collect()
}

/// Load one scenario by file stem.
pub fn detector_scenario(name: &str) -> DetectorScenario {
    load_fixture(&format!("golden/detector/{name}.json"))
}
