//! Shared fixture lookup for tests and benches.
//!
//! `fixtures/manifest.json` maps short keys to files under `fixtures/`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    animations: HashMap<String, String>,
    targets: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a>(map: &'a HashMap<String, String>, kind: &str, name: &str) -> Result<&'a str> {
    map.get(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// XML animation definition files.
pub mod animations {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.animations.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn xml(name: &str) -> Result<String> {
        read_to_string(lookup(&MANIFEST.animations, "animation", name)?)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(resolve_path(lookup(&MANIFEST.animations, "animation", name)?))
    }
}

/// Initial property values for test targets, stored as flat JSON objects.
pub mod targets {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.targets.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        read_to_string(lookup(&MANIFEST.targets, "target", name)?)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        super::load_json(lookup(&MANIFEST.targets, "target", name)?)
    }

    /// Property name → value pairs of a target fixture.
    pub fn properties(name: &str) -> Result<HashMap<String, String>> {
        load(name)
    }
}
