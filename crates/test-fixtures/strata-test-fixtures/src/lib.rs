//! Shared clip fixtures for tests and benches.
//!
//! `fixtures/manifest.json` lists every clip with the duration and channel
//! count a correct loader must report for it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    clips: BTreeMap<String, ClipEntry>,
}

/// Manifest record for one clip.
#[derive(Clone, Debug, Deserialize)]
pub struct ClipEntry {
    pub path: String,
    /// Longest channel length in seconds.
    pub duration: f32,
    pub channels: usize,
}

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

pub mod clips {
    use super::*;

    /// Clip names, sorted.
    pub fn keys() -> Vec<String> {
        MANIFEST.clips.keys().cloned().collect()
    }

    pub fn entry(name: &str) -> Result<&'static ClipEntry> {
        MANIFEST
            .clips
            .get(name)
            .with_context(|| format!("unknown clip fixture '{name}'"))
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(fixtures_dir().join(&entry(name)?.path))
    }

    /// Raw clip JSON, as handed to the clip loader.
    pub fn json(name: &str) -> Result<String> {
        let path = path(name)?;
        fs::read_to_string(&path).with_context(|| format!("failed to read clip fixture at {}", path.display()))
    }

    /// Deserialize the clip file into any serde shape.
    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let text = json(name)?;
        serde_json::from_str(&text).with_context(|| format!("failed to parse clip fixture '{name}'"))
    }
}
