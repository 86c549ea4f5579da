use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::DefinitionsFile;

const DEFINITIONS_RELATIVE_PATH: &str = "data/definitions.json";

pub fn definitions_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFINITIONS_RELATIVE_PATH)
}

pub fn load_definitions() -> Result<DefinitionsFile> {
    load_definitions_from_path(definitions_path())
}

pub fn load_definitions_from_path(path: impl AsRef<Path>) -> Result<DefinitionsFile> {
    read_json(path.as_ref(), "definitions")
}

pub fn parse_definitions(json: &str) -> Result<DefinitionsFile> {
    serde_json::from_str(json).context("failed parsing definitions JSON")
}

fn read_json<T>(path: &Path, label: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading {label} file: {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("failed parsing {label} file as JSON: {}", path.display()))
}
