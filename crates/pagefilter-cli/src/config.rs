//! Configuration loading and resolution.

use std::path::{Path, PathBuf};

use anyhow::Context;

use pagefilter::{MemorySource, PaginatorConfig, SchemaGraph};

pub const SCHEMA_ENV: &str = "PAGEFILTER_SCHEMA";
pub const DATA_ENV: &str = "PAGEFILTER_DATA";
pub const CONFIG_ENV: &str = "PAGEFILTER_CONFIG";

const DEFAULT_SCHEMA_FILE: &str = "schema.json";
const DEFAULT_DATA_FILE: &str = "records.json";

/// Explicit path, else `$env_var`, else `default` in the working directory.
pub fn resolve_path(explicit: Option<&str>, env_var: &str, default: &str) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(env_var) {
        if !env_path.is_empty() {
            return PathBuf::from(env_path);
        }
    }

    PathBuf::from(default)
}

pub fn resolve_schema_path(explicit: Option<&str>) -> PathBuf {
    resolve_path(explicit, SCHEMA_ENV, DEFAULT_SCHEMA_FILE)
}

pub fn resolve_data_path(explicit: Option<&str>) -> PathBuf {
    resolve_path(explicit, DATA_ENV, DEFAULT_DATA_FILE)
}

/// The config file is optional: no flag and no env var means defaults.
pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
    explicit
        .map(PathBuf::from)
        .or_else(|| std::env::var(CONFIG_ENV).ok().filter(|p| !p.is_empty()).map(PathBuf::from))
}

pub fn load_schema(path: &Path) -> anyhow::Result<SchemaGraph> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading schema: {}", path.display()))?;
    let schema = SchemaGraph::from_json(&text)
        .with_context(|| format!("loading schema: {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        entities = ?schema.entity_names().collect::<Vec<_>>(),
        "loaded schema"
    );
    Ok(schema)
}

pub fn load_records(path: &Path) -> anyhow::Result<MemorySource> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading records: {}", path.display()))?;
    MemorySource::from_json(&text)
        .with_context(|| format!("records must be a JSON array: {}", path.display()))
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<PaginatorConfig> {
    let Some(path) = path else {
        return Ok(PaginatorConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config: {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing config: {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?config, "loaded paginator config");
    Ok(config)
}
