//! Pipeline configuration.
//!
//! A small versioned JSON document names the side-table inputs and the
//! stale-class denylist. Parsing is schema-checked by hand so a missing key
//! fails with the exact path that is absent.

use serde_json::Value;

use crate::error::{MappingError, Result};

/// Parsed pipeline configuration (spec version 1).
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Path of the primary mapping table within the input bundle.
    pub mappings: String,
    /// Path of the static-method list.
    pub static_methods: String,
    /// Path of the constructor table.
    pub constructors: String,
    /// Source-namespace names of top-level classes to prune before
    /// processing. Known upstream data-quality issue, declared as plain
    /// configuration.
    pub prune: Vec<String>,
}

/// Read a config document, dispatching on its `spec` version.
pub fn read_config(json: &Value) -> Result<PipelineConfig> {
    match json.get("spec").and_then(Value::as_u64) {
        Some(1) => read_v1(json),
        _ => Err(missing("spec")),
    }
}

fn read_v1(json: &Value) -> Result<PipelineConfig> {
    let data = json.get("data").ok_or_else(|| missing("data"))?;

    let mappings = string_key(data, "mappings", "data.mappings")?;
    let static_methods = string_key(data, "static_methods", "data.static_methods")?;
    let constructors = string_key(data, "constructors", "data.constructors")?;

    let prune = match json.get("prune") {
        None => Vec::new(),
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(|| missing("prune")))
            .collect::<Result<Vec<String>>>()?,
        Some(_) => return Err(missing("prune")),
    };

    Ok(PipelineConfig {
        mappings,
        static_methods,
        constructors,
        prune,
    })
}

fn string_key(value: &Value, key: &str, path: &str) -> Result<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing(path))
}

fn missing(key: &str) -> MappingError {
    MappingError::InvalidConfigSchema {
        missing_key: key.to_string(),
    }
}
