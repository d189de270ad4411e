//! Catalog load/save with schema + invariant validation.
//!
//! The catalog is write-once: it is bootstrapped from [`default_catalog`] the
//! first time it is needed and only ever read afterwards.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde_json::Value;
use tracing::{debug, info};

use crate::catalog::default_catalog;
use crate::core::invariants::validate_catalog;
use crate::core::types::TaskDefinition;
use crate::errors::ConfigurationError;
use crate::io::atomic::write_json_atomic;

const CATALOG_SCHEMA: &str = include_str!("../../schemas/catalog.schema.json");

/// Load and validate the catalog at `path`.
///
/// Any structural or semantic problem is a [`ConfigurationError`].
pub fn load_catalog(path: &Path) -> Result<Vec<TaskDefinition>> {
    debug!(path = %path.display(), "loading catalog");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read catalog {}", path.display()))?;
    let tasks = parse_catalog(path, &contents)?;
    debug!(tasks = tasks.len(), "catalog loaded");
    Ok(tasks)
}

/// Load the catalog, writing the bootstrap catalog first if none exists.
pub fn load_or_bootstrap_catalog(path: &Path) -> Result<Vec<TaskDefinition>> {
    if path.exists() {
        return load_catalog(path);
    }
    let tasks = default_catalog();
    info!(path = %path.display(), tasks = tasks.len(), "bootstrapping default catalog");
    write_catalog(path, &tasks)?;
    Ok(tasks)
}

/// Validate then atomically write the catalog.
pub fn write_catalog(path: &Path, tasks: &[TaskDefinition]) -> Result<()> {
    let errors = validate_catalog(tasks);
    if !errors.is_empty() {
        return Err(ConfigurationError::new(path, errors).into());
    }
    write_json_atomic(path, &tasks)
}

fn parse_catalog(path: &Path, contents: &str) -> Result<Vec<TaskDefinition>> {
    let value: Value = serde_json::from_str(contents)
        .map_err(|err| ConfigurationError::single(path, format!("invalid json: {err}")))?;
    validate_schema(path, &value)?;
    let tasks: Vec<TaskDefinition> = serde_json::from_value(value)
        .map_err(|err| ConfigurationError::single(path, format!("invalid task: {err}")))?;
    let errors = validate_catalog(&tasks);
    if !errors.is_empty() {
        return Err(ConfigurationError::new(path, errors).into());
    }
    Ok(tasks)
}

fn validate_schema(path: &Path, catalog: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(CATALOG_SCHEMA).context("parse catalog schema")?;
    let compiled = validator_for(&schema).map_err(|err| anyhow!("invalid schema: {}", err))?;
    let messages: Vec<String> = compiled
        .iter_errors(catalog)
        .map(|err| format!("schema: {err}"))
        .collect();
    if !messages.is_empty() {
        return Err(ConfigurationError::new(path, messages).into());
    }
    Ok(())
}
