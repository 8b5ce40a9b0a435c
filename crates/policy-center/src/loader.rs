use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::apply::apply_override_to_snapshot;
use crate::defaults::default_snapshot;
use crate::errors::PolicyError;
use crate::model::{PolicySnapshot, PolicySource};

const ENV_PREFIX: &str = "LOCUS_POLICY__";
const ENV_JSON: &str = "LOCUS_POLICY_OVERRIDE_JSON";

/// Defaults, then the optional YAML file, then environment overlays.
pub fn load_snapshot(path: Option<&Path>) -> Result<PolicySnapshot, PolicyError> {
    load_layers(path, true)
}

pub(crate) fn load_layers(
    path: Option<&Path>,
    with_env: bool,
) -> Result<PolicySnapshot, PolicyError> {
    let mut snapshot = default_snapshot();
    record_builtin(&mut snapshot)?;

    match path {
        Some(path) if path.exists() => {
            let document = read_yaml(path)?;
            apply_all(&mut snapshot, leaves(document, "", PolicySource::File))?;
        }
        Some(path) => debug!(path = %path.display(), "policy file missing, keeping defaults"),
        None => {}
    }

    if with_env {
        apply_all(&mut snapshot, env_leaves())?;
        if let Some(document) = json_override()? {
            apply_all(&mut snapshot, leaves(document, "", PolicySource::Env))?;
        }
    }

    snapshot.validate()?;
    Ok(snapshot)
}

/// One dotted policy path with the value to store there
struct Leaf {
    path: String,
    value: Value,
    source: PolicySource,
}

fn apply_all(snapshot: &mut PolicySnapshot, leaves: Vec<Leaf>) -> Result<(), PolicyError> {
    leaves.into_iter().try_for_each(|leaf| {
        apply_override_to_snapshot(snapshot, &leaf.path, &leaf.value, leaf.source)
    })
}

fn read_yaml(path: &Path) -> Result<Value, PolicyError> {
    let content = fs::read_to_string(path).map_err(|err| PolicyError::Io(err.to_string()))?;
    let document: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|err| PolicyError::Invalid(err.to_string()))?;
    serde_json::to_value(document).map_err(|err| PolicyError::Invalid(err.to_string()))
}

/// `LOCUS_POLICY__EXECUTION__SETTLE_TIMEOUT_MS=750` → `execution.settle_timeout_ms`
fn env_leaves() -> Vec<Leaf> {
    env::vars()
        .filter_map(|(key, raw)| {
            let path = key
                .strip_prefix(ENV_PREFIX)?
                .split("__")
                .filter(|segment| !segment.is_empty())
                .map(str::to_ascii_lowercase)
                .collect::<Vec<_>>()
                .join(".");
            (!path.is_empty()).then(|| Leaf {
                path,
                value: parse_env_value(&raw),
                source: PolicySource::Env,
            })
        })
        .collect()
}

fn json_override() -> Result<Option<Value>, PolicyError> {
    match env::var(ENV_JSON) {
        Ok(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| PolicyError::Invalid(format!("{}: {}", ENV_JSON, err))),
        _ => Ok(None),
    }
}

fn parse_env_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Objects flatten into dotted paths; arrays and scalars are leaves.
fn leaves(value: Value, prefix: &str, source: PolicySource) -> Vec<Leaf> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .flat_map(|(key, value)| {
                let key = key.trim().to_ascii_lowercase();
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{}.{}", prefix, key)
                };
                leaves(value, &path, source)
            })
            .collect(),
        _ if prefix.is_empty() => Vec::new(),
        other => vec![Leaf {
            path: prefix.to_string(),
            value: other,
            source,
        }],
    }
}

fn record_builtin(snapshot: &mut PolicySnapshot) -> Result<(), PolicyError> {
    let sections = [
        ("execution", serde_json::to_value(&snapshot.execution)),
        ("retry", serde_json::to_value(&snapshot.retry)),
        ("locator", serde_json::to_value(&snapshot.locator)),
    ];
    let mut builtin = Vec::new();
    for (name, value) in sections {
        let value = value.map_err(|err| PolicyError::Invalid(err.to_string()))?;
        builtin.extend(leaves(value, name, PolicySource::Builtin));
    }
    for leaf in builtin {
        snapshot.set_provenance(&leaf.path, leaf.source);
    }
    Ok(())
}
