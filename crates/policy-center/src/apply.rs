use serde_json::Value;

use crate::errors::PolicyError;
use crate::model::{PolicySnapshot, PolicySource};

/// Apply a single dotted-path overlay to the snapshot, recording provenance
/// when the value actually changed.
pub(crate) fn apply_override_to_snapshot(
    snapshot: &mut PolicySnapshot,
    path: &str,
    value: &Value,
    source: PolicySource,
) -> Result<(), PolicyError> {
    let changed = match path {
        "execution.command_budget_ms" => {
            merge(&mut snapshot.execution.command_budget_ms, to_u64(value)?)
        }
        "execution.settle_timeout_ms" => {
            merge(&mut snapshot.execution.settle_timeout_ms, to_u64(value)?)
        }
        "execution.verify_fill" => merge(&mut snapshot.execution.verify_fill, to_bool(value)?),
        "retry.backoff_ms" => merge(&mut snapshot.retry.backoff_ms, to_u64_list(value)?),
        "locator.identity_attributes" => merge(
            &mut snapshot.locator.identity_attributes,
            to_string_list(value)?,
        ),
        "locator.test_id_attributes" => merge(
            &mut snapshot.locator.test_id_attributes,
            to_string_list(value)?,
        ),
        path => return Err(PolicyError::UnsupportedPath(path.to_string())),
    };
    if changed {
        snapshot.set_provenance(path, source);
        snapshot.rev += 1;
    }
    Ok(())
}

fn merge<T: PartialEq>(target: &mut T, candidate: T) -> bool {
    if *target == candidate {
        return false;
    }
    *target = candidate;
    true
}

fn to_u64(value: &Value) -> Result<u64, PolicyError> {
    value
        .as_u64()
        .ok_or_else(|| PolicyError::InvalidValue(format!("expected integer, got {value}")))
}

fn to_bool(value: &Value) -> Result<bool, PolicyError> {
    value
        .as_bool()
        .ok_or_else(|| PolicyError::InvalidValue(format!("expected bool, got {value}")))
}

fn to_u64_list(value: &Value) -> Result<Vec<u64>, PolicyError> {
    match value {
        Value::Array(items) => items.iter().map(to_u64).collect(),
        // a bare number is accepted as a single-step backoff
        Value::Number(_) => Ok(vec![to_u64(value)?]),
        other => Err(PolicyError::InvalidValue(format!(
            "expected list of integers, got {other}"
        ))),
    }
}

fn to_string_list(value: &Value) -> Result<Vec<String>, PolicyError> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    PolicyError::InvalidValue(format!("expected string, got {item}"))
                })
            })
            .collect(),
        Value::String(raw) => Ok(raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()),
        other => Err(PolicyError::InvalidValue(format!(
            "expected list of strings, got {other}"
        ))),
    }
}
