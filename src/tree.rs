//! Dot-path access into `serde_json::Value` trees.
//!
//! Paths are dot-separated object keys (`scheme.default`). A numeric segment
//! indexes into an array when reading; writes only ever create objects.

use crate::error::{ConfigError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Split a dot-path into its segments. The empty path has no segments.
pub fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('.').collect()
    }
}

/// Join a parent path and a child key.
pub fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn check_segments(path: &str) -> Result<Vec<&str>> {
    let segments = split_path(path);
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::InvalidPath {
            path: path.to_string(),
            reason: "empty path segment".to_string(),
        });
    }
    Ok(segments)
}

/// Look up the value at `path`.
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in split_path(path) {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Store `value` at `path`, creating missing intermediate objects.
///
/// Fails without touching the tree when the path is empty or an existing
/// intermediate node is not an object. The root is only ever replaced
/// wholesale by a provider's `set_all`.
pub fn set_path(root: &mut Value, path: &str, value: Value) -> Result<()> {
    let segments = check_segments(path)?;
    let Some((last, parents)) = segments.split_last() else {
        return Err(ConfigError::InvalidPath {
            path: String::new(),
            reason: "use set_all to replace the whole configuration".to_string(),
        });
    };

    // Walk the existing nodes first so a failure leaves the tree untouched.
    let not_object = |depth: usize| ConfigError::InvalidPath {
        path: path.to_string(),
        reason: format!("'{}' is not an object", segments[..depth].join(".")),
    };
    if !root.is_null() && !root.is_object() {
        return Err(ConfigError::InvalidPath {
            path: path.to_string(),
            reason: "root is not an object".to_string(),
        });
    }
    let mut probe = &*root;
    for (depth, segment) in parents.iter().enumerate() {
        match probe.get(*segment) {
            Some(next) if next.is_object() => probe = next,
            Some(_) => return Err(not_object(depth + 1)),
            None => break,
        }
    }

    if root.is_null() {
        *root = Value::Object(Map::new());
    }
    let mut current = root;
    for (depth, segment) in parents.iter().enumerate() {
        let map = current.as_object_mut().ok_or_else(|| not_object(depth))?;
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    let map = current
        .as_object_mut()
        .ok_or_else(|| not_object(parents.len()))?;
    map.insert(last.to_string(), value);
    Ok(())
}

/// Remove the value at `path`, returning it if present.
pub fn remove_path(root: &mut Value, path: &str) -> Option<Value> {
    let segments = split_path(path);
    let (last, parents) = segments.split_last()?;
    let mut current = root;
    for segment in parents {
        current = current.as_object_mut()?.get_mut(*segment)?;
    }
    current.as_object_mut()?.remove(*last)
}

/// Every dot-path present in `value`, including intermediate object keys.
pub fn collect_paths(value: &Value) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    collect_into(value, "", &mut paths);
    paths
}

fn collect_into(value: &Value, prefix: &str, out: &mut BTreeSet<String>) {
    if let Value::Object(map) = value {
        for (key, child) in map {
            let path = join_path(prefix, key);
            collect_into(child, &path, out);
            out.insert(path);
        }
    }
}

/// Flatten a tree into `dot.path -> leaf` pairs. Arrays and empty objects are
/// leaves.
pub fn flatten(value: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(value, "", &mut out);
    out
}

fn flatten_into(value: &Value, prefix: &str, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(child, &join_path(prefix, key), out);
            }
        }
        other if !prefix.is_empty() => {
            out.insert(prefix.to_string(), other.clone());
        }
        _ => {}
    }
}

/// Rebuild a nested tree from `dot.path -> value` pairs.
pub fn unflatten(flat: &Map<String, Value>) -> Result<Value> {
    let mut root = Value::Object(Map::new());
    for (path, value) in flat {
        set_path(&mut root, path, value.clone())?;
    }
    Ok(root)
}
