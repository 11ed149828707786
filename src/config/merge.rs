//! Deep merge of user overrides onto defaults.
//!
//! Objects merge key by key; arrays and scalars are replaced whole.

use serde_json::Value;

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers, booleans are replaced entirely
/// - If overlay is null, the base value is preserved (null means "not specified")
///
/// # Example
/// ```
/// use serde_json::json;
/// use deskcfg::config::deep_merge;
///
/// let defaults = json!({
///     "scheme": { "default": "catppuccin-mocha", "mode": "dark" },
///     "wallpaper": { "extensions": ["png", "jpg"] }
/// });
/// let user = json!({
///     "scheme": { "default": "nord" },
///     "wallpaper": { "extensions": ["webp"] }
/// });
/// let merged = deep_merge(defaults, user);
/// assert_eq!(merged["scheme"]["mode"], "dark");
/// assert_eq!(merged["wallpaper"]["extensions"], json!(["webp"]));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_nested_sections() {
        let defaults = json!({
            "scheme": {"default": "catppuccin-mocha", "mode": "dark"},
            "version": "1.0"
        });
        let user = json!({"scheme": {"default": "gruvbox-dark"}});
        assert_eq!(
            deep_merge(defaults, user),
            json!({
                "scheme": {"default": "gruvbox-dark", "mode": "dark"},
                "version": "1.0"
            })
        );
    }

    #[test]
    fn test_arrays_replaced_not_merged() {
        let base = json!({"items": [1, 2, 3]});
        let overlay = json!({"items": [4, 5]});
        assert_eq!(deep_merge(base, overlay), json!({"items": [4, 5]}));
    }

    #[test]
    fn test_null_preserves_base() {
        let base = json!({"a": 1, "b": {"c": 2}});
        let overlay = json!({"a": null, "b": {"c": null}});
        assert_eq!(deep_merge(base, overlay), json!({"a": 1, "b": {"c": 2}}));
    }

    #[test]
    fn test_unknown_user_keys_kept() {
        let base = json!({"scheme": {"mode": "dark"}});
        let overlay = json!({"scheme": {"legacy": true}, "plugins": {"x": 1}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({"scheme": {"mode": "dark", "legacy": true}, "plugins": {"x": 1}})
        );
    }

    #[test]
    fn test_overlay_replaces_object_with_primitive() {
        let base = json!({"value": {"nested": true}});
        let overlay = json!({"value": 42});
        assert_eq!(deep_merge(base, overlay), json!({"value": 42}));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let defaults = json!({"a": {"b": 1, "c": [1]}});
        let user = json!({"a": {"b": 2}});
        let once = deep_merge(defaults.clone(), user.clone());
        let twice = deep_merge(defaults, user);
        assert_eq!(once, twice);
    }
}
