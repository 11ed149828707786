//! Semantic checks over the effective `cli` tree.
//!
//! These run on top of schema validation. Errors block; warnings are
//! advisories about combinations that are legal but probably unintended.

use super::types::{ImageFormat, SchemeMode, Urgency};
use crate::tree::get_path;
use serde_json::Value;

/// Outcome of the semantic checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Clipboard history size above which the picker gets sluggish.
const LARGE_CLIPBOARD: u64 = 1_000;

/// Run every check against `tree`. `is_user_set` tells whether a path came
/// from the user rather than the defaults.
pub fn run_checks(tree: &Value, is_user_set: impl Fn(&str) -> bool) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_ratio(tree, "theme.opacity", &mut report);
    check_ratio(tree, "wallpaper.blur_ratio", &mut report);

    check_choice(tree, "scheme.mode", SchemeMode::VARIANTS, &mut report);
    check_choice(tree, "screenshot.format", ImageFormat::VARIANTS, &mut report);
    check_choice(tree, "notification.urgency", Urgency::VARIANTS, &mut report);

    check_range(tree, "screenshot.quality", 1, 100, &mut report);
    check_range(tree, "clipboard.max_items", 1, u64::MAX, &mut report);

    match get_path(tree, "version") {
        Some(Value::String(v)) if !v.is_empty() => {}
        _ => report
            .errors
            .push("version must be a non-empty string".to_string()),
    }

    // Advisories.
    if str_at(tree, "screenshot.format") == Some("png") && is_user_set("screenshot.quality") {
        report
            .warnings
            .push("screenshot.quality is ignored when screenshot.format is png".to_string());
    }
    if let Some(n) = get_path(tree, "clipboard.max_items").and_then(Value::as_u64)
        && n > LARGE_CLIPBOARD
    {
        report.warnings.push(format!(
            "clipboard.max_items is {}; histories above {} slow down the picker",
            n, LARGE_CLIPBOARD
        ));
    }
    if get_path(tree, "notification.enabled") == Some(&Value::Bool(false))
        && str_at(tree, "notification.urgency") == Some("critical")
    {
        report.warnings.push(
            "notification.urgency has no effect while notifications are disabled".to_string(),
        );
    }
    if get_path(tree, "scheme.auto") == Some(&Value::Bool(true)) && is_user_set("scheme.default")
    {
        report
            .warnings
            .push("scheme.default is overridden while scheme.auto is enabled".to_string());
    }
    if let Some(Value::Array(exts)) = get_path(tree, "wallpaper.extensions")
        && exts.is_empty()
    {
        report
            .warnings
            .push("wallpaper.extensions is empty; no wallpapers will be found".to_string());
    }

    report
}

fn str_at<'a>(tree: &'a Value, path: &str) -> Option<&'a str> {
    get_path(tree, path).and_then(Value::as_str)
}

fn check_ratio(tree: &Value, path: &str, report: &mut ValidationReport) {
    match get_path(tree, path) {
        None | Some(Value::Null) => {}
        Some(Value::Number(n)) => {
            let v = n.as_f64().unwrap_or(f64::NAN);
            if !(0.0..=1.0).contains(&v) {
                report
                    .errors
                    .push(format!("{} must be between 0 and 1, got {}", path, v));
            }
        }
        Some(other) => report
            .errors
            .push(format!("{} must be a number, got {}", path, other)),
    }
}

fn check_choice(tree: &Value, path: &str, allowed: &[&str], report: &mut ValidationReport) {
    match get_path(tree, path) {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) if allowed.contains(&s.as_str()) => {}
        Some(other) => report.errors.push(format!(
            "{} must be one of [{}], got {}",
            path,
            allowed.join(", "),
            other
        )),
    }
}

fn check_range(tree: &Value, path: &str, min: u64, max: u64, report: &mut ValidationReport) {
    match get_path(tree, path) {
        None | Some(Value::Null) => {}
        Some(value) => match value.as_u64() {
            Some(n) if (min..=max).contains(&n) => {}
            _ if max == u64::MAX => report
                .errors
                .push(format!("{} must be an integer >= {}, got {}", path, min, value)),
            _ => report.errors.push(format!(
                "{} must be an integer between {} and {}, got {}",
                path, min, max, value
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::CliConfig;
    use crate::tree::set_path;
    use serde_json::json;

    fn defaults() -> Value {
        CliConfig::default_tree()
    }

    #[test]
    fn test_defaults_pass_cleanly() {
        let report = run_checks(&defaults(), |_| false);
        assert_eq!(report, ValidationReport::default());
    }

    #[test]
    fn test_ratio_out_of_range() {
        let mut tree = defaults();
        set_path(&mut tree, "theme.opacity", json!(1.5)).unwrap();
        set_path(&mut tree, "wallpaper.blur_ratio", json!("heavy")).unwrap();
        let report = run_checks(&tree, |_| false);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("theme.opacity must be between 0 and 1"));
        assert!(report.errors[1].contains("wallpaper.blur_ratio must be a number"));
    }

    #[test]
    fn test_closed_enums() {
        let mut tree = defaults();
        set_path(&mut tree, "scheme.mode", json!("dim")).unwrap();
        set_path(&mut tree, "screenshot.format", json!("bmp")).unwrap();
        let report = run_checks(&tree, |_| false);
        assert!(!report.is_ok());
        assert!(report.errors.iter().any(|e| e.contains("scheme.mode must be one of [dark, light]")));
        assert!(report.errors.iter().any(|e| e.contains("screenshot.format")));
    }

    #[test]
    fn test_integer_ranges() {
        let mut tree = defaults();
        set_path(&mut tree, "screenshot.quality", json!(0)).unwrap();
        set_path(&mut tree, "clipboard.max_items", json!(-3)).unwrap();
        let report = run_checks(&tree, |_| false);
        assert!(report.errors.iter().any(|e| e.contains("between 1 and 100")));
        assert!(report.errors.iter().any(|e| e.contains("clipboard.max_items must be an integer >= 1")));
    }

    #[test]
    fn test_warnings_are_not_errors() {
        let mut tree = defaults();
        set_path(&mut tree, "screenshot.quality", json!(70)).unwrap();
        set_path(&mut tree, "clipboard.max_items", json!(5000)).unwrap();
        let report = run_checks(&tree, |path| path == "screenshot.quality");
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_quality_warning_needs_user_value() {
        let report = run_checks(&defaults(), |_| false);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_auto_scheme_advisory() {
        let mut tree = defaults();
        set_path(&mut tree, "scheme.auto", json!(true)).unwrap();
        let report = run_checks(&tree, |path| path == "scheme.default");
        assert_eq!(
            report.warnings,
            vec!["scheme.default is overridden while scheme.auto is enabled".to_string()]
        );
    }
}
