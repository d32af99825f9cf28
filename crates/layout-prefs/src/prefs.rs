use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The user's desired layout, keyed by normalized section title.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Desired display order. Titles not currently present are ignored on read.
    #[serde(default)]
    pub order: Vec<String>,
    /// Titles mapped to `true` are hidden; absence means visible.
    #[serde(default)]
    pub hidden: BTreeMap<String, bool>,
    /// Explicit open/closed wishes; absence leaves the observed state alone.
    #[serde(default, rename = "openByTitle")]
    pub open_by_title: BTreeMap<String, bool>,
}

impl Preferences {
    /// True if `title` is marked hidden.
    pub fn is_hidden(&self, title: &str) -> bool {
        self.hidden.get(title).copied().unwrap_or(false)
    }

    /// Desired open state for `title`, if one was recorded.
    pub fn desired_open(&self, title: &str) -> Option<bool> {
        self.open_by_title.get(title).copied()
    }

    /// Lenient structural validation of an arbitrary JSON value.
    ///
    /// Each field is checked independently; a mistyped field falls back to its
    /// default without discarding the others. Order entries are normalized and
    /// deduplicated (first occurrence wins); map values must be booleans.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let mut seen = HashSet::new();
        let order = obj
            .get("order")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(normalize_title)
                    .filter(|t| !t.is_empty() && seen.insert(t.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            order,
            hidden: bool_map(obj.get("hidden")),
            open_by_title: bool_map(obj.get("openByTitle")),
        }
    }
}

/// Keep only boolean entries of a JSON object.
fn bool_map(value: Option<&Value>) -> BTreeMap<String, bool> {
    value
        .and_then(Value::as_object)
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_bool().map(|b| (k.clone(), b)))
                .collect()
        })
        .unwrap_or_default()
}

/// Collapse whitespace runs and trim.
fn normalize_title(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn mistyped_fields_fall_back_independently() {
        let p = Preferences::from_value(&json!({
            "order": "not-a-list",
            "hidden": {"A": true, "B": "yes"},
            "openByTitle": [1, 2],
        }));
        assert!(p.order.is_empty());
        assert_eq!(p.hidden.len(), 1);
        assert!(p.is_hidden("A"));
        assert!(!p.is_hidden("B"));
        assert!(p.open_by_title.is_empty());
    }

    #[test]
    fn order_is_normalized_and_deduplicated() {
        let p = Preferences::from_value(&json!({
            "order": ["  Notes ", 4, "Job\n Items", "Notes", ""],
        }));
        assert_eq!(p.order, vec!["Notes", "Job Items"]);
    }

    #[test]
    fn non_object_is_default() {
        assert_eq!(Preferences::from_value(&json!(null)), Preferences::default());
        assert_eq!(Preferences::from_value(&json!([1])), Preferences::default());
    }

    #[test]
    fn wire_format_uses_camel_case_open_map() {
        let mut p = Preferences::default();
        p.open_by_title.insert("A".into(), true);
        let text = serde_json::to_string(&p).unwrap();
        assert_eq!(text, r#"{"order":[],"hidden":{},"openByTitle":{"A":true}}"#);
    }
}
