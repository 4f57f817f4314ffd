//! Filter predicate engine for listing operations
//!
//! Each filter is a set of optional, independent predicates combined with
//! logical AND. An unsupplied parameter imposes no constraint, so the empty
//! filter accepts every entity. Filters constructed from a tool-argument
//! map reject unknown keys instead of silently ignoring them.

use crate::error::{OpenHabError, Result};
use crate::models::{Item, Thing};
use serde_json::{Map, Value};

fn string_arg(args: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(OpenHabError::invalid_input(format!(
            "Filter parameter '{key}' must be a string, got {other}"
        ))),
    }
}

fn reject_unknown_keys(args: &Map<String, Value>, known: &[&str]) -> Result<()> {
    for key in args.keys() {
        if !known.contains(&key.as_str()) {
            return Err(OpenHabError::invalid_input(format!(
                "Unknown filter parameter '{key}'"
            )));
        }
    }
    Ok(())
}

/// Predicates over Items
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    /// Tag membership
    pub tag: Option<String>,
    /// Exact item type match
    pub item_type: Option<String>,
    /// Case-sensitive name substring
    pub name: Option<String>,
    /// Case-insensitive label substring
    pub label: Option<String>,
}

impl ItemFilter {
    /// Argument keys this filter understands
    pub const KEYS: &'static [&'static str] =
        &["filter_tag", "filter_type", "filter_name", "filter_label"];

    /// Build from a tool-argument map; unknown keys are `InvalidInput`
    pub fn from_args(args: &Map<String, Value>) -> Result<Self> {
        reject_unknown_keys(args, Self::KEYS)?;
        Ok(Self {
            tag: string_arg(args, "filter_tag")?,
            item_type: string_arg(args, "filter_type")?,
            name: string_arg(args, "filter_name")?,
            label: string_arg(args, "filter_label")?,
        })
    }

    /// Acceptance test; all supplied predicates must hold
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(tag) = &self.tag {
            if !item.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(item_type) = &self.item_type {
            if &item.item_type != item_type {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if !item.name.contains(name.as_str()) {
                return false;
            }
        }
        if let Some(label) = &self.label {
            let needle = label.to_lowercase();
            let hay = item.label.as_deref().unwrap_or("").to_lowercase();
            if !hay.contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// Predicates over Things
#[derive(Debug, Clone, Default)]
pub struct ThingFilter {
    /// UID substring
    pub uid: Option<String>,
    /// Case-insensitive label substring
    pub label: Option<String>,
}

impl ThingFilter {
    pub const KEYS: &'static [&'static str] = &["filter_uid", "filter_label"];

    /// Build from a tool-argument map; unknown keys are `InvalidInput`
    pub fn from_args(args: &Map<String, Value>) -> Result<Self> {
        reject_unknown_keys(args, Self::KEYS)?;
        Ok(Self {
            uid: string_arg(args, "filter_uid")?,
            label: string_arg(args, "filter_label")?,
        })
    }

    /// Acceptance test; all supplied predicates must hold
    pub fn matches(&self, thing: &Thing) -> bool {
        if let Some(uid) = &self.uid {
            if !thing.uid.contains(uid.as_str()) {
                return false;
            }
        }
        if let Some(label) = &self.label {
            let needle = label.to_lowercase();
            let hay = thing.label.as_deref().unwrap_or("").to_lowercase();
            if !hay.contains(&needle) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(name: &str, item_type: &str, label: Option<&str>, tags: &[&str]) -> Item {
        Item {
            item_type: item_type.into(),
            name: name.into(),
            state: None,
            label: label.map(Into::into),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            group_names: vec![],
        }
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        let filter = ItemFilter::default();
        assert!(filter.matches(&item("Any", "Switch", None, &[])));
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let filter = ItemFilter {
            tag: Some("Lighting".into()),
            item_type: Some("Switch".into()),
            ..Default::default()
        };
        assert!(filter.matches(&item("Lamp", "Switch", None, &["Lighting"])));
        assert!(!filter.matches(&item("Lamp", "Dimmer", None, &["Lighting"])));
        assert!(!filter.matches(&item("Lamp", "Switch", None, &["Climate"])));
    }

    #[test]
    fn test_adding_a_predicate_never_grows_the_matched_set() {
        let items = vec![
            item("Kitchen_Lamp", "Switch", Some("Kitchen lamp"), &["Lighting"]),
            item("Hall_Lamp", "Dimmer", Some("Hall lamp"), &["Lighting"]),
            item("Door_Contact", "Contact", Some("Front door"), &[]),
        ];

        let base = ItemFilter {
            tag: Some("Lighting".into()),
            ..Default::default()
        };
        let narrowed = ItemFilter {
            tag: Some("Lighting".into()),
            item_type: Some("Switch".into()),
            ..Default::default()
        };

        let base_matched: Vec<_> = items.iter().filter(|i| base.matches(i)).collect();
        let narrowed_matched: Vec<_> = items.iter().filter(|i| narrowed.matches(i)).collect();

        assert!(narrowed_matched.len() <= base_matched.len());
        for m in &narrowed_matched {
            assert!(base_matched.contains(m));
        }
    }

    #[test]
    fn test_name_is_case_sensitive_label_is_not() {
        let filter = ItemFilter {
            name: Some("Kitchen".into()),
            ..Default::default()
        };
        assert!(filter.matches(&item("Kitchen_Lamp", "Switch", None, &[])));
        assert!(!filter.matches(&item("kitchen_lamp", "Switch", None, &[])));

        let filter = ItemFilter {
            label: Some("KITCHEN".into()),
            ..Default::default()
        };
        assert!(filter.matches(&item("X", "Switch", Some("Kitchen lamp"), &[])));
    }

    #[test]
    fn test_unknown_filter_key_is_rejected() {
        let args = json!({"filter_tag": "Lighting", "filter_room": "kitchen"});
        let err = ItemFilter::from_args(args.as_object().unwrap()).unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }

    #[test]
    fn test_non_string_filter_value_is_rejected() {
        let args = json!({"filter_tag": 7});
        assert!(ItemFilter::from_args(args.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_thing_filter_uid_substring() {
        let thing: Thing = serde_json::from_value(json!({
            "thingTypeUID": "hue:bulb",
            "UID": "hue:bulb:living",
            "label": "Living room bulb"
        }))
        .unwrap();

        let filter = ThingFilter {
            uid: Some("bulb".into()),
            label: Some("living".into()),
        };
        assert!(filter.matches(&thing));

        let filter = ThingFilter {
            uid: Some("zwave".into()),
            label: None,
        };
        assert!(!filter.matches(&thing));
    }
}
