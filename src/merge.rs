//! Merge-patch engine
//!
//! Applies a partial representation onto a fetched full representation,
//! producing the representation to write back. Fields absent from the
//! patch are preserved; a field present with an explicit JSON `null` is
//! cleared, which is distinct from absence. This module never talks to the
//! client: the write path is fetch, merge here, write back, which keeps
//! the merge independently testable.

use crate::error::{OpenHabError, Result};
use crate::models::{Item, Rule, RuleAction, Thing};
use serde_json::{Map, Value};

/// Overlay `patch` onto `current`: present keys replace, `null` clears,
/// absent keys preserve.
pub fn merge_object(current: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        match value {
            Value::Null => {
                current.remove(key);
            }
            _ => {
                current.insert(key.clone(), value.clone());
            }
        }
    }
}

fn reject_identity_change(patch: &Map<String, Value>, key: &str, current: &str) -> Result<()> {
    if let Some(value) = patch.get(key) {
        if value.as_str() != Some(current) {
            return Err(OpenHabError::invalid_input(format!(
                "Field '{key}' is immutable and cannot be changed from '{current}'"
            )));
        }
    }
    Ok(())
}

fn overlay_into<T: serde::Serialize + serde::de::DeserializeOwned>(
    current: &T,
    patch: &Map<String, Value>,
) -> Result<T> {
    let mut repr = match serde_json::to_value(current)? {
        Value::Object(map) => map,
        _ => return Err(OpenHabError::invalid_input("Expected an object representation")),
    };
    merge_object(&mut repr, patch);
    serde_json::from_value(Value::Object(repr))
        .map_err(|e| OpenHabError::invalid_input(format!("Patch produced an invalid entity: {e}")))
}

/// Merge a partial item payload onto the current item. The item name is
/// the immutable identity and may not be changed through a patch.
pub fn merge_item_patch(current: &Item, patch: &Map<String, Value>) -> Result<Item> {
    reject_identity_change(patch, "name", &current.name)?;
    overlay_into(current, patch)
}

/// Merge a partial thing payload onto the current thing. The UID is
/// immutable.
pub fn merge_thing_patch(current: &Thing, patch: &Map<String, Value>) -> Result<Thing> {
    reject_identity_change(patch, "UID", &current.uid)?;
    overlay_into(current, patch)
}

/// Merge a partial configuration onto a thing's configuration map
pub fn merge_thing_config(
    current: &Map<String, Value>,
    patch: &Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = current.clone();
    merge_object(&mut merged, patch);
    merged
}

/// Merge a partial rule payload onto the current rule.
///
/// The `actions` key gets element-wise treatment: each entry must carry an
/// `id`; an entry whose id matches an existing action overlays that
/// action's fields, an unmatched id appends a new action. Every other key
/// follows the plain overlay rule. The UID is immutable.
pub fn merge_rule_patch(current: &Rule, patch: &Map<String, Value>) -> Result<Rule> {
    reject_identity_change(patch, "uid", &current.uid)?;

    let mut rule = current.clone();
    let mut flat_patch = patch.clone();

    if let Some(actions_value) = flat_patch.remove("actions") {
        let entries = actions_value.as_array().ok_or_else(|| {
            OpenHabError::invalid_input("'actions' patch must be an array of action objects")
        })?;
        for entry in entries {
            let entry = entry.as_object().ok_or_else(|| {
                OpenHabError::invalid_input("Each 'actions' patch entry must be an object")
            })?;
            apply_action_patch(&mut rule.actions, entry)?;
        }
    }

    overlay_into(&rule, &flat_patch)
}

fn apply_action_patch(actions: &mut Vec<RuleAction>, entry: &Map<String, Value>) -> Result<()> {
    let id = entry
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| OpenHabError::invalid_input("Action patch entry requires a string 'id'"))?;

    if let Some(action) = actions.iter_mut().find(|a| a.id == id) {
        *action = overlay_into(action, entry)?;
    } else {
        let appended: RuleAction = serde_json::from_value(Value::Object(entry.clone()))
            .map_err(|e| OpenHabError::invalid_input(format!("Invalid appended action: {e}")))?;
        actions.push(appended);
    }
    Ok(())
}

/// Overlay a configuration patch onto the single action identified by
/// `action_id`, leaving every other action and all non-action rule fields
/// untouched. Unknown action ids are `NotFound`.
pub fn patch_script_action(
    rule: &mut Rule,
    action_id: &str,
    config_patch: &Map<String, Value>,
) -> Result<()> {
    let action = rule
        .actions
        .iter_mut()
        .find(|a| a.id == action_id)
        .ok_or_else(|| {
            OpenHabError::not_found(format!(
                "Rule '{}' has no action with id '{action_id}'",
                rule.uid
            ))
        })?;

    merge_object(&mut action.configuration, config_patch);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_item() -> Item {
        serde_json::from_value(json!({
            "type": "Switch",
            "name": "Kitchen_Light",
            "state": "OFF",
            "label": "Kitchen light",
            "tags": ["Lighting"],
            "groupNames": ["gKitchen"]
        }))
        .unwrap()
    }

    fn sample_rule() -> Rule {
        serde_json::from_value(json!({
            "uid": "rule-1",
            "name": "Evening lights",
            "tags": ["Lighting"],
            "triggers": [{"id": "t1", "type": "timer.GenericCronTrigger", "configuration": {}}],
            "actions": [
                {"id": "A1", "type": "script.ScriptAction",
                 "configuration": {"type": "application/javascript", "script": "one();"}},
                {"id": "A2", "type": "script.ScriptAction",
                 "configuration": {"type": "application/javascript", "script": "two();"}},
                {"id": "A3", "type": "core.ItemCommandAction",
                 "configuration": {"itemName": "Porch", "command": "ON"}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let item = sample_item();
        let merged = merge_item_patch(&item, &Map::new()).unwrap();
        assert_eq!(merged, item);
    }

    #[test]
    fn test_named_field_replaced_others_preserved() {
        let item = sample_item();
        let patch = json!({"label": "Main kitchen light"});
        let merged = merge_item_patch(&item, patch.as_object().unwrap()).unwrap();

        assert_eq!(merged.label.as_deref(), Some("Main kitchen light"));
        assert_eq!(merged.state, item.state);
        assert_eq!(merged.tags, item.tags);
        assert_eq!(merged.group_names, item.group_names);
    }

    #[test]
    fn test_explicit_null_clears_a_field() {
        let item = sample_item();
        let patch = json!({"label": null});
        let merged = merge_item_patch(&item, patch.as_object().unwrap()).unwrap();
        assert_eq!(merged.label, None);
    }

    #[test]
    fn test_identity_fields_are_immutable() {
        let item = sample_item();
        let patch = json!({"name": "Renamed"});
        assert!(merge_item_patch(&item, patch.as_object().unwrap()).is_err());

        let rule = sample_rule();
        let patch = json!({"uid": "other"});
        assert!(merge_rule_patch(&rule, patch.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_thing_config_overlay() {
        let current = json!({"host": "10.0.0.2", "port": 8080, "token": "abc"});
        let patch = json!({"port": 9090, "token": null});
        let merged = merge_thing_config(
            current.as_object().unwrap(),
            patch.as_object().unwrap(),
        );
        assert_eq!(merged.get("host"), Some(&json!("10.0.0.2")));
        assert_eq!(merged.get("port"), Some(&json!(9090)));
        assert!(merged.get("token").is_none());
    }

    #[test]
    fn test_rule_actions_patch_by_id() {
        let rule = sample_rule();
        let patch = json!({
            "actions": [{"id": "A2", "configuration": {
                "type": "application/javascript", "script": "two_v2();"
            }}]
        });
        let merged = merge_rule_patch(&rule, patch.as_object().unwrap()).unwrap();

        assert_eq!(merged.actions.len(), 3);
        assert_eq!(merged.actions[0], rule.actions[0]);
        assert_eq!(merged.actions[2], rule.actions[2]);
        assert_eq!(
            merged.actions[1].configuration.get("script"),
            Some(&json!("two_v2();"))
        );
        assert_eq!(merged.triggers, rule.triggers);
        assert_eq!(merged.name, rule.name);
    }

    #[test]
    fn test_rule_actions_patch_appends_unmatched_id() {
        let rule = sample_rule();
        let patch = json!({
            "actions": [{"id": "A4", "type": "script.ScriptAction",
                         "configuration": {"script": "four();"}}]
        });
        let merged = merge_rule_patch(&rule, patch.as_object().unwrap()).unwrap();
        assert_eq!(merged.actions.len(), 4);
        assert_eq!(merged.actions[3].id, "A4");
    }

    #[test]
    fn test_scoped_action_update_touches_only_its_target() {
        let mut rule = sample_rule();
        let original = rule.clone();
        let patch = json!({"script": "updated();"});
        patch_script_action(&mut rule, "A2", patch.as_object().unwrap()).unwrap();

        assert_eq!(rule.actions[0], original.actions[0]);
        assert_eq!(rule.actions[2], original.actions[2]);
        assert_eq!(
            rule.actions[1].configuration.get("script"),
            Some(&json!("updated();"))
        );
        // configuration keys not named in the patch survive
        assert_eq!(
            rule.actions[1].configuration.get("type"),
            Some(&json!("application/javascript"))
        );
        assert_eq!(rule.uid, original.uid);
        assert_eq!(rule.triggers, original.triggers);
    }

    #[test]
    fn test_unknown_action_id_is_not_found() {
        let mut rule = sample_rule();
        let patch = json!({"script": "x();"});
        let err = patch_script_action(&mut rule, "A9", patch.as_object().unwrap()).unwrap_err();
        assert!(err.is_not_found());
    }
}
