//! Rule and script tools
//!
//! Scripts are not a distinct entity type: a script is a Rule tagged
//! "Script" with no triggers, so the script tools are thin classification
//! wrappers over the rule operations.

use super::{opt_str, require_entity, require_object, require_str, ToolContext, ToolResponse};
use crate::error::{OpenHabError, Result};
use crate::merge::{merge_rule_patch, patch_script_action};
use crate::models::Rule;
use serde_json::{json, Map, Value};

/// List rules, optionally filtered by tag
pub async fn list_rules(
    context: &ToolContext,
    args: &Map<String, Value>,
) -> Result<ToolResponse> {
    let filter_tag = opt_str(args, "filter_tag")?;
    let rules = context.client.list_rules(filter_tag.as_deref()).await?;
    Ok(ToolResponse::success(serde_json::to_value(rules)?))
}

/// Get a specific rule by UID
pub async fn get_rule(context: &ToolContext, args: &Map<String, Value>) -> Result<ToolResponse> {
    let uid = require_str(args, "rule_uid")?;
    let rule = context.client.get_rule(&uid).await?;
    Ok(ToolResponse::success(serde_json::to_value(rule)?))
}

/// Create a new rule
pub async fn create_rule(context: &ToolContext, args: &Map<String, Value>) -> Result<ToolResponse> {
    let rule: Rule = require_entity(args, "rule")?;
    let created = context.client.create_rule(&rule).await?;
    Ok(ToolResponse::success(serde_json::to_value(created)?))
}

/// Merge-patch an existing rule: only named fields change; action patches
/// address actions by id
pub async fn update_rule(context: &ToolContext, args: &Map<String, Value>) -> Result<ToolResponse> {
    let uid = require_str(args, "rule_uid")?;
    let patch = require_object(args, "rule_updates")?;

    let current = context.client.get_rule(&uid).await?;
    let merged = merge_rule_patch(&current, &patch)?;
    let updated = context.client.update_rule(&uid, &merged).await?;
    Ok(ToolResponse::success(serde_json::to_value(updated)?))
}

/// Delete a rule
pub async fn delete_rule(context: &ToolContext, args: &Map<String, Value>) -> Result<ToolResponse> {
    let uid = require_str(args, "rule_uid")?;
    context.client.delete_rule(&uid).await?;
    Ok(ToolResponse::success_with_message(
        json!({ "deleted": uid }),
        format!("Rule '{uid}' deleted"),
    ))
}

/// Run a rule immediately
pub async fn run_rule_now(
    context: &ToolContext,
    args: &Map<String, Value>,
) -> Result<ToolResponse> {
    let uid = require_str(args, "rule_uid")?;
    context.client.run_rule_now(&uid).await?;
    Ok(ToolResponse::success_with_message(
        json!({ "triggered": uid }),
        format!("Rule '{uid}' triggered"),
    ))
}

/// Update a single script action inside a rule, leaving every other
/// action and all non-action fields untouched
pub async fn update_rule_script_action(
    context: &ToolContext,
    args: &Map<String, Value>,
) -> Result<ToolResponse> {
    let uid = require_str(args, "rule_uid")?;
    let action_id = require_str(args, "action_id")?;
    let script_type = require_str(args, "script_type")?;
    let script_content = require_str(args, "script_content")?;

    let mut rule = context.client.get_rule(&uid).await?;
    let mut config_patch = Map::new();
    config_patch.insert("type".to_string(), Value::String(script_type));
    config_patch.insert("script".to_string(), Value::String(script_content));
    patch_script_action(&mut rule, &action_id, &config_patch)?;

    let updated = context.client.update_rule(&uid, &rule).await?;
    Ok(ToolResponse::success(serde_json::to_value(updated)?))
}

/// List all scripts
pub async fn list_scripts(
    context: &ToolContext,
    _args: &Map<String, Value>,
) -> Result<ToolResponse> {
    let rules = context.client.list_rules(Some("Script")).await?;
    let scripts: Vec<Rule> = rules.into_iter().filter(Rule::is_script).collect();
    Ok(ToolResponse::success(serde_json::to_value(scripts)?))
}

/// Get a specific script by id
pub async fn get_script(context: &ToolContext, args: &Map<String, Value>) -> Result<ToolResponse> {
    let script_id = require_str(args, "script_id")?;
    let rule = context.client.get_rule(&script_id).await?;
    Ok(ToolResponse::success(serde_json::to_value(rule)?))
}

/// Create a new script
pub async fn create_script(
    context: &ToolContext,
    args: &Map<String, Value>,
) -> Result<ToolResponse> {
    let script_id = require_str(args, "script_id")?;
    let script_type = require_str(args, "script_type")?;
    let content = require_str(args, "content")?;

    let rule = Rule::new_script(&script_id, &script_type, &content);
    let created = context.client.create_rule(&rule).await?;
    Ok(ToolResponse::success(serde_json::to_value(created)?))
}

/// Update an existing script's body, targeting its first action
pub async fn update_script(
    context: &ToolContext,
    args: &Map<String, Value>,
) -> Result<ToolResponse> {
    let script_id = require_str(args, "script_id")?;
    let script_type = require_str(args, "script_type")?;
    let content = require_str(args, "content")?;

    let mut rule = context.client.get_rule(&script_id).await?;
    let action_id = rule
        .actions
        .first()
        .map(|a| a.id.clone())
        .ok_or_else(|| {
            OpenHabError::invalid_input(format!("Script '{script_id}' has no actions"))
        })?;

    let mut config_patch = Map::new();
    config_patch.insert("type".to_string(), Value::String(script_type));
    config_patch.insert("script".to_string(), Value::String(content));
    patch_script_action(&mut rule, &action_id, &config_patch)?;

    let updated = context.client.update_rule(&script_id, &rule).await?;
    Ok(ToolResponse::success(serde_json::to_value(updated)?))
}

/// Delete a script
pub async fn delete_script(
    context: &ToolContext,
    args: &Map<String, Value>,
) -> Result<ToolResponse> {
    let script_id = require_str(args, "script_id")?;
    context.client.delete_rule(&script_id).await?;
    Ok(ToolResponse::success_with_message(
        json!({ "deleted": script_id }),
        format!("Script '{script_id}' deleted"),
    ))
}
