//! Thing tools: filtered listing, CRUD, configuration and status

use super::{filter_args, opt_bool, opt_usize, require_entity, require_object, require_str, ToolContext, ToolResponse};
use crate::error::Result;
use crate::filters::ThingFilter;
use crate::merge::{merge_thing_config, merge_thing_patch};
use crate::models::Thing;
use crate::pagination::paginate;

/// Default page size for thing listings
const DEFAULT_LIMIT: usize = 50;

/// List things with pagination and optional filtering.
///
/// Channel sets are stripped from listing pages to keep payloads light;
/// `get_thing` returns them.
pub async fn list_things(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let offset = opt_usize(args, "offset", 0)?;
    let limit = opt_usize(args, "limit", DEFAULT_LIMIT)?;
    let filter = ThingFilter::from_args(&filter_args(args))?;

    let things = context.client.list_things().await?;
    let filtered: Vec<Thing> = things
        .into_iter()
        .filter(|t| filter.matches(t))
        .map(|mut t| {
            t.channels.clear();
            t
        })
        .collect();
    let page = paginate(filtered, offset, limit, context.max_page_size())?;

    Ok(ToolResponse::success(serde_json::to_value(page)?))
}

/// Get a specific thing by UID, including its channels
pub async fn get_thing(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let uid = require_str(args, "thing_uid")?;
    let thing = context.client.get_thing(&uid).await?;
    Ok(ToolResponse::success(serde_json::to_value(thing)?))
}

/// Create a new thing
pub async fn create_thing(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let thing: Thing = require_entity(args, "thing")?;
    let created = context.client.create_thing(&thing).await?;
    Ok(ToolResponse::success(serde_json::to_value(created)?))
}

/// Merge-patch an existing thing
pub async fn update_thing(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let uid = require_str(args, "thing_uid")?;
    let patch = require_object(args, "thing")?;

    let current = context.client.get_thing(&uid).await?;
    let merged = merge_thing_patch(&current, &patch)?;
    let updated = context.client.update_thing(&uid, &merged).await?;
    Ok(ToolResponse::success(serde_json::to_value(updated)?))
}

/// Delete a thing, optionally forcing removal
pub async fn delete_thing(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let uid = require_str(args, "thing_uid")?;
    let force = opt_bool(args, "force", false)?;
    context.client.delete_thing(&uid, force).await?;
    Ok(ToolResponse::success_with_message(
        serde_json::json!({ "deleted": uid }),
        format!("Thing '{uid}' deleted"),
    ))
}

/// Merge-patch a thing's configuration: unnamed parameters survive, an
/// explicit null clears a parameter
pub async fn update_thing_config(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let uid = require_str(args, "thing_uid")?;
    let patch = require_object(args, "configuration")?;

    let current = context.client.get_thing(&uid).await?;
    let merged = merge_thing_config(&current.configuration, &patch);
    let updated = context.client.update_thing_config(&uid, &merged).await?;
    Ok(ToolResponse::success(serde_json::to_value(updated)?))
}

/// Enable or disable a thing
pub async fn set_thing_enabled(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let uid = require_str(args, "thing_uid")?;
    let enabled = opt_bool(args, "enabled", true)?;
    let updated = context.client.set_thing_enabled(&uid, enabled).await?;
    Ok(ToolResponse::success(serde_json::to_value(updated)?))
}

/// Get a thing's runtime status
pub async fn get_thing_status(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let uid = require_str(args, "thing_uid")?;
    let status = context.client.get_thing_status(&uid).await?;
    Ok(ToolResponse::success(serde_json::to_value(status)?))
}

/// Get a thing's per-parameter configuration findings
pub async fn get_thing_config_status(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let uid = require_str(args, "thing_uid")?;
    let messages = context.client.get_thing_config_status(&uid).await?;
    Ok(ToolResponse::success(serde_json::to_value(messages)?))
}

/// Get a thing's firmware update state; null when the binding provides none
pub async fn get_thing_firmware_status(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let uid = require_str(args, "thing_uid")?;
    let status = context.client.get_thing_firmware_status(&uid).await?;
    Ok(ToolResponse::success(serde_json::to_value(status)?))
}

/// List the firmwares available for a thing
pub async fn get_available_firmwares(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let uid = require_str(args, "thing_uid")?;
    let firmwares = context.client.get_available_firmwares(&uid).await?;
    Ok(ToolResponse::success(serde_json::to_value(firmwares)?))
}
