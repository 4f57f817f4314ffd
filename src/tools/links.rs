//! Link tools: listing, targeted upsert/delete, orphan detection and
//! bulk repair

use super::{opt_object, opt_str, require_str, ToolContext, ToolResponse};
use crate::error::Result;
use serde_json::{json, Map, Value};

/// List links, optionally narrowed by channel-UID substring and/or exact
/// item name; links are low-cardinality, so no pagination
pub async fn list_links(
    context: &ToolContext,
    args: &Map<String, Value>,
) -> Result<ToolResponse> {
    let channel_uid = opt_str(args, "channel_uid")?;
    let item_name = opt_str(args, "item_name")?;

    let links = context
        .link_service()
        .list_links(channel_uid.as_deref(), item_name.as_deref())
        .await?;
    Ok(ToolResponse::success(serde_json::to_value(links)?))
}

/// Get a specific link by its (item name, channel UID) pair
pub async fn get_link(context: &ToolContext, args: &Map<String, Value>) -> Result<ToolResponse> {
    let item_name = require_str(args, "item_name")?;
    let channel_uid = require_str(args, "channel_uid")?;
    let link = context.link_service().get_link(&item_name, &channel_uid).await?;
    Ok(ToolResponse::success(serde_json::to_value(link)?))
}

/// Idempotent link upsert; the channel must resolve to an existing
/// Thing's channel at call time
pub async fn create_or_update_link(
    context: &ToolContext,
    args: &Map<String, Value>,
) -> Result<ToolResponse> {
    let item_name = require_str(args, "item_name")?;
    let channel_uid = require_str(args, "channel_uid")?;
    let configuration = opt_object(args, "configuration")?;

    let link = context
        .link_service()
        .create_or_update_link(&item_name, &channel_uid, configuration)
        .await?;
    Ok(ToolResponse::success(serde_json::to_value(link)?))
}

/// Idempotent link delete: absence is not an error
pub async fn delete_link(context: &ToolContext, args: &Map<String, Value>) -> Result<ToolResponse> {
    let item_name = require_str(args, "item_name")?;
    let channel_uid = require_str(args, "channel_uid")?;

    let existed = context
        .link_service()
        .delete_link(&item_name, &channel_uid)
        .await?;
    Ok(ToolResponse::success(json!({
        "item_name": item_name,
        "channel_uid": channel_uid,
        "existed": existed,
    })))
}

/// Classify every link against the current channel universe and return
/// the orphans
pub async fn get_orphan_links(
    context: &ToolContext,
    _args: &Map<String, Value>,
) -> Result<ToolResponse> {
    let orphans = context.link_service().orphan_links().await?;
    Ok(ToolResponse::success(json!({
        "count": orphans.len(),
        "orphans": orphans,
    })))
}

/// Compute orphans and delete them, reporting per-target outcomes
pub async fn purge_orphan_links(
    context: &ToolContext,
    _args: &Map<String, Value>,
) -> Result<ToolResponse> {
    let report = context.link_service().purge_orphan_links().await?;
    Ok(ToolResponse::success_with_message(
        serde_json::to_value(&report)?,
        format!("Removed {} orphan link(s)", report.removed.len()),
    ))
}

/// Delete every link attached to an Item name or Thing UID
pub async fn delete_all_links_for_object(
    context: &ToolContext,
    args: &Map<String, Value>,
) -> Result<ToolResponse> {
    let object_id = require_str(args, "object_id")?;
    let report = context
        .link_service()
        .delete_all_links_for_object(&object_id)
        .await?;
    Ok(ToolResponse::success_with_message(
        serde_json::to_value(&report)?,
        format!(
            "Removed {} link(s) for object '{object_id}'",
            report.removed.len()
        ),
    ))
}
