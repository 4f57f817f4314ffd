//! Item tools: filtered, paginated listing plus CRUD and state updates

use super::{filter_args, opt_usize, require_entity, require_object, require_str, ToolContext, ToolResponse};
use crate::error::Result;
use crate::filters::ItemFilter;
use crate::merge::merge_item_patch;
use crate::models::Item;
use crate::pagination::paginate;

/// Default page size for item listings
const DEFAULT_LIMIT: usize = 15;

/// List items with pagination and optional filtering
pub async fn list_items(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let offset = opt_usize(args, "offset", 0)?;
    let limit = opt_usize(args, "limit", DEFAULT_LIMIT)?;
    let filter = ItemFilter::from_args(&filter_args(args))?;

    // Fetch and filter on every call: pages reflect remote state at call
    // time, there is no cross-page snapshot
    let items = context.client.list_items().await?;
    let filtered: Vec<Item> = items.into_iter().filter(|i| filter.matches(i)).collect();
    let page = paginate(filtered, offset, limit, context.max_page_size())?;

    Ok(ToolResponse::success(serde_json::to_value(page)?))
}

/// Get a specific item by name
pub async fn get_item(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let name = require_str(args, "item_name")?;
    let item = context.client.get_item(&name).await?;
    Ok(ToolResponse::success(serde_json::to_value(item)?))
}

/// Create a new item
pub async fn create_item(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let item: Item = require_entity(args, "item")?;
    let created = context.client.create_item(&item).await?;
    Ok(ToolResponse::success(serde_json::to_value(created)?))
}

/// Merge-patch an existing item: fetch, overlay the named fields, write
/// the merged representation back
pub async fn update_item(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let name = require_str(args, "item_name")?;
    let patch = require_object(args, "item")?;

    let current = context.client.get_item(&name).await?;
    let merged = merge_item_patch(&current, &patch)?;
    let updated = context.client.update_item(&name, &merged).await?;
    Ok(ToolResponse::success(serde_json::to_value(updated)?))
}

/// Delete an item
pub async fn delete_item(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let name = require_str(args, "item_name")?;
    context.client.delete_item(&name).await?;
    Ok(ToolResponse::success_with_message(
        serde_json::json!({ "deleted": name }),
        format!("Item '{name}' deleted"),
    ))
}

/// Send a state/command string to an item
pub async fn update_item_state(
    context: &ToolContext,
    args: &serde_json::Map<String, serde_json::Value>,
) -> Result<ToolResponse> {
    let name = require_str(args, "item_name")?;
    let state = require_str(args, "state")?;

    context.client.update_item_state(&name, &state).await?;
    let item = context.client.get_item(&name).await?;
    Ok(ToolResponse::success(serde_json::to_value(item)?))
}
