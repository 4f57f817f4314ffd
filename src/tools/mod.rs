//! MCP tool implementations for the openHAB resource graph
//!
//! One tool per operation: item/thing CRUD with filtered pagination, rule
//! and script management, link integrity checks and repair. Tools return a
//! structured [`ToolResponse`] in every case; errors carry the taxonomy
//! kind so the transport layer can map them without string matching.

pub mod items;
pub mod links;
pub mod rules;
pub mod things;

use crate::client::OpenHabClient;
use crate::config::ServerConfig;
use crate::error::{OpenHabError, Result};
use crate::links::LinkService;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Standard tool response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Status of the operation
    pub status: String,

    /// Response data
    pub data: Value,

    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ToolResponse {
    /// Create successful response
    pub fn success(data: Value) -> Self {
        Self {
            status: "success".to_string(),
            data,
            message: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create successful response with message
    pub fn success_with_message(data: Value, message: String) -> Self {
        Self {
            status: "success".to_string(),
            data,
            message: Some(message),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create error response with a plain message
    pub fn error(message: String) -> Self {
        Self {
            status: "error".to_string(),
            data: Value::Null,
            message: Some(message),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create error response from a structured error, preserving its kind
    /// and, for bulk partial failures, the per-target report
    pub fn from_error(error: &OpenHabError) -> Self {
        let data = match error {
            OpenHabError::PartialFailure(report) => json!({
                "kind": error.kind(),
                "report": report,
            }),
            _ => json!({ "kind": error.kind() }),
        };
        Self {
            status: "error".to_string(),
            data,
            message: Some(error.to_string()),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create response from Result
    pub fn from_result<T: Serialize>(result: Result<T>) -> Self {
        match result {
            Ok(data) => {
                let json_data = serde_json::to_value(data).unwrap_or(Value::Null);
                Self::success(json_data)
            }
            Err(e) => Self::from_error(&e),
        }
    }
}

/// Shared context handed to every tool invocation
#[derive(Clone)]
pub struct ToolContext {
    /// Client for openHAB communication
    pub client: Arc<dyn OpenHabClient>,

    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ToolContext {
    pub fn new(client: Arc<dyn OpenHabClient>, config: Arc<ServerConfig>) -> Self {
        Self { client, config }
    }

    /// Link integrity operations over this context's client
    pub fn link_service(&self) -> LinkService {
        LinkService::new(Arc::clone(&self.client))
    }

    /// Configured upper bound for listing limits
    pub fn max_page_size(&self) -> usize {
        self.config.openhab.max_page_size
    }
}

// --- argument extraction helpers for the dispatch registry ---

fn args_object(args: Value) -> Result<Map<String, Value>> {
    match args {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        other => Err(OpenHabError::invalid_input(format!(
            "Tool arguments must be an object, got {other}"
        ))),
    }
}

fn require_str(args: &Map<String, Value>, key: &str) -> Result<String> {
    match args.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(_) | None => Err(OpenHabError::invalid_input(format!(
            "Missing required string argument '{key}'"
        ))),
    }
}

fn opt_str(args: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(OpenHabError::invalid_input(format!(
            "Argument '{key}' must be a string, got {other}"
        ))),
    }
}

fn opt_usize(args: &Map<String, Value>, key: &str, default: usize) -> Result<usize> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| {
                OpenHabError::invalid_input(format!(
                    "Argument '{key}' must be a non-negative integer, got {value}"
                ))
            }),
    }
}

fn opt_bool(args: &Map<String, Value>, key: &str, default: bool) -> Result<bool> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(OpenHabError::invalid_input(format!(
            "Argument '{key}' must be a boolean, got {other}"
        ))),
    }
}

fn require_object(args: &Map<String, Value>, key: &str) -> Result<Map<String, Value>> {
    match args.get(key) {
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) | None => Err(OpenHabError::invalid_input(format!(
            "Missing required object argument '{key}'"
        ))),
    }
}

fn opt_object(args: &Map<String, Value>, key: &str) -> Result<Option<Map<String, Value>>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map.clone())),
        Some(other) => Err(OpenHabError::invalid_input(format!(
            "Argument '{key}' must be an object, got {other}"
        ))),
    }
}

fn require_entity<T: serde::de::DeserializeOwned>(
    args: &Map<String, Value>,
    key: &str,
) -> Result<T> {
    let value = args
        .get(key)
        .cloned()
        .ok_or_else(|| OpenHabError::invalid_input(format!("Missing required argument '{key}'")))?;
    serde_json::from_value(value)
        .map_err(|e| OpenHabError::invalid_input(format!("Invalid '{key}' payload: {e}")))
}

/// Subset of the argument map that does not belong to pagination; listing
/// filters validate it and reject anything they do not understand
fn filter_args(args: &Map<String, Value>) -> Map<String, Value> {
    args.iter()
        .filter(|(key, _)| !matches!(key.as_str(), "offset" | "limit"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Dispatch a tool invocation by name.
///
/// This is the registry the embedding transport layer drives; the tool
/// names and argument sets mirror the operations in the crate docs.
pub async fn dispatch(context: &ToolContext, tool: &str, args: Value) -> ToolResponse {
    let args = match args_object(args) {
        Ok(map) => map,
        Err(e) => return ToolResponse::from_error(&e),
    };

    let result: Result<ToolResponse> = match tool {
        // Items
        "list_items" => items::list_items(context, &args).await,
        "get_item" => items::get_item(context, &args).await,
        "create_item" => items::create_item(context, &args).await,
        "update_item" => items::update_item(context, &args).await,
        "delete_item" => items::delete_item(context, &args).await,
        "update_item_state" => items::update_item_state(context, &args).await,

        // Things
        "list_things" => things::list_things(context, &args).await,
        "get_thing" => things::get_thing(context, &args).await,
        "create_thing" => things::create_thing(context, &args).await,
        "update_thing" => things::update_thing(context, &args).await,
        "delete_thing" => things::delete_thing(context, &args).await,
        "update_thing_config" => things::update_thing_config(context, &args).await,
        "set_thing_enabled" => things::set_thing_enabled(context, &args).await,
        "get_thing_status" => things::get_thing_status(context, &args).await,
        "get_thing_config_status" => things::get_thing_config_status(context, &args).await,
        "get_thing_firmware_status" => things::get_thing_firmware_status(context, &args).await,
        "get_available_firmwares" => things::get_available_firmwares(context, &args).await,

        // Rules and scripts
        "list_rules" => rules::list_rules(context, &args).await,
        "get_rule" => rules::get_rule(context, &args).await,
        "create_rule" => rules::create_rule(context, &args).await,
        "update_rule" => rules::update_rule(context, &args).await,
        "delete_rule" => rules::delete_rule(context, &args).await,
        "run_rule_now" => rules::run_rule_now(context, &args).await,
        "update_rule_script_action" => rules::update_rule_script_action(context, &args).await,
        "list_scripts" => rules::list_scripts(context, &args).await,
        "get_script" => rules::get_script(context, &args).await,
        "create_script" => rules::create_script(context, &args).await,
        "update_script" => rules::update_script(context, &args).await,
        "delete_script" => rules::delete_script(context, &args).await,

        // Links
        "list_links" => links::list_links(context, &args).await,
        "get_link" => links::get_link(context, &args).await,
        "create_or_update_link" => links::create_or_update_link(context, &args).await,
        "delete_link" => links::delete_link(context, &args).await,
        "get_orphan_links" => links::get_orphan_links(context, &args).await,
        "purge_orphan_links" => links::purge_orphan_links(context, &args).await,
        "delete_all_links_for_object" => links::delete_all_links_for_object(context, &args).await,

        _ => Err(OpenHabError::invalid_input(format!("Unknown tool '{tool}'"))),
    };

    match result {
        Ok(response) => response,
        Err(e) => ToolResponse::from_error(&e),
    }
}
