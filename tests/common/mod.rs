//! Shared fixtures for integration tests

use openhab_mcp_rust::config::ServerConfig;
use openhab_mcp_rust::mock::MockOpenHabClient;
use openhab_mcp_rust::models::{Item, Link, Thing};
use openhab_mcp_rust::tools::ToolContext;
use serde_json::{json, Map};
use std::sync::Arc;

pub fn item(name: &str, item_type: &str, state: Option<&str>, tags: &[&str]) -> Item {
    Item {
        item_type: item_type.into(),
        name: name.into(),
        state: state.map(Into::into),
        label: Some(name.replace('_', " ")),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        group_names: vec![],
    }
}

pub fn thing(uid: &str, channel_ids: &[&str]) -> Thing {
    serde_json::from_value(json!({
        "thingTypeUID": uid.rsplit_once(':').map(|(t, _)| t.to_string()).unwrap_or_else(|| uid.to_string()),
        "UID": uid,
        "label": uid,
        "channels": channel_ids
            .iter()
            .map(|c| json!({"uid": format!("{uid}:{c}")}))
            .collect::<Vec<_>>(),
    }))
    .unwrap()
}

pub fn link(item_name: &str, channel_uid: &str) -> Link {
    Link {
        item_name: item_name.into(),
        channel_uid: channel_uid.into(),
        configuration: Map::new(),
        editable: None,
    }
}

pub fn context_with(client: MockOpenHabClient) -> (Arc<MockOpenHabClient>, ToolContext) {
    let client = Arc::new(client);
    let context = ToolContext::new(client.clone(), Arc::new(ServerConfig::default()));
    (client, context)
}
