//! Mock implementations for testing
//!
//! In-memory openHAB client with the remote's observable semantics:
//! NotFound for unresolved identifiers, Conflict on duplicate creates,
//! idempotent link upserts. A failure-injection knob on link deletion
//! exercises the bulk partial-failure paths.

use crate::client::OpenHabClient;
use crate::error::{OpenHabError, Result};
use crate::models::{ConfigStatusMessage, Firmware, FirmwareStatus, Item, Link, Rule, Thing, ThingStatusInfo};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Mock openHAB client for testing
#[derive(Default)]
pub struct MockOpenHabClient {
    items: RwLock<Vec<Item>>,
    things: RwLock<Vec<Thing>>,
    rules: RwLock<Vec<Rule>>,
    links: RwLock<Vec<Link>>,
    config_statuses: RwLock<HashMap<String, Vec<ConfigStatusMessage>>>,
    firmware_statuses: RwLock<HashMap<String, FirmwareStatus>>,
    firmwares: RwLock<HashMap<String, Vec<Firmware>>>,
    /// Channel UIDs whose link deletion fails with a connection error
    failing_link_deletes: RwLock<HashSet<String>>,
    /// When set, every things fetch fails (unreachable remote)
    things_unavailable: RwLock<bool>,
}

impl MockOpenHabClient {
    /// Create an empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed items
    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        *self.items.get_mut() = items;
        self
    }

    /// Seed things
    pub fn with_things(mut self, things: Vec<Thing>) -> Self {
        *self.things.get_mut() = things;
        self
    }

    /// Seed rules
    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        *self.rules.get_mut() = rules;
        self
    }

    /// Seed links
    pub fn with_links(mut self, links: Vec<Link>) -> Self {
        *self.links.get_mut() = links;
        self
    }

    /// Seed a thing's configuration findings
    pub fn with_config_status(mut self, uid: &str, messages: Vec<ConfigStatusMessage>) -> Self {
        self.config_statuses.get_mut().insert(uid.to_string(), messages);
        self
    }

    /// Seed a thing's firmware status
    pub fn with_firmware_status(mut self, uid: &str, status: FirmwareStatus) -> Self {
        self.firmware_statuses.get_mut().insert(uid.to_string(), status);
        self
    }

    /// Seed the firmwares available for a thing
    pub fn with_firmwares(mut self, uid: &str, firmwares: Vec<Firmware>) -> Self {
        self.firmwares.get_mut().insert(uid.to_string(), firmwares);
        self
    }

    /// Make deleting links on the given channel fail
    pub async fn fail_link_deletes_on(&self, channel_uid: &str) {
        self.failing_link_deletes
            .write()
            .await
            .insert(channel_uid.to_string());
    }

    /// Toggle things-endpoint availability
    pub async fn set_things_unavailable(&self, unavailable: bool) {
        *self.things_unavailable.write().await = unavailable;
    }

    /// Remove a thing directly, simulating out-of-band deletion
    pub async fn remove_thing(&self, uid: &str) {
        self.things.write().await.retain(|t| t.uid != uid);
    }
}

#[async_trait]
impl OpenHabClient for MockOpenHabClient {
    async fn list_items(&self) -> Result<Vec<Item>> {
        Ok(self.items.read().await.clone())
    }

    async fn get_item(&self, name: &str) -> Result<Item> {
        self.items
            .read()
            .await
            .iter()
            .find(|i| i.name == name)
            .cloned()
            .ok_or_else(|| OpenHabError::not_found(format!("Item '{name}' not found")))
    }

    async fn create_item(&self, item: &Item) -> Result<Item> {
        let mut items = self.items.write().await;
        if items.iter().any(|i| i.name == item.name) {
            return Err(OpenHabError::conflict(format!(
                "Item '{}' already exists",
                item.name
            )));
        }
        items.push(item.clone());
        Ok(item.clone())
    }

    async fn update_item(&self, name: &str, item: &Item) -> Result<Item> {
        let mut items = self.items.write().await;
        let slot = items
            .iter_mut()
            .find(|i| i.name == name)
            .ok_or_else(|| OpenHabError::not_found(format!("Item '{name}' not found")))?;
        *slot = item.clone();
        Ok(item.clone())
    }

    async fn delete_item(&self, name: &str) -> Result<()> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|i| i.name != name);
        if items.len() == before {
            return Err(OpenHabError::not_found(format!("Item '{name}' not found")));
        }
        Ok(())
    }

    async fn update_item_state(&self, name: &str, state: &str) -> Result<()> {
        let mut items = self.items.write().await;
        let slot = items
            .iter_mut()
            .find(|i| i.name == name)
            .ok_or_else(|| OpenHabError::not_found(format!("Item '{name}' not found")))?;
        slot.state = Some(state.to_string());
        Ok(())
    }

    async fn list_things(&self) -> Result<Vec<Thing>> {
        if *self.things_unavailable.read().await {
            return Err(OpenHabError::connection("things endpoint unreachable"));
        }
        Ok(self.things.read().await.clone())
    }

    async fn get_thing(&self, uid: &str) -> Result<Thing> {
        self.things
            .read()
            .await
            .iter()
            .find(|t| t.uid == uid)
            .cloned()
            .ok_or_else(|| OpenHabError::not_found(format!("Thing '{uid}' not found")))
    }

    async fn create_thing(&self, thing: &Thing) -> Result<Thing> {
        let mut things = self.things.write().await;
        if things.iter().any(|t| t.uid == thing.uid) {
            return Err(OpenHabError::conflict(format!(
                "Thing '{}' already exists",
                thing.uid
            )));
        }
        things.push(thing.clone());
        Ok(thing.clone())
    }

    async fn update_thing(&self, uid: &str, thing: &Thing) -> Result<Thing> {
        let mut things = self.things.write().await;
        let slot = things
            .iter_mut()
            .find(|t| t.uid == uid)
            .ok_or_else(|| OpenHabError::not_found(format!("Thing '{uid}' not found")))?;
        *slot = thing.clone();
        Ok(thing.clone())
    }

    async fn delete_thing(&self, uid: &str, _force: bool) -> Result<()> {
        let mut things = self.things.write().await;
        let before = things.len();
        things.retain(|t| t.uid != uid);
        if things.len() == before {
            return Err(OpenHabError::not_found(format!("Thing '{uid}' not found")));
        }
        Ok(())
    }

    async fn update_thing_config(
        &self,
        uid: &str,
        configuration: &Map<String, Value>,
    ) -> Result<Thing> {
        let mut things = self.things.write().await;
        let slot = things
            .iter_mut()
            .find(|t| t.uid == uid)
            .ok_or_else(|| OpenHabError::not_found(format!("Thing '{uid}' not found")))?;
        slot.configuration = configuration.clone();
        Ok(slot.clone())
    }

    async fn set_thing_enabled(&self, uid: &str, enabled: bool) -> Result<Thing> {
        let mut things = self.things.write().await;
        let slot = things
            .iter_mut()
            .find(|t| t.uid == uid)
            .ok_or_else(|| OpenHabError::not_found(format!("Thing '{uid}' not found")))?;
        slot.enabled = enabled;
        Ok(slot.clone())
    }

    async fn get_thing_status(&self, uid: &str) -> Result<ThingStatusInfo> {
        let thing = self.get_thing(uid).await?;
        Ok(thing.status_info.unwrap_or(ThingStatusInfo {
            status: "ONLINE".to_string(),
            status_detail: "NONE".to_string(),
            description: None,
        }))
    }

    async fn get_thing_config_status(&self, uid: &str) -> Result<Vec<ConfigStatusMessage>> {
        self.get_thing(uid).await?;
        Ok(self
            .config_statuses
            .read()
            .await
            .get(uid)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_thing_firmware_status(&self, uid: &str) -> Result<Option<FirmwareStatus>> {
        self.get_thing(uid).await?;
        Ok(self.firmware_statuses.read().await.get(uid).cloned())
    }

    async fn get_available_firmwares(&self, uid: &str) -> Result<Vec<Firmware>> {
        self.get_thing(uid).await?;
        Ok(self
            .firmwares
            .read()
            .await
            .get(uid)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_rules(&self, filter_tag: Option<&str>) -> Result<Vec<Rule>> {
        let rules = self.rules.read().await;
        Ok(rules
            .iter()
            .filter(|r| filter_tag.map_or(true, |tag| r.tags.iter().any(|t| t == tag)))
            .cloned()
            .collect())
    }

    async fn get_rule(&self, uid: &str) -> Result<Rule> {
        self.rules
            .read()
            .await
            .iter()
            .find(|r| r.uid == uid)
            .cloned()
            .ok_or_else(|| OpenHabError::not_found(format!("Rule '{uid}' not found")))
    }

    async fn create_rule(&self, rule: &Rule) -> Result<Rule> {
        let mut rules = self.rules.write().await;
        if rules.iter().any(|r| r.uid == rule.uid) {
            return Err(OpenHabError::conflict(format!(
                "Rule '{}' already exists",
                rule.uid
            )));
        }
        rules.push(rule.clone());
        Ok(rule.clone())
    }

    async fn update_rule(&self, uid: &str, rule: &Rule) -> Result<Rule> {
        let mut rules = self.rules.write().await;
        let slot = rules
            .iter_mut()
            .find(|r| r.uid == uid)
            .ok_or_else(|| OpenHabError::not_found(format!("Rule '{uid}' not found")))?;
        *slot = rule.clone();
        Ok(rule.clone())
    }

    async fn delete_rule(&self, uid: &str) -> Result<()> {
        let mut rules = self.rules.write().await;
        let before = rules.len();
        rules.retain(|r| r.uid != uid);
        if rules.len() == before {
            return Err(OpenHabError::not_found(format!("Rule '{uid}' not found")));
        }
        Ok(())
    }

    async fn run_rule_now(&self, uid: &str) -> Result<()> {
        self.get_rule(uid).await.map(|_| ())
    }

    async fn list_links(&self) -> Result<Vec<Link>> {
        Ok(self.links.read().await.clone())
    }

    async fn get_link(&self, item_name: &str, channel_uid: &str) -> Result<Link> {
        self.links
            .read()
            .await
            .iter()
            .find(|l| l.item_name == item_name && l.channel_uid == channel_uid)
            .cloned()
            .ok_or_else(|| {
                OpenHabError::not_found(format!(
                    "Link between '{item_name}' and '{channel_uid}' not found"
                ))
            })
    }

    async fn put_link(&self, link: &Link) -> Result<()> {
        let mut links = self.links.write().await;
        if let Some(slot) = links
            .iter_mut()
            .find(|l| l.item_name == link.item_name && l.channel_uid == link.channel_uid)
        {
            *slot = link.clone();
        } else {
            links.push(link.clone());
        }
        Ok(())
    }

    async fn delete_link(&self, item_name: &str, channel_uid: &str) -> Result<()> {
        if self
            .failing_link_deletes
            .read()
            .await
            .contains(channel_uid)
        {
            return Err(OpenHabError::connection(format!(
                "injected failure deleting link on '{channel_uid}'"
            )));
        }
        let mut links = self.links.write().await;
        let before = links.len();
        links.retain(|l| !(l.item_name == item_name && l.channel_uid == channel_uid));
        if links.len() == before {
            return Err(OpenHabError::not_found(format!(
                "Link between '{item_name}' and '{channel_uid}' not found"
            )));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
