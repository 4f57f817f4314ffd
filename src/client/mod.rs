//! Client implementations for openHAB REST API communication
//!
//! [`OpenHabClient`] is the remote-resource boundary: per entity kind it
//! offers list/get/create/update/delete, plus the small set of imperative
//! endpoints (state updates, enable toggles, run-now). The engines above it
//! are agnostic to the wire format used to reach this boundary.

pub mod http_client;

use crate::error::Result;
use crate::models::{ConfigStatusMessage, Firmware, FirmwareStatus, Item, Link, Rule, Thing, ThingStatusInfo};
use async_trait::async_trait;
use serde_json::{Map, Value};

pub use http_client::OpenHabHttpClient;

/// Trait for openHAB client implementations
#[async_trait]
pub trait OpenHabClient: Send + Sync {
    // --- Items ---

    /// Fetch all items in the remote system's native order
    async fn list_items(&self) -> Result<Vec<Item>>;

    /// Fetch a single item by name, `NotFound` if it does not resolve
    async fn get_item(&self, name: &str) -> Result<Item>;

    /// Create a new item; `Conflict` if the name is already taken
    async fn create_item(&self, item: &Item) -> Result<Item>;

    /// Replace an existing item's representation
    async fn update_item(&self, name: &str, item: &Item) -> Result<Item>;

    /// Delete an item by name
    async fn delete_item(&self, name: &str) -> Result<()>;

    /// Send a state/command string to an item
    async fn update_item_state(&self, name: &str, state: &str) -> Result<()>;

    // --- Things ---

    /// Fetch all things including their channel sets
    async fn list_things(&self) -> Result<Vec<Thing>>;

    /// Fetch a single thing by UID
    async fn get_thing(&self, uid: &str) -> Result<Thing>;

    /// Create a new thing; `Conflict` if the UID is already taken
    async fn create_thing(&self, thing: &Thing) -> Result<Thing>;

    /// Replace an existing thing's representation
    async fn update_thing(&self, uid: &str, thing: &Thing) -> Result<Thing>;

    /// Delete a thing, optionally forcing removal while it is in use
    async fn delete_thing(&self, uid: &str, force: bool) -> Result<()>;

    /// Replace a thing's configuration map
    async fn update_thing_config(&self, uid: &str, configuration: &Map<String, Value>)
        -> Result<Thing>;

    /// Enable or disable a thing
    async fn set_thing_enabled(&self, uid: &str, enabled: bool) -> Result<Thing>;

    /// Fetch a thing's runtime status
    async fn get_thing_status(&self, uid: &str) -> Result<ThingStatusInfo>;

    /// Fetch a thing's per-parameter configuration findings
    async fn get_thing_config_status(&self, uid: &str) -> Result<Vec<ConfigStatusMessage>>;

    /// Fetch a thing's firmware update state; `None` when the binding
    /// provides no firmware status
    async fn get_thing_firmware_status(&self, uid: &str) -> Result<Option<FirmwareStatus>>;

    /// Fetch the firmwares available for a thing
    async fn get_available_firmwares(&self, uid: &str) -> Result<Vec<Firmware>>;

    // --- Rules ---

    /// Fetch rules, optionally filtered by tag on the remote side
    async fn list_rules(&self, filter_tag: Option<&str>) -> Result<Vec<Rule>>;

    /// Fetch a single rule by UID
    async fn get_rule(&self, uid: &str) -> Result<Rule>;

    /// Create a new rule; `Conflict` if the UID is already taken
    async fn create_rule(&self, rule: &Rule) -> Result<Rule>;

    /// Replace an existing rule's representation
    async fn update_rule(&self, uid: &str, rule: &Rule) -> Result<Rule>;

    /// Delete a rule by UID
    async fn delete_rule(&self, uid: &str) -> Result<()>;

    /// Trigger immediate execution of a rule
    async fn run_rule_now(&self, uid: &str) -> Result<()>;

    // --- Links ---

    /// Fetch all item-channel links
    async fn list_links(&self) -> Result<Vec<Link>>;

    /// Fetch a single link by its (item name, channel UID) pair
    async fn get_link(&self, item_name: &str, channel_uid: &str) -> Result<Link>;

    /// Upsert a link; the remote treats PUT on the link path as idempotent
    async fn put_link(&self, link: &Link) -> Result<()>;

    /// Delete a link; `NotFound` if the pair does not resolve
    async fn delete_link(&self, item_name: &str, channel_uid: &str) -> Result<()>;

    // --- System ---

    /// Check that the REST API is reachable
    async fn health_check(&self) -> Result<bool>;
}
