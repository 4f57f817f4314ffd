//! Entity models for the openHAB resource graph
//!
//! These are wire-format DTOs for the openHAB REST API. Field names follow
//! the API's JSON casing (`UID`, `channelUID`, `itemName`, `groupNames`);
//! Rust-side names stay snake_case via serde renames.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An addressable state-holding entity (e.g. a light switch)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item type (Switch, Contact, Dimmer, Number, String, Group, ...)
    #[serde(rename = "type", default = "default_item_type")]
    pub item_type: String,

    /// Unique name, immutable after creation
    pub name: String,

    /// Current state, shape depends on the item type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Tags, order irrelevant
    #[serde(default)]
    pub tags: Vec<String>,

    /// Names of the groups this item belongs to
    #[serde(rename = "groupNames", default)]
    pub group_names: Vec<String>,
}

fn default_item_type() -> String {
    "String".to_string()
}

/// A named capability of a Thing that can be linked to an Item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel UID, unique within its Thing (thingUID:channelId)
    pub uid: String,

    /// Channel id within the Thing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Channel type UID
    #[serde(rename = "channelTypeUID", default, skip_serializing_if = "Option::is_none")]
    pub channel_type_uid: Option<String>,

    /// Item type this channel accepts
    #[serde(rename = "itemType", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default)]
    pub configuration: Map<String, Value>,
}

/// Runtime status of a Thing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThingStatusInfo {
    /// Status (ONLINE, OFFLINE, UNINITIALIZED, ...)
    pub status: String,

    #[serde(rename = "statusDetail", default = "default_status_detail")]
    pub status_detail: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_status_detail() -> String {
    "NONE".to_string()
}

/// A physical or logical device exposing Channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thing {
    /// Thing type UID (binding:type)
    #[serde(rename = "thingTypeUID")]
    pub thing_type_uid: String,

    /// Thing UID (binding:type:id)
    #[serde(rename = "UID")]
    pub uid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(rename = "bridgeUID", default, skip_serializing_if = "Option::is_none")]
    pub bridge_uid: Option<String>,

    /// Parameter name to typed value
    #[serde(default)]
    pub configuration: Map<String, Value>,

    #[serde(default)]
    pub properties: Map<String, Value>,

    #[serde(rename = "statusInfo", default, skip_serializing_if = "Option::is_none")]
    pub status_info: Option<ThingStatusInfo>,

    /// Channel descriptors; each channel UID is unique within the Thing
    #[serde(default)]
    pub channels: Vec<Channel>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub editable: bool,
}

fn default_true() -> bool {
    true
}

/// One configuration finding for a Thing parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigStatusMessage {
    #[serde(rename = "parameterName")]
    pub parameter_name: String,

    /// Severity (INFORMATION, WARNING, ERROR, PENDING)
    #[serde(rename = "type")]
    pub message_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(rename = "statusCode", default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i64>,
}

/// Firmware update state of a Thing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmwareStatus {
    /// Status (UNKNOWN, UP_TO_DATE, UPDATE_AVAILABLE, UPDATE_EXECUTABLE)
    pub status: String,

    #[serde(rename = "updatableVersion", default, skip_serializing_if = "Option::is_none")]
    pub updatable_version: Option<String>,
}

/// A firmware image offered for a Thing's type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Firmware {
    pub version: String,

    #[serde(rename = "thingTypeUID", default, skip_serializing_if = "Option::is_none")]
    pub thing_type_uid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(rename = "modelRestricted", default)]
    pub model_restricted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog: Option<String>,

    #[serde(rename = "prerequisiteVersion", default, skip_serializing_if = "Option::is_none")]
    pub prerequisite_version: Option<String>,
}

/// The association connecting an Item to a Channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "itemName")]
    pub item_name: String,

    #[serde(rename = "channelUID")]
    pub channel_uid: String,

    #[serde(default)]
    pub configuration: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
}

impl Link {
    /// UID of the Thing that structurally owns this link's channel.
    ///
    /// A channel UID is `binding:type:thingId:channelId`; dropping the last
    /// segment yields the owning Thing's UID.
    pub fn owning_thing_uid(&self) -> Option<&str> {
        self.channel_uid.rsplit_once(':').map(|(thing, _)| thing)
    }
}

/// Runtime status of a Rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleStatus {
    pub status: String,

    #[serde(rename = "statusDetail", default = "default_status_detail")]
    pub status_detail: String,
}

/// A trigger module of a Rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTrigger {
    pub id: String,

    #[serde(rename = "type")]
    pub module_type: String,

    #[serde(default)]
    pub configuration: Map<String, Value>,
}

/// A condition module of a Rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    pub id: String,

    #[serde(rename = "type")]
    pub module_type: String,

    #[serde(default)]
    pub configuration: Map<String, Value>,
}

/// An action module of a Rule; for script actions the configuration carries
/// the executable script body under the `script` key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAction {
    /// Stable id, unique within the Rule
    pub id: String,

    #[serde(rename = "type")]
    pub module_type: String,

    #[serde(default)]
    pub configuration: Map<String, Value>,

    #[serde(default)]
    pub inputs: Map<String, Value>,
}

/// Module type openHAB uses for script actions
pub const SCRIPT_ACTION_TYPE: &str = "script.ScriptAction";

/// Tag that classifies a Rule as a Script
pub const SCRIPT_TAG: &str = "Script";

/// An automation definition composed of triggers, conditions and actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub uid: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RuleStatus>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,

    #[serde(default = "default_true")]
    pub editable: bool,

    #[serde(default)]
    pub configuration: Map<String, Value>,

    #[serde(default)]
    pub triggers: Vec<RuleTrigger>,

    #[serde(default)]
    pub conditions: Vec<RuleCondition>,

    #[serde(default)]
    pub actions: Vec<RuleAction>,
}

impl Rule {
    /// A Script is not a distinct entity type: it is a Rule tagged
    /// "Script" with no triggers.
    pub fn is_script(&self) -> bool {
        self.triggers.is_empty() && self.tags.iter().any(|t| t == SCRIPT_TAG)
    }

    /// Build the Rule representation backing a new script
    pub fn new_script(script_id: &str, script_type: &str, content: &str) -> Self {
        let mut configuration = Map::new();
        configuration.insert("type".to_string(), Value::String(script_type.to_string()));
        configuration.insert("script".to_string(), Value::String(content.to_string()));

        Self {
            uid: script_id.to_string(),
            name: script_id.to_string(),
            description: None,
            status: None,
            tags: vec![SCRIPT_TAG.to_string()],
            visibility: None,
            editable: true,
            configuration: Map::new(),
            triggers: Vec::new(),
            conditions: Vec::new(),
            actions: vec![RuleAction {
                id: "1".to_string(),
                module_type: SCRIPT_ACTION_TYPE.to_string(),
                configuration,
                inputs: Map::new(),
            }],
        }
    }
}
