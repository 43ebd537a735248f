use crate::dashboard_api::extract::{find_text, find_u64, value_text};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Attributes requested by default when listing nodes
pub const DEFAULT_NODE_FIELDS: &[&str] = &[
    "/system-state/hostname",
    "/system-state/type",
    "/system-state/ip",
    "/system-state/sn",
];

/// Node type filter applied by default when listing nodes
pub const DEFAULT_NODE_TYPE: &str = "Device";

/// Keys every organisation item must carry
const ORGANISATION_KEYS: &[&str] = &[
    "id",
    "name",
    "description",
    "default-group",
    "network-count",
    "device-count",
    "monitor-profiles",
    "change-window-type",
    "change-window",
];

/// Keys every node `system-state` object must carry
const SYSTEM_STATE_KEYS: &[&str] = &["hostname", "type", "ip"];

/// Organisation resource
///
/// Every key is required. A payload missing any of them is rejected as a
/// whole rather than producing a partial record. Values are taken as they
/// come: `null` becomes `None`, and numbers are accepted where text is
/// expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Organisation {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub name: String,
    #[serde(deserialize_with = "optional_text")]
    pub description: Option<String>,
    /// Id of the organisation's default network group
    #[serde(deserialize_with = "optional_text")]
    pub default_group: Option<String>,
    #[serde(deserialize_with = "optional_count")]
    pub network_count: Option<u64>,
    #[serde(deserialize_with = "optional_count")]
    pub device_count: Option<u64>,
    /// Monitor profile reference(s), kept as returned by the dashboard
    pub monitor_profiles: Value,
    #[serde(deserialize_with = "optional_text")]
    pub change_window_type: Option<String>,
    /// Change window descriptor, kept as returned by the dashboard
    pub change_window: Value,
}

impl Organisation {
    /// Map one item of the `/orgs` `data` array
    pub fn from_json(item: &Value) -> Result<Self, serde_json::Error> {
        require_keys(item, ORGANISATION_KEYS)?;
        Organisation::deserialize(item)
    }
}

/// Attributes read from a node's `system-state` object
#[derive(Debug, Deserialize)]
struct SystemState {
    #[serde(deserialize_with = "optional_text")]
    hostname: Option<String>,
    #[serde(rename = "type", deserialize_with = "optional_text")]
    device_type: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    ip: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    sn: Option<String>,
}

/// Reject `item` unless it is an object carrying every key in `keys`
fn require_keys(item: &Value, keys: &[&'static str]) -> Result<(), serde_json::Error> {
    let Some(object) = item.as_object() else {
        return Err(serde_json::Error::custom(format!(
            "expected a JSON object, found {}",
            item
        )));
    };

    match keys.iter().find(|key| !object.contains_key(**key)) {
        Some(key) => Err(serde_json::Error::missing_field(*key)),
        None => Ok(()),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(&Value::deserialize(deserializer)?))
}

fn optional_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Per-severity counters reported for a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCounters {
    pub alert: Option<u64>,
    pub info: Option<u64>,
    pub warn: Option<u64>,
    pub normal: Option<u64>,
}

impl NodeCounters {
    /// Locate each counter anywhere in `value`; the first occurrence wins
    pub fn from_json(value: &Value) -> Self {
        Self {
            alert: find_u64(value, "alert"),
            info: find_u64(value, "info"),
            warn: find_u64(value, "warn"),
            normal: find_u64(value, "normal"),
        }
    }

    /// Whether the dashboard reported no counters at all
    pub fn is_empty(&self) -> bool {
        self.alert.is_none() && self.info.is_none() && self.warn.is_none() && self.normal.is_none()
    }
}

/// Network node (managed device)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub hostname: Option<String>,
    pub device_type: Option<String>,
    pub ip_address: Option<String>,
    /// Serial number, when requested and reported
    pub serial: Option<String>,
    pub counters: NodeCounters,
    /// Overall node state
    pub state: Option<String>,
}

impl Node {
    /// Map one item of the `/nodes` `data` array
    ///
    /// `hostname`, `type` and `ip` come from the item's `system-state`
    /// object; the keys are required but may hold `null`. Counters and
    /// state are searched for across the whole item.
    pub fn from_json(item: &Value) -> Result<Self, serde_json::Error> {
        let system_state = item
            .get("system-state")
            .ok_or_else(|| serde_json::Error::missing_field("system-state"))?;
        require_keys(system_state, SYSTEM_STATE_KEYS)?;
        let system_state = SystemState::deserialize(system_state)?;

        Ok(Self {
            hostname: system_state.hostname,
            device_type: system_state.device_type,
            ip_address: system_state.ip,
            serial: system_state.sn,
            counters: NodeCounters::from_json(item),
            state: find_text(item, "state"),
        })
    }
}

/// Power-over-Ethernet status of an interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoeStatus {
    #[serde(default)]
    pub capable: Option<bool>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Interface of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInterface {
    pub name: String,
    pub enabled: bool,
    #[serde(default)]
    pub poe: Option<PoeStatus>,
}

impl NodeInterface {
    /// Map one entry of a node's `interfaces` array
    pub fn from_json(item: &Value) -> Result<Self, serde_json::Error> {
        NodeInterface::deserialize(item)
    }
}

/// Server-side filtering for node listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeQuery {
    /// JSON pointers of the attributes to return; all attributes when empty
    pub fields: Vec<String>,
    /// Node type filter, e.g. `Device`
    pub node_type: Option<String>,
}

impl Default for NodeQuery {
    fn default() -> Self {
        Self {
            fields: DEFAULT_NODE_FIELDS.iter().map(|f| f.to_string()).collect(),
            node_type: Some(DEFAULT_NODE_TYPE.to_string()),
        }
    }
}

impl NodeQuery {
    /// Request every attribute of every device node
    pub fn all_fields() -> Self {
        Self {
            fields: Vec::new(),
            ..Self::default()
        }
    }

    /// Set the node type filter (builder pattern)
    pub fn with_node_type(mut self, node_type: Option<String>) -> Self {
        self.node_type = node_type;
        self
    }

    /// Query string pairs for this query
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.fields.is_empty() {
            pairs.push(("fields", self.fields.join(",")));
        }
        if let Some(node_type) = &self.node_type {
            pairs.push(("type", node_type.clone()));
        }
        pairs
    }
}
