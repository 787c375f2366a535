//! Entity configuration types.
//!
//! An entity is a configured database object (table, view or stored
//! procedure) exposed through the gateway. Alongside its source, an entity
//! carries the role permissions and the MCP exposure flags that the policy
//! engine resolves.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Kind of database object backing an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntitySourceType {
    #[default]
    Table,
    View,
    #[serde(alias = "stored_procedure", alias = "storedProcedure")]
    StoredProcedure,
}

impl EntitySourceType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntitySourceType::Table => "table",
            EntitySourceType::View => "view",
            EntitySourceType::StoredProcedure => "stored-procedure",
        }
    }

    pub const fn is_stored_procedure(&self) -> bool {
        matches!(self, EntitySourceType::StoredProcedure)
    }
}

impl fmt::Display for EntitySourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored-procedure parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Parameters can be a map of name -> default value, or a list of definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterList {
    List(Vec<ParameterDefinition>),
    Defaults(OrderedMap<Value>),
}

impl ParameterList {
    /// Normalize either form into an ordered list of definitions.
    pub fn definitions(&self) -> Vec<ParameterDefinition> {
        match self {
            ParameterList::List(list) => list.clone(),
            ParameterList::Defaults(map) => map
                .iter()
                .map(|(name, default)| ParameterDefinition {
                    name: name.to_string(),
                    required: false,
                    default: (!default.is_null()).then(|| default.clone()),
                    description: None,
                })
                .collect(),
        }
    }
}

/// Database source of an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySource {
    /// Fully qualified database object name, e.g. `dbo.books`.
    pub object: String,

    #[serde(default, rename = "type")]
    pub source_type: EntitySourceType,

    /// Stored-procedure parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParameterList>,

    /// Key columns for tables and views.
    #[serde(
        default,
        rename = "key-fields",
        alias = "keyFields",
        alias = "key_fields",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub key_fields: Vec<String>,
}

impl EntitySource {
    pub fn new(object: impl Into<String>, source_type: EntitySourceType) -> Self {
        Self {
            object: object.into(),
            source_type,
            parameters: None,
            key_fields: Vec::new(),
        }
    }

    /// Declared parameters, empty when none are configured.
    pub fn parameters(&self) -> Vec<ParameterDefinition> {
        self.parameters
            .as_ref()
            .map(ParameterList::definitions)
            .unwrap_or_default()
    }
}

/// Actions a role may be granted on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityAction {
    Create,
    Read,
    Update,
    Delete,
    Execute,
    #[serde(rename = "*")]
    All,
}

impl EntityAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityAction::Create => "create",
            EntityAction::Read => "read",
            EntityAction::Update => "update",
            EntityAction::Delete => "delete",
            EntityAction::Execute => "execute",
            EntityAction::All => "*",
        }
    }
}

impl fmt::Display for EntityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions granted to one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPermission {
    pub role: String,
    #[serde(default)]
    pub actions: Vec<EntityAction>,
}

/// Object form of an entity's `mcp` block. Unset flags stay `None`; their
/// defaults are resolved by the policy engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMcpOptions {
    #[serde(
        default,
        rename = "custom-tool",
        alias = "customTool",
        alias = "customToolEnabled",
        alias = "custom_tool",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_tool: Option<bool>,

    #[serde(
        default,
        rename = "dml-tools",
        alias = "dmlTools",
        alias = "dmlToolsEnabled",
        alias = "dml_tools",
        skip_serializing_if = "Option::is_none"
    )]
    pub dml_tools: Option<bool>,
}

/// Entity `mcp` block: `mcp: false` is shorthand for `dml-tools: false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityMcpSetting {
    Enabled(bool),
    Options(EntityMcpOptions),
}

impl EntityMcpSetting {
    pub fn options(&self) -> EntityMcpOptions {
        match self {
            EntityMcpSetting::Enabled(enabled) => EntityMcpOptions {
                custom_tool: None,
                dml_tools: Some(*enabled),
            },
            EntityMcpSetting::Options(options) => *options,
        }
    }
}

/// A configured entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    pub source: EntitySource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Role permissions. An entity with no permissions is open to every role.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<EntityPermission>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp: Option<EntityMcpSetting>,
}

impl EntityConfig {
    pub fn new(source: EntitySource) -> Self {
        Self {
            source,
            description: None,
            permissions: Vec::new(),
            mcp: None,
        }
    }

    pub fn table(object: impl Into<String>) -> Self {
        Self::new(EntitySource::new(object, EntitySourceType::Table))
    }

    pub fn view(object: impl Into<String>) -> Self {
        Self::new(EntitySource::new(object, EntitySourceType::View))
    }

    pub fn stored_procedure(object: impl Into<String>) -> Self {
        Self::new(EntitySource::new(object, EntitySourceType::StoredProcedure))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_key_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source.key_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<ParameterDefinition>) -> Self {
        self.source.parameters = Some(ParameterList::List(parameters));
        self
    }

    pub fn with_permission<I>(mut self, role: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = EntityAction>,
    {
        self.permissions.push(EntityPermission {
            role: role.into(),
            actions: actions.into_iter().collect(),
        });
        self
    }

    /// Set the explicit `dml-tools` flag.
    pub fn with_dml_tools(mut self, enabled: bool) -> Self {
        let mut options = self.mcp_options();
        options.dml_tools = Some(enabled);
        self.mcp = Some(EntityMcpSetting::Options(options));
        self
    }

    /// Set the explicit `custom-tool` flag.
    pub fn with_custom_tool(mut self, enabled: bool) -> Self {
        let mut options = self.mcp_options();
        options.custom_tool = Some(enabled);
        self.mcp = Some(EntityMcpSetting::Options(options));
        self
    }

    pub fn source_type(&self) -> EntitySourceType {
        self.source.source_type
    }

    /// Normalized `mcp` options (all `None` when the block is absent).
    pub fn mcp_options(&self) -> EntityMcpOptions {
        self.mcp.map(|m| m.options()).unwrap_or_default()
    }

    /// The configured `dml-tools` flag, unresolved.
    pub fn dml_tools_setting(&self) -> Option<bool> {
        self.mcp_options().dml_tools
    }

    /// The configured `custom-tool` flag, unresolved.
    pub fn custom_tool_setting(&self) -> Option<bool> {
        self.mcp_options().custom_tool
    }
}

/// A string-keyed map that keeps insertion order and rejects duplicate keys.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

/// Entities keyed by name, in configuration order.
pub type EntityMap = OrderedMap<EntityConfig>;

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value. Replacing keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Linear scan: entity maps are config-sized and keep file order.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map keyed by name")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries: Vec<(String, V)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            if entries.iter().any(|(k, _)| *k == key) {
                return Err(de::Error::custom(format!("duplicate key '{}'", key)));
            }
            entries.push((key, value));
        }
        Ok(OrderedMap { entries })
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(OrderedMap::default())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}
