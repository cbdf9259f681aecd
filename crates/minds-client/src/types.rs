//! Request and response types for the Minds API.
//!
//! These types mirror the service's API contract.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Key under which a mind's prompt template is stored in its parameters.
pub const PROMPT_TEMPLATE_KEY: &str = "prompt_template";

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ─────────────────────────────────────────────────────────────────────────────
// Datasources
// ─────────────────────────────────────────────────────────────────────────────

/// An external data connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datasource {
    /// Unique name.
    pub name: String,
    /// Connector type (e.g. `postgres`, `snowflake`).
    pub engine: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Connection parameters, opaque to the client.
    #[serde(default, deserialize_with = "null_as_default")]
    pub connection_data: Map<String, Value>,
    /// Tables to expose; empty means all.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tables: Vec<String>,
}

impl Datasource {
    /// Create a datasource spec with no connection parameters.
    pub fn new(name: impl Into<String>, engine: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            engine: engine.into(),
            description: None,
            connection_data: Map::new(),
            tables: Vec::new(),
        }
    }

    /// The public demo database.
    pub fn example() -> Self {
        Self::new("example_ds", "postgres")
            .with_description("Minds example database")
            .with_connection_param("user", "demo_user")
            .with_connection_param("password", "demo_password")
            .with_connection_param("host", "samples.mindsdb.com")
            .with_connection_param("port", 5432)
            .with_connection_param("database", "demo")
            .with_connection_param("schema", "demo_data")
    }

    /// Copy this spec under another name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a connection parameter.
    pub fn with_connection_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.connection_data.insert(key.into(), value.into());
        self
    }

    /// Restrict the datasource to the given tables.
    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = tables.into_iter().map(Into::into).collect();
        self
    }

    /// Whether two specs describe the same connection (name aside).
    pub fn same_config(&self, other: &Datasource) -> bool {
        self.engine == other.engine
            && self.description == other.description
            && self.connection_data == other.connection_data
            && self.tables == other.tables
    }
}

/// A datasource given either by name or as a full spec.
///
/// Specs are provisioned before the mind call that mentions them is sent.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasourceRef {
    /// An already existing datasource.
    ByName(String),
    /// A datasource to create if needed.
    BySpec {
        /// The datasource definition.
        datasource: Datasource,
        /// Overwrite an existing datasource of the same name.
        replace: bool,
    },
}

impl DatasourceRef {
    /// Reference a spec that overwrites any same-named datasource.
    pub fn replacing(datasource: Datasource) -> Self {
        DatasourceRef::BySpec {
            datasource,
            replace: true,
        }
    }

    /// The name this reference resolves to.
    pub fn name(&self) -> &str {
        match self {
            DatasourceRef::ByName(name) => name,
            DatasourceRef::BySpec { datasource, .. } => &datasource.name,
        }
    }
}

impl From<&str> for DatasourceRef {
    fn from(name: &str) -> Self {
        DatasourceRef::ByName(name.to_string())
    }
}

impl From<String> for DatasourceRef {
    fn from(name: String) -> Self {
        DatasourceRef::ByName(name)
    }
}

impl From<&String> for DatasourceRef {
    fn from(name: &String) -> Self {
        DatasourceRef::ByName(name.clone())
    }
}

impl From<Datasource> for DatasourceRef {
    fn from(datasource: Datasource) -> Self {
        DatasourceRef::BySpec {
            datasource,
            replace: false,
        }
    }
}

impl From<&Datasource> for DatasourceRef {
    fn from(datasource: &Datasource) -> Self {
        DatasourceRef::from(datasource.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Minds
// ─────────────────────────────────────────────────────────────────────────────

/// Snapshot of a mind as stored by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindInfo {
    /// Unique name.
    pub name: String,
    /// Model used by the mind.
    #[serde(default)]
    pub model_name: Option<String>,
    /// Inference provider.
    #[serde(default)]
    pub provider: Option<String>,
    /// Parameter bag; unknown keys pass through untouched.
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Map<String, Value>,
    /// Names of attached datasources.
    #[serde(default, deserialize_with = "null_as_default")]
    pub datasources: Vec<String>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl MindInfo {
    /// The prompt template override, if one is set.
    pub fn prompt_template(&self) -> Option<&str> {
        self.parameters
            .get(PROMPT_TEMPLATE_KEY)
            .and_then(Value::as_str)
    }
}

/// Definition of a mind to create.
#[derive(Debug, Clone, Default)]
pub struct CreateMind {
    /// Unique name.
    pub name: String,
    /// Model used by the mind.
    pub model_name: Option<String>,
    /// Inference provider.
    pub provider: Option<String>,
    /// Parameter bag.
    pub parameters: Map<String, Value>,
    /// Datasources to attach, provisioned first when given as specs.
    pub datasources: Vec<DatasourceRef>,
    /// Replace a same-named mind instead of failing.
    pub replace: bool,
}

impl CreateMind {
    /// Start a mind definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the model.
    pub fn model_name(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    /// Set the inference provider.
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Override the prompt template.
    pub fn prompt_template(self, template: impl Into<String>) -> Self {
        let template: String = template.into();
        self.parameter(PROMPT_TEMPLATE_KEY, template)
    }

    /// Set a single parameter.
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Merge a parameter bag into the definition.
    pub fn parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Attach a datasource.
    pub fn datasource(mut self, datasource: impl Into<DatasourceRef>) -> Self {
        self.datasources.push(datasource.into());
        self
    }

    /// Attach several datasources.
    pub fn datasources<I, D>(mut self, datasources: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DatasourceRef>,
    {
        self.datasources
            .extend(datasources.into_iter().map(Into::into));
        self
    }

    /// Replace a same-named mind.
    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }
}

/// Partial update of a mind. Fields left as `None` keep their value.
#[derive(Debug, Clone, Default)]
pub struct MindUpdate {
    /// New name.
    pub name: Option<String>,
    /// New model.
    pub model_name: Option<String>,
    /// New provider.
    pub provider: Option<String>,
    /// Replacement parameter bag.
    pub parameters: Option<Map<String, Value>>,
    /// Replacement datasource membership.
    pub datasources: Option<Vec<DatasourceRef>>,
}

impl MindUpdate {
    /// Start an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename the mind.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Change the model.
    pub fn model_name(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    /// Change the provider.
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Replace the parameter bag.
    pub fn parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Set one key in the replacement parameter bag.
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set the prompt template in the replacement parameter bag.
    pub fn prompt_template(self, template: impl Into<String>) -> Self {
        let template: String = template.into();
        self.parameter(PROMPT_TEMPLATE_KEY, template)
    }

    /// Replace the datasource membership.
    pub fn datasources<I, D>(mut self, datasources: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DatasourceRef>,
    {
        self.datasources = Some(datasources.into_iter().map(Into::into).collect());
        self
    }

    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.model_name.is_none()
            && self.provider.is_none()
            && self.parameters.is_none()
            && self.datasources.is_none()
    }
}

/// Create body for a mind, with datasources already resolved to names.
#[derive(Debug, Serialize)]
pub(crate) struct MindBody<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<&'a str>,
    pub parameters: &'a Map<String, Value>,
    pub datasources: Vec<String>,
}

/// Patch body for a mind; absent fields are left alone by the service.
#[derive(Debug, Default, Serialize)]
pub(crate) struct MindPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<&'a Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasources: Option<Vec<String>>,
}

/// Body for attaching a datasource to a mind.
#[derive(Debug, Serialize)]
pub(crate) struct AttachDatasource<'a> {
    pub name: &'a str,
}

// ─────────────────────────────────────────────────────────────────────────────
// Completions
// ─────────────────────────────────────────────────────────────────────────────

/// A chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sender role (`user`, `assistant`, `system`).
    pub role: String,
    /// Message text.
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CompletionRequest {
    /// Name of the mind answering.
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// Buffered chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CompletionChoice {
    pub message: ChatMessage,
}

/// One incremental piece of a streamed answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionChunk {
    /// Text fragment; empty for role-only or final frames.
    pub content: String,
    /// Role announced by the first frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Completion ID shared by all chunks of one answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Model reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Set on the last chunk of a choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Raw server-sent frame of a streamed completion.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StreamFrame {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StreamChoice {
    #[serde(default)]
    pub delta: StreamDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct StreamDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}
