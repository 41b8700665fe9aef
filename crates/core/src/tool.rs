//! Tool trait and registry.
//!
//! Tools are what let the assistant act on the household data:
//! read the meal plan, tick off a chore, add a reminder, check the weather.
//! Each tool is described by a [`ToolSpec`] (sent to the completion service)
//! and bound to a local callable through the [`Tool`] trait.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{RegistryError, ToolError};

/// Tool arguments as sent by the completion service.
pub type Arguments = Map<String, Value>;

/// A request from the completion service to run one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Opaque id chosen by the completion service; results correlate by it.
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    #[serde(default)]
    pub arguments: Arguments,
}

/// The outcome of one tool request, as relayed back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The [`ToolRequest::id`] this result answers
    pub request_id: String,

    /// Plain-text content shown to the model
    pub content: String,

    /// Whether the content describes a failure
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(request_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(request_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

/// JSON-schema primitive type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamType {
    fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }
}

/// One named parameter of a tool's input contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
    pub required: bool,
}

impl ParamSpec {
    /// A required string parameter.
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamType::String,
            description: None,
            allowed: Vec::new(),
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Restrict the parameter to an enumerated set of values.
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Name, description and input contract of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParamSpec>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.parameters.push(param);
        self
    }

    /// Render the parameters as a JSON-schema object.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for p in &self.parameters {
            let mut prop = Map::new();
            prop.insert("type".into(), json!(p.kind.as_str()));
            if let Some(description) = &p.description {
                prop.insert("description".into(), json!(description));
            }
            if !p.allowed.is_empty() {
                prop.insert("enum".into(), json!(p.allowed));
            }
            properties.insert(p.name.clone(), Value::Object(prop));
            if p.required {
                required.push(p.name.clone());
            }
        }

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }
}

/// The core Tool trait: a spec plus the local callable behind it.
///
/// Argument validation is the tool's own job; the executor forwards
/// arguments untouched.
#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> &ToolSpec;

    /// Run the tool and return the text relayed to the model.
    async fn call(&self, arguments: &Arguments) -> std::result::Result<String, ToolError>;

    fn name(&self) -> &str {
        &self.spec().name
    }
}

type ToolFn = dyn Fn(Arguments) -> BoxFuture<'static, std::result::Result<String, ToolError>>
    + Send
    + Sync;

/// A tool backed by a closure. Handy for wiring fakes in tests.
pub struct FnTool {
    spec: ToolSpec,
    f: Box<ToolFn>,
}

impl FnTool {
    pub fn new<F>(spec: ToolSpec, f: F) -> Self
    where
        F: Fn(Arguments) -> BoxFuture<'static, std::result::Result<String, ToolError>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            spec,
            f: Box::new(f),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, arguments: &Arguments) -> std::result::Result<String, ToolError> {
        (self.f)(arguments.clone()).await
    }
}

/// The read-only set of tools available to every exchange.
///
/// Built once at startup through [`ToolRegistry::builder`]; there is no way
/// to mutate it afterwards.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// An empty registry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look a tool up by name.
    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Tool specs in registration order.
    pub fn catalog(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec().clone()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[derive(Default)]
pub struct ToolRegistryBuilder {
    registry: ToolRegistry,
}

impl ToolRegistryBuilder {
    /// Register a tool. Fails if another tool already uses the same name.
    pub fn register(mut self, tool: impl Tool + 'static) -> Result<Self, RegistryError> {
        self.add(Arc::new(tool))?;
        Ok(self)
    }

    /// Register an already shared tool.
    pub fn register_arc(mut self, tool: Arc<dyn Tool>) -> Result<Self, RegistryError> {
        self.add(tool)?;
        Ok(self)
    }

    fn add(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.registry.index.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        self.registry.index.insert(name, self.registry.tools.len());
        self.registry.tools.push(tool);
        Ok(())
    }

    pub fn build(self) -> ToolRegistry {
        self.registry
    }
}
