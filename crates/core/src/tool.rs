//! Tool trait: the abstraction over capabilities the model may invoke.
//!
//! A tool is a named, schema-described function. Tools are registered once
//! per request in a [`ToolRegistry`], which is a closed name → tool map; the
//! tool loop only ever looks tools up by the name the model sent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::error::ToolError;
use crate::message::MessageToolCall;
use crate::provider::ToolDefinition;

/// Named arguments handed to a tool.
pub type ToolArgs = serde_json::Map<String, serde_json::Value>;

/// Result fields returned by a tool.
pub type ToolFields = serde_json::Map<String, serde_json::Value>;

/// A parsed request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the LLM's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON object
    pub arguments: ToolArgs,
}

impl ToolCall {
    /// Parse the raw call the model sent. Missing, malformed or non-object
    /// arguments become an empty mapping.
    pub fn from_message(call: &MessageToolCall) -> Self {
        Self {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: parse_arguments(&call.arguments),
        }
    }
}

/// Lenient argument parsing: anything but a JSON object yields `{}`.
pub fn parse_arguments(raw: &str) -> ToolArgs {
    if raw.trim().is_empty() {
        return ToolArgs::new();
    }
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => map,
        Ok(other) => {
            tracing::debug!(kind = ?other, "Tool arguments were not an object, using empty mapping");
            ToolArgs::new()
        }
        Err(e) => {
            tracing::debug!(error = %e, "Unparseable tool arguments, using empty mapping");
            ToolArgs::new()
        }
    }
}

/// What came out of one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    /// The tool ran and returned fields.
    Fields { fields: ToolFields },
    /// No tool is registered under the requested name.
    Unresolved,
    /// The tool raised; `kind` is the error kind name.
    Failed { kind: String, message: String },
}

/// The result of a tool invocation, correlated to its call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// The outcome
    pub outcome: ToolOutcome,
}

impl ToolResult {
    pub fn fields(call_id: impl Into<String>, fields: ToolFields) -> Self {
        Self {
            call_id: call_id.into(),
            outcome: ToolOutcome::Fields { fields },
        }
    }

    pub fn unresolved(call_id: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            outcome: ToolOutcome::Unresolved,
        }
    }

    pub fn failed(call_id: impl Into<String>, error: &ToolError) -> Self {
        Self {
            call_id: call_id.into(),
            outcome: ToolOutcome::Failed {
                kind: error.kind().to_string(),
                message: error.to_string(),
            },
        }
    }

    /// The JSON content sent back to the model in the `tool` message.
    ///
    /// Fields serialize as-is, an unresolved tool as `{}`, and a failure as
    /// `{"error": "<Kind>: <message>"}`.
    pub fn to_content(&self) -> String {
        let value = match &self.outcome {
            ToolOutcome::Fields { fields } => serde_json::Value::Object(fields.clone()),
            ToolOutcome::Unresolved => serde_json::Value::Object(ToolFields::new()),
            ToolOutcome::Failed { kind, message } => {
                serde_json::json!({ "error": format!("{kind}: {message}") })
            }
        };
        value.to_string()
    }
}

/// The core Tool trait.
///
/// A tool carries whatever side-effect configuration it needs (notification
/// sink, credentials) so that invoking it only takes the model's arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "record_user_details").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: ToolArgs) -> std::result::Result<ToolFields, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A closed registry of available tools, keyed by [`Tool::name`].
///
/// Keying by the tool's own name keeps the advertised definition and the
/// dispatch key identical.
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::warn!(tool = %name, "Replaced an already registered tool");
        }
    }

    /// Look a tool up by the name the model used.
    pub fn resolve(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// All tool definitions (for sending to the LLM), ordered by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { "echo" }
        fn description(&self) -> &str { "Echoes back the input" }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(&self, arguments: ToolArgs) -> std::result::Result<ToolFields, ToolError> {
            let mut out = ToolFields::new();
            out.insert("text".into(), arguments.get("text").cloned().unwrap_or_default());
            Ok(out)
        }
    }

    #[test]
    fn registry_register_and_resolve() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.resolve("echo").is_some());
        assert!(registry.resolve("nonexistent").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn definition_name_matches_dispatch_key() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        let defs = registry.definitions();
        assert_eq!(defs.len(), 1);
        assert!(registry.resolve(&defs[0].name).is_some());
    }

    #[tokio::test]
    async fn resolved_tool_executes() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        let tool = registry.resolve("echo").unwrap();
        let out = tool
            .execute(parse_arguments(r#"{"text":"hello world"}"#))
            .await
            .unwrap();
        assert_eq!(out["text"], "hello world");
    }

    #[test]
    fn lenient_argument_parsing() {
        assert!(parse_arguments("").is_empty());
        assert!(parse_arguments("   ").is_empty());
        assert!(parse_arguments("{not json").is_empty());
        assert!(parse_arguments("[1,2]").is_empty());
        assert_eq!(parse_arguments(r#"{"a":1}"#)["a"], 1);
    }

    #[test]
    fn result_content_shapes() {
        let mut fields = ToolFields::new();
        fields.insert("recorded".into(), "ok".into());
        assert_eq!(ToolResult::fields("c1", fields).to_content(), r#"{"recorded":"ok"}"#);
        assert_eq!(ToolResult::unresolved("c2").to_content(), "{}");

        let err = ToolError::InvalidArguments("missing 'email'".into());
        let content = ToolResult::failed("c3", &err).to_content();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        let text = parsed["error"].as_str().unwrap();
        assert!(text.starts_with("InvalidArguments: "));
        assert!(text.contains("email"));
    }
}
