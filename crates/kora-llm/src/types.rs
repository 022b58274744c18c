//! Provider-neutral chat types
//!
//! These serialize directly into the OpenAI chat-completions wire format, which
//! Groq accepts unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the model
    System,
    /// End-user input
    User,
    /// Model output
    Assistant,
    /// Result of a tool call, answering an assistant `tool_calls` entry
    Tool,
}

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author
    pub role: Role,

    /// Text content (empty for assistant messages that only carry tool calls)
    #[serde(default)]
    pub content: String,

    /// Tool calls requested by the assistant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    /// For `Role::Tool`: the id of the call this message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// System message
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    /// User message
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Assistant message that requests tool calls
    pub fn assistant_tool_calls(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        let mut msg = Self::with_role(Role::Assistant, content);
        msg.tool_calls = Some(calls);
        msg
    }

    /// Tool result answering the call with `tool_call_id`
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut msg = Self::with_role(Role::Tool, content);
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }
}

/// Function declaration offered to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name the model will use in calls
    pub name: String,
    /// What the function does, for the model
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: Value,
}

/// Tool declaration (`{"type": "function", "function": {...}}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Always `"function"`
    #[serde(rename = "type")]
    pub kind: String,
    /// The declared function
    pub function: FunctionDefinition,
}

impl ToolDefinition {
    /// Declare a function tool
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    /// Function name
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Function name and raw JSON arguments chosen by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Called function
    pub name: String,
    /// Arguments as a JSON-encoded string, exactly as the model produced them
    #[serde(default)]
    pub arguments: String,
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id
    pub id: String,
    /// Always `"function"`
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    /// The function to run
    pub function: FunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

impl ToolCall {
    /// Build a function call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: function_kind(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    /// Decode the arguments string. Empty arguments decode to `{}`.
    pub fn parse_arguments(&self) -> Result<Value, serde_json::Error> {
        let raw = self.function.arguments.trim();
        if raw.is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(raw)
    }
}

/// A chat-completion request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    /// Conversation so far
    pub messages: Vec<ChatMessage>,
    /// Tools the model may call
    pub tools: Vec<ToolDefinition>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Completion token limit
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Request with messages only
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Offer tools to the model
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the completion token limit
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Model output for one request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    /// Text content, possibly empty when tools were called
    pub content: String,
    /// Tool calls, empty when the model answered directly
    pub tool_calls: Vec<ToolCall>,
    /// Model that produced the response
    pub model: String,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
}

impl ChatResponse {
    /// Plain text response without tool calls
    pub fn text(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            model: model.into(),
            usage: None,
            finish_reason: Some("stop".to_string()),
        }
    }

    /// Whether the model asked for tools
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&Role::Tool).unwrap(), "\"tool\"");
    }

    #[test]
    fn plain_message_omits_tool_fields() {
        let json = serde_json::to_value(ChatMessage::user("Hi")).unwrap();
        assert_eq!(json, json!({"role": "user", "content": "Hi"}));
    }

    #[test]
    fn tool_message_carries_call_id() {
        let json = serde_json::to_value(ChatMessage::tool("call_1", "42")).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_1");
        assert_eq!(json["content"], "42");
    }

    #[test]
    fn tool_definition_wire_shape() {
        let def = ToolDefinition::function(
            "add",
            "Add two numbers",
            json!({"type": "object", "properties": {}}),
        );
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "add");
        assert_eq!(def.name(), "add");
    }

    #[test]
    fn tool_call_arguments_parse() {
        let call = ToolCall::new("c1", "add", r#"{"a": 2, "b": 3}"#);
        assert_eq!(call.parse_arguments().unwrap(), json!({"a": 2, "b": 3}));

        let empty = ToolCall::new("c2", "get_labels", "");
        assert_eq!(empty.parse_arguments().unwrap(), json!({}));

        let broken = ToolCall::new("c3", "add", "{a: 2");
        assert!(broken.parse_arguments().is_err());
    }

    #[test]
    fn tool_call_deserializes_without_type() {
        let call: ToolCall =
            serde_json::from_value(json!({"id": "x", "function": {"name": "f", "arguments": "{}"}}))
                .unwrap();
        assert_eq!(call.kind, "function");
    }
}
