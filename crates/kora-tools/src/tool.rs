//! Tool capability trait and invocation records

use std::fmt;

use async_trait::async_trait;
use kora_llm::ToolDefinition;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ToolError, ToolResult};

/// Which agent handled an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Arithmetic, unit conversion, matrices
    Math,
    /// Text translation
    Translate,
    /// Web search
    Search,
    /// Gmail mailbox access
    Gmail,
    /// Weather, air quality, geocoding
    Weather,
}

impl ToolKind {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Math => "math",
            Self::Translate => "translate",
            Self::Search => "search",
            Self::Gmail => "gmail",
            Self::Weather => "weather",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A call of one function on a tool agent
#[derive(Debug, Clone, PartialEq)]
pub struct ToolRequest {
    /// Function name, e.g. `add` or `send_email`
    pub function: String,
    /// JSON object of arguments
    pub arguments: Value,
}

impl ToolRequest {
    /// Create a request
    pub fn new(function: impl Into<String>, arguments: Value) -> Self {
        Self {
            function: function.into(),
            arguments,
        }
    }

    /// Decode the arguments into a typed struct
    pub fn parse<T: DeserializeOwned>(&self) -> ToolResult<T> {
        serde_json::from_value(self.arguments.clone())
            .map_err(|e| ToolError::invalid(&self.function, e.to_string()))
    }

    /// Error for a function this agent does not expose
    pub fn unknown(&self) -> ToolError {
        ToolError::UnknownFunction(self.function.clone())
    }
}

/// A tool agent: publishes function definitions and executes calls to them
#[async_trait]
pub trait Tool: Send + Sync {
    /// Which agent this is
    fn kind(&self) -> ToolKind;

    /// Functions offered to the model
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Run one function call
    async fn invoke(&self, request: ToolRequest) -> ToolResult<String>;
}

/// Record of one executed tool call
#[derive(Debug)]
pub struct ToolInvocation {
    /// Id of the model's call, echoed back in the tool message
    pub call_id: String,
    /// Agent that handled it; `None` when no agent exposes the function
    pub tool: Option<ToolKind>,
    /// Function called
    pub function: String,
    /// Decoded arguments (`Null` if they could not be decoded)
    pub arguments: Value,
    /// Text result or typed failure
    pub result: ToolResult<String>,
}

impl ToolInvocation {
    /// Whether the call succeeded
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Text handed back to the model
    pub fn output(&self) -> String {
        match &self.result {
            Ok(text) => text.clone(),
            Err(e) => format!("Error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Pair {
        a: i64,
        b: i64,
    }

    #[test]
    fn parse_typed_arguments() {
        let req = ToolRequest::new("add", json!({"a": 1, "b": 2}));
        let pair: Pair = req.parse().unwrap();
        assert_eq!((pair.a, pair.b), (1, 2));
    }

    #[test]
    fn parse_reports_invalid_arguments() {
        let req = ToolRequest::new("add", json!({"a": "one"}));
        let err = req.parse::<Pair>().unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { ref function, .. } if function == "add"));
    }

    #[test]
    fn failed_invocation_output_is_prefixed() {
        let inv = ToolInvocation {
            call_id: "call_1".into(),
            tool: Some(ToolKind::Math),
            function: "calculate".into(),
            arguments: json!({"expression": "1/0"}),
            result: Err(ToolError::computation("division by zero")),
        };
        assert!(!inv.is_success());
        assert_eq!(inv.output(), "Error: computation failed: division by zero");
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ToolKind::Gmail).unwrap(), json!("gmail"));
        assert_eq!(ToolKind::Weather.to_string(), "weather");
    }
}
