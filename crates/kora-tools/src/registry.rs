//! Tool registry and executor

use std::collections::HashMap;
use std::sync::Arc;

use kora_llm::{ToolCall, ToolDefinition};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ToolError, ToolResult};
use crate::tool::{Tool, ToolInvocation, ToolKind, ToolRequest};

/// Routes function calls to the agent that defines them
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    routes: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent, builder style
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.register(Arc::new(tool));
        self
    }

    /// Register an agent. A function name already routed elsewhere is
    /// taken over by the new agent.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let index = self.tools.len();
        for definition in tool.definitions() {
            let name = definition.name().to_string();
            if let Some(previous) = self.routes.insert(name.clone(), index) {
                warn!(
                    function = %name,
                    previous = %self.tools[previous].kind(),
                    current = %tool.kind(),
                    "Function registered twice; latest agent wins"
                );
            }
        }
        debug!(tool = %tool.kind(), "Registered tool agent");
        self.tools.push(tool);
    }

    /// Definitions of every routed function, for the model
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .tools
            .iter()
            .enumerate()
            .flat_map(|(index, tool)| {
                tool.definitions()
                    .into_iter()
                    .filter(move |d| self.routes.get(d.name()) == Some(&index))
            })
            .collect();
        definitions.sort_by(|a, b| a.name().cmp(b.name()));
        definitions
    }

    /// Registered agent kinds in registration order
    pub fn kinds(&self) -> Vec<ToolKind> {
        self.tools.iter().map(|t| t.kind()).collect()
    }

    /// Agent kind that handles `function`
    pub fn route(&self, function: &str) -> Option<ToolKind> {
        self.routes.get(function).map(|&i| self.tools[i].kind())
    }

    /// Number of routed functions
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no function is routed
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Run a request on the agent that defines its function
    pub async fn invoke(&self, request: ToolRequest) -> ToolResult<String> {
        let index = *self
            .routes
            .get(&request.function)
            .ok_or_else(|| ToolError::UnknownFunction(request.function.clone()))?;
        self.tools[index].invoke(request).await
    }

    /// Execute a model tool call, capturing success or typed failure
    pub async fn execute(&self, call: &ToolCall) -> ToolInvocation {
        let function = call.function.name.clone();
        let tool = self.route(&function);

        let (arguments, result) = match call.parse_arguments() {
            Ok(arguments) if !arguments.is_object() => (
                arguments,
                Err(ToolError::invalid(&function, "arguments must be a JSON object")),
            ),
            Ok(arguments) => {
                let result = self
                    .invoke(ToolRequest::new(&function, arguments.clone()))
                    .await;
                (arguments, result)
            }
            Err(e) => (
                Value::Null,
                Err(ToolError::invalid(&function, format!("malformed JSON: {e}"))),
            ),
        };

        match &result {
            Ok(output) => info!(
                function = %function,
                tool = ?tool,
                output_len = output.len(),
                "Tool call succeeded"
            ),
            Err(e) => warn!(function = %function, tool = ?tool, error = %e, "Tool call failed"),
        }

        ToolInvocation {
            call_id: call.id.clone(),
            tool,
            function,
            arguments,
            result,
        }
    }
}
