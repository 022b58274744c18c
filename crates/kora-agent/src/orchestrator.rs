//! The main agent: recall, plan with tools, answer, remember

use std::sync::Arc;

use kora_llm::{ChatMessage, ChatRequest, ChatResponse, LlmClient};
use kora_memory::{Exchange, MemoryStore};
use kora_tools::{ToolInvocation, ToolRegistry};
use tracing::{debug, error, info, instrument, warn};

use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};
use crate::state::AgentState;

/// Everything produced by one completed turn
#[derive(Debug)]
pub struct TurnOutcome {
    /// Final answer shown to the user
    pub response: String,

    /// Tool calls executed while planning, in order
    pub invocations: Vec<ToolInvocation>,

    /// Past exchanges given to the model as context
    pub context: Vec<Exchange>,

    /// LLM calls made
    pub iterations: usize,
}

/// Conversational orchestrator
///
/// Drives one query at a time through
/// `AwaitingInput -> Planning -> Responding -> AwaitingInput`.
/// A failed turn also returns to `AwaitingInput`.
pub struct Orchestrator {
    /// Language model
    llm: Arc<dyn LlmClient>,

    /// Tool agents the model may call
    tools: Arc<ToolRegistry>,

    /// Exchange memory
    memory: Arc<MemoryStore>,

    /// Settings
    config: AgentConfig,

    /// Current position in the turn cycle
    state: AgentState,
}

impl Orchestrator {
    /// Create an orchestrator; `max_iterations` is raised to at least one
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: impl Into<Arc<ToolRegistry>>,
        memory: Arc<MemoryStore>,
        mut config: AgentConfig,
    ) -> Self {
        config.max_iterations = config.max_iterations.max(1);
        Self {
            llm,
            tools: tools.into(),
            memory,
            config,
            state: AgentState::AwaitingInput,
        }
    }

    /// Current state
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Settings in use
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Memory store
    pub fn memory(&self) -> &Arc<MemoryStore> {
        &self.memory
    }

    /// Tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Model identifier
    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Answer one query
    #[instrument(skip(self, input), fields(input_len = input.len()))]
    pub async fn handle_turn(&mut self, input: &str) -> AgentResult<TurnOutcome> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AgentError::EmptyInput);
        }

        let result = self.run_turn(input).await;
        self.state = AgentState::AwaitingInput;
        result
    }

    /// Forget every stored exchange
    pub async fn reset(&mut self) -> AgentResult<()> {
        self.memory.clear().await?;
        self.state = AgentState::AwaitingInput;
        info!("Conversation memory reset");
        Ok(())
    }

    async fn run_turn(&mut self, input: &str) -> AgentResult<TurnOutcome> {
        info!(user_input = %input, "Orchestrator received user input");
        self.state = AgentState::Planning;

        let context = self.recall(input).await;
        let mut conversation = self.conversation(input, &context);
        let mut invocations = Vec::new();

        for iteration in 1..=self.config.max_iterations {
            debug!(iteration, max_iterations = self.config.max_iterations, "Planning iteration");

            let response = self.llm_step(&conversation).await?;

            if response.has_tool_calls() {
                info!(
                    tool_count = response.tool_calls.len(),
                    tools = ?response.tool_calls.iter().map(|t| &t.function.name).collect::<Vec<_>>(),
                    "Model requested tool calls"
                );

                conversation.push(ChatMessage::assistant_tool_calls(
                    response.content.clone(),
                    response.tool_calls.clone(),
                ));
                for call in &response.tool_calls {
                    let invocation = self.tools.execute(call).await;
                    conversation.push(ChatMessage::tool(&call.id, invocation.output()));
                    invocations.push(invocation);
                }
                continue;
            }

            self.state = AgentState::Responding;
            let answer = response.content.trim().to_string();
            info!(iterations = iteration, answer_len = answer.len(), "Generated final answer");

            self.remember(input, &answer).await;

            return Ok(TurnOutcome {
                response: answer,
                invocations,
                context,
                iterations: iteration,
            });
        }

        error!(
            max_iterations = self.config.max_iterations,
            "Exceeded maximum iterations without a final answer"
        );
        Err(AgentError::MaxIterations(self.config.max_iterations))
    }

    async fn recall(&self, input: &str) -> Vec<Exchange> {
        if self.config.recall_k == 0 {
            return Vec::new();
        }
        match self.memory.recall(input, self.config.recall_k).await {
            Ok(context) => {
                debug!(recalled = context.len(), "Recalled context");
                context
            }
            Err(e) => {
                warn!(error = %e, "Recall failed; continuing without context");
                Vec::new()
            }
        }
    }

    async fn remember(&self, input: &str, answer: &str) {
        if let Err(e) = self.memory.remember(input, answer).await {
            warn!(error = %e, "Could not store exchange");
        }
    }

    fn conversation(&self, input: &str, context: &[Exchange]) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.config.system_prompt.clone())];
        if !context.is_empty() {
            let past = context
                .iter()
                .map(Exchange::as_context)
                .collect::<Vec<_>>()
                .join("\n\n");
            messages.push(ChatMessage::system(format!(
                "Context from past conversation:\n\n{past}"
            )));
        }
        messages.push(ChatMessage::user(input));
        messages
    }

    async fn llm_step(&self, conversation: &[ChatMessage]) -> AgentResult<ChatResponse> {
        let request = ChatRequest::new(conversation.to_vec())
            .with_tools(self.tools.definitions())
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        debug!(
            tool_count = request.tools.len(),
            message_count = request.messages.len(),
            "Calling LLM with tools"
        );

        let response = self.llm.chat(request).await?;

        debug!(
            content_length = response.content.len(),
            tool_call_count = response.tool_calls.len(),
            "LLM response received"
        );
        Ok(response)
    }
}
