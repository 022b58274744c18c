use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use kora_agent::{AgentConfig, AgentError, AgentState, Orchestrator};
use kora_llm::{ChatRequest, ChatResponse, LlmClient, LlmError, LlmResult, Role, ToolCall};
use kora_memory::{
    Embedding, EmbeddingProvider, HashEmbeddingProvider, MemoryError, MemoryResult, MemoryStore,
};
use kora_tools::{MathTool, ToolKind, ToolRegistry};
use parking_lot::Mutex;

/// LLM that replays queued responses and records what it was asked
struct ScriptedLlm {
    replies: Mutex<VecDeque<LlmResult<ChatResponse>>>,
    requests: Mutex<Vec<ChatRequest>>,
    fallback: Option<ChatResponse>,
}

impl ScriptedLlm {
    fn new(replies: Vec<LlmResult<ChatResponse>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            fallback: None,
        })
    }

    fn always(reply: ChatResponse) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            fallback: Some(reply),
        })
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat(&self, request: ChatRequest) -> LlmResult<ChatResponse> {
        self.requests.lock().push(request);
        match self.replies.lock().pop_front() {
            Some(reply) => reply,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| LlmError::InvalidResponse("script exhausted".into())),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

struct BrokenEmbedder;

#[async_trait]
impl EmbeddingProvider for BrokenEmbedder {
    async fn embed(&self, _text: &str) -> MemoryResult<Embedding> {
        Err(MemoryError::embedding("broken", "offline"))
    }

    fn model_name(&self) -> &str {
        "broken"
    }

    fn dimensions(&self) -> usize {
        8
    }
}

fn text(content: &str) -> LlmResult<ChatResponse> {
    Ok(ChatResponse::text(content, "scripted"))
}

fn tool_calls(calls: Vec<ToolCall>) -> ChatResponse {
    let mut response = ChatResponse::text("", "scripted");
    response.tool_calls = calls;
    response
}

fn memory() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::in_memory(Arc::new(HashEmbeddingProvider::new(16))))
}

fn orchestrator(llm: Arc<ScriptedLlm>, memory: Arc<MemoryStore>) -> Orchestrator {
    let tools = ToolRegistry::new().with_tool(MathTool::new());
    Orchestrator::new(llm, tools, memory, AgentConfig::default())
}

#[tokio::test]
async fn direct_answer_is_returned_and_remembered() {
    let llm = ScriptedLlm::new(vec![text("  Paris is the capital of France.  ")]);
    let memory = memory();
    let mut agent = orchestrator(llm.clone(), memory.clone());

    let outcome = agent.handle_turn("Capital of France?").await.unwrap();

    assert_eq!(outcome.response, "Paris is the capital of France.");
    assert_eq!(outcome.iterations, 1);
    assert!(outcome.invocations.is_empty());
    assert!(outcome.context.is_empty());
    assert_eq!(agent.state(), AgentState::AwaitingInput);

    let stored = memory.exchanges();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].query, "Capital of France?");
    assert_eq!(stored[0].response, "Paris is the capital of France.");

    let requests = llm.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].messages.len(), 2);
    assert_eq!(requests[0].messages[0].role, Role::System);
    assert_eq!(requests[0].messages[1].content, "Capital of France?");
    assert!(requests[0].tools.iter().any(|t| t.name() == "calculate"));
}

#[tokio::test]
async fn tool_results_are_fed_back_before_answering() {
    let llm = ScriptedLlm::new(vec![
        Ok(tool_calls(vec![ToolCall::new("call_1", "add", r#"{"a": 2, "b": 3}"#)])),
        text("2 + 3 = 5"),
    ]);
    let mut agent = orchestrator(llm.clone(), memory());

    let outcome = agent.handle_turn("What is 2 + 3?").await.unwrap();

    assert_eq!(outcome.response, "2 + 3 = 5");
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.invocations.len(), 1);
    let invocation = &outcome.invocations[0];
    assert_eq!(invocation.tool, Some(ToolKind::Math));
    assert_eq!(invocation.output(), "5");

    let second = &llm.requests()[1];
    let assistant = &second.messages[second.messages.len() - 2];
    assert_eq!(assistant.role, Role::Assistant);
    assert_eq!(assistant.tool_calls.as_ref().map(Vec::len), Some(1));

    let tool = second.messages.last().unwrap();
    assert_eq!(tool.role, Role::Tool);
    assert_eq!(tool.tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(tool.content, "5");
}

#[tokio::test]
async fn several_calls_in_one_step_run_in_order() {
    let llm = ScriptedLlm::new(vec![
        Ok(tool_calls(vec![
            ToolCall::new("a", "add", r#"{"a": 1, "b": 1}"#),
            ToolCall::new("b", "multiply", r#"{"a": 4, "b": 5}"#),
        ])),
        text("2 and 20"),
    ]);
    let mut agent = orchestrator(llm, memory());

    let outcome = agent.handle_turn("1+1 and 4*5").await.unwrap();

    let outputs: Vec<_> = outcome.invocations.iter().map(|i| i.output()).collect();
    assert_eq!(outputs, vec!["2", "20"]);
}

#[tokio::test]
async fn tool_failure_is_reported_to_the_model() {
    let llm = ScriptedLlm::new(vec![
        Ok(tool_calls(vec![ToolCall::new("call_x", "teleport", "{}")])),
        text("I can't do that."),
    ]);
    let mut agent = orchestrator(llm.clone(), memory());

    let outcome = agent.handle_turn("Teleport me").await.unwrap();

    assert_eq!(outcome.response, "I can't do that.");
    assert!(!outcome.invocations[0].is_success());
    assert_eq!(outcome.invocations[0].tool, None);

    let feedback = llm.requests()[1].messages.last().unwrap().content.clone();
    assert!(feedback.starts_with("Error:"), "{feedback}");
    assert!(feedback.contains("teleport"));
}

#[tokio::test]
async fn endless_tool_calls_hit_the_iteration_bound() {
    let llm = ScriptedLlm::always(tool_calls(vec![ToolCall::new(
        "loop",
        "add",
        r#"{"a": 1, "b": 1}"#,
    )]));
    let memory = memory();
    let tools = ToolRegistry::new().with_tool(MathTool::new());
    let config = AgentConfig::default().with_max_iterations(2);
    let mut agent = Orchestrator::new(llm.clone(), tools, memory.clone(), config);

    let err = agent.handle_turn("loop forever").await.unwrap_err();

    assert!(matches!(err, AgentError::MaxIterations(2)));
    assert_eq!(llm.requests().len(), 2);
    assert_eq!(agent.state(), AgentState::AwaitingInput);
    assert!(memory.is_empty());
}

#[tokio::test]
async fn zero_iteration_bound_from_config_still_answers() {
    let config: AgentConfig =
        serde_json::from_value(serde_json::json!({ "max_iterations": 0 })).unwrap();
    let llm = ScriptedLlm::new(vec![text("answered")]);
    let mut agent = Orchestrator::new(llm.clone(), ToolRegistry::new(), memory(), config);

    assert_eq!(agent.config().max_iterations, 1);
    let outcome = agent.handle_turn("hello").await.unwrap();
    assert_eq!(outcome.response, "answered");
    assert_eq!(llm.requests().len(), 1);
}

#[tokio::test]
async fn blank_input_is_rejected_without_calling_the_model() {
    let llm = ScriptedLlm::new(vec![]);
    let mut agent = orchestrator(llm.clone(), memory());

    let err = agent.handle_turn("   \n").await.unwrap_err();

    assert!(matches!(err, AgentError::EmptyInput));
    assert!(llm.requests().is_empty());
}

#[tokio::test]
async fn llm_failure_returns_to_awaiting_input() {
    let llm = ScriptedLlm::new(vec![Err(LlmError::api(401, "bad key"))]);
    let memory = memory();
    let mut agent = orchestrator(llm, memory.clone());

    let err = agent.handle_turn("hello").await.unwrap_err();

    assert!(matches!(err, AgentError::Llm(LlmError::Api { status: 401, .. })));
    assert_eq!(agent.state(), AgentState::AwaitingInput);
    assert!(memory.is_empty());
}

#[tokio::test]
async fn earlier_exchanges_are_given_as_context() {
    let memory = memory();
    memory
        .remember("My name is Ada", "Nice to meet you, Ada.")
        .await
        .unwrap();

    let llm = ScriptedLlm::new(vec![text("Your name is Ada.")]);
    let mut agent = orchestrator(llm.clone(), memory.clone());

    let outcome = agent.handle_turn("What is my name?").await.unwrap();

    assert_eq!(outcome.context.len(), 1);
    let messages = &llm.requests()[0].messages;
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, Role::System);
    assert!(messages[1].content.contains("User: My name is Ada"));
    assert!(messages[1].content.contains("Assistant: Nice to meet you, Ada."));
    assert_eq!(memory.len(), 2);
}

#[tokio::test]
async fn recall_is_bounded_by_recall_k() {
    let memory = memory();
    for i in 0..5 {
        memory.remember(&format!("q{i}"), &format!("a{i}")).await.unwrap();
    }

    let llm = ScriptedLlm::new(vec![text("ok")]);
    let tools = ToolRegistry::new();
    let config = AgentConfig::default().with_recall_k(2);
    let mut agent = Orchestrator::new(llm, tools, memory, config);

    let outcome = agent.handle_turn("q3").await.unwrap();

    assert_eq!(outcome.context.len(), 2);
    assert_eq!(outcome.context[0].query, "q3");
}

#[tokio::test]
async fn reset_forgets_everything() {
    let memory = memory();
    let llm = ScriptedLlm::new(vec![text("first"), text("second")]);
    let mut agent = orchestrator(llm.clone(), memory.clone());

    agent.handle_turn("remember this").await.unwrap();
    assert_eq!(memory.len(), 1);

    agent.reset().await.unwrap();
    assert!(memory.is_empty());

    let outcome = agent.handle_turn("remember this").await.unwrap();
    assert!(outcome.context.is_empty());
    assert_eq!(llm.requests()[1].messages.len(), 2);
}

#[tokio::test]
async fn memory_failure_does_not_fail_the_turn() {
    let memory = Arc::new(MemoryStore::in_memory(Arc::new(BrokenEmbedder)));
    let llm = ScriptedLlm::new(vec![text("still answering")]);
    let mut agent = orchestrator(llm, memory.clone());

    let outcome = agent.handle_turn("hello").await.unwrap();

    assert_eq!(outcome.response, "still answering");
    assert!(memory.is_empty());
}
