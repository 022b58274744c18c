mod support;

use kora::repl;
use kora_llm::LlmError;
use support::{orchestrator, text};

async fn run(agent: &mut kora_agent::Orchestrator, input: &str) -> String {
    let mut output = Vec::new();
    repl::run(agent, input.as_bytes(), &mut output).await.unwrap();
    String::from_utf8(output).unwrap()
}

#[tokio::test]
async fn answers_queries_until_exit() {
    let mut agent = orchestrator(vec![text("Hello! How can I help?")], None).await;

    let output = run(&mut agent, "hi there\nexit\nnever read\n").await;

    assert!(output.contains("Assistant: Hello! How can I help?"));
    assert!(output.contains("Ending conversation..."));
    assert_eq!(agent.memory().len(), 1);
}

#[tokio::test]
async fn clear_empties_memory() {
    let mut agent = orchestrator(vec![text("Noted."), text("I don't know your name.")], None).await;

    let output = run(&mut agent, "My name is Ada\nclear\nWhat is my name?\nq\n").await;

    assert!(output.contains("Conversation history cleared."));
    let stored = agent.memory().exchanges();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].query, "What is my name?");
    assert!(agent
        .memory()
        .recall("My name is Ada", 3)
        .await
        .unwrap()
        .iter()
        .all(|e| e.query != "My name is Ada"));
}

#[tokio::test]
async fn failed_turn_apologizes_and_continues() {
    let mut agent = orchestrator(
        vec![Err(LlmError::api(503, "overloaded")), text("Back online.")],
        None,
    )
    .await;

    let output = run(&mut agent, "first\nsecond\n").await;

    assert!(output.contains("Sorry, something went wrong"));
    assert!(output.contains("Assistant: Back online."));
}

#[tokio::test]
async fn end_of_input_saves_the_index() {
    let dir = tempfile::tempdir().unwrap();
    let mut agent = orchestrator(vec![text("Saved answer.")], Some(dir.path())).await;

    run(&mut agent, "remember me").await;

    let reopened = orchestrator(vec![], Some(dir.path())).await;
    let stored = reopened.memory().exchanges();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].response, "Saved answer.");
}

#[tokio::test]
async fn blank_lines_are_ignored() {
    let mut agent = orchestrator(vec![], None).await;

    let output = run(&mut agent, "\n   \nexit\n").await;

    assert!(!output.contains("Assistant:"));
    assert!(agent.memory().is_empty());
}
