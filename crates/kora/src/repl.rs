//! Interactive chat loop

use kora_agent::Orchestrator;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

/// What a line of input asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Forget the conversation
    Clear,
    /// Save and leave
    Exit,
    /// Blank line
    Empty,
    /// Anything else goes to the assistant
    Query(&'a str),
}

impl<'a> Command<'a> {
    /// Classify a line; control words are case-insensitive
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        match line.to_ascii_lowercase().as_str() {
            "clear" => Self::Clear,
            "exit" | "quit" | "q" => Self::Exit,
            _ => Self::Query(line),
        }
    }
}

async fn say<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await
}

async fn save(agent: &Orchestrator) {
    if let Err(e) = agent.memory().save().await {
        warn!(error = %e, "Could not save memory index");
    }
}

/// Run the chat until `exit` or end of input.
///
/// A failed turn prints an apology and the loop keeps going.
pub async fn run<R, W>(agent: &mut Orchestrator, input: R, mut output: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    say(
        &mut output,
        "Kora is ready. Type 'clear' to forget the conversation, 'exit' to leave.\n",
    )
    .await?;

    loop {
        say(&mut output, "\nYou: ").await?;

        let Some(line) = lines.next_line().await? else {
            save(agent).await;
            say(&mut output, "\n").await?;
            break;
        };

        match Command::parse(&line) {
            Command::Empty => continue,
            Command::Exit => {
                save(agent).await;
                say(&mut output, "Memory saved.\nEnding conversation...\n").await?;
                break;
            }
            Command::Clear => match agent.reset().await {
                Ok(()) => say(&mut output, "Conversation history cleared.\n").await?,
                Err(e) => {
                    warn!(error = %e, "Clear failed");
                    say(&mut output, &format!("Could not clear history: {e}\n")).await?;
                }
            },
            Command::Query(query) => match agent.handle_turn(query).await {
                Ok(outcome) => {
                    say(&mut output, &format!("\nAssistant: {}\n", outcome.response)).await?;
                }
                Err(e) => {
                    warn!(error = %e, "Turn failed");
                    say(
                        &mut output,
                        &format!("\nAssistant: Sorry, something went wrong ({e}).\n"),
                    )
                    .await?;
                }
            },
        }
    }

    info!("Chat ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_words() {
        assert_eq!(Command::parse("clear"), Command::Clear);
        assert_eq!(Command::parse("  CLEAR \n"), Command::Clear);
        assert_eq!(Command::parse("exit"), Command::Exit);
        assert_eq!(Command::parse("Quit"), Command::Exit);
        assert_eq!(Command::parse("q"), Command::Exit);
        assert_eq!(Command::parse("   "), Command::Empty);
    }

    #[test]
    fn everything_else_is_a_query() {
        assert_eq!(
            Command::parse("  clear the table for me "),
            Command::Query("clear the table for me")
        );
        assert_eq!(Command::parse("quite"), Command::Query("quite"));
    }
}
