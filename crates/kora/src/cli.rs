//! Command-line arguments

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Kora assistant
#[derive(Debug, Parser)]
#[command(name = "kora")]
#[command(about = "Kora - conversational assistant with tools and memory", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./kora.toml when present)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of the persisted memory index
    #[arg(long, global = true)]
    pub index_dir: Option<PathBuf>,

    /// Model to use for chat completions
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand (interactive chat when omitted)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Interactive chat loop
    Chat,

    /// Serve the chat over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: SocketAddr,
    },

    /// List the functions the tool agents offer
    Tools,
}

impl Cli {
    /// The selected command, `chat` by default
    pub fn selected(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn chat_is_the_default() {
        let cli = Cli::parse_from(["kora"]);
        assert_eq!(cli.selected(), Command::Chat);
        assert!(cli.index_dir.is_none());
    }

    #[test]
    fn serve_with_flags() {
        let cli = Cli::parse_from([
            "kora",
            "serve",
            "--addr",
            "0.0.0.0:9000",
            "--model",
            "llama-3.1-8b-instant",
            "--index-dir",
            "/var/lib/kora",
        ]);
        assert_eq!(
            cli.selected(),
            Command::Serve {
                addr: "0.0.0.0:9000".parse().unwrap()
            }
        );
        assert_eq!(cli.model.as_deref(), Some("llama-3.1-8b-instant"));
        assert_eq!(cli.index_dir, Some(PathBuf::from("/var/lib/kora")));
    }
}
