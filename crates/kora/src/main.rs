use anyhow::Context;
use clap::Parser;
use kora::cli::{Cli, Command};
use kora::{app, repl, server, telemetry, AppConfig};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    telemetry::init(cli.log_json);

    let config = AppConfig::load(cli.config.as_deref())
        .context("cannot load configuration")?
        .with_overrides(cli.index_dir.clone(), cli.model.clone());

    match cli.selected() {
        Command::Tools => list_tools(&config),
        Command::Chat => {
            let mut agent = app::build_orchestrator(&config).await?;
            repl::run(
                &mut agent,
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
            )
            .await
        }
        Command::Serve { addr } => {
            let agent = app::build_orchestrator(&config).await?;
            server::serve(agent, addr).await
        }
    }
}

fn list_tools(config: &AppConfig) -> anyhow::Result<()> {
    let registry = config.tools.build_registry()?;
    for definition in registry.definitions() {
        let kind = registry
            .route(definition.name())
            .map(|k| k.as_str())
            .unwrap_or("-");
        println!(
            "{kind:<10} {:<22} {}",
            definition.name(),
            definition.function.description
        );
    }
    Ok(())
}
