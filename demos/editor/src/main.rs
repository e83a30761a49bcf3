//! Console editor.
//!
//! Connects to a relay, tracks dancer status, and sends playback commands
//! typed on stdin:
//!
//!   play [json]   start playback, optional payload
//!   pause | stop  pause or stop playback
//!   status        print dancer and playback state
//!   quit          disconnect and exit
//!
//!   cargo run -p showlink-demo-editor -- --relay ws://localhost:8080 --name booth

mod store;

use anyhow::Context;
use clap::Parser;
use showlink_client::{Command, ConnectionManager, EditorConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use store::Store;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "editor", about = "Show-control editor console")]
struct Args {
    /// TOML config file.
    #[arg(long, env = "SHOWLINK_CONFIG")]
    config: Option<PathBuf>,
    /// Relay address, e.g. ws://localhost:8080.
    #[arg(long, env = "SHOWLINK_RELAY")]
    relay: Option<String>,
    /// Name announced to the relay (defaults to the host name).
    #[arg(long, env = "SHOWLINK_NAME")]
    name: Option<String>,
    /// Delay between reconnect attempts.
    #[arg(long)]
    retry_ms: Option<u64>,
    /// Board configuration (JSON) loaded once at startup.
    #[arg(long, env = "SHOWLINK_BOARD")]
    board: Option<PathBuf>,
}

impl Args {
    fn editor_config(&self) -> anyhow::Result<EditorConfig> {
        let mut config = match &self.config {
            Some(path) => EditorConfig::load(path)?,
            None => EditorConfig::default(),
        };
        if let Some(relay) = &self.relay {
            config.relay_url = relay.clone();
        }
        if let Some(name) = &self.name {
            config.name = name.clone();
        }
        if let Some(ms) = self.retry_ms {
            config.retry_delay = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("editor=info".parse()?)
                .add_directive("showlink_client=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = args.editor_config()?;
    let store = Arc::new(Store::default());

    if let Some(path) = &args.board {
        match load_board(path).await {
            Ok(board) => store.set_board(board),
            Err(e) => tracing::warn!("Board config unavailable: {:#}", e),
        }
    }

    tracing::info!("Editor '{}' using relay {}", config.name, config.relay_url);
    let mut manager = ConnectionManager::new(config, Arc::clone(&store));
    manager.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Some(Input::Send(command))) => {
                        if let Err(e) = manager.send(command) {
                            tracing::warn!("{}", e);
                        }
                    }
                    Ok(Some(Input::Status)) => {
                        println!("relay: {:?}", manager.state());
                        print!("{}", store.summary());
                    }
                    Ok(Some(Input::Quit)) => break,
                    Ok(None) => {}
                    Err(e) => eprintln!("{:#}", e),
                }
            }
        }
    }

    manager.stop().await;
    Ok(())
}

async fn load_board(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).context("parsing board config")
}

#[derive(Debug, PartialEq)]
enum Input {
    Send(Command),
    Status,
    Quit,
}

fn parse_command(line: &str) -> anyhow::Result<Option<Input>> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let input = match word {
        "" => return Ok(None),
        "play" => {
            let payload = if rest.trim().is_empty() {
                serde_json::json!({})
            } else {
                serde_json::from_str(rest).context("play payload must be JSON")?
            };
            Input::Send(Command::Play(payload))
        }
        "pause" => Input::Send(Command::Pause),
        "stop" => Input::Send(Command::Stop),
        "status" => Input::Status,
        "quit" | "exit" => Input::Quit,
        other => anyhow::bail!("unknown command: {}", other),
    };
    Ok(Some(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_commands() {
        assert_eq!(parse_command("  ").unwrap(), None);
        assert_eq!(
            parse_command("play {\"start\": 10}").unwrap(),
            Some(Input::Send(Command::Play(json!({"start": 10}))))
        );
        assert_eq!(
            parse_command("play").unwrap(),
            Some(Input::Send(Command::Play(json!({}))))
        );
        assert_eq!(parse_command("pause").unwrap(), Some(Input::Send(Command::Pause)));
        assert_eq!(parse_command("status").unwrap(), Some(Input::Status));
        assert!(parse_command("rewind").is_err());
        assert!(parse_command("play {oops").is_err());
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from(["editor", "--relay", "ws://relay:9000", "--retry-ms", "250"]);
        let config = args.editor_config().unwrap();
        assert_eq!(config.relay_url, "ws://relay:9000");
        assert_eq!(config.retry_delay, Duration::from_millis(250));
    }
}
