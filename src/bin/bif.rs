//! bif — bifrost CLI client.
//!
//! Sends a single generate or stream request over the bridge socket and
//! prints the result. Control and test interface for bifrostd.

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;

/// Bifrost CLI client
#[derive(Parser)]
#[command(name = "bif")]
#[command(version)]
#[command(about = "Bifrost LLM bridge client")]
struct Args {
    /// Bridge address
    #[arg(
        short,
        long,
        env = "BIFROST_ADDRESS",
        default_value = "ws://127.0.0.1:3001"
    )]
    address: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Request a full completion and print it
    Generate {
        /// The prompt to send
        prompt: String,
        /// Model to use (server default when omitted)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Stream a completion token by token
    Stream {
        /// The prompt to send
        prompt: String,
        /// Model to use (server default when omitted)
        #[arg(short, long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let (kind, prompt, model) = match &args.command {
        Command::Generate { prompt, model } => ("llm.generate", prompt, model),
        Command::Stream { prompt, model } => ("llm.stream", prompt, model),
    };

    let (mut ws, _) = connect_async(args.address.as_str()).await?;

    let id = format!("bif-{}", std::process::id());
    let mut request = json!({ "id": id, "type": kind, "prompt": prompt });
    if let Some(model) = model {
        request["model"] = json!(model);
    }
    ws.send(WsMessage::Text(request.to_string())).await?;

    while let Some(message) = ws.next().await {
        let WsMessage::Text(text) = message? else {
            continue;
        };
        let reply: Value = serde_json::from_str(&text)?;

        if let Some(error) = reply.get("error").and_then(Value::as_str) {
            eprintln!("Error: {error}");
            let _ = ws.close(None).await;
            return Ok(ExitCode::FAILURE);
        }
        if let Some(data) = reply.get("data").and_then(Value::as_str) {
            println!("{data}");
            break;
        }
        if let Some(chunk) = reply.get("chunk").and_then(Value::as_str) {
            print!("{chunk}");
            std::io::stdout().flush()?;
        }
        if reply.get("done").is_some() {
            println!();
            break;
        }
    }

    let _ = ws.close(None).await;
    Ok(ExitCode::SUCCESS)
}
