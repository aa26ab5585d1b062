//! Command-line client for the exchange service.
//!
//! `submit`/`cancel` speak the engine's WebSocket command/event protocol
//! directly; `health`/`symbols`/`depth` hit the retained REST introspection
//! endpoints.

use clap::{Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;

#[derive(Parser)]
#[command(name = "hftx-cli")]
#[command(about = "HFT Ledger CLI - command line client for the exchange")]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    server: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new buy or sell limit order.
    Submit {
        #[arg(long, value_parser = parse_side)]
        side: Side,
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        price: u32,
        #[arg(short, long)]
        count: u32,
        #[arg(long)]
        order_id: u32,
    },
    /// Cancel a previously submitted order.
    Cancel {
        #[arg(long)]
        order_id: u32,
    },
    Health,
    Symbols,
    Depth {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long, default_value = "10")]
        levels: usize,
    },
}

#[derive(Clone, Copy)]
enum Side {
    Buy,
    Sell,
}

fn parse_side(s: &str) -> Result<Side, String> {
    match s.to_lowercase().as_str() {
        "buy" => Ok(Side::Buy),
        "sell" => Ok(Side::Sell),
        _ => Err(format!("invalid side: {s}. use 'buy' or 'sell'")),
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireCommand {
    Buy { order_id: u32, instrument: String, price: u32, count: u32 },
    Sell { order_id: u32, instrument: String, price: u32, count: u32 },
    Cancel { order_id: u32 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Submit { side, symbol, price, count, order_id } => {
            let command = match side {
                Side::Buy => WireCommand::Buy { order_id, instrument: symbol, price, count },
                Side::Sell => WireCommand::Sell { order_id, instrument: symbol, price, count },
            };
            send_command_and_print_events(&cli.server, &command).await?;
        }
        Commands::Cancel { order_id } => {
            send_command_and_print_events(&cli.server, &WireCommand::Cancel { order_id }).await?;
        }
        Commands::Health => {
            let response = reqwest::get(format!("{}/health", cli.server)).await?;
            print_json_body(response).await?;
        }
        Commands::Symbols => {
            let response = reqwest::get(format!("{}/symbols", cli.server)).await?;
            print_json_body(response).await?;
        }
        Commands::Depth { symbol, levels } => {
            let url = format!("{}/symbols/{}/depth?levels={}", cli.server, symbol, levels);
            let response = reqwest::get(url).await?;
            print_json_body(response).await?;
        }
    }

    Ok(())
}

async fn print_json_body(response: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    if response.status().is_success() {
        let value: serde_json::Value = response.json().await?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("error: {}", response.status());
    }
    Ok(())
}

/// Opens a fresh WebSocket session, sends one command, and prints every
/// event the engine emits in response. There is no explicit "done" frame
/// in the protocol, so this reads until the socket goes quiet for a short
/// grace period and then closes the connection.
async fn send_command_and_print_events(
    server: &str,
    command: &WireCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let ws_url = server.replacen("http://", "ws://", 1).replacen("https://", "wss://", 1) + "/sessions/ws";
    let (mut stream, _) = tokio_tungstenite::connect_async(ws_url).await?;

    let payload = serde_json::to_string(command)?;
    stream.send(Message::Text(payload)).await?;

    loop {
        match tokio::time::timeout(Duration::from_millis(300), stream.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => println!("{text}"),
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(err))) => {
                eprintln!("connection error: {err}");
                break;
            }
            Ok(None) => break,
            Err(_) => break, // quiet period elapsed, assume all events arrived
        }
    }

    let _ = stream.close(None).await;
    Ok(())
}
