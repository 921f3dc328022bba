use anyhow::Context;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sardonic_core::SardonicConfig;
use sardonic_gateway::GatewayServer;
use sardonic_reasoning::{ChatReply, ChatRequest, ResponseEngine};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const TERMINAL_USER: &str = "terminal";
const PROMPT: &str = "> ";

#[derive(Parser, Debug)]
#[command(name = "sardonic", author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "sardonic.toml", env = "SARDONIC_CONFIG")]
    config: PathBuf,

    /// Song catalog JSON, overriding the config file
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Serve the HTTP gateway instead of the interactive prompt
    #[arg(long)]
    serve: bool,

    /// Gateway port, overriding the config file
    #[arg(short, long)]
    port: Option<u16>,

    /// Seed for template and recommendation choices
    #[arg(long)]
    seed: Option<u64>,

    /// Answer one message and exit
    #[arg(short, long)]
    message: Option<String>,

    /// Print replies as JSON
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Also write daily-rotated log files to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

/// Console logs go to stderr so replies on stdout stay clean.
fn init_logging(default_level: &str, json: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json).then(|| fmt::layer().with_writer(std::io::stderr));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "sardonic.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .init();
    guard
}

fn print_reply(reply: &ChatReply, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(reply)?);
    } else {
        println!("\nMr. Sarcastic: {}", reply.response);
        println!(
            "  [{} | {} | {} | {:.2}]\n",
            reply.intent_detected, reply.mood_detected, reply.source, reply.confidence
        );
    }
    Ok(())
}

async fn run_repl(engine: &ResponseEngine, as_json: bool) -> anyhow::Result<()> {
    let mut rl = DefaultEditor::new().context("Failed to start line editor")?;
    println!("Mr. Sarcastic is online. Type /status, /history, /clear, or quit.");

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                error!("Readline error: {}", e);
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(trimmed);

        match trimmed {
            "quit" | "exit" => break,
            "/status" => {
                let status = engine.status().await;
                println!("{}", serde_json::to_string_pretty(&status)?);
            }
            "/history" => {
                for turn in engine.history(TERMINAL_USER).await {
                    println!("you: {}\nbot: {}", turn.user_text, turn.bot_text);
                }
            }
            "/clear" => {
                engine.clear_history(TERMINAL_USER).await;
                println!("History cleared.");
            }
            message => {
                let request = ChatRequest::new(message).for_user(TERMINAL_USER);
                match engine.respond(request).await {
                    Ok(reply) => print_reply(&reply, as_json)?,
                    Err(e) => println!("\n[Rejected]: {}\n", e),
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let default_level = if args.serve { "info" } else { "warn" };
    let _log_guard = init_logging(default_level, args.log_json, args.log_dir.as_deref());

    let mut config = SardonicConfig::load_or_default(&args.config);
    if let Some(catalog) = args.catalog {
        config.catalog.path = Some(catalog);
    }
    if let Some(seed) = args.seed {
        config.engine.seed = Some(seed);
    }
    if let Some(port) = args.port {
        config.gateway.port = port;
    }

    let engine = Arc::new(ResponseEngine::from_config(&config)?);

    if let Some(message) = args.message {
        let reply = engine.respond(ChatRequest::new(message)).await?;
        return print_reply(&reply, args.json);
    }

    if args.serve {
        info!("Starting gateway on {}:{}", config.gateway.host, config.gateway.port);
        return GatewayServer::new(engine, &config.gateway.host, config.gateway.port)
            .run()
            .await;
    }

    run_repl(&engine, args.json).await
}
