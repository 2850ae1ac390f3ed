//! radio-bridge - Main Entry Point
//!
//! Reads bridge commands line by line from a script file or stdin and prints
//! every reply and event coming back from the bridge worker.

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use radio_bridge::{
    backend::{BridgeBackend, BridgeCommand, BridgeMessage},
    config::BridgeConfig,
    script,
};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "radio-bridge", version, about = "Drive a pipe-controlled radio backend")]
struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Script to execute instead of reading stdin
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Do not launch the backend process
    #[arg(long)]
    no_launch: bool,

    /// Print events as JSON lines
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => BridgeConfig::load_or_default(),
    };
    if args.no_launch {
        config.backend.launch = false;
    }

    tracing::info!("Starting radio-bridge");

    let (backend, handle) = BridgeBackend::new(config);
    let worker = std::thread::Builder::new()
        .name("bridge-worker".to_string())
        .spawn(move || backend.run())
        .context("Failed to spawn bridge worker")?;

    let json = args.json;
    let events = handle.receiver.clone();
    let printer = std::thread::Builder::new()
        .name("bridge-printer".to_string())
        .spawn(move || {
            for msg in events.iter() {
                let done = msg == BridgeMessage::Shutdown;
                print_message(&msg, json);
                if done {
                    break;
                }
            }
        })
        .context("Failed to spawn printer")?;

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(
            std::fs::File::open(path)
                .with_context(|| format!("Failed to open script {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(std::io::stdin())),
    };
    let fail_fast = args.script.is_some();

    let result = feed_commands(input, &handle.command_sender, fail_fast);

    // Always stop the worker, even when the script was bad
    handle.shutdown();
    if worker.join().is_err() {
        tracing::error!("Bridge worker panicked");
    }
    if printer.join().is_err() {
        tracing::error!("Printer thread panicked");
    }

    tracing::info!("Shutting down...");
    result
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info,radio_bridge=debug",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn feed_commands(
    input: Box<dyn BufRead>,
    commands: &crossbeam_channel::Sender<BridgeCommand>,
    fail_fast: bool,
) -> anyhow::Result<()> {
    for (index, line) in input.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        let cmd = match script::parse_line(index + 1, &line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) if fail_fast => return Err(e.into()),
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        let quit = matches!(cmd, BridgeCommand::Shutdown);
        if commands.send(cmd).is_err() || quit {
            break;
        }
    }
    Ok(())
}

fn print_message(msg: &BridgeMessage, json: bool) {
    let now = Local::now();

    if json {
        match serde_json::to_value(msg) {
            Ok(mut value) => {
                value["time"] = now.to_rfc3339().into();
                println!("{}", value);
            }
            Err(e) => tracing::error!("Failed to encode message: {}", e),
        }
        return;
    }

    let stamp = now.format("%H:%M:%S%.3f");
    match msg {
        BridgeMessage::Received { message } => println!("[{}] received: {}", stamp, message),
        BridgeMessage::Fault { message, .. } => println!("[{}] error: {}", stamp, message),
        BridgeMessage::Running { running } => println!("[{}] running: {}", stamp, running),
        BridgeMessage::Status { code, message, .. } => {
            println!("[{}] status: {} {}", stamp, code, message)
        }
        BridgeMessage::CommandFailed { command, error } => {
            println!("[{}] {} failed: {}", stamp, command, error)
        }
        BridgeMessage::Shutdown => println!("[{}] bridge stopped", stamp),
    }
}
