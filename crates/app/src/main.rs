//! Flowdeck - Main Entry Point
//!
//! Loads settings, installs logging on stderr and serves the stdio channel.

use flowdeck_infrastructure::SettingsRepository;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    println!("flowdeck {VERSION}");
    println!("Usage: flowdeck [--help] [--version]");
    println!();
    println!("Reads one JSON request per line on stdin:");
    println!("  {{\"id\": 1, \"channel\": \"get-app-version\", \"params\": {{}}}}");
    println!();
    println!("Channels:");
    println!("  execute-flow-test, stop-execution, get-version, get-app-version,");
    println!("  select-directory, select-file, read-file, write-file, save-test-suite,");
    println!("  convert-suite, validate-suite, send-request, list-environments,");
    println!("  save-environment, set-active-environment, get-history, clear-history,");
    println!("  list-workspaces, save-workspace, autosave-suite, restore-autosave,");
    println!("  clear-autosave");
    println!();
    println!("Environment:");
    println!("  RUST_LOG                  log filter (default: info)");
    println!("  FLOWDECK_DATA_DIR         storage directory");
    println!("  FLOWDECK_ENGINE_PROGRAM   program launching the test engine");
    println!("  FLOWDECK_ENGINE_PACKAGE   engine package passed to the program");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => println!("{VERSION}"),
            "--help" | "-h" => print_help(),
            other => {
                eprintln!("Unknown argument: {other}\n");
                print_help();
                std::process::exit(2);
            }
        }
        return Ok(());
    }

    // stdout carries the IPC channel
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let repository = SettingsRepository::new();
    let settings = repository.load().await?;
    tracing::info!(version = VERSION, engine = %settings.engine_program, "flowdeck starting");

    flowdeck::serve(tokio::io::stdin(), tokio::io::stdout(), settings).await
}
