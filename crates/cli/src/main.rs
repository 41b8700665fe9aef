//! homehub CLI, the main entry point.
//!
//! Commands:
//! - `init`   Write a default config file
//! - `serve`  Start the HTTP gateway
//! - `ask`    Run a single exchange from the terminal
//! - `tools`  List the tool catalog
//! - `status` Show the effective configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "homehub",
    about = "homehub: a tool-calling household assistant",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init,

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask the assistant one thing
    Ask {
        /// The utterance to send
        #[arg(short, long)]
        message: String,
    },

    /// List the tools the assistant can call
    Tools,

    /// Show the effective configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Init => commands::init::run()?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask { message } => commands::ask::run(&message).await?,
        Commands::Tools => commands::tools::run()?,
        Commands::Status => commands::status::run()?,
    }

    Ok(())
}
