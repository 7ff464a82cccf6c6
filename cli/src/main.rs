//! Meridian shell - terminal client for Meridian database servers
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode
//! meridian -s http://127.0.0.1:5654 -u sys
//!
//! # Execute one command and exit
//! meridian show tables
//! ```

use std::time::Duration;

use clap::Parser;

use meridian_cli::executor::LinkExecutor;
use meridian_cli::history::CommandHistory;
use meridian_cli::session::{ReadlineSource, SessionOptions};
use meridian_cli::{Actor, Result, ShellConfig, ShellSession, ShellState};
use meridian_link::{Credentials, LinkClient};

mod args;

use args::Cli;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5654";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "warn" }),
    )
    .init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("✗ {}", err);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let config = ShellConfig::load(&cli.config)?;
    let server = config.resolved_server();
    let ui = config.resolved_ui();

    let server_url = cli
        .server
        .or(server.url)
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
    let actor = Actor::resolve(cli.user, cli.password);
    let timeout = Duration::from_secs(cli.timeout.unwrap_or(server.timeout));

    let client = LinkClient::builder()
        .base_url(&server_url)
        .timeout(timeout)
        .credentials(Credentials::new(&actor.user, &actor.password))
        .build()?;

    let options = SessionOptions {
        color: !cli.no_color && ui.color,
        spinner: !cli.no_spinner && ui.spinner,
        timing: cli.timing || ui.timing,
    };
    let mut session = ShellSession::new(
        LinkExecutor::new(client),
        CommandHistory::new(ui.history_size),
        options,
    );
    let mut state = ShellState::new(actor);
    let mut lines = ReadlineSource::new()?;

    if let Some(command) = assemble_command(&cli.args) {
        return session.process_once(&mut state, &mut lines, &command).await;
    }

    print_banner(&server_url, &state);
    session.run(&mut state, &mut lines).await
}

/// Re-assemble passthrough arguments into a single command line, quoting
/// arguments that contain whitespace.
fn assemble_command(args: &[String]) -> Option<String> {
    if args.is_empty() {
        return None;
    }

    let quoted: Vec<String> = args
        .iter()
        .map(|arg| {
            if arg.contains(char::is_whitespace) {
                format!("\"{}\"", arg)
            } else {
                arg.clone()
            }
        })
        .collect();

    let command = quoted.join(" ").trim().to_string();
    if command.is_empty() {
        None
    } else {
        Some(command)
    }
}

fn print_banner(server_url: &str, state: &ShellState) {
    println!("meridian shell v{}", env!("CARGO_PKG_VERSION"));
    println!("connected to {} as {}", server_url, state.actor.user);
    println!("statements end with ';', type 'exit' to leave");
    println!();
}
