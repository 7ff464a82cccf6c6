use clap::Parser;
use std::path::PathBuf;

/// Meridian shell - interactive SQL terminal for Meridian database servers
#[derive(Parser, Debug)]
#[command(name = "meridian")]
#[command(version)]
#[command(about = "Interactive SQL terminal for Meridian", long_about = None)]
pub struct Cli {
    /// Server base URL (e.g., http://127.0.0.1:5654)
    #[arg(short = 's', long = "server")]
    pub server: Option<String>,

    /// User name (default: $MERIDIAN_USER or "sys")
    #[arg(short = 'u', long = "user")]
    pub user: Option<String>,

    /// Password (default: $MERIDIAN_PASSWORD or "manager")
    #[arg(long = "password")]
    pub password: Option<String>,

    /// Configuration file path
    #[arg(long = "config", default_value = "~/.meridian/config.toml")]
    pub config: PathBuf,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Disable the execution spinner
    #[arg(long = "no-spinner")]
    pub no_spinner: bool,

    /// Print elapsed time after each query
    #[arg(short = 'T', long = "timing")]
    pub timing: bool,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Command to execute without entering the interactive shell
    #[arg(value_name = "ARGS", trailing_var_arg = true)]
    pub args: Vec<String>,
}
