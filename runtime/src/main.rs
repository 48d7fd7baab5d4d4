// Copyright 2026 Feedtap Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use feedtap_runtime::cli;
use feedtap_runtime::config::{
    resolve_cookie, resolve_data_dir, CaptureConfig, DataPaths, DEFAULT_DWELL_SECS,
    DEFAULT_TARGET_URL,
};
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "feedtap",
    about = "Feedtap — capture a social timeline's GraphQL traffic and normalize it into posts",
    version,
    after_help = "Run 'feedtap <command> --help' for details on each command.\nRun 'feedtap' with no command to capture with the defaults."
)]
struct Cli {
    /// Directory holding the raw log and parsed output [env: FEEDTAP_DATA_DIR] [default: data]
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture responses from a live page, then parse the log
    Run(RunArgs),
    /// Parse the existing raw log without capturing
    Parse,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Page to open for capture
    #[arg(long, default_value = DEFAULT_TARGET_URL)]
    target_url: String,

    /// Seconds to keep the page open collecting responses
    #[arg(long, default_value_t = DEFAULT_DWELL_SECS)]
    dwell_secs: u64,

    /// Session cookie header, `name=value; name2=value2` [env: FEEDTAP_COOKIE]
    #[arg(long)]
    cookie: Option<String>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    headed: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            dwell_secs: DEFAULT_DWELL_SECS,
            cookie: None,
            headed: false,
        }
    }
}

impl RunArgs {
    fn into_config(self) -> CaptureConfig {
        CaptureConfig {
            target_url: self.target_url,
            dwell: Duration::from_secs(self.dwell_secs),
            cookie: resolve_cookie(self.cookie.as_deref()),
            headed: self.headed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let paths = DataPaths::new(&resolve_data_dir(cli.data_dir.as_deref()));

    let result = match cli.command {
        // No subcommand → full pipeline with defaults
        None => cli::run_cmd::run(&paths, &RunArgs::default().into_config()).await,

        Some(Commands::Run(args)) => cli::run_cmd::run(&paths, &args.into_config()).await,
        Some(Commands::Parse) => cli::parse_cmd::run(&paths).await.map(|_| ()),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "feedtap", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}
