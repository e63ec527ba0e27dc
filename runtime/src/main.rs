// Copyright 2026 Webcheck Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webcheck_runtime::batch::fixtures::Variant;
use webcheck_runtime::cli;
use webcheck_runtime::cli::verify_cmd::{PageArgs, SnapshotArgs, UrlArgs};

#[derive(Parser)]
#[command(
    name = "webcheck",
    about = "webcheck: verify web content against declarative constraints",
    version,
    after_help = "Run 'webcheck <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a GitHub issue-search URL
    Url(UrlArgs),
    /// Load an article page and verify its heading and infobox location
    Page(PageArgs),
    /// Verify a rental listing in a static HTML snapshot
    Snapshot(SnapshotArgs),
    /// Run a regression suite and save the results
    Batch {
        /// Which verifier to drive
        #[arg(value_enum)]
        variant: Variant,
        /// JSON suite file replacing the built-in cases
        #[arg(long)]
        suite: Option<PathBuf>,
        /// Results file (defaults to <variant>_results.json)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Fetch live pages over HTTP instead of rendering in Chromium
        #[arg(long)]
        http_only: bool,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_json);

    let result = match cli.command {
        Commands::Url(args) => cli::verify_cmd::run_url(&args, cli.json),
        Commands::Page(args) => cli::verify_cmd::run_page(&args, cli.json).await,
        Commands::Snapshot(args) => cli::verify_cmd::run_snapshot(&args, cli.json),
        Commands::Batch {
            variant,
            suite,
            output,
            http_only,
        } => {
            cli::batch_cmd::run(variant, suite.as_deref(), output.as_deref(), http_only).await
        }
        Commands::Doctor => cli::doctor::run(cli.json).await,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "webcheck", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        if cli.json {
            let err = serde_json::json!({ "error": format!("{e:#}") });
            eprintln!("{err}");
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }

    Ok(())
}
