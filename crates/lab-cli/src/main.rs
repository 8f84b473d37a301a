// crates/lab-cli/src/main.rs - CLI Application Entry Point
//
// ARCHITECTURE OVERVIEW:
// ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────────┐
// │   User Input    │───▶│   CLI Parser     │───▶│  Command Handlers   │
// │ (clap commands) │    │   (cli.rs)       │    │  (commands/*.rs)    │
// └─────────────────┘    └──────────────────┘    └─────────────────────┘
//                                 │                        │
//                                 ▼                        ▼
//                        ┌──────────────────┐    ┌─────────────────────┐
//                        │     Context      │    │     Services        │
//                        │ (config + repo)  │    │ (git, editor, http) │
//                        └──────────────────┘    └─────────────────────┘
//
// Note composition and threading live in lab-core; this crate supplies the
// real git, editor and GitLab implementations and the terminal output.
// `main` is the only place the process exits with an error status.
//
// EXAMPLE USAGE:
// ```bash
// lab mr note 42 -m "LGTM"                 # top-level note on !42 of origin
// lab issue reply upstream 7:1337 --quote  # reply in the thread of note 1337
// lab mr show 42 --comments --since 2020-08-21
// ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod context;
mod services;

use cli::{Cli, Commands, IssueCommands, MrCommands};
use context::Context;
use lab_core::ContainerKind;

/// Environment variable holding a tracing filter directive
const LOG_ENV: &str = "LAB_LOG";

fn main() -> Result<()> {
    // Parse command-line arguments using clap's derive API
    // Usage errors exit here with clap's own message and status
    let cli = Cli::parse();

    // Logging goes to stderr only; stdout stays clean for the note URL
    init_tracing(cli.verbose);

    // Locate the repository and resolve the layered configuration once.
    // Handlers get everything else (forge client, editor) from the context
    let ctx = Context::new(cli.config)?;

    // Dispatch to the command handler; issue and MR notes share one handler
    // and differ only in the container kind
    match cli.command {
        Commands::Issue(IssueCommands::Note(args)) => {
            commands::note::handle(&ctx, ContainerKind::Issue, args)
        }
        Commands::Mr(MrCommands::Note(args)) => {
            commands::note::handle(&ctx, ContainerKind::MergeRequest, args)
        }
        Commands::Mr(MrCommands::Show(args)) => commands::mr::show(&ctx, args),
    }
}

/// Log to stderr so stdout carries only command output
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ERROR REPORTING:
//
// Handlers and services return errors instead of exiting. Library errors
// (lab-core's thiserror enums) are converted into anyhow::Error at the
// command boundary and gain context on the way up, so returning Err from
// main prints the whole chain:
//
//   Error: failed to load configuration
//
//   Caused by:
//       Invalid configuration value: Invalid host 'gitlab.example.org'. ...
//
// and the process exits with status 1. Nothing below main calls
// std::process::exit, which keeps every command testable in-process.
