#![forbid(unsafe_code)]

//! Rulestore CLI
//!
//! Resolves layered rule documents for a file context, and validates
//! document stores for CI.

use clap::{Parser, Subcommand};
use rulestore_cli::commands::{self, ResolveArgs, ValidateArgs};

/// Layered rule document resolution
#[derive(Parser, Debug)]
#[command(name = "rulestore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the rule set for a query context
    Resolve(ResolveArgs),
    /// Check a document store for structural problems
    Validate(ValidateArgs),
}

#[tokio::main]
async fn main() {
    // The tracing-log bridge picks up the engine's `log` records too
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Resolve(args) => commands::run_resolve(args).await,
        Command::Validate(args) => commands::run_validate(args).await,
    };

    match outcome {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {}: {err}", err.code());
            std::process::exit(err.exit_code());
        }
    }
}
