//! credo CLI - launcher for belief-mesh components.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

/// credo: belief-committed components on a datagram mesh
///
/// Each subcommand binds one component to a subsystem bus address and
/// polls it until the process is terminated.
#[derive(Debug, Parser)]
#[command(name = "credo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (can be repeated: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the belief store.
    ///
    /// Absorbs belief commits from every component on the mesh and
    /// answers snapshot polls with the full polarity map.
    Bls(commands::BlsArgs),

    /// Run a machine engine.
    ///
    /// Accepts definitions over the control plane and steps at most one
    /// transition per tick against the store's snapshots.
    Fsm(commands::FsmArgs),

    /// Run the transfer register file.
    Xfr(commands::XfrArgs),

    /// Show version information.
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::Bls(args) => commands::bls::execute(args, cli.config),
        Command::Fsm(args) => commands::fsm::execute(args, cli.config),
        Command::Xfr(args) => commands::xfr::execute(args, cli.config),
        Command::Version => {
            print_version();
            Ok(())
        }
    };

    result.map(|_| ExitCode::SUCCESS).unwrap_or_else(|err| {
        eprintln!("error: {err:#}");
        ExitCode::FAILURE
    })
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()))
        .init();
}

/// Print version information.
fn print_version() {
    println!("credo {}", env!("CARGO_PKG_VERSION"));
    println!("credo-core {}", credo_core::VERSION);
    println!();
    println!("Target: {}", std::env::consts::ARCH);
    println!("OS: {}", std::env::consts::OS);
}
