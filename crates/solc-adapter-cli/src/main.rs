//! solc-adapter CLI - compile Solidity sources through whichever solc is installed
//!
//! This binary drives the `solc-adapter` library: it detects the toolchain,
//! feeds sources to it and reports the contracts it produced.

use clap::{Parser, Subcommand};
use solc_adapter::OutputKind;
use std::path::PathBuf;
use std::process::ExitCode;

use solc_adapter_cli::commands;
use solc_adapter_cli::commands::compile::{CompileArgs, DEFAULT_OUTPUTS};
use solc_adapter_cli::logging;
use solc_adapter_cli::toolchain::ToolchainArgs;

/// solc-adapter - Versioned Solidity compiler driver
#[derive(Parser)]
#[command(name = "solc-adapter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// System solc binary name or path (default: solc, or SOLC_ADAPTER_BINARY)
    #[arg(long, global = true)]
    solc: Option<String>,

    /// Bundled fallback binary (default: <exe dir>/native/solc)
    #[arg(long, global = true)]
    bundled: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile Solidity files or directories of them
    Compile {
        /// Source files or directories (searched recursively for *.sol)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory imports are resolved against
        #[arg(long)]
        base_path: Option<PathBuf>,

        /// Extra directory solc may read imports from (repeatable)
        #[arg(long = "allow-path")]
        allow_paths: Vec<PathBuf>,

        /// Comma-separated artifacts to request (bin, abi, interface, metadata)
        #[arg(long, value_delimiter = ',', default_value = DEFAULT_OUTPUTS)]
        outputs: Vec<OutputKind>,

        /// Directory to write <stem>.json combined output into
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Output a machine-readable JSON summary (no colored output)
        #[arg(long)]
        json: bool,

        /// Kill a compile after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Check which Solidity compiler would be used
    Doctor,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut toolchain = ToolchainArgs {
        solc: cli.solc,
        bundled: cli.bundled,
        timeout_secs: None,
    };

    let result = match cli.command {
        Commands::Compile {
            inputs,
            base_path,
            allow_paths,
            outputs,
            out_dir,
            json,
            timeout,
        } => {
            toolchain.timeout_secs = timeout;
            let args = CompileArgs {
                inputs,
                base_path,
                allow_paths,
                outputs,
                out_dir,
                json,
            };
            commands::compile::run(&args, &toolchain)
        }
        Commands::Doctor => commands::doctor::run(&toolchain),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
