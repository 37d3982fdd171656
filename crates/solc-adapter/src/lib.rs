//! solc Adapter
//!
//! This crate drives the Solidity compiler (`solc`) as a subprocess and turns
//! its process-level outcome into a [`CompilerResult`] that a binding
//! generator or build integration can consume.
//!
//! # Overview
//!
//! A compile goes through four stages:
//!
//! 1. **Version probe** - `solc --version` is run once and the first
//!    `major.minor.patch` in its banner becomes the cached [`VersionTriple`]
//! 2. **Command synthesis** - an argument vector is built for the detected
//!    version; flags older releases do not understand are left out
//! 3. **Process execution** - the source is fed on stdin while stdout and
//!    stderr are drained concurrently
//! 4. **Result aggregation** - exit status and captured streams become a
//!    [`CompilerResult`]
//!
//! # Example
//!
//! ```no_run
//! use solc_adapter::{CompileOptions, OutputKind, SolidityCompiler};
//!
//! let compiler = SolidityCompiler::instance().expect("solc not available");
//! println!("solc {}", compiler.version());
//!
//! let source = std::fs::read("contracts/Greeter.sol").unwrap();
//! let result = compiler.compile(
//!     &source,
//!     &CompileOptions::new([OutputKind::Abi, OutputKind::Bin]),
//! );
//!
//! if result.is_failed() {
//!     eprintln!("{}", result.errors);
//! } else {
//!     let combined = result.combined().unwrap();
//!     for name in combined.contract_names() {
//!         println!("compiled {}", name);
//!     }
//! }
//! ```
//!
//! # Toolchain Resolution
//!
//! The compiler is looked up in this order, once per process:
//!
//! 1. `solc` (or `SOLC_ADAPTER_BINARY`) on the system PATH
//! 2. The bundled binary at `SOLC_ADAPTER_BUNDLED_PATH`, or
//!    `native/solc` next to the running executable
//!
//! When the bundled binary is used, its directory is exported to the child
//! through the platform's library search path variable.
//!
//! # Version Gates
//!
//! | Flag | Emitted when |
//! |------|--------------|
//! | `--allow-paths=<dir>/` | version > 0.4.11 and allowed paths were given |
//!
//! # Crate Structure
//!
//! - [`version`] - Version probing and parsing
//! - [`command`] - Command-line synthesis
//! - [`process`] - Subprocess execution
//! - [`compiler`] - The process-wide facade
//! - [`location`] - System vs bundled toolchain
//! - [`config`] - Discovery configuration
//! - [`combined`] - Typed `--combined-json` output
//! - [`error`] - Error types

pub mod combined;
pub mod command;
pub mod compiler;
pub mod config;
pub mod error;
pub mod location;
pub mod output;
pub mod process;
pub mod result;
pub mod version;

// Re-export main types at crate root
pub use combined::{CombinedOutput, ContractArtifacts};
pub use command::{build_invocation, CompileOptions, CompilerInvocation};
pub use compiler::SolidityCompiler;
pub use config::CompilerConfig;
pub use error::{ToolchainError, ToolchainResult};
pub use location::ToolchainLocation;
pub use output::OutputKind;
pub use process::{run_process, ProcessOutput, RunStatus};
pub use result::CompilerResult;
pub use version::{parse_version_output, probe_version, VersionTriple};
