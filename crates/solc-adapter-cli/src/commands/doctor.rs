//! Doctor command implementation
//!
//! Reports which Solidity compiler would be used and what it supports.

use anyhow::Result;
use colored::Colorize;
use solc_adapter::error::describe_error_chain;
use solc_adapter::SolidityCompiler;
use std::process::ExitCode;

use crate::toolchain::ToolchainArgs;

/// Run the doctor command
///
/// Checks:
/// - Configuration from `SOLC_ADAPTER_*` and flags
/// - Toolchain location (system or bundled) and version
/// - Support for `--allow-paths`
///
/// # Returns
/// Exit code: 0 if a usable toolchain was found, 1 otherwise
pub fn run(toolchain: &ToolchainArgs) -> Result<ExitCode> {
    println!("{}", "solc-adapter doctor".cyan().bold());
    println!("{}", "===================".cyan());
    println!();

    println!("{}", "Versions:".bold());
    println!(
        "  {} solc-adapter v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    let config = match toolchain.config() {
        Ok(config) => config,
        Err(e) => {
            println!("{}", "Configuration:".bold());
            println!("  {} {:#}", "!!".red(), e);
            return Ok(ExitCode::from(1));
        }
    };

    println!("{}", "Configuration:".bold());
    println!(
        "  {} system binary: {}",
        "->".green(),
        config.system_binary.to_string_lossy()
    );
    match config.resolve_bundled_path() {
        Ok(path) => println!("  {} bundled fallback: {}", "->".green(), path.display()),
        Err(e) => println!("  {} bundled fallback: {}", "!!".yellow(), e),
    }
    if let Some(timeout) = config.timeout {
        println!("  {} timeout: {}s", "->".green(), timeout.as_secs());
    }
    println!();

    println!("{}", "Toolchain:".bold());
    let ok = match SolidityCompiler::detect(&config) {
        Ok(compiler) => {
            for line in describe(&compiler) {
                println!("  {} {}", "ok".green(), line);
            }
            true
        }
        Err(e) => {
            println!("  {} {}", "!!".red(), describe_error_chain(&e));
            println!(
                "     {}",
                "Install solc from https://docs.soliditylang.org/en/latest/installing-solidity.html"
                    .dimmed()
            );
            false
        }
    };

    println!();
    if ok {
        println!("{}", "All checks passed!".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}", "Some checks failed.".red().bold());
        Ok(ExitCode::from(1))
    }
}

/// Human-readable lines describing a detected toolchain.
pub fn describe(compiler: &SolidityCompiler) -> Vec<String> {
    let origin = if compiler.location().is_bundled() {
        "bundled"
    } else {
        "system"
    };
    vec![
        format!(
            "solc {} ({}, {})",
            compiler.version(),
            origin,
            compiler.location().resolved_path().display()
        ),
        format!(
            "--allow-paths {}",
            if compiler.supports_allow_paths() {
                "supported"
            } else {
                "not supported (solc <= 0.4.11)"
            }
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use solc_adapter::{ToolchainLocation, VersionTriple};

    #[test]
    fn test_describe_modern_system_toolchain() {
        let compiler = SolidityCompiler::new(
            ToolchainLocation::system("solc-adapter-test-no-such-binary"),
            VersionTriple::new(0, 8, 19),
        );
        let lines = describe(&compiler);
        assert!(lines[0].starts_with("solc 0.8.19 (system, "));
        assert_eq!(lines[1], "--allow-paths supported");
    }

    #[test]
    fn test_describe_old_toolchain() {
        let compiler = SolidityCompiler::new(
            ToolchainLocation::system("solc-adapter-test-no-such-binary"),
            VersionTriple::new(0, 4, 11),
        );
        assert_eq!(
            describe(&compiler)[1],
            "--allow-paths not supported (solc <= 0.4.11)"
        );
    }
}
