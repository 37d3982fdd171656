//! Compile command implementation
//!
//! Feeds each Solidity source to the detected toolchain and reports the
//! contracts it produced.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use solc_adapter::{CompileOptions, OutputKind, SolidityCompiler};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use crate::sources::{collect_sources, Source};
use crate::toolchain::ToolchainArgs;

/// Default `--outputs` when none are given.
pub const DEFAULT_OUTPUTS: &str = "abi,bin";

/// Arguments for the compile command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileArgs {
    pub inputs: Vec<PathBuf>,
    pub base_path: Option<PathBuf>,
    pub allow_paths: Vec<PathBuf>,
    pub outputs: Vec<OutputKind>,
    pub out_dir: Option<PathBuf>,
    pub json: bool,
}

impl CompileArgs {
    /// Request sent to the toolchain for every source.
    pub fn options(&self) -> CompileOptions {
        let mut options = CompileOptions::new(self.outputs.iter().copied());
        if let Some(ref base) = self.base_path {
            options = options.base_path(base);
        }
        if !self.allow_paths.is_empty() {
            options = options.allowed_paths(self.allow_paths.iter().cloned());
        }
        options
    }
}

/// Machine-readable summary printed with `--json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompileOutput {
    /// True if every source compiled.
    pub success: bool,
    /// Version of the toolchain that ran.
    pub compiler_version: String,
    /// Resolved path of the toolchain binary.
    pub compiler_path: String,
    pub results: Vec<SourceReport>,
}

/// Outcome for one source file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceReport {
    pub source: String,
    pub success: bool,
    /// Full `<source>:<contract>` keys found in the combined output.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contracts: Vec<String>,
    /// Artifact written under `--out-dir`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    /// Compiler diagnostics (warnings are kept on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
}

/// Run the compile command
///
/// # Returns
/// Exit code: 0 if every source compiled, 1 otherwise
pub fn run(args: &CompileArgs, toolchain: &ToolchainArgs) -> Result<ExitCode> {
    let start = Instant::now();
    let sources = collect_sources(&args.inputs)?;
    let compiler = toolchain.detect()?;

    if let Some(ref out_dir) = args.out_dir {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;
    }

    if !args.json {
        println!(
            "{} solc {} ({})",
            "Toolchain:".cyan().bold(),
            compiler.version(),
            compiler.location().resolved_path().display()
        );
    }

    let options = args.options();
    let mut reports = Vec::with_capacity(sources.len());
    for source in &sources {
        if !args.json {
            println!("{} {}", "Compiling:".cyan().bold(), source.path.display());
        }
        let report = compile_source(&compiler, source, &options, args.out_dir.as_deref())?;
        if !args.json {
            print_report(&report);
        }
        reports.push(report);
    }

    let success = reports.iter().all(|r| r.success);

    if args.json {
        let output = CompileOutput {
            success,
            compiler_version: compiler.version().to_string(),
            compiler_path: compiler.location().resolved_path().display().to_string(),
            results: reports,
        };
        let json = serde_json::to_string_pretty(&output).context("Failed to serialize output")?;
        println!("{}", json);
    } else {
        let failed = reports.iter().filter(|r| !r.success).count();
        println!();
        if success {
            println!(
                "{} {} source(s) compiled in {}ms",
                "SUCCESS".green().bold(),
                reports.len(),
                start.elapsed().as_millis()
            );
        } else {
            println!(
                "{} {} of {} source(s) failed",
                "FAILED".red().bold(),
                failed,
                reports.len()
            );
        }
    }

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Compiles one source and writes its artifact if requested.
///
/// The artifact lands at `<out_dir>/<relative source path>.json`, so sources
/// sharing a file name in different directories do not overwrite each other.
/// Compile failures are reported, not returned; only local I/O errors (the
/// source cannot be read, the artifact cannot be written) are errors.
pub fn compile_source(
    compiler: &SolidityCompiler,
    source: &Source,
    options: &CompileOptions,
    out_dir: Option<&Path>,
) -> Result<SourceReport> {
    let content = fs::read(&source.path)
        .with_context(|| format!("Failed to read source: {}", source.path.display()))?;

    let result = compiler.compile(&content, options);
    let mut report = SourceReport {
        source: source.path.display().to_string(),
        success: !result.is_failed(),
        contracts: Vec::new(),
        artifact: None,
        errors: non_empty(&result.errors),
    };

    if result.is_failed() {
        return Ok(report);
    }

    match result.combined() {
        Ok(combined) => report.contracts = combined.contracts.keys().cloned().collect(),
        Err(e) => {
            report.success = false;
            report.errors = Some(match report.errors.take() {
                Some(errors) => format!("{}\n{}", errors, e),
                None => e.to_string(),
            });
            return Ok(report);
        }
    }

    if let Some(out_dir) = out_dir {
        let path = out_dir.join(source.artifact_path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&path, &result.output)
            .with_context(|| format!("Failed to write artifact: {}", path.display()))?;
        report.artifact = Some(path.display().to_string());
    }

    Ok(report)
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn print_report(report: &SourceReport) {
    if report.success {
        for contract in &report.contracts {
            println!("  {} {}", "ok".green(), contract);
        }
        if let Some(ref artifact) = report.artifact {
            println!("  {} {}", "->".green(), artifact.dimmed());
        }
        if let Some(ref warnings) = report.errors {
            for line in warnings.lines() {
                println!("  {}", line.yellow());
            }
        }
    } else {
        println!("  {}", "compilation failed".red());
        if let Some(ref errors) = report.errors {
            for line in errors.lines() {
                println!("  {}", line.red());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use solc_adapter::{ToolchainLocation, VersionTriple};
    use tempfile::TempDir;

    fn missing_compiler() -> SolidityCompiler {
        SolidityCompiler::new(
            ToolchainLocation::system("solc-adapter-test-no-such-binary"),
            VersionTriple::new(0, 8, 19),
        )
    }

    #[test]
    fn test_options_from_args() {
        let args = CompileArgs {
            base_path: Some(PathBuf::from("contracts")),
            allow_paths: vec![PathBuf::from("lib")],
            outputs: vec![OutputKind::Abi, OutputKind::Bin],
            ..Default::default()
        };

        let expected = CompileOptions::new([OutputKind::Abi, OutputKind::Bin])
            .base_path("contracts")
            .allowed_paths([PathBuf::from("lib")]);
        assert_eq!(args.options(), expected);
    }

    #[test]
    fn test_no_allow_paths_leaves_option_unset() {
        let args = CompileArgs {
            outputs: vec![OutputKind::Abi],
            ..Default::default()
        };
        assert_eq!(args.options().allowed_paths, None);
    }

    #[test]
    fn test_missing_toolchain_reported_per_source() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Greeter.sol");
        fs::write(&path, "contract greeter {}").unwrap();
        let source = Source {
            path,
            relative: PathBuf::from("Greeter.sol"),
        };

        let report = compile_source(
            &missing_compiler(),
            &source,
            &CompileOptions::new([OutputKind::Abi]),
            Some(tmp.path()),
        )
        .unwrap();

        assert!(!report.success);
        assert!(report.contracts.is_empty());
        assert_eq!(report.artifact, None);
        assert!(report.errors.unwrap().contains("failed to launch"));
        assert!(!tmp.path().join("Greeter.json").exists());
    }

    #[test]
    fn test_unreadable_source_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = compile_source(
            &missing_compiler(),
            &Source {
                path: tmp.path().join("missing.sol"),
                relative: PathBuf::from("missing.sol"),
            },
            &CompileOptions::default(),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read source"));
    }

    #[test]
    fn test_report_json_omits_empty_fields() {
        let report = SourceReport {
            source: "Greeter.sol".to_string(),
            success: true,
            contracts: vec!["<stdin>:greeter".to_string()],
            artifact: None,
            errors: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "source": "Greeter.sol",
                "success": true,
                "contracts": ["<stdin>:greeter"],
            })
        );
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("\n"), None);
        assert_eq!(non_empty("Warning: x\n"), Some("Warning: x".to_string()));
    }
}
