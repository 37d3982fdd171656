//! Command-line synthesis for solc invocations.
//!
//! The synthesizer produces an argument vector, never a shell string. Flag
//! order is fixed: several of solc's flags are positional relative to the
//! trailing `-` that makes it read the source from stdin.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::error::ToolchainResult;
use crate::output::OutputKind;
use crate::version::VersionTriple;

/// Newest solc release that rejects `--allow-paths`.
pub const ALLOW_PATHS_UNSUPPORTED_UP_TO: VersionTriple = VersionTriple::new(0, 4, 11);

/// Remapping that aliases the empty import prefix to the working directory,
/// so a source read from stdin can still resolve relative imports.
pub const STDIN_REMAPPING: &str = "=./";

/// Argument that makes solc read the source from stdin.
pub const STDIN_SENTINEL: &str = "-";

/// A fully-resolved command line plus the directory to run it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerInvocation {
    args: Vec<OsString>,
    working_dir: Option<PathBuf>,
}

impl CompilerInvocation {
    /// Creates an invocation of `program` with the given arguments.
    pub fn new<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut all = vec![program.into()];
        all.extend(args.into_iter().map(Into::into));
        Self {
            args: all,
            working_dir: None,
        }
    }

    /// Sets the working directory for the child process.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// The program to run (argument 0).
    pub fn program(&self) -> &OsStr {
        &self.args[0]
    }

    /// Arguments after the program.
    pub fn arguments(&self) -> &[OsString] {
        &self.args[1..]
    }

    /// The complete argument vector, program included.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Working directory, if one was requested.
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Space-joined rendering for log output only.
    pub fn command_line(&self) -> String {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Per-call compile request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Directory imports are resolved against. When absent, the stdin
    /// remapping is emitted instead.
    pub base_path: Option<PathBuf>,
    /// Extra directories solc may read imports from.
    pub allowed_paths: Option<Vec<PathBuf>>,
    /// Requested artifacts, in the order they are passed to solc.
    pub outputs: Vec<OutputKind>,
}

impl CompileOptions {
    /// Creates options requesting the given artifacts.
    pub fn new(outputs: impl IntoIterator<Item = OutputKind>) -> Self {
        Self {
            outputs: outputs.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Sets the base path.
    pub fn base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Adds one allowed import directory.
    pub fn allow_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.allowed_paths
            .get_or_insert_with(Vec::new)
            .push(path.into());
        self
    }

    /// Replaces the allowed import directories.
    pub fn allowed_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.allowed_paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Appends one requested artifact.
    pub fn output(mut self, kind: OutputKind) -> Self {
        self.outputs.push(kind);
        self
    }
}

/// Builds the solc command line for a compile of stdin.
///
/// `--allow-paths` is only emitted for toolchains newer than
/// [`ALLOW_PATHS_UNSUPPORTED_UP_TO`]; older releases abort on the unknown
/// flag, so it is dropped here rather than left for solc to reject.
///
/// # Errors
/// Fails only when a base or allowed path cannot be made absolute.
pub fn build_invocation(
    program: &OsStr,
    version: VersionTriple,
    options: &CompileOptions,
) -> ToolchainResult<CompilerInvocation> {
    let mut args: Vec<OsString> = Vec::new();

    if version > ALLOW_PATHS_UNSUPPORTED_UP_TO {
        for dir in options.allowed_paths.iter().flatten() {
            args.push(allow_paths_arg(dir)?);
        }
    }

    if options.base_path.is_none() {
        args.push(STDIN_REMAPPING.into());
    }

    args.push("--optimize".into());
    args.push("--overwrite".into());
    args.push("--combined-json".into());
    args.push(OutputKind::join(&options.outputs).into());
    args.push(STDIN_SENTINEL.into());

    let invocation = CompilerInvocation::new(program, args);
    match (&options.base_path, &options.allowed_paths) {
        (Some(base), Some(_)) => Ok(invocation.with_working_dir(std::path::absolute(base)?)),
        _ => Ok(invocation),
    }
}

fn allow_paths_arg(dir: &Path) -> ToolchainResult<OsString> {
    let dir = std::path::absolute(dir)?;
    let mut arg = OsString::from("--allow-paths=");
    arg.push(dir.as_os_str());
    let has_trailing_separator = dir
        .as_os_str()
        .as_encoded_bytes()
        .last()
        .is_some_and(|b| std::path::is_separator(*b as char));
    if !has_trailing_separator {
        arg.push("/");
    }
    Ok(arg)
}
