//! Where the toolchain binary lives.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::error::{ToolchainError, ToolchainResult};

/// Environment variable the dynamic loader searches for shared libraries.
#[cfg(target_os = "macos")]
pub const LIBRARY_PATH_VAR: &str = "DYLD_LIBRARY_PATH";
/// Environment variable the dynamic loader searches for shared libraries.
#[cfg(windows)]
pub const LIBRARY_PATH_VAR: &str = "PATH";
/// Environment variable the dynamic loader searches for shared libraries.
#[cfg(not(any(windows, target_os = "macos")))]
pub const LIBRARY_PATH_VAR: &str = "LD_LIBRARY_PATH";

/// The toolchain binary selected at initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolchainLocation {
    /// A binary looked up by name through `PATH`.
    System { name: OsString },
    /// A bundled binary, run with its own directory on the library search path.
    Bundled { path: PathBuf, library_dir: PathBuf },
}

impl ToolchainLocation {
    /// A system-installed binary resolved through `PATH`.
    pub fn system(name: impl Into<OsString>) -> Self {
        Self::System { name: name.into() }
    }

    /// A bundled binary at `path`, resolved to an absolute path.
    ///
    /// # Errors
    /// [`ToolchainError::BundledNotFound`] if nothing exists at `path`.
    pub fn bundled(path: &Path) -> ToolchainResult<Self> {
        if !path.exists() {
            return Err(ToolchainError::BundledNotFound {
                path: path.to_path_buf(),
            });
        }
        let path = path.canonicalize()?;
        let library_dir = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| ToolchainError::BundledNotFound { path: path.clone() })?;
        Ok(Self::Bundled { path, library_dir })
    }

    /// The program argument used to start the toolchain.
    pub fn program(&self) -> &OsStr {
        match self {
            ToolchainLocation::System { name } => name,
            ToolchainLocation::Bundled { path, .. } => path.as_os_str(),
        }
    }

    /// Environment overrides passed to every child process.
    pub fn environment(&self) -> Vec<(OsString, OsString)> {
        match self {
            ToolchainLocation::System { .. } => Vec::new(),
            ToolchainLocation::Bundled { library_dir, .. } => vec![(
                OsString::from(LIBRARY_PATH_VAR),
                library_path_value(library_dir),
            )],
        }
    }

    /// Best-effort absolute path of the binary, for diagnostics.
    pub fn resolved_path(&self) -> PathBuf {
        match self {
            ToolchainLocation::System { name } => {
                which::which(name).unwrap_or_else(|_| PathBuf::from(name))
            }
            ToolchainLocation::Bundled { path, .. } => path.clone(),
        }
    }

    /// Returns true if the bundled fallback is in use.
    pub fn is_bundled(&self) -> bool {
        matches!(self, ToolchainLocation::Bundled { .. })
    }
}

#[cfg(windows)]
fn library_path_value(dir: &Path) -> OsString {
    // PATH doubles as the DLL search path, so keep what is already there.
    let inherited = std::env::var_os("PATH").unwrap_or_default();
    let paths = std::iter::once(dir.to_path_buf()).chain(std::env::split_paths(&inherited));
    std::env::join_paths(paths).unwrap_or_else(|_| dir.as_os_str().to_owned())
}

#[cfg(not(windows))]
fn library_path_value(dir: &Path) -> OsString {
    dir.as_os_str().to_owned()
}
