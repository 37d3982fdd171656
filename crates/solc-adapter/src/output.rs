//! Artifact kinds requested from `--combined-json`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ToolchainError;

/// Artifact kind requested from the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Deployable bytecode.
    Bin,
    /// Human-readable interface description.
    Interface,
    /// JSON ABI.
    Abi,
    /// Contract metadata JSON.
    Metadata,
}

impl OutputKind {
    /// All output kinds, in declaration order.
    pub const ALL: [OutputKind; 4] = [
        OutputKind::Bin,
        OutputKind::Interface,
        OutputKind::Abi,
        OutputKind::Metadata,
    ];

    /// Returns the name solc expects on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Bin => "bin",
            OutputKind::Interface => "interface",
            OutputKind::Abi => "abi",
            OutputKind::Metadata => "metadata",
        }
    }

    /// Joins kinds into the single comma-separated `--combined-json` directive.
    ///
    /// Caller order is kept and duplicates are not removed.
    pub fn join(kinds: &[OutputKind]) -> String {
        kinds
            .iter()
            .map(OutputKind::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputKind {
    type Err = ToolchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "bin" => Ok(OutputKind::Bin),
            "interface" => Ok(OutputKind::Interface),
            "abi" => Ok(OutputKind::Abi),
            "metadata" => Ok(OutputKind::Metadata),
            other => Err(ToolchainError::InvalidOutputKind {
                name: other.to_string(),
            }),
        }
    }
}
