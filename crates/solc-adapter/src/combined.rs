//! Typed view of solc's `--combined-json` output.
//!
//! The schema belongs to solc and has drifted between releases (`abi` used
//! to be a JSON-encoded string and is an array since 0.8), so fields are
//! optional and the ABI is kept as a raw [`serde_json::Value`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ToolchainError, ToolchainResult};

/// Parsed `--combined-json` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedOutput {
    /// Artifacts keyed by `<source>:<contract>` (or a bare contract name on
    /// very old releases).
    #[serde(default)]
    pub contracts: BTreeMap<String, ContractArtifacts>,
    /// Compiler version string, if solc reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Artifacts for one contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractArtifacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl CombinedOutput {
    /// Parses solc's stdout.
    pub fn parse(json: &str) -> ToolchainResult<Self> {
        serde_json::from_str(json).map_err(ToolchainError::ParseOutput)
    }

    /// Looks up a contract by full key, falling back to the bare name.
    pub fn contract(&self, name: &str) -> Option<&ContractArtifacts> {
        self.contracts.get(name).or_else(|| {
            self.contracts
                .iter()
                .find(|(key, _)| contract_name(key) == name)
                .map(|(_, artifacts)| artifacts)
        })
    }

    /// Bare contract names, in key order.
    pub fn contract_names(&self) -> impl Iterator<Item = &str> {
        self.contracts.keys().map(|key| contract_name(key))
    }
}

impl ContractArtifacts {
    /// The ABI as a JSON array, decoding the string form older releases emit.
    pub fn abi_json(&self) -> ToolchainResult<Option<serde_json::Value>> {
        match &self.abi {
            None => Ok(None),
            Some(serde_json::Value::String(encoded)) => serde_json::from_str(encoded)
                .map(Some)
                .map_err(ToolchainError::ParseOutput),
            Some(value) => Ok(Some(value.clone())),
        }
    }
}

/// Strips the source unit prefix from a combined-output key.
///
/// `"<stdin>:greeter"` → `"greeter"`, `"Child.sol:child"` → `"child"`.
pub fn contract_name(key: &str) -> &str {
    key.rsplit(':').next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const LEGACY_OUTPUT: &str = r#"{
        "contracts": {
            "<stdin>:greeter": {
                "abi": "[{\"constant\":true,\"inputs\":[],\"name\":\"greet\",\"outputs\":[{\"name\":\"\",\"type\":\"string\"}],\"payable\":false,\"type\":\"function\"}]",
                "bin": "6060604052"
            },
            "Child.sol:child": {
                "abi": "[]",
                "bin": "6080"
            }
        },
        "version": "0.4.24+commit.e67f0147.Linux.g++"
    }"#;

    #[test]
    fn test_parse_legacy_output() {
        let output = CombinedOutput::parse(LEGACY_OUTPUT).unwrap();
        assert_eq!(output.contracts.len(), 2);
        assert_eq!(
            output.version.as_deref(),
            Some("0.4.24+commit.e67f0147.Linux.g++")
        );

        let greeter = output.contract("greeter").unwrap();
        assert_eq!(greeter.bin.as_deref(), Some("6060604052"));
        assert_eq!(greeter.interface, None);

        let abi = greeter.abi_json().unwrap().unwrap();
        assert_eq!(abi[0]["name"], json!("greet"));
    }

    #[test]
    fn test_parse_modern_output() {
        let text = json!({
            "contracts": {
                "<stdin>:parent": {
                    "abi": [{
                        "inputs": [],
                        "name": "hello",
                        "outputs": [],
                        "stateMutability": "pure",
                        "type": "function"
                    }],
                    "bin": "6080",
                    "metadata": "{\"compiler\":{\"version\":\"0.8.19\"}}"
                }
            },
            "version": "0.8.19+commit.7dd6d404.Linux.g++"
        })
        .to_string();

        let output = CombinedOutput::parse(&text).unwrap();
        let parent = output.contract("<stdin>:parent").unwrap();
        assert!(parent.metadata.is_some());
        assert_eq!(
            parent.abi_json().unwrap().unwrap()[0]["name"],
            json!("hello")
        );
    }

    #[test]
    fn test_contract_names() {
        let output = CombinedOutput::parse(LEGACY_OUTPUT).unwrap();
        let names: Vec<_> = output.contract_names().collect();
        assert_eq!(names, vec!["greeter", "child"]);
        assert!(output.contract("mortal").is_none());
    }

    #[test]
    fn test_contract_name() {
        assert_eq!(contract_name("<stdin>:greeter"), "greeter");
        assert_eq!(contract_name("Child.sol:child"), "child");
        assert_eq!(contract_name("greeter"), "greeter");
    }

    #[test]
    fn test_invalid_json() {
        let err = CombinedOutput::parse("Error: Expected pragma").unwrap_err();
        assert!(matches!(err, ToolchainError::ParseOutput(_)));
    }
}
