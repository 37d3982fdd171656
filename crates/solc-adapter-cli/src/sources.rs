//! Discovery of Solidity sources from command-line inputs.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

/// Extension of Solidity source files.
pub const SOURCE_EXTENSION: &str = "sol";

/// A source file and where its artifact goes under `--out-dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Path as found on disk.
    pub path: PathBuf,
    /// Path relative to the input it was found under; the bare file name
    /// for files given directly.
    pub relative: PathBuf,
}

impl Source {
    /// Artifact path relative to the output directory: the relative source
    /// path with a `.json` extension.
    pub fn artifact_path(&self) -> PathBuf {
        self.relative.with_extension("json")
    }
}

/// Expands inputs into a list of source files.
///
/// Files are taken as given. Directories are walked recursively for `*.sol`
/// files, which are returned sorted so runs are reproducible. Duplicates are
/// dropped, keeping the first occurrence.
///
/// # Errors
/// Fails if an input does not exist, or if two distinct sources would write
/// the same artifact (for example two explicitly named `Token.sol` files
/// from different directories).
pub fn collect_sources(inputs: &[PathBuf]) -> Result<Vec<Source>> {
    let mut sources = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found = walk_dir(input)?;
            if found.is_empty() {
                tracing::warn!(dir = %input.display(), "no Solidity sources found");
            }
            found.sort_by(|a, b| a.path.cmp(&b.path));
            sources.extend(found);
        } else if input.is_file() {
            let relative = input
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| input.clone());
            sources.push(Source {
                path: input.clone(),
                relative,
            });
        } else {
            bail!("Input not found: {}", input.display());
        }
    }

    let mut seen = HashSet::new();
    sources.retain(|source| seen.insert(source.path.clone()));

    let mut artifacts: HashMap<PathBuf, &Path> = HashMap::new();
    for source in &sources {
        if let Some(other) = artifacts.insert(source.artifact_path(), &source.path) {
            bail!(
                "{} and {} would both write artifact {}",
                other.display(),
                source.path.display(),
                source.artifact_path().display()
            );
        }
    }

    Ok(sources)
}

fn walk_dir(dir: &Path) -> Result<Vec<Source>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if entry.file_type().is_file() && is_source(entry.path()) {
            let relative = entry
                .path()
                .strip_prefix(dir)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| PathBuf::from(entry.file_name()));
            found.push(Source {
                path: entry.into_path(),
                relative,
            });
        }
    }
    Ok(found)
}

/// Returns true if the path has a `.sol` extension.
pub fn is_source(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "pragma solidity >=0.4.22;\n").unwrap();
    }

    fn paths(sources: &[Source]) -> Vec<PathBuf> {
        sources.iter().map(|s| s.path.clone()).collect()
    }

    #[test]
    fn test_walks_directories_for_sources() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(&root.join("b.sol"));
        touch(&root.join("a.sol"));
        touch(&root.join("nested/deep/c.sol"));
        touch(&root.join("README.md"));
        touch(&root.join("nested/notes.txt"));

        let sources = collect_sources(&[root.to_path_buf()]).unwrap();
        assert_eq!(
            paths(&sources),
            vec![
                root.join("a.sol"),
                root.join("b.sol"),
                root.join("nested/deep/c.sol"),
            ]
        );
        assert_eq!(sources[2].relative, PathBuf::from("nested/deep/c.sol"));
        assert_eq!(
            sources[2].artifact_path(),
            PathBuf::from("nested/deep/c.json")
        );
    }

    #[test]
    fn test_same_stem_in_different_directories_keeps_both_artifacts() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(&root.join("a/Token.sol"));
        touch(&root.join("b/Token.sol"));

        let sources = collect_sources(&[root.to_path_buf()]).unwrap();
        let artifacts: Vec<_> = sources.iter().map(Source::artifact_path).collect();
        assert_eq!(
            artifacts,
            vec![PathBuf::from("a/Token.json"), PathBuf::from("b/Token.json")]
        );
    }

    #[test]
    fn test_colliding_artifacts_rejected() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("a/Token.sol");
        let second = tmp.path().join("b/Token.sol");
        touch(&first);
        touch(&second);

        let err = collect_sources(&[first, second]).unwrap_err();
        assert!(err.to_string().contains("would both write artifact Token.json"));
    }

    #[test]
    fn test_explicit_files_kept_in_order() {
        let tmp = TempDir::new().unwrap();
        let second = tmp.path().join("z.sol");
        let first = tmp.path().join("contract.txt");
        touch(&second);
        touch(&first);

        let sources = collect_sources(&[second.clone(), first.clone()]).unwrap();
        assert_eq!(paths(&sources), vec![second, first]);
        assert_eq!(sources[0].artifact_path(), PathBuf::from("z.json"));
    }

    #[test]
    fn test_duplicates_dropped() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.sol");
        touch(&file);

        let sources = collect_sources(&[file.clone(), tmp.path().to_path_buf()]).unwrap();
        assert_eq!(paths(&sources), vec![file]);
    }

    #[test]
    fn test_missing_input_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = collect_sources(&[tmp.path().join("missing.sol")]).unwrap_err();
        assert!(err.to_string().contains("Input not found"));
    }

    #[test]
    fn test_is_source() {
        assert!(is_source(Path::new("Greeter.sol")));
        assert!(is_source(Path::new("dir/Greeter.SOL")));
        assert!(!is_source(Path::new("Greeter.json")));
        assert!(!is_source(Path::new("sol")));
    }

    #[test]
    fn test_artifact_path_keeps_inner_dots() {
        let source = Source {
            path: PathBuf::from("contracts/Token.v2.sol"),
            relative: PathBuf::from("Token.v2.sol"),
        };
        assert_eq!(source.artifact_path(), PathBuf::from("Token.v2.json"));
    }
}
