//! Property-based tests for version parsing and ordering.

use std::ffi::OsStr;

use proptest::prelude::*;

use solc_adapter::command::ALLOW_PATHS_UNSUPPORTED_UP_TO;
use solc_adapter::{
    build_invocation, parse_version_output, CompileOptions, OutputKind, VersionTriple,
};

fn version() -> impl Strategy<Value = VersionTriple> {
    (0u32..20, 0u32..30, 0u32..50).prop_map(|(a, b, c)| VersionTriple::new(a, b, c))
}

proptest! {
    /// Ordering agrees with lexicographic tuple ordering.
    #[test]
    fn ordering_matches_tuples(a in version(), b in version()) {
        prop_assert_eq!(
            a.cmp(&b),
            (a.major, a.minor, a.patch).cmp(&(b.major, b.minor, b.patch))
        );
    }

    /// A version embedded in banner text is recovered from the first line that holds one.
    #[test]
    fn banner_version_is_recovered(
        v in version(),
        prefix in "[a-zA-Z :,]{0,30}",
        suffix in "(\\+commit\\.[0-9a-f]{8}\\.Linux\\.g\\+\\+)?",
        noise in "[a-zA-Z ,]{0,40}",
    ) {
        let banner = format!("{}\n{}{}{}\n", noise, prefix, v, suffix);
        prop_assert_eq!(parse_version_output(&banner), Some(v));
    }

    /// Text with no digits never yields a version.
    #[test]
    fn text_without_digits_has_no_version(text in "[a-zA-Z .\n]{0,80}") {
        prop_assert_eq!(parse_version_output(&text), None);
    }

    /// `--allow-paths` appears exactly when the version is past the gate.
    #[test]
    fn allow_paths_gate(v in version()) {
        let dir = std::env::temp_dir();
        let options = CompileOptions::new([OutputKind::Abi]).allow_path(&dir);
        let invocation = build_invocation(OsStr::new("solc"), v, &options).unwrap();
        let emitted = invocation
            .args()
            .iter()
            .any(|a| a.to_string_lossy().starts_with("--allow-paths="));
        prop_assert_eq!(emitted, v > ALLOW_PATHS_UNSUPPORTED_UP_TO);
    }
}
