//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT call sleep methods. A translation
//! waits on provider I/O, never on a timer.
//!
//! **Exceptions**: Backoff between retries of a transient provider failure,
//! which lives in the retry module only, and test code.

use std::path::Path;

use architectural_enforcement::{production_sources, SourceFile};

/// Files allowed to sleep, relative to a production source directory
const BACKOFF_FILES: &[&str] = &["provider/retry.rs"];

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations: Vec<String> = production_sources().iter().flat_map(find_sleeps).collect();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {}", violation);
        }

        eprintln!("\n✅ ACCEPTABLE sleep uses:");
        eprintln!("  - Backoff between retries in provider/retry.rs");
        eprintln!("  - Test code");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - Sleep in polling loops");
        eprintln!("  - Sleep as poor man's synchronization");
        eprintln!("  - Sleep to 'wait' for a provider (await the request instead)");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

/// Test that the backoff sleep is still where the policy expects it
#[test]
fn test_backoff_sleep_is_in_retry_module() {
    let retry = production_sources()
        .into_iter()
        .find(|source| is_backoff_file(&source.path))
        .expect("retry module should exist");

    assert!(
        retry
            .production_lines()
            .any(|(_, code)| code.contains("tokio::time::sleep(")),
        "retry backoff should use tokio::time::sleep"
    );
}

fn is_backoff_file(path: &Path) -> bool {
    BACKOFF_FILES.iter().any(|allowed| path.ends_with(allowed))
}

/// Sleep calls outside the backoff allowlist
fn find_sleeps(source: &SourceFile) -> Vec<String> {
    if is_backoff_file(&source.path) {
        return Vec::new();
    }

    source
        .production_lines()
        .filter(|(_, code)| code.contains("::sleep(") || code.contains(".sleep("))
        .map(|(idx, _)| source.describe(idx, "Sleep call"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_violation_detection() {
        let source = SourceFile::from_source(
            Path::new("tatemae/core/src/pipeline/stages.rs"),
            "async fn bad_function() {\n    tokio::time::sleep(Duration::from_millis(10)).await;\n}\n",
        );
        assert_eq!(find_sleeps(&source).len(), 1);
    }

    #[test]
    fn test_retry_module_is_allowed() {
        let source = SourceFile::from_source(
            Path::new("tatemae/core/src/provider/retry.rs"),
            "async fn run() {\n    tokio::time::sleep(backoff).await;\n}\n",
        );
        assert!(find_sleeps(&source).is_empty());
    }

    #[test]
    fn test_sleep_in_tests_is_allowed() {
        let source = SourceFile::from_source(
            Path::new("tatemae/core/src/provider/remote.rs"),
            "fn a() {}\n#[cfg(test)]\nmod tests {\n    async fn slow() {\n        tokio::time::sleep(d).await;\n    }\n}\n",
        );
        assert!(find_sleeps(&source).is_empty());
    }
}
