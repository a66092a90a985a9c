//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async functions in the core library and the CLI MUST NOT use
//! blocking I/O. A translation call awaits only provider requests and retry
//! backoff, and must not stall the runtime thread it runs on.
//!
//! **Required**: Use `tokio::io`, `tokio::net`, async `reqwest`, not `std::fs`,
//! `std::net`, `std::io::stdin()` or `reqwest::blocking` inside `async fn`.
//!
//! Blocking calls in plain functions (configuration and lexicon loading
//! before the first translation) are acceptable.

use architectural_enforcement::{production_sources, FnKind, SourceFile};

/// Test that async production code does not use blocking I/O
#[test]
fn test_no_blocking_io_in_async_code() {
    let sources = production_sources();
    assert!(
        !sources.is_empty(),
        "no production sources found; check PRODUCTION_DIRS"
    );

    let violations: Vec<String> = sources.iter().flat_map(find_violations).collect();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Blocking I/O calls found in async code!\n");

        for violation in &violations {
            eprintln!("  ❌ {}", violation);
        }

        eprintln!("\n❌ FORBIDDEN inside async fn:");
        eprintln!("  - std::fs::read_to_string(), std::fs::write(), std::fs::File");
        eprintln!("  - std::net::TcpStream, std::net::TcpListener");
        eprintln!("  - std::io::stdin(), std::io::stdout()");
        eprintln!("  - std::process::Command");
        eprintln!("  - reqwest::blocking::*");
        eprintln!("\n✅ REQUIRED async I/O:");
        eprintln!("  - tokio::io::stdin() with AsyncBufReadExt");
        eprintln!("  - tokio::net::TcpListener::bind().await");
        eprintln!("  - reqwest::Client::post().send().await");
        eprintln!("\n✅ ACCEPTABLE blocking I/O:");
        eprintln!("  - Non-async functions (config and lexicon loading)");
        eprintln!("  - Test code");

        panic!(
            "\nFound {} blocking I/O violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

/// Test that nothing anywhere reaches for the blocking HTTP client
#[test]
fn test_no_blocking_http_client() {
    let violations: Vec<String> = production_sources()
        .iter()
        .flat_map(|source| {
            source
                .production_lines()
                .filter(|(_, code)| code.contains("reqwest::blocking"))
                .map(|(idx, _)| source.describe(idx, "Blocking HTTP client"))
                .collect::<Vec<_>>()
        })
        .collect();

    assert!(violations.is_empty(), "{violations:#?}");
}

/// Blocking calls inside async functions
fn find_violations(source: &SourceFile) -> Vec<String> {
    let checks: &[(&str, &str)] = &[
        ("std::fs::", "Blocking file I/O"),
        ("std::net::", "Blocking network I/O"),
        ("std::process::Command", "Blocking process I/O"),
        ("std::io::stdin()", "Blocking stdin in async"),
        ("std::io::stdout()", "Blocking stdout in async"),
        ("std::thread::sleep", "Blocking sleep in async"),
    ];

    source
        .production_lines()
        .filter(|(idx, _)| source.enclosing_fn(*idx) == Some(FnKind::Async))
        .flat_map(|(idx, code)| {
            checks
                .iter()
                .filter(move |(pattern, _)| code.contains(pattern))
                .map(move |(_, what)| source.describe(idx, what))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_blocking_io_detection() {
        let source = SourceFile::from_source(
            Path::new("bad.rs"),
            "async fn bad_function() {\n    let contents = std::fs::read_to_string(\"file.txt\")?;\n}\n",
        );
        assert_eq!(find_violations(&source).len(), 1);
    }

    #[test]
    fn test_non_async_function_is_acceptable() {
        let source = SourceFile::from_source(
            Path::new("config.rs"),
            "pub fn load() {\n    let contents = std::fs::read_to_string(\"config.toml\")?;\n}\n",
        );
        assert!(find_violations(&source).is_empty());
    }

    #[test]
    fn test_test_code_is_acceptable() {
        let source = SourceFile::from_source(
            Path::new("remote.rs"),
            "#[cfg(test)]\nmod tests {\n    #[tokio::test]\n    async fn test_x() {\n        std::fs::read(\"x\");\n    }\n}\n",
        );
        assert!(find_violations(&source).is_empty());
    }
}
