//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles
//! over the tatemae sources:
//! - No blocking I/O inside async functions
//! - No sleep() calls outside retry backoff
//!
//! The helpers here read source files line by line. They are heuristics, not a
//! parser: everything from the first `#[cfg(test)]` line onward is treated as
//! test code, and a line belongs to the nearest function signature above it.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["tatemae/core/src", "tatemae/cli/src"];

/// Kind of function a line sits in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FnKind {
    /// `async fn`
    Async,
    /// Plain `fn`
    Sync,
}

/// A loaded source file
#[derive(Debug)]
pub struct SourceFile {
    /// Path on disk
    pub path: PathBuf,
    /// File contents split into lines
    pub lines: Vec<String>,
    /// Index of the first `#[cfg(test)]` line, if any
    pub test_start: Option<usize>,
}

impl SourceFile {
    /// Read a file, or `None` if it cannot be read
    pub fn load(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        Some(Self::from_source(path, &content))
    }

    /// Build from in-memory text
    pub fn from_source(path: &Path, content: &str) -> Self {
        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        let test_start = lines
            .iter()
            .position(|line| line.trim_start().starts_with("#[cfg(test)]"));
        Self {
            path: path.to_path_buf(),
            lines,
            test_start,
        }
    }

    /// Production lines as `(index, code without trailing comment)`
    pub fn production_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        let end = self.test_start.unwrap_or(self.lines.len());
        self.lines[..end].iter().enumerate().filter_map(|(idx, line)| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("//") {
                return None;
            }
            Some((idx, line.split("//").next().unwrap_or(line)))
        })
    }

    /// Kind of the function enclosing line `idx`, scanning upward
    pub fn enclosing_fn(&self, idx: usize) -> Option<FnKind> {
        let lines: Vec<&str> = self.lines.iter().map(String::as_str).collect();
        enclosing_fn(&lines, idx)
    }

    /// `path:line - text` for reports
    pub fn describe(&self, idx: usize, what: &str) -> String {
        format!(
            "{}:{} - {what}: {}",
            self.path.display(),
            idx + 1,
            self.lines[idx].trim()
        )
    }
}

/// Function kind declared on `line`, ignoring visibility and qualifiers
pub fn fn_signature(line: &str) -> Option<FnKind> {
    let mut rest = line.trim_start();

    for prefix in ["pub(crate) ", "pub(super) ", "pub "] {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped;
            break;
        }
    }

    let mut kind = FnKind::Sync;
    loop {
        if let Some(stripped) = rest.strip_prefix("async ") {
            kind = FnKind::Async;
            rest = stripped;
        } else if let Some(stripped) = rest
            .strip_prefix("const ")
            .or_else(|| rest.strip_prefix("unsafe "))
        {
            rest = stripped;
        } else {
            break;
        }
    }

    rest.starts_with("fn ").then_some(kind)
}

/// Kind of the function enclosing line `idx`
pub fn enclosing_fn(lines: &[&str], idx: usize) -> Option<FnKind> {
    (0..=idx).rev().find_map(|i| fn_signature(lines[i]))
}

/// Workspace root, two levels above this crate
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Every `.rs` file under the production directories
pub fn production_sources() -> Vec<SourceFile> {
    let root = workspace_root();
    PRODUCTION_DIRS
        .iter()
        .map(|dir| root.join(dir))
        .filter(|dir| dir.exists())
        .flat_map(|dir| {
            walkdir::WalkDir::new(dir)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
                .filter_map(|e| SourceFile::load(e.path()))
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_signature() {
        assert_eq!(fn_signature("fn main() {"), Some(FnKind::Sync));
        assert_eq!(fn_signature("    pub fn load(path: &Path) -> Self {"), Some(FnKind::Sync));
        assert_eq!(fn_signature("pub(crate) fn new("), Some(FnKind::Sync));
        assert_eq!(fn_signature("    pub async fn run(&self) {"), Some(FnKind::Async));
        assert_eq!(fn_signature("async fn handle("), Some(FnKind::Async));
        assert_eq!(fn_signature("pub const fn zero() -> u32 {"), Some(FnKind::Sync));
        assert_eq!(fn_signature("let f = |x| x + 1;"), None);
        assert_eq!(fn_signature("// fn commented()"), None);
    }

    #[test]
    fn test_enclosing_fn() {
        let lines = [
            "impl Lexicon {",
            "    pub fn load(path: &Path) -> Result<Self, LexiconError> {",
            "        let content = std::fs::read_to_string(path)?;",
            "    }",
            "    pub async fn refresh(&self) {",
            "        let content = std::fs::read_to_string(path)?;",
            "    }",
            "}",
        ];
        assert_eq!(enclosing_fn(&lines, 0), None);
        assert_eq!(enclosing_fn(&lines, 2), Some(FnKind::Sync));
        assert_eq!(enclosing_fn(&lines, 5), Some(FnKind::Async));
    }

    #[test]
    fn test_test_section_is_excluded() {
        let source = SourceFile::from_source(
            Path::new("demo.rs"),
            "fn a() {}\n// note\n#[cfg(test)]\nmod tests {\n    fn b() {}\n}\n",
        );
        assert_eq!(source.test_start, Some(2));
        let indices: Vec<usize> = source.production_lines().map(|(idx, _)| idx).collect();
        assert_eq!(indices, vec![0]);
    }
}
