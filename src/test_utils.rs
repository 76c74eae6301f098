//! Test utilities for the Port agent
//!
//! Temporary files for mapping-file tests and in-memory environments for
//! settings tests, so unit tests never mutate the process environment.

use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Build an in-memory environment from `(name, value)` pairs
pub fn env_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "mapping.json", "[]");

        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[]");
    }

    #[test]
    fn test_env_map() {
        let env = env_map(&[("A", "1"), ("B", "")]);
        assert_eq!(env.len(), 2);
        assert_eq!(env["B"], "");
    }
}
