//! Table path discovery
//!
//! Finds a vector table across the usual installation locations.

use crate::error::{Result, VectorError};
use std::path::{Path, PathBuf};

const TABLE_FILE_NAMES: [&str; 2] = ["vectors.wvsnap", "vectors.txt"];

/// Find the vector table with priority:
/// 1. Explicit path (command line)
/// 2. WORDVEC_TABLE_PATH environment variable
/// 3. ./models/vectors.{wvsnap,txt}
/// 4. User home directory (~/.wordvec/models/vectors.{wvsnap,txt})
pub fn find_table_path(explicit: Option<&Path>) -> Result<PathBuf> {
    // Priority 1: explicit path must exist, no silent fallback
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(VectorError::not_found(path.display().to_string()));
    }

    // Priority 2: WORDVEC_TABLE_PATH
    if let Ok(table_path) = std::env::var("WORDVEC_TABLE_PATH") {
        let path = PathBuf::from(&table_path);
        if path.is_file() {
            log::info!("Using WORDVEC_TABLE_PATH: {}", path.display());
            return Ok(path);
        }
        log::warn!("WORDVEC_TABLE_PATH set but table not found: {}", table_path);
    }

    // Priorities 3 and 4
    for path in candidate_table_paths() {
        if path.is_file() {
            log::info!("Using vector table: {}", path.display());
            return Ok(path);
        }
    }

    Err(VectorError::not_found(
        "no vector table found. Checked:\n\
         - --table argument\n\
         - WORDVEC_TABLE_PATH environment variable\n\
         - ./models/vectors.wvsnap, ./models/vectors.txt\n\
         - ~/.wordvec/models/vectors.wvsnap, ~/.wordvec/models/vectors.txt",
    ))
}

/// Default locations searched after the explicit path and environment
pub fn candidate_table_paths() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.join("models"));
    }

    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        dirs.push(PathBuf::from(home).join(".wordvec").join("models"));
    }

    dirs.iter()
        .flat_map(|dir| TABLE_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_paths_prefer_snapshots() {
        let paths = candidate_table_paths();
        assert!(!paths.is_empty());
        assert!(paths[0].ends_with("models/vectors.wvsnap"));
        assert!(paths[1].ends_with("models/vectors.txt"));
    }

    #[test]
    fn test_explicit_path_is_used() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let found = find_table_path(Some(file.path())).unwrap();
        assert_eq!(found, file.path());
    }

    #[test]
    fn test_missing_explicit_path_fails() {
        let err = find_table_path(Some(Path::new("/nonexistent/vectors.txt"))).unwrap_err();
        assert!(matches!(err, VectorError::NotFound(_)));
    }
}
