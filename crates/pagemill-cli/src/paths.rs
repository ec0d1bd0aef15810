//! Input path expansion.

use pagemill::{PageMillError, Result};
use std::path::PathBuf;

/// Expand glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.
/// `&[&str]` or `Vec<String>`. Matches of one pattern come back sorted;
/// patterns keep their order.
///
/// # Errors
///
/// Returns a configuration error for a malformed pattern and an I/O error
/// for an unreadable directory met while matching.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns {
        resolved_paths.extend(collect_paths_for_pattern(pattern.as_ref())?);
    }

    Ok(resolved_paths)
}

fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|err| {
        PageMillError::invalid_config(format!("Invalid input pattern {pattern:?}: {err}"))
    })?;

    let mut resolved_paths = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| PageMillError::Io {
            source: err.into_error(),
        })?;
        if path.is_file() {
            resolved_paths.push(path);
        }
    }

    Ok(resolved_paths)
}
