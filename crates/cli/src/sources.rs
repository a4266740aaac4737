//! Locating the program on disk: source files, the named-exports subset and
//! the `tsconfig.json` that governs them.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobSetBuilder};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::CliError;

const CONFIG_FILE_NAME: &str = "tsconfig.json";

/// Make `path` absolute against `cwd`, folding `.` and `..` lexically.
pub fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Every `.ts` file below each directory, in directory order. Entries inside
/// one directory are sorted by name so the result does not depend on the
/// filesystem.
pub fn collect_sources(dirs: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for dir in dirs {
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|source| CliError::Walk {
                path: dir.clone(),
                source,
            })?;
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "ts")
            {
                files.push(entry.into_path());
            }
        }
    }
    debug!(count = files.len(), "Collected source files.");
    Ok(files)
}

/// The sources matched by any of `patterns`. Relative patterns are anchored
/// at `cwd`.
pub fn match_named_exports(
    cwd: &Path,
    patterns: &[String],
    sources: &[PathBuf],
) -> Result<BTreeSet<PathBuf>, CliError> {
    if patterns.is_empty() {
        return Ok(BTreeSet::new());
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let anchored = absolute(cwd, Path::new(pattern));
        let glob = GlobBuilder::new(&anchored.to_string_lossy())
            .literal_separator(true)
            .build()
            .map_err(|source| CliError::Glob {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    let set = builder.build().map_err(|source| CliError::Glob {
        pattern: patterns.join(", "),
        source,
    })?;

    Ok(sources
        .iter()
        .filter(|file| set.is_match(file))
        .cloned()
        .collect())
}

/// Longest common leading path of `dirs`.
pub fn deepest_shared_root(dirs: &[PathBuf]) -> PathBuf {
    let Some((first, rest)) = dirs.split_first() else {
        return PathBuf::new();
    };

    let mut shared: Vec<Component<'_>> = first.components().collect();
    for dir in rest {
        let common = shared
            .iter()
            .zip(dir.components())
            .take_while(|(a, b)| **a == *b)
            .count();
        shared.truncate(common);
    }
    shared.iter().collect()
}

/// Walk up from `start` looking for `tsconfig.json`. The filesystem root
/// itself is never searched.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    while let Some(parent) = dir.parent() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = parent;
    }
    None
}
