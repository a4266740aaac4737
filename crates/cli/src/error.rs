use std::path::PathBuf;

/// Failures of a `dts-gen` run; each one ends the process with status 1.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] dtsgen_core::Error),

    /// No `tsconfig.json` above the shared root of the source directories.
    #[error("Can not find tsconfig.json")]
    ConfigNotFound,

    #[error("invalid glob pattern {pattern}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("failed to read source directory {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to resolve the working directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}
