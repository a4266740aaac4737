use std::path::PathBuf;

/// Errors that abort a generation run.
///
/// Everything recoverable (unsupported types, nameless exports, members
/// without a declaration) is logged and skipped instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A source or configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A source file is not valid TypeScript.
    #[error("failed to parse {}: {message}", path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// A `tsconfig.json` is not valid JSON (after comments are stripped).
    #[error("invalid compiler configuration {}: {source}", path.display())]
    Config {
        /// Configuration file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A configuration `extends` chain loops back on itself.
    #[error("compiler configuration {} extends itself", .0.display())]
    ConfigCycle(PathBuf),
}

/// Result alias used throughout the crate.
pub type Result<T = ()> = std::result::Result<T, Error>;
