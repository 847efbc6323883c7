//! Error definitions for all `ts_model_check` stages.

use thiserror::Error;

#[derive(Debug, Error)]
/// Top-level error type returned by public APIs.
///
/// Only structurally fatal conditions live here. Semantic mismatches between
/// models and interfaces are diagnostics in the result list, never errors.
pub enum CheckError {
    /// The backend models file is not valid source in the supported subset.
    #[error("python parse error in {path}: {message}")]
    PythonParse { path: String, message: String },
    /// Configuration file shape or parse failure.
    #[error("config error: {0}")]
    Config(String),
    /// Filesystem I/O error, including missing input files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
