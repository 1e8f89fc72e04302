//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and simulation execution.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: conway_core::config::ConfigError,
    },

    /// Controller construction or the run itself failed.
    #[error("controller error: {source}")]
    Controller {
        /// The underlying controller error.
        #[from]
        source: conway_core::controller::ControllerError,
    },

    /// A grid source or sink failed outside the controller.
    #[error("grid I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: conway_core::io::IoError,
    },
}
