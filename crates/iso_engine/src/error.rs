//! Scene-level errors

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while building scene objects
///
/// Queries never fail; only construction does.
#[derive(Error, Debug)]
pub enum SceneError {
    /// The projection cannot be inverted, so screen → world queries are impossible
    #[error("Projection matrix is not invertible")]
    SingularProjection,

    /// The dependency-construction worker pool could not be started
    #[error("Worker pool error: {0}")]
    ThreadPool(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
