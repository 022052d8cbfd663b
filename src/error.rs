use thiserror::Error;

/// Fatal errors surfaced at construction time.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("channel width must be greater than zero, got {0}")]
    InvalidWidth(f32),
    #[error("channel height must be greater than zero, got {0}")]
    InvalidHeight(f32),
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),
}

/// Failure reported by a rendering surface while executing a draw primitive.
///
/// Surface backends are external; their error types are erased to a message
/// here. Surface failures are isolated per channel and logged, never fatal.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SurfaceError(pub String);

impl SurfaceError {
    pub fn new(message: impl Into<String>) -> Self {
        SurfaceError(message.into())
    }
}
