use thiserror::Error;

/// Errors originating from the core geometry and material engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid sphere radius: {0} (must be > 0.0)")]
    InvalidRadius(f32),

    #[error("degenerate quad: u and v are parallel")]
    DegenerateQuad,

    #[error("material index {index} out of range (materials.len() == {len})")]
    MaterialIndexOutOfRange { index: usize, len: usize },

    #[error("invalid camera: {reason}")]
    InvalidCamera { reason: String },

    #[error("invalid fuzz: {0} (must be in [0, 1])")]
    InvalidFuzz(f32),
}
