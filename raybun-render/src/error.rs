use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error exporting image: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),

    #[error(transparent)]
    Core(#[from] raybun_core::CoreError),
}
