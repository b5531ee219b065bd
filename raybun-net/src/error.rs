use thiserror::Error;

/// Errors originating from the HTTP distribution fabric.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("malformed request body: {0}")]
    Protocol(String),

    #[error("scene CRC mismatch: expected {expected:#010x}, got {got:#010x}")]
    CrcMismatch { expected: u32, got: u32 },

    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("tile_id {tile_id} out of range (tile_count = {tile_count})")]
    TileIdOutOfRange { tile_id: usize, tile_count: usize },

    #[error("hex pixel payload length {got} does not match expected {expected}")]
    PixelLengthMismatch { expected: usize, got: usize },

    #[error("invalid hex digit in pixel payload")]
    InvalidHexDigit,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP transport error: {0}")]
    Http(String),

    #[error(transparent)]
    Core(#[from] raybun_core::CoreError),
}
