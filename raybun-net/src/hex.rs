//! ARGB32 pixel wire codec: 8 lowercase hex digits per pixel, concatenated
//! row-major within a tile (§6 "Pixel wire format").

use crate::error::NetError;

/// Encode packed ARGB pixels as a lowercase, zero-padded hex string.
pub fn encode(pixels: &[u32]) -> String {
    let mut out = String::with_capacity(pixels.len() * 8);
    for &p in pixels {
        out.push_str(&format!("{p:08x}"));
    }
    out
}

/// Decode a hex pixel string produced by [`encode`]. Errors if the length
/// is not a multiple of 8 or a digit is not valid hex, per §8's "Pixel
/// upload bounds" boundary test.
pub fn decode(hex: &str, expected_pixel_count: usize) -> Result<Vec<u32>, NetError> {
    let expected_len = expected_pixel_count * 8;
    if hex.len() != expected_len {
        return Err(NetError::PixelLengthMismatch {
            expected: expected_len,
            got: hex.len(),
        });
    }
    let bytes = hex.as_bytes();
    let mut pixels = Vec::with_capacity(expected_pixel_count);
    for chunk in bytes.chunks_exact(8) {
        let s = std::str::from_utf8(chunk).map_err(|_| NetError::InvalidHexDigit)?;
        let value = u32::from_str_radix(s, 16).map_err(|_| NetError::InvalidHexDigit)?;
        pixels.push(value);
    }
    Ok(pixels)
}
