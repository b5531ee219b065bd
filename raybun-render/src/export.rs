//! Image export: PPM P6 and PNG, chosen by the output path's extension
//! (§6). `State.image` is packed ARGB; both exporters unpack to the
//! channel layout their format expects.

use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::RenderError;
use crate::state::State;

/// Write `state.image` to `path`, dispatching on its extension. Unknown or
/// missing extensions fall back to PPM with a warning, per §6.
pub fn export(state: &State, path: &Path) -> Result<(), RenderError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => export_png(state, path),
        Some("ppm") => export_ppm(state, path),
        other => {
            tracing::warn!(extension = ?other, "unknown output extension, defaulting to PPM");
            export_ppm(state, path)
        }
    }
}

/// PPM P6: raw RGB, 255 max value, no alpha.
pub fn export_ppm(state: &State, path: &Path) -> Result<(), RenderError> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    write!(writer, "P6\n{} {}\n255\n", state.width, state.height)?;
    let mut rgb = Vec::with_capacity(state.image.len() * 3);
    for &pixel in &state.image {
        let [_, r, g, b] = argb_bytes(pixel);
        rgb.extend_from_slice(&[r, g, b]);
    }
    writer.write_all(&rgb)?;
    debug!(width = state.width, height = state.height, path = %path.display(), "exported PPM");
    Ok(())
}

/// PNG, 8-bit RGBA.
pub fn export_png(state: &State, path: &Path) -> Result<(), RenderError> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, state.width, state.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    let mut rgba = Vec::with_capacity(state.image.len() * 4);
    for &pixel in &state.image {
        let [a, r, g, b] = argb_bytes(pixel);
        rgba.extend_from_slice(&[r, g, b, a]);
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&rgba)?;
    debug!(width = state.width, height = state.height, path = %path.display(), "exported PNG");
    Ok(())
}

#[inline]
fn argb_bytes(pixel: u32) -> [u8; 4] {
    [
        ((pixel >> 24) & 0xff) as u8,
        ((pixel >> 16) & 0xff) as u8,
        ((pixel >> 8) & 0xff) as u8,
        (pixel & 0xff) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> State {
        let mut state = State::new(2, 2, 1, 1);
        state.image = vec![0xff112233, 0xff445566, 0xff778899, 0xffaabbcc];
        state
    }

    #[test]
    fn ppm_export_writes_valid_header() {
        let state = sample_state();
        let dir = std::env::temp_dir().join("raybun_test_export_ppm");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("out.ppm");
        export_ppm(&state, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"P6\n2 2\n255\n"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn png_export_writes_valid_signature() {
        let state = sample_state();
        let dir = std::env::temp_dir().join("raybun_test_export_png");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("out.png");
        export_png(&state, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn export_dispatches_on_extension() {
        let state = sample_state();
        let dir = std::env::temp_dir().join("raybun_test_export_dispatch");
        let _ = std::fs::create_dir_all(&dir);

        export(&state, &dir.join("a.png")).unwrap();
        export(&state, &dir.join("a.ppm")).unwrap();
        export(&state, &dir.join("a.unknown")).unwrap();

        assert!(dir.join("a.png").exists());
        assert!(dir.join("a.ppm").exists());
        assert!(dir.join("a.unknown").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn argb_unpacks_expected_channels() {
        assert_eq!(argb_bytes(0xff112233), [0xff, 0x11, 0x22, 0x33]);
    }
}
