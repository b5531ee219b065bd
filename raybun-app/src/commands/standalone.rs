use std::path::Path;

use anyhow::Result;
use tracing::info;

use raybun_render::{default_thread_count, render_standalone};

use crate::scene_json::load_scene_file;

pub fn run(scene_path: &Path, output_path: &Path) -> Result<()> {
    let (scene, mut state) = load_scene_file(scene_path)?;
    let thread_count = default_thread_count();
    info!(
        width = state.width,
        height = state.height,
        thread_count,
        "standalone render starting"
    );
    render_standalone(&scene, &mut state, thread_count, 0);
    raybun_render::export::export(&state, output_path)?;
    info!(path = %output_path.display(), "wrote output image");
    Ok(())
}
