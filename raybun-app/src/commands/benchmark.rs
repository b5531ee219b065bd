use std::path::Path;

use anyhow::Result;
use tracing::info;

use raybun_net::benchmark_self;
use raybun_render::{default_thread_count, render_standalone};

use crate::scene_json::load_scene_file;

/// Prints a machine's perf score (§4.7) and, if a scene is supplied, also
/// times an actual render of it with the default thread count.
pub fn run(scene_path: Option<&Path>) -> Result<()> {
    let info_report = benchmark_self("benchmark");
    println!(
        "perf={:.2} thread_count={} simd={}",
        info_report.perf, info_report.thread_count, info_report.simd
    );

    if let Some(scene_path) = scene_path {
        let (scene, mut state) = load_scene_file(scene_path)?;
        let thread_count = default_thread_count();
        let start = std::time::Instant::now();
        render_standalone(&scene, &mut state, thread_count, 0);
        let elapsed = start.elapsed();
        info!(?elapsed, thread_count, "benchmark render complete");
        println!("render of {} took {:.2?}", scene_path.display(), elapsed);
    }
    Ok(())
}
