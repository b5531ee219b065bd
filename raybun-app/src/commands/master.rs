use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use raybun_core::Rng;
use raybun_net::MasterState;
use raybun_render::{default_thread_count, render_tile};

use crate::scene_json::load_scene_file;

/// Runs the master HTTP server plus its own local worker threads (§4.6: the
/// master accepts both local and remote claimants on the same `Work`). Exits
/// once every tile is `COMPLETED`, writing `output_path`.
pub fn run(port: u16, scene_path: &Path, output_path: &Path) -> Result<()> {
    let (scene, state) = load_scene_file(scene_path)?;
    let master_state = Arc::new(MasterState::new(scene, state));

    let server_state = Arc::clone(&master_state);
    std::thread::spawn(move || {
        if let Err(err) = raybun_net::master::run(port, server_state) {
            tracing::error!(%err, "master server stopped");
        }
    });
    info!(port, "master server started");

    let thread_count = default_thread_count();
    let local_handles: Vec<_> = (0..thread_count)
        .map(|thread_id| {
            let master_state = Arc::clone(&master_state);
            std::thread::spawn(move || local_worker_loop(&master_state, thread_id as u64))
        })
        .collect();
    for handle in local_handles {
        handle.join().expect("local render thread panicked");
    }

    while !master_state.assignment.all_completed() {
        std::thread::sleep(Duration::from_millis(50));
    }

    let image = master_state.image.lock().unwrap();
    raybun_render::export::export(&image, output_path)?;
    info!(path = %output_path.display(), "wrote output image");
    Ok(())
}

fn local_worker_loop(master_state: &MasterState, thread_id: u64) {
    let camera = *master_state.scene.camera();
    while let Some((tile_id, tile)) = master_state.work.claim_next() {
        master_state.assignment.mark_in_flight(tile_id, None);
        let mut rng = Rng::for_index(thread_id, tile_id as u64);
        let (width, height, samples_per_pixel, max_depth) = {
            let image = master_state.image.lock().unwrap();
            (
                image.width,
                image.height,
                image.samples_per_pixel,
                image.max_depth,
            )
        };
        let pixels = render_tile(
            &master_state.scene,
            &camera,
            &tile,
            width,
            height,
            samples_per_pixel,
            max_depth,
            &mut rng,
        );
        master_state
            .work
            .ray_count
            .fetch_add(tile.pixel_count() as u64 * samples_per_pixel as u64, Ordering::Relaxed);
        {
            let mut image = master_state.image.lock().unwrap();
            for row in 0..tile.th {
                for col in 0..tile.tw {
                    let px = tile.x + col;
                    let py = tile.y + row;
                    image.set_pixel(px, py, pixels[row as usize * tile.tw as usize + col as usize]);
                }
            }
        }
        master_state.assignment.mark_completed(tile_id);
    }
}
