//! HTTP worker client: fetches the scene, renders tiles on request, and
//! uploads pixels back to the master (§4.7).
//!
//! Grounded in the original's `worker_connect()`: GET the scene once,
//! POST a best-effort registration, then loop GET-work/render/POST-result
//! until the master reports no tiles left. `ureq` replaces libcurl; the
//! control flow is otherwise the same blocking request-per-step shape.

use raybun_core::{Rng, Scene};
use raybun_render::{render_tile, State};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::NetError;
use crate::machine::{benchmark_self, MachineInfo};
use crate::protocol::{ResultRequest, SceneResponse};

/// Parses a master-supplied `scene_json` string into a local [`Scene`] and
/// [`State`]. Scene-JSON schema (§6) is owned by the application crate, not
/// by the net layer, so the worker takes a loader function rather than
/// linking against it directly.
pub type SceneLoader = dyn Fn(&str) -> Result<(Scene, State), NetError>;

/// Run the worker loop against `base_url` (e.g. `http://master:8080`) until
/// the master reports all tiles are done, the scene CRC no longer matches,
/// or a request fails outright.
pub fn run(base_url: &str, name: &str, load_scene: &SceneLoader) -> Result<(), NetError> {
    let info = benchmark_self(name);
    info!(name = %info.name, perf = info.perf, "worker benchmarked itself");

    let (scene, state) = fetch_scene(base_url, load_scene)?;
    register_best_effort(base_url, &info);

    let mut tiles_rendered = 0u64;
    loop {
        match fetch_work(base_url, name, scene.scene_crc())? {
            None => break,
            Some((tile_id, tile)) => {
                let mut rng = Rng::for_index(info.perf.to_bits() as u64, tile_id as u64);
                let pixels = render_tile(
                    &scene,
                    scene.camera(),
                    &tile,
                    state.width,
                    state.height,
                    state.samples_per_pixel,
                    state.max_depth,
                    &mut rng,
                );
                upload_result(base_url, name, tile_id, &pixels)?;
                tiles_rendered += 1;
            }
        }
    }
    info!(tiles_rendered, "worker loop finished");
    Ok(())
}

fn fetch_scene(
    base_url: &str,
    load_scene: &SceneLoader,
) -> Result<(Scene, State), NetError> {
    let url = format!("{base_url}/api/scene");
    let mut response = ureq::get(&url)
        .call()
        .map_err(|e| NetError::Http(e.to_string()))?;
    let body: SceneResponse = response
        .body_mut()
        .read_json()
        .map_err(|e| NetError::Http(e.to_string()))?;

    let (scene, state) = load_scene(&body.scene_json)?;
    if scene.scene_crc() != body.scene_crc {
        return Err(NetError::CrcMismatch {
            expected: body.scene_crc,
            got: scene.scene_crc(),
        });
    }
    Ok((scene, state))
}

/// Registration failures are logged and swallowed: the master accepts work
/// requests from unregistered workers (§4.7 "best-effort").
fn register_best_effort(base_url: &str, info: &MachineInfo) {
    let url = format!("{base_url}/api/register");
    match ureq::post(&url).send_json(&info.to_request()) {
        Ok(_) => info!("worker registered with master"),
        Err(e) => warn!(error = %e, "registration failed, continuing anyway"),
    }
}

fn fetch_work(
    base_url: &str,
    worker_id: &str,
    scene_crc: u32,
) -> Result<Option<(usize, raybun_render::Tile)>, NetError> {
    let url = format!("{base_url}/api/work?worker_id={worker_id}&scene_crc={scene_crc}");
    let mut response = ureq::get(&url)
        .call()
        .map_err(|e| NetError::Http(e.to_string()))?;
    let body: Value = response
        .body_mut()
        .read_json()
        .map_err(|e| NetError::Http(e.to_string()))?;

    if body.get("status").is_some() {
        return Ok(None);
    }
    let tile_id = body
        .get("tile_id")
        .and_then(Value::as_u64)
        .ok_or_else(|| NetError::Protocol("/api/work response missing tile_id".to_string()))?
        as usize;
    let tile: raybun_render::Tile = serde_json::from_value(
        body.get("tile")
            .cloned()
            .ok_or_else(|| NetError::Protocol("/api/work response missing tile".to_string()))?,
    )
    .map_err(|e| NetError::Protocol(e.to_string()))?;
    Ok(Some((tile_id, tile)))
}

fn upload_result(
    base_url: &str,
    name: &str,
    tile_id: usize,
    pixels: &[u32],
) -> Result<(), NetError> {
    let url = format!("{base_url}/api/result");
    let req = ResultRequest {
        name: name.to_string(),
        tile_id,
        pixels: crate::hex::encode(pixels),
    };
    ureq::post(&url)
        .send_json(&req)
        .map_err(|e| NetError::Http(e.to_string()))?;
    Ok(())
}
