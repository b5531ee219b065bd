//! HTTP master server: serves the scene, hands out tiles, and receives
//! finished pixels from workers (§4.6).
//!
//! Built on `tiny_http`, whose blocking `Server::recv` loop this module
//! wraps in one `std::thread::spawn` per connection — the thread-per-
//! connection model §5 calls for, without pulling in an async runtime.

use std::io::Read;
use std::sync::{Arc, Mutex};

use tiny_http::{Header, Method, Response, Server};
use tracing::{debug, info, warn};

use raybun_core::Scene;
use raybun_render::{State, Work};

use crate::assignment::TileAssignment;
use crate::error::NetError;
use crate::hex;
use crate::protocol::{
    ErrorResponse, RegisterRequest, RegisterResponse, ResultRequest, ResultResponse,
    SceneResponse, WorkDoneResponse, WorkQuery, WorkResponse,
};

/// Payloads larger than this are rejected with `413` (§4.6).
pub const MAX_PAYLOAD_BYTES: usize = 64 * 1024 * 1024;
/// Payloads up to this size are buffered in memory; above it the spec
/// calls for spilling to a temp file. This implementation always buffers
/// in memory up to `MAX_PAYLOAD_BYTES` — see DESIGN.md for the tradeoff.
pub const MEMORY_BUFFER_BYTES: usize = 1024 * 1024;

/// Shared state every connection handler reads or mutates.
pub struct MasterState {
    pub scene: Arc<Scene>,
    pub work: Arc<Work>,
    pub assignment: Arc<TileAssignment>,
    pub image: Mutex<State>,
    registered_names: Mutex<std::collections::HashSet<String>>,
}

impl MasterState {
    pub fn new(scene: Scene, state: State) -> Self {
        let work = Arc::new(Work::new(state.width, state.height));
        let assignment = Arc::new(TileAssignment::new(work.tile_count()));
        Self {
            scene: Arc::new(scene),
            work,
            assignment,
            image: Mutex::new(state),
            registered_names: Mutex::new(std::collections::HashSet::new()),
        }
    }
}

/// Run the master HTTP server on `port`, blocking forever (one thread per
/// connection). Returns an error only if the listener fails to bind.
pub fn run(port: u16, state: Arc<MasterState>) -> Result<(), NetError> {
    let server = Server::http(("0.0.0.0", port)).map_err(|e| NetError::Http(e.to_string()))?;
    info!(port, "master listening");

    for request in server.incoming_requests() {
        let state = Arc::clone(&state);
        std::thread::spawn(move || {
            if let Err(err) = handle_request(request, &state) {
                warn!(%err, "error handling request");
            }
        });
    }
    Ok(())
}

fn handle_request(
    request: tiny_http::Request,
    state: &MasterState,
) -> Result<(), NetError> {
    let method = request.method().clone();
    let url = request.url().to_string();
    let (path, query) = split_query(&url);
    let path = path.to_string();
    debug!(%method, %path, "request received");

    match (&method, path.as_str()) {
        (Method::Get, "/api/scene") => respond_scene(request, state),
        (Method::Get, "/api/work") => respond_work(request, query, state),
        (Method::Post, "/api/register") => respond_register(request, state),
        (Method::Post, "/api/result") => respond_result(request, state),
        (Method::Get | Method::Post, _) => respond_error(request, 404, "not found"),
        _ => respond_error(request, 405, "method not allowed"),
    }
}

fn split_query(url: &str) -> (&str, &str) {
    match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url, ""),
    }
}

fn parse_query(query: &str) -> std::collections::HashMap<&str, &str> {
    query
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .collect()
}

fn respond_scene(request: tiny_http::Request, state: &MasterState) -> Result<(), NetError> {
    let body = SceneResponse {
        scene_crc: state.scene.scene_crc(),
        scene_json: state.scene.scene_json().to_string(),
    };
    respond_json(request, 200, &body)
}

fn respond_work(
    request: tiny_http::Request,
    query: &str,
    state: &MasterState,
) -> Result<(), NetError> {
    let params = parse_query(query);
    let Some(work_query) = WorkQuery::from_params(&params) else {
        return respond_error(request, 400, "/api/work missing parameters");
    };

    if work_query.scene_crc != state.scene.scene_crc() {
        return respond_error(request, 400, "/api/work wrong scene crc found");
    }

    match state.work.claim_next() {
        None => respond_json(
            request,
            200,
            &WorkDoneResponse {
                status: "all work done".to_string(),
            },
        ),
        Some((tile_id, tile)) => {
            state.assignment.mark_in_flight(tile_id, None);
            respond_json(request, 200, &WorkResponse { tile_id, tile })
        }
    }
}

fn respond_register(mut request: tiny_http::Request, state: &MasterState) -> Result<(), NetError> {
    let body = match read_body(&mut request)? {
        Ok(bytes) => bytes,
        Err(err) => return respond_error(request, 413, &err.to_string()),
    };
    let reg: RegisterRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => return respond_error(request, 400, &e.to_string()),
    };

    if !(0.0..=10.0).contains(&reg.perf) || reg.thread_count == 0 {
        return respond_error(request, 400, "invalid MachineInfo");
    }

    let mut names = state.registered_names.lock().unwrap();
    let unique = names.insert(reg.name.clone());
    drop(names);
    if !unique {
        warn!(name = %reg.name, "duplicate worker name registered (best-effort check)");
    }
    info!(name = %reg.name, perf = reg.perf, "worker registered");

    respond_json(request, 200, &RegisterResponse { success: true })
}

fn respond_result(mut request: tiny_http::Request, state: &MasterState) -> Result<(), NetError> {
    let body = match read_body(&mut request)? {
        Ok(bytes) => bytes,
        Err(err) => return respond_error(request, 413, &err.to_string()),
    };
    let res: ResultRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => return respond_error(request, 400, &e.to_string()),
    };

    let tile_count = state.work.tile_count();
    if res.tile_id >= tile_count {
        let err = NetError::TileIdOutOfRange {
            tile_id: res.tile_id,
            tile_count,
        };
        return respond_error(request, 400, &err.to_string());
    }
    let tile = state.work.tiles[res.tile_id];

    let pixels = match hex::decode(&res.pixels, tile.pixel_count()) {
        Ok(p) => p,
        Err(e) => return respond_error(request, 400, &e.to_string()),
    };

    {
        let mut image = state.image.lock().unwrap();
        for row in 0..tile.th {
            for col in 0..tile.tw {
                let px = tile.x + col;
                let py = tile.y + row;
                image.set_pixel(px, py, pixels[row as usize * tile.tw as usize + col as usize]);
            }
        }
    }
    state.assignment.mark_completed(res.tile_id);
    debug!(name = %res.name, tile_id = res.tile_id, "tile result integrated");

    respond_json(request, 200, &ResultResponse { success: true })
}

/// Reads the request body, enforcing the `413` cap. Returns `Ok(Err(..))`
/// (not `Err`) for the "reply and move on" oversized case, since the
/// request still needs a response sent.
fn read_body(request: &mut tiny_http::Request) -> Result<Result<Vec<u8>, NetError>, NetError> {
    if let Some(len) = request.body_length() {
        if len > MAX_PAYLOAD_BYTES {
            return Ok(Err(NetError::PayloadTooLarge {
                size: len,
                max: MAX_PAYLOAD_BYTES,
            }));
        }
    }
    let mut buf = Vec::new();
    request
        .as_reader()
        .take(MAX_PAYLOAD_BYTES as u64 + 1)
        .read_to_end(&mut buf)?;
    if buf.len() > MAX_PAYLOAD_BYTES {
        return Ok(Err(NetError::PayloadTooLarge {
            size: buf.len(),
            max: MAX_PAYLOAD_BYTES,
        }));
    }
    let _ = MEMORY_BUFFER_BYTES;
    Ok(Ok(buf))
}

fn respond_json(
    request: tiny_http::Request,
    status: u16,
    body: &impl serde::Serialize,
) -> Result<(), NetError> {
    let json = serde_json::to_string(body).map_err(|e| NetError::Protocol(e.to_string()))?;
    let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
    let response = Response::from_string(json)
        .with_status_code(status)
        .with_header(header);
    request.respond(response)?;
    Ok(())
}

fn respond_error(request: tiny_http::Request, status: u16, message: &str) -> Result<(), NetError> {
    respond_json(request, status, &ErrorResponse::new(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use raybun_core::{CameraDesc, Material, Primitive, Vec3};

    fn sample_state() -> MasterState {
        let camera_desc = CameraDesc {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            vfov_degrees: 60.0,
            aspect_ratio: 1.0,
            aperture: 0.0,
            focus_distance: 1.0,
        };
        let sphere = Primitive::Sphere {
            center: Vec3::new(0.0, 0.0, -3.0),
            radius: 1.0,
            mat_index: 0,
        };
        let material = Material::Lambertian {
            albedo: Vec3::new(1.0, 0.0, 0.0),
        };
        let scene = Scene::build(
            vec![material],
            vec![sphere],
            &camera_desc,
            "{\"a\":1}".to_string(),
        )
        .unwrap();
        let image = State::new(64, 64, 1, 1);
        MasterState::new(scene, image)
    }

    #[test]
    fn query_parsing_splits_path_and_params() {
        let (path, query) = split_query("/api/work?worker_id=w1&scene_crc=42");
        assert_eq!(path, "/api/work");
        let params = parse_query(query);
        assert_eq!(params.get("worker_id"), Some(&"w1"));
        assert_eq!(params.get("scene_crc"), Some(&"42"));
    }

    #[test]
    fn claim_next_and_assignment_stay_in_sync() {
        let state = sample_state();
        let (tile_id, _tile) = state.work.claim_next().unwrap();
        state.assignment.mark_in_flight(tile_id, None);
        assert_eq!(
            state.assignment.status(tile_id),
            Some(crate::assignment::TileStatus::InFlight)
        );
        state.assignment.mark_completed(tile_id);
        assert_eq!(
            state.assignment.status(tile_id),
            Some(crate::assignment::TileStatus::Completed)
        );
    }

    #[test]
    fn scene_crc_is_stable() {
        let state = sample_state();
        assert_eq!(state.scene.scene_crc(), crc32fast::hash(b"{\"a\":1}"));
    }
}
