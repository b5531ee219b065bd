//! Wire types for the master/worker HTTP API (§4.6/§6). All bodies are
//! `application/json`.

use serde::{Deserialize, Serialize};

use raybun_render::Tile;

/// `GET /api/scene` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneResponse {
    pub scene_crc: u32,
    pub scene_json: String,
}

/// `GET /api/work` query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkQuery {
    pub worker_id: String,
    pub scene_crc: u32,
}

impl WorkQuery {
    /// Builds a `WorkQuery` from the already-split `key=value` query params,
    /// or `None` if either field is missing/unparseable.
    pub fn from_params(params: &std::collections::HashMap<&str, &str>) -> Option<Self> {
        Some(Self {
            worker_id: (*params.get("worker_id")?).to_string(),
            scene_crc: params.get("scene_crc")?.parse().ok()?,
        })
    }
}

/// `GET /api/work` success response: a tile to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkResponse {
    pub tile_id: usize,
    pub tile: Tile,
}

/// `GET /api/work` response when no tiles remain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkDoneResponse {
    pub status: String,
}

/// `POST /api/register` request body, mirroring `MachineInfo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub perf: f32,
    pub thread_count: u32,
    pub simd: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
}

/// `POST /api/result` request body. `pixels` is the hex codec of
/// [`crate::hex`], length `tw * th * 8`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRequest {
    pub name: String,
    pub tile_id: usize,
    pub pixels: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultResponse {
    pub success: bool,
}

/// Error body for any non-2xx JSON response (§7 `ProtocolError`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_response_round_trips_through_json() {
        let resp = SceneResponse {
            scene_crc: 0xdead_beef,
            scene_json: "{\"a\":1}".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        let back: SceneResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back.scene_crc, resp.scene_crc);
        assert_eq!(back.scene_json, resp.scene_json);
    }

    #[test]
    fn work_response_carries_tile_fields() {
        let resp = WorkResponse {
            tile_id: 3,
            tile: Tile {
                x: 64,
                y: 0,
                tw: 64,
                th: 64,
            },
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"tile_id\":3"));
        assert!(json.contains("\"tw\":64"));
    }
}
