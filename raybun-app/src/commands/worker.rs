use anyhow::Result;
use tracing::info;

use crate::scene_json::load_scene;

/// Runs the worker loop against `master_url` until the master reports no
/// tiles remain (§4.7). `device_id` defaults to a fixed name when omitted;
/// uniqueness is only checked best-effort by the master.
pub fn run(master_url: &str, device_id: Option<String>) -> Result<()> {
    let name = device_id.unwrap_or_else(|| "raybun-worker".to_string());
    info!(master_url, name = %name, "worker starting");
    raybun_net::worker::run(master_url, &name, &|json| {
        load_scene(json).map_err(|e| raybun_net::NetError::Protocol(e.to_string()))
    })?;
    Ok(())
}
