use thiserror::Error;

/// Errors surfaced at the CLI boundary (§7 `ConfigError`). The binary
/// converts any of these to exit code 1 with a stderr message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("cannot read scene file {path}: {source}")]
    SceneFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scene JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("scene is missing required section {0:?}")]
    MissingSection(&'static str),

    #[error(transparent)]
    Core(#[from] raybun_core::CoreError),

    #[error(transparent)]
    Render(#[from] raybun_render::RenderError),

    #[error(transparent)]
    Net(#[from] raybun_net::NetError),
}
