pub mod error;
pub mod export;
pub mod pathtracer;
pub mod render;
pub mod state;
pub mod tile;

pub use error::RenderError;
pub use pathtracer::render_tile;
pub use render::{default_thread_count, render_standalone};
pub use state::State;
pub use tile::{build_tile_grid, Tile, Work, TILE_SIZE};

pub type Result<T> = std::result::Result<T, RenderError>;
