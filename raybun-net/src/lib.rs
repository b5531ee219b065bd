pub mod assignment;
pub mod error;
pub mod hex;
pub mod machine;
pub mod master;
pub mod protocol;
pub mod worker;

pub use assignment::{TileAssignment, TileStatus};
pub use error::NetError;
pub use machine::{benchmark_self, MachineInfo};
pub use master::{MasterState, MAX_PAYLOAD_BYTES, MEMORY_BUFFER_BYTES};
pub use worker::SceneLoader;

pub type Result<T> = std::result::Result<T, NetError>;
