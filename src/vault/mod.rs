//! The `ChunkVault` orchestrator: owns the metadata store, the vector
//! index, and the liveness map binding them together.

pub mod lifecycle;
mod liveness;
mod mutation;
mod search;

pub use lifecycle::ChunkVault;
pub use liveness::{LivenessMap, PositionState};
