pub mod config;
pub mod entities;
pub mod sim_params;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{SimulationConfig, WorldConfig, BehaviorConfig, TimingConfig, DiffusionMode, MAX_GRID_SIZE};
pub use entities::{Agent, ResourceCluster, Adversary};
pub use sim_params::SimParams;
pub use snapshot::Snapshot;
pub use vecmath::{Vec2, angle_to_vec, wrap_coord};
