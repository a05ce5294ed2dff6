//! Stigmergic swarm simulation engine.
//!
//! Agents sense and reinforce a shared toroidal pheromone field while being pulled
//! towards static resources and pushed away from moving adversaries. [`Simulation`]
//! drives one tick at a time and hands back a borrowed [`Frame`] for rendering.

pub mod agents;
pub mod field;
pub mod simulation;
pub mod tick_rate;
pub mod world;

pub use agents::{sense, steer, AgentPool, SensorReading, Turn, DEPOSIT_AMOUNT};
pub use field::PheromoneField;
pub use simulation::{Frame, Simulation};
pub use tick_rate::TickRateMeter;
pub use world::WorldEntities;
