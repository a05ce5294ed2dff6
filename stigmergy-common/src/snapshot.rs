use serde::{Serialize, Deserialize};
use crate::entities::{Adversary, Agent, ResourceCluster};

/// An owned copy of one simulation frame, detached from the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of ticks completed when the snapshot was taken.
    pub tick: u64,
    /// Side length of the square field.
    pub grid_size: u32,
    /// Row-major field values (`iy * grid_size + ix`), each in `[0, 1]`.
    pub field: Vec<f32>,
    pub agents: Vec<Agent>,
    pub resources: Vec<ResourceCluster>,
    pub adversaries: Vec<Adversary>,
    /// Pressure in effect for the tick, needed to size adversary bodies.
    pub adversarial_pressure: f32,
}

impl Snapshot {
    /// Field value at a cell, or `None` outside the grid.
    pub fn cell(&self, ix: u32, iy: u32) -> Option<f32> {
        if ix >= self.grid_size || iy >= self.grid_size {
            return None;
        }
        self.field.get((iy * self.grid_size + ix) as usize).copied()
    }

    /// Agent positions, the minimum a renderer needs to plot the swarm.
    pub fn agent_positions(&self) -> Vec<(f32, f32)> {
        self.agents.iter().map(|a| (a.x, a.y)).collect()
    }

    /// Adversary centers with the body radius to paint them at under this frame's pressure.
    pub fn adversary_bodies(&self) -> Vec<(f32, f32, f32)> {
        self.adversaries
            .iter()
            .map(|a| (a.x, a.y, a.display_radius(self.adversarial_pressure)))
            .collect()
    }
}
