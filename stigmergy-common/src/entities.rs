use serde::{Deserialize, Serialize};

/// A point agent: continuous position on the torus plus an unnormalized heading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub x: f32,
    pub y: f32,
    /// Radians. Accumulates turns without being wrapped.
    pub heading: f32,
}

/// Static attractor. Positions are grid coordinates and are never wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceCluster {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub intensity: f32,
}

/// Moving repeller that bounces off the field boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adversary {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Adversary {
    /// Radius inside which agents feel this adversary.
    pub fn repulsion_radius(&self, pressure: f32) -> f32 {
        self.radius * (1.0 + pressure * 2.0)
    }

    /// Radius a renderer paints the adversary body at.
    pub fn display_radius(&self, pressure: f32) -> f32 {
        self.radius * (1.0 + pressure)
    }
}
