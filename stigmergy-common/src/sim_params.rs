use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_4, PI};
use std::ops::RangeInclusive;

// Enforced ranges for the behaviour parameters.
pub const PHEROMONE_DECAY_RANGE: RangeInclusive<f32> = 0.80..=0.99;
pub const SENSOR_DIST_RANGE: RangeInclusive<f32> = 1.0..=50.0;
pub const SENSOR_ANGLE_RANGE: RangeInclusive<f32> = 0.0..=PI;
pub const ROTATION_ANGLE_RANGE: RangeInclusive<f32> = 0.0..=PI;
pub const AGENT_SPEED_RANGE: RangeInclusive<f32> = 0.5..=4.0;
pub const ADVERSARIAL_PRESSURE_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const AGENT_COUNT_RANGE: RangeInclusive<i64> = 100..=5000;
pub const AGENT_COUNT_STEP: i64 = 100;

/// Per-tick behaviour parameters, already clamped into their enforced ranges.
///
/// Built from [`crate::BehaviorConfig::to_sim_params`]; the engine consumes these as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    /// Multiplicative retention per diffusion pass.
    pub pheromone_decay: f32,
    /// Sensor probe distance in cells.
    pub sensor_dist: f32,
    /// Half-angle between the center and side sensors (radians).
    pub sensor_angle: f32,
    /// Max turn per tick (radians).
    pub rotation_angle: f32,
    /// Per-tick displacement magnitude in cells.
    pub agent_speed: f32,
    /// Scales adversary repulsion radius and strength.
    pub adversarial_pressure: f32,
    /// Target population size.
    pub agent_count: usize,
}

impl Default for SimParams {
    fn default() -> Self {
        SimParams {
            pheromone_decay: 0.92,
            sensor_dist: 9.0,
            sensor_angle: FRAC_PI_4,
            rotation_angle: FRAC_PI_4,
            agent_speed: 1.5,
            adversarial_pressure: 0.5,
            agent_count: 1500,
        }
    }
}
