use serde::{Deserialize, Serialize};
use anyhow::Result;
use log::warn;
use crate::sim_params::{
    SimParams, ADVERSARIAL_PRESSURE_RANGE, AGENT_COUNT_RANGE, AGENT_COUNT_STEP,
    AGENT_SPEED_RANGE, PHEROMONE_DECAY_RANGE, ROTATION_ANGLE_RANGE, SENSOR_ANGLE_RANGE,
    SENSOR_DIST_RANGE,
};
use std::ops::RangeInclusive;
use std::path::Path;

/// Largest accepted field side length.
pub const MAX_GRID_SIZE: u32 = 4096;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiffusionMode {
    /// Single row-major pass; later cells read neighbours already updated this tick.
    #[default]
    InPlace,
    /// Reads from a copy of the previous field, giving an isotropic stencil.
    DoubleBuffered,
}

// Configuration for world properties, fixed for the lifetime of a simulation.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub grid_size: u32,
    pub resource_count: usize,
    pub adversary_count: usize,
    /// Seed for the simulation RNG. `None` draws one from the OS.
    pub seed: Option<u64>,
    pub diffusion: DiffusionMode,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            grid_size: 200,
            resource_count: 5,
            adversary_count: 3,
            seed: None,
            diffusion: DiffusionMode::InPlace,
        }
    }
}

// Agent behaviour knobs as supplied by a controller. Values are loose here and
// only become trusted once converted into `SimParams`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BehaviorConfig {
    pub pheromone_decay: f32,
    pub sensor_dist: f32,
    pub sensor_angle: f32,
    pub rotation_angle: f32,
    pub agent_speed: f32,
    pub adversarial_pressure: f32,
    pub agent_count: i64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        let params = SimParams::default();
        BehaviorConfig {
            pheromone_decay: params.pheromone_decay,
            sensor_dist: params.sensor_dist,
            sensor_angle: params.sensor_angle,
            rotation_angle: params.rotation_angle,
            agent_speed: params.agent_speed,
            adversarial_pressure: params.adversarial_pressure,
            agent_count: params.agent_count as i64,
        }
    }
}

// Configuration for the headless host loop
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TimingConfig {
    #[serde(default = "default_total_ticks")]
    pub total_ticks: u64,
    /// Ticks per second to pace the loop at. 0 runs unpaced.
    #[serde(default = "default_target_tps")]
    pub target_tps: f32,
    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: f32,
}

fn default_total_ticks() -> u64 {
    600
}

fn default_target_tps() -> f32 {
    60.0
}

fn default_status_interval_secs() -> f32 {
    5.0
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            total_ticks: default_total_ticks(),
            target_tps: default_target_tps(),
            status_interval_secs: default_status_interval_secs(),
        }
    }
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct SimulationConfig {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))
    }

    /// Loads the configuration if the file exists, otherwise falls back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        if path_ref.exists() {
            Self::load(path_ref)
        } else {
            warn!("Config file '{}' not found. Using built-in defaults.", path_ref.display());
            Ok(Self::default())
        }
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the engine cannot run with. Behaviour values are not
    /// checked here; they are clamped by `get_sim_params`.
    pub fn validate(&self) -> Result<()> {
        if self.world.grid_size == 0 || self.world.grid_size > MAX_GRID_SIZE {
            anyhow::bail!("grid_size must be between 1 and {}.", MAX_GRID_SIZE);
        }
        if !self.timing.target_tps.is_finite() || self.timing.target_tps < 0.0 {
            anyhow::bail!("target_tps must be a finite, non-negative number.");
        }
        if !self.timing.status_interval_secs.is_finite() || self.timing.status_interval_secs <= 0.0 {
            anyhow::bail!("status_interval_secs must be positive.");
        }
        Ok(())
    }

    /// Converts the configuration into the clamped parameters used at runtime.
    pub fn get_sim_params(&self) -> SimParams {
        self.behavior.to_sim_params()
    }
}

impl BehaviorConfig {
    /// Clamps every value into its enforced range.
    ///
    /// NaN falls back to the default for that field; infinities clamp to the nearest bound.
    pub fn to_sim_params(&self) -> SimParams {
        let defaults = SimParams::default();
        SimParams {
            pheromone_decay: clamp_param("pheromone_decay", self.pheromone_decay, PHEROMONE_DECAY_RANGE, defaults.pheromone_decay),
            sensor_dist: clamp_param("sensor_dist", self.sensor_dist, SENSOR_DIST_RANGE, defaults.sensor_dist),
            sensor_angle: clamp_param("sensor_angle", self.sensor_angle, SENSOR_ANGLE_RANGE, defaults.sensor_angle),
            rotation_angle: clamp_param("rotation_angle", self.rotation_angle, ROTATION_ANGLE_RANGE, defaults.rotation_angle),
            agent_speed: clamp_param("agent_speed", self.agent_speed, AGENT_SPEED_RANGE, defaults.agent_speed),
            adversarial_pressure: clamp_param("adversarial_pressure", self.adversarial_pressure, ADVERSARIAL_PRESSURE_RANGE, defaults.adversarial_pressure),
            agent_count: clamp_agent_count(self.agent_count),
        }
    }
}

fn clamp_param(name: &str, value: f32, range: RangeInclusive<f32>, fallback: f32) -> f32 {
    if value.is_nan() {
        warn!("{} is NaN. Using default {}.", name, fallback);
        return fallback;
    }
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        warn!("{} = {} is outside [{}, {}]. Clamped to {}.", name, value, range.start(), range.end(), clamped);
    }
    clamped
}

// Clamps to the enforced range and snaps to the nearest step.
fn clamp_agent_count(value: i64) -> usize {
    let clamped = value.clamp(*AGENT_COUNT_RANGE.start(), *AGENT_COUNT_RANGE.end());
    let snapped = (clamped + AGENT_COUNT_STEP / 2) / AGENT_COUNT_STEP * AGENT_COUNT_STEP;
    let snapped = snapped.min(*AGENT_COUNT_RANGE.end());
    if snapped != value {
        warn!("agent_count = {} adjusted to {}.", value, snapped);
    }
    snapped as usize
}
