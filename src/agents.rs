use crate::field::PheromoneField;
use crate::world::WorldEntities;
use anyhow::Result;
use log::{debug, trace};
use rand::distr::Uniform;
use rand::prelude::*;
use stigmergy_common::{angle_to_vec, wrap_coord, Agent, SimParams, Vec2};

/// Trace laid by every agent on its cell after moving.
pub const DEPOSIT_AMOUNT: f32 = 0.5;

/// Combined potential read by the three sensors of one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub left: f32,
    pub center: f32,
    pub right: f32,
}

/// Steering decision derived from a [`SensorReading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// Keep the current heading.
    Straight,
    /// Center is the strict minimum: rotate by a random amount within the turn increment.
    Wander,
    /// Rotate by `+rotation_angle`, towards the left sensor.
    Left,
    /// Rotate by `-rotation_angle`, towards the right sensor.
    Right,
}

/// Picks a turn. Rules are checked in order; a center that ties the best side counts as
/// the best. `left == right` with a non-extremal center has no rule and keeps the heading.
pub fn steer(reading: SensorReading) -> Turn {
    let SensorReading { left, center, right } = reading;
    if center >= left && center >= right {
        Turn::Straight
    } else if center < left && center < right {
        Turn::Wander
    } else if left > right {
        Turn::Left
    } else if right > left {
        Turn::Right
    } else {
        Turn::Straight
    }
}

// Field value plus entity potential at the cell under a probe point.
// Entity distances use the wrapped integer cell, not the raw probe position.
#[inline(always)]
fn probe(field: &PheromoneField, world: &WorldEntities, point: Vec2, pressure: f32) -> f32 {
    let (ix, iy) = field.cell_coords(point.x, point.y);
    field.value_at(ix, iy) + world.potential_at(ix, iy, pressure)
}

/// Reads the left (`heading + sensor_angle`), center and right (`heading - sensor_angle`) sensors.
pub fn sense(agent: &Agent, field: &PheromoneField, world: &WorldEntities, params: &SimParams) -> SensorReading {
    let origin = Vec2::new(agent.x, agent.y);
    let at = |angle: f32| origin + angle_to_vec(angle) * params.sensor_dist;
    let pressure = params.adversarial_pressure;
    SensorReading {
        left: probe(field, world, at(agent.heading + params.sensor_angle), pressure),
        center: probe(field, world, at(agent.heading), pressure),
        right: probe(field, world, at(agent.heading - params.sensor_angle), pressure),
    }
}

/// Resizable agent store. Resizing never touches the agents that survive it.
#[derive(Debug, Clone)]
pub struct AgentPool {
    grid_size: usize,
    agents: Vec<Agent>,
}

impl AgentPool {
    /// An empty pool for a `grid_size` square field.
    pub fn new(grid_size: usize) -> Self {
        Self { grid_size, agents: Vec::new() }
    }

    /// A pool holding exactly the given agents.
    pub fn from_agents(grid_size: usize, agents: Vec<Agent>) -> Self {
        Self { grid_size, agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Grows or shrinks to `new_count` agents.
    ///
    /// The first `min(new_count, len)` agents are kept as-is. Extra slots get a uniform
    /// random position on the field and a uniform heading in `[0, 2π)`.
    pub fn resize<R: Rng>(&mut self, new_count: usize, rng: &mut R) -> Result<()> {
        let old_count = self.agents.len();
        if new_count == old_count {
            return Ok(());
        }

        if new_count < old_count {
            self.agents.truncate(new_count);
        } else {
            let pos_dist = Uniform::new(0.0f32, self.grid_size as f32)?;
            let angle_dist = Uniform::new(0.0f32, std::f32::consts::TAU)?;
            self.agents.reserve(new_count - old_count);
            for _ in old_count..new_count {
                self.agents.push(Agent {
                    x: rng.sample(pos_dist),
                    y: rng.sample(pos_dist),
                    heading: rng.sample(angle_dist),
                });
            }
        }
        debug!("Resized agent pool from {} to {} agents.", old_count, new_count);
        Ok(())
    }

    /// Runs one sense → steer → move → deposit update for every agent, in index order.
    pub fn step<R: Rng>(
        &mut self,
        field: &mut PheromoneField,
        world: &WorldEntities,
        params: &SimParams,
        rng: &mut R,
    ) {
        let n = self.grid_size as f32;
        let mut wanders = 0usize;

        for agent in &mut self.agents {
            let reading = sense(agent, field, world, params);

            match steer(reading) {
                Turn::Straight => {}
                Turn::Wander => {
                    agent.heading += (rng.random::<f32>() - 0.5) * 2.0 * params.rotation_angle;
                    wanders += 1;
                }
                Turn::Left => agent.heading += params.rotation_angle,
                Turn::Right => agent.heading -= params.rotation_angle,
            }

            let step = angle_to_vec(agent.heading) * params.agent_speed;
            agent.x = wrap_coord(agent.x + step.x, n);
            agent.y = wrap_coord(agent.y + step.y, n);

            field.deposit(agent.x, agent.y, DEPOSIT_AMOUNT);
        }

        trace!("Agent step: {} of {} agents wandered.", wanders, self.agents.len());
    }
}
