use crate::agents::AgentPool;
use crate::field::PheromoneField;
use crate::tick_rate::TickRateMeter;
use crate::world::WorldEntities;
use anyhow::Result;
use log::{debug, info, trace};
use rand::prelude::*;
use serde::Serialize;
use stigmergy_common::{
    Adversary, Agent, ResourceCluster, SimParams, Snapshot, WorldConfig, MAX_GRID_SIZE,
};

/// A read-only view of the simulation right after a tick, borrowed from the engine.
/// Serializes to the same shape as [`Snapshot`] without copying.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Frame<'a> {
    pub tick: u64,
    pub grid_size: usize,
    /// Row-major field values (`iy * grid_size + ix`).
    pub field: &'a [f32],
    pub agents: &'a [Agent],
    pub resources: &'a [ResourceCluster],
    pub adversaries: &'a [Adversary],
    pub adversarial_pressure: f32,
}

impl Frame<'_> {
    /// Copies the frame into an owned, serializable [`Snapshot`].
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            grid_size: self.grid_size as u32,
            field: self.field.to_vec(),
            agents: self.agents.to_vec(),
            resources: self.resources.to_vec(),
            adversaries: self.adversaries.to_vec(),
            adversarial_pressure: self.adversarial_pressure,
        }
    }
}

/// Everything that exists only once a world has been reset.
#[derive(Debug)]
struct World {
    field: PheromoneField,
    entities: WorldEntities,
    pool: AgentPool,
}

#[derive(Debug)]
enum SimState {
    /// No world allocated yet.
    Idle,
    Running(World),
}

/// Sequences adversary motion, the agent pass and diffusion into discrete ticks.
pub struct Simulation {
    /// World settings fixed for the lifetime of the simulation.
    config: WorldConfig,
    state: SimState,
    /// Single RNG for placement and wander turns. Seeded, so runs are reproducible.
    rng: StdRng,
    seed: u64,
    tick: u64,
    adversarial_pressure: f32,
    tick_rate: TickRateMeter,
}

impl Simulation {
    /// Creates an idle simulation. Call [`Self::reset`] before ticking.
    pub fn new(config: WorldConfig) -> Result<Self> {
        if config.grid_size == 0 || config.grid_size > MAX_GRID_SIZE {
            anyhow::bail!("grid_size must be between 1 and {}, got {}.", MAX_GRID_SIZE, config.grid_size);
        }
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        info!("Simulation RNG seed: {}", seed);

        Ok(Self {
            config,
            state: SimState::Idle,
            rng: StdRng::seed_from_u64(seed),
            seed,
            tick: 0,
            adversarial_pressure: 0.0,
            tick_rate: TickRateMeter::new(),
        })
    }

    /// Starts a fresh world: clears the field, redraws resources and adversaries and
    /// sizes the pool to `params.agent_count`.
    ///
    /// Agents that already exist survive a reset; only the population size is adjusted.
    pub fn reset(&mut self, params: &SimParams) -> Result<()> {
        let n = self.config.grid_size as usize;
        let fresh = match &mut self.state {
            SimState::Running(world) => {
                world.field.clear();
                world.entities.regenerate(&mut self.rng)?;
                world.pool.resize(params.agent_count, &mut self.rng)?;
                None
            }
            SimState::Idle => {
                let field = PheromoneField::new(n, self.config.diffusion)?;
                let mut entities =
                    WorldEntities::new(n, self.config.resource_count, self.config.adversary_count);
                entities.regenerate(&mut self.rng)?;
                let mut pool = AgentPool::new(n);
                pool.resize(params.agent_count, &mut self.rng)?;
                Some(World { field, entities, pool })
            }
        };
        if let Some(world) = fresh {
            self.state = SimState::Running(world);
        }
        self.tick = 0;
        self.adversarial_pressure = params.adversarial_pressure;
        self.tick_rate.reset();

        info!(
            "World reset: {}x{} field ({:?} diffusion), {} resources, {} adversaries, {} agents.",
            n,
            n,
            self.config.diffusion,
            self.config.resource_count,
            self.config.adversary_count,
            params.agent_count
        );
        Ok(())
    }

    /// Changes the population between ticks without touching the world.
    pub fn resize_agents(&mut self, count: usize) -> Result<()> {
        match &mut self.state {
            SimState::Running(world) => world.pool.resize(count, &mut self.rng),
            SimState::Idle => anyhow::bail!("Cannot resize agents before the world is reset."),
        }
    }

    /// Advances the simulation by one tick and returns the resulting frame.
    ///
    /// Order: population resize (if `agent_count` changed) → adversaries → agents →
    /// diffusion and decay.
    pub fn tick(&mut self, params: &SimParams) -> Result<Frame<'_>> {
        let world = match &mut self.state {
            SimState::Running(world) => world,
            SimState::Idle => anyhow::bail!("tick() called before reset()."),
        };

        if world.pool.len() != params.agent_count {
            world.pool.resize(params.agent_count, &mut self.rng)?;
        }

        world.entities.step_adversaries();
        world.pool.step(&mut world.field, &world.entities, params, &mut self.rng);
        world.field.diffuse_and_decay(params.pheromone_decay);

        self.tick += 1;
        self.adversarial_pressure = params.adversarial_pressure;
        trace!("Tick {} complete.", self.tick);

        if let Some(rate) = self.tick_rate.record() {
            debug!("Tick rate: {} ticks/s", rate);
        }

        self.frame()
            .ok_or_else(|| anyhow::anyhow!("World vanished during tick {}.", self.tick))
    }

    /// The current frame, or `None` while idle.
    pub fn frame(&self) -> Option<Frame<'_>> {
        match &self.state {
            SimState::Running(world) => Some(Frame {
                tick: self.tick,
                grid_size: world.field.size(),
                field: world.field.values(),
                agents: world.pool.agents(),
                resources: &world.entities.resources,
                adversaries: &world.entities.adversaries,
                adversarial_pressure: self.adversarial_pressure,
            }),
            SimState::Idle => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SimState::Running(_))
    }

    /// Ticks completed since the last reset.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn agent_count(&self) -> usize {
        match &self.state {
            SimState::Running(world) => world.pool.len(),
            SimState::Idle => 0,
        }
    }

    pub fn field(&self) -> Option<&PheromoneField> {
        match &self.state {
            SimState::Running(world) => Some(&world.field),
            SimState::Idle => None,
        }
    }

    pub fn entities(&self) -> Option<&WorldEntities> {
        match &self.state {
            SimState::Running(world) => Some(&world.entities),
            SimState::Idle => None,
        }
    }

    /// Ticks per second over the last full second of wall time.
    pub fn ticks_per_second(&self) -> Option<u32> {
        self.tick_rate.ticks_per_second()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_config(seed: u64) -> WorldConfig {
        WorldConfig {
            grid_size: 64,
            seed: Some(seed),
            ..WorldConfig::default()
        }
    }

    fn params(agent_count: usize) -> SimParams {
        SimParams {
            agent_count,
            ..SimParams::default()
        }
    }

    #[test]
    fn rejects_bad_grid_size() {
        let config = WorldConfig { grid_size: 0, ..WorldConfig::default() };
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn tick_requires_reset() {
        let mut sim = Simulation::new(world_config(1)).unwrap();
        assert!(!sim.is_running());
        assert!(sim.frame().is_none());
        assert!(sim.tick(&params(10)).is_err());
        assert!(sim.resize_agents(10).is_err());
        assert_eq!(sim.agent_count(), 0);
    }

    #[test]
    fn reset_allocates_world() {
        let mut sim = Simulation::new(world_config(2)).unwrap();
        sim.reset(&params(40)).unwrap();
        assert!(sim.is_running());
        assert_eq!(sim.agent_count(), 40);
        let frame = sim.frame().unwrap();
        assert_eq!(frame.tick, 0);
        assert_eq!(frame.grid_size, 64);
        assert_eq!(frame.field.len(), 64 * 64);
        assert_eq!(frame.resources.len(), 5);
        assert_eq!(frame.adversaries.len(), 3);
        assert!(frame.field.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn agent_count_change_resizes_without_new_world() {
        let mut sim = Simulation::new(world_config(3)).unwrap();
        sim.reset(&params(20)).unwrap();
        sim.tick(&params(20)).unwrap();
        let resources = sim.entities().unwrap().resources.clone();

        let frame = sim.tick(&params(50)).unwrap();
        assert_eq!(frame.agents.len(), 50);
        assert_eq!(frame.resources, resources.as_slice());
        assert_eq!(frame.tick, 2);
        // Field trace from the first tick was not cleared.
        assert!(frame.field.iter().any(|&v| v > 0.0));

        sim.resize_agents(5).unwrap();
        assert_eq!(sim.agent_count(), 5);
    }

    #[test]
    fn reset_while_running_keeps_agents_and_redraws_world() {
        let mut sim = Simulation::new(world_config(4)).unwrap();
        sim.reset(&params(30)).unwrap();
        for _ in 0..3 {
            sim.tick(&params(30)).unwrap();
        }
        let agents = sim.frame().unwrap().agents.to_vec();
        let resources = sim.entities().unwrap().resources.clone();

        sim.reset(&params(30)).unwrap();
        let frame = sim.frame().unwrap();
        assert_eq!(frame.tick, 0);
        assert_eq!(frame.agents, agents.as_slice());
        assert_ne!(frame.resources, resources.as_slice());
        assert!(frame.field.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn snapshot_copies_frame() {
        let mut sim = Simulation::new(world_config(5)).unwrap();
        let p = SimParams { adversarial_pressure: 0.25, ..params(10) };
        sim.reset(&p).unwrap();
        let snapshot = sim.tick(&p).unwrap().to_snapshot();
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.grid_size, 64);
        assert_eq!(snapshot.agents.len(), 10);
        assert_eq!(snapshot.agent_positions().len(), 10);
        assert_eq!(snapshot.adversarial_pressure, 0.25);
        assert_eq!(snapshot.cell(0, 0), Some(snapshot.field[0]));
        assert_eq!(snapshot.cell(64, 0), None);
    }
}
