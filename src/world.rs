use anyhow::Result;
use log::debug;
use rand::distr::Uniform;
use rand::prelude::*;
use stigmergy_common::{Adversary, ResourceCluster, Vec2};

/// Attraction added per resource covering a sample point, per unit of intensity.
pub const RESOURCE_ATTRACTION: f32 = 5.0;
/// Repulsion subtracted per adversary covering a sample point, per unit of pressure.
pub const ADVERSARY_REPULSION: f32 = 10.0;
/// Body radius of every adversary.
pub const ADVERSARY_RADIUS: f32 = 8.0;

const RESOURCE_RADIUS_RANGE: (f32, f32) = (10.0, 30.0);
const RESOURCE_INTENSITY_RANGE: (f32, f32) = (0.5, 1.0);
const ADVERSARY_MAX_SPEED: f32 = 0.25;

/// Resources and adversaries of one world. Counts are fixed between resets.
#[derive(Debug, Clone)]
pub struct WorldEntities {
    grid_size: f32,
    resource_count: usize,
    adversary_count: usize,
    pub resources: Vec<ResourceCluster>,
    pub adversaries: Vec<Adversary>,
}

impl WorldEntities {
    /// An empty world over a `grid_size` square; call [`Self::regenerate`] to populate it.
    pub fn new(grid_size: usize, resource_count: usize, adversary_count: usize) -> Self {
        Self {
            grid_size: grid_size as f32,
            resource_count,
            adversary_count,
            resources: Vec::with_capacity(resource_count),
            adversaries: Vec::with_capacity(adversary_count),
        }
    }

    /// Builds a world from explicit entities, e.g. a fixed scenario.
    pub fn with_entities(
        grid_size: usize,
        resources: Vec<ResourceCluster>,
        adversaries: Vec<Adversary>,
    ) -> Self {
        Self {
            grid_size: grid_size as f32,
            resource_count: resources.len(),
            adversary_count: adversaries.len(),
            resources,
            adversaries,
        }
    }

    /// Redraws every resource and adversary.
    pub fn regenerate<R: Rng>(&mut self, rng: &mut R) -> Result<()> {
        let pos_dist = Uniform::new(0.0f32, self.grid_size)?;
        let radius_dist = Uniform::new(RESOURCE_RADIUS_RANGE.0, RESOURCE_RADIUS_RANGE.1)?;
        let intensity_dist = Uniform::new(RESOURCE_INTENSITY_RANGE.0, RESOURCE_INTENSITY_RANGE.1)?;
        let vel_dist = Uniform::new(-ADVERSARY_MAX_SPEED, ADVERSARY_MAX_SPEED)?;

        self.resources = (0..self.resource_count)
            .map(|_| ResourceCluster {
                x: rng.sample(pos_dist),
                y: rng.sample(pos_dist),
                radius: rng.sample(radius_dist),
                intensity: rng.sample(intensity_dist),
            })
            .collect();

        self.adversaries = (0..self.adversary_count)
            .map(|_| Adversary {
                x: rng.sample(pos_dist),
                y: rng.sample(pos_dist),
                radius: ADVERSARY_RADIUS,
                vx: rng.sample(vel_dist),
                vy: rng.sample(vel_dist),
            })
            .collect();

        debug!(
            "Regenerated world: {} resources, {} adversaries.",
            self.resources.len(),
            self.adversaries.len()
        );
        Ok(())
    }

    /// Advances each adversary by its velocity and flips the velocity component on any
    /// axis that left `[0, N)`. The position itself is not pulled back.
    pub fn step_adversaries(&mut self) {
        let n = self.grid_size;
        for adv in &mut self.adversaries {
            adv.x += adv.vx;
            adv.y += adv.vy;
            if adv.x < 0.0 || adv.x >= n {
                adv.vx = -adv.vx;
            }
            if adv.y < 0.0 || adv.y >= n {
                adv.vy = -adv.vy;
            }
        }
    }

    /// Additive potential at an integer cell: attraction from every covering resource
    /// minus repulsion from every adversary whose pressure-scaled radius covers the cell.
    pub fn potential_at(&self, ix: usize, iy: usize, pressure: f32) -> f32 {
        let p = Vec2::new(ix as f32, iy as f32);
        let mut val = 0.0;

        for res in &self.resources {
            if p.distance_squared(Vec2::new(res.x, res.y)) < res.radius * res.radius {
                val += res.intensity * RESOURCE_ATTRACTION;
            }
        }

        for adv in &self.adversaries {
            let rep = adv.repulsion_radius(pressure);
            if p.distance_squared(Vec2::new(adv.x, adv.y)) < rep * rep {
                val -= ADVERSARY_REPULSION * pressure;
            }
        }
        val
    }
}
