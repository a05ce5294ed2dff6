use anyhow::Result;
use std::time::{Duration, Instant};
use log::{info, warn, error, trace};

use stigmergy_common::SimulationConfig;
use stigmergy_engine::Simulation;

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    info!("Starting Stigmergy Engine (headless)...");

    // --- Load Configuration ---
    let config = SimulationConfig::load_or_default("config.toml")?;
    let params = config.get_sim_params();
    let timing = config.timing.clone();

    // --- Initialize Simulation ---
    let mut sim = Simulation::new(config.world.clone())?;
    sim.reset(&params)?;
    info!(
        "World ready: {} agents on a {}x{} grid.",
        sim.agent_count(),
        config.world.grid_size,
        config.world.grid_size
    );

    // --- Simulation Loop ---
    let tick_budget = if timing.target_tps > 0.0 {
        Duration::try_from_secs_f32(1.0 / timing.target_tps).ok()
    } else {
        None
    };
    let status_interval = Duration::try_from_secs_f32(timing.status_interval_secs)
        .unwrap_or(Duration::from_secs(5));

    info!("Running {} ticks...", timing.total_ticks);
    let start_time = Instant::now();
    let mut previous_print_time = start_time;

    for tick in 0..timing.total_ticks {
        let tick_start_time = Instant::now();
        let frame = match sim.tick(&params) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Error during tick {}: {}", tick + 1, e);
                anyhow::bail!("Simulation tick failed.");
            }
        };
        let agents_in_frame = frame.agents.len();
        let tick_duration = tick_start_time.elapsed();

        let current_time = Instant::now();
        let is_last_tick = tick + 1 == timing.total_ticks;
        if current_time.duration_since(previous_print_time) >= status_interval || is_last_tick {
            let (field_max, field_total) = sim
                .field()
                .map(|f| (f.max_value(), f.total()))
                .unwrap_or((0.0, 0.0));
            info!(
                "Tick [{}/{}] | Agents: {} | Field max: {:.3} total: {:.1} | Tick Time: {:6.2} ms | TPS: {}",
                tick + 1,
                timing.total_ticks,
                agents_in_frame,
                field_max,
                field_total,
                tick_duration.as_secs_f64() * 1000.0,
                sim.ticks_per_second().map_or_else(|| "-".to_string(), |r| r.to_string())
            );
            previous_print_time = current_time;
        } else {
            trace!("Tick [{}/{}] completed in {:.2} ms", tick + 1, timing.total_ticks, tick_duration.as_secs_f64() * 1000.0);
        }

        // Pace to the target rate; a tick that overruns its budget is not caught up.
        if let Some(budget) = tick_budget {
            let spent = tick_start_time.elapsed();
            if spent < budget {
                std::thread::sleep(budget - spent);
            } else if spent > budget * 2 {
                warn!("Tick {} took {:.2} ms, over twice the frame budget.", tick + 1, spent.as_secs_f64() * 1000.0);
            }
        }
    }

    let total_duration = start_time.elapsed();
    info!(
        "Simulation finished {} ticks in {:.3} seconds (seed {}).",
        sim.tick_count(),
        total_duration.as_secs_f64(),
        sim.seed()
    );

    Ok(())
}
