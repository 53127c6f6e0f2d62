use crate::game::constants::TICK_BUDGET_MS;
use crate::game::types::{Food, SnakeId};
use crate::game::world::World;
use serde::Serialize;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, MissedTickBehavior};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub port: u16,
    pub tick_ms: u64,
    pub seed: Option<u64>,
    pub debug_commands: bool,
}

impl RuntimeConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(8080);
        let tick_ms = lookup("TICK_MS")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(10);
        if tick_ms == 0 {
            anyhow::bail!("TICK_MS must be positive");
        }
        let seed = lookup("WORLD_SEED").and_then(|value| value.trim().parse().ok());
        let debug_commands = lookup("ENABLE_DEBUG_COMMANDS")
            .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE"))
            .unwrap_or(false);
        Ok(Self {
            port,
            tick_ms,
            seed,
            debug_commands,
        })
    }
}

/// Everything one snake produced since the previous drain.
#[derive(Debug, Clone, Serialize)]
pub struct SnakeUpdate {
    pub id: SnakeId,
    pub changes: u8,
    pub eaten: Vec<Food>,
    pub spawned: Vec<Food>,
    /// Sector `(col, row)` pairs that entered the viewport.
    pub entered: Vec<(u8, u8)>,
    pub left: Vec<(u8, u8)>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct TickReport {
    pub updates: Vec<SnakeUpdate>,
    pub dead: Vec<SnakeId>,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.dead.is_empty()
    }

    pub fn food_events(&self) -> usize {
        self.updates
            .iter()
            .map(|update| update.eaten.len() + update.spawned.len())
            .sum()
    }
}

/// Reads every changed snake, then flushes the world.
pub fn drain_updates(world: &mut World) -> TickReport {
    let changed = world.changed().to_vec();
    let mut report = TickReport {
        updates: Vec::with_capacity(changed.len()),
        dead: world.dead().to_vec(),
    };

    for id in changed {
        let Some(snake) = world.snake_mut(id) else {
            continue;
        };
        let changes = snake.take_changes();
        let eaten = snake.take_eaten();
        let spawned = snake.take_spawned();
        let entered = snake.take_entered_sectors();
        let left = snake.take_left_sectors();
        report.updates.push(SnakeUpdate {
            id,
            changes,
            eaten,
            spawned,
            entered: sector_coordinates(world, &entered),
            left: sector_coordinates(world, &left),
        });
    }

    world.flush_changes();
    report
}

fn sector_coordinates(world: &World, indices: &[usize]) -> Vec<(u8, u8)> {
    indices
        .iter()
        .filter_map(|&index| world.grid().get(index))
        .map(|sector| (sector.col, sector.row))
        .collect()
}

/// Ticks the world at a fixed interval with measured elapsed time.
pub async fn run_tick_loop(world: Arc<Mutex<World>>, tick_ms: u64) {
    let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();

    loop {
        interval.tick().await;
        let elapsed = last.elapsed().as_millis() as u64;
        if elapsed == 0 {
            continue;
        }
        last += Duration::from_millis(elapsed);

        let started = Instant::now();
        let report = {
            let mut world = world.lock().await;
            world.tick(elapsed as i64);
            drain_updates(&mut world)
        };
        let step_ms = started.elapsed().as_millis();
        if step_ms > TICK_BUDGET_MS {
            tracing::warn!(step_ms = step_ms as u64, dt = elapsed, "tick exceeded budget");
        }
        if !report.is_empty() {
            tracing::trace!(
                updates = report.updates.len(),
                food_events = report.food_events(),
                dead = report.dead.len(),
                "tick drained"
            );
        }
    }
}
