use super::collision::{body_intersects, outside_arena};
use super::config::WorldConfig;
use super::constants::{
    FOOD_COLOR_COUNT, FOOD_MAX_DENSITY, FOOD_MAX_INITIAL_SIZE, MIN_SNAKE_PARTS, SKIN_MAX, SKIN_MIN,
    SPAWN_DISTANCE_SPREAD, SPAWN_MIN_DISTANCE, VIRTUAL_FRAME_TIME_MS,
};
use super::digestion::spawn_remains;
use super::math::TWO_PI;
use super::random::RandomSource;
use super::sector::SectorGrid;
use super::snake::Snake;
use super::types::{Circle, Food, Point, SnakeId, CHANGE_POS};
use serde::Serialize;
use std::collections::BTreeMap;

mod debug;

pub use debug::{DebugFrame, DebugSnake};

#[derive(Debug, Clone, Serialize)]
pub struct WorldStats {
    pub frames: u64,
    pub snakes: usize,
    pub bots: usize,
    pub food: usize,
}

pub struct World {
    config: WorldConfig,
    grid: SectorGrid,
    snakes: BTreeMap<SnakeId, Snake>,
    /// Snakes touched since the last flush, in first-touch order.
    changes: Vec<SnakeId>,
    /// Snakes that died since the last flush; reaped by `flush_changes`.
    dead: Vec<SnakeId>,
    random: Box<dyn RandomSource + Send>,
    last_snake_id: SnakeId,
    ticks: i64,
    frames: u64,
    moved: Vec<SnakeId>,
    checked: Vec<SnakeId>,
}

impl World {
    pub fn new(config: WorldConfig, random: Box<dyn RandomSource + Send>) -> Self {
        let grid = SectorGrid::new(&config);
        Self {
            config,
            grid,
            snakes: BTreeMap::new(),
            changes: Vec::new(),
            dead: Vec::new(),
            random,
            last_snake_id: 0,
            ticks: 0,
            frames: 0,
            moved: Vec::new(),
            checked: Vec::new(),
        }
    }

    /// Scatters the initial food and spawns the configured bots.
    pub fn init(&mut self) {
        let food = self.init_food();
        let bots = self.spawn_bots(self.config.bots);
        tracing::info!(food, bots, "world populated");
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn grid(&self) -> &SectorGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut SectorGrid {
        &mut self.grid
    }

    pub fn snake(&self, id: SnakeId) -> Option<&Snake> {
        self.snakes.get(&id)
    }

    pub fn snake_mut(&mut self, id: SnakeId) -> Option<&mut Snake> {
        self.snakes.get_mut(&id)
    }

    pub fn snakes(&self) -> impl Iterator<Item = &Snake> {
        self.snakes.values()
    }

    pub fn snake_count(&self) -> usize {
        self.snakes.len()
    }

    pub fn changed(&self) -> &[SnakeId] {
        &self.changes
    }

    pub fn dead(&self) -> &[SnakeId] {
        &self.dead
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn stats(&self) -> WorldStats {
        WorldStats {
            frames: self.frames,
            snakes: self.snakes.len(),
            bots: self.snakes.values().filter(|snake| snake.bot).count(),
            food: self.grid.food_count(),
        }
    }

    /// Advances the world by `dt` milliseconds in whole virtual frames.
    /// The remainder carries over to the next call.
    pub fn tick(&mut self, dt: i64) {
        self.ticks += dt.max(0);
        let frames = self.ticks / VIRTUAL_FRAME_TIME_MS;
        if frames == 0 {
            return;
        }
        let frame_time = frames * VIRTUAL_FRAME_TIME_MS;
        self.tick_snakes(frame_time);
        self.ticks -= frame_time;
        self.frames += frames as u64;
    }

    fn tick_snakes(&mut self, dt: i64) {
        let mut moved = std::mem::take(&mut self.moved);
        moved.clear();
        for (&id, snake) in self.snakes.iter_mut() {
            let changes = snake.tick(dt, &mut self.grid, &self.config);
            if changes == 0 {
                continue;
            }
            mark_changed(&mut self.changes, id);
            if changes & CHANGE_POS != 0 {
                moved.push(id);
            }
        }

        for &id in &moved {
            if !self.check_snake_bounds(id) {
                continue;
            }
            let Some(snake) = self.snakes.get_mut(&id) else {
                continue;
            };
            snake.mark_dying();
            tracing::debug!(snake_id = id, bot = snake.bot, "snake dying");
        }
        self.moved = moved;

        self.settle_dying();
    }

    /// True when the snake left the arena or ran its head into another body.
    fn check_snake_bounds(&mut self, id: SnakeId) -> bool {
        let Some(snake) = self.snakes.get(&id) else {
            return false;
        };
        let head = snake.head();
        if outside_arena(head, &self.config) {
            return true;
        }

        let probe = Circle::around(head, snake.body_part_radius());
        let near = Circle::around(head, self.config.move_step_distance as f64);
        let cell = self.grid.cell_of(head);
        self.checked.clear();
        for index in self.grid.window(cell, 1) {
            let Some(sector) = self.grid.get(index) else {
                continue;
            };
            if !sector.intersects(&near) {
                continue;
            }
            for &other in &sector.occupants {
                if other == id || self.checked.contains(&other) {
                    continue;
                }
                self.checked.push(other);
                let Some(peer) = self.snakes.get(&other) else {
                    continue;
                };
                if body_intersects(&peer.parts, peer.body_part_radius(), probe, &self.config) {
                    return true;
                }
            }
        }
        false
    }

    /// Turns every dying snake into food and queues it for reaping.
    fn settle_dying(&mut self) {
        let dying: Vec<SnakeId> = self
            .snakes
            .iter()
            .filter(|(_, snake)| snake.is_dying() && !snake.is_dead())
            .map(|(&id, _)| id)
            .collect();
        for id in dying {
            let Some(snake) = self.snakes.get_mut(&id) else {
                continue;
            };
            let food = spawn_remains(snake, &mut self.grid, self.random.as_mut());
            snake.mark_dead();
            mark_changed(&mut self.changes, id);
            if !self.dead.contains(&id) {
                self.dead.push(id);
            }
            tracing::debug!(snake_id = id, bot = snake.bot, food, "snake died");
        }
    }

    /// Creates a snake at a random bearing from the centre, facing outward.
    pub fn create_snake(&mut self, bot: bool) -> Option<SnakeId> {
        let id = self.next_snake_id()?;
        let bearing = TWO_PI * self.random.next_unit();
        let distance = SPAWN_MIN_DISTANCE + self.random.next_below(SPAWN_DISTANCE_SPREAD) as f64;
        let center = self.config.center();
        let head = Point::new(
            center + distance * bearing.cos(),
            center + distance * bearing.sin(),
        );
        let extra = self
            .random
            .next_below(self.config.snake_average_length as u32)
            .max(self.config.snake_min_length as u32);
        let length = MIN_SNAKE_PARTS + extra as usize;

        let mut snake = Snake::new(id, head, bearing, length, &self.config);
        snake.skin = (SKIN_MIN + self.random.next_below(SKIN_MAX - SKIN_MIN + 1)) as u8;
        snake.bot = bot;
        Some(self.add_snake(snake))
    }

    /// Registers a snake's trackers and starts ticking it. A snake already
    /// holding the same id is removed first.
    pub fn add_snake(&mut self, mut snake: Snake) -> SnakeId {
        let id = snake.id;
        if self.snakes.contains_key(&id) {
            self.remove_snake(id);
        }
        snake.init_boxes(&mut self.grid, &self.config);
        tracing::debug!(
            snake_id = id,
            bot = snake.bot,
            length = snake.parts.len(),
            "snake spawned"
        );
        self.snakes.insert(id, snake);
        mark_changed(&mut self.changes, id);
        id
    }

    pub fn spawn_bots(&mut self, count: u16) -> usize {
        let mut spawned = 0;
        for _ in 0..count {
            if self.create_snake(true).is_none() {
                tracing::warn!(requested = count, spawned, "snake ids exhausted");
                break;
            }
            spawned += 1;
        }
        spawned
    }

    /// Drops a snake and every sector reference to it.
    pub fn remove_snake(&mut self, id: SnakeId) -> Option<Snake> {
        let mut snake = self.snakes.remove(&id)?;
        snake.collision.unregister(&mut self.grid);
        self.changes.retain(|&changed| changed != id);
        self.dead.retain(|&dead| dead != id);
        tracing::debug!(snake_id = id, bot = snake.bot, "snake removed");
        Some(snake)
    }

    /// Forgets pending changes of one snake without touching others.
    pub fn flush_snake(&mut self, id: SnakeId) {
        self.changes.retain(|&changed| changed != id);
        if let Some(snake) = self.snakes.get_mut(&id) {
            snake.discard_pending();
        }
    }

    /// Discards everything not yet drained from changed snakes and reaps the dead.
    pub fn flush_changes(&mut self) {
        for id in std::mem::take(&mut self.changes) {
            if let Some(snake) = self.snakes.get_mut(&id) {
                snake.discard_pending();
            }
        }
        for id in std::mem::take(&mut self.dead) {
            self.remove_snake(id);
        }
    }

    fn next_snake_id(&mut self) -> Option<SnakeId> {
        for _ in 0..SnakeId::MAX {
            self.last_snake_id = self.last_snake_id.wrapping_add(1);
            if self.last_snake_id != 0 && !self.snakes.contains_key(&self.last_snake_id) {
                return Some(self.last_snake_id);
            }
        }
        None
    }

    /// Fills each sector with food, densest at the centre.
    fn init_food(&mut self) -> usize {
        let edge = self.grid.edge() as i64;
        let center = edge / 2;
        let edge_squared = (edge * edge) as f64;
        let size = self.config.sector_size as u32;
        let mut total = 0;

        for index in 0..self.grid.len() {
            let Some(sector) = self.grid.get_mut(index) else {
                continue;
            };
            let dc = sector.col as i64 - center;
            let dr = sector.row as i64 - center;
            let falloff = 1.0 - (dc * dc + dr * dr) as f64 / edge_squared;
            let density = (falloff * FOOD_MAX_DENSITY).max(0.0) as usize;
            let (x0, y0) = (sector.col as u32 * size, sector.row as u32 * size);
            for _ in 0..density {
                let food = Food {
                    x: (x0 + self.random.next_below(size)) as u16,
                    y: (y0 + self.random.next_below(size)) as u16,
                    size: (1 + self.random.next_below(FOOD_MAX_INITIAL_SIZE)) as u8,
                    color: self.random.next_below(FOOD_COLOR_COUNT) as u8,
                };
                sector.food.push(food);
            }
            sector.sort_food();
            total += density;
        }
        total
    }
}

fn mark_changed(changes: &mut Vec<SnakeId>, id: SnakeId) {
    if !changes.contains(&id) {
        changes.push(id);
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("frames", &self.frames)
            .field("snakes", &self.snakes.len())
            .field("changes", &self.changes)
            .field("dead", &self.dead)
            .finish()
    }
}
