use super::config::WorldConfig;
use super::constants::{
    AI_ANGLE_TOLERANCE, AI_STEP_INTERVAL_MS, BASE_MOVE_SPEED, BOOST_DRAIN_PER_STEP, BOOST_SPEED,
    HEAD_SPAN_DISTANCES, MIN_SNAKE_PARTS, PARTS_SKIP_COUNT, PARTS_START_MOVE_COUNT,
    SNAKE_ANGULAR_SPEED, SNAKE_TAIL_K, SPEED_ACCELERATION, TAIL_STEP_DISTANCE,
    VIEWPORT_DIAGONALS,
};
use super::digestion::{consume_nearby_food, starve};
use super::math::{normalize_angle, rotate_toward};
use super::sector::SectorGrid;
use super::tracker::{CollisionBox, Viewport};
use super::types::{
    Circle, Food, Point, SnakeId, CHANGE_ANGLE, CHANGE_DEAD, CHANGE_DYING, CHANGE_FULLNESS,
    CHANGE_POS, CHANGE_SPEED, CHANGE_STICKY, CHANGE_WANTED_ANGLE,
};
use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::OnceLock;

const SCORE_TABLE_LEN: usize = 411;

#[derive(Debug, Clone)]
pub struct Snake {
    pub id: SnakeId,
    pub skin: u8,
    pub bot: bool,
    pub boosting: bool,
    /// Pixels per second; never zero.
    pub speed: u16,
    pub angle: f64,
    pub wanted_angle: f64,
    /// 0..100 partially digested growth.
    pub fullness: u16,
    /// Head first.
    pub parts: Vec<Point>,
    pub(crate) update: u8,
    pub(crate) collision: CollisionBox,
    pub(crate) viewport: Viewport,
    pub(crate) eaten: Vec<Food>,
    pub(crate) spawned: Vec<Food>,
    scale: f64,
    length_scale: f64,
    body_part_radius: f64,
    move_ticks: i64,
    rot_ticks: i64,
    ai_ticks: i64,
}

impl Snake {
    /// Lays out `length` parts behind `head`, trailing opposite to `angle`.
    pub fn new(id: SnakeId, head: Point, angle: f64, length: usize, config: &WorldConfig) -> Self {
        let max_parts = (config.max_snake_parts as usize).max(MIN_SNAKE_PARTS);
        let length = length.clamp(MIN_SNAKE_PARTS, max_parts);
        let angle = normalize_angle(angle);
        let back = normalize_angle(angle + PI);
        let (dx, dy) = (back.cos(), back.sin());
        let mut parts = Vec::with_capacity(length);
        let mut cursor = head;
        for index in 0..length {
            parts.push(cursor);
            let spacing = if index < PARTS_SKIP_COUNT + PARTS_START_MOVE_COUNT {
                config.move_step_distance as f64
            } else {
                TAIL_STEP_DISTANCE
            };
            cursor = Point::new(cursor.x + dx * spacing, cursor.y + dy * spacing);
        }

        let mut snake = Self {
            id,
            skin: 0,
            bot: false,
            boosting: false,
            speed: BASE_MOVE_SPEED,
            angle,
            wanted_angle: angle,
            fullness: 0,
            parts,
            update: 0,
            collision: CollisionBox::new(id, Circle::around(head, 0.0)),
            viewport: Viewport::new(id, Circle::around(head, 0.0)),
            eaten: Vec::new(),
            spawned: Vec::new(),
            scale: 0.0,
            length_scale: 0.0,
            body_part_radius: 0.0,
            move_ticks: 0,
            rot_ticks: 0,
            ai_ticks: 0,
        };
        snake.refresh_scale();
        snake.update_box_center();
        snake.update_box_radius(config);
        snake
    }

    pub fn head(&self) -> Point {
        self.parts[0]
    }

    pub fn tail(&self) -> Point {
        self.parts[self.parts.len() - 1]
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn length_scale(&self) -> f64 {
        self.length_scale
    }

    pub fn body_part_radius(&self) -> f64 {
        self.body_part_radius
    }

    pub fn collision_box(&self) -> &CollisionBox {
        &self.collision
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn eaten(&self) -> &[Food] {
        &self.eaten
    }

    pub fn spawned(&self) -> &[Food] {
        &self.spawned
    }

    pub fn changes(&self) -> u8 {
        self.update
    }

    pub fn is_dying(&self) -> bool {
        self.update & CHANGE_DYING != 0
    }

    pub fn is_dead(&self) -> bool {
        self.update & CHANGE_DEAD != 0
    }

    pub(crate) fn mark_dying(&mut self) {
        self.update |= CHANGE_DYING;
    }

    pub(crate) fn mark_dead(&mut self) {
        self.update |= CHANGE_DYING | CHANGE_DEAD;
    }

    pub fn set_wanted_angle(&mut self, angle: f64) {
        self.wanted_angle = normalize_angle(angle);
        self.update |= CHANGE_WANTED_ANGLE;
    }

    pub fn set_boost(&mut self, boost: bool) {
        self.boosting = boost;
    }

    /// Returns the change mask and clears everything but the dying/dead bits.
    pub fn take_changes(&mut self) -> u8 {
        let changes = self.update;
        self.update &= CHANGE_STICKY;
        changes
    }

    pub fn take_eaten(&mut self) -> Vec<Food> {
        std::mem::take(&mut self.eaten)
    }

    pub fn take_spawned(&mut self) -> Vec<Food> {
        std::mem::take(&mut self.spawned)
    }

    pub fn take_entered_sectors(&mut self) -> Vec<usize> {
        self.viewport.take_entered()
    }

    pub fn take_left_sectors(&mut self) -> Vec<usize> {
        self.viewport.take_left()
    }

    pub(crate) fn discard_pending(&mut self) {
        self.update &= CHANGE_STICKY;
        self.eaten.clear();
        self.spawned.clear();
        self.viewport.clear_deltas();
    }

    /// Registers the collision box around the head and sampled tail points, and
    /// (for players) fills the viewport.
    pub(crate) fn init_boxes(&mut self, grid: &mut SectorGrid, config: &WorldConfig) {
        let probe_radius = config.sector_size as f64 / 2.0;
        let probe = Circle::around(self.head(), probe_radius);
        self.collision.fill(grid, probe);
        let tail_step = config.tail_step();
        let mut index = PARTS_SKIP_COUNT;
        while index < self.parts.len() {
            let probe = Circle::around(self.parts[index], probe_radius);
            self.collision.fill(grid, probe);
            index += tail_step;
        }
        let probe = Circle::around(self.tail(), probe_radius);
        self.collision.fill(grid, probe);
        self.collision.shrink(grid);

        if !self.bot {
            self.viewport.fill(grid);
        }
    }

    /// Advances the snake by `dt` milliseconds. Returns the changes made by this call.
    pub fn tick(&mut self, dt: i64, grid: &mut SectorGrid, config: &WorldConfig) -> u8 {
        if self.update & CHANGE_STICKY != 0 {
            return 0;
        }
        let mut changes = 0u8;

        if self.bot {
            self.ai_ticks += dt;
            if self.ai_ticks >= AI_STEP_INTERVAL_MS {
                let frames = self.ai_ticks / AI_STEP_INTERVAL_MS;
                self.ai_ticks -= frames * AI_STEP_INTERVAL_MS;
                changes |= self.tick_ai(config);
            }
        }

        if self.angle != self.wanted_angle {
            self.rot_ticks += dt;
            let interval = config.rotation_step_interval();
            if self.rot_ticks >= interval {
                let frames = self.rot_ticks / interval;
                let frames_ticks = frames * interval;
                let rotation = SNAKE_ANGULAR_SPEED * frames_ticks as f64 / 1000.0;
                self.angle = rotate_toward(self.angle, self.wanted_angle, rotation);
                self.rot_ticks -= frames_ticks;
                changes |= CHANGE_ANGLE;
            }
        }

        self.move_ticks += dt;
        let interval = self.move_step_interval(config);
        if self.move_ticks >= interval {
            let frames = self.move_ticks / interval;
            let frames_ticks = frames * interval;
            for _ in 0..frames {
                if self.step(grid, config) {
                    changes |= CHANGE_FULLNESS;
                }
                if self.boosting {
                    if self.parts.len() <= MIN_SNAKE_PARTS {
                        self.boosting = false;
                    } else {
                        starve(self, BOOST_DRAIN_PER_STEP, grid);
                        changes |= CHANGE_FULLNESS;
                    }
                }
            }
            changes |= CHANGE_POS;
            if self.update_speed(frames_ticks) {
                changes |= CHANGE_SPEED;
            }
            self.move_ticks -= frames_ticks;
        }

        self.update |= changes;
        changes
    }

    /// Milliseconds per movement step at the current speed.
    pub fn move_step_interval(&self, config: &WorldConfig) -> i64 {
        1000 * config.move_step_distance as i64 / self.speed.max(1) as i64
    }

    /// Steers tangentially around the world centre.
    fn tick_ai(&mut self, config: &WorldConfig) -> u8 {
        let center = config.center();
        let head = self.head();
        let bearing = (head.y - center).atan2(head.x - center);
        let ai_angle = normalize_angle(bearing + FRAC_PI_2);
        if (self.wanted_angle - ai_angle).abs() > AI_ANGLE_TOLERANCE {
            self.wanted_angle = ai_angle;
            return CHANGE_WANTED_ANGLE;
        }
        0
    }

    /// One movement step: head, body relaxation, tracker updates, food.
    /// Returns whether any food was eaten.
    fn step(&mut self, grid: &mut SectorGrid, config: &WorldConfig) -> bool {
        let distance = config.move_step_distance as f64;
        let probe_radius = config.sector_size as f64 / 2.0;
        let len = self.parts.len();

        let old_head = self.parts[0];
        let head = Point::new(
            old_head.x + self.angle.cos() * distance,
            old_head.y + self.angle.sin() * distance,
        );
        self.parts[0] = head;
        let mut sum_x = head.x;
        let mut sum_y = head.y;
        let mut prev = old_head;

        let neck_end = PARTS_SKIP_COUNT.min(len);
        for index in 1..neck_end {
            let old = self.parts[index];
            self.parts[index] = prev;
            sum_x += prev.x;
            sum_y += prev.y;
            prev = old;
        }

        let ramp_end = (PARTS_SKIP_COUNT + PARTS_START_MOVE_COUNT).min(len);
        for index in neck_end..ramp_end {
            let leader = self.parts[index - 1];
            let old = self.parts[index];
            let k = SNAKE_TAIL_K * (index - PARTS_SKIP_COUNT + 1) as f64
                / PARTS_START_MOVE_COUNT as f64;
            let moved = Point::new(
                prev.x + k * (leader.x - prev.x),
                prev.y + k * (leader.y - prev.y),
            );
            self.parts[index] = moved;
            sum_x += moved.x;
            sum_y += moved.y;
            prev = old;
        }

        let tail_step = config.tail_step();
        for index in ramp_end..len {
            let leader = self.parts[index - 1];
            let old = self.parts[index];
            let moved = Point::new(
                prev.x + SNAKE_TAIL_K * (leader.x - prev.x),
                prev.y + SNAKE_TAIL_K * (leader.y - prev.y),
            );
            self.parts[index] = moved;
            sum_x += moved.x;
            sum_y += moved.y;
            prev = old;

            if (index - ramp_end) % tail_step == 0 || index == len - 1 {
                let from = grid.cell_of(old);
                let to = grid.cell_of(moved);
                self.collision
                    .grow(grid, Circle::around(moved, probe_radius), from, to);
            }
        }

        let head_from = grid.cell_of(old_head);
        let head_to = grid.cell_of(head);
        self.collision
            .grow(grid, Circle::around(head, probe_radius), head_from, head_to);

        let bound = Circle::new(
            sum_x / len as f64,
            sum_y / len as f64,
            self.collision_radius(config),
        );
        let view = Circle::around(head, self.viewport_radius(config));
        self.collision.set_circle(bound);
        self.viewport.set_circle(view);
        if !self.bot {
            self.viewport.grow(grid, head_from, head_to);
        }
        self.collision.shrink(grid);
        if !self.bot {
            self.viewport.shrink(grid);
        }

        consume_nearby_food(self, grid, config)
    }

    fn update_speed(&mut self, frames_ticks: i64) -> bool {
        let wanted = if self.boosting {
            BOOST_SPEED
        } else {
            BASE_MOVE_SPEED
        };
        if self.speed == wanted {
            return false;
        }
        let acceleration = (SPEED_ACCELERATION as i64 * frames_ticks / 1000)
            .clamp(0, u16::MAX as i64) as u16;
        if wanted.abs_diff(self.speed) <= acceleration {
            self.speed = wanted;
        } else if wanted > self.speed {
            self.speed += acceleration;
        } else {
            self.speed -= acceleration;
        }
        true
    }

    pub(crate) fn update_box_center(&mut self) {
        let len = self.parts.len() as f64;
        let (sum_x, sum_y) = self
            .parts
            .iter()
            .fold((0.0, 0.0), |(x, y), part| (x + part.x, y + part.y));
        let mut circle = self.collision.circle();
        circle.x = sum_x / len;
        circle.y = sum_y / len;
        self.collision.set_circle(circle);

        let mut view = self.viewport.circle();
        view.x = self.parts[0].x;
        view.y = self.parts[0].y;
        self.viewport.set_circle(view);
    }

    pub(crate) fn update_box_radius(&mut self, config: &WorldConfig) {
        let mut circle = self.collision.circle();
        circle.r = self.collision_radius(config);
        self.collision.set_circle(circle);

        let mut view = self.viewport.circle();
        view.r = self.viewport_radius(config);
        self.viewport.set_circle(view);
    }

    /// Half the estimated body length plus one step of lookahead.
    pub fn collision_radius(&self, config: &WorldConfig) -> f64 {
        let head_span = HEAD_SPAN_DISTANCES.len() + 1;
        let mut length: f64 = HEAD_SPAN_DISTANCES.iter().sum();
        if self.parts.len() > head_span {
            length += TAIL_STEP_DISTANCE * (self.parts.len() - head_span) as f64;
        }
        (length + config.move_step_distance as f64) / 2.0
    }

    pub fn viewport_radius(&self, config: &WorldConfig) -> f64 {
        config.sector_diag_size() as f64 * VIEWPORT_DIAGONALS
    }

    pub(crate) fn refresh_scale(&mut self) {
        let len = self.parts.len() as f64;
        self.scale = 0.5 + 0.4 / f64::max(1.0, (len - 1.0 + 16.0) / 36.0);
        self.length_scale = (1.0 + (len - 3.0) / 106.0).clamp(1.0, 6.0);
        self.body_part_radius = 29.0 * 0.5 * self.length_scale;
    }

    pub fn score(&self) -> u16 {
        let (fmlts, fpsls) = score_tables();
        let index = self.parts.len().saturating_sub(1).min(SCORE_TABLE_LEN - 1);
        let score = 15.0 * (fpsls[index] + self.fullness as f64 / 100.0 / fmlts[index] - 1.0) - 5.0;
        score.max(0.0) as u16
    }
}

fn score_tables() -> &'static (Vec<f64>, Vec<f64>) {
    static TABLES: OnceLock<(Vec<f64>, Vec<f64>)> = OnceLock::new();
    TABLES.get_or_init(|| {
        let fmlts: Vec<f64> = (0..SCORE_TABLE_LEN)
            .map(|i| (1.0 - i as f64 / SCORE_TABLE_LEN as f64).powf(2.25))
            .collect();
        let mut fpsls = vec![0.0; SCORE_TABLE_LEN];
        for i in 1..SCORE_TABLE_LEN {
            fpsls[i] = fpsls[i - 1] + 1.0 / fmlts[i - 1];
        }
        (fmlts, fpsls)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::Cell;

    fn config() -> WorldConfig {
        WorldConfig::default()
    }

    fn straight_snake(length: usize) -> Snake {
        Snake::new(1, Point::new(10_000.0, 10_000.0), 0.0, length, &config())
    }

    #[test]
    fn new_snake_trails_behind_its_heading() {
        let snake = straight_snake(10);
        assert_eq!(snake.parts.len(), 10);
        assert_eq!(snake.head(), Point::new(10_000.0, 10_000.0));
        assert!((snake.parts[7].x - (10_000.0 - 42.0 * 7.0)).abs() < 1e-9);
        assert!((snake.parts[9].x - (10_000.0 - 42.0 * 7.0 - 48.0)).abs() < 1e-9);
        assert!(snake.parts.iter().all(|part| (part.y - 10_000.0).abs() < 1e-9));
    }

    #[test]
    fn length_is_clamped_to_the_allowed_range() {
        assert_eq!(straight_snake(1).parts.len(), MIN_SNAKE_PARTS);
        assert_eq!(straight_snake(5000).parts.len(), 411);
    }

    #[test]
    fn collision_radius_grows_with_length() {
        let short = straight_snake(5);
        let long = straight_snake(20);
        assert!((short.collision_radius(&config()) - (263.9 + 42.0) / 2.0).abs() < 1e-9);
        assert!(
            (long.collision_radius(&config()) - (263.9 + 24.0 * 12.0 + 42.0) / 2.0).abs() < 1e-9
        );
    }

    #[test]
    fn short_dt_accumulates_without_moving() {
        let mut grid = SectorGrid::new(&config());
        let mut snake = straight_snake(6);
        let before = snake.parts.clone();
        assert_eq!(snake.tick(100, &mut grid, &config()), 0);
        assert_eq!(snake.parts, before);
        let changes = snake.tick(127, &mut grid, &config());
        assert_ne!(changes & CHANGE_POS, 0);
        assert!((snake.head().x - 10_042.0).abs() < 1e-9);
    }

    #[test]
    fn neck_copies_rigidly_and_tail_relaxes() {
        let mut grid = SectorGrid::new(&config());
        let mut snake = straight_snake(10);
        let before = snake.parts.clone();
        snake.tick(227, &mut grid, &config());
        assert_eq!(snake.parts[1], before[0]);
        assert_eq!(snake.parts[2], before[1]);
        for index in 3..10 {
            let moved = snake.parts[index].x - before[index].x;
            assert!(moved > 0.0 && moved < 84.0, "part {index} moved {moved}");
        }
    }

    #[test]
    fn crossing_into_the_next_row_moves_the_registration() {
        let config = config();
        let mut grid = SectorGrid::new(&config);
        let mut snake = Snake::new(1, Point::new(750.0, 880.0), FRAC_PI_2, 5, &config);
        snake.init_boxes(&mut grid, &config);
        let old = grid.index_of(Cell { col: 2, row: 2 }).expect("old cell");
        let new = grid.index_of(Cell { col: 2, row: 3 }).expect("new cell");
        assert!(grid.get(old).expect("sector").occupants.contains(&1));

        snake.tick(227, &mut grid, &config);
        assert_eq!(grid.cell_of(snake.head()), Cell { col: 2, row: 3 });
        assert!(grid.get(new).expect("sector").occupants.contains(&1));

        for _ in 0..10 {
            snake.tick(227, &mut grid, &config);
        }
        assert!(!grid.get(old).expect("sector").occupants.contains(&1));
        assert!(!snake.collision_box().sectors().contains(&old));
        assert!(grid.get(new).expect("sector").occupants.contains(&1));
    }

    #[test]
    fn rotation_is_rate_limited() {
        let mut grid = SectorGrid::new(&config());
        let mut snake = straight_snake(6);
        snake.set_wanted_angle(PI / 2.0);
        let changes = snake.tick(93, &mut grid, &config());
        assert_ne!(changes & CHANGE_ANGLE, 0);
        let expected = SNAKE_ANGULAR_SPEED * 93.0 / 1000.0;
        assert!((snake.angle - expected).abs() < 1e-9);
        snake.tick(1000, &mut grid, &config());
        assert!((snake.angle - PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn boost_ramps_speed_and_drains_length() {
        let mut grid = SectorGrid::new(&config());
        let mut snake = straight_snake(10);
        snake.set_boost(true);
        let changes = snake.tick(227, &mut grid, &config());
        assert_ne!(changes & CHANGE_SPEED, 0);
        assert_eq!(snake.speed, BASE_MOVE_SPEED + 227);
        assert_eq!(snake.parts.len(), 9);
        assert_eq!(snake.fullness, 67);
        assert_eq!(snake.spawned().len(), 1);
    }

    #[test]
    fn boost_stops_at_minimum_length() {
        let mut grid = SectorGrid::new(&config());
        let mut snake = straight_snake(3);
        snake.set_boost(true);
        snake.tick(227, &mut grid, &config());
        assert!(!snake.boosting);
        assert_eq!(snake.parts.len(), 3);
    }

    #[test]
    fn bots_steer_tangentially() {
        let config = config();
        let mut grid = SectorGrid::new(&config);
        let center = config.center();
        let mut snake = Snake::new(1, Point::new(center + 2000.0, center), 0.0, 6, &config);
        snake.bot = true;
        let changes = snake.tick(1000, &mut grid, &config);
        assert_ne!(changes & CHANGE_WANTED_ANGLE, 0);
        assert!((snake.wanted_angle - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn dying_snake_does_not_advance() {
        let mut grid = SectorGrid::new(&config());
        let mut snake = straight_snake(6);
        snake.mark_dying();
        let before = snake.parts.clone();
        assert_eq!(snake.tick(1000, &mut grid, &config()), 0);
        assert_eq!(snake.parts, before);
        assert!(snake.is_dying());
        assert!(!snake.is_dead());
    }

    #[test]
    fn draining_changes_keeps_sticky_bits() {
        let mut snake = straight_snake(6);
        snake.update = CHANGE_POS | CHANGE_DYING;
        assert_eq!(snake.take_changes(), CHANGE_POS | CHANGE_DYING);
        assert_eq!(snake.changes(), CHANGE_DYING);
    }

    #[test]
    fn score_rises_with_length_and_fullness() {
        let short = straight_snake(10);
        let mut fuller = straight_snake(10);
        fuller.fullness = 80;
        let long = straight_snake(40);
        assert!(fuller.score() > short.score());
        assert!(long.score() > fuller.score());
    }
}
