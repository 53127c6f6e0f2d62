use super::config::WorldConfig;
use super::constants::{
    EAT_RADIUS_BASE, FOOD_COLOR_COUNT, FULLNESS_PER_PART, MIN_SNAKE_PARTS, SHRINK_FOOD_SIZE,
};
use super::geometry::distance_squared_u16;
use super::random::RandomSource;
use super::sector::{Sector, SectorGrid};
use super::snake::Snake;
use super::types::{Food, Point, CHANGE_FULLNESS};

/// Adds `volume` to fullness, growing one tail part per full hundred.
pub fn feed(snake: &mut Snake, volume: u32, config: &WorldConfig) {
    let per_part = FULLNESS_PER_PART as u32;
    let mut fullness = snake.fullness as u32 + volume;
    while fullness >= per_part {
        fullness -= per_part;
        if snake.parts.len() < config.max_snake_parts as usize {
            let tail = snake.tail();
            snake.parts.push(tail);
        }
    }
    snake.fullness = fullness as u16;
    snake.update |= CHANGE_FULLNESS;
    snake.refresh_scale();
}

/// Takes `volume` from fullness, shedding tail parts to cover any deficit.
/// Every shed part leaves a food pellet in the snake's skin colour.
pub fn starve(snake: &mut Snake, volume: u16, grid: &mut SectorGrid) {
    snake.update |= CHANGE_FULLNESS;
    if volume <= snake.fullness {
        snake.fullness -= volume;
        return;
    }

    let deficit = volume - snake.fullness;
    let removals = deficit.div_ceil(FULLNESS_PER_PART);
    for _ in 0..removals {
        if snake.parts.len() <= MIN_SNAKE_PARTS {
            break;
        }
        let Some(tail) = snake.parts.pop() else {
            break;
        };
        let food = Food {
            x: tail.x as u16,
            y: tail.y as u16,
            size: SHRINK_FOOD_SIZE,
            color: snake.skin,
        };
        if grid.insert_food(food) {
            snake.spawned.push(food);
        }
    }
    snake.fullness = removals * FULLNESS_PER_PART - deficit;
    snake.refresh_scale();
}

/// Removes every food item of `sector` within `r2` squared distance of
/// `(x, y)`, appending them to `eaten` in ascending `x` order. Returns the
/// total size eaten.
pub fn eat_from_sector(sector: &mut Sector, x: u16, y: u16, r2: i32, eaten: &mut Vec<Food>) -> u32 {
    let within = |food: &Food| distance_squared_u16(food.x, food.y, x, y) <= r2;
    let pivot = sector.find_closest_food(x);

    let mut lo = pivot;
    while lo > 0 && within(&sector.food[lo - 1]) {
        lo -= 1;
    }
    let mut hi = pivot;
    while hi < sector.food.len() && within(&sector.food[hi]) {
        hi += 1;
    }

    let start = eaten.len();
    eaten.extend(sector.food.drain(lo..hi));
    eaten[start..].iter().map(|food| food.size as u32).sum()
}

/// Eats from the sector under the head. Returns whether anything was eaten.
pub fn consume_nearby_food(snake: &mut Snake, grid: &mut SectorGrid, config: &WorldConfig) -> bool {
    let head = snake.head();
    let (x, y) = (head.x as u16, head.y as u16);
    let Some(index) = grid.index_at(Point::new(x as f64, y as f64)) else {
        return false;
    };
    let Some(sector) = grid.get_mut(index) else {
        return false;
    };
    let r = eat_radius(snake, config);
    let volume = eat_from_sector(sector, x, y, r * r, &mut snake.eaten);
    if volume == 0 {
        return false;
    }
    feed(snake, volume, config);
    true
}

pub fn eat_radius(snake: &Snake, config: &WorldConfig) -> i32 {
    (EAT_RADIUS_BASE + snake.body_part_radius() + config.move_step_distance as f64) as u16 as i32
}

/// Scatters the body of a dead snake as food. Parts on the outermost ring of
/// sectors are skipped.
pub fn spawn_remains(
    snake: &mut Snake,
    grid: &mut SectorGrid,
    random: &mut dyn RandomSource,
) -> usize {
    let r = snake.body_part_radius();
    let spread = r * 3.0;
    let count = ((snake.length_scale() * 2.0) as usize).max(1);
    let size = (FULLNESS_PER_PART as usize / count).min(u8::MAX as usize) as u8;
    let last = grid.edge() as i32 - 1;
    let mut spawned = 0;

    for part in &snake.parts {
        let cell = grid.cell_of(*part);
        if cell.col <= 0 || cell.row <= 0 || cell.col >= last || cell.row >= last {
            continue;
        }
        for _ in 0..count {
            let food = Food {
                x: (part.x + r - random.next_unit() * spread) as u16,
                y: (part.y + r - random.next_unit() * spread) as u16,
                size,
                color: random.next_below(FOOD_COLOR_COUNT) as u8,
            };
            if grid.insert_food(food) {
                snake.spawned.push(food);
                spawned += 1;
            }
        }
    }
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::random::SeededRandom;

    fn config() -> WorldConfig {
        WorldConfig::default()
    }

    fn food(x: u16, y: u16, size: u8) -> Food {
        Food {
            x,
            y,
            size,
            color: 0,
        }
    }

    fn snake_at(x: f64, y: f64, length: usize) -> Snake {
        Snake::new(1, Point::new(x, y), 0.0, length, &config())
    }

    #[test]
    fn scan_eats_the_contiguous_run_around_the_head() {
        let mut grid = SectorGrid::new(&config());
        let sector = grid.sector_mut(0, 0).expect("sector");
        for x in [100, 120, 140, 160, 180] {
            sector.insert_food(food(x, 100, 2));
        }
        let mut eaten = Vec::new();
        let volume = eat_from_sector(sector, 140, 100, 35 * 35, &mut eaten);
        let xs: Vec<u16> = eaten.iter().map(|item| item.x).collect();
        assert_eq!(xs, vec![120, 140, 160]);
        assert_eq!(volume, 6);
        let left: Vec<u16> = sector.food.iter().map(|item| item.x).collect();
        assert_eq!(left, vec![100, 180]);
    }

    #[test]
    fn scan_stops_at_the_first_miss_in_each_direction() {
        let mut grid = SectorGrid::new(&config());
        let sector = grid.sector_mut(0, 0).expect("sector");
        sector.insert_food(food(130, 290, 1));
        sector.insert_food(food(150, 100, 1));
        sector.insert_food(food(145, 100, 1));
        let mut eaten = Vec::new();
        eat_from_sector(sector, 140, 100, 35 * 35, &mut eaten);
        assert_eq!(eaten.len(), 2);
        assert_eq!(sector.food, vec![food(130, 290, 1)]);
    }

    #[test]
    fn feeding_wraps_fullness_into_a_new_tail_part() {
        let mut snake = snake_at(1000.0, 1000.0, 10);
        snake.fullness = 98;
        feed(&mut snake, 5, &config());
        assert_eq!(snake.fullness, 3);
        assert_eq!(snake.parts.len(), 11);
        assert_eq!(snake.parts[10], snake.parts[9]);
        assert_ne!(snake.changes() & CHANGE_FULLNESS, 0);
    }

    #[test]
    fn feeding_respects_the_part_cap() {
        let mut snake = snake_at(1000.0, 1000.0, 411);
        feed(&mut snake, 250, &config());
        assert_eq!(snake.parts.len(), 411);
        assert_eq!(snake.fullness, 50);
    }

    #[test]
    fn starving_within_fullness_keeps_length() {
        let mut grid = SectorGrid::new(&config());
        let mut snake = snake_at(5000.0, 5000.0, 10);
        snake.fullness = 50;
        starve(&mut snake, 33, &mut grid);
        assert_eq!(snake.fullness, 17);
        assert_eq!(snake.parts.len(), 10);
        assert!(snake.spawned().is_empty());
    }

    #[test]
    fn starving_past_empty_sheds_parts_as_food() {
        let mut grid = SectorGrid::new(&config());
        let mut snake = snake_at(5000.0, 5000.0, 10);
        snake.skin = 12;
        snake.fullness = 20;
        let tail = snake.tail();
        starve(&mut snake, 150, &mut grid);
        assert_eq!(snake.parts.len(), 8);
        assert_eq!(snake.fullness, 70);
        assert_eq!(snake.spawned().len(), 2);
        let pellet = snake.spawned()[0];
        assert_eq!((pellet.x, pellet.y), (tail.x as u16, tail.y as u16));
        assert_eq!((pellet.size, pellet.color), (100, 12));
        assert_eq!(grid.food_count(), 2);
    }

    #[test]
    fn consuming_feeds_from_the_head_sector() {
        let config = config();
        let mut grid = SectorGrid::new(&config);
        let mut snake = snake_at(1000.0, 1000.0, 5);
        grid.insert_food(food(1020, 1000, 40));
        grid.insert_food(food(1200, 1000, 40));
        assert!(consume_nearby_food(&mut snake, &mut grid, &config));
        assert_eq!(snake.fullness, 40);
        assert_eq!(snake.eaten().len(), 1);
        assert_eq!(grid.food_count(), 1);
        assert!(!consume_nearby_food(&mut snake, &mut grid, &config));
    }

    #[test]
    fn eat_radius_tracks_body_radius() {
        let snake = snake_at(1000.0, 1000.0, 3);
        assert_eq!(eat_radius(&snake, &config()), 70);
    }

    #[test]
    fn remains_are_scattered_around_each_part() {
        let mut grid = SectorGrid::new(&config());
        let mut snake = snake_at(5000.0, 5000.0, 6);
        let mut random = SeededRandom::new(11);
        let spawned = spawn_remains(&mut snake, &mut grid, &mut random);
        assert_eq!(spawned, 12);
        assert_eq!(grid.food_count(), 12);
        let spread = snake.body_part_radius() * 3.0;
        for pellet in snake.spawned() {
            assert_eq!(pellet.size, 50);
            assert!(pellet.color < 29);
            assert!((pellet.y as f64 - 5000.0).abs() <= spread);
        }
    }

    #[test]
    fn remains_skip_the_outer_ring() {
        let mut grid = SectorGrid::new(&config());
        let mut snake = snake_at(100.0, 100.0, 4);
        let mut random = SeededRandom::new(5);
        assert_eq!(spawn_remains(&mut snake, &mut grid, &mut random), 0);
    }
}
