use anyhow::bail;
use std::env;
use std::str::FromStr;

/// World geometry and population settings, fixed for the lifetime of a `World`.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    pub game_radius: u16,
    pub sector_size: u16,
    pub max_snake_parts: u16,
    pub move_step_distance: u16,
    pub bots: u16,
    pub snake_average_length: u16,
    pub snake_min_length: u16,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            game_radius: 21600,
            sector_size: 300,
            max_snake_parts: 411,
            move_step_distance: 42,
            bots: 0,
            snake_average_length: 2,
            snake_min_length: 2,
        }
    }
}

impl WorldConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            game_radius: parse_or(&lookup, "WORLD_RADIUS", defaults.game_radius),
            sector_size: parse_or(&lookup, "WORLD_SECTOR_SIZE", defaults.sector_size),
            max_snake_parts: defaults.max_snake_parts,
            move_step_distance: defaults.move_step_distance,
            bots: parse_or(&lookup, "WORLD_BOTS", defaults.bots),
            snake_average_length: parse_or(
                &lookup,
                "WORLD_SNAKE_AVERAGE_LENGTH",
                defaults.snake_average_length,
            ),
            snake_min_length: parse_or(
                &lookup,
                "WORLD_SNAKE_MIN_LENGTH",
                defaults.snake_min_length,
            ),
        }
        .validate()
    }

    pub fn validate(self) -> anyhow::Result<Self> {
        if self.sector_size == 0 {
            bail!("WORLD_SECTOR_SIZE must be positive");
        }
        if (2 * self.game_radius as u32) % self.sector_size as u32 != 0 {
            bail!(
                "world diameter {} is not a whole number of {}px sectors",
                2 * self.game_radius as u32,
                self.sector_size
            );
        }
        if self.sector_count_along_edge() > u8::MAX as u16 {
            bail!(
                "grid edge of {} sectors exceeds {}",
                self.sector_count_along_edge(),
                u8::MAX
            );
        }
        if 2 * self.game_radius as u32 > u16::MAX as u32 {
            bail!(
                "world diameter {} exceeds the {} limit of food and head coordinates",
                2 * self.game_radius as u32,
                u16::MAX
            );
        }
        if self.game_radius <= self.sector_size {
            bail!("WORLD_RADIUS must exceed one sector");
        }
        if self.snake_min_length > self.max_snake_parts {
            bail!(
                "WORLD_SNAKE_MIN_LENGTH {} exceeds max snake parts {}",
                self.snake_min_length,
                self.max_snake_parts
            );
        }
        Ok(self)
    }

    pub fn sector_count_along_edge(&self) -> u16 {
        ((2 * self.game_radius as u32) / self.sector_size as u32) as u16
    }

    pub fn death_radius(&self) -> u16 {
        self.game_radius - self.sector_size
    }

    pub fn sector_diag_size(&self) -> u16 {
        let side = self.sector_size as f64;
        (1.0 + (side * side * 2.0).sqrt()) as u16
    }

    pub fn center(&self) -> f64 {
        self.game_radius as f64
    }

    /// Milliseconds between rotation steps: one move step at boost speed.
    pub fn rotation_step_interval(&self) -> i64 {
        (1000.0 * self.move_step_distance as f64
            / super::constants::BOOST_SPEED as f64) as i64
    }

    /// Body parts between two tail samples.
    pub fn tail_step(&self) -> usize {
        ((self.sector_size as f64 / super::constants::TAIL_STEP_DISTANCE) as usize).max(1)
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}
