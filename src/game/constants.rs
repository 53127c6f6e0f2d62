pub const VIRTUAL_FRAME_TIME_MS: i64 = 8;

// Speeds are in pixels per second.
pub const BASE_MOVE_SPEED: u16 = 185;
pub const BOOST_SPEED: u16 = 448;
pub const SPEED_ACCELERATION: u16 = 1000;

pub const SNAKE_ANGULAR_SPEED: f64 = 4.125;
pub const AI_STEP_INTERVAL_MS: i64 = 1000;
pub const AI_ANGLE_TOLERANCE: f64 = 0.01;

// Follow-the-leader relaxation: a rigid neck, a stiffness ramp, then a constant tail.
pub const SNAKE_TAIL_K: f64 = 0.43;
pub const PARTS_SKIP_COUNT: usize = 3;
pub const PARTS_START_MOVE_COUNT: usize = 4;
pub const TAIL_STEP_DISTANCE: f64 = 24.0;

// Observed spacing of the first seven parts for step 42 and k 0.43.
pub const HEAD_SPAN_DISTANCES: [f64; 7] = [42.0, 42.0, 42.0, 37.7, 37.7, 33.0, 28.5];

pub const VIEWPORT_DIAGONALS: f64 = 3.0;

pub const MIN_SNAKE_PARTS: usize = 3;
pub const BOOST_DRAIN_PER_STEP: u16 = 33;
pub const FULLNESS_PER_PART: u16 = 100;
pub const SHRINK_FOOD_SIZE: u8 = 100;
pub const EAT_RADIUS_BASE: f64 = 14.0;

pub const FOOD_COLOR_COUNT: u32 = 29;
pub const FOOD_MAX_INITIAL_SIZE: u32 = 10;
pub const FOOD_MAX_DENSITY: f64 = 10.0;

pub const SKIN_MIN: u32 = 9;
pub const SKIN_MAX: u32 = 21;
pub const SPAWN_MIN_DISTANCE: f64 = 1000.0;
pub const SPAWN_DISTANCE_SPREAD: u32 = 5000;

/// Parts checked one by one before landmark culling kicks in.
pub const COLLISION_HEAD_PARTS: usize = 8;
pub const COLLISION_HEAD_LANDMARK: usize = 3;

pub const TICK_BUDGET_MS: u128 = 10;
