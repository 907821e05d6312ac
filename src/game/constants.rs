pub const WORLD_SIZE: f64 = 3000.0;
pub const VIEWPORT_WIDTH: f64 = 1200.0;
pub const VIEWPORT_HEIGHT: f64 = 800.0;
pub const STARTING_LENGTH: usize = 15;
pub const SEGMENT_DISTANCE: f64 = 5.0;
pub const BASE_SPEED: f64 = 3.0;
pub const BOOST_MULTIPLIER: f64 = 1.8;
pub const BOOST_EFFECT_MULTIPLIER: f64 = 1.5;
pub const BOOST_SHRINK_CHANCE: f64 = 0.2;
pub const MIN_LENGTH: usize = 5;
pub const TURN_RATE: f64 = 0.08;
pub const FRAME_RATE: f64 = 60.0;
pub const TICK_MS: u64 = 16;
pub const SHRINK_INTERVAL_MS: i64 = 3000;
pub const STALE_PLAYER_MS: i64 = 5000;
pub const MAX_FOOD_COUNT: usize = 500;
pub const FOOD_SIZE_MIN: f64 = 2.0;
pub const FOOD_SIZE_MAX: f64 = 8.0;
pub const CORPSE_FOOD_STRIDE: usize = 3;
pub const SELF_COLLISION_SKIP: usize = 5;
pub const SELF_COLLISION_RADIUS_MULT: f64 = 1.5;
pub const BODY_RADIUS_MIN: f64 = 3.0;
pub const BODY_RADIUS_MAX: f64 = 8.0;
pub const LEADERBOARD_SIZE: usize = 5;

pub const STATUS_SHORT_MS: i64 = 2000;
pub const STATUS_DEATH_MS: i64 = 5000;

pub struct FoodColor {
  pub color: &'static str,
  pub chance: f64,
}

pub const FOOD_COLORS: [FoodColor; 4] = [
  FoodColor { color: "#FF5722", chance: 0.65 },
  FoodColor { color: "#E91E63", chance: 0.2 },
  FoodColor { color: "#9C27B0", chance: 0.1 },
  FoodColor { color: "#FFEB3B", chance: 0.05 },
];

pub const NORMAL_FOOD_CHANCE: f64 = 0.85;

pub const SKIN_POOL: [(&str, &str, &str); 10] = [
  ("#FF5733", "#FF8C66", "#FFFFFF"),
  ("#33FF57", "#66FF88", "#FFFFFF"),
  ("#3357FF", "#6680FF", "#FFFFFF"),
  ("#F3FF33", "#F9FF99", "#333333"),
  ("#FF33F3", "#FF88F8", "#FFFFFF"),
  ("#33FFF3", "#66FFF8", "#333333"),
  ("#FF8033", "#FFA066", "#FFFFFF"),
  ("#8033FF", "#A066FF", "#FFFFFF"),
  ("#33FF80", "#66FFA0", "#333333"),
  ("#FF3380", "#FF66A0", "#FFFFFF"),
];
