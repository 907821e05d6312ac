use super::effects::{Effect, EffectSet};
use serde::{Deserialize, Serialize};

pub type PeerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skin {
  pub body: String,
  pub pattern: String,
  pub eye: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
  pub id: PeerId,
  pub name: String,
  pub skin: Skin,
  pub angle: f64,
  pub target_angle: f64,
  pub segments: Vec<Point>,
  pub speed: f64,
  pub score: i64,
  pub kills: i64,
  pub alive: bool,
  #[serde(default)]
  pub effects: EffectSet,
  #[serde(default)]
  pub last_update: i64,
}

impl Player {
  pub fn head(&self) -> Option<Point> {
    self.segments.first().copied()
  }

  pub fn has_effect(&self, effect: Effect) -> bool {
    self.effects.contains(effect)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodKind {
  pub effect: Effect,
  pub duration: i64,
}

impl From<Effect> for FoodKind {
  fn from(effect: Effect) -> Self {
    Self {
      effect,
      duration: effect.duration_ms(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
  /// Stable identity assigned by the spawning peer. Absent on food produced by peers that only
  /// address food by position.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<u64>,
  pub x: f64,
  pub y: f64,
  pub color: String,
  pub size: f64,
  #[serde(rename = "type", default)]
  pub kind: Option<FoodKind>,
  pub score: i64,
}

impl Food {
  pub fn effect(&self) -> Option<Effect> {
    self.kind.map(|kind| kind.effect)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
  #[default]
  Waiting,
  Playing,
  Ended,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
  pub id: PeerId,
  pub name: String,
  pub score: i64,
  pub alive: bool,
  pub is_local: bool,
}
