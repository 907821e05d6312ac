use crate::game::effects::EffectSet;
use crate::game::types::{Food, GamePhase, PeerId, Player, Point, Skin};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Messages exchanged between peers. One JSON object per channel frame, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PeerMessage {
  #[serde(rename_all = "camelCase")]
  PlayerJoin {
    name: String,
    skin: Skin,
    angle: f64,
    segments: Vec<Point>,
    speed: f64,
    score: i64,
    kills: i64,
  },
  #[serde(rename_all = "camelCase")]
  PlayerUpdate {
    angle: f64,
    segments: Vec<Point>,
    speed: f64,
    score: i64,
    kills: i64,
    #[serde(default)]
    effects: EffectSet,
  },
  #[serde(rename_all = "camelCase")]
  PlayerDied {
    #[serde(default)]
    killed_by: Option<PeerId>,
  },
  FoodUpdate { foods: Vec<Food> },
  FoodEaten {
    index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
  },
  GameState {
    #[serde(rename = "gameState")]
    phase: GamePhase,
    players: HashMap<PeerId, Player>,
    foods: Vec<Food>,
  },
  RequestState,
  #[serde(rename_all = "camelCase")]
  GameEnd {
    #[serde(default)]
    winner_id: Option<PeerId>,
  },
}

impl PeerMessage {
  pub fn kind(&self) -> &'static str {
    match self {
      PeerMessage::PlayerJoin { .. } => "playerJoin",
      PeerMessage::PlayerUpdate { .. } => "playerUpdate",
      PeerMessage::PlayerDied { .. } => "playerDied",
      PeerMessage::FoodUpdate { .. } => "foodUpdate",
      PeerMessage::FoodEaten { .. } => "foodEaten",
      PeerMessage::GameState { .. } => "gameState",
      PeerMessage::RequestState => "requestState",
      PeerMessage::GameEnd { .. } => "gameEnd",
    }
  }
}

pub fn encode_message(message: &PeerMessage) -> Result<String, serde_json::Error> {
  serde_json::to_string(message)
}

/// Malformed frames decode to `None` and are dropped by the caller.
pub fn decode_message(text: &str) -> Option<PeerMessage> {
  serde_json::from_str(text).ok()
}
