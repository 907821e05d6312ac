use super::camera::Camera;
use super::constants::{
  BASE_SPEED, BOOST_EFFECT_MULTIPLIER, BOOST_MULTIPLIER, BOOST_SHRINK_CHANCE, MAX_FOOD_COUNT,
  MIN_LENGTH, SHRINK_INTERVAL_MS, SKIN_POOL, STALE_PLAYER_MS, STARTING_LENGTH, STATUS_DEATH_MS,
  STATUS_SHORT_MS, VIEWPORT_HEIGHT, VIEWPORT_WIDTH, WORLD_SIZE,
};
use super::effects::Effect;
use super::food::{corpse_food, spawn_food};
use super::lifecycle::evaluate_termination;
use super::math::{body_radius, circles_overlap, turn_toward, wrap_angle};
use super::membership::{Membership, PeerSender};
use super::physics::{detect_collision, Collision};
use super::snake::{advance_snake, create_snake, grow_snake, shrink_snake};
use super::timers::{TimedEvent, TimerQueue};
use super::types::{Food, GamePhase, LeaderboardEntry, PeerId, Player, Point, Skin};
use super::world::{JoinState, MotionState, World};
use crate::protocol::PeerMessage;
use crate::shared::names::{fallback_player_name, sanitize_player_name};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;
use std::f64::consts::PI;

/// What the local peer is doing in the shared game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalMode {
  #[default]
  Idle,
  Playing,
  Dead,
  Spectating,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocalCommand {
  Play { name: Option<String> },
  Spectate,
  Restart,
  /// Pointer position in viewport coordinates.
  Pointer(Point),
  Boost(bool),
}

/// Everything that can happen to a session. Transport tasks and the local driver feed these into
/// one queue so the session is only ever touched from a single task.
#[derive(Debug)]
pub enum SessionEvent {
  PeerConnected {
    peer_id: PeerId,
    connection_id: u64,
    sender: PeerSender,
  },
  PeerDisconnected {
    peer_id: PeerId,
    connection_id: u64,
  },
  PeerMessage {
    peer_id: PeerId,
    message: PeerMessage,
  },
  PeerError {
    peer_id: PeerId,
    error: String,
  },
  Command(LocalCommand),
}

/// Notifications for whatever presents the game to a person.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
  Status { text: String, duration_ms: Option<i64> },
  Length(usize),
  Kills(i64),
  Leaderboard(Vec<LeaderboardEntry>),
  GameEnded {
    winner_id: Option<PeerId>,
    winner_name: Option<String>,
  },
}

/// One peer's view of the game plus the channels it holds to other peers.
#[derive(Debug)]
pub struct Session {
  self_id: PeerId,
  membership: Membership,
  world: World,
  mode: LocalMode,
  pointer: Point,
  boosting: bool,
  camera: Camera,
  spectate_target: Option<PeerId>,
  timers: TimerQueue,
  effect_generations: [u64; 3],
  shrink_scheduled: bool,
  hud: Hud,
  rng: StdRng,
  ui_events: Vec<UiEvent>,
}

#[derive(Debug, Default)]
struct Hud {
  length: usize,
  kills: i64,
}

impl Session {
  pub fn new(self_id: impl Into<PeerId>, rng: StdRng) -> Self {
    Self {
      self_id: self_id.into(),
      membership: Membership::new(),
      world: World::new(),
      mode: LocalMode::Idle,
      pointer: viewport_center(),
      boosting: false,
      camera: Camera::default(),
      spectate_target: None,
      timers: TimerQueue::new(),
      effect_generations: [0; 3],
      shrink_scheduled: false,
      hud: Hud::default(),
      rng,
      ui_events: Vec::new(),
    }
  }

  pub fn world(&self) -> &World {
    &self.world
  }

  pub fn mode(&self) -> LocalMode {
    self.mode
  }

  pub fn local_player(&self) -> Option<&Player> {
    self.world.player(&self.self_id)
  }

  pub fn is_authority(&self) -> bool {
    self.membership.is_authority(&self.self_id)
  }

  pub fn next_timer_deadline(&self) -> Option<i64> {
    self.timers.next_deadline()
  }

  pub fn drain_ui_events(&mut self) -> Vec<UiEvent> {
    std::mem::take(&mut self.ui_events)
  }

  pub fn handle_event(&mut self, event: SessionEvent, now: i64) {
    match event {
      SessionEvent::PeerConnected {
        peer_id,
        connection_id,
        sender,
      } => self.handle_connect(&peer_id, connection_id, sender),
      SessionEvent::PeerDisconnected {
        peer_id,
        connection_id,
      } => self.handle_disconnect(&peer_id, connection_id),
      SessionEvent::PeerMessage { peer_id, message } => {
        self.handle_peer_message(&peer_id, message, now)
      }
      SessionEvent::PeerError { peer_id, error } => self.handle_peer_error(&peer_id, &error),
      SessionEvent::Command(command) => self.handle_command(command, now),
    }
  }

  pub fn handle_command(&mut self, command: LocalCommand, now: i64) {
    match command {
      LocalCommand::Play { name } => self.start_playing(name.as_deref(), now),
      LocalCommand::Spectate => self.start_spectating(),
      LocalCommand::Restart => self.restart(),
      LocalCommand::Pointer(pointer) => self.pointer = pointer,
      LocalCommand::Boost(boosting) => {
        self.boosting = boosting && self.mode == LocalMode::Playing;
      }
    }
  }

  fn handle_connect(&mut self, peer_id: &str, connection_id: u64, sender: PeerSender) {
    if peer_id == self.self_id {
      return;
    }
    let is_new = self.membership.register(peer_id, connection_id, sender);
    let peers = self.membership.len();
    tracing::info!(peer_id, connection_id, is_new, peers, "peer connected");

    let greeting = match self.mode {
      LocalMode::Playing | LocalMode::Spectating => self.snapshot(),
      LocalMode::Idle | LocalMode::Dead => PeerMessage::RequestState,
    };
    let mut delivered = self.membership.send_to(peer_id, greeting);
    // The newcomer may have missed our join while it was still dialing.
    if let Some(join) = self.local_join_message() {
      delivered &= self.membership.send_to(peer_id, join);
    }
    if !delivered {
      self.drop_peers(vec![peer_id.to_string()]);
    }
  }

  fn handle_disconnect(&mut self, peer_id: &str, connection_id: u64) {
    if !self.membership.deregister(peer_id, connection_id) {
      tracing::debug!(peer_id, connection_id, "ignoring close of replaced channel");
      return;
    }
    tracing::info!(peer_id, connection_id, "peer disconnected");
    if self.world.remove_player(peer_id).is_some() {
      self.push_leaderboard();
      self.check_game_end();
    }
  }

  fn handle_peer_error(&mut self, peer_id: &str, error: &str) {
    tracing::warn!(peer_id, error, "peer channel error");
    self.status(format!("Connection error: {error}"), Some(STATUS_SHORT_MS));
  }

  pub fn handle_peer_message(&mut self, peer_id: &str, message: PeerMessage, now: i64) {
    if peer_id == self.self_id {
      return;
    }
    tracing::trace!(peer_id, kind = message.kind(), "peer message");
    match message {
      PeerMessage::PlayerJoin {
        name,
        skin,
        angle,
        segments,
        speed,
        score,
        kills,
      } => {
        let join = JoinState {
          name,
          skin,
          angle,
          segments,
          speed,
          score,
          kills,
        };
        self.world.apply_player_join(peer_id, join, now);
        if self.world.phase() == GamePhase::Waiting {
          self.world.set_phase(GamePhase::Playing);
        }
        self.push_leaderboard();
      }
      PeerMessage::PlayerUpdate {
        angle,
        segments,
        speed,
        score,
        kills,
        effects,
      } => {
        let motion = MotionState {
          angle,
          segments,
          speed,
          score,
          kills,
          effects,
        };
        self.world.apply_player_update(peer_id, motion, now);
      }
      PeerMessage::PlayerDied { killed_by } => self.handle_remote_death(peer_id, killed_by),
      PeerMessage::FoodUpdate { foods } => self.world.replace_food(foods),
      PeerMessage::FoodEaten { index, id } => self.handle_food_eaten(peer_id, index, id),
      PeerMessage::GameState {
        phase,
        players,
        foods,
      } => {
        self.handle_snapshot(peer_id, phase, players, foods, now);
      }
      PeerMessage::RequestState => {
        let snapshot = self.snapshot();
        if !self.membership.send_to(peer_id, snapshot) {
          self.drop_peers(vec![peer_id.to_string()]);
        }
      }
      PeerMessage::GameEnd { winner_id } => {
        self.world.end_game(winner_id.clone());
        self.announce_game_end(winner_id);
      }
    }
  }

  /// A peer outside the game adopts the snapshot wholesale. A peer already in it only learns
  /// players it is missing and takes food only from the current authority.
  fn handle_snapshot(
    &mut self,
    peer_id: &str,
    phase: GamePhase,
    players: HashMap<PeerId, Player>,
    foods: Vec<Food>,
    now: i64,
  ) {
    match self.mode {
      LocalMode::Playing | LocalMode::Dead => {
        let mut players = players;
        players.remove(&self.self_id);
        let foods = self
          .membership
          .is_peer_authority(&self.self_id, peer_id)
          .then_some(foods);
        let added = self.world.merge_snapshot(players, foods, now);
        tracing::debug!(peer_id, added, "merged snapshot");
      }
      LocalMode::Idle | LocalMode::Spectating => {
        self.world.apply_snapshot(phase, players, foods, now);
      }
    }
    self.push_leaderboard();
  }

  fn handle_remote_death(&mut self, peer_id: &str, killed_by: Option<PeerId>) {
    let Some(victim) = self.world.player(peer_id) else { return };
    let victim_name = victim.name.clone();
    let killer = self.world.apply_player_died(peer_id, killed_by.as_deref());
    tracing::debug!(peer_id, killer = killer.as_deref(), "remote player died");
    if killer.as_deref() == Some(self.self_id.as_str()) {
      self.status(format!("You eliminated {victim_name}!"), Some(STATUS_SHORT_MS));
      self.report_hud();
    }
    self.push_leaderboard();
    self.check_game_end();
  }

  /// Effects of the eaten item belong to the eater, which applied them when it ate.
  fn handle_food_eaten(&mut self, peer_id: &str, index: usize, id: Option<u64>) {
    // Our own foodEaten never arrives here; handle_peer_message drops self-sent messages and
    // consume_food already applied the effect.
    if self.world.remove_food(index, id).is_none() {
      tracing::debug!(peer_id, index, ?id, "eaten food already gone");
      return;
    }
    if self.is_authority() {
      self.replenish_food(1);
    }
  }

  pub fn start_playing(&mut self, name: Option<&str>, now: i64) {
    if self.mode == LocalMode::Playing {
      return;
    }
    let fallback = fallback_player_name(&mut self.rng);
    let name = sanitize_player_name(name.unwrap_or_default(), &fallback);
    let (body, pattern, eye) = SKIN_POOL[self.rng.gen_range(0..SKIN_POOL.len())];
    let start = Point {
      x: self.rng.gen_range(0.0..WORLD_SIZE),
      y: self.rng.gen_range(0.0..WORLD_SIZE),
    };
    let angle = wrap_angle(self.rng.gen_range(0.0..PI * 2.0));
    let player = Player {
      id: self.self_id.clone(),
      name,
      skin: Skin {
        body: body.to_string(),
        pattern: pattern.to_string(),
        eye: eye.to_string(),
      },
      angle,
      target_angle: angle,
      segments: create_snake(start, angle, STARTING_LENGTH),
      speed: BASE_SPEED,
      score: STARTING_LENGTH as i64,
      kills: 0,
      alive: true,
      effects: Default::default(),
      last_update: now,
    };
    tracing::info!(player_id = %player.id, name = %player.name, "joining game");

    self.camera.follow(start);
    self.world.insert_player(player);
    self.mode = LocalMode::Playing;
    self.boosting = false;
    self.spectate_target = None;
    self.world.set_phase(GamePhase::Playing);
    if let Some(join) = self.local_join_message() {
      self.broadcast(join);
    }

    if self.is_authority() && self.world.foods().is_empty() {
      self.replenish_food(MAX_FOOD_COUNT);
    }
    if !self.shrink_scheduled {
      self.shrink_scheduled = true;
      self.timers.schedule(now + SHRINK_INTERVAL_MS, TimedEvent::Shrink);
    }
    self.report_hud();
    self.push_leaderboard();
  }

  pub fn start_spectating(&mut self) {
    if self.mode == LocalMode::Playing {
      return;
    }
    tracing::info!("spectating");
    self.mode = LocalMode::Spectating;
    self.boosting = false;
    self.spectate_target = None;
    self.follow_top_player();
  }

  /// Leaves a finished or lost game. The replica keeps tracking a game that is still running
  /// among the others; only a finished game goes back to waiting.
  pub fn restart(&mut self) {
    let finished = self.world.phase() == GamePhase::Ended;
    if !finished && self.mode != LocalMode::Dead {
      return;
    }
    tracing::info!(finished, "restarting");
    self.mode = LocalMode::Idle;
    self.boosting = false;
    self.spectate_target = None;
    if finished {
      self.world.set_phase(GamePhase::Waiting);
    }
    self.status(String::new(), None);
  }

  /// Advances the simulation by `dt_seconds`. Non-positive or non-finite steps are skipped.
  pub fn tick(&mut self, dt_seconds: f64, now: i64) {
    if !dt_seconds.is_finite() || dt_seconds <= 0.0 {
      return;
    }
    match self.mode {
      LocalMode::Playing => self.tick_local(dt_seconds, now),
      LocalMode::Spectating => self.follow_top_player(),
      LocalMode::Idle | LocalMode::Dead => {}
    }
    self.extrapolate_remote(dt_seconds, now);
  }

  fn tick_local(&mut self, dt_seconds: f64, now: i64) {
    if !self.local_player().is_some_and(|player| player.alive) {
      return;
    }
    self.steer_local(dt_seconds);
    if !self.check_local_collision() {
      return;
    }
    self.consume_food(now);

    let Some(player) = self.world.player_mut(&self.self_id) else { return };
    player.last_update = now;
    if let Some(head) = player.head() {
      self.camera.follow(head);
    }
    let update = PeerMessage::PlayerUpdate {
      angle: player.angle,
      segments: player.segments.clone(),
      speed: player.speed,
      score: player.score,
      kills: player.kills,
      effects: player.effects,
    };
    self.broadcast(update);
    self.report_hud();
  }

  fn steer_local(&mut self, dt_seconds: f64) {
    let Some(player) = self.world.player_mut(&self.self_id) else { return };
    let center = viewport_center();
    player.target_angle = (self.pointer.y - center.y).atan2(self.pointer.x - center.x);
    player.angle = turn_toward(player.angle, player.target_angle, dt_seconds);

    let mut speed = player.speed;
    if self.boosting {
      speed *= BOOST_MULTIPLIER;
      let roll: f64 = self.rng.gen();
      if roll < BOOST_SHRINK_CHANCE {
        shrink_snake(&mut player.segments, &mut player.score, MIN_LENGTH);
      }
    }
    if player.has_effect(Effect::Boost) {
      speed *= BOOST_EFFECT_MULTIPLIER;
    }
    advance_snake(&mut player.segments, player.angle, speed, dt_seconds);
  }

  /// Returns whether the local player is still alive afterwards.
  fn check_local_collision(&mut self) -> bool {
    let Some(local) = self.world.player(&self.self_id) else { return false };
    let Some(collision) = detect_collision(local, self.world.players().values()) else {
      return true;
    };
    let Some(player) = self.world.player_mut(&self.self_id) else { return false };
    if player.effects.remove(Effect::Shield) {
      tracing::debug!(?collision, "shield absorbed collision");
      self.status("Shield Protected You!".to_string(), Some(STATUS_SHORT_MS));
      return true;
    }
    self.handle_local_death(collision);
    false
  }

  fn handle_local_death(&mut self, collision: Collision) {
    let killed_by = collision.killer().map(str::to_string);
    tracing::info!(?collision, "local player died");
    self.world.apply_player_died(&self.self_id, killed_by.as_deref());
    self.mode = LocalMode::Dead;
    self.boosting = false;
    self.broadcast(PeerMessage::PlayerDied { killed_by });
    self.status("You died! Restart to play again.".to_string(), Some(STATUS_DEATH_MS));

    if self.is_authority() {
      if let Some(player) = self.world.players().get(&self.self_id) {
        let segments = player.segments.clone();
        let color = player.skin.body.clone();
        corpse_food(self.world.foods_mut(), &segments, &color, &mut self.rng);
      }
      let foods = self.world.foods().to_vec();
      self.broadcast(PeerMessage::FoodUpdate { foods });
    }
    self.push_leaderboard();
    self.check_game_end();
  }

  fn consume_food(&mut self, now: i64) {
    let Some(local) = self.world.player(&self.self_id) else { return };
    let Some(head) = local.head() else { return };
    let head_radius = body_radius(local.segments.len());

    let mut index = 0;
    while index < self.world.foods().len() {
      let food = &self.world.foods()[index];
      let reach = head_radius + food.size;
      if !circles_overlap(head, Point { x: food.x, y: food.y }, reach) {
        index += 1;
        continue;
      }
      let food = self.world.foods_mut().remove(index);
      let gain = food.score.max(1);
      if let Some(player) = self.world.player_mut(&self.self_id) {
        player.score += gain;
        grow_snake(&mut player.segments, gain as usize);
      }
      if let Some(effect) = food.effect() {
        self.apply_food_effect(effect, now);
      }
      self.broadcast(PeerMessage::FoodEaten { index, id: food.id });
      if self.is_authority() {
        self.replenish_food(1);
      }
    }
  }

  pub fn apply_food_effect(&mut self, effect: Effect, now: i64) {
    let Some(player) = self.world.player_mut(&self.self_id) else { return };
    player.effects.insert(effect);
    let generation = &mut self.effect_generations[effect.index()];
    *generation += 1;
    let generation = *generation;
    self
      .timers
      .schedule(now + effect.duration_ms(), TimedEvent::EffectExpired { effect, generation });
    tracing::debug!(?effect, generation, "effect activated");
    self.status(effect.activation_message().to_string(), Some(effect.duration_ms()));
  }

  /// Runs every timer due at or before `now`.
  pub fn fire_due_timers(&mut self, now: i64) {
    while let Some(event) = self.timers.pop_due(now) {
      match event {
        TimedEvent::EffectExpired { effect, generation } => {
          // A newer activation of the same effect owns the flag now.
          if self.effect_generations[effect.index()] != generation {
            continue;
          }
          if let Some(player) = self.world.player_mut(&self.self_id) {
            player.effects.remove(effect);
          }
        }
        TimedEvent::Shrink => {
          self.periodic_shrink();
          self.timers.schedule(now + SHRINK_INTERVAL_MS, TimedEvent::Shrink);
        }
      }
    }
  }

  fn periodic_shrink(&mut self) {
    if self.mode != LocalMode::Playing {
      return;
    }
    let Some(player) = self.world.player_mut(&self.self_id) else { return };
    if !player.alive {
      return;
    }
    if shrink_snake(&mut player.segments, &mut player.score, MIN_LENGTH) {
      self.report_hud();
    }
  }

  fn extrapolate_remote(&mut self, dt_seconds: f64, now: i64) {
    let self_id = self.self_id.as_str();
    for (id, player) in self.world.players_mut() {
      if id.as_str() == self_id || !player.alive || now - player.last_update > STALE_PLAYER_MS {
        continue;
      }
      player.angle = turn_toward(player.angle, player.target_angle, dt_seconds);
      let mut speed = player.speed;
      if player.has_effect(Effect::Boost) {
        speed *= BOOST_EFFECT_MULTIPLIER;
      }
      advance_snake(&mut player.segments, player.angle, speed, dt_seconds);
    }
  }

  fn follow_top_player(&mut self) {
    let top = self
      .world
      .top_alive_player()
      .and_then(|player| Some((player.id.clone(), player.name.clone(), player.head()?)));
    let target_id = top.as_ref().map(|(id, _, _)| id.clone());
    let changed = target_id != self.spectate_target;
    self.spectate_target = target_id;
    match top {
      Some((_, name, head)) => {
        self.camera.follow(head);
        if changed {
          self.status(format!("Spectating: {name}"), None);
        }
      }
      None if changed => self.status("Spectating: No active players".to_string(), None),
      None => {}
    }
  }

  fn replenish_food(&mut self, count: usize) {
    let added = spawn_food(self.world.foods_mut(), count, &mut self.rng);
    tracing::debug!(added, total = self.world.foods().len(), "spawned food");
    let foods = self.world.foods().to_vec();
    self.broadcast(PeerMessage::FoodUpdate { foods });
  }

  fn check_game_end(&mut self) {
    let Some(outcome) = evaluate_termination(&self.world) else { return };
    tracing::info!(winner_id = outcome.winner_id.as_deref(), "game over");
    self.world.end_game(outcome.winner_id.clone());
    self.broadcast(PeerMessage::GameEnd {
      winner_id: outcome.winner_id.clone(),
    });
    self.announce_game_end(outcome.winner_id);
  }

  fn announce_game_end(&mut self, winner_id: Option<PeerId>) {
    let winner_name = winner_id
      .as_deref()
      .and_then(|id| self.world.player(id))
      .map(|player| player.name.clone());
    self.boosting = false;
    self.ui_events.push(UiEvent::GameEnded {
      winner_id,
      winner_name,
    });
  }

  fn local_join_message(&self) -> Option<PeerMessage> {
    if self.mode != LocalMode::Playing {
      return None;
    }
    let player = self.local_player().filter(|player| player.alive)?;
    Some(PeerMessage::PlayerJoin {
      name: player.name.clone(),
      skin: player.skin.clone(),
      angle: player.angle,
      segments: player.segments.clone(),
      speed: player.speed,
      score: player.score,
      kills: player.kills,
    })
  }

  pub fn snapshot(&self) -> PeerMessage {
    PeerMessage::GameState {
      phase: self.world.phase(),
      players: self.world.players().clone(),
      foods: self.world.foods().to_vec(),
    }
  }

  fn broadcast(&mut self, message: PeerMessage) {
    let stale = self.membership.broadcast(&message);
    if !stale.is_empty() {
      self.drop_peers(stale);
    }
  }

  /// Forgets peers whose channel turned out to be closed, the same way a close event would.
  fn drop_peers(&mut self, peer_ids: Vec<PeerId>) {
    let mut removed_player = false;
    for peer_id in peer_ids {
      if !self.membership.evict(&peer_id) {
        continue;
      }
      tracing::warn!(peer_id = %peer_id, "dropping unreachable peer");
      self.status(format!("Lost connection to {peer_id}"), Some(STATUS_SHORT_MS));
      removed_player |= self.world.remove_player(&peer_id).is_some();
    }
    if removed_player {
      self.push_leaderboard();
      self.check_game_end();
    }
  }

  /// Closes every channel and cancels pending timers.
  pub fn shutdown(&mut self) {
    let closed = self.membership.close_all();
    tracing::info!(closed = closed.len(), "session shut down");
    self.timers.clear();
    self.shrink_scheduled = false;
  }

  fn status(&mut self, text: String, duration_ms: Option<i64>) {
    self.ui_events.push(UiEvent::Status { text, duration_ms });
  }

  fn push_leaderboard(&mut self) {
    let board = self.world.leaderboard(Some(&self.self_id));
    self.ui_events.push(UiEvent::Leaderboard(board));
  }

  fn report_hud(&mut self) {
    let Some(player) = self.world.player(&self.self_id) else { return };
    let (length, kills) = (player.segments.len(), player.kills);
    if length != self.hud.length {
      self.hud.length = length;
      self.ui_events.push(UiEvent::Length(length));
    }
    if kills != self.hud.kills {
      self.hud.kills = kills;
      self.ui_events.push(UiEvent::Kills(kills));
    }
  }
}

fn viewport_center() -> Point {
  Point {
    x: VIEWPORT_WIDTH / 2.0,
    y: VIEWPORT_HEIGHT / 2.0,
  }
}
