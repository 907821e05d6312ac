use super::constants::LEADERBOARD_SIZE;
use super::effects::EffectSet;
use super::food::locate_food;
use super::types::{Food, GamePhase, LeaderboardEntry, PeerId, Player, Point, Skin};
use std::collections::HashMap;

/// Fields carried by a `playerJoin` message.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinState {
    pub name: String,
    pub skin: Skin,
    pub angle: f64,
    pub segments: Vec<Point>,
    pub speed: f64,
    pub score: i64,
    pub kills: i64,
}

/// Fields carried by a `playerUpdate` message.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionState {
    pub angle: f64,
    pub segments: Vec<Point>,
    pub speed: f64,
    pub score: i64,
    pub kills: i64,
    pub effects: EffectSet,
}

/// Shared replica of players, food and phase.
///
/// Mutation entry points mirror the protocol messages; none of them fail. Indices that do not
/// resolve and updates for unknown players are ignored.
#[derive(Debug, Default)]
pub struct World {
    players: HashMap<PeerId, Player>,
    foods: Vec<Food>,
    phase: GamePhase,
    winner_id: Option<PeerId>,
    players_seen: bool,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn players(&self) -> &HashMap<PeerId, Player> {
        &self.players
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    pub fn players_mut(&mut self) -> impl Iterator<Item = (&PeerId, &mut Player)> {
        self.players.iter_mut()
    }

    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    pub fn foods_mut(&mut self) -> &mut Vec<Food> {
        &mut self.foods
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[cfg(test)]
    pub fn winner_id(&self) -> Option<&str> {
        self.winner_id.as_deref()
    }

    pub fn players_seen(&self) -> bool {
        self.players_seen
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|player| player.alive)
    }

    pub fn insert_player(&mut self, player: Player) {
        self.players_seen = true;
        self.players.insert(player.id.clone(), player);
    }

    pub fn remove_player(&mut self, id: &str) -> Option<Player> {
        self.players.remove(id)
    }

    pub fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
        if phase != GamePhase::Ended {
            self.winner_id = None;
        }
    }

    pub fn end_game(&mut self, winner_id: Option<PeerId>) {
        self.phase = GamePhase::Ended;
        self.winner_id = winner_id;
    }

    pub fn apply_player_join(&mut self, sender: &str, join: JoinState, now: i64) {
        self.insert_player(Player {
            id: sender.to_string(),
            name: join.name,
            skin: join.skin,
            angle: join.angle,
            target_angle: join.angle,
            segments: join.segments,
            speed: join.speed,
            score: join.score,
            kills: join.kills,
            alive: true,
            effects: EffectSet::empty(),
            last_update: now,
        });
    }

    /// Last-write-wins overwrite of the sender's motion fields.
    pub fn apply_player_update(&mut self, sender: &str, update: MotionState, now: i64) -> bool {
        let Some(player) = self.players.get_mut(sender) else { return false };
        player.angle = update.angle;
        player.target_angle = update.angle;
        player.segments = update.segments;
        player.speed = update.speed;
        player.score = update.score;
        player.kills = update.kills;
        player.effects = update.effects;
        player.last_update = now;
        true
    }

    /// Marks the sender dead and credits the killer. Returns the credited killer id.
    pub fn apply_player_died(&mut self, sender: &str, killed_by: Option<&str>) -> Option<PeerId> {
        let player = self.players.get_mut(sender)?;
        player.alive = false;
        let killer_id = killed_by?;
        let killer = self
            .players
            .get_mut(killer_id)
            .filter(|killer| killer.alive)?;
        killer.kills += 1;
        Some(killer.id.clone())
    }

    pub fn replace_food(&mut self, foods: Vec<Food>) {
        self.foods = foods;
    }

    pub fn remove_food(&mut self, index: usize, id: Option<u64>) -> Option<Food> {
        let position = locate_food(&self.foods, index, id)?;
        Some(self.foods.remove(position))
    }

    /// Wholesale replacement from a peer's snapshot.
    pub fn apply_snapshot(
        &mut self,
        phase: GamePhase,
        players: HashMap<PeerId, Player>,
        foods: Vec<Food>,
        now: i64,
    ) {
        self.players = players;
        for (id, player) in self.players.iter_mut() {
            player.id = id.clone();
            player.last_update = now;
        }
        if !self.players.is_empty() {
            self.players_seen = true;
        }
        self.foods = foods;
        self.set_phase(phase);
    }

    /// Snapshot catch-up for a replica that is already in the game. Players it has never heard
    /// of are added; records it already holds stay. Food is only taken when `foods` is given.
    /// Phase is left alone.
    pub fn merge_snapshot(
        &mut self,
        players: HashMap<PeerId, Player>,
        foods: Option<Vec<Food>>,
        now: i64,
    ) -> usize {
        let mut added = 0;
        for (id, mut player) in players {
            if self.players.contains_key(&id) {
                continue;
            }
            player.id = id.clone();
            player.last_update = now;
            self.players.insert(id, player);
            added += 1;
        }
        if !self.players.is_empty() {
            self.players_seen = true;
        }
        if let Some(foods) = foods {
            self.foods = foods;
        }
        added
    }

    pub fn leaderboard(&self, local_id: Option<&str>) -> Vec<LeaderboardEntry> {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        players
            .into_iter()
            .take(LEADERBOARD_SIZE)
            .map(|player| LeaderboardEntry {
                id: player.id.clone(),
                name: player.name.clone(),
                score: player.score,
                alive: player.alive,
                is_local: Some(player.id.as_str()) == local_id,
            })
            .collect()
    }

    /// Alive player with the highest score, ties broken by id.
    pub fn top_alive_player(&self) -> Option<&Player> {
        self.alive_players()
            .max_by(|a, b| a.score.cmp(&b.score).then_with(|| b.id.cmp(&a.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skin() -> Skin {
        Skin {
            body: "#FF5733".to_string(),
            pattern: "#FF8C66".to_string(),
            eye: "#FFFFFF".to_string(),
        }
    }

    fn join(score: i64) -> JoinState {
        JoinState {
            name: "P".to_string(),
            skin: skin(),
            angle: 0.5,
            segments: vec![Point { x: 10.0, y: 10.0 }, Point { x: 5.0, y: 10.0 }],
            speed: crate::game::constants::BASE_SPEED,
            score,
            kills: 0,
        }
    }

    #[test]
    fn join_inserts_alive_player_without_effects() {
        let mut world = World::new();
        world.apply_player_join("peer-a", join(15), 42);
        let player = world.player("peer-a").expect("player");
        assert!(player.alive);
        assert!(player.effects.is_empty());
        assert_eq!(player.target_angle, 0.5);
        assert_eq!(player.last_update, 42);
        assert!(world.players_seen());
    }

    #[test]
    fn update_is_idempotent() {
        let mut world = World::new();
        world.apply_player_join("peer-a", join(15), 0);
        let update = MotionState {
            angle: 1.0,
            segments: vec![Point { x: 20.0, y: 20.0 }],
            speed: 3.0,
            score: 17,
            kills: 1,
            effects: EffectSet::empty(),
        };
        world.apply_player_update("peer-a", update.clone(), 100);
        let once = world.player("peer-a").cloned();
        world.apply_player_update("peer-a", update, 100);
        assert_eq!(world.player("peer-a").cloned(), once);
    }

    #[test]
    fn update_for_unknown_sender_is_ignored() {
        let mut world = World::new();
        let update = MotionState {
            angle: 1.0,
            segments: Vec::new(),
            speed: 3.0,
            score: 1,
            kills: 0,
            effects: EffectSet::empty(),
        };
        assert!(!world.apply_player_update("ghost", update, 0));
        assert!(world.players().is_empty());
    }

    #[test]
    fn death_credits_only_alive_killer() {
        let mut world = World::new();
        world.apply_player_join("a", join(15), 0);
        world.apply_player_join("b", join(3), 0);
        world.apply_player_join("c", join(3), 0);
        assert_eq!(world.apply_player_died("b", Some("a")), Some("a".to_string()));
        assert_eq!(world.player("a").map(|p| p.kills), Some(1));
        assert!(!world.player("b").expect("b").alive);

        assert_eq!(world.apply_player_died("c", Some("b")), None);
        assert_eq!(world.player("b").map(|p| p.kills), Some(0));
        assert!(!world.player("c").expect("c").alive);
    }

    #[test]
    fn snapshot_replaces_players_wholesale() {
        let mut world = World::new();
        world.apply_player_join("old", join(1), 0);
        let mut incoming = HashMap::new();
        let mut remote = world.player("old").cloned().expect("old");
        remote.id = "stale-id".to_string();
        incoming.insert("remote".to_string(), remote);
        world.apply_snapshot(GamePhase::Playing, incoming, Vec::new(), 9);
        assert!(world.player("old").is_none());
        assert_eq!(
            world.player("remote").map(|p| (p.id.as_str(), p.last_update)),
            Some(("remote", 9))
        );
        assert_eq!(world.phase(), GamePhase::Playing);
    }

    #[test]
    fn merge_adds_unknown_players_and_keeps_known_ones() {
        let mut world = World::new();
        world.apply_player_join("a", join(30), 0);
        world.apply_player_join("b", join(12), 0);
        world.replace_food(vec![Food {
            id: Some(1),
            x: 1.0,
            y: 1.0,
            color: "#FF5722".to_string(),
            size: 2.0,
            kind: None,
            score: 1,
        }]);

        let mut incoming = HashMap::new();
        let mut stale_b = world.player("b").cloned().expect("b");
        stale_b.score = 1;
        incoming.insert("b".to_string(), stale_b);
        let mut newcomer = world.player("a").cloned().expect("a");
        newcomer.score = 15;
        incoming.insert("c".to_string(), newcomer);

        assert_eq!(world.merge_snapshot(incoming, None, 7), 1);
        assert_eq!(world.player("b").map(|p| p.score), Some(12));
        assert_eq!(world.player("c").map(|p| (p.id.as_str(), p.last_update)), Some(("c", 7)));
        assert_eq!(world.foods().len(), 1);
        assert_eq!(world.players().len(), 3);
    }

    #[test]
    fn leaderboard_is_top_five_by_score() {
        let mut world = World::new();
        for (index, score) in [4, 9, 1, 7, 3, 8].into_iter().enumerate() {
            world.apply_player_join(&format!("p{index}"), join(score), 0);
        }
        let board = world.leaderboard(Some("p1"));
        let scores: Vec<i64> = board.iter().map(|entry| entry.score).collect();
        assert_eq!(scores, vec![9, 8, 7, 4, 3]);
        assert!(board[0].is_local);
    }
}
