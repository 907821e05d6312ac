use super::types::{GamePhase, PeerId};
use super::world::World;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    pub winner_id: Option<PeerId>,
}

/// Decides whether a playing game is over: one survivor wins, no survivors is a draw.
///
/// Only a `playing` phase can end, and a draw needs at least one player to have existed.
pub fn evaluate_termination(world: &World) -> Option<GameOutcome> {
    if world.phase() != GamePhase::Playing {
        return None;
    }
    let mut alive = world.alive_players();
    match (alive.next(), alive.next()) {
        (Some(survivor), None) => Some(GameOutcome {
            winner_id: Some(survivor.id.clone()),
        }),
        (None, _) if world.players_seen() => Some(GameOutcome { winner_id: None }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::{Point, Skin};
    use crate::game::world::JoinState;

    fn join(world: &mut World, id: &str) {
        world.apply_player_join(
            id,
            JoinState {
                name: id.to_string(),
                skin: Skin {
                    body: "#fff".to_string(),
                    pattern: "#fff".to_string(),
                    eye: "#000".to_string(),
                },
                angle: 0.0,
                segments: vec![Point { x: 1.0, y: 1.0 }],
                speed: 3.0,
                score: 1,
                kills: 0,
            },
            0,
        );
    }

    #[test]
    fn waiting_phase_never_ends() {
        let mut world = World::new();
        join(&mut world, "a");
        assert_eq!(evaluate_termination(&world), None);
    }

    #[test]
    fn sole_survivor_wins() {
        let mut world = World::new();
        world.set_phase(GamePhase::Playing);
        join(&mut world, "a");
        join(&mut world, "b");
        join(&mut world, "c");
        world.apply_player_died("b", None);
        assert_eq!(evaluate_termination(&world), None);
        world.apply_player_died("c", None);
        assert_eq!(
            evaluate_termination(&world),
            Some(GameOutcome {
                winner_id: Some("a".to_string())
            })
        );
    }

    #[test]
    fn no_survivor_is_draw_only_after_players_existed() {
        let mut world = World::new();
        world.set_phase(GamePhase::Playing);
        assert_eq!(evaluate_termination(&world), None);
        join(&mut world, "a");
        world.remove_player("a");
        assert_eq!(
            evaluate_termination(&world),
            Some(GameOutcome { winner_id: None })
        );
    }

    #[test]
    fn ended_phase_is_terminal() {
        let mut world = World::new();
        join(&mut world, "a");
        world.end_game(Some("a".to_string()));
        assert_eq!(evaluate_termination(&world), None);
    }
}
