use super::constants::{SELF_COLLISION_RADIUS_MULT, SELF_COLLISION_SKIP};
use super::effects::Effect;
use super::math::{body_radius, circles_overlap};
use super::snake::is_on_boundary;
use super::types::{PeerId, Player};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collision {
    Snake(PeerId),
    OwnBody,
    Boundary,
}

impl Collision {
    pub fn killer(&self) -> Option<&str> {
        match self {
            Collision::Snake(id) => Some(id.as_str()),
            Collision::OwnBody | Collision::Boundary => None,
        }
    }
}

/// First collision of `local`'s head, checked against other bodies, then its own body, then the
/// world edge. Heads never collide with heads, and a ghost on either side skips the pair.
pub fn detect_collision<'a, I>(local: &Player, others: I) -> Option<Collision>
where
    I: IntoIterator<Item = &'a Player>,
{
    let head = local.head()?;
    let head_radius = body_radius(local.segments.len());

    if !local.has_effect(Effect::Ghost) {
        for other in others {
            if !other.alive || other.id == local.id || other.has_effect(Effect::Ghost) {
                continue;
            }
            let radius_sum = body_radius(other.segments.len()) + head_radius;
            let hit = other
                .segments
                .iter()
                .skip(1)
                .any(|segment| circles_overlap(head, *segment, radius_sum));
            if hit {
                return Some(Collision::Snake(other.id.clone()));
            }
        }
    }

    let own_radius = head_radius * SELF_COLLISION_RADIUS_MULT;
    let self_hit = local
        .segments
        .iter()
        .skip(SELF_COLLISION_SKIP)
        .any(|segment| circles_overlap(head, *segment, own_radius));
    if self_hit {
        return Some(Collision::OwnBody);
    }

    if is_on_boundary(head) {
        return Some(Collision::Boundary);
    }

    None
}
