//! Leaderless mutation authority.
//!
//! The peer with the lexicographically smallest id among itself and its open channels spawns
//! replacement food and turns corpses into food. The rule is recomputed on every use, so it
//! follows membership changes without a handover. It is only unique when every peer is directly
//! connected to every other peer: with a partial mesh two peers can each see themselves as the
//! minimum of their own neighbourhood and both spawn food.

pub fn is_authority<'a, I>(self_id: &str, connected_ids: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    connected_ids.into_iter().all(|id| self_id <= id)
}
