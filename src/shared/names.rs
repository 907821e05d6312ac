use rand::Rng;
use uuid::Uuid;

pub const MAX_PLAYER_NAME_LENGTH: usize = 15;
const PEER_ID_PREFIX: &str = "slither-";
const PEER_ID_SUFFIX_LENGTH: usize = 9;

pub fn sanitize_player_name(name: &str, fallback: &str) -> String {
    let cleaned = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return fallback.to_string();
    }
    cleaned.chars().take(MAX_PLAYER_NAME_LENGTH).collect()
}

pub fn fallback_player_name<R: Rng>(rng: &mut R) -> String {
    format!("Player {}", rng.gen_range(0..1000))
}

pub fn generate_peer_id() -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(PEER_ID_SUFFIX_LENGTH)
        .collect();
    format!("{PEER_ID_PREFIX}{suffix}")
}

/// Peer ids travel in URL paths, so they stay within a conservative alphabet.
pub fn is_valid_peer_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 64
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}
