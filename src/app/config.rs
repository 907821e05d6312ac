use anyhow::{bail, Context};
use std::env;

use crate::shared::names::{generate_peer_id, is_valid_peer_id};

/// What the peer does once it is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    Play,
    Spectate,
    Idle,
}

#[derive(Debug, Clone)]
pub struct PeerConfig {
    pub peer_id: String,
    pub port: u16,
    pub advertise_url: String,
    pub bootstrap_urls: Vec<String>,
    pub player_name: Option<String>,
    pub start_mode: StartMode,
    pub autopilot: bool,
    pub auto_restart: bool,
    pub rng_seed: Option<u64>,
}

impl PeerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8787);
        Self {
            peer_id: non_empty_env("PEER_ID").unwrap_or_else(generate_peer_id),
            port,
            advertise_url: non_empty_env("ADVERTISE_URL")
                .unwrap_or_else(|| format!("http://127.0.0.1:{port}")),
            bootstrap_urls: match non_empty_env("BOOTSTRAP_URL") {
                Some(raw) => parse_url_list("BOOTSTRAP_URL", &raw)?,
                None => Vec::new(),
            },
            player_name: non_empty_env("PLAYER_NAME"),
            start_mode: match non_empty_env("PEER_MODE") {
                Some(raw) => parse_start_mode(&raw)?,
                None => StartMode::Play,
            },
            autopilot: env::var("AUTOPILOT")
                .map(|value| parse_flag(&value))
                .unwrap_or(true),
            auto_restart: env::var("AUTO_RESTART")
                .map(|value| parse_flag(&value))
                .unwrap_or(false),
            rng_seed: match non_empty_env("RNG_SEED") {
                Some(raw) => Some(
                    raw.parse::<u64>()
                        .with_context(|| format!("RNG_SEED has invalid value '{raw}'"))?,
                ),
                None => None,
            },
        }
        .validate()
    }

    fn validate(self) -> anyhow::Result<Self> {
        if !is_valid_peer_id(&self.peer_id) {
            bail!("PEER_ID may only contain ASCII letters, digits, '-' and '_'");
        }
        parse_url_list("ADVERTISE_URL", &self.advertise_url)?;
        Ok(self)
    }
}

fn non_empty_env(var_name: &str) -> Option<String> {
    env::var(var_name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE" | "yes")
}

fn parse_start_mode(raw: &str) -> anyhow::Result<StartMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "play" => Ok(StartMode::Play),
        "spectate" => Ok(StartMode::Spectate),
        "idle" => Ok(StartMode::Idle),
        other => bail!("PEER_MODE must be play, spectate or idle, got '{other}'"),
    }
}

fn parse_url_list(var_name: &str, raw: &str) -> anyhow::Result<Vec<String>> {
    let mut urls = Vec::new();
    for token in raw.split(',') {
        let trimmed = token.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("{var_name} contains an empty url segment");
        }
        let url = reqwest::Url::parse(trimmed)
            .with_context(|| format!("{var_name} has invalid url '{trimmed}'"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("{var_name} must use http or https, got '{trimmed}'");
        }
        if !urls.iter().any(|existing| existing == trimmed) {
            urls.push(trimmed.to_string());
        }
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_url_list_accepts_csv_and_deduplicates() {
        let urls = parse_url_list("BOOTSTRAP_URL", "http://a:8787/, http://b:8788,http://a:8787")
            .unwrap();
        assert_eq!(urls, vec!["http://a:8787", "http://b:8788"]);
    }

    #[test]
    fn parse_url_list_rejects_empty_segment_and_bad_scheme() {
        let error = parse_url_list("BOOTSTRAP_URL", "http://a:8787,,http://b:1")
            .expect_err("empty segment should fail");
        assert!(error.to_string().contains("contains an empty url segment"));
        assert!(parse_url_list("BOOTSTRAP_URL", "ftp://a").is_err());
        assert!(parse_url_list("BOOTSTRAP_URL", "not a url").is_err());
    }

    #[test]
    fn start_mode_parses_case_insensitively() {
        assert_eq!(parse_start_mode("Spectate").unwrap(), StartMode::Spectate);
        assert_eq!(parse_start_mode(" idle ").unwrap(), StartMode::Idle);
        assert!(parse_start_mode("watch").is_err());
    }

    #[test]
    fn flags_accept_common_truthy_values() {
        assert!(parse_flag("1"));
        assert!(parse_flag("true"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("off"));
    }
}
