use anyhow::{bail, Context};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeersResponse {
    #[serde(rename = "self")]
    pub self_peer: PeerInfo,
    pub peers: Vec<PeerInfo>,
}

/// Peers this process has heard of, by id. Filled from inbound `advertise` addresses and from
/// bootstrap listings.
#[derive(Debug)]
pub struct PeerDirectory {
    self_peer: PeerInfo,
    known: DashMap<String, String>,
}

impl PeerDirectory {
    pub fn new(self_peer: PeerInfo) -> Self {
        Self {
            self_peer,
            known: DashMap::new(),
        }
    }

    pub fn self_peer(&self) -> &PeerInfo {
        &self.self_peer
    }

    /// Returns whether the peer was not known before.
    pub fn remember(&self, peer: &PeerInfo) -> bool {
        if peer.id == self.self_peer.id {
            return false;
        }
        self.known
            .insert(peer.id.clone(), peer.url.trim_end_matches('/').to_string())
            .is_none()
    }

    pub fn listing(&self) -> PeersResponse {
        let mut peers: Vec<PeerInfo> = self
            .known
            .iter()
            .map(|entry| PeerInfo {
                id: entry.key().clone(),
                url: entry.value().clone(),
            })
            .collect();
        peers.sort_by(|a, b| a.id.cmp(&b.id));
        PeersResponse {
            self_peer: self.self_peer.clone(),
            peers,
        }
    }
}

/// Every peer a bootstrap node knows, including the bootstrap node itself.
pub async fn fetch_peers(client: &reqwest::Client, base_url: &str) -> anyhow::Result<Vec<PeerInfo>> {
    let endpoint = format!("{}/api/peers", base_url.trim_end_matches('/'));
    let response = client
        .get(&endpoint)
        .send()
        .await
        .with_context(|| format!("peer listing request failed for {endpoint}"))?;
    let status = response.status();
    if !status.is_success() {
        bail!("peer listing at {endpoint} returned {}", status.as_u16());
    }
    let listing = response
        .json::<PeersResponse>()
        .await
        .with_context(|| format!("failed to decode peer listing from {endpoint}"))?;
    let mut peers = vec![listing.self_peer];
    peers.extend(listing.peers);
    Ok(peers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(id: &str, url: &str) -> PeerInfo {
        PeerInfo {
            id: id.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn remember_ignores_self_and_reports_new_peers() {
        let directory = PeerDirectory::new(peer("slither-a", "http://a"));
        assert!(!directory.remember(&peer("slither-a", "http://a")));
        assert!(directory.remember(&peer("slither-c", "http://c/")));
        assert!(!directory.remember(&peer("slither-c", "http://c")));
        assert!(directory.remember(&peer("slither-b", "http://b")));

        let listing = directory.listing();
        assert_eq!(listing.self_peer.id, "slither-a");
        assert_eq!(
            listing.peers,
            vec![peer("slither-b", "http://b"), peer("slither-c", "http://c")]
        );
    }

    #[test]
    fn listing_uses_self_key_on_the_wire() {
        let directory = PeerDirectory::new(peer("slither-a", "http://a"));
        let value = serde_json::to_value(directory.listing()).unwrap();
        assert_eq!(value["self"]["id"], "slither-a");
        assert!(value["peers"].as_array().is_some_and(|peers| peers.is_empty()));
    }
}
