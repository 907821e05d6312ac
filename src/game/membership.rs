use super::authority::is_authority;
use super::types::PeerId;
use crate::protocol::PeerMessage;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;

pub type PeerSender = UnboundedSender<PeerMessage>;

#[derive(Debug)]
struct PeerLink {
    connection_id: u64,
    sender: PeerSender,
}

/// Open channels keyed by remote peer id.
#[derive(Debug, Default)]
pub struct Membership {
    links: HashMap<PeerId, PeerLink>,
}

impl Membership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a channel. A second channel for the same peer replaces the first one.
    /// Returns whether the peer was previously unknown.
    pub fn register(&mut self, peer_id: &str, connection_id: u64, sender: PeerSender) -> bool {
        self.links
            .insert(
                peer_id.to_string(),
                PeerLink {
                    connection_id,
                    sender,
                },
            )
            .is_none()
    }

    /// Removes the channel if `connection_id` is the one currently registered. A close event
    /// from a channel that was already replaced is ignored.
    pub fn deregister(&mut self, peer_id: &str, connection_id: u64) -> bool {
        match self.links.get(peer_id) {
            Some(link) if link.connection_id == connection_id => {
                self.links.remove(peer_id);
                true
            }
            _ => false,
        }
    }

    /// Drops the channel regardless of connection id. Used for channels found dead on send.
    pub fn evict(&mut self, peer_id: &str) -> bool {
        self.links.remove(peer_id).is_some()
    }

    #[cfg(test)]
    pub fn contains(&self, peer_id: &str) -> bool {
        self.links.contains_key(peer_id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(String::as_str)
    }

    pub fn is_authority(&self, self_id: &str) -> bool {
        is_authority(self_id, self.ids())
    }

    /// Whether `peer_id` holds authority over the neighbourhood this peer can see.
    pub fn is_peer_authority(&self, self_id: &str, peer_id: &str) -> bool {
        is_authority(peer_id, self.ids().chain(std::iter::once(self_id)))
    }

    /// Returns `false` when the peer is unknown or its channel is closed.
    pub fn send_to(&self, peer_id: &str, message: PeerMessage) -> bool {
        let Some(link) = self.links.get(peer_id) else { return false };
        link.sender.send(message).is_ok()
    }

    /// Sends the same message on every open channel and returns the peers whose channel was
    /// found closed.
    pub fn broadcast(&self, message: &PeerMessage) -> Vec<PeerId> {
        let mut stale = Vec::new();
        for (peer_id, link) in &self.links {
            if link.sender.send(message.clone()).is_err() {
                stale.push(peer_id.clone());
            }
        }
        stale
    }

    /// Drops every sender, which closes the outbound half of each channel.
    pub fn close_all(&mut self) -> Vec<PeerId> {
        self.links.drain().map(|(peer_id, _)| peer_id).collect()
    }
}
