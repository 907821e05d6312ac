pub mod dialer;
pub mod discovery;
pub mod ws_session;

use crate::game::session::SessionEvent;
use crate::protocol::{decode_message, PeerMessage};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Turns socket activity into session events. Cheap to clone; every socket task holds one.
#[derive(Debug, Clone)]
pub struct TransportHub {
    events: UnboundedSender<SessionEvent>,
    next_connection_id: Arc<AtomicU64>,
}

/// One open channel as seen from its socket task.
#[derive(Debug)]
pub struct ChannelHandle {
    pub peer_id: String,
    pub connection_id: u64,
    pub outbound: UnboundedReceiver<PeerMessage>,
}

impl TransportHub {
    pub fn new(events: UnboundedSender<SessionEvent>) -> Self {
        Self {
            events,
            next_connection_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Registers a freshly opened socket with the session and hands back the queue of frames to
    /// write to it.
    pub fn open(&self, peer_id: &str) -> ChannelHandle {
        let connection_id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
        let (sender, outbound) = mpsc::unbounded_channel();
        self.emit(SessionEvent::PeerConnected {
            peer_id: peer_id.to_string(),
            connection_id,
            sender,
        });
        ChannelHandle {
            peer_id: peer_id.to_string(),
            connection_id,
            outbound,
        }
    }

    pub fn deliver(&self, channel: &ChannelHandle, text: &str) {
        let Some(message) = decode_message(text) else {
            tracing::debug!(peer_id = %channel.peer_id, "dropping malformed frame");
            return;
        };
        self.emit(SessionEvent::PeerMessage {
            peer_id: channel.peer_id.clone(),
            message,
        });
    }

    pub fn fail(&self, channel: &ChannelHandle, error: String) {
        self.emit(SessionEvent::PeerError {
            peer_id: channel.peer_id.clone(),
            error,
        });
    }

    pub fn close(&self, channel: ChannelHandle) {
        self.emit(SessionEvent::PeerDisconnected {
            peer_id: channel.peer_id,
            connection_id: channel.connection_id,
        });
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("session loop gone, dropping transport event");
        }
    }
}
