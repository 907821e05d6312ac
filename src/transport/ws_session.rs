use super::TransportHub;
use crate::protocol::encode_message;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

/// Pumps frames for a channel another peer opened to us.
pub async fn handle_socket(socket: WebSocket, peer_id: String, hub: TransportHub) {
    let (mut sender, mut receiver) = socket.split();
    let mut channel = hub.open(&peer_id);
    tracing::debug!(peer_id, connection_id = channel.connection_id, "inbound channel open");

    loop {
        tokio::select! {
            outbound = channel.outbound.recv() => {
                // The session dropped its sender: it evicted the peer or is shutting down.
                let Some(message) = outbound else {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                };
                let text = match encode_message(&message) {
                    Ok(text) => text,
                    Err(error) => {
                        tracing::warn!(?error, kind = message.kind(), "failed to encode message");
                        continue;
                    }
                };
                if sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            inbound = receiver.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => hub.deliver(&channel, &text),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(error)) => {
                        hub.fail(&channel, error.to_string());
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    hub.close(channel);
}
