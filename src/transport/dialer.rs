use super::discovery::PeerInfo;
use super::{ChannelHandle, TransportHub};
use crate::protocol::encode_message;
use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Websocket address on `peer` that accepts a channel from `self_id`.
pub fn channel_url(peer: &PeerInfo, self_id: &str, advertise_url: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(&peer.url)
        .with_context(|| format!("invalid peer url '{}'", peer.url))?
        .join(&format!("/api/peer/{self_id}"))
        .context("failed to build peer channel path")?;
    let scheme = match url.scheme() {
        "https" => "wss",
        _ => "ws",
    };
    url.set_scheme(scheme)
        .map_err(|_| anyhow::anyhow!("cannot switch '{}' to a websocket scheme", peer.url))?;
    url.query_pairs_mut().append_pair("advertise", advertise_url);
    Ok(url)
}

/// A dialed socket already registered with the session.
pub struct DialedChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    channel: ChannelHandle,
}

/// Connects to `peer` and registers the channel. The session has seen the `PeerConnected` event
/// by the time this returns, so commands queued afterwards are handled after the connect.
pub async fn open_channel(
    peer: &PeerInfo,
    self_id: &str,
    advertise_url: &str,
    hub: &TransportHub,
) -> anyhow::Result<DialedChannel> {
    let url = channel_url(peer, self_id, advertise_url)?;
    let (stream, _) = connect_async(url.as_str())
        .await
        .with_context(|| format!("failed to connect to peer {} at {}", peer.id, peer.url))?;
    let channel = hub.open(&peer.id);
    tracing::info!(peer_id = %peer.id, connection_id = channel.connection_id, "dialed peer");
    Ok(DialedChannel { stream, channel })
}

/// Pumps frames over a dialed channel until either side closes it.
pub async fn pump(dialed: DialedChannel, hub: TransportHub) {
    let DialedChannel {
        stream,
        mut channel,
    } = dialed;
    let (mut sender, mut receiver) = stream.split();

    loop {
        tokio::select! {
            outbound = channel.outbound.recv() => {
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
