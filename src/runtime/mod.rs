mod driver;

use crate::app::config::{PeerConfig, StartMode};
use crate::game::session::{LocalCommand, Session, SessionEvent};
use crate::shared::names::is_valid_peer_id;
use crate::transport::dialer::{open_channel, pump};
use crate::transport::discovery::{fetch_peers, PeerDirectory, PeerInfo};
use crate::transport::ws_session::handle_socket;
use crate::transport::TransportHub;
use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use driver::DriverOptions;
use futures_util::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
struct PeerState {
    hub: TransportHub,
    directory: Arc<PeerDirectory>,
}

#[derive(Debug, Serialize)]
struct OkResponse {
    ok: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    ok: bool,
    error: String,
}

#[derive(Debug, Deserialize)]
struct ChannelQuery {
    advertise: Option<String>,
}

pub async fn run_peer(config: PeerConfig) -> anyhow::Result<()> {
    let (events_tx, events_rx) = mpsc::unbounded_channel::<SessionEvent>();
    let hub = TransportHub::new(events_tx.clone());
    let directory = Arc::new(PeerDirectory::new(PeerInfo {
        id: config.peer_id.clone(),
        url: config.advertise_url.clone(),
    }));
    let state = PeerState {
        hub: hub.clone(),
        directory: Arc::clone(&directory),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);
    let app: Router = Router::new()
        .route("/api/health", get(health))
        .route("/api/peers", get(peers))
        .route("/api/peer/:peer_id", get(peer_channel_handler))
        .layer(cors)
        .with_state(state);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(peer_id = %config.peer_id, "peer listening on {address}");
    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, app).await {
            tracing::error!(?error, "http server stopped");
        }
    });

    let initial = match config.start_mode {
        StartMode::Play => Some(LocalCommand::Play {
            name: config.player_name.clone(),
        }),
        StartMode::Spectate => Some(LocalCommand::Spectate),
        StartMode::Idle => None,
    };
    // The start command waits for the bootstrap channels so this peer greets the mesh with
    // requestState instead of a snapshot holding only itself.
    let bootstrap_urls = config.bootstrap_urls.clone();
    let discovery_hub = hub.clone();
    let discovery_directory = Arc::clone(&directory);
    let starter = events_tx.clone();
    tokio::spawn(async move {
        if !bootstrap_urls.is_empty() {
            join_mesh(bootstrap_urls, discovery_directory, discovery_hub).await;
        }
        let Some(command) = initial else { return };
        if starter.send(SessionEvent::Command(command)).is_err() {
            tracing::debug!("session loop gone, dropping start command");
        }
    });

    let rng = match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let session = Session::new(config.peer_id.clone(), rng);
    let options = DriverOptions {
        autopilot: config.autopilot,
        auto_restart: config.auto_restart,
        player_name: config.player_name.clone(),
    };
    driver::run_session(session, events_rx, events_tx, options).await
}

/// Dials every peer the bootstrap nodes list and returns once each dial has opened or failed.
/// Peers that join later dial us themselves.
async fn join_mesh(bootstrap_urls: Vec<String>, directory: Arc<PeerDirectory>, hub: TransportHub) {
    let client = reqwest::Client::new();
    let self_peer = directory.self_peer().clone();
    let mut targets = Vec::new();
    for base_url in bootstrap_urls {
        let listed = match fetch_peers(&client, &base_url).await {
            Ok(listed) => listed,
            Err(error) => {
                tracing::warn!(?error, base_url, "peer discovery failed");
                continue;
            }
        };
        targets.extend(listed.into_iter().filter(|peer| directory.remember(peer)));
    }

    let dials = targets
        .iter()
        .map(|peer| open_channel(peer, &self_peer.id, &self_peer.url, &hub));
    let opened = join_all(dials).await;
    for (peer, result) in targets.iter().zip(opened) {
        match result {
            Ok(dialed) => {
                tokio::spawn(pump(dialed, hub.clone()));
            }
            Err(error) => tracing::warn!(?error, peer_id = %peer.id, "peer channel failed"),
        }
    }
    tracing::info!(dialed = targets.len(), "joined mesh");
}

async fn health() -> impl IntoResponse {
    Json(OkResponse { ok: true })
}

async fn peers(State(state): State<PeerState>) -> impl IntoResponse {
    Json(state.directory.listing())
}

async fn peer_channel_handler(
    ws: WebSocketUpgrade,
    Path(peer_id): Path<String>,
    Query(query): Query<ChannelQuery>,
    State(state): State<PeerState>,
) -> impl IntoResponse {
    let peer_id = peer_id.trim().to_string();
    if !is_valid_peer_id(&peer_id) || peer_id == state.directory.self_peer().id {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                ok: false,
                error: "Invalid peer id".to_string(),
            }),
        )
            .into_response();
    }
    if let Some(url) = query.advertise.filter(|url| !url.trim().is_empty()) {
        state.directory.remember(&PeerInfo {
            id: peer_id.clone(),
            url,
        });
    }
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, peer_id, hub))
        .into_response()
}
