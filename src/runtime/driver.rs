use crate::game::autopilot::steer;
use crate::game::constants::{STATUS_DEATH_MS, TICK_MS};
use crate::game::session::{LocalCommand, LocalMode, Session, SessionEvent, UiEvent};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub autopilot: bool,
    pub auto_restart: bool,
    pub player_name: Option<String>,
}

/// Owns the session and serialises every input to it: socket events, local commands, frame
/// ticks and timer deadlines. Returns on ctrl-c after closing every channel.
pub async fn run_session(
    mut session: Session,
    mut events: UnboundedReceiver<SessionEvent>,
    commands: UnboundedSender<SessionEvent>,
    options: DriverOptions,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_millis(TICK_MS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let timer_delay = session
            .next_timer_deadline()
            .map(|deadline| deadline - now_millis());
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                session.handle_event(event, now_millis());
            }
            _ = ticker.tick() => {
                let frame = Instant::now();
                let dt_seconds = frame.duration_since(last_frame).as_secs_f64();
                last_frame = frame;
                if options.autopilot {
                    steer_autopilot(&mut session);
                }
                session.tick(dt_seconds, now_millis());
            }
            _ = wait_for(timer_delay) => {
                session.fire_due_timers(now_millis());
            }
            result = &mut shutdown => {
                if let Err(error) = result {
                    tracing::warn!(?error, "failed to listen for ctrl-c");
                }
                break;
            }
        }
        publish_ui_events(&mut session, &commands, &options);
    }

    session.shutdown();
    Ok(())
}

fn steer_autopilot(session: &mut Session) {
    if session.mode() != LocalMode::Playing {
        return;
    }
    let Some(player) = session.local_player() else { return };
    let Some(head) = player.head() else { return };
    let steering = steer(head, player.segments.len(), session.world().foods());
    let now = now_millis();
    session.handle_command(LocalCommand::Pointer(steering.pointer), now);
    session.handle_command(LocalCommand::Boost(steering.boost), now);
}

fn publish_ui_events(
    session: &mut Session,
    commands: &UnboundedSender<SessionEvent>,
    options: &DriverOptions,
) {
    let mut game_ended = false;
    for event in session.drain_ui_events() {
        match event {
            UiEvent::Status { text, duration_ms } => {
                if !text.is_empty() {
                    tracing::info!(duration_ms, "{text}");
                }
            }
            UiEvent::Length(length) => tracing::debug!(length, "length"),
            UiEvent::Kills(kills) => tracing::info!(kills, "kills"),
            UiEvent::Leaderboard(entries) => {
                let summary = entries
                    .iter()
                    .map(|entry| {
                        let marker = if entry.alive { "" } else { " (dead)" };
                        format!("{}: {}{}", entry.name, entry.score, marker)
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                tracing::debug!(%summary, "leaderboard");
            }
            UiEvent::GameEnded {
                winner_id,
                winner_name,
            } => {
                match winner_name {
                    Some(name) => tracing::info!(winner_id, "game over, {name} wins"),
                    None => tracing::info!(winner_id, "game over, draw"),
                }
                game_ended = true;
            }
        }
    }

    if !options.auto_restart {
        return;
    }
    let died = session.mode() == LocalMode::Dead;
    if died {
        // Leave the dead state now so the next pass does not schedule again.
        session.handle_command(LocalCommand::Restart, now_millis());
    }
    if died || game_ended {
        schedule_rejoin(commands.clone(), options.player_name.clone());
    }
}

fn schedule_rejoin(commands: UnboundedSender<SessionEvent>, name: Option<String>) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(STATUS_DEATH_MS as u64)).await;
        for command in [LocalCommand::Restart, LocalCommand::Play { name }] {
            if commands.send(SessionEvent::Command(command)).is_err() {
                tracing::debug!("session loop gone, dropping rejoin");
                return;
            }
        }
    });
}

async fn wait_for(delay_ms: Option<i64>) {
    match delay_ms {
        Some(delay_ms) => tokio::time::sleep(Duration::from_millis(delay_ms.max(0) as u64)).await,
        None => std::future::pending::<()>().await,
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
