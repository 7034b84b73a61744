use tracing_subscriber::EnvFilter;

use mathdevil_core::protocol::decode_snapshot;
use mathdevil_platformer::MathDevil;
use mathdevil_platformer::config::EngineConfig;
use mathdevil_platformer::snapshot::Snapshot;
use mathdevil_runner::game_loop::{EngineBroadcast, EngineCommand, spawn_engine_session};
use mathdevil_runner::pilot::{self, ScriptedPilot};

/// Log a progress line every this many snapshot frames.
const PROGRESS_EVERY: u64 = 120;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = EngineConfig::load();
    let tick_rate = config.tick_rate_hz;
    let game = MathDevil::from_clock(config).with_on_complete(Box::new(|result| {
        tracing::info!(
            session = %result.session_id,
            level = result.level,
            score = result.score,
            coins = result.coins,
            "Session complete"
        );
    }));
    tracing::info!(tick_rate, "Math Devil runner starting");

    let (cmd_tx, mut broadcast_rx, handle) = spawn_engine_session(Box::new(game));
    let pilot_task = tokio::spawn(pilot::drive(
        ScriptedPilot::default(),
        cmd_tx.clone(),
        tick_rate,
    ));

    let mut frames: u64 = 0;
    loop {
        tokio::select! {
            msg = broadcast_rx.recv() => {
                match msg {
                    Some(EngineBroadcast::Snapshot(data)) => {
                        frames += 1;
                        if frames % PROGRESS_EVERY == 0 {
                            match decode_snapshot::<Snapshot>(&data) {
                                Ok(snap) => tracing::info!(
                                    tick = snap.tick,
                                    level = snap.level,
                                    score = snap.score,
                                    lives = snap.lives,
                                    question = %snap.question_text,
                                    "Progress"
                                ),
                                Err(e) => tracing::warn!(error = %e, "Undecodable snapshot"),
                            }
                        }
                    },
                    Some(EngineBroadcast::GameOver(result)) => {
                        tracing::info!(level = result.level, score = result.score, "Game over, stopping");
                        let _ = cmd_tx.send(EngineCommand::Stop);
                    },
                    Some(EngineBroadcast::Stopped) | None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping engine");
                let _ = cmd_tx.send(EngineCommand::Stop);
            }
        }
    }

    pilot_task.abort();
    let _ = handle.await;
    tracing::info!(frames, "Math Devil runner exited");
}
