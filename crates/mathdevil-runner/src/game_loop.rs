use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use mathdevil_core::game_trait::{GameEvent, GameResult, MathDevilGame};
use mathdevil_core::input::InputIntent;

/// Commands sent from the host to the engine tick loop.
#[derive(Debug)]
pub enum EngineCommand {
    Intent(InputIntent),
    /// Start a new session; resumes ticking after game over.
    Reset,
    Stop,
}

/// Broadcasts sent from the engine tick loop to the host.
#[derive(Debug, Clone)]
pub enum EngineBroadcast {
    /// Encoded snapshot frame, one per tick.
    /// Uses `Bytes` for zero-copy cloning across consumers.
    Snapshot(Bytes),
    GameOver(GameResult),
    /// Signal that the engine has been shut down and the loop has exited.
    Stopped,
}

/// Spawn an engine tick loop as a tokio task.
/// Returns the command sender, broadcast receiver and task handle.
pub fn spawn_engine_session(
    mut game: Box<dyn MathDevilGame>,
) -> (
    mpsc::UnboundedSender<EngineCommand>,
    mpsc::UnboundedReceiver<EngineBroadcast>,
    JoinHandle<()>,
) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (broadcast_tx, broadcast_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        run_engine_loop(&mut *game, cmd_rx, broadcast_tx).await;
    });

    (cmd_tx, broadcast_rx, handle)
}

fn broadcast_snapshot(
    game: &dyn MathDevilGame,
    broadcast_tx: &mpsc::UnboundedSender<EngineBroadcast>,
) {
    match game.serialize_snapshot() {
        Ok(data) => {
            let _ = broadcast_tx.send(EngineBroadcast::Snapshot(Bytes::from(data)));
        },
        Err(e) => tracing::error!(error = %e, "Failed to encode snapshot"),
    }
}

/// Fixed-rate interval that skips missed ticks. A non-finite or non-positive
/// rate falls back to 60 Hz.
pub(crate) fn tick_interval(tick_rate: f32) -> tokio::time::Interval {
    let rate = if tick_rate.is_finite() && tick_rate > 0.0 {
        tick_rate
    } else {
        60.0
    };
    let mut interval = tokio::time::interval(Duration::from_secs_f32(1.0 / rate));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    interval
}

/// The fixed-rate engine loop. Ticks stop at game over until a reset arrives;
/// `Stop` or a closed command channel shuts the engine down and exits.
async fn run_engine_loop(
    game: &mut dyn MathDevilGame,
    mut cmd_rx: mpsc::UnboundedReceiver<EngineCommand>,
    broadcast_tx: mpsc::UnboundedSender<EngineBroadcast>,
) {
    let mut interval = tick_interval(game.tick_rate());
    let mut halted = game.is_game_over();
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            _ = interval.tick(), if !halted => {
                tick += 1;
                let events = game.update();
                broadcast_snapshot(game, &broadcast_tx);

                for event in events {
                    if let GameEvent::GameOver(result) = event {
                        tracing::info!(
                            tick,
                            level = result.level,
                            score = result.score,
                            coins = result.coins,
                            "Session over, halting ticks"
                        );
                        let _ = broadcast_tx.send(EngineBroadcast::GameOver(result));
                        halted = true;
                    }
                }
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(EngineCommand::Intent(intent)) => {
                        game.apply_intent(intent);
                    },
                    Some(EngineCommand::Reset) => {
                        game.reset();
                        halted = false;
                        tick = 0;
                        interval = tick_interval(game.tick_rate());
                        broadcast_snapshot(game, &broadcast_tx);
                        tracing::info!("Session reset");
                    },
                    Some(EngineCommand::Stop) | None => {
                        break;
                    },
                }
            }
        }
    }

    game.shutdown();
    tracing::debug!(tick, "Engine loop stopped");
    let _ = broadcast_tx.send(EngineBroadcast::Stopped);
}
