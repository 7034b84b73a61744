use tokio::sync::mpsc;

use mathdevil_core::input::InputIntent;

use crate::game_loop::{EngineCommand, tick_interval};

/// Deterministic input script for headless runs: walk back and forth across
/// the canvas and hop at a fixed cadence.
#[derive(Debug, Clone)]
pub struct ScriptedPilot {
    /// Ticks spent walking in one direction before turning round.
    pub stride_ticks: u64,
    /// A jump is requested every `jump_every` ticks.
    pub jump_every: u64,
}

impl Default for ScriptedPilot {
    fn default() -> Self {
        Self {
            stride_ticks: 45,
            jump_every: 28,
        }
    }
}

impl ScriptedPilot {
    /// Intents to send before tick `tick` (1-based).
    pub fn intents_for(&self, tick: u64) -> Vec<InputIntent> {
        let mut intents = Vec::new();
        let stride = self.stride_ticks.max(1);
        if tick % stride == 1 || stride == 1 {
            if (tick / stride) % 2 == 0 {
                intents.push(InputIntent::MoveRight);
            } else {
                intents.push(InputIntent::MoveLeft);
            }
        }
        if self.jump_every > 0 && tick % self.jump_every == 0 {
            intents.push(InputIntent::Jump);
        }
        intents
    }
}

/// Feed the pilot's script into a running engine session at `tick_rate`.
/// Returns once the engine stops accepting commands.
pub async fn drive(
    pilot: ScriptedPilot,
    cmd_tx: mpsc::UnboundedSender<EngineCommand>,
    tick_rate: f32,
) {
    let mut interval = tick_interval(tick_rate);

    let mut tick: u64 = 0;
    loop {
        interval.tick().await;
        tick += 1;
        for intent in pilot.intents_for(tick) {
            if cmd_tx.send(EngineCommand::Intent(intent)).is_err() {
                tracing::debug!(tick, "Engine gone, pilot exiting");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn pilot_alternates_direction_each_stride() {
        let pilot = ScriptedPilot {
            stride_ticks: 10,
            jump_every: 0,
        };
        assert_eq!(pilot.intents_for(1), vec![InputIntent::MoveRight]);
        assert!(pilot.intents_for(2).is_empty());
        assert_eq!(pilot.intents_for(11), vec![InputIntent::MoveLeft]);
        assert_eq!(pilot.intents_for(21), vec![InputIntent::MoveRight]);
    }

    #[test]
    fn pilot_jumps_on_cadence() {
        let pilot = ScriptedPilot {
            stride_ticks: 100,
            jump_every: 5,
        };
        let jumps = (1..=20)
            .filter(|&t| pilot.intents_for(t).contains(&InputIntent::Jump))
            .count();
        assert_eq!(jumps, 4);
    }

    #[tokio::test]
    async fn drive_exits_when_engine_is_gone() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        drop(cmd_rx);
        tokio::time::timeout(
            Duration::from_secs(2),
            drive(ScriptedPilot::default(), cmd_tx, 200.0),
        )
        .await
        .expect("pilot should stop once the receiver is dropped");
    }

    #[tokio::test]
    async fn drive_survives_non_finite_rate() {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(drive(ScriptedPilot::default(), cmd_tx, f32::NAN));
        let first = tokio::time::timeout(Duration::from_secs(2), cmd_rx.recv())
            .await
            .expect("pilot should tick at the fallback rate");
        assert!(matches!(
            first,
            Some(EngineCommand::Intent(InputIntent::MoveRight))
        ));
        task.abort();
    }

    #[tokio::test]
    async fn drive_sends_intents() {
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(drive(ScriptedPilot::default(), cmd_tx, 200.0));
        let first = cmd_rx.recv().await;
        assert!(matches!(
            first,
            Some(EngineCommand::Intent(InputIntent::MoveRight))
        ));
        task.abort();
    }
}
