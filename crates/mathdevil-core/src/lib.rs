pub mod game_trait;
pub mod input;
pub mod protocol;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::game_trait::{GameEvent, MathDevilGame};
    use crate::input::InputIntent;

    /// Run N game ticks with no new input, returning all accumulated events.
    pub fn run_game_ticks(game: &mut dyn MathDevilGame, n: usize) -> Vec<GameEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update());
        }
        all_events
    }

    fn snapshot_bytes(game: &dyn MathDevilGame) -> Vec<u8> {
        game.serialize_snapshot()
            .expect("snapshot serialization must succeed")
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Game crates call these from their own #[cfg(test)] modules with a
    // freshly constructed game instance.

    /// A fresh game must report level 1, zero score and an active session.
    pub fn contract_fresh_session(game: &dyn MathDevilGame) {
        let result = game.result();
        assert_eq!(result.level, 1, "Fresh session must start at level 1");
        assert_eq!(result.score, 0, "Fresh session must start with zero score");
        assert_eq!(result.coins, 0, "Fresh session must start with zero coins");
        assert!(!game.is_game_over(), "Fresh session must be active");
    }

    /// update() must change the snapshot (tick counter, gravity, animation).
    pub fn contract_update_changes_snapshot(game: &mut dyn MathDevilGame) {
        let before = snapshot_bytes(game);
        game.update();
        let after = snapshot_bytes(game);
        assert_ne!(before, after, "update() must advance the snapshot");
    }

    /// A movement intent followed by update() must move the player
    /// differently than no intent at all.
    pub fn contract_intent_changes_state(
        game: &mut dyn MathDevilGame,
        idle_twin: &mut dyn MathDevilGame,
    ) {
        game.apply_intent(InputIntent::MoveRight);
        game.update();
        idle_twin.update();
        assert_ne!(
            snapshot_bytes(game),
            snapshot_bytes(idle_twin),
            "An intent must influence the next tick"
        );
    }

    /// reset() must return the game to a fresh active session.
    pub fn contract_reset_restores_fresh_session(game: &mut dyn MathDevilGame) {
        run_game_ticks(game, 30);
        game.reset();
        contract_fresh_session(game);
    }

    /// shutdown() may be called more than once and must leave the game readable.
    pub fn contract_shutdown_is_idempotent(game: &mut dyn MathDevilGame) {
        game.shutdown();
        game.shutdown();
        assert!(
            game.serialize_snapshot().is_ok(),
            "Snapshot must remain readable after shutdown"
        );
    }

    /// Once game over, further updates must not change totals or emit events.
    pub fn contract_game_over_is_terminal(game: &mut dyn MathDevilGame) {
        assert!(game.is_game_over(), "Precondition: game must be over");
        let before = game.result();
        let events = run_game_ticks(game, 10);
        assert!(events.is_empty(), "No events may follow game over");
        assert_eq!(before, game.result(), "Totals are frozen after game over");
        assert!(game.is_game_over(), "Game over is terminal");
    }
}
