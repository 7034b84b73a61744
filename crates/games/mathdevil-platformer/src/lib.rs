pub mod collision;
pub mod config;
pub mod effects;
pub mod level_gen;
pub mod physics;
pub mod question;
pub mod scoring;
pub mod session;
pub mod snapshot;

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use mathdevil_core::game_trait::{GameEvent, GameResult, HazardCause, MathDevilGame};
use mathdevil_core::input::{InputIntent, IntentLatch};
use mathdevil_core::protocol::{self, ProtocolError};

use collision::Landing;
use config::EngineConfig;
use effects::{EffectOutcome, EffectQueue};
use level_gen::{LevelLayout, build_level};
use physics::Player;
use question::{Question, generate_question};
use session::GameSession;
use snapshot::{Snapshot, TransientMessage};

/// Invoked once per session with the final totals.
pub type CompletionCallback = Box<dyn FnMut(GameResult) + Send>;

/// The Math Devil engine: one player, one level at a time.
pub struct MathDevil {
    config: EngineConfig,
    rng: StdRng,
    session: GameSession,
    question: Question,
    layout: LevelLayout,
    player: Player,
    /// Platform the player stood on at the end of the last tick.
    standing_on: Option<usize>,
    intents: IntentLatch,
    effects: EffectQueue,
    message: Option<TransientMessage>,
    ticks: u64,
    on_complete: Option<CompletionCallback>,
}

impl MathDevil {
    /// Build an engine with a deterministic RNG. Out-of-range config values
    /// are replaced the same way the TOML loader does.
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        let config = config.sanitized();
        let mut rng = StdRng::seed_from_u64(seed);
        let session = GameSession::new(random_session_id(&mut rng), config.starting_lives);
        let question = generate_question(session.level, &mut rng);
        let layout = build_level(session.level, &question, &config, &mut rng);
        let player = Player::new(layout.spawn.0, layout.spawn.1);
        Self {
            config,
            rng,
            session,
            question,
            layout,
            player,
            standing_on: None,
            intents: IntentLatch::new(),
            effects: EffectQueue::new(),
            message: None,
            ticks: 0,
            on_complete: None,
        }
    }

    /// Build an engine seeded from the wall clock.
    pub fn from_clock(config: EngineConfig) -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self::new(config, seed)
    }

    /// Register the completion callback. It survives resets.
    pub fn set_on_complete(&mut self, callback: CompletionCallback) {
        self.on_complete = Some(callback);
    }

    pub fn with_on_complete(mut self, callback: CompletionCallback) -> Self {
        self.set_on_complete(callback);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn message(&self) -> Option<&TransientMessage> {
        self.message.as_ref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Effect generation, bumped on every level transition, reset and game over.
    pub fn generation(&self) -> u64 {
        self.effects.generation()
    }

    /// Advance the simulation by one fixed step.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        self.ticks += 1;
        if self.message.as_ref().is_some_and(|m| m.is_expired(self.ticks)) {
            self.message = None;
        }
        if !self.session.is_active() {
            return Vec::new();
        }

        let mut events = Vec::new();
        let intent = self.intents.take();
        physics::apply_intent(&mut self.player, intent, &self.config);
        let tentative = physics::integrate(&self.player, &self.config);
        let res = collision::resolve(
            self.player.y,
            &tentative,
            &self.layout.platforms,
            &self.layout.coins,
            &self.config,
        );
        self.player.x = tentative.x;
        self.player.y = res.y;
        self.player.vy = tentative.vy;

        // Support
        let mut correct_landing = false;
        if let Some(Landing::Stable { platform, correct }) = res.landing {
            self.player.vy = 0.0;
            self.player.is_jumping = false;
            if self.standing_on != Some(platform) {
                events.push(GameEvent::Landed { platform });
            }
            self.standing_on = Some(platform);
            correct_landing = correct;
            if let Some(i) = res.trigger
                && let Some(key) =
                    self.effects
                        .trigger(&mut self.layout.platforms, i, self.ticks)
            {
                tracing::debug!(
                    platform = i,
                    id = key.id,
                    generation = key.generation,
                    "Platform effect scheduled"
                );
            }
        } else {
            self.standing_on = None;
        }

        if let Some(i) = res.touched_fake {
            events.push(GameEvent::FakePlatform { platform: i });
            self.show("FAKE PLATFORM! Gotcha!".to_string());
        }

        for &i in &res.pickups {
            if let Some(coin) = self.layout.coins.get_mut(i)
                && !coin.collected
            {
                coin.collected = true;
                self.session.collect_coin();
                events.push(GameEvent::CoinCollected { coin: i });
            }
        }

        if correct_landing && let Some(points) = self.session.award_correct() {
            tracing::debug!(
                level = self.session.level,
                points,
                score = self.session.score,
                "Correct answer"
            );
            events.push(GameEvent::CorrectAnswer { points });
            self.show(format!("Correct! +{points} points!"));
        }

        let hazard = match res.landing {
            Some(Landing::Spike { .. }) => Some(HazardCause::Spike),
            Some(Landing::WrongAnswer { .. }) => Some(HazardCause::WrongAnswer),
            _ if res.fell_out => Some(HazardCause::Fall),
            _ => None,
        };

        if let Some(cause) = hazard {
            self.hit(cause, &mut events);
            if !self.session.is_active() {
                return events;
            }
        } else if res.exit_reached {
            self.clear_level(&mut events);
        }

        for outcome in self.effects.advance(self.ticks, &mut self.layout.platforms) {
            match outcome {
                EffectOutcome::Arrived { platform } => {
                    tracing::debug!(platform, "Moving platform arrived");
                },
                EffectOutcome::Vanished { platform } => {
                    tracing::debug!(platform, "Platform vanished");
                    events.push(GameEvent::PlatformVanished { platform });
                },
            }
        }
        for coin in &mut self.layout.coins {
            coin.advance_phase();
        }

        events
    }

    fn hit(&mut self, cause: HazardCause, events: &mut Vec<GameEvent>) {
        let lives_left = self.session.lose_life();
        tracing::debug!(
            ?cause,
            lives = lives_left,
            level = self.session.level,
            "Life lost"
        );
        events.push(GameEvent::LifeLost { cause, lives_left });
        let text = match cause {
            HazardCause::Spike => "OUCH! That's a spike!",
            HazardCause::WrongAnswer => "Wrong answer! -1 life",
            HazardCause::Fall => "You fell!",
        };
        self.show(text.to_string());

        if lives_left == 0 {
            self.game_over(events);
        } else {
            self.player.respawn(self.layout.spawn);
            self.standing_on = None;
        }
    }

    fn game_over(&mut self, events: &mut Vec<GameEvent>) {
        let cancelled = self.effects.cancel_all();
        let result = self.session.result();
        tracing::info!(
            level = result.level,
            score = result.score,
            coins = result.coins,
            cancelled,
            "Game over"
        );
        events.push(GameEvent::GameOver(result));
        if let Some(final_result) = self.session.take_completion()
            && let Some(callback) = self.on_complete.as_mut()
        {
            callback(final_result);
        }
    }

    fn clear_level(&mut self, events: &mut Vec<GameEvent>) {
        let cleared = self.session.level;
        let bonus = self.session.advance_level();
        self.effects.cancel_all();
        self.load_level();
        tracing::info!(
            level = self.session.level,
            score = self.session.score,
            generation = self.effects.generation(),
            "Level cleared"
        );
        events.push(GameEvent::LevelCleared {
            level: cleared,
            bonus,
        });
        self.show(format!("Level {}!", self.session.level));
    }

    /// Generate the question and layout for the session's current level and
    /// put the player on its spawn point.
    fn load_level(&mut self) {
        self.question = generate_question(self.session.level, &mut self.rng);
        self.layout = build_level(
            self.session.level,
            &self.question,
            &self.config,
            &mut self.rng,
        );
        self.player = Player::new(self.layout.spawn.0, self.layout.spawn.1);
        self.standing_on = None;
    }

    fn show(&mut self, text: String) {
        self.message = Some(TransientMessage {
            text,
            expires_at_tick: self.ticks + self.config.message_ticks,
        });
    }

    /// Start a new session at level 1. The completion callback is kept.
    pub fn reset(&mut self) {
        self.effects.cancel_all();
        let session_id = random_session_id(&mut self.rng);
        self.session = GameSession::new(session_id, self.config.starting_lives);
        self.load_level();
        self.intents.clear();
        self.message = None;
        tracing::info!(
            %session_id,
            generation = self.effects.generation(),
            "Session reset"
        );
    }

    /// Cancel every pending effect. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        let cancelled = self.effects.cancel_all();
        tracing::debug!(cancelled, "Engine shut down");
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.ticks,
            session_id: self.session.session_id,
            level: self.session.level,
            score: self.session.score,
            coins: self.session.coins,
            lives: self.session.lives,
            status: self.session.status,
            question_text: self.question.display_text.clone(),
            player: self.player.clone(),
            platforms: self.layout.platforms.clone(),
            level_coins: self.layout.coins.clone(),
            message: self.message.clone(),
        }
    }
}

fn random_session_id(rng: &mut StdRng) -> Uuid {
    uuid::Builder::from_random_bytes(rng.random()).into_uuid()
}

impl MathDevilGame for MathDevil {
    fn tick_rate(&self) -> f32 {
        self.config.tick_rate_hz
    }

    fn apply_intent(&mut self, intent: InputIntent) {
        self.intents.push(intent);
    }

    fn update(&mut self) -> Vec<GameEvent> {
        self.tick()
    }

    fn serialize_snapshot(&self) -> Result<Vec<u8>, ProtocolError> {
        protocol::encode_snapshot(&self.snapshot())
    }

    fn reset(&mut self) {
        MathDevil::reset(self);
    }

    fn shutdown(&mut self) {
        MathDevil::shutdown(self);
    }

    fn is_game_over(&self) -> bool {
        !self.session.is_active()
    }

    fn result(&self) -> GameResult {
        self.session.result()
    }
}


#[cfg(test)]
mod proptests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::session::SessionStatus;
    use proptest::prelude::*;

    fn intent_from(code: u8) -> Option<InputIntent> {
        match code {
            0 => Some(InputIntent::MoveLeft),
            1 => Some(InputIntent::MoveRight),
            2 => Some(InputIntent::StopHorizontal),
            3 => Some(InputIntent::Jump),
            _ => None,
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn session_totals_are_monotonic(
            seed in any::<u64>(),
            script in proptest::collection::vec(0u8..8, 1..400),
        ) {
            let calls = Arc::new(Mutex::new(0usize));
            let sink = Arc::clone(&calls);
            let mut game = MathDevil::new(EngineConfig::default(), seed)
                .with_on_complete(Box::new(move |_| *sink.lock().unwrap() += 1));

            let mut prev = game.session.clone();
            for code in script {
                if let Some(intent) = intent_from(code) {
                    game.apply_intent(intent);
                }
                game.tick();
                let now = &game.session;
                prop_assert!(now.score >= prev.score);
                prop_assert!(now.coins >= prev.coins);
                prop_assert!(now.level >= prev.level);
                prop_assert!(now.lives <= prev.lives && prev.lives - now.lives <= 1);
                if prev.status == SessionStatus::GameOver {
                    prop_assert_eq!(now.status, SessionStatus::GameOver);
                }
                prev = now.clone();
            }
            prop_assert!(*calls.lock().unwrap() <= 1);
        }

        #[test]
        fn coins_flip_at_most_once(
            seed in any::<u64>(),
            script in proptest::collection::vec(0u8..5, 1..300),
        ) {
            let mut game = MathDevil::new(EngineConfig::default(), seed);
            let mut collected_events = Vec::new();
            for code in script {
                if let Some(intent) = intent_from(code) {
                    game.apply_intent(intent);
                }
                let level = game.session.level;
                for e in game.tick() {
                    if let GameEvent::CoinCollected { coin } = e {
                        collected_events.push((level, coin));
                    }
                }
            }
            let mut deduped = collected_events.clone();
            deduped.sort_unstable();
            deduped.dedup();
            prop_assert_eq!(deduped.len(), collected_events.len());
        }
    }
}
