use bastion_core::{ActionEnvelope, Game, TerminalOutcome, Tick};
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct RunResult<G: Game> {
    pub outcome: Option<TerminalOutcome>,
    pub final_tick: Tick,
    pub events: Vec<G::Event>,
}

/// Owns the single live game and feeds it one tick at a time.
///
/// Actions submitted from outside (UI, scripts) are parked until the tick
/// they were scheduled for and handed to [`Game::step`] in `action_id`
/// order, so they never interleave with an update.
pub struct Session<G: Game> {
    game: G,
    config: G::Config,
    seed: u64,
    current_tick: Tick,
    tick_hz: u32,
    next_action_id: u64,
    pending_actions: BTreeMap<Tick, Vec<ActionEnvelope<G::Action>>>,
}

impl<G: Game> Session<G> {
    pub fn new(config: G::Config, seed: u64, tick_hz: u32) -> Self {
        Self {
            game: G::new(config.clone(), seed),
            config,
            seed,
            current_tick: 0,
            tick_hz,
            next_action_id: 0,
            pending_actions: BTreeMap::new(),
        }
    }

    /// Wraps an already constructed game (e.g. one built from an imported map).
    pub fn from_game(game: G, config: G::Config, seed: u64, tick_hz: u32) -> Self {
        Self {
            game,
            config,
            seed,
            current_tick: 0,
            tick_hz,
            next_action_id: 0,
            pending_actions: BTreeMap::new(),
        }
    }

    /// Discards the live game and every queued action, then rebuilds the game
    /// from the config and seed it was created with.
    pub fn reset(&mut self) {
        tracing::info!(seed = self.seed, tick = self.current_tick, "session reset");
        self.game = G::new(self.config.clone(), self.seed);
        self.current_tick = 0;
        self.next_action_id = 0;
        self.pending_actions.clear();
    }

    /// Queue `payload` for the next tick. Returns the scheduled tick.
    pub fn submit(&mut self, payload: G::Action) -> Tick {
        let tick = self.current_tick + 1;
        self.submit_at(tick, payload)
    }

    /// Queue `payload` for `intended_tick`. Ticks in the past or present are
    /// moved to the next tick.
    pub fn submit_at(&mut self, intended_tick: Tick, payload: G::Action) -> Tick {
        let scheduled_tick = if intended_tick <= self.current_tick {
            self.current_tick + 1
        } else {
            intended_tick
        };

        let action_id = self.next_action_id;
        self.next_action_id += 1;

        self.pending_actions
            .entry(scheduled_tick)
            .or_default()
            .push(ActionEnvelope::new(action_id, scheduled_tick, payload));

        scheduled_tick
    }

    pub fn run_for_ticks(&mut self, max_ticks: Tick) -> RunResult<G> {
        let mut all_events = Vec::new();

        for _ in 0..max_ticks {
            match self.step_one_tick() {
                Some(events) => all_events.extend(events),
                None => break,
            }
        }

        RunResult {
            outcome: self.game.is_terminal(),
            final_tick: self.current_tick,
            events: all_events,
        }
    }

    /// Advance by one tick. Returns `None` once the game is terminal.
    pub fn step_one_tick(&mut self) -> Option<Vec<G::Event>> {
        if self.game.is_terminal().is_some() {
            return None;
        }

        self.current_tick += 1;

        let mut actions = self
            .pending_actions
            .remove(&self.current_tick)
            .unwrap_or_default();
        actions.sort_by_key(|a| a.action_id);

        let mut tick_events = Vec::new();
        self.game.step(self.current_tick, &actions, &mut tick_events);

        if let Some(outcome) = self.game.is_terminal() {
            tracing::info!(tick = self.current_tick, ?outcome, "session reached terminal state");
        }

        Some(tick_events)
    }

    pub fn observe(&self) -> G::Observation {
        self.game.observe(self.current_tick)
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn tick_hz(&self) -> u32 {
        self.tick_hz
    }

    pub fn is_terminal(&self) -> Option<TerminalOutcome> {
        self.game.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts ticks and applied increments; loses once the counter passes a cap.
    #[derive(Clone)]
    struct Counter {
        value: u64,
        cap: u64,
    }

    impl Game for Counter {
        type Config = u64;
        type Action = u64;
        type Observation = u64;
        type Event = (Tick, u64);

        fn new(cap: u64, _seed: u64) -> Self {
            Self { value: 0, cap }
        }

        fn step(&mut self, tick: Tick, actions: &[ActionEnvelope<u64>], out: &mut Vec<(Tick, u64)>) {
            for action in actions {
                self.value += action.payload;
                out.push((tick, action.payload));
            }
        }

        fn observe(&self, _tick: Tick) -> u64 {
            self.value
        }

        fn is_terminal(&self) -> Option<TerminalOutcome> {
            (self.value > self.cap).then_some(TerminalOutcome::Lose)
        }
    }

    #[test]
    fn actions_apply_on_their_scheduled_tick() {
        let mut session = Session::<Counter>::new(100, 1, 60);
        assert_eq!(session.submit_at(3, 5), 3);
        assert_eq!(session.submit(1), 1);

        let result = session.run_for_ticks(4);
        assert_eq!(result.events, vec![(1, 1), (3, 5)]);
        assert_eq!(session.observe(), 6);
        assert_eq!(result.final_tick, 4);
    }

    #[test]
    fn past_ticks_are_rescheduled_to_next_tick() {
        let mut session = Session::<Counter>::new(100, 1, 60);
        session.run_for_ticks(5);
        assert_eq!(session.submit_at(2, 1), 6);
    }

    #[test]
    fn terminal_game_stops_stepping_until_reset() {
        let mut session = Session::<Counter>::new(3, 1, 60);
        session.submit(10);
        let result = session.run_for_ticks(10);
        assert_eq!(result.outcome, Some(TerminalOutcome::Lose));
        assert_eq!(result.final_tick, 1);
        assert!(session.step_one_tick().is_none());

        session.reset();
        assert_eq!(session.current_tick(), 0);
        assert_eq!(session.observe(), 0);
        assert!(session.is_terminal().is_none());
    }
}
