use crate::actions::{self, TdAction};
use crate::config::TdConfig;
use crate::events::TdEvent;
use crate::mapgen::{self, ThemeSource};
use crate::systems;
use crate::terrain::Grid;
use crate::world::TdState;
use bastion_core::{ActionEnvelope, Game, TerminalOutcome, Tick};
use bastion_types::Snapshot;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub struct TdGame {
    state: TdState,
    seed: u64,
}

impl TdGame {
    /// Game on a caller-supplied grid. The castle is stamped over it.
    pub fn with_grid(config: TdConfig, seed: u64, grid: Grid) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(seed);
        Self::assemble(config, seed, rng, grid)
    }

    /// Game on a themed map from `source`, or the procedural map when the
    /// source has nothing usable.
    pub fn with_theme(
        config: TdConfig,
        seed: u64,
        source: &dyn ThemeSource,
        theme: &str,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = mapgen::themed_or_procedural(source, theme, &config, &mut rng);
        Self::assemble(config, seed, rng, grid)
    }

    fn assemble(config: TdConfig, seed: u64, rng: ChaCha8Rng, grid: Grid) -> Self {
        let critters = config.critters;
        let mut state = TdState::with_grid(config, rng, grid);
        systems::critters::populate(&mut state, critters);
        tracing::debug!(seed, "game assembled");
        Self { state, seed }
    }

    pub fn state(&self) -> &TdState {
        &self.state
    }

    /// Direct access for UIs that call [`crate::actions`] functions
    /// between ticks instead of submitting [`TdAction`]s.
    pub fn state_mut(&mut self) -> &mut TdState {
        &mut self.state
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Game for TdGame {
    type Config = TdConfig;
    type Action = TdAction;
    type Observation = Snapshot;
    type Event = TdEvent;

    fn new(config: Self::Config, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = mapgen::generate_procedural(&config, &mut rng);
        Self::assemble(config, seed, rng, grid)
    }

    fn step(
        &mut self,
        tick: Tick,
        actions: &[ActionEnvelope<Self::Action>],
        out_events: &mut Vec<Self::Event>,
    ) {
        self.state.tick = tick;

        for action in actions {
            if let Err(reason) = actions::apply(&mut self.state, &action.payload, out_events) {
                tracing::debug!(action_id = action.action_id, %reason, "action rejected");
                out_events.push(TdEvent::ActionRejected { reason });
            }
        }

        systems::run_tick(&mut self.state, out_events);
    }

    fn observe(&self, tick: Tick) -> Self::Observation {
        crate::observe::build_snapshot(&self.state, tick)
    }

    fn is_terminal(&self) -> Option<TerminalOutcome> {
        self.state.game_over.then_some(TerminalOutcome::Lose)
    }
}
