use crate::envelope::ActionEnvelope;

/// Fixed-rate frame counter. Tick 0 is the state before the first step.
pub type Tick = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalOutcome {
    Win,
    Lose,
}

/// A deterministic fixed-tick simulation.
///
/// `step` receives the actions scheduled for `tick` (already sorted) and must
/// apply them before advancing the world, so that actions never interleave
/// with an in-progress update.
pub trait Game: Sized {
    type Config: Clone;
    type Action: Clone;
    type Observation: Clone;
    type Event: Clone;

    fn new(config: Self::Config, seed: u64) -> Self;

    fn step(
        &mut self,
        tick: Tick,
        actions: &[ActionEnvelope<Self::Action>],
        out_events: &mut Vec<Self::Event>,
    );

    fn observe(&self, tick: Tick) -> Self::Observation;

    fn is_terminal(&self) -> Option<TerminalOutcome>;
}
