use crate::game::Tick;

/// Submission order within a session; ties on a tick break by this.
pub type ActionId = u64;

/// An action addressed to a specific tick.
///
/// Envelopes scheduled for the same tick are applied in `action_id` order
/// before that tick's simulation pass runs.
#[derive(Clone, Debug)]
pub struct ActionEnvelope<A> {
    pub action_id: ActionId,
    pub intended_tick: Tick,
    pub payload: A,
}

impl<A> ActionEnvelope<A> {
    pub fn new(action_id: ActionId, intended_tick: Tick, payload: A) -> Self {
        Self {
            action_id,
            intended_tick,
            payload,
        }
    }
}
