pub mod critters;
pub mod enemies;
pub mod progression;
pub mod projectiles;
pub mod soldiers;
pub mod towers;

use crate::events::TdEvent;
use crate::waves;
use crate::world::TdState;

/// One simulation frame. Paused and finished games do not advance.
pub fn run_tick(state: &mut TdState, events: &mut Vec<TdEvent>) {
    if state.game_over || state.paused {
        return;
    }

    state.frame += 1;

    progression::advance(state, events);
    waves::release(state, events);
    enemies::update(state, events);
    if state.game_over {
        return;
    }
    soldiers::update(state);
    towers::update(state, events);
    projectiles::update(state);
    critters::update(state);
}
