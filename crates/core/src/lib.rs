pub mod envelope;
pub mod game;
pub mod time;

pub use envelope::{ActionEnvelope, ActionId};
pub use game::{Game, TerminalOutcome, Tick};
pub use time::Micros;
