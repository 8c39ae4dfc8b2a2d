//! Bastion: fixed-tick tower-defense simulation.
//!
//! [`TdGame`] implements [`bastion_core::Game`] and is driven one tick at a
//! time by `bastion_host::Session`. Everything else is plain functions over
//! the [`TdState`] aggregate.

pub mod actions;
pub mod combat;
pub mod config;
pub mod events;
pub mod game;
pub mod mapgen;
pub mod observe;
pub mod pathing;
pub mod systems;
pub mod terrain;
pub mod waves;
pub mod world;

pub use actions::{Ability, Rejection, TdAction, UpgradeChoice};
pub use config::{ConfigError, EnemyKind, TdConfig, TowerKind};
pub use events::TdEvent;
pub use game::TdGame;
pub use mapgen::{MapError, ThemeSource};
pub use terrain::{Grid, Terrain};
pub use world::{Specialization, Strategy, TdState, TowerId};
