use crate::actions::{Ability, Rejection};
use crate::config::{EnemyKind, TowerKind};
use crate::world::{EnemyId, Season, TowerId};

#[derive(Clone, Debug, PartialEq)]
pub enum TdEvent {
    TowerBuilt {
        id: TowerId,
        x: u16,
        y: u16,
        kind: TowerKind,
    },
    TowerSold {
        id: TowerId,
        x: u16,
        y: u16,
        refund: u32,
    },
    TowerUpgraded {
        id: TowerId,
        level: u8,
    },
    AbilityUsed {
        ability: Ability,
    },
    CitadelUpgraded {
        level: u32,
    },
    WaveStarted {
        wave: u32,
        enemies: usize,
    },
    WaveCompleted {
        wave: u32,
        bonus: u32,
    },
    EnemySpawned {
        id: EnemyId,
        kind: EnemyKind,
    },
    EnemyKilled {
        id: EnemyId,
        kind: EnemyKind,
        reward: u32,
        credited: Option<TowerId>,
    },
    CastleBreached {
        id: EnemyId,
        kind: EnemyKind,
        lives_lost: i32,
    },
    /// Tar field pulse, instant and radial.
    TarPulse {
        tower: TowerId,
        hit: usize,
    },
    /// Lightning strike, instant and single-target.
    LightningBolt {
        tower: TowerId,
        target: EnemyId,
    },
    SeasonChanged {
        season: Season,
    },
    GameOver {
        wave: u32,
    },
    ActionRejected {
        reason: Rejection,
    },
}
