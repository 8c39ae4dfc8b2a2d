use crate::combat::deal_damage;
use crate::config::TowerKind;
use crate::events::TdEvent;
use crate::pathing::can_place;
use crate::terrain::Terrain;
use crate::waves;
use crate::world::{EnemyId, Soldier, Specialization, Strategy, TdState, Tower, TowerId};
use glam::Vec2;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ability {
    /// Volley that strikes every enemy on the field.
    Arrow,
    /// Collects a lump of gold.
    Tax,
    /// Slows the whole field to a crawl until it recharges.
    Ice,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeChoice {
    Veteran,
    Specialize(Specialization),
    Master,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TdAction {
    Build { x: u16, y: u16, kind: TowerKind },
    Sell { tower: TowerId },
    Upgrade { tower: TowerId, choice: UpgradeChoice },
    SetStrategy { tower: TowerId, strategy: Strategy },
    UseAbility(Ability),
    UpgradeCitadel,
    StartWave,
    SetPaused(bool),
    SetSpeed(u8),
}

/// Why an action was refused. A refused action leaves the state untouched.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("the game is over")]
    GameOver,
    #[error("cell ({x}, {y}) is off the map")]
    OutOfBounds { x: u16, y: u16 },
    #[error("cell ({x}, {y}) cannot be built on")]
    NotBuildable { x: u16, y: u16 },
    #[error("building at ({x}, {y}) would cut the road to the castle")]
    WouldBlockPath { x: u16, y: u16 },
    #[error("need {cost} gold, have {have}")]
    InsufficientGold { cost: u32, have: u32 },
    #[error("no such tower")]
    UnknownTower,
    #[error("upgrade not available at level {level}")]
    WrongTier { level: u8 },
    #[error("this tower has no specializations")]
    NoSpecialization,
    #[error("ability ready in {remaining} frames")]
    OnCooldown { remaining: u32 },
    #[error("a wave is already in progress")]
    WaveInProgress,
    #[error("unsupported speed {0}")]
    InvalidSpeed(u8),
}

/// Speeds the simulation accepts.
pub const SPEEDS: [u8; 3] = [1, 2, 5];

/// Soldiers stand this far apart around their barracks.
const SQUAD_SPACING: f32 = 10.0;
const SQUAD_HP: f32 = 60.0;
const SQUAD_DAMAGE: f32 = 5.0;

pub fn apply(
    state: &mut TdState,
    action: &TdAction,
    events: &mut Vec<TdEvent>,
) -> Result<(), Rejection> {
    match *action {
        TdAction::Build { x, y, kind } => build(state, x, y, kind, events).map(drop),
        TdAction::Sell { tower } => sell(state, tower, events).map(drop),
        TdAction::Upgrade { tower, choice } => upgrade(state, tower, choice, events),
        TdAction::SetStrategy { tower, strategy } => set_strategy(state, tower, strategy),
        TdAction::UseAbility(ability) => use_ability(state, ability, events),
        TdAction::UpgradeCitadel => upgrade_citadel(state, events).map(drop),
        TdAction::StartWave => start_wave(state, events),
        TdAction::SetPaused(paused) => set_paused(state, paused),
        TdAction::SetSpeed(speed) => set_speed(state, speed),
    }
}

fn ensure_running(state: &TdState) -> Result<(), Rejection> {
    if state.game_over {
        return Err(Rejection::GameOver);
    }
    Ok(())
}

fn charge(state: &mut TdState, cost: u32) -> Result<(), Rejection> {
    if state.gold < cost {
        return Err(Rejection::InsufficientGold {
            cost,
            have: state.gold,
        });
    }
    state.gold -= cost;
    Ok(())
}

pub fn build(
    state: &mut TdState,
    x: u16,
    y: u16,
    kind: TowerKind,
    events: &mut Vec<TdEvent>,
) -> Result<TowerId, Rejection> {
    ensure_running(state)?;
    if !state.grid.in_bounds(x, y) {
        return Err(Rejection::OutOfBounds { x, y });
    }
    let terrain = state.grid.terrain(x, y);
    if !terrain.is_buildable() {
        return Err(Rejection::NotBuildable { x, y });
    }
    let cost = kind.spec().cost;
    if state.gold < cost {
        return Err(Rejection::InsufficientGold {
            cost,
            have: state.gold,
        });
    }
    if !can_place(&state.grid, &state.config.goal_cells(), x, y) {
        return Err(Rejection::WouldBlockPath { x, y });
    }

    state.gold -= cost;
    state.grid.set_terrain(x, y, Terrain::Built);
    state.recompute_field();

    let pos = state.cell_center((x, y));
    let empowered = terrain == Terrain::Power;
    let id = state.world.towers.insert(Tower::new(kind, (x, y), pos, empowered));

    if kind == TowerKind::Barracks {
        muster(state, id, pos);
    }

    tracing::debug!(x, y, kind = kind.as_str(), gold = state.gold, "tower built");
    events.push(TdEvent::TowerBuilt { id, x, y, kind });
    Ok(id)
}

fn muster(state: &mut TdState, owner: TowerId, at: Vec2) {
    let n = state.config.squad_size;
    for i in 0..n {
        let offset = (i as f32 - (n.saturating_sub(1)) as f32 / 2.0) * SQUAD_SPACING;
        let pos = at + Vec2::new(offset, 0.0);
        state.world.soldiers.insert(Soldier {
            owner,
            pos,
            anchor: pos,
            hp: SQUAD_HP,
            max_hp: SQUAD_HP,
            damage: SQUAD_DAMAGE,
            target: None,
        });
    }
}

/// Demolish a tower for a partial refund of its base cost. Returns the refund.
pub fn sell(
    state: &mut TdState,
    id: TowerId,
    events: &mut Vec<TdEvent>,
) -> Result<u32, Rejection> {
    ensure_running(state)?;
    let tower = state.world.towers.remove(id).ok_or(Rejection::UnknownTower)?;
    let refund = state.config.tower_refund(tower.kind);
    let (x, y) = tower.cell;

    state.gold += refund;
    state.grid.set_terrain(x, y, Terrain::Open);
    state.world.soldiers.retain(|_, s| s.owner != id);
    state.recompute_field();

    tracing::debug!(x, y, refund, "tower sold");
    events.push(TdEvent::TowerSold { id, x, y, refund });
    Ok(refund)
}

pub fn upgrade(
    state: &mut TdState,
    id: TowerId,
    choice: UpgradeChoice,
    events: &mut Vec<TdEvent>,
) -> Result<(), Rejection> {
    ensure_running(state)?;
    let tower = state.world.towers.get(id).ok_or(Rejection::UnknownTower)?;
    let (required_level, cost) = match choice {
        UpgradeChoice::Veteran => (0, state.config.veteran_cost),
        UpgradeChoice::Specialize(_) => (1, state.config.specialization_cost),
        UpgradeChoice::Master => (2, state.config.master_cost),
    };
    if tower.level != required_level {
        return Err(Rejection::WrongTier { level: tower.level });
    }
    if matches!(choice, UpgradeChoice::Specialize(_)) && tower.kind == TowerKind::Wall {
        return Err(Rejection::NoSpecialization);
    }

    charge(state, cost)?;
    let tower = &mut state.world.towers[id];
    tower.level += 1;
    match choice {
        UpgradeChoice::Veteran => {
            tower.damage *= 1.1;
            tower.range *= 1.1;
        }
        UpgradeChoice::Specialize(branch) => {
            tower.specialization = Some(branch);
            specialize(tower, branch);
        }
        UpgradeChoice::Master => {
            tower.master = true;
            tower.damage *= 2.0;
            tower.range *= 1.3;
            match tower.kind {
                TowerKind::Archer => tower.interval *= 0.5,
                TowerKind::Lightning => {
                    tower.ammo_max += 2;
                    tower.ammo += 2;
                }
                _ => {}
            }
        }
    }

    let (kind, level) = (tower.kind, tower.level);
    match (kind, choice) {
        (TowerKind::Barracks, UpgradeChoice::Specialize(Specialization::A)) => {
            refit_squad(state, id, |s| {
                s.hp += 100.0 - s.max_hp;
                s.max_hp = 100.0;
            });
        }
        (TowerKind::Barracks, UpgradeChoice::Specialize(Specialization::B)) => {
            refit_squad(state, id, |s| s.damage = 10.0);
        }
        (TowerKind::Barracks, UpgradeChoice::Master) => {
            refit_squad(state, id, |s| {
                s.max_hp = 150.0;
                s.hp = 150.0;
                s.damage = 15.0;
            });
        }
        _ => {}
    }

    tracing::debug!(kind = kind.as_str(), level, "tower upgraded");
    events.push(TdEvent::TowerUpgraded { id, level });
    Ok(())
}

/// Stat changes for the second-tier branch. Effects that only matter when
/// firing (poison rounds, piercing, wide shells, sticky tar) are read from
/// `specialization` by the tower system.
fn specialize(tower: &mut Tower, branch: Specialization) {
    use Specialization::{A, B};
    match (tower.kind, branch) {
        (TowerKind::Archer, A) | (TowerKind::Tar, A) | (TowerKind::Lightning, A) => {
            tower.range *= 1.3;
        }
        (TowerKind::Knight, A) | (TowerKind::Lightning, B) => tower.interval *= 0.8,
        (TowerKind::Knight, B) => {
            tower.damage *= 2.0;
            tower.interval *= 1.2;
        }
        (TowerKind::Fire, B) => tower.damage *= 1.5,
        _ => {}
    }
}

fn refit_squad(state: &mut TdState, owner: TowerId, f: impl Fn(&mut Soldier)) {
    state
        .world
        .soldiers
        .values_mut()
        .filter(|s| s.owner == owner)
        .for_each(f);
}

pub fn set_strategy(
    state: &mut TdState,
    id: TowerId,
    strategy: Strategy,
) -> Result<(), Rejection> {
    ensure_running(state)?;
    let tower = state.world.towers.get_mut(id).ok_or(Rejection::UnknownTower)?;
    tower.strategy = strategy;
    Ok(())
}

pub fn use_ability(
    state: &mut TdState,
    ability: Ability,
    events: &mut Vec<TdEvent>,
) -> Result<(), Rejection> {
    ensure_running(state)?;
    let remaining = match ability {
        Ability::Arrow => state.abilities.arrow,
        Ability::Tax => state.abilities.tax,
        Ability::Ice => state.abilities.ice,
    };
    if remaining > 0 {
        return Err(Rejection::OnCooldown { remaining });
    }

    let config = &state.config;
    match ability {
        Ability::Arrow => {
            state.abilities.arrow = config.duration_to_ticks(config.arrow_cooldown);
            let damage = config.arrow_damage;
            let ids: Vec<EnemyId> = state.world.enemies.keys().collect();
            let world = &mut state.world;
            for eid in ids {
                deal_damage(&mut world.towers, &mut world.enemies[eid], damage, None);
            }
        }
        Ability::Tax => {
            state.abilities.tax = config.duration_to_ticks(config.tax_cooldown);
            state.gold += config.tax_gold;
        }
        Ability::Ice => {
            state.abilities.ice = config.duration_to_ticks(config.ice_cooldown);
        }
    }

    tracing::debug!(?ability, "ability used");
    events.push(TdEvent::AbilityUsed { ability });
    Ok(())
}

/// Raise the citadel one level. Returns the new level.
pub fn upgrade_citadel(
    state: &mut TdState,
    events: &mut Vec<TdEvent>,
) -> Result<u32, Rejection> {
    ensure_running(state)?;
    charge(state, state.config.citadel_cost)?;
    state.citadel_level += 1;
    tracing::debug!(level = state.citadel_level, "citadel upgraded");
    events.push(TdEvent::CitadelUpgraded {
        level: state.citadel_level,
    });
    Ok(state.citadel_level)
}

pub fn start_wave(state: &mut TdState, events: &mut Vec<TdEvent>) -> Result<(), Rejection> {
    ensure_running(state)?;
    if state.wave_active {
        return Err(Rejection::WaveInProgress);
    }
    waves::begin_wave(state, events);
    Ok(())
}

pub fn set_paused(state: &mut TdState, paused: bool) -> Result<(), Rejection> {
    ensure_running(state)?;
    state.paused = paused;
    Ok(())
}

pub fn set_speed(state: &mut TdState, speed: u8) -> Result<(), Rejection> {
    ensure_running(state)?;
    if !SPEEDS.contains(&speed) {
        return Err(Rejection::InvalidSpeed(speed));
    }
    state.speed = speed;
    Ok(())
}
