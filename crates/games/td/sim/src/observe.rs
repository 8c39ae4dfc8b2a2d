use crate::world::{Specialization, TdState, TowerId};
use bastion_core::Tick;
use bastion_types::{
    AbilityCooldowns, CellInfo, CellPos, CritterInfo, EnemyInfo, PixelPos, ProjectileInfo,
    Snapshot, SoldierInfo, TowerInfo,
};
use glam::Vec2;
use slotmap::{Key, KeyData};

/// Stable numeric handle for an arena key, as exposed in snapshots.
pub fn key_to_u64<K: Key>(key: K) -> u64 {
    key.data().as_ffi()
}

/// Inverse of [`key_to_u64`] for towers; UIs address towers by this id.
pub fn tower_id_from_u64(raw: u64) -> TowerId {
    TowerId::from(KeyData::from_ffi(raw))
}

fn pixel(v: Vec2) -> PixelPos {
    PixelPos { x: v.x, y: v.y }
}

pub fn build_snapshot(state: &TdState, tick: Tick) -> Snapshot {
    build(state, tick, false)
}

/// Like [`build_snapshot`] with the flow field attached for debug overlays.
pub fn build_snapshot_with_field(state: &TdState, tick: Tick) -> Snapshot {
    build(state, tick, true)
}

fn build(state: &TdState, tick: Tick, with_field: bool) -> Snapshot {
    let config = &state.config;
    let world = &state.world;

    let cells = state
        .grid
        .cells()
        .iter()
        .zip(&state.wear)
        .map(|(cell, &wear)| CellInfo {
            terrain: cell.terrain.as_str().to_string(),
            variant: cell.variant,
            wear,
        })
        .collect();

    let towers = world
        .towers
        .iter()
        .map(|(id, t)| TowerInfo {
            id: key_to_u64(id),
            kind: t.kind.as_str().to_string(),
            cell: CellPos {
                x: t.cell.0,
                y: t.cell.1,
            },
            level: t.level,
            master: t.master,
            specialization: t.specialization.map(|s| match s {
                Specialization::A => "A".to_string(),
                Specialization::B => "B".to_string(),
            }),
            strategy: t.strategy.as_str().to_string(),
            damage: t.damage,
            range: t.range,
            cooldown: t.cooldown,
            interval: t.interval,
            ammo: t.ammo,
            ammo_max: t.ammo_max,
            kills: t.kills,
            damage_dealt: t.damage_dealt,
        })
        .collect();

    let enemies = world
        .enemies
        .iter()
        .map(|(id, e)| EnemyInfo {
            id: key_to_u64(id),
            kind: e.kind.as_str().to_string(),
            pos: pixel(e.pos),
            hp: e.hp,
            max_hp: e.max_hp,
            facing: e.facing,
            burning: e.burn > 0,
            poisoned: e.poison > 0,
            slowed: e.slow > 0,
            tarred: e.tarred,
            blocked: e.blocked_by.is_some_and(|s| world.soldiers.contains_key(s)),
        })
        .collect();

    let soldiers = world
        .soldiers
        .iter()
        .map(|(id, s)| SoldierInfo {
            id: key_to_u64(id),
            owner: key_to_u64(s.owner),
            pos: pixel(s.pos),
            hp: s.hp,
            max_hp: s.max_hp,
            engaged: s.target.is_some_and(|t| world.enemies.contains_key(t)),
        })
        .collect();

    let projectiles = world
        .projectiles
        .values()
        .map(|p| ProjectileInfo {
            pos: pixel(p.pos),
            effect: p.effect.as_str().to_string(),
            color: p.color.to_string(),
        })
        .collect();

    let critters = world
        .critters
        .values()
        .map(|c| CritterInfo {
            pos: pixel(c.pos),
            species: c.species.as_str().to_string(),
            facing_right: c.vel.x >= 0.0,
        })
        .collect();

    Snapshot {
        tick,
        width: config.width,
        height: config.height,
        cell_size: config.cell_size,
        castle: CellPos {
            x: config.castle.0,
            y: config.castle.1,
        },
        gold: state.gold,
        lives: state.lives,
        wave: state.wave,
        wave_active: state.wave_active,
        game_over: state.game_over,
        paused: state.paused,
        speed: state.speed,
        season: state.season.as_str().to_string(),
        next_season: state.next_season.as_str().to_string(),
        season_blend: state.season_blend,
        day_time: state.day_time,
        citadel_level: state.citadel_level,
        herald: state.herald.as_str().to_string(),
        abilities: AbilityCooldowns {
            arrow: state.abilities.arrow,
            tax: state.abilities.tax,
            ice: state.abilities.ice,
        },
        cells,
        flow_field: with_field.then(|| state.field.values().to_vec()),
        towers,
        enemies,
        soldiers,
        projectiles,
        critters,
    }
}
