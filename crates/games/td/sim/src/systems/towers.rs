use crate::combat::{deal_damage, EMPOWERED_BONUS};
use crate::config::TowerKind;
use crate::events::TdEvent;
use crate::world::{
    Enemy, EnemyId, Projectile, ProjectileEffect, Specialization, Strategy, TdState, Tower,
    TowerId,
};
use glam::Vec2;
use slotmap::SlotMap;

const NIGHT_THRESHOLD: f32 = 0.3;
const NIGHT_SHOOTER_RANGE: f32 = 0.7;
const NIGHT_FIRE_RANGE: f32 = 1.2;

/// Barracks never attack; they idle on this cycle.
const BARRACKS_IDLE: f32 = 600.0;
const TAR_SLOW: u32 = 90;
const STICKY_TAR_SLOW: u32 = 150;

const ARROW_SPEED: f32 = 5.0;
const BOLT_SPEED: f32 = 10.0;
pub const SHELL_RADIUS: f32 = 60.0;
const WIDE_SHELL_FACTOR: f32 = 1.5;
const BOSS_BONUS: f32 = 3.0;
/// Projectiles leave from just above the tower centre.
const MUZZLE_OFFSET: f32 = 10.0;

pub fn update(state: &mut TdState, events: &mut Vec<TdEvent>) {
    let speed = state.speed_factor();
    let ids: Vec<TowerId> = state.world.towers.keys().collect();

    for id in ids {
        let tower = &mut state.world.towers[id];
        if tower.cooldown > 0.0 {
            tower.cooldown -= speed;
        }
        if tower.cooldown > 0.0 {
            continue;
        }

        match tower.kind {
            TowerKind::Wall => continue,
            TowerKind::Barracks => {
                tower.cooldown = BARRACKS_IDLE;
                continue;
            }
            TowerKind::Lightning if tower.ammo == 0 => continue,
            _ => {}
        }

        let tower = tower.clone();
        let range = attack_range(state, &tower);
        let candidates: Vec<EnemyId> = state
            .world
            .enemies
            .iter()
            .filter(|(_, e)| e.pos.distance(tower.pos) <= range)
            .map(|(eid, _)| eid)
            .collect();

        let Some(target) = select_target(tower.strategy, &candidates, &state.world.enemies) else {
            continue;
        };

        let bonus = if tower.empowered { EMPOWERED_BONUS } else { 1.0 };
        let damage = tower.damage * state.damage_multiplier() * bonus;
        fire(state, id, &tower, target, &candidates, damage, events);
        state.world.towers[id].cooldown = tower.interval;
    }
}

/// Reach in pixels after the night modifiers.
pub fn attack_range(state: &TdState, tower: &Tower) -> f32 {
    let mut range = tower.range * state.config.cell_size;
    if state.day_time > NIGHT_THRESHOLD {
        match tower.kind {
            TowerKind::Archer | TowerKind::Crossbow => range *= NIGHT_SHOOTER_RANGE,
            TowerKind::Fire => range *= NIGHT_FIRE_RANGE,
            _ => {}
        }
    }
    range
}

pub fn select_target(
    strategy: Strategy,
    candidates: &[EnemyId],
    enemies: &SlotMap<EnemyId, Enemy>,
) -> Option<EnemyId> {
    let mut iter = candidates.iter().copied();
    match strategy {
        Strategy::First => iter.next(),
        Strategy::Strongest => {
            iter.reduce(|best, c| if enemies[best].hp > enemies[c].hp { best } else { c })
        }
        Strategy::Weakest => {
            iter.reduce(|best, c| if enemies[best].hp < enemies[c].hp { best } else { c })
        }
    }
}

fn fire(
    state: &mut TdState,
    id: TowerId,
    tower: &Tower,
    target: EnemyId,
    candidates: &[EnemyId],
    damage: f32,
    events: &mut Vec<TdEvent>,
) {
    let world = &mut state.world;
    match tower.kind {
        TowerKind::Knight => {
            deal_damage(&mut world.towers, &mut world.enemies[target], damage, Some(id));
        }
        TowerKind::Lightning => {
            deal_damage(&mut world.towers, &mut world.enemies[target], damage, Some(id));
            world.towers[id].ammo -= 1;
            events.push(TdEvent::LightningBolt { tower: id, target });
        }
        TowerKind::Tar => {
            let slow = if tower.specialization == Some(Specialization::B) {
                STICKY_TAR_SLOW
            } else {
                TAR_SLOW
            };
            for &eid in candidates {
                let enemy = &mut world.enemies[eid];
                enemy.slow = slow;
                enemy.tarred = true;
            }
            events.push(TdEvent::TarPulse {
                tower: id,
                hit: candidates.len(),
            });
        }
        TowerKind::Archer | TowerKind::Fire | TowerKind::Crossbow => {
            let (effect, speed, color) = shell_for(state, tower);
            state.world.projectiles.insert(Projectile {
                pos: tower.pos - Vec2::new(0.0, MUZZLE_OFFSET),
                target,
                source: id,
                damage,
                effect,
                speed,
                color,
            });
        }
        TowerKind::Wall | TowerKind::Barracks => {}
    }
}

fn shell_for(state: &TdState, tower: &Tower) -> (ProjectileEffect, f32, &'static str) {
    let spec = tower.specialization;
    match tower.kind {
        TowerKind::Archer if spec == Some(Specialization::B) => {
            (ProjectileEffect::Poison, ARROW_SPEED, "#84cc16")
        }
        TowerKind::Archer if next_to_igniter(state, tower.cell) => {
            (ProjectileEffect::Burn, ARROW_SPEED, "#ef4444")
        }
        TowerKind::Fire => {
            let radius = if spec == Some(Specialization::A) {
                SHELL_RADIUS * WIDE_SHELL_FACTOR
            } else {
                SHELL_RADIUS
            };
            (ProjectileEffect::Area { radius }, ARROW_SPEED, "#f97316")
        }
        TowerKind::Crossbow => (
            ProjectileEffect::Plain {
                pierce: spec == Some(Specialization::A),
                boss_bonus: if spec == Some(Specialization::B) {
                    BOSS_BONUS
                } else {
                    1.0
                },
            },
            BOLT_SPEED,
            "#94a3b8",
        ),
        _ => (
            ProjectileEffect::Plain {
                pierce: false,
                boss_bonus: 1.0,
            },
            ARROW_SPEED,
            "#fde68a",
        ),
    }
}

fn next_to_igniter(state: &TdState, (x, y): (u16, u16)) -> bool {
    state.world.towers.values().any(|t| {
        t.kind.ignites_neighbors() && t.cell.0.abs_diff(x) + t.cell.1.abs_diff(y) == 1
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnemyKind, TdConfig};
    use crate::terrain::Grid;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn state() -> TdState {
        let config = TdConfig::default();
        let grid = Grid::open(config.width, config.height, config.castle);
        TdState::with_grid(config, ChaCha8Rng::seed_from_u64(11), grid)
    }

    fn tower(s: &mut TdState, kind: TowerKind, cell: (u16, u16)) -> TowerId {
        let pos = s.cell_center(cell);
        s.world.towers.insert(Tower::new(kind, cell, pos, false))
    }

    fn enemy(s: &mut TdState, kind: EnemyKind, pos: Vec2, hp: f32) -> EnemyId {
        let mut e = Enemy::new(kind, pos, 1.0, 0.0);
        e.hp = hp;
        s.world.enemies.insert(e)
    }

    #[test]
    fn strategies_pick_by_hp() {
        let mut s = state();
        let a = enemy(&mut s, EnemyKind::Peasant, Vec2::ZERO, 10.0);
        let b = enemy(&mut s, EnemyKind::Peasant, Vec2::ZERO, 30.0);
        let c = enemy(&mut s, EnemyKind::Peasant, Vec2::ZERO, 20.0);
        let all = [a, b, c];
        let enemies = &s.world.enemies;
        assert_eq!(select_target(Strategy::First, &all, enemies), Some(a));
        assert_eq!(select_target(Strategy::Strongest, &all, enemies), Some(b));
        assert_eq!(select_target(Strategy::Weakest, &all, enemies), Some(a));
        assert_eq!(select_target(Strategy::First, &[], enemies), None);
    }

    #[test]
    fn knight_tower_hits_instantly_and_cools_down() {
        let mut s = state();
        let t = tower(&mut s, TowerKind::Knight, (5, 5));
        let pos = s.cell_center((5, 6));
        let e = enemy(&mut s, EnemyKind::Peasant, pos, 100.0);
        let mut events = Vec::new();

        update(&mut s, &mut events);
        assert_eq!(s.world.enemies[e].hp, 55.0);
        assert_eq!(s.world.enemies[e].last_hit, Some(t));
        assert_eq!(s.world.towers[t].cooldown, 55.0);
        assert_eq!(s.world.towers[t].damage_dealt, 45.0);

        update(&mut s, &mut events);
        assert_eq!(s.world.enemies[e].hp, 55.0);
    }

    #[test]
    fn citadel_and_power_terrain_multiply_damage() {
        let mut s = state();
        let t = tower(&mut s, TowerKind::Knight, (5, 5));
        s.world.towers[t].empowered = true;
        s.citadel_level = 2;
        let pos = s.cell_center((5, 6));
        let e = enemy(&mut s, EnemyKind::Peasant, pos, 100.0);
        update(&mut s, &mut Vec::new());
        let expected = 100.0 - 45.0 * 1.2 * 1.25;
        assert!((s.world.enemies[e].hp - expected).abs() < 1e-3);
    }

    #[test]
    fn lightning_spends_ammo_then_waits() {
        let mut s = state();
        let t = tower(&mut s, TowerKind::Lightning, (5, 5));
        s.world.towers[t].ammo = 1;
        let pos = s.cell_center((5, 6));
        let e = enemy(&mut s, EnemyKind::Boss, pos, 3000.0);
        let mut events = Vec::new();

        update(&mut s, &mut events);
        assert_eq!(s.world.towers[t].ammo, 0);
        assert_eq!(s.world.enemies[e].hp, 2900.0);
        assert!(matches!(events[0], TdEvent::LightningBolt { .. }));

        s.world.towers[t].cooldown = 0.0;
        update(&mut s, &mut events);
        assert_eq!(s.world.enemies[e].hp, 2900.0);
    }

    #[test]
    fn tar_coats_everything_in_reach() {
        let mut s = state();
        let t = tower(&mut s, TowerKind::Tar, (5, 5));
        s.world.towers[t].specialization = Some(Specialization::B);
        let near = s.cell_center((5, 7));
        let far = s.cell_center((5, 15));
        let a = enemy(&mut s, EnemyKind::Peasant, near, 30.0);
        let b = enemy(&mut s, EnemyKind::Peasant, near, 30.0);
        let c = enemy(&mut s, EnemyKind::Peasant, far, 30.0);
        update(&mut s, &mut Vec::new());

        for id in [a, b] {
            assert!(s.world.enemies[id].tarred);
            assert_eq!(s.world.enemies[id].slow, STICKY_TAR_SLOW);
        }
        assert!(!s.world.enemies[c].tarred);
    }

    #[test]
    fn archers_next_to_fire_shoot_burning_arrows() {
        let mut s = state();
        let archer = tower(&mut s, TowerKind::Archer, (5, 5));
        tower(&mut s, TowerKind::Fire, (6, 5));
        let pos = s.cell_center((5, 7));
        enemy(&mut s, EnemyKind::Peasant, pos, 30.0);
        update(&mut s, &mut Vec::new());

        let from_archer: Vec<_> = s
            .world
            .projectiles
            .values()
            .filter(|p| p.source == archer)
            .collect();
        assert_eq!(from_archer.len(), 1);
        assert_eq!(from_archer[0].effect, ProjectileEffect::Burn);
    }

    #[test]
    fn night_shortens_archer_range() {
        let mut s = state();
        let t = tower(&mut s, TowerKind::Archer, (5, 5));
        let day = attack_range(&s, &s.world.towers[t]);
        s.day_time = 0.7;
        let night = attack_range(&s, &s.world.towers[t]);
        assert_eq!(day, 144.0);
        assert!((night - 144.0 * 0.7).abs() < 1e-3);
    }
}
