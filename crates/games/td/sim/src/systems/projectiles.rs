use crate::combat::{deal_damage, mitigate};
use crate::config::EnemyKind;
use crate::world::{EnemyId, Projectile, ProjectileEffect, ProjectileId, TdState};

const TAR_IGNITE_DAMAGE: f32 = 50.0;
const IGNITE_BURN: u32 = 180;
const POISON_DURATION: u32 = 300;
const BURN_SLOW: u32 = 30;

pub fn update(state: &mut TdState) {
    let speed = state.speed_factor();
    let ids: Vec<ProjectileId> = state.world.projectiles.keys().collect();

    for id in ids {
        let p = &state.world.projectiles[id];
        let Some(target) = state.world.enemies.get(p.target) else {
            state.world.projectiles.remove(id);
            continue;
        };

        let delta = target.pos - p.pos;
        let dist = delta.length();
        let step = p.speed * speed;

        if dist < step {
            if let Some(p) = state.world.projectiles.remove(id) {
                impact(state, &p);
            }
        } else {
            state.world.projectiles[id].pos += delta / dist * step;
        }
    }
}

fn impact(state: &mut TdState, p: &Projectile) {
    let world = &mut state.world;
    let source = Some(p.source);

    match p.effect {
        ProjectileEffect::Area { radius } => {
            let hit: Vec<EnemyId> = world
                .enemies
                .iter()
                .filter(|(_, e)| e.pos.distance(p.pos) <= radius)
                .map(|(id, _)| id)
                .collect();
            for id in hit {
                let enemy = &mut world.enemies[id];
                deal_damage(&mut world.towers, enemy, p.damage, source);
                if enemy.tarred {
                    enemy.tarred = false;
                    enemy.burn += IGNITE_BURN;
                    deal_damage(&mut world.towers, enemy, TAR_IGNITE_DAMAGE, source);
                }
            }
        }
        ProjectileEffect::Plain { pierce, boss_bonus } => {
            let Some(enemy) = world.enemies.get_mut(p.target) else {
                return;
            };
            let mut damage = p.damage;
            if enemy.kind == EnemyKind::Boss {
                damage *= boss_bonus;
            }
            if !pierce {
                damage = mitigate(damage, enemy.armor);
            }
            deal_damage(&mut world.towers, enemy, damage, source);
        }
        ProjectileEffect::Poison => {
            let Some(enemy) = world.enemies.get_mut(p.target) else {
                return;
            };
            if !enemy.kind.spec().poison_immune {
                enemy.poison = POISON_DURATION;
            }
            deal_damage(&mut world.towers, enemy, p.damage, source);
        }
        ProjectileEffect::Burn => {
            let Some(enemy) = world.enemies.get_mut(p.target) else {
                return;
            };
            enemy.burn = IGNITE_BURN;
            enemy.slow = BURN_SLOW;
            deal_damage(&mut world.towers, enemy, p.damage, source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TdConfig, TowerKind};
    use crate::terrain::Grid;
    use crate::world::{Enemy, Tower, TowerId};
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn state() -> (TdState, TowerId) {
        let config = TdConfig::default();
        let grid = Grid::open(config.width, config.height, config.castle);
        let mut s = TdState::with_grid(config, ChaCha8Rng::seed_from_u64(13), grid);
        let t = s
            .world
            .towers
            .insert(Tower::new(TowerKind::Crossbow, (0, 0), Vec2::ZERO, false));
        (s, t)
    }

    fn shoot(s: &mut TdState, source: TowerId, target: EnemyId, effect: ProjectileEffect) {
        let pos = s.world.enemies[target].pos - Vec2::new(0.0, 2.0);
        s.world.projectiles.insert(Projectile {
            pos,
            target,
            source,
            damage: 80.0,
            effect,
            speed: 10.0,
            color: "#ffffff",
        });
    }

    #[test]
    fn armor_reduces_plain_damage() {
        let (mut s, t) = state();
        let e = s
            .world
            .enemies
            .insert(Enemy::new(EnemyKind::Knight, Vec2::new(100.0, 100.0), 1.0, 0.0));
        shoot(&mut s, t, e, ProjectileEffect::Plain { pierce: false, boss_bonus: 1.0 });
        update(&mut s);
        assert_eq!(s.world.enemies[e].hp, 50.0);
        assert!(s.world.projectiles.is_empty());
        assert_eq!(s.world.towers[t].damage_dealt, 40.0);
    }

    #[test]
    fn piercing_bolts_ignore_armor_and_boss_bonus_triples() {
        let (mut s, t) = state();
        let boss = s
            .world
            .enemies
            .insert(Enemy::new(EnemyKind::Boss, Vec2::new(100.0, 100.0), 1.0, 0.0));
        shoot(&mut s, t, boss, ProjectileEffect::Plain { pierce: true, boss_bonus: 3.0 });
        update(&mut s);
        assert_eq!(s.world.enemies[boss].hp, 3000.0 - 240.0);
    }

    #[test]
    fn area_shell_ignites_tar() {
        let (mut s, t) = state();
        let a = s
            .world
            .enemies
            .insert(Enemy::new(EnemyKind::Kobold, Vec2::new(100.0, 100.0), 1.0, 0.0));
        let b = s
            .world
            .enemies
            .insert(Enemy::new(EnemyKind::Kobold, Vec2::new(140.0, 100.0), 1.0, 0.0));
        let c = s
            .world
            .enemies
            .insert(Enemy::new(EnemyKind::Kobold, Vec2::new(300.0, 100.0), 1.0, 0.0));
        s.world.enemies[b].tarred = true;
        shoot(&mut s, t, a, ProjectileEffect::Area { radius: 60.0 });
        update(&mut s);

        assert_eq!(s.world.enemies[a].hp, 100.0);
        assert_eq!(s.world.enemies[b].hp, 50.0);
        assert!(!s.world.enemies[b].tarred);
        assert_eq!(s.world.enemies[b].burn, 180);
        assert_eq!(s.world.enemies[c].hp, 180.0);
    }

    #[test]
    fn skeletons_ignore_poison() {
        let (mut s, t) = state();
        let e = s
            .world
            .enemies
            .insert(Enemy::new(EnemyKind::Skeleton, Vec2::new(100.0, 100.0), 1.0, 0.0));
        shoot(&mut s, t, e, ProjectileEffect::Poison);
        update(&mut s);
        assert_eq!(s.world.enemies[e].poison, 0);
        assert_eq!(s.world.enemies[e].hp, -30.0);
    }

    #[test]
    fn orphaned_projectiles_vanish() {
        let (mut s, t) = state();
        let e = s
            .world
            .enemies
            .insert(Enemy::new(EnemyKind::Peasant, Vec2::new(100.0, 100.0), 1.0, 0.0));
        shoot(&mut s, t, e, ProjectileEffect::Burn);
        s.world.enemies.remove(e);
        update(&mut s);
        assert!(s.world.projectiles.is_empty());
    }
}
