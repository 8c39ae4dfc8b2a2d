use crate::world::{Critter, CritterId, Species, TdState};
use glam::Vec2;
use rand::Rng;

/// Chance per frame that a critter picks a new heading.
const WANDER_CHANCE: f64 = 0.02;
/// Largest velocity component a wandering critter picks.
const WANDER_SPEED: f32 = 0.25;
const PANIC_FRAMES: u32 = 60;
const PANIC_RADIUS: f32 = 48.0;
const PANIC_FACTOR: f32 = 2.0;

/// Scatter `count` critters across the map.
pub fn populate(state: &mut TdState, count: u32) {
    let w = state.config.width_px();
    let h = state.config.height as f32 * state.config.cell_size;
    for _ in 0..count {
        let rng = &mut state.ambient_rng;
        let species = Species::ALL[rng.gen_range(0..Species::ALL.len())];
        let pos = Vec2::new(rng.gen_range(0.0..w), rng.gen_range(0.0..h));
        state.world.critters.insert(Critter {
            species,
            pos,
            vel: Vec2::ZERO,
            panic: 0,
        });
    }
}

/// Cosmetic wandering; critters never touch gameplay state.
pub fn update(state: &mut TdState) {
    let w = state.config.width_px();
    let h = state.config.height as f32 * state.config.cell_size;
    let ids: Vec<CritterId> = state.world.critters.keys().collect();

    for id in ids {
        let pos = state.world.critters[id].pos;
        let threat = state
            .world
            .enemies
            .values()
            .map(|e| e.pos)
            .find(|p| p.distance(pos) < PANIC_RADIUS);

        let rng = &mut state.ambient_rng;
        let c = &mut state.world.critters[id];

        if let Some(threat) = threat.filter(|_| c.panic == 0) {
            c.panic = PANIC_FRAMES;
            let away = (c.pos - threat).normalize_or_zero();
            c.vel = away * WANDER_SPEED;
        } else if rng.gen_bool(WANDER_CHANCE) {
            c.vel = Vec2::new(
                rng.gen_range(-WANDER_SPEED..WANDER_SPEED),
                rng.gen_range(-WANDER_SPEED..WANDER_SPEED),
            );
        }

        let factor = if c.panic > 0 { PANIC_FACTOR } else { 1.0 };
        c.panic = c.panic.saturating_sub(1);
        c.pos += c.vel * factor;

        if c.pos.x < 0.0 || c.pos.x > w {
            c.vel.x = -c.vel.x;
            c.pos.x = c.pos.x.clamp(0.0, w);
        }
        if c.pos.y < 0.0 || c.pos.y > h {
            c.vel.y = -c.vel.y;
            c.pos.y = c.pos.y.clamp(0.0, h);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnemyKind, TdConfig};
    use crate::terrain::Grid;
    use crate::world::Enemy;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn state() -> TdState {
        let config = TdConfig::default();
        let grid = Grid::open(config.width, config.height, config.castle);
        TdState::with_grid(config, ChaCha8Rng::seed_from_u64(17), grid)
    }

    #[test]
    fn critters_stay_on_the_map() {
        let mut s = state();
        populate(&mut s, 10);
        for _ in 0..5_000 {
            update(&mut s);
        }
        for c in s.world.critters.values() {
            assert!((0.0..=640.0).contains(&c.pos.x));
            assert!((0.0..=960.0).contains(&c.pos.y));
        }
    }

    #[test]
    fn nearby_enemy_starts_a_panic() {
        let mut s = state();
        let id = s.world.critters.insert(Critter {
            species: Species::Sheep,
            pos: Vec2::new(100.0, 100.0),
            vel: Vec2::ZERO,
            panic: 0,
        });
        s.world
            .enemies
            .insert(Enemy::new(EnemyKind::Wolf, Vec2::new(120.0, 100.0), 1.0, 0.0));
        update(&mut s);

        let c = &s.world.critters[id];
        assert_eq!(c.panic, PANIC_FRAMES - 1);
        assert!(c.pos.x < 100.0);
    }
}
