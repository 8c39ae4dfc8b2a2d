use crate::config::EnemyKind;
use crate::events::TdEvent;
use crate::terrain::Terrain;
use crate::world::{Enemy, EnemyId, Season, TdState, TowerId};
use glam::Vec2;
use rand::Rng;
use std::collections::VecDeque;

/// Chance per slot of a stray spider once past wave 5.
pub const STRAY_SPIDER_CHANCE: f64 = 0.05;
/// Spawn height above the top edge.
const SPAWN_Y: f32 = -20.0;
/// Horizontal margin kept clear at both map edges when spawning.
const SPAWN_MARGIN: f32 = 20.0;

/// Enemy roster for `wave` in release order, plus the herald to show when
/// the roster itself announces one.
pub fn build_queue<R: Rng>(wave: u32, rng: &mut R) -> (VecDeque<EnemyKind>, Option<EnemyKind>) {
    if wave % 10 == 0 {
        let herald = if wave % 20 == 0 {
            EnemyKind::Boss
        } else {
            EnemyKind::Knight
        };
        return (VecDeque::from([EnemyKind::Boss]), Some(herald));
    }

    let count = 4 + (wave as f32 * 1.5).floor() as u32;
    let mut queue: VecDeque<EnemyKind> = (0..count)
        .map(|i| {
            let stray = rng.gen_bool(STRAY_SPIDER_CHANCE);
            slot_kind(wave, i, stray)
        })
        .collect();

    if wave % 5 == 0 {
        let mid = queue.len() / 2;
        queue.insert(mid, EnemyKind::Kobold);
    }

    (queue, None)
}

fn slot_kind(wave: u32, i: u32, stray_spider: bool) -> EnemyKind {
    if wave > 5 && stray_spider {
        EnemyKind::Spider
    } else if wave > 15 && i % 4 == 0 {
        EnemyKind::Skeleton
    } else if wave > 10 && i % 5 == 0 {
        EnemyKind::Spider
    } else if wave > 20 && i % 6 == 0 {
        EnemyKind::Snake
    } else if wave > 6 && i % 3 == 0 {
        EnemyKind::Knight
    } else if wave > 3 && i % 2 == 0 {
        EnemyKind::Wolf
    } else {
        EnemyKind::Peasant
    }
}

/// Frames between releases at the given speed multiplier.
pub fn spawn_interval(state: &TdState) -> u64 {
    let base = state.config.spawn_interval_base / state.speed.max(1) as u32;
    base.max(state.config.spawn_interval_min) as u64
}

/// Queue the current wave, refill lightning towers and mark the wave live.
pub fn begin_wave(state: &mut TdState, events: &mut Vec<TdEvent>) {
    let (queue, herald) = build_queue(state.wave, &mut state.rng);
    if let Some(herald) = herald {
        state.herald = herald;
    }

    let refill: Vec<TowerId> = state
        .world
        .towers
        .iter()
        .filter(|(_, t)| t.ammo_max > 0)
        .map(|(id, _)| id)
        .collect();
    for id in refill {
        let tower = &mut state.world.towers[id];
        tower.ammo = tower.ammo_max;
    }

    tracing::info!(wave = state.wave, enemies = queue.len(), "wave started");
    events.push(TdEvent::WaveStarted {
        wave: state.wave,
        enemies: queue.len(),
    });

    state.spawn_queue = queue;
    state.wave_active = true;
}

/// Release the next queued enemy on schedule, or close the wave once the
/// queue is drained and the field is clear.
pub fn release(state: &mut TdState, events: &mut Vec<TdEvent>) {
    if !state.wave_active {
        return;
    }

    if state.spawn_queue.is_empty() {
        if state.world.enemies.is_empty() {
            complete_wave(state, events);
        }
        return;
    }

    if state.frame % spawn_interval(state) != 0 {
        return;
    }

    if let Some(kind) = state.spawn_queue.pop_front() {
        let id = spawn_enemy(state, kind);
        if matches!(kind, EnemyKind::Boss | EnemyKind::Knight | EnemyKind::Spider) {
            state.herald = kind;
        }
        events.push(TdEvent::EnemySpawned { id, kind });
    }
}

/// Insert `kind` above the top edge at a random column, scaled to the
/// current wave.
pub fn spawn_enemy(state: &mut TdState, kind: EnemyKind) -> EnemyId {
    let width_px = state.config.width_px();
    let x = if width_px > 2.0 * SPAWN_MARGIN {
        state.rng.gen_range(SPAWN_MARGIN..width_px - SPAWN_MARGIN)
    } else {
        width_px / 2.0
    };
    let phase = state.rng.gen_range(0.0..std::f32::consts::TAU);
    let scale = state
        .config
        .hp_growth
        .powi(state.wave.saturating_sub(1) as i32);

    state
        .world
        .enemies
        .insert(Enemy::new(kind, Vec2::new(x, SPAWN_Y), scale, phase))
}

/// Gold paid when the current wave is cleared.
pub fn wave_bonus(state: &TdState) -> u32 {
    let mines = state.grid.count(Terrain::Mine) as u32;
    state.config.wave_bonus
        + state.gold * state.config.interest_percent / 100
        + state.config.mine_bonus * mines
}

fn complete_wave(state: &mut TdState, events: &mut Vec<TdEvent>) {
    let cleared = state.wave;
    let bonus = wave_bonus(state);

    state.wave_active = false;
    state.wave += 1;
    state.gold += bonus;

    let next = Season::for_wave(state.wave);
    if next != state.next_season {
        state.next_season = next;
        state.season_blend = 0.0;
    }

    tracing::info!(wave = cleared, bonus, gold = state.gold, "wave cleared");
    events.push(TdEvent::WaveCompleted {
        wave: cleared,
        bonus,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn tenth_waves_are_a_lone_boss() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let (q, herald) = build_queue(10, &mut rng);
        assert_eq!(q, VecDeque::from([EnemyKind::Boss]));
        assert_eq!(herald, Some(EnemyKind::Knight));

        let (_, herald) = build_queue(20, &mut rng);
        assert_eq!(herald, Some(EnemyKind::Boss));
    }

    #[test]
    fn early_waves_are_peasants() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let (q, herald) = build_queue(1, &mut rng);
        assert_eq!(q.len(), 5);
        assert!(q.iter().all(|k| *k == EnemyKind::Peasant));
        assert_eq!(herald, None);
    }

    #[test]
    fn fifth_waves_carry_a_kobold_in_the_middle() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let (q, _) = build_queue(5, &mut rng);
        // 4 + floor(7.5) = 11 slots plus the kobold.
        assert_eq!(q.len(), 12);
        assert_eq!(q[5], EnemyKind::Kobold);
        assert_eq!(q.iter().filter(|k| **k == EnemyKind::Kobold).count(), 1);
    }

    fn open_state() -> TdState {
        let config = crate::config::TdConfig::default();
        let grid = crate::terrain::Grid::open(config.width, config.height, config.castle);
        TdState::with_grid(config, ChaCha8Rng::seed_from_u64(7), grid)
    }

    #[test]
    fn wave_waits_for_the_last_enemy() {
        let mut s = open_state();
        let mut events = Vec::new();
        s.wave_active = true;
        let straggler = spawn_enemy(&mut s, EnemyKind::Peasant);

        for _ in 0..50 {
            s.frame += 1;
            release(&mut s, &mut events);
        }
        assert!(s.wave_active);
        assert_eq!(s.wave, 1);
        assert!(events.is_empty());

        s.world.enemies.remove(straggler);
        let bonus = wave_bonus(&s);
        release(&mut s, &mut events);
        assert!(!s.wave_active);
        assert_eq!(s.wave, 2);
        assert_eq!(events, vec![TdEvent::WaveCompleted { wave: 1, bonus }]);
    }

    #[test]
    fn queued_enemies_keep_the_wave_open() {
        let mut s = open_state();
        let mut events = Vec::new();
        s.spawn_queue = VecDeque::from([EnemyKind::Peasant]);
        s.wave_active = true;
        s.frame = 1;
        release(&mut s, &mut events);
        assert!(s.wave_active);
        assert_eq!(s.spawn_queue.len(), 1);

        s.frame = 40;
        release(&mut s, &mut events);
        assert!(s.spawn_queue.is_empty());
        assert_eq!(s.world.enemies.len(), 1);
        assert!(s.wave_active);
    }

    #[test]
    fn slot_rules_apply_in_priority_order() {
        assert_eq!(slot_kind(4, 0, false), EnemyKind::Wolf);
        assert_eq!(slot_kind(4, 1, false), EnemyKind::Peasant);
        assert_eq!(slot_kind(4, 0, true), EnemyKind::Wolf);
        assert_eq!(slot_kind(6, 3, true), EnemyKind::Spider);
        assert_eq!(slot_kind(7, 3, false), EnemyKind::Knight);
        assert_eq!(slot_kind(11, 5, false), EnemyKind::Spider);
        assert_eq!(slot_kind(16, 8, false), EnemyKind::Skeleton);
        assert_eq!(slot_kind(21, 6, false), EnemyKind::Snake);
        assert_eq!(slot_kind(21, 12, false), EnemyKind::Skeleton);
    }
}
