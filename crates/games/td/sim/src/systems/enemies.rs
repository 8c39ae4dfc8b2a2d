use crate::events::TdEvent;
use crate::terrain::Terrain;
use crate::world::{Enemy, EnemyId, TdState};
use glam::Vec2;

const BURN_PERIOD: u64 = 30;
const BURN_DAMAGE: f32 = 10.0;
const POISON_PERIOD: u64 = 60;
const POISON_MIN_DAMAGE: f32 = 5.0;
const POISON_FRACTION: f32 = 0.01;

const SWAMP_FACTOR: f32 = 0.5;
const WINTER_FACTOR: f32 = 0.9;
const SLOW_FACTOR: f32 = 0.5;
/// Slow applied to enemies that shrug most of it off.
const RESISTED_SLOW_FACTOR: f32 = 0.8;
const ICE_FACTOR: f32 = 0.2;
const PREDATOR_NIGHT_FACTOR: f32 = 1.2;
const PREDATOR_NIGHT_THRESHOLD: f32 = 0.3;

const WOBBLE_FREQ: f32 = 0.05;
const WOBBLE_AMPLITUDE: f32 = 0.5;
const WEAR_STEP: f32 = 0.005;
const WEAR_MAX: f32 = 1.5;
/// Per-axis distance to the castle centre that counts as a breach.
const BREACH_RADIUS: f32 = 30.0;
/// How far below the map an unrouted enemy may drift before it is dropped.
const STRAY_MARGIN: f32 = 20.0;

pub fn update(state: &mut TdState, events: &mut Vec<TdEvent>) {
    let ids: Vec<EnemyId> = state.world.enemies.keys().collect();

    for id in ids {
        tick_statuses(state, id);

        if state.world.enemies[id].hp <= 0.0 {
            kill(state, id, events);
            continue;
        }

        if is_held(state, id) {
            continue;
        }

        let speed = effective_speed(state, &state.world.enemies[id]);
        step(state, id, speed);
        if strayed(state, id) {
            continue;
        }

        if breach(state, id, events) && state.game_over {
            return;
        }
    }
}

fn tick_statuses(state: &mut TdState, id: EnemyId) {
    let frame = state.frame;
    let e = &mut state.world.enemies[id];

    if e.burn > 0 {
        e.burn -= 1;
        if frame % BURN_PERIOD == 0 {
            e.hp -= BURN_DAMAGE;
        }
    }
    if e.poison > 0 {
        e.poison -= 1;
        if frame % POISON_PERIOD == 0 {
            e.hp -= (e.max_hp * POISON_FRACTION).max(POISON_MIN_DAMAGE);
        }
    }
    e.slow = e.slow.saturating_sub(1);
    e.frozen = e.frozen.saturating_sub(1);
}

fn kill(state: &mut TdState, id: EnemyId, events: &mut Vec<TdEvent>) {
    let Some(enemy) = state.world.enemies.remove(id) else {
        return;
    };
    state.gold += enemy.reward;

    let credited = enemy
        .last_hit
        .filter(|tower| state.world.towers.contains_key(*tower));
    if let Some(tower) = credited {
        state.world.towers[tower].kills += 1;
    }

    events.push(TdEvent::EnemyKilled {
        id,
        kind: enemy.kind,
        reward: enemy.reward,
        credited,
    });
}

/// A live blocking soldier or an active freeze pins the enemy in place.
/// Blockers that no longer exist are forgotten here.
fn is_held(state: &mut TdState, id: EnemyId) -> bool {
    let soldiers = &state.world.soldiers;
    let e = &mut state.world.enemies[id];
    if let Some(soldier) = e.blocked_by {
        if soldiers.contains_key(soldier) {
            return true;
        }
        e.blocked_by = None;
    }
    e.frozen > 0
}

/// Pixels this enemy covers this frame.
pub fn effective_speed(state: &TdState, enemy: &Enemy) -> f32 {
    let spec = enemy.kind.spec();
    let mut speed = enemy.speed * state.speed_factor();

    let on_swamp = state
        .cell_at_pixel(enemy.pos)
        .is_some_and(|(x, y)| state.grid.terrain(x, y) == Terrain::Swamp);
    if on_swamp && !spec.ignores_slow {
        speed *= SWAMP_FACTOR;
    }
    if state.is_winter() {
        speed *= WINTER_FACTOR;
    }
    if enemy.slow > 0 {
        speed *= if spec.ignores_slow {
            RESISTED_SLOW_FACTOR
        } else {
            SLOW_FACTOR
        };
    }
    if state.abilities.ice > 0 {
        speed *= ICE_FACTOR;
    }
    if enemy.kind.is_predator() && state.day_time > PREDATOR_NIGHT_THRESHOLD {
        speed *= PREDATOR_NIGHT_FACTOR;
    }
    speed
}

fn step(state: &mut TdState, id: EnemyId, speed: f32) {
    let frame = state.frame as f32;
    let pos = state.world.enemies[id].pos;

    let Some((cell, (dx, dy))) = state
        .cell_at_pixel(pos)
        .and_then(|cell| state.field.descent(cell.0, cell.1).map(|d| (cell, d)))
    else {
        // Off the map or cut off: drift straight down toward the field.
        state.world.enemies[id].pos.y += speed;
        return;
    };

    let cs = state.config.cell_size;
    let dest = Vec2::new(
        (cell.0 as i32 + dx) as f32 * cs + cs / 2.0,
        (cell.1 as i32 + dy) as f32 * cs + cs / 2.0,
    );

    let e = &mut state.world.enemies[id];
    let delta = dest - e.pos;
    let dist = delta.length();
    e.facing = delta.x;
    if dist <= speed {
        e.pos = dest;
    } else {
        e.pos += delta / dist * speed;
        e.pos.x += (frame * WOBBLE_FREQ + e.noise_phase).sin() * WOBBLE_AMPLITUDE;
    }

    let idx = state.grid.idx(cell.0, cell.1);
    state.wear[idx] = (state.wear[idx] + WEAR_STEP).min(WEAR_MAX);
}

/// Drops an enemy that fell past the bottom edge without finding a route.
fn strayed(state: &mut TdState, id: EnemyId) -> bool {
    let floor = state.config.height as f32 * state.config.cell_size + STRAY_MARGIN;
    if state.world.enemies[id].pos.y <= floor {
        return false;
    }
    if let Some(enemy) = state.world.enemies.remove(id) {
        tracing::warn!(kind = enemy.kind.as_str(), x = enemy.pos.x, "enemy left the map");
    }
    true
}

/// Removes the enemy and charges lives if it reached the castle.
fn breach(state: &mut TdState, id: EnemyId, events: &mut Vec<TdEvent>) -> bool {
    let center = state.castle_center();
    let pos = state.world.enemies[id].pos;
    if (pos.x - center.x).abs() >= BREACH_RADIUS || (pos.y - center.y).abs() >= BREACH_RADIUS {
        return false;
    }

    let Some(enemy) = state.world.enemies.remove(id) else {
        return false;
    };
    let lives_lost = enemy.kind.breach_cost();
    state.lives -= lives_lost;
    events.push(TdEvent::CastleBreached {
        id,
        kind: enemy.kind,
        lives_lost,
    });

    if state.lives <= 0 && !state.game_over {
        state.game_over = true;
        tracing::info!(wave = state.wave, "castle fell");
        events.push(TdEvent::GameOver { wave: state.wave });
    }
    true
}
