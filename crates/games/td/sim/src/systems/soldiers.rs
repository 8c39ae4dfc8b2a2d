use crate::world::{EnemyId, SoldierId, TdState};

const AGGRO_RADIUS: f32 = 60.0;
const MELEE_REACH: f32 = 10.0;
const CHASE_SPEED: f32 = 1.5;
const RETURN_SPEED: f32 = 1.0;
/// Distance from the anchor at which an idle soldier counts as home.
const ANCHOR_SLACK: f32 = 5.0;
const STRIKE_PERIOD: u64 = 30;
const COUNTER_DAMAGE: f32 = 2.5;
const NIGHT_COUNTER_DAMAGE: f32 = 5.0;
const NIGHT_THRESHOLD: f32 = 0.5;
const REGEN_PERIOD: u64 = 60;
const REGEN_AMOUNT: f32 = 2.0;

pub fn update(state: &mut TdState) {
    state.world.soldiers.retain(|_, s| s.hp > 0.0);

    let frame = state.frame;
    let speed = state.speed_factor();
    let multiplier = state.damage_multiplier();
    let counter = if state.day_time > NIGHT_THRESHOLD {
        NIGHT_COUNTER_DAMAGE
    } else {
        COUNTER_DAMAGE
    };

    let ids: Vec<SoldierId> = state.world.soldiers.keys().collect();
    for sid in ids {
        let target = acquire_target(state, sid);
        let world = &mut state.world;
        let soldier = &mut world.soldiers[sid];
        soldier.target = target;

        match target.and_then(|id| world.enemies.get_mut(id)) {
            Some(enemy) => {
                let delta = enemy.pos - soldier.pos;
                let dist = delta.length();
                if dist > MELEE_REACH {
                    soldier.pos += delta / dist * (CHASE_SPEED * speed);
                } else {
                    enemy.blocked_by = Some(sid);
                    if frame % STRIKE_PERIOD == 0 {
                        enemy.hp -= soldier.damage * multiplier;
                        soldier.hp -= counter;
                    }
                }
            }
            None => {
                let delta = soldier.anchor - soldier.pos;
                let dist = delta.length();
                if dist > ANCHOR_SLACK {
                    soldier.pos += delta / dist * (RETURN_SPEED * speed);
                } else if frame % REGEN_PERIOD == 0 {
                    soldier.hp = (soldier.hp + REGEN_AMOUNT).min(soldier.max_hp);
                }
            }
        }
    }
}

/// Keeps a live target, otherwise picks the nearest free enemy in reach.
fn acquire_target(state: &TdState, sid: SoldierId) -> Option<EnemyId> {
    let world = &state.world;
    let soldier = &world.soldiers[sid];
    if let Some(current) = soldier.target.filter(|id| world.enemies.contains_key(*id)) {
        return Some(current);
    }

    world
        .enemies
        .iter()
        .filter(|(_, e)| match e.blocked_by {
            Some(other) => other == sid || !world.soldiers.contains_key(other),
            None => true,
        })
        .map(|(id, e)| (id, e.pos.distance(soldier.pos)))
        .filter(|(_, d)| *d <= AGGRO_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}
