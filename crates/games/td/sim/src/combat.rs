use crate::world::{Enemy, Tower, TowerId};
use slotmap::SlotMap;

/// Damage bonus for towers standing on power terrain.
pub const EMPOWERED_BONUS: f32 = 1.25;

/// Armor scales incoming physical damage by `1 - armor`; never negative.
pub fn mitigate(damage: f32, armor: f32) -> f32 {
    (damage * (1.0 - armor.clamp(0.0, 1.0))).max(0.0)
}

/// Apply `amount` to `enemy`, crediting `source` with the damage and the
/// eventual kill.
pub fn deal_damage(
    towers: &mut SlotMap<TowerId, Tower>,
    enemy: &mut Enemy,
    amount: f32,
    source: Option<TowerId>,
) {
    enemy.hp -= amount;
    if let Some(source) = source {
        enemy.last_hit = Some(source);
        if let Some(tower) = towers.get_mut(source) {
            tower.damage_dealt += amount;
        }
    }
}
