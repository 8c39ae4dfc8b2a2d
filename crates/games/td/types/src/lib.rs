//! Canonical serializable snapshot of the Bastion simulation.
//!
//! Produced by `bastion_td::observe` once per tick and handed to the
//! rendering collaborator, which must treat it as read-only. Kind and terrain
//! names are plain strings so that renderers do not depend on the simulation
//! crate.

use serde::{Deserialize, Serialize};

/// Grid cell coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CellPos {
    pub x: u16,
    pub y: u16,
}

/// Continuous world position in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct PixelPos {
    pub x: f32,
    pub y: f32,
}

/// One terrain cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CellInfo {
    pub terrain: String,
    pub variant: u8,
    /// Cosmetic path wear in `[0, 1.5]`.
    pub wear: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct EnemyInfo {
    pub id: u64,
    pub kind: String,
    pub pos: PixelPos,
    pub hp: f32,
    pub max_hp: f32,
    /// Horizontal component of the last step; renderers flip sprites on it.
    pub facing: f32,
    pub burning: bool,
    pub poisoned: bool,
    pub slowed: bool,
    pub tarred: bool,
    pub blocked: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct TowerInfo {
    pub id: u64,
    pub kind: String,
    pub cell: CellPos,
    pub level: u8,
    pub master: bool,
    pub specialization: Option<String>,
    pub strategy: String,
    pub damage: f32,
    pub range: f32,
    pub cooldown: f32,
    pub interval: f32,
    pub ammo: u32,
    pub ammo_max: u32,
    pub kills: u32,
    pub damage_dealt: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct SoldierInfo {
    pub id: u64,
    pub owner: u64,
    pub pos: PixelPos,
    pub hp: f32,
    pub max_hp: f32,
    pub engaged: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ProjectileInfo {
    pub pos: PixelPos,
    pub effect: String,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CritterInfo {
    pub pos: PixelPos,
    pub species: String,
    pub facing_right: bool,
}

/// Remaining cooldown frames per ability; zero means ready.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct AbilityCooldowns {
    pub arrow: u32,
    pub tax: u32,
    pub ice: u32,
}

/// Full read-only view of one tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Snapshot {
    pub tick: u64,
    pub width: u16,
    pub height: u16,
    pub cell_size: f32,
    pub castle: CellPos,

    pub gold: u32,
    pub lives: i32,
    pub wave: u32,
    pub wave_active: bool,
    pub game_over: bool,
    pub paused: bool,
    pub speed: u8,

    pub season: String,
    pub next_season: String,
    pub season_blend: f32,
    pub day_time: f32,
    pub citadel_level: u32,
    pub herald: String,
    pub abilities: AbilityCooldowns,

    /// Row-major terrain, `width * height` entries.
    pub cells: Vec<CellInfo>,
    /// Row-major flow field for debug overlays; omitted when not requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_field: Option<Vec<Option<u32>>>,

    pub towers: Vec<TowerInfo>,
    pub enemies: Vec<EnemyInfo>,
    pub soldiers: Vec<SoldierInfo>,
    pub projectiles: Vec<ProjectileInfo>,
    pub critters: Vec<CritterInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_field_is_omitted_when_absent() {
        let snapshot = Snapshot {
            tick: 3,
            width: 1,
            height: 1,
            cell_size: 32.0,
            castle: CellPos { x: 0, y: 0 },
            gold: 250,
            lives: 20,
            wave: 1,
            wave_active: false,
            game_over: false,
            paused: false,
            speed: 1,
            season: "summer".into(),
            next_season: "summer".into(),
            season_blend: 0.0,
            day_time: 0.0,
            citadel_level: 0,
            herald: "Peasant".into(),
            abilities: AbilityCooldowns::default(),
            cells: vec![CellInfo {
                terrain: "Castle".into(),
                variant: 0,
                wear: 0.0,
            }],
            flow_field: None,
            towers: Vec::new(),
            enemies: Vec::new(),
            soldiers: Vec::new(),
            projectiles: Vec::new(),
            critters: Vec::new(),
        };

        let json = serde_json::to_string(&snapshot).expect("serialize");
        assert!(!json.contains("flow_field"));
        let back: Snapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, snapshot);
    }
}
