use crate::config::{EnemyKind, TdConfig, TowerKind};
use crate::pathing::{compute_flow_field, FlowField};
use crate::terrain::Grid;
use bastion_core::Tick;
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use slotmap::{new_key_type, SlotMap};
use std::collections::VecDeque;

new_key_type! { pub struct TowerId; }
new_key_type! { pub struct EnemyId; }
new_key_type! { pub struct SoldierId; }
new_key_type! { pub struct ProjectileId; }
new_key_type! { pub struct CritterId; }

/// ChaCha stream reserved for cosmetic randomness.
const AMBIENT_STREAM: u64 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    #[default]
    First,
    Strongest,
    Weakest,
}

impl Strategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Strategy::First => "first",
            Strategy::Strongest => "strongest",
            Strategy::Weakest => "weakest",
        }
    }
}

/// Second-tier upgrade branch; its meaning depends on the tower kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Specialization {
    A,
    B,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Season {
    #[default]
    Summer,
    Autumn,
    Winter,
    Spring,
}

impl Season {
    pub const CYCLE: [Season; 4] = [
        Season::Summer,
        Season::Autumn,
        Season::Winter,
        Season::Spring,
    ];

    pub const fn for_wave(wave: u32) -> Season {
        Self::CYCLE[((wave / 10) % 4) as usize]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
            Season::Spring => "spring",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
    pub armor: f32,
    pub reward: u32,
    pub frozen: u32,
    pub slow: u32,
    pub burn: u32,
    pub poison: u32,
    pub tarred: bool,
    pub blocked_by: Option<SoldierId>,
    /// Horizontal component of the last step.
    pub facing: f32,
    pub noise_phase: f32,
    /// Tower credited with the kill if this enemy dies.
    pub last_hit: Option<TowerId>,
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Vec2, hp_scale: f32, noise_phase: f32) -> Self {
        let spec = kind.spec();
        let hp = spec.hp * hp_scale;
        Self {
            kind,
            pos,
            hp,
            max_hp: hp,
            speed: spec.speed,
            armor: spec.armor,
            reward: spec.reward,
            frozen: 0,
            slow: 0,
            burn: 0,
            poison: 0,
            tarred: false,
            blocked_by: None,
            facing: 0.0,
            noise_phase,
            last_hit: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Tower {
    pub kind: TowerKind,
    pub cell: (u16, u16),
    pub pos: Vec2,
    pub level: u8,
    pub cooldown: f32,
    pub damage: f32,
    pub range: f32,
    pub interval: f32,
    pub ammo: u32,
    pub ammo_max: u32,
    pub master: bool,
    pub specialization: Option<Specialization>,
    pub strategy: Strategy,
    pub empowered: bool,
    pub kills: u32,
    pub damage_dealt: f32,
}

impl Tower {
    pub fn new(kind: TowerKind, cell: (u16, u16), pos: Vec2, empowered: bool) -> Self {
        let spec = kind.spec();
        Self {
            kind,
            cell,
            pos,
            level: 0,
            cooldown: 0.0,
            damage: spec.damage,
            range: spec.range,
            interval: spec.interval,
            ammo: spec.ammo,
            ammo_max: spec.ammo,
            master: false,
            specialization: None,
            strategy: Strategy::First,
            empowered,
            kills: 0,
            damage_dealt: 0.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Soldier {
    pub owner: TowerId,
    pub pos: Vec2,
    pub anchor: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub damage: f32,
    pub target: Option<EnemyId>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProjectileEffect {
    Plain { pierce: bool, boss_bonus: f32 },
    Area { radius: f32 },
    Poison,
    Burn,
}

impl ProjectileEffect {
    pub const fn as_str(self) -> &'static str {
        match self {
            ProjectileEffect::Plain { .. } => "plain",
            ProjectileEffect::Area { .. } => "area",
            ProjectileEffect::Poison => "poison",
            ProjectileEffect::Burn => "burn",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub pos: Vec2,
    pub target: EnemyId,
    pub source: TowerId,
    pub damage: f32,
    pub effect: ProjectileEffect,
    pub speed: f32,
    pub color: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Species {
    Sheep,
    Chicken,
    Rabbit,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Sheep, Species::Chicken, Species::Rabbit];

    pub const fn as_str(self) -> &'static str {
        match self {
            Species::Sheep => "sheep",
            Species::Chicken => "chicken",
            Species::Rabbit => "rabbit",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Critter {
    pub species: Species,
    pub pos: Vec2,
    pub vel: Vec2,
    pub panic: u32,
}

/// Remaining cooldown frames per ability. The field stays iced while
/// `ice` is counting down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Abilities {
    pub arrow: u32,
    pub tax: u32,
    pub ice: u32,
}

#[derive(Clone, Debug, Default)]
pub struct World {
    pub towers: SlotMap<TowerId, Tower>,
    pub enemies: SlotMap<EnemyId, Enemy>,
    pub soldiers: SlotMap<SoldierId, Soldier>,
    pub projectiles: SlotMap<ProjectileId, Projectile>,
    pub critters: SlotMap<CritterId, Critter>,
}

#[derive(Clone, Debug)]
pub struct TdState {
    pub config: TdConfig,
    /// Gameplay rolls: spawn columns, stray spiders.
    pub rng: ChaCha8Rng,
    /// Cosmetic rolls. A separate stream of the same seed, so ambient
    /// detail never shifts gameplay.
    pub ambient_rng: ChaCha8Rng,
    pub tick: Tick,
    /// Simulation frames run so far; paused ticks do not count.
    pub frame: u64,

    pub grid: Grid,
    /// Cosmetic trampling per cell, capped at 1.5.
    pub wear: Vec<f32>,
    pub field: FlowField,
    pub world: World,

    pub gold: u32,
    pub lives: i32,
    pub wave: u32,
    pub wave_active: bool,
    pub spawn_queue: VecDeque<EnemyKind>,
    /// Next notable enemy kind, shown as a preview.
    pub herald: EnemyKind,

    pub season: Season,
    pub next_season: Season,
    pub season_blend: f32,
    /// 0 is full day, 0.7 full night.
    pub day_time: f32,
    pub citadel_level: u32,
    pub abilities: Abilities,

    pub paused: bool,
    pub speed: u8,
    pub game_over: bool,
}

impl TdState {
    /// Fresh state on `grid`. The castle is stamped and the flow field
    /// computed; entities and critters are left to the caller.
    pub fn with_grid(config: TdConfig, rng: ChaCha8Rng, mut grid: Grid) -> Self {
        grid.stamp_castle(config.castle);
        let field = compute_flow_field(&grid, &config.goal_cells());
        let cells = (grid.width as usize) * (grid.height as usize);
        let mut ambient_rng = ChaCha8Rng::from_seed(rng.get_seed());
        ambient_rng.set_stream(AMBIENT_STREAM);
        Self {
            rng,
            ambient_rng,
            tick: 0,
            frame: 0,
            wear: vec![0.0; cells],
            field,
            grid,
            world: World::default(),
            gold: config.starting_gold,
            lives: config.starting_lives,
            wave: 1,
            wave_active: false,
            spawn_queue: VecDeque::new(),
            herald: EnemyKind::Peasant,
            season: Season::Summer,
            next_season: Season::Summer,
            season_blend: 0.0,
            day_time: 0.0,
            citadel_level: 0,
            abilities: Abilities::default(),
            paused: false,
            speed: 1,
            game_over: false,
            config,
        }
    }

    pub fn recompute_field(&mut self) {
        self.field = compute_flow_field(&self.grid, &self.config.goal_cells());
    }

    pub fn speed_factor(&self) -> f32 {
        self.speed as f32
    }

    /// Citadel bonus applied to all friendly damage.
    pub fn damage_multiplier(&self) -> f32 {
        1.0 + 0.1 * self.citadel_level as f32
    }

    /// Grid cell under a pixel position, if on the map.
    pub fn cell_at_pixel(&self, pos: Vec2) -> Option<(u16, u16)> {
        let cs = self.config.cell_size;
        let x = (pos.x / cs).floor();
        let y = (pos.y / cs).floor();
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let (x, y) = (x as u16, y as u16);
        self.grid.in_bounds(x, y).then_some((x, y))
    }

    pub fn cell_center(&self, (x, y): (u16, u16)) -> Vec2 {
        let cs = self.config.cell_size;
        Vec2::new(x as f32 * cs + cs / 2.0, y as f32 * cs + cs / 2.0)
    }

    /// Centre of the 2x2 castle.
    pub fn castle_center(&self) -> Vec2 {
        let cs = self.config.cell_size;
        let (x, y) = self.config.castle;
        Vec2::new(x as f32 * cs + cs, y as f32 * cs + cs)
    }

    pub fn tower_at_cell(&self, cell: (u16, u16)) -> Option<TowerId> {
        self.world
            .towers
            .iter()
            .find(|(_, t)| t.cell == cell)
            .map(|(id, _)| id)
    }

    pub fn tower_at_pixel(&self, pos: Vec2) -> Option<TowerId> {
        self.cell_at_pixel(pos)
            .and_then(|cell| self.tower_at_cell(cell))
    }

    pub fn is_winter(&self) -> bool {
        self.season == Season::Winter
            || (self.season_blend > 0.5 && self.next_season == Season::Winter)
    }

    pub fn wear_at(&self, (x, y): (u16, u16)) -> f32 {
        self.wear[self.grid.idx(x, y)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> TdState {
        let config = TdConfig::default();
        let grid = Grid::new(config.width, config.height);
        TdState::with_grid(config, ChaCha8Rng::seed_from_u64(1), grid)
    }

    #[test]
    fn pixel_lookup_floors_and_rejects_off_map() {
        let s = state();
        assert_eq!(s.cell_at_pixel(Vec2::new(33.0, 65.0)), Some((1, 2)));
        assert_eq!(s.cell_at_pixel(Vec2::new(10.0, -20.0)), None);
        assert_eq!(s.cell_at_pixel(Vec2::new(640.0, 0.0)), None);
    }

    #[test]
    fn tower_lookup_floors_pixels_onto_cells() {
        let mut s = state();
        let pos = s.cell_center((3, 4));
        let id = s
            .world
            .towers
            .insert(Tower::new(TowerKind::Archer, (3, 4), pos, false));

        assert_eq!(s.tower_at_pixel(Vec2::new(96.0, 128.0)), Some(id));
        assert_eq!(s.tower_at_pixel(Vec2::new(127.9, 159.9)), Some(id));
        assert_eq!(s.tower_at_pixel(Vec2::new(128.0, 128.0)), None);
        assert_eq!(s.tower_at_pixel(Vec2::new(100.0, -4.0)), None);
        assert_eq!(s.tower_at_cell((3, 4)), Some(id));
    }

    #[test]
    fn separate_streams_for_gameplay_and_ambience() {
        use rand::Rng;
        let mut s = state();
        let first: u64 = ChaCha8Rng::seed_from_u64(1).gen();
        assert_eq!(s.rng.gen::<u64>(), first);
        assert_ne!(s.ambient_rng.gen::<u64>(), first);
    }

    #[test]
    fn castle_center_is_between_its_cells() {
        let s = state();
        assert_eq!(s.castle_center(), Vec2::new(320.0, 928.0));
        assert_eq!(s.field.get(9, 28), Some(0));
    }

    #[test]
    fn season_cycle_follows_decades() {
        assert_eq!(Season::for_wave(9), Season::Summer);
        assert_eq!(Season::for_wave(10), Season::Autumn);
        assert_eq!(Season::for_wave(25), Season::Winter);
        assert_eq!(Season::for_wave(39), Season::Spring);
        assert_eq!(Season::for_wave(40), Season::Summer);
    }
}
