use bastion_core::Micros;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TowerKind {
    Archer,
    Knight,
    Crossbow,
    Fire,
    Tar,
    Lightning,
    Barracks,
    Wall,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSpec {
    pub cost: u32,
    /// Reach in cells; multiplied by the cell size when targeting.
    pub range: f32,
    pub damage: f32,
    /// Frames between attacks at speed 1.
    pub interval: f32,
    pub ammo: u32,
}

impl TowerKind {
    pub const ALL: [TowerKind; 8] = [
        TowerKind::Archer,
        TowerKind::Knight,
        TowerKind::Crossbow,
        TowerKind::Fire,
        TowerKind::Tar,
        TowerKind::Lightning,
        TowerKind::Barracks,
        TowerKind::Wall,
    ];

    pub const fn spec(self) -> TowerSpec {
        let (cost, range, damage, interval, ammo) = match self {
            TowerKind::Archer => (60, 4.5, 15.0, 45.0, 0),
            TowerKind::Knight => (80, 1.5, 45.0, 55.0, 0),
            TowerKind::Crossbow => (120, 7.5, 80.0, 90.0, 0),
            TowerKind::Fire => (150, 3.0, 30.0, 70.0, 0),
            TowerKind::Tar => (100, 4.0, 0.0, 40.0, 0),
            TowerKind::Lightning => (300, 3.0, 100.0, 600.0, 2),
            TowerKind::Barracks => (100, 2.5, 0.0, 600.0, 0),
            TowerKind::Wall => (10, 0.0, 0.0, 0.0, 0),
        };
        TowerSpec {
            cost,
            range,
            damage,
            interval,
            ammo,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TowerKind::Archer => "Archer",
            TowerKind::Knight => "Knight",
            TowerKind::Crossbow => "Crossbow",
            TowerKind::Fire => "Fire",
            TowerKind::Tar => "Tar",
            TowerKind::Lightning => "Lightning",
            TowerKind::Barracks => "Barracks",
            TowerKind::Wall => "Wall",
        }
    }

    /// Fire and tar towers light up orthogonally adjacent archers.
    pub const fn ignites_neighbors(self) -> bool {
        matches!(self, TowerKind::Fire | TowerKind::Tar)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Peasant,
    Wolf,
    Knight,
    Spider,
    Skeleton,
    Snake,
    Boss,
    Kobold,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySpec {
    pub hp: f32,
    /// Pixels per frame at speed 1.
    pub speed: f32,
    pub reward: u32,
    pub armor: f32,
    pub ignores_slow: bool,
    pub poison_immune: bool,
}

impl EnemyKind {
    pub const fn spec(self) -> EnemySpec {
        let (hp, speed, reward, armor) = match self {
            EnemyKind::Peasant => (30.0, 1.5, 2, 0.0),
            EnemyKind::Wolf => (20.0, 2.8, 3, 0.0),
            EnemyKind::Knight => (90.0, 0.9, 7, 0.5),
            EnemyKind::Spider => (40.0, 2.2, 5, 0.1),
            EnemyKind::Skeleton => (50.0, 1.4, 4, 0.2),
            EnemyKind::Snake => (35.0, 3.0, 5, 0.0),
            EnemyKind::Boss => (3000.0, 0.6, 100, 0.4),
            EnemyKind::Kobold => (180.0, 1.5, 50, 0.0),
        };
        EnemySpec {
            hp,
            speed,
            reward,
            armor,
            ignores_slow: matches!(self, EnemyKind::Spider),
            poison_immune: matches!(self, EnemyKind::Skeleton),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            EnemyKind::Peasant => "Peasant",
            EnemyKind::Wolf => "Wolf",
            EnemyKind::Knight => "Knight",
            EnemyKind::Spider => "Spider",
            EnemyKind::Skeleton => "Skeleton",
            EnemyKind::Snake => "Snake",
            EnemyKind::Boss => "Boss",
            EnemyKind::Kobold => "Kobold",
        }
    }

    /// Lives lost when this enemy reaches the castle.
    pub const fn breach_cost(self) -> i32 {
        match self {
            EnemyKind::Boss => 10,
            _ => 1,
        }
    }

    /// Hunts faster after dusk.
    pub const fn is_predator(self) -> bool {
        matches!(self, EnemyKind::Wolf | EnemyKind::Spider)
    }
}

/// Counts of special tiles scattered by the procedural map generator.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainScatter {
    pub mines: u32,
    pub power: u32,
    pub swamps: u32,
    pub trees: u32,
    pub water: u32,
}

impl Default for TerrainScatter {
    fn default() -> Self {
        Self {
            mines: 4,
            power: 3,
            swamps: 6,
            trees: 20,
            water: 15,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct TdConfig {
    pub width: u16,
    pub height: u16,
    pub cell_size: f32,
    /// Top-left cell of the 2x2 castle.
    pub castle: (u16, u16),
    pub tick_hz: u32,

    // Economy
    pub starting_gold: u32,
    pub starting_lives: i32,
    pub wave_bonus: u32,
    /// Interest on banked gold paid at wave end, in percent.
    pub interest_percent: u32,
    pub mine_bonus: u32,
    pub refund_percent: u32,

    // Director
    pub spawn_interval_base: u32,
    pub spawn_interval_min: u32,
    pub hp_growth: f32,

    // Upgrades
    pub veteran_cost: u32,
    pub specialization_cost: u32,
    pub master_cost: u32,
    pub citadel_cost: u32,

    // Abilities
    #[serde(with = "millis")]
    pub arrow_cooldown: Micros,
    #[serde(with = "millis")]
    pub tax_cooldown: Micros,
    /// Also how long the field stays iced.
    #[serde(with = "millis")]
    pub ice_cooldown: Micros,
    pub arrow_damage: f32,
    pub tax_gold: u32,

    pub squad_size: u32,
    pub critters: u32,
    pub scatter: TerrainScatter,
}

impl TdConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: TdConfig = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path)?;
        Self::from_toml_str(&src)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 2 || self.height < 2 {
            return Err(ConfigError::Invalid(format!(
                "grid {}x{} is smaller than the castle",
                self.width, self.height
            )));
        }
        let (cx, cy) = self.castle;
        if cx >= self.width - 1 || cy >= self.height - 1 {
            return Err(ConfigError::Invalid(format!(
                "castle at ({cx}, {cy}) does not fit a {}x{} grid",
                self.width, self.height
            )));
        }
        if self.cell_size <= 0.0 || self.tick_hz == 0 || self.spawn_interval_min == 0 {
            return Err(ConfigError::Invalid(
                "cell_size, tick_hz and spawn_interval_min must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn duration_to_ticks(&self, d: Micros) -> u32 {
        d.to_ticks(self.tick_hz).min(u32::MAX as u64) as u32
    }

    /// The four castle cells, which are the pathfinding goals.
    pub fn goal_cells(&self) -> [(u16, u16); 4] {
        let (x, y) = self.castle;
        [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)]
    }

    pub fn width_px(&self) -> f32 {
        self.width as f32 * self.cell_size
    }

    pub fn tower_refund(&self, kind: TowerKind) -> u32 {
        kind.spec().cost * self.refund_percent / 100
    }
}

impl Default for TdConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 30,
            cell_size: 32.0,
            castle: (9, 28),
            tick_hz: 60,

            starting_gold: 250,
            starting_lives: 20,
            wave_bonus: 50,
            interest_percent: 5,
            mine_bonus: 5,
            refund_percent: 70,

            spawn_interval_base: 40,
            spawn_interval_min: 10,
            hp_growth: 1.13,

            veteran_cost: 50,
            specialization_cost: 100,
            master_cost: 500,
            citadel_cost: 2500,

            arrow_cooldown: Micros::from_secs(30),
            tax_cooldown: Micros::from_secs(45),
            ice_cooldown: Micros::from_secs(60),
            arrow_damage: 100.0,
            tax_gold: 100,

            squad_size: 3,
            critters: 5,
            scatter: TerrainScatter::default(),
        }
    }
}

/// Durations are written in TOML as whole milliseconds.
mod millis {
    use bastion_core::Micros;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Micros, D::Error> {
        u32::deserialize(de).map(Micros::from_millis)
    }
}
