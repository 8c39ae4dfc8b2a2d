//! Battlefield terrain: a seeded procedural layout, or a themed grid handed
//! over by an external generator.

use crate::config::TdConfig;
use crate::pathing::compute_flow_field;
use crate::terrain::{grass_variant, Cell, Grid, Terrain};
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

/// Produces a themed terrain grid as JSON `{"grid": [[code, ...], ...]}`,
/// or nothing when it cannot.
pub trait ThemeSource {
    fn generate(&self, theme: &str, width: u16, height: u16) -> Option<String>;
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("malformed theme payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a {expected_w}x{expected_h} grid, got {width}x{height}")]
    Dimensions {
        expected_w: u16,
        expected_h: u16,
        width: usize,
        height: usize,
    },
    #[error("unknown terrain code {code} at ({x}, {y})")]
    UnknownTerrain { code: i64, x: usize, y: usize },
    #[error("part of the top edge has no route to the castle")]
    NoPath,
}

#[derive(Deserialize)]
struct ThemePayload {
    grid: Vec<Vec<i64>>,
}

/// Rows above this are kept clear of scattered features.
const CLEAR_ROWS: u16 = 3;
/// Half-width of the square a water clump lands in.
const POND_SPREAD: f32 = 3.0;

pub fn generate_procedural<R: Rng>(config: &TdConfig, rng: &mut R) -> Grid {
    let (w, h) = (config.width, config.height);
    let mut grid = Grid::new(w, h);
    for y in 0..h {
        for x in 0..w {
            grid.set(
                x,
                y,
                Cell {
                    terrain: Terrain::Open,
                    variant: grass_variant(x, y),
                },
            );
        }
    }

    let scatter = &config.scatter;
    for (terrain, count) in [
        (Terrain::Mine, scatter.mines),
        (Terrain::Power, scatter.power),
        (Terrain::Swamp, scatter.swamps),
        (Terrain::Tree, scatter.trees),
    ] {
        scatter_tiles(&mut grid, rng, terrain, count);
    }

    let (px, py) = (w as i32 / 2, h as i32 / 3);
    for _ in 0..scatter.water {
        let ox = px + ((rng.gen::<f32>() - 0.5) * 2.0 * POND_SPREAD).floor() as i32;
        let oy = py + ((rng.gen::<f32>() - 0.5) * 2.0 * POND_SPREAD).floor() as i32;
        if ox > 0 && oy > 0 && ox < w as i32 - 1 && oy < h as i32 - 1 {
            grid.set_terrain(ox as u16, oy as u16, Terrain::Water);
        }
    }

    grid.stamp_castle(config.castle);

    if !compute_flow_field(&grid, &config.goal_cells()).spawn_edge_routed(&grid) {
        tracing::warn!("procedural obstacles cut the spawn edge off; clearing them");
        for y in 0..h {
            for x in 0..w {
                if matches!(grid.terrain(x, y), Terrain::Tree | Terrain::Water) {
                    grid.set_terrain(x, y, Terrain::Open);
                }
            }
        }
    }

    grid
}

/// Drops `count` tiles of `terrain` on random open interior cells, away from
/// the spawn edge. Occupied picks are skipped, not retried.
fn scatter_tiles<R: Rng>(grid: &mut Grid, rng: &mut R, terrain: Terrain, count: u32) {
    if grid.width < 3 || grid.height < 3 {
        return;
    }
    for _ in 0..count {
        let x = rng.gen_range(1..grid.width - 1);
        let y = rng.gen_range(1..grid.height - 1);
        if y >= CLEAR_ROWS && grid.terrain(x, y) == Terrain::Open {
            grid.set_terrain(x, y, terrain);
        }
    }
}

/// Validate and decode a themed grid. The castle is stamped over whatever
/// the payload put there.
pub fn parse_theme_grid(json: &str, config: &TdConfig) -> Result<Grid, MapError> {
    let payload: ThemePayload = serde_json::from_str(json)?;
    let rows = &payload.grid;
    let (w, h) = (config.width, config.height);

    let bad_row = rows.iter().find(|row| row.len() != w as usize);
    if rows.len() != h as usize || bad_row.is_some() {
        return Err(MapError::Dimensions {
            expected_w: w,
            expected_h: h,
            width: bad_row.map_or(w as usize, Vec::len),
            height: rows.len(),
        });
    }

    let mut grid = Grid::new(w, h);
    for (y, row) in rows.iter().enumerate() {
        for (x, &code) in row.iter().enumerate() {
            let terrain =
                Terrain::from_code(code).ok_or(MapError::UnknownTerrain { code, x, y })?;
            grid.set(
                x as u16,
                y as u16,
                Cell {
                    terrain,
                    variant: grass_variant(x as u16, y as u16),
                },
            );
        }
    }
    grid.stamp_castle(config.castle);

    if !compute_flow_field(&grid, &config.goal_cells()).spawn_edge_routed(&grid) {
        return Err(MapError::NoPath);
    }
    Ok(grid)
}

/// Ask `source` for a themed map and fall back to the procedural layout if
/// it has nothing usable.
pub fn themed_or_procedural<R: Rng>(
    source: &dyn ThemeSource,
    theme: &str,
    config: &TdConfig,
    rng: &mut R,
) -> Grid {
    match source.generate(theme, config.width, config.height) {
        Some(json) => match parse_theme_grid(&json, config) {
            Ok(grid) => {
                tracing::info!(theme, "loaded themed map");
                grid
            }
            Err(err) => {
                tracing::warn!(theme, %err, "themed map rejected, using procedural map");
                generate_procedural(config, rng)
            }
        },
        None => {
            tracing::warn!(theme, "theme generator returned nothing, using procedural map");
            generate_procedural(config, rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_config() -> TdConfig {
        TdConfig {
            width: 4,
            height: 4,
            castle: (1, 2),
            ..TdConfig::default()
        }
    }

    #[test]
    fn procedural_map_is_deterministic_and_solvable() {
        let config = TdConfig::default();
        let a = generate_procedural(&config, &mut ChaCha8Rng::seed_from_u64(42));
        let b = generate_procedural(&config, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a, b);
        assert_eq!(a.count(Terrain::Castle), 4);
        assert!(compute_flow_field(&a, &config.goal_cells()).spawn_edge_routed(&a));
        for x in 0..config.width {
            for y in 0..CLEAR_ROWS {
                assert!(matches!(a.terrain(x, y), Terrain::Open | Terrain::Water));
            }
        }
    }

    #[test]
    fn theme_grid_decodes_codes_and_stamps_castle() {
        let json = r#"{"grid": [[0,5,0,0],[2,3,4,0],[0,0,0,6],[0,0,0,0]]}"#;
        let grid = parse_theme_grid(json, &small_config()).unwrap();
        assert_eq!(grid.terrain(1, 0), Terrain::Tree);
        assert_eq!(grid.terrain(2, 1), Terrain::Mine);
        assert_eq!(grid.terrain(3, 2), Terrain::Water);
        assert_eq!(grid.terrain(1, 2), Terrain::Castle);
        assert_eq!(grid.terrain(2, 3), Terrain::Castle);
        assert_eq!(grid.get(3, 3).variant, grass_variant(3, 3));
    }

    #[test]
    fn theme_grid_rejects_bad_payloads() {
        let config = small_config();

        let short = r#"{"grid": [[0,0,0,0],[0,0,0,0]]}"#;
        assert!(matches!(
            parse_theme_grid(short, &config),
            Err(MapError::Dimensions { height: 2, .. })
        ));

        let unknown = r#"{"grid": [[0,0,0,0],[0,7,0,0],[0,0,0,0],[0,0,0,0]]}"#;
        assert!(matches!(
            parse_theme_grid(unknown, &config),
            Err(MapError::UnknownTerrain { code: 7, x: 1, y: 1 })
        ));

        let sealed = r#"{"grid": [[0,0,0,0],[6,6,6,6],[0,0,0,0],[0,0,0,0]]}"#;
        assert!(matches!(
            parse_theme_grid(sealed, &config),
            Err(MapError::NoPath)
        ));

        let pocket = r#"{"grid": [[0,6,0,0],[6,0,0,0],[0,0,0,0],[0,0,0,0]]}"#;
        assert!(matches!(
            parse_theme_grid(pocket, &config),
            Err(MapError::NoPath)
        ));

        assert!(matches!(
            parse_theme_grid("not json", &config),
            Err(MapError::Json(_))
        ));
    }

    struct Silent;

    impl ThemeSource for Silent {
        fn generate(&self, _: &str, _: u16, _: u16) -> Option<String> {
            None
        }
    }

    #[test]
    fn silent_theme_source_falls_back() {
        let config = TdConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let grid = themed_or_procedural(&Silent, "winter keep", &config, &mut rng);
        let expected = generate_procedural(&config, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(grid, expected);
    }
}
