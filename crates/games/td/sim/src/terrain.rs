#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Terrain {
    #[default]
    Open,
    Built,
    Swamp,
    Power,
    Mine,
    Tree,
    Water,
    Castle,
}

impl Terrain {
    /// Decode the integer codes used by imported map grids.
    pub const fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => Terrain::Open,
            1 => Terrain::Built,
            2 => Terrain::Swamp,
            3 => Terrain::Power,
            4 => Terrain::Mine,
            5 => Terrain::Tree,
            6 => Terrain::Water,
            9 => Terrain::Castle,
            _ => return None,
        })
    }

    pub const fn code(self) -> u8 {
        match self {
            Terrain::Open => 0,
            Terrain::Built => 1,
            Terrain::Swamp => 2,
            Terrain::Power => 3,
            Terrain::Mine => 4,
            Terrain::Tree => 5,
            Terrain::Water => 6,
            Terrain::Castle => 9,
        }
    }

    pub const fn is_passable(self) -> bool {
        !matches!(self, Terrain::Built | Terrain::Tree | Terrain::Water)
    }

    pub const fn is_buildable(self) -> bool {
        matches!(
            self,
            Terrain::Open | Terrain::Swamp | Terrain::Power | Terrain::Mine
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Terrain::Open => "Open",
            Terrain::Built => "Built",
            Terrain::Swamp => "Swamp",
            Terrain::Power => "Power",
            Terrain::Mine => "Mine",
            Terrain::Tree => "Tree",
            Terrain::Water => "Water",
            Terrain::Castle => "Castle",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub terrain: Terrain,
    /// Cosmetic sprite variant.
    pub variant: u8,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
}

impl Grid {
    /// All-`Open` grid.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); (width as usize) * (height as usize)],
        }
    }

    /// Open grid with the 2x2 castle stamped at `castle` and smooth
    /// grass variants. Used for deterministic maps.
    pub fn open(width: u16, height: u16, castle: (u16, u16)) -> Self {
        let mut grid = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let idx = grid.idx(x, y);
                grid.cells[idx].variant = grass_variant(x, y);
            }
        }
        grid.stamp_castle(castle);
        grid
    }

    #[inline]
    pub fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    #[inline]
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Signed variant of [`Grid::in_bounds`] for neighbour offsets.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Cell {
        self.cells[self.idx(x, y)]
    }

    #[inline]
    pub fn terrain(&self, x: u16, y: u16) -> Terrain {
        self.get(x, y).terrain
    }

    #[inline]
    pub fn terrain_idx(&self, idx: usize) -> Terrain {
        self.cells[idx].terrain
    }

    #[inline]
    pub fn set_terrain(&mut self, x: u16, y: u16, terrain: Terrain) {
        let idx = self.idx(x, y);
        self.cells[idx].terrain = terrain;
    }

    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let idx = self.idx(x, y);
        self.cells[idx] = cell;
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn count(&self, terrain: Terrain) -> usize {
        self.cells.iter().filter(|c| c.terrain == terrain).count()
    }

    pub fn stamp_castle(&mut self, (x, y): (u16, u16)) {
        for (cx, cy) in [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)] {
            if self.in_bounds(cx, cy) {
                self.set_terrain(cx, cy, Terrain::Castle);
            }
        }
    }
}

/// Low-frequency noise mapped to four grass variants so neighbouring
/// cells look alike.
pub fn grass_variant(x: u16, y: u16) -> u8 {
    let (fx, fy) = (x as f32, y as f32);
    let n = (fx * 0.3).sin() * (fy * 0.3).cos() + ((fx + fy) * 0.1).sin();
    if n > 0.6 {
        3
    } else if n > 0.1 {
        2
    } else if n > -0.4 {
        1
    } else {
        0
    }
}
