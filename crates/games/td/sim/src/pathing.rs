use crate::terrain::Grid;
use std::collections::VecDeque;

/// Neighbor directions in fixed order: N, S, W, E. Ties in descent resolve
/// to the earliest entry.
const NEIGHBORS: [(i32, i32); 4] = [
    (0, -1), // N
    (0, 1),  // S
    (-1, 0), // W
    (1, 0),  // E
];

/// BFS distance (in steps) from every cell to the nearest castle cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowField {
    width: u16,
    height: u16,
    dist: Vec<Option<u32>>,
}

impl FlowField {
    pub fn unreachable(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            dist: vec![None; (width as usize) * (height as usize)],
        }
    }

    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.dist[(y as usize) * (self.width as usize) + (x as usize)]
    }

    pub fn values(&self) -> &[Option<u32>] {
        &self.dist
    }

    /// True if the castle is reachable from the spawn edge and no passable
    /// spawn-edge cell is cut off from it. Passable cells connected to row 0
    /// share its distances, so checking row 0 covers them.
    pub fn spawn_edge_routed(&self, grid: &Grid) -> bool {
        edge_routed(grid, &self.dist, None)
    }

    /// Offset toward the strictly lowest-valued 4-neighbour of a reachable
    /// cell, or `(0, 0)` when the cell is a local minimum (the castle).
    /// `None` when `(x, y)` itself has no finite distance.
    pub fn descent(&self, x: u16, y: u16) -> Option<(i32, i32)> {
        let mut best = self.get(x, y)?;
        let mut step = (0, 0);

        for &(dx, dy) in &NEIGHBORS {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            if let Some(nd) = self.get(nx as u16, ny as u16) {
                if nd < best {
                    best = nd;
                    step = (dx, dy);
                }
            }
        }

        Some(step)
    }
}

/// Multi-source BFS from `goals` over passable terrain.
pub fn compute_flow_field(grid: &Grid, goals: &[(u16, u16)]) -> FlowField {
    let mut field = FlowField::unreachable(grid.width, grid.height);
    fill_distances(grid, goals, None, &mut field.dist);
    field
}

/// Whether building on `(x, y)` leaves every cell reachable from the spawn
/// edge with a route to the castle. Works on a scratch field; the caller's
/// live field is left untouched and must be recomputed after the build is
/// committed.
pub fn can_place(grid: &Grid, goals: &[(u16, u16)], x: u16, y: u16) -> bool {
    if !grid.in_bounds(x, y) {
        return false;
    }
    let block = Some(grid.idx(x, y));
    let mut scratch = vec![None; (grid.width as usize) * (grid.height as usize)];
    fill_distances(grid, goals, block, &mut scratch);
    edge_routed(grid, &scratch, block)
}

fn is_blocked(grid: &Grid, extra_block: Option<usize>, idx: usize) -> bool {
    Some(idx) == extra_block || !grid.terrain_idx(idx).is_passable()
}

fn edge_routed(grid: &Grid, dist: &[Option<u32>], extra_block: Option<usize>) -> bool {
    let width = grid.width as usize;
    (0..width).any(|idx| dist[idx].is_some())
        && (0..width).all(|idx| is_blocked(grid, extra_block, idx) || dist[idx].is_some())
}

fn fill_distances(
    grid: &Grid,
    goals: &[(u16, u16)],
    extra_block: Option<usize>,
    dist: &mut [Option<u32>],
) {
    let width = grid.width;
    let blocked = |idx: usize| is_blocked(grid, extra_block, idx);

    dist.fill(None);
    let mut queue = VecDeque::new();

    for &(gx, gy) in goals {
        if !grid.in_bounds(gx, gy) {
            continue;
        }
        let idx = grid.idx(gx, gy);
        if blocked(idx) || dist[idx].is_some() {
            continue;
        }
        dist[idx] = Some(0);
        queue.push_back(idx);
    }

    while let Some(idx) = queue.pop_front() {
        let x = (idx % (width as usize)) as i32;
        let y = (idx / (width as usize)) as i32;
        let next = dist[idx].map_or(0, |d| d + 1);

        for &(dx, dy) in &NEIGHBORS {
            let nx = x + dx;
            let ny = y + dy;

            if !grid.contains(nx, ny) {
                continue;
            }

            let nidx = grid.idx(nx as u16, ny as u16);
            if dist[nidx].is_some() || blocked(nidx) {
                continue;
            }

            dist[nidx] = Some(next);
            queue.push_back(nidx);
        }
    }
}
