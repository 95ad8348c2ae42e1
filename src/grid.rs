use crate::algorithms::common::BestPath;
use crate::algorithms::estimators::fast_distance;
use crate::error::PathError;
use crate::graph::{Graph, GridGraphBuilder, NodeId, WeightMode};
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;

/// Weight marking a cell as impassable. Such cells produce no node.
pub const WEIGHT_INF: i32 = i32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }
}

/// Parameters for the random fill generator.
#[derive(Debug, Clone, Copy)]
pub struct FillParams {
    /// Probability that a cell away from start/dest is passable.
    pub density: f64,
    /// Cells closer than this (fast distance) to start or dest are always passable.
    pub clear_radius: i64,
    /// Passable cells get a weight drawn from `1..=max_weight`.
    pub max_weight: i32,
}

impl Default for FillParams {
    fn default() -> Self {
        FillParams {
            density: 0.55,
            clear_radius: 5,
            max_weight: 1,
        }
    }
}

/// A rectangular weight grid plus its parallel id grid, with the two cells a
/// search is run between.
///
/// Rows are indexed by `y`, columns by `x`: `weights[y][x]`.
#[derive(Debug, Clone)]
pub struct WeightGrid {
    pub rows: usize,
    pub cols: usize,
    pub weights: Vec<Vec<i32>>,
    pub ids: Vec<Vec<NodeId>>,
    pub start: Position,
    pub dest: Position,
}

impl WeightGrid {
    /// Creates a grid where every cell has weight 1 and ids are assigned in
    /// row-major order (`y * cols + x`).
    pub fn new(rows: usize, cols: usize, start: Position, dest: Position) -> Result<Self, PathError> {
        if rows == 0 || cols == 0 {
            return Err(PathError::InvalidGraphInput(format!(
                "grid must have at least one cell, got {}x{}",
                rows, cols
            )));
        }
        for (label, pos) in [("start", start), ("destination", dest)] {
            if pos.x >= cols || pos.y >= rows {
                return Err(PathError::InvalidGraphInput(format!(
                    "{} {:?} lies outside a {}x{} grid",
                    label, pos, rows, cols
                )));
            }
        }
        if rows.checked_mul(cols).map_or(true, |cells| cells > i32::MAX as usize) {
            return Err(PathError::InvalidGraphInput(format!(
                "{}x{} grid has too many cells for 32-bit ids",
                rows, cols
            )));
        }

        let weights = vec![vec![1; cols]; rows];
        let ids = (0..rows)
            .map(|y| (0..cols).map(|x| (y * cols + x) as NodeId).collect())
            .collect();

        Ok(WeightGrid {
            rows,
            cols,
            weights,
            ids,
            start,
            dest,
        })
    }

    /// Fills a grid at random.
    ///
    /// Start and destination always get weight 1, and everything within
    /// `params.clear_radius` of them is passable so that short searches
    /// usually succeed.
    pub fn random<R: Rng>(
        rows: usize,
        cols: usize,
        start: Position,
        dest: Position,
        params: FillParams,
        rng: &mut R,
    ) -> Result<Self, PathError> {
        let mut grid = WeightGrid::new(rows, cols, start, dest)?;
        let max_weight = params.max_weight.max(1);

        for y in 0..rows {
            for x in 0..cols {
                let pos = Position { x, y };
                if pos == start || pos == dest {
                    grid.weights[y][x] = 1;
                    continue;
                }
                let near_start = fast_distance(x as i64 - start.x as i64, y as i64 - start.y as i64)
                    < params.clear_radius;
                let near_dest = fast_distance(x as i64 - dest.x as i64, y as i64 - dest.y as i64)
                    < params.clear_radius;
                let p = if near_start || near_dest {
                    1.0
                } else {
                    params.density.clamp(0.0, 1.0)
                };

                grid.weights[y][x] = if rng.gen_bool(p) {
                    rng.gen_range(1..=max_weight)
                } else {
                    WEIGHT_INF
                };
            }
        }
        Ok(grid)
    }

    /// Random fill from an optional seed; the same seed always yields the
    /// same grid.
    pub fn generate(
        rows: usize,
        cols: usize,
        start: Position,
        dest: Position,
        params: FillParams,
        seed: Option<u64>,
    ) -> Result<Self, PathError> {
        let mut rng = if let Some(seed) = seed {
            rand::rngs::StdRng::seed_from_u64(seed)
        } else {
            rand::rngs::StdRng::from_entropy()
        };
        WeightGrid::random(rows, cols, start, dest, params, &mut rng)
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.cols && pos.y < self.rows
    }

    pub fn weight_at(&self, pos: Position) -> Option<i32> {
        self.weights.get(pos.y).and_then(|row| row.get(pos.x)).copied()
    }

    /// Sets a cell's weight. Returns `false` if the position is out of bounds.
    pub fn set_weight(&mut self, pos: Position, weight: i32) -> bool {
        match self.weights.get_mut(pos.y).and_then(|row| row.get_mut(pos.x)) {
            Some(cell) => {
                *cell = weight;
                true
            }
            None => false,
        }
    }

    pub fn is_blocked(&self, pos: Position) -> bool {
        self.weight_at(pos).map_or(true, |w| w == WEIGHT_INF)
    }

    pub fn id_at(&self, pos: Position) -> Option<NodeId> {
        self.ids.get(pos.y).and_then(|row| row.get(pos.x)).copied()
    }

    pub fn start_id(&self) -> Option<NodeId> {
        self.id_at(self.start)
    }

    pub fn dest_id(&self) -> Option<NodeId> {
        self.id_at(self.dest)
    }

    /// Builds the search graph for the current weights.
    pub fn build_graph(&self, mode: WeightMode) -> Result<Graph, PathError> {
        GridGraphBuilder::new(&self.weights, &self.ids)
            .mode(mode)
            .build()
    }

    /// Renders the grid as text, one line per row, with an optional path
    /// overlaid.
    pub fn render(&self, path: Option<&BestPath>) -> String {
        let on_path: FxHashSet<Position> = path
            .map(|p| p.steps.iter().map(|step| step.position).collect())
            .unwrap_or_default();

        let mut out = String::with_capacity(self.rows * (self.cols * 2 + 4));
        out.push_str("   ");
        for x in 0..self.cols {
            out.push_str(&format!("{:2}", x % 10));
        }
        out.push('\n');

        for y in 0..self.rows {
            out.push_str(&format!("{:2} ", y));
            for x in 0..self.cols {
                let pos = Position { x, y };
                let ch = if pos == self.start {
                    'S'
                } else if pos == self.dest {
                    'G'
                } else if on_path.contains(&pos) {
                    '*'
                } else {
                    match self.weights[y][x] {
                        WEIGHT_INF => '#',
                        1 => '.',
                        w @ 0..=9 => char::from(b'0' + w as u8),
                        _ => '+',
                    }
                };
                out.push(ch);
                out.push(' ');
            }
            out.push('\n');
        }
        out
    }

    /// Print a visual representation of the grid
    pub fn print_grid(&self, path: Option<&BestPath>) {
        println!("Legend: S=Start, G=Goal, *=Path, #=Blocked, .=Weight 1, 0-9/+=Weight");
        println!("{}", self.render(path));
    }
}
