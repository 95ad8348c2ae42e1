//! Grid graphs: node arena, id lookup and the builder that turns a weight grid
//! into 8-connected nodes.

use crate::error::PathError;
use crate::grid::{Position, WEIGHT_INF};
use rustc_hash::FxHashMap;

/// Externally assigned node identifier, taken from the id grid.
pub type NodeId = i32;

/// Stable index of a node inside a [`Graph`]'s arena.
pub type NodeIndex = usize;

/// A passable grid cell.
///
/// Neighbors are fixed when the graph is built and are only readable
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    weight: f64,
    position: Position,
    neighbors: Vec<NodeIndex>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Cost of moving onto or off this node.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Arena indices of adjacent passable nodes, in compass order.
    pub fn neighbors(&self) -> &[NodeIndex] {
        &self.neighbors
    }
}

/// An immutable set of nodes. Blocked cells contribute nothing.
///
/// Holds no search state, so any number of engines may borrow one graph
/// at the same time.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    index_of: FxHashMap<NodeId, NodeIndex>,
    rows: usize,
    cols: usize,
}

impl Graph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// # Panics
    /// If `index` did not come from this graph.
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.index_of.get(&id).copied()
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn contains_id(&self, id: NodeId) -> bool {
        self.index_of.contains_key(&id)
    }
}

/// How passable cell values become node weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightMode {
    /// Node weight is the cell value.
    #[default]
    Weighted,
    /// Every passable node weighs 1.0; cell values only decide passability.
    Unweighted,
}

/// Neighbor offsets `(dx, dy)` in the order they are linked:
/// W, E, N, S, NW, NE, SW, SE.
pub const COMPASS: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// Turns a rectangular weight grid and its parallel id grid into a [`Graph`].
///
/// Cells holding [`WEIGHT_INF`] are impassable and produce no node. The grid
/// is surrounded by a virtual impassable border, so edge cells never link
/// outside the grid and never wrap.
pub struct GridGraphBuilder {
    weights: Vec<i32>,
    ids: Vec<NodeId>,
    rows: usize,
    cols: usize,
    mode: WeightMode,
    shape_error: Option<String>,
}

impl GridGraphBuilder {
    /// Starts a builder from row-major nested grids (`weights[row][col]`).
    pub fn new<W, I>(weights: &[W], ids: &[I]) -> Self
    where
        W: AsRef<[i32]>,
        I: AsRef<[NodeId]>,
    {
        let rows = weights.len();
        let cols = weights.first().map_or(0, |row| row.as_ref().len());
        let shape_error = check_shape(weights, ids, rows, cols);

        let (flat_weights, flat_ids) = if shape_error.is_none() {
            (
                weights.iter().flat_map(|row| row.as_ref().iter().copied()).collect(),
                ids.iter().flat_map(|row| row.as_ref().iter().copied()).collect(),
            )
        } else {
            (Vec::new(), Vec::new())
        };

        GridGraphBuilder {
            weights: flat_weights,
            ids: flat_ids,
            rows,
            cols,
            mode: WeightMode::Weighted,
            shape_error,
        }
    }

    /// Starts a builder from flat row-major arrays of `rows * cols` cells.
    pub fn from_flat(weights: &[i32], ids: &[NodeId], rows: usize, cols: usize) -> Self {
        let expected = rows.checked_mul(cols);
        let shape_error = if rows == 0 || cols == 0 {
            Some(format!("grid must have at least one cell, got {}x{}", rows, cols))
        } else if expected != Some(weights.len()) || expected != Some(ids.len()) {
            Some(format!(
                "{}x{} grid needs {} cells, got {} weights and {} ids",
                rows,
                cols,
                rows.saturating_mul(cols),
                weights.len(),
                ids.len()
            ))
        } else {
            None
        };

        GridGraphBuilder {
            weights: weights.to_vec(),
            ids: ids.to_vec(),
            rows,
            cols,
            mode: WeightMode::Weighted,
            shape_error,
        }
    }

    pub fn mode(mut self, mode: WeightMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn weighted(self) -> Self {
        self.mode(WeightMode::Weighted)
    }

    pub fn unweighted(self) -> Self {
        self.mode(WeightMode::Unweighted)
    }

    /// Builds the graph, or fails without producing anything.
    pub fn build(self) -> Result<Graph, PathError> {
        if let Some(reason) = self.shape_error {
            return Err(PathError::InvalidGraphInput(reason));
        }

        let (rows, cols) = (self.rows, self.cols);

        // Surround the grid with a one-cell impassable border.
        let padded_cols = cols + 2;
        let mut padded = vec![WEIGHT_INF; (rows + 2) * padded_cols];
        for y in 0..rows {
            let src = &self.weights[y * cols..(y + 1) * cols];
            let dst = (y + 1) * padded_cols + 1;
            padded[dst..dst + cols].copy_from_slice(src);
        }

        let mut nodes = Vec::new();
        let mut cell_node: Vec<Option<NodeIndex>> = vec![None; rows * cols];
        let mut index_of = FxHashMap::default();

        for y in 0..rows {
            for x in 0..cols {
                let cell = y * cols + x;
                let raw = self.weights[cell];
                if raw == WEIGHT_INF {
                    continue;
                }
                if raw < 0 {
                    return Err(PathError::InvalidGraphInput(format!(
                        "cell ({}, {}) has negative weight {}",
                        x, y, raw
                    )));
                }

                let id = self.ids[cell];
                let index = nodes.len();
                if index_of.insert(id, index).is_some() {
                    return Err(PathError::InvalidGraphInput(format!(
                        "id {} is used by more than one passable cell",
                        id
                    )));
                }

                let weight = match self.mode {
                    WeightMode::Weighted => raw as f64,
                    WeightMode::Unweighted => 1.0,
                };
                nodes.push(Node {
                    id,
                    weight,
                    position: Position { x, y },
                    neighbors: Vec::new(),
                });
                cell_node[cell] = Some(index);
            }
        }

        for node in nodes.iter_mut() {
            let Position { x, y } = node.position;
            for &(dx, dy) in COMPASS.iter() {
                // Padded coordinates of the neighbor; the border keeps these in range.
                let px = (x + 1).wrapping_add_signed(dx);
                let py = (y + 1).wrapping_add_signed(dy);
                if padded[py * padded_cols + px] == WEIGHT_INF {
                    continue;
                }
                if let Some(neighbor) = cell_node[(py - 1) * cols + (px - 1)] {
                    node.neighbors.push(neighbor);
                }
            }
        }

        log::debug!(
            "built {}x{} grid graph with {} nodes ({:?})",
            rows,
            cols,
            nodes.len(),
            self.mode
        );

        Ok(Graph {
            nodes,
            index_of,
            rows,
            cols,
        })
    }
}

fn check_shape<W, I>(weights: &[W], ids: &[I], rows: usize, cols: usize) -> Option<String>
where
    W: AsRef<[i32]>,
    I: AsRef<[NodeId]>,
{
    if rows == 0 || cols == 0 {
        return Some(format!("grid must have at least one cell, got {}x{}", rows, cols));
    }
    if ids.len() != rows {
        return Some(format!(
            "weight grid has {} rows but id grid has {}",
            rows,
            ids.len()
        ));
    }
    for (y, (w, i)) in weights.iter().zip(ids).enumerate() {
        let (w, i) = (w.as_ref(), i.as_ref());
        if w.len() != cols {
            return Some(format!("weight row {} has {} columns, expected {}", y, w.len(), cols));
        }
        if i.len() != cols {
            return Some(format!("id row {} has {} columns, expected {}", y, i.len(), cols));
        }
    }
    None
}
