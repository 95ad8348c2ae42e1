//! Grid path search with A* and incremental cost repair.
//!
//! Build a [`Graph`] from a weight grid and an id grid, then ask an
//! [`AStarEngine`] for the cheapest path between two ids:
//!
//! ```
//! use grid_astar::{estimators, AStarEngine, GridGraphBuilder, WEIGHT_INF};
//!
//! let weights = vec![vec![1, WEIGHT_INF, 1], vec![1, 1, 1]];
//! let ids = vec![vec![0, 1, 2], vec![3, 4, 5]];
//! let graph = GridGraphBuilder::new(&weights, &ids).build()?;
//!
//! let mut engine = AStarEngine::new(&graph, estimators::unit());
//! let path = engine.compute_best_path(0, 2)?;
//! assert_eq!(path.ids(), vec![0, 4, 2]);
//! # Ok::<(), grid_astar::PathError>(())
//! ```

pub mod algorithms;
pub mod batch;
pub mod config;
pub mod error;
pub mod graph;
pub mod grid;
pub mod statistics;

pub use algorithms::a_star::{AStarEngine, SearchPhase};
pub use algorithms::common::{BestPath, CostEstimators, PathFinder, PathStep};
pub use algorithms::estimators;
pub use algorithms::reference::ReferenceDijkstra;
pub use error::{BatchError, PathError};
pub use graph::{Graph, GridGraphBuilder, Node, NodeId, NodeIndex, WeightMode};
pub use grid::{FillParams, Position, WeightGrid, WEIGHT_INF};
pub use statistics::{BatchSummary, SearchStats};
