use crate::error::PathError;
use crate::graph::{Node, NodeId};
use crate::grid::Position;

/// One node of a returned path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStep {
    pub id: NodeId,
    pub weight: f64,
    pub position: Position,
}

impl From<&Node> for PathStep {
    fn from(node: &Node) -> Self {
        PathStep {
            id: node.id(),
            weight: node.weight(),
            position: node.position(),
        }
    }
}

/// A minimum-cost route: total cost plus the nodes from start to destination,
/// both included.
#[derive(Debug, Clone, PartialEq)]
pub struct BestPath {
    pub cost: f64,
    pub steps: Vec<PathStep>,
}

impl BestPath {
    pub fn ids(&self) -> Vec<NodeId> {
        self.steps.iter().map(|step| step.id).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// The two caller-supplied cost functions.
///
/// `heuristic` estimates the cost between any two nodes and only seeds `h`;
/// it is not checked for admissibility, so an overestimating heuristic
/// silently loses optimality. `step_cost` is the exact cost of moving between
/// two adjacent nodes. Both should be pure functions of the nodes' public
/// attributes and return a strictly positive value for distinct nodes.
#[derive(Clone, Copy)]
pub struct CostEstimators<H, S> {
    pub heuristic: H,
    pub step_cost: S,
}

impl<H, S> CostEstimators<H, S>
where
    H: Fn(&Node, &Node) -> f64,
    S: Fn(&Node, &Node) -> f64,
{
    pub fn new(heuristic: H, step_cost: S) -> Self {
        CostEstimators {
            heuristic,
            step_cost,
        }
    }
}

/// Estimator pair built from plain function pointers, as returned by the
/// presets in [`estimators`](crate::algorithms::estimators).
pub type FnEstimators = CostEstimators<fn(&Node, &Node) -> f64, fn(&Node, &Node) -> f64>;

pub trait PathFinder {
    /// Finds the cheapest path between two node ids.
    fn compute_best_path(&mut self, start_id: NodeId, dest_id: NodeId) -> Result<BestPath, PathError>;

    /// Short name used in reports.
    fn name(&self) -> &'static str;
}
