//! Ready-made cost estimator pairs.
//!
//! All of them read node positions and weights only, so they are pure
//! functions of the two nodes they are given.

use crate::algorithms::common::{CostEstimators, FnEstimators};
use crate::graph::Node;
use std::f64::consts::SQRT_2;

type CostFn = fn(&Node, &Node) -> f64;

/// Integer approximation of `sqrt(x² + y²)`, within about 3.5%.
pub fn fast_distance(x: i64, y: i64) -> i64 {
    let x = x.abs();
    let y = y.abs();
    let mn = x.min(y);
    x + y - (mn >> 1) - (mn >> 2) + (mn >> 4)
}

fn deltas(a: &Node, b: &Node) -> (i64, i64) {
    let (pa, pb) = (a.position(), b.position());
    (
        pb.x as i64 - pa.x as i64,
        pb.y as i64 - pa.y as i64,
    )
}

fn is_diagonal(a: &Node, b: &Node) -> bool {
    let (dx, dy) = deltas(a, b);
    dx != 0 && dy != 0
}

fn mean_weight(a: &Node, b: &Node) -> f64 {
    0.5 * (a.weight() + b.weight())
}

/// Fast distance scaled by the mean of the two endpoint weights.
///
/// The small constant keeps the estimate positive between zero-weight nodes.
/// Not admissible in general: cheaper cells between the endpoints are not
/// accounted for.
pub fn weighted_heuristic(a: &Node, b: &Node) -> f64 {
    let (dx, dy) = deltas(a, b);
    fast_distance(dx, dy) as f64 * (mean_weight(a, b) + 0.01)
}

/// Twice the mean weight for an orthogonal move, three times for a diagonal one.
pub fn weighted_step_cost(a: &Node, b: &Node) -> f64 {
    let avg = mean_weight(a, b);
    if is_diagonal(a, b) {
        3.0 * avg
    } else {
        2.0 * avg
    }
}

/// Octile distance. Admissible for [`octile_step_cost`] as long as every
/// weight is at least 1.
pub fn octile_heuristic(a: &Node, b: &Node) -> f64 {
    let (dx, dy) = deltas(a, b);
    let (dx, dy) = (dx.abs() as f64, dy.abs() as f64);
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    (hi - lo) + SQRT_2 * lo
}

/// Mean weight times the Euclidean length of the move.
pub fn octile_step_cost(a: &Node, b: &Node) -> f64 {
    let len = if is_diagonal(a, b) { SQRT_2 } else { 1.0 };
    mean_weight(a, b) * len
}

/// Chebyshev distance; exact for [`unit_step_cost`] on an open grid.
pub fn unit_heuristic(a: &Node, b: &Node) -> f64 {
    let (dx, dy) = deltas(a, b);
    dx.abs().max(dy.abs()) as f64
}

pub fn unit_step_cost(_a: &Node, _b: &Node) -> f64 {
    1.0
}

/// The pair used by the interactive demo.
pub fn weighted() -> FnEstimators {
    CostEstimators {
        heuristic: weighted_heuristic as CostFn,
        step_cost: weighted_step_cost as CostFn,
    }
}

pub fn octile() -> FnEstimators {
    CostEstimators {
        heuristic: octile_heuristic as CostFn,
        step_cost: octile_step_cost as CostFn,
    }
}

pub fn unit() -> FnEstimators {
    CostEstimators {
        heuristic: unit_heuristic as CostFn,
        step_cost: unit_step_cost as CostFn,
    }
}
