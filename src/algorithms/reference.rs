use crate::algorithms::common::{BestPath, PathFinder, PathStep};
use crate::error::PathError;
use crate::graph::{Graph, Node, NodeId, NodeIndex};
use ordered_float::OrderedFloat;
use pathfinding::prelude::dijkstra;

/// Exhaustive Dijkstra search using the `pathfinding` crate.
///
/// Ignores any heuristic, so its cost is always the true minimum. Used to
/// cross-check [`AStarEngine`](crate::algorithms::a_star::AStarEngine).
pub struct ReferenceDijkstra<'g, S> {
    graph: &'g Graph,
    step_cost: S,
}

impl<'g, S> ReferenceDijkstra<'g, S>
where
    S: Fn(&Node, &Node) -> f64,
{
    pub fn new(graph: &'g Graph, step_cost: S) -> Self {
        ReferenceDijkstra { graph, step_cost }
    }
}

impl<S> PathFinder for ReferenceDijkstra<'_, S>
where
    S: Fn(&Node, &Node) -> f64,
{
    fn compute_best_path(&mut self, start_id: NodeId, dest_id: NodeId) -> Result<BestPath, PathError> {
        let no_path = PathError::NoPathFound {
            start: start_id,
            dest: dest_id,
        };
        let graph = self.graph;
        let (start, dest) = match (graph.index_of(start_id), graph.index_of(dest_id)) {
            (Some(start), Some(dest)) => (start, dest),
            _ => return Err(no_path),
        };

        let step_cost = &self.step_cost;
        let result = dijkstra(
            &start,
            |&index: &NodeIndex| {
                let node = graph.node(index);
                node.neighbors()
                    .iter()
                    .map(|&next| (next, OrderedFloat(step_cost(node, graph.node(next)))))
                    .collect::<Vec<_>>()
            },
            |&index| index == dest,
        );

        let (indices, cost) = result.ok_or(no_path)?;
        Ok(BestPath {
            cost: cost.into_inner(),
            steps: indices
                .into_iter()
                .map(|index| PathStep::from(graph.node(index)))
                .collect(),
        })
    }

    fn name(&self) -> &'static str {
        "dijkstra"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::estimators;
    use crate::graph::GridGraphBuilder;
    use crate::grid::WEIGHT_INF;

    #[test]
    fn finds_cheapest_route_around_heavy_cells() {
        let weights = vec![vec![1, 9, 1], vec![1, 1, 1]];
        let ids = vec![vec![0, 1, 2], vec![3, 4, 5]];
        let graph = GridGraphBuilder::new(&weights, &ids).build().unwrap();
        let mut reference = ReferenceDijkstra::new(&graph, estimators::weighted_step_cost);
        let path = reference.compute_best_path(0, 2).unwrap();
        // 0 -SE-> 4 -NE-> 2, two diagonal moves at weight 1.
        assert_eq!(path.ids(), vec![0, 4, 2]);
        assert_eq!(path.cost, 6.0);
    }

    #[test]
    fn unreachable_and_unknown_ids() {
        let weights = vec![vec![1, WEIGHT_INF, 1]];
        let ids = vec![vec![0, 1, 2]];
        let graph = GridGraphBuilder::new(&weights, &ids).build().unwrap();
        let mut reference = ReferenceDijkstra::new(&graph, estimators::unit_step_cost);
        assert_eq!(
            reference.compute_best_path(0, 2),
            Err(PathError::NoPathFound { start: 0, dest: 2 })
        );
        assert!(reference.compute_best_path(0, 1).is_err());
        assert_eq!(reference.compute_best_path(2, 2).unwrap().cost, 0.0);
    }
}
