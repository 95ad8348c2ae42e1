use crate::algorithms::common::{BestPath, CostEstimators, PathFinder, PathStep};
use crate::error::PathError;
use crate::graph::{Graph, Node, NodeId, NodeIndex};
use crate::statistics::SearchStats;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

/// Where the engine is in its current (or last) search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Initialized,
    Searching,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Membership {
    Unseen,
    Open,
    Closed,
}

/// Per-search scratch state of one graph node.
#[derive(Debug, Clone)]
struct SearchNode {
    g: f64,
    h: f64,
    f: f64,
    parent: Option<NodeIndex>,
    /// Neighbors this node was expanded against, in expansion order.
    successors: Vec<NodeIndex>,
    membership: Membership,
    /// Sequence number of this node's live open-set entry.
    stamp: u64,
}

impl SearchNode {
    fn new() -> Self {
        SearchNode {
            g: f64::INFINITY,
            h: 0.0,
            f: f64::INFINITY,
            parent: None,
            successors: Vec::new(),
            membership: Membership::Unseen,
            stamp: 0,
        }
    }

    fn reset(&mut self) {
        self.g = f64::INFINITY;
        self.h = 0.0;
        self.f = f64::INFINITY;
        self.parent = None;
        self.successors.clear();
        self.membership = Membership::Unseen;
        self.stamp = 0;
    }

    fn set_g(&mut self, g: f64, parent: NodeIndex) {
        self.g = g;
        self.f = g + self.h;
        self.parent = Some(parent);
    }
}

/// Open-set entry. Ordered so that `BinaryHeap` pops the lowest `f` first,
/// and among equal `f` the entry keyed earliest.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f64,
    seq: u64,
    node: NodeIndex,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed comparison to make BinaryHeap a min-heap
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Best-first search over a borrowed [`Graph`] with incremental cost repair.
///
/// When a cheaper route reaches a node that is already closed, the node is
/// not reopened. Instead the improvement is pushed depth-first through the
/// successors the node (and its descendants) were expanded against.
///
/// Scratch state lives in the engine, so several engines can search the
/// same graph at once. A single engine runs one search at a time.
pub struct AStarEngine<'g, H, S> {
    graph: &'g Graph,
    estimators: CostEstimators<H, S>,
    scratch: Vec<SearchNode>,
    open: BinaryHeap<OpenEntry>,
    open_len: usize,
    next_seq: u64,
    repair_stack: Vec<NodeIndex>,
    phase: SearchPhase,
    stats: SearchStats,
    best_path: Option<BestPath>,
}

impl<'g, H, S> AStarEngine<'g, H, S>
where
    H: Fn(&Node, &Node) -> f64,
    S: Fn(&Node, &Node) -> f64,
{
    pub fn new(graph: &'g Graph, estimators: CostEstimators<H, S>) -> Self {
        AStarEngine {
            graph,
            estimators,
            scratch: vec![SearchNode::new(); graph.len()],
            open: BinaryHeap::new(),
            open_len: 0,
            next_seq: 0,
            repair_stack: Vec::new(),
            phase: SearchPhase::Initialized,
            stats: SearchStats::default(),
            best_path: None,
        }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Counters from the most recent search.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Path found by the most recent search, `None` if it failed.
    pub fn best_path(&self) -> Option<&BestPath> {
        self.best_path.as_ref()
    }

    pub fn set_heuristic(&mut self, heuristic: H) {
        self.estimators.heuristic = heuristic;
    }

    pub fn set_step_cost(&mut self, step_cost: S) {
        self.estimators.step_cost = step_cost;
    }

    /// Finds the cheapest path from `start_id` to `dest_id`.
    ///
    /// # Errors
    /// [`PathError::NoPathFound`] if either id is not in the graph or the
    /// destination is unreachable. No partial path is returned.
    pub fn compute_best_path(&mut self, start_id: NodeId, dest_id: NodeId) -> Result<BestPath, PathError> {
        self.reset();
        let started = Instant::now();
        let graph = self.graph;

        let (start, dest) = match (graph.index_of(start_id), graph.index_of(dest_id)) {
            (Some(start), Some(dest)) => (start, dest),
            _ => {
                log::debug!("search {} -> {}: endpoint not in graph", start_id, dest_id);
                self.phase = SearchPhase::Failed;
                return Err(PathError::NoPathFound {
                    start: start_id,
                    dest: dest_id,
                });
            }
        };

        self.phase = SearchPhase::Searching;
        log::debug!("search {} -> {} over {} nodes", start_id, dest_id, graph.len());

        let dest_node = graph.node(dest);
        let h = (self.estimators.heuristic)(graph.node(start), dest_node);
        let root = &mut self.scratch[start];
        root.g = 0.0;
        root.h = h;
        root.f = h;
        self.push_open(start);

        while let Some(best) = self.pop_best() {
            self.stats.expanded += 1;
            log::trace!(
                "expand node {} (g = {}, f = {})",
                graph.node(best).id(),
                self.scratch[best].g,
                self.scratch[best].f
            );

            if best == dest {
                let path = self.build_path(dest);
                self.stats.elapsed = started.elapsed();
                self.phase = SearchPhase::Succeeded;
                log::debug!(
                    "search {} -> {} succeeded: cost {}, {} nodes, {} expanded, {} repairs",
                    start_id,
                    dest_id,
                    path.cost,
                    path.len(),
                    self.stats.expanded,
                    self.stats.repairs
                );
                self.best_path = Some(path.clone());
                return Ok(path);
            }

            self.expand(best, dest_node);
        }

        self.stats.elapsed = started.elapsed();
        self.phase = SearchPhase::Failed;
        log::debug!(
            "search {} -> {} failed after {} expansions",
            start_id,
            dest_id,
            self.stats.expanded
        );
        Err(PathError::NoPathFound {
            start: start_id,
            dest: dest_id,
        })
    }

    /// Clears every trace of the previous search.
    fn reset(&mut self) {
        if self.scratch.len() != self.graph.len() {
            self.scratch = vec![SearchNode::new(); self.graph.len()];
        } else {
            self.scratch.iter_mut().for_each(SearchNode::reset);
        }
        self.open.clear();
        self.open_len = 0;
        self.next_seq = 0;
        self.repair_stack.clear();
        self.stats = SearchStats::default();
        self.best_path = None;
        self.phase = SearchPhase::Initialized;
    }

    fn expand(&mut self, best: NodeIndex, dest_node: &Node) {
        let graph = self.graph;
        let node = graph.node(best);
        let best_g = self.scratch[best].g;

        for &succ in node.neighbors() {
            let succ_node = graph.node(succ);
            let new_cost = best_g + (self.estimators.step_cost)(node, succ_node);
            self.stats.relaxations += 1;

            let successors = &mut self.scratch[best].successors;
            if !successors.contains(&succ) {
                successors.push(succ);
            }

            let state = &mut self.scratch[succ];
            match state.membership {
                Membership::Open => {
                    if new_cost < state.g {
                        state.set_g(new_cost, best);
                        self.push_open(succ);
                    }
                }
                Membership::Closed => {
                    if new_cost < state.g {
                        log::debug!(
                            "repair closed node {}: {} -> {} via {}",
                            succ_node.id(),
                            state.g,
                            new_cost,
                            node.id()
                        );
                        state.set_g(new_cost, best);
                        self.stats.repairs += 1;
                        self.propagate(succ);
                    }
                }
                Membership::Unseen => {
                    state.h = (self.estimators.heuristic)(succ_node, dest_node);
                    state.set_g(new_cost, best);
                    self.push_open(succ);
                }
            }
        }
    }

    /// Pushes the improved cost of `root` through the successor caches,
    /// depth first on an explicit stack.
    ///
    /// A cached successor is updated when the node being drained is its
    /// parent, or when the route through that node is now strictly cheaper.
    /// Adjacency is never re-derived, so the work is bounded by the already
    /// expanded descendants.
    fn propagate(&mut self, root: NodeIndex) {
        let graph = self.graph;
        let mut stack = std::mem::take(&mut self.repair_stack);
        stack.push(root);

        while let Some(parent) = stack.pop() {
            let parent_node = graph.node(parent);
            let parent_g = self.scratch[parent].g;

            for i in 0..self.scratch[parent].successors.len() {
                let succ = self.scratch[parent].successors[i];
                let new_cost = parent_g + (self.estimators.step_cost)(parent_node, graph.node(succ));

                let state = &mut self.scratch[succ];
                let owned = state.parent == Some(parent);
                if new_cost < state.g || (owned && new_cost != state.g) {
                    state.set_g(new_cost, parent);
                    let reopen = state.membership == Membership::Open;
                    self.stats.propagated += 1;
                    if reopen {
                        self.push_open(succ);
                    }
                    stack.push(succ);
                }
            }
        }

        self.repair_stack = stack;
    }

    /// Inserts `index` into the open set, or re-keys it if already there.
    fn push_open(&mut self, index: NodeIndex) {
        let seq = self.next_seq;
        self.next_seq += 1;

        let state = &mut self.scratch[index];
        state.stamp = seq;
        if state.membership != Membership::Open {
            state.membership = Membership::Open;
            self.open_len += 1;
        }
        self.open.push(OpenEntry {
            f: state.f,
            seq,
            node: index,
        });
        self.stats.peak_open = self.stats.peak_open.max(self.open_len);
    }

    /// Removes the lowest-`f` open node and closes it. Stale heap entries
    /// left behind by re-keying are skipped.
    fn pop_best(&mut self) -> Option<NodeIndex> {
        while let Some(entry) = self.open.pop() {
            let state = &mut self.scratch[entry.node];
            if state.membership != Membership::Open || state.stamp != entry.seq {
                continue;
            }
            state.membership = Membership::Closed;
            self.open_len -= 1;
            return Some(entry.node);
        }
        None
    }

    /// Walks parent links back from `dest` and returns the path start-first.
    fn build_path(&self, dest: NodeIndex) -> BestPath {
        let mut steps = Vec::new();
        let mut current = Some(dest);
        while let Some(index) = current {
            if steps.len() > self.scratch.len() {
                // Only reachable when cost functions break the positivity contract.
                log::warn!("parent chain from node {} does not terminate", self.graph.node(dest).id());
                break;
            }
            steps.push(PathStep::from(self.graph.node(index)));
            current = self.scratch[index].parent;
        }
        steps.reverse();

        BestPath {
            cost: self.scratch[dest].g,
            steps,
        }
    }
}

impl<H, S> PathFinder for AStarEngine<'_, H, S>
where
    H: Fn(&Node, &Node) -> f64,
    S: Fn(&Node, &Node) -> f64,
{
    fn compute_best_path(&mut self, start_id: NodeId, dest_id: NodeId) -> Result<BestPath, PathError> {
        AStarEngine::compute_best_path(self, start_id, dest_id)
    }

    fn name(&self) -> &'static str {
        "a_star"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::estimators;
    use crate::graph::GridGraphBuilder;
    use crate::grid::WEIGHT_INF;

    const X: i32 = WEIGHT_INF;

    fn row_major_ids(rows: usize, cols: usize) -> Vec<Vec<NodeId>> {
        (0..rows)
            .map(|y| (0..cols).map(|x| (y * cols + x) as NodeId).collect())
            .collect()
    }

    fn graph_of(weights: &[Vec<i32>]) -> Graph {
        let ids = row_major_ids(weights.len(), weights[0].len());
        GridGraphBuilder::new(weights, &ids).build().unwrap()
    }

    #[test]
    fn single_cell_grid() {
        let graph = graph_of(&[vec![1]]);
        let mut engine = AStarEngine::new(&graph, estimators::weighted());
        let path = engine.compute_best_path(0, 0).unwrap();
        assert_eq!(path.cost, 0.0);
        assert_eq!(path.ids(), vec![0]);
        assert_eq!(engine.phase(), SearchPhase::Succeeded);
        assert_eq!(engine.stats().expanded, 1);
    }

    #[test]
    fn start_equals_destination_in_larger_grid() {
        let graph = graph_of(&vec![vec![1; 4]; 4]);
        let mut engine = AStarEngine::new(&graph, estimators::unit());
        let path = engine.compute_best_path(5, 5).unwrap();
        assert_eq!(path.cost, 0.0);
        assert_eq!(path.ids(), vec![5]);
    }

    #[test]
    fn straight_line_cost() {
        let graph = graph_of(&[vec![1, 1, 1, 1]]);
        let mut engine = AStarEngine::new(&graph, estimators::weighted());
        let path = engine.compute_best_path(0, 3).unwrap();
        assert_eq!(path.ids(), vec![0, 1, 2, 3]);
        assert_eq!(path.cost, 6.0);
        assert_eq!(path.steps[2].weight, 1.0);
    }

    #[test]
    fn enclosed_destination_has_no_path() {
        let weights = vec![
            vec![1, 1, 1, 1, 1],
            vec![1, X, X, X, 1],
            vec![1, X, 1, X, 1],
            vec![1, X, X, X, 1],
            vec![1, 1, 1, 1, 1],
        ];
        let graph = graph_of(&weights);
        let mut engine = AStarEngine::new(&graph, estimators::weighted());
        let err = engine.compute_best_path(0, 12).unwrap_err();
        assert_eq!(err, PathError::NoPathFound { start: 0, dest: 12 });
        assert_eq!(engine.phase(), SearchPhase::Failed);
        assert!(engine.best_path().is_none());
    }

    #[test]
    fn unknown_ids_fail_immediately() {
        let graph = graph_of(&[vec![1, X]]);
        let mut engine = AStarEngine::new(&graph, estimators::unit());
        assert!(engine.compute_best_path(0, 1).is_err());
        assert!(engine.compute_best_path(99, 0).is_err());
        assert_eq!(engine.stats().expanded, 0);
    }

    #[test]
    fn blocked_cells_are_routed_around() {
        let weights = vec![vec![1, X, 1], vec![1, X, 1], vec![1, 1, 1]];
        let graph = graph_of(&weights);
        let mut engine = AStarEngine::new(&graph, estimators::unit());
        let path = engine.compute_best_path(0, 2).unwrap();
        assert!(!path.ids().contains(&1));
        assert!(!path.ids().contains(&4));
        // 0 -> 3 -> 7 -> 5 -> 2
        assert_eq!(path.cost, 4.0);
        assert_eq!(path.ids(), vec![0, 3, 7, 5, 2]);
    }

    #[test]
    fn equal_cost_ties_go_to_the_earliest_keyed_node() {
        // Two optimal routes 0 -> 1 -> 2 and 0 -> 4 -> 2; the east neighbor
        // is keyed before the south-east one.
        let graph = graph_of(&vec![vec![1; 3]; 2]);
        let zero = |_: &Node, _: &Node| 0.0;
        let mut engine = AStarEngine::new(&graph, CostEstimators::new(zero, estimators::unit_step_cost));
        let path = engine.compute_best_path(0, 2).unwrap();
        assert_eq!(path.cost, 2.0);
        assert_eq!(path.ids(), vec![0, 1, 2]);
    }

    #[test]
    fn closed_node_repair_propagates_to_descendants() {
        // 0 1 2      start 0, destination 2
        // 3 4 5
        //
        // Node 1 is closed first with cost 5 (direct edge). Node 3 is expanded
        // later and reaches 1 for 2 + 1 = 3, which must flow on to 2.
        let graph = graph_of(&vec![vec![1; 3]; 2]);
        let step = |a: &Node, b: &Node| {
            let (lo, hi) = if a.id() < b.id() { (a.id(), b.id()) } else { (b.id(), a.id()) };
            match (lo, hi) {
                (0, 1) => 5.0,
                (0, 3) => 2.0,
                (1, 3) => 1.0,
                (1, 2) => 10.0,
                _ => 100.0,
            }
        };
        let heuristic = |a: &Node, _: &Node| if a.id() == 3 { 11.0 } else { 0.0 };

        let mut engine = AStarEngine::new(&graph, CostEstimators::new(heuristic, step));
        let path = engine.compute_best_path(0, 2).unwrap();
        assert_eq!(path.ids(), vec![0, 3, 1, 2]);
        assert_eq!(path.cost, 13.0);
        assert_eq!(engine.stats().repairs, 1);
        assert!(engine.stats().propagated >= 1);
    }

    #[test]
    fn repeated_searches_are_identical() {
        let weights = vec![
            vec![1, 3, 1, 1, 2],
            vec![2, X, 4, X, 1],
            vec![1, 1, 1, 2, 1],
            vec![X, 2, X, 1, 3],
        ];
        let graph = graph_of(&weights);
        let mut engine = AStarEngine::new(&graph, estimators::weighted());
        let first = engine.compute_best_path(0, 19).unwrap();
        let first_stats = engine.stats().clone();
        for _ in 0..3 {
            let again = engine.compute_best_path(0, 19).unwrap();
            assert_eq!(again, first);
            assert_eq!(engine.stats().expanded, first_stats.expanded);
        }
    }

    #[test]
    fn no_state_leaks_between_searches() {
        let weights = vec![vec![1, 2, 1, 1], vec![1, X, 3, 1], vec![2, 1, 1, 1]];
        let graph = graph_of(&weights);

        let mut reused = AStarEngine::new(&graph, estimators::weighted());
        reused.compute_best_path(0, 11).unwrap();
        assert!(reused.compute_best_path(0, 5).is_err());
        let after = reused.compute_best_path(8, 3).unwrap();

        let mut fresh = AStarEngine::new(&graph, estimators::weighted());
        assert_eq!(after, fresh.compute_best_path(8, 3).unwrap());
        assert_eq!(reused.stats().expanded, fresh.stats().expanded);
        assert_eq!(reused.best_path(), Some(&after));
    }

    #[test]
    fn estimators_can_be_swapped() {
        let graph = graph_of(&[vec![1, 1, 1]]);
        let mut engine = AStarEngine::new(&graph, estimators::unit());
        assert_eq!(engine.compute_best_path(0, 2).unwrap().cost, 2.0);

        engine.set_step_cost(estimators::octile_step_cost);
        assert_eq!(engine.compute_best_path(0, 2).unwrap().cost, 2.0);
        engine.set_step_cost(estimators::weighted_step_cost);
        assert_eq!(engine.compute_best_path(0, 2).unwrap().cost, 4.0);
        engine.set_heuristic(estimators::weighted_heuristic);
        assert_eq!(engine.compute_best_path(0, 2).unwrap().cost, 4.0);
    }

    #[test]
    fn engines_share_a_graph_across_threads() {
        let weights = vec![vec![1; 12]; 12];
        let graph = graph_of(&weights);

        let costs: Vec<f64> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let graph = &graph;
                    scope.spawn(move || {
                        let mut engine = AStarEngine::new(graph, estimators::octile());
                        engine.compute_best_path(i, 143).unwrap().cost
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        // From (i, 0) to (11, 11): 11 - i diagonal moves plus i straight ones.
        for (i, cost) in costs.iter().enumerate() {
            let expected = (11 - i) as f64 * std::f64::consts::SQRT_2 + i as f64;
            assert!((cost - expected).abs() < 1e-9, "start {}: {} != {}", i, cost, expected);
        }
    }
}
