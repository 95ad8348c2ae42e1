//! Cost repair after a cheaper route reaches an already closed node.

use grid_astar::{
    AStarEngine, CostEstimators, Graph, GridGraphBuilder, Node, NodeId, PathFinder, ReferenceDijkstra,
    SearchPhase,
};

/// Symmetric step costs keyed by id pairs; every other edge is expensive.
fn table_cost(table: &'static [((NodeId, NodeId), f64)]) -> impl Fn(&Node, &Node) -> f64 + Copy {
    move |a: &Node, b: &Node| {
        let key = (a.id().min(b.id()), a.id().max(b.id()));
        table
            .iter()
            .find(|(pair, _)| *pair == key)
            .map_or(100.0, |&(_, cost)| cost)
    }
}

fn two_row_graph(cols: usize) -> Graph {
    let weights = vec![vec![1; cols]; 2];
    let ids: Vec<Vec<NodeId>> = (0..2)
        .map(|y| (0..cols).map(|x| (y * cols + x) as NodeId).collect())
        .collect();
    GridGraphBuilder::new(&weights, &ids).build().unwrap()
}

#[test]
fn repair_flows_through_closed_descendants() {
    // 0 1 2 3
    // 4 5 6 7
    //
    // 1 and 2 are closed through the direct edge 0-1 (cost 5). Node 4 carries
    // an accurate heuristic, so it is expanded only afterwards and offers 1 a
    // route of cost 3. The saving must reach 2 (closed) and then 3 (open).
    const TABLE: &[((NodeId, NodeId), f64)] = &[
        ((0, 1), 5.0),
        ((0, 4), 2.0),
        ((1, 4), 1.0),
        ((1, 2), 1.0),
        ((2, 3), 10.0),
    ];
    let graph = two_row_graph(4);
    let step = table_cost(TABLE);
    let heuristic = |a: &Node, _: &Node| if a.id() == 4 { 12.0 } else { 0.0 };

    let mut engine = AStarEngine::new(&graph, CostEstimators::new(heuristic, step));
    let path = engine.compute_best_path(0, 3).unwrap();

    assert_eq!(path.ids(), vec![0, 4, 1, 2, 3]);
    assert_eq!(path.cost, 14.0);
    assert_eq!(engine.phase(), SearchPhase::Succeeded);
    assert_eq!(engine.stats().repairs, 1);
    // 2, 6, 3 and 7 are all rewired by the repair of 1.
    assert_eq!(engine.stats().propagated, 4);
    assert_eq!(engine.best_path(), Some(&path));

    let mut reference = ReferenceDijkstra::new(&graph, step);
    assert_eq!(reference.compute_best_path(0, 3).unwrap().cost, 14.0);
}

#[test]
fn repair_without_descendants_only_touches_the_repaired_node() {
    // 0 1 2
    // 3 4 5
    const TABLE: &[((NodeId, NodeId), f64)] = &[
        ((0, 1), 5.0),
        ((0, 3), 2.0),
        ((1, 3), 1.0),
        ((1, 2), 10.0),
    ];
    let graph = two_row_graph(3);
    let step = table_cost(TABLE);
    let heuristic = |a: &Node, _: &Node| if a.id() == 3 { 11.0 } else { 0.0 };

    let mut engine = AStarEngine::new(&graph, CostEstimators::new(heuristic, step));
    let path = engine.compute_best_path(0, 2).unwrap();
    assert_eq!(path.ids(), vec![0, 3, 1, 2]);
    assert_eq!(path.cost, 13.0);
    assert_eq!(engine.stats().repairs, 1);
}

#[test]
fn consistent_heuristic_never_repairs() {
    let graph = two_row_graph(6);
    let step = |_: &Node, _: &Node| 1.0;
    let heuristic = |a: &Node, b: &Node| {
        let (p, q) = (a.position(), b.position());
        p.x.abs_diff(q.x).max(p.y.abs_diff(q.y)) as f64
    };
    let mut engine = AStarEngine::new(&graph, CostEstimators::new(heuristic, step));
    let path = engine.compute_best_path(0, 11).unwrap();
    assert_eq!(path.cost, 5.0);
    assert_eq!(engine.stats().repairs, 0);
    assert_eq!(engine.stats().propagated, 0);
}

#[test]
fn engine_is_reusable_after_failure() {
    let graph = two_row_graph(3);
    let step = |_: &Node, _: &Node| 1.0;
    let zero = |_: &Node, _: &Node| 0.0;
    let mut engine = AStarEngine::new(&graph, CostEstimators::new(zero, step));

    assert!(engine.compute_best_path(0, 42).is_err());
    assert_eq!(engine.phase(), SearchPhase::Failed);
    assert!(engine.best_path().is_none());

    let finder: &mut dyn PathFinder = &mut engine;
    assert_eq!(finder.compute_best_path(0, 5).unwrap().cost, 2.0);
    assert_eq!(engine.phase(), SearchPhase::Succeeded);
}
