use clap::Parser;

use grid_astar::algorithms::a_star::AStarEngine;
use grid_astar::algorithms::common::PathFinder;
use grid_astar::algorithms::reference::ReferenceDijkstra;
use grid_astar::batch::BatchRunner;
use grid_astar::config::Config;
use grid_astar::error::PathError;
use grid_astar::grid::WeightGrid;

fn main() {
    let config = Config::parse();

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    if config.batch_mode {
        let mut batch = BatchRunner::new(config.clone());
        match batch.run().map(|_| ()) {
            Ok(()) => {
                if !config.quiet {
                    batch.print_summary();
                }
            }
            Err(e) => {
                eprintln!("Batch run failed: {}", e);
                std::process::exit(1);
            }
        }
    } else if let Err(e) = run_single(&config) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_single(config: &Config) -> Result<(), PathError> {
    let grid = WeightGrid::generate(
        config.rows,
        config.cols,
        config.start(),
        config.dest(),
        config.fill_params(),
        config.seed,
    )?;
    let graph = grid.build_graph(config.weight_mode())?;

    if !config.quiet {
        println!("Grid size: {}x{}", grid.rows, grid.cols);
        println!("Passable nodes: {}", graph.len());
        println!("Start: {:?}, Goal: {:?}", grid.start, grid.dest);
        println!("Estimators: {:?}", config.estimators);
        println!();
    }

    let (start_id, dest_id) = match (grid.start_id(), grid.dest_id()) {
        (Some(start), Some(dest)) => (start, dest),
        _ => {
            return Err(PathError::InvalidGraphInput(
                "start or destination outside the grid".to_string(),
            ))
        }
    };

    let estimators = config.estimators.estimators();
    let step_cost = estimators.step_cost;
    let mut engine = AStarEngine::new(&graph, estimators);
    let result = engine.compute_best_path(start_id, dest_id);

    if !config.no_visualization {
        grid.print_grid(result.as_ref().ok());
    }

    match &result {
        Ok(path) => {
            println!("=== RESULT ===");
            println!("Cost: {:.3}", path.cost);
            println!("Path length: {} nodes", path.len());
        }
        Err(e) => println!("{}", e),
    }
    if !config.quiet {
        println!("\n=== SEARCH STATISTICS ===");
        print!("{}", engine.stats());
    }

    if config.verify {
        let mut reference = ReferenceDijkstra::new(&graph, step_cost);
        let expected = reference.compute_best_path(start_id, dest_id);
        println!("\n=== VERIFICATION ({}) ===", reference.name());
        match (&result, &expected) {
            (Ok(found), Ok(best)) => {
                println!("Reference cost: {:.3}", best.cost);
                if (found.cost - best.cost).abs() <= 1e-9 * best.cost.max(1.0) {
                    println!("✓ A* cost is optimal");
                } else {
                    println!(
                        "⚠ A* cost exceeds the optimum by {:.3} (heuristic is not admissible)",
                        found.cost - best.cost
                    );
                }
            }
            (Err(_), Err(_)) => println!("✓ Reference search agrees: no path"),
            _ => println!("⚠ Reference search disagrees on reachability"),
        }
    }

    Ok(())
}
