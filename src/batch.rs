use crate::algorithms::a_star::AStarEngine;
use crate::algorithms::common::{BestPath, PathFinder};
use crate::algorithms::reference::ReferenceDijkstra;
use crate::config::Config;
use crate::error::{BatchError, PathError};
use crate::grid::WeightGrid;
use crate::statistics::BatchSummary;
use std::fs::OpenOptions;
use std::io::Write;
use std::time::{Duration, Instant};

const CSV_HEADER: &str = "simulation_id,seed,rows,cols,nodes,found,cost,reference_cost,matches,path_len,expanded,repairs,propagated,search_time_ns";

#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub simulation_id: usize,
    pub seed: u64,
    pub rows: usize,
    pub cols: usize,
    pub nodes: usize,
    pub cost: Option<f64>,
    pub reference_cost: Option<f64>,
    /// Engine and reference agree on reachability and cost.
    pub matches: bool,
    pub path_len: usize,
    pub expanded: usize,
    pub repairs: usize,
    pub propagated: usize,
    pub search_time: Duration,
}

impl BatchResult {
    pub fn found(&self) -> bool {
        self.cost.is_some()
    }

    fn csv_row(&self) -> String {
        let fmt_cost = |c: Option<f64>| c.map(|c| format!("{:.6}", c)).unwrap_or_default();
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            self.simulation_id,
            self.seed,
            self.rows,
            self.cols,
            self.nodes,
            self.found(),
            fmt_cost(self.cost),
            fmt_cost(self.reference_cost),
            self.matches,
            self.path_len,
            self.expanded,
            self.repairs,
            self.propagated,
            self.search_time.as_nanos()
        )
    }
}

/// Runs the engine over many seeded random grids and checks every answer
/// against [`ReferenceDijkstra`].
pub struct BatchRunner {
    config: Config,
    base_seed: u64,
    results: Vec<BatchResult>,
    summary: BatchSummary,
    start_time: Instant,
    batch_size: usize,
    total_results_written: usize,
}

impl BatchRunner {
    pub fn new(config: Config) -> Self {
        let base_seed = config.seed.unwrap_or_else(rand::random);
        BatchRunner {
            config,
            base_seed,
            results: Vec::new(),
            summary: BatchSummary::default(),
            start_time: Instant::now(),
            batch_size: 100,
            total_results_written: 0,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn summary(&self) -> &BatchSummary {
        &self.summary
    }

    /// Results not yet written to CSV. Without an output file this is every run.
    pub fn results(&self) -> &[BatchResult] {
        &self.results
    }

    pub fn run(&mut self) -> Result<&BatchSummary, BatchError> {
        self.start_time = Instant::now();
        if self.config.output_file.is_some() {
            self.initialize_csv_file()?;
        }

        if !self.config.quiet {
            println!("=== BATCH RUN STARTED ===");
            println!("Grid size: {}x{}", self.config.rows, self.config.cols);
            println!("Density: {}", self.config.density);
            println!("Estimators: {:?}", self.config.estimators);
            println!("Searches: {}", self.config.num_simulations);
            println!("Base seed: {}", self.base_seed);
            println!();
        }

        let total = self.config.num_simulations;
        let report_every = (total / 10).max(1);

        for sim_id in 0..total {
            let seed = self.base_seed.wrapping_add(sim_id as u64);
            let result = self.run_one(sim_id, seed)?;

            if !result.matches {
                log::warn!(
                    "run {} (seed {}): engine cost {:?} differs from reference {:?}",
                    sim_id,
                    seed,
                    result.cost,
                    result.reference_cost
                );
            }
            self.record(result);

            if self.config.output_file.is_some() && self.results.len() >= self.batch_size {
                self.flush_results_to_csv()?;
            }
            if (sim_id + 1) % report_every == 0 {
                log::info!(
                    "progress: {}/{} searches in {:.1}s",
                    sim_id + 1,
                    total,
                    self.start_time.elapsed().as_secs_f64()
                );
            }
        }

        if self.config.output_file.is_some() {
            self.flush_results_to_csv()?;
        }

        if !self.config.quiet {
            println!("\n=== BATCH RUN COMPLETED ===");
            println!("Total time: {:.2?}", self.start_time.elapsed());
        }
        Ok(&self.summary)
    }

    fn run_one(&self, simulation_id: usize, seed: u64) -> Result<BatchResult, BatchError> {
        let config = &self.config;
        let grid = WeightGrid::generate(
            config.rows,
            config.cols,
            config.start(),
            config.dest(),
            config.fill_params(),
            Some(seed),
        )?;
        let graph = grid.build_graph(config.weight_mode())?;
        let (start_id, dest_id) = match (grid.start_id(), grid.dest_id()) {
            (Some(start), Some(dest)) => (start, dest),
            _ => {
                return Err(PathError::InvalidGraphInput(
                    "start or destination outside the grid".to_string(),
                )
                .into())
            }
        };

        let estimators = config.estimators.estimators();
        let step_cost = estimators.step_cost;
        let mut engine = AStarEngine::new(&graph, estimators);
        let found = engine.compute_best_path(start_id, dest_id).ok();
        let stats = engine.stats().clone();

        let mut reference = ReferenceDijkstra::new(&graph, step_cost);
        let expected = reference.compute_best_path(start_id, dest_id).ok();

        Ok(BatchResult {
            simulation_id,
            seed,
            rows: config.rows,
            cols: config.cols,
            nodes: graph.len(),
            cost: found.as_ref().map(|p| p.cost),
            reference_cost: expected.as_ref().map(|p| p.cost),
            matches: costs_match(found.as_ref(), expected.as_ref()),
            path_len: found.as_ref().map_or(0, BestPath::len),
            expanded: stats.expanded,
            repairs: stats.repairs,
            propagated: stats.propagated,
            search_time: stats.elapsed,
        })
    }

    fn record(&mut self, result: BatchResult) {
        let summary = &mut self.summary;
        summary.runs += 1;
        if result.found() {
            summary.found += 1;
        } else {
            summary.no_path += 1;
        }
        if !result.matches {
            summary.mismatches += 1;
        }
        summary.total_expanded += result.expanded;
        summary.total_repairs += result.repairs;
        summary.total_time += result.search_time;
        self.results.push(result);
    }

    fn flush_results_to_csv(&mut self) -> Result<(), BatchError> {
        let Some(path) = self.config.output_file.as_deref() else {
            return Ok(());
        };
        if self.results.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        for result in &self.results {
            writeln!(file, "{}", result.csv_row())?;
        }

        self.total_results_written += self.results.len();
        log::debug!(
            "flushed {} results to {} (total: {})",
            self.results.len(),
            path,
            self.total_results_written
        );
        self.results.clear();
        Ok(())
    }

    fn initialize_csv_file(&self) -> Result<(), BatchError> {
        if let Some(path) = self.config.output_file.as_deref() {
            let mut file = std::fs::File::create(path)?;
            writeln!(file, "{}", CSV_HEADER)?;
            log::debug!("initialized CSV file: {}", path);
        }
        Ok(())
    }

    pub fn print_summary(&self) {
        println!("\n=== BATCH SUMMARY ===");
        print!("{}", self.summary);
        if let Some(path) = &self.config.output_file {
            println!("Results saved to: {} ({} rows)", path, self.total_results_written);
        }
    }
}

fn costs_match(found: Option<&BestPath>, expected: Option<&BestPath>) -> bool {
    match (found, expected) {
        (Some(a), Some(b)) => (a.cost - b.cost).abs() <= 1e-9 * b.cost.abs().max(1.0),
        (None, None) => true,
        _ => false,
    }
}
