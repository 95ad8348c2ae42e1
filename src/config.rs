use crate::algorithms::common::FnEstimators;
use crate::algorithms::estimators;
use crate::graph::WeightMode;
use crate::grid::{FillParams, Position};
use clap::{Parser, ValueEnum};

/// Which cost estimator pair to search with.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatorKind {
    /// Fast-distance heuristic with weight-averaged 2/3 step costs.
    Weighted,
    /// Admissible octile heuristic with Euclidean step lengths.
    Octile,
    /// Every move costs 1.
    Unit,
}

impl EstimatorKind {
    pub fn estimators(self) -> FnEstimators {
        match self {
            EstimatorKind::Weighted => estimators::weighted(),
            EstimatorKind::Octile => estimators::octile(),
            EstimatorKind::Unit => estimators::unit(),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 30)]
    pub rows: usize,

    #[arg(long, default_value_t = 30)]
    pub cols: usize,

    /// Probability that a cell away from start/destination is passable.
    #[arg(long, default_value_t = 0.55)]
    pub density: f64,

    /// Cells within this distance of start/destination are always passable.
    #[arg(long, default_value_t = 5)]
    pub clear_radius: i64,

    /// Passable weights are drawn from 1..=max-weight.
    #[arg(long, default_value_t = 1)]
    pub max_weight: i32,

    /// Treat every passable cell as weight 1.
    #[arg(long, default_value_t = false)]
    pub unweighted: bool,

    #[arg(long, value_enum, default_value_t = EstimatorKind::Weighted)]
    pub estimators: EstimatorKind,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub start_x: Option<usize>,

    #[arg(long)]
    pub start_y: Option<usize>,

    #[arg(long)]
    pub dest_x: Option<usize>,

    #[arg(long)]
    pub dest_y: Option<usize>,

    /// Cross-check the result against a plain Dijkstra search.
    #[arg(long, default_value_t = false)]
    pub verify: bool,

    #[arg(long, default_value_t = false)]
    pub batch_mode: bool,

    #[arg(long, default_value_t = 100)]
    pub num_simulations: usize,

    /// CSV file for per-run batch results.
    #[arg(long)]
    pub output_file: Option<String>,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,

    #[arg(long, default_value_t = false)]
    pub no_visualization: bool,
}

impl Config {
    pub fn fill_params(&self) -> FillParams {
        FillParams {
            density: self.density,
            clear_radius: self.clear_radius,
            max_weight: self.max_weight,
        }
    }

    pub fn weight_mode(&self) -> WeightMode {
        if self.unweighted {
            WeightMode::Unweighted
        } else {
            WeightMode::Weighted
        }
    }

    /// Start cell; defaults to two cells in from the top-left corner.
    pub fn start(&self) -> Position {
        Position {
            x: self.start_x.unwrap_or_else(|| self.cols.saturating_sub(1).min(2)),
            y: self.start_y.unwrap_or_else(|| self.rows.saturating_sub(1).min(2)),
        }
    }

    /// Destination cell; defaults to three cells in from the bottom-right corner.
    pub fn dest(&self) -> Position {
        Position {
            x: self.dest_x.unwrap_or_else(|| self.cols.saturating_sub(3)),
            y: self.dest_y.unwrap_or_else(|| self.rows.saturating_sub(3)),
        }
    }
}
