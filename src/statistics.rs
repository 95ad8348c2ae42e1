use std::fmt;
use std::time::Duration;

/// Counters collected during a single search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    /// Nodes moved from open to closed.
    pub expanded: usize,
    /// Neighbor edges evaluated during expansion.
    pub relaxations: usize,
    /// Closed nodes whose cost improved after they were finalized.
    pub repairs: usize,
    /// Nodes updated by cost-repair propagation.
    pub propagated: usize,
    pub peak_open: usize,
    pub elapsed: Duration,
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nodes expanded: {}", self.expanded)?;
        writeln!(f, "Edges relaxed: {}", self.relaxations)?;
        writeln!(f, "Closed-node repairs: {}", self.repairs)?;
        writeln!(f, "Propagated updates: {}", self.propagated)?;
        writeln!(f, "Peak open set size: {}", self.peak_open)?;
        writeln!(f, "Search time: {:.2?}", self.elapsed)?;
        Ok(())
    }
}

/// Aggregate of a batch of searches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub runs: usize,
    pub found: usize,
    pub no_path: usize,
    /// Runs where the engine and the reference search disagreed.
    pub mismatches: usize,
    pub total_expanded: usize,
    pub total_repairs: usize,
    pub total_time: Duration,
}

impl BatchSummary {
    pub fn average_expanded(&self) -> f64 {
        if self.runs > 0 {
            self.total_expanded as f64 / self.runs as f64
        } else {
            0.0
        }
    }

    pub fn average_time(&self) -> Duration {
        if self.runs > 0 {
            self.total_time / self.runs as u32
        } else {
            Duration::ZERO
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let found_percentage = if self.runs > 0 {
            (self.found as f64 / self.runs as f64) * 100.0
        } else {
            0.0
        };

        writeln!(f, "Searches run: {}", self.runs)?;
        writeln!(f, "Paths found: {} ({:.1}%)", self.found, found_percentage)?;
        writeln!(f, "No path: {}", self.no_path)?;
        writeln!(f, "Average nodes expanded: {:.1}", self.average_expanded())?;
        writeln!(f, "Total closed-node repairs: {}", self.total_repairs)?;
        writeln!(f, "Average search time: {:.2?}", self.average_time())?;

        if self.mismatches == 0 {
            writeln!(f, "✓ All costs matched the reference search")?;
        } else {
            writeln!(f, "⚠ {} searches disagreed with the reference search", self.mismatches)?;
        }
        Ok(())
    }
}
