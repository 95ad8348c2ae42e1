use crate::graph::NodeId;

/// Errors surfaced by graph construction and path search.
///
/// Both variants are terminal for the call that produced them only; a graph
/// or engine that returned one stays usable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    /// The weight/id grids handed to the builder were malformed.
    ///
    /// No partial graph is produced.
    #[error("invalid graph input: {0}")]
    InvalidGraphInput(String),

    /// The open set was exhausted before reaching the destination, or one of
    /// the requested ids is not a node of the graph.
    #[error("no path found from node {start} to node {dest}")]
    NoPathFound { start: NodeId, dest: NodeId },
}

/// Errors from a batch run.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to write batch results: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Path(#[from] PathError),
}
