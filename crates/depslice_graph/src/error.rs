use thiserror::Error;

/// Failures the graph builder reports to its caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// None of the requested seeds names an existing file.
    #[error("no seed files resolved (requested: {})", requested.join(", "))]
    EmptySeedSet { requested: Vec<String> },
}
