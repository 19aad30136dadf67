use depslice_graph::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SliceError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("unknown resource profile '{0}'")]
    UnknownProfile(String),

    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

impl SliceError {
    pub fn is_empty_seed_set(&self) -> bool {
        matches!(self, SliceError::Graph(GraphError::EmptySeedSet { .. }))
    }
}
