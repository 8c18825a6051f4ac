//! Error types for graph loading, validation and fitting

use thiserror::Error;

/// Errors raised by the graph engine
#[derive(Error, Debug)]
pub enum GraphError {
    /// Incoming graph data is inconsistent (unknown endpoint, unknown status, duplicate id)
    #[error("validation error: {0}")]
    Validation(String),

    /// A viewport fit was requested for a graph with no nodes
    #[error("cannot fit an empty graph")]
    EmptyGraph,

    /// An I/O error occurred while reading graph data or config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML could not be parsed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_prefixed() {
        let err = GraphError::validation("link references unknown node 'x'");
        assert_eq!(
            err.to_string(),
            "validation error: link references unknown node 'x'"
        );
    }

    #[test]
    fn empty_graph_message() {
        assert_eq!(GraphError::EmptyGraph.to_string(), "cannot fit an empty graph");
    }
}
