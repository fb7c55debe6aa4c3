//! Rejection reasons for graph mutations.
//!
//! Every mutating operation of the editor returns `Result<_, FlowError>`.
//! Rejections are also logged at `warn` level by the operation that produced
//! them, so hosts that ignore the result still see why nothing happened.

/// Reasons why an editor operation was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    #[error("node {0} not found")]
    NodeNotFound(String),
    #[error("port {port} not found on node {node}")]
    PortNotFound { node: String, port: String },
    #[error("connection {0} not found")]
    ConnectionNotFound(String),
    #[error("panel {0} not found")]
    PanelNotFound(String),
    #[error("layout {0} not found")]
    LayoutNotFound(String),
    #[error("cannot connect node {0} to itself")]
    SameNode(String),
    #[error("connection {source_node}.{source_port} -> {target_node}.{target_port} already exists")]
    DuplicateConnection {
        source_node: String,
        source_port: String,
        target_node: String,
        target_port: String,
    },
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("invalid flow data: {0}")]
    InvalidFlowData(String),
    #[error("invalid editor options: {0}")]
    InvalidOptions(String),
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::InvalidFlowData(err.to_string())
    }
}
