use serde::Serialize;

/// Hard failures: the request is rejected and no layout is produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("node `{id}` is declared more than once")]
    DuplicateNodeId { id: String },
    #[error("link {from} -> {to} has invalid value {value} (must be positive and finite)")]
    InvalidValue { from: String, to: String, value: f64 },
    #[error("graph contains a cycle through: {}", nodes.join(", "))]
    CycleDetected { nodes: Vec<String> },
}

/// Soft conditions reported alongside a successful layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayoutWarning {
    /// The densest column could not fit its padding; padding was dropped to 0.
    #[serde(rename_all = "camelCase")]
    InsufficientHeight {
        requested_padding: f64,
        available_height: f64,
    },
}

impl std::fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutWarning::InsufficientHeight {
                requested_padding,
                available_height,
            } => write!(
                f,
                "not enough height ({available_height}px) for node padding {requested_padding}px; padding set to 0"
            ),
        }
    }
}
