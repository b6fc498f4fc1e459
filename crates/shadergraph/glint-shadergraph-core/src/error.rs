use thiserror::Error;

/// Errors surfaced by the port registry and the emission paths.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A port was rejected at the add seam; the registry was not mutated.
    #[error("invalid port {id}: {reason}")]
    InvalidPort { id: i32, reason: &'static str },

    /// An id issued by a collaborator no longer matches the registry. This
    /// signals desynchronization and must not be swallowed.
    #[error("port {id} not found in the materialized registry")]
    PortNotFound { id: i32 },

    /// Failure reported by the external value-resolution collaborator.
    #[error(transparent)]
    Resolve(#[from] anyhow::Error),
}
