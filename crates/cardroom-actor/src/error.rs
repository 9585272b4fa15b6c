//! Error types for the request actor.

/// Errors returned to callers at submit time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActorError {
    /// The manager no longer accepts requests (closed or shut down).
    #[error("{0} manager is closed to new requests")]
    Closed(String),
}
