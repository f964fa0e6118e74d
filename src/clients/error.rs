//! Errors raised by the client handles themselves.

/// The registry task could not be reached.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("Registry closed")]
    ActorClosed,
    #[error("Registry dropped response channel")]
    ActorDropped,
}
