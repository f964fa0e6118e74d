//! Error types for dispatching orders and their collaborators.

use crate::clients::ClientError;
use crate::model::OrderId;
use thiserror::Error;

/// Failures reported by a [`RouteResolver`](super::RouteResolver).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RouteError {
    /// An address could not be geocoded.
    #[error("Unresolvable address: {0}")]
    Unresolvable(String),

    /// Both addresses resolved but no path connects them.
    #[error("No path from {from} to {to}")]
    NoPath { from: String, to: String },

    /// The routing service itself failed.
    #[error("Route service error: {0}")]
    Service(String),
}

/// Failures reported by an [`OrderStore`](super::OrderStore).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    #[error("Order store error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Client(#[from] ClientError),
}
