//! Contracts of the services the tracking core depends on but does not own.

use super::{RouteError, StoreError};
use crate::eta::DeliveryEstimate;
use crate::model::{OrderId, Waypoint};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// A planned route between two addresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub origin: Waypoint,
    pub dest: Waypoint,
    pub points: Vec<Waypoint>,
}

/// Turns two addresses into an ordered waypoint list (geocoding + path planning).
#[async_trait]
pub trait RouteResolver: Send + Sync + 'static {
    async fn resolve(&self, from: &str, to: &str) -> Result<Route, RouteError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
}

/// Durable order bookkeeping. The tracking core itself persists nothing.
#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    async fn mark_shipped(&self, order_id: &OrderId, estimate: DeliveryEstimate) -> Result<(), StoreError>;

    /// Records the terminal status. Must tolerate being called twice.
    async fn mark_delivered(&self, order_id: &OrderId, delivered_at: SystemTime) -> Result<(), StoreError>;
}
