//! # Test Doubles
//!
//! In-memory stand-ins for the external collaborators, so the registry and the
//! dispatch service can be exercised without a routing service or a database.
//!
//! [`MockRouteResolver`] works on expectations: queue up the answers, run the
//! code under test, then call [`verify`](MockRouteResolver::verify) to check
//! that every expected request was made.
//!
//! ```ignore
//! let resolver = MockRouteResolver::new();
//! resolver.expect_resolve("Depot", "Home").return_ok(route);
//! resolver.expect_resolve("Depot", "Nowhere").return_err(RouteError::Unresolvable("Nowhere".into()));
//!
//! // ... ship two orders ...
//! resolver.verify();
//! ```

use crate::dispatch::{OrderStatus, OrderStore, Route, RouteError, RouteResolver, StoreError};
use crate::eta::DeliveryEstimate;
use crate::model::OrderId;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

struct Expectation {
    from: String,
    to: String,
    response: Result<Route, RouteError>,
}

/// A route resolver that replays queued answers in order.
#[derive(Clone, Default)]
pub struct MockRouteResolver {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl MockRouteResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `resolve(from, to)` call.
    pub fn expect_resolve(&self, from: &str, to: &str) -> ResolveExpectationBuilder {
        ResolveExpectationBuilder {
            from: from.to_string(),
            to: to.to_string(),
            expectations: self.expectations.clone(),
        }
    }

    /// Panics if some expectations were never consumed.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

#[async_trait]
impl RouteResolver for MockRouteResolver {
    async fn resolve(&self, from: &str, to: &str) -> Result<Route, RouteError> {
        let expectation = self.expectations.lock().unwrap().pop_front();
        match expectation {
            Some(exp) if exp.from == from && exp.to == to => exp.response,
            Some(exp) => panic!(
                "Unexpected resolve({from}, {to}); expected resolve({}, {})",
                exp.from, exp.to
            ),
            None => panic!("Unexpected resolve({from}, {to}); no expectations left"),
        }
    }
}

/// Builder for `resolve` expectations.
pub struct ResolveExpectationBuilder {
    from: String,
    to: String,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ResolveExpectationBuilder {
    pub fn return_ok(self, route: Route) {
        self.push(Ok(route));
    }

    pub fn return_err(self, error: RouteError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Route, RouteError>) {
        self.expectations.lock().unwrap().push_back(Expectation {
            from: self.from,
            to: self.to,
            response,
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub status: OrderStatus,
    pub estimate: Option<DeliveryEstimate>,
    pub delivered_at: Option<SystemTime>,
}

/// Order store kept in a map. Orders must be registered before they ship.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<Mutex<HashMap<OrderId, OrderRecord>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_pending(&self, order_id: impl Into<OrderId>) {
        self.orders.lock().unwrap().insert(
            order_id.into(),
            OrderRecord {
                status: OrderStatus::Pending,
                estimate: None,
                delivered_at: None,
            },
        );
    }

    pub fn get(&self, order_id: &OrderId) -> Option<OrderRecord> {
        self.orders.lock().unwrap().get(order_id).cloned()
    }

    fn update(
        &self,
        order_id: &OrderId,
        apply: impl FnOnce(&mut OrderRecord),
    ) -> Result<(), StoreError> {
        let mut orders = self.orders.lock().unwrap();
        let record = orders
            .get_mut(order_id)
            .ok_or_else(|| StoreError::NotFound(order_id.clone()))?;
        apply(record);
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn mark_shipped(&self, order_id: &OrderId, estimate: DeliveryEstimate) -> Result<(), StoreError> {
        self.update(order_id, |record| {
            record.status = OrderStatus::Shipped;
            record.estimate = Some(estimate);
        })
    }

    async fn mark_delivered(&self, order_id: &OrderId, delivered_at: SystemTime) -> Result<(), StoreError> {
        self.update(order_id, |record| {
            if record.status != OrderStatus::Delivered {
                record.status = OrderStatus::Delivered;
                record.delivered_at = Some(delivered_at);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Waypoint;

    #[tokio::test]
    async fn test_mark_delivered_is_idempotent() {
        let store = InMemoryOrderStore::new();
        store.insert_pending("1");
        let first = SystemTime::UNIX_EPOCH;
        let second = first + std::time::Duration::from_secs(60);

        store.mark_delivered(&"1".into(), first).await.unwrap();
        store.mark_delivered(&"1".into(), second).await.unwrap();

        let record = store.get(&"1".into()).unwrap();
        assert_eq!(record.status, OrderStatus::Delivered);
        assert_eq!(record.delivered_at, Some(first));
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let store = InMemoryOrderStore::new();
        let result = store.mark_delivered(&"nope".into(), SystemTime::UNIX_EPOCH).await;
        assert_eq!(result, Err(StoreError::NotFound("nope".into())));
    }

    #[tokio::test]
    #[should_panic(expected = "Not all expectations were met")]
    async fn test_verify_reports_unused_expectations() {
        let resolver = MockRouteResolver::new();
        let point = Waypoint::new(0.0, 0.0);
        resolver.expect_resolve("a", "b").return_ok(Route {
            origin: point,
            dest: point,
            points: vec![point],
        });
        resolver.verify();
    }
}
