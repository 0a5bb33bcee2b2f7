//! Passenger persistence boundary.

use crate::BoxFuture;
use checkin_domain::{Passenger, PassengerId};
use checkin_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};

/// Stores passenger records.
///
/// `save` is an upsert keyed by [`PassengerId`]; new ids are appended so
/// `list` returns records in first-save order.
pub trait PassengerStorePort: Send + Sync {
    /// Insert or replace `passenger`.
    fn save(&self, ctx: &RequestContext, passenger: Passenger) -> BoxFuture<'_, Result<()>>;

    /// All records in first-save order.
    fn list(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<Passenger>>>;

    /// One record, or `None` if unknown.
    fn get(&self, ctx: &RequestContext, id: PassengerId)
    -> BoxFuture<'_, Result<Option<Passenger>>>;
}

/// `passenger:save_failed` wrapping a storage failure.
pub fn persistence_error(message: impl Into<String>, source: &ErrorEnvelope) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("passenger", "save_failed"),
        message,
        ErrorClass::NonRetriable,
    )
    .with_metadata("cause", source.code.to_string())
}
