//! Passenger store doubles.

use crate::errors::store_io_error;
use checkin_domain::{Passenger, PassengerId};
use checkin_ports::{BoxFuture, PassengerStorePort};
use checkin_shared::{ErrorEnvelope, RequestContext, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Store whose writes always fail; reads see an empty store.
#[derive(Debug)]
pub struct FailingPassengerStore {
    error: ErrorEnvelope,
    save_attempts: AtomicUsize,
}

impl Default for FailingPassengerStore {
    fn default() -> Self {
        Self::new(store_io_error())
    }
}

impl FailingPassengerStore {
    pub fn new(error: ErrorEnvelope) -> Self {
        Self {
            error,
            save_attempts: AtomicUsize::new(0),
        }
    }

    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }
}

impl PassengerStorePort for FailingPassengerStore {
    fn save(&self, _ctx: &RequestContext, _passenger: Passenger) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.save_attempts.fetch_add(1, Ordering::SeqCst);
            Err(self.error.clone())
        })
    }

    fn list(&self, _ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<Passenger>>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn get(
        &self,
        _ctx: &RequestContext,
        _id: PassengerId,
    ) -> BoxFuture<'_, Result<Option<Passenger>>> {
        Box::pin(async { Ok(None) })
    }
}
