//! Process-local passenger store.

use checkin_domain::{Passenger, PassengerId};
use checkin_ports::{BoxFuture, PassengerStorePort};
use checkin_shared::{RequestContext, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Passenger records kept in memory, in first-save order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPassengerStore {
    records: Arc<RwLock<Vec<Passenger>>>,
}

impl InMemoryPassengerStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

pub(super) fn upsert(records: &mut Vec<Passenger>, passenger: Passenger) {
    match records.iter_mut().find(|record| record.id == passenger.id) {
        Some(existing) => *existing = passenger,
        None => records.push(passenger),
    }
}

impl PassengerStorePort for InMemoryPassengerStore {
    fn save(&self, ctx: &RequestContext, passenger: Passenger) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("passenger.save")?;
            upsert(&mut *self.records.write().await, passenger);
            Ok(())
        })
    }

    fn list(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<Passenger>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("passenger.list")?;
            Ok(self.records.read().await.clone())
        })
    }

    fn get(
        &self,
        ctx: &RequestContext,
        id: PassengerId,
    ) -> BoxFuture<'_, Result<Option<Passenger>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("passenger.get")?;
            let records = self.records.read().await;
            Ok(records.iter().find(|record| record.id == id).cloned())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_domain::FormField;

    #[tokio::test]
    async fn save_is_an_upsert_preserving_order() -> Result<()> {
        let store = InMemoryPassengerStore::new();
        let ctx = RequestContext::new_request();
        let mut first = Passenger::new();
        let second = Passenger::new();

        store.save(&ctx, first.clone()).await?;
        store.save(&ctx, second.clone()).await?;
        first.set(FormField::Seat, "3C");
        store.save(&ctx, first.clone()).await?;

        let listed = store.list(&ctx).await?;
        assert_eq!(listed, vec![first.clone(), second]);
        assert_eq!(store.get(&ctx, first.id.clone()).await?, Some(first));
        assert_eq!(store.get(&ctx, PassengerId::generate()).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn cancelled_context_is_rejected() {
        let store = InMemoryPassengerStore::new();
        let ctx = RequestContext::new_request();
        ctx.cancel();
        let result = store.save(&ctx, Passenger::new()).await;
        assert!(result.is_err_and(|error| error.is_cancelled()));
    }
}
