//! Recent-passengers listing.

use checkin_domain::PassengerSummary;
use checkin_ports::{LogFields, LoggerPort, PassengerStorePort};
use checkin_shared::{RequestContext, Result};
use serde_json::Value;
use std::sync::Arc;

/// Dependencies required by list-passengers.
#[derive(Clone)]
pub struct ListPassengersDeps {
    /// Passenger persistence.
    pub store: Arc<dyn PassengerStorePort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Summaries of every stored passenger, in first-save order.
#[tracing::instrument(
    name = "checkin.passengers",
    skip_all,
    fields(correlation_id = ctx.correlation_id().as_str())
)]
pub async fn list_passengers(
    ctx: &RequestContext,
    deps: &ListPassengersDeps,
) -> Result<Vec<PassengerSummary>> {
    ctx.ensure_not_cancelled("list_passengers")?;
    let passengers = deps.store.list(ctx).await?;
    let summaries: Vec<PassengerSummary> = passengers.iter().map(|p| p.summary()).collect();

    if let Some(logger) = deps.logger.as_ref() {
        let mut fields = LogFields::new();
        fields.insert("count".into(), Value::from(summaries.len()));
        logger.debug("checkin.passengers.listed", "Passengers listed", Some(fields));
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_adapters::InMemoryPassengerStore;
    use checkin_domain::Passenger;

    #[tokio::test]
    async fn lists_summaries_in_save_order() -> Result<()> {
        let store = Arc::new(InMemoryPassengerStore::new());
        let ctx = RequestContext::new_request();
        let mut first = Passenger::new();
        first.full_name = "Jason Newsted".into();
        first.email = "jason@gate.m72".into();
        let second = Passenger::new();
        store.save(&ctx, first.clone()).await?;
        store.save(&ctx, second.clone()).await?;

        let deps = ListPassengersDeps {
            store,
            logger: None,
        };
        let summaries = list_passengers(&ctx, &deps).await?;

        assert_eq!(summaries, vec![first.summary(), second.summary()]);
        assert_eq!(summaries.get(1).map(|s| &*s.display_name), Some("Unnamed"));
        Ok(())
    }
}
