//! Start a check-in: create and persist an empty passenger record.

use checkin_domain::Passenger;
use checkin_ports::{LogFields, LoggerPort, PassengerStorePort, persistence_error};
use checkin_shared::{RequestContext, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Dependencies required by start-check-in.
#[derive(Clone)]
pub struct StartCheckInDeps {
    /// Passenger persistence.
    pub store: Arc<dyn PassengerStorePort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Insert a fresh passenger with every field blank and return it.
#[tracing::instrument(
    name = "checkin.start",
    skip_all,
    fields(correlation_id = ctx.correlation_id().as_str())
)]
pub async fn start_check_in(ctx: &RequestContext, deps: &StartCheckInDeps) -> Result<Passenger> {
    let started_at = Instant::now();
    let passenger = Passenger::new();

    let result: Result<()> = async {
        ctx.ensure_not_cancelled("start_check_in.save")?;
        deps.store
            .save(ctx, passenger.clone())
            .await
            .map_err(|error| {
                if error.is_cancelled() {
                    error
                } else {
                    persistence_error("failed to create passenger", &error)
                }
            })
    }
    .await;

    match result {
        Ok(()) => {
            if let Some(logger) = deps.logger.as_ref() {
                logger.info(
                    "checkin.start",
                    "Check-in started",
                    Some(log_fields(&passenger, started_at)),
                );
            }
            Ok(passenger)
        },
        Err(error) => {
            if let Some(logger) = deps.logger.as_ref() {
                if error.is_cancelled() {
                    logger.info(
                        "checkin.start.aborted",
                        "Check-in start aborted",
                        Some(log_fields(&passenger, started_at)),
                    );
                } else {
                    logger.failure(
                        "checkin.start.failed",
                        "Check-in start failed",
                        &error,
                        Some(log_fields(&passenger, started_at)),
                    );
                }
            }
            Err(error)
        },
    }
}

fn log_fields(passenger: &Passenger, started_at: Instant) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "passengerId".into(),
        Value::String(passenger.id.as_str().to_owned()),
    );
    let duration_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
    fields.insert("durationMs".into(), Value::Number(duration_ms.into()));
    fields
}
