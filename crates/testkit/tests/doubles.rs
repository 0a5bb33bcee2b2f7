//! Behaviour of the test doubles themselves.

use checkin_ports::{
    LogFields, LoggerPort, PassengerStorePort, UsernameAvailability, UsernameLookupPort,
};
use checkin_shared::{ErrorCode, RequestContext, Result};
use checkin_testkit::errors::{lookup_timeout_error, store_io_error};
use checkin_testkit::{
    CountingUsernameLookup, FailingPassengerStore, FailingUsernameLookup, NoopLogger,
    RecordingLogger,
};
use serde_json::{Value, json};
use std::time::Duration;

fn fields(pairs: &[(&str, Value)]) -> LogFields {
    pairs
        .iter()
        .map(|(key, value)| (Box::from(*key), value.clone()))
        .collect()
}

#[test]
fn recording_logger_merges_child_fields() {
    let logger = RecordingLogger::new();
    let child = logger.child(fields(&[("correlationId", json!("form_1"))]));
    child.info(
        "form.username.settled",
        "settled",
        Some(fields(&[("generation", json!(2))])),
    );
    logger.debug("form.username.duplicate", "dropped", None);

    assert_eq!(
        logger.event_names(),
        ["form.username.settled", "form.username.duplicate"]
    );
    let settled = logger.find("form.username.settled").expect("settled event");
    let fields = settled.fields.expect("fields");
    assert_eq!(fields.get("correlationId"), Some(&json!("form_1")));
    assert_eq!(fields.get("generation"), Some(&json!(2)));
}

#[test]
fn noop_logger_accepts_everything() {
    let logger = NoopLogger;
    logger.child(LogFields::new()).error("x", "y", None);
}

#[tokio::test(start_paused = true)]
async fn counting_lookup_tracks_completed_and_cancelled_calls() -> Result<()> {
    let lookup = CountingUsernameLookup::new(Duration::from_millis(500));
    let ctx = RequestContext::new_request();
    assert_eq!(
        lookup.check_username(&ctx, "Kirk".into()).await?,
        UsernameAvailability::Taken {
            reason: "Username taken at Gate M72".into()
        }
    );

    let cancelled = ctx.child();
    cancelled.cancel();
    let outcome = lookup.check_username(&cancelled, "alice".into()).await;
    assert!(outcome.is_err_and(|error| error.is_cancelled()));

    assert_eq!(lookup.usernames(), ["Kirk", "alice"]);
    assert_eq!(lookup.completed(), 1);
    assert_eq!(lookup.cancelled(), 1);
    Ok(())
}

#[tokio::test]
async fn failing_lookup_recovers_after_its_budget() -> Result<()> {
    let lookup = FailingUsernameLookup::failing_first(2, lookup_timeout_error());
    let ctx = RequestContext::new_request();

    for _ in 0..2 {
        let error = lookup.check_username(&ctx, "alice".into()).await.err();
        assert_eq!(error.map(|error| error.code), Some(ErrorCode::timeout()));
    }
    assert_eq!(
        lookup.check_username(&ctx, "alice".into()).await?,
        UsernameAvailability::Available
    );
    assert_eq!(lookup.attempts(), 3);
    Ok(())
}

#[tokio::test]
async fn failing_store_rejects_saves() {
    let store = FailingPassengerStore::default();
    let ctx = RequestContext::new_request();
    let error = store
        .save(&ctx, checkin_domain::Passenger::new())
        .await
        .err();

    assert_eq!(error.map(|error| error.code), Some(store_io_error().code));
    assert_eq!(store.save_attempts(), 1);
}
