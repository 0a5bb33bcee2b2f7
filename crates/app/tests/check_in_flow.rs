//! End-to-end check-in flow against the in-process adapters.

use checkin_adapters::{InMemoryPassengerStore, JsonLogger, MemoryLogSink, SimulatedUsernameDirectory};
use checkin_app::{
    ListPassengersDeps, PassengerForm, PassengerFormDeps, StartCheckInDeps,
    UsernameValidatorSettings, list_passengers, start_check_in,
};
use checkin_domain::{FormField, ValidationResult};
use checkin_ports::LoggerPort;
use checkin_shared::{RequestContext, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep};

#[tokio::test(start_paused = true)]
async fn passenger_checks_in_after_fixing_a_taken_username() -> Result<()> {
    let store = Arc::new(InMemoryPassengerStore::new());
    let sink = Arc::new(MemoryLogSink::new());
    let logger: Arc<dyn LoggerPort> = Arc::new(JsonLogger::new(sink.clone()));
    let ctx = RequestContext::new_request();

    let passenger = start_check_in(
        &ctx,
        &StartCheckInDeps {
            store: store.clone(),
            logger: Some(Arc::clone(&logger)),
        },
    )
    .await?;

    let form = PassengerForm::new(
        passenger,
        PassengerFormDeps {
            lookup: Arc::new(SimulatedUsernameDirectory::default()),
            store: store.clone(),
            logger: Some(logger),
        },
        UsernameValidatorSettings::default(),
    )?;

    form.edit(FormField::FullName, "Kirk Hammett").await;
    form.edit(FormField::Email, "kirk@gate.m72").await;
    form.edit(FormField::Seat, "4A").await;
    for prefix in ["K", "Ki", "Kir", "Kirk"] {
        form.edit(FormField::Username, prefix).await;
        sleep(Duration::from_millis(100)).await;
    }

    let mut changes = form.results().subscribe();
    let started = Instant::now();
    changes.changed().await.ok();
    assert_eq!(
        changes.borrow_and_update().get(FormField::Username),
        Some(&ValidationResult::Checking)
    );
    changes.changed().await.ok();
    assert_eq!(
        changes.borrow_and_update().get(FormField::Username),
        Some(&ValidationResult::invalid("Username taken at Gate M72"))
    );
    assert_eq!(started.elapsed(), Duration::from_millis(800));
    assert!(!form.is_form_valid());

    form.edit(FormField::Username, "kirk_h").await;
    sleep(Duration::from_secs(1)).await;
    assert!(form.is_form_valid());

    let checked_in = form.complete_check_in().await?;
    assert_eq!(checked_in.username, "kirk_h");

    let summaries = list_passengers(
        &ctx,
        &ListPassengersDeps {
            store,
            logger: None,
        },
    )
    .await?;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries.first().map(|s| &*s.display_name), Some("Kirk Hammett"));

    let lines = sink.take();
    assert!(lines.iter().any(|line| line.contains("\"checkin.start\"")));
    assert!(lines.iter().any(|line| line.contains("\"checkin.complete\"")));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn dropping_the_form_cancels_pending_checks() -> Result<()> {
    let store = Arc::new(InMemoryPassengerStore::new());
    let form = PassengerForm::new(
        checkin_domain::Passenger::new(),
        PassengerFormDeps {
            lookup: Arc::new(SimulatedUsernameDirectory::default()),
            store,
            logger: None,
        },
        UsernameValidatorSettings::default(),
    )?;
    let session = form.session().clone();
    let results = form.results().clone();

    form.edit(FormField::Username, "cliff").await;
    sleep(Duration::from_millis(450)).await;
    assert_eq!(results.get(FormField::Username), Some(ValidationResult::Checking));

    drop(form);
    sleep(Duration::from_secs(1)).await;

    assert!(session.is_cancelled());
    assert_eq!(results.get(FormField::Username), Some(ValidationResult::Checking));
    Ok(())
}
