// Allow missing docs in integration test.
#![allow(missing_docs)]

use checkin_adapters::{
    InMemoryPassengerStore, JsonFilePassengerStore, JsonLogger, MemoryLogSink,
    SimulatedUsernameDirectory,
};
use checkin_domain::{FormField, Passenger, PassengerId, UsernameRules};
use checkin_ports::{LoggerPort, PassengerStorePort, UsernameAvailability, UsernameLookupPort};
use checkin_shared::{RequestContext, Result};
use std::sync::Arc;
use std::time::Duration;

async fn exercise_store(store: Arc<dyn PassengerStorePort>) -> Result<()> {
    let ctx = RequestContext::new_request();
    let mut lars = Passenger::new();
    lars.set(FormField::FullName, "Lars Ulrich");
    let mut kirk = Passenger::new();
    kirk.set(FormField::Email, "kirk@gate.m72");

    store.save(&ctx, lars.clone()).await?;
    store.save(&ctx, kirk.clone()).await?;
    lars.set(FormField::Seat, "7D");
    store.save(&ctx, lars.clone()).await?;

    let names: Vec<String> = store
        .list(&ctx)
        .await?
        .iter()
        .map(|passenger| passenger.display_name().to_owned())
        .collect();
    assert_eq!(names, vec!["Lars Ulrich", "Unnamed"]);
    assert_eq!(
        store.get(&ctx, lars.id.clone()).await?.map(|p| p.seat),
        Some("7D".to_owned())
    );
    Ok(())
}

#[tokio::test]
async fn memory_store_honours_the_port_contract() -> Result<()> {
    exercise_store(Arc::new(InMemoryPassengerStore::new())).await
}

#[tokio::test]
async fn json_file_store_honours_the_port_contract() -> Result<()> {
    let path = std::env::temp_dir()
        .join(format!("checkin-contract-{}", PassengerId::generate()))
        .join("passengers.json");
    exercise_store(Arc::new(JsonFilePassengerStore::new(path))).await
}

#[tokio::test(start_paused = true)]
async fn custom_directory_uses_configured_names_and_message() -> Result<()> {
    let rules = UsernameRules::new(["cliff"], "Username taken at Gate B12")
        .map_err(checkin_shared::ErrorEnvelope::from)?;
    let directory: Arc<dyn UsernameLookupPort> = Arc::new(SimulatedUsernameDirectory::new(
        rules,
        Duration::from_millis(20),
    ));
    let ctx = RequestContext::new_request();

    assert_eq!(
        directory.check_username(&ctx, "CLIFF".into()).await?,
        UsernameAvailability::Taken {
            reason: "Username taken at Gate B12".into()
        }
    );
    assert_eq!(
        directory.check_username(&ctx, "lars".into()).await?,
        UsernameAvailability::Available
    );
    Ok(())
}

#[test]
fn json_logger_writes_one_line_per_event() {
    let sink = Arc::new(MemoryLogSink::new());
    let logger: Arc<dyn LoggerPort> = Arc::new(JsonLogger::new(sink.clone()));
    logger.info("checkin.start", "check-in started", None);
    logger.error("form.passenger.saveFailed", "save failed", None);

    let lines = sink.take();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| line.ends_with('\n')));
}
