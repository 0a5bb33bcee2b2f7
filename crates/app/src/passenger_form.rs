//! Check-in form view-model.
//!
//! Owns one passenger record for the lifetime of a form session. Each edit
//! updates the record, re-validates the edited field, and persists the
//! record. Save failures during editing are logged and otherwise ignored;
//! only [`PassengerForm::complete_check_in`] reports them.

use crate::field_store::FieldResultStore;
use crate::username_validator::{
    UsernameValidator, UsernameValidatorDeps, UsernameValidatorSettings,
};
use checkin_domain::{FormField, FormProblem, Passenger, ValidationResult, validate_field};
use checkin_ports::{
    LogFields, LoggerPort, PassengerStorePort, UsernameLookupPort, persistence_error,
};
use checkin_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};

/// Collaborators for a form session.
#[derive(Clone)]
pub struct PassengerFormDeps {
    /// Username directory.
    pub lookup: Arc<dyn UsernameLookupPort>,
    /// Passenger persistence.
    pub store: Arc<dyn PassengerStorePort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// One passenger's check-in form.
///
/// Dropping the form shuts its session down.
pub struct PassengerForm {
    session: RequestContext,
    passenger: Mutex<Passenger>,
    results: FieldResultStore,
    username: UsernameValidator,
    store: Arc<dyn PassengerStorePort>,
    logger: Option<Arc<dyn LoggerPort>>,
}

impl PassengerForm {
    /// Open a form for `passenger` in a new session.
    pub fn new(
        passenger: Passenger,
        deps: PassengerFormDeps,
        settings: UsernameValidatorSettings,
    ) -> Result<Self> {
        let session = RequestContext::new_session();
        let results = FieldResultStore::new();
        let logger = deps.logger.map(|logger| {
            let mut fields = LogFields::new();
            fields.insert(
                "correlationId".into(),
                Value::String(session.correlation_id().as_str().to_owned()),
            );
            fields.insert(
                "passengerId".into(),
                Value::String(passenger.id.as_str().to_owned()),
            );
            Arc::<dyn LoggerPort>::from(logger.child(fields))
        });
        let username = UsernameValidator::new(
            &session,
            UsernameValidatorDeps {
                lookup: deps.lookup,
                results: results.clone(),
                logger: logger.clone(),
            },
            settings,
        )?;

        Ok(Self {
            session,
            passenger: Mutex::new(passenger),
            results,
            username,
            store: deps.store,
            logger,
        })
    }

    /// Session context (correlation id and cancellation).
    #[must_use]
    pub const fn session(&self) -> &RequestContext {
        &self.session
    }

    /// Copy of the current passenger record.
    #[must_use]
    pub fn passenger(&self) -> Passenger {
        self.lock_passenger().clone()
    }

    /// Observable per-field results.
    #[must_use]
    pub const fn results(&self) -> &FieldResultStore {
        &self.results
    }

    /// The username validator for this session.
    #[must_use]
    pub const fn username_validator(&self) -> &UsernameValidator {
        &self.username
    }

    /// Feed a username keystroke to the debounced validator.
    pub fn on_username_changed(&self, value: &str) {
        self.username.submit(value);
    }

    /// Re-validate the stored email.
    pub fn validate_email(&self) {
        self.validate_sync(FormField::Email);
    }

    /// Re-validate the stored full name.
    pub fn validate_name(&self) {
        self.validate_sync(FormField::FullName);
    }

    /// Re-validate the stored seat.
    pub fn validate_seat(&self) {
        self.validate_sync(FormField::Seat);
    }

    /// Persist the current record. Failures are logged, never returned.
    pub async fn save_passenger(&self) {
        if let Err(error) = self.persist().await {
            if error.is_cancelled() {
                return;
            }
            if let Some(logger) = self.logger.as_ref() {
                logger.failure(
                    "form.passenger.saveFailed",
                    "Failed to save passenger",
                    &error,
                    None,
                );
            }
        }
    }

    /// True when all four fields are `Valid` and no username check is
    /// outstanding.
    #[must_use]
    pub fn is_form_valid(&self) -> bool {
        self.results.is_form_valid() && !self.username.is_pending()
    }

    /// Apply a keystroke to `field`: update the record, validate, save.
    pub async fn edit(&self, field: FormField, value: &str) {
        self.lock_passenger().set(field, value);
        match field {
            FormField::FullName => self.validate_name(),
            FormField::Email => self.validate_email(),
            FormField::Seat => self.validate_seat(),
            FormField::Username => self.on_username_changed(value),
        }
        self.save_passenger().await;
    }

    /// Save and return the passenger if every field is `Valid`.
    pub async fn complete_check_in(&self) -> Result<Passenger> {
        let problem = self.results.snapshot().first_problem().or_else(|| {
            self.username.is_pending().then_some(FormProblem::Pending {
                field: FormField::Username,
            })
        });
        if let Some(problem) = problem {
            return Err(form_incomplete(&problem));
        }
        self.persist().await?;

        let passenger = self.passenger();
        if let Some(logger) = self.logger.as_ref() {
            let mut fields = LogFields::new();
            fields.insert("seat".into(), Value::String(passenger.seat.clone()));
            logger.info("checkin.complete", "Check-in completed", Some(fields));
        }
        Ok(passenger)
    }

    /// Cancel the session: pending timers and lookups stop, nothing more is
    /// published.
    pub fn shutdown(&self) {
        self.session.cancel();
    }

    async fn persist(&self) -> Result<()> {
        let snapshot = self.passenger();
        self.store
            .save(&self.session, snapshot)
            .await
            .map_err(|error| {
                if error.is_cancelled() {
                    error
                } else {
                    persistence_error("failed to save passenger", &error)
                }
            })
    }

    fn validate_sync(&self, field: FormField) {
        let value = self.lock_passenger().get(field).to_owned();
        if let Some(result) = validate_field(field, &value) {
            self.results.set(field, result);
        }
    }

    fn lock_passenger(&self) -> std::sync::MutexGuard<'_, Passenger> {
        self.passenger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PassengerForm {
    fn drop(&mut self) {
        self.session.cancel();
    }
}

fn form_incomplete(problem: &FormProblem) -> ErrorEnvelope {
    let (field, reason) = match problem {
        FormProblem::Unvalidated { field } => (*field, "not validated".to_owned()),
        FormProblem::Pending { field } => (*field, "still checking".to_owned()),
        FormProblem::Rejected { field, message } => (*field, message.to_string()),
    };
    ErrorEnvelope::expected(
        ErrorCode::new("form", "form_incomplete"),
        format!("check-in incomplete: {} {reason}", field.label()),
    )
    .with_metadata("field", field.key())
    .with_metadata("reason", reason)
}

/// Result currently shown for `field`, rendered for status lines.
#[must_use]
pub fn describe_result(result: Option<&ValidationResult>) -> String {
    result.map_or_else(|| "-".to_owned(), ToString::to_string)
}
