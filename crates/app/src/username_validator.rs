//! Debounced, last-settled-wins username availability check.
//!
//! Every keystroke goes through [`UsernameValidator::submit`]:
//!
//! 1. a value equal to the previously accepted one is dropped;
//! 2. otherwise the pending debounce timer (if any) is cancelled and a new
//!    one is started for this value under a fresh generation number;
//! 3. when the timer elapses the field is marked `Checking` and the lookup
//!    runs (with per-attempt timeout and retry);
//! 4. the verdict is published only if no newer value was submitted in the
//!    meantime.
//!
//! A newer submit does not abort an in-flight lookup; the generation check
//! makes its result inert. Shutting the session down cancels both timers and
//! lookups, and nothing is published afterwards.

use crate::field_store::FieldResultStore;
use checkin_domain::{FormField, ValidationResult};
use checkin_ports::{LogFields, LoggerPort, UsernameAvailability, UsernameLookupPort};
use checkin_shared::{
    ErrorCode, ErrorEnvelope, RequestContext, Result, RetryPolicy, retry_async_with_observer,
    timeout_with_context,
};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Published when a lookup still fails after every retry.
pub const LOOKUP_FAILED_MESSAGE: &str = "lookup failed";

const LOOKUP_OPERATION: &str = "username.lookup";

/// Timing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsernameValidatorSettings {
    /// Quiet period before a value is looked up.
    pub debounce: Duration,
    /// Deadline for each lookup attempt.
    pub lookup_timeout: Duration,
    /// Retry policy across attempts.
    pub retry: RetryPolicy,
}

impl Default for UsernameValidatorSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(400),
            lookup_timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
        }
    }
}

/// Collaborators.
#[derive(Clone)]
pub struct UsernameValidatorDeps {
    /// Directory answering availability.
    pub lookup: Arc<dyn UsernameLookupPort>,
    /// Where results are published.
    pub results: FieldResultStore,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

#[derive(Debug, Default)]
struct SubmitState {
    last_accepted: Option<Box<str>>,
    generation: u64,
    pending_timer: Option<RequestContext>,
}

struct Shared {
    session: RequestContext,
    lookup: Arc<dyn UsernameLookupPort>,
    results: FieldResultStore,
    logger: Option<Arc<dyn LoggerPort>>,
    settings: UsernameValidatorSettings,
    state: Mutex<SubmitState>,
    finished: watch::Sender<u64>,
}

/// Debounced username validator bound to one form session.
///
/// Cloning yields another handle to the same validator.
#[derive(Clone)]
pub struct UsernameValidator {
    shared: Arc<Shared>,
    runtime: Handle,
}

impl UsernameValidator {
    /// Validator for the form session `session`.
    ///
    /// Must be called from within a Tokio runtime; timers and lookups are
    /// spawned onto it.
    pub fn new(
        session: &RequestContext,
        deps: UsernameValidatorDeps,
        settings: UsernameValidatorSettings,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|error| {
            ErrorEnvelope::invariant(
                ErrorCode::new("username", "no_runtime"),
                format!("username validator needs a Tokio runtime: {error}"),
            )
        })?;
        let logger = deps.logger.map(|logger| {
            let child = logger.child(session_fields(session));
            Arc::<dyn LoggerPort>::from(child)
        });

        Ok(Self {
            shared: Arc::new(Shared {
                session: session.clone(),
                lookup: deps.lookup,
                results: deps.results,
                logger,
                settings,
                state: Mutex::new(SubmitState::default()),
                finished: watch::channel(0).0,
            }),
            runtime,
        })
    }

    /// Feed the latest field value. Returns immediately.
    pub fn submit(&self, value: &str) {
        let shared = &self.shared;
        let (generation, timer) = {
            let mut state = shared.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.last_accepted.as_deref() == Some(value) {
                drop(state);
                shared.debug("form.username.duplicate", "Duplicate username ignored", value, None);
                return;
            }

            state.last_accepted = Some(value.into());
            if let Some(previous) = state.pending_timer.take() {
                previous.cancel();
            }
            state.generation = state.generation.saturating_add(1);
            let timer = shared.session.child();
            state.pending_timer = Some(timer.clone());
            (state.generation, timer)
        };

        shared.debug(
            "form.username.submitted",
            "Username submitted",
            value,
            Some(generation),
        );
        let shared = Arc::clone(shared);
        let username: Box<str> = value.into();
        self.runtime.spawn(async move {
            Arc::clone(&shared).settle(generation, username, timer).await;
            shared.mark_finished(generation);
        });
    }

    /// Generation of the most recently accepted value; `0` before any.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// True while the most recently accepted value has not been fully
    /// handled yet. The published result may still belong to an older value.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        let target = self.generation();
        *self.shared.finished.borrow() < target
    }

    /// Wait until the most recently accepted value has been fully handled:
    /// its result published, discarded, or abandoned on shutdown.
    ///
    /// Returns immediately when nothing was ever submitted.
    pub async fn settled(&self) {
        let mut finished = self.shared.finished.subscribe();
        loop {
            let target = self.generation();
            if finished.wait_for(|done| *done >= target).await.is_err() {
                return;
            }
            if self.generation() == target {
                return;
            }
        }
    }

    /// Current published result.
    #[must_use]
    pub fn current(&self) -> Option<ValidationResult> {
        self.shared.results.get(FormField::Username)
    }

    /// Settings in use.
    #[must_use]
    pub fn settings(&self) -> UsernameValidatorSettings {
        self.shared.settings
    }
}

impl Shared {
    async fn settle(self: Arc<Self>, generation: u64, username: Box<str>, timer: RequestContext) {
        tokio::select! {
            () = timer.cancelled() => return,
            () = tokio::time::sleep(self.settings.debounce) => {},
        }

        if !self.publish_if_current(generation, ValidationResult::Checking) {
            return;
        }
        self.debug(
            "form.username.settled",
            "Username settled, checking availability",
            &username,
            Some(generation),
        );

        let lookup_ctx = self.session.child();
        let verdict = match self.check_with_retry(&lookup_ctx, &username).await {
            Ok(availability) => availability.into_validation(),
            Err(_) if lookup_ctx.is_cancelled() => return,
            Err(error) => {
                if let Some(logger) = self.logger.as_ref() {
                    logger.failure(
                        "form.username.lookupFailed",
                        "Username lookup failed",
                        &error,
                        Some(username_fields(&username, Some(generation))),
                    );
                }
                ValidationResult::invalid(LOOKUP_FAILED_MESSAGE)
            },
        };

        let mut fields = username_fields(&username, Some(generation));
        fields.insert("status".into(), Value::from(verdict.status()));
        if self.publish_if_current(generation, verdict) {
            if let Some(logger) = self.logger.as_ref() {
                logger.info(
                    "form.username.published",
                    "Username result published",
                    Some(fields),
                );
            }
        } else if let Some(logger) = self.logger.as_ref() {
            logger.debug(
                "form.username.stale",
                "Superseded username result discarded",
                Some(fields),
            );
        }
    }

    async fn check_with_retry(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> Result<UsernameAvailability> {
        let lookup = &*self.lookup;
        let timeout = self.settings.lookup_timeout;
        let logger = self.logger.as_deref();

        retry_async_with_observer(
            ctx,
            self.settings.retry,
            LOOKUP_OPERATION,
            move || {
                timeout_with_context(
                    ctx,
                    timeout,
                    LOOKUP_OPERATION,
                    lookup.check_username(ctx, username.into()),
                )
            },
            |attempt, error| {
                if let Some(logger) = logger {
                    let mut fields = username_fields(username, None);
                    fields.insert("attempt".into(), Value::from(attempt));
                    fields.insert("errorCode".into(), Value::String(error.code.to_string()));
                    logger.warn(
                        "form.username.lookupRetry",
                        "Username lookup failed, retrying",
                        Some(fields),
                    );
                }
            },
        )
        .await
    }

    fn mark_finished(&self, generation: u64) {
        self.finished.send_if_modified(|done| {
            if generation > *done {
                *done = generation;
                true
            } else {
                false
            }
        });
    }

    /// Write `result` while holding the submit lock, so a concurrent submit
    /// cannot slip between the generation check and the write.
    fn publish_if_current(&self, generation: u64, result: ValidationResult) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.generation != generation || self.session.is_cancelled() {
            return false;
        }
        self.results.set(FormField::Username, result);
        true
    }

    fn debug(&self, event: &str, message: &str, username: &str, generation: Option<u64>) {
        if let Some(logger) = self.logger.as_ref() {
            logger.debug(event, message, Some(username_fields(username, generation)));
        }
    }
}

fn session_fields(session: &RequestContext) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "correlationId".into(),
        Value::String(session.correlation_id().as_str().to_owned()),
    );
    fields.insert("field".into(), Value::from(FormField::Username.key()));
    fields
}

fn username_fields(username: &str, generation: Option<u64>) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert("username".into(), Value::from(username));
    if let Some(generation) = generation {
        fields.insert("generation".into(), Value::from(generation));
    }
    fields
}
