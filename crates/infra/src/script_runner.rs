//! Drive a check-in form from a [`FormScript`] and report what the
//! username field showed along the way.

use crate::InfraResult;
use crate::composition::FormServices;
use crate::form_script::{FormScript, ScriptStep};
use checkin_app::{
    ListPassengersDeps, PassengerForm, StartCheckInDeps, list_passengers, start_check_in,
};
use checkin_domain::{FormField, Passenger, PassengerSummary, ValidationResult, ValidationState};
use checkin_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext};
use serde::Serialize;
use std::future::Future;
use tokio::sync::watch;
use tokio::time::Instant;

/// A change of the username field's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameTransition {
    /// Milliseconds since the run started.
    pub elapsed_ms: u64,
    /// Result shown from that moment.
    pub result: ValidationResult,
}

/// Outcome of a `complete` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum CompletionOutcome {
    /// Passenger saved and checked in.
    CheckedIn,
    /// Completion refused.
    Rejected {
        /// Error code, `namespace:code`.
        code: String,
        /// Reason shown to the user.
        message: String,
    },
}

/// Everything observed during one scripted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRunReport {
    /// Record as last edited.
    pub passenger: Passenger,
    /// Username results in the order they were shown.
    pub transitions: Vec<UsernameTransition>,
    /// Final per-field results.
    pub state: ValidationState,
    /// Whether every field ended `Valid`.
    pub form_valid: bool,
    /// Result of each `complete` step, in order.
    pub completions: Vec<CompletionOutcome>,
    /// Total run time, including the final settle.
    pub elapsed_ms: u64,
}

impl FormRunReport {
    /// Username result at the end of the run.
    #[must_use]
    pub fn final_username(&self) -> Option<&ValidationResult> {
        self.state.get(FormField::Username)
    }
}

/// Run `script` against a fresh passenger, then wait for the username
/// check to settle.
#[tracing::instrument(name = "checkin.script", skip_all, fields(steps = script.steps().len()))]
pub async fn run_form_script_async(
    services: &FormServices,
    script: &FormScript,
) -> InfraResult<FormRunReport> {
    let ctx = RequestContext::new_request();
    let passenger = start_check_in(
        &ctx,
        &StartCheckInDeps {
            store: services.store.clone(),
            logger: services.logger.clone(),
        },
    )
    .await?;
    let form = PassengerForm::new(passenger, services.form_deps(), services.settings)?;

    let started_at = Instant::now();
    let stop = ctx.child();
    let recorder = tokio::spawn(record_username(
        form.results().subscribe(),
        stop.clone(),
        started_at,
    ));

    let mut completions = Vec::new();
    for step in script.steps() {
        match step {
            ScriptStep::Edit { field, value } => form.edit(*field, value).await,
            ScriptStep::Wait(duration) => tokio::time::sleep(*duration).await,
            ScriptStep::Complete => completions.push(match form.complete_check_in().await {
                Ok(_) => CompletionOutcome::CheckedIn,
                Err(error) => CompletionOutcome::Rejected {
                    code: error.code.to_string(),
                    message: error.message,
                },
            }),
        }
    }
    form.username_validator().settled().await;

    stop.cancel();
    let transitions = recorder.await.map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("username recorder stopped unexpectedly: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;

    let state = form.results().snapshot();
    let report = FormRunReport {
        passenger: form.passenger(),
        transitions,
        form_valid: state.is_form_valid(),
        state,
        completions,
        elapsed_ms: elapsed_ms(started_at),
    };
    form.shutdown();
    Ok(report)
}

/// Blocking wrapper over [`run_form_script_async`] on a current-thread
/// runtime.
pub fn run_form_script(services: &FormServices, script: &FormScript) -> InfraResult<FormRunReport> {
    block_on(run_form_script_async(services, script))
}

/// Stored passengers, blocking.
pub fn list_stored_passengers(services: &FormServices) -> InfraResult<Vec<PassengerSummary>> {
    block_on(async {
        let ctx = RequestContext::new_request();
        list_passengers(
            &ctx,
            &ListPassengersDeps {
                store: services.store.clone(),
                logger: services.logger.clone(),
            },
        )
        .await
    })
}

fn block_on<T>(future: impl Future<Output = InfraResult<T>>) -> InfraResult<T> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ErrorEnvelope::from)?;
    runtime.block_on(future)
}

async fn record_username(
    mut changes: watch::Receiver<ValidationState>,
    stop: RequestContext,
    started_at: Instant,
) -> Vec<UsernameTransition> {
    let mut transitions: Vec<UsernameTransition> = Vec::new();
    loop {
        tokio::select! {
            biased;
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = changes.borrow_and_update().get(FormField::Username).cloned();
                let Some(result) = current else { continue };
                if transitions.last().map(|last| &last.result) != Some(&result) {
                    transitions.push(UsernameTransition {
                        elapsed_ms: elapsed_ms(started_at),
                        result,
                    });
                }
            }
            () = stop.cancelled() => break,
        }
    }
    transitions
}

fn elapsed_ms(started_at: Instant) -> u64 {
    u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
}
