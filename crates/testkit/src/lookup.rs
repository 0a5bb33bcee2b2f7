//! Username directory doubles.

use checkin_domain::UsernameRules;
use checkin_ports::{BoxFuture, UsernameAvailability, UsernameLookupPort};
use checkin_shared::{ErrorEnvelope, RequestContext, Result};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

fn availability(rules: &UsernameRules, username: &str) -> UsernameAvailability {
    if rules.is_taken(username) {
        UsernameAvailability::Taken {
            reason: rules.taken_message().into(),
        }
    } else {
        UsernameAvailability::Available
    }
}

fn lookup_cancelled() -> ErrorEnvelope {
    ErrorEnvelope::cancelled("username lookup cancelled").with_metadata("operation", "username.lookup")
}

/// Directory that records every username it is asked about.
///
/// Answers with the default taken set after `delay`, and stops early when
/// the request context is cancelled.
#[derive(Debug)]
pub struct CountingUsernameLookup {
    rules: UsernameRules,
    delay: Duration,
    seen: Mutex<Vec<Box<str>>>,
    completed: AtomicUsize,
    cancelled: AtomicUsize,
}

impl CountingUsernameLookup {
    pub fn new(delay: Duration) -> Self {
        Self::with_rules(UsernameRules::default(), delay)
    }

    pub fn with_rules(rules: UsernameRules, delay: Duration) -> Self {
        Self {
            rules,
            delay,
            seen: Mutex::new(Vec::new()),
            completed: AtomicUsize::new(0),
            cancelled: AtomicUsize::new(0),
        }
    }

    /// Lookups started.
    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Usernames looked up, in call order.
    pub fn usernames(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Lookups that ran to completion.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Lookups interrupted by cancellation.
    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl UsernameLookupPort for CountingUsernameLookup {
    fn check_username(
        &self,
        ctx: &RequestContext,
        username: Box<str>,
    ) -> BoxFuture<'_, Result<UsernameAvailability>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(username.clone());
            tokio::select! {
                () = ctx.cancelled() => {
                    self.cancelled.fetch_add(1, Ordering::SeqCst);
                    return Err(lookup_cancelled());
                }
                () = tokio::time::sleep(self.delay) => {}
            }
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(availability(&self.rules, &username))
        })
    }
}

/// Directory that fails a fixed number of times before answering.
#[derive(Debug)]
pub struct FailingUsernameLookup {
    remaining_failures: AtomicU32,
    error: ErrorEnvelope,
    rules: UsernameRules,
    attempts: AtomicUsize,
}

impl FailingUsernameLookup {
    /// Fails every call with `error`.
    pub fn always(error: ErrorEnvelope) -> Self {
        Self::failing_first(u32::MAX, error)
    }

    /// Fails the first `failures` calls, then answers from the default rules.
    pub fn failing_first(failures: u32, error: ErrorEnvelope) -> Self {
        Self {
            remaining_failures: AtomicU32::new(failures),
            error,
            rules: UsernameRules::default(),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl UsernameLookupPort for FailingUsernameLookup {
    fn check_username(
        &self,
        ctx: &RequestContext,
        username: Box<str>,
    ) -> BoxFuture<'_, Result<UsernameAvailability>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("username.lookup")?;
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let failing = self
                .remaining_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                .is_ok();
            if failing {
                return Err(self.error.clone());
            }
            Ok(availability(&self.rules, &username))
        })
    }
}

/// Directory that never answers; only cancellation ends a call.
#[derive(Debug, Default)]
pub struct StalledUsernameLookup {
    attempts: AtomicUsize,
}

impl StalledUsernameLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl UsernameLookupPort for StalledUsernameLookup {
    fn check_username(
        &self,
        ctx: &RequestContext,
        _username: Box<str>,
    ) -> BoxFuture<'_, Result<UsernameAvailability>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            ctx.cancelled().await;
            Err(lookup_cancelled())
        })
    }
}
