//! In-process stand-in for the airline's username directory.

use checkin_domain::{UsernameRules, ValidationResult};
use checkin_ports::{BoxFuture, UsernameAvailability, UsernameLookupPort};
use checkin_shared::{ErrorEnvelope, RequestContext, Result};
use std::time::Duration;

/// Default simulated round-trip.
pub const DEFAULT_LOOKUP_DELAY: Duration = Duration::from_millis(500);

/// Answers after a fixed delay using [`UsernameRules`].
#[derive(Debug, Clone)]
pub struct SimulatedUsernameDirectory {
    rules: UsernameRules,
    delay: Duration,
}

impl SimulatedUsernameDirectory {
    /// Directory with the given rules and round-trip delay.
    #[must_use]
    pub const fn new(rules: UsernameRules, delay: Duration) -> Self {
        Self { rules, delay }
    }

    /// Rules in use.
    #[must_use]
    pub const fn rules(&self) -> &UsernameRules {
        &self.rules
    }
}

impl Default for SimulatedUsernameDirectory {
    fn default() -> Self {
        Self::new(UsernameRules::default(), DEFAULT_LOOKUP_DELAY)
    }
}

impl UsernameLookupPort for SimulatedUsernameDirectory {
    fn check_username(
        &self,
        ctx: &RequestContext,
        username: Box<str>,
    ) -> BoxFuture<'_, Result<UsernameAvailability>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("username.lookup")?;
            tokio::select! {
                () = ctx.cancelled() => {
                    return Err(ErrorEnvelope::cancelled("username lookup cancelled")
                        .with_metadata("operation", "username.lookup"));
                }
                () = tokio::time::sleep(self.delay) => {}
            }

            Ok(match self.rules.classify(&username) {
                ValidationResult::Invalid(reason) => UsernameAvailability::Taken { reason },
                ValidationResult::Valid | ValidationResult::Checking => {
                    UsernameAvailability::Available
                },
            })
        })
    }
}
