//! Callback routing
//!
//! The router does not know which session a callback belongs to. It offers
//! the event to every live session and lets each one claim events carrying
//! its own request code.

use tracing::{debug, warn};
use unilogin_domain::{CallbackEvent, ProviderType};

use crate::ports::ProviderSession;

/// What happened to one dispatched callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// The session that consumed the event, if any.
    pub claimed_by: Option<ProviderType>,
    /// How many sessions the event was offered to.
    pub delivered: usize,
}

impl DispatchOutcome {
    /// Returns true if some session consumed the event.
    #[must_use]
    pub const fn is_claimed(&self) -> bool {
        self.claimed_by.is_some()
    }
}

/// Fans platform callbacks out to sessions.
#[derive(Debug, Default)]
pub struct CallbackRouter {
    dispatched: u64,
    unclaimed: u64,
}

impl CallbackRouter {
    /// Creates a router with zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dispatched: 0,
            unclaimed: 0,
        }
    }

    /// Offers `event` to every session.
    ///
    /// No delivery order is guaranteed. When several sessions claim the same
    /// event the first claimant is reported.
    pub fn dispatch<'a, S>(
        &mut self,
        sessions: impl IntoIterator<Item = &'a mut S>,
        event: &CallbackEvent,
    ) -> DispatchOutcome
    where
        S: ProviderSession + ?Sized + 'a,
    {
        self.dispatched += 1;

        let mut outcome = DispatchOutcome::default();
        for session in sessions {
            outcome.delivered += 1;
            if !session.handle_callback(event) {
                continue;
            }
            match outcome.claimed_by {
                None => outcome.claimed_by = Some(session.provider()),
                Some(first) => warn!(
                    request_code = event.request_code,
                    %first,
                    also = %session.provider(),
                    "callback claimed by more than one session"
                ),
            }
        }

        match outcome.claimed_by {
            Some(provider) => debug!(
                request_code = event.request_code,
                %provider,
                delivered = outcome.delivered,
                "callback dispatched"
            ),
            None => {
                self.unclaimed += 1;
                debug!(
                    request_code = event.request_code,
                    delivered = outcome.delivered,
                    "callback ignored by every session"
                );
            }
        }
        outcome
    }

    /// Callbacks dispatched so far.
    #[must_use]
    pub const fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Callbacks no session claimed.
    #[must_use]
    pub const fn unclaimed(&self) -> u64 {
        self.unclaimed
    }
}
