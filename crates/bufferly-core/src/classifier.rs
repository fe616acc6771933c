//! Event classification.
//!
//! [`classify`] decides whether an event warrants buffers. Check order is
//! load-bearing: cheap structural rejects come before guest/attendance
//! lookups, and acceptance is checked before the positive matches so an
//! unaccepted conferencing event is never buffered. Each failing check
//! short-circuits with its own reason code from a closed enumeration, so
//! tests and diagnostics never string-match on prose.

use serde::{Deserialize, Serialize};

use crate::detector;
use crate::event::CalendarEvent;
use crate::policy::Policy;

/// Closed enumeration of classification outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReasonCode {
    TooShort,
    AllDay,
    IsBuffer,
    ExcludedTitle,
    ExcludedCalendar,
    TooManyGuests,
    NotAccepted,
    CustomerEngagement,
    Conferencing,
    NoMatch,
}

/// Result of classifying one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub create_buffers: bool,
    pub reason: ReasonCode,
    /// Conferencing provider, when `reason` is `Conferencing`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Captured customer code, when `reason` is `CustomerEngagement`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_code: Option<String>,
}

impl Decision {
    fn reject(reason: ReasonCode) -> Self {
        Self {
            create_buffers: false,
            reason,
            provider: None,
            customer_code: None,
        }
    }

    fn customer(code: String) -> Self {
        Self {
            create_buffers: true,
            reason: ReasonCode::CustomerEngagement,
            provider: None,
            customer_code: Some(code),
        }
    }

    fn conferencing(provider: &str) -> Self {
        Self {
            create_buffers: true,
            reason: ReasonCode::Conferencing,
            provider: Some(provider.to_string()),
            customer_code: None,
        }
    }
}

/// Whether the event's source calendar matches an excluded pattern.
pub fn calendar_excluded(event: &CalendarEvent, policy: &Policy) -> bool {
    policy.calendar_excluded(&event.source_calendar)
}

/// Whether the guest count (including self) exceeds the configured ceiling.
pub fn exceeds_guest_ceiling(event: &CalendarEvent, policy: &Policy) -> bool {
    match policy.guest_ceiling {
        Some(ceiling) => event.guest_count() as u32 > ceiling,
        None => false,
    }
}

/// Whether the acceptance requirement applies and the caller's attendance
/// fails it. Unknown attendance fails conservatively.
pub fn fails_acceptance(event: &CalendarEvent, policy: &Policy, identity: &str) -> bool {
    policy.require_acceptance && !event.attendance_for(identity).satisfies_acceptance()
}

/// The exclusion/acceptance/guest-ceiling checks shared between the
/// classifier and the conflict filter. Both views go through this exact
/// function so they can never disagree about which events count.
pub fn passes_shared_filters(event: &CalendarEvent, policy: &Policy, identity: &str) -> bool {
    !calendar_excluded(event, policy)
        && !exceeds_guest_ceiling(event, policy)
        && !fails_acceptance(event, policy, identity)
}

/// Map an event to a buffering decision.
///
/// `identity` is the caller's calendar identity, used for the attendance
/// check. Pure: same inputs always yield the same decision.
pub fn classify(event: &CalendarEvent, policy: &Policy, identity: &str) -> Decision {
    if event.duration() < policy.min_qualifying {
        return Decision::reject(ReasonCode::TooShort);
    }
    if event.all_day {
        return Decision::reject(ReasonCode::AllDay);
    }
    if policy.is_buffer_title(&event.title) {
        return Decision::reject(ReasonCode::IsBuffer);
    }
    if policy.excluded_title_index(&event.title).is_some() {
        return Decision::reject(ReasonCode::ExcludedTitle);
    }
    if calendar_excluded(event, policy) {
        return Decision::reject(ReasonCode::ExcludedCalendar);
    }
    if exceeds_guest_ceiling(event, policy) {
        return Decision::reject(ReasonCode::TooManyGuests);
    }
    if fails_acceptance(event, policy, identity) {
        return Decision::reject(ReasonCode::NotAccepted);
    }
    if let Some(code) = policy.customer_code_in(&event.title) {
        return Decision::customer(code);
    }
    match detector::detect_on_event(event, &policy.signatures) {
        Some(provider) => Decision::conferencing(provider),
        None => Decision::reject(ReasonCode::NoMatch),
    }
}
