//! Conflict filtering for candidate buffer intervals.
//!
//! Of the events neighboring a candidate interval, only a subset genuinely
//! contends for the slot: generated buffers, all-day events, and events
//! the classifier itself would screen out (excluded calendar, guest
//! ceiling, acceptance) never block placement. The screening reuses the
//! classifier's shared predicates so the conflict view and the
//! classification view cannot diverge.

use crate::classifier::passes_shared_filters;
use crate::event::{CalendarEvent, Interval};
use crate::policy::Policy;

/// Return the neighbors that genuinely conflict with `candidate`.
///
/// A neighbor conflicts when it survives the shared policy filters and
/// strictly overlaps the candidate. Boundary touch is not overlap, so a
/// meeting ending exactly where a buffer starts never blocks it.
pub fn conflicting_with<'a>(
    candidate: Interval,
    neighbors: &'a [CalendarEvent],
    policy: &Policy,
    identity: &str,
) -> Vec<&'a CalendarEvent> {
    neighbors
        .iter()
        .filter(|e| !policy.is_buffer_title(&e.title))
        .filter(|e| !e.all_day)
        .filter(|e| passes_shared_filters(e, policy, identity))
        .filter(|e| e.interval().overlaps(&candidate))
        .collect()
}
