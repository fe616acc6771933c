//! Buffer placement engine.
//!
//! Per qualifying event: plan the pre/post intervals, then for each one
//! validate, re-query the store, guard against duplicates by exact title,
//! filter genuine conflicts, and create. The external store is re-queried
//! every time on purpose: it is the correctness mechanism for idempotency
//! given an external source of truth, not a performance shortcut.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::adapter::CalendarAdapter;
use crate::conflict::conflicting_with;
use crate::event::CalendarEvent;
use crate::planner::{plan, BufferSpec};
use crate::policy::Policy;

/// Outcome of one buffer spec attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementOutcome {
    /// The buffer was created in the store.
    Created,
    /// An event with the exact candidate title already exists (idempotency
    /// guard: re-running the engine never creates duplicates).
    AlreadyExists,
    /// A filtered neighbor strictly overlaps the candidate interval.
    Conflict,
    /// The planned interval was degenerate (zero or negative length).
    InvalidInterval,
    /// The adapter failed on the query or the create.
    AdapterRejected,
}

/// Pre/post outcomes for one event. Independent: a failure on one side
/// never prevents the attempt on the other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BufferPlacement {
    pub pre: PlacementOutcome,
    pub post: PlacementOutcome,
}

/// Margin added to both sides of the candidate interval when querying the
/// store, so inclusive range semantics reliably return boundary-touching
/// neighbors.
fn query_margin() -> Duration {
    Duration::minutes(1)
}

fn place_one<A: CalendarAdapter>(
    spec: &BufferSpec,
    policy: &Policy,
    identity: &str,
    adapter: &mut A,
) -> PlacementOutcome {
    if !spec.interval.is_valid() {
        return PlacementOutcome::InvalidInterval;
    }

    let window = spec.interval.widened(query_margin());
    let neighbors = match adapter.list_events(&policy.calendar_id, window.start, window.end) {
        Ok(events) => events,
        Err(_) => return PlacementOutcome::AdapterRejected,
    };

    if neighbors.iter().any(|e| e.title == spec.title) {
        return PlacementOutcome::AlreadyExists;
    }

    if !conflicting_with(spec.interval, &neighbors, policy, identity).is_empty() {
        return PlacementOutcome::Conflict;
    }

    match adapter.create_event(
        &policy.calendar_id,
        &spec.title,
        &spec.description,
        spec.interval,
    ) {
        Ok(created) => {
            // Styling is cosmetic; a failure here does not undo the create.
            let _ = adapter.set_visual_style(&policy.calendar_id, &created.id, &policy.visual_style);
            PlacementOutcome::Created
        }
        Err(_) => PlacementOutcome::AdapterRejected,
    }
}

/// Attempt both buffers for a qualifying event.
///
/// Both intervals are always attempted, even if the first fails: the two
/// outcomes are independent by contract.
pub fn place_buffers<A: CalendarAdapter>(
    event: &CalendarEvent,
    policy: &Policy,
    identity: &str,
    adapter: &mut A,
) -> BufferPlacement {
    let plan = plan(event, policy);
    BufferPlacement {
        pre: place_one(&plan.pre, policy, identity, adapter),
        post: place_one(&plan.post, policy, identity, adapter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MemoryCalendar;
    use crate::config::BufferConfig;
    use crate::error::AdapterError;
    use crate::event::{Guest, Interval, ResponseStatus};
    use chrono::{DateTime, Utc};

    const ME: &str = "me@example.com";

    fn policy() -> Policy {
        Policy::compile(&BufferConfig::default()).unwrap()
    }

    fn meeting(title: &str, start: DateTime<Utc>, minutes: i64) -> CalendarEvent {
        CalendarEvent {
            id: format!("ev-{title}"),
            title: title.to_string(),
            start,
            end: start + Duration::minutes(minutes),
            all_day: false,
            location: "https://zoom.us/j/123".to_string(),
            description: String::new(),
            meeting_link: None,
            conference_entry_points: Vec::new(),
            source_calendar: "primary".to_string(),
            organizer: ME.to_string(),
            guests: Vec::new(),
        }
    }

    #[test]
    fn test_created_then_already_exists() {
        let policy = policy();
        let mut cal = MemoryCalendar::new(ME);
        let e = meeting("[ACME] Quarterly Review", Utc::now() + Duration::hours(2), 60);
        cal.insert(e.clone());

        let first = place_buffers(&e, &policy, ME, &mut cal);
        assert_eq!(first.pre, PlacementOutcome::Created);
        assert_eq!(first.post, PlacementOutcome::Created);

        // Second pass is a no-op against the same store
        let second = place_buffers(&e, &policy, ME, &mut cal);
        assert_eq!(second.pre, PlacementOutcome::AlreadyExists);
        assert_eq!(second.post, PlacementOutcome::AlreadyExists);

        let pre_title = format!("{} Pre-buffer (ACME)", policy.marker);
        let post_title = format!("{} Post-buffer (ACME)", policy.marker);
        assert_eq!(cal.count_titled(&pre_title), 1);
        assert_eq!(cal.count_titled(&post_title), 1);
    }

    #[test]
    fn test_visual_style_applied() {
        let policy = policy();
        let mut cal = MemoryCalendar::new(ME);
        let e = meeting("Design review", Utc::now() + Duration::hours(2), 60);
        cal.insert(e.clone());

        place_buffers(&e, &policy, ME, &mut cal);
        let styled: Vec<_> = cal
            .events()
            .iter()
            .filter(|ev| policy.is_buffer_title(&ev.title))
            .map(|ev| cal.style_of(&ev.id).map(str::to_string))
            .collect();
        assert_eq!(styled.len(), 2);
        assert!(styled.iter().all(|s| s.as_deref() == Some("8")));
    }

    #[test]
    fn test_boundary_neighbor_does_not_block() {
        let policy = policy();
        let mut cal = MemoryCalendar::new(ME);
        let start = Utc::now() + Duration::hours(2);
        let e = meeting("Design review", start, 60);
        // Neighbor ends exactly where the pre-buffer starts
        cal.insert(meeting(
            "Earlier call",
            start - Duration::minutes(25),
            10,
        ));
        cal.insert(e.clone());

        let placed = place_buffers(&e, &policy, ME, &mut cal);
        assert_eq!(placed.pre, PlacementOutcome::Created);
    }

    #[test]
    fn test_overlapping_neighbor_blocks_one_side_only() {
        let policy = policy();
        let mut cal = MemoryCalendar::new(ME);
        let start = Utc::now() + Duration::hours(2);
        let e = meeting("Design review", start, 60);
        // Overlaps the pre-buffer window, not the post
        cal.insert(meeting("Earlier call", start - Duration::minutes(20), 10));
        cal.insert(e.clone());

        let placed = place_buffers(&e, &policy, ME, &mut cal);
        assert_eq!(placed.pre, PlacementOutcome::Conflict);
        assert_eq!(placed.post, PlacementOutcome::Created);
    }

    #[test]
    fn test_filtered_neighbor_does_not_block() {
        let policy = policy();
        let mut cal = MemoryCalendar::new(ME);
        let start = Utc::now() + Duration::hours(2);
        let e = meeting("Design review", start, 60);
        // Declined invitation overlapping the pre window
        let mut declined = meeting("Declined thing", start - Duration::minutes(10), 30);
        declined.organizer = "boss@example.com".to_string();
        declined.guests.push(Guest {
            email: ME.to_string(),
            response: ResponseStatus::Declined,
        });
        cal.insert(declined);
        cal.insert(e.clone());

        let placed = place_buffers(&e, &policy, ME, &mut cal);
        assert_eq!(placed.pre, PlacementOutcome::Created);
    }

    #[test]
    fn test_zero_duration_rejected_as_invalid() {
        let mut cfg = BufferConfig::default();
        cfg.buffers.pre_minutes = 0;
        let policy = Policy::compile(&cfg).unwrap();
        let mut cal = MemoryCalendar::new(ME);
        let e = meeting("Design review", Utc::now() + Duration::hours(2), 60);
        cal.insert(e.clone());

        let placed = place_buffers(&e, &policy, ME, &mut cal);
        assert_eq!(placed.pre, PlacementOutcome::InvalidInterval);
        assert_eq!(placed.post, PlacementOutcome::Created);
    }

    /// Adapter whose creates always fail; queries pass through.
    struct FailingCreates(MemoryCalendar);

    impl CalendarAdapter for FailingCreates {
        fn current_identity(&self) -> Result<String, AdapterError> {
            self.0.current_identity()
        }
        fn list_events(
            &self,
            calendar_id: &str,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> Result<Vec<CalendarEvent>, AdapterError> {
            self.0.list_events(calendar_id, from, to)
        }
        fn create_event(
            &mut self,
            _calendar_id: &str,
            _title: &str,
            _description: &str,
            _interval: Interval,
        ) -> Result<CalendarEvent, AdapterError> {
            Err(AdapterError::Api("insufficient permissions".to_string()))
        }
        fn delete_event(&mut self, calendar_id: &str, event_id: &str) -> Result<(), AdapterError> {
            self.0.delete_event(calendar_id, event_id)
        }
        fn set_visual_style(
            &mut self,
            calendar_id: &str,
            event_id: &str,
            style: &str,
        ) -> Result<(), AdapterError> {
            self.0.set_visual_style(calendar_id, event_id, style)
        }
    }

    #[test]
    fn test_create_failure_reported_and_sibling_still_attempted() {
        let policy = policy();
        let mut inner = MemoryCalendar::new(ME);
        let e = meeting("Design review", Utc::now() + Duration::hours(2), 60);
        inner.insert(e.clone());
        let mut cal = FailingCreates(inner);

        let placed = place_buffers(&e, &policy, ME, &mut cal);
        // Both sides attempted, both reported, nothing raised
        assert_eq!(placed.pre, PlacementOutcome::AdapterRejected);
        assert_eq!(placed.post, PlacementOutcome::AdapterRejected);
    }
}
