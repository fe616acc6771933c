//! Batch entry points.
//!
//! [`BufferEngine`] wires policy + adapter into the three operations the
//! trigger layer calls: a buffer pass over a horizon, a cleanup pass, and
//! a single-event diagnostic classification. The engine is stateless
//! between invocations; every pass re-queries the store.
//!
//! Deployment note: at most one concurrent run per calendar is an
//! operating assumption. If two runs overlap anyway, the exact-title
//! existence check in placement is the only duplicate guard.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::adapter::CalendarAdapter;
use crate::classifier::{classify, Decision};
use crate::error::CoreError;
use crate::event::CalendarEvent;
use crate::placement::{place_buffers, BufferPlacement, PlacementOutcome};
use crate::policy::Policy;
use crate::reconciler::{reconcile, CleanupSummary};

/// Per-event record in a pass summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventOutcome {
    pub event_id: String,
    pub title: String,
    pub decision: Decision,
    /// Placement outcomes, present only when the decision accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<BufferPlacement>,
}

/// Result of one buffer pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassSummary {
    pub scanned: usize,
    pub qualifying: usize,
    pub buffers_created: usize,
    pub outcomes: Vec<EventOutcome>,
}

/// The engine: policy, adapter, and the caller's resolved identity.
pub struct BufferEngine<A: CalendarAdapter> {
    policy: Policy,
    adapter: A,
    identity: String,
}

impl<A: CalendarAdapter> BufferEngine<A> {
    /// Resolve the caller's identity up front; everything else is lazy.
    pub fn new(policy: Policy, adapter: A) -> Result<Self, CoreError> {
        let identity = adapter.current_identity()?;
        Ok(Self {
            policy,
            adapter,
            identity,
        })
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Direct adapter access, mainly for tests and tooling.
    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// Classify every event in `[now, now + horizon]` and place buffers
    /// for the qualifying ones. Adapter failures on individual placements
    /// are recorded in the outcomes; only the initial listing is fatal.
    pub fn run_buffer_pass(
        &mut self,
        now: DateTime<Utc>,
        horizon: Duration,
    ) -> Result<PassSummary, CoreError> {
        let events = self
            .adapter
            .list_events(&self.policy.calendar_id, now, now + horizon)?;

        let mut summary = PassSummary {
            scanned: events.len(),
            ..PassSummary::default()
        };

        for event in &events {
            let decision = classify(event, &self.policy, &self.identity);
            let placement = if decision.create_buffers {
                summary.qualifying += 1;
                let placed = place_buffers(event, &self.policy, &self.identity, &mut self.adapter);
                for outcome in [placed.pre, placed.post] {
                    if outcome == PlacementOutcome::Created {
                        summary.buffers_created += 1;
                    }
                }
                Some(placed)
            } else {
                None
            };
            summary.outcomes.push(EventOutcome {
                event_id: event.id.clone(),
                title: event.title.clone(),
                decision,
                placement,
            });
        }

        Ok(summary)
    }

    /// Find buffers in `[now, now + horizon]` and delete the orphaned
    /// ones. Per-buffer failures are recorded in the summary.
    pub fn run_cleanup_pass(
        &mut self,
        now: DateTime<Utc>,
        horizon: Duration,
    ) -> Result<CleanupSummary, CoreError> {
        let events = self
            .adapter
            .list_events(&self.policy.calendar_id, now, now + horizon)?;

        let candidates: Vec<CalendarEvent> = events
            .into_iter()
            .filter(|e| self.policy.is_buffer_title(&e.title))
            .collect();

        Ok(reconcile(
            &candidates,
            &self.policy,
            &self.identity,
            &mut self.adapter,
        ))
    }

    /// Diagnostic: full decision for a single event, no side effects.
    pub fn classify_only(&self, event: &CalendarEvent) -> Decision {
        classify(event, &self.policy, &self.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MemoryCalendar;
    use crate::classifier::ReasonCode;
    use crate::config::BufferConfig;

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
    fn test_buffer_pass_end_to_end() {
        let mut cal = MemoryCalendar::new(ME);
        let now = Utc::now();
        cal.insert(meeting("[ACME] Quarterly Review", now + Duration::hours(3), 60));
        // Too short to qualify
        cal.insert(meeting("Quick chat", now + Duration::hours(5), 15));

        let mut engine = BufferEngine::new(policy(), cal).unwrap();
        let summary = engine.run_buffer_pass(now, Duration::hours(48)).unwrap();

        assert_eq!(summary.scanned, 2);
        assert_eq!(summary.qualifying, 1);
        assert_eq!(summary.buffers_created, 2);

        let acme = summary
            .outcomes
            .iter()
            .find(|o| o.title.contains("ACME"))
            .unwrap();
        assert_eq!(acme.decision.reason, ReasonCode::CustomerEngagement);
        let short = summary
            .outcomes
            .iter()
            .find(|o| o.title == "Quick chat")
            .unwrap();
        assert_eq!(short.decision.reason, ReasonCode::TooShort);
        assert!(short.placement.is_none());
    }

    #[test]
    fn test_second_pass_is_idempotent() {
        let mut cal = MemoryCalendar::new(ME);
        let now = Utc::now();
        cal.insert(meeting("Design review", now + Duration::hours(3), 60));

        let mut engine = BufferEngine::new(policy(), cal).unwrap();
        let first = engine.run_buffer_pass(now, Duration::hours(48)).unwrap();
        assert_eq!(first.buffers_created, 2);

        let second = engine.run_buffer_pass(now, Duration::hours(48)).unwrap();
        assert_eq!(second.buffers_created, 0);
        let outcome = second
            .outcomes
            .iter()
            .find(|o| o.title == "Design review")
            .unwrap();
        let placed = outcome.placement.unwrap();
        assert_eq!(placed.pre, PlacementOutcome::AlreadyExists);
        assert_eq!(placed.post, PlacementOutcome::AlreadyExists);
    }

    #[test]
    fn test_generated_buffers_not_reprocessed() {
        // Buffer duration matches the qualifying minimum here so the
        // generated buffers reach the marker check instead of being
        // rejected as too short.
        let mut cfg = BufferConfig::default();
        cfg.buffers.min_event_minutes = 15;
        let policy = Policy::compile(&cfg).unwrap();

        let mut cal = MemoryCalendar::new(ME);
        let now = Utc::now();
        cal.insert(meeting("Design review", now + Duration::hours(3), 60));

        let mut engine = BufferEngine::new(policy, cal).unwrap();
        engine.run_buffer_pass(now, Duration::hours(48)).unwrap();
        let second = engine.run_buffer_pass(now, Duration::hours(48)).unwrap();

        // The two buffers show up in the scan but are rejected as buffers,
        // never classified as meetings.
        assert_eq!(second.scanned, 3);
        let buffer_rejects = second
            .outcomes
            .iter()
            .filter(|o| o.decision.reason == ReasonCode::IsBuffer)
            .count();
        assert_eq!(buffer_rejects, 2);
    }

    #[test]
    fn test_cleanup_after_meeting_removed() {
        let mut cal = MemoryCalendar::new(ME);
        let now = Utc::now();
        let m = meeting("Design review", now + Duration::hours(3), 60);
        cal.insert(m.clone());

        let mut engine = BufferEngine::new(policy(), cal).unwrap();
        engine.run_buffer_pass(now, Duration::hours(48)).unwrap();

        // Meeting disappears; cleanup must remove both buffers
        engine.adapter.delete_event("primary", &m.id).unwrap();
        let cleanup = engine.run_cleanup_pass(now, Duration::hours(48)).unwrap();
        assert_eq!(cleanup.examined, 2);
        assert_eq!(cleanup.deleted.len(), 2);
        assert!(engine.adapter.events().is_empty());
    }

    #[test]
    fn test_cleanup_keeps_live_buffers() {
        let mut cal = MemoryCalendar::new(ME);
        let now = Utc::now();
        cal.insert(meeting("Design review", now + Duration::hours(3), 60));

        let mut engine = BufferEngine::new(policy(), cal).unwrap();
        engine.run_buffer_pass(now, Duration::hours(48)).unwrap();
        let cleanup = engine.run_cleanup_pass(now, Duration::hours(48)).unwrap();
        assert_eq!(cleanup.examined, 2);
        assert_eq!(cleanup.kept, 2);
        assert!(cleanup.deleted.is_empty());
    }

    #[test]
    fn test_classify_only_has_no_side_effects() {
        let cal = MemoryCalendar::new(ME);
        let engine = BufferEngine::new(policy(), cal).unwrap();
        let e = meeting("Design review", Utc::now() + Duration::hours(3), 60);
        let d = engine.classify_only(&e);
        assert!(d.create_buffers);
        assert!(engine.adapter.events().is_empty());
    }
}
