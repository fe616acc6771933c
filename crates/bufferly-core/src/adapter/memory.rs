//! In-memory calendar store.
//!
//! Deterministic [`CalendarAdapter`] used by tests and `--dry-run`. Range
//! queries use inclusive edge semantics like the real calendar API, so
//! boundary-touching neighbors are returned for widened windows.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::CalendarAdapter;
use crate::error::AdapterError;
use crate::event::{CalendarEvent, Interval};

/// In-memory calendar with a fixed identity.
#[derive(Debug, Clone)]
pub struct MemoryCalendar {
    identity: String,
    events: Vec<CalendarEvent>,
    /// Styles applied via `set_visual_style`, by event id.
    styles: HashMap<String, String>,
}

impl MemoryCalendar {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            events: Vec::new(),
            styles: HashMap::new(),
        }
    }

    /// Seed an existing event.
    pub fn insert(&mut self, event: CalendarEvent) {
        self.events.push(event);
    }

    /// All stored events, sorted by start.
    pub fn events(&self) -> Vec<CalendarEvent> {
        let mut all = self.events.clone();
        all.sort_by_key(|e| e.start);
        all
    }

    /// Style applied to an event, if any.
    pub fn style_of(&self, event_id: &str) -> Option<&str> {
        self.styles.get(event_id).map(String::as_str)
    }

    /// Number of stored events with the given exact title.
    pub fn count_titled(&self, title: &str) -> usize {
        self.events.iter().filter(|e| e.title == title).count()
    }
}

impl CalendarAdapter for MemoryCalendar {
    fn current_identity(&self) -> Result<String, AdapterError> {
        Ok(self.identity.clone())
    }

    fn list_events(
        &self,
        calendar_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, AdapterError> {
        let mut hits: Vec<CalendarEvent> = self
            .events
            .iter()
            .filter(|e| e.source_calendar == calendar_id)
            .filter(|e| e.start <= to && e.end >= from)
            .cloned()
            .collect();
        hits.sort_by_key(|e| e.start);
        Ok(hits)
    }

    fn create_event(
        &mut self,
        calendar_id: &str,
        title: &str,
        description: &str,
        interval: Interval,
    ) -> Result<CalendarEvent, AdapterError> {
        let id = uuid::Uuid::new_v4().to_string();
        let event = CalendarEvent {
            id,
            title: title.to_string(),
            start: interval.start,
            end: interval.end,
            all_day: false,
            location: String::new(),
            description: description.to_string(),
            meeting_link: None,
            conference_entry_points: Vec::new(),
            source_calendar: calendar_id.to_string(),
            organizer: self.identity.clone(),
            guests: Vec::new(),
        };
        self.events.push(event.clone());
        Ok(event)
    }

    fn delete_event(&mut self, _calendar_id: &str, event_id: &str) -> Result<(), AdapterError> {
        let before = self.events.len();
        self.events.retain(|e| e.id != event_id);
        if self.events.len() == before {
            return Err(AdapterError::Api(format!("no such event: {event_id}")));
        }
        self.styles.remove(event_id);
        Ok(())
    }

    fn set_visual_style(
        &mut self,
        _calendar_id: &str,
        event_id: &str,
        style: &str,
    ) -> Result<(), AdapterError> {
        if !self.events.iter().any(|e| e.id == event_id) {
            return Err(AdapterError::Api(format!("no such event: {event_id}")));
        }
        self.styles.insert(event_id.to_string(), style.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(id: &str, start: DateTime<Utc>, minutes: i64) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            title: format!("event {id}"),
            start,
            end: start + Duration::minutes(minutes),
            all_day: false,
            location: String::new(),
            description: String::new(),
            meeting_link: None,
            conference_entry_points: Vec::new(),
            source_calendar: "primary".to_string(),
            organizer: "me@example.com".to_string(),
            guests: Vec::new(),
        }
    }

    #[test]
    fn test_inclusive_range_query() {
        let mut cal = MemoryCalendar::new("me@example.com");
        let t = Utc::now();
        cal.insert(event("a", t, 30));

        // Query ending exactly at the event start still returns it
        let hits = cal
            .list_events("primary", t - Duration::hours(1), t)
            .unwrap();
        assert_eq!(hits.len(), 1);

        // Disjoint window does not
        let hits = cal
            .list_events(
                "primary",
                t - Duration::hours(2),
                t - Duration::minutes(1),
            )
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_calendar_scoping() {
        let mut cal = MemoryCalendar::new("me@example.com");
        let t = Utc::now();
        let mut other = event("b", t, 30);
        other.source_calendar = "work".to_string();
        cal.insert(event("a", t, 30));
        cal.insert(other);

        let hits = cal
            .list_events("work", t - Duration::hours(1), t + Duration::hours(1))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b");
    }

    #[test]
    fn test_create_delete_roundtrip() {
        let mut cal = MemoryCalendar::new("me@example.com");
        let t = Utc::now();
        let created = cal
            .create_event(
                "primary",
                "title",
                "desc",
                Interval::new(t, t + Duration::minutes(15)),
            )
            .unwrap();
        assert_eq!(cal.count_titled("title"), 1);
        cal.set_visual_style("primary", &created.id, "8").unwrap();
        assert_eq!(cal.style_of(&created.id), Some("8"));
        cal.delete_event("primary", &created.id).unwrap();
        assert_eq!(cal.count_titled("title"), 0);
        assert!(cal.delete_event("primary", &created.id).is_err());
    }
}
