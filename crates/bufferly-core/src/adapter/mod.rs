//! Calendar adapters.
//!
//! The engine talks to the external calendar store exclusively through
//! [`CalendarAdapter`]. Two implementations ship with the crate: the
//! Google Calendar adapter and an in-memory store used by tests and dry
//! runs.

pub mod google;
pub mod memory;
pub mod oauth;

pub use google::GoogleCalendarAdapter;
pub use memory::MemoryCalendar;

use chrono::{DateTime, Utc};

use crate::error::AdapterError;
use crate::event::{CalendarEvent, Interval};

/// Interface to the external calendar store.
///
/// Calls are made sequentially per pass so a buffer created for one event
/// is visible to the conflict check of the next. Range queries are
/// inclusive at the edges; callers widen their windows to catch
/// boundary-touching neighbors.
pub trait CalendarAdapter {
    /// The caller's own identity (email), used in attendance checks.
    fn current_identity(&self) -> Result<String, AdapterError>;

    /// Events overlapping `[from, to]` on the given calendar.
    fn list_events(
        &self,
        calendar_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, AdapterError>;

    /// Create an event; returns the stored view including its new id.
    fn create_event(
        &mut self,
        calendar_id: &str,
        title: &str,
        description: &str,
        interval: Interval,
    ) -> Result<CalendarEvent, AdapterError>;

    /// Delete an event by id.
    fn delete_event(&mut self, calendar_id: &str, event_id: &str) -> Result<(), AdapterError>;

    /// Apply a visual style (color) to an event.
    fn set_visual_style(
        &mut self,
        calendar_id: &str,
        event_id: &str,
        style: &str,
    ) -> Result<(), AdapterError>;
}

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    const SERVICE: &str = "bufferly";

    pub fn get(key: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    pub fn delete(key: &str) -> Result<(), Box<dyn std::error::Error>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
