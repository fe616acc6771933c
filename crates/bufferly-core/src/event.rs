//! Calendar event model and interval arithmetic.
//!
//! Events are read-only views fetched fresh from the calendar adapter on
//! every pass; nothing here is persisted by the core.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A guest's RSVP on an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Accepted,
    Declined,
    Tentative,
    NeedsAction,
}

/// An invited guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub email: String,
    pub response: ResponseStatus,
}

/// The caller's own standing on an event.
///
/// Three-valued on purpose: a lookup that cannot be resolved yields
/// `Unknown` rather than a swallowed error, and `Unknown` always fails
/// the acceptance requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    /// The caller organizes the event, or can see it without being invited.
    Owner,
    /// The caller is on the guest list with this response.
    Resolved(ResponseStatus),
    /// Identity or guest entry could not be resolved.
    Unknown,
}

impl AttendanceStatus {
    /// Whether this status satisfies a require-acceptance policy.
    /// Owner and tentative count as attending; declined, needs-action
    /// and unknown do not.
    pub fn satisfies_acceptance(&self) -> bool {
        matches!(
            self,
            AttendanceStatus::Owner
                | AttendanceStatus::Resolved(ResponseStatus::Accepted)
                | AttendanceStatus::Resolved(ResponseStatus::Tentative)
        )
    }
}

/// A half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Zero and negative-length intervals are invalid.
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Same check as [`Interval::is_valid`], as a typed error for callers
    /// that propagate instead of reporting an outcome.
    pub fn validate(&self) -> Result<(), crate::error::ValidationError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(crate::error::ValidationError::InvalidTimeRange {
                start: self.start,
                end: self.end,
            })
        }
    }

    /// Get duration of the interval.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Strict overlap: the intersection must be a non-empty open range.
    /// Intervals that only touch at a boundary do not overlap, so
    /// back-to-back meetings and exactly abutting buffers are legal.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Widen by `margin` on both sides. Used for adapter range queries so
    /// boundary-touching neighbors are reliably returned by inclusive
    /// range semantics.
    pub fn widened(&self, margin: Duration) -> Interval {
        Interval {
            start: self.start - margin,
            end: self.end + margin,
        }
    }
}

/// A calendar event as seen through the adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    /// Native meeting link (e.g. Google's hangoutLink), if any.
    #[serde(default)]
    pub meeting_link: Option<String>,
    /// URIs from structured conference data, if the adapter provides them.
    #[serde(default)]
    pub conference_entry_points: Vec<String>,
    /// Identity of the calendar this event was read from.
    #[serde(default)]
    pub source_calendar: String,
    #[serde(default)]
    pub organizer: String,
    #[serde(default)]
    pub guests: Vec<Guest>,
}

impl CalendarEvent {
    /// Derived, never stored.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    /// Number of guests including the caller when invited.
    pub fn guest_count(&self) -> usize {
        self.guests.len()
    }

    /// Resolve the caller's attendance on this event.
    ///
    /// Organizer match wins; otherwise the guest list is searched by
    /// case-insensitive identity. A caller absent from the guest list is
    /// treated as owner: events one can see without being an invitee are
    /// self-created. An empty identity resolves to `Unknown`.
    pub fn attendance_for(&self, identity: &str) -> AttendanceStatus {
        if identity.is_empty() {
            return AttendanceStatus::Unknown;
        }
        if self.organizer.eq_ignore_ascii_case(identity) {
            return AttendanceStatus::Owner;
        }
        match self
            .guests
            .iter()
            .find(|g| g.email.eq_ignore_ascii_case(identity))
        {
            Some(guest) => AttendanceStatus::Resolved(guest.response),
            None => AttendanceStatus::Owner,
        }
    }
}
