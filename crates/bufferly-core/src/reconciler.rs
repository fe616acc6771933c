//! Orphan buffer reconciliation.
//!
//! A buffer stays alive exactly as long as some event in its adjacent
//! window would independently qualify for buffering. The classifier is
//! reused verbatim for that re-derivation, so a rescheduled meeting that
//! still qualifies keeps the buffer even though the label may now
//! describe a different event.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::adapter::CalendarAdapter;
use crate::classifier::classify;
use crate::event::{CalendarEvent, Interval};
use crate::planner::{POST_PHRASE, PRE_PHRASE};
use crate::policy::Policy;

/// How far past the buffer edge to look for a justifying meeting.
fn adjacent_window() -> Duration {
    Duration::hours(1)
}

/// Which side of a meeting a buffer sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BufferSide {
    Pre,
    Post,
}

/// Determine the side of a buffer from its title phrase. `None` for
/// titles that carry the marker but neither phrase; those are left alone.
pub fn buffer_side(title: &str) -> Option<BufferSide> {
    if title.contains(PRE_PHRASE) {
        Some(BufferSide::Pre)
    } else if title.contains(POST_PHRASE) {
        Some(BufferSide::Post)
    } else {
        None
    }
}

/// The meeting window a buffer implies: forward from its end for a
/// pre-buffer, backward from its start for a post-buffer.
pub fn expected_meeting_window(buffer: &CalendarEvent, side: BufferSide) -> Interval {
    match side {
        BufferSide::Pre => Interval::new(buffer.end, buffer.end + adjacent_window()),
        BufferSide::Post => Interval::new(buffer.start - adjacent_window(), buffer.start),
    }
}

/// One buffer deleted by the reconciler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedBuffer {
    pub id: String,
    pub title: String,
    pub side: BufferSide,
}

/// Result of one cleanup pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupSummary {
    /// Buffers examined (marker present and side recognizable).
    pub examined: usize,
    /// Buffers kept because a qualifying event sits in their window.
    pub kept: usize,
    /// Buffers deleted from the store.
    pub deleted: Vec<DeletedBuffer>,
    /// Per-item adapter failures; the pass continued past each.
    pub errors: Vec<String>,
}

/// Delete buffers whose adjacent window no longer holds any qualifying
/// event.
///
/// `candidates` may contain arbitrary events; only those carrying the
/// marker token are considered. Adapter failures on lookup or delete are
/// recorded and never abort the pass.
pub fn reconcile<A: CalendarAdapter>(
    candidates: &[CalendarEvent],
    policy: &Policy,
    identity: &str,
    adapter: &mut A,
) -> CleanupSummary {
    let mut summary = CleanupSummary::default();

    for buffer in candidates {
        if !policy.is_buffer_title(&buffer.title) {
            continue;
        }
        let Some(side) = buffer_side(&buffer.title) else {
            continue;
        };
        summary.examined += 1;

        let window = expected_meeting_window(buffer, side);
        let neighbors =
            match adapter.list_events(&policy.calendar_id, window.start, window.end) {
                Ok(events) => events,
                Err(e) => {
                    summary
                        .errors
                        .push(format!("lookup failed for '{}': {e}", buffer.title));
                    continue;
                }
            };

        let justified = neighbors
            .iter()
            .any(|e| classify(e, policy, identity).create_buffers);

        if justified {
            summary.kept += 1;
            continue;
        }

        match adapter.delete_event(&policy.calendar_id, &buffer.id) {
            Ok(()) => summary.deleted.push(DeletedBuffer {
                id: buffer.id.clone(),
                title: buffer.title.clone(),
                side,
            }),
            Err(e) => summary
                .errors
                .push(format!("delete failed for '{}': {e}", buffer.title)),
        }
    }

    summary
}
