//! Buffer planning.
//!
//! Computes the two candidate intervals for a qualifying event and derives
//! their deterministic titles. The planner never refuses: degenerate
//! (zero/negative) buffer durations still produce specs, which the
//! placement engine then rejects at interval validation so the outcome is
//! visible rather than a silent no-op.

use serde::{Deserialize, Serialize};

use crate::event::{CalendarEvent, Interval};
use crate::policy::Policy;

/// Title phrase identifying a pre-meeting buffer.
pub const PRE_PHRASE: &str = "Pre-buffer";
/// Title phrase identifying a post-meeting buffer.
pub const POST_PHRASE: &str = "Post-buffer";

/// Maximum label length before truncation.
const MAX_LABEL_CHARS: usize = 24;

/// One candidate buffer entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferSpec {
    pub interval: Interval,
    pub title: String,
    pub description: String,
}

/// The pre/post pair planned for one event. The two specs are independent:
/// one can be created while the other is skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferPlan {
    pub pre: BufferSpec,
    pub post: BufferSpec,
}

/// Short label for buffer titles: the captured customer code when the
/// title carries one, otherwise the title truncated to a fixed width.
fn label_for(event: &CalendarEvent, policy: &Policy) -> String {
    if let Some(code) = policy.customer_code_in(&event.title) {
        return code;
    }
    let mut label: String = event.title.chars().take(MAX_LABEL_CHARS).collect();
    if event.title.chars().count() > MAX_LABEL_CHARS {
        label.push('\u{2026}');
    }
    label
}

/// Plan the pre and post buffer for an event.
///
/// pre = `[start - pre_buffer, start)`, post = `[end, end + post_buffer)`.
/// Titles always carry the policy marker token; that marker is the only
/// identity the orphan reconciler has to find buffers again.
pub fn plan(event: &CalendarEvent, policy: &Policy) -> BufferPlan {
    let label = label_for(event, policy);
    let description = format!("Buffer time around \"{}\".", event.title);

    let pre = BufferSpec {
        interval: Interval::new(event.start - policy.pre_buffer, event.start),
        title: format!("{} {} ({})", policy.marker, PRE_PHRASE, label),
        description: description.clone(),
    };
    let post = BufferSpec {
        interval: Interval::new(event.end, event.end + policy.post_buffer),
        title: format!("{} {} ({})", policy.marker, POST_PHRASE, label),
        description,
    };
    BufferPlan { pre, post }
}
