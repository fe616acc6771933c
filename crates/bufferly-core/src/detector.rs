//! Conferencing link detection.
//!
//! Pure text matching against the ordered provider signature list from
//! [`Policy`]. No side effects, and absent/empty text is simply no match.

use crate::event::CalendarEvent;
use crate::policy::ConferencingSignature;

/// Provider name used when an event carries a native meeting link.
pub const NATIVE_PROVIDER: &str = "native";

/// Return the provider of the first signature matching anywhere in `text`.
/// Signatures are tried in declared order; matching is case-insensitive
/// (patterns are compiled that way by the policy).
pub fn detect<'a>(text: &str, signatures: &'a [ConferencingSignature]) -> Option<&'a str> {
    if text.is_empty() {
        return None;
    }
    signatures
        .iter()
        .find(|sig| sig.pattern.is_match(text))
        .map(|sig| sig.provider.as_str())
}

/// Detect conferencing on an event, checking sources in fixed order:
/// native meeting link, then location, then description, then structured
/// conference entry points. The first source that yields a match wins;
/// later sources are not consulted.
pub fn detect_on_event<'a>(
    event: &CalendarEvent,
    signatures: &'a [ConferencingSignature],
) -> Option<&'a str> {
    if event.meeting_link.as_deref().is_some_and(|l| !l.is_empty()) {
        return Some(NATIVE_PROVIDER);
    }
    if let Some(provider) = detect(&event.location, signatures) {
        return Some(provider);
    }
    if let Some(provider) = detect(&event.description, signatures) {
        return Some(provider);
    }
    event
        .conference_entry_points
        .iter()
        .find_map(|uri| detect(uri, signatures))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BufferConfig;
    use crate::policy::Policy;
    use chrono::{Duration, Utc};

    fn signatures() -> Vec<ConferencingSignature> {
        Policy::compile(&BufferConfig::default()).unwrap().signatures
    }

    fn event() -> CalendarEvent {
        let start = Utc::now();
        CalendarEvent {
            id: "e1".to_string(),
            title: "Sync".to_string(),
            start,
            end: start + Duration::minutes(30),
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
    fn test_detect_first_match_wins() {
        let sigs = signatures();
        let text = "join at https://meet.google.com/abc or https://zoom.us/j/123";
        // Zoom is declared first, so it wins even though Meet appears first
        // in the text.
        assert_eq!(detect(text, &sigs), Some("Zoom"));
    }

    #[test]
    fn test_detect_case_insensitive() {
        let sigs = signatures();
        assert_eq!(detect("HTTPS://ZOOM.US/J/99", &sigs), Some("Zoom"));
    }

    #[test]
    fn test_detect_empty_text() {
        assert_eq!(detect("", &signatures()), None);
    }

    #[test]
    fn test_native_link_wins_over_location() {
        let sigs = signatures();
        let mut e = event();
        e.meeting_link = Some("https://meet.google.com/abc".to_string());
        e.location = "https://zoom.us/j/123".to_string();
        assert_eq!(detect_on_event(&e, &sigs), Some(NATIVE_PROVIDER));
    }

    #[test]
    fn test_empty_native_link_is_skipped() {
        let sigs = signatures();
        let mut e = event();
        e.meeting_link = Some(String::new());
        e.location = "https://zoom.us/j/123".to_string();
        assert_eq!(detect_on_event(&e, &sigs), Some("Zoom"));
    }

    #[test]
    fn test_location_wins_over_description() {
        let sigs = signatures();
        let mut e = event();
        e.location = "https://zoom.us/j/123".to_string();
        e.description = "https://meet.google.com/abc".to_string();
        assert_eq!(detect_on_event(&e, &sigs), Some("Zoom"));
    }

    #[test]
    fn test_entry_points_are_last_resort() {
        let sigs = signatures();
        let mut e = event();
        e.conference_entry_points = vec!["https://teams.microsoft.com/l/x".to_string()];
        assert_eq!(detect_on_event(&e, &sigs), Some("Microsoft Teams"));
    }

    #[test]
    fn test_no_match() {
        let sigs = signatures();
        let mut e = event();
        e.location = "Conference room 4".to_string();
        e.description = "Agenda attached".to_string();
        assert_eq!(detect_on_event(&e, &sigs), None);
    }
}
