//! Compiled, immutable policy.
//!
//! [`Policy`] is the process-lifetime value object every pure function in
//! the engine reads from. It is compiled once from [`BufferConfig`] at
//! startup; a config that fails validation aborts the run before any
//! calendar access. Pattern lists keep their declaration order: the first
//! match wins, which makes provider naming and exclusion reporting
//! deterministic.

use chrono::Duration;
use regex::{Regex, RegexBuilder};

use crate::config::BufferConfig;
use crate::error::ConfigError;

/// One compiled conferencing provider signature.
#[derive(Debug, Clone)]
pub struct ConferencingSignature {
    pub pattern: Regex,
    pub provider: String,
}

/// Immutable policy driving classification, planning, conflict filtering
/// and orphan cleanup. Construct via [`Policy::compile`].
#[derive(Debug, Clone)]
pub struct Policy {
    pub pre_buffer: Duration,
    pub post_buffer: Duration,
    pub min_qualifying: Duration,
    pub lookahead: Duration,
    pub extended_lookahead: Duration,
    pub guest_ceiling: Option<u32>,
    pub require_acceptance: bool,
    pub excluded_calendars: Vec<Regex>,
    pub excluded_titles: Vec<Regex>,
    pub customer_code: Regex,
    pub signatures: Vec<ConferencingSignature>,
    pub marker: String,
    pub visual_style: String,
    pub calendar_id: String,
}

fn compile_pattern(key: &str, pattern: &str) -> Result<Regex, ConfigError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ConfigError::InvalidPattern {
            key: key.to_string(),
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

fn compile_list(key: &str, patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns.iter().map(|p| compile_pattern(key, p)).collect()
}

impl Policy {
    /// Validate a [`BufferConfig`] and compile it into a `Policy`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any pattern fails to compile, the guest
    /// ceiling is zero, the marker is blank, or the customer-code pattern
    /// has no capture group.
    pub fn compile(config: &BufferConfig) -> Result<Self, ConfigError> {
        if let Some(0) = config.filters.max_guests {
            return Err(ConfigError::InvalidValue {
                key: "filters.max_guests".to_string(),
                message: "guest ceiling must be a positive integer".to_string(),
            });
        }
        if config.buffers.marker.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "buffers.marker".to_string(),
                message: "marker token must not be blank".to_string(),
            });
        }
        if config.scan.calendar_id.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "scan.calendar_id".to_string(),
                message: "calendar id must not be empty".to_string(),
            });
        }

        let customer_code = compile_pattern(
            "filters.customer_code_pattern",
            &config.filters.customer_code_pattern,
        )?;
        if customer_code.captures_len() < 2 {
            return Err(ConfigError::InvalidValue {
                key: "filters.customer_code_pattern".to_string(),
                message: "pattern must have a capture group for the code".to_string(),
            });
        }

        let signatures = config
            .conferencing
            .iter()
            .map(|sig| {
                Ok(ConferencingSignature {
                    pattern: compile_pattern("conferencing", &sig.pattern)?,
                    provider: sig.provider.clone(),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            pre_buffer: Duration::minutes(i64::from(config.buffers.pre_minutes)),
            post_buffer: Duration::minutes(i64::from(config.buffers.post_minutes)),
            min_qualifying: Duration::minutes(i64::from(config.buffers.min_event_minutes)),
            lookahead: Duration::hours(i64::from(config.scan.lookahead_hours)),
            extended_lookahead: Duration::hours(i64::from(config.scan.extended_lookahead_hours)),
            guest_ceiling: config.filters.max_guests,
            require_acceptance: config.filters.require_acceptance,
            excluded_calendars: compile_list(
                "filters.excluded_calendars",
                &config.filters.excluded_calendars,
            )?,
            excluded_titles: compile_list(
                "filters.excluded_titles",
                &config.filters.excluded_titles,
            )?,
            customer_code,
            signatures,
            marker: config.buffers.marker.clone(),
            visual_style: config.buffers.visual_style.clone(),
            calendar_id: config.scan.calendar_id.clone(),
        })
    }

    /// Whether a title identifies a generated buffer. Marker presence is
    /// the only identity buffers have in the external store.
    pub fn is_buffer_title(&self, title: &str) -> bool {
        title.contains(&self.marker)
    }

    /// First excluded-title pattern matching `title`, by declaration index.
    pub fn excluded_title_index(&self, title: &str) -> Option<usize> {
        self.excluded_titles.iter().position(|re| re.is_match(title))
    }

    /// Whether `calendar` matches any excluded-calendar pattern.
    pub fn calendar_excluded(&self, calendar: &str) -> bool {
        self.excluded_calendars.iter().any(|re| re.is_match(calendar))
    }

    /// Capture the customer code from a title, if the pattern matches.
    pub fn customer_code_in(&self, title: &str) -> Option<String> {
        self.customer_code
            .captures(title)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}
