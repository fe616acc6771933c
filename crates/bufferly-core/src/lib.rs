//! # Bufferly Core Library
//!
//! This library provides the core business logic for Bufferly, a tool that
//! carves out recovery time around real meetings. It classifies calendar
//! events, places pre/post buffer entries next to qualifying ones without
//! colliding with existing commitments, and later deletes buffers whose
//! justifying meeting is gone.
//!
//! ## Architecture
//!
//! - **Policy**: immutable, compiled-once thresholds and pattern lists that
//!   drive classification, conflict filtering, and cleanup
//! - **Classifier**: pure decision function mapping an event to an accept or
//!   a closed-enumeration rejection reason
//! - **Placement Engine**: idempotent create-or-skip placement of the two
//!   buffer intervals per qualifying event
//! - **Orphan Reconciler**: re-derives whether an existing buffer is still
//!   justified and marks dead ones for deletion
//! - **Adapters**: the [`CalendarAdapter`] trait plus a Google Calendar
//!   implementation and an in-memory store for tests and dry runs
//!
//! The engine is stateless between invocations: the external calendar store
//! is the single source of truth, and every pass re-queries it.
//!
//! ## Key Components
//!
//! - [`BufferEngine`]: batch entry points (`run_buffer_pass`, `run_cleanup_pass`)
//! - [`Policy`]: compiled configuration singleton
//! - [`CalendarAdapter`]: trait for the external calendar store
//! - [`Decision`]: classification result with reason code

pub mod adapter;
pub mod classifier;
pub mod config;
pub mod conflict;
pub mod detector;
pub mod engine;
pub mod error;
pub mod event;
pub mod placement;
pub mod planner;
pub mod policy;
pub mod reconciler;

pub use adapter::{CalendarAdapter, GoogleCalendarAdapter, MemoryCalendar};
pub use classifier::{classify, Decision, ReasonCode};
pub use config::BufferConfig;
pub use engine::{BufferEngine, EventOutcome, PassSummary};
pub use error::{AdapterError, ConfigError, CoreError, OAuthError, ValidationError};
pub use event::{AttendanceStatus, CalendarEvent, Guest, Interval, ResponseStatus};
pub use placement::{place_buffers, BufferPlacement, PlacementOutcome};
pub use planner::{plan, BufferPlan, BufferSpec};
pub use policy::{ConferencingSignature, Policy};
pub use reconciler::{reconcile, BufferSide, CleanupSummary};
