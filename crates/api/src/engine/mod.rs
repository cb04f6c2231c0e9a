//! Completion engine services.
//!
//! Contains the completion aggregator, the single authority that
//! re-derives lesson truth from the video and quiz stores and keeps the
//! lesson/unit/course hierarchy consistent, plus the idempotent
//! certificate issuer it triggers on a course-completion transition.

pub mod certificates;
pub mod completion;
