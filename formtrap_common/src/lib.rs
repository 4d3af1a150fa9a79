//! Formtrap Common - Honeypot spam filtering for form submissions
//!
//! This crate contains the pieces shared by any form host:
//! - The submission classifier (honeypot field + minimum fill time)
//! - Honeypot configuration with defaults
//! - Wall-clock time sources
//! - Rendering of the two marker fields

pub mod classifier;
pub mod clock;
pub mod config;
pub mod fields;

pub use classifier::{
    should_accept, time_diff, time_diff_at, HoneypotPolicy, RejectReason, SubmissionFields,
    TimestampInput, Verdict,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{slugify, ConfigError, HoneypotConfig};
pub use fields::{escape_html, HoneypotFields};
