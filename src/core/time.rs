//! Timestamp formatting shared by every persisted/wire record.
//!
//! One canonical format throughout: `YYYY-MM-DDTHH:MM:SSZ` UTC, matching
//! the CoT template in spec.md §6 and the teacher's
//! `strftime('%Y-%m-%dT%H:%M:%SZ','now')` SQLite convention.

use chrono::{DateTime, Utc};

pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn now_iso() -> String {
    Utc::now().format(FORMAT).to_string()
}

pub fn format_iso(dt: DateTime<Utc>) -> String {
    dt.format(FORMAT).to_string()
}
