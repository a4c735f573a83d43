// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format an optional UTC timestamp, passing `None` through.
pub fn format_opt_rfc3339(date: Option<DateTime<Utc>>) -> Option<String> {
    date.map(format_utc_rfc3339)
}
