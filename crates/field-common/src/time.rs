//! Instants used to key animation frames.

use crate::error::{FieldError, FieldResult};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

const LABEL_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A model run plus a lead time in hours.
///
/// Frames sort by the instant they are valid for; two runs valid at the
/// same instant sort by run, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidTime {
    pub reference_time: DateTime<Utc>,
    pub forecast_hour: u32,
}

impl ValidTime {
    pub fn new(reference_time: DateTime<Utc>, forecast_hour: u32) -> Self {
        Self {
            reference_time,
            forecast_hour,
        }
    }

    /// The instant the data is valid for.
    pub fn instant(&self) -> DateTime<Utc> {
        self.reference_time + Duration::hours(i64::from(self.forecast_hour))
    }

    /// Parse an ISO 8601 instant with zero lead time.
    ///
    /// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` taken as UTC, or a
    /// bare date at midnight UTC.
    pub fn parse(s: &str) -> FieldResult<Self> {
        let s = s.trim();
        let parsed = DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").map(|n| n.and_utc()))
            .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::default()).and_utc()))
            .map_err(|_| FieldError::format(format!("Unrecognised ISO 8601 time '{}'", s)))?;
        Ok(Self::new(parsed, 0))
    }

    /// Text for a frame label banner.
    pub fn label(&self) -> String {
        self.instant().format(LABEL_FORMAT).to_string()
    }
}

impl Ord for ValidTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant()
            .cmp(&other.instant())
            .then(self.reference_time.cmp(&other.reference_time))
    }
}

impl PartialOrd for ValidTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ValidTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
