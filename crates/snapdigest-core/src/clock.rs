//! Wall-clock capability used to stamp reports and logs.

use chrono::{Local, SecondsFormat};

/// Filename-safe timestamp layout with second granularity.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Source of the current time.
pub trait Clock {
    /// Current local time as RFC 3339 with second precision.
    fn now_iso(&self) -> String;

    /// Current local time formatted for use in filenames.
    fn timestamp(&self) -> String;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_iso(&self) -> String {
        (**self).now_iso()
    }

    fn timestamp(&self) -> String {
        (**self).timestamp()
    }
}

/// Clock backed by the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_iso(&self) -> String {
        Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    fn timestamp(&self) -> String {
        Local::now().format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Clock that always reports the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    iso: String,
    timestamp: String,
}

impl FixedClock {
    /// Create a clock returning the given values.
    pub fn new(iso: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            iso: iso.into(),
            timestamp: timestamp.into(),
        }
    }
}

impl Clock for FixedClock {
    fn now_iso(&self) -> String {
        self.iso.clone()
    }

    fn timestamp(&self) -> String {
        self.timestamp.clone()
    }
}
