//! Run timestamp shared by every artifact of one run.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

/// `YYYYMMDDhhmmss`, captured once per run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RunStamp(String);

impl RunStamp {
    const FORMAT: &'static str = "%Y%m%d%H%M%S";

    /// Stamp for the current local time.
    pub fn now() -> Self {
        Self(Local::now().format(Self::FORMAT).to_string())
    }

    pub fn from_datetime(at: NaiveDateTime) -> Self {
        Self(at.format(Self::FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
