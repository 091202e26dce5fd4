//! Version markers.
//!
//! A marker is whatever the server reports as the resource's current state,
//! in practice a last-updated timestamp. Only equality matters: any
//! difference means the preview is out of date. Markers are not assumed to
//! increase, and odd values such as negatives are accepted.

use crate::error::PreviewError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque, comparable resource version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMarker", into = "i64")]
pub struct VersionMarker(i64);

impl VersionMarker {
    /// Wrap a raw marker value.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// The raw marker value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for VersionMarker {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<VersionMarker> for i64 {
    fn from(marker: VersionMarker) -> Self {
        marker.0
    }
}

impl fmt::Display for VersionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for VersionMarker {
    type Err = PreviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self).map_err(|_| {
            PreviewError::InvalidMetadata(format!("version marker {s:?} is not an integer"))
        })
    }
}

/// Wire forms a marker may arrive in: a JSON integer or an integer string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMarker {
    Int(i64),
    Text(String),
}

impl TryFrom<RawMarker> for VersionMarker {
    type Error = String;

    fn try_from(raw: RawMarker) -> Result<Self, Self::Error> {
        match raw {
            RawMarker::Int(value) => Ok(Self(value)),
            RawMarker::Text(text) => text.parse().map_err(|e: PreviewError| e.to_string()),
        }
    }
}
