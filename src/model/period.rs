use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// Trading timeframe for live trendbar subscriptions.
///
/// Each variant maps to both a duration (for bucket-size computation) and the
/// numeric code the gateway expects in `ProtoOASubscribeLiveTrendbarReq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    M1,
    M2,
    M3,
    M4,
    M5,
    M10,
    M15,
    M30,
    H1,
    H4,
    H12,
    D1,
    W1,
}

impl Period {
    /// Bar length in minutes.
    pub fn minutes(&self) -> i64 {
        match self {
            Self::M1 => 1,
            Self::M2 => 2,
            Self::M3 => 3,
            Self::M4 => 4,
            Self::M5 => 5,
            Self::M10 => 10,
            Self::M15 => 15,
            Self::M30 => 30,
            Self::H1 => 60,
            Self::H4 => 240,
            Self::H12 => 720,
            Self::D1 => 1440,
            Self::W1 => 10080,
        }
    }

    pub fn seconds(&self) -> i64 {
        self.minutes() * 60
    }

    pub fn millis(&self) -> i64 {
        self.seconds() * 1000
    }

    /// Numeric `ProtoOATrendbarPeriod` code used on the wire.
    pub fn proto_code(&self) -> u32 {
        match self {
            Self::M1 => 1,
            Self::M2 => 2,
            Self::M3 => 3,
            Self::M4 => 4,
            Self::M5 => 5,
            Self::M10 => 6,
            Self::M15 => 7,
            Self::M30 => 8,
            Self::H1 => 9,
            Self::H4 => 10,
            Self::H12 => 11,
            Self::D1 => 12,
            Self::W1 => 13,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::M1 => "M1",
            Self::M2 => "M2",
            Self::M3 => "M3",
            Self::M4 => "M4",
            Self::M5 => "M5",
            Self::M10 => "M10",
            Self::M15 => "M15",
            Self::M30 => "M30",
            Self::H1 => "H1",
            Self::H4 => "H4",
            Self::H12 => "H12",
            Self::D1 => "D1",
            Self::W1 => "W1",
        }
    }
}

impl FromStr for Period {
    type Err = FeedError;

    // Unknown timeframe labels are a startup error, not something to guess at.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M1" => Ok(Self::M1),
            "M2" => Ok(Self::M2),
            "M3" => Ok(Self::M3),
            "M4" => Ok(Self::M4),
            "M5" => Ok(Self::M5),
            "M10" => Ok(Self::M10),
            "M15" => Ok(Self::M15),
            "M30" => Ok(Self::M30),
            "H1" => Ok(Self::H1),
            "H4" => Ok(Self::H4),
            "H12" => Ok(Self::H12),
            "D1" => Ok(Self::D1),
            "W1" => Ok(Self::W1),
            other => Err(FeedError::ConfigError(format!(
                "unknown timeframe '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
