use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/**
    Layout of provider guide timestamps, e.g. `20210422030000`.

    Always UTC, with no offset in the raw value.
*/
const GUIDE_TIME_LAYOUT: &str = "%Y%m%d%H%M%S";

const GUIDE_TIME_LEN: usize = 14;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid guide timestamp {raw:?}: expected 14 digit YYYYMMDDHHMMSS")]
pub struct GuideTimeError {
    raw: String,
}

/**
    A program start or stop instant as reported by the provider guide.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GuideTime(DateTime<Utc>);

impl GuideTime {
    pub fn parse(raw: &str) -> Result<Self, GuideTimeError> {
        let err = || GuideTimeError {
            raw: raw.to_string(),
        };

        if raw.len() != GUIDE_TIME_LEN || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }

        NaiveDateTime::parse_from_str(raw, GUIDE_TIME_LAYOUT)
            .map(|naive| Self(naive.and_utc()))
            .map_err(|_| err())
    }

    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /**
        Format in the XMLTV `start`/`stop` attribute layout, which
        carries an explicit offset: `20210422030000 +0000`.
    */
    pub fn to_xmltv(&self) -> String {
        self.0.format("%Y%m%d%H%M%S %z").to_string()
    }
}

impl fmt::Display for GuideTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(GUIDE_TIME_LAYOUT))
    }
}

impl<'de> Deserialize<'de> for GuideTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        GuideTime::parse(raw.trim()).map_err(serde::de::Error::custom)
    }
}
