use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ja,
    En,
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported locale '{0}' (expected 'ja' or 'en')")]
pub struct UnknownLocale(pub String);

impl Locale {
    const JA_WEEKDAYS: [&'static str; 7] = ["日", "月", "火", "水", "木", "金", "土"];
    const EN_WEEKDAYS: [&'static str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

    pub fn weekday_label(self, weekday: Weekday) -> &'static str {
        let idx = weekday.num_days_from_sunday() as usize;
        match self {
            Locale::Ja => Self::JA_WEEKDAYS[idx],
            Locale::En => Self::EN_WEEKDAYS[idx],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::Ja => "ja",
            Locale::En => "en",
        }
    }
}

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ja" | "ja-jp" => Ok(Locale::Ja),
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
