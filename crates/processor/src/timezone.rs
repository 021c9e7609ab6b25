//! Reviewer time zones
//!
//! Working hours are measured on each reviewer's local clock, so every
//! reviewer login resolves to an IANA zone.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use common::{Config, Error, Result};
use tracing::debug;

/// Maps a reviewer login to the zone their working hours are read in
pub trait TimezoneResolver {
    fn timezone_of(&self, login: &str) -> Tz;
}

impl<F> TimezoneResolver for F
where
    F: Fn(&str) -> Tz,
{
    fn timezone_of(&self, login: &str) -> Tz {
        self(login)
    }
}

/// Cities users can be mapped to by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserCity {
    Atlanta,
    Chicago,
    Detroit,
    NewYork,
    Phoenix,
    Paris,
    SanFrancisco,
    Toronto,
    Vancouver,
}

impl UserCity {
    pub const ALL: [UserCity; 9] = [
        Self::Atlanta,
        Self::Chicago,
        Self::Detroit,
        Self::NewYork,
        Self::Phoenix,
        Self::Paris,
        Self::SanFrancisco,
        Self::Toronto,
        Self::Vancouver,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Atlanta => "Atlanta",
            Self::Chicago => "Chicago",
            Self::Detroit => "Detroit",
            Self::NewYork => "New York",
            Self::Phoenix => "Phoenix",
            Self::Paris => "Paris",
            Self::SanFrancisco => "San Francisco",
            Self::Toronto => "Toronto",
            Self::Vancouver => "Vancouver",
        }
    }

    pub fn timezone(self) -> Tz {
        match self {
            Self::Atlanta | Self::NewYork => chrono_tz::America::New_York,
            Self::Chicago => chrono_tz::America::Chicago,
            Self::Detroit => chrono_tz::America::Detroit,
            Self::Phoenix => chrono_tz::America::Phoenix,
            Self::Paris => chrono_tz::Europe::Paris,
            Self::SanFrancisco => chrono_tz::America::Los_Angeles,
            Self::Toronto => chrono_tz::America::Toronto,
            Self::Vancouver => chrono_tz::America::Vancouver,
        }
    }
}

impl fmt::Display for UserCity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UserCity {
    type Err = Error;

    /// Case-insensitive; `"new york"`, `"New_York"` and `"NEW-YORK"` all match
    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize_city(s);
        Self::ALL
            .into_iter()
            .find(|city| normalize_city(city.name()) == wanted)
            .ok_or_else(|| Error::UnknownTimeZone(s.to_string()))
    }
}

fn normalize_city(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '_' | '-' => ' ',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Parse a zone given either as a city name or as an IANA id
pub fn parse_zone(raw: &str) -> Result<Tz> {
    if let Ok(city) = raw.parse::<UserCity>() {
        return Ok(city.timezone());
    }
    raw.trim()
        .parse::<Tz>()
        .map_err(|_| Error::UnknownTimeZone(raw.to_string()))
}

/// Per-user zones with a fallback for everyone else
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTimeZone {
    default_zone: Tz,
    user_zones: BTreeMap<String, Tz>,
}

impl Default for UserTimeZone {
    fn default() -> Self {
        Self::new(UserCity::NewYork.timezone())
    }
}

impl UserTimeZone {
    pub fn new(default_zone: Tz) -> Self {
        Self {
            default_zone,
            user_zones: BTreeMap::new(),
        }
    }

    pub fn with_user(mut self, login: impl Into<String>, zone: Tz) -> Self {
        self.user_zones.insert(login.into(), zone);
        self
    }

    /// Build from configuration, rejecting zones that do not parse
    pub fn from_config(config: &Config) -> Result<Self> {
        let default_zone = parse_zone(&config.default_timezone)
            .map_err(|_| Error::Config(format!("Unknown DEFAULT_TIMEZONE `{}`", config.default_timezone)))?;

        let mut zones = Self::new(default_zone);
        for (login, raw) in &config.reviewer_timezones {
            let zone = parse_zone(raw).map_err(|_| {
                Error::Config(format!("Unknown time zone `{}` for reviewer `{}`", raw, login))
            })?;
            zones.user_zones.insert(login.clone(), zone);
        }
        Ok(zones)
    }

    pub fn default_zone(&self) -> Tz {
        self.default_zone
    }
}

impl TimezoneResolver for UserTimeZone {
    fn timezone_of(&self, login: &str) -> Tz {
        match self.user_zones.get(login) {
            Some(zone) => {
                debug!("Using configured time zone {} for {}", zone, login);
                *zone
            }
            None => {
                debug!("Using default time zone {} for {}", self.default_zone, login);
                self.default_zone
            }
        }
    }
}
