//! Application configuration

use std::collections::BTreeMap;
use std::env;

use crate::{Error, Result};

/// Zone used for reviewers without an explicit mapping
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// IANA zone id or city name used when a reviewer has no mapping
    pub default_timezone: String,
    /// `login -> zone` overrides, zone given as IANA id or city name
    pub reviewer_timezones: BTreeMap<String, String>,
    /// Logins (usually bots) excluded from every statistic
    pub ignored_users: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            reviewer_timezones: BTreeMap::new(),
            ignored_users: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_timezone = lookup("DEFAULT_TIMEZONE")
            .map(|z| z.trim().to_string())
            .filter(|z| !z.is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        let reviewer_timezones = match lookup("REVIEWER_TIMEZONES") {
            Some(raw) => parse_pairs(&raw)?,
            None => BTreeMap::new(),
        };

        let ignored_users = lookup("IGNORED_USERS")
            .map(|raw| parse_list(&raw))
            .unwrap_or_default();

        Ok(Self {
            default_timezone,
            reviewer_timezones,
            ignored_users,
        })
    }
}

/// Parse `a=b,c=d` into a map, rejecting entries without `=`
fn parse_pairs(raw: &str) -> Result<BTreeMap<String, String>> {
    let mut pairs = BTreeMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (login, zone) = entry.split_once('=').ok_or_else(|| {
            Error::Config(format!(
                "REVIEWER_TIMEZONES entry `{}` must look like login=zone",
                entry
            ))
        })?;
        let (login, zone) = (login.trim(), zone.trim());
        if login.is_empty() || zone.is_empty() {
            return Err(Error::Config(format!(
                "REVIEWER_TIMEZONES entry `{}` has an empty login or zone",
                entry
            )));
        }
        pairs.insert(login.to_string(), zone.to_string());
    }
    Ok(pairs)
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
