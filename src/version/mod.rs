//! Date-coded build versions.
//!
//! A version has the shape `YYYY.M.D.REV` with an optional trailing beta
//! marker (`2024.5.1.3b`). Month and day are not zero-padded. The revision
//! counts builds made on the same calendar date.

mod store;

pub use store::VersionStore;

use crate::error::VersionError;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Suffix appended to beta versions
pub const BETA_MARKER: char = 'b';

/// Largest revision accepted when parsing; it must still be advanceable
pub const MAX_REVISION: u32 = u32::MAX - 1;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,4})\.(\d{1,2})\.(\d{1,2})\.(\d+)$").expect("version regex is valid")
});

/// A date-coded build version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildVersion {
    /// Build date
    pub date: NaiveDate,
    /// Builds already made on `date` before this one
    pub revision: u32,
    /// Whether the version carries the beta marker
    pub beta: bool,
}

impl BuildVersion {
    /// First version of the given day
    pub fn first_of(date: NaiveDate) -> Self {
        Self {
            date,
            revision: 0,
            beta: false,
        }
    }

    /// Version following `self` when building on `today`.
    ///
    /// Same date increments the revision; any other date starts over at 0.
    /// A revision counter that cannot advance further is handled like any
    /// unusable stored version: the day starts over at 0.
    pub fn next_on(&self, today: NaiveDate) -> Self {
        if self.date != today {
            return Self::first_of(today);
        }
        match self.revision.checked_add(1) {
            Some(revision) => Self {
                date: today,
                revision,
                beta: false,
            },
            None => {
                log::warn!("Revision counter of {} exhausted; starting over at 0", self);
                Self::first_of(today)
            }
        }
    }

    /// Set or clear the beta marker
    pub fn with_beta(mut self, beta: bool) -> Self {
        self.beta = beta;
        self
    }

    /// The same version without the beta marker
    pub fn without_marker(self) -> Self {
        self.with_beta(false)
    }
}

impl fmt::Display for BuildVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.date.year(),
            self.date.month(),
            self.date.day(),
            self.revision
        )?;
        if self.beta {
            write!(f, "{}", BETA_MARKER)?;
        }
        Ok(())
    }
}

impl FromStr for BuildVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (numeric, beta) = match trimmed.strip_suffix(BETA_MARKER) {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };

        let invalid = |reason: &str| VersionError::InvalidVersion {
            version: s.to_string(),
            reason: reason.to_string(),
        };

        let caps = VERSION_RE
            .captures(numeric)
            .ok_or_else(|| invalid("expected YYYY.M.D.REV"))?;

        let year: i32 = caps[1].parse().map_err(|_| invalid("year out of range"))?;
        let month: u32 = caps[2].parse().map_err(|_| invalid("month out of range"))?;
        let day: u32 = caps[3].parse().map_err(|_| invalid("day out of range"))?;
        let revision: u32 = caps[4]
            .parse()
            .ok()
            .filter(|revision| *revision <= MAX_REVISION)
            .ok_or_else(|| invalid("revision out of range"))?;

        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| invalid("not a calendar date"))?;

        Ok(Self {
            date,
            revision,
            beta,
        })
    }
}
