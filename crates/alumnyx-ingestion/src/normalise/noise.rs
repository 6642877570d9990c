//! Noise-marker truncation.
//!
//! Each marker class finds its vocabulary anywhere in the entry
//! (case-insensitive) and deletes the match together with everything after
//! it. Classes run in the fixed order of [`NoiseMarker::ORDER`]; each one
//! sees the already-truncated output of the previous class.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MONTH: Regex =
        Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)\b.*").unwrap();
    static ref AUDIENCE: Regex =
        Regex::new(r"(?i)\b\d[\d,.]*\s*(followers?|connections?).*").unwrap();
    static ref TENURE: Regex =
        Regex::new(r"(?i)\b\d[\d,.]*\s*(yrs?|years?|mos?|months?).*").unwrap();
    // No trailing \b: "International" and "Contractor" are cut at the keyword.
    static ref EMPLOYMENT_TYPE: Regex = Regex::new(
        r"(?i)\b(full[-\s]*time|part[-\s]*time|intern(ship)?|contract|freelance|volunteer).*"
    ).unwrap();
    static ref YEAR_RANGE: Regex = Regex::new(r"(?i)\b\d{4}\s*-\s*\d{4}.*").unwrap();
    static ref BARE_YEAR: Regex = Regex::new(r"(?i)\b\d{4}\b.*").unwrap();
}

/// A class of scraped noise that marks the end of the useful part of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseMarker {
    /// Calendar month abbreviation, e.g. the start of "Jun 2019 - Aug 2021".
    Month,
    /// "500+ followers", "1,234 connections".
    Audience,
    /// "2 yrs 3 mos", "6 months".
    Tenure,
    /// "Full-time", "Internship", "Freelance", ...
    EmploymentType,
    /// "2015-2018", "2015 - 2018".
    YearRange,
    /// Any standalone 4-digit number. Checked last.
    Year,
}

impl NoiseMarker {
    /// Application order. Reordering changes results.
    pub const ORDER: [NoiseMarker; 6] = [
        NoiseMarker::Month,
        NoiseMarker::Audience,
        NoiseMarker::Tenure,
        NoiseMarker::EmploymentType,
        NoiseMarker::YearRange,
        NoiseMarker::Year,
    ];

    fn pattern(self) -> &'static Regex {
        match self {
            NoiseMarker::Month          => &*MONTH,
            NoiseMarker::Audience       => &*AUDIENCE,
            NoiseMarker::Tenure         => &*TENURE,
            NoiseMarker::EmploymentType => &*EMPLOYMENT_TYPE,
            NoiseMarker::YearRange      => &*YEAR_RANGE,
            NoiseMarker::Year           => &*BARE_YEAR,
        }
    }

    /// Drop the first occurrence of this marker and everything after it.
    pub fn truncate(self, text: &str) -> String {
        self.pattern().replace_all(text, "").into_owned()
    }
}

/// Run every marker class over `text` in order.
pub fn strip_noise(text: &str) -> String {
    NoiseMarker::ORDER
        .iter()
        .fold(text.to_string(), |current, marker| marker.truncate(&current))
}
