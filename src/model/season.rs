use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::error::{Result, SquadError};

/// A football season, identified by the year it starts in.
///
/// Most leagues label a season as a year range (`2008-2009`); a few run
/// within a calendar year and label it with the single year (`2008`). The
/// display form does not take part in equality.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Season {
    start_year: i32,
    single_year: bool,
}

impl Season {
    /// Season displayed as a year range.
    pub fn new(start_year: i32) -> Self {
        Self {
            start_year,
            single_year: false,
        }
    }

    /// Season displayed as a single calendar year.
    pub fn single(start_year: i32) -> Self {
        Self {
            start_year,
            single_year: true,
        }
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn is_single_year(&self) -> bool {
        self.single_year
    }

    /// Same season, with the given display form.
    pub fn with_single_year(self, single_year: bool) -> Self {
        Self {
            start_year: self.start_year,
            single_year,
        }
    }

    /// The following season, keeping the display form.
    pub fn next(&self) -> Self {
        Self {
            start_year: self.start_year + 1,
            single_year: self.single_year,
        }
    }

    /// Parse a season label as it appears in cache directory names.
    ///
    /// Accepts `2008-2009` (range form) and `2008` (single-year form).
    pub fn parse(label: &str) -> Result<Self> {
        let label = label.trim();
        let bad = || SquadError::Parse(format!("Invalid season label: '{}'", label));

        match label.split_once('-') {
            Some((start, end)) => {
                let start: i32 = start.parse().map_err(|_| bad())?;
                let end: i32 = end.parse().map_err(|_| bad())?;
                if start.checked_add(1) != Some(end) {
                    return Err(bad());
                }
                Ok(Self::new(start))
            }
            None => {
                let year: i32 = label.parse().map_err(|_| bad())?;
                Ok(Self::single(year))
            }
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.single_year {
            write!(f, "{}", self.start_year)
        } else {
            write!(f, "{}-{}", self.start_year, i64::from(self.start_year) + 1)
        }
    }
}

impl PartialEq for Season {
    fn eq(&self, other: &Self) -> bool {
        self.start_year == other.start_year
    }
}

impl Eq for Season {}

impl Hash for Season {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start_year.hash(state);
    }
}

impl PartialOrd for Season {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Season {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start_year.cmp(&other.start_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(Season::new(2008).to_string(), "2008-2009");
        assert_eq!(Season::single(2008).to_string(), "2008");
    }

    #[test]
    fn test_display_parse_round_trip() {
        for season in [Season::new(1999), Season::single(2015)] {
            let label = season.to_string();
            let parsed = Season::parse(&label).unwrap();
            assert_eq!(parsed.to_string(), label);
            assert_eq!(parsed.is_single_year(), season.is_single_year());
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Season::parse("2008-2010").is_err());
        assert!(Season::parse("twenty").is_err());
        assert!(Season::parse("2008-").is_err());
        assert!(Season::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_range_past_year_limit() {
        let err = Season::parse("2147483647-0").unwrap_err();
        assert!(matches!(err, SquadError::Parse(_)));
        assert!(Season::parse(&format!("{}-{}", i32::MAX, i64::from(i32::MAX) + 1)).is_err());
    }

    #[test]
    fn test_equality_ignores_display_form() {
        assert_eq!(Season::new(2010), Season::single(2010));
        assert_ne!(Season::new(2010), Season::new(2011));
    }

    #[test]
    fn test_next() {
        let next = Season::single(2019).next();
        assert_eq!(next.start_year(), 2020);
        assert!(next.is_single_year());
        assert!(Season::new(2019) < next);
    }
}
