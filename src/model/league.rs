//! Countries, leagues, and the per-season league-name resolution table.

use std::fmt;

use serde::Serialize;

use super::Season;
use crate::error::{Result, SquadError};

/// Countries crawled from the source, carrying the source's own country codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    England,
    Spain,
    Italy,
    Germany,
    France,
    Netherlands,
    Scotland,
    Portugal,
    Belgium,
    Turkey,
    Greece,
    Brazil,
    Argentina,
    Usa,
    Mexico,
}

const ALL_COUNTRIES: [Country; 15] = [
    Country::England,
    Country::Spain,
    Country::Italy,
    Country::Germany,
    Country::France,
    Country::Netherlands,
    Country::Scotland,
    Country::Portugal,
    Country::Belgium,
    Country::Turkey,
    Country::Greece,
    Country::Brazil,
    Country::Argentina,
    Country::Usa,
    Country::Mexico,
];

impl Country {
    pub fn all() -> &'static [Country] {
        &ALL_COUNTRIES
    }

    /// Code used by the source in URLs and by the cache in directory names.
    pub fn code(&self) -> &'static str {
        match self {
            Country::England => "eng",
            Country::Spain => "spain",
            Country::Italy => "italy",
            Country::Germany => "ger",
            Country::France => "france",
            Country::Netherlands => "netherl",
            Country::Scotland => "scots",
            Country::Portugal => "portugal",
            Country::Belgium => "belgium",
            Country::Turkey => "turkey",
            Country::Greece => "greece",
            Country::Brazil => "brazil",
            Country::Argentina => "arg",
            Country::Usa => "usa",
            Country::Mexico => "mexico",
        }
    }

    pub fn from_code(code: &str) -> Result<Self> {
        ALL_COUNTRIES
            .iter()
            .copied()
            .find(|c| c.code() == code)
            .ok_or_else(|| SquadError::Lookup(format!("Unknown country code: '{}'", code)))
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A country's top flight in one season, under the name the source uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct League {
    country: Country,
    name: String,
    season: Season,
}

impl League {
    pub fn new(country: Country, name: impl Into<String>, season: Season) -> Self {
        Self {
            country,
            name: name.into(),
            season,
        }
    }

    pub fn country(&self) -> Country {
        self.country
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn season(&self) -> Season {
        self.season
    }

    /// Path of the league's team-index page, relative to the source base URL.
    pub fn locator(&self) -> String {
        format!("{}/{}/{}.htm", self.country, self.season, self.name)
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.country, self.season, self.name)
    }
}

/// Seasons (by start year) in which a country's league exists in the source.
struct Validity {
    country: Country,
    from: Option<i32>,
    until: Option<i32>,
}

/// A historical league name, used for seasons starting before `before`.
struct NameOverride {
    country: Country,
    before: i32,
    name: &'static str,
}

const VALIDITY: &[Validity] = &[
    Validity {
        country: Country::Usa,
        from: Some(1996),
        until: None,
    },
    Validity {
        country: Country::Mexico,
        from: Some(2002),
        until: None,
    },
];

const SINGLE_YEAR_COUNTRIES: &[Country] = &[Country::Brazil, Country::Usa];

// Checked in order; the first matching rule wins.
const NAME_OVERRIDES: &[NameOverride] = &[
    NameOverride {
        country: Country::England,
        before: 2018,
        name: "faprem",
    },
    NameOverride {
        country: Country::Scotland,
        before: 2013,
        name: "scotprem",
    },
];

fn canonical_names(country: Country) -> &'static [&'static str] {
    match country {
        Country::England => &["engprem"],
        Country::Spain => &["spalali"],
        Country::Italy => &["seriea"],
        Country::Germany => &["gerbun"],
        Country::France => &["fralig1"],
        Country::Netherlands => &["nethere"],
        Country::Scotland => &["scotsp"],
        Country::Portugal => &["porprim"],
        Country::Belgium => &["beleers"],
        Country::Turkey => &["tursuper"],
        Country::Greece => &["gresuper"],
        Country::Brazil => &["bracamp"],
        Country::Argentina => &["argprim"],
        Country::Usa => &["usamls"],
        Country::Mexico => &["mexaper", "mexclaus"],
    }
}

fn is_valid(country: Country, year: i32) -> bool {
    VALIDITY
        .iter()
        .filter(|v| v.country == country)
        .all(|v| v.from.map_or(true, |from| year >= from) && v.until.map_or(true, |until| year < until))
}

/// Resolve the leagues a country played in a season.
///
/// Returns no leagues when the season falls outside the country's validity
/// interval, one league in the common case (possibly under a historical
/// name), and several when the top flight is split into concurrent
/// tournaments. The returned leagues carry the country's season display form.
pub fn resolve_leagues(country: Country, season: Season) -> Vec<League> {
    let year = season.start_year();
    if !is_valid(country, year) {
        return Vec::new();
    }

    let season = season.with_single_year(SINGLE_YEAR_COUNTRIES.contains(&country));

    if let Some(rule) = NAME_OVERRIDES
        .iter()
        .find(|r| r.country == country && year < r.before)
    {
        return vec![League::new(country, rule.name, season)];
    }

    canonical_names(country)
        .iter()
        .map(|name| League::new(country, *name, season))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_code_round_trip() {
        for country in Country::all() {
            assert_eq!(Country::from_code(country.code()).unwrap(), *country);
        }
    }

    #[test]
    fn test_unknown_country_is_lookup_error() {
        let err = Country::from_code("atlantis").unwrap_err();
        assert!(matches!(err, SquadError::Lookup(_)));
    }

    #[test]
    fn test_out_of_range_season_yields_no_leagues() {
        for year in 1980..1996 {
            assert!(resolve_leagues(Country::Usa, Season::new(year)).is_empty());
        }
        for year in 1980..2002 {
            assert!(resolve_leagues(Country::Mexico, Season::new(year)).is_empty());
        }
    }

    #[test]
    fn test_historical_override_name() {
        let leagues = resolve_leagues(Country::England, Season::new(2010));
        assert_eq!(leagues.len(), 1);
        assert_eq!(leagues[0].name(), "faprem");

        let leagues = resolve_leagues(Country::England, Season::new(2018));
        assert_eq!(leagues[0].name(), "engprem");

        let leagues = resolve_leagues(Country::Scotland, Season::new(2012));
        assert_eq!(leagues[0].name(), "scotprem");
    }

    #[test]
    fn test_split_season_country() {
        let leagues = resolve_leagues(Country::Mexico, Season::new(2010));
        let names: Vec<_> = leagues.iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["mexaper", "mexclaus"]);
    }

    #[test]
    fn test_single_year_display() {
        let leagues = resolve_leagues(Country::Brazil, Season::new(2015));
        assert_eq!(leagues[0].season().to_string(), "2015");
        assert_eq!(leagues[0].locator(), "brazil/2015/bracamp.htm");

        let leagues = resolve_leagues(Country::Spain, Season::single(2015));
        assert_eq!(leagues[0].locator(), "spain/2015-2016/spalali.htm");
    }
}
