use std::fmt;

use serde::Serialize;

use super::{League, Season};

/// Season-scoped team identifier: the same club in two seasons is two teams.
///
/// Only the name and start year take part, so same-named clubs in different
/// countries (Arsenal in England and in Argentina) share one identifier and
/// link their players in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TeamId(String);

impl TeamId {
    pub fn new(name: &str, season: Season) -> Self {
        Self(format!("{}/{}", slug(name), season.start_year()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// File-system safe form of a team name; also names the team's cache directory.
pub fn slug(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' { '-' } else { c })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    id: TeamId,
    league: League,
    name: String,
    /// Page reference on the source; absent for teams loaded from cache.
    locator_token: Option<String>,
}

impl Team {
    pub fn new(league: League, name: impl Into<String>, locator_token: Option<String>) -> Self {
        let name = name.into().trim().to_string();
        Self {
            id: TeamId::new(&name, league.season()),
            league,
            name,
            locator_token,
        }
    }

    pub fn id(&self) -> &TeamId {
        &self.id
    }

    pub fn league(&self) -> &League {
        &self.league
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn season(&self) -> Season {
        self.league.season()
    }

    pub fn slug(&self) -> String {
        slug(&self.name)
    }

    /// Path of the team's roster page, relative to the source base URL.
    pub fn locator(&self) -> Option<String> {
        self.locator_token.as_ref().map(|token| {
            format!(
                "{}/{}/{}",
                self.league.country(),
                self.league.season(),
                token
            )
        })
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.league.season())
    }
}
