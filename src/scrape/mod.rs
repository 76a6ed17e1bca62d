//! Page-fetch boundary: discovers teams in a league and players in a team.

pub mod html;
mod http;

pub use http::HttpFetcher;

use crate::error::Result;

/// A team listed on a league page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamLink {
    /// Page reference of the team, relative to the league's season directory.
    pub token: String,
    pub name: String,
}

/// One row of a roster table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub dob: String,
}

/// Source of league and team pages.
///
/// Locators are paths relative to the source base URL, as produced by
/// [`League::locator`](crate::model::League::locator) and
/// [`Team::locator`](crate::model::Team::locator).
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch_league_teams(&self, locator: &str) -> Result<Vec<TeamLink>>;

    /// Current squad only; departed players are excluded.
    async fn fetch_team_roster(&self, locator: &str) -> Result<Vec<RosterEntry>>;
}
