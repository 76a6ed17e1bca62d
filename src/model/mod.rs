//! Identity model shared by the crawler, the cache and the game graph.

mod league;
mod player;
mod season;
mod team;

pub use league::{resolve_leagues, Country, League};
pub use player::{Player, PlayerId, PlayerSet};
pub use season::Season;
pub use team::{slug, Team, TeamId};
