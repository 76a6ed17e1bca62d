pub mod cache;
pub mod config;
pub mod crawl;
pub mod error;
pub mod graph;
pub mod model;
pub mod progress;
pub mod scrape;
pub mod search;

pub use config::Config;
pub use error::{Result, SquadError};
pub use graph::{GameGraph, GraphLoader};
pub use model::{Country, League, Player, PlayerId, PlayerSet, Season, Team, TeamId};
pub use search::{PathSearch, PlayerPath};
