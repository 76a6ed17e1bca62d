use crate::cache::{roster_file, PlayerCache};
use crate::error::{Result, SquadError};
use crate::model::{resolve_leagues, Country, PlayerSet, Season, Team};
use crate::progress::{Notifier, ProgressEvent};

use super::GameGraph;

/// Rebuilds a [`GameGraph`] from everything persisted in the cache.
pub struct GraphLoader {
    cache: PlayerCache,
    notifier: Notifier,
}

impl GraphLoader {
    pub fn new(cache: PlayerCache, notifier: Notifier) -> Self {
        Self { cache, notifier }
    }

    /// Load the graph on the blocking pool.
    pub async fn load(&self) -> Result<GameGraph> {
        let cache = self.cache.clone();
        let notifier = self.notifier.clone();

        tokio::task::spawn_blocking(move || load_from_cache(&cache, &notifier))
            .await
            .map_err(|e| SquadError::Io(std::io::Error::other(e.to_string())))?
    }
}

/// Walk countries, seasons, resolved leagues and team directories, folding
/// one player set per cached roster into the graph.
///
/// Countries, seasons or leagues missing from disk are simply absent from
/// the result. A directory that does not name a known country or a season is
/// an error.
pub fn load_from_cache(cache: &PlayerCache, notifier: &Notifier) -> Result<GameGraph> {
    let mut graph = GameGraph::new();
    let country_dirs = cache.country_dirs()?;
    notifier.emit(ProgressEvent::DirCount(country_dirs.len()));

    for (done, code) in country_dirs.iter().enumerate() {
        let country = Country::from_code(code)?;
        notifier.message(format!("Loading data for {}", code));

        for label in cache.season_dirs(country)? {
            let season = Season::parse(&label)?;
            for league in resolve_leagues(country, season) {
                for roster in cache.cached_rosters(&league)? {
                    // Rosters written without a name file only have the slug.
                    let name = roster
                        .team_name
                        .clone()
                        .unwrap_or_else(|| roster.team_dir.replace('-', " "));
                    let team = Team::new(league.clone(), name, None);
                    let mut set = PlayerSet::new(team.id().to_string());
                    set.add_team(&team);
                    for player in roster_file::read(&roster.path)? {
                        set.join(player, &team);
                    }
                    log::debug!("Loaded {} players for {}", set.len(), team);
                    graph.add(set);
                }
            }
        }

        notifier.emit(ProgressEvent::DirProgress(done + 1));
    }

    let stats = graph.stats();
    log::info!(
        "Loaded {} players in {} teams from {}",
        stats.players,
        stats.teams,
        cache.root().display()
    );
    notifier.message("Done");
    Ok(graph)
}
