//! Resumable crawl over (country × season × league × team).
//!
//! A stack of work units drives the walk. Expanding a league pushes an
//! end-of-league marker and then one unit per team; the marker sits beneath
//! the team units, so it is only reached once every team has been handled.
//! Anything the cache already holds is skipped, which makes a re-run after a
//! failure redo only unfinished units.

use futures_util::future::try_join_all;

use crate::cache::PlayerCache;
use crate::error::{Result, SquadError};
use crate::model::{resolve_leagues, Country, League, Player, PlayerSet, Season, Team};
use crate::progress::Notifier;
use crate::scrape::PageFetcher;

/// One unit of crawl work.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkUnit {
    League(League),
    LeagueAndTeam(Team),
    EndOfLeague(League),
}

/// Seasons `[start, end)` for the given countries.
#[derive(Debug, Clone)]
pub struct CrawlPlan {
    pub start: Season,
    pub end: Season,
    pub countries: Vec<Country>,
}

/// Outcome of a crawl run.
#[derive(Debug, Default)]
pub struct CrawlReport {
    pub leagues_crawled: usize,
    pub leagues_skipped: usize,
    pub teams_fetched: usize,
    pub teams_skipped: usize,
    /// Players fetched during this run, with their team memberships.
    pub players: PlayerSet,
}

pub struct Crawler<F> {
    fetcher: F,
    cache: PlayerCache,
    notifier: Notifier,
    team_concurrency: usize,
}

impl<F: PageFetcher> Crawler<F> {
    pub fn new(fetcher: F, cache: PlayerCache, notifier: Notifier) -> Self {
        Self {
            fetcher,
            cache,
            notifier,
            team_concurrency: 1,
        }
    }

    /// Fetch up to `n` rosters of the same league at once. The league marker
    /// is still written only after all of them have been stored.
    pub fn with_team_concurrency(mut self, n: usize) -> Self {
        self.team_concurrency = n.max(1);
        self
    }

    pub fn cache(&self) -> &PlayerCache {
        &self.cache
    }

    /// Walk every season of the plan. A fetch or cache failure aborts the run.
    pub async fn run(&self, plan: &CrawlPlan) -> Result<CrawlReport> {
        self.cache.init().await?;

        let mut report = CrawlReport {
            players: PlayerSet::new("crawl"),
            ..Default::default()
        };
        let mut stack: Vec<WorkUnit> = Vec::new();

        let mut season = plan.start;
        while season < plan.end {
            self.push_season(season, &plan.countries, &mut stack);

            while let Some(unit) = stack.pop() {
                match unit {
                    WorkUnit::League(league) => {
                        self.expand_league(league, &mut stack, &mut report).await?;
                    }
                    WorkUnit::LeagueAndTeam(team) => {
                        let mut batch = vec![team];
                        while batch.len() < self.team_concurrency {
                            match stack.last() {
                                Some(WorkUnit::LeagueAndTeam(next))
                                    if next.league() == batch[0].league() => {}
                                _ => break,
                            }
                            if let Some(WorkUnit::LeagueAndTeam(next)) = stack.pop() {
                                batch.push(next);
                            }
                        }
                        self.crawl_teams(batch, &mut report).await?;
                    }
                    WorkUnit::EndOfLeague(league) => {
                        self.cache.mark_league_done(&league).await?;
                        log::info!("League {} complete", league);
                        self.notifier.message(format!("Finished {}", league));
                    }
                }
            }

            season = season.next();
        }

        log::info!(
            "Crawl finished: leagues crawled={}, skipped={}; teams fetched={}, skipped={}",
            report.leagues_crawled,
            report.leagues_skipped,
            report.teams_fetched,
            report.teams_skipped
        );
        Ok(report)
    }

    fn push_season(&self, season: Season, countries: &[Country], stack: &mut Vec<WorkUnit>) {
        let codes: Vec<_> = countries.iter().map(|c| c.code()).collect();
        log::info!("Adding crawl jobs for [{}] for season {}", codes.join(","), season);
        self.notifier
            .message(format!("Season {}: {} countries", season, countries.len()));

        for country in countries {
            for league in resolve_leagues(*country, season) {
                stack.push(WorkUnit::League(league));
            }
        }
    }

    async fn expand_league(
        &self,
        league: League,
        stack: &mut Vec<WorkUnit>,
        report: &mut CrawlReport,
    ) -> Result<()> {
        if self.cache.league_marker_exists(&league).await? {
            log::debug!("Skipping cached league {}", league);
            report.leagues_skipped += 1;
            return Ok(());
        }

        self.cache.init_league_dir(&league).await?;
        let links = self.fetcher.fetch_league_teams(&league.locator()).await?;
        log::info!("League {}: {} teams", league, links.len());
        self.notifier
            .message(format!("{}: {} teams", league, links.len()));

        // Beneath the team units: popped only after every team was handled.
        stack.push(WorkUnit::EndOfLeague(league.clone()));
        for link in links {
            let team = Team::new(league.clone(), link.name, Some(link.token));
            stack.push(WorkUnit::LeagueAndTeam(team));
        }
        report.leagues_crawled += 1;
        Ok(())
    }

    async fn crawl_teams(&self, batch: Vec<Team>, report: &mut CrawlReport) -> Result<()> {
        let rosters = try_join_all(batch.iter().map(|team| self.crawl_team(team))).await?;

        for (team, roster) in batch.iter().zip(rosters) {
            match roster {
                Some(players) => {
                    report.teams_fetched += 1;
                    report.players.add_team(team);
                    for player in players {
                        report.players.join(player, team);
                    }
                }
                None => report.teams_skipped += 1,
            }
        }
        Ok(())
    }

    /// Fetch and store one roster; `None` when the cache already has it.
    async fn crawl_team(&self, team: &Team) -> Result<Option<Vec<Player>>> {
        if self.cache.team_roster_exists(team).await? {
            log::debug!("Skipping cached team {}", team);
            return Ok(None);
        }

        let locator = team.locator().ok_or_else(|| {
            SquadError::Lookup(format!("Team {} has no page locator", team))
        })?;
        log::info!("=== {} ===", team);
        self.notifier.message(format!("Fetching {}", team));

        let entries = self.fetcher.fetch_team_roster(&locator).await?;
        let players: Vec<Player> = entries
            .into_iter()
            .filter_map(|entry| {
                let name = entry.name.trim();
                if name.is_empty() {
                    return None;
                }
                Some(Player::new(name, entry.dob.trim()))
            })
            .collect();

        self.cache.store_team_roster(team, &players).await?;
        Ok(Some(players))
    }
}
