//! Disk cache of crawled rosters.
//!
//! Layout: `<root>/<country>/<season>/<league>/league.done` marks a fully
//! crawled league, and `<root>/<country>/<season>/<league>/<team>/players`
//! holds one team's roster, with the team's display name in `team` beside it.
//! The presence of these two files is what makes a
//! crawl resumable.

pub mod roster_file;

use std::path::{Path, PathBuf};

use chrono::Utc;
use walkdir::WalkDir;

use crate::error::{Result, SquadError};
use crate::model::{Country, League, Player, Team};

const TEAM_DATA_FILE: &str = "players";
const TEAM_NAME_FILE: &str = "team";
const LEAGUE_MARKER: &str = "league.done";

/// A cached team roster found while enumerating a league directory.
#[derive(Debug, Clone)]
pub struct CachedRoster {
    /// Team directory name (the team's slug).
    pub team_dir: String,
    /// Display name stored with the roster, when present.
    pub team_name: Option<String>,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct PlayerCache {
    root: PathBuf,
}

impl PlayerCache {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn init(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub fn league_path(&self, league: &League) -> PathBuf {
        self.root
            .join(league.country().code())
            .join(league.season().to_string())
            .join(league.name())
    }

    pub fn team_path(&self, team: &Team) -> PathBuf {
        self.league_path(team.league()).join(team.slug())
    }

    pub async fn init_league_dir(&self, league: &League) -> Result<()> {
        tokio::fs::create_dir_all(self.league_path(league)).await?;
        Ok(())
    }

    pub async fn init_team_dir(&self, team: &Team) -> Result<()> {
        tokio::fs::create_dir_all(self.team_path(team)).await?;
        Ok(())
    }

    pub async fn league_marker_exists(&self, league: &League) -> Result<bool> {
        let marker = self.league_path(league).join(LEAGUE_MARKER);
        Ok(tokio::fs::try_exists(marker).await?)
    }

    /// Record that every team of `league` has been crawled.
    pub async fn mark_league_done(&self, league: &League) -> Result<()> {
        let marker = self.league_path(league).join(LEAGUE_MARKER);
        tokio::fs::write(marker, Utc::now().to_rfc3339()).await?;
        Ok(())
    }

    pub async fn team_roster_exists(&self, team: &Team) -> Result<bool> {
        let file = self.team_path(team).join(TEAM_DATA_FILE);
        Ok(tokio::fs::try_exists(file).await?)
    }

    /// Persist a roster. The file appears atomically so a crash never leaves
    /// a half-written roster that would be mistaken for a finished one.
    pub async fn store_team_roster(&self, team: &Team, players: &[Player]) -> Result<()> {
        self.init_team_dir(team).await?;
        let dir = self.team_path(team);
        let tmp = dir.join(format!("{}.tmp", TEAM_DATA_FILE));
        let bytes = roster_file::encode(players)?;
        tokio::fs::write(dir.join(TEAM_NAME_FILE), team.name()).await?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, dir.join(TEAM_DATA_FILE)).await?;
        Ok(())
    }

    /// Country directory names present under the root, sorted.
    pub fn country_dirs(&self) -> Result<Vec<String>> {
        Ok(subdirectories(&self.root)?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    /// Season directory names present for a country, sorted.
    pub fn season_dirs(&self, country: Country) -> Result<Vec<String>> {
        Ok(subdirectories(&self.root.join(country.code()))?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    /// Rosters stored under a league. A league absent from disk has none.
    pub fn cached_rosters(&self, league: &League) -> Result<Vec<CachedRoster>> {
        let mut rosters = Vec::new();
        for (team_dir, dir) in subdirectories(&self.league_path(league))? {
            let path = dir.join(TEAM_DATA_FILE);
            if path.is_file() {
                let team_name = read_team_name(&dir.join(TEAM_NAME_FILE))?;
                rosters.push(CachedRoster {
                    team_dir,
                    team_name,
                    path,
                });
            }
        }
        Ok(rosters)
    }
}

fn read_team_name(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(name) => {
            let name = name.trim();
            Ok((!name.is_empty()).then(|| name.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Immediate sub-directories of `dir` as (name, path), sorted by name.
fn subdirectories(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| SquadError::Io(e.into()))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        out.push((name, entry.into_path()));
    }
    Ok(out)
}
