//! The game graph: a bipartite graph of players and season-scoped teams.
//!
//! Players and teams live in identifier-keyed arenas. Adjacency is kept as
//! identifiers in both directions, so neither side holds the other.

pub mod index;
mod loader;

pub use index::NameIndex;
pub use loader::GraphLoader;

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Player, PlayerId, PlayerSet, Team, TeamId};

/// Graph size summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub players: usize,
    pub teams: usize,
    pub memberships: usize,
    pub player_sets: usize,
    /// Identifiers seen again with a different name or date of birth.
    pub collisions: usize,
}

#[derive(Debug, Default)]
pub struct GameGraph {
    /// Each player's `teams` is the player-to-team adjacency.
    players: HashMap<PlayerId, Player>,
    order: Vec<PlayerId>,
    teams: HashMap<TeamId, Team>,
    team_players: HashMap<TeamId, Vec<PlayerId>>,
    index: NameIndex,
    player_sets: usize,
    collisions: usize,
}

impl GameGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a player set into the graph.
    ///
    /// The first player registered under an identifier is kept; later
    /// instances only contribute their team memberships.
    pub fn add(&mut self, set: PlayerSet) {
        self.player_sets += 1;

        for team in set.teams() {
            self.teams
                .entry(team.id().clone())
                .or_insert_with(|| team.clone());
        }

        for player in set.players() {
            let id = player.id().clone();
            match self.players.get_mut(&id) {
                Some(existing) => {
                    if existing.name() != player.name() || existing.dob() != player.dob() {
                        self.collisions += 1;
                        log::warn!(
                            "Player id {} already registered as '{}', ignoring '{}' from {}",
                            id,
                            existing,
                            player,
                            set.name()
                        );
                    }
                    for team in player.teams() {
                        existing.add_team(team);
                    }
                }
                None => {
                    let mut registered = Player::with_id(id.clone(), player.name(), player.dob());
                    for team in player.teams() {
                        registered.add_team(team);
                    }
                    self.index
                        .insert(self.order.len(), registered.name(), registered.dob());
                    self.order.push(id.clone());
                    self.players.insert(id.clone(), registered);
                }
            }

            for team in player.teams() {
                let members = self.team_players.entry(team.clone()).or_default();
                if !members.contains(&id) {
                    members.push(id.clone());
                }
            }
        }
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn team(&self, id: &TeamId) -> Option<&Team> {
        self.teams.get(id)
    }

    /// Teams the player belonged to, in the order they were recorded.
    pub fn find_teams(&self, player: &PlayerId) -> Vec<&Team> {
        self.players
            .get(player)
            .map(|p| p.teams().iter().filter_map(|t| self.teams.get(t)).collect())
            .unwrap_or_default()
    }

    /// Players of a team, in the order they were recorded.
    pub fn find_players(&self, team: &TeamId) -> Vec<&Player> {
        self.team_players
            .get(team)
            .map(|ids| ids.iter().filter_map(|id| self.players.get(id)).collect())
            .unwrap_or_default()
    }

    /// Every player matching the query, in insertion order.
    ///
    /// Each whitespace-separated term must match: a date of birth exactly, or
    /// a prefix of a name token. Matching ignores case and diacritics.
    pub fn find_players_by_name(&self, query: &str) -> Vec<&Player> {
        self.index
            .search(query)
            .into_iter()
            .filter_map(|ordinal| self.order.get(ordinal))
            .filter_map(|id| self.players.get(id))
            .collect()
    }

    /// The first player matching the query.
    pub fn find_player_by_name(&self, query: &str) -> Option<&Player> {
        self.find_players_by_name(query).into_iter().next()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            players: self.players.len(),
            teams: self.teams.len(),
            memberships: self.team_players.values().map(Vec::len).sum(),
            player_sets: self.player_sets,
            collisions: self.collisions,
        }
    }
}
