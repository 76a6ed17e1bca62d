use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::{Team, TeamId};

/// Content-derived player identifier.
///
/// The same person found on unrelated rosters maps to the same identifier,
/// which is what joins rosters into one graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PlayerId(String);

impl PlayerId {
    /// SHA256 of name and date of birth, hex encoded.
    pub fn derive(name: &str, dob: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update([0x1f]);
        hasher.update(dob.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Wrap an identifier read back from a persisted roster.
    pub fn from_stored(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    id: PlayerId,
    name: String,
    dob: String,
    teams: Vec<TeamId>,
}

impl Player {
    pub fn new(name: impl Into<String>, dob: impl Into<String>) -> Self {
        let name = name.into();
        let dob = dob.into();
        Self {
            id: PlayerId::derive(&name, &dob),
            name,
            dob,
            teams: Vec::new(),
        }
    }

    pub fn with_id(id: PlayerId, name: impl Into<String>, dob: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            dob: dob.into(),
            teams: Vec::new(),
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dob(&self) -> &str {
        &self.dob
    }

    pub fn teams(&self) -> &[TeamId] {
        &self.teams
    }

    /// Record membership in a team. Repeated memberships are ignored.
    pub fn add_team(&mut self, team: &TeamId) {
        if !self.teams.contains(team) {
            self.teams.push(team.clone());
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dob.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} ({})", self.name, self.dob)
        }
    }
}

/// A named batch of players with their team memberships.
///
/// Produced once per crawl or per cached roster and merged into the game graph.
#[derive(Debug, Clone, Default)]
pub struct PlayerSet {
    name: String,
    players: Vec<Player>,
    index: HashMap<PlayerId, usize>,
    teams: Vec<Team>,
}

impl PlayerSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a player, returning the registered instance.
    ///
    /// A player whose identifier is already present is dropped in favour of
    /// the first one registered.
    pub fn add(&mut self, player: Player) -> &mut Player {
        let idx = match self.index.get(player.id()) {
            Some(&idx) => idx,
            None => {
                let idx = self.players.len();
                self.index.insert(player.id().clone(), idx);
                self.players.push(player);
                idx
            }
        };
        &mut self.players[idx]
    }

    /// Register a team without any players.
    pub fn add_team(&mut self, team: &Team) {
        if !self.teams.iter().any(|t| t.id() == team.id()) {
            self.teams.push(team.clone());
        }
    }

    /// Add a player and record its membership in `team`.
    pub fn join(&mut self, player: Player, team: &Team) {
        self.add_team(team);
        self.add(player).add_team(team.id());
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.index.get(id).map(|&idx| &self.players[idx])
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Country, League, Season};

    fn team(name: &str) -> Team {
        Team::new(
            League::new(Country::Italy, "seriea", Season::new(2004)),
            name,
            None,
        )
    }

    #[test]
    fn test_identity_is_pure() {
        let a = Player::new("Zlatan Ibrahimović", "03-10-81");
        let b = Player::new("Zlatan Ibrahimović", "03-10-81");
        assert_eq!(a.id(), b.id());
        assert_eq!(a.id().as_str().len(), 64);
    }

    #[test]
    fn test_identity_depends_on_dob() {
        let a = Player::new("Ronaldo", "22-09-76");
        let b = Player::new("Ronaldo", "18-02-77");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_field_boundary_is_unambiguous() {
        assert_ne!(PlayerId::derive("ab", "c"), PlayerId::derive("a", "bc"));
    }

    #[test]
    fn test_add_team_ignores_duplicates() {
        let t = team("Juventus");
        let mut p = Player::new("Pavel Nedved", "30-08-72");
        p.add_team(t.id());
        p.add_team(t.id());
        assert_eq!(p.teams().len(), 1);
    }

    #[test]
    fn test_player_set_first_write_wins() {
        let mut set = PlayerSet::new("test");
        let juve = team("Juventus");
        let inter = team("Internazionale");
        set.join(Player::new("Zlatan Ibrahimovic", "03-10-81"), &juve);
        set.join(Player::new("Zlatan Ibrahimovic", "03-10-81"), &inter);

        assert_eq!(set.len(), 1);
        assert_eq!(set.teams().count(), 2);
        let id = PlayerId::derive("Zlatan Ibrahimovic", "03-10-81");
        let player = set.get(&id).unwrap();
        assert_eq!(player.teams(), &[juve.id().clone(), inter.id().clone()]);
    }
}
