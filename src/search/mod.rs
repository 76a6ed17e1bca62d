//! Breadth-first path search between two players.
//!
//! The search is seeded at the target and expands until the source is
//! dequeued, alternating between players and teams. Every discovered node
//! keeps the index of the node that discovered it, so the path is read off
//! by walking parents from the source back to the target.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use serde::Serialize;

use crate::graph::GameGraph;
use crate::model::{Player, PlayerId, Team, TeamId};
use crate::progress::Notifier;

/// A node of the bipartite graph, by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entity {
    Player(PlayerId),
    Team(TeamId),
}

#[derive(Debug)]
struct SearchNode {
    entity: Entity,
    parent: Option<usize>,
}

/// One step of a found path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PathEntity {
    Player(Player),
    Team(Team),
}

impl fmt::Display for PathEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathEntity::Player(player) => f.write_str(player.name()),
            PathEntity::Team(team) => write!(f, "{}", team),
        }
    }
}

/// Alternating player/team sequence from the source player to the target.
/// Empty when the two players are not connected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlayerPath {
    entities: Vec<PathEntity>,
}

impl PlayerPath {
    pub fn entities(&self) -> &[PathEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of team hops linking the two players.
    pub fn degree(&self) -> Option<usize> {
        if self.entities.is_empty() {
            None
        } else {
            Some((self.entities.len() - 1) / 2)
        }
    }
}

impl fmt::Display for PlayerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entity) in self.entities.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", entity)?;
        }
        Ok(())
    }
}

pub struct PathSearch<'g> {
    graph: &'g GameGraph,
    notifier: Notifier,
}

impl<'g> PathSearch<'g> {
    pub fn new(graph: &'g GameGraph, notifier: Notifier) -> Self {
        Self { graph, notifier }
    }

    /// Shortest path from `source` to `target`.
    pub fn find_path(&self, source: &Player, target: &Player) -> PlayerPath {
        self.notifier
            .step(format!("Searching from {} to {}", source.name(), target.name()));

        let mut nodes = vec![SearchNode {
            entity: Entity::Player(target.id().clone()),
            parent: None,
        }];
        let mut queue = VecDeque::from([0usize]);
        let mut visited: HashSet<Entity> = HashSet::new();

        while let Some(current) = queue.pop_front() {
            let entity = nodes[current].entity.clone();
            if !visited.insert(entity.clone()) {
                continue;
            }

            let neighbours: Vec<Entity> = match &entity {
                Entity::Player(id) => {
                    if id == source.id() {
                        log::debug!("Path found after expanding {} nodes", visited.len());
                        return self.reconstruct(&nodes, current, source, target);
                    }
                    let name = self.graph.player(id).map_or(id.as_str(), |p| p.name());
                    self.notifier.step(format!("Looking at player: {}", name));
                    self.graph
                        .find_teams(id)
                        .into_iter()
                        .map(|t| Entity::Team(t.id().clone()))
                        .collect()
                }
                Entity::Team(id) => {
                    match self.graph.team(id) {
                        Some(team) => self.notifier.step(format!("Looking at team: {}", team)),
                        None => self.notifier.step(format!("Looking at team: {}", id)),
                    }
                    self.graph
                        .find_players(id)
                        .into_iter()
                        .map(|p| Entity::Player(p.id().clone()))
                        .collect()
                }
            };

            for next in neighbours {
                if visited.contains(&next) {
                    continue;
                }
                nodes.push(SearchNode {
                    entity: next,
                    parent: Some(current),
                });
                queue.push_back(nodes.len() - 1);
            }
        }

        log::debug!(
            "No path between {} and {} ({} nodes expanded)",
            source.name(),
            target.name(),
            visited.len()
        );
        PlayerPath::default()
    }

    fn reconstruct(
        &self,
        nodes: &[SearchNode],
        terminal: usize,
        source: &Player,
        target: &Player,
    ) -> PlayerPath {
        let mut entities = Vec::new();
        let mut current = Some(terminal);
        while let Some(idx) = current {
            let step = match &nodes[idx].entity {
                Entity::Player(id) => self
                    .graph
                    .player(id)
                    .or_else(|| [source, target].into_iter().find(|p| p.id() == id))
                    .cloned()
                    .map(PathEntity::Player),
                Entity::Team(id) => self.graph.team(id).cloned().map(PathEntity::Team),
            };
            entities.extend(step);
            current = nodes[idx].parent;
        }
        PlayerPath { entities }
    }
}
