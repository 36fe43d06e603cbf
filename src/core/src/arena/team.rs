use crate::arena::PlayerId;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub u8);

impl Display for TeamId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Team {}", self.0)
    }
}

/// Players without a team are opponents of everyone, including each other.
pub fn is_opponent(left: Option<TeamId>, right: Option<TeamId>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => left != right,
        _ => true,
    }
}

#[derive(Debug, Clone)]
pub struct Team {
    pub id: TeamId,
    pub members: Vec<PlayerId>,
}

impl Team {
    pub fn new(id: TeamId) -> Self {
        Team {
            id,
            members: Vec::new(),
        }
    }
}

/// Round-robin team assignment, players join teams in arrival order.
#[derive(Debug, Clone)]
pub struct TeamAssignment {
    teams: Vec<Team>,
    next_index: usize,
}

impl TeamAssignment {
    pub fn new(team_count: u8) -> Self {
        // Team numbers start at 1
        let teams = (1..=team_count).map(|n| Team::new(TeamId(n))).collect();

        TeamAssignment {
            teams,
            next_index: 0,
        }
    }

    pub fn assign(&mut self, player_id: PlayerId) -> Option<TeamId> {
        if self.teams.is_empty() {
            return None;
        }

        let count = self.teams.len();

        let team = &mut self.teams[self.next_index];
        team.members.push(player_id);
        let team_id = team.id;

        self.next_index = (self.next_index + 1) % count;

        debug!("assigned player {} to {}", player_id, team_id);

        Some(team_id)
    }

    pub fn team_of(&self, player_id: PlayerId) -> Option<TeamId> {
        self.teams
            .iter()
            .find(|t| t.members.contains(&player_id))
            .map(|t| t.id)
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teammates_are_not_opponents() {
        for n in 0..4 {
            assert!(!is_opponent(Some(TeamId(n)), Some(TeamId(n))));
        }
    }

    #[test]
    fn test_unassigned_is_opponent() {
        assert!(is_opponent(None, Some(TeamId(1))));
        assert!(is_opponent(Some(TeamId(1)), None));
        assert!(is_opponent(None, None));
        assert!(is_opponent(Some(TeamId(1)), Some(TeamId(2))));
    }

    #[test]
    fn test_round_robin_assignment() {
        let mut assignment = TeamAssignment::new(2);

        assert_eq!(assignment.assign(10), Some(TeamId(1)));
        assert_eq!(assignment.assign(11), Some(TeamId(2)));
        assert_eq!(assignment.assign(12), Some(TeamId(1)));

        assert_eq!(assignment.team_of(12), Some(TeamId(1)));
        assert_eq!(assignment.team_of(99), None);
        assert_eq!(assignment.teams()[0].members, vec![10, 12]);
    }

    #[test]
    fn test_no_teams_leaves_player_unassigned() {
        let mut assignment = TeamAssignment::new(0);

        assert_eq!(assignment.assign(1), None);
    }
}
