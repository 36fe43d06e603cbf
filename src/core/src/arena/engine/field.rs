use crate::arena::{
    ArenaPlayer, Ball, BallSnapshot, CollisionEvent, ContactPhase, ContactTarget, Layer, PlayerId,
    PlayerSnapshot, PlayerState, TeamId,
};
use crate::MatchConfig;
use itertools::Itertools;
use nalgebra::Vector2;
use std::collections::HashSet;
use std::f32::consts::PI;

/// Arena centered on the origin, goals cut into the left and right walls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaBounds {
    pub half_width: f32,
    pub half_height: f32,
    pub goal_half_width: f32,
    pub ball_radius: f32,
    pub player_radius: f32,
}

impl ArenaBounds {
    pub fn from_config(config: &MatchConfig) -> Self {
        ArenaBounds {
            half_width: config.width / 2.0,
            half_height: config.height / 2.0,
            goal_half_width: config.goal_width / 2.0,
            ball_radius: config.ball_radius,
            player_radius: config.player_radius,
        }
    }

    pub fn in_goal_mouth(&self, y: f32) -> bool {
        y.abs() <= self.goal_half_width
    }

    pub fn touches_wall(&self, position: &Vector2<f32>) -> bool {
        const WALL_CONTACT: f32 = 1e-3;

        position.x.abs() >= self.half_width - self.player_radius - WALL_CONTACT
            || position.y.abs() >= self.half_height - self.player_radius - WALL_CONTACT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalSide {
    Left,
    Right,
}

impl GoalSide {
    /// Team 1 kicks off from the left, team 2 from the right.
    pub fn defending_team(self, team_count: u8) -> Option<TeamId> {
        match self {
            GoalSide::Left if team_count >= 1 => Some(TeamId(1)),
            GoalSide::Right if team_count >= 2 => Some(TeamId(2)),
            _ => None,
        }
    }
}

pub struct ArenaField {
    pub bounds: ArenaBounds,
    pub ball: Ball,
    pub players: Vec<ArenaPlayer>,

    active_contacts: HashSet<(PlayerId, ContactTarget)>,
}

impl ArenaField {
    pub fn new(config: &MatchConfig) -> Self {
        ArenaField {
            bounds: ArenaBounds::from_config(config),
            ball: Ball::with_coord(0.0, 0.0),
            players: Vec::new(),
            active_contacts: HashSet::new(),
        }
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&ArenaPlayer> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn index_of(&self, player_id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    /// Kickoff spot and facing for the `slot`-th player of a team.
    pub fn spawn_point(&self, team: Option<TeamId>, team_count: u8, slot: usize) -> (Vector2<f32>, f32) {
        let x = match team {
            Some(TeamId(n)) if team_count > 0 => {
                let lane = 2.0 * self.bounds.half_width / team_count as f32;
                -self.bounds.half_width + (n as f32 - 0.5) * lane
            }
            _ => 0.0,
        };

        // 0, +2, -2, +4, -4 ...
        let step = slot.div_ceil(2) as f32 * 2.0;
        let y = if slot % 2 == 1 { step } else { -step };
        let y = y.clamp(
            -self.bounds.half_height + self.bounds.player_radius,
            self.bounds.half_height - self.bounds.player_radius,
        );

        let rotation = if x > 0.0 { PI } else { 0.0 };

        (Vector2::new(x, y), rotation)
    }

    pub fn reset_players_positions(&mut self) {
        self.players.iter_mut().for_each(|p| p.reset_position());
    }

    pub fn check_goal(&self) -> Option<GoalSide> {
        if self.ball.owner().is_some() || !self.bounds.in_goal_mouth(self.ball.position.y) {
            return None;
        }

        if self.ball.position.x < -self.bounds.half_width {
            Some(GoalSide::Left)
        } else if self.ball.position.x > self.bounds.half_width {
            Some(GoalSide::Right)
        } else {
            None
        }
    }

    pub fn snapshot(&self, player_id: PlayerId, now: f32) -> Option<PlayerSnapshot> {
        self.player(player_id).map(|p| PlayerSnapshot {
            id: p.id,
            team: p.team,
            state: p.state(),
            position: p.body.position,
            velocity: p.body.velocity,
            carrying: p.is_carrying_ball(),
            can_pick_up: p.mechanics.carrier.can_pick_up(now),
        })
    }

    pub fn ball_snapshot(&self) -> BallSnapshot {
        BallSnapshot {
            position: self.ball.position,
            speed: self.ball.speed(),
            charged: self.ball.charged,
            ownable: self.ball.is_ownable(),
            last_owner: self
                .ball
                .last_owner()
                .map(|id| (id, self.player(id).and_then(|p| p.team))),
        }
    }

    /// Overlap tests for the headless runner. Contacts seen on the previous
    /// call are reported as `Stay`, new ones as `Enter`.
    pub fn detect_contacts(&mut self) -> Vec<CollisionEvent> {
        let mut touching = Vec::new();

        let reach = self.bounds.player_radius + self.bounds.ball_radius;

        for player in &self.players {
            if !self.ball.is_owned_by(player.id)
                && (player.body.position - self.ball.position).norm() <= reach
            {
                touching.push((player.id, ContactTarget::Ball, Layer::Ball));
            }

            if player.state() == PlayerState::Dash && self.bounds.touches_wall(&player.body.position) {
                touching.push((player.id, ContactTarget::Static, Layer::Wall));
            }
        }

        let body_reach = 2.0 * self.bounds.player_radius;

        for (a, b) in self.players.iter().tuple_combinations() {
            if (a.body.position - b.body.position).norm() > body_reach {
                continue;
            }

            // Only a dashing player starts a contest
            if a.state() == PlayerState::Dash {
                touching.push((a.id, ContactTarget::Player(b.id), Layer::Player));
            }
            if b.state() == PlayerState::Dash {
                touching.push((b.id, ContactTarget::Player(a.id), Layer::Player));
            }
        }

        let current: HashSet<_> = touching.iter().map(|(id, target, _)| (*id, *target)).collect();

        let events = touching
            .into_iter()
            .map(|(initiator, target, layer)| CollisionEvent {
                initiator,
                target,
                layer,
                phase: if self.active_contacts.contains(&(initiator, target)) {
                    ContactPhase::Stay
                } else {
                    ContactPhase::Enter
                },
            })
            .collect();

        self.active_contacts = current;

        events
    }
}
