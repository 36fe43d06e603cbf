use crate::arena::{is_opponent, PlayerId, PlayerState, PossessionInfo, StunInfo, TeamId};
use crate::{normalize_or_zero, CollisionPolicy, DashConfig};
use nalgebra::Vector2;

/// What the resolver needs to know about one player in a contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub team: Option<TeamId>,
    pub state: PlayerState,
    pub position: Vector2<f32>,
    pub velocity: Vector2<f32>,
    pub carrying: bool,
    /// Not carrying and outside the post-drop cooldown
    pub can_pick_up: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallSnapshot {
    pub position: Vector2<f32>,
    pub speed: f32,
    pub charged: bool,
    pub ownable: bool,
    /// Most recent holder and their team
    pub last_owner: Option<(PlayerId, Option<TeamId>)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactOther {
    /// A player, reached either through their body or through the ball they carry
    Player(PlayerSnapshot),
    LooseBall,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub initiator: PlayerSnapshot,
    pub other: ContactOther,
    /// The ball itself was touched, not just a body
    pub hit_ball: bool,
    pub ball: BallSnapshot,
}

/// Transitions a contact asks for, to be attempted in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Stun { player: PlayerId, info: StunInfo },
    Possession { player: PlayerId, info: PossessionInfo },
}

/// Decides steal, stun and pickup outcomes of contacts. Pure: it only reads
/// snapshots, the engine applies the interactions through guarded transitions.
pub struct CollisionInteractionResolver<'p> {
    policy: &'p CollisionPolicy,
    dash: &'p DashConfig,
}

impl<'p> CollisionInteractionResolver<'p> {
    pub fn new(policy: &'p CollisionPolicy, dash: &'p DashConfig) -> Self {
        CollisionInteractionResolver { policy, dash }
    }

    pub fn resolve(&self, contact: &Contact) -> Vec<Interaction> {
        let initiator = &contact.initiator;

        match contact.other {
            ContactOther::Player(other) => {
                if other.id == initiator.id || !is_opponent(initiator.team, other.team) {
                    return Vec::new();
                }

                // Contests are fought by dashing players only
                if initiator.state != PlayerState::Dash {
                    return Vec::new();
                }

                if other.carrying {
                    self.contest_carrier(contact, &other)
                } else if !self.policy.only_stun_ball_carriers {
                    vec![Interaction::Stun {
                        player: other.id,
                        info: self.steal_knockback(initiator),
                    }]
                } else {
                    Vec::new()
                }
            }
            ContactOther::LooseBall => self.touch_loose_ball(contact),
        }
    }

    fn contest_carrier(&self, contact: &Contact, victim: &PlayerSnapshot) -> Vec<Interaction> {
        let initiator = &contact.initiator;

        // A charged ball stuns whoever touches it, so the initiator goes down here
        if contact.ball.charged && self.policy.charged_ball_stuns {
            return vec![Interaction::Stun {
                player: initiator.id,
                info: self.charged_knockback(initiator, &contact.ball),
            }];
        }

        if self.policy.only_steal_on_ball_hit && !contact.hit_ball {
            return Vec::new();
        }

        // The victim loses the ball first so the thief finds it ownable
        vec![
            Interaction::Stun {
                player: victim.id,
                info: self.steal_knockback(initiator),
            },
            Interaction::Possession {
                player: initiator.id,
                info: PossessionInfo {
                    stole_ball: true,
                    victim: Some(victim.id),
                },
            },
        ]
    }

    fn touch_loose_ball(&self, contact: &Contact) -> Vec<Interaction> {
        let initiator = &contact.initiator;
        let ball = &contact.ball;

        if !ball.ownable {
            return Vec::new();
        }

        let thrown_by_opponent = ball
            .last_owner
            .is_some_and(|(owner, team)| owner != initiator.id && is_opponent(team, initiator.team));

        if ball.charged && self.policy.charged_ball_stuns && thrown_by_opponent {
            return vec![Interaction::Stun {
                player: initiator.id,
                info: self.charged_knockback(initiator, ball),
            }];
        }

        if !initiator.can_pick_up {
            return Vec::new();
        }

        vec![Interaction::Possession {
            player: initiator.id,
            info: PossessionInfo::default(),
        }]
    }

    fn steal_knockback(&self, initiator: &PlayerSnapshot) -> StunInfo {
        StunInfo {
            knockback: normalize_or_zero(&initiator.velocity) * self.dash.steal_knockback_amount,
            duration: self.dash.steal_knockback_length,
            is_networked: true,
        }
    }

    fn charged_knockback(&self, player: &PlayerSnapshot, ball: &BallSnapshot) -> StunInfo {
        StunInfo {
            knockback: (player.position - ball.position) * ball.speed,
            duration: self.policy.charged_knockback_duration,
            is_networked: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: PlayerId, team: Option<u8>) -> PlayerSnapshot {
        PlayerSnapshot {
            id,
            team: team.map(TeamId),
            state: PlayerState::NormalMovement,
            position: Vector2::zeros(),
            velocity: Vector2::zeros(),
            carrying: false,
            can_pick_up: true,
        }
    }

    fn dashing(id: PlayerId, team: Option<u8>) -> PlayerSnapshot {
        PlayerSnapshot {
            state: PlayerState::Dash,
            velocity: Vector2::new(3.0, 0.0),
            ..snapshot(id, team)
        }
    }

    fn carrier(id: PlayerId, team: Option<u8>) -> PlayerSnapshot {
        PlayerSnapshot {
            state: PlayerState::Possession,
            carrying: true,
            can_pick_up: false,
            position: Vector2::new(1.0, 0.0),
            ..snapshot(id, team)
        }
    }

    fn ball() -> BallSnapshot {
        BallSnapshot {
            position: Vector2::new(1.5, 0.0),
            speed: 0.0,
            charged: false,
            ownable: true,
            last_owner: None,
        }
    }

    fn body_contact(initiator: PlayerSnapshot, other: PlayerSnapshot) -> Contact {
        Contact {
            initiator,
            other: ContactOther::Player(other),
            hit_ball: false,
            ball: BallSnapshot {
                ownable: false,
                ..ball()
            },
        }
    }

    fn resolve(policy: &CollisionPolicy, contact: &Contact) -> Vec<Interaction> {
        let dash = DashConfig::default();
        CollisionInteractionResolver::new(policy, &dash).resolve(contact)
    }

    #[test]
    fn test_teammates_never_interact() {
        let policies = [
            CollisionPolicy::default(),
            CollisionPolicy {
                charged_ball_stuns: true,
                only_stun_ball_carriers: false,
                ..CollisionPolicy::default()
            },
        ];

        for policy in &policies {
            for team in 0..4 {
                let carried = body_contact(dashing(1, Some(team)), carrier(2, Some(team)));
                let empty = body_contact(dashing(1, Some(team)), snapshot(2, Some(team)));

                assert!(resolve(policy, &carried).is_empty());
                assert!(resolve(policy, &empty).is_empty());
            }
        }
    }

    #[test]
    fn test_steal_stuns_victim_before_possession() {
        let contact = body_contact(dashing(1, Some(1)), carrier(2, Some(2)));

        let interactions = resolve(&CollisionPolicy::default(), &contact);

        assert_eq!(interactions.len(), 2);
        match interactions[0] {
            Interaction::Stun { player, info } => {
                assert_eq!(player, 2);
                assert!(info.is_networked);
                assert_eq!(info.duration, 0.5);
                assert_eq!(info.knockback, Vector2::new(100.0, 0.0));
            }
            other => panic!("expected stun, got {:?}", other),
        }
        assert_eq!(
            interactions[1],
            Interaction::Possession {
                player: 1,
                info: PossessionInfo {
                    stole_ball: true,
                    victim: Some(2)
                }
            }
        );
    }

    #[test]
    fn test_unassigned_players_contest_each_other() {
        let contact = body_contact(dashing(1, None), carrier(2, None));

        assert_eq!(resolve(&CollisionPolicy::default(), &contact).len(), 2);
    }

    #[test]
    fn test_charged_carried_ball_stuns_without_steal() {
        let policy = CollisionPolicy {
            charged_ball_stuns: true,
            ..CollisionPolicy::default()
        };

        let mut contact = body_contact(dashing(1, Some(1)), carrier(2, Some(2)));
        contact.ball.charged = true;
        contact.ball.speed = 2.0;

        let interactions = resolve(&policy, &contact);

        assert_eq!(interactions.len(), 1);
        match interactions[0] {
            Interaction::Stun { player, info } => {
                assert_eq!(player, 1);
                assert_eq!(info.knockback, Vector2::new(-3.0, 0.0));
            }
            other => panic!("expected stun, got {:?}", other),
        }
    }

    #[test]
    fn test_steal_only_on_ball_hit() {
        let policy = CollisionPolicy {
            only_steal_on_ball_hit: true,
            ..CollisionPolicy::default()
        };

        let mut contact = body_contact(dashing(1, Some(1)), carrier(2, Some(2)));
        assert!(resolve(&policy, &contact).is_empty());

        contact.hit_ball = true;
        assert_eq!(resolve(&policy, &contact).len(), 2);
    }

    #[test]
    fn test_non_carrier_stun_policy() {
        let contact = body_contact(dashing(1, Some(1)), snapshot(2, Some(2)));

        assert!(resolve(&CollisionPolicy::default(), &contact).is_empty());

        let policy = CollisionPolicy {
            only_stun_ball_carriers: false,
            ..CollisionPolicy::default()
        };
        let interactions = resolve(&policy, &contact);

        assert!(matches!(interactions[..], [Interaction::Stun { player: 2, .. }]));
    }

    #[test]
    fn test_walking_into_carrier_is_not_a_contest() {
        let contact = body_contact(snapshot(1, Some(1)), carrier(2, Some(2)));

        assert!(resolve(&CollisionPolicy::default(), &contact).is_empty());
    }

    #[test]
    fn test_loose_ball_pickup_respects_cooldown() {
        let mut contact = Contact {
            initiator: snapshot(1, Some(1)),
            other: ContactOther::LooseBall,
            hit_ball: true,
            ball: ball(),
        };

        assert!(matches!(
            resolve(&CollisionPolicy::default(), &contact)[..],
            [Interaction::Possession { player: 1, info: PossessionInfo { stole_ball: false, .. } }]
        ));

        contact.initiator.can_pick_up = false;
        assert!(resolve(&CollisionPolicy::default(), &contact).is_empty());

        contact.initiator.can_pick_up = true;
        contact.ball.ownable = false;
        assert!(resolve(&CollisionPolicy::default(), &contact).is_empty());
    }

    #[test]
    fn test_loose_charged_ball_from_opponent_stuns() {
        let policy = CollisionPolicy {
            charged_ball_stuns: true,
            ..CollisionPolicy::default()
        };

        let mut contact = Contact {
            initiator: snapshot(1, Some(1)),
            other: ContactOther::LooseBall,
            hit_ball: true,
            ball: BallSnapshot {
                charged: true,
                speed: 1.0,
                last_owner: Some((2, Some(TeamId(2)))),
                ..ball()
            },
        };

        assert!(matches!(
            resolve(&policy, &contact)[..],
            [Interaction::Stun { player: 1, .. }]
        ));

        contact.ball.last_owner = Some((3, Some(TeamId(1))));
        assert!(matches!(
            resolve(&policy, &contact)[..],
            [Interaction::Possession { player: 1, .. }]
        ));
    }
}
