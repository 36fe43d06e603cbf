use crate::arena::{ArenaBounds, BallEvent, PlayerId};
use nalgebra::Vector2;

/// The single contested ball of a round.
///
/// `owner` is only written through [`Ball::take_ownership`] and
/// [`Ball::release_ownership`], which the carrier calls from inside state
/// hooks, so every ownership change follows a successful guarded transition.
#[derive(Debug, Clone)]
pub struct Ball {
    pub start_position: Vector2<f32>,
    pub position: Vector2<f32>,
    pub velocity: Vector2<f32>,

    /// A charged ball turns its carrier (or itself, when loose) into a stun threat
    pub charged: bool,

    owner: Option<PlayerId>,
    last_owner: Option<PlayerId>,
    ownable: bool,

    events: Vec<BallEvent>,
}

impl Ball {
    pub fn with_coord(x: f32, y: f32) -> Self {
        Ball {
            start_position: Vector2::new(x, y),
            position: Vector2::new(x, y),
            velocity: Vector2::zeros(),
            charged: false,
            owner: None,
            last_owner: None,
            ownable: true,
            events: Vec::new(),
        }
    }

    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    pub fn last_owner(&self) -> Option<PlayerId> {
        self.last_owner
    }

    pub fn is_owned_by(&self, player_id: PlayerId) -> bool {
        self.owner == Some(player_id)
    }

    pub fn is_ownable(&self) -> bool {
        self.owner.is_none() && self.ownable
    }

    /// Gates acquisition only, a current owner keeps the ball.
    pub fn set_ownable(&mut self, ownable: bool) {
        self.ownable = ownable;
    }

    pub(crate) fn take_ownership(&mut self, player_id: PlayerId) {
        assert!(
            self.is_ownable(),
            "player {} took a ball that is not ownable (owner {:?})",
            player_id,
            self.owner
        );

        self.set_owner(Some(player_id));
    }

    pub(crate) fn release_ownership(&mut self, player_id: PlayerId) {
        assert_eq!(
            self.owner,
            Some(player_id),
            "player {} released a ball it does not own",
            player_id
        );

        self.set_owner(None);
    }

    fn set_owner(&mut self, owner: Option<PlayerId>) {
        if let Some(previous) = self.owner {
            self.last_owner = Some(previous);
        }

        self.owner = owner;

        if let Some(current) = owner {
            self.last_owner = Some(current);
        }

        self.events.push(BallEvent::PossessionChanged(owner));
    }

    /// Back to the kickoff spot with no history.
    pub fn reset(&mut self) {
        self.position = self.start_position;
        self.velocity = Vector2::zeros();
        self.charged = false;
        self.ownable = true;
        self.last_owner = None;

        if self.owner.is_some() {
            self.owner = None;
            self.events.push(BallEvent::PossessionChanged(None));
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.norm()
    }

    /// Kinematic placement used by the carrier's orbit loop.
    pub fn move_position(&mut self, position: Vector2<f32>) {
        self.position = position;
        self.velocity = Vector2::zeros();
    }

    /// Moves a loose ball for one physics step. Returns true if it bounced off
    /// a wall, which also discharges it. The goal mouth has no wall.
    pub fn integrate(&mut self, dt: f32, bounds: &ArenaBounds, drag: f32, bounce: f32) -> bool {
        if self.owner.is_some() {
            return false;
        }

        self.velocity *= (1.0 - drag * dt).max(0.0);
        self.position += self.velocity * dt;

        let limit_x = bounds.half_width - bounds.ball_radius;
        let limit_y = bounds.half_height - bounds.ball_radius;

        let mut hit_wall = false;

        if self.position.y.abs() > limit_y {
            self.position.y = limit_y.copysign(self.position.y);
            self.velocity.y = -self.velocity.y * bounce;
            hit_wall = true;
        }

        if self.position.x.abs() > limit_x && !bounds.in_goal_mouth(self.position.y) {
            self.position.x = limit_x.copysign(self.position.x);
            self.velocity.x = -self.velocity.x * bounce;
            hit_wall = true;
        }

        if hit_wall {
            self.charged = false;
            self.events.push(BallEvent::WallHit);
        }

        hit_wall
    }

    pub fn take_events(&mut self) -> Vec<BallEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: BallEvent) {
        self.events.push(event);
    }
}
