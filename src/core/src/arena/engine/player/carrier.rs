use crate::arena::{Ball, PlayerBody, PlayerId, StateContext, TickTask};
use crate::{normalize_or_zero, rotate, signed_angle, CarrierConfig, GEOMETRY_EPSILON};
use log::{debug, warn};
use nalgebra::Vector2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitLoop {
    pub radius: f32,
}

/// Holds the ball for one player: pickup, drop, post-drop cooldown and the
/// orbit loop that keeps a carried ball at the player's nose.
#[derive(Debug, Default)]
pub struct BallCarrier {
    carrying: bool,
    cooldown_until: Option<f32>,
    orbit: TickTask<OrbitLoop>,
}

impl BallCarrier {
    pub fn is_carrying_ball(&self) -> bool {
        self.carrying
    }

    pub fn is_cooling_down(&self, now: f32) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    pub fn can_pick_up(&self, now: f32) -> bool {
        !self.carrying && !self.is_cooling_down(now)
    }

    pub fn is_orbiting(&self) -> bool {
        self.orbit.is_running()
    }

    /// Entry hook of `Possession`.
    pub fn start_carrying_ball(ctx: &mut StateContext<'_>) {
        assert!(
            ctx.ball.is_ownable(),
            "player {} entered possession of a ball that is not ownable",
            ctx.player_id
        );

        ctx.ball.take_ownership(ctx.player_id);
        ctx.ball.charged = false;
        ctx.ball.velocity = Vector2::zeros();

        let carrier = &mut ctx.mechanics.carrier;
        carrier.carrying = true;

        let (_, previous) = carrier.orbit.start(OrbitLoop {
            radius: ctx.config.carrier.ball_offset,
        });

        if previous.is_some() {
            warn!("player {}: replaced a running orbit loop", ctx.player_id);
        }

        debug!("player {} picked up the ball", ctx.player_id);
    }

    /// Exit hook of `Possession`.
    pub fn drop_ball(ctx: &mut StateContext<'_>) {
        let carrier = &mut ctx.mechanics.carrier;

        if !carrier.carrying {
            return;
        }

        carrier.orbit.cancel();
        carrier.carrying = false;
        carrier.cooldown_until = Some(ctx.now + ctx.config.carrier.cool_down_time);

        if ctx.ball.is_owned_by(ctx.player_id) {
            ctx.ball.release_ownership(ctx.player_id);
        } else {
            warn!(
                "player {} dropped a ball owned by {:?}",
                ctx.player_id,
                ctx.ball.owner()
            );
        }

        debug!("player {} dropped the ball", ctx.player_id);
    }

    /// Physics-step half of the orbit loop.
    pub fn carry_tick(
        &mut self,
        player_id: PlayerId,
        body: &PlayerBody,
        ball: &mut Ball,
        dt: f32,
        config: &CarrierConfig,
    ) {
        let Some(token) = self.orbit.token() else {
            return;
        };

        if !ball.is_owned_by(player_id) {
            warn!(
                "player {} lost the ball to {:?} without dropping it",
                player_id,
                ball.owner()
            );
            self.orbit.cancel();
            self.carrying = false;
            return;
        }

        if let Some(orbit) = self.orbit.resume(token) {
            let target = body.position + body.facing() * orbit.radius;

            let placed = circular_lerp(
                ball.position,
                target,
                body.position,
                orbit.radius,
                dt,
                config.ball_turn_speed,
            );

            ball.move_position(placed);
        }
    }
}

/// Moves `start` around `center` toward the direction of `end`, covering at
/// most `dt * speed` of arc, and returns a point exactly `radius` from `center`.
pub fn circular_lerp(
    start: Vector2<f32>,
    end: Vector2<f32>,
    center: Vector2<f32>,
    radius: f32,
    dt: f32,
    speed: f32,
) -> Vector2<f32> {
    let mut start_direction = normalize_or_zero(&(start - center));
    let mut end_direction = normalize_or_zero(&(end - center));

    if start_direction == Vector2::zeros() {
        start_direction = end_direction;
    }

    if end_direction == Vector2::zeros() {
        end_direction = start_direction;
    }

    if start_direction == Vector2::zeros() {
        return center;
    }

    let angle = signed_angle(&start_direction, &end_direction);
    let arc = radius * angle.abs();

    let fraction = if arc <= GEOMETRY_EPSILON {
        1.0
    } else {
        (dt * speed / arc).clamp(0.0, 1.0)
    };

    center + rotate(&start_direction, angle * fraction) * radius
}
