use crate::arena::{
    guards, Action, ArenaBounds, BallCarrier, DashChargeController, InputFrame, PlayerState,
    PlayerStateManager, PlayerStun, PossessionInfo, ShootMechanic, StateChange, StateContext,
    StunInfo, TeamId, TickEnv, TransitionOutcome, TransitionRequest,
};
use crate::{direction_from_rotation, rotation_from_direction};
use nalgebra::Vector2;

pub type PlayerId = u32;

#[derive(Debug, Clone)]
pub struct PlayerBody {
    pub position: Vector2<f32>,
    /// Radians, zero faces +x
    pub rotation: f32,
    pub velocity: Vector2<f32>,
    /// Movement input is ignored while frozen, rotation still follows aim
    pub frozen: bool,

    pub start_position: Vector2<f32>,
    pub start_rotation: f32,
}

impl PlayerBody {
    pub fn new(position: Vector2<f32>, rotation: f32) -> Self {
        PlayerBody {
            position,
            rotation,
            velocity: Vector2::zeros(),
            frozen: false,
            start_position: position,
            start_rotation: rotation,
        }
    }

    pub fn facing(&self) -> Vector2<f32> {
        direction_from_rotation(self.rotation)
    }

    pub fn steer(&mut self, input: &InputFrame, move_speed: f32, state: PlayerState) {
        if input.aim != Vector2::zeros() {
            self.rotation = rotation_from_direction(&input.aim);
        } else if input.movement != Vector2::zeros() {
            self.rotation = rotation_from_direction(&input.movement);
        }

        if self.frozen {
            self.velocity = Vector2::zeros();
            return;
        }

        match state {
            PlayerState::NormalMovement | PlayerState::ChargeDash => {
                let movement = input.movement.cap_magnitude(1.0);
                self.velocity = movement * move_speed;
            }
            // Driven by the dash and stun loops
            PlayerState::Dash | PlayerState::Stunned => {}
            PlayerState::Possession | PlayerState::FrozenAfterGoal => {
                self.velocity = Vector2::zeros();
            }
        }
    }

    /// Returns true if the player was pushed back inside the arena.
    pub fn integrate(&mut self, dt: f32, bounds: &ArenaBounds) -> bool {
        self.position += self.velocity * dt;

        let limit_x = bounds.half_width - bounds.player_radius;
        let limit_y = bounds.half_height - bounds.player_radius;

        let mut touched = false;

        if self.position.x.abs() > limit_x {
            self.position.x = limit_x.copysign(self.position.x);
            self.velocity.x = 0.0;
            touched = true;
        }

        if self.position.y.abs() > limit_y {
            self.position.y = limit_y.copysign(self.position.y);
            self.velocity.y = 0.0;
            touched = true;
        }

        touched
    }

    pub fn reset(&mut self) {
        self.position = self.start_position;
        self.rotation = self.start_rotation;
        self.velocity = Vector2::zeros();
    }

    fn freeze(ctx: &mut StateContext<'_>) {
        ctx.body.frozen = true;
        ctx.body.velocity = Vector2::zeros();
    }

    fn unfreeze(ctx: &mut StateContext<'_>) {
        ctx.body.frozen = false;
    }
}

/// The subsystems a player is made of, wired once in [`ArenaPlayer::new`].
#[derive(Debug, Default)]
pub struct PlayerMechanics {
    pub carrier: BallCarrier,
    pub dash: DashChargeController,
    pub shoot: ShootMechanic,
    pub stun: PlayerStun,
}

impl PlayerMechanics {
    /// Number of per-tick loops currently alive for this player.
    pub fn running_tasks(&self) -> usize {
        [
            self.carrier.is_orbiting(),
            self.dash.is_charging(),
            self.dash.is_dashing(),
            self.shoot.is_timing(),
            self.stun.is_stunned(),
        ]
        .iter()
        .filter(|running| **running)
        .count()
    }
}

pub struct ArenaPlayer {
    pub id: PlayerId,
    pub team: Option<TeamId>,
    pub body: PlayerBody,
    pub mechanics: PlayerMechanics,
    state: PlayerStateManager,
}

impl ArenaPlayer {
    pub fn new(id: PlayerId, team: Option<TeamId>, position: Vector2<f32>, rotation: f32) -> Self {
        let mut state = PlayerStateManager::new();

        state.call_on_state_enter(PlayerState::Possession, PlayerBody::freeze);
        state.call_on_state_enter(PlayerState::Possession, BallCarrier::start_carrying_ball);
        state.call_on_state_enter(PlayerState::Possession, ShootMechanic::on_possession_enter);
        state.call_on_state_exit(PlayerState::Possession, ShootMechanic::on_possession_exit);
        state.call_on_state_exit(PlayerState::Possession, BallCarrier::drop_ball);
        state.call_on_state_exit(PlayerState::Possession, PlayerBody::unfreeze);

        state.call_on_state_enter(PlayerState::ChargeDash, DashChargeController::on_charge_enter);
        state.call_on_state_exit(PlayerState::ChargeDash, DashChargeController::on_charge_exit);
        state.call_on_state_enter(PlayerState::Dash, DashChargeController::on_dash_enter);
        state.call_on_state_exit(PlayerState::Dash, DashChargeController::on_dash_exit);

        state.call_on_state_enter(PlayerState::Stunned, PlayerStun::on_stun_enter);
        state.call_on_state_exit(PlayerState::Stunned, PlayerStun::on_stun_exit);

        state.call_on_state_enter(PlayerState::FrozenAfterGoal, PlayerBody::freeze);
        state.call_on_state_exit(PlayerState::FrozenAfterGoal, PlayerBody::unfreeze);

        ArenaPlayer {
            id,
            team,
            body: PlayerBody::new(position, rotation),
            mechanics: PlayerMechanics::default(),
            state,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state.current()
    }

    pub fn state_manager(&self) -> &PlayerStateManager {
        &self.state
    }

    pub fn is_carrying_ball(&self) -> bool {
        self.mechanics.carrier.is_carrying_ball()
    }

    pub fn take_state_changes(&mut self) -> Vec<StateChange> {
        self.state.take_changes()
    }

    /// Runs `f` against this player's state machine and applies whatever it
    /// queued before returning.
    pub fn with_context<R>(
        &mut self,
        env: &mut TickEnv<'_>,
        f: impl FnOnce(&mut PlayerStateManager, &mut StateContext<'_>) -> R,
    ) -> R {
        let ArenaPlayer {
            id,
            team,
            body,
            mechanics,
            state,
        } = self;

        let mut ctx = StateContext::new(
            *id,
            *team,
            state.current(),
            state.previous(),
            state.active_payload(),
            body,
            mechanics,
            env,
        );

        let result = f(state, &mut ctx);

        state.process_requests(&mut ctx);

        result
    }

    /// Frame step: input first, then the charge, dash, stun and shot loops.
    pub fn frame_update(&mut self, env: &mut TickEnv<'_>, input: &InputFrame) {
        self.with_context(env, |state, ctx| {
            ctx.body
                .steer(input, ctx.config.arena.move_speed, state.current());

            if input.was_pressed(Action::Dash) {
                DashChargeController::button_pressed(ctx);
                state.process_requests(ctx);
            }

            if input.was_released(Action::Dash) {
                DashChargeController::button_released(ctx);
                state.process_requests(ctx);
            }

            ShootMechanic::tick(ctx, input);
            DashChargeController::tick(ctx);
            PlayerStun::tick(ctx);
        });
    }

    /// Physics step: orbit placement, then movement. Returns true on wall contact.
    pub fn physics_update(&mut self, env: &mut TickEnv<'_>, bounds: &ArenaBounds) -> bool {
        self.mechanics.carrier.carry_tick(
            self.id,
            &self.body,
            env.ball,
            env.dt,
            &env.config.carrier,
        );

        self.body.integrate(env.dt, bounds)
    }

    pub fn attempt_possession(&mut self, env: &mut TickEnv<'_>, info: PossessionInfo) -> TransitionOutcome {
        self.with_context(env, |state, ctx| {
            let request = TransitionRequest::new(PlayerState::Possession)
                .guarded(guards::can_take_possession)
                .with_payload(info);

            state.attempt_transition(ctx, request)
        })
    }

    pub fn attempt_stun(&mut self, env: &mut TickEnv<'_>, info: StunInfo) -> TransitionOutcome {
        self.with_context(env, |state, ctx| {
            *state.payload_for_writing::<StunInfo>() = info;

            let request =
                TransitionRequest::new(PlayerState::Stunned).guarded(guards::can_be_stunned);

            state.attempt_transition(ctx, request)
        })
    }

    pub fn end_dash(&mut self, env: &mut TickEnv<'_>) -> TransitionOutcome {
        self.with_context(env, |state, ctx| {
            let request =
                TransitionRequest::new(PlayerState::NormalMovement).from_state(PlayerState::Dash);

            state.attempt_transition(ctx, request)
        })
    }

    pub fn freeze_after_goal(&mut self, env: &mut TickEnv<'_>) -> TransitionOutcome {
        self.with_context(env, |state, ctx| {
            state.transition_to(ctx, PlayerState::FrozenAfterGoal)
        })
    }

    pub fn finish_current_state(&mut self, env: &mut TickEnv<'_>) -> TransitionOutcome {
        self.with_context(env, |state, ctx| state.current_state_finished(ctx))
    }

    pub fn reset_position(&mut self) {
        self.body.reset();
    }
}
