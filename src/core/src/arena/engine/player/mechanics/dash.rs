use crate::arena::{
    guards, DashInfo, EffectId, EffectKind, PlayerState, StateContext, TickTask,
    TransitionRequest,
};
use crate::DashConfig;
use log::debug;
use nalgebra::Vector2;

const DASH_END_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeLoop {
    pub amount: f32,
    aimer: EffectId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashLoop {
    pub started_at: f32,
    pub duration: f32,
    trail: EffectId,
}

/// Charge-and-release dash: holding the dash button charges, releasing it
/// launches the player along their facing.
#[derive(Debug, Default)]
pub struct DashChargeController {
    charge: TickTask<ChargeLoop>,
    dash: TickTask<DashLoop>,
    last_dash_time: Option<f32>,
}

impl DashChargeController {
    pub fn is_cooling_down(&self, now: f32, config: &DashConfig) -> bool {
        self.last_dash_time
            .is_some_and(|last| now - last < config.cooldown)
    }

    pub fn charge_amount(&self) -> Option<f32> {
        self.charge.get().map(|c| c.amount)
    }

    pub fn is_charging(&self) -> bool {
        self.charge.is_running()
    }

    pub fn is_dashing(&self) -> bool {
        self.dash.is_running()
    }

    pub fn dash_duration(&self) -> Option<f32> {
        self.dash.get().map(|d| d.duration)
    }

    pub fn button_pressed(ctx: &mut StateContext<'_>) {
        ctx.request_transition(
            TransitionRequest::new(PlayerState::ChargeDash).guarded(guards::can_charge_dash),
        );
    }

    pub fn button_released(ctx: &mut StateContext<'_>) {
        if ctx.state() != PlayerState::ChargeDash {
            return;
        }

        Self::release(ctx);
    }

    /// Launches the dash with the charge accumulated so far.
    pub fn release(ctx: &mut StateContext<'_>) {
        let config = &ctx.config.dash;
        let amount = ctx.mechanics.dash.charge_amount().unwrap_or(0.0);

        let velocity = ctx.body.facing() * config.dash_speed * (1.0 + config.charge_curve.apply(amount));

        let info = DashInfo {
            start_position: ctx.body.position,
            velocity,
        };

        ctx.request_transition(
            TransitionRequest::new(PlayerState::Dash)
                .guarded(guards::can_dash)
                .with_payload(info),
        );
    }

    /// Frame step of the charge and dash loops.
    pub fn tick(ctx: &mut StateContext<'_>) {
        let dt = ctx.dt;
        let rate = ctx.config.dash.charge_rate;

        let controller = &mut ctx.mechanics.dash;

        if let Some(charge) = controller.charge.get_mut() {
            charge.amount += rate * dt;
        }

        let finished = match controller.dash.get() {
            Some(dash) => ctx.now - dash.started_at >= dash.duration - DASH_END_EPSILON,
            None => false,
        };

        if finished {
            debug!("player {}: dash finished", ctx.player_id);

            ctx.request_transition(
                TransitionRequest::new(PlayerState::NormalMovement).from_state(PlayerState::Dash),
            );
        }
    }

    pub fn on_charge_enter(ctx: &mut StateContext<'_>) {
        let aimer = ctx
            .effects
            .spawn(EffectKind::DashAimer, ctx.body.position, None);

        let (_, previous) = ctx.mechanics.dash.charge.start(ChargeLoop { amount: 0.0, aimer });

        if let Some(previous) = previous {
            ctx.effects.destroy(previous.aimer, 0.0);
        }
    }

    pub fn on_charge_exit(ctx: &mut StateContext<'_>) {
        if let Some(charge) = ctx.mechanics.dash.charge.cancel() {
            ctx.effects.destroy(charge.aimer, 0.0);
        }
    }

    pub fn on_dash_enter(ctx: &mut StateContext<'_>) {
        assert_eq!(
            ctx.previous_state(),
            Some(PlayerState::ChargeDash),
            "player {} entered dash without charging it",
            ctx.player_id
        );

        let info = ctx.payload::<DashInfo>();
        let duration = info.velocity.norm().min(ctx.config.dash.duration_cap);

        ctx.body.velocity = info.velocity;

        let trail = ctx
            .effects
            .spawn(EffectKind::DashTrail, ctx.body.position, Some(duration));

        let (_, previous) = ctx.mechanics.dash.dash.start(DashLoop {
            started_at: ctx.now,
            duration,
            trail,
        });

        if let Some(previous) = previous {
            ctx.effects.destroy(previous.trail, 0.0);
        }

        ctx.mechanics.dash.last_dash_time = Some(ctx.now);
    }

    pub fn on_dash_exit(ctx: &mut StateContext<'_>) {
        if let Some(dash) = ctx.mechanics.dash.dash.cancel() {
            // Let the trail fade out
            ctx.effects.destroy(dash.trail, 1.0);
        }

        ctx.body.velocity = Vector2::zeros();
    }
}
