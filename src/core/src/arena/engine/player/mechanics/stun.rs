use crate::arena::{EffectId, EffectKind, PlayerState, StateContext, StunInfo, TickTask, TransitionRequest};
use nalgebra::Vector2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StunLoop {
    pub started_at: f32,
    pub duration: f32,
    pub knockback: Vector2<f32>,
    stars: EffectId,
}

#[derive(Debug, Default)]
pub struct PlayerStun {
    timer: TickTask<StunLoop>,
}

impl PlayerStun {
    pub fn is_stunned(&self) -> bool {
        self.timer.is_running()
    }

    pub fn on_stun_enter(ctx: &mut StateContext<'_>) {
        let info = ctx.payload::<StunInfo>();

        ctx.body.velocity = info.knockback;

        let stars = ctx
            .effects
            .spawn(EffectKind::StunStars, ctx.body.position, Some(info.duration));

        let (_, previous) = ctx.mechanics.stun.timer.start(StunLoop {
            started_at: ctx.now,
            duration: info.duration,
            knockback: info.knockback,
            stars,
        });

        if let Some(previous) = previous {
            ctx.effects.destroy(previous.stars, 0.0);
        }
    }

    pub fn on_stun_exit(ctx: &mut StateContext<'_>) {
        if let Some(stun) = ctx.mechanics.stun.timer.cancel() {
            ctx.effects.destroy(stun.stars, 0.0);
        }

        ctx.body.velocity = Vector2::zeros();
    }

    /// Knockback fades linearly over the stun, which ends on timer expiry.
    pub fn tick(ctx: &mut StateContext<'_>) {
        let Some(stun) = ctx.mechanics.stun.timer.get() else {
            return;
        };

        let elapsed = ctx.now - stun.started_at;

        if elapsed >= stun.duration {
            ctx.request_transition(
                TransitionRequest::new(PlayerState::NormalMovement).from_state(PlayerState::Stunned),
            );
            return;
        }

        let remaining = 1.0 - elapsed / stun.duration;
        ctx.body.velocity = stun.knockback * remaining;
    }
}
