use crate::arena::{Action, EffectId, EffectKind, InputFrame, StateContext, TickTask};
use crate::normalize_or_zero;
use log::{debug, warn};
use nalgebra::Vector2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotPhase {
    /// Counting down, the shoot button has not been pressed yet
    Waiting,
    /// Button held, shot power grows until release or expiry
    Charging { effect: EffectId },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotTimer {
    pub elapsed: f32,
    pub accumulated: f32,
    pub phase: ShotPhase,
    timer_effect: EffectId,
}

/// Forced-shot countdown that runs while a player holds the ball.
#[derive(Debug, Default)]
pub struct ShootMechanic {
    timer: TickTask<ShotTimer>,
}

impl ShootMechanic {
    pub fn is_timing(&self) -> bool {
        self.timer.is_running()
    }

    pub fn is_charging(&self) -> bool {
        matches!(
            self.timer.get().map(|t| t.phase),
            Some(ShotPhase::Charging { .. })
        )
    }

    pub fn elapsed(&self) -> Option<f32> {
        self.timer.get().map(|t| t.elapsed)
    }

    pub fn on_possession_enter(ctx: &mut StateContext<'_>) {
        let config = &ctx.config.shoot;

        let timer_effect = ctx.effects.spawn(
            EffectKind::ShotTimer,
            ctx.body.position,
            Some(config.forced_shot_time),
        );

        let (_, previous) = ctx.mechanics.shoot.timer.start(ShotTimer {
            elapsed: 0.0,
            accumulated: config.base_shot_speed,
            phase: ShotPhase::Waiting,
            timer_effect,
        });

        if let Some(previous) = previous {
            release_effects(ctx, &previous);
        }
    }

    pub fn on_possession_exit(ctx: &mut StateContext<'_>) {
        if let Some(timer) = ctx.mechanics.shoot.timer.cancel() {
            release_effects(ctx, &timer);
        }
    }

    /// Frame step of the countdown. The button is checked before the
    /// countdown advances, so a press on the expiry tick still counts.
    pub fn tick(ctx: &mut StateContext<'_>, input: &InputFrame) {
        let config = ctx.config;
        let shoot = &config.shoot;

        let Some(timer) = ctx.mechanics.shoot.timer.get_mut() else {
            return;
        };

        let mut shot = None;

        match timer.phase {
            ShotPhase::Waiting if input.was_pressed(Action::Shoot) => {
                if shoot.charge_on_hold {
                    let effect = ctx.effects.spawn(EffectKind::ShotCharge, ctx.body.position, None);
                    timer.phase = ShotPhase::Charging { effect };
                } else {
                    shot = Some((shoot.base_shot_speed, false));
                }
            }
            ShotPhase::Charging { .. } if input.was_released(Action::Shoot) => {
                shot = Some((
                    shoot.base_shot_speed + shoot.charge_curve.apply(timer.accumulated),
                    true,
                ));
            }
            _ => {}
        }

        if shot.is_none() {
            timer.elapsed += ctx.dt;

            if let ShotPhase::Charging { .. } = timer.phase {
                timer.accumulated += shoot.charge_rate * ctx.dt;
            }

            if timer.elapsed >= shoot.forced_shot_time {
                debug!("player {}: forced shot", ctx.player_id);

                shot = Some(match timer.phase {
                    ShotPhase::Waiting => (shoot.base_shot_speed, false),
                    ShotPhase::Charging { .. } => (
                        shoot.base_shot_speed + shoot.charge_curve.apply(timer.accumulated),
                        true,
                    ),
                });
            }
        }

        if let Some((speed, charged)) = shot {
            Self::fire(ctx, speed, charged);
        }
    }

    fn fire(ctx: &mut StateContext<'_>, speed: f32, charged: bool) {
        if !ctx.ball.is_owned_by(ctx.player_id) {
            warn!("player {} shot a ball it does not hold", ctx.player_id);
        } else {
            let mut direction = normalize_or_zero(&(ctx.ball.position - ctx.body.position));

            if direction == Vector2::zeros() {
                direction = ctx.body.facing();
            }

            ctx.ball.velocity = direction * speed;
            ctx.ball.charged = charged;

            debug!(
                "player {} shot at {:.2} (charged: {})",
                ctx.player_id, speed, charged
            );
        }

        ctx.finish_current_state();
    }
}

fn release_effects(ctx: &mut StateContext<'_>, timer: &ShotTimer) {
    ctx.effects.destroy(timer.timer_effect, 0.0);

    if let ShotPhase::Charging { effect } = timer.phase {
        ctx.effects.destroy(effect, 0.0);
    }
}
