use crate::arena::{PlayerState, StateContext};

pub fn always(_: &StateContext<'_>) -> bool {
    true
}

pub fn can_charge_dash(ctx: &StateContext<'_>) -> bool {
    ctx.state() == PlayerState::NormalMovement
        && !ctx.mechanics.dash.is_cooling_down(ctx.now, &ctx.config.dash)
}

pub fn can_dash(ctx: &StateContext<'_>) -> bool {
    ctx.state() == PlayerState::ChargeDash
}

pub fn can_take_possession(ctx: &StateContext<'_>) -> bool {
    matches!(
        ctx.state(),
        PlayerState::NormalMovement | PlayerState::ChargeDash | PlayerState::Dash
    ) && ctx.ball.is_ownable()
        && ctx.mechanics.carrier.can_pick_up(ctx.now)
}

pub fn can_be_stunned(ctx: &StateContext<'_>) -> bool {
    !matches!(
        ctx.state(),
        PlayerState::Stunned | PlayerState::FrozenAfterGoal
    )
}
