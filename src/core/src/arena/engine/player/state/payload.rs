use crate::arena::{PlayerId, PlayerState};
use nalgebra::Vector2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashInfo {
    pub start_position: Vector2<f32>,
    pub velocity: Vector2<f32>,
}

impl Default for DashInfo {
    fn default() -> Self {
        DashInfo {
            start_position: Vector2::zeros(),
            velocity: Vector2::zeros(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PossessionInfo {
    pub stole_ball: bool,
    pub victim: Option<PlayerId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StunInfo {
    pub knockback: Vector2<f32>,
    pub duration: f32,
    /// Peers have to replay this stun
    pub is_networked: bool,
}

impl Default for StunInfo {
    fn default() -> Self {
        StunInfo {
            knockback: Vector2::zeros(),
            duration: 0.0,
            is_networked: false,
        }
    }
}

/// Data handed from the initiator of a transition to the entry hooks of its
/// target state. One variant per state that takes a payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionPayload {
    Dash(DashInfo),
    Possession(PossessionInfo),
    Stun(StunInfo),
}

impl TransitionPayload {
    pub fn state(&self) -> PlayerState {
        match self {
            TransitionPayload::Dash(_) => PlayerState::Dash,
            TransitionPayload::Possession(_) => PlayerState::Possession,
            TransitionPayload::Stun(_) => PlayerState::Stunned,
        }
    }
}

pub trait StatePayload: Copy + Default {
    const STATE: PlayerState;

    fn wrap(self) -> TransitionPayload;
    fn unwrap_ref(payload: &TransitionPayload) -> Option<&Self>;
    fn unwrap_mut(payload: &mut TransitionPayload) -> Option<&mut Self>;
}

macro_rules! state_payload {
    ($payload:ty, $variant:ident, $state:expr) => {
        impl StatePayload for $payload {
            const STATE: PlayerState = $state;

            fn wrap(self) -> TransitionPayload {
                TransitionPayload::$variant(self)
            }

            fn unwrap_ref(payload: &TransitionPayload) -> Option<&Self> {
                match payload {
                    TransitionPayload::$variant(info) => Some(info),
                    _ => None,
                }
            }

            fn unwrap_mut(payload: &mut TransitionPayload) -> Option<&mut Self> {
                match payload {
                    TransitionPayload::$variant(info) => Some(info),
                    _ => None,
                }
            }
        }

        impl From<$payload> for TransitionPayload {
            fn from(info: $payload) -> Self {
                TransitionPayload::$variant(info)
            }
        }
    };
}

state_payload!(DashInfo, Dash, PlayerState::Dash);
state_payload!(PossessionInfo, Possession, PlayerState::Possession);
state_payload!(StunInfo, Stun, PlayerState::Stunned);
