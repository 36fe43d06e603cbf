use std::fmt::{Display, Formatter, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    NormalMovement,
    ChargeDash,
    Dash,
    Possession,
    Stunned,
    FrozenAfterGoal,
}

impl PlayerState {
    pub const ALL: [PlayerState; 6] = [
        PlayerState::NormalMovement,
        PlayerState::ChargeDash,
        PlayerState::Dash,
        PlayerState::Possession,
        PlayerState::Stunned,
        PlayerState::FrozenAfterGoal,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Transitions the state machine structurally allows, before any guard runs.
    pub fn can_transition_to(self, target: PlayerState) -> bool {
        use PlayerState::*;

        if self == target {
            return false;
        }

        match target {
            NormalMovement => true,
            ChargeDash => self == NormalMovement,
            Dash => self == ChargeDash,
            Possession => matches!(self, NormalMovement | ChargeDash | Dash),
            Stunned => self != FrozenAfterGoal,
            FrozenAfterGoal => true,
        }
    }
}

impl Display for PlayerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            PlayerState::NormalMovement => write!(f, "Normal movement"),
            PlayerState::ChargeDash => write!(f, "Charge dash"),
            PlayerState::Dash => write!(f, "Dash"),
            PlayerState::Possession => write!(f, "Possession"),
            PlayerState::Stunned => write!(f, "Stunned"),
            PlayerState::FrozenAfterGoal => write!(f, "Frozen after goal"),
        }
    }
}
