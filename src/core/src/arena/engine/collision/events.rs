use crate::arena::PlayerId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Player,
    Ball,
    Wall,
    Obstacle,
    Goal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactPhase {
    Enter,
    Stay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactTarget {
    Player(PlayerId),
    Ball,
    Static,
}

/// A contact reported by the physics layer, seen from the player that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub initiator: PlayerId,
    pub target: ContactTarget,
    pub layer: Layer,
    pub phase: ContactPhase,
}

impl CollisionEvent {
    pub fn enter(initiator: PlayerId, target: ContactTarget, layer: Layer) -> Self {
        CollisionEvent {
            initiator,
            target,
            layer,
            phase: ContactPhase::Enter,
        }
    }

    pub fn with_ball(initiator: PlayerId) -> Self {
        Self::enter(initiator, ContactTarget::Ball, Layer::Ball)
    }

    pub fn with_player(initiator: PlayerId, other: PlayerId) -> Self {
        Self::enter(initiator, ContactTarget::Player(other), Layer::Player)
    }

    pub fn with_static(initiator: PlayerId, layer: Layer) -> Self {
        Self::enter(initiator, ContactTarget::Static, layer)
    }
}
