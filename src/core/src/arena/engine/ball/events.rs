use crate::arena::{Notification, NotificationCenter, PlayerId, TeamId};
use log::debug;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BallEvent {
    PossessionChanged(Option<PlayerId>),
    WallHit,
    Goal(BallGoalEventMetadata),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BallGoalEventMetadata {
    /// Last player that held the ball, if any
    pub scorer: Option<PlayerId>,
    /// Team defending the goal the ball entered
    pub conceding_team: Option<TeamId>,
}

pub struct BallEventDispatcher;

impl BallEventDispatcher {
    /// Publishes the externally visible ball events. Goals are returned to the
    /// caller because they drive the round flow.
    pub fn dispatch(
        event: BallEvent,
        notifications: &mut NotificationCenter,
    ) -> Option<BallGoalEventMetadata> {
        debug!("Ball event: {:?}", event);

        match event {
            BallEvent::PossessionChanged(owner) => {
                notifications.publish(Notification::PossessionChanged { owner });
                None
            }
            BallEvent::WallHit => None,
            BallEvent::Goal(metadata) => {
                notifications.publish(Notification::GoalScored {
                    scorer: metadata.scorer,
                    conceding_team: metadata.conceding_team,
                });
                Some(metadata)
            }
        }
    }
}
