use crate::arena::{Action, PlayerId, PlayerState, TeamId, TransitionPayload};
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    PlayerPressedDash,
    PlayerReleasedDash,
    PlayerPressedShoot,
    PlayerReleasedShoot,
    StateChanged,
    PossessionChanged,
    BallStolen,
    NetworkedTransition,
    GoalScored,
    RoundReset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Input {
        player: PlayerId,
        action: Action,
        pressed: bool,
    },
    StateChanged {
        player: PlayerId,
        old: PlayerState,
        new: PlayerState,
    },
    PossessionChanged {
        owner: Option<PlayerId>,
    },
    BallStolen {
        thief: PlayerId,
        victim: Option<PlayerId>,
    },
    /// A transition that a replication layer has to mirror on remote peers.
    NetworkedTransition {
        player: PlayerId,
        state: PlayerState,
        payload: TransitionPayload,
    },
    GoalScored {
        scorer: Option<PlayerId>,
        conceding_team: Option<TeamId>,
    },
    RoundReset,
}

impl Notification {
    pub fn message(&self) -> Message {
        match self {
            Notification::Input {
                action: Action::Dash,
                pressed: true,
                ..
            } => Message::PlayerPressedDash,
            Notification::Input {
                action: Action::Dash,
                pressed: false,
                ..
            } => Message::PlayerReleasedDash,
            Notification::Input {
                action: Action::Shoot,
                pressed: true,
                ..
            } => Message::PlayerPressedShoot,
            Notification::Input {
                action: Action::Shoot,
                pressed: false,
                ..
            } => Message::PlayerReleasedShoot,
            Notification::StateChanged { .. } => Message::StateChanged,
            Notification::PossessionChanged { .. } => Message::PossessionChanged,
            Notification::BallStolen { .. } => Message::BallStolen,
            Notification::NetworkedTransition { .. } => Message::NetworkedTransition,
            Notification::GoalScored { .. } => Message::GoalScored,
            Notification::RoundReset => Message::RoundReset,
        }
    }

    /// The entity a notification originates from, used by source-filtered subscriptions.
    pub fn source(&self) -> Option<PlayerId> {
        match self {
            Notification::Input { player, .. }
            | Notification::StateChanged { player, .. }
            | Notification::NetworkedTransition { player, .. } => Some(*player),
            Notification::BallStolen { thief, .. } => Some(*thief),
            Notification::PossessionChanged { owner } => *owner,
            Notification::GoalScored { scorer, .. } => *scorer,
            Notification::RoundReset => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type NotificationCallback = Box<dyn FnMut(&Notification)>;

struct Subscription {
    id: SubscriptionId,
    message: Message,
    source: Option<PlayerId>,
    callback: NotificationCallback,
}

/// Typed publish/subscribe bus keyed by [`Message`].
///
/// Subscribers own their [`SubscriptionId`] and must hand it back through
/// [`NotificationCenter::unsubscribe`] when they are torn down.
#[derive(Default)]
pub struct NotificationCenter {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "the subscription must be passed to unsubscribe on teardown"]
    pub fn call_on_message<F>(&mut self, message: Message, callback: F) -> SubscriptionId
    where
        F: FnMut(&Notification) + 'static,
    {
        self.subscribe(message, None, Box::new(callback))
    }

    #[must_use = "the subscription must be passed to unsubscribe on teardown"]
    pub fn call_on_message_if_same_source<F>(
        &mut self,
        message: Message,
        source: PlayerId,
        callback: F,
    ) -> SubscriptionId
    where
        F: FnMut(&Notification) + 'static,
    {
        self.subscribe(message, Some(source), Box::new(callback))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();

        self.subscriptions.retain(|s| s.id != id);

        before != self.subscriptions.len()
    }

    pub fn publish(&mut self, notification: Notification) {
        debug!("notification: {:?}", notification);

        let message = notification.message();
        let source = notification.source();

        for subscription in self
            .subscriptions
            .iter_mut()
            .filter(|s| s.message == message)
            .filter(|s| s.source.is_none() || s.source == source)
        {
            (subscription.callback)(&notification);
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Drops every subscription, reporting the ones nobody unsubscribed.
    pub fn teardown(&mut self) -> usize {
        let leaked = self.subscriptions.len();

        for subscription in &self.subscriptions {
            warn!(
                "subscription {:?} to {:?} was never unsubscribed",
                subscription.id, subscription.message
            );
        }

        self.subscriptions.clear();

        leaked
    }

    fn subscribe(
        &mut self,
        message: Message,
        source: Option<PlayerId>,
        callback: NotificationCallback,
    ) -> SubscriptionId {
        self.next_id += 1;

        let id = SubscriptionId(self.next_id);

        self.subscriptions.push(Subscription {
            id,
            message,
            source,
            callback,
        });

        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn dash_pressed(player: PlayerId) -> Notification {
        Notification::Input {
            player,
            action: Action::Dash,
            pressed: true,
        }
    }

    #[test]
    fn test_publish_reaches_matching_subscribers_only() {
        let mut center = NotificationCenter::new();
        let received = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&received);
        let id = center.call_on_message(Message::PlayerPressedDash, move |n| {
            sink.borrow_mut().push(n.clone())
        });

        center.publish(dash_pressed(1));
        center.publish(Notification::RoundReset);

        assert_eq!(*received.borrow(), vec![dash_pressed(1)]);
        assert!(center.unsubscribe(id));
    }

    #[test]
    fn test_source_filter() {
        let mut center = NotificationCenter::new();
        let count = Rc::new(RefCell::new(0));

        let sink = Rc::clone(&count);
        let id = center.call_on_message_if_same_source(Message::PlayerPressedDash, 2, move |_| {
            *sink.borrow_mut() += 1
        });

        center.publish(dash_pressed(1));
        center.publish(dash_pressed(2));
        center.publish(dash_pressed(2));

        assert_eq!(*count.borrow(), 2);
        assert!(center.unsubscribe(id));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut center = NotificationCenter::new();
        let count = Rc::new(RefCell::new(0));

        let sink = Rc::clone(&count);
        let id = center.call_on_message(Message::RoundReset, move |_| *sink.borrow_mut() += 1);

        center.publish(Notification::RoundReset);
        assert!(center.unsubscribe(id));
        assert!(!center.unsubscribe(id));
        center.publish(Notification::RoundReset);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(center.subscription_count(), 0);
    }

    #[test]
    fn test_teardown_reports_leaked_subscriptions() {
        let mut center = NotificationCenter::new();

        let _ = center.call_on_message(Message::GoalScored, |_| {});
        let _ = center.call_on_message(Message::RoundReset, |_| {});

        assert_eq!(center.teardown(), 2);
        assert_eq!(center.subscription_count(), 0);
    }

    #[test]
    fn test_input_messages() {
        let released = Notification::Input {
            player: 3,
            action: Action::Shoot,
            pressed: false,
        };

        assert_eq!(released.message(), Message::PlayerReleasedShoot);
        assert_eq!(released.source(), Some(3));
    }
}
