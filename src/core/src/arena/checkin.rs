use crate::arena::PlayerId;
use log::debug;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckinEvent {
    CheckedIn(PlayerId),
    CheckedOut(PlayerId),
    Reset,
}

pub type CheckinObserver = Box<dyn FnMut(CheckinEvent, usize)>;

/// Lobby bookkeeping of which players confirmed they are ready.
///
/// Check-in and check-out are mirror images: each flips one player's flag,
/// and both report to the same observer with the updated count. Events are
/// ignored while not listening.
pub struct PlayerCheckin {
    checked_in: HashMap<PlayerId, bool>,
    listening: bool,
    /// Treats everyone as checked in
    pub force_bypass: bool,
    accepts: Box<dyn Fn(PlayerId) -> bool>,
    ready: Box<dyn Fn() -> bool>,
    observer: Option<CheckinObserver>,
}

impl Default for PlayerCheckin {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerCheckin {
    pub fn new() -> Self {
        PlayerCheckin {
            checked_in: HashMap::new(),
            listening: false,
            force_bypass: false,
            accepts: Box::new(|_| true),
            ready: Box::new(|| true),
            observer: None,
        }
    }

    /// Only players passing `accepts` can change their flag.
    pub fn with_filter<F: Fn(PlayerId) -> bool + 'static>(mut self, accepts: F) -> Self {
        self.accepts = Box::new(accepts);
        self
    }

    /// Extra condition for [`PlayerCheckin::all_checked_in`].
    pub fn with_ready_condition<F: Fn() -> bool + 'static>(mut self, ready: F) -> Self {
        self.ready = Box::new(ready);
        self
    }

    pub fn on_change<F: FnMut(CheckinEvent, usize) + 'static>(mut self, observer: F) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn start_listening(&mut self) {
        self.listening = true;
    }

    pub fn stop_listening(&mut self) {
        self.listening = false;
    }

    pub fn check_in(&mut self, player_id: PlayerId) -> bool {
        self.set(player_id, true)
    }

    pub fn check_out(&mut self, player_id: PlayerId) -> bool {
        self.set(player_id, false)
    }

    pub fn reset(&mut self, roster: &[PlayerId]) {
        self.force_bypass = false;
        self.checked_in = roster.iter().map(|id| (*id, false)).collect();

        self.notify(CheckinEvent::Reset);
    }

    pub fn is_checked_in(&self, player_id: PlayerId) -> bool {
        self.checked_in.get(&player_id).copied().unwrap_or(false)
    }

    pub fn count(&self, roster: &[PlayerId]) -> usize {
        roster.iter().filter(|id| self.is_checked_in(**id)).count()
    }

    pub fn all_checked_in(&self, roster: &[PlayerId]) -> bool {
        if self.force_bypass {
            return true;
        }

        roster.iter().all(|id| self.is_checked_in(*id)) && (self.ready)()
    }

    fn set(&mut self, player_id: PlayerId, checked_in: bool) -> bool {
        if !self.listening || !(self.accepts)(player_id) {
            return false;
        }

        let previous = self.checked_in.insert(player_id, checked_in).unwrap_or(false);

        if previous == checked_in {
            return false;
        }

        debug!("player {} checked {}", player_id, if checked_in { "in" } else { "out" });

        self.notify(if checked_in {
            CheckinEvent::CheckedIn(player_id)
        } else {
            CheckinEvent::CheckedOut(player_id)
        });

        true
    }

    fn notify(&mut self, event: CheckinEvent) {
        let count = self.checked_in.values().filter(|c| **c).count();

        if let Some(observer) = self.observer.as_mut() {
            observer(event, count);
        }
    }
}
