use crate::arena::{PlayerState, StateContext, StatePayload, TransitionPayload, TransitionRequest};
use log::{debug, warn};
use std::array;
use std::mem;

pub type StateHook = Box<dyn FnMut(&mut StateContext<'_>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Already in the target state
    SameState,
    /// The state machine has no edge from the current state to the target
    NotReachable,
    GuardFailed,
    /// Queued against a state the player already left
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    Rejected(RejectReason),
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        *self == TransitionOutcome::Applied
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateChange {
    pub from: PlayerState,
    pub to: PlayerState,
    pub payload: Option<TransitionPayload>,
}

/// Per-player state machine with guarded transitions, ordered enter/exit
/// hooks and a payload slot per target state.
pub struct PlayerStateManager {
    current: PlayerState,
    previous: Option<PlayerState>,

    on_enter: [Vec<StateHook>; 6],
    on_exit: [Vec<StateHook>; 6],

    /// Payload of the current state, read by its entry hooks and mechanics
    active_payload: Option<TransitionPayload>,
    /// Payloads written ahead of a transition, keyed by target state
    pending_payloads: [Option<TransitionPayload>; 6],

    changes: Vec<StateChange>,
}

impl Default for PlayerStateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerStateManager {
    pub fn new() -> Self {
        PlayerStateManager {
            current: PlayerState::NormalMovement,
            previous: None,
            on_enter: array::from_fn(|_| Vec::new()),
            on_exit: array::from_fn(|_| Vec::new()),
            active_payload: None,
            pending_payloads: [None; 6],
            changes: Vec::new(),
        }
    }

    pub fn current(&self) -> PlayerState {
        self.current
    }

    pub fn previous(&self) -> Option<PlayerState> {
        self.previous
    }

    pub fn is(&self, state: PlayerState) -> bool {
        self.current == state
    }

    pub fn call_on_state_enter<F>(&mut self, state: PlayerState, hook: F)
    where
        F: FnMut(&mut StateContext<'_>) + 'static,
    {
        self.on_enter[state.index()].push(Box::new(hook));
    }

    pub fn call_on_state_exit<F>(&mut self, state: PlayerState, hook: F)
    where
        F: FnMut(&mut StateContext<'_>) + 'static,
    {
        self.on_exit[state.index()].push(Box::new(hook));
    }

    /// Slot to fill before requesting a transition into `T::STATE`. The slot
    /// is consumed by the next transition into that state, or cleared if that
    /// transition is rejected.
    pub fn payload_for_writing<T: StatePayload>(&mut self) -> &mut T {
        let slot = self.pending_payloads[T::STATE.index()]
            .get_or_insert_with(|| T::default().wrap());

        match T::unwrap_mut(slot) {
            Some(info) => info,
            None => unreachable!("payload slot of {} holds another state's payload", T::STATE),
        }
    }

    /// Payload of the current state, panics if the state has none of that shape.
    pub fn current_payload<T: StatePayload>(&self) -> T {
        match self.active_payload.as_ref().and_then(T::unwrap_ref) {
            Some(info) => *info,
            None => panic!(
                "{} has no {} payload (found {:?})",
                self.current,
                T::STATE,
                self.active_payload
            ),
        }
    }

    pub fn active_payload(&self) -> Option<TransitionPayload> {
        self.active_payload
    }

    pub fn attempt_transition(
        &mut self,
        ctx: &mut StateContext<'_>,
        request: TransitionRequest,
    ) -> TransitionOutcome {
        let outcome = self.apply(ctx, request);

        self.process_requests(ctx);

        outcome
    }

    pub fn transition_to(&mut self, ctx: &mut StateContext<'_>, target: PlayerState) -> TransitionOutcome {
        self.attempt_transition(ctx, TransitionRequest::new(target))
    }

    /// Returns the player to normal movement from the current state.
    pub fn current_state_finished(&mut self, ctx: &mut StateContext<'_>) -> TransitionOutcome {
        let request = TransitionRequest::new(PlayerState::NormalMovement).from_state(self.current);

        self.attempt_transition(ctx, request)
    }

    /// Applies the transitions queued on `ctx`, including those queued by the
    /// hooks of the transitions applied here.
    pub fn process_requests(&mut self, ctx: &mut StateContext<'_>) {
        while !ctx.requests.is_empty() {
            let request = ctx.requests.remove(0);

            if let TransitionOutcome::Rejected(reason) = self.apply(ctx, request) {
                debug!(
                    "player {}: queued transition {} -> {} rejected ({:?})",
                    ctx.player_id, self.current, request.target, reason
                );
            }
        }
    }

    pub fn take_changes(&mut self) -> Vec<StateChange> {
        mem::take(&mut self.changes)
    }

    fn apply(&mut self, ctx: &mut StateContext<'_>, request: TransitionRequest) -> TransitionOutcome {
        let from = self.current;
        let target = request.target;

        self.sync(ctx);

        let rejection = if request.expected_from.is_some_and(|expected| expected != from) {
            Some(RejectReason::Stale)
        } else if from == target {
            Some(RejectReason::SameState)
        } else if !from.can_transition_to(target) {
            Some(RejectReason::NotReachable)
        } else if !(request.guard)(ctx) {
            Some(RejectReason::GuardFailed)
        } else {
            None
        };

        if let Some(reason) = rejection {
            // A payload written for this attempt must not leak into a later one
            self.pending_payloads[target.index()] = None;

            if target == PlayerState::Dash && reason == RejectReason::NotReachable {
                warn!("player {}: dash requested from {}", ctx.player_id, from);
            }

            return TransitionOutcome::Rejected(reason);
        }

        let payload = request
            .payload
            .or_else(|| self.pending_payloads[target.index()].take());

        if let Some(payload) = payload {
            assert_eq!(
                payload.state(),
                target,
                "payload {:?} does not belong to {}",
                payload,
                target
            );
        }

        self.run_hooks(HookKind::Exit, from, ctx);

        self.previous = Some(from);
        self.current = target;
        self.active_payload = payload;
        self.sync(ctx);

        self.run_hooks(HookKind::Enter, target, ctx);

        debug!("player {}: {} -> {}", ctx.player_id, from, target);

        self.changes.push(StateChange {
            from,
            to: target,
            payload,
        });

        TransitionOutcome::Applied
    }

    fn run_hooks(&mut self, kind: HookKind, state: PlayerState, ctx: &mut StateContext<'_>) {
        let hooks = match kind {
            HookKind::Enter => &mut self.on_enter[state.index()],
            HookKind::Exit => &mut self.on_exit[state.index()],
        };

        for hook in hooks.iter_mut() {
            hook(ctx);
        }
    }

    fn sync(&self, ctx: &mut StateContext<'_>) {
        ctx.state = self.current;
        ctx.previous = self.previous;
        ctx.payload = self.active_payload;
    }
}

#[derive(Clone, Copy)]
enum HookKind {
    Enter,
    Exit,
}
