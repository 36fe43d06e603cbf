use crate::arena::{
    guards, Ball, EffectSpawner, PlayerBody, PlayerId, PlayerMechanics, PlayerState, StatePayload,
    TeamId, TransitionPayload,
};
use crate::ArenaConfig;

/// Match-wide handles a player needs for one tick.
pub struct TickEnv<'a> {
    pub ball: &'a mut Ball,
    pub effects: &'a mut dyn EffectSpawner,
    pub config: &'a ArenaConfig,
    /// Match clock in seconds
    pub now: f32,
    /// Length of the tick being processed
    pub dt: f32,
}

pub type TransitionGuard = fn(&StateContext<'_>) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct TransitionRequest {
    pub target: PlayerState,
    pub guard: TransitionGuard,
    pub payload: Option<TransitionPayload>,
    /// Drops the request if the player left this state before it was applied
    pub expected_from: Option<PlayerState>,
}

impl TransitionRequest {
    pub fn new(target: PlayerState) -> Self {
        TransitionRequest {
            target,
            guard: guards::always,
            payload: None,
            expected_from: None,
        }
    }

    pub fn guarded(mut self, guard: TransitionGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_payload<P: StatePayload>(mut self, payload: P) -> Self {
        assert_eq!(
            P::STATE,
            self.target,
            "payload for {} attached to a transition into {}",
            P::STATE,
            self.target
        );

        self.payload = Some(payload.wrap());
        self
    }

    pub fn from_state(mut self, state: PlayerState) -> Self {
        self.expected_from = Some(state);
        self
    }
}

/// Everything a guard or a state hook may touch while a player transitions.
///
/// Hooks never reach the state manager directly; they queue follow-up
/// transitions through [`StateContext::request_transition`] and the manager
/// applies them once the running transition has completed.
pub struct StateContext<'a> {
    pub player_id: PlayerId,
    pub team: Option<TeamId>,

    pub body: &'a mut PlayerBody,
    pub mechanics: &'a mut PlayerMechanics,
    pub ball: &'a mut Ball,
    pub effects: &'a mut dyn EffectSpawner,
    pub config: &'a ArenaConfig,

    pub now: f32,
    pub dt: f32,

    pub(crate) state: PlayerState,
    pub(crate) previous: Option<PlayerState>,
    pub(crate) payload: Option<TransitionPayload>,
    pub(crate) requests: Vec<TransitionRequest>,
}

impl<'a> StateContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        player_id: PlayerId,
        team: Option<TeamId>,
        state: PlayerState,
        previous: Option<PlayerState>,
        payload: Option<TransitionPayload>,
        body: &'a mut PlayerBody,
        mechanics: &'a mut PlayerMechanics,
        env: &'a mut TickEnv<'_>,
    ) -> Self {
        StateContext {
            player_id,
            team,
            body,
            mechanics,
            ball: &mut *env.ball,
            effects: &mut *env.effects,
            config: env.config,
            now: env.now,
            dt: env.dt,
            state,
            previous,
            payload,
            requests: Vec::new(),
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn previous_state(&self) -> Option<PlayerState> {
        self.previous
    }

    /// Payload of the current state. Reading a payload that was never written,
    /// or reading it with the wrong shape, is a programmer error.
    pub fn payload<T: StatePayload>(&self) -> T {
        match self.payload.as_ref().and_then(T::unwrap_ref) {
            Some(info) => *info,
            None => panic!(
                "player {} in {} has no {} payload (found {:?})",
                self.player_id,
                self.state,
                T::STATE,
                self.payload
            ),
        }
    }

    pub fn request_transition(&mut self, request: TransitionRequest) {
        self.requests.push(request);
    }

    /// Queues the return to normal movement from whatever state is active now.
    pub fn finish_current_state(&mut self) {
        let request = TransitionRequest::new(PlayerState::NormalMovement).from_state(self.state);

        self.requests.push(request);
    }
}
