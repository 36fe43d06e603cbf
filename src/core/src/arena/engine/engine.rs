use crate::arena::{
    ArenaContext, ArenaField, ArenaPlayer, Ball, BallEvent, BallEventDispatcher,
    BallGoalEventMetadata, CollisionEvent, CollisionInteractionResolver, Contact, ContactOther,
    ContactTarget, EffectKind, EffectSpawner, InputFrame, InputSource, Interaction, Layer,
    Notification, NotificationCenter, PlayerId, PlayerState, PossessionInfo, RoundState,
    StateChange, StunInfo, TeamId, TickEnv, TransitionOutcome, TransitionPayload,
};
use crate::ArenaConfig;
use log::{debug, info, warn};
use nalgebra::Vector2;

/// Drives one match: fixed physics steps for movement, orbit placement and
/// contacts, variable frame steps for input and per-player timers.
pub struct ArenaEngine {
    context: ArenaContext,
    field: ArenaField,
}

impl ArenaEngine {
    pub fn new(config: ArenaConfig, effects: Box<dyn EffectSpawner>) -> Self {
        let field = ArenaField::new(&config.arena);
        let context = ArenaContext::new(config, effects);

        ArenaEngine { context, field }
    }

    pub fn add_player(&mut self, player_id: PlayerId) -> Option<TeamId> {
        assert!(
            self.field.player(player_id).is_none(),
            "player {} joined twice",
            player_id
        );

        let team = self.context.teams.assign(player_id);

        let slot = self
            .context
            .teams
            .teams()
            .iter()
            .find(|t| Some(t.id) == team)
            .map_or(self.field.players.len(), |t| t.members.len() - 1);

        let (position, rotation) =
            self.field
                .spawn_point(team, self.context.config.arena.team_count, slot);

        self.field
            .players
            .push(ArenaPlayer::new(player_id, team, position, rotation));

        match team {
            Some(team) => info!("player {} joined {}", player_id, team),
            None => info!("player {} joined without a team", player_id),
        }

        team
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.context.config
    }

    pub fn now(&self) -> f32 {
        self.context.time.elapsed()
    }

    pub fn round(&self) -> RoundState {
        self.context.round
    }

    pub fn ball(&self) -> &Ball {
        &self.field.ball
    }

    pub fn field(&self) -> &ArenaField {
        &self.field
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&ArenaPlayer> {
        self.field.player(player_id)
    }

    pub fn players(&self) -> &[ArenaPlayer] {
        &self.field.players
    }

    pub fn notifications(&mut self) -> &mut NotificationCenter {
        &mut self.context.notifications
    }

    pub fn is_finished(&self) -> bool {
        self.context.is_finished()
    }

    /// Per-tick loops alive across every player.
    pub fn running_tasks(&self) -> usize {
        self.field
            .players
            .iter()
            .map(|p| p.mechanics.running_tasks())
            .sum()
    }

    /// Main-loop entry: as many fixed physics steps as `dt` covers, then one frame.
    /// The clock moves first so contacts found by those steps see this frame's time.
    pub fn advance(&mut self, dt: f32, input: &mut dyn InputSource) {
        let step = self.context.config.arena.physics_step;

        self.context.time.advance(dt);
        self.context.time.accumulate(dt);

        while self.context.time.consume_step(step) {
            self.physics_tick();
        }

        self.run_frame(dt, input);
    }

    pub fn physics_tick(&mut self) {
        let step = self.context.config.arena.physics_step;
        let bounds = self.field.bounds;

        {
            let ArenaEngine { context, field } = self;
            let mut env = tick_env(context, &mut field.ball, step);

            for player in field.players.iter_mut() {
                player.physics_update(&mut env, &bounds);
            }
        }

        let playing = self.context.round == RoundState::Playing;

        if playing {
            let arena = &self.context.config.arena;
            self.field
                .ball
                .integrate(step, &bounds, arena.ball_drag, arena.wall_bounce);
        }

        for event in self.field.detect_contacts() {
            self.route_collision(event);
        }

        let goal = if playing { self.field.check_goal() } else { None };

        if let Some(side) = goal {
            let metadata = BallGoalEventMetadata {
                scorer: self.field.ball.last_owner(),
                conceding_team: side.defending_team(self.context.config.arena.team_count),
            };

            self.field.ball.push_event(BallEvent::Goal(metadata));
        }

        self.flush();
    }

    /// Input is polled and applied before any timer advances.
    pub fn frame_tick(&mut self, dt: f32, input: &mut dyn InputSource) {
        self.context.time.advance(dt);
        self.run_frame(dt, input);
    }

    fn run_frame(&mut self, dt: f32, input: &mut dyn InputSource) {
        for index in 0..self.field.players.len() {
            let player_id = self.field.players[index].id;
            let frame = input.poll(player_id);

            self.publish_input(player_id, &frame);

            self.with_player(index, dt, |player, env| player.frame_update(env, &frame));
        }

        let now = self.now();
        let reset_due = matches!(
            self.context.round,
            RoundState::Celebrating { until, .. } if now >= until
        );

        if reset_due {
            self.reset_round();
        }

        self.flush();
    }

    pub fn deliver_collision(&mut self, event: CollisionEvent) {
        self.route_collision(event);
        self.flush();
    }

    /// Sends a player back to normal movement, dropping a held ball.
    pub fn finish_current_state(&mut self, player_id: PlayerId) -> Option<TransitionOutcome> {
        let index = self.field.index_of(player_id)?;

        let outcome = self.with_player(index, 0.0, |player, env| player.finish_current_state(env));

        self.flush();

        Some(outcome)
    }

    /// Ends the match, returns how many subscriptions were never released.
    pub fn shutdown(&mut self) -> usize {
        self.context.notifications.teardown()
    }

    fn route_collision(&mut self, event: CollisionEvent) {
        debug!("Collision event: {:?}", event);

        let Some(index) = self.field.index_of(event.initiator) else {
            warn!("collision for unknown player {}", event.initiator);
            return;
        };

        // A carried ball stands in for its carrier
        let (other_id, hit_ball) = match event.target {
            ContactTarget::Static => {
                self.handle_static_contact(index, event.layer);
                return;
            }
            ContactTarget::Ball => match self.field.ball.owner() {
                Some(owner) if owner == event.initiator => return,
                owner => (owner, true),
            },
            ContactTarget::Player(other) => (Some(other), false),
        };

        let now = self.now();

        let Some(initiator) = self.field.snapshot(event.initiator, now) else {
            return;
        };

        let other = match other_id {
            Some(id) => match self.field.snapshot(id, now) {
                Some(snapshot) => ContactOther::Player(snapshot),
                None => {
                    warn!("collision with unknown player {}", id);
                    return;
                }
            },
            None => ContactOther::LooseBall,
        };

        let contact = Contact {
            initiator,
            other,
            hit_ball,
            ball: self.field.ball_snapshot(),
        };

        let interactions = CollisionInteractionResolver::new(
            &self.context.config.collision,
            &self.context.config.dash,
        )
        .resolve(&contact);

        for interaction in interactions {
            self.apply_interaction(interaction);
        }
    }

    fn apply_interaction(&mut self, interaction: Interaction) {
        let (player_id, outcome) = match interaction {
            Interaction::Stun { player, info } => {
                let Some(index) = self.field.index_of(player) else {
                    return;
                };
                (player, self.with_player(index, 0.0, |p, env| p.attempt_stun(env, info)))
            }
            Interaction::Possession { player, info } => {
                let Some(index) = self.field.index_of(player) else {
                    return;
                };
                (player, self.with_player(index, 0.0, |p, env| p.attempt_possession(env, info)))
            }
        };

        debug!("player {}: {:?} -> {:?}", player_id, interaction, outcome);
    }

    fn handle_static_contact(&mut self, index: usize, layer: Layer) {
        if self.field.players[index].state() != PlayerState::Dash {
            return;
        }

        let dash = &self.context.config.dash;

        if dash.stop_dash_on.contains(&layer) {
            self.with_player(index, 0.0, |player, env| player.end_dash(env));
        } else if dash.stun_dash_on.contains(&layer) {
            let info = StunInfo {
                knockback: Vector2::zeros(),
                duration: dash.wall_hit_stun_time,
                is_networked: false,
            };

            self.with_player(index, 0.0, |player, env| player.attempt_stun(env, info));
        }
    }

    fn on_goal(&mut self, metadata: BallGoalEventMetadata) {
        match metadata.conceding_team {
            Some(team) => info!("goal by {:?} against {}", metadata.scorer, team),
            None => info!("goal by {:?}", metadata.scorer),
        }

        let ArenaEngine { context, field } = self;

        field.ball.set_ownable(false);
        field.ball.velocity = Vector2::zeros();

        let pause = context.config.arena.pause_after_goal;
        let until = context.time.elapsed() + pause;
        let effect = context
            .effects
            .spawn(EffectKind::GoalExplosion, field.ball.position, Some(pause));

        let mut env = tick_env(context, &mut field.ball, 0.0);

        for player in field.players.iter_mut() {
            player.freeze_after_goal(&mut env);
        }

        context.round = RoundState::Celebrating { until, effect };
    }

    fn reset_round(&mut self) {
        info!("round reset at {:.2}s", self.now());

        let ArenaEngine { context, field } = self;

        if let RoundState::Celebrating { effect, .. } = context.round {
            context.effects.destroy(effect, 0.0);
        }

        field.ball.reset();
        field.reset_players_positions();

        let mut env = tick_env(context, &mut field.ball, 0.0);

        for player in field.players.iter_mut() {
            if player.state() == PlayerState::FrozenAfterGoal {
                player.finish_current_state(&mut env);
            }
        }

        context.round = RoundState::Playing;
        context.notifications.publish(Notification::RoundReset);
    }

    fn with_player<R>(
        &mut self,
        index: usize,
        dt: f32,
        f: impl FnOnce(&mut ArenaPlayer, &mut TickEnv<'_>) -> R,
    ) -> R {
        let ArenaEngine { context, field } = self;
        let mut env = tick_env(context, &mut field.ball, dt);

        f(&mut field.players[index], &mut env)
    }

    fn publish_input(&mut self, player: PlayerId, frame: &InputFrame) {
        let notifications = &mut self.context.notifications;

        for action in &frame.pressed {
            notifications.publish(Notification::Input {
                player,
                action: *action,
                pressed: true,
            });
        }

        for action in &frame.released {
            notifications.publish(Notification::Input {
                player,
                action: *action,
                pressed: false,
            });
        }
    }

    /// Publishes state changes and ball events, handling goals they raise.
    fn flush(&mut self) {
        loop {
            let ArenaEngine { context, field } = self;

            for player in field.players.iter_mut() {
                for change in player.take_state_changes() {
                    publish_state_change(&mut context.notifications, player.id, &change);
                }
            }

            let goals: Vec<BallGoalEventMetadata> = field
                .ball
                .take_events()
                .into_iter()
                .filter_map(|event| BallEventDispatcher::dispatch(event, &mut context.notifications))
                .collect();

            if goals.is_empty() {
                break;
            }

            for goal in goals {
                if self.context.round == RoundState::Playing {
                    self.on_goal(goal);
                }
            }
        }
    }
}

fn tick_env<'a>(context: &'a mut ArenaContext, ball: &'a mut Ball, dt: f32) -> TickEnv<'a> {
    let now = context.time.elapsed();

    TickEnv {
        ball,
        effects: context.effects.as_mut(),
        config: &context.config,
        now,
        dt,
    }
}

fn publish_state_change(notifications: &mut NotificationCenter, player: PlayerId, change: &StateChange) {
    notifications.publish(Notification::StateChanged {
        player,
        old: change.from,
        new: change.to,
    });

    match change.payload {
        Some(payload @ TransitionPayload::Stun(info)) if info.is_networked => {
            notifications.publish(Notification::NetworkedTransition {
                player,
                state: change.to,
                payload,
            });
        }
        Some(TransitionPayload::Possession(PossessionInfo {
            stole_ball: true,
            victim,
        })) => {
            info!("player {} stole the ball from {:?}", player, victim);

            notifications.publish(Notification::BallStolen {
                thief: player,
                victim,
            });
        }
        _ => {}
    }
}
