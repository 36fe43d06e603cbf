use crate::arena::{
    Action, ArenaEngine, CollisionEvent, DashInfo, EffectKind, InputFrame, Layer, Message,
    NoInput, Notification, PlayerId, PlayerState, PossessionInfo, RecordingEffects, RoundState,
    ScriptedInput, StunInfo, SubscriptionId, TeamId, TransitionOutcome,
};
use crate::ArenaConfig;
use nalgebra::Vector2;
use std::cell::RefCell;
use std::rc::Rc;

type Recorded = Rc<RefCell<Vec<Notification>>>;

fn engine_with(config: ArenaConfig, players: &[PlayerId]) -> (ArenaEngine, Rc<RefCell<RecordingEffects>>) {
    let effects = Rc::new(RefCell::new(RecordingEffects::new()));
    let mut engine = ArenaEngine::new(config, Box::new(Rc::clone(&effects)));

    for player_id in players {
        engine.add_player(*player_id);
    }

    (engine, effects)
}

fn record(engine: &mut ArenaEngine, message: Message) -> (SubscriptionId, Recorded) {
    let recorded = Recorded::default();
    let sink = Rc::clone(&recorded);

    let id = engine
        .notifications()
        .call_on_message(message, move |n| sink.borrow_mut().push(n.clone()));

    (id, recorded)
}

fn state_of(engine: &ArenaEngine, player_id: PlayerId) -> PlayerState {
    engine
        .player(player_id)
        .map(|p| p.state())
        .unwrap_or_else(|| panic!("no player {}", player_id))
}

/// Loops and effects alive must match exactly what the current states own.
fn assert_no_leaks(engine: &ArenaEngine, effects: &RecordingEffects) {
    let count = |state: PlayerState| engine.players().iter().filter(|p| p.state() == state).count();

    for player in engine.players() {
        let state = player.state();
        let mechanics = &player.mechanics;

        assert_eq!(mechanics.dash.is_charging(), state == PlayerState::ChargeDash);
        assert_eq!(mechanics.dash.is_dashing(), state == PlayerState::Dash);
        assert_eq!(mechanics.stun.is_stunned(), state == PlayerState::Stunned);
        assert_eq!(mechanics.carrier.is_orbiting(), state == PlayerState::Possession);
        assert_eq!(mechanics.shoot.is_timing(), state == PlayerState::Possession);
        assert_eq!(player.is_carrying_ball(), state == PlayerState::Possession);
    }

    assert_eq!(effects.live_count(EffectKind::DashAimer), count(PlayerState::ChargeDash));
    assert_eq!(effects.live_count(EffectKind::DashTrail), count(PlayerState::Dash));
    assert_eq!(effects.live_count(EffectKind::StunStars), count(PlayerState::Stunned));
    assert_eq!(effects.live_count(EffectKind::ShotTimer), count(PlayerState::Possession));
    assert!(effects.live_count(EffectKind::ShotCharge) <= count(PlayerState::Possession));

    let celebrating = matches!(engine.round(), RoundState::Celebrating { .. });
    assert_eq!(effects.live_count(EffectKind::GoalExplosion), usize::from(celebrating));
}

fn assert_single_owner(engine: &ArenaEngine) {
    let carriers: Vec<PlayerId> = engine
        .players()
        .iter()
        .filter(|p| p.is_carrying_ball())
        .map(|p| p.id)
        .collect();

    assert!(carriers.len() <= 1, "several carriers: {:?}", carriers);
    assert_eq!(engine.ball().owner(), carriers.first().copied());
}

#[test]
fn test_pickup_cooldown_scenario() {
    let (mut engine, _) = engine_with(ArenaConfig::default(), &[1, 2]);

    engine.deliver_collision(CollisionEvent::with_ball(1));
    assert_eq!(engine.ball().owner(), Some(1));
    assert!(!engine.ball().charged);

    assert_eq!(engine.finish_current_state(1), Some(TransitionOutcome::Applied));
    assert_eq!(engine.ball().owner(), None);

    // Same frame: the opponent is not cooling down
    engine.deliver_collision(CollisionEvent::with_ball(2));
    assert_eq!(engine.ball().owner(), Some(2));
    engine.finish_current_state(2);

    engine.frame_tick(0.05, &mut NoInput);
    engine.deliver_collision(CollisionEvent::with_ball(1));
    assert_eq!(engine.ball().owner(), None);
    assert_eq!(state_of(&engine, 1), PlayerState::NormalMovement);

    engine.frame_tick(0.06, &mut NoInput);
    engine.deliver_collision(CollisionEvent::with_ball(1));
    assert_eq!(engine.ball().owner(), Some(1));
    assert_eq!(state_of(&engine, 1), PlayerState::Possession);
}

#[test]
fn test_pickup_cooldown_through_main_loop() {
    let mut config = ArenaConfig::default();
    // Dropped ball stays within reach of the player standing on it
    config.carrier.ball_offset = 0.3;
    let step = config.arena.physics_step;
    let cool_down = config.carrier.cool_down_time;

    let (mut engine, _) = engine_with(config, &[1]);

    engine.deliver_collision(CollisionEvent::with_ball(1));
    for _ in 0..3 {
        engine.advance(step, &mut NoInput);
    }
    assert_eq!(engine.ball().owner(), Some(1));

    let dropped_at = engine.now();
    engine.finish_current_state(1);
    assert_eq!(engine.ball().owner(), None);

    let mut reacquired = None;
    for _ in 0..20 {
        engine.advance(step, &mut NoInput);

        if engine.ball().owner() == Some(1) {
            reacquired = Some(engine.now() - dropped_at);
            break;
        }
    }

    let delay = reacquired.unwrap_or_else(|| panic!("ball never picked up again"));
    assert!(delay >= cool_down - 1e-4, "picked up after {}", delay);
    assert!(delay <= cool_down + step + 1e-4, "picked up after {}", delay);
}

#[test]
fn test_dash_steals_from_carrier() {
    let (mut engine, effects) = engine_with(ArenaConfig::default(), &[1, 2]);

    let (stolen_id, stolen) = record(&mut engine, Message::BallStolen);
    let (networked_id, networked) = record(&mut engine, Message::NetworkedTransition);

    engine.deliver_collision(CollisionEvent::with_ball(1));

    let mut input = ScriptedInput::new();
    input.push(2, InputFrame::idle().press(Action::Dash).release(Action::Dash));
    engine.frame_tick(0.02, &mut input);
    assert_eq!(state_of(&engine, 2), PlayerState::Dash);

    engine.deliver_collision(CollisionEvent::with_player(2, 1));

    assert_eq!(engine.ball().owner(), Some(2));
    assert_eq!(engine.ball().last_owner(), Some(2));
    assert_eq!(state_of(&engine, 1), PlayerState::Stunned);
    assert_eq!(state_of(&engine, 2), PlayerState::Possession);

    let thief = engine.player(2).map(|p| p.state_manager().current_payload::<PossessionInfo>());
    assert_eq!(
        thief,
        Some(PossessionInfo {
            stole_ball: true,
            victim: Some(1)
        })
    );

    assert_eq!(
        *stolen.borrow(),
        vec![Notification::BallStolen {
            thief: 2,
            victim: Some(1)
        }]
    );
    assert!(matches!(
        networked.borrow()[..],
        [Notification::NetworkedTransition {
            player: 1,
            state: PlayerState::Stunned,
            ..
        }]
    ));

    assert_no_leaks(&engine, &effects.borrow());

    engine.notifications().unsubscribe(stolen_id);
    engine.notifications().unsubscribe(networked_id);
    assert_eq!(engine.shutdown(), 0);
}

#[test]
fn test_teammates_do_not_contest() {
    let mut config = ArenaConfig::default();
    config.arena.team_count = 1;

    let (mut engine, _) = engine_with(config, &[1, 2]);
    assert_eq!(engine.player(2).and_then(|p| p.team), Some(TeamId(1)));

    engine.deliver_collision(CollisionEvent::with_ball(1));

    let mut input = ScriptedInput::new();
    input.push(2, InputFrame::idle().press(Action::Dash).release(Action::Dash));
    engine.frame_tick(0.02, &mut input);

    engine.deliver_collision(CollisionEvent::with_player(2, 1));
    engine.deliver_collision(CollisionEvent::with_ball(2));

    assert_eq!(engine.ball().owner(), Some(1));
    assert_eq!(state_of(&engine, 1), PlayerState::Possession);
    assert_eq!(state_of(&engine, 2), PlayerState::Dash);
}

#[test]
fn test_charged_shot_stuns_opponent_without_pickup() {
    let mut config = ArenaConfig::default();
    config.collision.charged_ball_stuns = true;

    let (mut engine, effects) = engine_with(config, &[1, 2]);

    engine.deliver_collision(CollisionEvent::with_ball(1));

    let mut input = ScriptedInput::new();
    input
        .push(1, InputFrame::idle().press(Action::Shoot))
        .push(1, InputFrame::idle().release(Action::Shoot));

    engine.frame_tick(0.02, &mut input);
    assert!(engine.player(1).is_some_and(|p| p.mechanics.shoot.is_charging()));

    engine.frame_tick(0.02, &mut input);
    assert_eq!(state_of(&engine, 1), PlayerState::NormalMovement);
    assert!(engine.ball().charged);
    assert!(engine.ball().speed() > 0.0);
    assert_eq!(engine.ball().owner(), None);

    engine.deliver_collision(CollisionEvent::with_ball(2));

    assert_eq!(state_of(&engine, 2), PlayerState::Stunned);
    assert_eq!(engine.ball().owner(), None);
    assert_no_leaks(&engine, &effects.borrow());
}

fn measure_dash(dash_speed: f32) -> (f32, f32) {
    let mut config = ArenaConfig::default();
    config.dash.charge_rate = 0.0;
    config.dash.dash_speed = dash_speed;

    let (mut engine, _) = engine_with(config, &[1]);

    let mut input = ScriptedInput::new();
    input.push(1, InputFrame::idle().press(Action::Dash).release(Action::Dash));
    engine.frame_tick(0.01, &mut input);

    let started = engine.now();
    let speed = engine
        .player(1)
        .map(|p| p.state_manager().current_payload::<DashInfo>().velocity.norm())
        .unwrap_or_default();

    for _ in 0..200 {
        engine.frame_tick(0.01, &mut NoInput);

        if state_of(&engine, 1) != PlayerState::Dash {
            return (speed, engine.now() - started);
        }
    }

    panic!("dash never ended");
}

#[test]
fn test_dash_duration_is_capped_speed() {
    let (speed, duration) = measure_dash(0.8);
    assert!((speed - 0.8).abs() < 1e-5);
    assert!((duration - 0.5).abs() < 1e-3, "lasted {}", duration);

    let (speed, duration) = measure_dash(0.3);
    assert!((speed - 0.3).abs() < 1e-5);
    assert!((duration - 0.3).abs() < 1e-3, "lasted {}", duration);
}

#[test]
fn test_wall_stops_dash() {
    let (mut engine, effects) = engine_with(ArenaConfig::default(), &[1]);

    let mut input = ScriptedInput::new();
    input.push(1, InputFrame::idle().press(Action::Dash).release(Action::Dash));
    engine.frame_tick(0.02, &mut input);

    engine.deliver_collision(CollisionEvent::with_static(1, Layer::Wall));

    assert_eq!(state_of(&engine, 1), PlayerState::NormalMovement);
    assert_eq!(engine.player(1).map(|p| p.body.velocity), Some(Vector2::zeros()));
    assert_no_leaks(&engine, &effects.borrow());
}

#[test]
fn test_obstacle_stuns_dashing_player() {
    let config = ArenaConfig::default();
    let stun_time = config.dash.wall_hit_stun_time;

    let (mut engine, effects) = engine_with(config, &[1]);

    let mut input = ScriptedInput::new();
    input.push(1, InputFrame::idle().press(Action::Dash).release(Action::Dash));
    engine.frame_tick(0.02, &mut input);
    assert_eq!(state_of(&engine, 1), PlayerState::Dash);

    engine.deliver_collision(CollisionEvent::with_static(1, Layer::Obstacle));

    assert_eq!(state_of(&engine, 1), PlayerState::Stunned);
    let duration = engine
        .player(1)
        .map(|p| p.state_manager().current_payload::<StunInfo>().duration);
    assert_eq!(duration, Some(stun_time));
    assert_no_leaks(&engine, &effects.borrow());
}

#[test]
fn test_carried_ball_keeps_orbit_radius() {
    let config = ArenaConfig::default();
    let radius = config.carrier.ball_offset;

    let (mut engine, _) = engine_with(config, &[1]);
    engine.deliver_collision(CollisionEvent::with_ball(1));

    let mut input = ScriptedInput::new();
    for step in 0..100 {
        let angle = (step * 37 % 360) as f32 * std::f32::consts::PI / 180.0;
        input.push(1, InputFrame::idle().aiming(Vector2::new(angle.cos(), angle.sin())));
    }

    for _ in 0..100 {
        engine.advance(0.02, &mut input);

        let center = engine.player(1).map(|p| p.body.position).unwrap_or_default();
        let distance = (engine.ball().position - center).norm();

        assert!((distance - radius).abs() < 1e-4, "ball drifted to {}", distance);
        assert_eq!(engine.ball().owner(), Some(1));
    }
}

#[test]
fn test_goal_freezes_then_resets_round() {
    let mut config = ArenaConfig::default();
    config.arena.ball_drag = 0.0;
    config.shoot.base_shot_speed = 30.0;
    config.shoot.charge_on_hold = false;

    let (mut engine, effects) = engine_with(config, &[1]);

    let (goal_id, goals) = record(&mut engine, Message::GoalScored);
    let (reset_id, resets) = record(&mut engine, Message::RoundReset);

    engine.deliver_collision(CollisionEvent::with_ball(1));

    let mut input = ScriptedInput::new();
    input.push(1, InputFrame::idle().press(Action::Shoot));

    for _ in 0..100 {
        engine.advance(0.02, &mut input);

        if !goals.borrow().is_empty() {
            break;
        }
    }

    assert_eq!(
        *goals.borrow(),
        vec![Notification::GoalScored {
            scorer: Some(1),
            conceding_team: Some(TeamId(2))
        }]
    );
    assert!(matches!(engine.round(), RoundState::Celebrating { .. }));
    assert_eq!(state_of(&engine, 1), PlayerState::FrozenAfterGoal);
    assert!(!engine.ball().is_ownable());
    assert_no_leaks(&engine, &effects.borrow());

    for _ in 0..100 {
        engine.advance(0.02, &mut NoInput);
    }

    assert_eq!(resets.borrow().len(), 1);
    assert_eq!(engine.round(), RoundState::Playing);
    assert_eq!(state_of(&engine, 1), PlayerState::NormalMovement);
    assert!(engine.ball().is_ownable());
    assert_eq!(engine.ball().position, Vector2::zeros());
    assert_eq!(effects.borrow().total_live(), 0);
    assert_eq!(engine.running_tasks(), 0);

    engine.notifications().unsubscribe(goal_id);
    engine.notifications().unsubscribe(reset_id);
    assert_eq!(engine.shutdown(), 0);
}

#[test]
fn test_state_changes_are_published() {
    let (mut engine, _) = engine_with(ArenaConfig::default(), &[1, 2]);

    let recorded = Recorded::default();
    let sink = Rc::clone(&recorded);
    let id = engine.notifications().call_on_message_if_same_source(
        Message::StateChanged,
        2,
        move |n| sink.borrow_mut().push(n.clone()),
    );

    let mut input = ScriptedInput::new();
    input
        .push(1, InputFrame::idle().press(Action::Dash))
        .push(2, InputFrame::idle().press(Action::Dash));
    engine.frame_tick(0.02, &mut input);

    assert_eq!(
        *recorded.borrow(),
        vec![Notification::StateChanged {
            player: 2,
            old: PlayerState::NormalMovement,
            new: PlayerState::ChargeDash
        }]
    );

    assert!(engine.notifications().unsubscribe(id));
    assert_eq!(engine.shutdown(), 0);
}

#[test]
fn test_forgotten_subscription_is_reported() {
    let (mut engine, _) = engine_with(ArenaConfig::default(), &[1]);

    let _ = engine
        .notifications()
        .call_on_message(Message::PossessionChanged, |_| {});

    assert_eq!(engine.shutdown(), 1);
}

/// Players chase the ball, dash into each other and shoot at the far goal.
fn scripted_frame(engine: &ArenaEngine, frame: usize) -> ScriptedInput {
    let mut input = ScriptedInput::new();

    for player in engine.players() {
        let seed = frame + player.id as usize * 13;
        let to_ball = engine.ball().position - player.body.position;

        let mut next = InputFrame::idle().moving(to_ball);

        if player.is_carrying_ball() {
            let goal_x = if player.team == Some(TeamId(1)) { 12.0 } else { -12.0 };
            next = next.aiming(Vector2::new(goal_x, 0.0) - player.body.position);
        }

        match seed % 41 {
            0 => next = next.press(Action::Dash),
            9 => next = next.release(Action::Dash),
            _ => {}
        }

        match seed % 29 {
            3 => next = next.press(Action::Shoot),
            17 => next = next.release(Action::Shoot),
            _ => {}
        }

        input.push(player.id, next);
    }

    input
}

#[test]
fn test_long_match_never_leaks_or_duplicates_owners() {
    let mut config = ArenaConfig::default();
    config.collision.charged_ball_stuns = true;
    config.collision.only_stun_ball_carriers = false;

    let (mut engine, effects) = engine_with(config, &[1, 2, 3, 4]);

    for frame in 0..3000 {
        let mut input = scripted_frame(&engine, frame);

        engine.advance(1.0 / 60.0, &mut input);

        assert_single_owner(&engine);
        assert_no_leaks(&engine, &effects.borrow());
    }

    assert_eq!(engine.shutdown(), 0);
}
