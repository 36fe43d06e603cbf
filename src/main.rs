use color_eyre::eyre::{Result, WrapErr};
use env_logger::Env;
use gameplay::utils::TimeEstimation;
use gameplay::{
    Action, ArenaConfig, ArenaEngine, InputFrame, InputSource, Message, NoopEffects, Notification,
    PlayerCheckin, PlayerId, TeamId, Vector2,
};
use log::{info, warn};
use rand::rngs::ThreadRng;
use rand::RngExt;
use std::cell::RefCell;
use std::collections::HashMap;
use std::env;
use std::rc::Rc;
use std::time::Duration;

const FRAME_TIME: f32 = 1.0 / 60.0;
const DEFAULT_PLAYERS: u32 = 4;

/// Bots that wander, aim at random and mash the buttons now and then.
struct RandomBots {
    rng: ThreadRng,
    holding: HashMap<(PlayerId, Action), u32>,
}

impl RandomBots {
    fn new() -> Self {
        RandomBots {
            rng: rand::rng(),
            holding: HashMap::new(),
        }
    }

    fn button(&mut self, player_id: PlayerId, action: Action, frame: InputFrame) -> InputFrame {
        match self.holding.get_mut(&(player_id, action)) {
            Some(0) => {
                self.holding.remove(&(player_id, action));
                frame.release(action)
            }
            Some(frames) => {
                *frames -= 1;
                frame
            }
            None if self.rng.random_bool(0.02) => {
                let frames = self.rng.random_range(0..40);
                self.holding.insert((player_id, action), frames);
                frame.press(action)
            }
            None => frame,
        }
    }
}

impl InputSource for RandomBots {
    fn poll(&mut self, player_id: PlayerId) -> InputFrame {
        let movement = Vector2::new(
            self.rng.random_range(-1.0..=1.0),
            self.rng.random_range(-1.0..=1.0),
        );

        let frame = InputFrame::idle().moving(movement);
        let frame = self.button(player_id, Action::Dash, frame);

        self.button(player_id, Action::Shoot, frame)
    }
}

fn load_config() -> Result<ArenaConfig> {
    match env::var("ARENA_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .wrap_err_with(|| format!("failed to read config {}", path))?;

            serde_json::from_str(&json).wrap_err_with(|| format!("invalid config {}", path))
        }
        Err(_) => Ok(ArenaConfig::default()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = load_config()?;

    let player_count = env::var("ARENA_PLAYERS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PLAYERS);

    let is_realtime = env::var("MODE") == Ok(String::from("REALTIME"));

    let mut engine = ArenaEngine::new(config, Box::new(NoopEffects::default()));

    let roster: Vec<PlayerId> = (1..=player_count).collect();
    for player_id in &roster {
        engine.add_player(*player_id);
    }

    let mut bots = RandomBots::new();

    // Everyone presses dash once to confirm they are ready
    let checkin = Rc::new(RefCell::new(PlayerCheckin::new().on_change(
        |event, count| info!("lobby: {:?}, {} ready", event, count),
    )));
    checkin.borrow_mut().reset(&roster);
    checkin.borrow_mut().start_listening();

    let lobby = {
        let checkin = Rc::clone(&checkin);
        engine
            .notifications()
            .call_on_message(Message::PlayerPressedDash, move |notification| {
                if let Some(player_id) = notification.source() {
                    checkin.borrow_mut().check_in(player_id);
                }
            })
    };

    let mut interval = tokio::time::interval(Duration::from_secs_f32(FRAME_TIME));

    // Only dash presses reach the lobby, the match clock stays at zero
    while !checkin.borrow().all_checked_in(&roster) {
        if is_realtime {
            interval.tick().await;
        }

        for player_id in &roster {
            if bots.poll(*player_id).was_pressed(Action::Dash) {
                engine.notifications().publish(Notification::Input {
                    player: *player_id,
                    action: Action::Dash,
                    pressed: true,
                });
            }
        }
    }

    checkin.borrow_mut().stop_listening();
    engine.notifications().unsubscribe(lobby);

    info!("all {} players ready, kickoff", roster.len());

    let score = Rc::new(RefCell::new(HashMap::<TeamId, u32>::new()));

    let goals = {
        let score = Rc::clone(&score);
        engine
            .notifications()
            .call_on_message(Message::GoalScored, move |notification| {
                // A goal against one team counts for everyone else
                if let Notification::GoalScored {
                    conceding_team: Some(team),
                    ..
                } = notification
                {
                    *score.borrow_mut().entry(*team).or_default() += 1;
                }
            })
    };

    let mut frames = 0u64;
    let mut slowest = 0u128;

    while !engine.is_finished() {
        if is_realtime {
            interval.tick().await;
        }

        let ((), estimated) = TimeEstimation::estimate(|| engine.advance(FRAME_TIME, &mut bots));

        slowest = slowest.max(estimated);
        frames += 1;
    }

    info!(
        "match finished after {} frames, slowest frame {} ms",
        frames, slowest
    );

    for (team, conceded) in score.borrow().iter() {
        info!("{} conceded {}", team, conceded);
    }

    engine.notifications().unsubscribe(goals);

    let leaked = engine.shutdown();
    if leaked > 0 {
        warn!("{} subscriptions leaked", leaked);
    }

    Ok(())
}
