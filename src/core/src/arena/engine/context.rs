use crate::arena::{EffectId, EffectSpawner, NotificationCenter, TeamAssignment};
use crate::ArenaConfig;

/// Match-wide state shared by every component, built once per match.
pub struct ArenaContext {
    pub config: ArenaConfig,
    pub time: ArenaTime,
    pub teams: TeamAssignment,
    pub notifications: NotificationCenter,
    pub effects: Box<dyn EffectSpawner>,
    pub round: RoundState,
}

impl ArenaContext {
    pub fn new(config: ArenaConfig, effects: Box<dyn EffectSpawner>) -> Self {
        let teams = TeamAssignment::new(config.arena.team_count);

        ArenaContext {
            config,
            time: ArenaTime::new(),
            teams,
            notifications: NotificationCenter::new(),
            effects,
            round: RoundState::Playing,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.time.elapsed() >= self.config.arena.match_length
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundState {
    Playing,
    /// A goal was scored, the round resets at `until`
    Celebrating { until: f32, effect: EffectId },
}

/// Match clock plus the fixed-step accumulator for physics.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArenaTime {
    elapsed: f32,
    accumulator: f32,
}

impl ArenaTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    pub fn accumulate(&mut self, dt: f32) {
        self.accumulator += dt;
    }

    /// Takes one fixed step out of the accumulator if a whole step is available.
    pub fn consume_step(&mut self, step: f32) -> bool {
        if step > 0.0 && self.accumulator >= step {
            self.accumulator -= step;
            true
        } else {
            false
        }
    }
}
