use crate::arena::PlayerId;
use nalgebra::Vector2;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Dash,
    Shoot,
}

/// What one player's device reported since the previous frame.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFrame {
    pub pressed: Vec<Action>,
    pub released: Vec<Action>,
    pub movement: Vector2<f32>,
    /// Facing requested by the stick, zero keeps the current facing
    pub aim: Vector2<f32>,
}

impl Default for InputFrame {
    fn default() -> Self {
        InputFrame {
            pressed: Vec::new(),
            released: Vec::new(),
            movement: Vector2::zeros(),
            aim: Vector2::zeros(),
        }
    }
}

impl InputFrame {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn press(mut self, action: Action) -> Self {
        self.pressed.push(action);
        self
    }

    pub fn release(mut self, action: Action) -> Self {
        self.released.push(action);
        self
    }

    pub fn moving(mut self, movement: Vector2<f32>) -> Self {
        self.movement = movement;
        self
    }

    pub fn aiming(mut self, aim: Vector2<f32>) -> Self {
        self.aim = aim;
        self
    }

    pub fn was_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    pub fn was_released(&self, action: Action) -> bool {
        self.released.contains(&action)
    }
}

pub trait InputSource {
    fn poll(&mut self, player_id: PlayerId) -> InputFrame;
}

#[derive(Debug, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self, _player_id: PlayerId) -> InputFrame {
        InputFrame::idle()
    }
}

/// Replays queued frames per player, idle once a queue runs dry.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    frames: HashMap<PlayerId, VecDeque<InputFrame>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, player_id: PlayerId, frame: InputFrame) -> &mut Self {
        self.frames.entry(player_id).or_default().push_back(frame);
        self
    }

    /// Queues `count` idle frames so later frames land on a known tick.
    pub fn wait(&mut self, player_id: PlayerId, count: usize) -> &mut Self {
        for _ in 0..count {
            self.push(player_id, InputFrame::idle());
        }
        self
    }

    pub fn pending(&self, player_id: PlayerId) -> usize {
        self.frames.get(&player_id).map_or(0, |f| f.len())
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, player_id: PlayerId) -> InputFrame {
        self.frames
            .get_mut(&player_id)
            .and_then(|frames| frames.pop_front())
            .unwrap_or_default()
    }
}
