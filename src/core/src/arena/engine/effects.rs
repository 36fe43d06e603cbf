use log::debug;
use nalgebra::Vector2;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    DashAimer,
    DashTrail,
    ShotTimer,
    ShotCharge,
    StunStars,
    GoalExplosion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectId(pub u64);

/// Fire-and-forget hooks into the visual/audio layer.
pub trait EffectSpawner {
    fn spawn(&mut self, kind: EffectKind, position: Vector2<f32>, duration: Option<f32>) -> EffectId;

    /// Removes an effect after `delay` seconds, zero removes it at once.
    fn destroy(&mut self, id: EffectId, delay: f32);
}

#[derive(Debug, Default)]
pub struct NoopEffects {
    next_id: u64,
}

impl EffectSpawner for NoopEffects {
    fn spawn(&mut self, _kind: EffectKind, _position: Vector2<f32>, _duration: Option<f32>) -> EffectId {
        self.next_id += 1;
        EffectId(self.next_id)
    }

    fn destroy(&mut self, _id: EffectId, _delay: f32) {}
}

/// Keeps track of effects that were spawned and not yet destroyed.
#[derive(Debug, Default)]
pub struct RecordingEffects {
    next_id: u64,
    live: Vec<(EffectId, EffectKind)>,
    spawned: Vec<EffectKind>,
}

impl RecordingEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self, kind: EffectKind) -> usize {
        self.live.iter().filter(|(_, k)| *k == kind).count()
    }

    pub fn total_live(&self) -> usize {
        self.live.len()
    }

    pub fn spawned_count(&self, kind: EffectKind) -> usize {
        self.spawned.iter().filter(|k| **k == kind).count()
    }
}

impl EffectSpawner for RecordingEffects {
    fn spawn(&mut self, kind: EffectKind, position: Vector2<f32>, duration: Option<f32>) -> EffectId {
        self.next_id += 1;

        let id = EffectId(self.next_id);

        debug!("spawn effect {:?} {:?} at {:?} for {:?}", id, kind, position, duration);

        self.live.push((id, kind));
        self.spawned.push(kind);

        id
    }

    fn destroy(&mut self, id: EffectId, delay: f32) {
        debug!("destroy effect {:?} after {}s", id, delay);

        self.live.retain(|(live_id, _)| *live_id != id);
    }
}

/// Lets a caller keep inspecting a spawner after handing it to the engine.
impl<E: EffectSpawner> EffectSpawner for Rc<RefCell<E>> {
    fn spawn(&mut self, kind: EffectKind, position: Vector2<f32>, duration: Option<f32>) -> EffectId {
        self.borrow_mut().spawn(kind, position, duration)
    }

    fn destroy(&mut self, id: EffectId, delay: f32) {
        self.borrow_mut().destroy(id, delay)
    }
}
