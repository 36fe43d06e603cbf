use crate::arena::Layer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub arena: MatchConfig,
    pub carrier: CarrierConfig,
    pub dash: DashConfig,
    pub shoot: ShootConfig,
    pub collision: CollisionPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Fixed physics step in seconds
    pub physics_step: f32,
    /// Match length in seconds
    pub match_length: f32,
    pub pause_after_goal: f32,
    pub team_count: u8,
    pub width: f32,
    pub height: f32,
    pub goal_width: f32,
    pub player_radius: f32,
    pub ball_radius: f32,
    pub move_speed: f32,
    /// Fraction of free-ball speed lost per second
    pub ball_drag: f32,
    pub wall_bounce: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            physics_step: 0.02,
            match_length: 300.0,
            pause_after_goal: 1.5,
            team_count: 2,
            width: 24.0,
            height: 14.0,
            goal_width: 4.0,
            player_radius: 0.35,
            ball_radius: 0.15,
            move_speed: 6.0,
            ball_drag: 0.6,
            wall_bounce: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarrierConfig {
    pub cool_down_time: f32,
    /// Arc distance per second the carried ball travels around its carrier
    pub ball_turn_speed: f32,
    /// Orbit radius measured from the carrier's center
    pub ball_offset: f32,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        CarrierConfig {
            cool_down_time: 0.1,
            ball_turn_speed: 10.0,
            ball_offset: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub charge_rate: f32,
    pub dash_speed: f32,
    /// Upper bound of a dash in seconds, the dash itself lasts `min(|velocity|, duration_cap)`
    pub duration_cap: f32,
    /// Seconds after a dash before the dash button charges again
    pub cooldown: f32,
    pub steal_knockback_amount: f32,
    pub steal_knockback_length: f32,
    pub wall_hit_stun_time: f32,
    /// Layers that end a dash on contact
    pub stop_dash_on: Vec<Layer>,
    /// Layers that stun a dashing player on contact
    pub stun_dash_on: Vec<Layer>,
    pub charge_curve: ChargeCurve,
}

impl Default for DashConfig {
    fn default() -> Self {
        DashConfig {
            charge_rate: 1.0,
            dash_speed: 50.0,
            duration_cap: 0.5,
            cooldown: 0.5,
            steal_knockback_amount: 100.0,
            steal_knockback_length: 0.5,
            wall_hit_stun_time: 0.05,
            stop_dash_on: vec![Layer::Wall],
            stun_dash_on: vec![Layer::Obstacle],
            charge_curve: ChargeCurve::UncappedLinear,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootConfig {
    pub forced_shot_time: f32,
    pub base_shot_speed: f32,
    pub charge_rate: f32,
    /// Pressing shoot starts a hold-to-charge shot instead of firing at once
    pub charge_on_hold: bool,
    pub charge_curve: ChargeCurve,
}

impl Default for ShootConfig {
    fn default() -> Self {
        ShootConfig {
            forced_shot_time: 3.0,
            base_shot_speed: 1.0,
            charge_rate: 1.0,
            charge_on_hold: true,
            charge_curve: ChargeCurve::CappedPower {
                cap: f32::MAX,
                exponent: 1.1,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionPolicy {
    pub charged_ball_stuns: bool,
    pub only_steal_on_ball_hit: bool,
    pub only_stun_ball_carriers: bool,
    pub charged_knockback_duration: f32,
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        CollisionPolicy {
            charged_ball_stuns: false,
            only_steal_on_ball_hit: false,
            only_stun_ball_carriers: true,
            charged_knockback_duration: 0.5,
        }
    }
}

/// Shapes an accumulated charge into the value a controller consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChargeCurve {
    UncappedLinear,
    CappedPower { cap: f32, exponent: f32 },
}

impl ChargeCurve {
    pub fn apply(&self, charge: f32) -> f32 {
        let charge = charge.max(0.0);

        match *self {
            ChargeCurve::UncappedLinear => charge,
            ChargeCurve::CappedPower { cap, exponent } => charge.min(cap).powf(exponent),
        }
    }
}
