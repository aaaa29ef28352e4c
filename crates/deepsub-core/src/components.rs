//! World components: vehicles, upgrade slots, bio reactor units.

use deepsub_logic::modules::ModuleKind;
use hecs::Entity;
use serde::{Deserialize, Serialize};

/// A simulated vehicle. One entity carrying this component owns its upgrade
/// slots and reactor units; the engine manages one manager bundle per live
/// vehicle entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub name: String,
    /// Stored power across the vehicle's power cells.
    pub power_charge: f32,
    pub power_capacity: f32,
    /// Engine power rating multiplier (1.0 = baseline).
    pub power_rating: f32,
    /// Silent running cost per tick, driven by the power index.
    pub silent_running_cost: f32,
    pub sonar_cost: f32,
    pub shield_cost: f32,
    /// Unmodified crush depth in meters.
    pub base_crush_depth: u16,
    /// Extra crush depth granted by the resolved hull tier.
    pub bonus_crush_depth: u16,
}

impl Vehicle {
    pub fn new(name: impl Into<String>, power_capacity: f32) -> Self {
        Self {
            name: name.into(),
            power_charge: power_capacity,
            power_capacity,
            power_rating: 1.0,
            silent_running_cost: 5.0,
            sonar_cost: 10.0,
            shield_cost: 50.0,
            base_crush_depth: 500,
            bonus_crush_depth: 0,
        }
    }

    /// Outstanding power deficit for this tick.
    pub fn power_deficit(&self) -> f32 {
        (self.power_capacity - self.power_charge).max(0.0)
    }

    /// Total crush depth including the resolved hull bonus.
    pub fn crush_depth(&self) -> u16 {
        self.base_crush_depth + self.bonus_crush_depth
    }
}

/// Ambient conditions around one vehicle. The host updates this; charge
/// sources only read it. This is the narrow interface for the handful of
/// host values the sources need.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Environment {
    /// Current depth in meters.
    pub depth: f32,
    /// Sunlight intensity 0..1 (day/night cycle supplied by the host).
    pub sun_intensity: f32,
    /// Ambient water temperature in °C.
    pub water_temp: f32,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            depth: 0.0,
            sun_intensity: 1.0,
            water_temp: 15.0,
        }
    }
}

/// One equipment slot on a vehicle. Slots are fixed at spawn; the host
/// swaps modules in and out and the scanner re-reads them every tick.
#[derive(Debug, Clone)]
pub struct UpgradeSlot {
    pub vehicle: Entity,
    pub slot_id: u32,
    pub module: Option<ModuleKind>,
}

/// One bio reactor unit installed aboard a vehicle. Burns stored organic
/// charge; never recharges on its own.
#[derive(Debug, Clone)]
pub struct BioReactorUnit {
    pub vehicle: Entity,
    pub charge: f32,
    pub capacity: f32,
    /// Draw order among the vehicle's reactors; lower drains first.
    pub priority: u8,
}

impl BioReactorUnit {
    pub fn has_power(&self) -> bool {
        self.charge > 0.0
    }

    /// Drain up to `cap` charge, also bounded by what the caller still
    /// needs. Returns the amount actually drawn.
    pub fn draw(&mut self, cap: f32, requested: f32) -> f32 {
        let amount = cap.min(requested).min(self.charge).max(0.0);
        self.charge -= amount;
        amount
    }
}
