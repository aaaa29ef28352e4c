//! Charge arbitration - distributes a power deficit across producers.
//!
//! Every producer implements [`ChargeSource`]. The [`ChargeArbiter`] visits
//! its registered sources in a fixed order, hands each the remaining
//! deficit, and stops as soon as the deficit is satisfied. Sources later in
//! the order are deliberately not queried on such ticks. Renewability is
//! display/accounting data only; it never reorders arbitration.

use deepsub_logic::config::ChargeTuning;
use deepsub_logic::indicator::IndicatorSnapshot;
use hecs::{Entity, World};

use crate::components::{BioReactorUnit, Environment};
use crate::systems::ModuleCounts;

/// Per-tick read-only inputs shared by all sources of one vehicle.
pub struct ChargeContext<'a> {
    pub vehicle: Entity,
    pub env: Environment,
    pub counts: &'a ModuleCounts,
    pub tuning: &'a ChargeTuning,
}

/// Capability contract for one producer category.
pub trait ChargeSource {
    /// HUD icon identifier.
    fn icon(&self) -> &'static str;

    /// Whether this source regenerates on its own.
    fn is_renewable(&self) -> bool;

    /// Whether the most recent `produce` call actually supplied power.
    fn is_currently_producing(&self) -> bool;

    /// Supply up to `requested` power. Never returns more than `requested`
    /// and never errors on "nothing to produce"; a source with no eligible
    /// sub-producers returns exactly 0.
    fn produce(&mut self, world: &mut World, ctx: &ChargeContext, requested: f32) -> f32;

    /// Display snapshot over the sub-producers evaluated last tick.
    fn display_snapshot(&self) -> IndicatorSnapshot;
}

/// Orders and rate-limits draw-down across all registered sources.
pub struct ChargeArbiter {
    sources: Vec<Box<dyn ChargeSource>>,
    snapshots: Vec<IndicatorSnapshot>,
}

impl std::fmt::Debug for ChargeArbiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChargeArbiter")
            .field("sources", &self.sources.len())
            .finish_non_exhaustive()
    }
}

impl ChargeArbiter {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            snapshots: Vec::new(),
        }
    }

    /// Append a source. Registration order is the arbitration order and is
    /// stable across ticks.
    pub fn register(&mut self, source: Box<dyn ChargeSource>) {
        self.sources.push(source);
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Draw up to `requested` power from the sources in order.
    ///
    /// Returns total delivered power, guaranteed in `[0, requested]`.
    pub fn draw_power(&mut self, world: &mut World, ctx: &ChargeContext, requested: f32) -> f32 {
        let mut remaining = requested.max(0.0);
        let mut delivered = 0.0;

        for source in &mut self.sources {
            if remaining <= 0.0 {
                break;
            }
            let supplied = source.produce(world, ctx, remaining);
            delivered += supplied;
            remaining -= supplied;
        }

        self.snapshots = self
            .sources
            .iter()
            .filter(|s| s.is_currently_producing())
            .map(|s| s.display_snapshot())
            .collect();

        delivered
    }

    /// Display breakdown over the sources that produced last tick.
    pub fn snapshots(&self) -> &[IndicatorSnapshot] {
        &self.snapshots
    }
}

impl Default for ChargeArbiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal reserve battery shared by the Mk2 charger sources.
#[derive(Debug, Default)]
struct ReserveBattery {
    charge: f32,
}

impl ReserveBattery {
    /// Store surplus up to `capacity`. Drops charge above capacity first,
    /// since modules may have been unequipped since last tick.
    fn store(&mut self, surplus: f32, capacity: f32) {
        self.charge = (self.charge.min(capacity) + surplus).min(capacity);
    }

    /// Drain up to `cap`, bounded by the outstanding request.
    fn drain(&mut self, cap: f32, requested: f32) -> f32 {
        self.charge = self.charge.max(0.0);
        let amount = cap.min(requested).min(self.charge).max(0.0);
        self.charge -= amount;
        amount
    }
}

/// Solar chargers. Output scales with sun intensity and falls off with
/// depth; Mk2 units bank surplus in internal batteries for dark ticks.
pub struct SolarSource {
    battery: ReserveBattery,
    producing: bool,
    battery_capacity: f32,
}

impl SolarSource {
    pub fn new() -> Self {
        Self {
            battery: ReserveBattery::default(),
            producing: false,
            battery_capacity: 0.0,
        }
    }
}

impl Default for SolarSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ChargeSource for SolarSource {
    fn icon(&self) -> &'static str {
        "icon_solar"
    }

    fn is_renewable(&self) -> bool {
        true
    }

    fn is_currently_producing(&self) -> bool {
        self.producing
    }

    fn produce(&mut self, _world: &mut World, ctx: &ChargeContext, requested: f32) -> f32 {
        let chargers = ctx.counts.solar_total();
        self.battery_capacity =
            ctx.counts.solar_mk2 as f32 * ctx.tuning.solar_mk2_battery_capacity;

        if chargers == 0 {
            self.producing = false;
            return 0.0;
        }

        let factor = ctx.tuning.solar_factor(ctx.env.sun_intensity, ctx.env.depth);
        let ambient = factor * ctx.tuning.solar_charge_rate * chargers as f32;

        let mut delivered = ambient.min(requested);
        let surplus = ambient - delivered;
        if surplus > 0.0 {
            self.battery.store(surplus, self.battery_capacity);
        } else if delivered < requested {
            let drain_cap = ctx.counts.solar_mk2 as f32 * ctx.tuning.battery_drain_rate;
            delivered += self.battery.drain(drain_cap, requested - delivered);
        }

        self.producing = delivered > 0.0;
        delivered
    }

    fn display_snapshot(&self) -> IndicatorSnapshot {
        IndicatorSnapshot::new(self.icon(), self.battery.charge, self.battery_capacity)
    }
}

/// Thermal reactors. Output scales with ambient water temperature; Mk2
/// units bank surplus exactly as solar Mk2 does.
pub struct ThermalSource {
    battery: ReserveBattery,
    producing: bool,
    battery_capacity: f32,
}

impl ThermalSource {
    pub fn new() -> Self {
        Self {
            battery: ReserveBattery::default(),
            producing: false,
            battery_capacity: 0.0,
        }
    }
}

impl Default for ThermalSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ChargeSource for ThermalSource {
    fn icon(&self) -> &'static str {
        "icon_thermal"
    }

    fn is_renewable(&self) -> bool {
        true
    }

    fn is_currently_producing(&self) -> bool {
        self.producing
    }

    fn produce(&mut self, _world: &mut World, ctx: &ChargeContext, requested: f32) -> f32 {
        let reactors = ctx.counts.thermal_total();
        self.battery_capacity =
            ctx.counts.thermal_mk2 as f32 * ctx.tuning.thermal_mk2_battery_capacity;

        if reactors == 0 {
            self.producing = false;
            return 0.0;
        }

        let factor = ctx.tuning.thermal_factor(ctx.env.water_temp);
        let ambient = factor * ctx.tuning.thermal_charge_rate * reactors as f32;

        let mut delivered = ambient.min(requested);
        let surplus = ambient - delivered;
        if surplus > 0.0 {
            self.battery.store(surplus, self.battery_capacity);
        } else if delivered < requested {
            let drain_cap = ctx.counts.thermal_mk2 as f32 * ctx.tuning.battery_drain_rate;
            delivered += self.battery.drain(drain_cap, requested - delivered);
        }

        self.producing = delivered > 0.0;
        delivered
    }

    fn display_snapshot(&self) -> IndicatorSnapshot {
        IndicatorSnapshot::new(self.icon(), self.battery.charge, self.battery_capacity)
    }
}

/// Bio reactors. Non-renewable aggregate of the vehicle's reactor units:
/// only the first M powered units in priority order contribute each tick,
/// each capped individually, and the display snapshot covers exactly the
/// evaluated units.
pub struct BioSource {
    producing: bool,
    total_charge: f32,
    total_capacity: f32,
}

impl BioSource {
    pub fn new() -> Self {
        Self {
            producing: false,
            total_charge: 0.0,
            total_capacity: 0.0,
        }
    }
}

impl Default for BioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ChargeSource for BioSource {
    fn icon(&self) -> &'static str {
        "icon_bio"
    }

    fn is_renewable(&self) -> bool {
        false
    }

    fn is_currently_producing(&self) -> bool {
        self.producing
    }

    fn produce(&mut self, world: &mut World, ctx: &ChargeContext, requested: f32) -> f32 {
        let unit_limit = ctx.tuning.boosted_bio_cap(ctx.counts.bio_booster) as usize;

        let mut units: Vec<(Entity, u8)> = world
            .query::<&BioReactorUnit>()
            .iter()
            .filter(|(_, r)| r.vehicle == ctx.vehicle && r.has_power())
            .map(|(e, r)| (e, r.priority))
            .collect();
        // Priority first, entity id as a stable tiebreak.
        units.sort_by_key(|(e, priority)| (*priority, e.id()));

        let unit_cap = ctx.tuning.bio_unit_cap();
        let mut drawn = 0.0;
        let mut charge_sum = 0.0;
        let mut capacity_sum = 0.0;
        let mut evaluated = 0;

        for (entity, _) in units.into_iter().take(unit_limit) {
            if let Ok(mut reactor) = world.get::<&mut BioReactorUnit>(entity) {
                drawn += reactor.draw(unit_cap, requested - drawn);
                charge_sum += reactor.charge;
                capacity_sum += reactor.capacity;
                evaluated += 1;
            }
        }

        // An empty reactor bay is an expected steady state, not a fault.
        self.producing = evaluated > 0;
        self.total_charge = charge_sum;
        self.total_capacity = capacity_sum;
        drawn
    }

    fn display_snapshot(&self) -> IndicatorSnapshot {
        IndicatorSnapshot::new(self.icon(), self.total_charge, self.total_capacity)
    }
}
