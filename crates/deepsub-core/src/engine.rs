//! Simulation engine - main entry point for running the simulation
//!
//! The host invokes [`SimulationEngine::tick`] exactly once per simulation
//! step. Each tick resolves (or lazily creates) the manager bundle for every
//! live vehicle, re-scans its equipped upgrade modules, and arbitrates its
//! power deficit across the registered charge sources. Everything runs
//! synchronously within the tick; nothing spans ticks except the manager
//! bundles themselves.

use deepsub_logic::config::ChargeTuning;
use deepsub_logic::indicator::IndicatorSnapshot;
use deepsub_logic::modules::ModuleKind;
use hecs::{Entity, World};

use crate::components::{BioReactorUnit, Environment, UpgradeSlot, Vehicle};
use crate::error::SimError;
use crate::notifications::{Notification, NotificationQueue};
use crate::registry::InstanceRegistry;
use crate::systems::ChargeContext;

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world containing vehicles, slots, and reactor units
    pub world: World,
    registry: InstanceRegistry,
    tuning: ChargeTuning,
    notifications: NotificationQueue,
    tick_count: u64,
}

impl SimulationEngine {
    pub fn new(tuning: ChargeTuning) -> Self {
        Self {
            world: World::new(),
            registry: InstanceRegistry::new(),
            tuning,
            notifications: NotificationQueue::new(),
            tick_count: 0,
        }
    }

    /// Spawn a vehicle with `slot_count` empty upgrade slots.
    pub fn spawn_vehicle(
        &mut self,
        name: impl Into<String>,
        power_capacity: f32,
        slot_count: u32,
    ) -> Entity {
        let vehicle = self
            .world
            .spawn((Vehicle::new(name, power_capacity), Environment::default()));
        for slot_id in 0..slot_count {
            self.world.spawn((UpgradeSlot {
                vehicle,
                slot_id,
                module: None,
            },));
        }
        vehicle
    }

    /// Install a bio reactor unit aboard `vehicle`.
    pub fn add_bio_reactor(
        &mut self,
        vehicle: Entity,
        capacity: f32,
        charge: f32,
        priority: u8,
    ) -> Entity {
        self.world.spawn((BioReactorUnit {
            vehicle,
            charge: charge.min(capacity),
            capacity,
            priority,
        },))
    }

    /// Swap the module in one slot. Returns false when the slot does not
    /// exist on that vehicle.
    pub fn set_module(
        &mut self,
        vehicle: Entity,
        slot_id: u32,
        module: Option<ModuleKind>,
    ) -> bool {
        let slot_entity = self
            .world
            .query::<&UpgradeSlot>()
            .iter()
            .find(|(_, s)| s.vehicle == vehicle && s.slot_id == slot_id)
            .map(|(e, _)| e);
        match slot_entity {
            Some(entity) => {
                if let Ok(mut slot) = self.world.get::<&mut UpgradeSlot>(entity) {
                    slot.module = module;
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }

    /// Update the ambient conditions around a vehicle.
    pub fn set_environment(&mut self, vehicle: Entity, env: Environment) -> bool {
        match self.world.get::<&mut Environment>(vehicle) {
            Ok(mut slot) => {
                *slot = env;
                true
            }
            Err(_) => false,
        }
    }

    /// Drain power from the vehicle's cells (host-side consumption).
    /// Returns the amount actually drained.
    pub fn consume_power(&mut self, vehicle: Entity, amount: f32) -> f32 {
        match self.world.get::<&mut Vehicle>(vehicle) {
            Ok(mut veh) => {
                let drained = amount.max(0.0).min(veh.power_charge);
                veh.power_charge -= drained;
                drained
            }
            Err(_) => 0.0,
        }
    }

    /// Resolve (or lazily create) the manager bundle for one vehicle.
    ///
    /// A construction failure leaves no partial state behind; the same
    /// vehicle may be retried on a later tick.
    pub fn ensure_managers(&mut self, vehicle: Entity) -> Result<(), SimError> {
        self.registry.resolve(&self.world, vehicle).map(|_| ())
    }

    /// Tear down a vehicle's managers. The entity itself is untouched.
    pub fn invalidate(&mut self, vehicle: Entity) {
        self.registry.invalidate(vehicle);
    }

    /// Run one simulation tick over every live vehicle.
    ///
    /// Vehicles whose bundle cannot be constructed are skipped this tick
    /// (the failure is logged and retried next tick). Protocol violations
    /// and cost-table mismatches propagate: they are bugs, not states.
    pub fn tick(&mut self) -> Result<(), SimError> {
        self.tick_count += 1;
        self.registry.evict_dead(&self.world);

        let vehicles: Vec<Entity> = self
            .world
            .query::<&Vehicle>()
            .iter()
            .map(|(entity, _)| entity)
            .collect();

        for vehicle in vehicles {
            match self.run_vehicle(vehicle) {
                Ok(()) => {}
                Err(SimError::BundleInit { .. }) => continue,
                Err(e) => {
                    log::error!("{}", e);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Re-scan every live bundle outside the normal tick (e.g. after the
    /// host rebuilds equipment en masse).
    ///
    /// Vehicles without a bundle get one first, so the sweep covers the
    /// whole fleet; unconstructible vehicles are skipped as in `tick`.
    pub fn sync_all(&mut self) -> Result<(), SimError> {
        self.registry.evict_dead(&self.world);
        let vehicles: Vec<Entity> = self
            .world
            .query::<&Vehicle>()
            .iter()
            .map(|(entity, _)| entity)
            .collect();
        for vehicle in vehicles {
            match self.registry.resolve(&self.world, vehicle) {
                Ok(_) => {}
                Err(SimError::BundleInit { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        let world = &self.world;
        let notifications = &mut self.notifications;
        let mut result = Ok(());
        self.registry.for_each(|bundle| {
            if result.is_ok() {
                result = bundle.upgrades.scan(world, bundle.vehicle, notifications);
            }
        });
        result
    }

    fn run_vehicle(&mut self, vehicle: Entity) -> Result<(), SimError> {
        let bundle = self.registry.resolve(&self.world, vehicle)?;

        // Upgrade resolution first: charge sources read the fresh counts.
        bundle
            .upgrades
            .scan(&self.world, vehicle, &mut self.notifications)?;

        let env = *self
            .world
            .get::<&Environment>(vehicle)
            .map_err(|_| SimError::DeadInstance { vehicle })?;
        let deficit = self
            .world
            .get::<&Vehicle>(vehicle)
            .map_err(|_| SimError::DeadInstance { vehicle })?
            .power_deficit();

        let ctx = ChargeContext {
            vehicle,
            env,
            counts: bundle.upgrades.counts(),
            tuning: &self.tuning,
        };
        let delivered = bundle.charge.draw_power(&mut self.world, &ctx, deficit);

        if delivered > 0.0 {
            if let Ok(mut veh) = self.world.get::<&mut Vehicle>(vehicle) {
                veh.power_charge = (veh.power_charge + delivered).min(veh.power_capacity);
            }
        }
        Ok(())
    }

    /// Display breakdown for one vehicle's charge sources, if its managers
    /// exist and produced anything last tick.
    pub fn hud_snapshots(&self, vehicle: Entity) -> Option<&[IndicatorSnapshot]> {
        self.registry
            .get(vehicle)
            .map(|b| b.charge.snapshots())
            .filter(|s| !s.is_empty())
    }

    /// Drain queued user-visible notifications.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    pub fn bundle_count(&self) -> usize {
        self.registry.len()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn tuning(&self) -> &ChargeTuning {
        &self.tuning
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new(ChargeTuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_creation() {
        let engine = SimulationEngine::default();
        assert_eq!(engine.bundle_count(), 0);
        assert_eq!(engine.tick_count(), 0);
    }

    #[test]
    fn test_tick_creates_one_bundle_per_vehicle() {
        let mut engine = SimulationEngine::default();
        engine.spawn_vehicle("alpha", 1200.0, 6);
        engine.spawn_vehicle("beta", 1200.0, 6);

        engine.tick().unwrap();
        assert_eq!(engine.bundle_count(), 2);

        // Ticking again reuses the same bundles.
        engine.tick().unwrap();
        assert_eq!(engine.bundle_count(), 2);
    }

    #[test]
    fn test_power_index_scenario() {
        // No modules: index 0, rating 1. Mk1 + Mk2 equipped: index 2,
        // rating 5, and exactly one rating notification.
        let mut engine = SimulationEngine::default();
        let vehicle = engine.spawn_vehicle("cyclone", 1200.0, 6);

        engine.tick().unwrap();
        assert_eq!(
            engine.world.get::<&Vehicle>(vehicle).unwrap().power_rating,
            1.0
        );
        assert!(engine.drain_notifications().is_empty());

        assert!(engine.set_module(vehicle, 0, Some(ModuleKind::PowerEfficiencyMk1)));
        assert!(engine.set_module(vehicle, 1, Some(ModuleKind::PowerEfficiencyMk2)));
        engine.tick().unwrap();

        assert_eq!(
            engine.world.get::<&Vehicle>(vehicle).unwrap().power_rating,
            5.0
        );
        let notifications = engine.drain_notifications();
        assert_eq!(
            notifications,
            vec![Notification::PowerRatingChanged {
                vehicle,
                previous: 1.0,
                rating: 5.0,
            }]
        );

        // Steady state: no repeat notification.
        engine.tick().unwrap();
        assert!(engine.drain_notifications().is_empty());
    }

    #[test]
    fn test_tick_recharges_from_bio() {
        let mut engine = SimulationEngine::default();
        let vehicle = engine.spawn_vehicle("bio", 1200.0, 6);
        engine.add_bio_reactor(vehicle, 200.0, 200.0, 0);

        engine.consume_power(vehicle, 100.0);
        engine.tick().unwrap();

        let veh = engine.world.get::<&Vehicle>(vehicle).unwrap();
        // One reactor, one tick: 0.9 * 5.0 recovered.
        assert!((veh.power_deficit() - 95.5).abs() < 1e-3);
    }

    #[test]
    fn test_no_deficit_no_draw() {
        let mut engine = SimulationEngine::default();
        let vehicle = engine.spawn_vehicle("full", 1200.0, 6);
        let reactor = engine.add_bio_reactor(vehicle, 200.0, 200.0, 0);

        engine.tick().unwrap();

        let unit = engine.world.get::<&BioReactorUnit>(reactor).unwrap();
        assert_eq!(unit.charge, 200.0);
    }

    #[test]
    fn test_solar_recharge_depends_on_environment() {
        let mut engine = SimulationEngine::default();
        let vehicle = engine.spawn_vehicle("solar", 1200.0, 6);
        engine.set_module(vehicle, 0, Some(ModuleKind::SolarCharger));
        engine.consume_power(vehicle, 100.0);

        engine.set_environment(
            vehicle,
            Environment {
                depth: 0.0,
                sun_intensity: 1.0,
                water_temp: 15.0,
            },
        );
        engine.tick().unwrap();
        let after_sunny = engine.world.get::<&Vehicle>(vehicle).unwrap().power_deficit();
        assert!((after_sunny - 98.5).abs() < 1e-3);

        engine.set_environment(
            vehicle,
            Environment {
                depth: 0.0,
                sun_intensity: 0.0,
                water_temp: 15.0,
            },
        );
        engine.tick().unwrap();
        let after_dark = engine.world.get::<&Vehicle>(vehicle).unwrap().power_deficit();
        assert!((after_dark - after_sunny).abs() < 1e-3);
    }

    #[test]
    fn test_despawned_vehicle_bundle_is_cleaned_up() {
        let mut engine = SimulationEngine::default();
        let vehicle = engine.spawn_vehicle("doomed", 1200.0, 6);
        engine.tick().unwrap();
        assert_eq!(engine.bundle_count(), 1);

        engine.world.despawn(vehicle).unwrap();
        engine.tick().unwrap();
        assert_eq!(engine.bundle_count(), 0);
    }

    #[test]
    fn test_invalidate_then_tick_rebuilds() {
        let mut engine = SimulationEngine::default();
        let vehicle = engine.spawn_vehicle("rebuilt", 1200.0, 6);
        engine.tick().unwrap();

        engine.invalidate(vehicle);
        assert_eq!(engine.bundle_count(), 0);

        engine.tick().unwrap();
        assert_eq!(engine.bundle_count(), 1);
    }

    #[test]
    fn test_bundle_init_failure_skips_vehicle_and_retries() {
        let mut engine = SimulationEngine::default();
        // Hand-rolled vehicle without an Environment component.
        let vehicle = engine.world.spawn((Vehicle::new("bare", 1200.0),));

        engine.tick().unwrap();
        assert_eq!(engine.bundle_count(), 0);

        engine
            .world
            .insert_one(vehicle, Environment::default())
            .unwrap();
        engine.tick().unwrap();
        assert_eq!(engine.bundle_count(), 1);
    }

    #[test]
    fn test_hud_snapshots_exposed_for_producing_sources() {
        let mut engine = SimulationEngine::default();
        let vehicle = engine.spawn_vehicle("hud", 1200.0, 6);
        engine.add_bio_reactor(vehicle, 200.0, 200.0, 0);
        engine.consume_power(vehicle, 50.0);

        engine.tick().unwrap();

        let snapshots = engine.hud_snapshots(vehicle).unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].icon, "icon_bio");
        assert!(!snapshots[0].text.is_empty());
    }

    #[test]
    fn test_hud_snapshots_none_when_nothing_produced() {
        let mut engine = SimulationEngine::default();
        // Full charge and no modules: managers exist but no source produces.
        let vehicle = engine.spawn_vehicle("idle", 1200.0, 6);
        engine.tick().unwrap();

        assert_eq!(engine.bundle_count(), 1);
        assert!(engine.hud_snapshots(vehicle).is_none());
    }

    #[test]
    fn test_sync_all_rescans_without_charging() {
        let mut engine = SimulationEngine::default();
        let vehicle = engine.spawn_vehicle("sync", 1200.0, 6);
        engine.tick().unwrap();
        engine.drain_notifications();

        engine.set_module(vehicle, 0, Some(ModuleKind::PowerEfficiencyMk3));
        engine.sync_all().unwrap();

        assert_eq!(
            engine.world.get::<&Vehicle>(vehicle).unwrap().power_rating,
            6.0
        );
        assert_eq!(engine.drain_notifications().len(), 1);
    }

    #[test]
    fn test_sync_all_covers_every_bundle() {
        let mut engine = SimulationEngine::default();
        let ticked = engine.spawn_vehicle("ticked", 1200.0, 6);
        engine.tick().unwrap();
        engine.drain_notifications();

        // Spawned after the tick: no bundle yet when sync_all runs.
        let fresh = engine.spawn_vehicle("fresh", 1200.0, 6);
        engine.set_module(ticked, 0, Some(ModuleKind::PowerEfficiencyMk1));
        engine.set_module(fresh, 0, Some(ModuleKind::PowerEfficiencyMk2));

        engine.sync_all().unwrap();

        assert_eq!(engine.bundle_count(), 2);
        assert_eq!(
            engine.world.get::<&Vehicle>(ticked).unwrap().power_rating,
            3.0
        );
        assert_eq!(
            engine.world.get::<&Vehicle>(fresh).unwrap().power_rating,
            5.0
        );
    }
}
