//! Per-instance manager registry.
//!
//! Each live vehicle entity gets exactly one [`ManagerBundle`], created
//! lazily on first lookup and torn down when the vehicle is invalidated or
//! fails the liveness check. A failed construction is fully unwound: the
//! registry never retains a partially built bundle, so a later tick can
//! retry from scratch.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use deepsub_logic::power_index::PowerCostTable;
use hecs::{Entity, World};

use crate::components::{Environment, Vehicle};
use crate::error::SimError;
use crate::systems::{BioSource, ChargeArbiter, SolarSource, ThermalSource, UpgradeScanner};

/// The managers scoped to one vehicle instance. Owned exclusively by the
/// registry; external callers always go through [`InstanceRegistry::resolve`].
#[derive(Debug)]
pub struct ManagerBundle {
    pub vehicle: Entity,
    pub upgrades: UpgradeScanner,
    pub charge: ChargeArbiter,
}

impl ManagerBundle {
    /// Build the full manager set for `vehicle`.
    ///
    /// Fails when the vehicle lacks the components the managers depend on;
    /// the caller discards the result and may retry later.
    pub fn new(world: &World, vehicle: Entity) -> Result<Self, SimError> {
        if world.get::<&Vehicle>(vehicle).is_err() {
            return Err(SimError::BundleInit {
                vehicle,
                reason: "missing Vehicle component",
            });
        }
        if world.get::<&Environment>(vehicle).is_err() {
            return Err(SimError::BundleInit {
                vehicle,
                reason: "missing Environment component",
            });
        }

        // Registration order is the arbitration order.
        let mut charge = ChargeArbiter::new();
        charge.register(Box::new(SolarSource::new()));
        charge.register(Box::new(ThermalSource::new()));
        charge.register(Box::new(BioSource::new()));

        Ok(Self {
            vehicle,
            upgrades: UpgradeScanner::new(PowerCostTable::standard()),
            charge,
        })
    }
}

/// Maps vehicle entities to their manager bundles.
#[derive(Default)]
pub struct InstanceRegistry {
    bundles: HashMap<Entity, ManagerBundle>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the bundle for `vehicle`, creating it on first sight.
    ///
    /// A vehicle that fails the liveness check has any cached bundle
    /// evicted and yields `DeadInstance`. A construction failure is logged,
    /// nothing is retained, and the same error is returned to the caller.
    pub fn resolve(
        &mut self,
        world: &World,
        vehicle: Entity,
    ) -> Result<&mut ManagerBundle, SimError> {
        if world.get::<&Vehicle>(vehicle).is_err() {
            if self.bundles.remove(&vehicle).is_some() {
                log::debug!("evicted stale manager bundle for {:?}", vehicle);
            }
            return Err(SimError::DeadInstance { vehicle });
        }

        match self.bundles.entry(vehicle) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(slot) => {
                let bundle = ManagerBundle::new(world, vehicle).map_err(|e| {
                    log::error!("{}", e);
                    e
                })?;
                Ok(slot.insert(bundle))
            }
        }
    }

    /// Discard the bundle (and everything it owns) unconditionally. The
    /// next `resolve` for this vehicle starts fresh.
    pub fn invalidate(&mut self, vehicle: Entity) {
        if self.bundles.remove(&vehicle).is_some() {
            log::debug!("invalidated manager bundle for {:?}", vehicle);
        }
    }

    /// Visit every live bundle.
    pub fn for_each(&mut self, mut f: impl FnMut(&mut ManagerBundle)) {
        for bundle in self.bundles.values_mut() {
            f(bundle);
        }
    }

    /// Read-only access for display queries.
    pub fn get(&self, vehicle: Entity) -> Option<&ManagerBundle> {
        self.bundles.get(&vehicle)
    }

    /// Drop bundles whose vehicles no longer pass the liveness check.
    pub fn evict_dead(&mut self, world: &World) {
        self.bundles.retain(|vehicle, _| {
            let live = world.get::<&Vehicle>(*vehicle).is_ok();
            if !live {
                log::debug!("evicted stale manager bundle for {:?}", vehicle);
            }
            live
        });
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::UpgradeSlot;
    use crate::notifications::NotificationQueue;
    use deepsub_logic::modules::ModuleKind;

    fn spawn_vehicle(world: &mut World) -> Entity {
        world.spawn((Vehicle::new("test", 1200.0), Environment::default()))
    }

    #[test]
    fn test_resolve_is_identity_stable() {
        let mut world = World::new();
        let vehicle = spawn_vehicle(&mut world);
        world.spawn((UpgradeSlot {
            vehicle,
            slot_id: 0,
            module: Some(ModuleKind::PowerEfficiencyMk2),
        },));

        let mut registry = InstanceRegistry::new();
        let mut notifications = NotificationQueue::new();

        {
            let bundle = registry.resolve(&world, vehicle).unwrap();
            bundle
                .upgrades
                .scan(&world, vehicle, &mut notifications)
                .unwrap();
            assert_eq!(bundle.upgrades.power_index(), 2);
        }

        // Second lookup returns the same bundle with its scan state intact.
        let bundle = registry.resolve(&world, vehicle).unwrap();
        assert_eq!(bundle.upgrades.power_index(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalidate_then_resolve_starts_fresh() {
        let mut world = World::new();
        let vehicle = spawn_vehicle(&mut world);
        world.spawn((UpgradeSlot {
            vehicle,
            slot_id: 0,
            module: Some(ModuleKind::PowerEfficiencyMk3),
        },));

        let mut registry = InstanceRegistry::new();
        let mut notifications = NotificationQueue::new();
        registry
            .resolve(&world, vehicle)
            .unwrap()
            .upgrades
            .scan(&world, vehicle, &mut notifications)
            .unwrap();

        registry.invalidate(vehicle);
        assert!(registry.is_empty());

        // New bundle has no scan history.
        let bundle = registry.resolve(&world, vehicle).unwrap();
        assert_eq!(bundle.upgrades.power_index(), 0);
    }

    #[test]
    fn test_failed_construction_retains_nothing() {
        let mut world = World::new();
        // Vehicle component but no Environment: a sub-manager dependency is
        // missing, so construction must fail and unwind.
        let vehicle = world.spawn((Vehicle::new("bare", 1200.0),));

        let mut registry = InstanceRegistry::new();
        let err = registry.resolve(&world, vehicle).unwrap_err();
        assert!(matches!(err, SimError::BundleInit { .. }));
        assert!(registry.is_empty());

        // Retry succeeds once the dependency appears.
        world.insert_one(vehicle, Environment::default()).unwrap();
        assert!(registry.resolve(&world, vehicle).is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_dead_instance_is_evicted_on_resolve() {
        let mut world = World::new();
        let vehicle = spawn_vehicle(&mut world);

        let mut registry = InstanceRegistry::new();
        registry.resolve(&world, vehicle).unwrap();
        assert_eq!(registry.len(), 1);

        world.despawn(vehicle).unwrap();
        let err = registry.resolve(&world, vehicle).unwrap_err();
        assert!(matches!(err, SimError::DeadInstance { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_evict_dead_sweeps_stale_bundles() {
        let mut world = World::new();
        let keep = spawn_vehicle(&mut world);
        let gone = spawn_vehicle(&mut world);

        let mut registry = InstanceRegistry::new();
        registry.resolve(&world, keep).unwrap();
        registry.resolve(&world, gone).unwrap();

        world.despawn(gone).unwrap();
        registry.evict_dead(&world);

        assert_eq!(registry.len(), 1);
        assert!(registry.get(keep).is_some());
        assert!(registry.get(gone).is_none());
    }

    #[test]
    fn test_for_each_visits_all_bundles() {
        let mut world = World::new();
        let a = spawn_vehicle(&mut world);
        let b = spawn_vehicle(&mut world);

        let mut registry = InstanceRegistry::new();
        registry.resolve(&world, a).unwrap();
        registry.resolve(&world, b).unwrap();

        let mut seen = Vec::new();
        registry.for_each(|bundle| seen.push(bundle.vehicle));
        seen.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(seen, expected);
    }
}
