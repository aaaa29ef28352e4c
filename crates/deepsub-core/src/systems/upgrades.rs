//! Upgrade scanning - walks equipped slots and applies resolved tiers.
//!
//! Once per tick the scanner re-reads every upgrade slot on a vehicle,
//! feeds tiered modules into their groups, counts charger modules, and
//! applies the resolved power index and hull tier to the vehicle. Derived
//! values only notify when they change.

use deepsub_logic::modules::{ModuleKind, TierFamily};
use deepsub_logic::power_index::PowerCostTable;
use deepsub_logic::tiers::TieredGroup;
use hecs::{Entity, World};

use crate::components::{UpgradeSlot, Vehicle};
use crate::error::SimError;
use crate::notifications::{Notification, NotificationQueue};

/// Per-kind counts of equipped charger modules, rebuilt every scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleCounts {
    pub solar: u32,
    pub solar_mk2: u32,
    pub thermal: u32,
    pub thermal_mk2: u32,
    pub bio_booster: u32,
}

impl ModuleCounts {
    fn record(&mut self, kind: ModuleKind) {
        match kind {
            ModuleKind::SolarCharger => self.solar += 1,
            ModuleKind::SolarChargerMk2 => self.solar_mk2 += 1,
            ModuleKind::ThermalReactor => self.thermal += 1,
            ModuleKind::ThermalReactorMk2 => self.thermal_mk2 += 1,
            ModuleKind::BioReactorBooster => self.bio_booster += 1,
            // Tiered and inert modules are handled by their groups.
            _ => {}
        }
    }

    /// Solar chargers of any mark.
    pub fn solar_total(&self) -> u32 {
        self.solar + self.solar_mk2
    }

    /// Thermal reactors of any mark.
    pub fn thermal_total(&self) -> u32 {
        self.thermal + self.thermal_mk2
    }
}

/// Enumerates a vehicle's equipped modules each tick and resolves its
/// tiered families.
#[derive(Debug)]
pub struct UpgradeScanner {
    power_group: TieredGroup<u16>,
    depth_group: TieredGroup<u16>,
    cost_table: PowerCostTable,
    counts: ModuleCounts,
}

impl UpgradeScanner {
    pub fn new(cost_table: PowerCostTable) -> Self {
        Self {
            power_group: TieredGroup::new(0),
            depth_group: TieredGroup::new(0),
            cost_table,
            counts: ModuleCounts::default(),
        }
    }

    /// Charger module counts from the most recent scan.
    pub fn counts(&self) -> &ModuleCounts {
        &self.counts
    }

    /// Resolved power index from the most recent scan.
    pub fn power_index(&self) -> usize {
        self.power_group.resolve() as usize
    }

    /// Resolved bonus crush depth from the most recent scan.
    pub fn bonus_depth(&self) -> u16 {
        self.depth_group.resolve()
    }

    /// Walk the vehicle's slots and apply the resolved tiers.
    pub fn scan(
        &mut self,
        world: &World,
        vehicle: Entity,
        notifications: &mut NotificationQueue,
    ) -> Result<(), SimError> {
        self.power_group.begin_scan();
        self.depth_group.begin_scan();
        let mut counts = ModuleCounts::default();

        for (_, slot) in world.query::<&UpgradeSlot>().iter() {
            if slot.vehicle != vehicle {
                continue;
            }
            let Some(kind) = slot.module else { continue };
            counts.record(kind);
            if let Some((family, value)) = kind.tier_rank() {
                match family {
                    TierFamily::PowerEfficiency => self.power_group.count(value, slot.slot_id)?,
                    TierFamily::Depth => self.depth_group.count(value, slot.slot_id)?,
                }
            }
        }
        self.counts = counts;

        let power = self.power_group.finish_scan()?;
        let depth = self.depth_group.finish_scan()?;

        let costs = self.cost_table.costs_for(power.value as usize)?;

        let mut veh = world
            .get::<&mut Vehicle>(vehicle)
            .map_err(|_| SimError::DeadInstance { vehicle })?;

        veh.silent_running_cost = costs.silent_running;
        veh.sonar_cost = costs.sonar;
        veh.shield_cost = costs.shield;

        // The component carries the previously applied rating; only a real
        // change is worth announcing.
        if veh.power_rating != costs.engine_rating {
            let previous = veh.power_rating;
            veh.power_rating = costs.engine_rating;
            notifications.push(Notification::PowerRatingChanged {
                vehicle,
                previous,
                rating: costs.engine_rating,
            });
        }

        // `cleared` resets the bonus to the floor; any other change comes
        // from a different winning tier. Both notify once.
        let new_bonus = if depth.cleared { 0 } else { depth.value };
        if veh.bonus_crush_depth != new_bonus {
            veh.bonus_crush_depth = new_bonus;
            notifications.push(Notification::CrushDepthChanged {
                vehicle,
                crush_depth: veh.crush_depth(),
            });
        }

        Ok(())
    }
}
