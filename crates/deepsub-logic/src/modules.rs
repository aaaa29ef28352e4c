//! Upgrade module catalog: every module kind a vehicle slot can hold.
//!
//! Tiered families (power efficiency, depth hull) are non-stacking: only the
//! best equipped rank takes effect. Charger modules stack and are counted
//! per kind by the upgrade scanner.

use serde::{Deserialize, Serialize};

/// A named family of mutually-exclusive-by-rank modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TierFamily {
    /// Engine power efficiency (resolves to a power index 0..3).
    PowerEfficiency,
    /// Hull reinforcement (resolves to bonus crush depth in meters).
    Depth,
}

/// Every upgrade module kind a slot can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleKind {
    PowerEfficiencyMk1,
    PowerEfficiencyMk2,
    PowerEfficiencyMk3,
    DepthHullMk1,
    DepthHullMk2,
    DepthHullMk3,
    SolarCharger,
    SolarChargerMk2,
    ThermalReactor,
    ThermalReactorMk2,
    BioReactorBooster,
    /// Plain storage module. No tier family, no charging behavior.
    CargoRack,
}

impl ModuleKind {
    /// Tier family and tier value for tiered modules, `None` for the rest.
    ///
    /// Power efficiency tiers carry the power index they grant (1..3).
    /// Depth tiers carry bonus crush depth in meters.
    pub fn tier_rank(&self) -> Option<(TierFamily, u16)> {
        match self {
            Self::PowerEfficiencyMk1 => Some((TierFamily::PowerEfficiency, 1)),
            Self::PowerEfficiencyMk2 => Some((TierFamily::PowerEfficiency, 2)),
            Self::PowerEfficiencyMk3 => Some((TierFamily::PowerEfficiency, 3)),
            Self::DepthHullMk1 => Some((TierFamily::Depth, 400)),
            Self::DepthHullMk2 => Some((TierFamily::Depth, 800)),
            Self::DepthHullMk3 => Some((TierFamily::Depth, 1200)),
            _ => None,
        }
    }

    /// Human-readable module name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PowerEfficiencyMk1 => "Engine Efficiency Module",
            Self::PowerEfficiencyMk2 => "Engine Efficiency Module Mk2",
            Self::PowerEfficiencyMk3 => "Engine Efficiency Module Mk3",
            Self::DepthHullMk1 => "Hull Reinforcement Mk1",
            Self::DepthHullMk2 => "Hull Reinforcement Mk2",
            Self::DepthHullMk3 => "Hull Reinforcement Mk3",
            Self::SolarCharger => "Solar Charger",
            Self::SolarChargerMk2 => "Solar Charger Mk2",
            Self::ThermalReactor => "Thermal Reactor",
            Self::ThermalReactorMk2 => "Thermal Reactor Mk2",
            Self::BioReactorBooster => "Bio Reactor Booster",
            Self::CargoRack => "Cargo Rack",
        }
    }

    pub fn all() -> &'static [ModuleKind] {
        &[
            Self::PowerEfficiencyMk1,
            Self::PowerEfficiencyMk2,
            Self::PowerEfficiencyMk3,
            Self::DepthHullMk1,
            Self::DepthHullMk2,
            Self::DepthHullMk3,
            Self::SolarCharger,
            Self::SolarChargerMk2,
            Self::ThermalReactor,
            Self::ThermalReactorMk2,
            Self::BioReactorBooster,
            Self::CargoRack,
        ]
    }
}
