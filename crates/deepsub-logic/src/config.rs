//! Charge tuning parameters.
//!
//! The charge-arbitration rate limits and reactor caps are tuning values,
//! not protocol constants, so they are carried as configuration with the
//! defaults the simulation was balanced around. Deployments override them
//! by deserializing a `ChargeTuning` from JSON.

use serde::{Deserialize, Serialize};

/// Tuning parameters for charge production and arbitration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeTuning {
    /// Max charge drawn from one battery-backed sub-producer per tick.
    pub battery_drain_rate: f32,
    /// Fraction of the drain rate bio reactors are allowed to use.
    pub bio_rate_limiter: f32,
    /// How many bio reactor units may contribute in one tick, unboosted.
    pub max_bio_reactors: u32,
    /// Absolute cap on evaluated bio reactors regardless of boosters.
    pub bio_reactor_hard_cap: u32,
    /// Charge produced per solar charger per tick at full sun, zero depth.
    pub solar_charge_rate: f32,
    /// Depth (m) at which solar output reaches zero.
    pub max_solar_depth: f32,
    /// Internal battery capacity of one Solar Charger Mk2.
    pub solar_mk2_battery_capacity: f32,
    /// Charge produced per thermal reactor per tick at peak temperature.
    pub thermal_charge_rate: f32,
    /// Water temperature (°C) below which thermal output is zero.
    pub min_thermal_temp: f32,
    /// Water temperature at which thermal output peaks.
    pub max_thermal_temp: f32,
    /// Internal battery capacity of one Thermal Reactor Mk2.
    pub thermal_mk2_battery_capacity: f32,
}

impl Default for ChargeTuning {
    fn default() -> Self {
        Self {
            battery_drain_rate: 5.0,
            bio_rate_limiter: 0.90,
            max_bio_reactors: 2,
            bio_reactor_hard_cap: 5,
            solar_charge_rate: 1.5,
            max_solar_depth: 200.0,
            solar_mk2_battery_capacity: 100.0,
            thermal_charge_rate: 1.5,
            min_thermal_temp: 25.0,
            max_thermal_temp: 75.0,
            thermal_mk2_battery_capacity: 100.0,
        }
    }
}

impl ChargeTuning {
    /// Per-unit bio reactor draw cap for one tick.
    pub fn bio_unit_cap(&self) -> f32 {
        self.battery_drain_rate * self.bio_rate_limiter
    }

    /// Evaluated-reactor cap for a given number of equipped boosters.
    pub fn boosted_bio_cap(&self, boosters: u32) -> u32 {
        (self.max_bio_reactors + boosters).min(self.bio_reactor_hard_cap)
    }

    /// Solar output factor for a sun intensity (0..1) and depth in meters.
    pub fn solar_factor(&self, sun_intensity: f32, depth: f32) -> f32 {
        if self.max_solar_depth <= 0.0 {
            return 0.0;
        }
        let depth_falloff = (1.0 - depth / self.max_solar_depth).clamp(0.0, 1.0);
        sun_intensity.clamp(0.0, 1.0) * depth_falloff
    }

    /// Thermal output factor for a water temperature in °C.
    pub fn thermal_factor(&self, water_temp: f32) -> f32 {
        let span = self.max_thermal_temp - self.min_thermal_temp;
        if span <= 0.0 {
            return 0.0;
        }
        ((water_temp - self.min_thermal_temp) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bio_unit_cap() {
        // 0.9 * 5.0 per unit per tick.
        let tuning = ChargeTuning::default();
        assert!((tuning.bio_unit_cap() - 4.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_boosted_cap_clamps_to_hard_cap() {
        let tuning = ChargeTuning::default();
        assert_eq!(tuning.boosted_bio_cap(0), 2);
        assert_eq!(tuning.boosted_bio_cap(2), 4);
        assert_eq!(tuning.boosted_bio_cap(10), 5);
    }

    #[test]
    fn test_solar_factor_surface_full_sun() {
        let tuning = ChargeTuning::default();
        assert!((tuning.solar_factor(1.0, 0.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_solar_factor_below_max_depth_is_zero() {
        let tuning = ChargeTuning::default();
        assert_eq!(tuning.solar_factor(1.0, 250.0), 0.0);
    }

    #[test]
    fn test_thermal_factor_range() {
        let tuning = ChargeTuning::default();
        assert_eq!(tuning.thermal_factor(10.0), 0.0);
        assert_eq!(tuning.thermal_factor(75.0), 1.0);
        assert_eq!(tuning.thermal_factor(500.0), 1.0);
        let mid = tuning.thermal_factor(50.0);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_partial_json_overrides() {
        // serde(default) lets deployments override a subset of fields.
        let tuning: ChargeTuning =
            serde_json::from_str(r#"{"max_bio_reactors": 3}"#).unwrap();
        assert_eq!(tuning.max_bio_reactors, 3);
        assert!((tuning.bio_rate_limiter - 0.90).abs() < f32::EPSILON);
    }
}
