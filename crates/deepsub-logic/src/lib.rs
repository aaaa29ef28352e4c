//! Pure simulation logic for DeepSub.
//!
//! This crate contains all upgrade and power logic that is independent of
//! any world representation or runtime. Functions take plain data and return
//! results, making them unit-testable and portable between the core engine
//! and headless tooling.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Charge tuning parameters (drain rates, reactor caps) |
//! | [`indicator`] | HUD indicator formatting and urgency colors |
//! | [`modules`] | Upgrade module catalog and tier families |
//! | [`power_index`] | Power index cost tables (engine, silent running, sonar, shield) |
//! | [`tiers`] | Tiered upgrade group resolution (best-rank-wins) |

pub mod config;
pub mod indicator;
pub mod modules;
pub mod power_index;
pub mod tiers;
