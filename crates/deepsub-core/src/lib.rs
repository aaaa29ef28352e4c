//! DeepSub simulation engine.
//!
//! Augments simulated vehicles with pluggable upgrade modules and power
//! producers. The host owns the tick loop and calls
//! [`SimulationEngine::tick`] once per simulation step; everything in here
//! runs synchronously inside that call.

pub mod components;
pub mod engine;
pub mod error;
pub mod notifications;
pub mod registry;
pub mod systems;

pub use components::{BioReactorUnit, Environment, UpgradeSlot, Vehicle};
pub use engine::SimulationEngine;
pub use error::SimError;
pub use notifications::{Notification, NotificationQueue};
pub use registry::{InstanceRegistry, ManagerBundle};
