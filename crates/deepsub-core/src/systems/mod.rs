//! Systems - logic that operates on components

mod charging;
mod upgrades;

pub use charging::*;
pub use upgrades::*;
