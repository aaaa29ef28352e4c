//! Engine error taxonomy.
//!
//! Protocol violations (scan order, bad power index) are programmer or
//! configuration errors and surface loudly. Bundle construction failures
//! are recovered by the registry: nothing partial is retained and the
//! vehicle may be retried on a later tick.

use deepsub_logic::power_index::PowerIndexError;
use deepsub_logic::tiers::ScanOrderError;
use hecs::Entity;

#[derive(Debug)]
pub enum SimError {
    /// A tier group was counted or finished outside a scan.
    ScanOrder,
    /// Resolved power index has no entry in the cost tables.
    PowerIndex(PowerIndexError),
    /// Manager bundle construction failed; the partial bundle was discarded.
    BundleInit { vehicle: Entity, reason: &'static str },
    /// The vehicle entity failed the liveness check.
    DeadInstance { vehicle: Entity },
}

impl From<ScanOrderError> for SimError {
    fn from(_: ScanOrderError) -> Self {
        SimError::ScanOrder
    }
}

impl From<PowerIndexError> for SimError {
    fn from(e: PowerIndexError) -> Self {
        SimError::PowerIndex(e)
    }
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::ScanOrder => {
                write!(f, "upgrade scan protocol violation: count before begin_scan")
            }
            SimError::PowerIndex(e) => write!(f, "{}", e),
            SimError::BundleInit { vehicle, reason } => {
                write!(f, "manager bundle init failed for {:?}: {}", vehicle, reason)
            }
            SimError::DeadInstance { vehicle } => {
                write!(f, "vehicle instance {:?} is no longer live", vehicle)
            }
        }
    }
}

impl std::error::Error for SimError {}
