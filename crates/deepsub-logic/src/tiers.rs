//! Tiered upgrade group resolution: best equipped rank wins.
//!
//! A `TieredGroup` collects (tier value, slot) observations during a scan
//! and resolves to the maximum observed value, or a floor value when the
//! group is empty. Scans follow a strict per-tick protocol:
//! `begin_scan` → `count`* → `finish_scan`. Counting outside a scan is a
//! protocol violation and is reported, never ignored.

/// Slot identifier as reported by the equipment inspection.
pub type SlotId = u32;

/// Raised when the scan protocol is violated (`count` or `finish_scan`
/// without a preceding `begin_scan`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOrderError;

impl std::fmt::Display for ScanOrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tier group scanned without begin_scan")
    }
}

impl std::error::Error for ScanOrderError {}

/// Result of finishing one scan over a tier group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome<T> {
    /// Maximum tier value observed, or the floor value for an empty scan.
    pub value: T,
    /// True exactly when the group went from ≥1 observation in the previous
    /// scan to 0 in this one. Dependents use it to reset derived state.
    pub cleared: bool,
}

/// One family of non-stacking tiered upgrades.
///
/// Generic over any totally ordered, copyable tier value. Both shipped
/// families use `u16`, but nothing here depends on that.
#[derive(Debug, Clone)]
pub struct TieredGroup<T> {
    floor: T,
    observed: Vec<(T, SlotId)>,
    resolved: T,
    prev_had_modules: bool,
    scanning: bool,
}

impl<T: Ord + Copy> TieredGroup<T> {
    /// Create a group that resolves to `floor` when no module is equipped.
    pub fn new(floor: T) -> Self {
        Self {
            floor,
            observed: Vec::new(),
            resolved: floor,
            prev_had_modules: false,
            scanning: false,
        }
    }

    /// Reset the per-tick observation set. Must precede any `count`.
    pub fn begin_scan(&mut self) {
        self.observed.clear();
        self.scanning = true;
    }

    /// Record one equipped module of this family.
    pub fn count(&mut self, value: T, slot: SlotId) -> Result<(), ScanOrderError> {
        if !self.scanning {
            return Err(ScanOrderError);
        }
        self.observed.push((value, slot));
        Ok(())
    }

    /// Close the scan and resolve the winning tier value.
    ///
    /// Ties on the maximum are harmless: only the value is used downstream,
    /// never which slot reported it.
    pub fn finish_scan(&mut self) -> Result<ScanOutcome<T>, ScanOrderError> {
        if !self.scanning {
            return Err(ScanOrderError);
        }
        self.scanning = false;

        let has_modules = !self.observed.is_empty();
        self.resolved = self
            .observed
            .iter()
            .map(|(value, _)| *value)
            .max()
            .unwrap_or(self.floor);

        let cleared = self.prev_had_modules && !has_modules;
        self.prev_had_modules = has_modules;

        Ok(ScanOutcome {
            value: self.resolved,
            cleared,
        })
    }

    /// Last resolved value. Idempotent between scans.
    pub fn resolve(&self) -> T {
        self.resolved
    }

    /// Floor value used when the group is empty.
    pub fn floor(&self) -> T {
        self.floor
    }

    /// Whether the most recent finished scan saw any modules.
    pub fn has_modules(&self) -> bool {
        self.prev_had_modules
    }

    /// Number of observations in the current or most recent scan.
    pub fn observation_count(&self) -> usize {
        self.observed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanned(values: &[u16]) -> TieredGroup<u16> {
        let mut group = TieredGroup::new(0);
        group.begin_scan();
        for (i, v) in values.iter().enumerate() {
            group.count(*v, i as SlotId).unwrap();
        }
        group.finish_scan().unwrap();
        group
    }

    #[test]
    fn test_resolve_is_max() {
        let group = scanned(&[2, 1, 3, 1]);
        assert_eq!(group.resolve(), 3);
    }

    #[test]
    fn test_empty_scan_resolves_to_floor() {
        let group = scanned(&[]);
        assert_eq!(group.resolve(), 0);
        assert!(!group.has_modules());
    }

    #[test]
    fn test_max_is_order_independent() {
        // b, a, b with a > b still resolves to a.
        let group = scanned(&[1, 2, 1]);
        assert_eq!(group.resolve(), 2);
    }

    #[test]
    fn test_resolve_idempotent_between_scans() {
        let group = scanned(&[1, 3]);
        assert_eq!(group.resolve(), 3);
        assert_eq!(group.resolve(), 3);
    }

    #[test]
    fn test_count_without_begin_scan_is_error() {
        let mut group: TieredGroup<u16> = TieredGroup::new(0);
        assert_eq!(group.count(1, 0), Err(ScanOrderError));
    }

    #[test]
    fn test_count_after_finish_is_error() {
        let mut group = scanned(&[1]);
        assert_eq!(group.count(2, 0), Err(ScanOrderError));
    }

    #[test]
    fn test_finish_without_begin_is_error() {
        let mut group: TieredGroup<u16> = TieredGroup::new(0);
        assert!(group.finish_scan().is_err());
    }

    #[test]
    fn test_cleared_fires_once_on_transition() {
        let mut group = TieredGroup::new(0u16);

        group.begin_scan();
        group.count(2, 0).unwrap();
        let outcome = group.finish_scan().unwrap();
        assert!(!outcome.cleared);

        // First empty scan after a populated one: cleared.
        group.begin_scan();
        let outcome = group.finish_scan().unwrap();
        assert!(outcome.cleared);
        assert_eq!(outcome.value, 0);

        // Second empty scan: not cleared again.
        group.begin_scan();
        let outcome = group.finish_scan().unwrap();
        assert!(!outcome.cleared);
    }

    #[test]
    fn test_begin_scan_resets_observations() {
        let mut group = scanned(&[3]);
        group.begin_scan();
        group.count(1, 0).unwrap();
        let outcome = group.finish_scan().unwrap();
        assert_eq!(outcome.value, 1);
    }

    #[test]
    fn test_nonzero_floor() {
        let mut group = TieredGroup::new(5u16);
        group.begin_scan();
        assert_eq!(group.finish_scan().unwrap().value, 5);
    }
}
