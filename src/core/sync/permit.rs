/*!
 * Crossing Permit
 *
 * RAII guard for one entity's stay on the crossing
 */

use super::monitor::CrossingMonitor;
use crate::core::types::TrafficClass;
use std::mem::ManuallyDrop;

/// Proof that the holder is on the crossing
///
/// Dropping the permit calls [`CrossingMonitor::release_exit`] exactly once,
/// so entry and exit stay paired even on early return or unwind.
#[must_use = "dropping the permit immediately leaves the crossing"]
pub struct CrossingPermit<'a> {
    monitor: &'a CrossingMonitor,
    class: TrafficClass,
}

impl<'a> CrossingPermit<'a> {
    pub(crate) fn new(monitor: &'a CrossingMonitor, class: TrafficClass) -> Self {
        Self { monitor, class }
    }

    /// Class this permit was granted to
    #[inline]
    pub fn class(&self) -> TrafficClass {
        self.class
    }

    /// Leave the crossing now
    pub fn leave(self) {
        let permit = ManuallyDrop::new(self);
        permit.monitor.release_exit(permit.class);
    }
}

impl Drop for CrossingPermit<'_> {
    fn drop(&mut self) {
        self.monitor.release_exit(self.class);
    }
}

impl std::fmt::Debug for CrossingPermit<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossingPermit")
            .field("class", &self.class)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leave_releases_once() {
        let monitor = CrossingMonitor::new();
        let permit = monitor.enter(TrafficClass::Pedestrian);
        permit.leave();

        let stats = monitor.stats();
        assert_eq!(stats.admitted(TrafficClass::Pedestrian), 1);
        assert_eq!(stats.released(TrafficClass::Pedestrian), 1);
        assert!(monitor.snapshot().is_idle());
    }

    #[test]
    fn test_permits_of_one_class_overlap() {
        let monitor = CrossingMonitor::new();
        let first = monitor.enter(TrafficClass::CarNorth);
        let second = monitor.enter(TrafficClass::CarNorth);
        assert_eq!(monitor.snapshot().active(TrafficClass::CarNorth), 2);
        drop(first);
        drop(second);
        assert_eq!(monitor.stats().peak_active(TrafficClass::CarNorth), 2);
    }
}
