//! Host resource probing with a short-lived cache.

use crate::clock::{Clock, SystemClock};
use kestrel_core::SystemResources;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use sysinfo::{Disks, System};

/// How long a probe result stays valid before the OS is queried again.
const PROBE_CACHE_TTL: Duration = Duration::from_secs(10);

/// Bytes per gigabyte.
const BYTES_PER_GB: f64 = 1_073_741_824.0;

/// Probes host CPU, RAM, and disk capacity.
///
/// `detect` never fails: any OS query problem falls back to conservative
/// defaults with a logged warning. Results are cached for a few seconds
/// to avoid hammering the OS on every routing call.
pub struct SystemResourceProbe {
    /// Cached probe result and the instant it was taken.
    cache: Mutex<Option<(SystemResources, Instant)>>,
    /// Cache validity window.
    ttl: Duration,
    /// Time source, injectable for tests.
    clock: Arc<dyn Clock>,
}

impl SystemResourceProbe {
    /// Creates a probe with the default TTL and system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a probe with an injected clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: Mutex::new(None),
            ttl: PROBE_CACHE_TTL,
            clock,
        }
    }

    /// Detects host resources, serving a cached snapshot when fresh.
    pub fn detect(&self) -> SystemResources {
        let now = self.clock.now();

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((resources, taken_at)) = cache.as_ref()
            && now.duration_since(*taken_at) < self.ttl
        {
            return resources.clone();
        }

        let resources = Self::query_os();
        *cache = Some((resources.clone(), now));
        resources
    }

    /// Queries the OS directly, falling back to conservative defaults.
    fn query_os() -> SystemResources {
        let mut system = System::new();
        system.refresh_memory();

        let total_ram_gb = system.total_memory() as f64 / BYTES_PER_GB;
        let available_ram_gb = system.available_memory() as f64 / BYTES_PER_GB;

        if total_ram_gb <= 0.0 {
            tracing::warn!("Memory probe returned nothing usable, using conservative defaults");
            return SystemResources::conservative_defaults();
        }

        let cpu_cores = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(4);

        let disks = Disks::new_with_refreshed_list();
        let disk_space_gb = disks
            .iter()
            .map(|disk| disk.available_space() as f64 / BYTES_PER_GB)
            .fold(0.0_f64, f64::max);
        let disk_space_gb = if disk_space_gb > 0.0 {
            disk_space_gb
        } else {
            100.0
        };

        SystemResources {
            available_ram_gb,
            total_ram_gb,
            cpu_cores,
            disk_space_gb,
            gpu_memory_gb: None,
            platform: std::env::consts::OS.to_owned(),
        }
    }
}

impl Default for SystemResourceProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn test_detect_never_fails_and_is_positive() {
        let probe = SystemResourceProbe::new();
        let resources = probe.detect();
        assert!(resources.total_ram_gb > 0.0);
        assert!(resources.cpu_cores > 0);
        assert!(resources.disk_space_gb > 0.0);
        assert!(!resources.platform.is_empty());
    }

    #[test]
    fn test_cache_serves_same_snapshot_within_ttl() {
        let clock = Arc::new(ManualClock::new());
        let probe = SystemResourceProbe::with_clock(Arc::clone(&clock) as Arc<dyn Clock>);

        let first = probe.detect();
        clock.advance(Duration::from_secs(5));
        let second = probe.detect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cache_refreshes_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let probe = SystemResourceProbe::with_clock(Arc::clone(&clock) as Arc<dyn Clock>);

        probe.detect();
        clock.advance(Duration::from_secs(11));
        // A refresh happened; just assert it still yields sane values.
        let resources = probe.detect();
        assert!(resources.total_ram_gb > 0.0);
    }

    #[test]
    fn test_conservative_defaults_shape() {
        let defaults = SystemResources::conservative_defaults();
        assert!((defaults.available_ram_gb - 8.0).abs() < f64::EPSILON);
        assert!((defaults.total_ram_gb - 16.0).abs() < f64::EPSILON);
        assert_eq!(defaults.cpu_cores, 4);
        assert!((defaults.disk_space_gb - 100.0).abs() < f64::EPSILON);
    }
}
