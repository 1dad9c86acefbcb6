// crates/proof-bundle-core/src/interfaces/mod.rs
// ============================================================================
// Module: Proof Bundle Interfaces
// Description: Injectable time and environment sources.
// Purpose: Keep receipt and manifest construction reproducible under test.
// Dependencies: crate::core, time
// ============================================================================

//! ## Overview
//! Builders never read the wall clock or the process environment directly.
//! Production hosts pass [`SystemClock`] and [`HostEnvironment`]; tests pass
//! [`FixedClock`] and [`StaticEnvironment`] to obtain byte-stable receipts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;

use time::OffsetDateTime;

use crate::core::EnvironmentFingerprint;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Source of UTC timestamps.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_datetime(OffsetDateTime::now_utc())
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

// ============================================================================
// SECTION: Environment Probe
// ============================================================================

/// Source of environment fingerprints.
pub trait EnvironmentProbe {
    /// Captures the environment fingerprint.
    fn fingerprint(&self) -> EnvironmentFingerprint;
}

/// Fingerprint of the running process.
#[derive(Debug, Clone)]
pub struct HostEnvironment {
    /// Producer name and version recorded as the runtime.
    runtime_version: String,
}

impl HostEnvironment {
    /// Creates a probe that reports `producer` as the runtime version.
    #[must_use]
    pub fn new(producer: impl Into<String>) -> Self {
        Self {
            runtime_version: producer.into(),
        }
    }
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self::new(concat!("proof-bundle-core/", env!("CARGO_PKG_VERSION")))
    }
}

impl EnvironmentProbe for HostEnvironment {
    fn fingerprint(&self) -> EnvironmentFingerprint {
        let executable = env::current_exe()
            .map_or_else(|_| UNKNOWN.to_string(), |path| path.display().to_string());
        let cwd = env::current_dir()
            .map_or_else(|_| UNKNOWN.to_string(), |path| path.display().to_string());
        EnvironmentFingerprint {
            runtime_version: self.runtime_version.clone(),
            platform: format!("{}-{}-{}", env::consts::OS, env::consts::ARCH, env::consts::FAMILY),
            executable,
            cwd,
        }
    }
}

/// Placeholder recorded when a fingerprint field cannot be read.
const UNKNOWN: &str = "unknown";

/// Probe returning a fixed fingerprint.
#[derive(Debug, Clone)]
pub struct StaticEnvironment(pub EnvironmentFingerprint);

impl EnvironmentProbe for StaticEnvironment {
    fn fingerprint(&self) -> EnvironmentFingerprint {
        self.0.clone()
    }
}

impl<E: EnvironmentProbe + ?Sized> EnvironmentProbe for &E {
    fn fingerprint(&self) -> EnvironmentFingerprint {
        (**self).fingerprint()
    }
}
