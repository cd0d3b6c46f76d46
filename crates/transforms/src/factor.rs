//! Runtime scale factors read by spliced code.
//!
//! [`FactorConfig`] is owned by the host and mutated from other threads (a settings control,
//! a daily reset). Spliced blocks only hold a [`FactorProvider`], whose reads are single
//! lock-free atomic loads. Slightly stale values are acceptable.

use ilsplice_core::MethodSignature;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Multiplicative identity returned whenever the configured factor is unusable.
pub const NEUTRAL_FACTOR: f64 = 1.0;

/// Owning type of the accessor methods that spliced `call` instructions target.
pub const PROVIDER_OWNER: &str = "ilsplice.FactorProvider";

/// Host-owned, concurrently mutable factor configuration.
#[derive(Debug)]
pub struct FactorConfig {
    /// `f64` bit pattern of the current factor
    current_factor: AtomicU64,
    apply_secondary: AtomicBool,
}

/// Plain snapshot of [`FactorConfig`], suitable for persistence or reports.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorSettings {
    pub current_factor: f64,
    pub apply_secondary: bool,
}

impl Default for FactorSettings {
    fn default() -> Self {
        Self {
            current_factor: NEUTRAL_FACTOR,
            apply_secondary: true,
        }
    }
}

impl FactorConfig {
    pub fn new(settings: FactorSettings) -> Self {
        Self {
            current_factor: AtomicU64::new(settings.current_factor.to_bits()),
            apply_secondary: AtomicBool::new(settings.apply_secondary),
        }
    }

    pub fn shared(settings: FactorSettings) -> Arc<Self> {
        Arc::new(Self::new(settings))
    }

    pub fn set_factor(&self, factor: f64) {
        self.current_factor.store(factor.to_bits(), Ordering::Relaxed);
    }

    pub fn set_apply_secondary(&self, enabled: bool) {
        self.apply_secondary.store(enabled, Ordering::Relaxed);
    }

    /// Periodic reset hook; the host decides when to call it.
    pub fn reset(&self) {
        self.set_factor(NEUTRAL_FACTOR);
        tracing::debug!("factor reset to {NEUTRAL_FACTOR}");
    }

    /// Raw configured value, without sanitizing.
    pub fn raw_factor(&self) -> f64 {
        f64::from_bits(self.current_factor.load(Ordering::Relaxed))
    }

    pub fn apply_secondary(&self) -> bool {
        self.apply_secondary.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> FactorSettings {
        FactorSettings {
            current_factor: self.raw_factor(),
            apply_secondary: self.apply_secondary(),
        }
    }
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self::new(FactorSettings::default())
    }
}

/// Which accessor a spliced block calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorSource {
    /// [`FactorProvider::current_factor`]
    Primary,
    /// [`FactorProvider::secondary_factor`], gated by the secondary toggle
    Secondary,
}

impl FactorSource {
    /// Signature of the zero-argument accessor that spliced code calls.
    pub fn signature(self) -> MethodSignature {
        let name = match self {
            FactorSource::Primary => "current_factor",
            FactorSource::Secondary => "secondary_factor",
        };
        MethodSignature::new(PROVIDER_OWNER, name, 0)
    }

    /// Inverse of [`FactorSource::signature`].
    pub fn from_signature(signature: &MethodSignature) -> Option<Self> {
        [FactorSource::Primary, FactorSource::Secondary]
            .into_iter()
            .find(|source| source.signature() == *signature)
    }
}

/// Read capability over a [`FactorConfig`]. Never fails.
#[derive(Clone, Debug)]
pub struct FactorProvider {
    config: Arc<FactorConfig>,
}

impl FactorProvider {
    pub fn new(config: Arc<FactorConfig>) -> Self {
        Self { config }
    }

    /// The configured factor, or [`NEUTRAL_FACTOR`] if it is not a positive finite number.
    pub fn current_factor(&self) -> f64 {
        let factor = self.config.raw_factor();
        if factor.is_finite() && factor > 0.0 {
            factor
        } else {
            NEUTRAL_FACTOR
        }
    }

    /// Same as [`Self::current_factor`] when the secondary toggle is on, else neutral.
    pub fn secondary_factor(&self) -> f64 {
        if self.config.apply_secondary() {
            self.current_factor()
        } else {
            NEUTRAL_FACTOR
        }
    }

    pub fn evaluate(&self, source: FactorSource) -> f64 {
        match source {
            FactorSource::Primary => self.current_factor(),
            FactorSource::Secondary => self.secondary_factor(),
        }
    }
}
