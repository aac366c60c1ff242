//! Abstract hardware entropy source.
//!
//! All architecture-specific instruction issuance sits behind
//! [`HardwareSource`], so the retry and mixing logic above it is
//! architecture-agnostic and can be exercised with scripted fakes.

use crate::sample::Sample;

/// A source of hardware-derived samples with two tiers of guarantee.
///
/// The weak tier maps to an instruction whose conditioner reseeds
/// periodically (RDRAND); the strong tier maps to one that reseeds for
/// every value (RDSEED). Either attempt may transiently fail while the
/// on-die conditioner catches up — that is reported as `None`, never as
/// an error.
pub trait HardwareSource<T: Sample> {
    /// Whether the weak-tier instruction exists on this machine.
    fn supports_weak(&self) -> bool;

    /// Whether the strong-tier instruction exists on this machine.
    fn supports_strong(&self) -> bool;

    /// One weak-tier attempt. `None` on transient failure.
    fn try_weak_sample(&mut self) -> Option<T>;

    /// One strong-tier attempt. `None` on transient failure.
    fn try_strong_sample(&mut self) -> Option<T>;
}

/// Source for platforms with no entropy instructions at all.
///
/// A device built over this source is a plain pseudo-random generator:
/// no capability is reported and every attempt fails, so the mixing
/// step never engages.
#[derive(Debug, Default)]
pub struct NullSource;

impl NullSource {
    pub fn new() -> Self {
        Self
    }
}

impl<T: Sample> HardwareSource<T> for NullSource {
    fn supports_weak(&self) -> bool {
        false
    }

    fn supports_strong(&self) -> bool {
        false
    }

    fn try_weak_sample(&mut self) -> Option<T> {
        None
    }

    fn try_strong_sample(&mut self) -> Option<T> {
        None
    }
}

/// The hardware source this build targets: [`RdrandSource`] on x86_64,
/// [`NullSource`] everywhere else.
#[cfg(target_arch = "x86_64")]
pub type PlatformSource = crate::rdrand::RdrandSource;

/// The hardware source this build targets: [`RdrandSource`] on x86_64,
/// [`NullSource`] everywhere else.
#[cfg(not(target_arch = "x86_64"))]
pub type PlatformSource = NullSource;
