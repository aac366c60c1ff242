//! # hwrand-core
//!
//! **A hybrid random device: hardware entropy when the CPU has it,
//! graceful pseudo-random fallback when it doesn't.**
//!
//! The device behaves like any uniform random-bit generator, but on
//! CPUs carrying the RDRAND/RDSEED entropy instructions every draw is
//! strengthened by XOR-mixing one hardware value into the output of a
//! time-seeded pseudo-random engine. Callers never need to know whether
//! the instructions exist — detection happens once at construction and
//! absence degrades silently to the pseudo-random stream.
//!
//! ## Quick start
//!
//! ```
//! use hwrand_core::RandomDevice;
//!
//! let mut dev = RandomDevice::new();
//! let nonce = dev.next();
//! assert!(nonce >= RandomDevice::min() && nonce <= RandomDevice::max());
//!
//! // 1.0 when either entropy instruction was detected, else 0.0.
//! let estimate = dev.entropy_estimate();
//! assert!(estimate == 0.0 || estimate == 1.0);
//! ```
//!
//! ## Architecture
//!
//! Detection → Source → Device
//!
//! - [`cpuid`] probes the vendor signature and the two feature bits,
//!   once per device.
//! - [`HardwareSource`] is the narrow seam holding all
//!   architecture-specific instruction issuance; [`RdrandSource`] backs
//!   it on x86_64 and [`NullSource`] everywhere else, so the retry and
//!   mixing logic above it never touches an intrinsic.
//! - [`HybridDevice`] draws one full-range uniform value per call,
//!   preferring the strong (RDSEED) path over the weak (RDRAND) path,
//!   with bounded busy-retries and silent per-draw degradation.
//!
//! Sample widths are fixed at compile time to 16, 32 or 64 bits via the
//! sealed [`Sample`] trait; any other width does not compile.
//!
//! One device serves one calling context: there is no internal
//! synchronization, and the capability flags (pure functions of the
//! CPU) are the only state safe to assume shared.

pub mod cpuid;
pub mod device;
#[cfg(target_arch = "x86_64")]
pub mod rdrand;
pub mod sample;
pub mod source;

pub use device::{HybridDevice, RandomDevice, STRONG_RETRY_LIMIT, WEAK_RETRY_LIMIT};
#[cfg(target_arch = "x86_64")]
pub use rdrand::RdrandSource;
pub use sample::Sample;
pub use source::{HardwareSource, NullSource, PlatformSource};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
