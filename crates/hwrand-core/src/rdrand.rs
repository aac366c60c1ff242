//! RDRAND/RDSEED issuance for x86_64.
//!
//! Both instructions clear the carry flag when the on-die conditioner
//! has no value ready; the intrinsics surface that as a zero return,
//! which we map to `None`. Retry policy lives in the device, not here —
//! each call is exactly one instruction attempt.

use core::arch::x86_64 as arch;

use crate::cpuid;
use crate::source::HardwareSource;

/// Hardware source backed by the Intel entropy instructions.
///
/// Capability flags are evaluated once at construction and never
/// re-checked; they are a pure function of the CPU, so instances agree
/// with each other for the lifetime of the process.
#[derive(Debug)]
pub struct RdrandSource {
    has_rdrand: bool,
    has_rdseed: bool,
}

impl RdrandSource {
    pub fn new() -> Self {
        let has_rdrand = cpuid::has_rdrand();
        let has_rdseed = cpuid::has_rdseed();
        log::debug!("entropy instructions detected: rdrand={has_rdrand} rdseed={has_rdseed}");
        Self {
            has_rdrand,
            has_rdseed,
        }
    }
}

impl Default for RdrandSource {
    fn default() -> Self {
        Self::new()
    }
}

// One instruction attempt per function. The carry flag is folded into
// the intrinsic's return value: 1 means the output is valid.

#[target_feature(enable = "rdrand")]
unsafe fn rdrand16() -> Option<u16> {
    let mut v = 0;
    (unsafe { arch::_rdrand16_step(&mut v) } == 1).then_some(v)
}

#[target_feature(enable = "rdrand")]
unsafe fn rdrand32() -> Option<u32> {
    let mut v = 0;
    (unsafe { arch::_rdrand32_step(&mut v) } == 1).then_some(v)
}

#[target_feature(enable = "rdrand")]
unsafe fn rdrand64() -> Option<u64> {
    let mut v = 0;
    (unsafe { arch::_rdrand64_step(&mut v) } == 1).then_some(v)
}

#[target_feature(enable = "rdseed")]
unsafe fn rdseed16() -> Option<u16> {
    let mut v = 0;
    (unsafe { arch::_rdseed16_step(&mut v) } == 1).then_some(v)
}

#[target_feature(enable = "rdseed")]
unsafe fn rdseed32() -> Option<u32> {
    let mut v = 0;
    (unsafe { arch::_rdseed32_step(&mut v) } == 1).then_some(v)
}

#[target_feature(enable = "rdseed")]
unsafe fn rdseed64() -> Option<u64> {
    let mut v = 0;
    (unsafe { arch::_rdseed64_step(&mut v) } == 1).then_some(v)
}

macro_rules! impl_hardware_source {
    ($ty:ty, $rdrand:ident, $rdseed:ident) => {
        impl HardwareSource<$ty> for RdrandSource {
            fn supports_weak(&self) -> bool {
                self.has_rdrand
            }

            fn supports_strong(&self) -> bool {
                self.has_rdseed
            }

            fn try_weak_sample(&mut self) -> Option<$ty> {
                if !self.has_rdrand {
                    return None;
                }
                // SAFETY: the RDRAND feature bit was confirmed via CPUID
                // at construction, so the instruction exists.
                unsafe { $rdrand() }
            }

            fn try_strong_sample(&mut self) -> Option<$ty> {
                if !self.has_rdseed {
                    return None;
                }
                // SAFETY: the RDSEED feature bit was confirmed via CPUID
                // at construction.
                unsafe { $rdseed() }
            }
        }
    };
}

impl_hardware_source!(u16, rdrand16, rdseed16);
impl_hardware_source!(u32, rdrand32, rdseed32);
impl_hardware_source!(u64, rdrand64, rdseed64);
