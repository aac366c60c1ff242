//! CPU feature detection for the entropy instructions.
//!
//! Three probes, each a pure function of the CPU's reported
//! identification data: the vendor signature check and the RDRAND /
//! RDSEED feature bits. None of them can fail — any vendor other than
//! the one carrying the instructions, and any target other than
//! x86_64, simply reports `false`.

/// CPUID.1:ECX bit 30 — RDRAND available.
#[cfg(target_arch = "x86_64")]
const RDRAND_FLAG: u32 = 1 << 30;

/// CPUID.7.0:EBX bit 18 — RDSEED available.
#[cfg(target_arch = "x86_64")]
const RDSEED_FLAG: u32 = 1 << 18;

/// Raw CPUID query for a leaf/sub-leaf pair.
#[cfg(target_arch = "x86_64")]
fn cpuid(leaf: u32, sub_leaf: u32) -> core::arch::x86_64::CpuidResult {
    // SAFETY: CPUID is always present on x86_64 and has no side effects
    // beyond writing the four result registers.
    unsafe { core::arch::x86_64::__cpuid_count(leaf, sub_leaf) }
}

/// Whether the CPU identifies with the "GenuineIntel" vendor signature.
///
/// Leaf 0 returns the vendor string split across EBX/EDX/ECX in that
/// order.
#[cfg(target_arch = "x86_64")]
pub fn is_genuine_intel() -> bool {
    let info = cpuid(0, 0);
    info.ebx.to_le_bytes() == *b"Genu"
        && info.edx.to_le_bytes() == *b"ineI"
        && info.ecx.to_le_bytes() == *b"ntel"
}

/// Whether the CPU advertises the RDRAND instruction.
///
/// Requires the vendor signature; the feature bit alone is not trusted
/// on other vendors.
#[cfg(target_arch = "x86_64")]
pub fn has_rdrand() -> bool {
    if !is_genuine_intel() {
        return false;
    }
    cpuid(1, 0).ecx & RDRAND_FLAG == RDRAND_FLAG
}

/// Whether the CPU advertises the RDSEED instruction.
#[cfg(target_arch = "x86_64")]
pub fn has_rdseed() -> bool {
    if !is_genuine_intel() {
        return false;
    }
    cpuid(7, 0).ebx & RDSEED_FLAG == RDSEED_FLAG
}

#[cfg(not(target_arch = "x86_64"))]
pub fn is_genuine_intel() -> bool {
    false
}

#[cfg(not(target_arch = "x86_64"))]
pub fn has_rdrand() -> bool {
    false
}

#[cfg(not(target_arch = "x86_64"))]
pub fn has_rdseed() -> bool {
    false
}
