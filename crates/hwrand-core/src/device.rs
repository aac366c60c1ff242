//! Hybrid random device.
//!
//! Every draw starts from a seeded pseudo-random engine and, when the
//! CPU carries entropy instructions, XORs one hardware value into the
//! result. XOR mixing can only add unpredictability: if the hardware
//! value is weak or absent the output is still exactly as good as the
//! engine's.
//!
//! A draw never fails. If a hardware attempt exhausts its retry budget
//! the device silently returns the pseudo-random value for that one
//! draw — callers that need a hardware guarantee must check
//! [`HybridDevice::entropy_estimate`] once after construction and apply
//! their own policy.

use std::marker::PhantomData;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::sample::Sample;
use crate::source::{HardwareSource, PlatformSource};

/// Attempts per draw on the weak (RDRAND) path.
///
/// Empirical constant — RDRAND rarely needs a second attempt. Tunable
/// here, not by callers.
pub const WEAK_RETRY_LIMIT: u32 = 8;

/// Attempts per draw on the strong (RDSEED) path. RDSEED reseeds for
/// every value, so transient failures are far more common than with
/// RDRAND and the budget is correspondingly larger.
pub const STRONG_RETRY_LIMIT: u32 = 256;

/// Uniform random-bit generator mixing hardware entropy into a seeded
/// pseudo-random engine.
///
/// Capability flags are evaluated once at construction and are
/// immutable afterwards. The engine state mutates on every draw with no
/// internal locking: a single instance is not safe for concurrent
/// `next` calls. Give each thread its own device, or serialize access
/// externally.
///
/// The device is deliberately neither `Clone` nor `Copy` — duplicated
/// engine state would produce correlated output streams.
pub struct HybridDevice<T: Sample, E = SmallRng, H = PlatformSource> {
    has_weak: bool,
    has_strong: bool,
    engine: E,
    source: H,
    _sample: PhantomData<T>,
}

/// Device at the default 32-bit sample width over the platform source.
pub type RandomDevice = HybridDevice<u32>;

/// Wall-clock nanosecond count, the construction-time seed.
///
/// This is the sole source of unpredictability when no hardware entropy
/// exists. It differs across instances created at different times but
/// is not cryptographically strong on its own.
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

impl<T: Sample> HybridDevice<T>
where
    PlatformSource: HardwareSource<T>,
{
    /// Device over this build's platform source, engine seeded from the
    /// wall clock.
    pub fn new() -> Self {
        Self::from_source(PlatformSource::default())
    }
}

impl<T: Sample> Default for HybridDevice<T>
where
    PlatformSource: HardwareSource<T>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample, H: HardwareSource<T>> HybridDevice<T, SmallRng, H> {
    /// Device over a caller-supplied source, engine seeded from the
    /// wall clock.
    pub fn from_source(source: H) -> Self {
        Self::from_parts(SmallRng::seed_from_u64(clock_seed()), source)
    }
}

impl<T: Sample, E: RngCore, H: HardwareSource<T>> HybridDevice<T, E, H> {
    /// Device from explicit parts. Capability flags are read from the
    /// source here, once, and cached for the device's lifetime.
    pub fn from_parts(engine: E, source: H) -> Self {
        Self {
            has_weak: source.supports_weak(),
            has_strong: source.supports_strong(),
            engine,
            source,
            _sample: PhantomData,
        }
    }

    /// One sample, uniform over the full range of `T`.
    ///
    /// The engine advances on every draw, whether or not hardware
    /// mixing engages. The strong path is preferred; if it exhausts its
    /// budget the weak path is still attempted before degrading to the
    /// bare pseudo-random value.
    pub fn next(&mut self) -> T {
        let prand = T::draw(&mut self.engine);
        if self.has_strong {
            for _ in 0..STRONG_RETRY_LIMIT {
                if let Some(hw) = self.source.try_strong_sample() {
                    return prand ^ hw;
                }
            }
        }
        if self.has_weak {
            for _ in 0..WEAK_RETRY_LIMIT {
                if let Some(hw) = self.source.try_weak_sample() {
                    return prand ^ hw;
                }
            }
        }
        prand
    }

    /// Smallest producible value (zero).
    pub const fn min() -> T {
        T::MIN
    }

    /// Largest producible value (all bits of `T` set).
    pub const fn max() -> T {
        T::MAX
    }

    /// Coarse self-report of hardware involvement: 1.0 if either
    /// entropy instruction was detected, else 0.0.
    ///
    /// This is not a measured entropy rate, and a 1.0 does not
    /// guarantee that any particular draw was hardware-mixed — a draw
    /// that exhausts its retry budget degrades silently.
    pub fn entropy_estimate(&self) -> f64 {
        if self.has_weak || self.has_strong {
            1.0
        } else {
            0.0
        }
    }

    /// Whether the weak-tier instruction was detected at construction.
    pub fn supports_weak_entropy(&self) -> bool {
        self.has_weak
    }

    /// Whether the strong-tier instruction was detected at construction.
    pub fn supports_strong_entropy(&self) -> bool {
        self.has_strong
    }
}

// rand-ecosystem adapters for the two widths that map onto RngCore's
// output methods, so the device can seed distributions and generators
// anywhere a uniform bit source is expected.

impl<E: RngCore, H: HardwareSource<u64>> RngCore for HybridDevice<u64, E, H> {
    fn next_u32(&mut self) -> u32 {
        self.next() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl<E: RngCore, H: HardwareSource<u32>> RngCore for HybridDevice<u32, E, H> {
    fn next_u32(&mut self) -> u32 {
        self.next()
    }

    fn next_u64(&mut self) -> u64 {
        (u64::from(self.next()) << 32) | u64::from(self.next())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::NullSource;

    /// Engine that returns the same value forever.
    struct FixedEngine(u64);

    impl RngCore for FixedEngine {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }
        fn next_u64(&mut self) -> u64 {
            self.0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                let bytes = self.0.to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }
    }

    /// Scripted hardware source: fixed capability flags, fixed sample
    /// values, an optional run of forced failures, and attempt
    /// counters for budget assertions.
    struct FakeSource {
        weak: bool,
        strong: bool,
        weak_value: Option<u64>,
        strong_value: Option<u64>,
        fail_strong_first: u32,
        weak_attempts: u32,
        strong_attempts: u32,
    }

    impl FakeSource {
        fn new(weak: Option<u64>, strong: Option<u64>) -> Self {
            Self {
                weak: weak.is_some(),
                strong: strong.is_some(),
                weak_value: weak,
                strong_value: strong,
                fail_strong_first: 0,
                weak_attempts: 0,
                strong_attempts: 0,
            }
        }

        /// Flags set but every attempt fails.
        fn always_failing() -> Self {
            Self {
                weak: true,
                strong: true,
                weak_value: None,
                strong_value: None,
                fail_strong_first: 0,
                weak_attempts: 0,
                strong_attempts: 0,
            }
        }
    }

    impl HardwareSource<u64> for FakeSource {
        fn supports_weak(&self) -> bool {
            self.weak
        }
        fn supports_strong(&self) -> bool {
            self.strong
        }
        fn try_weak_sample(&mut self) -> Option<u64> {
            self.weak_attempts += 1;
            self.weak_value
        }
        fn try_strong_sample(&mut self) -> Option<u64> {
            self.strong_attempts += 1;
            if self.strong_attempts <= self.fail_strong_first {
                return None;
            }
            self.strong_value
        }
    }

    #[test]
    fn mixing_formula_is_exact() {
        let engine = FixedEngine(0x0F0F_0F0F_0F0F_0F0F);
        let source = FakeSource::new(None, Some(0x0000_0000_FFFF_FFFF));
        let mut dev = HybridDevice::<u64, _, _>::from_parts(engine, source);
        assert_eq!(dev.next(), 0x0F0F_0F0F_F0F0_F0F0);
    }

    #[test]
    fn zero_hardware_value_is_xor_identity() {
        let mut dev = HybridDevice::<u64, _, _>::from_parts(
            SmallRng::seed_from_u64(42),
            FakeSource::new(None, Some(0)),
        );
        let mut reference = SmallRng::seed_from_u64(42);
        for _ in 0..64 {
            assert_eq!(dev.next(), u64::draw(&mut reference));
        }
    }

    #[test]
    fn exhausted_hardware_degrades_to_engine_output() {
        let mut dev = HybridDevice::<u64, _, _>::from_parts(
            SmallRng::seed_from_u64(7),
            FakeSource::always_failing(),
        );
        let mut reference = SmallRng::seed_from_u64(7);
        for _ in 0..8 {
            assert_eq!(dev.next(), u64::draw(&mut reference));
        }
        // Degradation is per-draw and silent: the flags (and therefore
        // the estimate) still report hardware presence.
        assert_eq!(dev.entropy_estimate(), 1.0);
    }

    #[test]
    fn retry_budgets_are_exact() {
        let mut dev = HybridDevice::<u64, _, _>::from_parts(
            SmallRng::seed_from_u64(1),
            FakeSource::always_failing(),
        );
        let _ = dev.next();
        // 256 strong attempts, then fall-through to 8 weak attempts,
        // never one more.
        assert_eq!(dev.source.strong_attempts, STRONG_RETRY_LIMIT);
        assert_eq!(dev.source.weak_attempts, WEAK_RETRY_LIMIT);
    }

    #[test]
    fn weak_budget_respected_when_only_weak() {
        let mut source = FakeSource::always_failing();
        source.strong = false;
        let mut dev = HybridDevice::<u64, _, _>::from_parts(SmallRng::seed_from_u64(2), source);

        let mut reference = SmallRng::seed_from_u64(2);
        assert_eq!(dev.next(), u64::draw(&mut reference));
        assert_eq!(dev.source.weak_attempts, WEAK_RETRY_LIMIT);
        assert_eq!(dev.source.strong_attempts, 0);
    }

    #[test]
    fn fresh_budget_every_draw() {
        let mut source = FakeSource::new(None, Some(0xABCD));
        // Exactly the budget's worth of failures: the first draw
        // degrades, the next draw succeeds immediately.
        source.fail_strong_first = STRONG_RETRY_LIMIT;
        let mut dev = HybridDevice::<u64, _, _>::from_parts(SmallRng::seed_from_u64(5), source);

        let mut reference = SmallRng::seed_from_u64(5);
        assert_eq!(dev.next(), u64::draw(&mut reference));
        assert_eq!(dev.source.strong_attempts, STRONG_RETRY_LIMIT);

        assert_eq!(dev.next(), u64::draw(&mut reference) ^ 0xABCD);
        assert_eq!(dev.source.strong_attempts, STRONG_RETRY_LIMIT + 1);
    }

    #[test]
    fn success_on_final_attempt_still_mixes() {
        let mut source = FakeSource::new(None, Some(0xABCD));
        source.fail_strong_first = STRONG_RETRY_LIMIT - 1;
        let mut dev = HybridDevice::<u64, _, _>::from_parts(SmallRng::seed_from_u64(5), source);

        let mut reference = SmallRng::seed_from_u64(5);
        assert_eq!(dev.next(), u64::draw(&mut reference) ^ 0xABCD);
        assert_eq!(dev.source.strong_attempts, STRONG_RETRY_LIMIT);
    }

    #[test]
    fn strong_exhaustion_falls_through_to_weak() {
        let mut source = FakeSource::new(Some(0x1111), None);
        source.strong = true; // advertised but never delivers
        let mut dev = HybridDevice::<u64, _, _>::from_parts(SmallRng::seed_from_u64(3), source);

        let mut reference = SmallRng::seed_from_u64(3);
        assert_eq!(dev.next(), u64::draw(&mut reference) ^ 0x1111);
        assert_eq!(dev.source.strong_attempts, STRONG_RETRY_LIMIT);
        assert_eq!(dev.source.weak_attempts, 1);
    }

    #[test]
    fn strong_path_preferred_over_weak() {
        let source = FakeSource::new(Some(0x1111), Some(0x2222));
        let mut dev = HybridDevice::<u64, _, _>::from_parts(SmallRng::seed_from_u64(3), source);

        let mut reference = SmallRng::seed_from_u64(3);
        assert_eq!(dev.next(), u64::draw(&mut reference) ^ 0x2222);
        assert_eq!(dev.source.weak_attempts, 0);
    }

    #[test]
    fn weak_only_source_mixes_on_weak_path() {
        let source = FakeSource::new(Some(0x1111), None);
        let mut dev = HybridDevice::<u64, _, _>::from_parts(SmallRng::seed_from_u64(3), source);

        let mut reference = SmallRng::seed_from_u64(3);
        assert_eq!(dev.next(), u64::draw(&mut reference) ^ 0x1111);
        assert_eq!(dev.source.strong_attempts, 0);
        assert_eq!(dev.source.weak_attempts, 1);
    }

    #[test]
    fn no_capability_means_pure_pseudo_random() {
        let mut dev =
            HybridDevice::<u64, _, _>::from_parts(SmallRng::seed_from_u64(11), NullSource);
        assert_eq!(dev.entropy_estimate(), 0.0);

        let mut reference = SmallRng::seed_from_u64(11);
        for _ in 0..64 {
            assert_eq!(dev.next(), u64::draw(&mut reference));
        }
    }

    #[test]
    fn entropy_estimate_reports_any_capability() {
        let weak_only = HybridDevice::<u64, _, _>::from_parts(
            FixedEngine(0),
            FakeSource::new(Some(1), None),
        );
        assert_eq!(weak_only.entropy_estimate(), 1.0);

        let strong_only = HybridDevice::<u64, _, _>::from_parts(
            FixedEngine(0),
            FakeSource::new(None, Some(1)),
        );
        assert_eq!(strong_only.entropy_estimate(), 1.0);
    }

    #[test]
    fn min_max_span_full_range() {
        assert_eq!(HybridDevice::<u16>::min(), 0);
        assert_eq!(HybridDevice::<u16>::max(), 0xFFFF);
        assert_eq!(HybridDevice::<u32>::min(), 0);
        assert_eq!(HybridDevice::<u32>::max(), u32::MAX);
        assert_eq!(HybridDevice::<u64>::min(), 0);
        assert_eq!(HybridDevice::<u64>::max(), u64::MAX);
    }

    #[test]
    fn time_separated_instances_diverge() {
        let mut a = HybridDevice::<u64, _, _>::from_source(NullSource);
        std::thread::sleep(std::time::Duration::from_millis(5));
        let mut b = HybridDevice::<u64, _, _>::from_source(NullSource);

        let sa: Vec<u64> = (0..16).map(|_| a.next()).collect();
        let sb: Vec<u64> = (0..16).map(|_| b.next()).collect();
        assert_ne!(sa, sb);
    }

    #[test]
    fn successive_draws_differ() {
        let mut dev = HybridDevice::<u64>::new();
        let a = dev.next();
        let b = dev.next();
        // Collision probability for a uniform 64-bit source is 2^-64.
        assert_ne!(a, b);
    }

    #[test]
    fn rngcore_fill_bytes_matches_draw_stream() {
        let mut dev =
            HybridDevice::<u64, _, _>::from_parts(SmallRng::seed_from_u64(21), NullSource);
        let mut buf = [0u8; 13];
        dev.fill_bytes(&mut buf);

        let mut reference = SmallRng::seed_from_u64(21);
        let first = u64::draw(&mut reference).to_le_bytes();
        let second = u64::draw(&mut reference).to_le_bytes();
        assert_eq!(&buf[..8], &first[..]);
        assert_eq!(&buf[8..], &second[..5]);
    }

    #[test]
    fn rngcore_u32_device_widens_to_u64() {
        let mut dev =
            HybridDevice::<u32, _, _>::from_parts(SmallRng::seed_from_u64(9), NullSource);
        let wide = dev.next_u64();

        let mut reference = SmallRng::seed_from_u64(9);
        let hi = u32::draw(&mut reference);
        let lo = u32::draw(&mut reference);
        assert_eq!(wide, (u64::from(hi) << 32) | u64::from(lo));
    }
}
