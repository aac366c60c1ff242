//! Sample width contract.
//!
//! The device produces fixed-width unsigned samples, and the hardware
//! entropy instructions only exist in 16-, 32- and 64-bit forms. The
//! [`Sample`] trait is sealed over exactly those three widths, so an
//! unsupported width is a compile error rather than anything a caller
//! could reach at runtime.

use std::fmt;
use std::ops::BitXor;

use rand::RngCore;
use rand::distr::{Distribution, StandardUniform};

mod sealed {
    pub trait Sealed {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

/// A fixed-width unsigned sample: `u16`, `u32` or `u64`.
pub trait Sample:
    sealed::Sealed
    + Copy
    + Eq
    + Ord
    + BitXor<Output = Self>
    + fmt::Debug
    + fmt::Display
    + fmt::LowerHex
    + Send
    + Sync
    + 'static
{
    /// Sample width in bits.
    const BITS: u32;

    /// Smallest producible value (always zero).
    const MIN: Self;

    /// Largest producible value (all bits set).
    const MAX: Self;

    /// One full-range uniform draw from `engine`.
    fn draw<R: RngCore + ?Sized>(engine: &mut R) -> Self;
}

macro_rules! impl_sample {
    ($($ty:ty),*) => {$(
        impl Sample for $ty {
            const BITS: u32 = <$ty>::BITS;
            const MIN: Self = <$ty>::MIN;
            const MAX: Self = <$ty>::MAX;

            #[inline]
            fn draw<R: RngCore + ?Sized>(engine: &mut R) -> Self {
                StandardUniform.sample(engine)
            }
        }
    )*};
}

impl_sample!(u16, u32, u64);
