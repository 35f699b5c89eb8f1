#![allow(non_snake_case)]
use num_traits::{Float, FloatConst, FromPrimitive, NumAssign};
use std::fmt::{Debug, Display, LowerExp};

#[cfg(feature = "lapack")]
use crate::algebra::dense::BlasFloatT;

macro_rules! float_bounds {
    ($(#[$attr:meta])* $name:ident : $($bound:path),+) => {
        $(#[$attr])*
        pub trait $name: 'static + Send + Sync + Sized $(+ $bound)+ {}
        impl<T> $name for T where T: 'static + Send + Sync + Sized $(+ $bound)+ {}
    };
}

float_bounds! {
    /// Scalar requirements of every eigensolver in the crate, independent
    /// of the dense backend.
    CoreFloatT: Float, FloatConst, NumAssign, Default, FromPrimitive, Display, LowerExp, Debug
}

cfg_if::cfg_if! {
    if #[cfg(feature = "lapack")] {
        /// Floating point type of matrices, vectors and eigenvalues.
        ///
        /// With a LAPACK backend compiled in, the projected problems may be
        /// dispatched to LAPACK and only f32 and f64 qualify.
        pub trait FloatT: CoreFloatT + BlasFloatT {}
        impl<T> FloatT for T where T: CoreFloatT + BlasFloatT {}
    } else {
        /// Floating point type of matrices, vectors and eigenvalues.
        ///
        /// The native dense kernels are generic, so any [`CoreFloatT`]
        /// type will do.
        pub trait FloatT: CoreFloatT {}
        impl<T> FloatT for T where T: CoreFloatT {}
    }
}

/// Conversion of primitive constants into a [`FloatT`], written
/// `(0.5).as_T()` or `n.as_T()`.
pub trait AsFloatT<T>: 'static {
    fn as_T(&self) -> T;
}

macro_rules! impl_as_FloatT {
    ($($ty:ty => $conv:ident),+) => {$(
        impl<T: FromPrimitive + 'static> AsFloatT<T> for $ty {
            #[inline]
            fn as_T(&self) -> T {
                // every FloatT represents these primitives, possibly rounded
                T::$conv(*self).unwrap()
            }
        }
    )+};
}
impl_as_FloatT!(u32 => from_u32, u64 => from_u64, usize => from_usize, f32 => from_f32, f64 => from_f64);

#[test]
fn test_as_float() {
    let half: f64 = (0.5).as_T();
    let n: f32 = 7usize.as_T();
    assert_eq!(half, 0.5);
    assert_eq!(n, 7.);
}
