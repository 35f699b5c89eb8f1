mod core;
pub use self::core::*;
mod matrix_math;
pub use self::matrix_math::*;
mod lu;
pub use self::lu::*;
mod eigen;
pub use self::eigen::*;

cfg_if::cfg_if! {
    if #[cfg(feature = "lapack")] {
        mod blas;
        pub use self::blas::*;
    }
}
