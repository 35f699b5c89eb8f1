//! Linear algebra types and traits used by the eigensolvers.
//!
//! Vectors are plain slices, operated on through the [`VectorMath`] trait.
//! Operators are either the column major [`Matrix`] type or the sparse
//! [`CscMatrix`] type.  Dense projected eigenvalue problems are solved
//! through the [`SchurEngine`] and [`SymEigenEngine`] types, either natively
//! or through LAPACK when the "lapack" feature is enabled.

mod csc;
mod dense;
mod error_types;
mod floats;
mod math_traits;
mod matrix_traits;
mod vecmath;

pub use csc::*;
pub use dense::*;
pub use error_types::*;
pub use floats::*;
pub use math_traits::*;
pub use matrix_traits::*;
