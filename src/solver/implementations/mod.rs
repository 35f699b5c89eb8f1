//! Built-in eigensolver methods.
//!
//! Each method implements [`EigenMethod`](crate::solver::core::traits::EigenMethod)
//! and is registered in the [`MethodRegistry`](crate::solver::core::MethodRegistry)
//! under the name returned by its `name` function.

#![allow(non_snake_case)]

mod arnoldi;
mod dense;
mod lanczos;

//export flattened
pub use arnoldi::*;
pub use dense::*;
pub use lanczos::*;

use crate::algebra::*;
use crate::solver::core::{EigenSettings, KrylovError, LinearOperator, SpectralTransform};

// Krylov methods need room for at least one unconverged vector, unless
// the subspace can hold the whole space
pub(crate) fn check_subspace<T: FloatT>(
    op: &SpectralTransform<T>,
    settings: &EigenSettings<T>,
) -> Result<(), KrylovError> {
    let n = op.nrows();
    let ncv = settings.ncv_for(n);
    if ncv <= settings.nev && ncv < n {
        return Err(KrylovError::precondition(format!(
            "ncv = {ncv} must be larger than nev = {}",
            settings.nev
        )));
    }
    Ok(())
}
