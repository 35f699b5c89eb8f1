#![allow(non_snake_case)]

use super::operator::LinearOperator;
use crate::algebra::*;
use crate::solver::core::KrylovError;
use std::ops::Range;

/// Ritz vector in the coordinates of the projection, `x = U*y` for the
/// eigenvector `y` of the quasi-triangular `S` at position `i`.  The pair
/// `(xr, xi)` has unit norm jointly.
pub(crate) fn projected_ritz_vector<T: FloatT>(
    S: &Matrix<T>,
    U: &Matrix<T>,
    wr: &[T],
    wi: &[T],
    i: usize,
) -> Result<(Vec<T>, Option<Vec<T>>), KrylovError> {
    if U.n != S.m || S.n != S.m || wr.len() != S.m || wi.len() != S.m || i >= S.m {
        return Err(KrylovError::precondition(format!(
            "Ritz vector {} of a {}x{} Schur form with {} Schur vectors",
            i, S.m, S.n, U.n
        )));
    }
    let (yr, yi) = quasi_triangular_eigenvector(S, wr, wi, i)?;

    let mut xr = vec![T::zero(); U.m];
    U.gemv(&mut xr, &yr, T::one(), T::zero());
    let mut xi = yi.map(|yi| {
        let mut xi = vec![T::zero(); U.m];
        U.gemv(&mut xi, &yi, T::one(), T::zero());
        xi
    });

    let nrm = match &xi {
        None => xr.norm(),
        Some(xi) => T::hypot(xr.norm(), xi.norm()),
    };
    if nrm > T::zero() {
        xr.scale(nrm.recip());
        if let Some(xi) = xi.as_mut() {
            xi.scale(nrm.recip());
        }
    }
    Ok((xr, xi))
}

/// Residual norm estimate `beta*|x[m-1]|` of the Ritz pair at position `i`
/// of the Schur form `S` with vectors `U`.  For a conjugate pair the
/// modulus of the complex last entry is used.
pub fn arnoldi_residual<T: FloatT>(
    S: &Matrix<T>,
    U: &Matrix<T>,
    wr: &[T],
    wi: &[T],
    beta: T,
    i: usize,
) -> Result<T, KrylovError> {
    let (xr, xi) = projected_ritz_vector(S, U, wr, wi, i)?;
    let last = U.m - 1;
    let res = match xi {
        None => T::abs(xr[last]),
        Some(xi) => T::hypot(xr[last], xi[last]),
    };
    Ok(beta * res)
}

/// Residual estimates for the positions in `range`, scaled by the
/// correction factor `corrf`.  Both members of a conjugate pair receive
/// the same estimate, also when `range` starts at the second member or
/// ends at the first.
///
/// `corrf` is one for Ritz extraction.  After a harmonic translation of
/// the factorization it is the growth `γ` of the residual vector.
pub fn estimate_residuals<T: FloatT>(
    S: &Matrix<T>,
    U: &Matrix<T>,
    wr: &[T],
    wi: &[T],
    beta: T,
    range: Range<usize>,
    corrf: T,
) -> Result<Vec<T>, KrylovError> {
    let mut out = Vec::with_capacity(range.len());
    let mut i = range.start;
    while i < range.end {
        let res = arnoldi_residual(S, U, wr, wi, beta, i)? * corrf;
        out.push(res);
        if wi[i] > T::zero() && i + 1 < wr.len() {
            if i + 1 < range.end {
                out.push(res);
            }
            i += 1;
        }
        i += 1;
    }
    Ok(out)
}

/// Residual estimates `beta*|Q[m-1, i]|` for a symmetric projection with
/// orthonormal eigenvectors `Q`
pub fn lanczos_residuals<T: FloatT>(Q: &Matrix<T>, beta: T, range: Range<usize>) -> Vec<T> {
    let last = Q.m - 1;
    range.map(|i| beta * T::abs(Q[(last, i)])).collect()
}

/// Explicit residual `‖Ax - λBx‖` of the approximate eigenpair
/// `(re + i*im, xr + i*xi)` of the original problem
pub fn true_residual<T: FloatT>(
    A: &dyn LinearOperator<T>,
    B: Option<&dyn LinearOperator<T>>,
    re: T,
    im: T,
    xr: &[T],
    xi: Option<&[T]>,
) -> Result<T, KrylovError> {
    let n = xr.len();
    let apply_B = |x: &[T], y: &mut [T]| -> Result<(), KrylovError> {
        match B {
            Some(B) => B.apply(x, y),
            None => {
                y.copy_from(x);
                Ok(())
            }
        }
    };

    let mut r = vec![T::zero(); n];
    let mut Bx = vec![T::zero(); n];
    A.apply(xr, &mut r)?;
    apply_B(xr, &mut Bx)?;
    r.axpby(-re, &Bx, T::one());

    match xi {
        None => Ok(r.norm()),
        Some(xi) => {
            let mut s = vec![T::zero(); n];
            let mut Bxi = vec![T::zero(); n];
            A.apply(xi, &mut s)?;
            apply_B(xi, &mut Bxi)?;
            r.axpby(im, &Bxi, T::one());
            s.axpby(-re, &Bxi, T::one());
            s.axpby(-im, &Bx, T::one());
            Ok(T::hypot(r.norm(), s.norm()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangular_residuals() {
        let S = Matrix::<f64>::from(&[
            [1., 2., 3.], //
            [0., 4., 5.], //
            [0., 0., 6.], //
        ]);
        let U = Matrix::identity(3);
        let wr = [1., 4., 6.];
        let wi = [0.; 3];

        let res = estimate_residuals(&S, &U, &wr, &wi, 2., 0..3, 1.).unwrap();
        assert!(res[0].abs() < 1e-15);
        // y = [1.6, 2.5, 1] for λ = 6
        assert!(f64::abs(res[2] - 2. / f64::sqrt(9.81)) < 1e-14);

        let scaled = estimate_residuals(&S, &U, &wr, &wi, 2., 2..3, 0.5).unwrap();
        assert_eq!(scaled.len(), 1);
        assert!(f64::abs(scaled[0] - res[2] * 0.5) < 1e-15);
    }

    #[test]
    fn test_pair_residuals() {
        let S = Matrix::<f64>::from(&[
            [0., 1.],  //
            [-1., 0.], //
        ]);
        let U = Matrix::identity(2);
        let wr = [0., 0.];
        let wi = [1., -1.];

        let res = estimate_residuals(&S, &U, &wr, &wi, 1., 0..2, 1.).unwrap();
        assert_eq!(res[0].to_bits(), res[1].to_bits());
        assert!(f64::abs(res[0] - std::f64::consts::FRAC_1_SQRT_2) < 1e-15);

        // second member on its own
        let r1 = arnoldi_residual(&S, &U, &wr, &wi, 1., 1).unwrap();
        assert_eq!(r1.to_bits(), res[0].to_bits());

        // a range ending inside the pair
        let head = estimate_residuals(&S, &U, &wr, &wi, 1., 0..1, 2.).unwrap();
        assert_eq!(head, [2. * res[0]]);
        let tail = estimate_residuals(&S, &U, &wr, &wi, 1., 1..2, 1.).unwrap();
        assert_eq!(tail[0].to_bits(), res[1].to_bits());
    }

    #[test]
    fn test_mismatched_schur_form() {
        let S = Matrix::<f64>::identity(3);
        let U = Matrix::<f64>::identity(2);
        let w = [1.; 3];
        let err = arnoldi_residual(&S, &U, &w, &[0.; 3], 1., 0).unwrap_err();
        assert!(matches!(err, KrylovError::PreconditionViolation(_)));

        let U = Matrix::<f64>::identity(3);
        assert!(arnoldi_residual(&S, &U, &w, &[0.; 3], 1., 3).is_err());
        assert!(estimate_residuals(&S, &U, &w, &[0.; 2], 1., 0..3, 1.).is_err());
    }

    #[test]
    fn test_true_residual() {
        // rotation generator with eigenpair (i, [1, i])
        let A = Matrix::<f64>::from(&[
            [0., 1.],  //
            [-1., 0.], //
        ]);
        let res = true_residual(&A, None, 0., 1., &[1., 0.], Some(&[0., 1.][..])).unwrap();
        assert!(res < 1e-15);

        let D = Matrix::<f64>::diagonal(&[2., 3.]);
        let res = true_residual(&D, None, 2., 0., &[1., 0.], None).unwrap();
        assert_eq!(res, 0.);
        let res = true_residual(&D, None, 2., 0., &[0., 1.], None).unwrap();
        assert_eq!(res, 1.);

        let B = Matrix::<f64>::diagonal(&[1., 3.]);
        let res = true_residual(&D, Some(&B as &dyn LinearOperator<f64>), 1., 0., &[0., 1.], None).unwrap();
        assert_eq!(res, 0.);
    }
}
