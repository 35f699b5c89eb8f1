#![allow(non_snake_case)]

use super::basis::Basis;
use super::operator::LinearOperator;
use super::orthog::Orthogonalizer;
use crate::algebra::*;
use crate::solver::core::KrylovError;

/// Which product builds the Krylov sequence
#[derive(Clone, Copy)]
pub enum FactorizationMode<'a, T: FloatT> {
    /// `w = OP*v`
    Direct,
    /// `w = OP'*v`
    Transpose,
    /// `w = G*v` for a user supplied operator `G` in place of `OP`
    Bilinear(&'a dyn LinearOperator<T>),
}

/// Storage for the projection of the operator onto the basis
pub enum Projection<'a, T> {
    /// full upper Hessenberg matrix, at least `m x m`
    Hessenberg(&'a mut Matrix<T>),
    /// symmetric tridiagonal matrix.  Entries are stored relative to the
    /// first extended column `k`, i.e. `alpha[j-k]`, `beta[j-k]`.
    Tridiagonal { alpha: &'a mut [T], beta: &'a mut [T] },
}

/// Result of a call to [`extend_factorization`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorizationOutcome<T> {
    /// number of columns in the factorization, smaller than requested
    /// after a breakdown
    pub m: usize,
    /// norm of the residual vector
    pub beta: T,
    /// an invariant subspace was found
    pub breakdown: bool,
}

fn apply_mode<T: FloatT>(
    op: &dyn LinearOperator<T>,
    mode: FactorizationMode<'_, T>,
    x: &[T],
    y: &mut [T],
) -> Result<(), KrylovError> {
    match mode {
        FactorizationMode::Direct => op.apply(x, y),
        FactorizationMode::Transpose => op.apply_transpose(x, y),
        FactorizationMode::Bilinear(g) => g.apply(x, y),
    }
}

impl<T: FloatT> Projection<'_, T> {
    // store the coefficients h[0..=j] of column j
    fn set_column(&mut self, j: usize, k: usize, h: &[T]) {
        match self {
            Projection::Hessenberg(H) => {
                let col = H.col_slice_mut(j);
                col[0..=j].copy_from(&h[0..=j]);
                col[(j + 1)..].set(T::zero());
            }
            Projection::Tridiagonal { alpha, .. } => {
                alpha[j - k] = h[j];
            }
        }
    }

    // store the norm of the orthogonal component of column j
    fn set_subdiagonal(&mut self, j: usize, k: usize, norm: T) {
        match self {
            Projection::Hessenberg(H) => {
                if j + 1 < H.m {
                    H[(j + 1, j)] = norm;
                }
            }
            Projection::Tridiagonal { beta, .. } => {
                beta[j - k] = norm;
            }
        }
    }
}

/// Extend an Arnoldi (or Lanczos) factorization from `k` to `m` columns.
///
/// On entry columns `[0, k]` of `basis` are orthonormal and the projection
/// holds the first `k` columns.  On exit
/// ```text
/// OP*V[:,0..m] - V[:,0..m]*H[0..m,0..m] = f*e_m'
/// ```
/// with `f` orthogonal to the basis and `beta = ‖f‖`.  `f` is not
/// normalized.
///
/// A breakdown in column `j < m-1` stops the extension with `m = j+1`; `f`
/// then holds the (numerically zero) orthogonal component and `beta` its
/// norm.  Breakdown is not an error.
#[allow(clippy::too_many_arguments)]
pub fn extend_factorization<T: FloatT>(
    op: &dyn LinearOperator<T>,
    mode: FactorizationMode<'_, T>,
    orth: &Orthogonalizer<T>,
    basis: &mut Basis<T>,
    mut proj: Projection<'_, T>,
    f: &mut [T],
    k: usize,
    m: usize,
) -> Result<FactorizationOutcome<T>, KrylovError> {
    let n = basis.n();
    if k >= m || m > basis.capacity() || f.len() != n {
        return Err(KrylovError::precondition(format!(
            "cannot extend factorization from {k} to {m} columns with capacity {}",
            basis.capacity()
        )));
    }
    match &proj {
        Projection::Hessenberg(H) if H.m < m || H.n < m => {
            return Err(KrylovError::precondition("projection matrix is too small"));
        }
        Projection::Tridiagonal { alpha, beta } if alpha.len() < m - k || beta.len() < m - k => {
            return Err(KrylovError::precondition("tridiagonal arrays are too short"));
        }
        _ => {}
    }

    let (l, _) = basis.active();
    let mut w = vec![T::zero(); n];
    let mut h = vec![T::zero(); m];

    for j in k..(m - 1) {
        apply_mode(op, mode, basis.column(j), &mut w)?;
        let res = orth.orthogonalize(basis, j + 1, &mut w, &mut h)?;
        proj.set_column(j, k, &h);

        if res.breakdown {
            f.copy_from(&w);
            basis.set_active(usize::min(l, j + 1), j + 1);
            return Ok(FactorizationOutcome {
                m: j + 1,
                beta: res.norm,
                breakdown: true,
            });
        }
        proj.set_subdiagonal(j, k, res.norm);
        w.scale(res.norm.recip());
        basis.column_mut(j + 1).copy_from(&w);
    }

    // last column gives the residual vector
    apply_mode(op, mode, basis.column(m - 1), f)?;
    let res = orth.orthogonalize(basis, m, f, &mut h)?;
    proj.set_column(m - 1, k, &h);
    if let Projection::Tridiagonal { beta, .. } = &mut proj {
        beta[m - 1 - k] = res.norm;
    }
    basis.set_active(usize::min(l, m), m);

    Ok(FactorizationOutcome {
        m,
        beta: res.norm,
        breakdown: false,
    })
}
