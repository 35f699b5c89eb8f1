#![allow(non_snake_case)]

use crate::algebra::*;

mod hessenberg;
mod schur;
mod tridiag;
pub use schur::quasi_triangular_eigenvalues;
pub(crate) use schur::{cdiv, clean_quasi_triangular};

cfg_if::cfg_if! {
    if #[cfg(feature = "lapack")] {
        mod lapack;
        use self::lapack::*;
    }
}

/// Real Schur factorization of a general square matrix
pub trait FactorSchur {
    type T;
    /// computes `A = U*S*U'` with `S` quasi upper triangular
    fn schur(&mut self, A: &Matrix<Self::T>) -> Result<(), DenseFactorizationError>;
}

/// Full eigendecomposition of a symmetric matrix
pub trait FactorSymEigen {
    type T;
    /// computes `A = V*diag(λ)*V'` with `λ` ascending
    fn eigen(&mut self, A: &Matrix<Self::T>) -> Result<(), DenseFactorizationError>;
}

/// Workspace and result of a real Schur factorization.
///
/// Conjugate pairs of eigenvalues occupy adjacent positions of `wr`/`wi`
/// with the positive imaginary part first, matching the 2x2 blocks on the
/// diagonal of `S`.
#[derive(Debug, Clone)]
pub struct SchurEngine<T> {
    /// real parts of the eigenvalues, in Schur order
    pub wr: Vec<T>,
    /// imaginary parts of the eigenvalues, in Schur order
    pub wi: Vec<T>,
    /// quasi upper triangular Schur factor
    pub S: Matrix<T>,
    /// orthogonal Schur vectors
    pub U: Matrix<T>,

    #[cfg(feature = "lapack")]
    blas: SchurBlasWorkVectors<T>,
}

impl<T> SchurEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        Self {
            wr: vec![T::zero(); n],
            wi: vec![T::zero(); n],
            S: Matrix::zeros((n, n)),
            U: Matrix::zeros((n, n)),
            #[cfg(feature = "lapack")]
            blas: SchurBlasWorkVectors::new(n),
        }
    }

    pub fn n(&self) -> usize {
        self.wr.len()
    }

    fn resize(&mut self, n: usize) {
        if n != self.n() {
            *self = Self::new(n);
        }
    }

    /// Unit norm eigenvector for the eigenvalue at Schur position `i`, in
    /// the coordinates of the factored matrix.  For a member of a conjugate
    /// pair the real and imaginary parts are returned, normalized jointly,
    /// for the eigenvalue `wr[i] + i*wi[i]`.
    pub fn eigenvector(&self, i: usize) -> Result<(Vec<T>, Option<Vec<T>>), DenseFactorizationError> {
        let (yr, yi) = quasi_triangular_eigenvector(&self.S, &self.wr, &self.wi, i)?;
        let n = self.n();
        let mut xr = vec![T::zero(); n];
        self.U.gemv(&mut xr, &yr, T::one(), T::zero());

        match yi {
            None => {
                xr.normalize();
                Ok((xr, None))
            }
            Some(yi) => {
                let mut xi = vec![T::zero(); n];
                self.U.gemv(&mut xi, &yi, T::one(), T::zero());
                let nrm = T::hypot(xr.norm(), xi.norm());
                if nrm > T::zero() {
                    xr.scale(nrm.recip());
                    xi.scale(nrm.recip());
                }
                Ok((xr, Some(xi)))
            }
        }
    }
}

impl<T> FactorSchur for SchurEngine<T>
where
    T: FloatT,
{
    type T = T;
    fn schur(&mut self, A: &Matrix<T>) -> Result<(), DenseFactorizationError> {
        if !A.is_square() {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        self.resize(A.nrows());

        cfg_if::cfg_if! {
            if #[cfg(feature = "lapack")] {
                lapack_schur(A, &mut self.S, &mut self.U, &mut self.wr, &mut self.wi, &mut self.blas)
            } else {
                schur::native_schur(A, &mut self.S, &mut self.U, &mut self.wr, &mut self.wi)
            }
        }
    }
}

/// Workspace and result of a symmetric eigendecomposition
#[derive(Debug, Clone)]
pub struct SymEigenEngine<T> {
    /// eigenvalues in ascending order
    pub λ: Vec<T>,
    /// orthonormal eigenvectors
    pub V: Matrix<T>,

    #[cfg(feature = "lapack")]
    blas: EigBlasWorkVectors<T>,
}

impl<T> SymEigenEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        Self {
            λ: vec![T::zero(); n],
            V: Matrix::zeros((n, n)),
            #[cfg(feature = "lapack")]
            blas: EigBlasWorkVectors::new(n),
        }
    }

    pub fn n(&self) -> usize {
        self.λ.len()
    }
}

impl<T> FactorSymEigen for SymEigenEngine<T>
where
    T: FloatT,
{
    type T = T;
    fn eigen(&mut self, A: &Matrix<T>) -> Result<(), DenseFactorizationError> {
        if !A.is_square() {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        if A.nrows() != self.n() {
            *self = Self::new(A.nrows());
        }
        self.V.data.copy_from(&A.data);

        cfg_if::cfg_if! {
            if #[cfg(feature = "lapack")] {
                lapack_symeigen(&mut self.V, &mut self.λ, &mut self.blas)
            } else {
                tridiag::native_symeigen(&mut self.V, &mut self.λ)
            }
        }
    }
}

/// Eigenvector of a quasi upper triangular matrix for the eigenvalue at
/// position `i`, by back substitution.  `wr`/`wi` must be consistent with
/// the diagonal blocks of `S`.  For either member of a conjugate pair the
/// real and imaginary parts are returned for the eigenvalue
/// `wr[i] + i*wi[i]`.  The result is not normalized.
pub fn quasi_triangular_eigenvector<T: FloatT>(
    S: &Matrix<T>,
    wr: &[T],
    wi: &[T],
    i: usize,
) -> Result<(Vec<T>, Option<Vec<T>>), DenseFactorizationError> {
    if i >= wi.len() {
        return Err(DenseFactorizationError::IncompatibleDimension);
    }
    if wi[i] < T::zero() && i > 0 {
        // second member, conjugate of the first
        let (re, im) = schur::hqr_backsub(S, wr, wi, i - 1)?;
        let im = im.map(|mut v| {
            v.negate();
            v
        });
        Ok((re, im))
    } else {
        schur::hqr_backsub(S, wr, wi, i)
    }
}
