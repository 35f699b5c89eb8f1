#![allow(non_snake_case)]

use super::operator::LinearOperator;
use super::residuals::true_residual;
use super::{ConvergedReason, KrylovError};
use crate::algebra::*;

/// Converged eigenpairs of an eigenproblem.
///
/// Eigenvalues are stored in the order in which they converged, with
/// conjugate pairs in adjacent positions (positive imaginary part first).
/// The eigenvector columns follow the same layout, a pair occupying two
/// columns holding the real and imaginary parts of the vector belonging to
/// the first member.  `perm` lists the storage positions in the order
/// requested by [`Which`](crate::solver::core::Which), and all indexed
/// accessors use that order.
#[derive(Debug, Clone)]
pub struct EigenSolution<T> {
    /// real parts of the eigenvalues
    pub eigr: Vec<T>,
    /// imaginary parts of the eigenvalues
    pub eigi: Vec<T>,
    /// error estimates, as measured by the convergence test
    pub errest: Vec<T>,
    /// storage positions in sorted order
    pub perm: Vec<usize>,
    /// eigenvectors, one column per eigenvalue
    pub vectors: Matrix<T>,
    /// number of converged eigenpairs
    pub nconv: usize,
    /// number of requested eigenpairs
    pub nev: usize,
    /// number of outer iterations
    pub its: u32,
    /// termination reason
    pub reason: ConvergedReason,
    /// factorization size at which an unrecoverable breakdown happened
    pub breakdown_step: Option<usize>,
    /// solve time in seconds
    pub solve_time: f64,
}

impl<T> EigenSolution<T>
where
    T: FloatT,
{
    /// An empty solution with room for `nconv` eigenpairs of size `n`
    pub fn new(n: usize, nconv: usize, nev: usize) -> Self {
        Self {
            eigr: Vec::with_capacity(nconv),
            eigi: Vec::with_capacity(nconv),
            errest: Vec::with_capacity(nconv),
            perm: Vec::new(),
            vectors: Matrix::zeros((n, nconv)),
            nconv,
            nev,
            its: 0,
            reason: ConvergedReason::Unsolved,
            breakdown_step: None,
            solve_time: 0f64,
        }
    }

    /// Append a real eigenpair, or a conjugate pair when `xi` is given.
    ///
    /// `(re, im)` is an eigenvalue of the original problem with eigenvector
    /// `xr + i*xi`.  If `im < 0` the pair is stored through its conjugate so
    /// that the positive imaginary part comes first.
    pub fn push(
        &mut self,
        re: T,
        im: T,
        errest: T,
        xr: &[T],
        xi: Option<&[T]>,
    ) -> Result<(), KrylovError> {
        let j = self.eigr.len();
        let width = if xi.is_some() { 2 } else { 1 };
        if j + width > self.vectors.n || xr.len() != self.vectors.m {
            return Err(KrylovError::precondition(
                "eigenpair does not fit in the solution",
            ));
        }

        self.vectors.col_slice_mut(j).copy_from(xr);
        match xi {
            None => {
                self.eigr.push(re);
                self.eigi.push(T::zero());
                self.errest.push(errest);
            }
            Some(xi) => {
                let col = self.vectors.col_slice_mut(j + 1);
                col.copy_from(xi);
                if im < T::zero() {
                    col.negate();
                }
                let im = T::abs(im);
                self.eigr.extend([re, re]);
                self.eigi.extend([im, -im]);
                self.errest.extend([errest, errest]);
            }
        }
        Ok(())
    }

    /// Number of stored eigenvalues
    pub fn len(&self) -> usize {
        self.eigr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eigr.is_empty()
    }

    /// The `i`th eigenvalue `(re, im)` in sorted order
    pub fn eigenvalue(&self, i: usize) -> (T, T) {
        let j = self.perm[i];
        (self.eigr[j], self.eigi[j])
    }

    /// Real and imaginary parts of the `i`th eigenvector in sorted order
    pub fn eigenvector(&self, i: usize) -> (Vec<T>, Option<Vec<T>>) {
        let j = self.perm[i];
        let im = self.eigi[j];
        if im == T::zero() {
            (self.vectors.col_slice(j).to_vec(), None)
        } else if im > T::zero() {
            (
                self.vectors.col_slice(j).to_vec(),
                Some(self.vectors.col_slice(j + 1).to_vec()),
            )
        } else {
            let mut xi = self.vectors.col_slice(j).to_vec();
            xi.negate();
            (self.vectors.col_slice(j - 1).to_vec(), Some(xi))
        }
    }

    /// Error estimate of the `i`th eigenpair in sorted order
    pub fn error_estimate(&self, i: usize) -> T {
        self.errest[self.perm[i]]
    }

    /// Relative residual `‖Ax - λBx‖ / ‖λx‖` of the `i`th eigenpair in
    /// sorted order, or the absolute residual for a zero eigenvalue
    pub fn relative_error(
        &self,
        i: usize,
        A: &dyn LinearOperator<T>,
        B: Option<&dyn LinearOperator<T>>,
    ) -> Result<T, KrylovError> {
        let (re, im) = self.eigenvalue(i);
        let (xr, xi) = self.eigenvector(i);
        let res = true_residual(A, B, re, im, &xr, xi.as_deref())?;

        let xnorm = match &xi {
            None => xr.norm(),
            Some(xi) => T::hypot(xr.norm(), xi.norm()),
        };
        let scale = T::hypot(re, im) * xnorm;
        if scale > T::zero() {
            Ok(res / scale)
        } else {
            Ok(res)
        }
    }

    /// Turns a short solution into an error
    pub fn check_converged(&self) -> Result<(), KrylovError> {
        if let Some(step) = self.breakdown_step {
            if self.nconv < self.nev {
                return Err(KrylovError::Breakdown { step });
            }
        }
        if self.nconv < self.nev {
            return Err(KrylovError::NonConvergence {
                nconv: self.nconv,
                nev: self.nev,
                its: self.its,
            });
        }
        Ok(())
    }
}
