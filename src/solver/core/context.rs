#![allow(non_snake_case)]

use super::basis::Basis;
use super::callbacks::SolverCallbacks;
use super::operator::LinearOperator;
use super::orthog::Orthogonalizer;
use super::residuals::true_residual;
use super::sorting::{compare_eigenvalues, sort_eigenvalues};
use super::traits::InfoPrint;
use super::{ConvergenceCriterion, EigenInfo, EigenSettings, EigenSolution, KrylovError, SpectralTransform};
use crate::algebra::*;

/// Everything a method needs to know about the problem being solved.
///
/// The context is assembled by the [`EigenSolver`](super::EigenSolver) at
/// the start of each solve and is read only for the methods.
pub struct SolveContext<'a, T: FloatT> {
    /// the operator the Krylov methods work with
    pub op: &'a SpectralTransform<T>,
    pub settings: &'a EigenSettings<T>,
    pub criterion: ConvergenceCriterion<T>,
    /// vectors to build the first basis from
    pub initial: &'a [Vec<T>],
    /// deflation space, kept orthogonal to every basis vector
    pub constraints: &'a [Vec<T>],
    pub(crate) callbacks: &'a SolverCallbacks<EigenInfo<T>>,
}

impl<'a, T> SolveContext<'a, T>
where
    T: FloatT,
{
    /// dimension of the problem
    pub fn n(&self) -> usize {
        self.op.nrows()
    }

    /// dimension of the Krylov subspace
    pub fn ncv(&self) -> usize {
        self.settings.ncv_for(self.n())
    }

    /// restart limit
    pub fn max_it(&self) -> u32 {
        self.settings.max_it_for(self.n(), self.ncv())
    }

    /// The basis is `B`-orthonormal for generalized Hermitian problems
    pub fn uses_B_inner_product(&self) -> bool {
        self.settings.problem_type.is_hermitian() && self.op.is_generalized()
    }

    /// An empty basis with room for `capacity` columns, with the
    /// deflation space installed
    pub fn new_basis(&self, capacity: usize) -> Result<Basis<T>, KrylovError> {
        let B = match self.uses_B_inner_product() {
            true => self.op.B().cloned(),
            false => None,
        };
        let mut basis = Basis::new(self.n(), capacity, B, self.settings.seed);
        basis.set_constraints(self.constraints)?;
        Ok(basis)
    }

    /// Set the first column of `basis` from the initial space, or randomly
    pub fn start_basis(
        &self,
        basis: &mut Basis<T>,
        orth: &Orthogonalizer<T>,
    ) -> Result<(), KrylovError> {
        let ok = match self.initial.first() {
            Some(x) => basis.set_column(0, x, orth)?,
            None => basis.set_random_column(0, orth)?,
        };
        if !ok {
            return Err(KrylovError::precondition(
                "no start vector exists outside of the deflation space",
            ));
        }
        basis.set_active(0, 1);
        Ok(())
    }

    /// Eigenvalue in the form seen by the convergence test.  Shifts are
    /// always undone, other transformations only when true residuals are
    /// requested.
    pub fn test_value(&self, re: T, im: T) -> (T, T) {
        if self.op.is_shift() || self.settings.true_residual {
            self.op.back_transform(re, im)
        } else {
            (re, im)
        }
    }

    /// Order of the Ritz values `(wr, wi)` of the transformed operator by
    /// the requested part of the original spectrum.  Conjugate pairs are
    /// adjacent in the input and stay together in the order given.
    pub fn sort_ritz_values(&self, wr: &[T], wi: &[T]) -> Vec<usize> {
        let n = wr.len();
        let mut groups = Vec::with_capacity(n);
        let mut i = 0;
        while i < n {
            let width = if wi[i] != T::zero() && i + 1 < n { 2 } else { 1 };
            groups.push((i, width));
            i += width;
        }

        let (which, target) = (self.settings.which, self.settings.target);
        groups.sort_by(|a, b| {
            let λa = self.op.back_transform(wr[a.0], wi[a.0]);
            let λb = self.op.back_transform(wr[b.0], wi[b.0]);
            compare_eigenvalues(which, target, λa, λb)
        });
        groups.into_iter().flat_map(|(i, w)| i..i + w).collect()
    }

    /// `‖Ax - λBx‖` for the eigenvalue `(re, im)` of the transformed
    /// operator and its eigenvector `xr + i*xi`
    pub fn true_residual(
        &self,
        re: T,
        im: T,
        xr: &[T],
        xi: Option<&[T]>,
    ) -> Result<T, KrylovError> {
        let (λr, λi) = self.op.back_transform(re, im);
        let A = self.op.A().as_ref();
        let B = self.op.B().map(|B| B.as_ref());
        true_residual(A, B, λr, λi, xr, xi)
    }

    /// Scale an eigenvector (pair) to unit norm, in the `B` norm when the
    /// problem is generalized
    pub fn normalize_vector(&self, xr: &mut [T], xi: Option<&mut [T]>) -> Result<(), KrylovError> {
        let norm = |x: &[T]| -> Result<T, KrylovError> {
            match self.op.B() {
                Some(B) => {
                    let mut Bx = vec![T::zero(); x.len()];
                    B.apply(x, &mut Bx)?;
                    let nrm2 = x.dot(&Bx);
                    // fall back to the 2-norm for indefinite B
                    Ok(if nrm2 > T::zero() { nrm2.sqrt() } else { x.norm() })
                }
                None => Ok(x.norm()),
            }
        };
        let nrm = match &xi {
            None => norm(xr)?,
            Some(xi) => T::hypot(norm(xr)?, norm(xi)?),
        };
        if nrm > T::zero() {
            xr.scale(nrm.recip());
            if let Some(xi) = xi {
                xi.scale(nrm.recip());
            }
        }
        Ok(())
    }

    /// Record progress of outer iteration `its` and print it.  Returns `true`
    /// if the user asked to stop.
    pub fn report(
        &self,
        info: &mut EigenInfo<T>,
        its: u32,
        nconv: usize,
        errest: Option<T>,
        restart: usize,
    ) -> bool {
        info.update(its, nconv, errest.unwrap_or(T::zero()), restart);
        // output failures do not interrupt a solve
        let _ = info.print_status(self.settings);
        self.callbacks.check_termination(info)
    }

    /// Fill in the sort permutation and iteration data of a solution
    pub fn finish(&self, solution: &mut EigenSolution<T>, info: &EigenInfo<T>) {
        solution.perm = sort_eigenvalues(
            self.settings.which,
            self.settings.target,
            &solution.eigr,
            &solution.eigi,
        );
        solution.its = info.iterations;
        solution.reason = info.reason;
    }
}
