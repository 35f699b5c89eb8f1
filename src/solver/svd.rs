//! Singular value decomposition through the symmetric eigensolver.
//!
//! The singular triplets `(σ, u, v)` with `Av = σu` and `A'u = σv` of a
//! rectangular operator are computed from one of two symmetric
//! eigenproblems:
//!
//! * [`SvdMode::Cross`] works with the `n x n` operator `A'A`, whose
//!   eigenvalues are `σ²`.  Cheap, but small singular values lose accuracy.
//! * [`SvdMode::Cyclic`] works with the `(m+n) x (m+n)` operator
//!   `[0 A; A' 0]`, whose eigenvalues are `±σ`.  Only the largest singular
//!   values can be computed this way.

#![allow(non_snake_case)]

use crate::algebra::*;
use crate::io::ConfigurablePrintTarget;
use crate::solver::core::{
    ConvergedReason, EigenProblem, EigenSettings, EigenSolver, KrylovError, LinearOperator,
    MethodConfiguration, OperatorHandle, ProblemType, Which,
};
use std::io::Write;
use std::rc::Rc;

/// Symmetric eigenproblem used to compute the singular values
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum SvdMode {
    #[default]
    Cross,
    Cyclic,
}

/// Part of the singular spectrum to compute
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum SvdWhich {
    #[default]
    Largest,
    Smallest,
}

/// Converged singular triplets, ordered as requested
#[derive(Debug, Clone)]
pub struct SvdSolution<T> {
    /// singular values
    pub sigma: Vec<T>,
    /// left singular vectors, one column per singular value
    pub u: Matrix<T>,
    /// right singular vectors, one column per singular value
    pub v: Matrix<T>,
    /// residual estimates `sqrt(‖Av - σu‖² + ‖A'u - σv‖²)`
    pub errest: Vec<T>,
    pub nconv: usize,
    pub its: u32,
    pub reason: ConvergedReason,
}

impl<T> SvdSolution<T>
where
    T: FloatT,
{
    fn new(m: usize, n: usize, nconv: usize) -> Self {
        Self {
            sigma: Vec::with_capacity(nconv),
            u: Matrix::zeros((m, nconv)),
            v: Matrix::zeros((n, nconv)),
            errest: Vec::with_capacity(nconv),
            nconv,
            its: 0,
            reason: ConvergedReason::Unsolved,
        }
    }

    /// Left singular vector of the `i`th triplet
    pub fn left_vector(&self, i: usize) -> &[T] {
        self.u.col_slice(i)
    }

    /// Right singular vector of the `i`th triplet
    pub fn right_vector(&self, i: usize) -> &[T] {
        self.v.col_slice(i)
    }
}

/// Singular value solver for a rectangular operator.
///
/// The eigensolver underneath is configured from the given settings with
/// the problem type forced to Hermitian and the sort order derived from
/// [`SvdWhich`].  The default "arnoldi" method is replaced by "lanczos".
pub struct SvdSolver<T: FloatT> {
    A: OperatorHandle<T>,
    mode: SvdMode,
    /// eigensolver for the cross product or cyclic operator
    pub eigensolver: EigenSolver<T>,
    pub solution: SvdSolution<T>,
}

impl<T> SvdSolver<T>
where
    T: MethodConfiguration,
{
    pub fn new(
        A: OperatorHandle<T>,
        mode: SvdMode,
        which: SvdWhich,
        mut settings: EigenSettings<T>,
    ) -> Result<Self, KrylovError> {
        if mode == SvdMode::Cyclic && which == SvdWhich::Smallest {
            return Err(KrylovError::precondition(
                "the cyclic operator only gives the largest singular values",
            ));
        }

        settings.problem_type = ProblemType::Hermitian;
        settings.which = match which {
            SvdWhich::Largest => Which::LargestReal,
            SvdWhich::Smallest => Which::SmallestReal,
        };
        if settings.method == "arnoldi" {
            settings.method = "lanczos".to_string();
        }

        let op: OperatorHandle<T> = match mode {
            SvdMode::Cross => Rc::new(CrossOperator { A: A.clone() }),
            SvdMode::Cyclic => Rc::new(CyclicOperator { A: A.clone() }),
        };
        let eigensolver = EigenSolver::new(EigenProblem::new(op), settings)?;
        let solution = SvdSolution::new(A.nrows(), A.ncols(), 0);

        Ok(Self {
            A,
            mode,
            eigensolver,
            solution,
        })
    }

    /// Run the solver.  Results are placed in `self.solution`.
    pub fn solve(&mut self) -> Result<(), KrylovError> {
        self.eigensolver.solve()?;

        let (m, n) = (self.A.nrows(), self.A.ncols());
        let eig = &self.eigensolver.solution;
        let mut solution = SvdSolution::new(m, n, eig.nconv);

        for i in 0..eig.nconv {
            let (λ, _) = eig.eigenvalue(i);
            let (x, _) = eig.eigenvector(i);

            let (σ, u, v) = match self.mode {
                SvdMode::Cross => {
                    let σ = T::max(λ, T::zero()).sqrt();
                    let mut u = vec![T::zero(); m];
                    self.A.apply(&x, &mut u)?;
                    if σ > T::zero() {
                        u.scale(σ.recip());
                    } else {
                        u.normalize();
                    }
                    (σ, u, x)
                }
                SvdMode::Cyclic => {
                    let σ = T::max(λ, T::zero());
                    let mut u = x[0..m].to_vec();
                    let mut v = x[m..].to_vec();
                    u.normalize();
                    v.normalize();
                    (σ, u, v)
                }
            };

            let errest = self.triplet_residual(σ, &u, &v)?;
            solution.sigma.push(σ);
            solution.errest.push(errest);
            solution.u.col_slice_mut(i).copy_from(&u);
            solution.v.col_slice_mut(i).copy_from(&v);
        }
        solution.its = eig.its;
        solution.reason = eig.reason;

        self.solution = solution;
        Ok(())
    }

    // sqrt(‖Av - σu‖² + ‖A'u - σv‖²)
    fn triplet_residual(&self, σ: T, u: &[T], v: &[T]) -> Result<T, KrylovError> {
        let mut r1 = vec![T::zero(); u.len()];
        self.A.apply(v, &mut r1)?;
        r1.axpby(-σ, u, T::one());

        let mut r2 = vec![T::zero(); v.len()];
        self.A.apply_transpose(u, &mut r2)?;
        r2.axpby(-σ, v, T::one());

        Ok(T::hypot(r1.norm(), r2.norm()))
    }
}

impl<T> ConfigurablePrintTarget for SvdSolver<T>
where
    T: FloatT,
{
    fn print_to_stdout(&mut self) {
        self.eigensolver.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.eigensolver.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.eigensolver.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.eigensolver.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.eigensolver.get_print_buffer()
    }
    fn print_target(&mut self) -> &dyn Write {
        self.eigensolver.print_target()
    }
}

// A'A
struct CrossOperator<T: FloatT> {
    A: OperatorHandle<T>,
}

impl<T: FloatT> LinearOperator<T> for CrossOperator<T> {
    fn nrows(&self) -> usize {
        self.A.ncols()
    }
    fn ncols(&self) -> usize {
        self.A.ncols()
    }

    fn apply(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        let mut w = vec![T::zero(); self.A.nrows()];
        self.A.apply(x, &mut w)?;
        self.A.apply_transpose(&w, y)
    }

    fn apply_transpose(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        self.apply(x, y)
    }
}

// [0 A; A' 0]
struct CyclicOperator<T: FloatT> {
    A: OperatorHandle<T>,
}

impl<T: FloatT> LinearOperator<T> for CyclicOperator<T> {
    fn nrows(&self) -> usize {
        self.A.nrows() + self.A.ncols()
    }
    fn ncols(&self) -> usize {
        self.nrows()
    }

    fn apply(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        let m = self.A.nrows();
        if x.len() != self.ncols() || y.len() != self.nrows() {
            return Err(KrylovError::precondition(
                "vector length does not match the cyclic operator",
            ));
        }
        let (xu, xv) = x.split_at(m);
        let (yu, yv) = y.split_at_mut(m);
        self.A.apply(xv, yu)?;
        self.A.apply_transpose(xu, yv)
    }

    fn apply_transpose(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        self.apply(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::core::{EigenSettingsBuilder, ErrorKind};

    // 9 x 6 upper bidiagonal matrix, padded with zero rows
    fn bidiagonal() -> Matrix<f64> {
        let mut A = Matrix::zeros((9, 6));
        for j in 0..6 {
            A[(j, j)] = (j + 1) as f64;
            if j + 1 < 6 {
                A[(j, j + 1)] = 0.5;
            }
        }
        A
    }

    // singular values of A in ascending order, from the eigenvalues of A'A
    fn exact_singular_values(A: &Matrix<f64>) -> Vec<f64> {
        let mut AtA = Matrix::zeros((A.n, A.n));
        AtA.mul(&A.t(), A, 1.0, 0.0);
        let mut eng = SymEigenEngine::new(A.n);
        eng.eigen(&AtA).unwrap();
        eng.λ.iter().map(|λ| λ.max(0.0).sqrt()).collect()
    }

    #[test]
    fn test_svd_cross_largest() {
        let A = bidiagonal();
        let exact = exact_singular_values(&A);
        let settings = EigenSettingsBuilder::<f64>::default()
            .nev(2)
            .tol(1e-12)
            .build()
            .unwrap();
        let mut svd = SvdSolver::new(Rc::new(A), SvdMode::Cross, SvdWhich::Largest, settings).unwrap();
        assert_eq!(svd.eigensolver.method_name(), "lanczos");
        svd.solve().unwrap();

        let sol = &svd.solution;
        assert!(sol.reason.is_converged());
        assert!((sol.sigma[0] - exact[5]).abs() < 1e-10);
        assert!((sol.sigma[1] - exact[4]).abs() < 1e-10);
        for i in 0..2 {
            assert!(sol.errest[i] < 1e-8);
            assert!((sol.left_vector(i).norm() - 1.0).abs() < 1e-10);
            assert!((sol.right_vector(i).norm() - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_svd_cross_smallest() {
        let A = bidiagonal();
        let exact = exact_singular_values(&A);
        let settings = EigenSettingsBuilder::<f64>::default()
            .nev(1)
            .tol(1e-12)
            .build()
            .unwrap();
        let mut svd = SvdSolver::new(Rc::new(A), SvdMode::Cross, SvdWhich::Smallest, settings).unwrap();
        svd.solve().unwrap();
        assert!((svd.solution.sigma[0] - exact[0]).abs() < 1e-8);
    }

    #[test]
    fn test_svd_cyclic() {
        let A = bidiagonal();
        let exact = exact_singular_values(&A);
        let settings = EigenSettingsBuilder::<f64>::default()
            .nev(2)
            .tol(1e-12)
            .build()
            .unwrap();
        let mut svd = SvdSolver::new(Rc::new(A.clone()), SvdMode::Cyclic, SvdWhich::Largest, settings).unwrap();
        svd.solve().unwrap();

        let sol = &svd.solution;
        assert!((sol.sigma[0] - exact[5]).abs() < 1e-10);
        assert!((sol.sigma[1] - exact[4]).abs() < 1e-10);
        assert!(sol.errest[0] < 1e-8);

        let settings = EigenSettings::default();
        let err = SvdSolver::new(Rc::new(A), SvdMode::Cyclic, SvdWhich::Smallest, settings)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
    }
}
