//! Polynomial eigenproblems through linearization.
//!
//! The eigenpairs `(λ, x)` of the matrix polynomial
//!
//! ```text
//! P(λ) = A₀ + λA₁ + ... + λᵈAᵈ,    P(λ)x = 0
//! ```
//!
//! are computed from the `dn x dn` generalized problem `Cz = λBz` of the
//! first companion form,
//!
//! ```text
//!     [  0    I   ...    0  ]        [ I            ]
//! C = [  :        ...    :  ]    B = [    ...       ]
//!     [  0    0   ...    I  ]        [        I     ]
//!     [ -A₀  -A₁  ... -Aᵈ⁻¹ ]        [          Aᵈ  ]
//! ```
//!
//! with `z = [x; λx; ...; λᵈ⁻¹x]`.  The linearized problem is handed to an
//! [`EigenSolver`] and `x` is read back from the first block of `z` when
//! `|λ| ≤ 1` and from the last block otherwise.
//!
//! A singular leading coefficient `Aᵈ` gives infinite eigenvalues and an
//! unusable `Shift` transformation, so such problems need a
//! [`TransformKind::ShiftInvert`] around the wanted eigenvalues.

#![allow(non_snake_case)]

use crate::algebra::*;
use crate::io::ConfigurablePrintTarget;
use crate::solver::core::{
    EigenProblem, EigenSettings, EigenSolution, EigenSolver, KrylovError, LinearOperator,
    MethodConfiguration, OperatorHandle, ProblemType, TransformKind,
};
use std::io::Write;
use std::rc::Rc;

/// How the residual `‖P(λ)x‖` of a computed eigenpair is scaled
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum PolynomialError {
    /// `‖P(λ)x‖`
    Absolute,
    /// `‖P(λ)x‖ / |λ|`
    Relative,
    /// `‖P(λ)x‖ / Σ‖Aⱼ‖|λ|ʲ`, needs the infinity norm of every coefficient
    #[default]
    Backward,
}

/// Eigensolver for the matrix polynomial with the given coefficients.
///
/// The eigenpairs land in `solution` using the layout of [`EigenSolution`],
/// with unit eigenvectors of length `n` and the error estimates replaced
/// by the error of type `error_type` measured on the polynomial.
pub struct PolynomialSolver<T: FloatT> {
    coeffs: Vec<OperatorHandle<T>>,
    /// scaling of the reported errors
    pub error_type: PolynomialError,
    /// eigensolver for the linearized problem
    pub eigensolver: EigenSolver<T>,
    pub solution: EigenSolution<T>,
}

impl<T> PolynomialSolver<T>
where
    T: MethodConfiguration,
{
    /// `coeffs[j]` multiplies `λʲ`.  The linearization is always treated as
    /// non-Hermitian, other settings are passed to the eigensolver.
    pub fn new(
        coeffs: Vec<OperatorHandle<T>>,
        transform: TransformKind<T>,
        mut settings: EigenSettings<T>,
    ) -> Result<Self, KrylovError> {
        if coeffs.len() < 2 {
            return Err(KrylovError::precondition(
                "a matrix polynomial needs at least two coefficients",
            ));
        }
        let n = coeffs[0].nrows();
        if coeffs.iter().any(|A| A.nrows() != n || A.ncols() != n) {
            return Err(KrylovError::precondition(format!(
                "polynomial coefficients must all be square of size {n}"
            )));
        }
        settings.problem_type = ProblemType::NonHermitian;

        let d = coeffs.len() - 1;
        let C: OperatorHandle<T> = Rc::new(Companion {
            coeffs: coeffs.clone(),
            n,
        });
        let B: OperatorHandle<T> = Rc::new(CompanionLeading {
            Ad: coeffs[d].clone(),
            n,
            d,
        });
        let problem = EigenProblem::new(C).with_B(B).with_transform(transform);
        let eigensolver = EigenSolver::new(problem, settings)?;
        let nev = eigensolver.settings.nev;

        Ok(Self {
            coeffs,
            error_type: PolynomialError::default(),
            eigensolver,
            solution: EigenSolution::new(n, 0, nev),
        })
    }

    /// degree of the polynomial
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// Run the solver.  Results are placed in `self.solution`.
    pub fn solve(&mut self) -> Result<(), KrylovError> {
        self.eigensolver.solve()?;

        let n = self.coeffs[0].nrows();
        let d = self.degree();
        let norms = match self.error_type {
            PolynomialError::Backward => Some(self.coefficient_norms()?),
            _ => None,
        };

        let eig = &self.eigensolver.solution;
        let mut solution = EigenSolution::new(n, eig.len(), eig.nev);

        let mut j = 0;
        while j < eig.len() {
            let (re, im) = (eig.eigr[j], eig.eigi[j]);
            // the vector is read from the block with the largest weight
            let block = if T::hypot(re, im) > T::one() { d - 1 } else { 0 };
            let rows = block * n..(block + 1) * n;

            let mut xr = eig.vectors.col_slice(j)[rows.clone()].to_vec();
            let mut xi = (im > T::zero() && j + 1 < eig.len())
                .then(|| eig.vectors.col_slice(j + 1)[rows].to_vec());
            normalize_pair(&mut xr, xi.as_deref_mut());

            let res = self.residual_norm(re, im, &xr, xi.as_deref())?;
            let error = match (self.error_type, &norms) {
                (PolynomialError::Relative, _) if T::hypot(re, im) > T::zero() => res / T::hypot(re, im),
                (PolynomialError::Backward, Some(norms)) => {
                    let modulus = T::hypot(re, im);
                    let z = norms.iter().rev().fold(T::zero(), |z, &nrm| z * modulus + nrm);
                    if z > T::zero() {
                        res / z
                    } else {
                        res
                    }
                }
                _ => res,
            };

            solution.push(re, im, error, &xr, xi.as_deref())?;
            j += if xi.is_some() { 2 } else { 1 };
        }

        solution.perm = eig.perm.clone();
        solution.nconv = eig.nconv;
        solution.its = eig.its;
        solution.reason = eig.reason;
        solution.breakdown_step = eig.breakdown_step;
        solution.solve_time = eig.solve_time;

        self.solution = solution;
        Ok(())
    }

    /// `‖P(λ)x‖` for `λ = re + i*im` and `x = xr + i*xi`, by Horner's rule
    pub fn residual_norm(&self, re: T, im: T, xr: &[T], xi: Option<&[T]>) -> Result<T, KrylovError> {
        let n = xr.len();
        let mut yr = vec![T::zero(); n];
        let mut yi = vec![T::zero(); n];
        let mut wr = vec![T::zero(); n];
        let mut wi = vec![T::zero(); n];

        for (j, A) in self.coeffs.iter().enumerate().rev() {
            if j + 1 < self.coeffs.len() {
                // y = λ*y
                let tr = yr.clone();
                yr.axpby(-im, &yi, re);
                yi.axpby(im, &tr, re);
            }
            A.apply(xr, &mut wr)?;
            yr.axpby(T::one(), &wr, T::one());
            if let Some(xi) = xi {
                A.apply(xi, &mut wi)?;
                yi.axpby(T::one(), &wi, T::one());
            }
        }
        Ok(T::hypot(yr.norm(), yi.norm()))
    }

    fn coefficient_norms(&self) -> Result<Vec<T>, KrylovError> {
        self.coeffs
            .iter()
            .map(|A| {
                A.norm_inf().ok_or_else(|| {
                    KrylovError::precondition("backward errors need the norm of every coefficient")
                })
            })
            .collect()
    }
}

fn normalize_pair<T: FloatT>(xr: &mut [T], xi: Option<&mut [T]>) {
    let nrm = match &xi {
        None => xr.norm(),
        Some(xi) => T::hypot(xr.norm(), xi.norm()),
    };
    if nrm > T::zero() {
        xr.scale(nrm.recip());
        if let Some(xi) = xi {
            xi.scale(nrm.recip());
        }
    }
}

impl<T> ConfigurablePrintTarget for PolynomialSolver<T>
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

// block companion matrix C, with identity blocks above the diagonal and
// the last block row [-A₀ ... -Aᵈ⁻¹]
struct Companion<T: FloatT> {
    coeffs: Vec<OperatorHandle<T>>,
    n: usize,
}

impl<T: FloatT> Companion<T> {
    fn blocks(&self) -> usize {
        self.coeffs.len() - 1
    }

    fn check(&self, x: &[T], y: &[T]) -> Result<(), KrylovError> {
        let N = self.n * self.blocks();
        if x.len() != N || y.len() != N {
            return Err(KrylovError::precondition(
                "vector length does not match the companion operator",
            ));
        }
        Ok(())
    }
}

impl<T: FloatT> LinearOperator<T> for Companion<T> {
    fn nrows(&self) -> usize {
        self.n * self.blocks()
    }
    fn ncols(&self) -> usize {
        self.nrows()
    }

    fn apply(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        self.check(x, y)?;
        let (n, d) = (self.n, self.blocks());
        y[0..(d - 1) * n].copy_from(&x[n..]);

        let last = &mut y[(d - 1) * n..];
        last.set(T::zero());
        let mut w = vec![T::zero(); n];
        for (j, xj) in x.chunks_exact(n).enumerate() {
            self.coeffs[j].apply(xj, &mut w)?;
            last.axpby(-T::one(), &w, T::one());
        }
        Ok(())
    }

    fn apply_transpose(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        self.check(x, y)?;
        let (n, d) = (self.n, self.blocks());
        let xlast = &x[(d - 1) * n..];
        let mut w = vec![T::zero(); n];
        for (j, yj) in y.chunks_exact_mut(n).enumerate() {
            self.coeffs[j].apply_transpose(xlast, &mut w)?;
            if j > 0 {
                yj.copy_from(&x[(j - 1) * n..j * n]);
            } else {
                yj.set(T::zero());
            }
            yj.axpby(-T::one(), &w, T::one());
        }
        Ok(())
    }
}

// block diagonal diag(I, ..., I, Aᵈ)
struct CompanionLeading<T: FloatT> {
    Ad: OperatorHandle<T>,
    n: usize,
    d: usize,
}

impl<T: FloatT> CompanionLeading<T> {
    fn apply_with(
        &self,
        x: &[T],
        y: &mut [T],
        last: impl Fn(&[T], &mut [T]) -> Result<(), KrylovError>,
    ) -> Result<(), KrylovError> {
        let split = (self.d - 1) * self.n;
        if x.len() != self.nrows() || y.len() != self.nrows() {
            return Err(KrylovError::precondition(
                "vector length does not match the companion operator",
            ));
        }
        y[0..split].copy_from(&x[0..split]);
        last(&x[split..], &mut y[split..])
    }
}

impl<T: FloatT> LinearOperator<T> for CompanionLeading<T> {
    fn nrows(&self) -> usize {
        self.n * self.d
    }
    fn ncols(&self) -> usize {
        self.nrows()
    }

    fn apply(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        self.apply_with(x, y, |x, y| self.Ad.apply(x, y))
    }

    fn apply_transpose(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        self.apply_with(x, y, |x, y| self.Ad.apply_transpose(x, y))
    }

    fn norm_inf(&self) -> Option<T> {
        self.Ad.norm_inf().map(|nrm| T::max(nrm, T::one()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::core::{EigenSettingsBuilder, ErrorKind, Which};

    fn handle(A: Matrix<f64>) -> OperatorHandle<f64> {
        Rc::new(A)
    }

    #[test]
    fn test_companion_operators() {
        let A0 = Matrix::<f64>::from(&[
            [1., 2.], //
            [3., 4.], //
        ]);
        let A1 = Matrix::<f64>::from(&[
            [0., 1.],  //
            [-1., 0.], //
        ]);
        let A2 = Matrix::<f64>::diagonal(&[2., 5.]);
        let coeffs = vec![handle(A0), handle(A1), handle(A2.clone())];
        let C = Companion {
            coeffs: coeffs.clone(),
            n: 2,
        };
        let B = CompanionLeading {
            Ad: handle(A2),
            n: 2,
            d: 2,
        };

        let x = [1., 2., 3., 4.];
        let mut y = vec![0.; 4];
        C.apply(&x, &mut y).unwrap();
        // [x₁; -A₀x₀ - A₁x₁]
        assert_eq!(y, [3., 4., -5. - 4., -11. + 3.]);
        B.apply(&x, &mut y).unwrap();
        assert_eq!(y, [1., 2., 6., 20.]);

        // transposes against the explicit matrices
        for op in [&C as &dyn LinearOperator<f64>, &B] {
            let M = crate::solver::core::explicit_operator(op).unwrap();
            let mut Mt = vec![0.; 4];
            let mut w = vec![0.; 4];
            for j in 0..4 {
                let mut e = [0.; 4];
                e[j] = 1.;
                op.apply_transpose(&e, &mut w).unwrap();
                for i in 0..4 {
                    Mt[i] = M[(j, i)];
                }
                assert_eq!(w, Mt);
            }
        }
    }

    #[test]
    fn test_undamped_quadratic() {
        // λ²x + Kx = 0 has eigenvalues ±i, ±2i, ±3i, ±4i
        let K = Matrix::<f64>::diagonal(&[1., 4., 9., 16.]);
        let coeffs = vec![handle(K), handle(Matrix::zeros((4, 4))), handle(Matrix::identity(4))];
        let settings = EigenSettingsBuilder::<f64>::default()
            .nev(2)
            .ncv(8)
            .which(Which::LargestImaginary)
            .tol(1e-12)
            .build()
            .unwrap();
        let mut solver = PolynomialSolver::new(coeffs, TransformKind::default(), settings).unwrap();
        assert_eq!(solver.degree(), 2);
        solver.solve().unwrap();

        let sol = &solver.solution;
        assert!(sol.reason.is_converged());
        let (re0, im0) = sol.eigenvalue(0);
        let (re1, im1) = sol.eigenvalue(1);
        assert!(re0.abs() < 1e-10 && (im0 - 4.).abs() < 1e-10);
        assert_eq!((re0, im0), (re1, -im1));

        // the eigenvector is e₃ up to a complex scaling
        let (xr, xi) = sol.eigenvector(0);
        let xi = xi.unwrap();
        assert!((xr[3].hypot(xi[3]) - 1.).abs() < 1e-10);
        for i in 0..2 {
            assert!(sol.error_estimate(i) < 1e-10);
            let (re, im) = sol.eigenvalue(i);
            let (xr, xi) = sol.eigenvector(i);
            assert!(solver.residual_norm(re, im, &xr, xi.as_deref()).unwrap() < 1e-10);
        }
    }

    #[test]
    fn test_shift_invert_quadratic() {
        // (λ²I + λC + K)x = 0 with a damped diagonal system
        let n = 6;
        let c: Vec<f64> = (0..n).map(|i| 0.1 * (i + 1) as f64).collect();
        let k: Vec<f64> = (0..n).map(|i| -(((i + 1) * (i + 1)) as f64)).collect();
        let coeffs = vec![
            handle(Matrix::diagonal(&k)),
            handle(Matrix::diagonal(&c)),
            handle(Matrix::identity(n)),
        ];
        // roots of λ² + cλ + k, the one close to 2 belongs to i = 1
        let exact = (-c[1] + f64::sqrt(c[1] * c[1] - 4. * k[1])) / 2.;

        let settings = EigenSettingsBuilder::<f64>::default()
            .nev(1)
            .which(Which::TargetMagnitude)
            .target(1.8)
            .tol(1e-12)
            .build()
            .unwrap();
        let mut solver =
            PolynomialSolver::new(coeffs, TransformKind::ShiftInvert { sigma: 1.8 }, settings).unwrap();
        solver.solve().unwrap();

        let sol = &solver.solution;
        assert!(sol.nconv >= 1);
        let (re, im) = sol.eigenvalue(0);
        assert!((re - exact).abs() < 1e-10);
        assert_eq!(im, 0.);
        let (x, _) = sol.eigenvector(0);
        assert!((x[1].abs() - 1.).abs() < 1e-10);
        assert!(sol.error_estimate(0) < 1e-12);
    }

    #[test]
    fn test_error_types() {
        let coeffs = vec![
            handle(Matrix::diagonal(&[-4., 1.])),
            handle(Matrix::identity(2)),
        ];
        let settings = EigenSettingsBuilder::<f64>::default()
            .method("dense".to_string())
            .nev(2)
            .build()
            .unwrap();
        let mut solver = PolynomialSolver::new(coeffs, TransformKind::default(), settings).unwrap();

        // residual of λ = 5 for the vector e₀ of the pencil A₀ + λI
        let res = solver.residual_norm(5., 0., &[1., 0.], None).unwrap();
        assert_eq!(res, 1.);

        solver.error_type = PolynomialError::Absolute;
        solver.solve().unwrap();
        assert!(solver.solution.error_estimate(0) < 1e-14);

        // a coefficient without a norm rules out backward errors
        let op = crate::solver::core::FnOperator::new(2, 2, |x: &[f64], y: &mut [f64]| y.copy_from_slice(x));
        let coeffs: Vec<OperatorHandle<f64>> = vec![handle(Matrix::diagonal(&[-4., 1.])), Rc::new(op)];
        let mut solver = PolynomialSolver::new(
            coeffs,
            TransformKind::default(),
            EigenSettingsBuilder::<f64>::default()
                .method("dense".to_string())
                .build()
                .unwrap(),
        )
        .unwrap();
        let err = solver.solve().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
    }

    #[test]
    fn test_bad_coefficients() {
        let settings = EigenSettings::<f64>::default();
        let one = vec![handle(Matrix::identity(3))];
        assert!(PolynomialSolver::new(one, TransformKind::default(), settings.clone()).is_err());

        let mixed = vec![handle(Matrix::identity(3)), handle(Matrix::identity(2))];
        let err = PolynomialSolver::new(mixed, TransformKind::default(), settings)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
    }
}
