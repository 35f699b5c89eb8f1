#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::core::traits::EigenMethod;
use crate::solver::core::*;
use crate::timers::*;

/// Full dense eigendecomposition of the transformed operator.
///
/// The operator is formed explicitly, column by column if it has no dense
/// representation, and every eigenpair is computed.  Meant for small
/// problems and for checking the Krylov methods.
#[derive(Default)]
pub struct DenseMethod {}

impl DenseMethod {
    pub fn new() -> Self {
        Self {}
    }
}

impl<T> EigenMethod<T> for DenseMethod
where
    T: FloatT,
{
    fn name(&self) -> &'static str {
        "dense"
    }

    fn validate(
        &self,
        _op: &SpectralTransform<T>,
        settings: &EigenSettings<T>,
    ) -> Result<(), KrylovError> {
        if settings.extraction != Extraction::Ritz {
            return Err(KrylovError::precondition(
                "dense solver computes exact eigenpairs, harmonic extraction does not apply",
            ));
        }
        Ok(())
    }

    fn solve(
        &mut self,
        ctx: &SolveContext<'_, T>,
        info: &mut EigenInfo<T>,
        timers: &mut Timers,
    ) -> Result<EigenSolution<T>, KrylovError> {
        let n = ctx.n();
        let mut solution = EigenSolution::new(n, n, ctx.settings.nev);

        timeit! {timers => "dense"; {
            let mut M = explicit_operator(ctx.op)?;

            if ctx.settings.problem_type.is_hermitian() && !ctx.op.is_generalized() {
                symmetrize(&mut M);
                let mut eng = SymEigenEngine::new(n);
                eng.eigen(&M)?;
                for i in 0..n {
                    let mut x = eng.V.col_slice(i).to_vec();
                    let (errest, re, im) = estimate(ctx, eng.λ[i], T::zero(), &x, None)?;
                    ctx.normalize_vector(&mut x, None)?;
                    solution.push(re, im, errest, &x, None)?;
                }
            } else {
                let mut eng = SchurEngine::new(n);
                eng.schur(&M)?;
                let mut i = 0;
                while i < n {
                    let (mut xr, xi) = eng.eigenvector(i)?;
                    let (θr, θi) = (eng.wr[i], eng.wi[i]);
                    match xi {
                        Some(mut xi) if i + 1 < n => {
                            let (errest, re, im) = estimate(ctx, θr, θi, &xr, Some(&xi))?;
                            ctx.normalize_vector(&mut xr, Some(&mut xi))?;
                            solution.push(re, im, errest, &xr, Some(&xi))?;
                            i += 2;
                        }
                        _ => {
                            let (errest, re, _) = estimate(ctx, θr, T::zero(), &xr, None)?;
                            ctx.normalize_vector(&mut xr, None)?;
                            solution.push(re, T::zero(), errest, &xr, None)?;
                            i += 1;
                        }
                    }
                }
            }
        }}

        ctx.report(info, 1, n, None, 0);
        info.reason = ConvergedReason::ConvergedTol;
        ctx.finish(&mut solution, info);
        Ok(solution)
    }
}

fn symmetrize<T: FloatT>(M: &mut Matrix<T>) {
    let n = M.n;
    let half: T = (0.5).as_T();
    for j in 0..n {
        for i in (j + 1)..n {
            let v = (M[(i, j)] + M[(j, i)]) * half;
            M[(i, j)] = v;
            M[(j, i)] = v;
        }
    }
}

// Error estimate and eigenvalue of the original problem for the
// eigenpair `(θ, x)` of the transformed operator.  Without a back
// transformation the residual is measured on the transformed operator.
fn estimate<T: FloatT>(
    ctx: &SolveContext<'_, T>,
    θr: T,
    θi: T,
    xr: &[T],
    xi: Option<&[T]>,
) -> Result<(T, T, T), KrylovError> {
    let resnorm = if ctx.op.has_back_transform() {
        ctx.true_residual(θr, θi, xr, xi)?
    } else {
        true_residual(ctx.op, None, θr, θi, xr, xi)?
    };
    let (re, im) = ctx.op.back_transform(θr, θi);
    let errest = ctx.criterion.error_estimate(re, im, resnorm);
    Ok((errest, re, im))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_dense_symmetric() {
        let n = 8;
        let A = Matrix::<f64>::tridiagonal(&vec![2.; n], &vec![-1.; n - 1]);
        let settings = EigenSettingsBuilder::<f64>::default()
            .nev(n)
            .which(Which::SmallestReal)
            .problem_type(ProblemType::Hermitian)
            .method("dense".to_string())
            .build()
            .unwrap();
        let mut solver = EigenSolver::new(EigenProblem::new(Rc::new(A)), settings).unwrap();
        solver.solve().unwrap();

        let sol = &solver.solution;
        assert_eq!(sol.nconv, n);
        assert!(sol.reason.is_converged());
        for i in 0..n {
            let exact = 2. - 2. * f64::cos((i + 1) as f64 * std::f64::consts::PI / (n + 1) as f64);
            assert!((sol.eigenvalue(i).0 - exact).abs() < 1e-12);
            assert!(solver.relative_error(i).unwrap() < 1e-12);
        }
    }

    #[test]
    fn test_dense_rotation() {
        let A = Matrix::<f64>::from(&[
            [1., 2., 0.],  //
            [-2., 1., 0.], //
            [0., 0., 3.],  //
        ]);
        let settings = EigenSettingsBuilder::<f64>::default()
            .nev(3)
            .ncv(3)
            .which(Which::LargestImaginary)
            .method("dense".to_string())
            .build()
            .unwrap();
        let mut solver = EigenSolver::new(EigenProblem::new(Rc::new(A)), settings).unwrap();
        solver.solve().unwrap();

        let sol = &solver.solution;
        let (re, im) = sol.eigenvalue(0);
        assert!((re - 1.).abs() < 1e-12 && (im - 2.).abs() < 1e-12);
        assert!((sol.eigenvalue(2).0 - 3.).abs() < 1e-12);
        for i in 0..3 {
            assert!(solver.relative_error(i).unwrap() < 1e-12);
        }
    }
}
