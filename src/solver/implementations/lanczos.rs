#![allow(non_snake_case)]

use super::check_subspace;
use crate::algebra::*;
use crate::solver::core::traits::EigenMethod;
use crate::solver::core::*;
use crate::timers::*;

/// Thick-restart Lanczos for symmetric problems.
///
/// The basis is kept fully orthogonal.  After a restart the projected
/// matrix is an arrow matrix: the kept Ritz values on the diagonal, their
/// coupling to the next basis vector in row `k`, followed by the
/// tridiagonal `alpha`/`beta` entries of the new Lanczos steps.  Converged
/// Ritz pairs are locked by dropping their coupling.
///
/// Requires [`ProblemType::Hermitian`].  For generalized problems the basis
/// is orthonormal in the `B` inner product.
pub struct Lanczos<T: FloatT> {
    policy: RestartPolicy<T>,
}

impl<T> Lanczos<T>
where
    T: FloatT,
{
    pub fn new(settings: &EigenSettings<T>) -> Self {
        Self {
            policy: RestartPolicy::from(settings),
        }
    }
}

impl<T> EigenMethod<T> for Lanczos<T>
where
    T: FloatT,
{
    fn name(&self) -> &'static str {
        "lanczos"
    }

    fn validate(
        &self,
        op: &SpectralTransform<T>,
        settings: &EigenSettings<T>,
    ) -> Result<(), KrylovError> {
        if !settings.problem_type.is_hermitian() {
            return Err(KrylovError::precondition(
                "lanczos requires a Hermitian problem",
            ));
        }
        if settings.extraction != Extraction::Ritz {
            return Err(KrylovError::precondition(
                "lanczos supports Ritz extraction only",
            ));
        }
        check_subspace(op, settings)
    }

    fn solve(
        &mut self,
        ctx: &SolveContext<'_, T>,
        info: &mut EigenInfo<T>,
        timers: &mut Timers,
    ) -> Result<EigenSolution<T>, KrylovError> {
        let n = ctx.n();
        let ncv = ctx.ncv();
        let nev = ctx.settings.nev;
        let max_it = ctx.max_it();
        let orth = Orthogonalizer::from(ctx.settings);

        let mut basis = ctx.new_basis(ncv)?;
        ctx.start_basis(&mut basis, &orth)?;

        let mut alpha = vec![T::zero(); ncv];
        let mut beta = vec![T::zero(); ncv];
        // kept Ritz values and their coupling to V[k]
        let mut theta = vec![T::zero(); ncv];
        let mut arrow = vec![T::zero(); ncv];
        let mut errest = vec![T::zero(); ncv];
        let zeros = vec![T::zero(); ncv];
        let mut f = vec![T::zero(); n];
        let mut eig = SymEigenEngine::new(ncv);

        let (mut l, mut k) = (0, 0);
        let mut its = 0u32;
        let mut breakdown_step = None;
        let nconv;

        loop {
            its += 1;

            let out;
            timeit! {timers => "factorization"; {
                out = extend_factorization(
                    ctx.op,
                    FactorizationMode::Direct,
                    &orth,
                    &mut basis,
                    Projection::Tridiagonal {
                        alpha: &mut alpha[k..],
                        beta: &mut beta[k..],
                    },
                    &mut f,
                    k,
                    ncv,
                )?;
            }}
            let m = out.m;
            let ma = m - l;
            if out.breakdown {
                info.breakdowns += 1;
            }

            // eigenpairs of the active block of the arrow matrix, sorted
            let order;
            timeit! {timers => "dense"; {
                let Tm = arrow_matrix(&theta, &arrow, &alpha, &beta, l, k, m);
                eig.eigen(&Tm)?;
                order = ctx.sort_ritz_values(&eig.λ, &zeros[0..ma]);
            }}

            let mut sr = theta[0..m].to_vec();
            let mut se = errest[0..m].to_vec();
            for (j, &idx) in order.iter().enumerate() {
                sr[l + j] = eig.λ[idx];
                se[l + j] = T::infinity();
            }

            let scan;
            timeit! {timers => "convergence"; {
                scan = if ctx.settings.true_residual {
                    scan_convergence(&ctx.criterion, l, ma, ctx.settings.track_all, |pos| {
                        let idx = order[pos - l];
                        let mut x = vec![T::zero(); n];
                        basis.mult_vec(eig.V.col_slice(idx), &mut x);
                        let resnorm = ctx.true_residual(eig.λ[idx], T::zero(), &x, None)?;
                        let (re, _) = ctx.test_value(eig.λ[idx], T::zero());
                        Ok::<_, KrylovError>(Candidate::real(re, resnorm))
                    })?
                } else {
                    let res = lanczos_residuals(&eig.V, out.beta, 0..ma);
                    let mut sres = zeros[0..m].to_vec();
                    let mut tr = zeros[0..m].to_vec();
                    for (j, &idx) in order.iter().enumerate() {
                        sres[l + j] = res[idx];
                        tr[l + j] = ctx.test_value(eig.λ[idx], T::zero()).0;
                    }
                    let mut tmp = se.clone();
                    test_convergence(
                        &ctx.criterion,
                        &tr,
                        &zeros[0..m],
                        &sres,
                        &mut tmp,
                        l,
                        ma,
                        ctx.settings.track_all,
                    )?
                };
                for v in scan.verdicts.iter() {
                    se[v.index] = v.errest;
                }
            }}
            let k_out = scan.k_out;

            let kk = if k_out >= m {
                m
            } else {
                self.policy.restart_size(k_out, m, &zeros[0..m])?
            };

            let stop = ctx.report(info, its, k_out, scan.first_unconverged(), kk);
            let reason = if k_out >= nev {
                ConvergedReason::ConvergedTol
            } else if stop {
                ConvergedReason::StoppedByUser
            } else if its >= max_it {
                ConvergedReason::DivergedIts
            } else {
                ConvergedReason::Iterating
            };

            // Ritz vectors of the kept positions, in sorted order
            let keep = if reason == ConvergedReason::Iterating {
                kk
            } else {
                k_out
            };
            let mut Qs = Matrix::zeros((ma, keep - l));
            for j in 0..(keep - l) {
                Qs.col_slice_mut(j).copy_from(eig.V.col_slice(order[j]));
            }

            timeit! {timers => "restart"; {
                basis.set_active(l, m);
                basis.mult_in_place(&Qs, 0, keep - l);
                theta[l..keep].copy_from(&sr[l..keep]);
                errest[l..keep].copy_from(&se[l..keep]);
            }}

            if reason != ConvergedReason::Iterating {
                info.reason = reason;
                nconv = k_out;
                break;
            }

            // coupling of the kept vectors to the residual direction
            arrow.set(T::zero());
            let restarted = if out.breakdown || out.beta == T::zero() {
                basis.set_random_column(kk, &orth)?
            } else {
                for j in k_out..kk {
                    arrow[j] = out.beta * Qs[(ma - 1, j - l)];
                }
                let col = basis.column_mut(kk);
                col.copy_from(&f);
                col.scale(out.beta.recip());
                true
            };
            if !restarted {
                info.reason = ConvergedReason::DivergedBreakdown;
                breakdown_step = Some(m);
                nconv = k_out;
                break;
            }

            l = k_out;
            k = kk;
            basis.set_active(l, k);
        }

        let mut solution = EigenSolution::new(n, nconv, nev);
        basis.set_active(0, nconv);
        for i in 0..nconv {
            let mut x = basis.column(i).to_vec();
            ctx.normalize_vector(&mut x, None)?;
            let (re, _) = ctx.op.back_transform(theta[i], T::zero());
            solution.push(re, T::zero(), errest[i], &x, None)?;
        }
        solution.breakdown_step = breakdown_step;
        ctx.finish(&mut solution, info);
        Ok(solution)
    }
}

// Active block `[l, m)` of the projected matrix: kept Ritz values on the
// diagonal up to `k`, the coupling `arrow` in row and column `k`, then the
// tridiagonal part from the Lanczos steps
fn arrow_matrix<T: FloatT>(
    theta: &[T],
    arrow: &[T],
    alpha: &[T],
    beta: &[T],
    l: usize,
    k: usize,
    m: usize,
) -> Matrix<T> {
    let ma = m - l;
    let mut Tm = Matrix::zeros((ma, ma));
    for i in l..k {
        Tm[(i - l, i - l)] = theta[i];
        Tm[(k - l, i - l)] = arrow[i];
        Tm[(i - l, k - l)] = arrow[i];
    }
    for j in k..m {
        Tm[(j - l, j - l)] = alpha[j];
        if j + 1 < m {
            Tm[(j + 1 - l, j - l)] = beta[j];
            Tm[(j - l, j + 1 - l)] = beta[j];
        }
    }
    Tm
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_arrow_matrix() {
        let theta = [5., 4., 3., 0., 0.];
        let arrow = [0., 0.5, 0.25, 0., 0.];
        let alpha = [0., 0., 0., 2., 1.];
        let beta = [0., 0., 0., 0.1, 9.];

        let Tm = arrow_matrix(&theta, &arrow, &alpha, &beta, 1, 3, 5);
        let expected = Matrix::<f64>::from(&[
            [4., 0., 0.5, 0.],  //
            [0., 3., 0.25, 0.], //
            [0.5, 0.25, 2., 0.1], //
            [0., 0., 0.1, 1.],  //
        ]);
        assert_eq!(Tm, expected);
    }

    #[test]
    fn test_lanczos_requires_hermitian() {
        let A = Matrix::<f64>::identity(20);
        let settings = EigenSettingsBuilder::<f64>::default()
            .method("lanczos".to_string())
            .build()
            .unwrap();
        let err = EigenSolver::new(EigenProblem::new(Rc::new(A.clone())), settings)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::PreconditionViolation);

        let settings = EigenSettingsBuilder::<f64>::default()
            .method("lanczos".to_string())
            .problem_type(ProblemType::Hermitian)
            .extraction(Extraction::Harmonic)
            .which(Which::TargetReal)
            .build()
            .unwrap();
        let err = EigenSolver::new(EigenProblem::new(Rc::new(A)), settings)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
    }

    #[test]
    fn test_lanczos_smallest() {
        let n = 40;
        let A = Matrix::<f64>::tridiagonal(&vec![2.; n], &vec![-1.; n - 1]);
        let settings = EigenSettingsBuilder::<f64>::default()
            .nev(4)
            .ncv(20)
            .which(Which::SmallestReal)
            .problem_type(ProblemType::Hermitian)
            .method("lanczos".to_string())
            .tol(1e-10)
            .max_it(1000)
            .build()
            .unwrap();
        let mut solver = EigenSolver::new(EigenProblem::new(Rc::new(A)), settings).unwrap();
        solver.solve().unwrap();

        let sol = &solver.solution;
        assert_eq!(sol.reason, ConvergedReason::ConvergedTol);
        for i in 0..4 {
            let exact = 2. - 2. * f64::cos((i + 1) as f64 * std::f64::consts::PI / (n + 1) as f64);
            let (re, im) = sol.eigenvalue(i);
            assert!((re - exact).abs() < 1e-9);
            assert_eq!(im, 0.);
            assert!(solver.relative_error(i).unwrap() < 1e-6);
        }
    }
}
