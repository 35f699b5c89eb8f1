#![allow(non_snake_case)]

use super::check_subspace;
use crate::algebra::*;
use crate::solver::core::traits::EigenMethod;
use crate::solver::core::*;
use crate::timers::*;

/// Thick-restart Arnoldi in Krylov-Schur form.
///
/// Each outer iteration extends the factorization to `ncv` columns,
/// computes the Schur form of the active block and tests the Ritz pairs in
/// the requested order.  The converged prefix is locked, a sorted subset of
/// the remaining Ritz vectors is kept according to the restart policy, and
/// the factorization continues from the normalized residual vector.
///
/// Works on general operators.  Complex Ritz values appear as conjugate
/// pairs of the real Schur form and are tested, kept and locked together.
///
/// With [`Extraction::Harmonic`] the factorization is translated before
/// each Schur step so that its eigenvalues are the harmonic Ritz values
/// with respect to the target.  This favours interior eigenvalues near
/// the target without factoring `A - σB`.
pub struct Arnoldi<T: FloatT> {
    policy: RestartPolicy<T>,
}

impl<T> Arnoldi<T>
where
    T: FloatT,
{
    pub fn new(settings: &EigenSettings<T>) -> Self {
        Self {
            policy: RestartPolicy::from(settings),
        }
    }
}

// Arnoldi factorization in Krylov-Schur form.  Columns `[0, l)` of the
// basis are locked, `H[0..k, 0..k]` is quasi upper triangular with the
// Ritz values `theta` on its diagonal blocks, and row `k` of `H` couples
// the kept Ritz vectors to `V[k]`.
struct KrylovSchur<T: FloatT> {
    basis: Basis<T>,
    H: Matrix<T>,
    f: Vec<T>,
    theta_r: Vec<T>,
    theta_i: Vec<T>,
    errest: Vec<T>,
    schur: SchurEngine<T>,
    l: usize,
    k: usize,
}

// Quasi-triangular form `S = Z'*H*Z` of the leading block of `H`, with
// its eigenvalues in Schur order
struct SchurForm<T> {
    S: Matrix<T>,
    Z: Matrix<T>,
    wr: Vec<T>,
    wi: Vec<T>,
}

// Ritz values of one outer iteration.  Positions `[0, l)` hold the locked
// values, positions `[l, m)` the active ones in the requested order.
struct SortedRitz<T> {
    // Schur positions of the active block, in sorted order
    order: Vec<usize>,
    re: Vec<T>,
    im: Vec<T>,
    errest: Vec<T>,
}

impl<T> EigenMethod<T> for Arnoldi<T>
where
    T: FloatT,
{
    fn name(&self) -> &'static str {
        "arnoldi"
    }

    fn validate(
        &self,
        op: &SpectralTransform<T>,
        settings: &EigenSettings<T>,
    ) -> Result<(), KrylovError> {
        if settings.extraction == Extraction::Harmonic {
            if !matches!(op.kind(), TransformKind::Shift { .. }) {
                return Err(KrylovError::precondition(format!(
                    "harmonic extraction is not available with a {} transform",
                    op.kind().name()
                )));
            }
            if !settings.which.needs_target() {
                return Err(KrylovError::precondition(
                    "harmonic extraction needs a target, use Which::TargetMagnitude or Which::TargetReal",
                ));
            }
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

        // target in the domain of the shifted operator
        let harmonic = match (ctx.settings.extraction, ctx.op.kind()) {
            (Extraction::Harmonic, TransformKind::Shift { sigma }) => Some(ctx.settings.target - *sigma),
            _ => None,
        };

        let mut ks = KrylovSchur {
            basis: ctx.new_basis(ncv)?,
            H: Matrix::zeros((ncv, ncv)),
            f: vec![T::zero(); n],
            theta_r: vec![T::zero(); ncv],
            theta_i: vec![T::zero(); ncv],
            errest: vec![T::zero(); ncv],
            schur: SchurEngine::new(ncv),
            l: 0,
            k: 0,
        };
        ctx.start_basis(&mut ks.basis, &orth)?;

        let mut its = 0u32;
        let mut breakdown_step = None;
        let nconv;

        loop {
            its += 1;
            let l = ks.l;

            let out;
            timeit! {timers => "factorization"; {
                out = extend_factorization(
                    ctx.op,
                    FactorizationMode::Direct,
                    &orth,
                    &mut ks.basis,
                    Projection::Hessenberg(&mut ks.H),
                    &mut ks.f,
                    ks.k,
                    ncv,
                )?;
            }}
            let m = out.m;
            if out.breakdown {
                info.breakdowns += 1;
            }

            // growth of the residual vector under a harmonic translation
            let mut gamma = T::one();
            if let Some(tau) = harmonic {
                if !out.breakdown && out.beta > T::zero() {
                    timeit! {timers => "dense"; {
                        gamma = ks.translate_harmonic(tau, out.beta, m)?;
                    }}
                }
            }

            // Schur form of the active block and the sorted Ritz values
            let form;
            let mut sorted;
            timeit! {timers => "dense"; {
                ks.schur.schur(&ks.H.submatrix(l..m, l..m))?;
                form = ks.projected_schur_form(m);
                sorted = ks.sort_active(ctx, m);
            }}

            let scan;
            timeit! {timers => "convergence"; {
                scan = ks.test_convergence(ctx, &form, out.beta, gamma, &mut sorted, m)?;
            }}
            let k_out = scan.k_out;

            let kk = if k_out >= m {
                m
            } else {
                self.policy.restart_size(k_out, m, &sorted.im)?
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

            if reason != ConvergedReason::Iterating {
                info.reason = reason;
                ks.compress(&sorted, m, k_out)?;
                nconv = k_out;
                break;
            }

            let restarted;
            timeit! {timers => "restart"; {
                let W = ks.compress(&sorted, m, kk)?;
                restarted = ks.restart_vector(&orth, &W, out.beta * gamma, out.breakdown, k_out, kk)?;
            }}
            if !restarted {
                info.reason = ConvergedReason::DivergedBreakdown;
                breakdown_step = Some(m);
                nconv = k_out;
                break;
            }
            ks.l = k_out;
            ks.k = kk;
            ks.basis.set_active(k_out, kk);
        }

        let mut solution = ks.extract(ctx, nconv)?;
        solution.breakdown_step = breakdown_step;
        ctx.finish(&mut solution, info);
        Ok(solution)
    }
}

impl<T> KrylovSchur<T>
where
    T: FloatT,
{
    // Quasi-triangular form of the leading `m x m` block of `H`, from the
    // Schur factorization of the active block
    fn projected_schur_form(&self, m: usize) -> SchurForm<T> {
        let l = self.l;
        let ma = m - l;
        let (S, U) = (&self.schur.S, &self.schur.U);

        let mut R = Matrix::zeros((m, m));
        R.set_submatrix((0, 0), &self.H.submatrix(0..l, 0..l));
        if l > 0 {
            let mut C = Matrix::zeros((l, ma));
            C.mul(&self.H.submatrix(0..l, l..m), U, T::one(), T::zero());
            R.set_submatrix((0, l), &C);
        }
        R.set_submatrix((l, l), S);

        let mut Z = Matrix::identity(m);
        Z.set_submatrix((l, l), U);

        let mut wr = self.theta_r[0..m].to_vec();
        let mut wi = self.theta_i[0..m].to_vec();
        wr[l..m].copy_from(&self.schur.wr);
        wi[l..m].copy_from(&self.schur.wi);

        SchurForm { S: R, Z, wr, wi }
    }

    // Harmonic translation of the factorization with respect to `tau`.
    // With `A*V = V*H + beta*v*e'` and `g = beta*(H22 - tau*I)'⁻¹*e` on the
    // active block, the last column of `H` grows by `beta*g` and the
    // residual vector becomes `f - beta*V*g`, of norm `beta*gamma` with
    // `gamma = sqrt(1 + ‖g‖²)`.  Returns `gamma`.
    fn translate_harmonic(&mut self, tau: T, beta: T, m: usize) -> Result<T, KrylovError> {
        let l = self.l;
        let ma = m - l;

        let mut M = self.H.submatrix(l..m, l..m);
        for i in 0..ma {
            M[(i, i)] -= tau;
        }
        let lu = DenseLU::factor(&M)?;
        let mut g = vec![T::zero(); ma];
        g[ma - 1] = beta;
        lu.solve_transpose_in_place(&mut g);

        for (i, &gi) in g.iter().enumerate() {
            self.H[(l + i, m - 1)] += beta * gi;
        }

        self.basis.set_active(l, m);
        let mut Vg = vec![T::zero(); self.f.len()];
        self.basis.mult_vec(&g, &mut Vg);
        self.f.axpby(-beta, &Vg, T::one());

        Ok(T::hypot(T::one(), g.norm()))
    }

    // Active Ritz values in the requested order, after the locked ones
    fn sort_active(&self, ctx: &SolveContext<'_, T>, m: usize) -> SortedRitz<T> {
        let l = self.l;
        let order = ctx.sort_ritz_values(&self.schur.wr, &self.schur.wi);

        let mut re = self.theta_r[0..m].to_vec();
        let mut im = self.theta_i[0..m].to_vec();
        for (j, &idx) in order.iter().enumerate() {
            re[l + j] = self.schur.wr[idx];
            im[l + j] = self.schur.wi[idx];
        }
        let mut errest = self.errest[0..m].to_vec();
        errest[l..m].set(T::infinity());

        SortedRitz {
            order,
            re,
            im,
            errest,
        }
    }

    // Test the active Ritz pairs in sorted order.  Error estimates of the
    // tested pairs are written to `sorted.errest`.  The residual estimates
    // are scaled by `corrf` after a harmonic translation.
    #[allow(clippy::too_many_arguments)]
    fn test_convergence(
        &mut self,
        ctx: &SolveContext<'_, T>,
        form: &SchurForm<T>,
        beta: T,
        corrf: T,
        sorted: &mut SortedRitz<T>,
        m: usize,
    ) -> Result<ConvergenceScan<T>, KrylovError> {
        let l = self.l;
        let n = ctx.n();
        let track_all = ctx.settings.track_all;
        let order = &sorted.order;
        let (S, Z, wr, wi) = (&form.S, &form.Z, &form.wr, &form.wi);

        let scan = if ctx.settings.true_residual {
            // Ritz vectors need every column of the basis
            self.basis.set_active(0, m);
            let basis = &self.basis;
            let scan = scan_convergence(&ctx.criterion, l, m - l, track_all, |pos| {
                let i = l + order[pos - l];
                let (yr, yi) = projected_ritz_vector(S, Z, wr, wi, i)?;
                let mut xr = vec![T::zero(); n];
                basis.mult_vec(&yr, &mut xr);
                let xi = yi.map(|yi| {
                    let mut xi = vec![T::zero(); n];
                    basis.mult_vec(&yi, &mut xi);
                    xi
                });
                let resnorm = ctx.true_residual(wr[i], wi[i], &xr, xi.as_deref())?;
                let (re, im) = ctx.test_value(wr[i], wi[i]);
                let pair = wi[i] > T::zero();
                Ok::<_, KrylovError>(Candidate { re, im, resnorm, pair })
            });
            self.basis.set_active(l, m);
            scan?
        } else {
            // estimates in Schur order for the active block
            let res = estimate_residuals(S, Z, wr, wi, beta, l..m, corrf)?;
            scan_convergence(&ctx.criterion, l, m - l, track_all, |pos| {
                let i = l + order[pos - l];
                let (re, im) = ctx.test_value(wr[i], wi[i]);
                let pair = wi[i] > T::zero();
                Ok::<_, KrylovError>(Candidate {
                    re,
                    im,
                    resnorm: res[i - l],
                    pair,
                })
            })?
        };

        for v in scan.verdicts.iter() {
            sorted.errest[v.index] = v.errest;
        }
        Ok(scan)
    }

    // Replace the active columns `[l, m)` by an orthonormal basis of the
    // invariant subspace belonging to the Ritz values at sorted positions
    // `[l, kk)`, keeping `H` quasi upper triangular.  Returns the
    // transformation `W` applied to the active columns.
    fn compress(&mut self, sorted: &SortedRitz<T>, m: usize, kk: usize) -> Result<Matrix<T>, KrylovError> {
        let l = self.l;
        let ma = m - l;
        let p = kk - l;

        let mut Q1 = selected_eigenvectors(&self.schur, &sorted.order[0..p])?;
        orthonormalize_columns(&mut Q1);

        let mut W = Matrix::zeros((ma, p));
        W.mul(&self.schur.U, &Q1, T::one(), T::zero());

        let mut SQ = Matrix::zeros((ma, p));
        SQ.mul(&self.schur.S, &Q1, T::one(), T::zero());
        let mut S1 = Matrix::zeros((p, p));
        S1.mul(&Q1.t(), &SQ, T::one(), T::zero());
        clean_quasi_triangular(&mut S1, &sorted.im[l..kk]);

        let mut top = Matrix::zeros((l, p));
        if l > 0 {
            top.mul(&self.H.submatrix(0..l, l..m), &W, T::one(), T::zero());
        }

        let (rows, cols) = (self.H.m, self.H.n);
        self.H.clear_block(0..rows, l..cols);
        self.H.clear_block(l..rows, 0..l);
        self.H.set_submatrix((0, l), &top);
        self.H.set_submatrix((l, l), &S1);

        self.basis.set_active(l, m);
        self.basis.mult_in_place(&W, 0, p);

        self.theta_r[l..kk].copy_from(&sorted.re[l..kk]);
        self.theta_i[l..kk].copy_from(&sorted.im[l..kk]);
        self.errest[l..kk].copy_from(&sorted.errest[l..kk]);

        Ok(W)
    }

    // Set `V[kk]` from the residual vector and the coupling row `kk` of
    // `H`.  The row is zero for the locked columns `[0, nconv)`.  After a
    // breakdown the factorization continues from a random vector, and
    // `false` is returned if none exists.
    fn restart_vector(
        &mut self,
        orth: &Orthogonalizer<T>,
        W: &Matrix<T>,
        beta: T,
        breakdown: bool,
        nconv: usize,
        kk: usize,
    ) -> Result<bool, KrylovError> {
        let l = self.l;
        let last = W.m - 1;

        if breakdown || beta == T::zero() {
            return orth_random_column(&mut self.basis, orth, kk);
        }

        for j in nconv..kk {
            self.H[(kk, j)] = beta * W[(last, j - l)];
        }
        let mut v = self.f.clone();
        v.scale(beta.recip());
        self.basis.column_mut(kk).copy_from(&v);
        Ok(true)
    }

    // Eigenpairs of the original problem from the first `nconv` columns
    fn extract(
        &mut self,
        ctx: &SolveContext<'_, T>,
        nconv: usize,
    ) -> Result<EigenSolution<T>, KrylovError> {
        let n = ctx.n();
        let mut solution = EigenSolution::new(n, nconv, ctx.settings.nev);
        let Hc = self.H.submatrix(0..nconv, 0..nconv);
        let (tr, ti) = (&self.theta_r[0..nconv], &self.theta_i[0..nconv]);
        self.basis.set_active(0, nconv);

        let mut i = 0;
        while i < nconv {
            let (yr, yi) = quasi_triangular_eigenvector(&Hc, tr, ti, i)?;
            let mut xr = vec![T::zero(); n];
            self.basis.mult_vec(&yr, &mut xr);
            let (re, im) = ctx.op.back_transform(tr[i], ti[i]);

            match yi {
                Some(yi) if i + 1 < nconv => {
                    let mut xi = vec![T::zero(); n];
                    self.basis.mult_vec(&yi, &mut xi);
                    ctx.normalize_vector(&mut xr, Some(&mut xi))?;
                    solution.push(re, im, self.errest[i], &xr, Some(&xi))?;
                    i += 2;
                }
                _ => {
                    ctx.normalize_vector(&mut xr, None)?;
                    solution.push(re, T::zero(), self.errest[i], &xr, None)?;
                    i += 1;
                }
            }
        }
        Ok(solution)
    }
}

fn orth_random_column<T: FloatT>(
    basis: &mut Basis<T>,
    orth: &Orthogonalizer<T>,
    j: usize,
) -> Result<bool, KrylovError> {
    if j >= basis.capacity() {
        return Ok(false);
    }
    basis.set_random_column(j, orth)
}

// Eigenvectors of the Schur factor for the given Schur positions, one
// column per real eigenvalue and `[Re, Im]` columns per conjugate pair
fn selected_eigenvectors<T: FloatT>(
    schur: &SchurEngine<T>,
    order: &[usize],
) -> Result<Matrix<T>, KrylovError> {
    let p = order.len();
    let mut Y = Matrix::zeros((schur.n(), p));

    let mut j = 0;
    while j < p {
        let idx = order[j];
        let (yr, yi) = quasi_triangular_eigenvector(&schur.S, &schur.wr, &schur.wi, idx)?;
        Y.col_slice_mut(j).copy_from(&yr);
        match yi {
            Some(yi) if j + 1 < p => {
                Y.col_slice_mut(j + 1).copy_from(&yi);
                j += 2;
            }
            _ => j += 1,
        }
    }
    Ok(Y)
}

// Modified Gram-Schmidt with one reorthogonalization pass.  A column that
// collapses is replaced by a unit vector orthogonal to the previous ones.
fn orthonormalize_columns<T: FloatT>(Y: &mut Matrix<T>) {
    let (m, p) = (Y.m, Y.n);
    let tol = T::epsilon() * (m as f64).as_T();

    for j in 0..p {
        let mut v = Y.col_slice(j).to_vec();
        let onorm = v.norm();
        for _ in 0..2 {
            for i in 0..j {
                let qi = Y.col_slice(i);
                let h = qi.dot(&v);
                v.axpby(-h, qi, T::one());
            }
        }
        let mut nrm = v.norm();

        let mut e = 0;
        while !(nrm > tol * onorm && nrm > T::zero()) && e < m {
            v.set(T::zero());
            v[e] = T::one();
            for _ in 0..2 {
                for i in 0..j {
                    let qi = Y.col_slice(i);
                    let h = qi.dot(&v);
                    v.axpby(-h, qi, T::one());
                }
            }
            nrm = v.norm();
            e += 1;
        }
        v.scale(nrm.recip());
        Y.col_slice_mut(j).copy_from(&v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn nonsymmetric(n: usize) -> Matrix<f64> {
        // upper triangular apart from a rotation block, with eigenvalues
        // 3, 4, ..., n and 0.5 ± 2i
        let mut A = Matrix::zeros((n, n));
        for i in 0..n {
            A[(i, i)] = (i + 1) as f64;
            for j in (i + 1)..n {
                A[(i, j)] = 1.0 / ((j - i) as f64 + 1.0);
            }
        }
        A[(0, 0)] = 0.5;
        A[(1, 1)] = 0.5;
        A[(1, 0)] = -4.0;
        A[(0, 1)] = 1.0;
        A
    }

    #[test]
    fn test_orthonormalize_columns() {
        let mut Y = Matrix::<f64>::from(&[
            [1., 1., 2.], //
            [0., 1., 0.], //
            [0., 0., 0.], //
        ]);
        orthonormalize_columns(&mut Y);
        let mut G = Matrix::zeros((3, 3));
        G.mul(&Y.t(), &Y, 1.0, 0.0);
        for i in 0..3 {
            for j in 0..3 {
                let δ = if i == j { 1.0 } else { 0.0 };
                assert!((G[(i, j)] - δ).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_arnoldi_largest_real() {
        let n = 16;
        let A = nonsymmetric(n);
        let settings = EigenSettingsBuilder::<f64>::default()
            .nev(3)
            .ncv(12)
            .which(Which::LargestReal)
            .tol(1e-10)
            .build()
            .unwrap();
        let mut solver = EigenSolver::new(EigenProblem::new(Rc::new(A)), settings).unwrap();
        solver.solve().unwrap();

        let sol = &solver.solution;
        assert_eq!(sol.reason, ConvergedReason::ConvergedTol);
        assert!(sol.nconv >= 3);
        for (i, λ) in [16., 15., 14.].iter().enumerate() {
            let (re, im) = sol.eigenvalue(i);
            assert!((re - λ).abs() < 1e-8);
            assert_eq!(im, 0.);
            assert!(solver.relative_error(i).unwrap() < 1e-8);
        }
    }

    #[test]
    fn test_arnoldi_conjugate_pair() {
        let n = 16;
        let A = nonsymmetric(n);
        let settings = EigenSettingsBuilder::<f64>::default()
            .nev(2)
            .ncv(12)
            .tol(1e-10)
            .which(Which::LargestImaginary)
            .build()
            .unwrap();
        let mut solver = EigenSolver::new(EigenProblem::new(Rc::new(A)), settings).unwrap();
        solver.solve().unwrap();

        let sol = &solver.solution;
        assert!(sol.reason.is_converged());
        let (re0, im0) = sol.eigenvalue(0);
        let (re1, im1) = sol.eigenvalue(1);
        assert!((re0 - 0.5).abs() < 1e-8 && (im0 - 2.0).abs() < 1e-8);
        assert_eq!((re0, im0), (re1, -im1));
        assert_eq!(sol.error_estimate(0), sol.error_estimate(1));
        assert!(solver.relative_error(0).unwrap() < 1e-8);
        assert!(solver.relative_error(1).unwrap() < 1e-8);
    }

    #[test]
    fn test_harmonic_translation() {
        let (n, m) = (16, 8);
        let A = nonsymmetric(n);
        let orth = Orthogonalizer::from(&EigenSettings::<f64>::default());
        let mut ks = KrylovSchur {
            basis: Basis::new(n, m, None, 3),
            H: Matrix::zeros((m, m)),
            f: vec![0.; n],
            theta_r: vec![0.; m],
            theta_i: vec![0.; m],
            errest: vec![0.; m],
            schur: SchurEngine::new(m),
            l: 0,
            k: 0,
        };
        assert!(ks.basis.set_random_column(0, &orth).unwrap());
        let out = extend_factorization(
            &A,
            FactorizationMode::Direct,
            &orth,
            &mut ks.basis,
            Projection::Hessenberg(&mut ks.H),
            &mut ks.f,
            0,
            m,
        )
        .unwrap();

        let gamma = ks.translate_harmonic(3.5, out.beta, m).unwrap();
        assert!(gamma > 1.);
        assert!((ks.f.norm() - out.beta * gamma).abs() < 1e-10 * out.beta * gamma);

        // A*V = V*H + f*e' still holds for the translated pair
        for j in 0..m {
            let mut r = vec![0.; n];
            A.gemv(&mut r, ks.basis.column(j), 1., 0.);
            for i in 0..m {
                r.axpby(-ks.H[(i, j)], ks.basis.column(i), 1.);
            }
            if j == m - 1 {
                r.axpby(-1., &ks.f, 1.);
            }
            assert!(r.norm() < 1e-10);
        }
    }

    #[test]
    fn test_harmonic_interior_eigenvalues() {
        // eigenvalues 1, 2, ..., n
        let n = 30;
        let mut A = Matrix::<f64>::zeros((n, n));
        for i in 0..n {
            A[(i, i)] = (i + 1) as f64;
            if i + 1 < n {
                A[(i, i + 1)] = 0.1;
            }
        }
        let settings = EigenSettingsBuilder::<f64>::default()
            .nev(2)
            .ncv(20)
            .max_it(1000)
            .which(Which::TargetMagnitude)
            .target(15.3)
            .extraction(Extraction::Harmonic)
            .tol(1e-10)
            .build()
            .unwrap();
        let mut solver = EigenSolver::new(EigenProblem::new(Rc::new(A)), settings).unwrap();
        solver.solve().unwrap();

        let sol = &solver.solution;
        assert_eq!(sol.reason, ConvergedReason::ConvergedTol);
        for (i, λ) in [15., 16.].iter().enumerate() {
            assert!((sol.eigenvalue(i).0 - λ).abs() < 1e-8);
            assert!(solver.relative_error(i).unwrap() < 1e-8);
        }
    }

    #[test]
    fn test_harmonic_needs_target_and_shift() {
        let A: OperatorHandle<f64> = Rc::new(nonsymmetric(8));
        let settings = EigenSettingsBuilder::<f64>::default()
            .extraction(Extraction::Harmonic)
            .build()
            .unwrap();
        let err = EigenSolver::new(EigenProblem::new(A.clone()), settings).err().unwrap();
        assert!(matches!(err, KrylovError::PreconditionViolation(_)));

        let settings = EigenSettingsBuilder::<f64>::default()
            .extraction(Extraction::Harmonic)
            .which(Which::TargetMagnitude)
            .target(2.)
            .build()
            .unwrap();
        let problem = EigenProblem::new(A).with_transform(TransformKind::ShiftInvert { sigma: 2.5 });
        assert!(EigenSolver::new(problem, settings).is_err());
    }
}
