#![allow(non_snake_case)]

use super::callbacks::{Callback, SolverCallbacks};
use super::operator::{LinearOperator, LinearSolver, OperatorHandle};
use super::registry::MethodConfiguration;
use super::traits::{EigenMethod, InfoPrint};
use super::{
    ConvergenceCriterion, ConvergenceTest, EigenInfo, EigenSettings, EigenSolution, KrylovError,
    SolveContext, SpectralTransform, TransformKind, UserConvergenceFn,
};
use crate::algebra::*;
use crate::io::ConfigurablePrintTarget;
use crate::timers::*;
use std::io::Write;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ---------------------------------
// Solver status type
// ---------------------------------

/// Reason for termination of an eigensolve

#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConvergedReason {
    /// Problem is not solved (solver hasn't run).
    #[default]
    Unsolved,
    /// Solver is running.
    Iterating,
    /// All requested eigenpairs satisfy the convergence test.
    ConvergedTol,
    /// The termination callback asked the solver to stop.
    StoppedByUser,
    /// Iteration limit reached before enough eigenpairs converged.
    DivergedIts,
    /// The Krylov space became invariant and no new direction could be found.
    DivergedBreakdown,
}

impl ConvergedReason {
    pub fn is_converged(&self) -> bool {
        matches!(*self, ConvergedReason::ConvergedTol)
    }

    pub fn is_diverged(&self) -> bool {
        matches!(
            *self,
            ConvergedReason::DivergedIts | ConvergedReason::DivergedBreakdown
        )
    }
}

impl std::fmt::Display for ConvergedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ---------------------------------
// problem definition
// ---------------------------------

/// The eigenproblem `Ax = λBx` together with the spectral transformation
/// the Krylov methods should work with.
///
/// Operators are passed as shared handles, so the same matrix can be used
/// by several problems or kept by the caller:
/// ```no_run
/// use krylov::algebra::*;
/// use krylov::solver::*;
/// use std::rc::Rc;
///
/// let A = Rc::new(Matrix::<f64>::identity(10));
/// let problem = EigenProblem::new(A.clone())
///     .with_transform(TransformKind::ShiftInvert { sigma: 0.5 });
/// ```
#[derive(Clone)]
pub struct EigenProblem<T: FloatT> {
    pub A: OperatorHandle<T>,
    pub B: Option<OperatorHandle<T>>,
    pub transform: TransformKind<T>,
    /// solver for `A - σB`, used by shift-invert and Cayley transformations
    pub solver: Option<Rc<dyn LinearSolver<T>>>,
}

impl<T> EigenProblem<T>
where
    T: FloatT,
{
    /// The standard problem `Ax = λx`
    pub fn new(A: OperatorHandle<T>) -> Self {
        Self {
            A,
            B: None,
            transform: TransformKind::default(),
            solver: None,
        }
    }

    /// Make the problem generalized, `Ax = λBx`
    pub fn with_B(mut self, B: OperatorHandle<T>) -> Self {
        self.B = Some(B);
        self
    }

    pub fn with_transform(mut self, transform: TransformKind<T>) -> Self {
        self.transform = transform;
        self
    }

    /// Use `solver` for systems with `A - σB` instead of a dense LU
    pub fn with_solver(mut self, solver: Rc<dyn LinearSolver<T>>) -> Self {
        self.solver = Some(solver);
        self
    }

    /// dimension of the problem
    pub fn n(&self) -> usize {
        self.A.nrows()
    }
}

// ---------------------------------
// top level solver container type
// ---------------------------------

/// Eigensolver for a single problem.
///
/// All configuration is checked when the solver is constructed, so a
/// successful [`new`](EigenSolver::new) followed by
/// [`solve`](EigenSolver::solve) only fails on numerical library errors,
/// or when [`ConvergenceTest::User`] is selected without a function.
/// Running out of iterations is not an error; it is reported through
/// [`ConvergedReason`] on the solution.
pub struct EigenSolver<T: FloatT> {
    pub settings: EigenSettings<T>,
    pub info: EigenInfo<T>,
    pub solution: EigenSolution<T>,
    pub timers: Option<Timers>,

    transform: SpectralTransform<T>,
    method: Box<dyn EigenMethod<T>>,
    callbacks: SolverCallbacks<EigenInfo<T>>,
    user_test: Option<UserConvergenceFn<T>>,
    initial: Vec<Vec<T>>,
    constraints: Vec<Vec<T>>,
}

impl<T> EigenSolver<T>
where
    T: MethodConfiguration,
{
    pub fn new(problem: EigenProblem<T>, settings: EigenSettings<T>) -> Result<Self, KrylovError> {
        settings.validate()?;

        let n = problem.n();
        let ncv = settings.ncv_for(n);
        if settings.nev > ncv || ncv > n {
            return Err(KrylovError::precondition(format!(
                "need nev <= ncv <= n, got nev = {}, ncv = {ncv}, n = {n}",
                settings.nev
            )));
        }
        if settings.true_residual
            && matches!(problem.transform, TransformKind::Custom { back: None, .. })
        {
            return Err(KrylovError::precondition(
                "true residuals need a back transformation for custom operators",
            ));
        }

        let mut timers = Timers::default();
        let mut output;

        timeit! {timers => "setup"; {

        // factors A - σB when the transformation needs it
        let transform;
        timeit!{timers => "transform"; {
            transform = SpectralTransform::new(
                problem.transform,
                problem.A,
                problem.B,
                problem.solver,
            )?;
        }}

        let method = T::method_registry().create(&settings.method, &settings)?;
        method.validate(&transform, &settings)?;

        let info = EigenInfo::<T>::new();
        let solution = EigenSolution::<T>::new(n, 0, settings.nev);

        output = Self {
            settings,
            info,
            solution,
            timers: None,
            transform,
            method,
            callbacks: SolverCallbacks::default(),
            user_test: None,
            initial: Vec::new(),
            constraints: Vec::new(),
        };

        // norm estimates are required up front for the norm relative test
        if output.settings.conv_test == ConvergenceTest::NormRelative {
            output.criterion()?;
        }

        }} //end "setup" timer.

        output.timers.replace(timers);

        Ok(output)
    }

    /// Run the solver.  Results are placed in `self.solution`.
    pub fn solve(&mut self) -> Result<(), KrylovError> {
        // timers are stored as an option so that we can swap them
        // out here and avoid borrow conflicts with other fields.
        let mut timers = self.timers.take().unwrap_or_default();

        let n = self.transform.nrows();
        let nev = self.settings.nev;
        let ncv = self.settings.ncv_for(n);
        let max_it = self.settings.max_it_for(n, ncv);
        self.info
            .reset(self.method.name(), (n, nev, ncv), max_it, &mut timers);

        // output failures do not stop the solver
        notimeit! {timers; {
            let _ = self.info.print_configuration(&self.settings, &self.transform);
            let _ = self.info.print_status_header(&self.settings);
        }}

        let result;
        timeit! {timers => "solve"; {
            result = match self.criterion() {
                Ok(criterion) => {
                    let ctx = SolveContext {
                        op: &self.transform,
                        settings: &self.settings,
                        criterion,
                        initial: &self.initial,
                        constraints: &self.constraints,
                        callbacks: &self.callbacks,
                    };
                    self.method.solve(&ctx, &mut self.info, &mut timers)
                }
                Err(e) => Err(e),
            };
        }}

        self.info.finalize(&timers);

        let status = match result {
            Ok(solution) => {
                self.solution = solution;
                Ok(())
            }
            Err(e) => {
                self.solution = EigenSolution::new(n, 0, nev);
                Err(e)
            }
        };
        self.solution.reason = self.info.reason;
        self.solution.solve_time = self.info.solve_time;

        notimeit! {timers; {
            let _ = self.info.print_footer(&self.settings, &timers);
        }}

        self.timers.replace(timers);
        status
    }

    // convergence criterion for the current settings
    fn criterion(&self) -> Result<ConvergenceCriterion<T>, KrylovError> {
        let mut criterion = ConvergenceCriterion::from_settings(&self.settings);
        criterion.user = self.user_test;

        match self.settings.conv_test {
            ConvergenceTest::NormRelative => {
                criterion.norm_a = self.transform.A().norm_inf().ok_or_else(|| {
                    KrylovError::precondition("norm relative test needs a norm estimate of A")
                })?;
                if let Some(B) = self.transform.B() {
                    criterion.norm_b = B.norm_inf().ok_or_else(|| {
                        KrylovError::precondition("norm relative test needs a norm estimate of B")
                    })?;
                }
            }
            ConvergenceTest::User if self.user_test.is_none() => {
                return Err(KrylovError::precondition(
                    "user convergence test selected but no function was set",
                ));
            }
            _ => {}
        }
        Ok(criterion)
    }
}

impl<T> EigenSolver<T>
where
    T: FloatT,
{
    /// The operator the methods work with
    pub fn transform(&self) -> &SpectralTransform<T> {
        &self.transform
    }

    /// Name of the method in use
    pub fn method_name(&self) -> &'static str {
        self.method.name()
    }

    /// Called once per outer iteration.  Returning `true` stops the solve
    /// with reason [`ConvergedReason::StoppedByUser`].
    pub fn set_termination_callback(&mut self, f: fn(&EigenInfo<T>) -> bool) {
        self.callbacks.termination_callback = Callback::Rust(f);
    }

    pub fn unset_termination_callback(&mut self) {
        self.callbacks.termination_callback = Callback::None;
    }

    /// Replace the convergence test by `f(re, im, resnorm)`, whose result
    /// is compared against `tol`
    pub fn set_convergence_test(&mut self, f: UserConvergenceFn<T>) {
        self.user_test = Some(f);
        self.settings.conv_test = ConvergenceTest::User;
    }

    /// Vectors to build the starting space from.  The Krylov methods use
    /// the first one as their starting vector.
    pub fn set_initial_space(&mut self, vectors: &[Vec<T>]) -> Result<(), KrylovError> {
        self.check_space(vectors)?;
        self.initial = vectors.to_vec();
        Ok(())
    }

    /// Vectors whose span is excluded from the search
    pub fn set_deflation_space(&mut self, vectors: &[Vec<T>]) -> Result<(), KrylovError> {
        self.check_space(vectors)?;
        let n = self.transform.nrows();
        if vectors.len() + self.settings.nev > n {
            return Err(KrylovError::precondition(
                "deflation space leaves too little room for the requested eigenpairs",
            ));
        }
        self.constraints = vectors.to_vec();
        Ok(())
    }

    fn check_space(&self, vectors: &[Vec<T>]) -> Result<(), KrylovError> {
        let n = self.transform.nrows();
        if let Some(v) = vectors.iter().find(|v| v.len() != n) {
            return Err(KrylovError::precondition(format!(
                "vector of length {} given for a problem of size {n}",
                v.len()
            )));
        }
        Ok(())
    }

    /// Relative residual `‖Ax - λBx‖ / ‖λx‖` of the `i`th computed eigenpair
    pub fn relative_error(&self, i: usize) -> Result<T, KrylovError> {
        let A = self.transform.A().as_ref();
        let B = self.transform.B().map(|B| B.as_ref());
        self.solution.relative_error(i, A, B)
    }
}

impl<T> ConfigurablePrintTarget for EigenSolver<T>
where
    T: FloatT,
{
    fn print_to_stdout(&mut self) {
        self.info.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.info.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.info.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.info.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.info.get_print_buffer()
    }
    fn print_target(&mut self) -> &dyn Write {
        self.info.print_target()
    }
}
