use super::ConvergedReason;
use crate::algebra::*;
use crate::io::PrintTarget;
use crate::timers::*;

/// Progress information for an eigensolve.
///
/// Updated once per outer iteration and passed to the termination callback.

#[derive(Default, Debug)]
pub struct EigenInfo<T> {
    /// name of the method in use
    pub method: &'static str,
    /// problem dimension
    pub n: usize,
    /// number of requested eigenpairs
    pub nev: usize,
    /// subspace dimension
    pub ncv: usize,
    /// restart limit
    pub max_it: u32,
    /// outer iterations completed
    pub iterations: u32,
    /// converged eigenpairs so far
    pub nconv: usize,
    /// error estimate of the first unconverged eigenpair
    pub errest: T,
    /// size of the last restart
    pub restart_size: usize,
    /// factorizations that ended in an invariant subspace
    pub breakdowns: u32,
    pub solve_time: f64,
    pub reason: ConvergedReason,

    pub(crate) stream: PrintTarget,
}

impl<T> EigenInfo<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear progress data and set the problem sizes for a new solve
    pub(crate) fn reset(
        &mut self,
        method: &'static str,
        sizes: (usize, usize, usize),
        max_it: u32,
        timers: &mut Timers,
    ) {
        (self.n, self.nev, self.ncv) = sizes;
        self.method = method;
        self.max_it = max_it;
        self.iterations = 0;
        self.nconv = 0;
        self.errest = T::zero();
        self.restart_size = 0;
        self.breakdowns = 0;
        self.solve_time = 0f64;
        self.reason = ConvergedReason::Iterating;

        timers.reset_timer("solve");
    }

    /// Record the outcome of an outer iteration
    pub fn update(&mut self, iterations: u32, nconv: usize, errest: T, restart_size: usize) {
        self.iterations = iterations;
        self.nconv = nconv;
        self.errest = errest;
        self.restart_size = restart_size;
    }

    pub(crate) fn finalize(&mut self, timers: &Timers) {
        if self.reason == ConvergedReason::Iterating {
            self.reason = ConvergedReason::Unsolved;
        }
        self.solve_time = timers.total_time().as_secs_f64();
    }
}
