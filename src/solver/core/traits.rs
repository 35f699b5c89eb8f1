//! Traits implemented by the eigensolver methods and their reporting types.
//!
//! A method is selected by name through the
//! [`MethodRegistry`](crate::solver::core::MethodRegistry) when an
//! [`EigenSolver`](crate::solver::core::EigenSolver) is constructed.  All
//! methods share the convergence, sorting and reporting machinery made
//! available through a [`SolveContext`](crate::solver::core::SolveContext),
//! so a new method only needs to implement [`EigenMethod`].

use super::{EigenInfo, EigenSettings, EigenSolution, KrylovError, SolveContext, SpectralTransform};
use crate::algebra::*;
use crate::timers::*;

#[cfg(feature = "serde")]
use std::{fs::File, io};

/// An eigensolver method

pub trait EigenMethod<T: FloatT> {
    /// Name under which the method is registered
    fn name(&self) -> &'static str;

    /// Check that the method supports the given operator and settings.
    /// Called once when the solver is constructed, before any iteration.
    fn validate(
        &self,
        op: &SpectralTransform<T>,
        settings: &EigenSettings<T>,
    ) -> Result<(), KrylovError>;

    /// Compute eigenpairs of the transformed operator in `ctx`.  The
    /// returned solution refers to the original problem.
    fn solve(
        &mut self,
        ctx: &SolveContext<'_, T>,
        info: &mut EigenInfo<T>,
        timers: &mut Timers,
    ) -> Result<EigenSolution<T>, KrylovError>;
}

/// Printing functions for the solver's Info

pub trait InfoPrint<T>
where
    T: FloatT,
{
    /// Print the solver configuration, e.g. settings etc.
    /// This function is called once at the start of the solve.
    fn print_configuration(
        &mut self,
        settings: &EigenSettings<T>,
        op: &SpectralTransform<T>,
    ) -> std::io::Result<()>;

    /// Print a header to appear at the top of progress information.
    fn print_status_header(&mut self, settings: &EigenSettings<T>) -> std::io::Result<()>;

    /// Print solver progress information.   Called once per outer iteration.
    fn print_status(&mut self, settings: &EigenSettings<T>) -> std::io::Result<()>;

    /// Print solver final status and other exit information.   Called at
    /// solver termination.
    fn print_footer(
        &mut self,
        settings: &EigenSettings<T>,
        timers: &Timers,
    ) -> std::io::Result<()>;
}

/// Saving and restoring settings and results as JSON files

#[cfg(feature = "serde")]
pub trait JSONReadWrite: Sized {
    fn write_to_file(&self, file: &mut File) -> Result<(), io::Error>;
    fn read_from_file(file: &mut File) -> Result<Self, io::Error>;
}
