//! Eigensolver main module.
//!
//! This module contains the main types for setting up and solving an
//! eigenproblem.  A problem is described by an [`EigenProblem`], configured
//! through [`EigenSettings`] and solved by an [`EigenSolver`], which leaves
//! its results in an [`EigenSolution`].
//!
//! The solver comes with the Krylov-Schur [Arnoldi](implementations::Arnoldi)
//! and thick-restart [Lanczos](implementations::Lanczos) methods and a
//! [dense](implementations::DenseMethod) reference method.  Further methods
//! can be added by implementing the [`EigenMethod`](traits::EigenMethod)
//! trait and registering them in the [`MethodRegistry`].
//!
//! Singular values are computed by the [`SvdSolver`](svd::SvdSolver) front
//! end on top of the symmetric eigensolver, and polynomial eigenproblems
//! by the [`PolynomialSolver`](pep::PolynomialSolver) front end on top of
//! a companion linearization.

// internal module structure
pub(crate) mod core;
pub mod implementations;
pub mod pep;
pub mod svd;

//Here we expose only part of the solver internals
//and rearrange public modules a bit to give a more
//user friendly API

//problem definition, settings and the solver itself
pub use crate::solver::core::{
    ConvergedReason, ConvergenceTest, EigenProblem, EigenSettings, EigenSettingsBuilder,
    EigenSolution, EigenSolver, Extraction, OrthogRefine, OrthogType, ProblemType, RestartType,
    SettingsError, Which,
};

//operators and spectral transformations
pub use crate::solver::core::{
    BackTransformFn, FnOperator, LinearOperator, LinearSolver, OperatorHandle, SpectralTransform,
    TransformKind,
};

//errors, progress information and convergence tests
pub use crate::solver::core::{
    ConvergenceCriterion, EigenInfo, ErrorKind, KrylovError, UserConvergenceFn,
};

//user facing traits required to define new methods
pub use crate::solver::core::traits;
pub use crate::solver::core::{MethodConfiguration, MethodConstructor, MethodRegistry};

//building blocks for new methods
pub use crate::solver::core::{
    arnoldi_residual, estimate_residuals, extend_factorization, lanczos_residuals,
    compare_eigenvalues, scan_convergence, sort_eigenvalues, test_convergence, true_residual,
    Basis, Candidate, ConvergenceScan, ExplicitRestart, FactorizationMode, FactorizationOutcome,
    OrthoResult, Orthogonalizer, PairVerdict, Projection, RestartPolicy, RestartStrategy,
    SolveContext, ThickRestart,
};

pub use crate::solver::pep::*;
pub use crate::solver::svd::*;
