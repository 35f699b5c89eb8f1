//! __krylov__ is a library of Krylov subspace eigensolvers for large sparse
//! or matrix-free problems.  It computes a few eigenpairs of the standard or
//! generalized problem
//!
//! $$
//! Ax = \lambda Bx
//! $$
//!
//! where $A$ and $B$ are only accessed through matrix-vector products, and
//! a few singular triplets of a rectangular operator.
//!
//! ## Features
//!
//! * __Krylov-Schur Arnoldi__ for general operators, with complex conjugate
//!   pairs kept together in real arithmetic.
//!
//! * __Thick-restart Lanczos__ for symmetric problems, with full
//!   reorthogonalization and locking of converged pairs.
//!
//! * __Spectral transformations__: shifts, shift-and-invert and Cayley
//!   transformations, or a user supplied transformed operator.  Eigenvalues
//!   are always reported for the original problem.
//!
//! * __Singular values__ through the cross product or cyclic operator.
//!
//! Dense projected eigenproblems are solved natively, or with LAPACK when
//! one of the "lapack" features is enabled.
//!
//! ## Example
//!
//! ```no_run
//! use krylov::algebra::*;
//! use krylov::solver::*;
//! use std::rc::Rc;
//!
//! let n = 100;
//! let A = Matrix::<f64>::tridiagonal(&vec![2.; n], &vec![-1.; n - 1]);
//!
//! let settings = EigenSettingsBuilder::<f64>::default()
//!     .nev(4)
//!     .which(Which::SmallestReal)
//!     .problem_type(ProblemType::Hermitian)
//!     .method("lanczos".to_string())
//!     .build()
//!     .unwrap();
//!
//! let mut solver = EigenSolver::new(EigenProblem::new(Rc::new(A)), settings).unwrap();
//! solver.solve().unwrap();
//! solver.solution.check_converged().unwrap();
//! ```
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod io;
pub mod solver;
pub mod timers;
