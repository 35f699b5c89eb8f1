use crate::algebra::DenseFactorizationError;
use crate::solver::core::SettingsError;
use thiserror::Error;

/// Error type returned by the eigensolvers.
///
/// Breakdown of a factorization and failure to converge are normally
/// handled internally and reported through the solution status.  They
/// only surface as errors when a caller asks for them explicitly, e.g.
/// via [`EigenSolution::check_converged`](crate::solver::EigenSolution::check_converged).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KrylovError {
    /// An invariant subspace was found and no continuation was possible
    #[error("Krylov factorization broke down at step {step}")]
    Breakdown { step: usize },

    /// A dense numerical routine reported a non-zero status code
    #[error("Error in dense routine {routine}: info = {info}")]
    LibraryFailure { routine: &'static str, info: i32 },

    /// Problem dimensions or settings are unusable
    #[error("Invalid problem configuration: {0}")]
    PreconditionViolation(String),

    /// Fewer than `nev` eigenpairs converged within `its` iterations
    #[error("Only {nconv} of {nev} requested eigenpairs converged after {its} iterations")]
    NonConvergence { nconv: usize, nev: usize, its: u32 },
}

/// Fieldless classification of a [`KrylovError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Breakdown,
    LibraryFailure,
    PreconditionViolation,
    NonConvergence,
}

impl KrylovError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KrylovError::Breakdown { .. } => ErrorKind::Breakdown,
            KrylovError::LibraryFailure { .. } => ErrorKind::LibraryFailure,
            KrylovError::PreconditionViolation(_) => ErrorKind::PreconditionViolation,
            KrylovError::NonConvergence { .. } => ErrorKind::NonConvergence,
        }
    }

    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        KrylovError::PreconditionViolation(msg.into())
    }
}

impl From<DenseFactorizationError> for KrylovError {
    fn from(e: DenseFactorizationError) -> Self {
        match e {
            DenseFactorizationError::IncompatibleDimension => {
                KrylovError::precondition("dense problem dimensions are incompatible")
            }
            _ => KrylovError::LibraryFailure {
                routine: e.routine(),
                info: e.info(),
            },
        }
    }
}

impl From<SettingsError> for KrylovError {
    fn from(e: SettingsError) -> Self {
        KrylovError::PreconditionViolation(e.to_string())
    }
}

#[test]
fn test_error_conversions() {
    let e: KrylovError = DenseFactorizationError::Schur(3).into();
    assert_eq!(e.kind(), ErrorKind::LibraryFailure);
    assert!(matches!(e, KrylovError::LibraryFailure { info: 3, .. }));
    assert!(e.to_string().contains("info = 3"));

    let e: KrylovError = SettingsError::BadFieldValue("tol").into();
    assert_eq!(e.kind(), ErrorKind::PreconditionViolation);
    assert!(e.to_string().contains("tol"));

    let e = KrylovError::NonConvergence {
        nconv: 1,
        nev: 4,
        its: 100,
    };
    assert_eq!(
        e.to_string(),
        "Only 1 of 4 requested eigenpairs converged after 100 iterations"
    );
}
