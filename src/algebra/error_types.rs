use thiserror::Error;

#[derive(Error, Debug)]
/// Error type returned by sparse matrix assembly operations.
pub enum SparseFormatError {
    /// Matrix dimension fields and/or array lengths are incompatible
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    /// Data is not sorted by row index within each column
    #[error("Data is not sorted by row index within each column")]
    BadRowOrdering,
    #[error("Row value exceeds the matrix row dimension")]
    /// Row value exceeds the matrix row dimension
    BadRowval,
    #[error("Bad column pointer values")]
    /// Matrix column pointer values are defective
    BadColptr,
}

/// Error type returned by the dense factorization engines.  Errors
/// carry the info code reported by the failing routine.
#[allow(clippy::upper_case_acronyms)]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenseFactorizationError {
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    #[error("Hessenberg reduction error")]
    Hessenberg(i32),
    #[error("Schur factorization error")]
    Schur(i32),
    #[error("Eigenvector computation error")]
    Eigenvectors(i32),
    #[error("Symmetric eigendecomposition error")]
    SymEigen(i32),
    #[error("LU error")]
    LU(i32),
}

impl DenseFactorizationError {
    /// name of the routine that reported the failure
    pub fn routine(&self) -> &'static str {
        cfg_if::cfg_if! {
            if #[cfg(feature="lapack")] {
                match self {
                    Self::IncompatibleDimension => "checkdim",
                    Self::Hessenberg(_) => "xgehrd",
                    Self::Schur(_) => "xhseqr",
                    Self::Eigenvectors(_) => "hqr_backsub",
                    Self::SymEigen(_) => "xsyevr",
                    Self::LU(_) => "getrf",
                }
            } else {
                match self {
                    Self::IncompatibleDimension => "checkdim",
                    Self::Hessenberg(_) => "orthes",
                    Self::Schur(_) => "hqr",
                    Self::Eigenvectors(_) => "hqr_backsub",
                    Self::SymEigen(_) => "tql2",
                    Self::LU(_) => "getrf",
                }
            }
        }
    }

    /// the info code reported by the routine
    pub fn info(&self) -> i32 {
        match *self {
            Self::IncompatibleDimension => -1,
            Self::Hessenberg(i)
            | Self::Schur(i)
            | Self::Eigenvectors(i)
            | Self::SymEigen(i)
            | Self::LU(i) => i,
        }
    }
}
