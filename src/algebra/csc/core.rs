#![allow(non_snake_case)]

use crate::algebra::{Adjoint, FloatT, Matrix, MatrixShape, ShapedMatrix, SparseFormatError};
use std::iter::zip;

/// Sparse matrix in Compressed Sparse Column (CSC) format.
///
/// Column `j` holds the entries `nzval[colptr[j]..colptr[j+1]]` at rows
/// `rowval[colptr[j]..colptr[j+1]]`.  The 1D Laplacian, a typical operator
/// for the eigensolvers, is
///
/// ```no_run
/// use krylov::algebra::CscMatrix;
///
/// let n = 100;
/// let A = CscMatrix::<f64>::tridiagonal(&vec![2.; n], &vec![-1.; n - 1]);
/// assert!(A.check_format().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// column pointer, length `n+1`, last entry equal to the number of nonzeros
    pub colptr: Vec<usize>,
    pub rowval: Vec<usize>,
    pub nzval: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// Panics if the array lengths disagree.  Row ordering and bounds are
    /// not checked here, see [`check_format`](Self::check_format).
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(colptr[n], rowval.len());
        CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    pub fn identity(n: usize) -> Self {
        CscMatrix::new(n, n, (0..=n).collect(), (0..n).collect(), vec![T::one(); n])
    }

    /// Symmetric tridiagonal matrix with diagonal `d` and off-diagonal `e`
    pub fn tridiagonal(d: &[T], e: &[T]) -> Self {
        let n = d.len();
        assert!(e.len() + 1 == n || (n == 0 && e.is_empty()));
        let mut colptr = Vec::with_capacity(n + 1);
        let mut rowval = Vec::with_capacity(3 * n);
        let mut nzval = Vec::with_capacity(3 * n);

        colptr.push(0);
        for col in 0..n {
            if col > 0 {
                rowval.push(col - 1);
                nzval.push(e[col - 1]);
            }
            rowval.push(col);
            nzval.push(d[col]);
            if col + 1 < n {
                rowval.push(col + 1);
                nzval.push(e[col]);
            }
            colptr.push(rowval.len());
        }
        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    /// Verify array lengths, monotone column pointers, strictly increasing
    /// rows within each column and row bounds
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.colptr.len() != self.n + 1
            || self.rowval.len() != self.nzval.len()
            || self.colptr[self.n] != self.rowval.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }
        if self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }
        for rows in self.colptr.windows(2).map(|c| &self.rowval[c[0]..c[1]]) {
            if rows.windows(2).any(|r| r[0] >= r[1]) {
                return Err(SparseFormatError::BadRowOrdering);
            }
            if rows.last().is_some_and(|&r| r >= self.m) {
                return Err(SparseFormatError::BadRowval);
            }
        }
        Ok(())
    }

    /// Infinity norm, i.e. the maximum absolute row sum
    pub fn norm_inf(&self) -> T {
        let mut rowsums = vec![T::zero(); self.m];
        for (&row, &val) in zip(&self.rowval, &self.nzval) {
            rowsums[row] += T::abs(val);
        }
        rowsums.into_iter().fold(T::zero(), T::max)
    }

    pub fn to_dense(&self) -> Matrix<T> {
        let mut M = Matrix::zeros((self.m, self.n));
        for col in 0..self.n {
            for k in self.colptr[col]..self.colptr[col + 1] {
                M[(self.rowval[k], col)] += self.nzval[k];
            }
        }
        M
    }
}

impl<T> From<&Matrix<T>> for CscMatrix<T>
where
    T: FloatT,
{
    // keeps the nonzero entries only
    fn from(M: &Matrix<T>) -> CscMatrix<T> {
        let mut colptr = Vec::with_capacity(M.n + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();

        colptr.push(0);
        for col in 0..M.n {
            for (row, &v) in M.col_slice(col).iter().enumerate() {
                if v != T::zero() {
                    rowval.push(row);
                    nzval.push(v);
                }
            }
            colptr.push(rowval.len());
        }
        CscMatrix::new(M.m, M.n, colptr, rowval, nzval)
    }
}

impl<T> ShapedMatrix for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn shape(&self) -> MatrixShape {
        MatrixShape::N
    }
}

impl<T> ShapedMatrix for Adjoint<'_, CscMatrix<T>> {
    fn nrows(&self) -> usize {
        self.src.n
    }
    fn ncols(&self) -> usize {
        self.src.m
    }
    fn shape(&self) -> MatrixShape {
        MatrixShape::T
    }
}

#[test]
fn test_csc_format_and_norm() {
    // A =
    //[ ⋅   4.0    ⋅    ⋅   12.0]
    //[1.0  5.0    ⋅    ⋅     ⋅ ]
    //[ ⋅   6.0    ⋅    ⋅   13.0]
    //[2.0  7.0  10.0   ⋅     ⋅ ]
    //[ ⋅   8.0  11.0   ⋅   14.0]
    //[3.0  9.0    ⋅    ⋅     ⋅ ]

    let A = CscMatrix::new(
        6,                                                                 // m
        5,                                                                 // n
        vec![0, 3, 9, 11, 11, 14],                                         // colptr
        vec![1, 3, 5, 0, 1, 2, 3, 4, 5, 3, 4, 0, 2, 4],                    // rowval
        vec![1., 2., 3., 4., 5., 6., 7., 8., 9., 10., 11., 12., 13., 14.], // nzval
    );
    assert!(A.check_format().is_ok());
    assert_eq!(A.to_dense()[(3, 2)], 10.);

    // row 4 : 8 + 11 + 14
    assert_eq!(A.norm_inf(), 33.);

    let out_of_bounds = CscMatrix::new(2, 1, vec![0, 2], vec![0, 2], vec![1., 1.]);
    assert!(matches!(
        out_of_bounds.check_format(),
        Err(SparseFormatError::BadRowval)
    ));
}

#[test]
fn test_csc_dense_conversions() {
    let T = CscMatrix::<f64>::tridiagonal(&[2., 2., 2.], &[-1., -1.]);
    assert!(T.check_format().is_ok());
    assert_eq!(T.nnz(), 7);

    let D = T.to_dense();
    assert_eq!(D, Matrix::<f64>::tridiagonal(&[2., 2., 2.], &[-1., -1.]));
    assert_eq!(CscMatrix::from(&D), T);
    assert_eq!(CscMatrix::<f64>::identity(3).to_dense(), Matrix::identity(3));

    let bad = CscMatrix::new(2, 1, vec![0, 2], vec![1, 0], vec![1., 1.]);
    assert!(matches!(
        bad.check_format(),
        Err(SparseFormatError::BadRowOrdering)
    ));
}
