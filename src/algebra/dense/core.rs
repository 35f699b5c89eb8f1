#![allow(non_snake_case)]

use crate::algebra::{Adjoint, DenseMatrix, FloatT, MatrixShape, ShapedMatrix, VectorMath};
use std::ops::{Index, IndexMut, Range};

/// Dense matrix in column major format
///
/// __Example usage__ : To construct the 2 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  4.  6.]
/// ```
///
/// ```no_run
/// use krylov::algebra::Matrix;
///
/// let A : Matrix<f64> = Matrix::from(&[
///     [1., 3., 5.],
///     [2., 4., 6.],
/// ]);
/// assert_eq!(A[(1, 2)], 6.);
/// ```

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// vector of data in column major format
    pub data: Vec<T>,
}

impl<T> Matrix<T>
where
    T: FloatT,
{
    pub fn zeros(size: (usize, usize)) -> Self {
        let (m, n) = size;
        let data = vec![T::zero(); m * n];
        Self { m, n, data }
    }

    pub fn identity(n: usize) -> Self {
        let mut mat = Matrix::zeros((n, n));
        mat.set_identity();
        mat
    }

    pub fn set_identity(&mut self) {
        assert!(self.m == self.n);
        self.data.set(T::zero());
        for i in 0..self.n {
            self[(i, i)] = T::one();
        }
    }

    /// square matrix with `d` on the diagonal
    pub fn diagonal(d: &[T]) -> Self {
        let mut mat = Matrix::zeros((d.len(), d.len()));
        for (i, &di) in d.iter().enumerate() {
            mat[(i, i)] = di;
        }
        mat
    }

    /// symmetric tridiagonal matrix with diagonal `d` and
    /// off-diagonal `e`
    pub fn tridiagonal(d: &[T], e: &[T]) -> Self {
        assert!(e.len() + 1 == d.len() || (d.is_empty() && e.is_empty()));
        let mut mat = Matrix::diagonal(d);
        for (i, &ei) in e.iter().enumerate() {
            mat[(i + 1, i)] = ei;
            mat[(i, i + 1)] = ei;
        }
        mat
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    pub fn col_slice(&self, col: usize) -> &[T] {
        assert!(col < self.n);
        &self.data[(col * self.m)..(col + 1) * self.m]
    }

    pub fn col_slice_mut(&mut self, col: usize) -> &mut [T] {
        assert!(col < self.n);
        &mut self.data[(col * self.m)..(col + 1) * self.m]
    }

    /// Copy of the block `self[rows, cols]`
    pub fn submatrix(&self, rows: Range<usize>, cols: Range<usize>) -> Matrix<T> {
        assert!(rows.end <= self.m && cols.end <= self.n);
        let mut out = Matrix::zeros((rows.len(), cols.len()));
        for (jout, j) in cols.enumerate() {
            let src = &self.col_slice(j)[rows.clone()];
            out.col_slice_mut(jout).copy_from(src);
        }
        out
    }

    /// Overwrite the block of `self` starting at `corner` with `B`
    pub fn set_submatrix(&mut self, corner: (usize, usize), B: &Matrix<T>) {
        let (r0, c0) = corner;
        assert!(r0 + B.m <= self.m && c0 + B.n <= self.n);
        for j in 0..B.n {
            self.col_slice_mut(c0 + j)[r0..(r0 + B.m)].copy_from(B.col_slice(j));
        }
    }

    /// Zero the block `self[rows, cols]`
    pub fn clear_block(&mut self, rows: Range<usize>, cols: Range<usize>) {
        for j in cols {
            self.col_slice_mut(j)[rows.clone()].set(T::zero());
        }
    }

    /// Swap columns `i` and `j`
    pub fn swap_cols(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        let m = self.m;
        for r in 0..m {
            self.data.swap(r + i * m, r + j * m);
        }
    }

    pub fn is_symmetric(&self, tol: T) -> bool {
        if !self.is_square() {
            return false;
        }
        for c in 0..self.n {
            for r in (c + 1)..self.m {
                if T::abs(self[(r, c)] - self[(c, r)]) > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Infinity norm, i.e. the maximum absolute row sum
    pub fn norm_inf(&self) -> T {
        (0..self.m)
            .map(|r| (0..self.n).fold(T::zero(), |acc, c| acc + T::abs(self[(r, c)])))
            .fold(T::zero(), T::max)
    }
}

impl<T> ShapedMatrix for Matrix<T>
where
    T: FloatT,
{
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

impl<T> ShapedMatrix for Adjoint<'_, Matrix<T>>
where
    T: FloatT,
{
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

impl<T> DenseMatrix for Matrix<T>
where
    T: FloatT,
{
    type T = T;
    #[inline]
    fn index_linear(&self, idx: (usize, usize)) -> usize {
        idx.0 + self.m * idx.1
    }
    fn data(&self) -> &[T] {
        &self.data
    }
}

impl<T> DenseMatrix for Adjoint<'_, Matrix<T>>
where
    T: FloatT,
{
    type T = T;
    #[inline]
    fn index_linear(&self, idx: (usize, usize)) -> usize {
        self.src.index_linear((idx.1, idx.0))
    }
    fn data(&self) -> &[T] {
        &self.src.data
    }
}

impl<T> Index<(usize, usize)> for Matrix<T>
where
    T: FloatT,
{
    type Output = T;
    fn index(&self, idx: (usize, usize)) -> &Self::Output {
        &self.data[self.index_linear(idx)]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T>
where
    T: FloatT,
{
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut Self::Output {
        let lidx = self.index_linear(idx);
        &mut self.data[lidx]
    }
}

impl<T> Index<(usize, usize)> for Adjoint<'_, Matrix<T>>
where
    T: FloatT,
{
    type Output = T;
    fn index(&self, idx: (usize, usize)) -> &Self::Output {
        &self.src.data[self.index_linear(idx)]
    }
}

impl<T, const R: usize, const C: usize> From<&[[T; C]; R]> for Matrix<T>
where
    T: FloatT,
{
    // row-major array literal to column-major storage
    fn from(rows: &[[T; C]; R]) -> Matrix<T> {
        let mut out = Matrix::zeros((R, C));
        for (r, row) in rows.iter().enumerate() {
            for (c, &val) in row.iter().enumerate() {
                out[(r, c)] = val;
            }
        }
        out
    }
}

impl<T> std::fmt::Display for Matrix<T>
where
    T: FloatT,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f)?;
        for i in 0..self.m {
            write!(f, "[ ")?;
            for j in 0..self.n {
                write!(f, " {:+.6e}", self[(i, j)])?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

#[test]
fn test_matrix_indexing() {
    let A = Matrix::<f64>::from(&[
        [1., 3., 5.], //
        [2., 4., 6.], //
    ]);
    assert_eq!(A.data, vec![1., 2., 3., 4., 5., 6.]);
    assert_eq!(A[(1, 0)], 2.);
    assert_eq!(A.t()[(0, 1)], 2.);
    assert_eq!(A.t().size(), (3, 2));
    assert_eq!(A.col_slice(2), &[5., 6.]);
}

#[test]
fn test_submatrix() {
    let mut A = Matrix::<f64>::from(&[
        [1., 2., 3.], //
        [4., 5., 6.], //
        [7., 8., 9.], //
    ]);
    let B = A.submatrix(1..3, 0..2);
    assert_eq!(B, Matrix::<f64>::from(&[[4., 5.], [7., 8.]]));

    A.set_submatrix((0, 1), &B);
    assert_eq!(A[(0, 1)], 4.);
    assert_eq!(A[(1, 2)], 8.);

    A.clear_block(0..3, 0..1);
    assert_eq!(A.col_slice(0), &[0., 0., 0.]);

    A.swap_cols(1, 2);
    assert_eq!(A.col_slice(2), &[4., 7., 8.]);
}

#[test]
fn test_tridiagonal() {
    let T = Matrix::<f64>::tridiagonal(&[2., 2., 2.], &[-1., -1.]);
    assert!(T.is_symmetric(0.));
    assert_eq!(T[(2, 1)], -1.);
    assert_eq!(T[(2, 0)], 0.);
    assert_eq!(T.norm_inf(), 4.);
}
