#![allow(non_snake_case)]

use std::ops::Index;

/// Matrix orientation. T = transpose, N = non-transposed
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum MatrixShape {
    N,
    T,
}

/// Dimension queries common to dense, sparse and adjoint matrix types
pub trait ShapedMatrix {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn shape(&self) -> MatrixShape;
    fn size(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }
}

//NB: the concrete dense type is just called "Matrix".  The "DenseMatrix" trait
//is implemented on Matrix and Adjoint to allow for indexing of values in
//either format.   This follows the Julia naming convention for similar types.
pub trait DenseMatrix: ShapedMatrix + Index<(usize, usize), Output = Self::T> {
    type T;
    fn index_linear(&self, idx: (usize, usize)) -> usize;
    fn data(&self) -> &[Self::T];
}

/// Adjoint of a matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjoint<'a, M> {
    pub src: &'a M,
}
