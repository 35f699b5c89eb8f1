use super::FloatT;

// Basis vectors, residuals and Ritz vectors are all stored as plain
// slices, so the Krylov kernels only need the slice operations below
// plus a matrix-vector product.

/// Vector operations on slices of [`FloatT`](crate::algebra::FloatT)

pub trait VectorMath {
    type T;

    /// Copy values from `src` to `self`
    fn copy_from(&mut self, src: &Self) -> &mut Self;

    /// set all elements to the same value
    fn set(&mut self, c: Self::T) -> &mut Self;

    /// Elementwise scaling.
    fn scale(&mut self, c: Self::T) -> &mut Self;

    /// Elementwise negation of entries.
    fn negate(&mut self) -> &mut Self;

    /// Scale to unit 2-norm and return the original norm.  A zero vector
    /// is left unchanged and 0 is returned.
    fn normalize(&mut self) -> Self::T;

    fn dot(&self, y: &Self) -> Self::T;

    /// 2-norm of `self - y`
    fn dist(&self, y: &Self) -> Self::T;

    /// 2-norm, computed without intermediate overflow
    fn norm(&self) -> Self::T;

    /// Infinity norm.  NaN if any element is NaN.
    fn norm_inf(&self) -> Self::T;

    /// max absolute difference between `self` and `b`
    fn norm_inf_diff(&self, b: &Self) -> Self::T;

    /// `self = a*x + b*self`
    fn axpby(&mut self, a: Self::T, x: &Self, b: Self::T) -> &mut Self;
}

/// Matrix-vector products for matrices of [`FloatT`](crate::algebra::FloatT)

pub trait MatrixVectorMultiply {
    type T: FloatT;

    /// BLAS-like general matrix-vector multiply.  Produces `y = a*self*x + b*y`
    fn gemv(&self, y: &mut [Self::T], x: &[Self::T], a: Self::T, b: Self::T);
}
