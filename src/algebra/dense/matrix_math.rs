#![allow(non_snake_case)]

use crate::algebra::{Adjoint, DenseMatrix, FloatT, Matrix, MatrixVectorMultiply, ShapedMatrix};

/// General matrix-matrix multiply on dense matrices
pub trait MultiplyGEMM<T> {
    /// BLAS-like product `self = α*A*B + β*self`
    fn mul<MATA, MATB>(&mut self, A: &MATA, B: &MATB, α: T, β: T) -> &Self
    where
        MATA: DenseMatrix<T = T>,
        MATB: DenseMatrix<T = T>;
}

impl<T> MultiplyGEMM<T> for Matrix<T>
where
    T: FloatT,
{
    fn mul<MATA, MATB>(&mut self, A: &MATA, B: &MATB, α: T, β: T) -> &Self
    where
        MATA: DenseMatrix<T = T>,
        MATB: DenseMatrix<T = T>,
    {
        assert!(A.ncols() == B.nrows() && self.nrows() == A.nrows() && self.ncols() == B.ncols());

        let (m, k) = A.size();
        let n = B.ncols();

        for j in 0..n {
            for i in 0..m {
                let mut acc = T::zero();
                for l in 0..k {
                    acc += A[(i, l)] * B[(l, j)];
                }
                let cij = &mut self[(i, j)];
                *cij = if β == T::zero() {
                    α * acc
                } else {
                    α * acc + β * *cij
                };
            }
        }
        self
    }
}

impl<T> MatrixVectorMultiply for Matrix<T>
where
    T: FloatT,
{
    type T = T;
    // implements y = αA*x + βy
    fn gemv(&self, y: &mut [T], x: &[T], α: T, β: T) {
        assert!(x.len() == self.n && y.len() == self.m);

        if β == T::zero() {
            y.iter_mut().for_each(|yi| *yi = T::zero());
        } else if β != T::one() {
            y.iter_mut().for_each(|yi| *yi *= β);
        }
        for (j, &xj) in x.iter().enumerate() {
            let s = α * xj;
            if s == T::zero() {
                continue;
            }
            for (yi, &aij) in y.iter_mut().zip(self.col_slice(j)) {
                *yi += s * aij;
            }
        }
    }
}

impl<T> MatrixVectorMultiply for Adjoint<'_, Matrix<T>>
where
    T: FloatT,
{
    type T = T;
    // implements y = αA'*x + βy
    fn gemv(&self, y: &mut [T], x: &[T], α: T, β: T) {
        let A = self.src;
        assert!(x.len() == A.m && y.len() == A.n);

        for (j, yj) in y.iter_mut().enumerate() {
            let mut acc = T::zero();
            for (&aij, &xi) in A.col_slice(j).iter().zip(x) {
                acc += aij * xi;
            }
            *yj = if β == T::zero() {
                α * acc
            } else {
                α * acc + β * *yj
            };
        }
    }
}

#[test]
fn test_gemv() {
    let A = Matrix::<f64>::from(&[
        [1., 2., 3.], //
        [4., 5., 6.], //
    ]);

    let x = vec![1., 2., 3.];
    let mut y = vec![-1., -2.];
    A.gemv(&mut y, &x, 2.0, 3.0);
    assert!(y == [25.0, 58.0]);

    let x = vec![1., 2.];
    let mut y = vec![-1., -2., -3.];
    A.t().gemv(&mut y, &x, 2.0, 3.0);
    assert!(y == [15.0, 18.0, 21.0]);
}

#[test]
fn test_gemm() {
    let A = Matrix::<f64>::from(&[
        [1., 2.], //
        [3., 4.], //
    ]);
    let B = Matrix::<f64>::from(&[
        [0., 1.], //
        [1., 0.], //
    ]);
    let mut C = Matrix::<f64>::identity(2);
    C.mul(&A, &B, 1.0, 1.0);
    assert_eq!(C, Matrix::<f64>::from(&[[3., 1.], [4., 4.]]));

    let mut D = Matrix::<f64>::zeros((2, 2));
    D.mul(&A.t(), &A, 1.0, 0.0);
    assert_eq!(D, Matrix::<f64>::from(&[[10., 14.], [14., 20.]]));
}
