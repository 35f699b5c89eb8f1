#![allow(non_snake_case)]

use crate::algebra::{DenseFactorizationError, FloatT, Matrix, ShapedMatrix};

/// LU factorization with partial pivoting, `P*A = L*U`.
///
/// The factors are held in place in a copy of `A`, with the unit lower
/// triangle of `L` below the diagonal.
#[derive(Debug, Clone)]
pub struct DenseLU<T> {
    LU: Matrix<T>,
    ipiv: Vec<usize>,
}

impl<T> DenseLU<T>
where
    T: FloatT,
{
    /// Factor the square matrix `A`.  An exactly singular pivot is
    /// reported using the (1-based) LAPACK `getrf` convention.
    pub fn factor(A: &Matrix<T>) -> Result<Self, DenseFactorizationError> {
        if !A.is_square() {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        let n = A.nrows();
        let mut LU = A.clone();
        let mut ipiv = vec![0; n];

        for k in 0..n {
            // partial pivoting on column k
            let mut p = k;
            let mut pmax = T::abs(LU[(k, k)]);
            for i in (k + 1)..n {
                let v = T::abs(LU[(i, k)]);
                if v > pmax {
                    p = i;
                    pmax = v;
                }
            }
            ipiv[k] = p;
            if pmax == T::zero() {
                return Err(DenseFactorizationError::LU((k + 1) as i32));
            }
            if p != k {
                for j in 0..n {
                    let tmp = LU[(k, j)];
                    LU[(k, j)] = LU[(p, j)];
                    LU[(p, j)] = tmp;
                }
            }

            let pivot = LU[(k, k)];
            for i in (k + 1)..n {
                LU[(i, k)] /= pivot;
            }
            for j in (k + 1)..n {
                let ukj = LU[(k, j)];
                if ukj == T::zero() {
                    continue;
                }
                for i in (k + 1)..n {
                    let lik = LU[(i, k)];
                    LU[(i, j)] -= lik * ukj;
                }
            }
        }
        Ok(Self { LU, ipiv })
    }

    pub fn dim(&self) -> usize {
        self.LU.nrows()
    }

    /// Solve `A*x = b` in place
    pub fn solve_in_place(&self, b: &mut [T]) {
        let n = self.dim();
        assert_eq!(b.len(), n);
        let LU = &self.LU;

        for k in 0..n {
            b.swap(k, self.ipiv[k]);
        }
        // forward substitution with unit L
        for j in 0..n {
            let bj = b[j];
            for i in (j + 1)..n {
                b[i] -= LU[(i, j)] * bj;
            }
        }
        // back substitution with U
        for j in (0..n).rev() {
            b[j] /= LU[(j, j)];
            let bj = b[j];
            for i in 0..j {
                b[i] -= LU[(i, j)] * bj;
            }
        }
    }

    /// Solve `A'*x = b` in place
    pub fn solve_transpose_in_place(&self, b: &mut [T]) {
        let n = self.dim();
        assert_eq!(b.len(), n);
        let LU = &self.LU;

        // U'*z = b
        for j in 0..n {
            let mut s = b[j];
            for i in 0..j {
                s -= LU[(i, j)] * b[i];
            }
            b[j] = s / LU[(j, j)];
        }
        // L'*w = z
        for j in (0..n).rev() {
            let mut s = b[j];
            for i in (j + 1)..n {
                s -= LU[(i, j)] * b[i];
            }
            b[j] = s;
        }
        for k in (0..n).rev() {
            b.swap(k, self.ipiv[k]);
        }
    }
}

macro_rules! generate_test_lu {
    ($fxx:ty, $test_name:ident, $tol:expr) => {
        #[test]
        fn $test_name() {
            use crate::algebra::{MatrixVectorMultiply, VectorMath};

            let A = Matrix::<$fxx>::from(&[
                [0., 2., 4.], //
                [2., 1., 2.], //
                [4., 2., 1.], //
            ]);
            let lu = DenseLU::factor(&A).unwrap();

            let x: Vec<$fxx> = vec![1., -2., 3.];
            let mut b = vec![0.; 3];
            A.gemv(&mut b, &x, 1.0, 0.0);
            lu.solve_in_place(&mut b);
            assert!(b.norm_inf_diff(&x) < $tol);

            A.t().gemv(&mut b, &x, 1.0, 0.0);
            lu.solve_transpose_in_place(&mut b);
            assert!(b.norm_inf_diff(&x) < $tol);

            let S = Matrix::<$fxx>::from(&[[1., 2.], [2., 4.]]);
            assert!(matches!(
                DenseLU::factor(&S),
                Err(DenseFactorizationError::LU(2))
            ));
        }
    };
}

generate_test_lu!(f32, test_lu_f32, 1e-5);
generate_test_lu!(f64, test_lu_f64, 1e-12);
