#![allow(non_snake_case)]

use crate::algebra::{FloatT, Matrix};

// Householder reduction to upper Hessenberg form, H = U'*A*U.
// Derived from the Algol procedures orthes and ortran, Handbook for
// Automatic Computation, Vol. II (Linear Algebra), via EISPACK.
// On exit H holds the Hessenberg form with everything below the first
// subdiagonal set to zero, and U the accumulated transformations.

#[cfg_attr(feature = "lapack", allow(dead_code))]
pub(crate) fn hessenberg_reduce<T: FloatT>(H: &mut Matrix<T>, U: &mut Matrix<T>) {
    let n = H.m;
    assert!(H.n == n && U.m == n && U.n == n);
    U.set_identity();
    if n < 3 {
        return;
    }

    let high = n - 1;
    let mut ort = vec![T::zero(); n];

    for m in 1..high {
        // scale column
        let scale = (m..=high).fold(T::zero(), |acc, i| acc + T::abs(H[(i, m - 1)]));
        if scale == T::zero() {
            continue;
        }

        // Householder vector
        let mut h = T::zero();
        for i in (m..=high).rev() {
            ort[i] = H[(i, m - 1)] / scale;
            h += ort[i] * ort[i];
        }
        let mut g = T::sqrt(h);
        if ort[m] > T::zero() {
            g = -g;
        }
        h -= ort[m] * g;
        ort[m] -= g;

        // H = (I - u*u'/h) * H * (I - u*u'/h)
        for j in m..n {
            let mut f = T::zero();
            for i in (m..=high).rev() {
                f += ort[i] * H[(i, j)];
            }
            f /= h;
            for i in m..=high {
                H[(i, j)] -= f * ort[i];
            }
        }
        for i in 0..=high {
            let mut f = T::zero();
            for j in (m..=high).rev() {
                f += ort[j] * H[(i, j)];
            }
            f /= h;
            for j in m..=high {
                H[(i, j)] -= f * ort[j];
            }
        }
        ort[m] *= scale;
        H[(m, m - 1)] = scale * g;
    }

    // accumulate transformations in reverse order.  The Householder
    // vectors still sit below the subdiagonal of H at this point.
    for m in (1..high).rev() {
        if H[(m, m - 1)] == T::zero() {
            continue;
        }
        for i in (m + 1)..=high {
            ort[i] = H[(i, m - 1)];
        }
        for j in m..=high {
            let mut g = T::zero();
            for i in m..=high {
                g += ort[i] * U[(i, j)];
            }
            // double division avoids possible underflow
            g = (g / ort[m]) / H[(m, m - 1)];
            for i in m..=high {
                U[(i, j)] += g * ort[i];
            }
        }
    }

    for j in 0..n {
        for i in (j + 2)..n {
            H[(i, j)] = T::zero();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{MultiplyGEMM, VectorMath};

    #[test]
    fn test_hessenberg_similarity() {
        let A = Matrix::<f64>::from(&[
            [4., 1., -2., 2.],  //
            [1., 2., 0., 1.],   //
            [-2., 0., 3., -2.], //
            [2., 1., -2., -1.], //
        ]);
        let mut H = A.clone();
        let mut U = Matrix::zeros((4, 4));
        hessenberg_reduce(&mut H, &mut U);

        for j in 0..4 {
            for i in (j + 2)..4 {
                assert_eq!(H[(i, j)], 0.);
            }
        }

        // U*H*U' == A
        let mut UH = Matrix::zeros((4, 4));
        UH.mul(&U, &H, 1.0, 0.0);
        let mut B = Matrix::zeros((4, 4));
        B.mul(&UH, &U.t(), 1.0, 0.0);
        assert!(B.data.norm_inf_diff(&A.data) < 1e-12);

        // U'*U == I
        let mut I = Matrix::zeros((4, 4));
        I.mul(&U.t(), &U, 1.0, 0.0);
        assert!(I.data.norm_inf_diff(&Matrix::<f64>::identity(4).data) < 1e-13);
    }
}
