#![allow(non_snake_case)]

use crate::algebra::*;

// Symmetric eigendecomposition by Householder tridiagonalization followed
// by the implicit QL method.  Derived from the Algol procedures tred2 and
// tql2 (Bowdler, Martin, Reinsch and Wilkinson, Handbook for Automatic
// Computation, Vol. II) and the corresponding EISPACK routines.

// QL sweeps allowed per eigenvalue
#[cfg_attr(feature = "lapack", allow(dead_code))]
const QL_ITER_MAX: usize = 30;

/// Full eigendecomposition of the symmetric matrix held in `V`.  On exit `d`
/// holds the eigenvalues in ascending order and the columns of `V` the
/// corresponding orthonormal eigenvectors.  Only the lower triangle of
/// `V` is read.
#[cfg_attr(feature = "lapack", allow(dead_code))]
pub(crate) fn native_symeigen<T: FloatT>(
    V: &mut Matrix<T>,
    d: &mut [T],
) -> Result<(), DenseFactorizationError> {
    let n = V.m;
    if V.n != n || d.len() != n {
        return Err(DenseFactorizationError::IncompatibleDimension);
    }
    if n == 0 {
        return Ok(());
    }
    let mut e = vec![T::zero(); n];
    tred2(V, d, &mut e);
    tql2(V, d, &mut e)
}

#[cfg_attr(feature = "lapack", allow(dead_code))]
fn tred2<T: FloatT>(V: &mut Matrix<T>, d: &mut [T], e: &mut [T]) {
    let n = V.m;
    for j in 0..n {
        d[j] = V[(n - 1, j)];
    }

    // Householder reduction to tridiagonal form
    for i in (1..n).rev() {
        let mut scale = T::zero();
        let mut h = T::zero();
        for dk in d.iter().take(i) {
            scale += T::abs(*dk);
        }
        if scale == T::zero() {
            e[i] = d[i - 1];
            for j in 0..i {
                d[j] = V[(i - 1, j)];
                V[(i, j)] = T::zero();
                V[(j, i)] = T::zero();
            }
        } else {
            // generate Householder vector
            for dk in d.iter_mut().take(i) {
                *dk /= scale;
                h += *dk * *dk;
            }
            let mut f = d[i - 1];
            let mut g = T::sqrt(h);
            if f > T::zero() {
                g = -g;
            }
            e[i] = scale * g;
            h -= f * g;
            d[i - 1] = f - g;
            for ej in e.iter_mut().take(i) {
                *ej = T::zero();
            }

            // apply similarity transformation to remaining columns
            for j in 0..i {
                f = d[j];
                V[(j, i)] = f;
                g = e[j] + V[(j, j)] * f;
                for k in (j + 1)..i {
                    g += V[(k, j)] * d[k];
                    e[k] += V[(k, j)] * f;
                }
                e[j] = g;
            }
            f = T::zero();
            for j in 0..i {
                e[j] /= h;
                f += e[j] * d[j];
            }
            let hh = f / (h + h);
            for j in 0..i {
                e[j] -= hh * d[j];
            }
            for j in 0..i {
                f = d[j];
                g = e[j];
                for k in j..i {
                    let vkj = V[(k, j)];
                    V[(k, j)] = vkj - (f * e[k] + g * d[k]);
                }
                d[j] = V[(i - 1, j)];
                V[(i, j)] = T::zero();
            }
        }
        d[i] = h;
    }

    // accumulate transformations
    for i in 0..(n - 1) {
        V[(n - 1, i)] = V[(i, i)];
        V[(i, i)] = T::one();
        let h = d[i + 1];
        if h != T::zero() {
            for k in 0..=i {
                d[k] = V[(k, i + 1)] / h;
            }
            for j in 0..=i {
                let mut g = T::zero();
                for k in 0..=i {
                    g += V[(k, i + 1)] * V[(k, j)];
                }
                for k in 0..=i {
                    let vkj = V[(k, j)];
                    V[(k, j)] = vkj - g * d[k];
                }
            }
        }
        for k in 0..=i {
            V[(k, i + 1)] = T::zero();
        }
    }
    for j in 0..n {
        d[j] = V[(n - 1, j)];
        V[(n - 1, j)] = T::zero();
    }
    V[(n - 1, n - 1)] = T::one();
    e[0] = T::zero();
}

#[cfg_attr(feature = "lapack", allow(dead_code))]
fn tql2<T: FloatT>(V: &mut Matrix<T>, d: &mut [T], e: &mut [T]) -> Result<(), DenseFactorizationError> {
    let n = V.m;
    let eps = T::epsilon();
    let two: T = (2.).as_T();

    for i in 1..n {
        e[i - 1] = e[i];
    }
    e[n - 1] = T::zero();

    let mut f = T::zero();
    let mut tst1 = T::zero();
    for l in 0..n {
        // find small subdiagonal element
        tst1 = T::max(tst1, T::abs(d[l]) + T::abs(e[l]));
        let mut m = l;
        while m < n - 1 {
            if T::abs(e[m]) <= eps * tst1 {
                break;
            }
            m += 1;
        }

        // if m == l, d[l] is an eigenvalue, otherwise iterate
        if m > l {
            let mut iter = 0;
            loop {
                iter += 1;
                if iter > QL_ITER_MAX {
                    return Err(DenseFactorizationError::SymEigen((l + 1) as i32));
                }

                // compute implicit shift
                let mut g = d[l];
                let mut p = (d[l + 1] - g) / (two * e[l]);
                let mut r = T::hypot(p, T::one());
                if p < T::zero() {
                    r = -r;
                }
                d[l] = e[l] / (p + r);
                d[l + 1] = e[l] * (p + r);
                let dl1 = d[l + 1];
                let mut h = g - d[l];
                for di in d.iter_mut().skip(l + 2) {
                    *di -= h;
                }
                f += h;

                // implicit QL transformation
                p = d[m];
                let mut c = T::one();
                let mut c2 = c;
                let mut c3 = c;
                let el1 = e[l + 1];
                let mut s = T::zero();
                let mut s2 = T::zero();
                for i in (l..m).rev() {
                    c3 = c2;
                    c2 = c;
                    s2 = s;
                    g = c * e[i];
                    h = c * p;
                    r = T::hypot(p, e[i]);
                    e[i + 1] = s * r;
                    s = e[i] / r;
                    c = p / r;
                    p = c * d[i] - s * g;
                    d[i + 1] = h + s * (c * g + s * d[i]);

                    // accumulate transformation
                    for k in 0..n {
                        h = V[(k, i + 1)];
                        V[(k, i + 1)] = s * V[(k, i)] + c * h;
                        V[(k, i)] = c * V[(k, i)] - s * h;
                    }
                }
                p = -s * s2 * c3 * el1 * e[l] / dl1;
                e[l] = s * p;
                d[l] = c * p;

                if T::abs(e[l]) <= eps * tst1 {
                    break;
                }
            }
        }
        d[l] += f;
        e[l] = T::zero();
    }

    // sort eigenvalues and corresponding vectors
    for i in 0..(n - 1) {
        let mut k = i;
        let mut p = d[i];
        for (j, &dj) in d.iter().enumerate().skip(i + 1) {
            if dj < p {
                k = j;
                p = dj;
            }
        }
        if k != i {
            d[k] = d[i];
            d[i] = p;
            V.swap_cols(i, k);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symeigen() {
        let S = Matrix::<f64>::from(&[
            [3., 2., 4.], //
            [2., 0., 2.], //
            [4., 2., 3.], //
        ]);
        let mut V = S.clone();
        let mut d = vec![0.; 3];
        native_symeigen(&mut V, &mut d).unwrap();
        assert!(d.norm_inf_diff(&[-1., -1., 8.]) < 1e-12);

        // V*diag(d)*V' == S
        let mut Vd = V.clone();
        for c in 0..3 {
            Vd.col_slice_mut(c).scale(d[c]);
        }
        let mut M = Matrix::zeros((3, 3));
        M.mul(&Vd, &V.t(), 1.0, 0.0);
        assert!(M.data.norm_inf_diff(&S.data) < 1e-12);
    }

    #[test]
    fn test_symeigen_tridiagonal() {
        // 1D laplacian, eigenvalues 2 - 2cos(kπ/(n+1))
        let n = 6;
        let T = Matrix::<f64>::tridiagonal(&vec![2.; n], &vec![-1.; n - 1]);
        let mut V = T.clone();
        let mut d = vec![0.; n];
        native_symeigen(&mut V, &mut d).unwrap();
        for k in 0..n {
            let exact = 2. - 2. * f64::cos((k + 1) as f64 * std::f64::consts::PI / (n + 1) as f64);
            assert!((d[k] - exact).abs() < 1e-13);
        }

        let mut I = Matrix::zeros((n, n));
        I.mul(&V.t(), &V, 1.0, 0.0);
        assert!(I.data.norm_inf_diff(&Matrix::<f64>::identity(n).data) < 1e-13);
    }

    #[test]
    fn test_symeigen_1x1() {
        let mut V = Matrix::<f64>::from(&[[-4.]]);
        let mut d = vec![0.];
        native_symeigen(&mut V, &mut d).unwrap();
        assert_eq!(d, [-4.]);
        assert_eq!(V.data, [1.]);
    }
}
