#![allow(non_snake_case)]
#![allow(clippy::many_single_char_names)]

use super::hessenberg::hessenberg_reduce;
use crate::algebra::*;

// Native real Schur factorization.  The QR iteration is the Francis
// double shift scheme of the Algol procedure hqr2 (Handbook for Automatic
// Computation, Vol. II) via EISPACK, and the eigenvector back substitution
// is the second half of the same procedure, restricted to one requested
// eigenvalue or conjugate pair at a time.

// iteration limit per eigenvalue, as a multiple of max(n,10)
#[cfg_attr(feature = "lapack", allow(dead_code))]
const QR_ITER_FACTOR: usize = 30;

/// Reduce `S` (already upper Hessenberg) to real Schur form in place,
/// accumulating the transformations into `U`.  On success `wr` and `wi`
/// hold the eigenvalues in Schur order, with conjugate pairs stored
/// adjacently and the positive imaginary part first.
#[cfg_attr(feature = "lapack", allow(dead_code))]
pub(crate) fn hqr_schur<T: FloatT>(
    S: &mut Matrix<T>,
    U: &mut Matrix<T>,
    wr: &mut [T],
    wi: &mut [T],
) -> Result<(), DenseFactorizationError> {
    let nn = S.m;
    if nn == 0 {
        return Ok(());
    }
    let eps = T::epsilon();
    let maxiter = QR_ITER_FACTOR * usize::max(nn, 10);
    let two: T = (2.).as_T();
    let quarter3: T = (0.75).as_T();
    let shift7: T = (0.4375).as_T();
    let shift964: T = (0.964).as_T();

    let mut exshift = T::zero();
    let (mut p, mut q, mut r, mut s, mut z) = (T::zero(), T::zero(), T::zero(), T::zero(), T::zero());
    let (mut w, mut x, mut y) = (T::zero(), T::zero(), T::zero());

    let mut norm = T::zero();
    for i in 0..nn {
        for j in i.saturating_sub(1)..nn {
            norm += T::abs(S[(i, j)]);
        }
    }

    let mut iter = 0;
    let mut nend = nn;
    while nend > 0 {
        let n = nend - 1;

        // look for single small sub-diagonal element
        let mut l = n;
        while l > 0 {
            s = T::abs(S[(l - 1, l - 1)]) + T::abs(S[(l, l)]);
            if s == T::zero() {
                s = norm;
            }
            if T::abs(S[(l, l - 1)]) <= eps * s {
                break;
            }
            l -= 1;
        }

        if l == n {
            // one root found
            S[(n, n)] += exshift;
            wr[n] = S[(n, n)];
            wi[n] = T::zero();
            nend -= 1;
            iter = 0;
        } else if l == n - 1 {
            // two roots found
            w = S[(n, n - 1)] * S[(n - 1, n)];
            p = (S[(n - 1, n - 1)] - S[(n, n)]) / two;
            q = p * p + w;
            z = T::sqrt(T::abs(q));
            S[(n, n)] += exshift;
            S[(n - 1, n - 1)] += exshift;
            x = S[(n, n)];

            if q >= T::zero() {
                // real pair, rotate to triangular
                z = if p >= T::zero() { p + z } else { p - z };
                wr[n - 1] = x + z;
                wr[n] = wr[n - 1];
                if z != T::zero() {
                    wr[n] = x - w / z;
                }
                wi[n - 1] = T::zero();
                wi[n] = T::zero();
                x = S[(n, n - 1)];
                s = T::abs(x) + T::abs(z);
                p = x / s;
                q = z / s;
                r = T::sqrt(p * p + q * q);
                p /= r;
                q /= r;

                for j in (n - 1)..nn {
                    z = S[(n - 1, j)];
                    S[(n - 1, j)] = q * z + p * S[(n, j)];
                    S[(n, j)] = q * S[(n, j)] - p * z;
                }
                for i in 0..=n {
                    z = S[(i, n - 1)];
                    S[(i, n - 1)] = q * z + p * S[(i, n)];
                    S[(i, n)] = q * S[(i, n)] - p * z;
                }
                for i in 0..nn {
                    z = U[(i, n - 1)];
                    U[(i, n - 1)] = q * z + p * U[(i, n)];
                    U[(i, n)] = q * U[(i, n)] - p * z;
                }
            } else {
                // complex pair
                wr[n - 1] = x + p;
                wr[n] = x + p;
                wi[n - 1] = z;
                wi[n] = -z;
            }
            nend -= 2;
            iter = 0;
        } else {
            // no convergence yet, form shift
            x = S[(n, n)];
            y = S[(n - 1, n - 1)];
            w = S[(n, n - 1)] * S[(n - 1, n)];

            // Wilkinson's original ad hoc shift
            if iter == 10 {
                exshift += x;
                for i in 0..=n {
                    S[(i, i)] -= x;
                }
                s = T::abs(S[(n, n - 1)]) + T::abs(S[(n - 1, n - 2)]);
                x = quarter3 * s;
                y = x;
                w = -shift7 * s * s;
            }

            // MATLAB's ad hoc shift
            if iter == 30 {
                s = (y - x) / two;
                s = s * s + w;
                if s > T::zero() {
                    s = T::sqrt(s);
                    if y < x {
                        s = -s;
                    }
                    s = x - w / ((y - x) / two + s);
                    for i in 0..=n {
                        S[(i, i)] -= s;
                    }
                    exshift += s;
                    x = shift964;
                    y = x;
                    w = x;
                }
            }

            iter += 1;
            if iter > maxiter {
                // LAPACK style: eigenvalues nend+1..nn have converged
                return Err(DenseFactorizationError::Schur(nend as i32));
            }

            // look for two consecutive small sub-diagonal elements
            let mut m = n - 2;
            loop {
                z = S[(m, m)];
                r = x - z;
                s = y - z;
                p = (r * s - w) / S[(m + 1, m)] + S[(m, m + 1)];
                q = S[(m + 1, m + 1)] - z - r - s;
                r = S[(m + 2, m + 1)];
                s = T::abs(p) + T::abs(q) + T::abs(r);
                p /= s;
                q /= s;
                r /= s;
                if m == l {
                    break;
                }
                let lhs = T::abs(S[(m, m - 1)]) * (T::abs(q) + T::abs(r));
                let rhs = eps
                    * (T::abs(p)
                        * (T::abs(S[(m - 1, m - 1)]) + T::abs(z) + T::abs(S[(m + 1, m + 1)])));
                if lhs < rhs {
                    break;
                }
                m -= 1;
            }

            for i in (m + 2)..=n {
                S[(i, i - 2)] = T::zero();
                if i > m + 2 {
                    S[(i, i - 3)] = T::zero();
                }
            }

            // double QR step involving rows l:n and columns m:n
            for k in m..n {
                let notlast = k != n - 1;
                if k != m {
                    p = S[(k, k - 1)];
                    q = S[(k + 1, k - 1)];
                    r = if notlast { S[(k + 2, k - 1)] } else { T::zero() };
                    x = T::abs(p) + T::abs(q) + T::abs(r);
                    if x == T::zero() {
                        continue;
                    }
                    p /= x;
                    q /= x;
                    r /= x;
                }

                s = T::sqrt(p * p + q * q + r * r);
                if p < T::zero() {
                    s = -s;
                }
                if s == T::zero() {
                    continue;
                }
                if k != m {
                    S[(k, k - 1)] = -s * x;
                } else if l != m {
                    S[(k, k - 1)] = -S[(k, k - 1)];
                }
                p += s;
                x = p / s;
                y = q / s;
                z = r / s;
                q /= p;
                r /= p;

                // row modification
                for j in k..nn {
                    p = S[(k, j)] + q * S[(k + 1, j)];
                    if notlast {
                        p += r * S[(k + 2, j)];
                        S[(k + 2, j)] -= p * z;
                    }
                    S[(k, j)] -= p * x;
                    S[(k + 1, j)] -= p * y;
                }

                // column modification
                for i in 0..=usize::min(n, k + 3) {
                    p = x * S[(i, k)] + y * S[(i, k + 1)];
                    if notlast {
                        p += z * S[(i, k + 2)];
                        S[(i, k + 2)] -= p * r;
                    }
                    S[(i, k)] -= p;
                    S[(i, k + 1)] -= p * q;
                }

                // accumulate transformations
                for i in 0..nn {
                    p = x * U[(i, k)] + y * U[(i, k + 1)];
                    if notlast {
                        p += z * U[(i, k + 2)];
                        U[(i, k + 2)] -= p * r;
                    }
                    U[(i, k)] -= p;
                    U[(i, k + 1)] -= p * q;
                }
            }
        }
    }

    clean_quasi_triangular(S, wi);
    Ok(())
}

/// Zero everything below the quasi-triangular structure implied by `wi`,
/// keeping only the subdiagonal entry of each 2x2 conjugate pair block.
pub(crate) fn clean_quasi_triangular<T: FloatT>(S: &mut Matrix<T>, wi: &[T]) {
    let n = S.m;
    for j in 0..n {
        for i in (j + 2)..n {
            S[(i, j)] = T::zero();
        }
        if j + 1 < n && wi[j] <= T::zero() {
            S[(j + 1, j)] = T::zero();
        }
    }
}

/// Eigenvalues read off the diagonal blocks of a quasi-triangular matrix.
/// A block is 2x2 wherever the subdiagonal entry is non-zero.
pub fn quasi_triangular_eigenvalues<T: FloatT>(S: &Matrix<T>) -> (Vec<T>, Vec<T>) {
    let n = S.m;
    let mut wr = vec![T::zero(); n];
    let mut wi = vec![T::zero(); n];
    let two: T = (2.).as_T();

    let mut i = 0;
    while i < n {
        if i + 1 < n && S[(i + 1, i)] != T::zero() {
            let (a, b, c, d) = (S[(i, i)], S[(i, i + 1)], S[(i + 1, i)], S[(i + 1, i + 1)]);
            let p = (a - d) / two;
            let q = p * p + b * c;
            if q < T::zero() {
                let z = T::sqrt(-q);
                wr[i] = d + p;
                wr[i + 1] = d + p;
                wi[i] = z;
                wi[i + 1] = -z;
            } else {
                // numerically real pair inside a 2x2 block
                let z = T::sqrt(q);
                let z = if p >= T::zero() { p + z } else { p - z };
                wr[i] = d + z;
                wr[i + 1] = if z != T::zero() { d - b * c / z } else { d + z };
            }
            i += 2;
        } else {
            wr[i] = S[(i, i)];
            i += 1;
        }
    }
    (wr, wi)
}

/// Right eigenvector of the quasi-triangular matrix `S` for the eigenvalue
/// at Schur position `idx`, computed by back substitution.  For a conjugate
/// pair, `idx` must be the first member and the real and imaginary parts
/// are returned.  Vectors are in Schur coordinates and not normalized.
pub(crate) fn hqr_backsub<T: FloatT>(
    S: &Matrix<T>,
    wr: &[T],
    wi: &[T],
    idx: usize,
) -> Result<(Vec<T>, Option<Vec<T>>), DenseFactorizationError> {
    let nn = S.m;
    if idx >= nn || wi.len() != nn || wr.len() != nn {
        return Err(DenseFactorizationError::IncompatibleDimension);
    }
    let is_pair = wi[idx] != T::zero();
    if is_pair && (wi[idx] < T::zero() || idx + 1 >= nn) {
        return Err(DenseFactorizationError::Eigenvectors(-(idx as i32) - 1));
    }

    let eps = T::epsilon();
    let mut norm = T::zero();
    for i in 0..nn {
        for j in i.saturating_sub(1)..nn {
            norm += T::abs(S[(i, j)]);
        }
    }
    if norm == T::zero() {
        norm = T::one();
    }

    // only the leading (n+1)x(n+1) block takes part
    let n = if is_pair { idx + 1 } else { idx };
    let mut H = S.submatrix(0..(n + 1), 0..(n + 1));
    let (d, e) = (wr, wi);
    let (mut r, mut s, mut z) = (T::zero(), T::zero(), T::zero());
    let (mut t, mut w, mut x, mut y) = (T::zero(), T::zero(), T::zero(), T::zero());

    if !is_pair {
        // real vector
        let p = d[n];
        let mut l = n;
        H[(n, n)] = T::one();
        for i in (0..n).rev() {
            w = H[(i, i)] - p;
            r = T::zero();
            for j in l..=n {
                r += H[(i, j)] * H[(j, n)];
            }
            if e[i] < T::zero() {
                z = w;
                s = r;
            } else {
                l = i;
                if e[i] == T::zero() {
                    H[(i, n)] = if w != T::zero() { -r / w } else { -r / (eps * norm) };
                } else {
                    // solve real equations
                    x = H[(i, i + 1)];
                    y = H[(i + 1, i)];
                    let qq = (d[i] - p) * (d[i] - p) + e[i] * e[i];
                    t = (x * s - z * r) / qq;
                    H[(i, n)] = t;
                    H[(i + 1, n)] = if T::abs(x) > T::abs(z) {
                        (-r - w * t) / x
                    } else {
                        (-s - y * t) / z
                    };
                }
                // overflow control
                t = T::abs(H[(i, n)]);
                if (eps * t) * t > T::one() {
                    for j in i..=n {
                        H[(j, n)] /= t;
                    }
                }
            }
        }
        let vr = H.col_slice(n).to_vec();
        let mut out = vec![T::zero(); nn];
        out[0..=n].copy_from_slice(&vr);
        return Ok((out, None));
    }

    // complex vector, computed at the second member of the pair
    let p = d[n];
    let q = e[n];
    let mut l = n - 1;

    // last vector component imaginary so matrix is triangular
    if T::abs(H[(n, n - 1)]) > T::abs(H[(n - 1, n)]) {
        H[(n - 1, n - 1)] = q / H[(n, n - 1)];
        H[(n - 1, n)] = -(H[(n, n)] - p) / H[(n, n - 1)];
    } else {
        let (cr, ci) = cdiv(T::zero(), -H[(n - 1, n)], H[(n - 1, n - 1)] - p, q);
        H[(n - 1, n - 1)] = cr;
        H[(n - 1, n)] = ci;
    }
    H[(n, n - 1)] = T::zero();
    H[(n, n)] = T::one();

    for i in (0..(n - 1)).rev() {
        let mut ra = T::zero();
        let mut sa = T::zero();
        for j in l..=n {
            ra += H[(i, j)] * H[(j, n - 1)];
            sa += H[(i, j)] * H[(j, n)];
        }
        w = H[(i, i)] - p;

        if e[i] < T::zero() {
            z = w;
            r = ra;
            s = sa;
        } else {
            l = i;
            if e[i] == T::zero() {
                let (cr, ci) = cdiv(-ra, -sa, w, q);
                H[(i, n - 1)] = cr;
                H[(i, n)] = ci;
            } else {
                // solve complex equations
                x = H[(i, i + 1)];
                y = H[(i + 1, i)];
                let mut vr = (d[i] - p) * (d[i] - p) + e[i] * e[i] - q * q;
                let vi = (d[i] - p) * (2.).as_T() * q;
                if vr == T::zero() && vi == T::zero() {
                    vr = eps
                        * norm
                        * (T::abs(w) + T::abs(q) + T::abs(x) + T::abs(y) + T::abs(z));
                }
                let (cr, ci) = cdiv(
                    x * r - z * ra + q * sa,
                    x * s - z * sa - q * ra,
                    vr,
                    vi,
                );
                H[(i, n - 1)] = cr;
                H[(i, n)] = ci;
                if T::abs(x) > (T::abs(z) + T::abs(q)) {
                    H[(i + 1, n - 1)] = (-ra - w * H[(i, n - 1)] + q * H[(i, n)]) / x;
                    H[(i + 1, n)] = (-sa - w * H[(i, n)] - q * H[(i, n - 1)]) / x;
                } else {
                    let (cr, ci) = cdiv(-r - y * H[(i, n - 1)], -s - y * H[(i, n)], z, q);
                    H[(i + 1, n - 1)] = cr;
                    H[(i + 1, n)] = ci;
                }
            }

            // overflow control
            t = T::max(T::abs(H[(i, n - 1)]), T::abs(H[(i, n)]));
            if (eps * t) * t > T::one() {
                for j in i..=n {
                    H[(j, n - 1)] /= t;
                    H[(j, n)] /= t;
                }
            }
        }
    }

    let mut re = vec![T::zero(); nn];
    let mut im = vec![T::zero(); nn];
    re[0..=n].copy_from_slice(H.col_slice(n - 1));
    im[0..=n].copy_from_slice(H.col_slice(n));
    Ok((re, Some(im)))
}

// complex scalar division (xr + i*xi) / (yr + i*yi)
pub(crate) fn cdiv<T: FloatT>(xr: T, xi: T, yr: T, yi: T) -> (T, T) {
    if T::abs(yr) > T::abs(yi) {
        let r = yi / yr;
        let d = yr + r * yi;
        ((xr + r * xi) / d, (xi - r * xr) / d)
    } else {
        let r = yr / yi;
        let d = yi + r * yr;
        ((r * xr + xi) / d, (r * xi - xr) / d)
    }
}

/// Native real Schur factorization `A = U*S*U'` of a general matrix
#[cfg_attr(feature = "lapack", allow(dead_code))]
pub(crate) fn native_schur<T: FloatT>(
    A: &Matrix<T>,
    S: &mut Matrix<T>,
    U: &mut Matrix<T>,
    wr: &mut [T],
    wi: &mut [T],
) -> Result<(), DenseFactorizationError> {
    S.data.copy_from_slice(&A.data);
    hessenberg_reduce(S, U);
    hqr_schur(S, U, wr, wi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schur_of(A: &Matrix<f64>) -> (Matrix<f64>, Matrix<f64>, Vec<f64>, Vec<f64>) {
        let n = A.m;
        let mut S = Matrix::zeros((n, n));
        let mut U = Matrix::zeros((n, n));
        let mut wr = vec![0.; n];
        let mut wi = vec![0.; n];
        native_schur(A, &mut S, &mut U, &mut wr, &mut wi).unwrap();
        (S, U, wr, wi)
    }

    #[test]
    fn test_schur_reconstruction() {
        let A = Matrix::<f64>::from(&[
            [1., 2., 0., 3.],  //
            [-2., 1., 1., 0.], //
            [0., 1., 4., 1.],  //
            [1., 0., -1., 2.], //
        ]);
        let (S, U, wr, wi) = schur_of(&A);

        let mut US = Matrix::zeros((4, 4));
        US.mul(&U, &S, 1.0, 0.0);
        let mut B = Matrix::zeros((4, 4));
        B.mul(&US, &U.t(), 1.0, 0.0);
        assert!(B.data.norm_inf_diff(&A.data) < 1e-12);

        // quasi-triangular, pairs positive imaginary part first
        for j in 0..4 {
            for i in (j + 2)..4 {
                assert_eq!(S[(i, j)], 0.);
            }
        }
        for j in 0..4 {
            if wi[j] > 0. {
                assert!(wi[j + 1] == -wi[j] && wr[j + 1] == wr[j]);
            }
        }

        // trace is preserved
        let tr: f64 = wr.iter().sum();
        assert!((tr - 8.).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_pair() {
        // eigenvalues 2 and 1 +- 1i
        let A = Matrix::<f64>::from(&[
            [1., -1., 0.], //
            [1., 1., 0.],  //
            [0., 0., 2.],  //
        ]);
        let (S, U, wr, wi) = schur_of(&A);
        let npairs = wi.iter().filter(|&&v| v > 0.).count();
        assert_eq!(npairs, 1);

        let k = wi.iter().position(|&v| v > 0.).unwrap();
        assert!((wr[k] - 1.).abs() < 1e-14 && (wi[k] - 1.).abs() < 1e-14);

        // A*(xr + i xi) = (λr + i λi)(xr + i xi)
        let (yr, yi) = hqr_backsub(&S, &wr, &wi, k).unwrap();
        let yi = yi.unwrap();
        let mut xr = vec![0.; 3];
        let mut xi = vec![0.; 3];
        U.gemv(&mut xr, &yr, 1.0, 0.0);
        U.gemv(&mut xi, &yi, 1.0, 0.0);

        let mut axr = vec![0.; 3];
        let mut axi = vec![0.; 3];
        A.gemv(&mut axr, &xr, 1.0, 0.0);
        A.gemv(&mut axi, &xi, 1.0, 0.0);
        for i in 0..3 {
            assert!((axr[i] - (wr[k] * xr[i] - wi[k] * xi[i])).abs() < 1e-12);
            assert!((axi[i] - (wr[k] * xi[i] + wi[k] * xr[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn test_backsub_real() {
        let A = Matrix::<f64>::from(&[
            [2., 1., 0.], //
            [0., 3., 1.], //
            [0., 0., 5.], //
        ]);
        let (S, U, wr, wi) = schur_of(&A);
        for k in 0..3 {
            let (y, none) = hqr_backsub(&S, &wr, &wi, k).unwrap();
            assert!(none.is_none());
            let mut x = vec![0.; 3];
            U.gemv(&mut x, &y, 1.0, 0.0);
            x.normalize();
            let mut ax = vec![0.; 3];
            A.gemv(&mut ax, &x, 1.0, 0.0);
            ax.axpby(-wr[k], &x, 1.0);
            assert!(ax.norm() < 1e-12);
        }
    }

    #[test]
    fn test_zero_matrix() {
        let A = Matrix::<f64>::zeros((3, 3));
        let (_S, _U, wr, wi) = schur_of(&A);
        assert_eq!(wr, [0., 0., 0.]);
        assert_eq!(wi, [0., 0., 0.]);
    }

    #[test]
    fn test_quasi_triangular_eigenvalues() {
        let S = Matrix::<f64>::from(&[
            [3., 1., 2.],  //
            [0., 1., -2.], //
            [0., 1., 1.],  //
        ]);
        let (wr, wi) = quasi_triangular_eigenvalues(&S);
        assert_eq!(wr[0], 3.);
        assert!((wr[1] - 1.).abs() < 1e-15 && (wr[2] - 1.).abs() < 1e-15);
        assert!((wi[1] - 2f64.sqrt()).abs() < 1e-15 && wi[2] == -wi[1]);
    }
}
