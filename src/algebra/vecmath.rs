use super::{FloatT, VectorMath};
use std::iter::zip;

impl<T: FloatT> VectorMath for [T] {
    type T = T;
    fn copy_from(&mut self, src: &[T]) -> &mut Self {
        self.copy_from_slice(src);
        self
    }

    fn set(&mut self, c: T) -> &mut Self {
        self.fill(c);
        self
    }

    fn scale(&mut self, c: T) -> &mut Self {
        self.iter_mut().for_each(|x| *x *= c);
        self
    }

    fn negate(&mut self) -> &mut Self {
        self.iter_mut().for_each(|x| *x = -*x);
        self
    }

    fn normalize(&mut self) -> T {
        let norm = self.norm();
        if norm != T::zero() {
            self.scale(norm.recip());
        }
        norm
    }

    fn dot(&self, y: &[T]) -> T {
        assert_eq!(self.len(), y.len());
        pairwise_sum(self.len(), &|i| self[i] * y[i])
    }

    fn dist(&self, y: &Self) -> T {
        assert_eq!(self.len(), y.len());
        scaled_norm(zip(self, y).map(|(&x, &y)| x - y))
    }

    fn norm(&self) -> T {
        scaled_norm(self.iter().copied())
    }

    fn norm_inf(&self) -> T {
        let mut out = T::zero();
        for v in self.iter().map(|v| v.abs()) {
            if v.is_nan() {
                return T::nan();
            }
            out = T::max(out, v);
        }
        out
    }

    fn norm_inf_diff(&self, b: &[T]) -> T {
        zip(self, b).fold(T::zero(), |acc, (x, y)| T::max(acc, T::abs(*x - *y)))
    }

    fn axpby(&mut self, a: T, x: &[T], b: T) -> &mut Self {
        assert_eq!(self.len(), x.len());
        if b == T::zero() {
            zip(&mut *self, x).for_each(|(y, x)| *y = a * (*x));
        } else {
            zip(&mut *self, x).for_each(|(y, x)| *y = a * (*x) + b * (*y));
        }
        self
    }
}

// 2-norm accumulated relative to the running largest magnitude, as in
// the reference BLAS nrm2.  Basis vectors are renormalized after every
// step, so squares of huge or tiny entries must not overflow or flush.
fn scaled_norm<T: FloatT>(x: impl Iterator<Item = T>) -> T {
    let mut scale = T::zero();
    let mut ssq = T::one();
    for v in x.map(T::abs) {
        if v.is_nan() {
            return T::nan();
        }
        if v == T::zero() {
            continue;
        }
        if scale < v {
            ssq = T::one() + ssq * (scale / v) * (scale / v);
            scale = v;
        } else {
            ssq += (v / scale) * (v / scale);
        }
    }
    scale * T::sqrt(ssq)
}

// pairwise summation of f(0) + ... + f(n-1)
fn pairwise_sum<T: FloatT>(n: usize, f: &impl Fn(usize) -> T) -> T {
    const BLOCK: usize = 32;

    fn inner<T: FloatT>(lo: usize, hi: usize, f: &impl Fn(usize) -> T) -> T {
        if hi - lo <= BLOCK {
            (lo..hi).fold(T::zero(), |acc, i| acc + f(i))
        } else {
            let mid = lo + (hi - lo) / 2;
            inner(lo, mid, f) + inner(mid, hi, f)
        }
    }
    inner(0, n, f)
}

#[test]
fn test_dot_product() {
    let x = vec![1., 2., 3., 4.];
    let y = vec![4., 5., 6., 7.];
    assert_eq!(x.dot(&y), 60.);

    // long enough to recurse
    let n = 32 * 7 + 1;
    let z: Vec<f64> = (1..=n).map(|i| i as f64).collect();
    let ones = vec![1.; n];
    assert_eq!(z.dot(&ones), (n * (n + 1) / 2) as f64);
}

#[test]
fn test_normalize() {
    let mut x = vec![3., 0., 4.];
    let nrm = x.normalize();
    assert_eq!(nrm, 5.);
    assert!(x.norm_inf_diff(&[0.6, 0., 0.8]) < 1e-15);

    // zero vectors are left alone
    let mut z = vec![0f64; 3];
    assert_eq!(z.normalize(), 0.);
    assert_eq!(z, [0., 0., 0.]);
}

#[test]
fn test_norm_extreme_values() {
    let big = vec![1e300f64, 1e300];
    assert!((big.norm() / 1e300 - f64::sqrt(2.)).abs() < 1e-15);

    let tiny = vec![3e-300f64, 4e-300];
    assert!((tiny.norm() / 5e-300 - 1.).abs() < 1e-15);

    assert!(vec![1., f64::NAN].norm().is_nan());
    assert_eq!([1., -2.].dist(&[4., 2.]), 5.);
}

#[test]
fn test_axpby() {
    let mut y = vec![1., 1., 1.];
    y.axpby(2., &[1., 2., 3.], -1.);
    assert_eq!(y, [1., 3., 5.]);

    // b = 0 ignores existing contents
    let mut w = vec![f64::NAN; 3];
    w.axpby(0.5, &[2., 4., 6.], 0.);
    assert_eq!(w, [1., 2., 3.]);
}
