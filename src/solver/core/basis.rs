#![allow(non_snake_case)]

use super::operator::OperatorHandle;
use super::orthog::Orthogonalizer;
use crate::algebra::*;
use crate::solver::core::KrylovError;
use rand::{rngs::StdRng, Rng, SeedableRng};

// attempts at drawing a random vector outside the current span
const RANDOM_ATTEMPTS: usize = 3;

/// Orthonormal basis of a Krylov subspace.
///
/// Columns `[0, l)` are locked, columns `[l, k)` are active and the
/// remaining columns up to the capacity are free.  All columns in use are
/// orthonormal in the `B` inner product `<x, y> = y'Bx` when a `B` operator
/// is attached, and in the Euclidean one otherwise.  Vectors in the
/// constraint space are kept orthonormal as well and every new column is
/// made orthogonal to them.
pub struct Basis<T: FloatT> {
    V: Matrix<T>,
    l: usize,
    k: usize,
    B: Option<OperatorHandle<T>>,
    constraints: Vec<Vec<T>>,
    rng: StdRng,
}

impl<T> Basis<T>
where
    T: FloatT,
{
    pub fn new(n: usize, capacity: usize, B: Option<OperatorHandle<T>>, seed: u64) -> Self {
        Self {
            V: Matrix::zeros((n, capacity)),
            l: 0,
            k: 0,
            B,
            constraints: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// length of the basis vectors
    pub fn n(&self) -> usize {
        self.V.m
    }

    pub fn capacity(&self) -> usize {
        self.V.n
    }

    pub fn set_active(&mut self, l: usize, k: usize) {
        assert!(l <= k && k <= self.capacity());
        self.l = l;
        self.k = k;
    }

    pub fn active(&self) -> (usize, usize) {
        (self.l, self.k)
    }

    pub fn column(&self, j: usize) -> &[T] {
        self.V.col_slice(j)
    }

    pub fn column_mut(&mut self, j: usize) -> &mut [T] {
        self.V.col_slice_mut(j)
    }

    /// All columns as a dense matrix
    pub fn matrix(&self) -> &Matrix<T> {
        &self.V
    }

    pub fn has_B(&self) -> bool {
        self.B.is_some()
    }

    /// `y = Bx`, or a copy of `x` without a `B` operator
    pub fn apply_B(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        match &self.B {
            Some(B) => B.apply(x, y),
            None => {
                y.copy_from(x);
                Ok(())
            }
        }
    }

    /// inner product `y'Bx`
    pub fn inner(&self, x: &[T], y: &[T]) -> Result<T, KrylovError> {
        match &self.B {
            Some(B) => {
                let mut Bx = vec![T::zero(); x.len()];
                B.apply(x, &mut Bx)?;
                Ok(y.dot(&Bx))
            }
            None => Ok(y.dot(x)),
        }
    }

    /// norm induced by the inner product
    pub fn norm(&self, x: &[T]) -> Result<T, KrylovError> {
        match &self.B {
            Some(_) => {
                let nrm2 = self.inner(x, x)?;
                if nrm2 < T::zero() {
                    return Err(KrylovError::precondition(
                        "B inner product is indefinite, B must be positive definite",
                    ));
                }
                Ok(T::sqrt(nrm2))
            }
            None => Ok(x.norm()),
        }
    }

    /// Scale `x` to unit norm, returning its original norm
    pub fn normalize(&self, x: &mut [T]) -> Result<T, KrylovError> {
        let nrm = self.norm(x)?;
        if nrm > T::zero() {
            x.scale(nrm.recip());
        }
        Ok(nrm)
    }

    /// Replace the constraint space with an orthonormal basis of the span of
    /// `vecs`.  Dependent vectors are dropped.  Returns the dimension of the
    /// constraint space.
    pub fn set_constraints(&mut self, vecs: &[Vec<T>]) -> Result<usize, KrylovError> {
        self.constraints.clear();
        let tol = T::epsilon().sqrt();
        for v in vecs {
            if v.len() != self.n() {
                return Err(KrylovError::precondition(format!(
                    "constraint vector has length {}, expected {}",
                    v.len(),
                    self.n()
                )));
            }
            let mut w = v.clone();
            let onrm = self.norm(&w)?;
            // twice is enough
            for _ in 0..2 {
                for c in self.constraints.iter() {
                    let coef = self.inner(&w, c)?;
                    w.axpby(-coef, c, T::one());
                }
            }
            let nrm = self.norm(&w)?;
            if nrm > tol * onrm {
                w.scale(nrm.recip());
                self.constraints.push(w);
            }
        }
        Ok(self.constraints.len())
    }

    pub fn constraints(&self) -> &[Vec<T>] {
        &self.constraints
    }

    /// Fill `x` with entries drawn uniformly from `[-1, 1)`
    pub fn random_vector(&mut self, x: &mut [T]) {
        for xi in x.iter_mut() {
            let r: f64 = self.rng.random_range(-1.0..1.0);
            *xi = r.as_T();
        }
    }

    /// Set column `j` to a random unit vector orthogonal to columns `[0, j)`
    /// and to the constraints.  Returns `false` if no such vector was found,
    /// which happens when the basis already spans the whole space.
    pub fn set_random_column(
        &mut self,
        j: usize,
        orth: &Orthogonalizer<T>,
    ) -> Result<bool, KrylovError> {
        let mut w = vec![T::zero(); self.n()];
        let mut h = vec![T::zero(); j];
        for _ in 0..RANDOM_ATTEMPTS {
            self.random_vector(&mut w);
            let res = orth.orthogonalize(self, j, &mut w, &mut h)?;
            if !res.breakdown {
                w.scale(res.norm.recip());
                self.column_mut(j).copy_from(&w);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Set column `j` to `x` made orthogonal to columns `[0, j)` and the
    /// constraints, and normalized.  Falls back to a random column when `x`
    /// lies in the current span.
    pub fn set_column(
        &mut self,
        j: usize,
        x: &[T],
        orth: &Orthogonalizer<T>,
    ) -> Result<bool, KrylovError> {
        let mut w = x.to_vec();
        let mut h = vec![T::zero(); j];
        let res = orth.orthogonalize(self, j, &mut w, &mut h)?;
        if res.breakdown {
            return self.set_random_column(j, orth);
        }
        w.scale(res.norm.recip());
        self.column_mut(j).copy_from(&w);
        Ok(true)
    }

    /// `V[:, l+s..l+e] = V[:, l..k] * Q[:, s..e]`, with `Q` of size `(k-l) x _`
    pub fn mult_in_place(&mut self, Q: &Matrix<T>, s: usize, e: usize) {
        let (l, k) = (self.l, self.k);
        assert!(Q.m == k - l && s <= e && e <= Q.n && l + e <= self.capacity());

        let n = self.n();
        let mut W = Matrix::zeros((n, e - s));
        for (jout, j) in (s..e).enumerate() {
            let dst = W.col_slice_mut(jout);
            for (i, &qij) in Q.col_slice(j).iter().enumerate() {
                if qij != T::zero() {
                    dst.axpby(qij, self.V.col_slice(l + i), T::one());
                }
            }
        }
        for jout in 0..(e - s) {
            self.V.col_slice_mut(l + s + jout).copy_from(W.col_slice(jout));
        }
    }

    /// `x = V[:, l..k] * q`
    pub fn mult_vec(&self, q: &[T], x: &mut [T]) {
        let (l, k) = (self.l, self.k);
        assert!(q.len() == k - l && x.len() == self.n());
        x.set(T::zero());
        for (i, &qi) in q.iter().enumerate() {
            if qi != T::zero() {
                x.axpby(qi, self.V.col_slice(l + i), T::one());
            }
        }
    }

    /// `max |<V_i, V_j> - δ_ij|` over the first `k` columns
    pub fn orthonormality_error(&self, k: usize) -> Result<T, KrylovError> {
        let mut err = T::zero();
        for j in 0..k {
            let mut Bvj = vec![T::zero(); self.n()];
            self.apply_B(self.column(j), &mut Bvj)?;
            for i in 0..k {
                let dij = if i == j { T::one() } else { T::zero() };
                err = T::max(err, T::abs(self.column(i).dot(&Bvj) - dij));
            }
        }
        Ok(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::core::EigenSettings;
    use std::rc::Rc;

    #[test]
    fn test_random_columns() {
        let orth = Orthogonalizer::from(&EigenSettings::<f64>::default());
        let mut basis = Basis::<f64>::new(4, 5, None, 7);

        for j in 0..4 {
            assert!(basis.set_random_column(j, &orth).unwrap());
        }
        assert!(basis.orthonormality_error(4).unwrap() < 1e-14);

        // the space is exhausted
        assert!(!basis.set_random_column(4, &orth).unwrap());

        // fixed seeds reproduce the same columns
        let mut again = Basis::<f64>::new(4, 5, None, 7);
        assert!(again.set_random_column(0, &orth).unwrap());
        assert_eq!(again.column(0), basis.column(0));
    }

    #[test]
    fn test_mult_in_place() {
        let orth = Orthogonalizer::from(&EigenSettings::<f64>::default());
        let mut basis = Basis::<f64>::new(6, 4, None, 1);
        for j in 0..4 {
            basis.set_random_column(j, &orth).unwrap();
        }
        let V = basis.matrix().clone();

        // rotate columns 1..4 through a permutation
        basis.set_active(1, 4);
        let Q = Matrix::<f64>::from(&[
            [0., 1., 0.], //
            [0., 0., 1.], //
            [1., 0., 0.], //
        ]);
        basis.mult_in_place(&Q, 0, 2);
        assert_eq!(basis.column(0), V.col_slice(0));
        assert_eq!(basis.column(1), V.col_slice(3));
        assert_eq!(basis.column(2), V.col_slice(1));
        assert_eq!(basis.column(3), V.col_slice(3));

        let mut x = vec![0.; 6];
        basis.mult_vec(&[1., 0., 2.], &mut x);
        let mut y = V.col_slice(3).to_vec();
        y.axpby(2., V.col_slice(3), 1.);
        assert!(x.dist(&y) < 1e-15);
    }

    #[test]
    fn test_b_inner_product_and_constraints() {
        let B: OperatorHandle<f64> = Rc::new(Matrix::diagonal(&[1., 4., 9.]));
        let mut basis = Basis::new(3, 2, Some(B), 0);
        let orth = Orthogonalizer::from(&EigenSettings::<f64>::default());
        assert!(basis.has_B());

        assert_eq!(basis.norm(&[0., 1., 0.]).unwrap(), 2.);

        let nc = basis
            .set_constraints(&[vec![1., 0., 0.], vec![2., 0., 0.]])
            .unwrap();
        assert_eq!(nc, 1);

        basis.set_column(0, &[1., 1., 0.], &orth).unwrap();
        assert!(basis.column(0).dist(&[0., 0.5, 0.]) < 1e-15);
        assert!(basis.set_random_column(1, &orth).unwrap());
        assert!(basis.orthonormality_error(2).unwrap() < 1e-14);
        assert!(basis.inner(basis.column(1), &basis.constraints()[0]).unwrap().abs() < 1e-14);
    }
}
