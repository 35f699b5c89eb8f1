#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::core::KrylovError;
use std::rc::Rc;

/// A linear map `x -> A*x` on real vectors.
///
/// Operators are shared between the problem definition, the spectral
/// transformation and the solver through [`OperatorHandle`]s.  The solver
/// only ever reads through the handle.
pub trait LinearOperator<T: FloatT> {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;

    /// `y = A*x`
    fn apply(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError>;

    /// `y = A'*x`
    fn apply_transpose(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError>;

    /// Infinity norm of the operator, if known
    fn norm_inf(&self) -> Option<T> {
        None
    }

    /// Dense copy of the operator, if one can be formed cheaply
    fn to_dense(&self) -> Option<Matrix<T>> {
        None
    }

    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }
}

/// Shared read-only handle to an operator
pub type OperatorHandle<T> = Rc<dyn LinearOperator<T>>;

fn check_apply_dims(m: usize, n: usize, x: usize, y: usize) -> Result<(), KrylovError> {
    if x != n || y != m {
        return Err(KrylovError::precondition(format!(
            "operator of size {m}x{n} applied to vector of length {x} with output length {y}"
        )));
    }
    Ok(())
}

impl<T: FloatT> LinearOperator<T> for Matrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn apply(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        check_apply_dims(self.m, self.n, x.len(), y.len())?;
        self.gemv(y, x, T::one(), T::zero());
        Ok(())
    }
    fn apply_transpose(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        check_apply_dims(self.n, self.m, x.len(), y.len())?;
        self.t().gemv(y, x, T::one(), T::zero());
        Ok(())
    }
    fn norm_inf(&self) -> Option<T> {
        Some(Matrix::norm_inf(self))
    }
    fn to_dense(&self) -> Option<Matrix<T>> {
        Some(self.clone())
    }
}

impl<T: FloatT> LinearOperator<T> for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn apply(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        check_apply_dims(self.m, self.n, x.len(), y.len())?;
        self.gemv(y, x, T::one(), T::zero());
        Ok(())
    }
    fn apply_transpose(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        check_apply_dims(self.n, self.m, x.len(), y.len())?;
        self.t().gemv(y, x, T::one(), T::zero());
        Ok(())
    }
    fn norm_inf(&self) -> Option<T> {
        Some(CscMatrix::norm_inf(self))
    }
    fn to_dense(&self) -> Option<Matrix<T>> {
        Some(CscMatrix::to_dense(self))
    }
}

type ApplyFn<T> = Box<dyn Fn(&[T], &mut [T])>;

/// Matrix-free operator defined by closures
pub struct FnOperator<T> {
    m: usize,
    n: usize,
    forward: ApplyFn<T>,
    transpose: Option<ApplyFn<T>>,
    norm: Option<T>,
}

impl<T: FloatT> FnOperator<T> {
    /// Operator of size `m x n` computing `y = A*x` with `forward`
    pub fn new(m: usize, n: usize, forward: impl Fn(&[T], &mut [T]) + 'static) -> Self {
        Self {
            m,
            n,
            forward: Box::new(forward),
            transpose: None,
            norm: None,
        }
    }

    /// Provide the product `y = A'*x`
    pub fn with_transpose(mut self, transpose: impl Fn(&[T], &mut [T]) + 'static) -> Self {
        self.transpose = Some(Box::new(transpose));
        self
    }

    /// Provide an estimate of the infinity norm
    pub fn with_norm_inf(mut self, norm: T) -> Self {
        self.norm = Some(norm);
        self
    }
}

impl<T: FloatT> LinearOperator<T> for FnOperator<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    fn apply(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        check_apply_dims(self.m, self.n, x.len(), y.len())?;
        (self.forward)(x, y);
        Ok(())
    }
    fn apply_transpose(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        check_apply_dims(self.n, self.m, x.len(), y.len())?;
        match &self.transpose {
            Some(f) => {
                f(x, y);
                Ok(())
            }
            None => Err(KrylovError::precondition(
                "transposed product is not available for this operator",
            )),
        }
    }
    fn norm_inf(&self) -> Option<T> {
        self.norm
    }
}

/// Solver for square linear systems, used inside spectral transformations
pub trait LinearSolver<T: FloatT> {
    fn dim(&self) -> usize;
    /// overwrites `b` with the solution of `A*x = b`
    fn solve(&self, b: &mut [T]) -> Result<(), KrylovError>;
    /// overwrites `b` with the solution of `A'*x = b`
    fn solve_transpose(&self, b: &mut [T]) -> Result<(), KrylovError>;
}

impl<T: FloatT> LinearSolver<T> for DenseLU<T> {
    fn dim(&self) -> usize {
        DenseLU::dim(self)
    }
    fn solve(&self, b: &mut [T]) -> Result<(), KrylovError> {
        check_apply_dims(self.dim(), self.dim(), b.len(), b.len())?;
        self.solve_in_place(b);
        Ok(())
    }
    fn solve_transpose(&self, b: &mut [T]) -> Result<(), KrylovError> {
        check_apply_dims(self.dim(), self.dim(), b.len(), b.len())?;
        self.solve_transpose_in_place(b);
        Ok(())
    }
}

/// Explicit dense matrix of an operator, built column by column from
/// products with unit vectors when no cheaper route exists.
pub(crate) fn explicit_operator<T: FloatT>(
    op: &dyn LinearOperator<T>,
) -> Result<Matrix<T>, KrylovError> {
    if let Some(M) = op.to_dense() {
        return Ok(M);
    }
    let (m, n) = (op.nrows(), op.ncols());
    let mut M = Matrix::zeros((m, n));
    let mut e = vec![T::zero(); n];
    for j in 0..n {
        e[j] = T::one();
        op.apply(&e, M.col_slice_mut(j))?;
        e[j] = T::zero();
    }
    Ok(M)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_handles() {
        let A = Matrix::<f64>::from(&[
            [2., 1.], //
            [0., 3.], //
        ]);
        let ops: Vec<OperatorHandle<f64>> = vec![
            Rc::new(A.clone()),
            Rc::new(CscMatrix::from(&A)),
            Rc::new(
                FnOperator::new(2, 2, |x: &[f64], y: &mut [f64]| {
                    y[0] = 2. * x[0] + x[1];
                    y[1] = 3. * x[1];
                })
                .with_transpose(|x: &[f64], y: &mut [f64]| {
                    y[0] = 2. * x[0];
                    y[1] = x[0] + 3. * x[1];
                }),
            ),
        ];

        for op in ops.iter() {
            let mut y = vec![0.; 2];
            op.apply(&[1., 1.], &mut y).unwrap();
            assert_eq!(y, [3., 3.]);
            op.apply_transpose(&[1., 1.], &mut y).unwrap();
            assert_eq!(y, [2., 4.]);
            assert_eq!(explicit_operator(op.as_ref()).unwrap(), A);
        }
        assert_eq!(ops[0].norm_inf(), Some(3.));
        assert_eq!(ops[2].norm_inf(), None);

        let mut y = vec![0.; 3];
        assert!(ops[0].apply(&[1., 1.], &mut y).is_err());
    }

    #[test]
    fn test_missing_transpose() {
        let op = FnOperator::new(1, 1, |x: &[f64], y: &mut [f64]| y[0] = x[0]);
        let mut y = vec![0.];
        let err = op.apply_transpose(&[1.], &mut y).unwrap_err();
        assert_eq!(err.kind(), crate::solver::core::ErrorKind::PreconditionViolation);
    }
}
