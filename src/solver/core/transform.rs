#![allow(non_snake_case)]

use super::operator::{explicit_operator, LinearOperator, LinearSolver, OperatorHandle};
use crate::algebra::*;
use crate::solver::core::KrylovError;
use std::rc::Rc;

/// Maps an eigenvalue `(re, im)` of a user-transformed operator back to the
/// spectrum of the original problem
pub type BackTransformFn<T> = fn(T, T) -> (T, T);

/// Spectral transformation applied to the pencil `(A, B)`.
///
/// `B = I` when the problem is not generalized.
#[derive(Clone)]
pub enum TransformKind<T: FloatT> {
    /// `A - σI`, or `B⁻¹A - σI` for a generalized problem
    Shift { sigma: T },
    /// `(A - σB)⁻¹B`
    ShiftInvert { sigma: T },
    /// `(A - σB)⁻¹(A + νB)`
    Cayley { sigma: T, nu: T },
    /// user supplied transformed operator, with an optional map back to the
    /// original spectrum
    Custom {
        op: OperatorHandle<T>,
        back: Option<BackTransformFn<T>>,
    },
}

impl<T: FloatT> Default for TransformKind<T> {
    fn default() -> Self {
        TransformKind::Shift { sigma: T::zero() }
    }
}

impl<T: FloatT> TransformKind<T> {
    pub fn name(&self) -> &'static str {
        match self {
            TransformKind::Shift { .. } => "shift",
            TransformKind::ShiftInvert { .. } => "shift-invert",
            TransformKind::Cayley { .. } => "cayley",
            TransformKind::Custom { .. } => "custom",
        }
    }

    /// shift `σ` of the transformation, if it has one
    pub fn sigma(&self) -> Option<T> {
        match *self {
            TransformKind::Shift { sigma }
            | TransformKind::ShiftInvert { sigma }
            | TransformKind::Cayley { sigma, .. } => Some(sigma),
            TransformKind::Custom { .. } => None,
        }
    }
}

/// The operator seen by the Krylov methods, built from the problem pencil
/// and a [`TransformKind`].
///
/// Shift-invert and Cayley transformations need a solver for `A - σB`.
/// When none is supplied the shifted matrix is formed explicitly and
/// factored with a dense LU.
pub struct SpectralTransform<T: FloatT> {
    kind: TransformKind<T>,
    A: OperatorHandle<T>,
    B: Option<OperatorHandle<T>>,
    solver: Option<Rc<dyn LinearSolver<T>>>,
    n: usize,
}

impl<T> SpectralTransform<T>
where
    T: FloatT,
{
    pub fn new(
        kind: TransformKind<T>,
        A: OperatorHandle<T>,
        B: Option<OperatorHandle<T>>,
        solver: Option<Rc<dyn LinearSolver<T>>>,
    ) -> Result<Self, KrylovError> {
        let n = A.nrows();
        if !A.is_square() {
            return Err(KrylovError::precondition(format!(
                "operator A must be square, got {}x{}",
                A.nrows(),
                A.ncols()
            )));
        }
        if let Some(B) = &B {
            if B.nrows() != n || B.ncols() != n {
                return Err(KrylovError::precondition(format!(
                    "operator B has size {}x{}, expected {n}x{n}",
                    B.nrows(),
                    B.ncols()
                )));
            }
        }
        if let TransformKind::Custom { op, .. } = &kind {
            if op.nrows() != n || op.ncols() != n {
                return Err(KrylovError::precondition(
                    "transformed operator does not match the dimension of A",
                ));
            }
        }
        if let Some(solver) = &solver {
            if solver.dim() != n {
                return Err(KrylovError::precondition(
                    "linear solver does not match the dimension of A",
                ));
            }
        }

        let mut st = Self {
            kind,
            A,
            B,
            solver,
            n,
        };
        if st.needs_solver() && st.solver.is_none() {
            st.solver = Some(Rc::new(st.factor_dense()?));
        }
        Ok(st)
    }

    fn needs_solver(&self) -> bool {
        match self.kind {
            TransformKind::Shift { .. } => self.B.is_some(),
            TransformKind::ShiftInvert { .. } | TransformKind::Cayley { .. } => true,
            TransformKind::Custom { .. } => false,
        }
    }

    // LU of B for a shifted generalized problem, or of A - σB otherwise
    fn factor_dense(&self) -> Result<DenseLU<T>, KrylovError> {
        let M = match (&self.kind, &self.B) {
            (TransformKind::Shift { .. }, Some(B)) => explicit_operator(B.as_ref())?,
            (_, B) => {
                let sigma = self.kind.sigma().unwrap_or(T::zero());
                let mut M = explicit_operator(self.A.as_ref())?;
                match B {
                    Some(B) => {
                        let Bd = explicit_operator(B.as_ref())?;
                        M.data.axpby(-sigma, &Bd.data, T::one());
                    }
                    None => {
                        for i in 0..self.n {
                            M[(i, i)] -= sigma;
                        }
                    }
                }
                M
            }
        };
        Ok(DenseLU::factor(&M)?)
    }

    fn solver(&self) -> Result<&dyn LinearSolver<T>, KrylovError> {
        self.solver
            .as_deref()
            .ok_or_else(|| KrylovError::precondition("spectral transformation is not set up"))
    }

    pub fn kind(&self) -> &TransformKind<T> {
        &self.kind
    }

    pub fn A(&self) -> &OperatorHandle<T> {
        &self.A
    }

    pub fn B(&self) -> Option<&OperatorHandle<T>> {
        self.B.as_ref()
    }

    pub fn is_generalized(&self) -> bool {
        self.B.is_some()
    }

    /// `true` if eigenvalues of the transformed operator can be mapped back
    pub fn has_back_transform(&self) -> bool {
        !matches!(self.kind, TransformKind::Custom { back: None, .. })
    }

    /// Shifts are undone before convergence testing, other transformations
    /// are tested in the transformed spectrum.
    pub(crate) fn is_shift(&self) -> bool {
        matches!(self.kind, TransformKind::Shift { .. })
    }

    /// `y = Bx`, or a copy of `x` if the problem is not generalized
    pub(crate) fn apply_B(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        match &self.B {
            Some(B) => B.apply(x, y),
            None => {
                y.copy_from(x);
                Ok(())
            }
        }
    }

    /// Maps an eigenvalue of the transformed operator to the original spectrum
    pub fn back_transform(&self, re: T, im: T) -> (T, T) {
        match self.kind {
            TransformKind::Shift { sigma } => (re + sigma, im),
            TransformKind::ShiftInvert { sigma } => {
                if im == T::zero() {
                    (re.recip() + sigma, T::zero())
                } else {
                    let d = re * re + im * im;
                    (re / d + sigma, -im / d)
                }
            }
            TransformKind::Cayley { sigma, nu } => {
                if im == T::zero() {
                    ((re * sigma + nu) / (re - T::one()), T::zero())
                } else {
                    cdiv(re * sigma + nu, im * sigma, re - T::one(), im)
                }
            }
            TransformKind::Custom { back, .. } => match back {
                Some(f) => f(re, im),
                None => (re, im),
            },
        }
    }
}

impl<T> LinearOperator<T> for SpectralTransform<T>
where
    T: FloatT,
{
    fn nrows(&self) -> usize {
        self.n
    }
    fn ncols(&self) -> usize {
        self.n
    }

    fn apply(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        match self.kind {
            TransformKind::Shift { sigma } => {
                self.A.apply(x, y)?;
                if self.B.is_some() {
                    self.solver()?.solve(y)?;
                }
                if sigma != T::zero() {
                    y.axpby(-sigma, x, T::one());
                }
            }
            TransformKind::ShiftInvert { .. } => {
                self.apply_B(x, y)?;
                self.solver()?.solve(y)?;
            }
            TransformKind::Cayley { nu, .. } => {
                let mut t = vec![T::zero(); self.n];
                self.A.apply(x, y)?;
                self.apply_B(x, &mut t)?;
                y.axpby(nu, &t, T::one());
                self.solver()?.solve(y)?;
            }
            TransformKind::Custom { ref op, .. } => op.apply(x, y)?,
        }
        Ok(())
    }

    fn apply_transpose(&self, x: &[T], y: &mut [T]) -> Result<(), KrylovError> {
        match self.kind {
            TransformKind::Shift { sigma } => {
                if self.B.is_some() {
                    let mut t = x.to_vec();
                    self.solver()?.solve_transpose(&mut t)?;
                    self.A.apply_transpose(&t, y)?;
                } else {
                    self.A.apply_transpose(x, y)?;
                }
                if sigma != T::zero() {
                    y.axpby(-sigma, x, T::one());
                }
            }
            TransformKind::ShiftInvert { .. } => {
                let mut t = x.to_vec();
                self.solver()?.solve_transpose(&mut t)?;
                match &self.B {
                    Some(B) => B.apply_transpose(&t, y)?,
                    None => {
                        y.copy_from(&t);
                    }
                }
            }
            TransformKind::Cayley { nu, .. } => {
                let mut t = x.to_vec();
                self.solver()?.solve_transpose(&mut t)?;
                self.A.apply_transpose(&t, y)?;
                match &self.B {
                    Some(B) => {
                        let mut u = vec![T::zero(); self.n];
                        B.apply_transpose(&t, &mut u)?;
                        y.axpby(nu, &u, T::one());
                    }
                    None => {
                        y.axpby(nu, &t, T::one());
                    }
                }
            }
            TransformKind::Custom { ref op, .. } => op.apply_transpose(x, y)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_matrix() -> Matrix<f64> {
        Matrix::<f64>::from(&[
            [4., 1., 0.], //
            [2., 3., 1.], //
            [0., 1., 5.], //
        ])
    }

    fn check_transpose(st: &SpectralTransform<f64>) {
        let x = [1., -2., 0.5];
        let z = [0.3, 1., 2.];
        let mut y = vec![0.; 3];
        let mut w = vec![0.; 3];
        st.apply(&x, &mut y).unwrap();
        st.apply_transpose(&z, &mut w).unwrap();
        assert!(f64::abs(z.dot(&y) - x.dot(&w)) < 1e-12);
    }

    #[test]
    fn test_shift_invert() {
        let A = test_matrix();
        let st = SpectralTransform::new(
            TransformKind::ShiftInvert { sigma: 1. },
            Rc::new(A.clone()),
            None,
            None,
        )
        .unwrap();

        // (A - I) * y = x
        let x = [1., 2., 3.];
        let mut y = vec![0.; 3];
        st.apply(&x, &mut y).unwrap();
        let mut r = vec![0.; 3];
        A.gemv(&mut r, &y, 1., 0.);
        r.axpby(-1., &y, 1.);
        assert!(r.dist(&x) < 1e-12);
        check_transpose(&st);

        assert_eq!(st.back_transform(0.5, 0.), (3., 0.));
        let (re, im) = st.back_transform(1., 1.);
        assert!(f64::abs(re - 1.5) < 1e-15 && f64::abs(im + 0.5) < 1e-15);
    }

    #[test]
    fn test_generalized_shift() {
        let A = test_matrix();
        let B = Matrix::<f64>::diagonal(&[2., 1., 4.]);
        let st = SpectralTransform::new(
            TransformKind::Shift { sigma: 0.5 },
            Rc::new(A.clone()),
            Some(Rc::new(B)),
            None,
        )
        .unwrap();
        assert!(st.is_generalized());

        // B⁻¹A e₁ - 0.5 e₁ = [2 - 0.5, 2, 0]
        let mut y = vec![0.; 3];
        st.apply(&[1., 0., 0.], &mut y).unwrap();
        assert!(y.dist(&[1.5, 2., 0.]) < 1e-14);
        check_transpose(&st);
        assert_eq!(st.back_transform(1., 0.), (1.5, 0.));
    }

    #[test]
    fn test_cayley() {
        let A = test_matrix();
        let st = SpectralTransform::new(
            TransformKind::Cayley { sigma: 1., nu: 2. },
            Rc::new(A),
            None,
            None,
        )
        .unwrap();
        check_transpose(&st);

        // θ = (λ + ν)/(λ - σ) for λ = 3 gives θ = 2.5, and back again
        let (re, im) = st.back_transform(2.5, 0.);
        assert!(f64::abs(re - 3.) < 1e-14 && im == 0.);

        // complex case against the direct formula λ = (θσ + ν)/(θ - 1)
        let (re, im) = st.back_transform(2., 1.);
        // (2 + i + 2) / (1 + i) = (4 + i)(1 - i)/2 = (5 - 3i)/2
        assert!(f64::abs(re - 2.5) < 1e-14 && f64::abs(im + 1.5) < 1e-14);
    }

    #[test]
    fn test_custom_and_errors() {
        let A: OperatorHandle<f64> = Rc::new(test_matrix());
        let st = SpectralTransform::new(
            TransformKind::Custom {
                op: A.clone(),
                back: None,
            },
            A.clone(),
            None,
            None,
        )
        .unwrap();
        assert!(!st.has_back_transform());
        assert_eq!(st.back_transform(2., 1.), (2., 1.));

        // singular shift
        let D: OperatorHandle<f64> = Rc::new(Matrix::diagonal(&[1., 2., 3.]));
        let err = SpectralTransform::new(TransformKind::ShiftInvert { sigma: 2. }, D, None, None)
            .err()
            .unwrap();
        assert!(matches!(err, KrylovError::LibraryFailure { info: 2, .. }));

        // dimension mismatch
        let B: OperatorHandle<f64> = Rc::new(Matrix::identity(2));
        assert!(SpectralTransform::new(TransformKind::default(), A, Some(B), None).is_err());
    }
}
