#![allow(non_snake_case)]

use super::basis::Basis;
use crate::algebra::*;
use crate::solver::core::{EigenSettings, KrylovError, OrthogRefine, OrthogType};

/// Result of orthogonalizing one vector against a basis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoResult<T> {
    /// norm of the orthogonal component
    pub norm: T,
    /// the vector was numerically in the span of the basis
    pub breakdown: bool,
}

/// Gram-Schmidt orthogonalization with optional refinement.
#[derive(Debug, Clone)]
pub struct Orthogonalizer<T> {
    pub kind: OrthogType,
    pub refine: OrthogRefine,
    /// a second pass is made when the norm drops below `eta` times its
    /// value before the pass
    pub eta: T,
    /// breakdown is declared below `breakdown_tol` times the original norm
    pub breakdown_tol: T,
}

impl<T: FloatT> From<&EigenSettings<T>> for Orthogonalizer<T> {
    fn from(settings: &EigenSettings<T>) -> Self {
        Self {
            kind: settings.orthog_type,
            refine: settings.orthog_refine,
            eta: settings.orthog_eta,
            breakdown_tol: settings.breakdown_tol,
        }
    }
}

impl<T> Orthogonalizer<T>
where
    T: FloatT,
{
    /// Orthogonalize `w` in place against the constraints of `basis` and
    /// its columns `[0, j)`.  The coefficients with respect to the columns
    /// are written to `h[0..j]` (accumulated over refinement passes).
    /// The orthogonal component is not normalized.
    pub fn orthogonalize(
        &self,
        basis: &Basis<T>,
        j: usize,
        w: &mut [T],
        h: &mut [T],
    ) -> Result<OrthoResult<T>, KrylovError> {
        if h.len() < j || w.len() != basis.n() || j > basis.capacity() {
            return Err(KrylovError::precondition(format!(
                "orthogonalization of a length {} vector against {} of {} columns of length {}",
                w.len(),
                j,
                basis.capacity(),
                basis.n()
            )));
        }
        h[0..j].set(T::zero());

        let onorm = basis.norm(w)?;
        if onorm == T::zero() {
            return Ok(OrthoResult {
                norm: T::zero(),
                breakdown: true,
            });
        }

        self.gs_pass(basis, j, w, h)?;
        let mut norm = basis.norm(w)?;

        let refine = match self.refine {
            OrthogRefine::Never => false,
            OrthogRefine::Always => true,
            OrthogRefine::IfNeeded => norm < self.eta * onorm,
        };
        if refine {
            self.gs_pass(basis, j, w, h)?;
            norm = basis.norm(w)?;
        }

        Ok(OrthoResult {
            norm,
            breakdown: norm <= self.breakdown_tol * onorm,
        })
    }

    // one Gram-Schmidt sweep, coefficients accumulated into h
    fn gs_pass(
        &self,
        basis: &Basis<T>,
        j: usize,
        w: &mut [T],
        h: &mut [T],
    ) -> Result<(), KrylovError> {
        match self.kind {
            OrthogType::Classical => {
                let mut Bw = vec![T::zero(); w.len()];
                basis.apply_B(w, &mut Bw)?;
                let cc: Vec<T> = basis.constraints().iter().map(|c| c.dot(&Bw)).collect();
                let cv: Vec<T> = (0..j).map(|i| basis.column(i).dot(&Bw)).collect();

                for (c, &coef) in basis.constraints().iter().zip(cc.iter()) {
                    w.axpby(-coef, c, T::one());
                }
                for (i, &coef) in cv.iter().enumerate() {
                    w.axpby(-coef, basis.column(i), T::one());
                    h[i] += coef;
                }
            }
            OrthogType::Modified => {
                for c in basis.constraints() {
                    let coef = basis.inner(w, c)?;
                    w.axpby(-coef, c, T::one());
                }
                for i in 0..j {
                    let coef = basis.inner(w, basis.column(i))?;
                    w.axpby(-coef, basis.column(i), T::one());
                    h[i] += coef;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::core::EigenSettingsBuilder;

    fn unit_basis(n: usize, k: usize) -> Basis<f64> {
        let mut basis = Basis::new(n, k, None, 0);
        for j in 0..k {
            basis.column_mut(j)[j] = 1.;
        }
        basis
    }

    #[test]
    fn test_orthogonalize_variants() {
        let basis = unit_basis(4, 2);
        for kind in [OrthogType::Classical, OrthogType::Modified] {
            for refine in [OrthogRefine::Never, OrthogRefine::IfNeeded, OrthogRefine::Always] {
                let settings = EigenSettingsBuilder::<f64>::default()
                    .orthog_type(kind)
                    .orthog_refine(refine)
                    .build()
                    .unwrap();
                let orth = Orthogonalizer::from(&settings);

                let mut w = vec![1., 2., 2., 0.];
                let mut h = vec![0.; 2];
                let res = orth.orthogonalize(&basis, 2, &mut w, &mut h).unwrap();
                assert_eq!(h, [1., 2.]);
                assert_eq!(w, [0., 0., 2., 0.]);
                assert_eq!(res.norm, 2.);
                assert!(!res.breakdown);
            }
        }
    }

    #[test]
    fn test_orthogonalize_breakdown() {
        let basis = unit_basis(3, 2);
        let orth = Orthogonalizer::from(&EigenSettings::<f64>::default());

        let mut w = vec![3., -1., 0.];
        let mut h = vec![0.; 2];
        let res = orth.orthogonalize(&basis, 2, &mut w, &mut h).unwrap();
        assert!(res.breakdown);
        assert_eq!(h, [3., -1.]);

        // a zero vector is always dependent
        let mut w = vec![0.; 3];
        assert!(orth.orthogonalize(&basis, 2, &mut w, &mut h).unwrap().breakdown);

        // with no columns nothing is removed
        let mut w = vec![0., 0., 5.];
        let res = orth.orthogonalize(&basis, 0, &mut w, &mut h).unwrap();
        assert_eq!(res.norm, 5.);
    }

    #[test]
    fn test_orthogonalize_bad_dimensions() {
        let basis = unit_basis(3, 2);
        let orth = Orthogonalizer::from(&EigenSettings::<f64>::default());

        let mut w = vec![1., 0.];
        let mut h = vec![0.; 2];
        let err = orth.orthogonalize(&basis, 2, &mut w, &mut h).unwrap_err();
        assert!(matches!(err, KrylovError::PreconditionViolation(_)));

        let mut w = vec![1., 0., 0.];
        let mut h = vec![0.; 1];
        assert!(orth.orthogonalize(&basis, 2, &mut w, &mut h).is_err());
    }

    #[test]
    fn test_refinement_recovers_orthogonality() {
        // nearly dependent vector, where a single classical pass loses digits
        let mut basis = Basis::<f64>::new(3, 1, None, 0);
        let s = 1. / f64::sqrt(2.);
        basis.column_mut(0).copy_from_slice(&[s, s, 0.]);

        let settings = EigenSettingsBuilder::<f64>::default()
            .orthog_refine(OrthogRefine::Always)
            .build()
            .unwrap();
        let orth = Orthogonalizer::from(&settings);
        let mut w = vec![1., 1. + 1e-9, 1e-10];
        let mut h = vec![0.];
        let res = orth.orthogonalize(&basis, 1, &mut w, &mut h).unwrap();
        assert!(!res.breakdown);
        assert!(w.dot(basis.column(0)).abs() < 1e-20);
    }
}
