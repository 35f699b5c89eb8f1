use crate::algebra::*;
use crate::solver::core::{ConvergenceTest, EigenSettings, KrylovError};
use std::convert::Infallible;

/// User supplied error estimate `f(re, im, resnorm)`
pub type UserConvergenceFn<T> = fn(T, T, T) -> T;

/// Maps residual norms to error estimates and decides convergence
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceCriterion<T> {
    pub test: ConvergenceTest,
    pub tol: T,
    /// norm estimate of `A`, used by `ConvergenceTest::NormRelative`
    pub norm_a: T,
    /// norm estimate of `B`, used by `ConvergenceTest::NormRelative`
    pub norm_b: T,
    pub user: Option<UserConvergenceFn<T>>,
}

impl<T: FloatT> ConvergenceCriterion<T> {
    pub fn new(test: ConvergenceTest, tol: T) -> Self {
        Self {
            test,
            tol,
            norm_a: T::one(),
            norm_b: T::one(),
            user: None,
        }
    }

    pub(crate) fn from_settings(settings: &EigenSettings<T>) -> Self {
        Self::new(settings.conv_test, settings.tol)
    }

    pub fn error_estimate(&self, re: T, im: T, resnorm: T) -> T {
        let absλ = T::hypot(re, im);
        match self.test {
            ConvergenceTest::Absolute => resnorm,
            ConvergenceTest::EigRelative => {
                if absλ > T::zero() {
                    resnorm / absλ
                } else {
                    resnorm
                }
            }
            ConvergenceTest::NormRelative => resnorm / (self.norm_a + absλ * self.norm_b),
            ConvergenceTest::User => match self.user {
                Some(f) => f(re, im, resnorm),
                None => resnorm,
            },
        }
    }

    pub fn passes(&self, errest: T) -> bool {
        errest < self.tol
    }
}

/// Data for one candidate of a convergence scan, in the order requested
#[derive(Debug, Clone, Copy)]
pub struct Candidate<T> {
    pub re: T,
    pub im: T,
    pub resnorm: T,
    /// first member of a conjugate pair whose partner is the next index
    pub pair: bool,
}

impl<T: FloatT> Candidate<T> {
    pub fn real(re: T, resnorm: T) -> Self {
        Self {
            re,
            im: T::zero(),
            resnorm,
            pair: false,
        }
    }
}

/// Outcome of the test for one eigenvalue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairVerdict<T> {
    pub index: usize,
    pub errest: T,
    pub converged: bool,
    /// member of a conjugate pair tested jointly
    pub paired: bool,
}

/// Result of a convergence scan
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceScan<T> {
    /// first unconverged index, or the end of the scanned range
    pub k_out: usize,
    /// verdicts for every index that was tested, in scan order
    pub verdicts: Vec<PairVerdict<T>>,
}

impl<T: FloatT> ConvergenceScan<T> {
    /// error estimate of the first unconverged candidate, if any was tested
    pub fn first_unconverged(&self) -> Option<T> {
        self.verdicts.iter().find(|v| !v.converged).map(|v| v.errest)
    }
}

/// Scan candidates `kini..kini+nits` in order, stopping after the first
/// failure unless `track_all` is set.
///
/// `candidate(k)` is only evaluated for indices that are reached.  A
/// candidate flagged as the head of a conjugate pair is tested jointly with
/// the next index, which receives the same error estimate and is never
/// evaluated.  This holds even when the partner lies one past the scanned
/// range, in which case a converged scan reports `k_out = kini + nits + 1`.
/// Any other candidate is tested on its own, whatever its imaginary part.
/// Indices before `k_out` are always converged.
pub fn scan_convergence<T, E, F>(
    criterion: &ConvergenceCriterion<T>,
    kini: usize,
    nits: usize,
    track_all: bool,
    mut candidate: F,
) -> Result<ConvergenceScan<T>, E>
where
    T: FloatT,
    F: FnMut(usize) -> Result<Candidate<T>, E>,
{
    let end = kini + nits;
    let mut marker: Option<usize> = None;
    let mut verdicts = Vec::with_capacity(nits + 1);

    let mut k = kini;
    while k < end {
        let c = candidate(k)?;
        let errest = criterion.error_estimate(c.re, c.im, c.resnorm);
        let converged = criterion.passes(errest);
        if marker.is_none() && !converged {
            marker = Some(k);
        }

        verdicts.push(PairVerdict {
            index: k,
            errest,
            converged,
            paired: c.pair,
        });
        if c.pair {
            verdicts.push(PairVerdict {
                index: k + 1,
                errest,
                converged,
                paired: true,
            });
            k += 1;
        }
        k += 1;

        if marker.is_some() && !track_all {
            break;
        }
    }

    Ok(ConvergenceScan {
        k_out: marker.unwrap_or(k),
        verdicts,
    })
}

/// Convergence test on precomputed residual norms.  Error estimates of the
/// tested entries are written to `errest`.
///
/// Conjugate pairs are stored head first, with `eigi > 0` at the head and
/// the partner at the next index.  An entry with negative imaginary part
/// is the tail of a pair and is only tested on its own when the scan
/// starts there.
#[allow(clippy::too_many_arguments)]
pub fn test_convergence<T: FloatT>(
    criterion: &ConvergenceCriterion<T>,
    eigr: &[T],
    eigi: &[T],
    residuals: &[T],
    errest: &mut [T],
    kini: usize,
    nits: usize,
    track_all: bool,
) -> Result<ConvergenceScan<T>, KrylovError> {
    let n = eigr.len();
    if eigi.len() != n || residuals.len() != n || errest.len() != n {
        return Err(KrylovError::precondition(format!(
            "convergence test on arrays of lengths {}, {}, {} and {}",
            n,
            eigi.len(),
            residuals.len(),
            errest.len()
        )));
    }
    if kini + nits > n {
        return Err(KrylovError::precondition(format!(
            "convergence test of {} values from {} exceeds {}",
            nits, kini, n
        )));
    }

    let scan = scan_convergence::<T, Infallible, _>(criterion, kini, nits, track_all, |k| {
        Ok(Candidate {
            re: eigr[k],
            im: eigi[k],
            resnorm: residuals[k],
            pair: eigi[k] > T::zero() && k + 1 < n,
        })
    });
    let scan = match scan {
        Ok(scan) => scan,
        Err(e) => match e {},
    };
    for v in scan.verdicts.iter() {
        errest[v.index] = v.errest;
    }
    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_scan() {
        let crit = ConvergenceCriterion::<f64>::new(ConvergenceTest::Absolute, 1e-10);
        let eigr = [1.; 4];
        let eigi = [0.; 4];
        let res = [1e-14, 1e-14, 1e-3, 1e-14];
        let mut errest = [f64::NAN; 4];

        let scan = test_convergence(&crit, &eigr, &eigi, &res, &mut errest, 0, 4, false).unwrap();
        assert_eq!(scan.k_out, 2);
        assert_eq!(scan.verdicts.len(), 3);
        assert!(errest[3].is_nan());
        assert_eq!(scan.first_unconverged(), Some(1e-3));

        let scan = test_convergence(&crit, &eigr, &eigi, &res, &mut errest, 0, 4, true).unwrap();
        assert_eq!(scan.k_out, 2);
        let flags: Vec<bool> = scan.verdicts.iter().map(|v| v.converged).collect();
        assert_eq!(flags, [true, true, false, true]);
        assert_eq!(errest, res);
    }

    #[test]
    fn test_pair_scan() {
        let crit = ConvergenceCriterion::<f64>::new(ConvergenceTest::Absolute, 1e-8);
        let eigr = [2., 1., 1., 0.5];
        let eigi = [0., 3., -3., 0.];
        // the second pair member is never evaluated
        let res = [1e-12, 1e-12, 1e3, 1e-3];
        let mut errest = [0f64; 4];

        let scan = test_convergence(&crit, &eigr, &eigi, &res, &mut errest, 0, 4, false).unwrap();
        assert_eq!(scan.k_out, 3);
        assert_eq!(errest[1].to_bits(), errest[2].to_bits());
        assert!(scan.verdicts[1].paired && scan.verdicts[2].paired);

        // a scan starting past the locked prefix
        let scan = test_convergence(&crit, &eigr, &eigi, &res, &mut errest, 3, 1, false).unwrap();
        assert_eq!(scan.k_out, 3);
        assert_eq!(scan.verdicts.len(), 1);
    }

    #[test]
    fn test_scan_starting_at_pair_tail() {
        let crit = ConvergenceCriterion::<f64>::new(ConvergenceTest::Absolute, 1e-8);
        let eigr = [1., 1., 5.];
        let eigi = [2., -2., 0.];
        let res = [1e-12, 1e-12, 1e3];
        let mut errest = [f64::NAN; 3];

        // the tail is tested alone and does not swallow index 2
        let scan = test_convergence(&crit, &eigr, &eigi, &res, &mut errest, 1, 2, false).unwrap();
        assert_eq!(scan.k_out, 2);
        assert_eq!(scan.verdicts.len(), 2);
        assert!(!scan.verdicts[0].paired);
        assert!(!scan.verdicts[1].converged);
        assert_eq!(errest[2], 1e3);
        assert!(errest[0].is_nan());
    }

    #[test]
    fn test_pair_crossing_scan_end() {
        let crit = ConvergenceCriterion::<f64>::new(ConvergenceTest::Absolute, 1e-8);
        let eigr = [1., 1.];
        let eigi = [2., -2.];
        let res = [1e-12, 1e-12];
        let mut errest = [f64::NAN; 2];

        let scan = test_convergence(&crit, &eigr, &eigi, &res, &mut errest, 0, 1, false).unwrap();
        assert_eq!(scan.k_out, 2);
        assert_eq!(errest[1].to_bits(), errest[0].to_bits());
        assert!(scan.verdicts.iter().all(|v| v.paired && v.converged));

        // a trailing positive entry has no partner
        let eigi = [0., 2.];
        let scan = test_convergence(&crit, &eigr, &eigi, &res, &mut errest, 0, 2, false).unwrap();
        assert_eq!(scan.k_out, 2);
        assert!(!scan.verdicts[1].paired);
    }

    #[test]
    fn test_bad_dimensions() {
        let crit = ConvergenceCriterion::<f64>::new(ConvergenceTest::Absolute, 1e-8);
        let x = [1f64; 3];
        let mut errest = [0f64; 3];
        let err = test_convergence(&crit, &x, &x[0..2], &x, &mut errest, 0, 2, false).unwrap_err();
        assert!(matches!(err, KrylovError::PreconditionViolation(_)));
        let err = test_convergence(&crit, &x, &x, &x, &mut errest, 2, 2, false).unwrap_err();
        assert!(matches!(err, KrylovError::PreconditionViolation(_)));
    }

    #[test]
    fn test_error_estimates() {
        let mut crit = ConvergenceCriterion::<f64>::new(ConvergenceTest::EigRelative, 1e-8);
        assert_eq!(crit.error_estimate(3., 4., 1.), 0.2);
        assert_eq!(crit.error_estimate(0., 0., 1.), 1.);

        crit.test = ConvergenceTest::NormRelative;
        crit.norm_a = 5.;
        crit.norm_b = 2.;
        assert_eq!(crit.error_estimate(0., 2.5, 3.), 0.3);

        crit.test = ConvergenceTest::User;
        crit.user = Some(|re, _im, res| res * re);
        assert_eq!(crit.error_estimate(2., 0., 3.), 6.);
        assert!(!crit.passes(6.));
    }

    #[test]
    fn test_scan_propagates_errors() {
        let crit = ConvergenceCriterion::<f64>::new(ConvergenceTest::Absolute, 1e-8);
        let out = scan_convergence(&crit, 0, 3, false, |k| {
            if k == 1 {
                Err("failed")
            } else {
                Ok(Candidate::real(1., 0.))
            }
        });
        assert_eq!(out, Err("failed"));
    }
}
