use crate::algebra::*;
use crate::solver::core::{EigenSettings, KrylovError, RestartType};
use enum_dispatch::*;

/// Decides how much of the current factorization survives a restart
#[enum_dispatch]
pub trait RestartStrategy<T>
where
    T: FloatT,
{
    fn name(&self) -> &'static str;

    /// Number of leading columns (in sorted order) to keep from a
    /// factorization of size `m` whose first `nconv` pairs have converged.
    /// Pair boundaries are not considered here.
    fn retained(&self, nconv: usize, m: usize) -> usize;
}

/// Keeps the converged pairs plus a fraction `keep` of the unconverged ones
#[derive(Debug, Clone, Copy)]
pub struct ThickRestart<T> {
    pub keep: T,
}

/// Keeps only the converged pairs and restarts from the first unconverged
/// Ritz vector
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitRestart;

impl<T> RestartStrategy<T> for ThickRestart<T>
where
    T: FloatT,
{
    fn name(&self) -> &'static str {
        "thick"
    }

    fn retained(&self, nconv: usize, m: usize) -> usize {
        let nfree = m.saturating_sub(nconv);
        let nkeep = (self.keep * nfree.as_T()).floor().to_usize().unwrap_or(0);
        nconv + usize::max(1, nkeep)
    }
}

impl<T> RestartStrategy<T> for ExplicitRestart
where
    T: FloatT,
{
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn retained(&self, nconv: usize, _m: usize) -> usize {
        nconv + 1
    }
}

#[enum_dispatch(RestartStrategy<T>)]
#[derive(Debug, Clone, Copy)]
pub enum RestartPolicy<T>
where
    T: FloatT,
{
    ThickRestart(ThickRestart<T>),
    ExplicitRestart(ExplicitRestart),
}

impl<T: FloatT> From<&EigenSettings<T>> for RestartPolicy<T> {
    fn from(settings: &EigenSettings<T>) -> Self {
        match settings.restart {
            RestartType::Thick => ThickRestart {
                keep: settings.keep,
            }
            .into(),
            RestartType::Explicit => ExplicitRestart.into(),
        }
    }
}

impl<T: FloatT> RestartPolicy<T> {
    /// Restart size for a factorization of size `m` with `nconv` converged
    /// pairs, where `eigi` holds the imaginary parts in sorted order.
    ///
    /// A conjugate pair is never split: the size grows by one to take the
    /// whole pair when there is room, and shrinks by one otherwise.  The
    /// result is at most `m - 1` so that the factorization can grow again.
    pub fn restart_size(&self, nconv: usize, m: usize, eigi: &[T]) -> Result<usize, KrylovError> {
        if nconv >= m || eigi.len() < m {
            return Err(KrylovError::precondition(format!(
                "restart of a size {} factorization with {} converged and {} sorted values",
                m,
                nconv,
                eigi.len()
            )));
        }
        let mut k = usize::min(self.retained(nconv, m), m - 1);
        if k > 0 && splits_pair(eigi, k) {
            if k < m - 1 {
                k += 1;
            } else {
                k -= 1;
            }
        }
        Ok(k)
    }
}

// true if positions k-1 and k form a conjugate pair
fn splits_pair<T: FloatT>(eigi: &[T], k: usize) -> bool {
    // members are adjacent, so count the complex entries before k
    let ncomplex = eigi[0..k].iter().filter(|&&v| v != T::zero()).count();
    ncomplex % 2 == 1
}
