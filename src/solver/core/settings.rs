use crate::algebra::*;
use derive_builder::Builder;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by settings validation
pub enum SettingsError {
    /// An error attributable to one of the fields
    #[error("Bad field: {0}")]
    BadField(&'static str),
    /// A field holding an unusable value
    #[error("Bad value for field: {0}")]
    BadFieldValue(&'static str),
}

/// Which part of the spectrum to compute.
///
/// Comparisons are made on eigenvalues of the original problem, i.e. after
/// undoing any spectral transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Which {
    #[default]
    LargestMagnitude,
    SmallestMagnitude,
    LargestReal,
    SmallestReal,
    /// largest |Im(λ)|
    LargestImaginary,
    /// smallest |Im(λ)|
    SmallestImaginary,
    /// closest to `target` in absolute distance
    TargetMagnitude,
    /// closest to `target` along the real axis
    TargetReal,
}

impl Which {
    pub(crate) fn needs_target(&self) -> bool {
        matches!(self, Which::TargetMagnitude | Which::TargetReal)
    }
}

/// How the residual norm of a Ritz pair is turned into an error estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConvergenceTest {
    /// `res`
    Absolute,
    /// `res / |λ|`
    #[default]
    EigRelative,
    /// `res / (‖A‖ + |λ|‖B‖)`
    NormRelative,
    /// user supplied function set on the solver
    User,
}

/// Structure of the problem operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProblemType {
    /// symmetric `A` (and symmetric positive definite `B` if present)
    Hermitian,
    #[default]
    NonHermitian,
}

impl ProblemType {
    pub fn is_hermitian(&self) -> bool {
        matches!(self, ProblemType::Hermitian)
    }
}

/// How approximate eigenpairs are extracted from the Krylov subspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Extraction {
    /// Ritz pairs of the projected operator
    #[default]
    Ritz,
    /// harmonic Ritz pairs with respect to `target`, for interior
    /// eigenvalues without a shift-and-invert
    Harmonic,
}

/// Restart strategy used by the Krylov methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RestartType {
    /// keep a fraction of the unconverged Ritz vectors
    #[default]
    Thick,
    /// keep only locked vectors and restart from one Ritz vector
    Explicit,
}

/// Gram-Schmidt variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrthogType {
    #[default]
    Classical,
    Modified,
}

/// Iterative refinement of the Gram-Schmidt process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrthogRefine {
    Never,
    #[default]
    IfNeeded,
    Always,
}

/// Settings for the eigensolvers.
///
/// Settings are usually constructed through the builder:
/// ```no_run
/// use krylov::solver::*;
///
/// let settings = EigenSettingsBuilder::<f64>::default()
///     .nev(4)
///     .which(Which::SmallestReal)
///     .tol(1e-10)
///     .build()
///     .unwrap();
/// ```
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EigenSettings<T: FloatT> {
    ///number of requested eigenpairs
    #[builder(default = "1")]
    pub nev: usize,

    ///maximum dimension of the Krylov subspace (0 = automatic)
    #[builder(default = "0")]
    pub ncv: usize,

    ///maximum number of restarts (0 = automatic)
    #[builder(default = "0")]
    pub max_it: u32,

    ///convergence tolerance
    #[builder(default = "(1e-8).as_T()")]
    pub tol: T,

    ///portion of the spectrum to compute
    #[builder(default = "Which::LargestMagnitude")]
    pub which: Which,

    ///target value for `Which::TargetMagnitude` and `Which::TargetReal`
    #[builder(default = "T::zero()")]
    pub target: T,

    ///convergence criterion
    #[builder(default = "ConvergenceTest::EigRelative")]
    pub conv_test: ConvergenceTest,

    ///test every candidate for monitoring, not only up to the first failure
    #[builder(default = "false")]
    pub track_all: bool,

    ///compute explicit residuals instead of the cheap estimates
    #[builder(default = "false")]
    pub true_residual: bool,

    ///structure of the problem
    #[builder(default = "ProblemType::NonHermitian")]
    pub problem_type: ProblemType,

    ///solution method ("arnoldi", "lanczos", "dense" or a registered key)
    #[builder(default = r#""arnoldi".to_string()"#)]
    pub method: String,

    ///Ritz or harmonic extraction (Arnoldi only)
    #[builder(default = "Extraction::Ritz")]
    pub extraction: Extraction,

    ///restart strategy
    #[builder(default = "RestartType::Thick")]
    pub restart: RestartType,

    ///fraction of unconverged Ritz vectors kept at a thick restart
    #[builder(default = "(0.5).as_T()")]
    pub keep: T,

    ///Gram-Schmidt variant
    #[builder(default = "OrthogType::Classical")]
    pub orthog_type: OrthogType,

    ///Gram-Schmidt refinement
    #[builder(default = "OrthogRefine::IfNeeded")]
    pub orthog_refine: OrthogRefine,

    ///refinement threshold: refine when the norm drops below eta times its original value
    #[builder(default = "T::FRAC_1_SQRT_2()")]
    pub orthog_eta: T,

    ///breakdown threshold, relative to the norm of the vector being orthogonalized
    #[builder(default = "T::epsilon() * (100.).as_T()")]
    pub breakdown_tol: T,

    ///seed for random starting and restart vectors
    #[builder(default = "0")]
    pub seed: u64,

    ///verbose printing
    #[builder(default = "false")]
    pub verbose: bool,
}

impl<T> Default for EigenSettings<T>
where
    T: FloatT,
{
    fn default() -> EigenSettings<T> {
        EigenSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> EigenSettings<T>
where
    T: FloatT,
{
    /// Checks values that can be tested independently of the problem.
    /// Dimensional checks happen when a solver is constructed.
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_nev(self.nev)?;
        validate_tol(self.tol)?;
        validate_keep(self.keep)?;
        validate_eta(self.orthog_eta)?;
        validate_breakdown_tol(self.breakdown_tol)?;
        validate_method(&self.method)?;
        Ok(())
    }

    /// Subspace dimension for a problem of size `n`
    pub(crate) fn ncv_for(&self, n: usize) -> usize {
        if self.ncv != 0 {
            self.ncv
        } else {
            usize::min(n, usize::max(2 * self.nev, self.nev + 15))
        }
    }

    /// Restart limit for a problem of size `n`
    pub(crate) fn max_it_for(&self, n: usize, ncv: usize) -> u32 {
        if self.max_it != 0 {
            self.max_it
        } else {
            let its = usize::max(100, 2 * n / usize::max(ncv, 1));
            its.min(u32::MAX as usize) as u32
        }
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for EigenSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        EigenSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> EigenSettingsBuilder<T>
where
    T: FloatT,
{
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(nev) = self.nev {
            validate_nev(nev)?;
        }
        if let Some(tol) = self.tol {
            validate_tol(tol)?;
        }
        if let Some(keep) = self.keep {
            validate_keep(keep)?;
        }
        if let Some(eta) = self.orthog_eta {
            validate_eta(eta)?;
        }
        if let Some(btol) = self.breakdown_tol {
            validate_breakdown_tol(btol)?;
        }
        if let Some(ref method) = self.method {
            validate_method(method)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_nev(nev: usize) -> Result<(), SettingsError> {
    if nev == 0 {
        return Err(SettingsError::BadFieldValue("nev"));
    }
    Ok(())
}

fn validate_tol<T: FloatT>(tol: T) -> Result<(), SettingsError> {
    if !(tol > T::zero()) || !tol.is_finite() {
        return Err(SettingsError::BadFieldValue("tol"));
    }
    Ok(())
}

fn validate_keep<T: FloatT>(keep: T) -> Result<(), SettingsError> {
    if !(keep > T::zero() && keep < T::one()) {
        return Err(SettingsError::BadFieldValue("keep"));
    }
    Ok(())
}

fn validate_eta<T: FloatT>(eta: T) -> Result<(), SettingsError> {
    if !(eta > T::zero() && eta <= T::one()) {
        return Err(SettingsError::BadFieldValue("orthog_eta"));
    }
    Ok(())
}

fn validate_breakdown_tol<T: FloatT>(tol: T) -> Result<(), SettingsError> {
    if !(tol >= T::zero() && tol < T::one()) {
        return Err(SettingsError::BadFieldValue("breakdown_tol"));
    }
    Ok(())
}

fn validate_method(method: &str) -> Result<(), SettingsError> {
    if method.is_empty() {
        return Err(SettingsError::BadField("method"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = EigenSettings::<f64>::default();
        assert_eq!(settings.nev, 1);
        assert_eq!(settings.method, "arnoldi");
        assert_eq!(settings.which, Which::LargestMagnitude);
        assert!(settings.validate().is_ok());
        assert_eq!(settings.ncv_for(1000), 16);
        assert_eq!(settings.ncv_for(10), 10);
    }

    #[test]
    fn test_settings_validate() {
        assert!(EigenSettingsBuilder::<f64>::default()
            .nev(0)
            .build()
            .is_err());
        assert!(EigenSettingsBuilder::<f64>::default()
            .tol(0.0)
            .build()
            .is_err());
        assert!(EigenSettingsBuilder::<f64>::default()
            .keep(1.0)
            .build()
            .is_err());

        let settings = EigenSettingsBuilder::<f32>::default()
            .nev(3)
            .ncv(12)
            .method("lanczos".to_string())
            .build()
            .unwrap();
        assert_eq!(settings.ncv_for(100), 12);

        let mut settings = settings;
        settings.tol = -1.0;
        assert_eq!(
            settings.validate(),
            Err(SettingsError::BadFieldValue("tol"))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_settings_json() {
        let settings = EigenSettingsBuilder::<f64>::default()
            .nev(5)
            .which(Which::SmallestReal)
            .build()
            .unwrap();
        let json = serde_json::to_string(&settings).unwrap();
        let back: EigenSettings<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.nev, 5);
        assert_eq!(back.which, Which::SmallestReal);

        // missing fields take default values
        let partial: EigenSettings<f64> = serde_json::from_str(r#"{"nev": 2}"#).unwrap();
        assert_eq!(partial.nev, 2);
        assert_eq!(partial.method, "arnoldi");
    }
}
