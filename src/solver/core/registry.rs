use super::traits::EigenMethod;
use super::{EigenSettings, KrylovError};
use crate::algebra::*;
use crate::solver::implementations::{Arnoldi, DenseMethod, Lanczos};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::RwLock;

/// Builds a method instance from the solver settings
pub type MethodConstructor<T> = fn(&EigenSettings<T>) -> Box<dyn EigenMethod<T>>;

/// Table of eigensolver methods, keyed by name.
///
/// One registry exists per floating point type and is initialised with the
/// built-in methods on first use.  Further methods can be registered at any
/// time and become available to solvers constructed afterwards.
pub struct MethodRegistry<T: FloatT> {
    methods: RwLock<HashMap<String, MethodConstructor<T>>>,
}

impl<T> MethodRegistry<T>
where
    T: FloatT,
{
    /// An empty registry
    pub fn new() -> Self {
        Self {
            methods: RwLock::new(HashMap::new()),
        }
    }

    /// A registry holding the "arnoldi", "lanczos" and "dense" methods
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register("arnoldi", |settings| Box::new(Arnoldi::new(settings)));
        registry.register("lanczos", |settings| Box::new(Lanczos::new(settings)));
        registry.register("dense", |_| Box::new(DenseMethod::new()));
        registry
    }

    /// Add a method, replacing any method of the same name.  Returns `true`
    /// if a method was replaced.
    pub fn register(&self, name: &str, ctor: MethodConstructor<T>) -> bool {
        let mut methods = self.methods.write().unwrap_or_else(|e| e.into_inner());
        methods.insert(name.to_string(), ctor).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        let methods = self.methods.read().unwrap_or_else(|e| e.into_inner());
        methods.contains_key(name)
    }

    /// Sorted list of registered names
    pub fn names(&self) -> Vec<String> {
        let methods = self.methods.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = methods.keys().cloned().collect();
        names.sort();
        names
    }

    /// Construct the method registered as `name`
    pub fn create(
        &self,
        name: &str,
        settings: &EigenSettings<T>,
    ) -> Result<Box<dyn EigenMethod<T>>, KrylovError> {
        let ctor = {
            let methods = self.methods.read().unwrap_or_else(|e| e.into_inner());
            methods.get(name).copied()
        };
        match ctor {
            Some(ctor) => Ok(ctor(settings)),
            None => Err(KrylovError::precondition(format!(
                "unknown method \"{name}\", expected one of {:?}",
                self.names()
            ))),
        }
    }
}

impl<T: FloatT> Default for MethodRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    static ref METHODS_F32: MethodRegistry<f32> = MethodRegistry::with_builtins();
    static ref METHODS_F64: MethodRegistry<f64> = MethodRegistry::with_builtins();
}

/// Floating point types with a process wide [`MethodRegistry`]
pub trait MethodConfiguration: FloatT {
    fn method_registry() -> &'static MethodRegistry<Self>;
}

macro_rules! impl_method_configuration {
    ($T:ty, $registry:ident) => {
        impl MethodConfiguration for $T {
            fn method_registry() -> &'static MethodRegistry<$T> {
                &$registry
            }
        }
    };
}
impl_method_configuration!(f32, METHODS_F32);
impl_method_configuration!(f64, METHODS_F64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_methods() {
        let registry = f64::method_registry();
        for name in ["arnoldi", "lanczos", "dense"] {
            assert!(registry.contains(name));
        }
        let settings = EigenSettings::<f64>::default();
        let method = registry.create("lanczos", &settings).unwrap();
        assert_eq!(method.name(), "lanczos");

        let err = registry.create("jacobi-davidson", &settings).err().unwrap();
        assert!(matches!(err, KrylovError::PreconditionViolation(_)));
    }

    #[test]
    fn test_register_method() {
        let registry = MethodRegistry::<f32>::new();
        assert!(registry.names().is_empty());
        assert!(!registry.register("mine", |_| Box::new(DenseMethod::new())));
        assert!(registry.register("mine", |_| Box::new(DenseMethod::new())));
        assert_eq!(registry.names(), ["mine"]);
    }
}
