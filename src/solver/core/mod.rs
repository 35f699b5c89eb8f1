// package together all of the following and re-export
// in a partially flattened structure :
// : method and reporting traits
// : operators and spectral transformations
// : basis, orthogonalization and factorization kernels
// : residuals, convergence, sorting and restart policies
// : user settings, method registry and errors
// : main solver implementation

pub mod callbacks;
pub mod traits;

//partially flatten top level pieces

mod basis;
mod context;
mod convergence;
mod errors;
mod factorization;
mod info;
mod info_print;
#[cfg(feature = "serde")]
mod json;
mod operator;
mod orthog;
mod registry;
mod residuals;
mod restart;
mod settings;
mod solution;
mod solver;
mod sorting;
mod transform;

pub use basis::*;
pub use context::*;
pub use convergence::*;
pub use errors::*;
pub use factorization::*;
pub use info::*;
pub use operator::*;
pub use orthog::*;
pub use registry::*;
pub use residuals::*;
pub use restart::*;
pub use settings::*;
pub use solution::*;
pub use solver::*;
pub use sorting::*;
pub use transform::*;
