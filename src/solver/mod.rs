//! SVM solver implementations
//!
//! The C-SVC dual is solved with Sequential Minimal Optimization, choosing each
//! working pair with second-order information (Fan, Chen and Lin, 2005).

pub mod smo;

pub use self::smo::SmoSolver;
