//! Function-call surface over the identifier resolver.

pub mod ids;

pub use ids::{IdFunction, IdFunctions};
