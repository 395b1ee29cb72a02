//! Response-side domain types.

mod actual;
mod comparison;

pub use actual::ActualResponse;
pub use comparison::{ComparisonResult, Diagnostic};
