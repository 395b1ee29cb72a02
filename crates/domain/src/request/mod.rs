//! Request-side domain types.

mod method;

pub use method::HttpMethod;
