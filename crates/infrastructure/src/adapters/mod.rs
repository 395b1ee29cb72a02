//! Infrastructure adapters

mod reqwest_dispatcher;

pub use reqwest_dispatcher::{DEFAULT_TIMEOUT, ReqwestDispatcher};
