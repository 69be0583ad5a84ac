//! Core traits for injection and providers.

mod provider;
mod resolver;

pub use provider::Provider;
pub use resolver::{AnyArc, Inject, InjectCore};
