//! Routing resources

pub mod resource_static;

pub use resource_static::{RouterStatic, SDWAN};
