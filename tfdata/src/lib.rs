//! tfdata - Terraform resource data model for Rust providers
//!
//! Provides the pieces a provider needs to move values between Terraform's
//! schema-driven resource model and a JSON API: attribute paths, schema
//! declaration, and the `ResourceData` accessor used by CRUD code.

pub mod error;
pub mod path;
pub mod resource_data;
pub mod schema;

pub use error::{Result, TfdataError};
pub use path::{AttributePath, AttributePathStep};
pub use resource_data::{MemoryResourceData, ResourceData};
pub use schema::{Attribute, AttributeBuilder, AttributeType, Block, Schema, SchemaBuilder};
