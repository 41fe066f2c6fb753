//! Configuration loading and schema definitions
//!
//! Shared configuration types used by the resolver and its backends.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
