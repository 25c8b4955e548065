//! Shared building blocks for the service crates: logging setup, small
//! wire types and runtime environment helpers.

pub mod types;
pub mod utils;
pub mod env;
