//! # Types
//!
//! Backend-agnostic types used throughout the resolver.
//!
//! These types describe addresses, build signatures and queries without
//! referring to any particular debug-information format.

pub mod address;
pub mod query;
pub mod signature;

// Re-export all public types
pub use address::{Address, Rva};
pub use query::SymbolQuery;
pub use signature::BuildSignature;
