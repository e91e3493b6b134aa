//! # symres-core
//!
//! Resolve the runtime address of a named function inside a loaded module
//! from build-matched debug information.
//!
//! This crate provides:
//! - Loading and signature validation of PDB / XDB artifacts
//! - Query sessions bound to a module's load address
//! - Exact, case-sensitive lookup of function symbols
//! - Searching a symbols directory for the artifact that matches a module
//! - Reading a module's build signature from a PE image
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use symres_core::prelude::*;
//!
//! let signature = BuildSignature::from_debug_id("111111112222333344445555555555553")?;
//! match resolve_symbol_address("DoWork", Path::new("game.pdb"), Address::new(0x4000_0000), &signature) {
//!     Some(address) => println!("DoWork at {address}"),
//!     None => println!("DoWork not resolved"),
//! }
//! # Ok::<(), SymbolError>(())
//! ```
//!
//! ## Backends
//!
//! The resolver is written against the traits in [`backend`]. The PDB
//! backend is the default; [`backend::MemoryBackend`] serves in-memory
//! tables.

pub mod backend;
pub mod error;
pub mod image;
pub mod prelude;
pub mod resolver;
pub mod search;
pub mod types;

pub use error::{SymbolError, SymbolResult};
pub use resolver::{resolve_symbol_address, resolve_symbol_address_with};
pub use search::resolve_in_symbol_path;
pub use types::{Address, BuildSignature, Rva, SymbolQuery};
