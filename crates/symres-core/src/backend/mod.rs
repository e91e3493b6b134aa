//! # Debug-Information Backends
//!
//! The interface between the resolution algorithm and a concrete
//! debug-information format.
//!
//! Resolution goes through three stages, and each stage is a trait so the
//! algorithm in [`crate::resolver`] never touches a backend's object model:
//!
//! 1. [`DebugInfoBackend`]: loads an artifact from storage and validates it
//!    against a [`BuildSignature`]
//! 2. [`LoadedArtifact`]: a validated but unbound artifact that can open a
//!    session at a load address
//! 3. [`QuerySession`]: a bound session exposing the global scope, name
//!    lookups of function symbols, and relative addresses
//!
//! ## Implementations
//!
//! - [`PdbBackend`]: MSF/PDB files (including Xbox `.xdb`), via the `pdb` crate
//! - [`MemoryBackend`]: in-memory symbol tables for harnesses and tests
//!
//! ## Resource scoping
//!
//! Artifacts and sessions own every handle they use (files, parsed streams).
//! Dropping them releases everything, so the early returns in the resolver
//! never leak.

mod memory;
mod pdb_file;

use std::path::Path;

pub use memory::{MemoryArtifact, MemoryBackend, MemoryFunction, MemoryScope, MemorySession, MemoryTable};
pub use pdb_file::{PdbArtifact, PdbBackend, PdbFunction, PdbScope, PdbSession};

use crate::error::SymbolResult;
use crate::types::{Address, BuildSignature, Rva, SymbolQuery};

/// Loader stage: opens and validates debug-information artifacts
///
/// A backend is cheap to create and holds no per-artifact state; the resolver
/// creates a fresh one for every call.
pub trait DebugInfoBackend
{
    /// Validated, unbound artifact produced by this backend
    type Artifact: LoadedArtifact;

    /// Short backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// Load the artifact at `path` and check it against `signature`.
    ///
    /// ## Errors
    ///
    /// - `ArtifactNotFound`: nothing at `path`
    /// - `ArtifactUnreadable`: unreadable or structurally corrupt artifact
    /// - `SignatureMismatch`: identifier or age differ from `signature`
    fn load_and_validate(&self, path: &Path, signature: &BuildSignature) -> SymbolResult<Self::Artifact>;
}

/// A validated artifact that has not yet been bound to a load address
pub trait LoadedArtifact
{
    /// Session type bound to a load address
    type Session: QuerySession;

    /// Open a query session with the given load-address bias.
    ///
    /// The bias is fixed for the lifetime of the session. To query the same
    /// module at another base, load the artifact again.
    ///
    /// ## Errors
    ///
    /// - `SessionFailure`: the artifact cannot be bound
    fn open_session(self, load_address: Address) -> SymbolResult<Self::Session>;
}

/// A read-only query session bound to one load address
pub trait QuerySession
{
    /// Handle to a scope that can be searched for children
    type Scope;
    /// A candidate symbol produced by a search
    type Symbol;

    /// The load-address bias this session was opened with.
    fn load_address(&self) -> Address;

    /// The root scope under which all module-level symbols live.
    ///
    /// ## Errors
    ///
    /// - `SessionFailure`: the scope cannot be retrieved
    fn global_scope(&mut self) -> SymbolResult<Self::Scope>;

    /// Every function symbol under `scope` whose name matches `query` exactly.
    ///
    /// Candidates are returned in backend order. An empty vector is a normal
    /// result, not an error.
    ///
    /// ## Errors
    ///
    /// - `SymbolEnumeration`: the symbol streams could not be walked
    fn find_functions(&mut self, scope: &Self::Scope, query: &SymbolQuery) -> SymbolResult<Vec<Self::Symbol>>;

    /// Module-relative address of a candidate, or `None` if it has no code location.
    fn relative_virtual_address(&self, symbol: &Self::Symbol) -> Option<Rva>;
}

/// Create the production backend for this platform.
///
/// PDB parsing is pure Rust, so this currently succeeds everywhere; the
/// `Result` keeps the factory signature shared with other backends.
///
/// ## Errors
///
/// - `BackendUnavailable`: never returned by the PDB backend
#[allow(clippy::unnecessary_wraps)]
pub fn create_backend() -> SymbolResult<PdbBackend>
{
    Ok(PdbBackend::new())
}
