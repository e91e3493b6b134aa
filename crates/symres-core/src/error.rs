//! # Error Types
//!
//! Error handling for symbol resolution.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! These errors are visible to backend implementors and to callers of the
//! individual stages. The top-level [`crate::resolve_symbol_address`]
//! collapses every one of them into "no result" and only logs the reason.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Address, BuildSignature, Rva};

/// Main error type for symbol resolution
///
/// ## Error Categories
///
/// 1. **Backend errors**: BackendUnavailable
/// 2. **Artifact errors**: ArtifactNotFound, ArtifactUnreadable, SignatureMismatch
/// 3. **Session errors**: SessionFailure
/// 4. **Query errors**: SymbolEnumeration, NoSuchSymbol, AddressOverflow
/// 5. **Input errors**: InvalidArgument
/// 6. **I/O errors**: Io
#[derive(Error, Debug)]
pub enum SymbolError
{
    /// The debug-information backend could not be instantiated
    #[error("Debug-information backend unavailable: {0}")]
    BackendUnavailable(String),

    /// No artifact exists at the given path
    #[error("Debug-information artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    /// The artifact exists but cannot be read or is structurally corrupt
    ///
    /// This covers permission problems, truncated files, files that are not
    /// in the expected format at all, and streams that fail to parse.
    #[error("Failed to read debug-information artifact {}: {details}", .path.display())]
    ArtifactUnreadable
    {
        /// Path of the artifact
        path: PathBuf,
        /// What went wrong
        details: String,
    },

    /// The artifact was built for a different binary
    ///
    /// Both the identifier and the age must match. The artifact's timestamp
    /// is never compared.
    #[error("Signature mismatch for {}: expected {expected}, found {found}", .path.display())]
    SignatureMismatch
    {
        /// Path of the rejected artifact
        path: PathBuf,
        /// Signature supplied by the caller
        expected: BuildSignature,
        /// Signature embedded in the artifact
        found: BuildSignature,
    },

    /// A validated artifact could not be bound to a load address
    #[error("Failed to open query session: {0}")]
    SessionFailure(String),

    /// Enumerating candidate symbols failed structurally
    ///
    /// Distinct from [`SymbolError::NoSuchSymbol`], which is a normal outcome.
    #[error("Symbol enumeration failed: {0}")]
    SymbolEnumeration(String),

    /// No function symbol with the given name carries a code location
    #[error("No function symbol named {0:?}")]
    NoSuchSymbol(String),

    /// `base + rva` does not fit in the address space
    #[error("Address overflow: {base} + {rva}")]
    AddressOverflow
    {
        /// Load address of the module
        base: Address,
        /// Relative address reported by the backend
        rva: Rva,
    },

    /// Invalid argument passed to a resolver function
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error (for file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SymbolError
{
    /// Whether this error only means the symbol is absent.
    ///
    /// Absence is an expected outcome and is logged more quietly than faults.
    #[must_use]
    pub fn is_absence(&self) -> bool
    {
        matches!(self, SymbolError::NoSuchSymbol(_))
    }
}

/// Convenience type alias for `Result<T, SymbolError>`
///
/// ```rust
/// use symres_core::error::SymbolResult;
/// fn foo() -> SymbolResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type SymbolResult<T> = std::result::Result<T, SymbolError>;
