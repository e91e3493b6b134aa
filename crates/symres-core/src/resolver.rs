//! # Symbol Resolution
//!
//! The single resolution operation: debug information + build signature +
//! load address + name in, absolute address (or nothing) out.
//!
//! ## Stages
//!
//! ```text
//! Unloaded -> Loaded & Validated -> Bound -> Searched -> Resolved | Unresolved
//! ```
//!
//! 1. **Loader**: a fresh backend loads the artifact and checks its signature
//! 2. **Session**: the artifact is bound to the base address
//! 3. **Matcher**: function symbols under the global scope are filtered by
//!    exact name; the first candidate with a relative address wins
//!
//! Every call starts from scratch. Nothing is cached, so concurrent calls on
//! different threads never share state, and a stale artifact or base address
//! can never leak from one call into the next.
//!
//! ## Errors
//!
//! Every failure is collapsed into `None` at this boundary. The reason is
//! logged with `tracing` at `debug` (symbol absent) or `warn` (everything
//! else).

use std::path::Path;

use tracing::{debug, trace, warn};

use crate::backend::{create_backend, DebugInfoBackend, LoadedArtifact, QuerySession};
use crate::error::{SymbolError, SymbolResult};
use crate::types::{Address, BuildSignature, SymbolQuery};

/// Resolve the absolute address of a function using the PDB backend.
///
/// ## Parameters
///
/// - `symbol_name`: exact, case-sensitive function name
/// - `debug_info_path`: path of the `.pdb` / `.xdb` artifact
/// - `base_address`: where the module is currently loaded
/// - `signature`: identifier and age the artifact must carry
///
/// ## Returns
///
/// `Some(base_address + rva)` for the first matching function that has a
/// code location, `None` for any failure or when no such function exists.
///
/// ## Example
///
/// ```rust,no_run
/// use std::path::Path;
///
/// use symres_core::resolve_symbol_address;
/// use symres_core::types::{Address, BuildSignature};
///
/// let signature = BuildSignature::parse("11111111-2222-3333-4444-555555555555", 3)?;
/// let address = resolve_symbol_address("DoWork", Path::new("game.pdb"), Address::new(0x4000_0000), &signature);
/// if let Some(address) = address {
///     println!("DoWork is at {address}");
/// }
/// # Ok::<(), symres_core::error::SymbolError>(())
/// ```
pub fn resolve_symbol_address(
    symbol_name: &str,
    debug_info_path: &Path,
    base_address: Address,
    signature: &BuildSignature,
) -> Option<Address>
{
    resolve_symbol_address_with(create_backend, symbol_name, debug_info_path, base_address, signature)
}

/// Resolve using a backend produced by `factory`.
///
/// `factory` is invoked once per call. A factory that cannot produce a
/// backend should return `BackendUnavailable`.
///
/// ## Example
///
/// ```rust
/// use symres_core::backend::{MemoryBackend, MemoryTable};
/// use symres_core::resolve_symbol_address_with;
/// use symres_core::types::{Address, BuildSignature};
///
/// let signature = BuildSignature::parse("11111111-2222-3333-4444-555555555555", 3)?;
/// let backend = MemoryBackend::new().with_artifact("game.pdb", MemoryTable::new(signature).with_function("DoWork", 0x1000));
///
/// let address = resolve_symbol_address_with(
///     || Ok(backend.clone()),
///     "DoWork",
///     "game.pdb".as_ref(),
///     Address::new(0x4000_0000),
///     &signature,
/// );
/// assert_eq!(address, Some(Address::new(0x4000_1000)));
/// # Ok::<(), symres_core::error::SymbolError>(())
/// ```
pub fn resolve_symbol_address_with<B, F>(
    factory: F,
    symbol_name: &str,
    debug_info_path: &Path,
    base_address: Address,
    signature: &BuildSignature,
) -> Option<Address>
where
    B: DebugInfoBackend,
    F: FnOnce() -> SymbolResult<B>,
{
    debug!(
        symbol = symbol_name,
        path = %debug_info_path.display(),
        base = %base_address,
        %signature,
        "Resolving symbol"
    );

    match try_resolve(factory, symbol_name, debug_info_path, base_address, signature) {
        Ok(address) => {
            debug!(symbol = symbol_name, %address, "Resolved symbol");
            Some(address)
        }
        Err(err) if err.is_absence() => {
            debug!(symbol = symbol_name, path = %debug_info_path.display(), "Symbol not found");
            None
        }
        Err(err) => {
            warn!(symbol = symbol_name, path = %debug_info_path.display(), error = %err, "Symbol resolution failed");
            None
        }
    }
}

/// The resolution pipeline with its failure reason intact.
pub(crate) fn try_resolve<B, F>(
    factory: F,
    symbol_name: &str,
    debug_info_path: &Path,
    base_address: Address,
    signature: &BuildSignature,
) -> SymbolResult<Address>
where
    B: DebugInfoBackend,
    F: FnOnce() -> SymbolResult<B>,
{
    if symbol_name.is_empty() {
        return Err(SymbolError::InvalidArgument("symbol name is empty".to_string()));
    }

    let backend = factory()?;
    trace!(backend = backend.name(), path = %debug_info_path.display(), "Loading debug information");

    let artifact = backend.load_and_validate(debug_info_path, signature)?;
    let mut session = artifact.open_session(base_address)?;
    first_match_address(&mut session, &SymbolQuery::new(symbol_name))
}

/// Search the global scope of `session` and relocate the first usable match.
///
/// Candidates are visited in the order the backend returns them. The first
/// one with a relative address is accepted and the rest are ignored; there
/// is no tie-breaking between several same-named functions.
///
/// ## Errors
///
/// - `SessionFailure`: the global scope cannot be retrieved
/// - `SymbolEnumeration`: the search itself failed
/// - `NoSuchSymbol`: no candidate, or no candidate with a code location
/// - `AddressOverflow`: `load_address + rva` overflows
pub fn first_match_address<S>(session: &mut S, query: &SymbolQuery) -> SymbolResult<Address>
where
    S: QuerySession,
{
    let scope = session.global_scope()?;
    let candidates = session.find_functions(&scope, query)?;
    trace!(symbol = query.name(), candidates = candidates.len(), "Searched global scope");

    let base = session.load_address();
    let Some(rva) = candidates
        .iter()
        .find_map(|candidate| session.relative_virtual_address(candidate))
    else {
        return Err(SymbolError::NoSuchSymbol(query.name().to_string()));
    };

    base.offset_by(rva).ok_or(SymbolError::AddressOverflow { base, rva })
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::backend::{MemoryBackend, MemoryTable};

    fn signature() -> BuildSignature
    {
        BuildSignature::parse("11111111-2222-3333-4444-555555555555", 3).unwrap()
    }

    fn session(table: MemoryTable, base: u64) -> crate::backend::MemorySession
    {
        MemoryBackend::new()
            .with_artifact("t.pdb", table)
            .load_and_validate(Path::new("t.pdb"), &signature())
            .unwrap()
            .open_session(Address::new(base))
            .unwrap()
    }

    #[test]
    fn test_first_candidate_with_rva_wins()
    {
        let table = MemoryTable::new(signature())
            .with_declaration("Step")
            .with_function("Step", 0x2000)
            .with_function("Step", 0x1000);
        let mut session = session(table, 0x1000_0000);

        let address = first_match_address(&mut session, &SymbolQuery::new("Step")).unwrap();
        assert_eq!(address, Address::new(0x1000_2000));
    }

    #[test]
    fn test_only_declarations_is_absence()
    {
        let table = MemoryTable::new(signature()).with_declaration("Extern");
        let mut session = session(table, 0x1000_0000);

        let err = first_match_address(&mut session, &SymbolQuery::new("Extern")).unwrap_err();
        assert!(err.is_absence());
    }

    #[test]
    fn test_overflow_is_reported()
    {
        let table = MemoryTable::new(signature()).with_function("High", 0x10);
        let mut session = session(table, u64::MAX - 1);

        let err = first_match_address(&mut session, &SymbolQuery::new("High")).unwrap_err();
        assert!(matches!(err, SymbolError::AddressOverflow { .. }));
    }

    #[test]
    fn test_backend_unavailable_short_circuits()
    {
        let result = try_resolve(
            || -> SymbolResult<MemoryBackend> { Err(SymbolError::BackendUnavailable("not registered".into())) },
            "DoWork",
            Path::new("t.pdb"),
            Address::new(0x4000_0000),
            &signature(),
        );
        assert!(matches!(result, Err(SymbolError::BackendUnavailable(_))));
    }

    #[test]
    fn test_empty_name_is_rejected()
    {
        let backend = MemoryBackend::new().with_artifact("t.pdb", MemoryTable::new(signature()).with_function("", 0x10));
        let result = try_resolve(|| Ok(backend), "", Path::new("t.pdb"), Address::new(0x4000_0000), &signature());
        assert!(matches!(result, Err(SymbolError::InvalidArgument(_))));
    }
}
