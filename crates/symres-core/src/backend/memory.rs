//! In-memory backend.
//!
//! Artifacts are symbol tables registered under a path. Nothing touches the
//! filesystem, which makes this backend useful for harnesses that replay
//! known module layouts and for exercising the resolver without real PDBs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{DebugInfoBackend, LoadedArtifact, QuerySession};
use crate::error::{SymbolError, SymbolResult};
use crate::types::{Address, BuildSignature, Rva, SymbolQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolKind
{
    Function,
    Data,
}

#[derive(Debug, Clone)]
struct TableEntry
{
    name: String,
    kind: SymbolKind,
    rva: Option<Rva>,
}

/// Symbol table of one artifact, in emission order
///
/// ```rust
/// use symres_core::backend::MemoryTable;
/// use symres_core::types::BuildSignature;
///
/// let signature = BuildSignature::parse("11111111-2222-3333-4444-555555555555", 3)?;
/// let table = MemoryTable::new(signature)
///     .with_function("DoWork", 0x1000)
///     .with_declaration("ImportedHelper")
///     .with_data("g_Counter", 0x8000);
/// # Ok::<(), symres_core::error::SymbolError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MemoryTable
{
    signature: BuildSignature,
    entries: Vec<TableEntry>,
    enumeration_failure: Option<String>,
}

impl MemoryTable
{
    /// Empty table carrying the given signature.
    #[must_use]
    pub fn new(signature: BuildSignature) -> Self
    {
        Self {
            signature,
            entries: Vec::new(),
            enumeration_failure: None,
        }
    }

    /// Append a function with code at `rva`.
    #[must_use]
    pub fn with_function(mut self, name: impl Into<String>, rva: u32) -> Self
    {
        self.entries.push(TableEntry {
            name: name.into(),
            kind: SymbolKind::Function,
            rva: Some(Rva(rva)),
        });
        self
    }

    /// Append a function symbol that has no code location.
    #[must_use]
    pub fn with_declaration(mut self, name: impl Into<String>) -> Self
    {
        self.entries.push(TableEntry {
            name: name.into(),
            kind: SymbolKind::Function,
            rva: None,
        });
        self
    }

    /// Append a data symbol. Data symbols are never function candidates.
    #[must_use]
    pub fn with_data(mut self, name: impl Into<String>, rva: u32) -> Self
    {
        self.entries.push(TableEntry {
            name: name.into(),
            kind: SymbolKind::Data,
            rva: Some(Rva(rva)),
        });
        self
    }

    /// Make every symbol search on this table fail with `reason`.
    #[must_use]
    pub fn with_enumeration_failure(mut self, reason: impl Into<String>) -> Self
    {
        self.enumeration_failure = Some(reason.into());
        self
    }
}

/// Backend serving [`MemoryTable`]s registered by path
///
/// Cloning is cheap; clones share the registered tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend
{
    artifacts: Arc<HashMap<PathBuf, MemoryTable>>,
}

impl MemoryBackend
{
    /// Backend with no artifacts.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Register `table` as the artifact stored at `path`.
    #[must_use]
    pub fn with_artifact(mut self, path: impl Into<PathBuf>, table: MemoryTable) -> Self
    {
        Arc::make_mut(&mut self.artifacts).insert(path.into(), table);
        self
    }
}

impl DebugInfoBackend for MemoryBackend
{
    type Artifact = MemoryArtifact;

    fn name(&self) -> &'static str
    {
        "memory"
    }

    fn load_and_validate(&self, path: &Path, signature: &BuildSignature) -> SymbolResult<MemoryArtifact>
    {
        let table = self
            .artifacts
            .get(path)
            .ok_or_else(|| SymbolError::ArtifactNotFound(path.to_path_buf()))?;

        if table.signature != *signature {
            return Err(SymbolError::SignatureMismatch {
                path: path.to_path_buf(),
                expected: *signature,
                found: table.signature,
            });
        }

        Ok(MemoryArtifact { table: table.clone() })
    }
}

/// A validated in-memory table
#[derive(Debug)]
pub struct MemoryArtifact
{
    table: MemoryTable,
}

impl LoadedArtifact for MemoryArtifact
{
    type Session = MemorySession;

    fn open_session(self, load_address: Address) -> SymbolResult<MemorySession>
    {
        Ok(MemorySession {
            table: self.table,
            load_address,
        })
    }
}

/// An in-memory table bound to a load address
#[derive(Debug)]
pub struct MemorySession
{
    table: MemoryTable,
    load_address: Address,
}

/// The root scope of an in-memory table
#[derive(Debug, Clone, Copy)]
pub struct MemoryScope;

/// A function entry whose name matched a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFunction
{
    /// Symbol name
    pub name: String,
    /// Code location, if any
    pub rva: Option<Rva>,
}

impl QuerySession for MemorySession
{
    type Scope = MemoryScope;
    type Symbol = MemoryFunction;

    fn load_address(&self) -> Address
    {
        self.load_address
    }

    fn global_scope(&mut self) -> SymbolResult<MemoryScope>
    {
        Ok(MemoryScope)
    }

    fn find_functions(&mut self, _scope: &MemoryScope, query: &SymbolQuery) -> SymbolResult<Vec<MemoryFunction>>
    {
        if let Some(reason) = &self.table.enumeration_failure {
            return Err(SymbolError::SymbolEnumeration(reason.clone()));
        }

        Ok(self
            .table
            .entries
            .iter()
            .filter(|entry| entry.kind == SymbolKind::Function && query.matches(entry.name.as_bytes()))
            .map(|entry| MemoryFunction {
                name: entry.name.clone(),
                rva: entry.rva,
            })
            .collect())
    }

    fn relative_virtual_address(&self, symbol: &MemoryFunction) -> Option<Rva>
    {
        symbol.rva
    }
}
