//! PDB backend built on the `pdb` crate.
//!
//! Function symbols are the procedure records (`S_GPROC32`, `S_LPROC32` and
//! their ID variants) in each module's symbol stream. Public symbols and
//! other record kinds are not functions for the purposes of a lookup.
//! Candidates come back in DBI module order, then in record order inside
//! each module stream.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use pdb::{AddressMap, DebugInformation, FallibleIterator, PdbInternalSectionOffset, SymbolData, PDB};
use tracing::{debug, trace};

use super::{DebugInfoBackend, LoadedArtifact, QuerySession};
use crate::error::{SymbolError, SymbolResult};
use crate::types::{Address, BuildSignature, Rva, SymbolQuery};

impl From<pdb::Rva> for Rva
{
    fn from(rva: pdb::Rva) -> Self
    {
        Rva(rva.0)
    }
}

/// Loads `.pdb` and `.xdb` files from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct PdbBackend;

impl PdbBackend
{
    /// Create a new PDB backend.
    #[must_use]
    pub fn new() -> Self
    {
        Self
    }
}

impl DebugInfoBackend for PdbBackend
{
    type Artifact = PdbArtifact;

    fn name(&self) -> &'static str
    {
        "pdb"
    }

    fn load_and_validate(&self, path: &Path, signature: &BuildSignature) -> SymbolResult<PdbArtifact>
    {
        let file = File::open(path).map_err(|err| open_error(path, err))?;
        let mut pdb = PDB::open(file).map_err(|err| unreadable(path, &err))?;

        let found = read_signature(&mut pdb).map_err(|err| unreadable(path, &err))?;
        if found != *signature {
            return Err(SymbolError::SignatureMismatch {
                path: path.to_path_buf(),
                expected: *signature,
                found,
            });
        }

        debug!(path = %path.display(), signature = %found, "Loaded PDB");
        Ok(PdbArtifact {
            path: path.to_path_buf(),
            pdb,
        })
    }
}

/// Identifier from the PDB information stream, age from the DBI stream.
///
/// The DBI age is the one the image's debug directory records. The info
/// stream age is used only when there is no DBI stream or its age is unset.
/// A DBI stream that exists but does not parse is an error. The info
/// stream's timestamp is ignored.
fn read_signature(pdb: &mut PDB<'static, File>) -> pdb::Result<BuildSignature>
{
    let info = pdb.pdb_information()?;
    let dbi_age = match pdb.debug_information() {
        Ok(dbi) => dbi.age(),
        Err(pdb::Error::StreamNotFound(_)) => None,
        Err(err) => return Err(err),
    };
    Ok(BuildSignature::new(info.guid, dbi_age.unwrap_or(info.age)))
}

fn open_error(path: &Path, err: io::Error) -> SymbolError
{
    if err.kind() == io::ErrorKind::NotFound {
        SymbolError::ArtifactNotFound(path.to_path_buf())
    } else {
        SymbolError::ArtifactUnreadable {
            path: path.to_path_buf(),
            details: err.to_string(),
        }
    }
}

fn unreadable(path: &Path, err: &pdb::Error) -> SymbolError
{
    SymbolError::ArtifactUnreadable {
        path: path.to_path_buf(),
        details: err.to_string(),
    }
}

/// A PDB whose signature has been checked
pub struct PdbArtifact
{
    path: PathBuf,
    pdb: PDB<'static, File>,
}

impl LoadedArtifact for PdbArtifact
{
    type Session = PdbSession;

    fn open_session(mut self, load_address: Address) -> SymbolResult<PdbSession>
    {
        let address_map = self
            .pdb
            .address_map()
            .map_err(|err| SymbolError::SessionFailure(format!("{}: {err}", self.path.display())))?;

        Ok(PdbSession {
            path: self.path,
            pdb: self.pdb,
            address_map,
            load_address,
        })
    }
}

/// A PDB bound to a load address
pub struct PdbSession
{
    path: PathBuf,
    pdb: PDB<'static, File>,
    address_map: AddressMap<'static>,
    load_address: Address,
}

/// The global scope of a PDB: its module list
pub struct PdbScope
{
    dbi: DebugInformation<'static>,
}

/// A procedure record whose name matched a query
#[derive(Debug, Clone)]
pub struct PdbFunction
{
    module: String,
    offset: PdbInternalSectionOffset,
    code_size: u32,
}

impl PdbFunction
{
    /// Name of the module (compiland) the procedure was found in.
    #[must_use]
    pub fn module(&self) -> &str
    {
        &self.module
    }

    /// Size of the procedure's code in bytes.
    #[must_use]
    pub fn code_size(&self) -> u32
    {
        self.code_size
    }
}

impl QuerySession for PdbSession
{
    type Scope = PdbScope;
    type Symbol = PdbFunction;

    fn load_address(&self) -> Address
    {
        self.load_address
    }

    fn global_scope(&mut self) -> SymbolResult<PdbScope>
    {
        let dbi = self
            .pdb
            .debug_information()
            .map_err(|err| SymbolError::SessionFailure(format!("{}: {err}", self.path.display())))?;
        Ok(PdbScope { dbi })
    }

    fn find_functions(&mut self, scope: &PdbScope, query: &SymbolQuery) -> SymbolResult<Vec<PdbFunction>>
    {
        let path = self.path.display().to_string();
        let enumeration = |err: pdb::Error| SymbolError::SymbolEnumeration(format!("{path}: {err}"));

        let mut found = Vec::new();
        let mut modules = scope.dbi.modules().map_err(enumeration)?;
        while let Some(module) = modules.next().map_err(enumeration)? {
            let Some(info) = self.pdb.module_info(&module).map_err(enumeration)? else {
                continue;
            };

            let mut symbols = info.symbols().map_err(enumeration)?;
            while let Some(symbol) = symbols.next().map_err(enumeration)? {
                match symbol.parse() {
                    Ok(SymbolData::Procedure(procedure)) if query.matches(procedure.name.as_bytes()) => {
                        let function = PdbFunction {
                            module: module.module_name().into_owned(),
                            offset: procedure.offset,
                            code_size: procedure.len,
                        };
                        trace!(
                            module = function.module(),
                            offset = ?function.offset,
                            size = function.code_size(),
                            "Function candidate"
                        );
                        found.push(function);
                    }
                    Ok(_) | Err(pdb::Error::UnimplementedSymbolKind(_)) => {}
                    Err(err) => return Err(enumeration(err)),
                }
            }
        }

        Ok(found)
    }

    fn relative_virtual_address(&self, symbol: &PdbFunction) -> Option<Rva>
    {
        symbol.offset.to_rva(&self.address_map).map(Rva::from)
    }
}
