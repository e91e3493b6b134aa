//! Build signatures read from PE images.
//!
//! A PE module records the identity of its PDB in a CodeView (`RSDS`) entry
//! of the debug directory. Reading it on the host gives the same signature a
//! device reports for the loaded module, so a harness can resolve symbols
//! from a local copy of the binary.

use std::fs;
use std::path::Path;

use object::Object;
use uuid::Uuid;

use crate::error::{SymbolError, SymbolResult};
use crate::types::BuildSignature;

/// Debug-directory information of a PE image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDebugInfo
{
    /// Signature the matching PDB must carry
    pub signature: BuildSignature,
    /// PDB path recorded by the linker
    pub pdb_path: String,
}

/// Read the CodeView record of the PE image at `path`.
///
/// ## Errors
///
/// - `Io`: the file cannot be read
/// - `InvalidArgument`: not a parsable object file, or no CodeView record
pub fn signature_from_image(path: &Path) -> SymbolResult<ImageDebugInfo>
{
    let data = fs::read(path)?;
    let file = object::File::parse(&*data)
        .map_err(|err| SymbolError::InvalidArgument(format!("failed to parse {}: {err}", path.display())))?;

    let codeview = file
        .pdb_info()
        .map_err(|err| SymbolError::InvalidArgument(format!("failed to read debug directory of {}: {err}", path.display())))?
        .ok_or_else(|| SymbolError::InvalidArgument(format!("{} has no CodeView debug record", path.display())))?;

    // GUIDs are stored with their first three fields little-endian.
    let id = Uuid::from_bytes_le(codeview.guid());
    Ok(ImageDebugInfo {
        signature: BuildSignature::new(id, codeview.age()),
        pdb_path: String::from_utf8_lossy(codeview.path()).into_owned(),
    })
}
