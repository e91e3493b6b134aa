//! # Symbol Path Search
//!
//! Resolve a symbol when only a directory of symbol files is known.
//!
//! Test harnesses usually keep every `.pdb` / `.xdb` for a title under one
//! symbols directory without knowing which file belongs to which module. The
//! build signature already tells the artifacts apart, so every candidate file
//! is tried in turn and signature mismatches are simply skipped.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::backend::{create_backend, DebugInfoBackend};
use crate::error::{SymbolError, SymbolResult};
use crate::resolver::try_resolve;
use crate::types::{Address, BuildSignature};

/// File extensions recognised as debug-information artifacts.
pub const ARTIFACT_EXTENSIONS: &[&str] = &["pdb", "xdb"];

/// Resolve `symbol_name` against every artifact under `symbols_dir`.
///
/// Artifacts are tried in sorted path order and the first one that yields an
/// address wins. Returns `None` if the directory cannot be read or no
/// artifact resolves the symbol.
pub fn resolve_in_symbol_path(
    symbol_name: &str,
    symbols_dir: &Path,
    base_address: Address,
    signature: &BuildSignature,
) -> Option<Address>
{
    resolve_in_symbol_path_with(create_backend, symbol_name, symbols_dir, base_address, signature)
}

/// Like [`resolve_in_symbol_path`], with a caller-supplied backend factory.
///
/// `factory` is invoked once per artifact tried.
pub fn resolve_in_symbol_path_with<B, F>(
    factory: F,
    symbol_name: &str,
    symbols_dir: &Path,
    base_address: Address,
    signature: &BuildSignature,
) -> Option<Address>
where
    B: DebugInfoBackend,
    F: Fn() -> SymbolResult<B>,
{
    let artifacts = match find_artifacts(symbols_dir) {
        Ok(artifacts) => artifacts,
        Err(err) => {
            warn!(dir = %symbols_dir.display(), error = %err, "Cannot scan symbols directory");
            return None;
        }
    };
    debug!(dir = %symbols_dir.display(), count = artifacts.len(), "Scanning symbol artifacts");

    for path in &artifacts {
        match try_resolve(&factory, symbol_name, path, base_address, signature) {
            Ok(address) => {
                debug!(symbol = symbol_name, path = %path.display(), %address, "Resolved symbol");
                return Some(address);
            }
            Err(err) => trace!(path = %path.display(), error = %err, "Artifact skipped"),
        }
    }

    debug!(symbol = symbol_name, dir = %symbols_dir.display(), "No artifact resolved symbol");
    None
}

/// List every artifact under `dir`, recursively, in sorted order.
///
/// Extensions are compared case-insensitively. Symbolic links to directories
/// are not followed; unreadable subdirectories are skipped.
///
/// ## Errors
///
/// - `InvalidArgument`: `dir` is not a directory
/// - `Io`: `dir` itself cannot be read
pub fn find_artifacts(dir: &Path) -> SymbolResult<Vec<PathBuf>>
{
    if !dir.is_dir() {
        return Err(SymbolError::InvalidArgument(format!("{} is not a directory", dir.display())));
    }

    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = match fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(err) if current == dir => return Err(err.into()),
            Err(err) => {
                debug!(dir = %current.display(), error = %err, "Skipping unreadable directory");
                continue;
            }
        };

        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if is_artifact(&path) {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

fn is_artifact(path: &Path) -> bool
{
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ARTIFACT_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}
