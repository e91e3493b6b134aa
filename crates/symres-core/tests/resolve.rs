//! Tests for end-to-end symbol resolution

use std::path::Path;
use std::thread;

use symres_core::backend::{MemoryBackend, MemoryTable};
use symres_core::error::{SymbolError, SymbolResult};
use symres_core::resolve_symbol_address_with;
use symres_core::types::{Address, BuildSignature};

const PDB_PATH: &str = "symbols/game.pdb";

fn signature() -> BuildSignature
{
    BuildSignature::parse("11111111-2222-3333-4444-555555555555", 3).unwrap()
}

fn backend() -> MemoryBackend
{
    let table = MemoryTable::new(signature())
        .with_function("Init", 0x0400)
        .with_function("DoWork", 0x1000)
        .with_function("foo", 0x2000)
        .with_declaration("ImportedOnly")
        .with_data("g_State", 0x9000);
    MemoryBackend::new().with_artifact(PDB_PATH, table)
}

fn resolve(backend: &MemoryBackend, name: &str, base: u64, signature: &BuildSignature) -> Option<Address>
{
    resolve_symbol_address_with(
        || Ok(backend.clone()),
        name,
        Path::new(PDB_PATH),
        Address::new(base),
        signature,
    )
}

#[test]
fn test_resolves_base_plus_rva()
{
    let address = resolve(&backend(), "DoWork", 0x4000_0000, &signature());
    assert_eq!(address, Some(Address::new(0x4000_1000)));
}

#[test]
fn test_missing_symbol_is_none()
{
    assert_eq!(resolve(&backend(), "DoesNotExist", 0x4000_0000, &signature()), None);
}

#[test]
fn test_stale_age_is_rejected_before_search()
{
    let stale = BuildSignature::new(signature().id(), 2);
    assert_eq!(resolve(&backend(), "DoWork", 0x4000_0000, &stale), None);
}

#[test]
fn test_declaration_without_code_is_none()
{
    assert_eq!(resolve(&backend(), "ImportedOnly", 0x4000_0000, &signature()), None);
}

#[test]
fn test_data_symbols_are_not_functions()
{
    assert_eq!(resolve(&backend(), "g_State", 0x4000_0000, &signature()), None);
}

#[test]
fn test_declaration_does_not_borrow_another_symbols_address()
{
    // The declaration comes first; the only other entries are differently named.
    let table = MemoryTable::new(signature())
        .with_declaration("Render")
        .with_function("RenderFrame", 0x3000)
        .with_function("render", 0x3100);
    let backend = MemoryBackend::new().with_artifact(PDB_PATH, table);

    assert_eq!(resolve(&backend, "Render", 0x4000_0000, &signature()), None);
}

#[test]
fn test_name_match_is_case_sensitive()
{
    let backend = backend();
    assert_eq!(resolve(&backend, "Foo", 0x4000_0000, &signature()), None);
    assert_eq!(resolve(&backend, "foo", 0x4000_0000, &signature()), Some(Address::new(0x4000_2000)));
    assert_eq!(resolve(&backend, "dowork", 0x4000_0000, &signature()), None);
    assert_eq!(resolve(&backend, "DoWor", 0x4000_0000, &signature()), None);
}

#[test]
fn test_zero_base_is_still_a_result()
{
    let table = MemoryTable::new(signature()).with_function("Entry", 0);
    let backend = MemoryBackend::new().with_artifact(PDB_PATH, table);

    assert_eq!(resolve(&backend, "Entry", 0, &signature()), Some(Address::ZERO));
}

#[test]
fn test_each_call_uses_its_own_base()
{
    let backend = backend();
    assert_eq!(resolve(&backend, "DoWork", 0x4000_0000, &signature()), Some(Address::new(0x4000_1000)));
    assert_eq!(resolve(&backend, "DoWork", 0x8200_0000, &signature()), Some(Address::new(0x8200_1000)));
    assert_eq!(resolve(&backend, "DoWork", 0x4000_0000, &signature()), Some(Address::new(0x4000_1000)));
}

#[test]
fn test_repeated_calls_are_deterministic()
{
    let table = MemoryTable::new(signature())
        .with_function("Dup", 0x5000)
        .with_function("Dup", 0x6000);
    let backend = MemoryBackend::new().with_artifact(PDB_PATH, table);

    let first = resolve(&backend, "Dup", 0x4000_0000, &signature());
    assert_eq!(first, Some(Address::new(0x4000_5000)));
    for _ in 0..16 {
        assert_eq!(resolve(&backend, "Dup", 0x4000_0000, &signature()), first);
    }
}

#[test]
fn test_concurrent_calls_agree()
{
    let backend = &backend();
    let results: Vec<Option<Address>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(move || resolve(backend, "DoWork", 0x4000_0000, &signature())))
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert!(results.iter().all(|result| *result == Some(Address::new(0x4000_1000))));
}

#[test]
fn test_missing_artifact_is_none()
{
    let result = resolve_symbol_address_with(
        || Ok(backend()),
        "DoWork",
        Path::new("symbols/other.pdb"),
        Address::new(0x4000_0000),
        &signature(),
    );
    assert_eq!(result, None);
}

#[test]
fn test_backend_unavailable_is_none()
{
    let result = resolve_symbol_address_with(
        || -> SymbolResult<MemoryBackend> { Err(SymbolError::BackendUnavailable("no provider".to_string())) },
        "DoWork",
        Path::new(PDB_PATH),
        Address::new(0x4000_0000),
        &signature(),
    );
    assert_eq!(result, None);
}

#[test]
fn test_enumeration_failure_is_none()
{
    let table = MemoryTable::new(signature())
        .with_function("DoWork", 0x1000)
        .with_enumeration_failure("corrupt symbol stream");
    let backend = MemoryBackend::new().with_artifact(PDB_PATH, table);

    assert_eq!(resolve(&backend, "DoWork", 0x4000_0000, &signature()), None);
}

#[test]
fn test_overflowing_address_is_none()
{
    assert_eq!(resolve(&backend(), "DoWork", u64::MAX - 0x10, &signature()), None);
}
