//! Tests for build-signature validation

use std::path::Path;

use symres_core::backend::{DebugInfoBackend, MemoryBackend, MemoryTable};
use symres_core::error::SymbolError;
use symres_core::types::BuildSignature;
use uuid::Uuid;

fn signature() -> BuildSignature
{
    BuildSignature::parse("11111111-2222-3333-4444-555555555555", 3).unwrap()
}

fn backend() -> MemoryBackend
{
    MemoryBackend::new().with_artifact("game.pdb", MemoryTable::new(signature()).with_function("DoWork", 0x1000))
}

fn flip_id_bit(signature: &BuildSignature, bit: usize) -> BuildSignature
{
    let mut bytes = *signature.id().as_bytes();
    bytes[bit / 8] ^= 1 << (bit % 8);
    BuildSignature::new(Uuid::from_bytes(bytes), signature.age())
}

#[test]
fn test_exact_signature_loads()
{
    assert!(backend().load_and_validate(Path::new("game.pdb"), &signature()).is_ok());
}

#[test]
fn test_every_single_bit_id_flip_is_rejected()
{
    let backend = backend();
    for bit in 0..128 {
        let mutated = flip_id_bit(&signature(), bit);
        match backend.load_and_validate(Path::new("game.pdb"), &mutated) {
            Err(SymbolError::SignatureMismatch { expected, found, .. }) => {
                assert_eq!(expected, mutated);
                assert_eq!(found, signature());
            }
            Err(other) => panic!("bit {bit}: expected SignatureMismatch, got {other:?}"),
            Ok(_) => panic!("bit {bit}: mutated signature was accepted"),
        }
    }
}

#[test]
fn test_every_single_bit_age_flip_is_rejected()
{
    let backend = backend();
    for bit in 0..32 {
        let mutated = BuildSignature::new(signature().id(), signature().age() ^ (1 << bit));
        let result = backend.load_and_validate(Path::new("game.pdb"), &mutated);
        assert!(
            matches!(result, Err(SymbolError::SignatureMismatch { .. })),
            "age bit {bit} was not rejected"
        );
    }
}

#[test]
fn test_mismatch_message_names_both_signatures()
{
    let stale = BuildSignature::new(signature().id(), 2);
    let Err(err) = backend().load_and_validate(Path::new("game.pdb"), &stale) else {
        panic!("stale signature was accepted");
    };

    let message = err.to_string();
    assert!(message.contains("game.pdb"));
    assert!(message.contains("(age 2)"));
    assert!(message.contains("(age 3)"));
}
