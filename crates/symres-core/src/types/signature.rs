//! Build signatures tying debug information to one compiled binary.

use std::fmt;

use uuid::Uuid;

use crate::error::{SymbolError, SymbolResult};

/// Identity of one specific build of a binary
///
/// A PDB is only usable for a module when both the 128-bit identifier and the
/// age match what the module's debug directory records. The timestamp that
/// older tooling also stored next to these is deliberately not part of the
/// signature.
///
/// ## Example
///
/// ```rust
/// use symres_core::types::BuildSignature;
///
/// let sig = BuildSignature::parse("11111111-2222-3333-4444-555555555555", 3)?;
/// assert_eq!(sig.age(), 3);
/// assert_eq!(sig.debug_id(), "111111112222333344445555555555553");
/// # Ok::<(), symres_core::error::SymbolError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuildSignature
{
    id: Uuid,
    age: u32,
}

impl BuildSignature
{
    /// Construct from an identifier and an age.
    #[must_use]
    pub const fn new(id: Uuid, age: u32) -> Self
    {
        Self { id, age }
    }

    /// Parse the identifier from text (hyphenated, braced, or plain hex).
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: the identifier is not a GUID
    pub fn parse(id: &str, age: u32) -> SymbolResult<Self>
    {
        let id = Uuid::parse_str(id.trim())
            .map_err(|err| SymbolError::InvalidArgument(format!("invalid signature id {id:?}: {err}")))?;
        Ok(Self::new(id, age))
    }

    /// Parse the combined debug identifier used by symbol servers.
    ///
    /// The format is the 32 hex digits of the identifier without separators,
    /// immediately followed by the age in hex (`CE7FFB00C20B87500211456B3E905C471`
    /// is age 1).
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: wrong length or non-hex characters
    pub fn from_debug_id(debug_id: &str) -> SymbolResult<Self>
    {
        let debug_id = debug_id.trim();
        if debug_id.len() <= 32 || !debug_id.is_ascii() {
            return Err(SymbolError::InvalidArgument(format!(
                "debug identifier {debug_id:?} must be 32 hex digits followed by the age"
            )));
        }

        let (id, age) = debug_id.split_at(32);
        let age = u32::from_str_radix(age, 16)
            .map_err(|err| SymbolError::InvalidArgument(format!("invalid age in debug identifier {debug_id:?}: {err}")))?;
        Self::parse(id, age)
    }

    /// The 128-bit identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid
    {
        self.id
    }

    /// The revision counter, bumped every time the PDB is rewritten for the same build.
    #[must_use]
    pub const fn age(&self) -> u32
    {
        self.age
    }

    /// Render the combined debug identifier (uppercase hex, age appended).
    #[must_use]
    pub fn debug_id(&self) -> String
    {
        format!("{:X}{:X}", self.id.simple(), self.age)
    }
}

impl fmt::Display for BuildSignature
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{} (age {})", self.id, self.age)
    }
}
