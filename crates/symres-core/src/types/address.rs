//! Absolute and module-relative address types.

use std::fmt;
use std::str::FromStr;

use crate::error::SymbolError;

/// Strongly typed absolute memory address in the target process
///
/// This wrapper around `u64` keeps absolute addresses apart from
/// module-relative offsets ([`Rva`]) and from other `u64` values.
///
/// Resolution results are `Option<Address>`: `None` means "no result", so
/// `Some(Address::ZERO)` stays a valid (if unusual) answer.
///
/// ## Example
///
/// ```rust
/// use symres_core::types::{Address, Rva};
///
/// let base = Address::from(0x4000_0000);
/// assert_eq!(base.offset_by(Rva(0x1000)), Some(Address::from(0x4000_1000)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    ///
    /// This is equivalent to `Address::from(value)` but can be used in const contexts.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use symres_core::types::Address;
    ///
    /// const XEX_BASE: Address = Address::new(0x8200_0000);
    /// ```
    #[must_use]
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// Returns `Some(new_address)` if the addition doesn't overflow, or `None` if it does.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use symres_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_add(0x100), Some(Address::from(0x1100)));
    /// assert_eq!(addr.checked_add(u64::MAX), None); // Overflow
    /// ```
    #[must_use]
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Relocate a module-relative address against this load address.
    ///
    /// Returns `None` if `self + rva` overflows.
    #[must_use]
    pub fn offset_by(self, rva: Rva) -> Option<Self>
    {
        self.checked_add(u64::from(rva.0))
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

impl FromStr for Address
{
    type Err = SymbolError;

    /// Parse `0x`-prefixed hexadecimal or plain decimal.
    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let trimmed = s.trim();
        let parsed = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
            u64::from_str_radix(&hex.replace('_', ""), 16)
        } else {
            trimmed.replace('_', "").parse::<u64>()
        };

        parsed
            .map(Address)
            .map_err(|err| SymbolError::InvalidArgument(format!("invalid address {s:?}: {err}")))
    }
}

/// Relative virtual address: offset of a symbol from the start of its module
///
/// This is what the debug information records. It is independent of where the
/// module is actually loaded; see [`Address::offset_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rva(pub u32);

impl fmt::Display for Rva
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:08x}", self.0)
    }
}
