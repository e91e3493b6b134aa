//! Symbol query type.

/// Name filter for candidate function symbols.
///
/// Matching is always exact and case-sensitive: no wildcards, no substring
/// matches, no demangling. `"Foo"` never matches `"foo"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolQuery
{
    name: String,
}

impl SymbolQuery
{
    /// Build a query for the given name.
    pub fn new(name: impl Into<String>) -> Self
    {
        Self { name: name.into() }
    }

    /// The name being searched for.
    #[must_use]
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Compare against a raw name as stored in debug information.
    ///
    /// Names are compared byte for byte, so artifacts with names that are not
    /// valid UTF-8 can still be matched by an exact query.
    #[must_use]
    pub fn matches(&self, candidate: &[u8]) -> bool
    {
        self.name.as_bytes() == candidate
    }
}
