//! Embedded interop type identity markers.
//!
//! When a compiler embeds a COM interop type into a consuming assembly instead of referencing
//! the Primary Interop Assembly at runtime, the embedded copy carries a marker recording how to
//! match it back to its canonical source. Interfaces and delegates are identified by the type's
//! own interop GUID; structs and enums, which have no GUID of their own, are identified by the
//! (assembly GUID, qualified name) pair of the original definition.
//!
//! [`TypeIdentifier`] models both forms. The canonical resolution engine
//! (see [`crate::resolve`]) uses the marker to search an embedding assembly's direct references
//! for the single authoritative definition.

use uguid::Guid;

/// Identity marker attached to a locally embedded interop type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeIdentifier {
    /// The embedded type is an interface or delegate, matched by its interop GUID.
    Guid(Guid),
    /// The embedded type is a struct or enum, matched by the GUID of the assembly that
    /// originally declared it plus the fully qualified name it was declared under.
    ScopeName {
        /// GUID of the original declaring assembly.
        scope: Guid,
        /// Fully qualified metadata name of the original declaration.
        identifier: String,
    },
}

impl TypeIdentifier {
    /// The interop GUID, when this marker identifies an interface or delegate.
    #[must_use]
    pub fn guid(&self) -> Option<Guid> {
        match self {
            TypeIdentifier::Guid(guid) => Some(*guid),
            TypeIdentifier::ScopeName { .. } => None,
        }
    }

    /// The declaring assembly GUID, when this marker identifies a struct or enum.
    #[must_use]
    pub fn scope(&self) -> Option<Guid> {
        match self {
            TypeIdentifier::Guid(_) => None,
            TypeIdentifier::ScopeName { scope, .. } => Some(*scope),
        }
    }

    /// The original qualified name, when this marker identifies a struct or enum.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match self {
            TypeIdentifier::Guid(_) => None,
            TypeIdentifier::ScopeName { identifier, .. } => Some(identifier),
        }
    }

    /// Whether matching goes through the (scope, name) pair rather than a GUID.
    #[must_use]
    pub fn is_name_identified(&self) -> bool {
        matches!(self, TypeIdentifier::ScopeName { .. })
    }
}
