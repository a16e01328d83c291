//! Canonical resolution of embedded interop types.
//!
//! A locally embedded interop copy is never handed to consumers. Every dereference routes
//! through this engine, which searches the embedding assembly's direct references - in
//! reference-list order - for the single canonical definition matching the copy's identity
//! marker, and produces one of a closed set of outcomes ([`CanonicalResolution`]). Failures
//! are data, not exceptions: a missing or ambiguous canonical definition becomes a typed
//! error symbol carrying everything a diagnostic needs.
//!
//! Matching rules per marker kind:
//!
//! - **GUID-identified** (interfaces, delegates): the candidate must carry an equal interop
//!   GUID *and* the same fully qualified name.
//! - **Scope+name-identified** (structs, enums): the candidate's assembly GUID must equal
//!   the marker scope and the candidate's qualified name must equal the marker identifier.
//!   This match is only attempted when the candidate's base type resolves - classifying a
//!   candidate as a struct or enum needs its base, so an absent corlib makes the candidate
//!   inconclusive and the result `Missing` even though a syntactically matching type
//!   exists.
//!
//! Results are memoized per embedding environment and never shared across reference-set
//! resolutions: a different reference list gets fresh result instances.

use dashmap::DashMap;
use uguid::Guid;

use crate::{
    metadata::{
        identity::AssemblyIdentity,
        marker::TypeIdentifier,
        provider::metadata_type_name,
    },
    resolve::AssemblySymbol,
    symbols::{ErrorType, NamedType, SpecialType, TypeDefRc, TypeKind, TypeSymbol},
};

/// Outcome of resolving one embedded interop type against an embedding environment.
#[derive(Debug, Clone)]
pub enum CanonicalResolution {
    /// Exactly one directly referenced assembly defines a matching canonical type.
    Resolved(NamedType),
    /// No referenced assembly defines a match; carries the marker identity for diagnostics.
    Missing {
        /// Identity of the embedding assembly.
        embedding: AssemblyIdentity,
        /// The marker GUID, for GUID-identified embedded types.
        guid: Option<Guid>,
        /// The marker scope, for name-identified embedded types.
        scope: Option<Guid>,
        /// The marker identifier, for name-identified embedded types.
        identifier: Option<String>,
        /// Display name of the embedded type.
        full_name: String,
    },
    /// Two or more referenced assemblies define a match; the first two in reference order
    /// are retained.
    Ambiguous {
        /// Identity of the embedding assembly.
        embedding: AssemblyIdentity,
        /// First matching candidate in reference order.
        first: NamedType,
        /// Second matching candidate in reference order.
        second: NamedType,
    },
    /// The embedded type participates in a closed generic instantiation.
    IllegalGenericInstantiation {
        /// Display of the unretargeted underlying instantiation.
        display: String,
    },
}

impl CanonicalResolution {
    /// Whether a canonical definition was found.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, CanonicalResolution::Resolved(_))
    }

    /// The canonical symbol, when resolved.
    #[must_use]
    pub fn resolved(&self) -> Option<&NamedType> {
        match self {
            CanonicalResolution::Resolved(named) => Some(named),
            _ => None,
        }
    }

    /// Materialize the outcome as a type symbol: the canonical definition, or the
    /// corresponding typed error placeholder.
    #[must_use]
    pub fn into_type(self) -> TypeSymbol {
        match self {
            CanonicalResolution::Resolved(named) => TypeSymbol::Named(named),
            CanonicalResolution::Missing {
                embedding,
                guid,
                scope,
                identifier,
                full_name,
            } => ErrorType::MissingCanonicalType {
                embedding,
                guid,
                scope,
                identifier,
                full_name,
            }
            .into_symbol(),
            CanonicalResolution::Ambiguous {
                embedding,
                first,
                second,
            } => ErrorType::AmbiguousCanonicalType {
                embedding,
                first,
                second,
            }
            .into_symbol(),
            CanonicalResolution::IllegalGenericInstantiation { display } => {
                ErrorType::IllegalGenericInstantiation { display }.into_symbol()
            }
        }
    }
}

/// Resolve an embedded local definition (plus a possibly empty nested chain below it) to a
/// type symbol against the embedding assembly's direct references.
pub(crate) fn resolve_embedded(
    local: &TypeDefRc,
    nested: &[(String, u16)],
    embedding: &AssemblyIdentity,
    env: &[AssemblySymbol],
    cache: &DashMap<String, CanonicalResolution>,
) -> TypeSymbol {
    let top = canonical_for(local, embedding, env, cache);
    if nested.is_empty() {
        return top.into_type();
    }

    // Nested levels resolve against the already-resolved canonical parent. When the parent
    // itself did not land on a genuine canonical definition, the nested type's identity
    // cannot even be determined.
    let CanonicalResolution::Resolved(parent) = top else {
        return ErrorType::UnsupportedMetadataType {
            display: nested_display(local, nested),
        }
        .into_symbol();
    };

    let mut current = parent;
    let mut current_local = local.clone();
    for (name, arity) in nested {
        let metadata_name = metadata_type_name(name, *arity);
        let Some(local_nested) = current_local.nested_any(&metadata_name) else {
            return ErrorType::UnsupportedMetadataType {
                display: nested_display(local, nested),
            }
            .into_symbol();
        };
        let candidate = current.lookup_nested(&metadata_name);
        match candidate {
            Some(found) if nested_candidate_matches(&found, &local_nested) => {
                current = found;
                current_local = local_nested;
            }
            _ => {
                let marker = local_nested.type_identifier();
                return ErrorType::MissingCanonicalType {
                    embedding: embedding.clone(),
                    guid: marker.and_then(TypeIdentifier::guid),
                    scope: marker.and_then(TypeIdentifier::scope),
                    identifier: marker
                        .and_then(TypeIdentifier::identifier)
                        .map(str::to_string),
                    full_name: local_nested.full_name(),
                }
                .into_symbol();
            }
        }
    }
    TypeSymbol::Named(current)
}

fn nested_display(local: &TypeDefRc, nested: &[(String, u16)]) -> String {
    let mut display = local.full_name();
    for (name, _) in nested {
        display.push('.');
        display.push_str(name);
    }
    display
}

fn nested_candidate_matches(candidate: &NamedType, local: &TypeDefRc) -> bool {
    match local.type_identifier() {
        Some(TypeIdentifier::Guid(guid)) => candidate.guid() == Some(*guid),
        Some(TypeIdentifier::ScopeName { scope, .. }) => {
            candidate.assembly_guid() == Some(*scope)
        }
        None => true,
    }
}

/// Memoized canonical resolution for one embedded local definition.
pub(crate) fn canonical_for(
    local: &TypeDefRc,
    embedding: &AssemblyIdentity,
    env: &[AssemblySymbol],
    cache: &DashMap<String, CanonicalResolution>,
) -> CanonicalResolution {
    let key = local.qualified_metadata_name();
    if let Some(hit) = cache.get(&key) {
        return hit.clone();
    }
    let computed = compute_canonical(local, embedding, env);
    cache.insert(key, computed.clone());
    computed
}

fn compute_canonical(
    local: &TypeDefRc,
    embedding: &AssemblyIdentity,
    env: &[AssemblySymbol],
) -> CanonicalResolution {
    let missing = |marker: Option<&TypeIdentifier>| CanonicalResolution::Missing {
        embedding: embedding.clone(),
        guid: marker.and_then(TypeIdentifier::guid),
        scope: marker.and_then(TypeIdentifier::scope),
        identifier: marker.and_then(TypeIdentifier::identifier).map(str::to_string),
        full_name: local.full_name(),
    };

    let Some(marker) = local.type_identifier() else {
        return missing(None);
    };

    let mut candidates: Vec<NamedType> = Vec::new();
    for symbol in env {
        let found = match marker {
            TypeIdentifier::Guid(guid) => symbol
                .lookup_top_level_type(&local.qualified_metadata_name())
                .filter(|candidate| candidate.guid() == Some(*guid)),
            TypeIdentifier::ScopeName { scope, identifier } => symbol
                .lookup_top_level_type(identifier)
                .filter(|_| symbol.assembly_guid() == Some(*scope))
                .filter(|candidate| struct_candidate_matches(candidate, local.kind())),
        };
        if let Some(candidate) = found {
            candidates.push(candidate);
            if candidates.len() == 2 {
                break;
            }
        }
    }

    match candidates.len() {
        0 => missing(Some(marker)),
        1 => CanonicalResolution::Resolved(candidates.remove(0)),
        _ => {
            let second = candidates.remove(1);
            CanonicalResolution::Ambiguous {
                embedding: embedding.clone(),
                first: candidates.remove(0),
                second,
            }
        }
    }
}

/// Scope+name candidates are conclusive only when the base type resolves: struct/enum
/// classification needs the base, so an unresolvable base downgrades the candidate to
/// inconclusive rather than matching.
fn struct_candidate_matches(candidate: &NamedType, local_kind: TypeKind) -> bool {
    let Some(base) = candidate.base() else {
        return false;
    };
    if base.is_error() {
        return false;
    }
    match local_kind {
        TypeKind::Struct => base.special() == Some(SpecialType::ValueType),
        TypeKind::Enum => base.special() == Some(SpecialType::Enum),
        _ => true,
    }
}
