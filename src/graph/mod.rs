//! Per-assembly symbol graphs.
//!
//! A [`SymbolGraph`] is the realization of one [`RawAssembly`] descriptor against one
//! concrete, ordered reference set. It owns a namespace tree rooted at a global namespace,
//! an ordered index of visible top-level types, and a side table of locally embedded
//! interop copies which are deliberately *hidden* from every public enumeration and lookup:
//! consumers only ever observe the canonical definition an embedded copy unifies to (or a
//! typed error placeholder when unification fails).
//!
//! Graphs are immutable once built and are interned process-wide by the weak
//! [`cache`](self) keyed on the object identities of the descriptor and the reference
//! list - the same inputs always yield the same graph instance, and any difference in the
//! reference list yields a distinct one.

pub(crate) mod builder;
pub(crate) mod cache;

use std::sync::{Arc, OnceLock};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;
use uguid::Guid;

use crate::{
    metadata::{identity::AssemblyIdentity, provider::RawAssembly},
    resolve::{nopia::CanonicalResolution, refs::RefResolver, AssemblySymbol, WeakAssembly},
    symbols::{NamedType, TypeDefRc},
};

/// Reference to a symbol graph.
pub type SymbolGraphRc = Arc<SymbolGraph>;

/// The immutable symbol tree of one assembly, realized against one reference set.
pub struct SymbolGraph {
    pub(crate) source: Arc<RawAssembly>,
    pub(crate) references: Vec<AssemblySymbol>,
    pub(crate) global_namespace: Arc<NamespaceSymbol>,
    /// Visible top-level types by metadata name, ordered.
    pub(crate) visible: SkipMap<String, TypeDefRc>,
    /// Locally embedded interop copies by metadata name; never exposed through lookups.
    pub(crate) hidden: DashMap<String, TypeDefRc>,
    /// Memoized canonical resolutions for this graph's reference environment.
    pub(crate) canonicals: DashMap<String, CanonicalResolution>,
    pub(crate) defines_system_object: bool,
    /// Whether any definition (at any nesting depth) carries an embedded interop marker.
    pub(crate) has_local_types: bool,
    /// The session closure embedded copies unify against. Held weakly: the owning
    /// resolution keeps the members alive, never the graph itself.
    pub(crate) embedding_env: OnceLock<Vec<WeakAssembly>>,
}

impl SymbolGraph {
    /// Identity of the realized assembly.
    #[must_use]
    pub fn identity(&self) -> &AssemblyIdentity {
        &self.source.identity
    }

    /// The assembly-level GUID attribute, when present.
    #[must_use]
    pub fn assembly_guid(&self) -> Option<Guid> {
        self.source.guid
    }

    /// The ordered reference environment this graph was realized against.
    #[must_use]
    pub fn references(&self) -> &[AssemblySymbol] {
        &self.references
    }

    /// The raw descriptor this graph was realized from.
    #[must_use]
    pub fn source(&self) -> &Arc<RawAssembly> {
        &self.source
    }

    /// The global namespace root.
    #[must_use]
    pub fn global_namespace(&self) -> &Arc<NamespaceSymbol> {
        &self.global_namespace
    }

    /// Whether this assembly defines `System.Object` (the corlib test).
    #[must_use]
    pub fn defines_system_object(&self) -> bool {
        self.defines_system_object
    }

    /// Whether any definition carries an embedded interop marker.
    #[must_use]
    pub fn has_local_types(&self) -> bool {
        self.has_local_types
    }

    /// The environment embedded copies unify against: the owning session's closure when
    /// one was wired, this graph's declared references otherwise.
    pub(crate) fn embedding_environment(&self) -> Vec<AssemblySymbol> {
        match self.embedding_env.get() {
            Some(closure) => closure.iter().filter_map(WeakAssembly::upgrade).collect(),
            None => self.references.clone(),
        }
    }

    /// Record the owning session's closure. First wiring wins; identical sessions wire
    /// identical instances, so later attempts are no-ops.
    pub(crate) fn wire_embedding_env(&self, closure: Vec<WeakAssembly>) {
        let _ = self.embedding_env.set(closure);
    }

    /// Look up a visible top-level type by metadata name.
    ///
    /// Locally embedded interop copies are hidden by design and return `None` here even
    /// though the definition exists in metadata.
    #[must_use]
    pub fn lookup_top_level_type(&self, metadata_name: &str) -> Option<NamedType> {
        self.visible_top_level(metadata_name).map(NamedType::Definition)
    }

    /// All visible top-level types, ordered by metadata name.
    #[must_use]
    pub fn top_level_types(&self) -> Vec<NamedType> {
        self.visible
            .iter()
            .map(|entry| NamedType::Definition(entry.value().clone()))
            .collect()
    }

    /// The locally embedded interop copies, for diagnostics.
    ///
    /// These definitions stay hidden from type lookup and namespace enumeration; this
    /// accessor exists so that embedding-time diagnostics (such as generic types in
    /// interop-sensitive signature positions) can be surfaced without un-hiding them.
    #[must_use]
    pub fn embedded_local_types(&self) -> Vec<NamedType> {
        self.hidden
            .iter()
            .map(|entry| NamedType::Definition(entry.value().clone()))
            .collect()
    }

    pub(crate) fn visible_top_level(&self, metadata_name: &str) -> Option<TypeDefRc> {
        self.visible.get(metadata_name).map(|entry| entry.value().clone())
    }

    pub(crate) fn hidden_top_level(&self, metadata_name: &str) -> Option<TypeDefRc> {
        self.hidden.get(metadata_name).map(|entry| entry.value().clone())
    }

    pub(crate) fn canonicals(&self) -> &DashMap<String, CanonicalResolution> {
        &self.canonicals
    }

    pub(crate) fn resolver(&self) -> RefResolver<'_> {
        RefResolver::for_graph(self)
    }
}

/// A namespace node in a graph's symbol tree.
///
/// Holds child namespaces and the visible types declared directly in this namespace;
/// locally embedded interop copies are excluded at construction and never appear in member
/// enumerations.
pub struct NamespaceSymbol {
    name: String,
    full_name: String,
    namespaces: boxcar::Vec<Arc<NamespaceSymbol>>,
    types: boxcar::Vec<TypeDefRc>,
}

impl NamespaceSymbol {
    pub(crate) fn root() -> Self {
        NamespaceSymbol {
            name: String::new(),
            full_name: String::new(),
            namespaces: boxcar::Vec::new(),
            types: boxcar::Vec::new(),
        }
    }

    fn child(parent_full_name: &str, name: &str) -> Self {
        let full_name = if parent_full_name.is_empty() {
            name.to_string()
        } else {
            format!("{parent_full_name}.{name}")
        };
        NamespaceSymbol {
            name: name.to_string(),
            full_name,
            namespaces: boxcar::Vec::new(),
            types: boxcar::Vec::new(),
        }
    }

    /// Simple namespace name; empty for the global namespace.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted namespace path from the global namespace.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Child namespaces.
    #[must_use]
    pub fn namespaces(&self) -> Vec<Arc<NamespaceSymbol>> {
        self.namespaces.iter().map(|(_, ns)| ns.clone()).collect()
    }

    /// Visible types declared directly in this namespace.
    #[must_use]
    pub fn types(&self) -> Vec<NamedType> {
        self.types
            .iter()
            .map(|(_, ty)| NamedType::Definition(ty.clone()))
            .collect()
    }

    /// Find a direct child namespace by name.
    #[must_use]
    pub fn get_namespace(&self, name: &str) -> Option<Arc<NamespaceSymbol>> {
        self.namespaces
            .iter()
            .find(|(_, ns)| ns.name() == name)
            .map(|(_, ns)| ns.clone())
    }

    /// Visible types in this namespace matching the given simple name.
    #[must_use]
    pub fn get_type_members(&self, name: &str) -> Vec<NamedType> {
        self.types
            .iter()
            .filter(|(_, ty)| ty.name() == name)
            .map(|(_, ty)| NamedType::Definition(ty.clone()))
            .collect()
    }

    pub(crate) fn ensure_namespace(self: &Arc<Self>, name: &str) -> Arc<NamespaceSymbol> {
        if let Some(existing) = self.get_namespace(name) {
            return existing;
        }
        let created = Arc::new(NamespaceSymbol::child(&self.full_name, name));
        self.namespaces.push(created.clone());
        created
    }

    pub(crate) fn add_type(&self, ty: TypeDefRc) {
        self.types.push(ty);
    }
}
