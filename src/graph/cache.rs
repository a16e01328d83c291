//! Process-wide weak interning of symbol graphs.
//!
//! The cache guarantees the identity contract of the whole engine: realizing the same raw
//! assembly object against an object-identical, identically ordered reference list always
//! returns the *same* graph instance, even under concurrent construction, while any
//! difference in the reference list yields a distinct graph. Keys are the pointer
//! identities of the inputs; values are weak, so abandoned graphs are reclaimed by normal
//! `Arc` drops and the cache needs no eviction policy.
//!
//! A live graph owns strong references to its raw descriptor and its reference
//! environment, so a live cache entry can never alias a reclaimed-and-reallocated input: a
//! key's pointers stay pinned for as long as the entry's graph can still be upgraded.

use std::sync::{Arc, OnceLock, Weak};

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    graph::{builder, SymbolGraph, SymbolGraphRc},
    metadata::provider::RawAssembly,
    resolve::AssemblySymbol,
};

#[derive(PartialEq, Eq, Hash)]
struct GraphKey {
    source: usize,
    references: Vec<usize>,
    /// Session closure member objects, keyed in only for descriptors carrying embedded
    /// interop markers: their unification environment is part of their identity.
    closure: Vec<usize>,
}

impl GraphKey {
    fn new(source: &Arc<RawAssembly>, references: &[AssemblySymbol], closure: &[usize]) -> Self {
        let closure = if builder::has_local_types(source) {
            closure.to_vec()
        } else {
            Vec::new()
        };
        GraphKey {
            source: Arc::as_ptr(source) as usize,
            references: references.iter().map(AssemblySymbol::fingerprint).collect(),
            closure,
        }
    }
}

fn cache() -> &'static DashMap<GraphKey, Weak<SymbolGraph>> {
    static CACHE: OnceLock<DashMap<GraphKey, Weak<SymbolGraph>>> = OnceLock::new();
    CACHE.get_or_init(DashMap::new)
}

/// Return the graph for (source, references), building and registering it on first use.
///
/// Registration is atomic with respect to concurrent builders: when two callers race on
/// the same key, the loser discards its freshly built graph and adopts the winner's
/// instance.
pub(crate) fn get_or_build(
    source: &Arc<RawAssembly>,
    references: &[AssemblySymbol],
    closure: &[usize],
) -> SymbolGraphRc {
    let key = GraphKey::new(source, references, closure);

    if let Some(entry) = cache().get(&key) {
        if let Some(graph) = entry.value().upgrade() {
            return graph;
        }
    }

    let built = builder::build(source.clone(), references.to_vec());

    match cache().entry(GraphKey::new(source, references, closure)) {
        Entry::Occupied(mut occupied) => match occupied.get().upgrade() {
            Some(winner) => winner,
            None => {
                occupied.insert(Arc::downgrade(&built));
                built
            }
        },
        Entry::Vacant(vacant) => {
            vacant.insert(Arc::downgrade(&built));
            built
        }
    }
}
