//! Resolution sessions: from ordered references to bound assembly symbols.
//!
//! A session takes an ordered list of references - raw metadata descriptors and in-process
//! [`Compilation`]s - and binds each to an [`AssemblySymbol`]:
//!
//! - metadata references are realized into cached [`crate::graph::SymbolGraph`]s, each
//!   against the environment formed by binding its *declared* assembly references inside
//!   the session;
//! - a referenced compilation is reused as-is exactly when the session binds every one of
//!   the compilation's own direct references to the same graph instances the compilation
//!   itself bound (and, for compilations carrying embedded interop copies, observes the
//!   same overall closure); any difference wraps the compilation's graph in a
//!   [`RetargetingAssembly`] view against the session's environment.
//!
//! Two environments are in play and deliberately distinct. Ordinary type references bind
//! against an assembly's *declared* references, which is what lets an assembly without
//! embedded interop copies share one graph across every session that binds its references
//! identically. Embedded interop copies instead unify against the *session closure* - all
//! assemblies the session binds - because the canonical definition typically lives in an
//! assembly the embedding assembly no longer references. Graphs carrying embedded copies
//! are therefore keyed per closure and hold it weakly; the [`Resolution`] owns the strong
//! references, tying canonical-resolution lifetime to the owning session.
//!
//! Graphs for independent references are built in parallel; the process-wide cache makes
//! concurrent sessions converge on shared instances. The output list matches the input
//! order one-to-one, with transitively pulled-in assemblies appended after, in
//! first-encountered order.

pub(crate) mod nopia;
pub(crate) mod refs;

pub use nopia::CanonicalResolution;

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, OnceLock, Weak},
};

use dashmap::DashMap;
use rayon::prelude::*;
use uguid::Guid;

use crate::{
    graph::{cache, NamespaceSymbol, SymbolGraphRc},
    metadata::{identity::AssemblyIdentity, provider::RawAssembly},
    retarget::RetargetingAssembly,
    symbols::{NamedType, TypeDefRc},
    Error, Result,
};

/// One input to a resolution session.
#[derive(Clone)]
pub enum Reference {
    /// A raw metadata descriptor supplied by the metadata provider.
    Metadata(Arc<RawAssembly>),
    /// An in-process source compilation.
    Compilation(Arc<Compilation>),
}

impl Reference {
    /// Wrap a raw metadata descriptor.
    #[must_use]
    pub fn metadata(assembly: Arc<RawAssembly>) -> Self {
        Reference::Metadata(assembly)
    }

    /// Wrap an in-process compilation.
    #[must_use]
    pub fn compilation(compilation: Arc<Compilation>) -> Self {
        Reference::Compilation(compilation)
    }

    /// Identity of the referenced assembly.
    #[must_use]
    pub fn identity(&self) -> &AssemblyIdentity {
        match self {
            Reference::Metadata(raw) => &raw.identity,
            Reference::Compilation(compilation) => compilation.identity(),
        }
    }

    fn key(&self) -> usize {
        match self {
            Reference::Metadata(raw) => Arc::as_ptr(raw) as usize,
            Reference::Compilation(compilation) => Arc::as_ptr(compilation) as usize,
        }
    }

    fn needed_identities(&self) -> Vec<AssemblyIdentity> {
        match self {
            Reference::Metadata(raw) => raw.references.clone(),
            Reference::Compilation(compilation) => compilation
                .references()
                .iter()
                .map(|reference| reference.identity().clone())
                .collect(),
        }
    }
}

/// An in-process source compilation: a raw descriptor plus the reference list it was
/// compiled against.
///
/// The compilation's own graph is built once, lazily, against its own references. Sessions
/// that bind the same reference objects reuse that graph; sessions that substitute any
/// reference observe the compilation through a retargeting view instead.
pub struct Compilation {
    assembly: Arc<RawAssembly>,
    references: Vec<Reference>,
    graph: OnceLock<SymbolGraphRc>,
    /// Strong owner of the graph's reference environment; the graph itself only holds its
    /// embedding closure weakly.
    environment: OnceLock<Vec<AssemblySymbol>>,
}

impl Compilation {
    /// Create a compilation over a raw descriptor and its ordered reference list.
    #[must_use]
    pub fn new(assembly: Arc<RawAssembly>, references: Vec<Reference>) -> Arc<Self> {
        Arc::new(Compilation {
            assembly,
            references,
            graph: OnceLock::new(),
            environment: OnceLock::new(),
        })
    }

    /// Identity of the compiled assembly.
    #[must_use]
    pub fn identity(&self) -> &AssemblyIdentity {
        &self.assembly.identity
    }

    /// The compilation's own ordered reference list.
    #[must_use]
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// The bound environment (direct references plus transitively pulled-in assemblies),
    /// once the graph has been built. The compilation owns these strongly; the graph
    /// itself only holds its embedding closure weakly.
    #[must_use]
    pub fn environment(&self) -> &[AssemblySymbol] {
        self.environment.get().map(Vec::as_slice).unwrap_or_default()
    }

    /// The compilation's own symbol graph, built against its own references.
    #[must_use]
    pub fn graph(&self) -> SymbolGraphRc {
        self.graph
            .get_or_init(|| {
                let session = Session::run(&self.references, None);
                let environment: Vec<AssemblySymbol> = self
                    .references
                    .iter()
                    .filter_map(|reference| session.symbol_for(reference.key()))
                    .collect();
                let graph = cache::get_or_build(
                    &self.assembly,
                    &environment,
                    &session.closure_keys(),
                );
                if graph.has_local_types() {
                    graph.wire_embedding_env(session.weak_closure());
                }
                let _ = self.environment.set(session.into_symbols());
                graph
            })
            .clone()
    }

    pub(crate) fn closure_keys(&self) -> Vec<usize> {
        collect_work(&self.references)
            .iter()
            .map(Reference::key)
            .collect()
    }
}

/// A bound assembly: either a symbol graph, or a retargeting view of one.
#[derive(Clone)]
pub enum AssemblySymbol {
    /// A graph realized against its own reference environment.
    Graph(SymbolGraphRc),
    /// A graph observed through a different reference environment.
    Retargeting(Arc<RetargetingAssembly>),
}

impl AssemblySymbol {
    /// Identity of the bound assembly.
    #[must_use]
    pub fn identity(&self) -> &AssemblyIdentity {
        match self {
            AssemblySymbol::Graph(graph) => graph.identity(),
            AssemblySymbol::Retargeting(retargeting) => retargeting.identity(),
        }
    }

    /// The assembly-level GUID attribute, when present.
    #[must_use]
    pub fn assembly_guid(&self) -> Option<Guid> {
        self.underlying_graph().assembly_guid()
    }

    /// Whether this binding is a retargeting view.
    #[must_use]
    pub fn is_retargeting(&self) -> bool {
        matches!(self, AssemblySymbol::Retargeting(_))
    }

    /// The underlying graph (the graph itself, or the retargeting view's underlying one).
    #[must_use]
    pub fn underlying_graph(&self) -> &SymbolGraphRc {
        match self {
            AssemblySymbol::Graph(graph) => graph,
            AssemblySymbol::Retargeting(retargeting) => retargeting.underlying(),
        }
    }

    /// The global namespace of the underlying graph.
    #[must_use]
    pub fn global_namespace(&self) -> &Arc<NamespaceSymbol> {
        self.underlying_graph().global_namespace()
    }

    /// Look up a visible top-level type by namespace-qualified metadata name, wrapped for
    /// this binding. Locally embedded interop copies are hidden and return `None`.
    #[must_use]
    pub fn lookup_top_level_type(&self, metadata_name: &str) -> Option<NamedType> {
        match self {
            AssemblySymbol::Graph(graph) => graph.lookup_top_level_type(metadata_name),
            AssemblySymbol::Retargeting(retargeting) => {
                retargeting.lookup_top_level_type(metadata_name)
            }
        }
    }

    /// Canonical resolution of a locally embedded interop type by qualified metadata name,
    /// against this binding's embedding environment. `None` when no embedded type of that
    /// name exists.
    #[must_use]
    pub fn canonical_resolution(&self, metadata_name: &str) -> Option<CanonicalResolution> {
        let local = self.hidden_lookup(metadata_name)?;
        let env = self.embedding_env();
        Some(nopia::canonical_for(
            &local,
            self.identity(),
            &env,
            self.canonicals_map(),
        ))
    }

    /// The locally embedded interop copies of this assembly, for diagnostics. These stay
    /// hidden from lookup and namespace enumeration.
    #[must_use]
    pub fn embedded_local_types(&self) -> Vec<NamedType> {
        self.underlying_graph().embedded_local_types()
    }

    pub(crate) fn hidden_lookup(&self, metadata_name: &str) -> Option<TypeDefRc> {
        self.underlying_graph().hidden_top_level(metadata_name)
    }

    /// The environment embedded interop copies of this assembly unify against.
    pub(crate) fn embedding_env(&self) -> Vec<AssemblySymbol> {
        match self {
            AssemblySymbol::Graph(graph) => graph.embedding_environment(),
            AssemblySymbol::Retargeting(retargeting) => retargeting.environment(),
        }
    }

    pub(crate) fn canonicals_map(&self) -> &DashMap<String, CanonicalResolution> {
        match self {
            AssemblySymbol::Graph(graph) => graph.canonicals(),
            AssemblySymbol::Retargeting(retargeting) => retargeting.canonicals(),
        }
    }

    pub(crate) fn defines_system_object(&self) -> bool {
        self.underlying_graph().defines_system_object()
    }

    pub(crate) fn fingerprint(&self) -> usize {
        match self {
            AssemblySymbol::Graph(graph) => Arc::as_ptr(graph) as usize,
            AssemblySymbol::Retargeting(retargeting) => Arc::as_ptr(retargeting) as usize,
        }
    }

    pub(crate) fn downgrade(&self) -> WeakAssembly {
        match self {
            AssemblySymbol::Graph(graph) => WeakAssembly::Graph(Arc::downgrade(graph)),
            AssemblySymbol::Retargeting(retargeting) => {
                WeakAssembly::Retargeting(Arc::downgrade(retargeting))
            }
        }
    }
}

/// A weak counterpart of [`AssemblySymbol`], used for closure environments so that graphs
/// never hold their consumers alive.
#[derive(Clone)]
pub(crate) enum WeakAssembly {
    Graph(Weak<crate::graph::SymbolGraph>),
    Retargeting(Weak<RetargetingAssembly>),
}

impl WeakAssembly {
    pub(crate) fn upgrade(&self) -> Option<AssemblySymbol> {
        match self {
            WeakAssembly::Graph(weak) => weak.upgrade().map(AssemblySymbol::Graph),
            WeakAssembly::Retargeting(weak) => {
                weak.upgrade().map(AssemblySymbol::Retargeting)
            }
        }
    }
}

/// Builder for a resolution session.
#[derive(Default)]
pub struct Resolver {
    references: Vec<Reference>,
    corlib_hint: Option<AssemblyIdentity>,
}

impl Resolver {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Resolver::default()
    }

    /// Append a reference.
    #[must_use]
    pub fn reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }

    /// Append a raw metadata reference.
    #[must_use]
    pub fn metadata(self, assembly: Arc<RawAssembly>) -> Self {
        self.reference(Reference::Metadata(assembly))
    }

    /// Append an in-process compilation reference.
    #[must_use]
    pub fn compilation(self, compilation: Arc<Compilation>) -> Self {
        self.reference(Reference::Compilation(compilation))
    }

    /// Name the assembly to prefer as the core library when several candidates define
    /// `System.Object`.
    #[must_use]
    pub fn corlib_hint(mut self, identity: AssemblyIdentity) -> Self {
        self.corlib_hint = Some(identity);
        self
    }

    /// Run the session.
    ///
    /// # Errors
    /// Returns [`Error::Empty`] for an empty reference list and
    /// [`Error::DuplicateAssembly`] when two inputs carry the same identity.
    pub fn resolve(self) -> Result<Resolution> {
        if self.references.is_empty() {
            return Err(Error::Empty);
        }
        for (index, reference) in self.references.iter().enumerate() {
            if self.references[..index]
                .iter()
                .any(|earlier| earlier.identity() == reference.identity())
            {
                return Err(Error::DuplicateAssembly(
                    reference.identity().display_name(),
                ));
            }
        }

        let input_count = self.references.len();
        let session = Session::run(&self.references, self.corlib_hint.as_ref());

        let input_keys: HashSet<usize> =
            self.references.iter().map(Reference::key).collect();
        let mut assemblies: Vec<AssemblySymbol> = self
            .references
            .iter()
            .filter_map(|reference| session.symbol_for(reference.key()))
            .collect();
        for (reference, symbol) in session.bindings() {
            if !input_keys.contains(&reference.key()) {
                assemblies.push(symbol.clone());
            }
        }

        let corlib = match &self.corlib_hint {
            Some(hint) => assemblies
                .iter()
                .find(|symbol| symbol.identity().is_compatible_with(hint))
                .cloned(),
            None => assemblies
                .iter()
                .find(|symbol| symbol.defines_system_object())
                .cloned(),
        };

        Ok(Resolution {
            assemblies,
            corlib,
            input_count,
        })
    }
}

/// The outcome of a resolution session.
///
/// Owns the strong references to every bound assembly; embedded interop unification for
/// the session's graphs stays answerable for as long as this value is alive.
pub struct Resolution {
    assemblies: Vec<AssemblySymbol>,
    corlib: Option<AssemblySymbol>,
    input_count: usize,
}

impl Resolution {
    /// Bound assemblies: one per input, in input order, then transitively pulled-in
    /// assemblies in first-encountered order.
    #[must_use]
    pub fn assemblies(&self) -> &[AssemblySymbol] {
        &self.assemblies
    }

    /// The bindings for the explicit inputs only.
    #[must_use]
    pub fn input_assemblies(&self) -> &[AssemblySymbol] {
        &self.assemblies[..self.input_count]
    }

    /// Find a bound assembly by simple name.
    #[must_use]
    pub fn assembly(&self, name: &str) -> Option<&AssemblySymbol> {
        self.assemblies
            .iter()
            .find(|symbol| symbol.identity().name == name)
    }

    /// The assembly serving as the core library, when one was identified.
    #[must_use]
    pub fn corlib(&self) -> Option<&AssemblySymbol> {
        self.corlib.as_ref()
    }
}

/// The working set of a session: the inputs plus all transitively reachable compilation
/// references, in first-encountered order.
fn collect_work(inputs: &[Reference]) -> Vec<Reference> {
    let mut work: Vec<Reference> = Vec::new();
    let mut seen: HashSet<usize> = HashSet::new();
    for reference in inputs {
        if seen.insert(reference.key()) {
            work.push(reference.clone());
        }
    }
    let mut index = 0;
    while index < work.len() {
        if let Reference::Compilation(compilation) = &work[index] {
            let transitive: Vec<Reference> = compilation.references().to_vec();
            for reference in transitive {
                if seen.insert(reference.key()) {
                    work.push(reference);
                }
            }
        }
        index += 1;
    }
    work
}

/// A fully bound working set.
struct Session {
    work: Vec<Reference>,
    resolved: HashMap<usize, AssemblySymbol>,
}

impl Session {
    /// Bind a working set: dependency-ordered waves over declared references, independent
    /// members of a wave in parallel, cyclic declarations broken in input order. After
    /// binding, graphs carrying embedded interop copies get the session closure wired in
    /// as their (weak) unification environment.
    fn run(inputs: &[Reference], corlib_hint: Option<&AssemblyIdentity>) -> Session {
        let work = collect_work(inputs);
        let closure_keys: Vec<usize> = work.iter().map(Reference::key).collect();

        let mut resolved: HashMap<usize, AssemblySymbol> = HashMap::new();
        let mut pending: Vec<Reference> = work.clone();

        while !pending.is_empty() {
            let mut ready: Vec<Reference> = Vec::new();
            let mut blocked: Vec<Reference> = Vec::new();
            for reference in pending {
                let needs = reference.needed_identities();
                let waiting = needs
                    .iter()
                    .any(|need| blocked_on(&work, &resolved, reference.key(), need));
                if waiting {
                    blocked.push(reference);
                } else {
                    ready.push(reference);
                }
            }
            if ready.is_empty() {
                // Cyclic declarations; break the cycle in input order. Unresolvable
                // references surface later as typed missing-type symbols.
                ready.push(blocked.remove(0));
            }
            pending = blocked;

            let bound: Vec<(usize, AssemblySymbol)> = ready
                .par_iter()
                .map(|reference| {
                    let symbol = bind_reference(
                        reference,
                        &work,
                        &resolved,
                        &closure_keys,
                        corlib_hint,
                    );
                    (reference.key(), symbol)
                })
                .collect();
            resolved.extend(bound);
        }

        let session = Session { work, resolved };
        session.wire_closure();
        session
    }

    /// Hand every member that unifies embedded copies the session closure, weakly.
    fn wire_closure(&self) {
        for reference in &self.work {
            let Some(symbol) = self.resolved.get(&reference.key()) else {
                continue;
            };
            let closure: Vec<WeakAssembly> = self
                .work
                .iter()
                .filter(|member| member.key() != reference.key())
                .filter_map(|member| self.resolved.get(&member.key()))
                .map(AssemblySymbol::downgrade)
                .collect();
            match symbol {
                AssemblySymbol::Graph(graph) => {
                    if graph.has_local_types() {
                        graph.wire_embedding_env(closure);
                    }
                }
                AssemblySymbol::Retargeting(retargeting) => {
                    retargeting.wire_environment(closure);
                }
            }
        }
    }

    fn symbol_for(&self, key: usize) -> Option<AssemblySymbol> {
        self.resolved.get(&key).cloned()
    }

    fn bindings(&self) -> impl Iterator<Item = (&Reference, &AssemblySymbol)> + '_ {
        self.work
            .iter()
            .filter_map(|reference| Some((reference, self.resolved.get(&reference.key())?)))
    }

    fn closure_keys(&self) -> Vec<usize> {
        self.work.iter().map(Reference::key).collect()
    }

    fn weak_closure(&self) -> Vec<WeakAssembly> {
        self.work
            .iter()
            .filter_map(|reference| self.resolved.get(&reference.key()))
            .map(AssemblySymbol::downgrade)
            .collect()
    }

    fn into_symbols(self) -> Vec<AssemblySymbol> {
        let Session { work, resolved } = self;
        work.iter()
            .filter_map(|reference| resolved.get(&reference.key()).cloned())
            .collect()
    }
}

#[derive(PartialEq, Eq, Hash)]
struct RetargetKey {
    underlying: usize,
    closure: Vec<usize>,
    corlib_hint: Option<String>,
}

fn retarget_cache() -> &'static DashMap<RetargetKey, Weak<RetargetingAssembly>> {
    static CACHE: OnceLock<DashMap<RetargetKey, Weak<RetargetingAssembly>>> = OnceLock::new();
    CACHE.get_or_init(DashMap::new)
}

/// Weakly intern retargeting views per (underlying graph, session closure, corlib hint),
/// so that identical sessions observe reference-equal views - and, downstream, identical
/// graph cache keys.
fn get_or_create_retargeting(
    underlying: SymbolGraphRc,
    closure: Vec<usize>,
    corlib_hint: Option<AssemblyIdentity>,
) -> Arc<RetargetingAssembly> {
    let key = RetargetKey {
        underlying: Arc::as_ptr(&underlying) as usize,
        closure,
        corlib_hint: corlib_hint.as_ref().map(AssemblyIdentity::display_name),
    };

    if let Some(entry) = retarget_cache().get(&key) {
        if let Some(existing) = entry.value().upgrade() {
            return existing;
        }
    }

    let created = RetargetingAssembly::new(underlying, corlib_hint);
    match retarget_cache().entry(key) {
        dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
            match occupied.get().upgrade() {
                Some(winner) => winner,
                None => {
                    occupied.insert(Arc::downgrade(&created));
                    created
                }
            }
        }
        dashmap::mapref::entry::Entry::Vacant(vacant) => {
            vacant.insert(Arc::downgrade(&created));
            created
        }
    }
}

/// Whether `need` is provided by a work item that has not been bound yet (other than the
/// requesting item itself).
fn blocked_on(
    work: &[Reference],
    resolved: &HashMap<usize, AssemblySymbol>,
    requester: usize,
    need: &AssemblyIdentity,
) -> bool {
    work.iter().any(|candidate| {
        candidate.key() != requester
            && !resolved.contains_key(&candidate.key())
            && candidate.identity().is_compatible_with(need)
    })
}

/// First bound work item compatible with the requested identity, in work order.
fn lookup_identity(
    work: &[Reference],
    resolved: &HashMap<usize, AssemblySymbol>,
    requested: &AssemblyIdentity,
) -> Option<AssemblySymbol> {
    work.iter().find_map(|candidate| {
        let symbol = resolved.get(&candidate.key())?;
        if symbol.identity().is_compatible_with(requested) {
            Some(symbol.clone())
        } else {
            None
        }
    })
}

fn bind_reference(
    reference: &Reference,
    work: &[Reference],
    resolved: &HashMap<usize, AssemblySymbol>,
    closure_keys: &[usize],
    corlib_hint: Option<&AssemblyIdentity>,
) -> AssemblySymbol {
    match reference {
        Reference::Metadata(raw) => {
            let environment: Vec<AssemblySymbol> = raw
                .references
                .iter()
                .filter_map(|declared| lookup_identity(work, resolved, declared))
                .collect();
            let others: Vec<usize> = closure_keys
                .iter()
                .copied()
                .filter(|key| *key != reference.key())
                .collect();
            AssemblySymbol::Graph(cache::get_or_build(raw, &environment, &others))
        }
        Reference::Compilation(compilation) => bind_compilation(
            compilation,
            reference.key(),
            work,
            resolved,
            closure_keys,
            corlib_hint,
        ),
    }
}

/// Reuse a compilation's own graph when the session binds all of its references to the
/// same instances (and, for compilations carrying embedded copies, observes the same
/// closure); otherwise observe it through a retargeting view.
fn bind_compilation(
    compilation: &Arc<Compilation>,
    key: usize,
    work: &[Reference],
    resolved: &HashMap<usize, AssemblySymbol>,
    closure_keys: &[usize],
    corlib_hint: Option<&AssemblyIdentity>,
) -> AssemblySymbol {
    let own = compilation.graph();

    let mut changed = false;
    for own_binding in own.references() {
        match lookup_identity(work, resolved, own_binding.identity()) {
            Some(current) => {
                if current.fingerprint() != own_binding.fingerprint() {
                    changed = true;
                    break;
                }
            }
            None => {}
        }
    }

    if !changed && own.has_local_types() {
        // Embedded copies unify against the whole closure, so a closure change is a
        // reference-set change for this compilation even when its declared bindings agree.
        let own_closure = compilation.closure_keys();
        let session_closure: Vec<usize> = closure_keys
            .iter()
            .copied()
            .filter(|member| *member != key)
            .collect();
        if own_closure != session_closure {
            changed = true;
        }
    }

    if changed {
        let closure: Vec<usize> = closure_keys
            .iter()
            .copied()
            .filter(|member| *member != key)
            .collect();
        AssemblySymbol::Retargeting(get_or_create_retargeting(
            own,
            closure,
            corlib_hint.cloned(),
        ))
    } else {
        AssemblySymbol::Graph(own)
    }
}
