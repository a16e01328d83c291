//! Mapping of raw type references to type symbols against a reference environment.
//!
//! [`RefResolver`] is the single resolution path shared by native graphs and the
//! retargeting layer. A resolver is a (home graph, reference environment) pair plus an
//! optional retargeting owner: native resolution uses a graph's own reference list and
//! yields definition symbols, retargeting resolution uses the retargeting assembly's list
//! and yields interned wrappers. Everything else - primitive/corlib dispatch, embedded
//! interop routing, the generic-closure check, attribute and modifier projection - is
//! identical between the two, which is what keeps the retargeted view of a symbol
//! structurally faithful to the native one.
//!
//! Resolution never fails: every unresolvable reference becomes a typed error symbol with
//! the predefined-type tag preserved where derivable.

use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    graph::SymbolGraph,
    metadata::{
        identity::AssemblyIdentity,
        provider::{
            metadata_type_name, RawAttribute, RawConstant, RawConstantValue,
            RawImplementedMember, RawModifier, RawNamedRef, RawParam, RawTypeRef,
        },
    },
    resolve::{
        nopia::{self, CanonicalResolution},
        AssemblySymbol,
    },
    retarget::RetargetingAssembly,
    symbols::{
        members::ParameterSymbol, ArrayType, AttributeData, ConstantData, CustomModifier,
        ErrorType, GenericInstantiation, MethodSymbol, NamedType, PointerType, SpecialType,
        TypeDefRc, TypeParameter, TypeSymbol, TypedConstant,
    },
};

/// Maximum recursion depth for type reference resolution
const MAX_RECURSION_DEPTH: usize = 100;

/// Generic parameters in scope while resolving a reference.
#[derive(Default)]
pub(crate) struct GenericContext {
    /// Parameters of the enclosing type.
    pub type_params: Vec<TypeParameter>,
    /// Parameters of the enclosing method.
    pub method_params: Vec<TypeParameter>,
}

impl GenericContext {
    pub(crate) fn empty() -> Self {
        GenericContext::default()
    }

    pub(crate) fn for_type(type_params: Vec<TypeParameter>) -> Self {
        GenericContext {
            type_params,
            method_params: Vec::new(),
        }
    }
}

enum CorlibSite<'a> {
    Home,
    Reference(&'a AssemblySymbol),
}

/// Resolves raw type references against a (home graph, reference environment) pair.
///
/// `env` is the binding environment ordinary assembly-qualified references resolve
/// against; `nopia_env` is the embedding closure canonical resolution searches. For a
/// native graph the former is its declared references and the latter its session closure;
/// for a retargeting view both are the consuming session's closure.
pub(crate) struct RefResolver<'a> {
    home: &'a SymbolGraph,
    env: Vec<AssemblySymbol>,
    nopia_env: Vec<AssemblySymbol>,
    owner: Option<Arc<RetargetingAssembly>>,
    corlib_hint: Option<AssemblyIdentity>,
}

impl<'a> RefResolver<'a> {
    /// Resolver for a graph's own reference environment.
    pub(crate) fn for_graph(graph: &'a SymbolGraph) -> Self {
        RefResolver {
            home: graph,
            env: graph.references().to_vec(),
            nopia_env: graph.embedding_environment(),
            owner: None,
            corlib_hint: None,
        }
    }

    /// Resolver for a retargeting assembly: home stays the underlying graph, the
    /// environment and the produced wrappers belong to the retargeting side.
    pub(crate) fn for_retargeting(owner: &'a Arc<RetargetingAssembly>) -> Self {
        let environment = owner.environment();
        RefResolver {
            home: owner.underlying().as_ref(),
            env: environment.clone(),
            nopia_env: environment,
            owner: Some(owner.clone()),
            corlib_hint: owner.corlib_hint().cloned(),
        }
    }

    fn canonical_cache(&self) -> &DashMap<String, CanonicalResolution> {
        match &self.owner {
            Some(owner) => owner.canonicals(),
            None => self.home.canonicals(),
        }
    }

    fn wrap_local(&self, def: &TypeDefRc) -> TypeSymbol {
        TypeSymbol::Named(match &self.owner {
            Some(owner) => NamedType::Retargeted(owner.retarget_type(def)),
            None => NamedType::Definition(def.clone()),
        })
    }

    /// Resolve a raw type reference to a type symbol.
    pub(crate) fn resolve(&self, reference: &RawTypeRef, ctx: &GenericContext) -> TypeSymbol {
        self.resolve_depth(reference, ctx, 0)
    }

    /// Resolve a reference in an interop-sensitive signature position. Generic types are
    /// not embeddable, so a generic shape in an embedded type's signature short-circuits
    /// to an error placeholder naming the generic type.
    pub(crate) fn resolve_signature(
        &self,
        reference: &RawTypeRef,
        ctx: &GenericContext,
        embedded: bool,
    ) -> TypeSymbol {
        if embedded && reference.is_generic_shape() {
            return ErrorType::EmbeddedGeneric {
                display: reference.to_string(),
            }
            .into_symbol();
        }
        self.resolve_depth(reference, ctx, 0)
    }

    fn resolve_depth(
        &self,
        reference: &RawTypeRef,
        ctx: &GenericContext,
        depth: usize,
    ) -> TypeSymbol {
        if depth >= MAX_RECURSION_DEPTH {
            return ErrorType::UnsupportedMetadataType {
                display: reference.to_string(),
            }
            .into_symbol();
        }

        match reference {
            RawTypeRef::Primitive(special) => self.resolve_primitive(*special),
            RawTypeRef::TypeParameter { ordinal, method } => {
                let params = if *method {
                    &ctx.method_params
                } else {
                    &ctx.type_params
                };
                match params.get(*ordinal as usize) {
                    Some(param) => TypeSymbol::Parameter(param.clone()),
                    None => ErrorType::MissingType {
                        assembly: None,
                        full_name: reference.to_string(),
                        special: None,
                    }
                    .into_symbol(),
                }
            }
            RawTypeRef::Named(named) => self.resolve_named(named),
            RawTypeRef::Generic { definition, args } => {
                // An embedded interop type closed over by generics has no well-defined
                // canonical identity; the check runs before any lookup and applies
                // transitively through nested arguments.
                if self.mentions_embedded(definition)
                    || args.iter().any(|arg| self.mentions_embedded(arg))
                {
                    return CanonicalResolution::IllegalGenericInstantiation {
                        display: reference.to_string(),
                    }
                    .into_type();
                }

                let resolved_definition = match self.resolve_depth(definition, ctx, depth + 1) {
                    TypeSymbol::Named(named) => named,
                    other => return other,
                };
                let resolved_args = args
                    .iter()
                    .map(|arg| self.resolve_depth(arg, ctx, depth + 1))
                    .collect();
                TypeSymbol::Generic(Arc::new(GenericInstantiation {
                    definition: resolved_definition,
                    args: resolved_args,
                }))
            }
            RawTypeRef::Array { element, rank } => TypeSymbol::Array(Arc::new(ArrayType {
                element: self.resolve_depth(element, ctx, depth + 1),
                rank: *rank,
            })),
            RawTypeRef::Pointer(pointee) => TypeSymbol::Pointer(Arc::new(PointerType {
                pointee: self.resolve_depth(pointee, ctx, depth + 1),
            })),
            RawTypeRef::Modified { unmodified, .. } => {
                self.resolve_depth(unmodified, ctx, depth + 1)
            }
        }
    }

    fn corlib_site(&self) -> Option<CorlibSite<'_>> {
        if let Some(hint) = &self.corlib_hint {
            if self.home.identity().is_compatible_with(hint) {
                return Some(CorlibSite::Home);
            }
            if let Some(symbol) = self
                .env
                .iter()
                .find(|symbol| symbol.identity().is_compatible_with(hint))
            {
                return Some(CorlibSite::Reference(symbol));
            }
        }
        if self.home.defines_system_object() {
            return Some(CorlibSite::Home);
        }
        self.env
            .iter()
            .find(|symbol| symbol.defines_system_object())
            .map(CorlibSite::Reference)
    }

    /// Resolve one of the predefined `System` types against the environment's corlib,
    /// preserving the special-type tag on the error placeholder when there is none.
    pub(crate) fn resolve_primitive(&self, special: SpecialType) -> TypeSymbol {
        match self.corlib_site() {
            Some(CorlibSite::Home) => match self.home.visible_top_level(special.full_name()) {
                Some(def) => self.wrap_local(&def),
                None => missing_special(Some(self.home.identity().clone()), special),
            },
            Some(CorlibSite::Reference(symbol)) => {
                match symbol.lookup_top_level_type(special.full_name()) {
                    Some(named) => TypeSymbol::Named(named),
                    None => missing_special(Some(symbol.identity().clone()), special),
                }
            }
            None => missing_special(None, special),
        }
    }

    fn find_reference(&self, requested: &AssemblyIdentity) -> Option<&AssemblySymbol> {
        self.env
            .iter()
            .find(|symbol| symbol.identity().is_compatible_with(requested))
    }

    fn resolve_named(&self, named: &RawNamedRef) -> TypeSymbol {
        let key = qualified_name(named);
        let is_local = match &named.assembly {
            None => true,
            Some(requested) => self.home.identity().is_compatible_with(requested),
        };

        if is_local {
            if let Some(def) = self.home.visible_top_level(&key) {
                return self.descend_local(def, named);
            }
            if let Some(def) = self.home.hidden_top_level(&key) {
                return nopia::resolve_embedded(
                    &def,
                    &named.nested,
                    self.home.identity(),
                    &self.nopia_env,
                    self.canonical_cache(),
                );
            }
            return self.missing_named(named, Some(self.home.identity().clone()));
        }

        let Some(requested) = &named.assembly else {
            return self.missing_named(named, None);
        };
        match self.find_reference(requested) {
            Some(symbol) => {
                if let Some(top) = symbol.lookup_top_level_type(&key) {
                    return descend_reference(symbol, top, named);
                }
                if let Some(def) = symbol.hidden_lookup(&key) {
                    let embedding_env = symbol.embedding_env();
                    return nopia::resolve_embedded(
                        &def,
                        &named.nested,
                        symbol.identity(),
                        &embedding_env,
                        symbol.canonicals_map(),
                    );
                }
                self.missing_named(named, Some(symbol.identity().clone()))
            }
            None => self.missing_named(named, Some(requested.clone())),
        }
    }

    /// Walk the nested chain of a local definition, routing into canonical resolution at
    /// the first embedded level.
    fn descend_local(&self, top: TypeDefRc, named: &RawNamedRef) -> TypeSymbol {
        let mut current = top;
        for (index, (name, arity)) in named.nested.iter().enumerate() {
            let metadata_name = metadata_type_name(name, *arity);
            match current.nested_any(&metadata_name) {
                Some(next) if next.is_embedded() => {
                    return nopia::resolve_embedded(
                        &next,
                        &named.nested[index + 1..],
                        self.home.identity(),
                        &self.nopia_env,
                        self.canonical_cache(),
                    );
                }
                Some(next) => current = next,
                None => return self.missing_named(named, Some(self.home.identity().clone())),
            }
        }
        self.wrap_local(&current)
    }

    fn missing_named(
        &self,
        named: &RawNamedRef,
        assembly: Option<AssemblyIdentity>,
    ) -> TypeSymbol {
        missing_for(named, assembly)
    }

    /// Whether a reference mentions, at any nesting depth, a locally embedded interop
    /// type. Drives the generic-closure check.
    fn mentions_embedded(&self, reference: &RawTypeRef) -> bool {
        match reference {
            RawTypeRef::Named(named) => self.named_mentions_embedded(named),
            RawTypeRef::Generic { definition, args } => {
                self.mentions_embedded(definition)
                    || args.iter().any(|arg| self.mentions_embedded(arg))
            }
            RawTypeRef::Array { element, .. } => self.mentions_embedded(element),
            RawTypeRef::Pointer(pointee) => self.mentions_embedded(pointee),
            RawTypeRef::Modified { unmodified, .. } => self.mentions_embedded(unmodified),
            RawTypeRef::Primitive(_) | RawTypeRef::TypeParameter { .. } => false,
        }
    }

    fn named_mentions_embedded(&self, named: &RawNamedRef) -> bool {
        let key = qualified_name(named);
        let is_local = match &named.assembly {
            None => true,
            Some(requested) => self.home.identity().is_compatible_with(requested),
        };

        let top = if is_local {
            if self.home.hidden_top_level(&key).is_some() {
                return true;
            }
            self.home.visible_top_level(&key)
        } else {
            let Some(requested) = &named.assembly else {
                return false;
            };
            match self.find_reference(requested) {
                Some(symbol) => {
                    if symbol.hidden_lookup(&key).is_some() {
                        return true;
                    }
                    symbol
                        .lookup_top_level_type(&key)
                        .and_then(|named_type| named_type.definition().cloned())
                }
                None => None,
            }
        };

        let Some(mut current) = top else {
            return false;
        };
        for (name, arity) in &named.nested {
            match current.nested_any(&metadata_type_name(name, *arity)) {
                Some(next) if next.is_embedded() => return true,
                Some(next) => current = next,
                None => return false,
            }
        }
        current.is_embedded()
    }

    /// Resolve custom modifiers, preserving the `required` flag.
    pub(crate) fn resolve_modifiers(
        &self,
        modifiers: &[RawModifier],
        ctx: &GenericContext,
    ) -> Vec<CustomModifier> {
        modifiers
            .iter()
            .map(|modifier| CustomModifier {
                required: modifier.required,
                modifier: self.resolve(&modifier.modifier, ctx),
            })
            .collect()
    }

    /// Resolve custom attribute applications: class, constructor and every typed constant.
    pub(crate) fn resolve_attributes(
        &self,
        attributes: &[RawAttribute],
        ctx: &GenericContext,
    ) -> Vec<AttributeData> {
        attributes
            .iter()
            .map(|attribute| {
                let class = self.resolve(&attribute.class, ctx);
                let constructor = class.named().and_then(|named| {
                    named
                        .methods()
                        .into_iter()
                        .find(|method| {
                            method.name() == ".ctor"
                                && method.parameters().len() == attribute.positional.len()
                        })
                });
                AttributeData {
                    class,
                    constructor,
                    positional: attribute
                        .positional
                        .iter()
                        .map(|constant| self.resolve_constant(constant, ctx))
                        .collect(),
                    named: attribute
                        .named
                        .iter()
                        .map(|named_arg| crate::symbols::NamedConstant {
                            name: named_arg.name.clone(),
                            is_field: named_arg.is_field,
                            value: self.resolve_constant(&named_arg.value, ctx),
                        })
                        .collect(),
                }
            })
            .collect()
    }

    fn resolve_constant(&self, constant: &RawConstant, ctx: &GenericContext) -> TypedConstant {
        TypedConstant {
            ty: self.resolve(&constant.ty, ctx),
            value: match &constant.value {
                RawConstantValue::Null => ConstantData::Null,
                RawConstantValue::Bool(value) => ConstantData::Bool(*value),
                RawConstantValue::Char(value) => ConstantData::Char(*value),
                RawConstantValue::I1(value) => ConstantData::I1(*value),
                RawConstantValue::U1(value) => ConstantData::U1(*value),
                RawConstantValue::I2(value) => ConstantData::I2(*value),
                RawConstantValue::U2(value) => ConstantData::U2(*value),
                RawConstantValue::I4(value) => ConstantData::I4(*value),
                RawConstantValue::U4(value) => ConstantData::U4(*value),
                RawConstantValue::I8(value) => ConstantData::I8(*value),
                RawConstantValue::U8(value) => ConstantData::U8(*value),
                RawConstantValue::R4(value) => ConstantData::R4(*value),
                RawConstantValue::R8(value) => ConstantData::R8(*value),
                RawConstantValue::String(value) => ConstantData::String(value.clone()),
                RawConstantValue::Type(reference) => {
                    ConstantData::Type(self.resolve(reference, ctx))
                }
                RawConstantValue::Array(values) => ConstantData::Array(
                    values
                        .iter()
                        .map(|value| self.resolve_constant(value, ctx))
                        .collect(),
                ),
            },
        }
    }
}

fn qualified_name(named: &RawNamedRef) -> String {
    if named.namespace.is_empty() {
        named.top_level_metadata_name()
    } else {
        format!("{}.{}", named.namespace, named.top_level_metadata_name())
    }
}

fn missing_special(assembly: Option<AssemblyIdentity>, special: SpecialType) -> TypeSymbol {
    ErrorType::MissingType {
        assembly,
        full_name: special.full_name().to_string(),
        special: Some(special),
    }
    .into_symbol()
}

fn missing_for(named: &RawNamedRef, assembly: Option<AssemblyIdentity>) -> TypeSymbol {
    // References to System types keep their special tag even when unresolvable.
    let special = if named.nested.is_empty() && named.arity == 0 {
        SpecialType::from_name(&named.namespace, &named.name)
    } else {
        None
    };
    ErrorType::MissingType {
        assembly,
        full_name: named.full_name(),
        special,
    }
    .into_symbol()
}

/// Walk the nested chain of a type found in a referenced assembly, keeping that
/// assembly's wrapping and routing embedded levels into canonical resolution.
fn descend_reference(
    symbol: &AssemblySymbol,
    top: NamedType,
    named: &RawNamedRef,
) -> TypeSymbol {
    let mut current = top;
    for (index, (name, arity)) in named.nested.iter().enumerate() {
        let metadata_name = metadata_type_name(name, *arity);
        if let Some(next) = current.lookup_nested(&metadata_name) {
            current = next;
            continue;
        }
        let embedded = current
            .definition()
            .and_then(|def| def.nested_any(&metadata_name))
            .filter(|def| def.is_embedded());
        return match embedded {
            Some(def) => {
                let embedding_env = symbol.embedding_env();
                nopia::resolve_embedded(
                    &def,
                    &named.nested[index + 1..],
                    symbol.identity(),
                    &embedding_env,
                    symbol.canonicals_map(),
                )
            }
            None => missing_for(named, Some(symbol.identity().clone())),
        };
    }
    TypeSymbol::Named(current)
}

/// Materialize resolved parameter symbols for a method signature.
pub(crate) fn materialize_params(
    resolver: &RefResolver<'_>,
    ctx: &GenericContext,
    params: &[RawParam],
    embedded: bool,
) -> Vec<Arc<ParameterSymbol>> {
    params
        .iter()
        .enumerate()
        .map(|(ordinal, param)| {
            Arc::new(ParameterSymbol {
                name: param.name.clone(),
                ordinal: ordinal as u16,
                ty: resolver.resolve_signature(&param.ty, ctx, embedded),
                custom_modifiers: resolver.resolve_modifiers(&param.modifiers, ctx),
                attributes: resolver.resolve_attributes(&param.attributes, ctx),
            })
        })
        .collect()
}

/// Re-link explicit interface implementation entries against the current view of the
/// implemented interface. An entry whose interface member no longer exists with a matching
/// name and full signature is dropped rather than erroring.
pub(crate) fn link_explicit_impls(
    resolver: &RefResolver<'_>,
    ctx: &GenericContext,
    entries: &[RawImplementedMember],
    self_param_types: &[TypeSymbol],
    self_return: &TypeSymbol,
) -> Vec<MethodSymbol> {
    let mut linked = Vec::new();
    for entry in entries {
        let interface = match resolver.resolve(&entry.interface, ctx) {
            TypeSymbol::Named(named) => named,
            TypeSymbol::Generic(instantiation) => instantiation.definition.clone(),
            _ => continue,
        };
        if let Some(implemented) = interface
            .methods()
            .into_iter()
            .find(|method| method.signature_matches(&entry.member, self_param_types, self_return))
        {
            linked.push(implemented);
        }
    }
    linked
}
