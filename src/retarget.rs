//! The retargeting layer: observing one assembly's symbols through another reference set.
//!
//! A [`RetargetingAssembly`] wraps an underlying [`crate::graph::SymbolGraph`] together
//! with the reference environment of the *consuming* side. Symbols reached through it are
//! presented as [`Retargeted`] wrappers: one generic wrapper type parameterized over the
//! symbol kind via the small [`RetargetSymbol`] capability trait, rather than a parallel
//! inheritance hierarchy per kind. A wrapper passes structural queries (name, arity,
//! flags) straight through to the underlying definition and re-resolves every type-valued
//! property - base types, interfaces, signature types, constraints, custom attributes and
//! modifiers, explicit interface implementation links - against the retargeting
//! environment, lazily and memoized.
//!
//! Wrappers are interned per (underlying symbol, retargeting assembly): retargeting the
//! same symbol twice through the same assembly yields reference-equal wrappers. The
//! interning tables lock for insertion only; recursive resolution happens outside any
//! table lock, so reentrant lookups cannot deadlock.

use std::sync::{Arc, OnceLock, Weak};

use dashmap::DashMap;

use crate::{
    graph::SymbolGraphRc,
    metadata::identity::AssemblyIdentity,
    resolve::{
        nopia::CanonicalResolution,
        refs::{self, GenericContext, RefResolver},
        AssemblySymbol, WeakAssembly,
    },
    symbols::{
        members::{
            EventDefSymbol, EventSymbol, FieldDefSymbol, FieldSymbol, MethodDefSymbol,
            MethodSymbol, ParameterSymbol, PropertyDefSymbol, PropertySymbol, TypeParameter,
            TypeParameterSymbol,
        },
        AttributeData, CustomModifier, ErrorType, NamedType, TypeDefRc, TypeDefSymbol,
        TypeSymbol,
    },
};

fn unresolved_type() -> TypeSymbol {
    ErrorType::MissingType {
        assembly: None,
        full_name: String::new(),
        special: None,
    }
    .into_symbol()
}

/// Capability interface for symbols that can be observed through a retargeting assembly.
///
/// `Resolved` is the kind-specific bundle of re-resolved, type-valued properties; the
/// structural rest stays on the underlying symbol.
pub trait RetargetSymbol: Sized {
    /// The kind-specific bundle of re-resolved properties.
    type Resolved;

    /// Re-resolve this symbol's type-valued properties against the owner's environment.
    fn retarget(underlying: &Arc<Self>, owner: &Arc<RetargetingAssembly>) -> Self::Resolved;
}

/// A symbol observed through a retargeting assembly.
///
/// Structural queries pass through to the underlying definition; the re-resolved shape is
/// computed on first access and memoized for the lifetime of the retargeting assembly.
pub struct Retargeted<S: RetargetSymbol> {
    underlying: Arc<S>,
    owner: Weak<RetargetingAssembly>,
    resolved: OnceLock<S::Resolved>,
}

impl<S: RetargetSymbol> Retargeted<S> {
    fn new(underlying: Arc<S>, owner: Weak<RetargetingAssembly>) -> Self {
        Retargeted {
            underlying,
            owner,
            resolved: OnceLock::new(),
        }
    }

    /// The wrapped definition symbol.
    #[must_use]
    pub fn underlying(&self) -> &Arc<S> {
        &self.underlying
    }

    pub(crate) fn owner(&self) -> Option<Arc<RetargetingAssembly>> {
        self.owner.upgrade()
    }

    fn shape(&self) -> Option<&S::Resolved> {
        if let Some(shape) = self.resolved.get() {
            return Some(shape);
        }
        let owner = self.owner.upgrade()?;
        Some(self
            .resolved
            .get_or_init(|| S::retarget(&self.underlying, &owner)))
    }
}

/// Re-resolved properties of a retargeted type.
pub struct RetargetedTypeShape {
    base: Option<TypeSymbol>,
    interfaces: Vec<TypeSymbol>,
    enum_underlying: Option<TypeSymbol>,
    attributes: Vec<AttributeData>,
    type_params: Vec<TypeParameter>,
}

/// Re-resolved properties of a retargeted method.
pub struct RetargetedMethodShape {
    return_type: TypeSymbol,
    params: Vec<Arc<ParameterSymbol>>,
    explicit_impls: Vec<MethodSymbol>,
    attributes: Vec<AttributeData>,
    type_params: Vec<TypeParameter>,
}

/// Re-resolved properties of a retargeted field.
pub struct RetargetedFieldShape {
    ty: TypeSymbol,
    modifiers: Vec<CustomModifier>,
    attributes: Vec<AttributeData>,
}

/// Re-resolved properties of a retargeted property.
pub struct RetargetedPropertyShape {
    ty: TypeSymbol,
    attributes: Vec<AttributeData>,
}

/// Re-resolved properties of a retargeted event.
pub struct RetargetedEventShape {
    ty: TypeSymbol,
    attributes: Vec<AttributeData>,
}

/// Re-resolved constraints of a retargeted type parameter.
pub struct RetargetedTypeParamShape {
    constraints: Vec<TypeSymbol>,
}

impl RetargetSymbol for TypeDefSymbol {
    type Resolved = RetargetedTypeShape;

    fn retarget(underlying: &Arc<Self>, owner: &Arc<RetargetingAssembly>) -> Self::Resolved {
        let resolver = RefResolver::for_retargeting(owner);
        let type_params: Vec<TypeParameter> = underlying
            .type_params
            .iter()
            .map(|(_, param)| TypeParameter::Retargeted(owner.retarget_type_param(param)))
            .collect();
        let ctx = GenericContext::for_type(type_params.clone());
        RetargetedTypeShape {
            base: underlying
                .base_ref
                .as_ref()
                .map(|base| resolver.resolve(base, &ctx)),
            interfaces: underlying
                .interface_refs
                .iter()
                .map(|interface| resolver.resolve(interface, &ctx))
                .collect(),
            enum_underlying: underlying
                .enum_underlying_kind
                .map(|kind| resolver.resolve_primitive(kind)),
            attributes: resolver.resolve_attributes(&underlying.attribute_raws, &ctx),
            type_params,
        }
    }
}

impl Retargeted<TypeDefSymbol> {
    /// Re-resolved base type.
    #[must_use]
    pub fn base(&self) -> Option<TypeSymbol> {
        self.shape().and_then(|shape| shape.base.clone())
    }

    /// Re-resolved implemented interfaces.
    #[must_use]
    pub fn interfaces(&self) -> Vec<TypeSymbol> {
        self.shape()
            .map(|shape| shape.interfaces.clone())
            .unwrap_or_default()
    }

    /// Re-resolved enum underlying type, special tag preserved on failure.
    #[must_use]
    pub fn enum_underlying(&self) -> Option<TypeSymbol> {
        self.shape().and_then(|shape| shape.enum_underlying.clone())
    }

    /// Re-resolved custom attribute applications.
    #[must_use]
    pub fn attributes(&self) -> Vec<AttributeData> {
        self.shape()
            .map(|shape| shape.attributes.clone())
            .unwrap_or_default()
    }

    /// Generic parameters, as retargeted wrappers.
    #[must_use]
    pub fn type_parameters(&self) -> Vec<TypeParameter> {
        self.shape()
            .map(|shape| shape.type_params.clone())
            .unwrap_or_default()
    }

    /// Method symbols wrapped for the retargeting assembly.
    #[must_use]
    pub fn methods(&self) -> Vec<MethodSymbol> {
        let Some(owner) = self.owner() else {
            return Vec::new();
        };
        self.underlying
            .method_defs()
            .into_iter()
            .map(|method| MethodSymbol::Retargeted(owner.retarget_method(&method)))
            .collect()
    }

    /// Field symbols wrapped for the retargeting assembly.
    #[must_use]
    pub fn fields(&self) -> Vec<FieldSymbol> {
        let Some(owner) = self.owner() else {
            return Vec::new();
        };
        self.underlying
            .field_defs()
            .into_iter()
            .map(|field| FieldSymbol::Retargeted(owner.retarget_field(&field)))
            .collect()
    }

    /// Property symbols wrapped for the retargeting assembly.
    #[must_use]
    pub fn properties(&self) -> Vec<PropertySymbol> {
        let Some(owner) = self.owner() else {
            return Vec::new();
        };
        self.underlying
            .property_defs()
            .into_iter()
            .map(|property| PropertySymbol::Retargeted(owner.retarget_property(&property)))
            .collect()
    }

    /// Event symbols wrapped for the retargeting assembly.
    #[must_use]
    pub fn events(&self) -> Vec<EventSymbol> {
        let Some(owner) = self.owner() else {
            return Vec::new();
        };
        self.underlying
            .event_defs()
            .into_iter()
            .map(|event| EventSymbol::Retargeted(owner.retarget_event(&event)))
            .collect()
    }

    /// Visible nested types wrapped for the retargeting assembly.
    #[must_use]
    pub fn nested_types(&self) -> Vec<NamedType> {
        let Some(owner) = self.owner() else {
            return Vec::new();
        };
        self.underlying
            .nested_types()
            .into_iter()
            .filter_map(|nested| nested.definition().cloned())
            .map(|nested| NamedType::Retargeted(owner.retarget_type(&nested)))
            .collect()
    }
}

impl RetargetSymbol for MethodDefSymbol {
    type Resolved = RetargetedMethodShape;

    fn retarget(underlying: &Arc<Self>, owner: &Arc<RetargetingAssembly>) -> Self::Resolved {
        let resolver = RefResolver::for_retargeting(owner);
        let containing = underlying.containing.upgrade();
        let type_params: Vec<TypeParameter> = containing
            .as_ref()
            .map(|containing| {
                containing
                    .type_params
                    .iter()
                    .map(|(_, param)| {
                        TypeParameter::Retargeted(owner.retarget_type_param(param))
                    })
                    .collect()
            })
            .unwrap_or_default();
        let method_params: Vec<TypeParameter> = underlying
            .type_params
            .iter()
            .map(|param| TypeParameter::Retargeted(owner.retarget_type_param(param)))
            .collect();
        let ctx = GenericContext {
            type_params,
            method_params: method_params.clone(),
        };
        let embedded = containing.is_some_and(|containing| containing.is_embedded());

        let return_type = resolver.resolve_signature(&underlying.return_ref, &ctx, embedded);
        let params = refs::materialize_params(&resolver, &ctx, &underlying.param_raws, embedded);
        let param_types: Vec<TypeSymbol> =
            params.iter().map(|param| param.ty().clone()).collect();
        let explicit_impls = refs::link_explicit_impls(
            &resolver,
            &ctx,
            &underlying.explicit_impl_raws,
            &param_types,
            &return_type,
        );
        RetargetedMethodShape {
            return_type,
            params,
            explicit_impls,
            attributes: resolver.resolve_attributes(&underlying.attribute_raws, &ctx),
            type_params: method_params,
        }
    }
}

impl Retargeted<MethodDefSymbol> {
    /// Re-resolved return type.
    #[must_use]
    pub fn return_type(&self) -> TypeSymbol {
        self.shape()
            .map(|shape| shape.return_type.clone())
            .unwrap_or_else(unresolved_type)
    }

    /// Re-resolved parameters.
    #[must_use]
    pub fn parameters(&self) -> Vec<Arc<ParameterSymbol>> {
        self.shape()
            .map(|shape| shape.params.clone())
            .unwrap_or_default()
    }

    /// Explicit interface implementation links re-matched against the retargeting
    /// environment's view of the interface.
    #[must_use]
    pub fn explicit_interface_implementations(&self) -> Vec<MethodSymbol> {
        self.shape()
            .map(|shape| shape.explicit_impls.clone())
            .unwrap_or_default()
    }

    /// Re-resolved custom attribute applications.
    #[must_use]
    pub fn attributes(&self) -> Vec<AttributeData> {
        self.shape()
            .map(|shape| shape.attributes.clone())
            .unwrap_or_default()
    }

    /// Generic parameters of the method, as retargeted wrappers.
    #[must_use]
    pub fn method_type_parameters(&self) -> Vec<TypeParameter> {
        self.shape()
            .map(|shape| shape.type_params.clone())
            .unwrap_or_default()
    }
}

impl RetargetSymbol for FieldDefSymbol {
    type Resolved = RetargetedFieldShape;

    fn retarget(underlying: &Arc<Self>, owner: &Arc<RetargetingAssembly>) -> Self::Resolved {
        let resolver = RefResolver::for_retargeting(owner);
        let containing = underlying.containing.upgrade();
        let ctx = containing
            .as_ref()
            .map(|containing| {
                GenericContext::for_type(
                    containing
                        .type_params
                        .iter()
                        .map(|(_, param)| {
                            TypeParameter::Retargeted(owner.retarget_type_param(param))
                        })
                        .collect(),
                )
            })
            .unwrap_or_default();
        let embedded = containing.is_some_and(|containing| containing.is_embedded());
        RetargetedFieldShape {
            ty: resolver.resolve_signature(&underlying.ty_ref, &ctx, embedded),
            modifiers: resolver.resolve_modifiers(&underlying.modifier_raws, &ctx),
            attributes: resolver.resolve_attributes(&underlying.attribute_raws, &ctx),
        }
    }
}

impl Retargeted<FieldDefSymbol> {
    /// Re-resolved field type.
    #[must_use]
    pub fn ty(&self) -> TypeSymbol {
        self.shape()
            .map(|shape| shape.ty.clone())
            .unwrap_or_else(unresolved_type)
    }

    /// Re-resolved custom modifiers, `required` flags preserved.
    #[must_use]
    pub fn custom_modifiers(&self) -> Vec<CustomModifier> {
        self.shape()
            .map(|shape| shape.modifiers.clone())
            .unwrap_or_default()
    }

    /// Re-resolved custom attribute applications.
    #[must_use]
    pub fn attributes(&self) -> Vec<AttributeData> {
        self.shape()
            .map(|shape| shape.attributes.clone())
            .unwrap_or_default()
    }
}

impl RetargetSymbol for PropertyDefSymbol {
    type Resolved = RetargetedPropertyShape;

    fn retarget(underlying: &Arc<Self>, owner: &Arc<RetargetingAssembly>) -> Self::Resolved {
        let resolver = RefResolver::for_retargeting(owner);
        let containing = underlying.containing.upgrade();
        let ctx = containing
            .as_ref()
            .map(|containing| {
                GenericContext::for_type(
                    containing
                        .type_params
                        .iter()
                        .map(|(_, param)| {
                            TypeParameter::Retargeted(owner.retarget_type_param(param))
                        })
                        .collect(),
                )
            })
            .unwrap_or_default();
        let embedded = containing.is_some_and(|containing| containing.is_embedded());
        RetargetedPropertyShape {
            ty: resolver.resolve_signature(&underlying.ty_ref, &ctx, embedded),
            attributes: resolver.resolve_attributes(&underlying.attribute_raws, &ctx),
        }
    }
}

impl Retargeted<PropertyDefSymbol> {
    /// Re-resolved property type.
    #[must_use]
    pub fn ty(&self) -> TypeSymbol {
        self.shape()
            .map(|shape| shape.ty.clone())
            .unwrap_or_else(unresolved_type)
    }

    /// Re-resolved custom attribute applications.
    #[must_use]
    pub fn attributes(&self) -> Vec<AttributeData> {
        self.shape()
            .map(|shape| shape.attributes.clone())
            .unwrap_or_default()
    }
}

impl RetargetSymbol for EventDefSymbol {
    type Resolved = RetargetedEventShape;

    fn retarget(underlying: &Arc<Self>, owner: &Arc<RetargetingAssembly>) -> Self::Resolved {
        let resolver = RefResolver::for_retargeting(owner);
        let containing = underlying.containing.upgrade();
        let ctx = containing
            .as_ref()
            .map(|containing| {
                GenericContext::for_type(
                    containing
                        .type_params
                        .iter()
                        .map(|(_, param)| {
                            TypeParameter::Retargeted(owner.retarget_type_param(param))
                        })
                        .collect(),
                )
            })
            .unwrap_or_default();
        let embedded = containing.is_some_and(|containing| containing.is_embedded());
        RetargetedEventShape {
            ty: resolver.resolve_signature(&underlying.ty_ref, &ctx, embedded),
            attributes: resolver.resolve_attributes(&underlying.attribute_raws, &ctx),
        }
    }
}

impl Retargeted<EventDefSymbol> {
    /// Re-resolved delegate type.
    #[must_use]
    pub fn ty(&self) -> TypeSymbol {
        self.shape()
            .map(|shape| shape.ty.clone())
            .unwrap_or_else(unresolved_type)
    }

    /// Re-resolved custom attribute applications.
    #[must_use]
    pub fn attributes(&self) -> Vec<AttributeData> {
        self.shape()
            .map(|shape| shape.attributes.clone())
            .unwrap_or_default()
    }
}

impl RetargetSymbol for TypeParameterSymbol {
    type Resolved = RetargetedTypeParamShape;

    fn retarget(underlying: &Arc<Self>, owner: &Arc<RetargetingAssembly>) -> Self::Resolved {
        let resolver = RefResolver::for_retargeting(owner);
        let ctx = underlying
            .containing
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|containing| {
                GenericContext::for_type(
                    containing
                        .type_params
                        .iter()
                        .map(|(_, param)| {
                            TypeParameter::Retargeted(owner.retarget_type_param(param))
                        })
                        .collect(),
                )
            })
            .unwrap_or_default();
        RetargetedTypeParamShape {
            constraints: underlying
                .constraint_refs
                .iter()
                .map(|constraint| resolver.resolve(constraint, &ctx))
                .collect(),
        }
    }
}

impl Retargeted<TypeParameterSymbol> {
    /// Re-resolved constraint types.
    #[must_use]
    pub fn constraints(&self) -> Vec<TypeSymbol> {
        self.shape()
            .map(|shape| shape.constraints.clone())
            .unwrap_or_default()
    }
}

/// A view of one underlying assembly through a consuming reference environment.
///
/// The environment is the consuming session's closure, wired in once session binding
/// completes and held weakly: the session's [`crate::resolve::Resolution`] owns the strong
/// references.
pub struct RetargetingAssembly {
    underlying: SymbolGraphRc,
    environment: OnceLock<Vec<WeakAssembly>>,
    corlib_hint: Option<AssemblyIdentity>,
    types: DashMap<usize, Arc<Retargeted<TypeDefSymbol>>>,
    methods: DashMap<usize, Arc<Retargeted<MethodDefSymbol>>>,
    fields: DashMap<usize, Arc<Retargeted<FieldDefSymbol>>>,
    properties: DashMap<usize, Arc<Retargeted<PropertyDefSymbol>>>,
    events: DashMap<usize, Arc<Retargeted<EventDefSymbol>>>,
    type_params: DashMap<usize, Arc<Retargeted<TypeParameterSymbol>>>,
    canonicals: DashMap<String, CanonicalResolution>,
    this: Weak<RetargetingAssembly>,
}

impl RetargetingAssembly {
    pub(crate) fn new(
        underlying: SymbolGraphRc,
        corlib_hint: Option<AssemblyIdentity>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| RetargetingAssembly {
            underlying,
            environment: OnceLock::new(),
            corlib_hint,
            types: DashMap::new(),
            methods: DashMap::new(),
            fields: DashMap::new(),
            properties: DashMap::new(),
            events: DashMap::new(),
            type_params: DashMap::new(),
            canonicals: DashMap::new(),
            this: this.clone(),
        })
    }

    /// Identity of the underlying assembly.
    #[must_use]
    pub fn identity(&self) -> &AssemblyIdentity {
        self.underlying.identity()
    }

    /// The underlying graph being observed.
    #[must_use]
    pub fn underlying(&self) -> &SymbolGraphRc {
        &self.underlying
    }

    /// The consuming side's reference environment (the owning session's closure).
    #[must_use]
    pub fn environment(&self) -> Vec<AssemblySymbol> {
        match self.environment.get() {
            Some(closure) => closure.iter().filter_map(WeakAssembly::upgrade).collect(),
            None => Vec::new(),
        }
    }

    /// Record the owning session's closure. First wiring wins.
    pub(crate) fn wire_environment(&self, closure: Vec<WeakAssembly>) {
        let _ = self.environment.set(closure);
    }

    pub(crate) fn corlib_hint(&self) -> Option<&AssemblyIdentity> {
        self.corlib_hint.as_ref()
    }

    pub(crate) fn canonicals(&self) -> &DashMap<String, CanonicalResolution> {
        &self.canonicals
    }

    /// Look up a visible top-level type by qualified metadata name, wrapped for this view.
    /// Locally embedded interop copies stay hidden.
    #[must_use]
    pub fn lookup_top_level_type(&self, metadata_name: &str) -> Option<NamedType> {
        let def = self.underlying.visible_top_level(metadata_name)?;
        let this = self.this.upgrade()?;
        Some(NamedType::Retargeted(this.retarget_type(&def)))
    }

    /// All visible top-level types, wrapped for this view.
    #[must_use]
    pub fn top_level_types(&self) -> Vec<NamedType> {
        let Some(this) = self.this.upgrade() else {
            return Vec::new();
        };
        self.underlying
            .top_level_types()
            .into_iter()
            .filter_map(|named| named.definition().cloned())
            .map(|def| NamedType::Retargeted(this.retarget_type(&def)))
            .collect()
    }

    pub(crate) fn retarget_type(
        self: &Arc<Self>,
        def: &TypeDefRc,
    ) -> Arc<Retargeted<TypeDefSymbol>> {
        self.types
            .entry(Arc::as_ptr(def) as usize)
            .or_insert_with(|| Arc::new(Retargeted::new(def.clone(), Arc::downgrade(self))))
            .clone()
    }

    pub(crate) fn retarget_method(
        self: &Arc<Self>,
        def: &Arc<MethodDefSymbol>,
    ) -> Arc<Retargeted<MethodDefSymbol>> {
        self.methods
            .entry(Arc::as_ptr(def) as usize)
            .or_insert_with(|| Arc::new(Retargeted::new(def.clone(), Arc::downgrade(self))))
            .clone()
    }

    pub(crate) fn retarget_field(
        self: &Arc<Self>,
        def: &Arc<FieldDefSymbol>,
    ) -> Arc<Retargeted<FieldDefSymbol>> {
        self.fields
            .entry(Arc::as_ptr(def) as usize)
            .or_insert_with(|| Arc::new(Retargeted::new(def.clone(), Arc::downgrade(self))))
            .clone()
    }

    pub(crate) fn retarget_property(
        self: &Arc<Self>,
        def: &Arc<PropertyDefSymbol>,
    ) -> Arc<Retargeted<PropertyDefSymbol>> {
        self.properties
            .entry(Arc::as_ptr(def) as usize)
            .or_insert_with(|| Arc::new(Retargeted::new(def.clone(), Arc::downgrade(self))))
            .clone()
    }

    pub(crate) fn retarget_event(
        self: &Arc<Self>,
        def: &Arc<EventDefSymbol>,
    ) -> Arc<Retargeted<EventDefSymbol>> {
        self.events
            .entry(Arc::as_ptr(def) as usize)
            .or_insert_with(|| Arc::new(Retargeted::new(def.clone(), Arc::downgrade(self))))
            .clone()
    }

    pub(crate) fn retarget_type_param(
        self: &Arc<Self>,
        def: &Arc<TypeParameterSymbol>,
    ) -> Arc<Retargeted<TypeParameterSymbol>> {
        self.type_params
            .entry(Arc::as_ptr(def) as usize)
            .or_insert_with(|| Arc::new(Retargeted::new(def.clone(), Arc::downgrade(self))))
            .clone()
    }
}
