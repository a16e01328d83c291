//! Member symbols: methods, fields, properties, events, parameters and type parameters.
//!
//! Definition symbols (`*DefSymbol`) hold the raw signature pieces plus lazily resolved,
//! memoized type values; the kind-erased enums ([`MethodSymbol`], [`FieldSymbol`], ...)
//! present a definition either directly or through a retargeting wrapper, mirroring
//! [`crate::symbols::NamedType`]. Structural queries (names, flags, ordinals) pass through
//! unchanged in both presentations; everything type-valued re-resolves against the viewing
//! assembly's reference set.

use std::sync::{Arc, OnceLock, Weak};

use crate::{
    graph::SymbolGraph,
    metadata::provider::{
        Accessibility, FieldAttributes, MethodAttributes, RawAttribute, RawImplementedMember,
        RawModifier, RawTypeRef,
    },
    resolve::refs::{self, GenericContext},
    retarget::Retargeted,
    symbols::{
        attributes::{AttributeData, CustomModifier},
        types::{ErrorType, NamedType, TypeDefSymbol, TypeSymbol},
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

/// A generic parameter declared by a type or method.
pub struct TypeParameterSymbol {
    pub(crate) name: String,
    pub(crate) ordinal: u16,
    pub(crate) from_method: bool,
    pub(crate) constraint_refs: Vec<RawTypeRef>,
    pub(crate) owner: Weak<SymbolGraph>,
    pub(crate) containing: Option<Weak<TypeDefSymbol>>,
    pub(crate) constraints: OnceLock<Vec<TypeSymbol>>,
}

impl TypeParameterSymbol {
    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zero-based declaration ordinal.
    #[must_use]
    pub fn ordinal(&self) -> u16 {
        self.ordinal
    }

    /// Whether the parameter belongs to a method rather than a type.
    #[must_use]
    pub fn from_method(&self) -> bool {
        self.from_method
    }

    /// Resolved constraint types. Unresolvable constraints substitute error placeholders
    /// with the special-type tag preserved where derivable.
    #[must_use]
    pub fn constraints(&self) -> Vec<TypeSymbol> {
        self.constraints
            .get_or_init(|| {
                let Some(graph) = self.owner.upgrade() else {
                    return Vec::new();
                };
                let ctx = match self.containing.as_ref().and_then(Weak::upgrade) {
                    Some(containing) => containing.generic_context(),
                    None => GenericContext::empty(),
                };
                self.constraint_refs
                    .iter()
                    .map(|constraint| graph.resolver().resolve(constraint, &ctx))
                    .collect()
            })
            .clone()
    }
}

/// A generic parameter as seen by a consumer.
#[derive(Clone)]
pub enum TypeParameter {
    /// The declared parameter.
    Definition(Arc<TypeParameterSymbol>),
    /// The parameter viewed through another assembly's reference set.
    Retargeted(Arc<Retargeted<TypeParameterSymbol>>),
}

impl TypeParameter {
    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            TypeParameter::Definition(param) => param.name().to_string(),
            TypeParameter::Retargeted(retargeted) => retargeted.underlying().name().to_string(),
        }
    }

    /// Zero-based declaration ordinal.
    #[must_use]
    pub fn ordinal(&self) -> u16 {
        match self {
            TypeParameter::Definition(param) => param.ordinal(),
            TypeParameter::Retargeted(retargeted) => retargeted.underlying().ordinal(),
        }
    }

    /// Whether the parameter belongs to a method rather than a type.
    #[must_use]
    pub fn from_method(&self) -> bool {
        match self {
            TypeParameter::Definition(param) => param.from_method(),
            TypeParameter::Retargeted(retargeted) => retargeted.underlying().from_method(),
        }
    }

    /// Resolved constraint types, through the viewing assembly's reference set.
    #[must_use]
    pub fn constraints(&self) -> Vec<TypeSymbol> {
        match self {
            TypeParameter::Definition(param) => param.constraints(),
            TypeParameter::Retargeted(retargeted) => retargeted.constraints(),
        }
    }
}

impl std::fmt::Debug for TypeParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypeParameter({})", self.name())
    }
}

/// A fully materialized parameter: name, ordinal, resolved type and modifiers.
pub struct ParameterSymbol {
    pub(crate) name: String,
    pub(crate) ordinal: u16,
    pub(crate) ty: TypeSymbol,
    pub(crate) custom_modifiers: Vec<CustomModifier>,
    pub(crate) attributes: Vec<AttributeData>,
}

impl ParameterSymbol {
    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zero-based signature ordinal.
    #[must_use]
    pub fn ordinal(&self) -> u16 {
        self.ordinal
    }

    /// Resolved parameter type.
    #[must_use]
    pub fn ty(&self) -> &TypeSymbol {
        &self.ty
    }

    /// Resolved custom modifiers, `required` flags preserved.
    #[must_use]
    pub fn custom_modifiers(&self) -> &[CustomModifier] {
        &self.custom_modifiers
    }

    /// Resolved custom attribute applications.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeData] {
        &self.attributes
    }
}

/// A method definition realized into one symbol graph.
pub struct MethodDefSymbol {
    pub(crate) name: String,
    pub(crate) accessibility: Accessibility,
    pub(crate) flags: MethodAttributes,
    pub(crate) return_ref: RawTypeRef,
    pub(crate) param_raws: Vec<crate::metadata::provider::RawParam>,
    pub(crate) explicit_impl_raws: Vec<RawImplementedMember>,
    pub(crate) attribute_raws: Vec<RawAttribute>,
    pub(crate) type_params: Vec<Arc<TypeParameterSymbol>>,
    pub(crate) owner: Weak<SymbolGraph>,
    pub(crate) containing: Weak<TypeDefSymbol>,
    pub(crate) return_type: OnceLock<TypeSymbol>,
    pub(crate) params: OnceLock<Vec<Arc<ParameterSymbol>>>,
    pub(crate) explicit_impls: OnceLock<Vec<MethodSymbol>>,
    pub(crate) attributes: OnceLock<Vec<AttributeData>>,
}

impl MethodDefSymbol {
    /// Method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared accessibility.
    #[must_use]
    pub fn accessibility(&self) -> Accessibility {
        self.accessibility
    }

    /// Attribute flags.
    #[must_use]
    pub fn flags(&self) -> MethodAttributes {
        self.flags
    }

    /// The containing type definition.
    #[must_use]
    pub fn containing_type(&self) -> Option<Arc<TypeDefSymbol>> {
        self.containing.upgrade()
    }

    /// Generic parameters declared by this method.
    #[must_use]
    pub fn type_parameters(&self) -> Vec<TypeParameter> {
        self.type_params
            .iter()
            .map(|param| TypeParameter::Definition(param.clone()))
            .collect()
    }

    pub(crate) fn generic_context(&self) -> GenericContext {
        let type_params = self
            .containing
            .upgrade()
            .map(|containing| containing.type_parameters())
            .unwrap_or_default();
        GenericContext {
            type_params,
            method_params: self.type_parameters(),
        }
    }

    fn in_embedded_type(&self) -> bool {
        self.containing
            .upgrade()
            .is_some_and(|containing| containing.is_embedded())
    }

    /// Resolved return type against the owning graph's reference set.
    #[must_use]
    pub fn return_type(&self) -> TypeSymbol {
        self.return_type
            .get_or_init(|| {
                let Some(graph) = self.owner.upgrade() else {
                    return unresolved_type();
                };
                graph.resolver().resolve_signature(
                    &self.return_ref,
                    &self.generic_context(),
                    self.in_embedded_type(),
                )
            })
            .clone()
    }

    /// Resolved parameters against the owning graph's reference set.
    #[must_use]
    pub fn parameters(&self) -> Vec<Arc<ParameterSymbol>> {
        self.params
            .get_or_init(|| {
                let Some(graph) = self.owner.upgrade() else {
                    return Vec::new();
                };
                let ctx = self.generic_context();
                let embedded = self.in_embedded_type();
                let resolver = graph.resolver();
                refs::materialize_params(&resolver, &ctx, &self.param_raws, embedded)
            })
            .clone()
    }

    /// Explicit interface implementation links, re-matched against the current view of the
    /// implemented interface. Entries whose interface member no longer exists with a
    /// matching signature are dropped.
    #[must_use]
    pub fn explicit_interface_implementations(&self) -> Vec<MethodSymbol> {
        self.explicit_impls
            .get_or_init(|| {
                let Some(graph) = self.owner.upgrade() else {
                    return Vec::new();
                };
                let param_types: Vec<TypeSymbol> = self
                    .parameters()
                    .iter()
                    .map(|param| param.ty().clone())
                    .collect();
                let return_type = self.return_type();
                let ctx = self.generic_context();
                refs::link_explicit_impls(
                    &graph.resolver(),
                    &ctx,
                    &self.explicit_impl_raws,
                    &param_types,
                    &return_type,
                )
            })
            .clone()
    }

    /// Resolved custom attribute applications.
    #[must_use]
    pub fn attributes(&self) -> Vec<AttributeData> {
        self.attributes
            .get_or_init(|| {
                let Some(graph) = self.owner.upgrade() else {
                    return Vec::new();
                };
                graph
                    .resolver()
                    .resolve_attributes(&self.attribute_raws, &self.generic_context())
            })
            .clone()
    }
}

/// A field definition realized into one symbol graph.
pub struct FieldDefSymbol {
    pub(crate) name: String,
    pub(crate) accessibility: Accessibility,
    pub(crate) flags: FieldAttributes,
    pub(crate) ty_ref: RawTypeRef,
    pub(crate) modifier_raws: Vec<RawModifier>,
    pub(crate) attribute_raws: Vec<RawAttribute>,
    pub(crate) owner: Weak<SymbolGraph>,
    pub(crate) containing: Weak<TypeDefSymbol>,
    pub(crate) ty: OnceLock<TypeSymbol>,
    pub(crate) modifiers: OnceLock<Vec<CustomModifier>>,
    pub(crate) attributes: OnceLock<Vec<AttributeData>>,
}

impl FieldDefSymbol {
    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared accessibility.
    #[must_use]
    pub fn accessibility(&self) -> Accessibility {
        self.accessibility
    }

    /// Attribute flags.
    #[must_use]
    pub fn flags(&self) -> FieldAttributes {
        self.flags
    }

    /// The containing type definition.
    #[must_use]
    pub fn containing_type(&self) -> Option<Arc<TypeDefSymbol>> {
        self.containing.upgrade()
    }

    fn generic_context(&self) -> GenericContext {
        match self.containing.upgrade() {
            Some(containing) => containing.generic_context(),
            None => GenericContext::empty(),
        }
    }

    fn in_embedded_type(&self) -> bool {
        self.containing
            .upgrade()
            .is_some_and(|containing| containing.is_embedded())
    }

    /// Resolved field type against the owning graph's reference set.
    #[must_use]
    pub fn ty(&self) -> TypeSymbol {
        self.ty
            .get_or_init(|| {
                let Some(graph) = self.owner.upgrade() else {
                    return unresolved_type();
                };
                graph.resolver().resolve_signature(
                    &self.ty_ref,
                    &self.generic_context(),
                    self.in_embedded_type(),
                )
            })
            .clone()
    }

    /// Resolved custom modifiers.
    #[must_use]
    pub fn custom_modifiers(&self) -> Vec<CustomModifier> {
        self.modifiers
            .get_or_init(|| {
                let Some(graph) = self.owner.upgrade() else {
                    return Vec::new();
                };
                graph
                    .resolver()
                    .resolve_modifiers(&self.modifier_raws, &self.generic_context())
            })
            .clone()
    }

    /// Resolved custom attribute applications.
    #[must_use]
    pub fn attributes(&self) -> Vec<AttributeData> {
        self.attributes
            .get_or_init(|| {
                let Some(graph) = self.owner.upgrade() else {
                    return Vec::new();
                };
                graph
                    .resolver()
                    .resolve_attributes(&self.attribute_raws, &self.generic_context())
            })
            .clone()
    }
}

/// A property definition realized into one symbol graph.
pub struct PropertyDefSymbol {
    pub(crate) name: String,
    pub(crate) ty_ref: RawTypeRef,
    pub(crate) getter: Option<String>,
    pub(crate) setter: Option<String>,
    pub(crate) attribute_raws: Vec<RawAttribute>,
    pub(crate) owner: Weak<SymbolGraph>,
    pub(crate) containing: Weak<TypeDefSymbol>,
    pub(crate) ty: OnceLock<TypeSymbol>,
    pub(crate) attributes: OnceLock<Vec<AttributeData>>,
}

impl PropertyDefSymbol {
    /// Property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the getter method, when present.
    #[must_use]
    pub fn getter_name(&self) -> Option<&str> {
        self.getter.as_deref()
    }

    /// Name of the setter method, when present.
    #[must_use]
    pub fn setter_name(&self) -> Option<&str> {
        self.setter.as_deref()
    }

    /// The containing type definition.
    #[must_use]
    pub fn containing_type(&self) -> Option<Arc<TypeDefSymbol>> {
        self.containing.upgrade()
    }

    fn generic_context(&self) -> GenericContext {
        match self.containing.upgrade() {
            Some(containing) => containing.generic_context(),
            None => GenericContext::empty(),
        }
    }

    /// Resolved property type against the owning graph's reference set.
    #[must_use]
    pub fn ty(&self) -> TypeSymbol {
        self.ty
            .get_or_init(|| {
                let Some(graph) = self.owner.upgrade() else {
                    return unresolved_type();
                };
                let embedded = self
                    .containing
                    .upgrade()
                    .is_some_and(|containing| containing.is_embedded());
                graph
                    .resolver()
                    .resolve_signature(&self.ty_ref, &self.generic_context(), embedded)
            })
            .clone()
    }

    /// Resolved custom attribute applications.
    #[must_use]
    pub fn attributes(&self) -> Vec<AttributeData> {
        self.attributes
            .get_or_init(|| {
                let Some(graph) = self.owner.upgrade() else {
                    return Vec::new();
                };
                graph
                    .resolver()
                    .resolve_attributes(&self.attribute_raws, &self.generic_context())
            })
            .clone()
    }
}

/// An event definition realized into one symbol graph.
pub struct EventDefSymbol {
    pub(crate) name: String,
    pub(crate) ty_ref: RawTypeRef,
    pub(crate) attribute_raws: Vec<RawAttribute>,
    pub(crate) owner: Weak<SymbolGraph>,
    pub(crate) containing: Weak<TypeDefSymbol>,
    pub(crate) ty: OnceLock<TypeSymbol>,
    pub(crate) attributes: OnceLock<Vec<AttributeData>>,
}

impl EventDefSymbol {
    /// Event name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The containing type definition.
    #[must_use]
    pub fn containing_type(&self) -> Option<Arc<TypeDefSymbol>> {
        self.containing.upgrade()
    }

    fn generic_context(&self) -> GenericContext {
        match self.containing.upgrade() {
            Some(containing) => containing.generic_context(),
            None => GenericContext::empty(),
        }
    }

    /// Resolved delegate type against the owning graph's reference set.
    #[must_use]
    pub fn ty(&self) -> TypeSymbol {
        self.ty
            .get_or_init(|| {
                let Some(graph) = self.owner.upgrade() else {
                    return unresolved_type();
                };
                let embedded = self
                    .containing
                    .upgrade()
                    .is_some_and(|containing| containing.is_embedded());
                graph
                    .resolver()
                    .resolve_signature(&self.ty_ref, &self.generic_context(), embedded)
            })
            .clone()
    }

    /// Resolved custom attribute applications.
    #[must_use]
    pub fn attributes(&self) -> Vec<AttributeData> {
        self.attributes
            .get_or_init(|| {
                let Some(graph) = self.owner.upgrade() else {
                    return Vec::new();
                };
                graph
                    .resolver()
                    .resolve_attributes(&self.attribute_raws, &self.generic_context())
            })
            .clone()
    }
}

/// A method as seen by a consumer.
#[derive(Clone)]
pub enum MethodSymbol {
    /// The declared method.
    Definition(Arc<MethodDefSymbol>),
    /// The method viewed through another assembly's reference set.
    Retargeted(Arc<Retargeted<MethodDefSymbol>>),
}

impl MethodSymbol {
    /// Method name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            MethodSymbol::Definition(def) => def.name().to_string(),
            MethodSymbol::Retargeted(retargeted) => retargeted.underlying().name().to_string(),
        }
    }

    /// Attribute flags (pass-through).
    #[must_use]
    pub fn flags(&self) -> MethodAttributes {
        match self {
            MethodSymbol::Definition(def) => def.flags(),
            MethodSymbol::Retargeted(retargeted) => retargeted.underlying().flags(),
        }
    }

    /// Declared accessibility (pass-through).
    #[must_use]
    pub fn accessibility(&self) -> Accessibility {
        match self {
            MethodSymbol::Definition(def) => def.accessibility(),
            MethodSymbol::Retargeted(retargeted) => retargeted.underlying().accessibility(),
        }
    }

    /// The containing type, wrapped for the viewing assembly.
    #[must_use]
    pub fn containing_type(&self) -> Option<NamedType> {
        match self {
            MethodSymbol::Definition(def) => def.containing_type().map(NamedType::Definition),
            MethodSymbol::Retargeted(retargeted) => {
                let owner = retargeted.owner()?;
                retargeted
                    .underlying()
                    .containing_type()
                    .map(|containing| NamedType::Retargeted(owner.retarget_type(&containing)))
            }
        }
    }

    /// Resolved return type, through the viewing assembly's reference set.
    #[must_use]
    pub fn return_type(&self) -> TypeSymbol {
        match self {
            MethodSymbol::Definition(def) => def.return_type(),
            MethodSymbol::Retargeted(retargeted) => retargeted.return_type(),
        }
    }

    /// Resolved parameters, through the viewing assembly's reference set.
    #[must_use]
    pub fn parameters(&self) -> Vec<Arc<ParameterSymbol>> {
        match self {
            MethodSymbol::Definition(def) => def.parameters(),
            MethodSymbol::Retargeted(retargeted) => retargeted.parameters(),
        }
    }

    /// Resolved parameter types, in signature order.
    #[must_use]
    pub fn parameter_types(&self) -> Vec<TypeSymbol> {
        self.parameters()
            .iter()
            .map(|param| param.ty().clone())
            .collect()
    }

    /// Explicit interface implementation links, re-matched against the current view of the
    /// implemented interface.
    #[must_use]
    pub fn explicit_interface_implementations(&self) -> Vec<MethodSymbol> {
        match self {
            MethodSymbol::Definition(def) => def.explicit_interface_implementations(),
            MethodSymbol::Retargeted(retargeted) => retargeted.explicit_interface_implementations(),
        }
    }

    /// Resolved custom attribute applications.
    #[must_use]
    pub fn attributes(&self) -> Vec<AttributeData> {
        match self {
            MethodSymbol::Definition(def) => def.attributes(),
            MethodSymbol::Retargeted(retargeted) => retargeted.attributes(),
        }
    }

    /// Generic parameters, wrapped for the viewing assembly.
    #[must_use]
    pub fn type_parameters(&self) -> Vec<TypeParameter> {
        match self {
            MethodSymbol::Definition(def) => def.type_parameters(),
            MethodSymbol::Retargeted(retargeted) => retargeted.method_type_parameters(),
        }
    }

    /// Symbol-identity comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &MethodSymbol) -> bool {
        match (self, other) {
            (MethodSymbol::Definition(a), MethodSymbol::Definition(b)) => Arc::ptr_eq(a, b),
            (MethodSymbol::Retargeted(a), MethodSymbol::Retargeted(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Whether `self` has the same name and full resolved signature as the given shape.
    pub(crate) fn signature_matches(
        &self,
        name: &str,
        param_types: &[TypeSymbol],
        return_type: &TypeSymbol,
    ) -> bool {
        if self.name() != name {
            return false;
        }
        let own_params = self.parameter_types();
        own_params.len() == param_types.len()
            && own_params.iter().zip(param_types).all(|(a, b)| a == b)
            && &self.return_type() == return_type
    }
}

impl PartialEq for MethodSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// A field as seen by a consumer.
#[derive(Clone)]
pub enum FieldSymbol {
    /// The declared field.
    Definition(Arc<FieldDefSymbol>),
    /// The field viewed through another assembly's reference set.
    Retargeted(Arc<Retargeted<FieldDefSymbol>>),
}

impl FieldSymbol {
    /// Field name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            FieldSymbol::Definition(def) => def.name().to_string(),
            FieldSymbol::Retargeted(retargeted) => retargeted.underlying().name().to_string(),
        }
    }

    /// Attribute flags (pass-through).
    #[must_use]
    pub fn flags(&self) -> FieldAttributes {
        match self {
            FieldSymbol::Definition(def) => def.flags(),
            FieldSymbol::Retargeted(retargeted) => retargeted.underlying().flags(),
        }
    }

    /// Resolved field type, through the viewing assembly's reference set.
    #[must_use]
    pub fn ty(&self) -> TypeSymbol {
        match self {
            FieldSymbol::Definition(def) => def.ty(),
            FieldSymbol::Retargeted(retargeted) => retargeted.ty(),
        }
    }

    /// Resolved custom modifiers.
    #[must_use]
    pub fn custom_modifiers(&self) -> Vec<CustomModifier> {
        match self {
            FieldSymbol::Definition(def) => def.custom_modifiers(),
            FieldSymbol::Retargeted(retargeted) => retargeted.custom_modifiers(),
        }
    }

    /// Resolved custom attribute applications.
    #[must_use]
    pub fn attributes(&self) -> Vec<AttributeData> {
        match self {
            FieldSymbol::Definition(def) => def.attributes(),
            FieldSymbol::Retargeted(retargeted) => retargeted.attributes(),
        }
    }

    /// Symbol-identity comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &FieldSymbol) -> bool {
        match (self, other) {
            (FieldSymbol::Definition(a), FieldSymbol::Definition(b)) => Arc::ptr_eq(a, b),
            (FieldSymbol::Retargeted(a), FieldSymbol::Retargeted(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A property as seen by a consumer.
#[derive(Clone)]
pub enum PropertySymbol {
    /// The declared property.
    Definition(Arc<PropertyDefSymbol>),
    /// The property viewed through another assembly's reference set.
    Retargeted(Arc<Retargeted<PropertyDefSymbol>>),
}

impl PropertySymbol {
    /// Property name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            PropertySymbol::Definition(def) => def.name().to_string(),
            PropertySymbol::Retargeted(retargeted) => retargeted.underlying().name().to_string(),
        }
    }

    /// Resolved property type, through the viewing assembly's reference set.
    #[must_use]
    pub fn ty(&self) -> TypeSymbol {
        match self {
            PropertySymbol::Definition(def) => def.ty(),
            PropertySymbol::Retargeted(retargeted) => retargeted.ty(),
        }
    }

    fn accessor(&self, name: Option<&str>) -> Option<MethodSymbol> {
        let name = name?;
        let containing = match self {
            PropertySymbol::Definition(def) => {
                NamedType::Definition(def.containing_type()?)
            }
            PropertySymbol::Retargeted(retargeted) => {
                let owner = retargeted.owner()?;
                NamedType::Retargeted(
                    owner.retarget_type(&retargeted.underlying().containing_type()?),
                )
            }
        };
        containing
            .methods()
            .into_iter()
            .find(|method| method.name() == name)
    }

    /// The getter accessor method, re-pointed for the viewing assembly.
    #[must_use]
    pub fn getter(&self) -> Option<MethodSymbol> {
        match self {
            PropertySymbol::Definition(def) => self.accessor(def.getter_name()),
            PropertySymbol::Retargeted(retargeted) => {
                self.accessor(retargeted.underlying().getter_name())
            }
        }
    }

    /// The setter accessor method, re-pointed for the viewing assembly.
    #[must_use]
    pub fn setter(&self) -> Option<MethodSymbol> {
        match self {
            PropertySymbol::Definition(def) => self.accessor(def.setter_name()),
            PropertySymbol::Retargeted(retargeted) => {
                self.accessor(retargeted.underlying().setter_name())
            }
        }
    }

    /// Resolved custom attribute applications.
    #[must_use]
    pub fn attributes(&self) -> Vec<AttributeData> {
        match self {
            PropertySymbol::Definition(def) => def.attributes(),
            PropertySymbol::Retargeted(retargeted) => retargeted.attributes(),
        }
    }

    /// Symbol-identity comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &PropertySymbol) -> bool {
        match (self, other) {
            (PropertySymbol::Definition(a), PropertySymbol::Definition(b)) => Arc::ptr_eq(a, b),
            (PropertySymbol::Retargeted(a), PropertySymbol::Retargeted(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// An event as seen by a consumer.
#[derive(Clone)]
pub enum EventSymbol {
    /// The declared event.
    Definition(Arc<EventDefSymbol>),
    /// The event viewed through another assembly's reference set.
    Retargeted(Arc<Retargeted<EventDefSymbol>>),
}

impl EventSymbol {
    /// Event name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            EventSymbol::Definition(def) => def.name().to_string(),
            EventSymbol::Retargeted(retargeted) => retargeted.underlying().name().to_string(),
        }
    }

    /// Resolved delegate type, through the viewing assembly's reference set.
    #[must_use]
    pub fn ty(&self) -> TypeSymbol {
        match self {
            EventSymbol::Definition(def) => def.ty(),
            EventSymbol::Retargeted(retargeted) => retargeted.ty(),
        }
    }

    /// Resolved custom attribute applications.
    #[must_use]
    pub fn attributes(&self) -> Vec<AttributeData> {
        match self {
            EventSymbol::Definition(def) => def.attributes(),
            EventSymbol::Retargeted(retargeted) => retargeted.attributes(),
        }
    }

    /// Symbol-identity comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &EventSymbol) -> bool {
        match (self, other) {
            (EventSymbol::Definition(a), EventSymbol::Definition(b)) => Arc::ptr_eq(a, b),
            (EventSymbol::Retargeted(a), EventSymbol::Retargeted(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
