//! Named type symbols and structural type references.
//!
//! Three layers live here:
//!
//! - [`TypeDefSymbol`]: a type *definition* realized from raw metadata into one specific
//!   [`crate::graph::SymbolGraph`]. Definitions are `Arc`-held and reference-comparable;
//!   the same descriptor realized into two graphs yields two distinct definitions.
//! - [`NamedType`]: a kind-erased handle over the three ways a named type reaches a
//!   consumer - as a plain definition, as a retargeted wrapper presenting a definition
//!   through another assembly's reference set, or as a typed error placeholder.
//! - [`TypeSymbol`]: a structural type value as it appears in signatures - a named type,
//!   a closed generic instantiation, an array, a pointer, or a generic parameter
//!   reference.
//!
//! Error placeholders are first-class citizens: resolution never throws for a missing or
//! ambiguous type, it substitutes an [`ErrorType`]-carrying symbol that downstream layers
//! can branch on while the rest of the graph stays usable.

use std::sync::{Arc, OnceLock, Weak};

use uguid::Guid;

use crate::{
    graph::SymbolGraph,
    metadata::{
        identity::AssemblyIdentity,
        marker::TypeIdentifier,
        provider::{
            metadata_type_name, Accessibility, RawAttribute, RawTypeRef, TypeAttributes,
        },
    },
    resolve::refs::GenericContext,
    retarget::Retargeted,
    symbols::{
        attributes::AttributeData,
        members::{
            EventDefSymbol, EventSymbol, FieldDefSymbol, FieldSymbol, MethodDefSymbol,
            MethodSymbol, PropertyDefSymbol, PropertySymbol, TypeParameter, TypeParameterSymbol,
        },
        SpecialType,
    },
};

/// Reference to a type definition symbol.
pub type TypeDefRc = Arc<TypeDefSymbol>;

/// Classification of a named type symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// An ordinary class
    Class,
    /// An interface
    Interface,
    /// A value type
    Struct,
    /// An enumeration
    Enum,
    /// A delegate
    Delegate,
    /// A typed error placeholder
    Error,
}

/// A type definition realized into one symbol graph.
///
/// Structure (members, nesting, names) is materialized eagerly at graph construction;
/// everything type-valued (base, interfaces, attribute data) is resolved lazily against the
/// owning graph's reference set and memoized.
pub struct TypeDefSymbol {
    pub(crate) name: String,
    pub(crate) namespace: String,
    pub(crate) arity: u16,
    pub(crate) kind: TypeKind,
    pub(crate) accessibility: Accessibility,
    pub(crate) flags: TypeAttributes,
    pub(crate) guid: Option<Guid>,
    pub(crate) type_identifier: Option<TypeIdentifier>,
    pub(crate) special: Option<SpecialType>,
    pub(crate) base_ref: Option<RawTypeRef>,
    pub(crate) enum_underlying_kind: Option<SpecialType>,
    pub(crate) interface_refs: Vec<RawTypeRef>,
    pub(crate) attribute_raws: Vec<RawAttribute>,
    pub(crate) owner: Weak<SymbolGraph>,
    pub(crate) containing: Option<Weak<TypeDefSymbol>>,
    pub(crate) type_params: boxcar::Vec<Arc<TypeParameterSymbol>>,
    pub(crate) nested: boxcar::Vec<TypeDefRc>,
    pub(crate) fields: boxcar::Vec<Arc<FieldDefSymbol>>,
    pub(crate) methods: boxcar::Vec<Arc<MethodDefSymbol>>,
    pub(crate) properties: boxcar::Vec<Arc<PropertyDefSymbol>>,
    pub(crate) events: boxcar::Vec<Arc<EventDefSymbol>>,
    pub(crate) base: OnceLock<Option<TypeSymbol>>,
    pub(crate) interfaces: OnceLock<Vec<TypeSymbol>>,
    pub(crate) enum_underlying: OnceLock<Option<TypeSymbol>>,
    pub(crate) attributes: OnceLock<Vec<AttributeData>>,
}

impl TypeDefSymbol {
    /// Simple name without the arity suffix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declaring namespace; empty for nested types.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Number of generic parameters.
    #[must_use]
    pub fn arity(&self) -> u16 {
        self.arity
    }

    /// The metadata name including the arity suffix.
    #[must_use]
    pub fn metadata_name(&self) -> String {
        metadata_type_name(&self.name, self.arity)
    }

    /// The namespace-qualified metadata name used for top-level lookups.
    #[must_use]
    pub fn qualified_metadata_name(&self) -> String {
        if self.namespace.is_empty() {
            self.metadata_name()
        } else {
            format!("{}.{}", self.namespace, self.metadata_name())
        }
    }

    /// Fully qualified display name, descending through containing types.
    #[must_use]
    pub fn full_name(&self) -> String {
        if let Some(containing) = self.containing_type() {
            format!("{}.{}", containing.full_name(), self.name)
        } else if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Definition kind.
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Declared accessibility.
    #[must_use]
    pub fn accessibility(&self) -> Accessibility {
        self.accessibility
    }

    /// Attribute flags.
    #[must_use]
    pub fn flags(&self) -> TypeAttributes {
        self.flags
    }

    /// The special type this definition stands for, when it is one of the predefined
    /// `System` types.
    #[must_use]
    pub fn special(&self) -> Option<SpecialType> {
        self.special
    }

    /// The type's own interop GUID attribute.
    #[must_use]
    pub fn guid(&self) -> Option<Guid> {
        self.guid
    }

    /// The embedded interop identity marker, when this is a locally embedded copy.
    #[must_use]
    pub fn type_identifier(&self) -> Option<&TypeIdentifier> {
        self.type_identifier.as_ref()
    }

    /// Whether this definition is a locally embedded interop copy.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.type_identifier.is_some()
    }

    /// The graph this definition was realized into.
    #[must_use]
    pub fn owner_graph(&self) -> Option<Arc<SymbolGraph>> {
        self.owner.upgrade()
    }

    /// The containing type for nested definitions.
    #[must_use]
    pub fn containing_type(&self) -> Option<TypeDefRc> {
        self.containing.as_ref().and_then(Weak::upgrade)
    }

    /// Generic parameters declared by this type.
    #[must_use]
    pub fn type_parameters(&self) -> Vec<TypeParameter> {
        self.type_params
            .iter()
            .map(|(_, param)| TypeParameter::Definition(param.clone()))
            .collect()
    }

    /// Visible nested types, excluding embedded interop copies.
    #[must_use]
    pub fn nested_types(&self) -> Vec<NamedType> {
        self.nested
            .iter()
            .filter(|(_, nested)| !nested.is_embedded())
            .map(|(_, nested)| NamedType::Definition(nested.clone()))
            .collect()
    }

    /// Look up any nested definition by metadata name, embedded copies included.
    pub(crate) fn nested_any(&self, metadata_name: &str) -> Option<TypeDefRc> {
        self.nested
            .iter()
            .find(|(_, nested)| nested.metadata_name() == metadata_name)
            .map(|(_, nested)| nested.clone())
    }

    /// Field definitions.
    #[must_use]
    pub fn field_defs(&self) -> Vec<Arc<FieldDefSymbol>> {
        self.fields.iter().map(|(_, field)| field.clone()).collect()
    }

    /// Method definitions.
    #[must_use]
    pub fn method_defs(&self) -> Vec<Arc<MethodDefSymbol>> {
        self.methods.iter().map(|(_, method)| method.clone()).collect()
    }

    /// Property definitions.
    #[must_use]
    pub fn property_defs(&self) -> Vec<Arc<PropertyDefSymbol>> {
        self.properties.iter().map(|(_, property)| property.clone()).collect()
    }

    /// Event definitions.
    #[must_use]
    pub fn event_defs(&self) -> Vec<Arc<EventDefSymbol>> {
        self.events.iter().map(|(_, event)| event.clone()).collect()
    }

    pub(crate) fn generic_context(&self) -> GenericContext {
        GenericContext::for_type(self.type_parameters())
    }

    /// The resolved base type, against the owning graph's reference set.
    #[must_use]
    pub fn base(&self) -> Option<TypeSymbol> {
        self.base
            .get_or_init(|| {
                let graph = self.owner.upgrade()?;
                let base_ref = self.base_ref.as_ref()?;
                Some(graph.resolver().resolve(base_ref, &self.generic_context()))
            })
            .clone()
    }

    /// The resolved implemented interfaces.
    #[must_use]
    pub fn interfaces(&self) -> Vec<TypeSymbol> {
        self.interfaces
            .get_or_init(|| {
                let Some(graph) = self.owner.upgrade() else {
                    return Vec::new();
                };
                let ctx = self.generic_context();
                self.interface_refs
                    .iter()
                    .map(|interface| graph.resolver().resolve(interface, &ctx))
                    .collect()
            })
            .clone()
    }

    /// The resolved enum underlying type. The special-type tag is preserved even when the
    /// corlib is absent, so an `Int16`-backed enum stays recognizable through an error
    /// placeholder.
    #[must_use]
    pub fn enum_underlying(&self) -> Option<TypeSymbol> {
        self.enum_underlying
            .get_or_init(|| {
                let graph = self.owner.upgrade()?;
                let kind = self.enum_underlying_kind?;
                Some(graph.resolver().resolve_primitive(kind))
            })
            .clone()
    }

    /// The resolved custom attribute applications.
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

/// Typed error placeholders substituted for unresolvable types.
///
/// Each variant carries what a diagnostic needs; none of them abort resolution of sibling
/// symbols.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorType {
    /// An ordinary missing type: no graph in the reference set defines it. The special-type
    /// tag is preserved when derivable so callers can still reason about the intent.
    MissingType {
        /// Identity of the assembly expected to define the type, when known.
        assembly: Option<AssemblyIdentity>,
        /// Fully qualified name of the missing type.
        full_name: String,
        /// Preserved predefined-type tag, when the reference named one.
        special: Option<SpecialType>,
    },
    /// No referenced assembly supplies a canonical definition for an embedded interop type.
    MissingCanonicalType {
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
    /// Two or more referenced assemblies supply a canonical definition. The first two
    /// candidates in reference order are retained.
    AmbiguousCanonicalType {
        /// Identity of the embedding assembly.
        embedding: AssemblyIdentity,
        /// First matching candidate in reference order.
        first: NamedType,
        /// Second matching candidate in reference order.
        second: NamedType,
    },
    /// An embedded interop type participates in a closed generic instantiation, which would
    /// make canonical identity comparison ill-defined.
    IllegalGenericInstantiation {
        /// Display of the offending instantiation, rendered from the unretargeted reference.
        display: String,
    },
    /// A nested embedded type whose enclosing type did not resolve to a genuine canonical
    /// definition; identity cannot even be determined.
    UnsupportedMetadataType {
        /// Display of the unreadable reference.
        display: String,
    },
    /// A generic type referenced from an interop-embedded signature position; such types
    /// cannot be embedded.
    EmbeddedGeneric {
        /// Display of the generic type that blocked embedding.
        display: String,
    },
}

impl ErrorType {
    /// Wrap this error as a structural type symbol.
    #[must_use]
    pub fn into_symbol(self) -> TypeSymbol {
        TypeSymbol::Named(NamedType::Error(Arc::new(ErrorTypeSymbol::new(self))))
    }
}

/// A named type symbol whose resolution failed, carrying the concrete [`ErrorType`].
#[derive(Debug)]
pub struct ErrorTypeSymbol {
    error: ErrorType,
    full_name: String,
    special: Option<SpecialType>,
}

impl ErrorTypeSymbol {
    /// Wrap an error, deriving the display name and preserved special-type tag.
    #[must_use]
    pub fn new(error: ErrorType) -> Self {
        let (full_name, special) = match &error {
            ErrorType::MissingType {
                full_name, special, ..
            } => (full_name.clone(), *special),
            ErrorType::MissingCanonicalType { full_name, .. } => (full_name.clone(), None),
            ErrorType::AmbiguousCanonicalType { first, .. } => (first.full_name(), None),
            ErrorType::IllegalGenericInstantiation { display }
            | ErrorType::UnsupportedMetadataType { display }
            | ErrorType::EmbeddedGeneric { display } => (display.clone(), None),
        };
        ErrorTypeSymbol {
            error,
            full_name,
            special,
        }
    }

    /// The concrete error.
    #[must_use]
    pub fn error(&self) -> &ErrorType {
        &self.error
    }

    /// Display name of the unresolved type.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Preserved predefined-type tag, when derivable.
    #[must_use]
    pub fn special(&self) -> Option<SpecialType> {
        self.special
    }
}

/// A named type as seen by a consumer: a definition, a retargeted view of a definition, or a
/// typed error placeholder.
///
/// Handles are cheap to clone. Identity comparison (`==`) is by symbol identity for
/// definitions and retargeted wrappers, and by error content for placeholders.
#[derive(Clone)]
pub enum NamedType {
    /// A definition in some symbol graph.
    Definition(TypeDefRc),
    /// A definition viewed through another assembly's reference set.
    Retargeted(Arc<Retargeted<TypeDefSymbol>>),
    /// A typed error placeholder.
    Error(Arc<ErrorTypeSymbol>),
}

impl NamedType {
    /// Simple name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            NamedType::Definition(def) => def.name().to_string(),
            NamedType::Retargeted(retargeted) => retargeted.underlying().name().to_string(),
            NamedType::Error(error) => error
                .full_name()
                .rsplit('.')
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Fully qualified display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            NamedType::Definition(def) => def.full_name(),
            NamedType::Retargeted(retargeted) => retargeted.underlying().full_name(),
            NamedType::Error(error) => error.full_name().to_string(),
        }
    }

    /// Metadata name including the arity suffix.
    #[must_use]
    pub fn metadata_name(&self) -> String {
        match self {
            NamedType::Definition(def) => def.metadata_name(),
            NamedType::Retargeted(retargeted) => retargeted.underlying().metadata_name(),
            NamedType::Error(error) => error.full_name().to_string(),
        }
    }

    /// Generic arity.
    #[must_use]
    pub fn arity(&self) -> u16 {
        match self {
            NamedType::Definition(def) => def.arity(),
            NamedType::Retargeted(retargeted) => retargeted.underlying().arity(),
            NamedType::Error(_) => 0,
        }
    }

    /// Type kind; [`TypeKind::Error`] for placeholders.
    #[must_use]
    pub fn type_kind(&self) -> TypeKind {
        match self {
            NamedType::Definition(def) => def.kind(),
            NamedType::Retargeted(retargeted) => retargeted.underlying().kind(),
            NamedType::Error(_) => TypeKind::Error,
        }
    }

    /// Predefined-type tag, preserved on error placeholders when derivable.
    #[must_use]
    pub fn special(&self) -> Option<SpecialType> {
        match self {
            NamedType::Definition(def) => def.special(),
            NamedType::Retargeted(retargeted) => retargeted.underlying().special(),
            NamedType::Error(error) => error.special(),
        }
    }

    /// Whether this is an error placeholder.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, NamedType::Error(_))
    }

    /// The concrete error, for placeholders.
    #[must_use]
    pub fn error(&self) -> Option<&ErrorType> {
        match self {
            NamedType::Error(error) => Some(error.error()),
            _ => None,
        }
    }

    /// Whether the symbol is (a view of) a locally embedded interop copy.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.definition().is_some_and(|def| def.is_embedded())
    }

    /// The type's own interop GUID attribute.
    #[must_use]
    pub fn guid(&self) -> Option<Guid> {
        self.definition().and_then(|def| def.guid())
    }

    /// Identity of the assembly owning the underlying definition.
    #[must_use]
    pub fn assembly_identity(&self) -> Option<AssemblyIdentity> {
        self.definition()
            .and_then(|def| def.owner_graph())
            .map(|graph| graph.identity().clone())
    }

    /// GUID of the assembly owning the underlying definition.
    #[must_use]
    pub fn assembly_guid(&self) -> Option<Guid> {
        self.definition()
            .and_then(|def| def.owner_graph())
            .and_then(|graph| graph.assembly_guid())
    }

    /// The underlying definition, when there is one.
    #[must_use]
    pub fn definition(&self) -> Option<&TypeDefRc> {
        match self {
            NamedType::Definition(def) => Some(def),
            NamedType::Retargeted(retargeted) => Some(retargeted.underlying()),
            NamedType::Error(_) => None,
        }
    }

    /// Resolved base type, through the viewing assembly's reference set.
    #[must_use]
    pub fn base(&self) -> Option<TypeSymbol> {
        match self {
            NamedType::Definition(def) => def.base(),
            NamedType::Retargeted(retargeted) => retargeted.base(),
            NamedType::Error(_) => None,
        }
    }

    /// Resolved implemented interfaces, through the viewing assembly's reference set.
    #[must_use]
    pub fn interfaces(&self) -> Vec<TypeSymbol> {
        match self {
            NamedType::Definition(def) => def.interfaces(),
            NamedType::Retargeted(retargeted) => retargeted.interfaces(),
            NamedType::Error(_) => Vec::new(),
        }
    }

    /// Resolved enum underlying type, with the special tag preserved on failure.
    #[must_use]
    pub fn enum_underlying(&self) -> Option<TypeSymbol> {
        match self {
            NamedType::Definition(def) => def.enum_underlying(),
            NamedType::Retargeted(retargeted) => retargeted.enum_underlying(),
            NamedType::Error(_) => None,
        }
    }

    /// Resolved custom attribute applications.
    #[must_use]
    pub fn attributes(&self) -> Vec<AttributeData> {
        match self {
            NamedType::Definition(def) => def.attributes(),
            NamedType::Retargeted(retargeted) => retargeted.attributes(),
            NamedType::Error(_) => Vec::new(),
        }
    }

    /// Generic parameters.
    #[must_use]
    pub fn type_parameters(&self) -> Vec<TypeParameter> {
        match self {
            NamedType::Definition(def) => def.type_parameters(),
            NamedType::Retargeted(retargeted) => retargeted.type_parameters(),
            NamedType::Error(_) => Vec::new(),
        }
    }

    /// Method symbols, wrapped for the viewing assembly.
    #[must_use]
    pub fn methods(&self) -> Vec<MethodSymbol> {
        match self {
            NamedType::Definition(def) => def
                .method_defs()
                .into_iter()
                .map(MethodSymbol::Definition)
                .collect(),
            NamedType::Retargeted(retargeted) => retargeted.methods(),
            NamedType::Error(_) => Vec::new(),
        }
    }

    /// Field symbols, wrapped for the viewing assembly.
    #[must_use]
    pub fn fields(&self) -> Vec<FieldSymbol> {
        match self {
            NamedType::Definition(def) => def
                .field_defs()
                .into_iter()
                .map(FieldSymbol::Definition)
                .collect(),
            NamedType::Retargeted(retargeted) => retargeted.fields(),
            NamedType::Error(_) => Vec::new(),
        }
    }

    /// Property symbols, wrapped for the viewing assembly.
    #[must_use]
    pub fn properties(&self) -> Vec<PropertySymbol> {
        match self {
            NamedType::Definition(def) => def
                .property_defs()
                .into_iter()
                .map(PropertySymbol::Definition)
                .collect(),
            NamedType::Retargeted(retargeted) => retargeted.properties(),
            NamedType::Error(_) => Vec::new(),
        }
    }

    /// Event symbols, wrapped for the viewing assembly.
    #[must_use]
    pub fn events(&self) -> Vec<EventSymbol> {
        match self {
            NamedType::Definition(def) => def
                .event_defs()
                .into_iter()
                .map(EventSymbol::Definition)
                .collect(),
            NamedType::Retargeted(retargeted) => retargeted.events(),
            NamedType::Error(_) => Vec::new(),
        }
    }

    /// Visible nested types, wrapped for the viewing assembly.
    #[must_use]
    pub fn nested_types(&self) -> Vec<NamedType> {
        match self {
            NamedType::Definition(def) => def.nested_types(),
            NamedType::Retargeted(retargeted) => retargeted.nested_types(),
            NamedType::Error(_) => Vec::new(),
        }
    }

    /// Visible nested types matching the given simple name.
    #[must_use]
    pub fn get_type_members(&self, name: &str) -> Vec<NamedType> {
        self.nested_types()
            .into_iter()
            .filter(|nested| nested.name() == name)
            .collect()
    }

    /// Look up a visible nested type by metadata name, keeping the viewing wrap.
    #[must_use]
    pub fn lookup_nested(&self, metadata_name: &str) -> Option<NamedType> {
        match self {
            NamedType::Definition(def) => def
                .nested_any(metadata_name)
                .filter(|nested| !nested.is_embedded())
                .map(NamedType::Definition),
            NamedType::Retargeted(retargeted) => {
                let owner = retargeted.owner()?;
                retargeted
                    .underlying()
                    .nested_any(metadata_name)
                    .filter(|nested| !nested.is_embedded())
                    .map(|nested| NamedType::Retargeted(owner.retarget_type(&nested)))
            }
            NamedType::Error(_) => None,
        }
    }

    /// Symbol-identity comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &NamedType) -> bool {
        match (self, other) {
            (NamedType::Definition(a), NamedType::Definition(b)) => Arc::ptr_eq(a, b),
            (NamedType::Retargeted(a), NamedType::Retargeted(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for NamedType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NamedType::Error(a), NamedType::Error(b)) => a.error() == b.error(),
            _ => self.ptr_eq(other),
        }
    }
}

impl std::fmt::Debug for NamedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NamedType::Definition(_) => write!(f, "Definition({})", self.full_name()),
            NamedType::Retargeted(_) => write!(f, "Retargeted({})", self.full_name()),
            NamedType::Error(error) => write!(f, "Error({:?})", error.error()),
        }
    }
}

/// A closed generic instantiation.
#[derive(Debug, PartialEq)]
pub struct GenericInstantiation {
    /// The generic definition being instantiated.
    pub definition: NamedType,
    /// Type arguments, in declaration order.
    pub args: Vec<TypeSymbol>,
}

/// An array type.
#[derive(Debug, PartialEq)]
pub struct ArrayType {
    /// Element type.
    pub element: TypeSymbol,
    /// Array rank; 1 for single-dimensional arrays.
    pub rank: u8,
}

/// An unmanaged pointer type.
#[derive(Debug, PartialEq)]
pub struct PointerType {
    /// Pointee type.
    pub pointee: TypeSymbol,
}

/// A structural type value as it appears in signatures.
#[derive(Debug, Clone)]
pub enum TypeSymbol {
    /// A named type (definition, retargeted view, or error placeholder).
    Named(NamedType),
    /// A closed generic instantiation.
    Generic(Arc<GenericInstantiation>),
    /// An array type.
    Array(Arc<ArrayType>),
    /// A pointer type.
    Pointer(Arc<PointerType>),
    /// A reference to a generic parameter in scope.
    Parameter(TypeParameter),
}

impl TypeSymbol {
    /// The named type, when this is one.
    #[must_use]
    pub fn named(&self) -> Option<&NamedType> {
        match self {
            TypeSymbol::Named(named) => Some(named),
            _ => None,
        }
    }

    /// Whether this type (at the top level) is an error placeholder.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, TypeSymbol::Named(named) if named.is_error())
    }

    /// The concrete error, when this is an error placeholder.
    #[must_use]
    pub fn error(&self) -> Option<&ErrorType> {
        self.named().and_then(NamedType::error)
    }

    /// Predefined-type tag, preserved through error placeholders.
    #[must_use]
    pub fn special(&self) -> Option<SpecialType> {
        self.named().and_then(NamedType::special)
    }

    /// Type kind of the named head; arrays and pointers report their structural class.
    #[must_use]
    pub fn type_kind(&self) -> TypeKind {
        match self {
            TypeSymbol::Named(named) => named.type_kind(),
            TypeSymbol::Generic(instantiation) => instantiation.definition.type_kind(),
            TypeSymbol::Array(_) | TypeSymbol::Pointer(_) => TypeKind::Class,
            TypeSymbol::Parameter(_) => TypeKind::Class,
        }
    }
}

impl PartialEq for TypeSymbol {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeSymbol::Named(a), TypeSymbol::Named(b)) => a == b,
            (TypeSymbol::Generic(a), TypeSymbol::Generic(b)) => {
                a.definition == b.definition && a.args == b.args
            }
            (TypeSymbol::Array(a), TypeSymbol::Array(b)) => {
                a.rank == b.rank && a.element == b.element
            }
            (TypeSymbol::Pointer(a), TypeSymbol::Pointer(b)) => a.pointee == b.pointee,
            (TypeSymbol::Parameter(a), TypeSymbol::Parameter(b)) => {
                a.ordinal() == b.ordinal() && a.from_method() == b.from_method()
            }
            _ => false,
        }
    }
}
