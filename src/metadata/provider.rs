//! Raw metadata descriptors supplied by the external metadata provider.
//!
//! This engine does not read PE files. An external provider (a metadata reader, or a test
//! fixture) hands over one [`RawAssembly`] per metadata blob: the assembly identity, its
//! declared assembly references, an optional assembly GUID and the top-level type
//! definitions. Everything inside a raw descriptor is plain data - names, flags, constants
//! and *unresolved* type references ([`RawTypeRef`]) - with no symbol identity of its own.
//! Symbol identity is created later, when a descriptor is realized into a
//! [`crate::graph::SymbolGraph`] against a concrete reference set, and the same descriptor
//! realized against two different reference sets produces two independent symbol trees.
//!
//! # Key Types
//! - [`RawAssembly`] - one assembly's worth of descriptors, shared via `Arc`
//! - [`RawType`] - a type definition with members, nesting and interop markers
//! - [`RawTypeRef`] - an unresolved type reference (named, primitive, generic, array,
//!   pointer, type parameter, or modified)
//! - [`RawAttribute`] / [`RawConstant`] - custom attribute applications with typed constants
//!
//! Fluent builders are provided for fixtures:
//!
//! ```rust
//! use symres::metadata::identity::{AssemblyIdentity, AssemblyVersion};
//! use symres::metadata::provider::{RawAssembly, RawMethod, RawType, RawTypeRef};
//! use symres::symbols::SpecialType;
//!
//! let lib = RawAssembly::build(AssemblyIdentity::new("Lib", AssemblyVersion::new(1, 0, 0, 0)))
//!     .ty(RawType::class("Lib", "Helper")
//!         .base(RawTypeRef::primitive(SpecialType::Object))
//!         .method(RawMethod::new("Run", RawTypeRef::primitive(SpecialType::Void)).finish())
//!         .finish())
//!     .finish();
//! assert_eq!(lib.types.len(), 1);
//! ```

use std::{fmt, sync::Arc};

use bitflags::bitflags;
use uguid::Guid;

use crate::{
    metadata::{identity::AssemblyIdentity, marker::TypeIdentifier},
    symbols::SpecialType,
};

bitflags! {
    /// Type-level attribute flags carried through from metadata.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TypeAttributes: u32 {
        /// Type is abstract
        const ABSTRACT = 0x0080;
        /// Type is sealed
        const SEALED = 0x0100;
        /// Type has a special name
        const SPECIAL_NAME = 0x0400;
        /// Type is imported (ComImport)
        const IMPORT = 0x1000;
        /// Type is serializable
        const SERIALIZABLE = 0x2000;
    }
}

bitflags! {
    /// Method-level attribute flags carried through from metadata.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MethodAttributes: u16 {
        /// Method is static
        const STATIC = 0x0010;
        /// Method is final
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method is abstract
        const ABSTRACT = 0x0400;
        /// Method has a special name (accessors, operators, `.ctor`)
        const SPECIAL_NAME = 0x0800;
    }
}

bitflags! {
    /// Field-level attribute flags carried through from metadata.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FieldAttributes: u16 {
        /// Field is static
        const STATIC = 0x0010;
        /// Field is init-only (readonly)
        const INIT_ONLY = 0x0020;
        /// Field is a compile-time constant
        const LITERAL = 0x0040;
    }
}

/// Declared accessibility of a type or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accessibility {
    /// Visible everywhere
    #[default]
    Public,
    /// Visible within the declaring assembly
    Internal,
    /// Visible to derived types
    Protected,
    /// Visible within the declaring type
    Private,
}

/// Classification of a raw type definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTypeKind {
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
}

/// Compose a metadata type name from a simple name and generic arity (`Name` or ``Name`2``).
#[must_use]
pub fn metadata_type_name(name: &str, arity: u16) -> String {
    if arity == 0 {
        name.to_string()
    } else {
        format!("{name}`{arity}")
    }
}

/// One assembly's worth of raw metadata descriptors.
#[derive(Debug)]
pub struct RawAssembly {
    /// The identity declared in the assembly's own manifest.
    pub identity: AssemblyIdentity,
    /// The assembly-level GUID attribute, when present.
    pub guid: Option<Guid>,
    /// Identities of the directly referenced assemblies, in declaration order.
    pub references: Vec<AssemblyIdentity>,
    /// Top-level type definitions.
    pub types: Vec<RawType>,
}

impl RawAssembly {
    /// Start building a raw assembly for the given identity.
    #[must_use]
    pub fn build(identity: AssemblyIdentity) -> RawAssemblyBuilder {
        RawAssemblyBuilder {
            assembly: RawAssembly {
                identity,
                guid: None,
                references: Vec::new(),
                types: Vec::new(),
            },
        }
    }
}

/// Fluent builder for [`RawAssembly`] fixtures.
pub struct RawAssemblyBuilder {
    assembly: RawAssembly,
}

impl RawAssemblyBuilder {
    /// Set the assembly-level GUID attribute.
    #[must_use]
    pub fn guid(mut self, guid: Guid) -> Self {
        self.assembly.guid = Some(guid);
        self
    }

    /// Declare a direct assembly reference.
    #[must_use]
    pub fn reference(mut self, identity: AssemblyIdentity) -> Self {
        self.assembly.references.push(identity);
        self
    }

    /// Add a top-level type definition.
    #[must_use]
    pub fn ty(mut self, ty: RawType) -> Self {
        self.assembly.types.push(ty);
        self
    }

    /// Finish building, wrapping the descriptor for sharing.
    #[must_use]
    pub fn finish(self) -> Arc<RawAssembly> {
        Arc::new(self.assembly)
    }
}

/// A raw type definition.
#[derive(Debug, Clone)]
pub struct RawType {
    /// Declaring namespace, empty for the global namespace or nested types.
    pub namespace: String,
    /// Simple name without the arity suffix.
    pub name: String,
    /// Number of generic parameters.
    pub arity: u16,
    /// Definition kind.
    pub kind: RawTypeKind,
    /// Declared accessibility.
    pub accessibility: Accessibility,
    /// Attribute flags.
    pub flags: TypeAttributes,
    /// The type's own interop GUID attribute (interfaces/delegates).
    pub guid: Option<Guid>,
    /// Embedded interop identity marker; present exactly on locally embedded copies.
    pub type_identifier: Option<TypeIdentifier>,
    /// Base type reference, `None` for interfaces and `System.Object` itself.
    pub base: Option<RawTypeRef>,
    /// Underlying integral type for enums.
    pub enum_underlying: Option<SpecialType>,
    /// Implemented interfaces.
    pub interfaces: Vec<RawTypeRef>,
    /// Generic parameter declarations.
    pub generic_params: Vec<RawGenericParam>,
    /// Field definitions.
    pub fields: Vec<RawField>,
    /// Method definitions.
    pub methods: Vec<RawMethod>,
    /// Property definitions.
    pub properties: Vec<RawProperty>,
    /// Event definitions.
    pub events: Vec<RawEvent>,
    /// Nested type definitions.
    pub nested: Vec<RawType>,
    /// Custom attribute applications.
    pub attributes: Vec<RawAttribute>,
}

impl RawType {
    fn new(namespace: &str, name: &str, kind: RawTypeKind) -> RawTypeBuilder {
        RawTypeBuilder {
            ty: RawType {
                namespace: namespace.to_string(),
                name: name.to_string(),
                arity: 0,
                kind,
                accessibility: Accessibility::Public,
                flags: TypeAttributes::default(),
                guid: None,
                type_identifier: None,
                base: None,
                enum_underlying: None,
                interfaces: Vec::new(),
                generic_params: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                properties: Vec::new(),
                events: Vec::new(),
                nested: Vec::new(),
                attributes: Vec::new(),
            },
        }
    }

    /// Start building a class definition.
    #[must_use]
    pub fn class(namespace: &str, name: &str) -> RawTypeBuilder {
        RawType::new(namespace, name, RawTypeKind::Class)
    }

    /// Start building an interface definition.
    #[must_use]
    pub fn interface(namespace: &str, name: &str) -> RawTypeBuilder {
        RawType::new(namespace, name, RawTypeKind::Interface)
    }

    /// Start building a struct definition.
    #[must_use]
    pub fn structure(namespace: &str, name: &str) -> RawTypeBuilder {
        RawType::new(namespace, name, RawTypeKind::Struct)
    }

    /// Start building an enum definition.
    #[must_use]
    pub fn enumeration(namespace: &str, name: &str) -> RawTypeBuilder {
        RawType::new(namespace, name, RawTypeKind::Enum)
    }

    /// Start building a delegate definition.
    #[must_use]
    pub fn delegate(namespace: &str, name: &str) -> RawTypeBuilder {
        RawType::new(namespace, name, RawTypeKind::Delegate)
    }

    /// The metadata name including the arity suffix.
    #[must_use]
    pub fn metadata_name(&self) -> String {
        metadata_type_name(&self.name, self.arity)
    }
}

/// Fluent builder for [`RawType`].
pub struct RawTypeBuilder {
    ty: RawType,
}

impl RawTypeBuilder {
    /// Set the generic arity.
    #[must_use]
    pub fn arity(mut self, arity: u16) -> Self {
        self.ty.arity = arity;
        self
    }

    /// Set the declared accessibility.
    #[must_use]
    pub fn accessibility(mut self, accessibility: Accessibility) -> Self {
        self.ty.accessibility = accessibility;
        self
    }

    /// Set the attribute flags.
    #[must_use]
    pub fn flags(mut self, flags: TypeAttributes) -> Self {
        self.ty.flags = flags;
        self
    }

    /// Set the type's own interop GUID.
    #[must_use]
    pub fn guid(mut self, guid: Guid) -> Self {
        self.ty.guid = Some(guid);
        self
    }

    /// Attach an embedded interop identity marker.
    #[must_use]
    pub fn identifier(mut self, identifier: TypeIdentifier) -> Self {
        self.ty.type_identifier = Some(identifier);
        self
    }

    /// Set the base type reference.
    #[must_use]
    pub fn base(mut self, base: RawTypeRef) -> Self {
        self.ty.base = Some(base);
        self
    }

    /// Set the underlying integral type (enums only).
    #[must_use]
    pub fn underlying(mut self, underlying: SpecialType) -> Self {
        self.ty.enum_underlying = Some(underlying);
        self
    }

    /// Declare an implemented interface.
    #[must_use]
    pub fn implements(mut self, interface: RawTypeRef) -> Self {
        self.ty.interfaces.push(interface);
        self
    }

    /// Declare a generic parameter.
    #[must_use]
    pub fn generic_param(mut self, name: &str) -> Self {
        self.ty.generic_params.push(RawGenericParam {
            name: name.to_string(),
            constraints: Vec::new(),
        });
        self.ty.arity = self.ty.generic_params.len() as u16;
        self
    }

    /// Declare a generic parameter with constraint types.
    #[must_use]
    pub fn generic_param_constrained(mut self, name: &str, constraints: Vec<RawTypeRef>) -> Self {
        self.ty.generic_params.push(RawGenericParam {
            name: name.to_string(),
            constraints,
        });
        self.ty.arity = self.ty.generic_params.len() as u16;
        self
    }

    /// Add a field definition.
    #[must_use]
    pub fn field(mut self, field: RawField) -> Self {
        self.ty.fields.push(field);
        self
    }

    /// Add a method definition.
    #[must_use]
    pub fn method(mut self, method: RawMethod) -> Self {
        self.ty.methods.push(method);
        self
    }

    /// Add a property definition.
    #[must_use]
    pub fn property(mut self, property: RawProperty) -> Self {
        self.ty.properties.push(property);
        self
    }

    /// Add an event definition.
    #[must_use]
    pub fn event(mut self, event: RawEvent) -> Self {
        self.ty.events.push(event);
        self
    }

    /// Add a nested type definition.
    #[must_use]
    pub fn nested(mut self, nested: RawType) -> Self {
        self.ty.nested.push(nested);
        self
    }

    /// Add a custom attribute application.
    #[must_use]
    pub fn attribute(mut self, attribute: RawAttribute) -> Self {
        self.ty.attributes.push(attribute);
        self
    }

    /// Finish building.
    #[must_use]
    pub fn finish(self) -> RawType {
        self.ty
    }
}

/// A generic parameter declaration.
#[derive(Debug, Clone)]
pub struct RawGenericParam {
    /// Parameter name (`T`, `TKey`, ...).
    pub name: String,
    /// Constraint type references.
    pub constraints: Vec<RawTypeRef>,
}

/// A method definition.
#[derive(Debug, Clone)]
pub struct RawMethod {
    /// Method name.
    pub name: String,
    /// Declared accessibility.
    pub accessibility: Accessibility,
    /// Attribute flags.
    pub flags: MethodAttributes,
    /// Return type reference.
    pub return_type: RawTypeRef,
    /// Parameter declarations, in signature order.
    pub params: Vec<RawParam>,
    /// Generic parameter declarations.
    pub generic_params: Vec<RawGenericParam>,
    /// Explicit interface implementation entries.
    pub explicit_impls: Vec<RawImplementedMember>,
    /// Custom attribute applications.
    pub attributes: Vec<RawAttribute>,
}

impl RawMethod {
    /// Start building a method with the given name and return type.
    #[must_use]
    pub fn new(name: &str, return_type: RawTypeRef) -> RawMethodBuilder {
        RawMethodBuilder {
            method: RawMethod {
                name: name.to_string(),
                accessibility: Accessibility::Public,
                flags: MethodAttributes::default(),
                return_type,
                params: Vec::new(),
                generic_params: Vec::new(),
                explicit_impls: Vec::new(),
                attributes: Vec::new(),
            },
        }
    }
}

/// Fluent builder for [`RawMethod`].
pub struct RawMethodBuilder {
    method: RawMethod,
}

impl RawMethodBuilder {
    /// Set the declared accessibility.
    #[must_use]
    pub fn accessibility(mut self, accessibility: Accessibility) -> Self {
        self.method.accessibility = accessibility;
        self
    }

    /// Set the attribute flags.
    #[must_use]
    pub fn flags(mut self, flags: MethodAttributes) -> Self {
        self.method.flags = flags;
        self
    }

    /// Add a parameter.
    #[must_use]
    pub fn param(mut self, name: &str, ty: RawTypeRef) -> Self {
        self.method.params.push(RawParam {
            name: name.to_string(),
            ty,
            modifiers: Vec::new(),
            attributes: Vec::new(),
        });
        self
    }

    /// Add a parameter carrying custom modifiers.
    #[must_use]
    pub fn param_modified(mut self, name: &str, ty: RawTypeRef, modifiers: Vec<RawModifier>) -> Self {
        self.method.params.push(RawParam {
            name: name.to_string(),
            ty,
            modifiers,
            attributes: Vec::new(),
        });
        self
    }

    /// Declare a generic parameter.
    #[must_use]
    pub fn generic_param(mut self, name: &str) -> Self {
        self.method.generic_params.push(RawGenericParam {
            name: name.to_string(),
            constraints: Vec::new(),
        });
        self
    }

    /// Record that this method explicitly implements `member` of `interface`.
    #[must_use]
    pub fn implements(mut self, interface: RawTypeRef, member: &str) -> Self {
        self.method.explicit_impls.push(RawImplementedMember {
            interface,
            member: member.to_string(),
        });
        self
    }

    /// Add a custom attribute application.
    #[must_use]
    pub fn attribute(mut self, attribute: RawAttribute) -> Self {
        self.method.attributes.push(attribute);
        self
    }

    /// Finish building.
    #[must_use]
    pub fn finish(self) -> RawMethod {
        self.method
    }
}

/// A parameter declaration.
#[derive(Debug, Clone)]
pub struct RawParam {
    /// Parameter name.
    pub name: String,
    /// Parameter type reference.
    pub ty: RawTypeRef,
    /// Custom modifiers applying to the parameter type.
    pub modifiers: Vec<RawModifier>,
    /// Custom attribute applications.
    pub attributes: Vec<RawAttribute>,
}

/// An explicit interface implementation entry on a method.
#[derive(Debug, Clone)]
pub struct RawImplementedMember {
    /// The interface whose member is implemented.
    pub interface: RawTypeRef,
    /// Name of the implemented interface member.
    pub member: String,
}

/// A field definition.
#[derive(Debug, Clone)]
pub struct RawField {
    /// Field name.
    pub name: String,
    /// Declared accessibility.
    pub accessibility: Accessibility,
    /// Attribute flags.
    pub flags: FieldAttributes,
    /// Field type reference.
    pub ty: RawTypeRef,
    /// Custom modifiers applying to the field type.
    pub modifiers: Vec<RawModifier>,
    /// Custom attribute applications.
    pub attributes: Vec<RawAttribute>,
}

impl RawField {
    /// Create a public instance field.
    #[must_use]
    pub fn new(name: &str, ty: RawTypeRef) -> Self {
        RawField {
            name: name.to_string(),
            accessibility: Accessibility::Public,
            flags: FieldAttributes::default(),
            ty,
            modifiers: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Attach custom modifiers to the field type.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Vec<RawModifier>) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A property definition.
#[derive(Debug, Clone)]
pub struct RawProperty {
    /// Property name.
    pub name: String,
    /// Property type reference.
    pub ty: RawTypeRef,
    /// Name of the getter method, when present.
    pub getter: Option<String>,
    /// Name of the setter method, when present.
    pub setter: Option<String>,
    /// Custom attribute applications.
    pub attributes: Vec<RawAttribute>,
}

impl RawProperty {
    /// Create a property with no accessors linked.
    #[must_use]
    pub fn new(name: &str, ty: RawTypeRef) -> Self {
        RawProperty {
            name: name.to_string(),
            ty,
            getter: None,
            setter: None,
            attributes: Vec::new(),
        }
    }

    /// Link the getter by method name.
    #[must_use]
    pub fn with_getter(mut self, getter: &str) -> Self {
        self.getter = Some(getter.to_string());
        self
    }

    /// Link the setter by method name.
    #[must_use]
    pub fn with_setter(mut self, setter: &str) -> Self {
        self.setter = Some(setter.to_string());
        self
    }
}

/// An event definition.
#[derive(Debug, Clone)]
pub struct RawEvent {
    /// Event name.
    pub name: String,
    /// Delegate type reference.
    pub ty: RawTypeRef,
    /// Custom attribute applications.
    pub attributes: Vec<RawAttribute>,
}

impl RawEvent {
    /// Create an event of the given delegate type.
    #[must_use]
    pub fn new(name: &str, ty: RawTypeRef) -> Self {
        RawEvent {
            name: name.to_string(),
            ty,
            attributes: Vec::new(),
        }
    }
}

/// A custom modifier attached to a signature position.
#[derive(Debug, Clone)]
pub struct RawModifier {
    /// `modreq` when true, `modopt` when false.
    pub required: bool,
    /// The modifier type reference.
    pub modifier: RawTypeRef,
}

/// A custom attribute application.
#[derive(Debug, Clone)]
pub struct RawAttribute {
    /// The attribute class.
    pub class: RawTypeRef,
    /// Fixed constructor arguments.
    pub positional: Vec<RawConstant>,
    /// Named field/property arguments.
    pub named: Vec<RawNamedConstant>,
}

impl RawAttribute {
    /// Create an application of the given attribute class with no arguments.
    #[must_use]
    pub fn new(class: RawTypeRef) -> Self {
        RawAttribute {
            class,
            positional: Vec::new(),
            named: Vec::new(),
        }
    }

    /// Append a fixed constructor argument.
    #[must_use]
    pub fn arg(mut self, constant: RawConstant) -> Self {
        self.positional.push(constant);
        self
    }

    /// Append a named argument.
    #[must_use]
    pub fn named_arg(mut self, name: &str, is_field: bool, constant: RawConstant) -> Self {
        self.named.push(RawNamedConstant {
            name: name.to_string(),
            is_field,
            value: constant,
        });
        self
    }
}

/// A named argument (field or property) in a custom attribute.
#[derive(Debug, Clone)]
pub struct RawNamedConstant {
    /// Name of the field or property.
    pub name: String,
    /// Whether this is a field (true) or property (false).
    pub is_field: bool,
    /// Value of the argument.
    pub value: RawConstant,
}

/// A typed constant: a literal value together with its declared static type.
///
/// The declared type matters independently of the value: a `null` of type `Type[]` must stay a
/// `Type[]`-typed null through retargeting rather than collapsing to `object`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawConstant {
    /// Declared static type of the constant.
    pub ty: RawTypeRef,
    /// The literal value.
    pub value: RawConstantValue,
}

impl RawConstant {
    /// Create a typed constant.
    #[must_use]
    pub fn new(ty: RawTypeRef, value: RawConstantValue) -> Self {
        RawConstant { ty, value }
    }
}

/// A single constant argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawConstantValue {
    /// A null reference (for reference, array and type arguments)
    Null,
    /// Boolean value
    Bool(bool),
    /// Character value
    Char(char),
    /// Signed 8-bit integer
    I1(i8),
    /// Unsigned 8-bit integer
    U1(u8),
    /// Signed 16-bit integer
    I2(i16),
    /// Unsigned 16-bit integer
    U2(u16),
    /// Signed 32-bit integer
    I4(i32),
    /// Unsigned 32-bit integer
    U4(u32),
    /// Signed 64-bit integer
    I8(i64),
    /// Unsigned 64-bit integer
    U8(u64),
    /// 32-bit floating point
    R4(f32),
    /// 64-bit floating point
    R8(f64),
    /// UTF-8 string
    String(String),
    /// `typeof(...)` argument carrying a type reference
    Type(RawTypeRef),
    /// Array of constants
    Array(Vec<RawConstant>),
}

/// An unresolved reference to a type, as read from a signature or attribute blob.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTypeRef {
    /// One of the predefined `System` types.
    Primitive(SpecialType),
    /// A named type, possibly nested, defined locally or in a referenced assembly.
    Named(Box<RawNamedRef>),
    /// A closed generic instantiation.
    Generic {
        /// The generic definition being instantiated.
        definition: Box<RawTypeRef>,
        /// Type arguments, in declaration order.
        args: Vec<RawTypeRef>,
    },
    /// An array of the element type.
    Array {
        /// Element type.
        element: Box<RawTypeRef>,
        /// Array rank; 1 for single-dimensional arrays.
        rank: u8,
    },
    /// An unmanaged pointer to the pointee type.
    Pointer(Box<RawTypeRef>),
    /// A reference to a generic parameter of the enclosing type or method.
    TypeParameter {
        /// Zero-based parameter ordinal.
        ordinal: u16,
        /// Whether the parameter belongs to the method (`!!n`) or the type (`!n`).
        method: bool,
    },
    /// A type with custom modifiers applied.
    Modified {
        /// The unmodified type.
        unmodified: Box<RawTypeRef>,
        /// The modifiers, outermost first.
        modifiers: Vec<RawModifier>,
    },
}

impl PartialEq for RawModifier {
    fn eq(&self, other: &Self) -> bool {
        self.required == other.required && self.modifier == other.modifier
    }
}

impl RawTypeRef {
    /// Reference one of the predefined `System` types.
    #[must_use]
    pub fn primitive(special: SpecialType) -> Self {
        RawTypeRef::Primitive(special)
    }

    /// Reference a non-generic named type. `assembly` of `None` means the referencing
    /// assembly itself.
    #[must_use]
    pub fn named(assembly: Option<AssemblyIdentity>, namespace: &str, name: &str) -> Self {
        RawTypeRef::named_arity(assembly, namespace, name, 0)
    }

    /// Reference a named type with generic arity.
    #[must_use]
    pub fn named_arity(
        assembly: Option<AssemblyIdentity>,
        namespace: &str,
        name: &str,
        arity: u16,
    ) -> Self {
        RawTypeRef::Named(Box::new(RawNamedRef {
            assembly,
            namespace: namespace.to_string(),
            name: name.to_string(),
            arity,
            nested: Vec::new(),
        }))
    }

    /// Extend a named reference with a nested member, returning the extended reference.
    ///
    /// Has no effect on non-named references.
    #[must_use]
    pub fn nested_member(self, name: &str, arity: u16) -> Self {
        match self {
            RawTypeRef::Named(mut named) => {
                named.nested.push((name.to_string(), arity));
                RawTypeRef::Named(named)
            }
            other => other,
        }
    }

    /// Reference a closed generic instantiation.
    #[must_use]
    pub fn generic(definition: RawTypeRef, args: Vec<RawTypeRef>) -> Self {
        RawTypeRef::Generic {
            definition: Box::new(definition),
            args,
        }
    }

    /// Reference a single-dimensional array of the element type.
    #[must_use]
    pub fn array(element: RawTypeRef) -> Self {
        RawTypeRef::Array {
            element: Box::new(element),
            rank: 1,
        }
    }

    /// Reference a pointer to the pointee type.
    #[must_use]
    pub fn pointer(pointee: RawTypeRef) -> Self {
        RawTypeRef::Pointer(Box::new(pointee))
    }

    /// Reference a generic parameter of the enclosing type or method.
    #[must_use]
    pub fn type_param(ordinal: u16, method: bool) -> Self {
        RawTypeRef::TypeParameter { ordinal, method }
    }

    /// Apply custom modifiers to a reference.
    #[must_use]
    pub fn modified(unmodified: RawTypeRef, modifiers: Vec<RawModifier>) -> Self {
        RawTypeRef::Modified {
            unmodified: Box::new(unmodified),
            modifiers,
        }
    }

    /// Whether this reference names a generic type, either as a closed instantiation or as
    /// an open generic definition. Such references cannot appear in interop-embedded
    /// signature positions.
    #[must_use]
    pub fn is_generic_shape(&self) -> bool {
        match self {
            RawTypeRef::Generic { .. } => true,
            RawTypeRef::Named(named) => named.arity > 0 || named.nested.iter().any(|(_, a)| *a > 0),
            RawTypeRef::Modified { unmodified, .. } => unmodified.is_generic_shape(),
            _ => false,
        }
    }
}

impl PartialEq for RawNamedRef {
    fn eq(&self, other: &Self) -> bool {
        self.assembly == other.assembly
            && self.namespace == other.namespace
            && self.name == other.name
            && self.arity == other.arity
            && self.nested == other.nested
    }
}

/// The named portion of a [`RawTypeRef`].
#[derive(Debug, Clone)]
pub struct RawNamedRef {
    /// Identity of the defining assembly, `None` for the referencing assembly itself.
    pub assembly: Option<AssemblyIdentity>,
    /// Namespace of the top-level type.
    pub namespace: String,
    /// Simple name of the top-level type.
    pub name: String,
    /// Generic arity of the top-level type.
    pub arity: u16,
    /// Chain of (name, arity) pairs descending into nested types.
    pub nested: Vec<(String, u16)>,
}

impl RawNamedRef {
    /// Metadata name of the top-level type, including the arity suffix.
    #[must_use]
    pub fn top_level_metadata_name(&self) -> String {
        metadata_type_name(&self.name, self.arity)
    }

    /// Fully qualified display name of the referenced type, including nesting.
    #[must_use]
    pub fn full_name(&self) -> String {
        let mut result = if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        };
        for (name, _) in &self.nested {
            result.push('.');
            result.push_str(name);
        }
        result
    }
}

impl fmt::Display for RawTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawTypeRef::Primitive(special) => write!(f, "{}", special.full_name()),
            RawTypeRef::Named(named) => write!(f, "{}", named.full_name()),
            RawTypeRef::Generic { definition, args } => {
                write!(f, "{definition}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
            RawTypeRef::Array { element, rank } => {
                write!(f, "{element}[{}]", ",".repeat(*rank as usize - 1))
            }
            RawTypeRef::Pointer(pointee) => write!(f, "{pointee}*"),
            RawTypeRef::TypeParameter { ordinal, method } => {
                if *method {
                    write!(f, "!!{ordinal}")
                } else {
                    write!(f, "!{ordinal}")
                }
            }
            RawTypeRef::Modified { unmodified, .. } => write!(f, "{unmodified}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::identity::AssemblyVersion;

    #[test]
    fn test_metadata_type_name_arity_suffix() {
        assert_eq!(metadata_type_name("List", 1), "List`1");
        assert_eq!(metadata_type_name("Object", 0), "Object");
    }

    #[test]
    fn test_assembly_builder() {
        let identity = AssemblyIdentity::new("Lib", AssemblyVersion::new(1, 0, 0, 0));
        let assembly = RawAssembly::build(identity.clone())
            .reference(AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0)))
            .ty(RawType::class("Lib", "C1").finish())
            .finish();
        assert_eq!(assembly.identity, identity);
        assert_eq!(assembly.references.len(), 1);
        assert_eq!(assembly.types[0].metadata_name(), "C1");
    }

    #[test]
    fn test_generic_param_updates_arity() {
        let ty = RawType::interface("Lib", "I31").generic_param("T").finish();
        assert_eq!(ty.arity, 1);
        assert_eq!(ty.metadata_name(), "I31`1");
    }

    #[test]
    fn test_raw_ref_display() {
        let inner = RawTypeRef::named(None, "Pia1", "I1");
        let generic = RawTypeRef::generic(
            RawTypeRef::named_arity(None, "Lib", "I31", 1),
            vec![inner.clone()],
        );
        assert_eq!(generic.to_string(), "Lib.I31<Pia1.I1>");
        assert_eq!(RawTypeRef::array(inner.clone()).to_string(), "Pia1.I1[]");
        assert_eq!(RawTypeRef::pointer(inner).to_string(), "Pia1.I1*");
        assert_eq!(
            RawTypeRef::primitive(SpecialType::Int32).to_string(),
            "System.Int32"
        );
    }

    #[test]
    fn test_nested_member_display() {
        let nested = RawTypeRef::named(None, "Lib", "S1").nested_member("S2", 0);
        assert_eq!(nested.to_string(), "Lib.S1.S2");
    }

    #[test]
    fn test_generic_shape_detection() {
        assert!(RawTypeRef::named_arity(None, "Lib", "I31", 1).is_generic_shape());
        assert!(RawTypeRef::generic(
            RawTypeRef::named_arity(None, "Lib", "I31", 1),
            vec![RawTypeRef::primitive(SpecialType::Int32)],
        )
        .is_generic_shape());
        assert!(!RawTypeRef::named(None, "Lib", "C1").is_generic_shape());
        assert!(!RawTypeRef::primitive(SpecialType::Int32).is_generic_shape());
    }
}
