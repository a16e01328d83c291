//! The symbol model: types, members, attributes and error placeholders.
//!
//! Symbols come in three presentations, erased behind per-kind enums:
//!
//! - **Definitions** ([`TypeDefSymbol`], [`members::MethodDefSymbol`], ...) realized from
//!   raw metadata into one [`crate::graph::SymbolGraph`]; reference-comparable within that
//!   graph.
//! - **Retargeted views** ([`crate::retarget::Retargeted`]) presenting a definition through
//!   another assembly's reference set; structure passes through, type-valued properties
//!   re-resolve.
//! - **Error placeholders** ([`ErrorType`]) substituted wherever resolution fails, so graph
//!   walks never face exceptions.

mod attributes;
mod display;
/// Member symbols (methods, fields, properties, events, parameters).
pub mod members;
mod primitives;
mod types;

pub use attributes::{AttributeData, ConstantData, CustomModifier, NamedConstant, TypedConstant};
pub use members::{
    EventSymbol, FieldSymbol, MethodSymbol, ParameterSymbol, PropertySymbol, TypeParameter,
};
pub use primitives::SpecialType;
pub use types::{
    ArrayType, ErrorType, ErrorTypeSymbol, GenericInstantiation, NamedType, PointerType,
    TypeDefRc, TypeDefSymbol, TypeKind, TypeSymbol,
};
