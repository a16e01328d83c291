//! # symres Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the symres library. Import this module to get quick access to the essential types
//! for cross-assembly symbol resolution.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all symres operations
pub use crate::Error;

/// The result type used throughout symres
pub use crate::Result;

// ================================================================================================
// Metadata Inputs
// ================================================================================================

/// Assembly identity components
pub use crate::metadata::identity::{AssemblyIdentity, AssemblyVersion, HashAlgorithm, StrongName};

/// Embedded interop identity markers
pub use crate::metadata::marker::TypeIdentifier;

/// Raw descriptor model and fixture builders
pub use crate::metadata::provider::{
    Accessibility, RawAssembly, RawAttribute, RawConstant, RawConstantValue, RawEvent, RawField,
    RawMethod, RawModifier, RawProperty, RawType, RawTypeRef,
};

// ================================================================================================
// Graphs and Sessions
// ================================================================================================

/// Per-assembly symbol graphs
pub use crate::graph::{NamespaceSymbol, SymbolGraph, SymbolGraphRc};

/// Resolution sessions and outcomes
pub use crate::resolve::{
    AssemblySymbol, CanonicalResolution, Compilation, Reference, Resolution, Resolver,
};

/// Retargeting views
pub use crate::retarget::{Retargeted, RetargetingAssembly};

// ================================================================================================
// Symbol Model
// ================================================================================================

/// Core symbol types
pub use crate::symbols::{
    AttributeData, ConstantData, CustomModifier, ErrorType, EventSymbol, FieldSymbol,
    MethodSymbol, NamedType, PropertySymbol, SpecialType, TypeDefSymbol, TypeKind, TypeParameter,
    TypeSymbol, TypedConstant,
};
