//! Predefined ("special") types of the runtime.
//!
//! The resolution engine needs to recognize a small set of corlib types by name: they anchor
//! struct/enum classification (`System.ValueType`, `System.Enum`), enum underlying types, and
//! the primitive signature element types. [`SpecialType`] enumerates that set and maps between
//! the tag and the `System.*` metadata name.
//!
//! A special type tag survives resolution failure: when the corlib is absent from a reference
//! set, the substituted error symbol still carries the [`SpecialType`] it stood for, so callers
//! can keep reasoning about, say, an `Int16`-backed enum whose `System.Enum` base never
//! resolved.

use strum::{EnumIter, IntoEnumIterator};

/// Identifies one of the predefined runtime types by its well-known `System` name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum SpecialType {
    /// `System.Object`
    Object,
    /// `System.ValueType`
    ValueType,
    /// `System.Enum`
    Enum,
    /// `System.Delegate`
    Delegate,
    /// `System.MulticastDelegate`
    MulticastDelegate,
    /// `System.Void`
    Void,
    /// `System.Boolean`
    Boolean,
    /// `System.Char`
    Char,
    /// `System.SByte`
    SByte,
    /// `System.Byte`
    Byte,
    /// `System.Int16`
    Int16,
    /// `System.UInt16`
    UInt16,
    /// `System.Int32`
    Int32,
    /// `System.UInt32`
    UInt32,
    /// `System.Int64`
    Int64,
    /// `System.UInt64`
    UInt64,
    /// `System.Single`
    Single,
    /// `System.Double`
    Double,
    /// `System.String`
    String,
    /// `System.IntPtr`
    IntPtr,
    /// `System.UIntPtr`
    UIntPtr,
}

impl SpecialType {
    /// The simple type name within the `System` namespace.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SpecialType::Object => "Object",
            SpecialType::ValueType => "ValueType",
            SpecialType::Enum => "Enum",
            SpecialType::Delegate => "Delegate",
            SpecialType::MulticastDelegate => "MulticastDelegate",
            SpecialType::Void => "Void",
            SpecialType::Boolean => "Boolean",
            SpecialType::Char => "Char",
            SpecialType::SByte => "SByte",
            SpecialType::Byte => "Byte",
            SpecialType::Int16 => "Int16",
            SpecialType::UInt16 => "UInt16",
            SpecialType::Int32 => "Int32",
            SpecialType::UInt32 => "UInt32",
            SpecialType::Int64 => "Int64",
            SpecialType::UInt64 => "UInt64",
            SpecialType::Single => "Single",
            SpecialType::Double => "Double",
            SpecialType::String => "String",
            SpecialType::IntPtr => "IntPtr",
            SpecialType::UIntPtr => "UIntPtr",
        }
    }

    /// The fully qualified metadata name, e.g. `System.Int32`.
    #[must_use]
    pub fn full_name(&self) -> &'static str {
        match self {
            SpecialType::Object => "System.Object",
            SpecialType::ValueType => "System.ValueType",
            SpecialType::Enum => "System.Enum",
            SpecialType::Delegate => "System.Delegate",
            SpecialType::MulticastDelegate => "System.MulticastDelegate",
            SpecialType::Void => "System.Void",
            SpecialType::Boolean => "System.Boolean",
            SpecialType::Char => "System.Char",
            SpecialType::SByte => "System.SByte",
            SpecialType::Byte => "System.Byte",
            SpecialType::Int16 => "System.Int16",
            SpecialType::UInt16 => "System.UInt16",
            SpecialType::Int32 => "System.Int32",
            SpecialType::UInt32 => "System.UInt32",
            SpecialType::Int64 => "System.Int64",
            SpecialType::UInt64 => "System.UInt64",
            SpecialType::Single => "System.Single",
            SpecialType::Double => "System.Double",
            SpecialType::String => "System.String",
            SpecialType::IntPtr => "System.IntPtr",
            SpecialType::UIntPtr => "System.UIntPtr",
        }
    }

    /// Map a namespace/name pair back to its special type tag, if any.
    ///
    /// ## Arguments
    /// * 'namespace' - The declaring namespace, expected to be `System`
    /// * 'name' - The simple type name
    #[must_use]
    pub fn from_name(namespace: &str, name: &str) -> Option<SpecialType> {
        if namespace != "System" {
            return None;
        }
        SpecialType::iter().find(|special| special.name() == name)
    }

    /// Whether this type is one of the integral primitives usable as an enum underlying type.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            SpecialType::SByte
                | SpecialType::Byte
                | SpecialType::Int16
                | SpecialType::UInt16
                | SpecialType::Int32
                | SpecialType::UInt32
                | SpecialType::Int64
                | SpecialType::UInt64
        )
    }
}
