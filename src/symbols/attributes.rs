//! Resolved custom attribute applications and custom modifiers.
//!
//! An [`AttributeData`] is the symbol-level view of a raw attribute record: the attribute
//! class and constructor re-resolved against a concrete reference set, and every typed
//! constant argument carrying its re-resolved declared type alongside the unchanged literal
//! value. Retargeting produces a *distinct* `AttributeData` object from the same raw record,
//! but one that compares structurally equal once both sides are resolved - the equality
//! implementations here are what back that contract.

use std::fmt;

use crate::symbols::{members::MethodSymbol, types::TypeSymbol};

/// A custom modifier (`modreq`/`modopt`) with its resolved modifier type.
#[derive(Debug, Clone)]
pub struct CustomModifier {
    /// `modreq` when true, `modopt` when false.
    pub required: bool,
    /// The resolved modifier type.
    pub modifier: TypeSymbol,
}

impl PartialEq for CustomModifier {
    fn eq(&self, other: &Self) -> bool {
        self.required == other.required && self.modifier == other.modifier
    }
}

/// A resolved custom attribute application.
#[derive(Clone)]
pub struct AttributeData {
    /// The resolved attribute class.
    pub class: TypeSymbol,
    /// The resolved attribute constructor, matched by fixed-argument count.
    pub constructor: Option<MethodSymbol>,
    /// Fixed constructor arguments.
    pub positional: Vec<TypedConstant>,
    /// Named field/property arguments.
    pub named: Vec<NamedConstant>,
}

impl PartialEq for AttributeData {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class
            && match (&self.constructor, &other.constructor) {
                (Some(a), Some(b)) => a.ptr_eq(b),
                (None, None) => true,
                _ => false,
            }
            && self.positional == other.positional
            && self.named == other.named
    }
}

impl fmt::Debug for AttributeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeData")
            .field("class", &self.class)
            .field("positional", &self.positional)
            .field("named", &self.named)
            .finish()
    }
}

/// A named argument (field or property) in a resolved attribute application.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedConstant {
    /// Name of the field or property.
    pub name: String,
    /// Whether this is a field (true) or property (false).
    pub is_field: bool,
    /// The argument value.
    pub value: TypedConstant,
}

/// A typed constant: the resolved declared type plus the literal value.
///
/// The declared type is kept even when the value is `Null` - a `null` of static type
/// `Type[]` keeps rendering as a `Type[]`-typed constant after retargeting.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedConstant {
    /// The resolved declared type of the constant.
    pub ty: TypeSymbol,
    /// The literal value.
    pub value: ConstantData,
}

/// A resolved constant argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantData {
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
    /// `typeof(...)` argument with its resolved type
    Type(TypeSymbol),
    /// Array of constants
    Array(Vec<TypedConstant>),
}
