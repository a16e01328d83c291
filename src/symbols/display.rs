//! Display rendering for symbols.
//!
//! Display strings are assembly-agnostic on purpose: a symbol and its retargeted
//! counterpart render identically even though they are distinct objects resolving against
//! different reference sets. That invariant is what lets diagnostics produced before and
//! after retargeting read the same.

use std::fmt;

use crate::symbols::{
    members::{FieldSymbol, MethodSymbol},
    types::{NamedType, TypeSymbol},
};

impl fmt::Display for NamedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())?;
        let params = self.type_parameters();
        if !params.is_empty() {
            write!(f, "<")?;
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", param.name())?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSymbol::Named(named) => write!(f, "{named}"),
            TypeSymbol::Generic(instantiation) => {
                write!(f, "{}<", instantiation.definition.full_name())?;
                for (i, arg) in instantiation.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
            TypeSymbol::Array(array) => {
                write!(f, "{}[{}]", array.element, ",".repeat(array.rank as usize - 1))
            }
            TypeSymbol::Pointer(pointer) => write!(f, "{}*", pointer.pointee),
            TypeSymbol::Parameter(param) => write!(f, "{}", param.name()),
        }
    }
}

impl NamedType {
    /// Assembly-agnostic display string.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

impl TypeSymbol {
    /// Assembly-agnostic display string.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

impl MethodSymbol {
    /// Assembly-agnostic display string: `Containing.Name(ParamType, ...)`.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        let mut result = String::new();
        if let Some(containing) = self.containing_type() {
            result.push_str(&containing.to_display_string());
            result.push('.');
        }
        result.push_str(&self.name());
        result.push('(');
        for (i, param) in self.parameters().iter().enumerate() {
            if i > 0 {
                result.push_str(", ");
            }
            result.push_str(&param.ty().to_display_string());
        }
        result.push(')');
        result
    }
}

impl FieldSymbol {
    /// Assembly-agnostic display string: `Containing.Name`.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        let containing = match self {
            FieldSymbol::Definition(def) => def
                .containing_type()
                .map(|ty| NamedType::Definition(ty).to_display_string()),
            FieldSymbol::Retargeted(retargeted) => retargeted
                .underlying()
                .containing_type()
                .map(|ty| NamedType::Definition(ty).to_display_string()),
        };
        match containing {
            Some(containing) => format!("{containing}.{}", self.name()),
            None => self.name(),
        }
    }
}
