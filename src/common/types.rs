use std::fmt;
use std::sync::Arc;

/// Storage word size of the 32-bit target. Every slot — parameter, local,
/// temporary, global, object field, array element — occupies one word.
pub const WORD_SIZE: i32 = 4;

// Internal, semantic representation of a type
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Double,
    Bool,
    String,
    Void,
    // The type of the `null` literal; converts to any class type
    Null,
    // Absorbing sentinel assigned to ill-typed subtrees so one offense
    // produces one diagnostic
    Error,
    Named(String),
    Array(Arc<Type>),
}

impl Type {
    pub fn array(elem: Type) -> Type {
        Type::Array(Arc::new(elem))
    }

    pub fn named(name: impl Into<String>) -> Type {
        Type::Named(name.into())
    }

    /// Structural equivalence: primitives by variant, `Named` by name,
    /// `Array` by recursive element equivalence.
    pub fn is_equivalent_to(&self, other: &Type) -> bool {
        self == other
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Double)
    }

    /// The element type, if this is an array type.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(elem) => Some(elem),
            _ => None,
        }
    }

    /// Convertibility that needs no class hierarchy: equivalence, the
    /// absorbing error type, and null-to-reference. Derived-to-base and
    /// class-to-interface conversions are decided by the class registry,
    /// which completes this relation.
    pub fn is_convertible_basic(&self, other: &Type) -> bool {
        if self.is_equivalent_to(other) {
            return true;
        }
        if self.is_error() || other.is_error() {
            return true;
        }
        matches!((self, other), (Type::Null, Type::Named(_)))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Double => write!(f, "double"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Null => write!(f, "null"),
            Type::Error => write!(f, "error"),
            Type::Named(name) => write!(f, "{}", name),
            Type::Array(elem) => write!(f, "{}[]", elem),
        }
    }
}
