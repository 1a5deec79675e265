use crate::common::span::Span;
use crate::common::types::Type;
use std::fmt;

/// What kind of declaration an unresolved identifier was expected to name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookingFor {
    Class,
    Interface,
    Function,
    Variable,
    Type,
}

impl fmt::Display for LookingFor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LookingFor::Class => write!(f, "class"),
            LookingFor::Interface => write!(f, "interface"),
            LookingFor::Function => write!(f, "function"),
            LookingFor::Variable => write!(f, "variable"),
            LookingFor::Type => write!(f, "type"),
        }
    }
}

#[derive(Clone, Debug)]
pub enum SemanticError {
    DeclConflict {
        name: String,
        span: Span,
        prev_span: Option<Span>,
    },

    IdentifierNotDeclared {
        name: String,
        looking_for: LookingFor,
        span: Span,
    },

    OverrideMismatch {
        method: String,
        span: Span,
    },

    InaccessibleField {
        field: String,
        base_ty: Type,
        span: Span,
    },

    FieldNotFoundInBase {
        field: String,
        base_ty: Type,
        span: Span,
    },

    ThisOutsideClass {
        span: Span,
    },

    // Unary operator applied to an unsupported operand type
    IncompatibleOperand {
        op: String,
        ty: Type,
        span: Span,
    },

    IncompatibleOperands {
        op: String,
        lhs: Type,
        rhs: Type,
        span: Span,
    },

    SubscriptNotInteger {
        span: Span,
    },

    BracketsOnNonArray {
        span: Span,
    },

    NewArraySizeNotInteger {
        span: Span,
    },

    ArgMismatch {
        arg_num: usize,
        given: Type,
        expected: Type,
        span: Span,
    },

    NumArgsMismatch {
        function: String,
        expected: usize,
        given: usize,
        span: Span,
    },

    TestNotBoolean {
        span: Span,
    },

    BreakOutsideLoop {
        span: Span,
    },

    ReturnMismatch {
        given: Type,
        expected: Type,
        span: Span,
    },

    PrintArgMismatch {
        arg_num: usize,
        given: Type,
        span: Span,
    },

    UnimplementedInterfaceMethod {
        class: String,
        interface: String,
        method: String,
        span: Span,
    },

    NoMainFound,
}

impl SemanticError {
    /// The source span the error points at, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            SemanticError::DeclConflict { span, .. } => Some(*span),
            SemanticError::IdentifierNotDeclared { span, .. } => Some(*span),
            SemanticError::OverrideMismatch { span, .. } => Some(*span),
            SemanticError::InaccessibleField { span, .. } => Some(*span),
            SemanticError::FieldNotFoundInBase { span, .. } => Some(*span),
            SemanticError::ThisOutsideClass { span } => Some(*span),
            SemanticError::IncompatibleOperand { span, .. } => Some(*span),
            SemanticError::IncompatibleOperands { span, .. } => Some(*span),
            SemanticError::SubscriptNotInteger { span } => Some(*span),
            SemanticError::BracketsOnNonArray { span } => Some(*span),
            SemanticError::NewArraySizeNotInteger { span } => Some(*span),
            SemanticError::ArgMismatch { span, .. } => Some(*span),
            SemanticError::NumArgsMismatch { span, .. } => Some(*span),
            SemanticError::TestNotBoolean { span } => Some(*span),
            SemanticError::BreakOutsideLoop { span } => Some(*span),
            SemanticError::ReturnMismatch { span, .. } => Some(*span),
            SemanticError::PrintArgMismatch { span, .. } => Some(*span),
            SemanticError::UnimplementedInterfaceMethod { span, .. } => Some(*span),
            SemanticError::NoMainFound => None,
        }
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SemanticError::DeclConflict { name, span, prev_span } => {
                write!(f, "Declaration of `{}` at {} conflicts", name, span)?;
                if let Some(prev) = prev_span {
                    write!(f, " with declaration at {}", prev)?;
                }
                Ok(())
            }

            SemanticError::IdentifierNotDeclared { name, looking_for, span } => {
                write!(
                    f,
                    "No declaration found for {} `{}` at {}",
                    looking_for, name, span
                )
            }

            SemanticError::OverrideMismatch { method, span } => {
                write!(
                    f,
                    "Method `{}` at {} must match inherited type signature",
                    method, span
                )
            }

            SemanticError::InaccessibleField { field, base_ty, span } => {
                write!(
                    f,
                    "Field `{}` of `{}` is not accessible at {}",
                    field, base_ty, span
                )
            }

            SemanticError::FieldNotFoundInBase { field, base_ty, span } => {
                write!(f, "`{}` has no member named `{}` at {}", base_ty, field, span)
            }

            SemanticError::ThisOutsideClass { span } => {
                write!(f, "`this` is only valid within class scope, at {}", span)
            }

            SemanticError::IncompatibleOperand { op, ty, span } => {
                write!(f, "Incompatible operand at {}: {} `{}`", span, op, ty)
            }

            SemanticError::IncompatibleOperands { op, lhs, rhs, span } => {
                write!(
                    f,
                    "Incompatible operands at {}: `{}` {} `{}`",
                    span, lhs, op, rhs
                )
            }

            SemanticError::SubscriptNotInteger { span } => {
                write!(f, "Array subscript at {} must be an integer", span)
            }

            SemanticError::BracketsOnNonArray { span } => {
                write!(f, "[] can only be applied to arrays, at {}", span)
            }

            SemanticError::NewArraySizeNotInteger { span } => {
                write!(f, "Size for NewArray at {} must be an integer", span)
            }

            SemanticError::ArgMismatch { arg_num, given, expected, span } => {
                write!(
                    f,
                    "Incompatible argument {} at {}: `{}` given, `{}` expected",
                    arg_num, span, given, expected
                )
            }

            SemanticError::NumArgsMismatch { function, expected, given, span } => {
                write!(
                    f,
                    "Function `{}` at {} expects {} argument(s) but {} given",
                    function, span, expected, given
                )
            }

            SemanticError::TestNotBoolean { span } => {
                write!(f, "Test expression at {} must have boolean type", span)
            }

            SemanticError::BreakOutsideLoop { span } => {
                write!(f, "break at {} is only allowed inside a loop", span)
            }

            SemanticError::ReturnMismatch { given, expected, span } => {
                write!(
                    f,
                    "Incompatible return at {}: `{}` given, `{}` expected",
                    span, given, expected
                )
            }

            SemanticError::PrintArgMismatch { arg_num, given, span } => {
                write!(
                    f,
                    "Incompatible argument {} of Print at {}: `{}` given, int/bool/string expected",
                    arg_num, span, given
                )
            }

            SemanticError::UnimplementedInterfaceMethod { class, interface, method, span } => {
                write!(
                    f,
                    "Class `{}` at {} does not implement method `{}` of interface `{}`",
                    class, span, method, interface
                )
            }

            SemanticError::NoMainFound => {
                write!(f, "Linker: function `main` not defined")
            }
        }
    }
}

impl std::error::Error for SemanticError {}
