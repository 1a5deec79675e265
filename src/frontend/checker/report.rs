// Pretty error reporting with source highlighting using ariadne

use crate::frontend::checker::SemanticError;
use ariadne::{Color, Label, Report, ReportKind, Source};

/// Report a semantic error with source highlighting
pub fn report_semantic_error(filename: &str, source: &str, error: &SemanticError) {
    let report = build_report(error);
    report
        .eprint(Source::from(source))
        .expect("Failed to print error report");

    if let Some(span) = error.span() {
        eprintln!("  --> {}:{}", filename, get_line_col(source, span.start));
    }
}

/// Report every collected error in order
pub fn report_all(filename: &str, source: &str, errors: &[SemanticError]) {
    for error in errors {
        report_semantic_error(filename, source, error);
    }
}

fn get_line_col(source: &str, offset: usize) -> String {
    let mut line = 1;
    let mut col = 1;
    for (i, c) in source.chars().enumerate() {
        if i == offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    format!("{}:{}", line, col)
}

/// Build an ariadne Report from a SemanticError
fn build_report(error: &SemanticError) -> Report<'static, std::ops::Range<usize>> {
    let range = error.span().map(|s| s.start..s.end).unwrap_or(0..0);

    match error {
        SemanticError::DeclConflict { name, .. } => {
            let mut builder = Report::build(ReportKind::Error, (), range.start)
                .with_code("E001")
                .with_message(format!("Conflicting declaration of `{}`", name))
                .with_label(
                    Label::new(range)
                        .with_message("redeclared here")
                        .with_color(Color::Red),
                );
            if let SemanticError::DeclConflict {
                prev_span: Some(prev),
                ..
            } = error
            {
                builder = builder.with_label(
                    Label::new(prev.start..prev.end)
                        .with_message("first declared here")
                        .with_color(Color::Yellow),
                );
            }
            builder.finish()
        }

        SemanticError::IdentifierNotDeclared {
            name, looking_for, ..
        } => Report::build(ReportKind::Error, (), range.start)
            .with_code("E002")
            .with_message(format!("Cannot find {} `{}`", looking_for, name))
            .with_label(
                Label::new(range)
                    .with_message("not found in this scope")
                    .with_color(Color::Red),
            )
            .finish(),

        SemanticError::OverrideMismatch { method, .. } => {
            Report::build(ReportKind::Error, (), range.start)
                .with_code("E003")
                .with_message(format!(
                    "Method `{}` does not match the inherited signature",
                    method
                ))
                .with_label(
                    Label::new(range)
                        .with_message("signature differs from the base declaration")
                        .with_color(Color::Red),
                )
                .with_help("An override must keep the return type and formal types of the overridden method")
                .finish()
        }

        SemanticError::InaccessibleField { field, base_ty, .. } => {
            Report::build(ReportKind::Error, (), range.start)
                .with_code("E004")
                .with_message(format!("Field `{}` of `{}` is not accessible", field, base_ty))
                .with_label(
                    Label::new(range)
                        .with_message("fields are only visible inside the class and its subclasses")
                        .with_color(Color::Red),
                )
                .finish()
        }

        SemanticError::FieldNotFoundInBase { field, base_ty, .. } => {
            Report::build(ReportKind::Error, (), range.start)
                .with_code("E005")
                .with_message(format!("`{}` has no member named `{}`", base_ty, field))
                .with_label(
                    Label::new(range)
                        .with_message("member not found")
                        .with_color(Color::Red),
                )
                .finish()
        }

        SemanticError::ThisOutsideClass { .. } => Report::build(ReportKind::Error, (), range.start)
            .with_code("E006")
            .with_message("`this` is only valid within class scope")
            .with_label(
                Label::new(range)
                    .with_message("not inside a class")
                    .with_color(Color::Red),
            )
            .finish(),

        SemanticError::IncompatibleOperand { op, ty, .. } => {
            Report::build(ReportKind::Error, (), range.start)
                .with_code("E007")
                .with_message("Incompatible operand")
                .with_label(
                    Label::new(range)
                        .with_message(format!("`{}` cannot be applied to `{}`", op, ty))
                        .with_color(Color::Red),
                )
                .finish()
        }

        SemanticError::IncompatibleOperands { op, lhs, rhs, .. } => {
            Report::build(ReportKind::Error, (), range.start)
                .with_code("E007")
                .with_message("Incompatible operands")
                .with_label(
                    Label::new(range)
                        .with_message(format!("`{}` {} `{}`", lhs, op, rhs))
                        .with_color(Color::Red),
                )
                .finish()
        }

        SemanticError::SubscriptNotInteger { .. } => {
            Report::build(ReportKind::Error, (), range.start)
                .with_code("E008")
                .with_message("Array subscript must be an integer")
                .with_label(
                    Label::new(range)
                        .with_message("not an integer")
                        .with_color(Color::Red),
                )
                .finish()
        }

        SemanticError::BracketsOnNonArray { .. } => {
            Report::build(ReportKind::Error, (), range.start)
                .with_code("E009")
                .with_message("[] can only be applied to arrays")
                .with_label(
                    Label::new(range)
                        .with_message("this expression is not an array")
                        .with_color(Color::Red),
                )
                .finish()
        }

        SemanticError::NewArraySizeNotInteger { .. } => {
            Report::build(ReportKind::Error, (), range.start)
                .with_code("E010")
                .with_message("Size for NewArray must be an integer")
                .with_label(
                    Label::new(range)
                        .with_message("not an integer")
                        .with_color(Color::Red),
                )
                .finish()
        }

        SemanticError::ArgMismatch {
            arg_num,
            given,
            expected,
            ..
        } => Report::build(ReportKind::Error, (), range.start)
            .with_code("E011")
            .with_message(format!("Incompatible argument {}", arg_num))
            .with_label(
                Label::new(range)
                    .with_message(format!("`{}` given, `{}` expected", given, expected))
                    .with_color(Color::Red),
            )
            .finish(),

        SemanticError::NumArgsMismatch {
            function,
            expected,
            given,
            ..
        } => Report::build(ReportKind::Error, (), range.start)
            .with_code("E012")
            .with_message(format!(
                "Function `{}` expects {} argument(s) but {} given",
                function, expected, given
            ))
            .with_label(
                Label::new(range)
                    .with_message("wrong number of arguments")
                    .with_color(Color::Red),
            )
            .finish(),

        SemanticError::TestNotBoolean { .. } => Report::build(ReportKind::Error, (), range.start)
            .with_code("E013")
            .with_message("Test expression must have boolean type")
            .with_label(
                Label::new(range)
                    .with_message("not a boolean")
                    .with_color(Color::Red),
            )
            .finish(),

        SemanticError::BreakOutsideLoop { .. } => Report::build(ReportKind::Error, (), range.start)
            .with_code("E014")
            .with_message("break is only allowed inside a loop")
            .with_label(
                Label::new(range)
                    .with_message("no enclosing loop")
                    .with_color(Color::Red),
            )
            .finish(),

        SemanticError::ReturnMismatch {
            given, expected, ..
        } => Report::build(ReportKind::Error, (), range.start)
            .with_code("E015")
            .with_message("Incompatible return value")
            .with_label(
                Label::new(range)
                    .with_message(format!("`{}` given, `{}` expected", given, expected))
                    .with_color(Color::Red),
            )
            .finish(),

        SemanticError::PrintArgMismatch { arg_num, given, .. } => {
            Report::build(ReportKind::Error, (), range.start)
                .with_code("E016")
                .with_message(format!("Incompatible argument {} of Print", arg_num))
                .with_label(
                    Label::new(range)
                        .with_message(format!("`{}` given, int/bool/string expected", given))
                        .with_color(Color::Red),
                )
                .finish()
        }

        SemanticError::UnimplementedInterfaceMethod {
            class,
            interface,
            method,
            ..
        } => Report::build(ReportKind::Error, (), range.start)
            .with_code("E017")
            .with_message(format!(
                "Class `{}` does not implement interface `{}`",
                class, interface
            ))
            .with_label(
                Label::new(range)
                    .with_message(format!("method `{}` is missing", method))
                    .with_color(Color::Red),
            )
            .finish(),

        SemanticError::NoMainFound => Report::build(ReportKind::Error, (), range.start)
            .with_code("E018")
            .with_message("Function `main` not defined")
            .with_help("The program entry point must be a top-level function named `main` taking no parameters")
            .finish(),
    }
}
