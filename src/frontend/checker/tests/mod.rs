//! Checker tests: scoping, inheritance, layout, vtables, and the
//! statement/expression typing rules.

mod common;

use self::common::*;

use crate::common::ast::{BinOp, Expr, Program, Stmt, TypeExpr};
use crate::common::span::Span;
use crate::common::tast::{TDecl, TProgram};
use crate::common::types::{Type, WORD_SIZE};
use crate::frontend::checker::{
    check_program_full, ClassRegistry, Diagnostics, SemanticError,
};

fn run(program: &Program) -> (TProgram, ClassRegistry, Vec<SemanticError>) {
    let mut diags = Diagnostics::new();
    let (tast, registry) = check_program_full(program, &mut diags);
    (tast, registry, diags.into_errors())
}

fn errors_of(program: &Program) -> Vec<SemanticError> {
    run(program).2
}

// ----------------------------------------------------------------------
// Scoping and declaration conflicts
// ----------------------------------------------------------------------

#[test]
fn test_duplicate_global_conflicts_first_wins() {
    let prog = program_with_main(vec![
        sp(crate::common::ast::Decl::Var(crate::common::ast::VarDecl {
            name: ident_name("x"),
            ty: sp(TypeExpr::Int),
        })),
        sp(crate::common::ast::Decl::Var(crate::common::ast::VarDecl {
            name: ident_name("x"),
            ty: sp(TypeExpr::Bool),
        })),
    ]);
    let errors = errors_of(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], SemanticError::DeclConflict { name, .. } if name == "x"));
}

#[test]
fn test_duplicate_local_in_same_block_conflicts() {
    let prog = program(vec![main_fn_with_locals(
        vec![var_decl("x", TypeExpr::Int), var_decl("x", TypeExpr::Int)],
        vec![],
    )]);
    let errors = errors_of(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], SemanticError::DeclConflict { name, .. } if name == "x"));
}

#[test]
fn test_shadowing_across_scopes_is_allowed() {
    // A global, a local, and an inner-block local may share a name
    let prog = program(vec![
        sp(crate::common::ast::Decl::Var(crate::common::ast::VarDecl {
            name: ident_name("x"),
            ty: sp(TypeExpr::Int),
        })),
        main_fn_with_locals(
            vec![var_decl("x", TypeExpr::Int)],
            vec![block_stmt(
                vec![var_decl("x", TypeExpr::Bool)],
                vec![expr_stmt(assign(ident("x"), boolean(true)))],
            )],
        ),
    ]);
    assert!(errors_of(&prog).is_empty());
}

/// `void main() { <locals> <stmts> }` — convenience for scoping tests.
fn main_fn_with_locals(
    locals: Vec<crate::common::span::Spanned<crate::common::ast::VarDecl>>,
    stmts: Vec<crate::common::span::Spanned<Stmt>>,
) -> crate::common::span::Spanned<crate::common::ast::Decl> {
    sp(crate::common::ast::Decl::Fn(fn_decl(
        "main",
        TypeExpr::Void,
        vec![],
        block(locals, stmts),
    )))
}

#[test]
fn test_field_conflicts_with_inherited_field() {
    let prog = program_with_main(vec![
        class_decl("A", None, vec![], vec![field("f", TypeExpr::Int)]),
        class_decl("B", Some("A"), vec![], vec![field("f", TypeExpr::Int)]),
    ]);
    let errors = errors_of(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], SemanticError::DeclConflict { name, .. } if name == "f"));
}

#[test]
fn test_method_conflicts_with_inherited_field() {
    let prog = program_with_main(vec![
        class_decl("A", None, vec![], vec![field("m", TypeExpr::Int)]),
        class_decl(
            "B",
            Some("A"),
            vec![],
            vec![method("m", TypeExpr::Void, vec![], block(vec![], vec![]))],
        ),
    ]);
    let errors = errors_of(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], SemanticError::DeclConflict { name, .. } if name == "m"));
}

// ----------------------------------------------------------------------
// Inheritance: extends resolution, cycles, overriding
// ----------------------------------------------------------------------

#[test]
fn test_unresolved_extends_reported_and_stripped() {
    let prog = program_with_main(vec![class_decl("A", Some("Missing"), vec![], vec![])]);
    let (_, registry, errors) = run(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        SemanticError::IdentifierNotDeclared { name, .. } if name == "Missing"
    ));
    assert!(registry.class("A").unwrap().extends.is_none());
}

#[test]
fn test_two_step_extends_cycle_is_stripped() {
    let prog = program_with_main(vec![
        class_decl("A", Some("B"), vec![], vec![]),
        class_decl("B", Some("A"), vec![], vec![]),
    ]);
    let (_, registry, errors) = run(&prog);
    // The cycle is broken silently; checking continues on the acyclic rest
    assert!(errors.is_empty());
    assert!(registry.class("A").unwrap().extends.is_none());
    assert_eq!(registry.class("B").unwrap().extends.as_deref(), Some("A"));
}

#[test]
fn test_override_with_matching_signature_replaces_slot() {
    let prog = program_with_main(vec![
        class_decl(
            "A",
            None,
            vec![],
            vec![
                method("m", TypeExpr::Void, vec![], block(vec![], vec![])),
                method("n", TypeExpr::Void, vec![], block(vec![], vec![])),
            ],
        ),
        class_decl(
            "B",
            Some("A"),
            vec![],
            vec![method("m", TypeExpr::Void, vec![], block(vec![], vec![]))],
        ),
    ]);
    let (_, registry, errors) = run(&prog);
    assert!(errors.is_empty());

    let a = registry.class("A").unwrap();
    let b = registry.class("B").unwrap();
    // Same arity, override kept its slot index, new labels in place
    assert_eq!(a.vtable.len(), 2);
    assert_eq!(b.vtable.len(), 2);
    assert_eq!(b.vtable[0].label, "_B.m");
    assert_eq!(b.vtable[1].label, "_A.n");
    assert_eq!(registry.vtable_offset("B", "m"), Some(0));
    assert_eq!(registry.vtable_offset("B", "n"), Some(WORD_SIZE));
}

#[test]
fn test_override_mismatch_reported_and_slot_not_replaced() {
    let prog = program_with_main(vec![
        class_decl(
            "A",
            None,
            vec![],
            vec![method("m", TypeExpr::Void, vec![], block(vec![], vec![]))],
        ),
        class_decl(
            "B",
            Some("A"),
            vec![],
            vec![method("m", TypeExpr::Int, vec![], block(vec![], vec![return_stmt(Some(int(0)))]))],
        ),
    ]);
    let (_, registry, errors) = run(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], SemanticError::OverrideMismatch { method, .. } if method == "m"));

    // A mismatched signature never replaces the inherited slot; the method
    // appends as a new one instead
    let b = registry.class("B").unwrap();
    assert_eq!(b.vtable.len(), 2);
    assert_eq!(b.vtable[0].label, "_A.m");
    assert_eq!(b.vtable[1].label, "_B.m");
}

#[test]
fn test_vtable_inherits_base_slots_in_order() {
    let prog = program_with_main(vec![
        class_decl(
            "A",
            None,
            vec![],
            vec![
                method("m1", TypeExpr::Void, vec![], block(vec![], vec![])),
                method("m2", TypeExpr::Void, vec![], block(vec![], vec![])),
            ],
        ),
        class_decl(
            "B",
            Some("A"),
            vec![],
            vec![
                method("m3", TypeExpr::Void, vec![], block(vec![], vec![])),
                method("m1", TypeExpr::Void, vec![], block(vec![], vec![])),
            ],
        ),
    ]);
    let (_, registry, errors) = run(&prog);
    assert!(errors.is_empty());

    let a = registry.class("A").unwrap();
    let b = registry.class("B").unwrap();
    assert!(b.vtable.len() >= a.vtable.len());
    // Inherited slots keep their indices; the override replaced in place,
    // the new method appended
    let labels: Vec<&str> = b.vtable.iter().map(|slot| slot.label.as_str()).collect();
    assert_eq!(labels, vec!["_B.m1", "_A.m2", "_B.m3"]);
    // Slot signatures agree position-wise with the base
    for (index, slot) in a.vtable.iter().enumerate() {
        assert!(slot.sig.matches(&b.vtable[index].sig));
    }
}

// ----------------------------------------------------------------------
// Layout
// ----------------------------------------------------------------------

#[test]
fn test_layout_reserves_vtable_word_and_grows_per_field() {
    let prog = program_with_main(vec![class_decl(
        "A",
        None,
        vec![],
        vec![field("f", TypeExpr::Int), field("g", TypeExpr::Bool)],
    )]);
    let (_, registry, errors) = run(&prog);
    assert!(errors.is_empty());

    let a = registry.class("A").unwrap();
    assert_eq!(a.instance_size, 3 * WORD_SIZE);
    assert_eq!(registry.field_offset("A", "f"), Some(WORD_SIZE));
    assert_eq!(registry.field_offset("A", "g"), Some(2 * WORD_SIZE));
}

#[test]
fn test_layout_is_monotone_over_inheritance() {
    let prog = program_with_main(vec![
        class_decl("A", None, vec![], vec![field("f", TypeExpr::Int)]),
        class_decl("B", Some("A"), vec![], vec![field("g", TypeExpr::Int)]),
    ]);
    let (_, registry, errors) = run(&prog);
    assert!(errors.is_empty());

    let a = registry.class("A").unwrap();
    let b = registry.class("B").unwrap();
    assert!(b.instance_size >= a.instance_size + WORD_SIZE);
    // Base fields first, own fields after; every offset past the vtable word
    assert_eq!(registry.field_offset("B", "f"), Some(WORD_SIZE));
    assert_eq!(registry.field_offset("B", "g"), Some(a.instance_size));
    assert!(registry.field_offset("B", "g").unwrap() >= WORD_SIZE);
}

// ----------------------------------------------------------------------
// Interfaces
// ----------------------------------------------------------------------

#[test]
fn test_missing_interface_method_reported() {
    let prog = program_with_main(vec![
        interface_decl("I", vec![proto("m", TypeExpr::Void, vec![])]),
        class_decl("C", None, vec!["I"], vec![]),
    ]);
    let errors = errors_of(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        SemanticError::UnimplementedInterfaceMethod { class, interface, method, .. }
            if class == "C" && interface == "I" && method == "m"
    ));
}

#[test]
fn test_inherited_method_satisfies_interface() {
    let prog = program_with_main(vec![
        interface_decl("I", vec![proto("m", TypeExpr::Void, vec![])]),
        class_decl(
            "A",
            None,
            vec![],
            vec![method("m", TypeExpr::Void, vec![], block(vec![], vec![]))],
        ),
        class_decl("B", Some("A"), vec!["I"], vec![]),
    ]);
    assert!(errors_of(&prog).is_empty());
}

#[test]
fn test_class_converts_to_implemented_interface() {
    let (_, registry, errors) = run(&program_with_main(vec![
        interface_decl("I", vec![proto("m", TypeExpr::Void, vec![])]),
        class_decl(
            "C",
            None,
            vec!["I"],
            vec![method("m", TypeExpr::Void, vec![], block(vec![], vec![]))],
        ),
        class_decl("D", None, vec![], vec![]),
    ]));
    assert!(errors.is_empty());
    assert!(registry.is_convertible(&Type::named("C"), &Type::named("I")));
    assert!(!registry.is_convertible(&Type::named("D"), &Type::named("I")));
}

// ----------------------------------------------------------------------
// Statements
// ----------------------------------------------------------------------

#[test]
fn test_break_outside_loop_single_diagnostic() {
    let prog = program(vec![main_fn(vec![sp(Stmt::Break)])]);
    let errors = errors_of(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], SemanticError::BreakOutsideLoop { .. }));
}

#[test]
fn test_break_inside_loop_is_fine() {
    let prog = program(vec![main_fn(vec![while_stmt(
        boolean(true),
        sp(Stmt::Break),
    )])]);
    assert!(errors_of(&prog).is_empty());
}

#[test]
fn test_non_boolean_test_reported() {
    let prog = program(vec![main_fn(vec![if_stmt(
        int(1),
        expr_stmt(int(0)),
        None,
    )])]);
    let errors = errors_of(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], SemanticError::TestNotBoolean { .. }));
}

#[test]
fn test_return_type_must_convert() {
    let prog = program_with_main(vec![sp(crate::common::ast::Decl::Fn(fn_decl(
        "f",
        TypeExpr::Int,
        vec![],
        block(vec![], vec![return_stmt(Some(boolean(true)))]),
    )))]);
    let errors = errors_of(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        SemanticError::ReturnMismatch { given: Type::Bool, expected: Type::Int, .. }
    ));
}

#[test]
fn test_print_rejects_non_printable_types() {
    let prog = program(vec![
        class_decl("A", None, vec![], vec![]),
        main_fn_with_locals(
            vec![var_decl("a", TypeExpr::Named("A".to_string()))],
            vec![print_stmt(vec![ident("a"), int(1), string("ok")])],
        ),
    ]);
    let errors = errors_of(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        SemanticError::PrintArgMismatch { arg_num: 1, .. }
    ));
}

#[test]
fn test_missing_main_reported() {
    let prog = program(vec![sp(crate::common::ast::Decl::Fn(fn_decl(
        "helper",
        TypeExpr::Void,
        vec![],
        block(vec![], vec![]),
    )))]);
    let errors = errors_of(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], SemanticError::NoMainFound));
}

#[test]
fn test_main_with_parameters_does_not_count() {
    let prog = program(vec![sp(crate::common::ast::Decl::Fn(fn_decl(
        "main",
        TypeExpr::Void,
        vec![var_decl("argc", TypeExpr::Int)],
        block(vec![], vec![]),
    )))]);
    let errors = errors_of(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], SemanticError::NoMainFound));
}

// ----------------------------------------------------------------------
// Expressions
// ----------------------------------------------------------------------

#[test]
fn test_arithmetic_mismatch_reports_once_then_absorbs() {
    // (1 + true) + 2 — the inner offense reports, the outer one is
    // suppressed by the error type
    let prog = program(vec![main_fn(vec![expr_stmt(binary(
        BinOp::Add,
        binary(BinOp::Add, int(1), boolean(true)),
        int(2),
    ))])]);
    let errors = errors_of(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        SemanticError::IncompatibleOperands { lhs: Type::Int, rhs: Type::Bool, .. }
    ));
}

#[test]
fn test_this_outside_class_reported() {
    let prog = program(vec![main_fn(vec![expr_stmt(sp(Expr::This))])]);
    let errors = errors_of(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], SemanticError::ThisOutsideClass { .. }));
}

#[test]
fn test_undeclared_identifier_reported() {
    let prog = program(vec![main_fn(vec![expr_stmt(assign(ident("z"), int(1)))])]);
    let errors = errors_of(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        SemanticError::IdentifierNotDeclared { name, .. } if name == "z"
    ));
}

#[test]
fn test_derived_assigns_to_base_but_not_conversely() {
    let classes = vec![
        class_decl("A", None, vec![], vec![]),
        class_decl("B", Some("A"), vec![], vec![]),
    ];

    let ok = program(vec![
        classes[0].clone(),
        classes[1].clone(),
        main_fn_with_locals(
            vec![var_decl("a", TypeExpr::Named("A".to_string()))],
            vec![expr_stmt(assign(ident("a"), new_object("B")))],
        ),
    ]);
    assert!(errors_of(&ok).is_empty());

    let bad = program(vec![
        classes[0].clone(),
        classes[1].clone(),
        main_fn_with_locals(
            vec![var_decl("b", TypeExpr::Named("B".to_string()))],
            vec![expr_stmt(assign(ident("b"), new_object("A")))],
        ),
    ]);
    let errors = errors_of(&bad);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        SemanticError::IncompatibleOperands { op, .. } if op == "="
    ));
}

#[test]
fn test_null_converts_to_class_type() {
    let prog = program(vec![
        class_decl("A", None, vec![], vec![]),
        main_fn_with_locals(
            vec![var_decl("a", TypeExpr::Named("A".to_string()))],
            vec![expr_stmt(assign(ident("a"), sp(Expr::Null)))],
        ),
    ]);
    assert!(errors_of(&prog).is_empty());
}

#[test]
fn test_field_access_from_unrelated_class_is_inaccessible() {
    let prog = program_with_main(vec![
        class_decl("A", None, vec![], vec![field("f", TypeExpr::Int)]),
        class_decl(
            "C",
            None,
            vec![],
            vec![method(
                "poke",
                TypeExpr::Void,
                vec![var_decl("a", TypeExpr::Named("A".to_string()))],
                block(vec![], vec![expr_stmt(assign(field_of(ident("a"), "f"), int(1)))]),
            )],
        ),
    ]);
    let errors = errors_of(&prog);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        SemanticError::InaccessibleField { field, .. } if field == "f"
    ));
}

#[test]
fn test_field_access_from_top_level_is_allowed() {
    let prog = program(vec![
        class_decl("A", None, vec![], vec![field("f", TypeExpr::Int)]),
        main_fn_with_locals(
            vec![var_decl("a", TypeExpr::Named("A".to_string()))],
            vec![expr_stmt(assign(field_of(ident("a"), "f"), int(5)))],
        ),
    ]);
    assert!(errors_of(&prog).is_empty());
}

#[test]
fn test_array_length_arity_checked() {
    let ok = program(vec![main_fn_with_locals(
        vec![var_decl("v", TypeExpr::Array(Box::new(sp(TypeExpr::Int))))],
        vec![print_stmt(vec![method_call(ident("v"), "length", vec![])])],
    )]);
    assert!(errors_of(&ok).is_empty());

    let bad = program(vec![main_fn_with_locals(
        vec![var_decl("v", TypeExpr::Array(Box::new(sp(TypeExpr::Int))))],
        vec![print_stmt(vec![method_call(ident("v"), "length", vec![int(1)])])],
    )]);
    let errors = errors_of(&bad);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        SemanticError::NumArgsMismatch { expected: 0, given: 1, .. }
    ));
}

#[test]
fn test_subscript_and_base_rules() {
    let bad_base = program(vec![main_fn_with_locals(
        vec![var_decl("x", TypeExpr::Int)],
        vec![expr_stmt(assign(index(ident("x"), int(0)), int(1)))],
    )]);
    let errors = errors_of(&bad_base);
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], SemanticError::BracketsOnNonArray { .. }));

    let bad_subscript = program(vec![main_fn_with_locals(
        vec![var_decl("v", TypeExpr::Array(Box::new(sp(TypeExpr::Int))))],
        vec![expr_stmt(assign(index(ident("v"), boolean(true)), int(1)))],
    )]);
    let errors = errors_of(&bad_subscript);
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], SemanticError::SubscriptNotInteger { .. }));
}

#[test]
fn test_new_array_rules() {
    let bad_size = program(vec![main_fn(vec![expr_stmt(new_array(
        boolean(true),
        TypeExpr::Int,
    ))])]);
    let errors = errors_of(&bad_size);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        SemanticError::NewArraySizeNotInteger { .. }
    ));

    let bad_elem = program(vec![main_fn(vec![expr_stmt(new_array(
        int(3),
        TypeExpr::Named("Nope".to_string()),
    ))])]);
    let errors = errors_of(&bad_elem);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        SemanticError::IdentifierNotDeclared { name, .. } if name == "Nope"
    ));
}

#[test]
fn test_call_arity_and_argument_conversion() {
    let decls = vec![sp(crate::common::ast::Decl::Fn(fn_decl(
        "f",
        TypeExpr::Void,
        vec![var_decl("n", TypeExpr::Int)],
        block(vec![], vec![]),
    )))];

    let wrong_arity = program_with_main(
        decls
            .iter()
            .cloned()
            .chain([main_like("go", vec![expr_stmt(call("f", vec![]))])])
            .collect(),
    );
    let errors = errors_of(&wrong_arity);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        SemanticError::NumArgsMismatch { expected: 1, given: 0, .. }
    ));

    let wrong_type = program_with_main(
        decls
            .iter()
            .cloned()
            .chain([main_like("go", vec![expr_stmt(call("f", vec![boolean(true)]))])])
            .collect(),
    );
    let errors = errors_of(&wrong_type);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        SemanticError::ArgMismatch { arg_num: 1, given: Type::Bool, expected: Type::Int, .. }
    ));
}

fn main_like(
    name: &str,
    stmts: Vec<crate::common::span::Spanned<Stmt>>,
) -> crate::common::span::Spanned<crate::common::ast::Decl> {
    sp(crate::common::ast::Decl::Fn(fn_decl(
        name,
        TypeExpr::Void,
        vec![],
        block(vec![], stmts),
    )))
}

// ----------------------------------------------------------------------
// Typed-AST structure
// ----------------------------------------------------------------------

#[test]
fn test_tast_embeds_layout_and_labels() {
    let prog = program(vec![
        class_decl(
            "A",
            None,
            vec![],
            vec![
                field("f", TypeExpr::Int),
                method("m", TypeExpr::Void, vec![], block(vec![], vec![])),
            ],
        ),
        main_fn(vec![]),
    ]);
    let (tast, _, errors) = run(&prog);
    assert!(errors.is_empty());

    let class = tast
        .decls
        .iter()
        .find_map(|decl| match decl {
            TDecl::Class(class) => Some(class),
            _ => None,
        })
        .expect("class A in typed AST");
    assert_eq!(class.instance_size, 2 * WORD_SIZE);
    assert_eq!(class.vtable, vec!["_A.m".to_string()]);
    assert_eq!(class.methods[0].label, "_A.m");
    assert!(class.methods[0].is_method);

    let main = tast
        .decls
        .iter()
        .find_map(|decl| match decl {
            TDecl::Function(func) if func.name == "main" => Some(func),
            _ => None,
        })
        .expect("main in typed AST");
    assert_eq!(main.label, "main");
    assert!(!main.is_method);
}

#[test]
fn test_span_join_covers_both() {
    let a = Span::new(3, 7);
    let b = Span::new(10, 12);
    assert_eq!(a.join(b), Span::new(3, 12));
}
