//! End-to-end compilation scenarios (spec.md §8), exercising the full
//! `libo::compile` pipeline rather than any single stage in isolation.

use libo::ast::{BodyElement, Expression, Member, Statement};
use libo::compile;
use libo::file::SourceFile;

fn diagnostic_kinds(output: &libo::CompileOutput) -> Vec<&'static str> {
    output.diagnostics.entries().iter().map(|d| d.kind).collect()
}

#[test]
fn minimal_well_formed_class_has_no_diagnostics() {
    let file = SourceFile::new("main.o", "class Main is this() is var x : Integer(10) end end");
    let output = compile(&file);

    assert!(output.succeeded(), "unexpected diagnostics: {:?}", diagnostic_kinds(&output));
    let hierarchy = output.hierarchy.as_ref().unwrap();
    assert!(hierarchy.contains("Main"));
    assert_eq!(hierarchy.base_of("Main").as_deref(), Some("Class"));

    let program = output.program.as_ref().unwrap();
    let Member::Constructor(ctor) = &program.classes[0].members[0] else {
        panic!("expected a constructor");
    };
    assert_eq!(ctor.body.elements.len(), 1);
    // Constant folding collapses `Integer(10)` to a literal (spec.md §4.7).
    let BodyElement::LocalField(field) = &ctor.body.elements[0] else {
        panic!("expected a field declaration");
    };
    match &field.initializer {
        Expression::IntegerLiteral(literal) => assert_eq!(literal.value, 10),
        other => panic!("expected a folded integer literal, got {other:?}"),
    }
}

#[test]
fn duplicate_class_is_reported_once() {
    let file = SourceFile::new("main.o", "class A is this() is end end  class A is this() is end end");
    let output = compile(&file);

    assert!(!output.succeeded());
    assert_eq!(diagnostic_kinds(&output), vec!["DuplicateClass"]);
}

#[test]
fn unknown_base_is_reported() {
    let file = SourceFile::new("main.o", "class A extends Nope is this() is end end");
    let output = compile(&file);

    assert!(!output.succeeded());
    assert_eq!(diagnostic_kinds(&output), vec!["UnknownBase"]);
}

#[test]
fn integer_widens_to_real_but_not_the_reverse() {
    let widening = SourceFile::new(
        "main.o",
        "class Main is this() is var x : Real(0.0) x := Integer(1) end end",
    );
    let output = compile(&widening);
    assert!(output.succeeded(), "unexpected diagnostics: {:?}", diagnostic_kinds(&output));

    let narrowing = SourceFile::new(
        "main.o",
        "class Main is this() is var y : Integer(0) y := Real(1.0) end end",
    );
    let output = compile(&narrowing);
    assert!(!output.succeeded());
    assert_eq!(diagnostic_kinds(&output), vec!["TypeMismatch"]);
}

#[test]
fn missing_return_is_reported() {
    let file = SourceFile::new("main.o", "class C is method f : Integer is var x : Integer(1) end end");
    let output = compile(&file);

    assert!(!output.succeeded());
    assert_eq!(diagnostic_kinds(&output), vec!["MissingReturn"]);
}

#[test]
fn constant_folding_collapses_intrinsic_arithmetic() {
    let file = SourceFile::new("main.o", "class C is this() is var x : Integer(2).Plus(Integer(3)) end end");
    let output = compile(&file);

    assert!(output.succeeded(), "unexpected diagnostics: {:?}", diagnostic_kinds(&output));
    let program = output.program.as_ref().unwrap();
    let Member::Constructor(ctor) = &program.classes[0].members[0] else {
        panic!("expected a constructor");
    };
    let BodyElement::LocalField(field) = &ctor.body.elements[0] else {
        panic!("expected a field declaration");
    };
    match &field.initializer {
        Expression::IntegerLiteral(literal) => assert_eq!(literal.value, 5),
        other => panic!("expected a folded integer literal, got {other:?}"),
    }
}

#[test]
fn a_class_hierarchy_inherits_fields_and_methods() {
    let file = SourceFile::new(
        "main.o",
        "class Animal is var name : Integer(0) this() is end method age : Integer => name end \
         class Dog extends Animal is this() is end end",
    );
    let output = compile(&file);

    assert!(output.succeeded(), "unexpected diagnostics: {:?}", diagnostic_kinds(&output));
    let hierarchy = output.hierarchy.as_ref().unwrap();
    assert!(hierarchy.is_ancestor("Dog", "Animal"));
    assert!(hierarchy.find_field("Dog", "name").is_some());
}

#[test]
fn dead_code_after_a_return_inside_a_loop_body_is_eliminated() {
    let file = SourceFile::new(
        "main.o",
        "class C is method f : Integer is \
            while Boolean(true) loop return Integer(1) var y : Integer(2) end \
            return Integer(0) \
         end end",
    );
    let output = compile(&file);
    assert!(output.succeeded(), "unexpected diagnostics: {:?}", diagnostic_kinds(&output));

    let program = output.program.as_ref().unwrap();
    let Member::Method(method) = &program.classes[0].members[0] else {
        panic!("expected a method");
    };
    let BodyElement::Statement(Statement::WhileLoop(loop_stmt)) = &method.body.elements[0] else {
        panic!("expected a while loop");
    };
    assert_eq!(loop_stmt.body.elements.len(), 1, "code after the loop's return must be truncated");
}

#[test]
fn running_the_pipeline_twice_yields_identical_diagnostics() {
    let file = SourceFile::new(
        "main.o",
        "class Main is this() is var x : Integer(2).Plus(Integer(3)) end end",
    );
    let first = compile(&file);
    let second = compile(&file);

    let first_wire: Vec<String> = first.diagnostics.entries().iter().map(ToString::to_string).collect();
    let second_wire: Vec<String> = second.diagnostics.entries().iter().map(ToString::to_string).collect();
    assert_eq!(first_wire, second_wire);
    assert_eq!(format!("{:?}", first.program), format!("{:?}", second.program));
}
