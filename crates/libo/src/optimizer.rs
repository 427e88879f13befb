//! Optimizer (spec.md §4.7): constant folding, boolean-condition folding,
//! dead-code elimination, and call normalization, over an already
//! type-checked `Program`. Purely transformational — never emits
//! diagnostics — and idempotent: every rewrite is a pure function of its
//! input, so a second pass that finds nothing foldable is a no-op fixed
//! point.
//!
//! Folded replacement nodes reuse the original node's `AstIndex` and
//! position rather than minting a fresh one, so the Semantic Checker's
//! `Annotations` (keyed by `AstIndex`) stay valid against the optimized tree
//! without re-keying (DESIGN.md "Open Question decisions" #4/#5).

use std::rc::Rc;

use crate::ast::{
    Assignment, Body, BodyElement, CallCallee, ClassDeclaration, ClassName, ConstructorDeclaration, ConstructorInvocation, Expression, FieldDeclaration, FunctionalCall, IfStatement,
    IntegerLiteral, Member, MethodDeclaration, Program, RealLiteral, ReturnStatement, Statement, WhileLoop,
};
use crate::ast::AstIndex;
use crate::hierarchy::{ClassHierarchy, INTRINSIC_ARITHMETIC_METHODS};
use crate::position::SourcePosition;

/// Runs every optimizer transformation over `program` once, returning a new,
/// semantically equivalent `Program` (spec.md §4.7).
pub fn optimize(program: &Program, hierarchy: &ClassHierarchy) -> Program {
    Program {
        classes: program.classes.iter().map(|class| optimize_class(class, hierarchy)).collect(),
    }
}

fn optimize_class(class: &Rc<ClassDeclaration>, hierarchy: &ClassHierarchy) -> Rc<ClassDeclaration> {
    Rc::new(ClassDeclaration {
        index: class.index,
        name: class.name.clone(),
        base_name: class.base_name.clone(),
        members: class.members.iter().map(|member| optimize_member(member, hierarchy)).collect(),
        position: class.position.clone(),
    })
}

fn optimize_member(member: &Member, hierarchy: &ClassHierarchy) -> Member {
    match member {
        Member::Field(field) => Member::Field(FieldDeclaration {
            name: field.name.clone(),
            initializer: fold_expression(&field.initializer, hierarchy),
        }),
        Member::Method(method) => Member::Method(MethodDeclaration {
            header: method.header.clone(),
            body: optimize_body(&method.body, hierarchy),
        }),
        Member::Constructor(ctor) => Member::Constructor(ConstructorDeclaration {
            parameters: ctor.parameters.clone(),
            body: optimize_body(&ctor.body, hierarchy),
            position: ctor.position.clone(),
        }),
    }
}

/// Folds every element of `body`, flattening literal-condition `if`/`while`
/// statements in place, then drops everything after the first definitely-
/// terminating `return` in the resulting block (spec.md §4.7 "after folding").
fn optimize_body(body: &Body, hierarchy: &ClassHierarchy) -> Body {
    let mut elements = Vec::new();
    for element in &body.elements {
        elements.extend(optimize_body_element(element, hierarchy));
    }

    if let Some(position) = elements.iter().position(|element| matches!(element, BodyElement::Statement(Statement::Return(_)))) {
        elements.truncate(position + 1);
    }

    Body { elements }
}

/// Returns the replacement element(s) for one body element: usually exactly
/// one, zero for a deleted `while false`/`if false` with no `else`, or the
/// inlined contents of a branch whose condition folded to a literal.
fn optimize_body_element(element: &BodyElement, hierarchy: &ClassHierarchy) -> Vec<BodyElement> {
    match element {
        BodyElement::LocalField(field) => vec![BodyElement::LocalField(FieldDeclaration {
            name: field.name.clone(),
            initializer: fold_expression(&field.initializer, hierarchy),
        })],
        BodyElement::Expression(expression) => vec![BodyElement::Expression(fold_expression(expression, hierarchy))],
        BodyElement::Statement(Statement::Assignment(assignment)) => vec![BodyElement::Statement(Statement::Assignment(Assignment {
            target: assignment.target.clone(),
            expression: fold_expression(&assignment.expression, hierarchy),
        }))],
        BodyElement::Statement(Statement::Return(return_statement)) => vec![BodyElement::Statement(Statement::Return(ReturnStatement {
            expression: return_statement.expression.as_ref().map(|expression| fold_expression(expression, hierarchy)),
            position: return_statement.position.clone(),
        }))],
        BodyElement::Statement(Statement::WhileLoop(while_loop)) => {
            let condition = fold_expression(&while_loop.condition, hierarchy);
            if literal_bool(&condition) == Some(false) {
                return Vec::new();
            }
            let body = optimize_body(&while_loop.body, hierarchy);
            vec![BodyElement::Statement(Statement::WhileLoop(WhileLoop { condition, body }))]
        }
        BodyElement::Statement(Statement::IfStatement(if_statement)) => {
            let condition = fold_expression(&if_statement.condition, hierarchy);
            let then_body = optimize_body(&if_statement.then_body, hierarchy);
            let else_body = if_statement.else_body.as_ref().map(|body| optimize_body(body, hierarchy));

            match literal_bool(&condition) {
                Some(true) => then_body.elements,
                Some(false) => else_body.map(|body| body.elements).unwrap_or_default(),
                None => vec![BodyElement::Statement(Statement::IfStatement(IfStatement { condition, then_body, else_body }))],
            }
        }
    }
}

/// Folds `expression` bottom-up: subexpressions are folded first, then the
/// node itself is checked against the fixed set of foldable shapes
/// (constant-folded constructor/arithmetic calls, normalized identifier
/// calls).
fn fold_expression(expression: &Expression, hierarchy: &ClassHierarchy) -> Expression {
    match expression {
        Expression::IntegerLiteral(_) | Expression::RealLiteral(_) | Expression::BooleanLiteral(_) | Expression::ThisExpression { .. } | Expression::IdentifierExpression(_) => expression.clone(),
        Expression::MemberAccess(access) => Expression::MemberAccess(crate::ast::MemberAccess {
            index: access.index,
            target: Box::new(fold_expression(&access.target, hierarchy)),
            member: access.member.clone(),
            position: access.position.clone(),
        }),
        Expression::ConstructorInvocation(invocation) => fold_constructor_invocation(invocation, hierarchy),
        Expression::FunctionalCall(call) => fold_functional_call(call, hierarchy),
    }
}

fn fold_constructor_invocation(invocation: &ConstructorInvocation, hierarchy: &ClassHierarchy) -> Expression {
    let arguments: Vec<Expression> = invocation.arguments.iter().map(|argument| fold_expression(argument, hierarchy)).collect();

    if let [single] = arguments.as_slice() {
        if let Some(folded) = fold_primitive_literal(&invocation.class_name.name.text, single, invocation.index, &invocation.position) {
            return folded;
        }
    }

    Expression::ConstructorInvocation(ConstructorInvocation {
        index: invocation.index,
        class_name: invocation.class_name.clone(),
        arguments,
        position: invocation.position.clone(),
    })
}

fn fold_functional_call(call: &FunctionalCall, hierarchy: &ClassHierarchy) -> Expression {
    let arguments: Vec<Expression> = call.arguments.iter().map(|argument| fold_expression(argument, hierarchy)).collect();

    match call.callee.as_ref() {
        CallCallee::Identifier(identifier) if hierarchy.contains(&identifier.name.text) => {
            // Call normalization: rewrite to a ConstructorInvocation of the
            // same class, reusing this call's own index/position.
            let class_name = ClassName { name: identifier.name.clone(), generic_parameter: None };

            if let [single] = arguments.as_slice() {
                if let Some(folded) = fold_primitive_literal(&class_name.name.text, single, call.index, &call.position) {
                    return folded;
                }
            }

            Expression::ConstructorInvocation(ConstructorInvocation { index: call.index, class_name, arguments, position: call.position.clone() })
        }
        CallCallee::Identifier(identifier) => Expression::FunctionalCall(FunctionalCall {
            index: call.index,
            callee: Box::new(CallCallee::Identifier(identifier.clone())),
            arguments,
            position: call.position.clone(),
        }),
        CallCallee::MemberAccess(access) => {
            let target = fold_expression(&access.target, hierarchy);

            if let [single] = arguments.as_slice() {
                if let Some(folded) = fold_arithmetic(&target, &access.member.text, single, call.index, &call.position) {
                    return folded;
                }
            }

            let access = crate::ast::MemberAccess {
                index: access.index,
                target: Box::new(target),
                member: access.member.clone(),
                position: access.position.clone(),
            };
            Expression::FunctionalCall(FunctionalCall { index: call.index, callee: Box::new(CallCallee::MemberAccess(access)), arguments, position: call.position.clone() })
        }
    }
}

/// `Integer`/`Real`/`Boolean` constructed from one already-folded literal
/// argument collapse to that literal (spec.md §4.7 "Constant folding").
fn fold_primitive_literal(class_name: &str, argument: &Expression, index: AstIndex, position: &SourcePosition) -> Option<Expression> {
    match class_name {
        "Integer" => literal_int(argument).map(|value| Expression::IntegerLiteral(IntegerLiteral { index, value, position: position.clone() })),
        "Real" => literal_real(argument).map(|value| Expression::RealLiteral(RealLiteral { index, value, position: position.clone() })),
        "Boolean" => literal_bool(argument).map(|value| Expression::BooleanLiteral(crate::ast::BooleanLiteral { index, value, position: position.clone() })),
        _ => None,
    }
}

/// A known arithmetic method called with a literal receiver and a literal
/// argument computes at compile time; division by zero suppresses folding
/// and leaves the call in place (spec.md §4.7).
fn fold_arithmetic(receiver: &Expression, method_name: &str, argument: &Expression, index: AstIndex, position: &SourcePosition) -> Option<Expression> {
    if !INTRINSIC_ARITHMETIC_METHODS.contains(&method_name) {
        return None;
    }

    if let (Expression::IntegerLiteral(receiver), Expression::IntegerLiteral(argument)) = (receiver, argument) {
        let value = match method_name {
            "Plus" => receiver.value.wrapping_add(argument.value),
            "Minus" => receiver.value.wrapping_sub(argument.value),
            "Times" => receiver.value.wrapping_mul(argument.value),
            "Divide" if argument.value == 0 => return None,
            "Divide" => receiver.value.wrapping_div(argument.value),
            _ => unreachable!("closed intrinsic arithmetic set"),
        };
        return Some(Expression::IntegerLiteral(IntegerLiteral { index, value, position: position.clone() }));
    }

    if let Expression::RealLiteral(receiver) = receiver {
        let argument = literal_real(argument)?;
        let value = match method_name {
            "Plus" => receiver.value + argument,
            "Minus" => receiver.value - argument,
            "Times" => receiver.value * argument,
            "Divide" if argument == 0.0 => return None,
            "Divide" => receiver.value / argument,
            _ => unreachable!("closed intrinsic arithmetic set"),
        };
        return Some(Expression::RealLiteral(RealLiteral { index, value, position: position.clone() }));
    }

    None
}

fn literal_int(expression: &Expression) -> Option<i64> {
    match expression {
        Expression::IntegerLiteral(literal) => Some(literal.value),
        _ => None,
    }
}

/// Widens an integer literal the way `Integer -> Real` assignability does,
/// so `Real(5)` folds to `5.0` the same as `Real(5.0)` folds to `5.0`.
fn literal_real(expression: &Expression) -> Option<f64> {
    match expression {
        Expression::RealLiteral(literal) => Some(literal.value),
        Expression::IntegerLiteral(literal) => Some(literal.value as f64),
        _ => None,
    }
}

fn literal_bool(expression: &Expression) -> Option<bool> {
    match expression {
        Expression::BooleanLiteral(literal) => Some(literal.value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::check;
    use crate::file::SourceFile;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn optimize_source(code: &str) -> Program {
        let file = SourceFile::new("t.o", code);
        let tokens = tokenize(&file).unwrap();
        let program = parse(&tokens, &file).unwrap();
        let (hierarchy, _, diagnostics) = check(&program, &file);
        assert!(!diagnostics.has_errors(), "unexpected errors: {:?}", diagnostics.entries());
        optimize(&program, &hierarchy)
    }

    fn first_field_initializer(program: &Program) -> Expression {
        let class = &program.classes[0];
        for member in &class.members {
            if let Member::Constructor(ctor) = member {
                for element in &ctor.body.elements {
                    if let BodyElement::LocalField(field) = element {
                        return field.initializer.clone();
                    }
                }
            }
        }
        panic!("no constructor field declaration found");
    }

    #[test]
    fn folds_integer_constructor_to_a_literal() {
        let program = optimize_source("class Main is this() is var x : Integer(10) end end");
        assert!(matches!(first_field_initializer(&program), Expression::IntegerLiteral(literal) if literal.value == 10));
    }

    #[test]
    fn folds_normalized_identifier_call_to_a_literal() {
        // `Integer` parses as a bare-identifier FunctionalCall, not a
        // ConstructorInvocation; normalization happens inside the fold.
        let program = optimize_source("class Main is this() is var x : Integer(7) end end");
        assert!(matches!(first_field_initializer(&program), Expression::IntegerLiteral(literal) if literal.value == 7));
    }

    #[test]
    fn folds_arithmetic_on_literal_receiver_and_argument() {
        let program = optimize_source("class Main is this() is var x : Integer(3).Plus(Integer(4)) end end");
        assert!(matches!(first_field_initializer(&program), Expression::IntegerLiteral(literal) if literal.value == 7));
    }

    #[test]
    fn suppresses_folding_on_division_by_zero() {
        let program = optimize_source("class Main is this() is var x : Integer(3).Divide(Integer(0)) end end");
        assert!(matches!(first_field_initializer(&program), Expression::FunctionalCall(_)));
    }

    #[test]
    fn deletes_while_false_loop() {
        let program = optimize_source("class Main is this() is while Boolean(false) loop var y : Integer(1) end end end");
        let ctor = match &program.classes[0].members[0] {
            Member::Constructor(ctor) => ctor,
            _ => panic!("expected constructor"),
        };
        assert!(ctor.body.elements.is_empty());
    }

    #[test]
    fn inlines_if_true_branch() {
        let program = optimize_source("class Main is this() is if Boolean(true) then var y : Integer(1) else var y : Integer(2) end end end");
        let ctor = match &program.classes[0].members[0] {
            Member::Constructor(ctor) => ctor,
            _ => panic!("expected constructor"),
        };
        assert_eq!(ctor.body.elements.len(), 1);
        match &ctor.body.elements[0] {
            BodyElement::LocalField(field) => assert!(matches!(field.initializer, Expression::IntegerLiteral(ref literal) if literal.value == 1)),
            other => panic!("expected a local field, got {other:?}"),
        }
    }

    #[test]
    fn removes_statements_after_a_return() {
        // A while body's own liveness never affects the enclosing method
        // (spec.md §4.6 pass 6 "WhileLoop bodies do not satisfy liveness"),
        // so it is a way to have a checker-clean method whose nested block
        // still carries dead code for the optimizer to strip.
        let program = optimize_source(
            "class Main is this() is \
             while Boolean(true) loop return Integer(1) var y : Integer(2) end \
             return Integer(3) \
             end end",
        );
        let ctor = match &program.classes[0].members[0] {
            Member::Constructor(ctor) => ctor,
            _ => panic!("expected constructor"),
        };
        let while_loop = match &ctor.body.elements[0] {
            BodyElement::Statement(Statement::WhileLoop(while_loop)) => while_loop,
            other => panic!("expected a while loop, got {other:?}"),
        };
        assert_eq!(while_loop.body.elements.len(), 1);
        assert!(matches!(while_loop.body.elements[0], BodyElement::Statement(Statement::Return(_))));
    }

    #[test]
    fn is_idempotent() {
        let file = SourceFile::new("t.o", "class Main is this() is var x : Integer(3).Plus(Integer(4)) end end");
        let tokens = tokenize(&file).unwrap();
        let program = parse(&tokens, &file).unwrap();
        let (hierarchy, _, diagnostics) = check(&program, &file);
        assert!(!diagnostics.has_errors());

        let once = optimize(&program, &hierarchy);
        let twice = optimize(&once, &hierarchy);
        assert_eq!(format!("{once:?}"), format!("{twice:?}"));
    }
}
