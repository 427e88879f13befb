//! Per-member body checking: scope setup, assignment & return typing
//! (spec.md §4.6 pass 5), and control-flow liveness (pass 6).

use crate::ast::{Assignment, Body, BodyElement, ClassDeclaration, ConstructorDeclaration, MethodDeclaration, ReturnStatement, Statement};
use crate::diagnostics::DiagnosticsBag;
use crate::error::OErrorKind;
use crate::scope::{BindingKind, Scope};
use crate::types::TypeSymbol;

use super::expr::{annotate_expression, resolve_checked_type};
use super::{Annotations, Context};

pub(crate) fn check_method(class: &ClassDeclaration, method: &MethodDeclaration, ctx: &Context<'_>, annotations: &mut Annotations, diagnostics: &mut DiagnosticsBag) {
    let self_class = class.name.name.text.as_ref();
    let fields = ctx.field_types.get(self_class).cloned().unwrap_or_default();
    let mut scope = Scope::new(fields);

    for parameter in &method.header.parameters {
        let ty = resolve_checked_type(&parameter.type_name, ctx, diagnostics);
        scope.push_parameter(parameter.name.text.clone(), ty);
    }

    let return_type = method.header.return_type.as_ref().map(|rt| resolve_checked_type(rt, ctx, diagnostics));
    let method_name = method.header.name.text.as_ref();

    let definitely_returns = check_body(&method.body, self_class, &mut scope, return_type.as_ref(), method_name, ctx, annotations, diagnostics);

    if return_type.is_some() && !definitely_returns {
        diagnostics.push_error(&OErrorKind::missing_return(method_name.to_string(), &method.header.name.position, ctx.file));
    }
}

pub(crate) fn check_constructor(class: &ClassDeclaration, ctor: &ConstructorDeclaration, ctx: &Context<'_>, annotations: &mut Annotations, diagnostics: &mut DiagnosticsBag) {
    let self_class = class.name.name.text.as_ref();
    let fields = ctx.field_types.get(self_class).cloned().unwrap_or_default();
    let mut scope = Scope::new(fields);

    for parameter in &ctor.parameters {
        let ty = resolve_checked_type(&parameter.type_name, ctx, diagnostics);
        scope.push_parameter(parameter.name.text.clone(), ty);
    }

    // Constructors never declare a return type (SPEC_FULL.md §9 Open
    // Question resolution: a `return <expr>` here is always
    // Unexpected-Return-Value); liveness is not required of them.
    let label = format!("constructor of '{self_class}'");
    check_body(&ctor.body, self_class, &mut scope, None, &label, ctx, annotations, diagnostics);
}

/// Walks `body`'s elements in order, annotating every expression, checking
/// assignments and returns, and reporting whether `body` is "definitely
/// returning" per spec.md §4.6 pass 6 (decided solely by its LAST element).
fn check_body(
    body: &Body,
    self_class: &str,
    scope: &mut Scope,
    return_type: Option<&TypeSymbol>,
    method_name: &str,
    ctx: &Context<'_>,
    annotations: &mut Annotations,
    diagnostics: &mut DiagnosticsBag,
) -> bool {
    let mut definitely_returns = false;

    for element in &body.elements {
        definitely_returns = false;
        match element {
            BodyElement::LocalField(field) => {
                let ty = annotate_expression(&field.initializer, self_class, scope, ctx, annotations, diagnostics);
                scope.declare_local(field.name.text.clone(), ty);
            }
            BodyElement::Expression(expression) => {
                annotate_expression(expression, self_class, scope, ctx, annotations, diagnostics);
            }
            BodyElement::Statement(Statement::Assignment(assignment)) => {
                check_assignment(assignment, self_class, scope, ctx, annotations, diagnostics);
            }
            BodyElement::Statement(Statement::WhileLoop(while_loop)) => {
                annotate_expression(&while_loop.condition, self_class, scope, ctx, annotations, diagnostics);
                // A while body never satisfies liveness: the condition may
                // be false on entry, so its result is discarded.
                check_body(&while_loop.body, self_class, scope, return_type, method_name, ctx, annotations, diagnostics);
            }
            BodyElement::Statement(Statement::IfStatement(if_statement)) => {
                annotate_expression(&if_statement.condition, self_class, scope, ctx, annotations, diagnostics);
                let then_returns = check_body(&if_statement.then_body, self_class, scope, return_type, method_name, ctx, annotations, diagnostics);
                let else_returns = match &if_statement.else_body {
                    Some(else_body) => check_body(else_body, self_class, scope, return_type, method_name, ctx, annotations, diagnostics),
                    None => false,
                };
                definitely_returns = then_returns && else_returns;
            }
            BodyElement::Statement(Statement::Return(return_statement)) => {
                check_return(return_statement, self_class, scope, return_type, method_name, ctx, annotations, diagnostics);
                definitely_returns = true;
            }
        }
    }

    definitely_returns
}

fn check_assignment(assignment: &Assignment, self_class: &str, scope: &Scope, ctx: &Context<'_>, annotations: &mut Annotations, diagnostics: &mut DiagnosticsBag) {
    let expression_type = annotate_expression(&assignment.expression, self_class, scope, ctx, annotations, diagnostics);

    match scope.resolve(&assignment.target.text) {
        Some(binding) if binding.kind == BindingKind::Parameter => {
            diagnostics.push_error(&OErrorKind::unknown_identifier(
                format!("cannot assign to parameter '{}'", assignment.target.text),
                &assignment.target.position,
                ctx.file,
            ));
        }
        Some(binding) => {
            if !expression_type.is_assignable_to(&binding.ty, ctx.hierarchy) {
                diagnostics.push_error(&OErrorKind::type_mismatch(binding.ty.name(), expression_type.name(), &assignment.target.position, ctx.file));
            }
        }
        None => {
            diagnostics.push_error(&OErrorKind::unknown_identifier(assignment.target.text.to_string(), &assignment.target.position, ctx.file));
        }
    }
}

fn check_return(
    return_statement: &ReturnStatement,
    self_class: &str,
    scope: &Scope,
    return_type: Option<&TypeSymbol>,
    method_name: &str,
    ctx: &Context<'_>,
    annotations: &mut Annotations,
    diagnostics: &mut DiagnosticsBag,
) {
    match (&return_statement.expression, return_type) {
        (Some(expression), Some(expected)) => {
            let found = annotate_expression(expression, self_class, scope, ctx, annotations, diagnostics);
            if !found.is_assignable_to(expected, ctx.hierarchy) {
                diagnostics.push_error(&OErrorKind::type_mismatch(expected.name(), found.name(), &return_statement.position, ctx.file));
            }
        }
        (Some(expression), None) => {
            annotate_expression(expression, self_class, scope, ctx, annotations, diagnostics);
            diagnostics.push_error(&OErrorKind::unexpected_return_value(method_name.to_string(), &return_statement.position, ctx.file));
        }
        (None, Some(expected)) => {
            diagnostics.push_error(&OErrorKind::type_mismatch(expected.name(), "unit".to_string(), &return_statement.position, ctx.file));
        }
        (None, None) => {}
    }
}
