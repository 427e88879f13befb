//! Field-type inference and expression annotation (spec.md §4.6 pass 4).
//!
//! A `FieldDeclaration` carries no type annotation of its own; a field's
//! static type is whatever its initializer expression evaluates to. Base
//! classes are processed before subclasses so a subclass field initializer
//! can see its inherited siblings.

use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{CallCallee, ClassName, Expression, Member, Program};
use crate::diagnostics::DiagnosticsBag;
use crate::error::OErrorKind;
use crate::file::SourceFile;
use crate::hierarchy::{ClassHierarchy, ConstructorLookup, MethodLookup};
use crate::scope::Scope;
use crate::types::{TypeFactory, TypeSymbol};

use super::{Annotations, Context, FieldTypes, ResolvedConstructor, ResolvedMethod};

pub(crate) fn collect_all_field_types(
    program: &Program,
    hierarchy: &ClassHierarchy,
    factory: &TypeFactory,
    annotations: &mut Annotations,
    diagnostics: &mut DiagnosticsBag,
    file: &SourceFile,
) -> FieldTypes {
    let mut memo: FieldTypes = IndexMap::new();
    for class in &program.classes {
        let mut visiting = HashSet::new();
        collect_field_types(&class.name.name.text, hierarchy, factory, &mut memo, &mut visiting, annotations, diagnostics, file);
    }
    memo
}

fn collect_field_types(
    class_name: &Rc<str>,
    hierarchy: &ClassHierarchy,
    factory: &TypeFactory,
    memo: &mut FieldTypes,
    visiting: &mut HashSet<Rc<str>>,
    annotations: &mut Annotations,
    diagnostics: &mut DiagnosticsBag,
    file: &SourceFile,
) -> IndexMap<Rc<str>, TypeSymbol> {
    if let Some(existing) = memo.get(class_name.as_ref()) {
        return existing.clone();
    }

    // Cyclic-Inheritance was already diagnosed by pass 2; break the loop here
    // rather than recursing forever.
    if !visiting.insert(class_name.clone()) {
        return IndexMap::new();
    }

    let mut fields = match hierarchy.resolve(class_name) {
        Some(declaration) => match &declaration.base_name {
            Some(base) if hierarchy.contains(&base.text) => {
                collect_field_types(&base.text, hierarchy, factory, memo, visiting, annotations, diagnostics, file)
            }
            _ => IndexMap::new(),
        },
        None => IndexMap::new(),
    };

    if let Some(declaration) = hierarchy.resolve(class_name) {
        for member in &declaration.members {
            if let Member::Field(field) = member {
                if fields.contains_key(field.name.text.as_ref()) {
                    // Already flagged by the member-uniqueness pass for a
                    // same-class redeclaration; an inherited name is shadowed
                    // intentionally and not an error.
                    continue;
                }
                let scope = Scope::new(fields.clone());
                let context = Context { hierarchy, factory, field_types: memo, file };
                let ty = annotate_expression(&field.initializer, class_name, &scope, &context, annotations, diagnostics);
                fields.insert(field.name.text.clone(), ty);
            }
        }
    }

    memo.insert(class_name.clone(), fields.clone());
    visiting.remove(class_name);
    fields
}

/// Annotates `expression` with its static type, recording the result (and
/// any resolved call/constructor) into `annotations`, emitting diagnostics on
/// failure and returning a best-effort fallback type so the caller can keep
/// checking the surrounding body instead of aborting.
pub(crate) fn annotate_expression(
    expression: &Expression,
    self_class: &str,
    scope: &Scope,
    ctx: &Context<'_>,
    annotations: &mut Annotations,
    diagnostics: &mut DiagnosticsBag,
) -> TypeSymbol {
    let ty = match expression {
        Expression::IntegerLiteral(_) => TypeFactory::integer(),
        Expression::RealLiteral(_) => TypeFactory::real(),
        Expression::BooleanLiteral(_) => TypeFactory::boolean(),
        Expression::ThisExpression { .. } => ctx.factory.reference(self_class),
        Expression::IdentifierExpression(identifier) => {
            if let Some(binding) = scope.resolve(&identifier.name.text) {
                binding.ty.clone()
            } else if ctx.hierarchy.contains(&identifier.name.text) {
                // I5: an identifier may also resolve to a class name.
                ctx.factory.reference(&identifier.name.text)
            } else {
                diagnostics.push_error(&OErrorKind::unknown_identifier(identifier.name.text.to_string(), &identifier.name.position, ctx.file));
                TypeFactory::any_value()
            }
        }
        Expression::MemberAccess(access) => {
            let target_type = annotate_expression(&access.target, self_class, scope, ctx, annotations, diagnostics);
            match field_type_on(&target_type, &access.member.text, ctx) {
                Some(ty) => ty,
                None => {
                    diagnostics.push_error(&OErrorKind::unknown_member(target_type.name(), access.member.text.to_string(), &access.position, ctx.file));
                    TypeFactory::any_value()
                }
            }
        }
        Expression::ConstructorInvocation(invocation) => {
            annotate_constructor_invocation(&invocation.class_name, &invocation.arguments, invocation.index, &invocation.position, self_class, scope, ctx, annotations, diagnostics)
        }
        Expression::FunctionalCall(call) => annotate_functional_call(call, self_class, scope, ctx, annotations, diagnostics),
    };

    annotations.types.insert(expression.index(), ty.clone());
    ty
}

/// Field lookup for a `MemberAccess` target: only a reference-typed target
/// can carry fields (spec.md §4.6 pass 4 "MemberAccess on target of
/// reference type R").
fn field_type_on(target_type: &TypeSymbol, member_name: &str, ctx: &Context<'_>) -> Option<TypeSymbol> {
    let TypeSymbol::Reference(class_name) = target_type else {
        return None;
    };

    if let Some(fields) = ctx.field_types.get(class_name.as_ref()) {
        if let Some(ty) = fields.get(member_name) {
            return Some(ty.clone());
        }
    }

    ctx.hierarchy
        .find_field(class_name, member_name)
        .and_then(|(owner, _)| ctx.field_types.get(owner.as_ref()).and_then(|fields| fields.get(member_name).cloned()))
}

fn annotate_constructor_invocation(
    class_name: &ClassName,
    arguments: &[Expression],
    index: crate::ast::AstIndex,
    position: &crate::position::SourcePosition,
    self_class: &str,
    scope: &Scope,
    ctx: &Context<'_>,
    annotations: &mut Annotations,
    diagnostics: &mut DiagnosticsBag,
) -> TypeSymbol {
    let argument_types: Vec<TypeSymbol> = arguments.iter().map(|argument| annotate_expression(argument, self_class, scope, ctx, annotations, diagnostics)).collect();

    let base = class_name.name.text.as_ref();
    if !ctx.hierarchy.contains(base) {
        diagnostics.push_error(&OErrorKind::unknown_type(base.to_string(), position, ctx.file));
        return TypeFactory::any_value();
    }

    // Resolved through the same path a declared type annotation uses so a
    // constructed `Integer`/`Real`/`Boolean` yields a primitive symbol (and
    // `Array[T]`/`List[T]` keep their element type) rather than a bare class
    // reference.
    let result_type = ctx.factory.resolve_class_name(class_name);

    match ctx.hierarchy.find_constructor(base, &argument_types, ctx.factory) {
        ConstructorLookup::Found { parameter_types } => {
            annotations.constructors.insert(index, ResolvedConstructor { owner: Rc::from(base), parameter_types });
        }
        ConstructorLookup::ImplicitDefault => {
            annotations.constructors.insert(index, ResolvedConstructor { owner: Rc::from(base), parameter_types: Vec::new() });
        }
        ConstructorLookup::Ambiguous => {
            diagnostics.push_error(&OErrorKind::ambiguous_call(base.to_string(), "<init>".to_string(), position, ctx.file));
        }
        ConstructorLookup::NotFound => {
            let found = argument_types.iter().map(TypeSymbol::name).collect::<Vec<_>>().join(", ");
            diagnostics.push_error(&OErrorKind::type_mismatch(format!("constructor of '{base}'"), format!("arguments ({found})"), position, ctx.file));
        }
    }

    result_type
}

fn annotate_functional_call(
    call: &crate::ast::FunctionalCall,
    self_class: &str,
    scope: &Scope,
    ctx: &Context<'_>,
    annotations: &mut Annotations,
    diagnostics: &mut DiagnosticsBag,
) -> TypeSymbol {
    let argument_types: Vec<TypeSymbol> = call.arguments.iter().map(|argument| annotate_expression(argument, self_class, scope, ctx, annotations, diagnostics)).collect();

    match call.callee.as_ref() {
        CallCallee::Identifier(identifier) if ctx.hierarchy.contains(&identifier.name.text) => {
            // Call normalization (spec.md §4.7) rewrites this to a
            // ConstructorInvocation after checking; resolve it as one now so
            // the rewrite is guaranteed to type-check (spec.md §9 P5). A bare
            // identifier callee never carries a generic parameter.
            let synthetic_name = ClassName { name: identifier.name.clone(), generic_parameter: None };
            annotate_constructor_invocation(&synthetic_name, &call.arguments, call.index, &call.position, self_class, scope, ctx, annotations, diagnostics)
        }
        CallCallee::Identifier(identifier) => {
            resolve_method_call(self_class.into(), &identifier.name.text, &argument_types, call.index, &call.position, ctx, annotations, diagnostics)
        }
        CallCallee::MemberAccess(access) => {
            let target_type = annotate_expression(&access.target, self_class, scope, ctx, annotations, diagnostics);
            let method_type = match &target_type {
                TypeSymbol::Reference(receiver) => resolve_method_call(receiver.clone(), &access.member.text, &argument_types, call.index, &call.position, ctx, annotations, diagnostics),
                other => {
                    diagnostics.push_error(&OErrorKind::unknown_member(other.name(), access.member.text.to_string(), &access.position, ctx.file));
                    TypeSymbol::Unit
                }
            };
            annotations.types.insert(access.index, method_type.clone());
            method_type
        }
    }
}

/// Resolves a declared type (parameter, method return type) to a symbol,
/// diagnosing `UnknownType` for a named class (or generic element) that does
/// not resolve in the hierarchy.
pub(crate) fn resolve_checked_type(class_name: &ClassName, ctx: &Context<'_>, diagnostics: &mut DiagnosticsBag) -> TypeSymbol {
    validate_class_name(class_name, ctx, diagnostics);
    ctx.factory.resolve_class_name(class_name)
}

fn validate_class_name(class_name: &ClassName, ctx: &Context<'_>, diagnostics: &mut DiagnosticsBag) {
    let base = class_name.name.text.as_ref();
    if !matches!(base, "Integer" | "Real" | "Boolean" | "AnyValue" | "Array" | "List") && !ctx.hierarchy.contains(base) {
        diagnostics.push_error(&OErrorKind::unknown_type(base.to_string(), &class_name.name.position, ctx.file));
    }
    if let Some(inner) = &class_name.generic_parameter {
        validate_class_name(inner, ctx, diagnostics);
    }
}

fn resolve_method_call(
    receiver: Rc<str>,
    method_name: &str,
    argument_types: &[TypeSymbol],
    index: crate::ast::AstIndex,
    position: &crate::position::SourcePosition,
    ctx: &Context<'_>,
    annotations: &mut Annotations,
    diagnostics: &mut DiagnosticsBag,
) -> TypeSymbol {
    match ctx.hierarchy.find_method(&receiver, method_name, argument_types, ctx.factory) {
        MethodLookup::Found { owner, method } => {
            let return_type = method.header.return_type.as_ref().map(|rt| ctx.factory.resolve_class_name(rt));
            let result = return_type.clone().unwrap_or(TypeSymbol::Unit);
            annotations
                .calls
                .insert(index, ResolvedMethod { owner, method_name: method.header.name.text.clone(), return_type });
            result
        }
        MethodLookup::Intrinsic { owner, method_name: name, return_type } => {
            annotations.calls.insert(index, ResolvedMethod { owner, method_name: name, return_type: Some(return_type.clone()) });
            return_type
        }
        MethodLookup::Ambiguous => {
            diagnostics.push_error(&OErrorKind::ambiguous_call(receiver.to_string(), method_name.to_string(), position, ctx.file));
            TypeSymbol::Unit
        }
        MethodLookup::NotFound => {
            diagnostics.push_error(&OErrorKind::unknown_member(receiver.to_string(), method_name.to_string(), position, ctx.file));
            TypeSymbol::Unit
        }
    }
}
