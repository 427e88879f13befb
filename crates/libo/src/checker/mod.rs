//! Semantic Checker: six ordered passes over a parsed `Program` (spec.md
//! §4.6). Each pass is a free function taking the program, the hierarchy
//! being built, the annotation maps, and the diagnostics bag, run in the
//! fixed order the spec lists — grounded in the teacher's two-phase
//! `ResolveAst` trait (`tir/mod.rs`), flattened into named top-level passes
//! since the O language is single-file and needs no forward-declared
//! cross-module signature phase.

mod body;
mod expr;

use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{AstIndex, ConstructorDeclaration, Ident, Member, MethodDeclaration, Program};
use crate::diagnostics::DiagnosticsBag;
use crate::error::OErrorKind;
use crate::file::SourceFile;
use crate::hierarchy::ClassHierarchy;
use crate::types::{TypeFactory, TypeSymbol};

/// The resolved method a `FunctionalCall` was bound to (spec.md §4.8).
#[derive(Debug, Clone)]
pub struct ResolvedMethod {
    pub owner: Rc<str>,
    pub method_name: Rc<str>,
    pub return_type: Option<TypeSymbol>,
}

/// The resolved constructor a `ConstructorInvocation` was bound to.
/// `None` when the class has no declared constructor and the call bound to
/// the implicit zero-argument default (SPEC_FULL.md §9 Open Question
/// resolution, see DESIGN.md).
#[derive(Debug, Clone)]
pub struct ResolvedConstructor {
    pub owner: Rc<str>,
    pub parameter_types: Vec<TypeSymbol>,
}

/// Per-`AstIndex` results the Back-end Interface (§4.8) consumes: every
/// expression's static type, plus the method/constructor each call site
/// bound to.
#[derive(Debug, Default)]
pub struct Annotations {
    pub types: IndexMap<AstIndex, TypeSymbol>,
    pub calls: IndexMap<AstIndex, ResolvedMethod>,
    pub constructors: IndexMap<AstIndex, ResolvedConstructor>,
}

impl Annotations {
    pub fn type_of(&self, index: AstIndex) -> Option<&TypeSymbol> {
        self.types.get(&index)
    }
}

/// Per-class flattened field name -> type maps (own fields plus inherited),
/// computed once before any method body is checked since a field's
/// initializer expression may reference an already-declared sibling field.
pub(crate) type FieldTypes = IndexMap<Rc<str>, IndexMap<Rc<str>, TypeSymbol>>;

/// Shared read-only context threaded through expression/statement
/// annotation, mirroring the teacher's `TirContext` grouping of the
/// type factory and hierarchy behind one handle.
pub(crate) struct Context<'a> {
    pub hierarchy: &'a ClassHierarchy,
    pub factory: &'a TypeFactory,
    pub field_types: &'a FieldTypes,
    pub file: &'a SourceFile,
}

/// Runs every pass over `program`, returning the built hierarchy, the
/// annotation maps, and the accumulated diagnostics. The semantic phase
/// succeeds iff `diagnostics.has_errors()` is false afterward (spec.md §4.6
/// "the semantic phase succeeds iff no error-severity diagnostics exist").
pub fn check(program: &Program, file: &SourceFile) -> (ClassHierarchy, Annotations, DiagnosticsBag) {
    let mut hierarchy = ClassHierarchy::with_builtins();
    let mut diagnostics = DiagnosticsBag::new();

    pass_class_registration(program, &mut hierarchy, &mut diagnostics, file);
    pass_cycle_check(&hierarchy, &mut diagnostics, file);
    pass_member_uniqueness(program, &mut diagnostics, file);

    let factory = TypeFactory::new();
    let mut annotations = Annotations::default();
    let field_types = expr::collect_all_field_types(program, &hierarchy, &factory, &mut annotations, &mut diagnostics, file);
    let context = Context {
        hierarchy: &hierarchy,
        factory: &factory,
        field_types: &field_types,
        file,
    };

    for class in &program.classes {
        // Skip a duplicate-named class's own body: its fields/members were
        // never registered into `hierarchy`, so member/type lookups inside
        // it would spuriously report everything as unknown.
        if !Rc::ptr_eq(class, &hierarchy.resolve(&class.name.name.text).unwrap_or_else(|| class.clone())) {
            continue;
        }
        for member in &class.members {
            match member {
                Member::Method(method) => body::check_method(class, method, &context, &mut annotations, &mut diagnostics),
                Member::Constructor(ctor) => body::check_constructor(class, ctor, &context, &mut annotations, &mut diagnostics),
                Member::Field(_) => {}
            }
        }
    }

    (hierarchy, annotations, diagnostics)
}

/// Pass 1: registers every class, detecting duplicates (I1), and validates
/// each declared base name resolves (Unknown-Base).
fn pass_class_registration(program: &Program, hierarchy: &mut ClassHierarchy, diagnostics: &mut DiagnosticsBag, file: &SourceFile) {
    for class in &program.classes {
        if let Some(duplicate) = hierarchy.register(class.clone()) {
            diagnostics.push_error(&OErrorKind::duplicate_class(
                class.name.name.text.to_string(),
                &duplicate.existing_position,
                &class.position,
                file,
            ));
        }
    }

    for class in &program.classes {
        if let Some(base) = &class.base_name {
            if !hierarchy.contains(&base.text) {
                diagnostics.push_error(&OErrorKind::unknown_base(class.name.name.text.to_string(), base.text.to_string(), &base.position, file));
            }
        }
    }
}

/// Pass 2: walks each declared class's base chain; a revisit before reaching
/// a root is a cycle (I3).
fn pass_cycle_check(hierarchy: &ClassHierarchy, diagnostics: &mut DiagnosticsBag, file: &SourceFile) {
    for (name, declaration) in hierarchy.declared_classes() {
        if chain_has_cycle(hierarchy, name) {
            diagnostics.push_error(&OErrorKind::cyclic_inheritance(name.to_string(), &declaration.position, file));
        }
    }
}

fn chain_has_cycle(hierarchy: &ClassHierarchy, name: &str) -> bool {
    let mut seen = HashSet::new();
    let mut current: Option<Rc<str>> = Some(Rc::from(name));
    while let Some(current_name) = current {
        if !seen.insert(current_name.clone()) {
            return true;
        }
        current = hierarchy.base_of(&current_name);
    }
    false
}

/// Pass 3: within each class, field names are unique and methods grouped by
/// (name, parameter-type-names) are unique (I4); a constructor is identified
/// by its parameter type list.
fn pass_member_uniqueness(program: &Program, diagnostics: &mut DiagnosticsBag, file: &SourceFile) {
    for class in &program.classes {
        let mut fields: IndexMap<Rc<str>, &Ident> = IndexMap::new();
        let mut methods: IndexMap<(Rc<str>, Vec<Rc<str>>), &MethodDeclaration> = IndexMap::new();
        let mut constructors: IndexMap<Vec<Rc<str>>, &ConstructorDeclaration> = IndexMap::new();

        for member in &class.members {
            match member {
                Member::Field(field) => {
                    if let Some(existing) = fields.get(field.name.text.as_ref()) {
                        diagnostics.push_error(&OErrorKind::duplicate_field(
                            class.name.name.text.to_string(),
                            field.name.text.to_string(),
                            &existing.position,
                            &field.name.position,
                            file,
                        ));
                    } else {
                        fields.insert(field.name.text.clone(), &field.name);
                    }
                }
                Member::Method(method) => {
                    let key = signature_key(&method.header.name.text, method.header.parameters.iter().map(|p| &p.type_name.name.text));
                    if let Some(existing) = methods.get(&key) {
                        diagnostics.push_error(&OErrorKind::duplicate_method(
                            class.name.name.text.to_string(),
                            method.header.name.text.to_string(),
                            &existing.header.name.position,
                            &method.header.name.position,
                            file,
                        ));
                    } else {
                        methods.insert(key, method);
                    }
                }
                Member::Constructor(ctor) => {
                    let key: Vec<Rc<str>> = ctor.parameters.iter().map(|p| p.type_name.name.text.clone()).collect();
                    if let Some(existing) = constructors.get(&key) {
                        diagnostics.push_error(&OErrorKind::duplicate_constructor(
                            class.name.name.text.to_string(),
                            &existing.position,
                            &ctor.position,
                            file,
                        ));
                    } else {
                        constructors.insert(key, ctor);
                    }
                }
            }
        }
    }
}

fn signature_key<'a>(name: &Rc<str>, parameter_types: impl Iterator<Item = &'a Rc<str>>) -> (Rc<str>, Vec<Rc<str>>) {
    (name.clone(), parameter_types.cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn check_source(code: &str) -> DiagnosticsBag {
        let file = SourceFile::new("t.o", code);
        let tokens = tokenize(&file).unwrap();
        let program = parse(&tokens, &file).unwrap();
        let (_, _, diagnostics) = check(&program, &file);
        diagnostics
    }

    #[test]
    fn flags_duplicate_class() {
        let diagnostics = check_source("class Foo is end class Foo is end");
        assert!(diagnostics.entries().iter().any(|d| d.kind == "DuplicateClass"));
    }

    #[test]
    fn flags_duplicate_class_against_builtin() {
        let diagnostics = check_source("class Integer is end");
        assert!(diagnostics.entries().iter().any(|d| d.kind == "DuplicateClass"));
    }

    #[test]
    fn flags_unknown_base() {
        let diagnostics = check_source("class Foo extends Ghost is end");
        assert!(diagnostics.entries().iter().any(|d| d.kind == "UnknownBase"));
    }

    #[test]
    fn flags_cyclic_inheritance() {
        let diagnostics = check_source("class A extends B is end class B extends A is end");
        assert!(diagnostics.entries().iter().any(|d| d.kind == "CyclicInheritance"));
    }

    #[test]
    fn flags_duplicate_field() {
        let diagnostics = check_source("class Foo is var x: Integer(0) var x: Integer(1) end");
        assert!(diagnostics.entries().iter().any(|d| d.kind == "DuplicateField"));
    }

    #[test]
    fn accepts_a_well_formed_program() {
        let diagnostics = check_source(
            "class Point is \
             var x: Integer(0) \
             method X: Integer => x \
             end",
        );
        assert!(!diagnostics.has_errors(), "unexpected errors: {:?}", diagnostics.entries());
    }
}
