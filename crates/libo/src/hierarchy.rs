//! Class Hierarchy (spec.md §4.5).
//!
//! A name-keyed table mutated only during the registration pass of semantic
//! analysis, immutable thereafter (spec.md §3 "Class hierarchy"). Grounded
//! in the teacher's `SignatureHolder` (`tir/signature.rs`): reserve-by-name,
//! first-wins on collision, with the collision reported to the caller rather
//! than silently overwritten.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{ClassDeclaration, FieldDeclaration, Member, MethodDeclaration};
use crate::position::SourcePosition;
use crate::types::{PrimitiveType, TypeFactory, TypeSymbol};

/// The fixed closed set of intrinsic arithmetic methods on `Integer`/`Real`
/// (SPEC_FULL.md §9 Open Question 3) — these classes carry no declaration of
/// their own, so [`ClassHierarchy::find_method`] special-cases them rather
/// than walking (nonexistent) member lists.
pub(crate) const INTRINSIC_ARITHMETIC_METHODS: &[&str] = &["Plus", "Minus", "Times", "Divide"];

/// The eight built-in classes registered before any user class (spec.md §3
/// "Class hierarchy"). `Class` is the universal root; `AnyValue`/`AnyRef`
/// sit directly under it; `Integer`/`Real`/`Boolean` extend `AnyValue`;
/// `Array`/`List` extend `AnyRef`.
pub const BUILTIN_CLASSES: &[(&str, Option<&str>)] = &[
    ("Class", None),
    ("AnyValue", Some("Class")),
    ("AnyRef", Some("Class")),
    ("Integer", Some("AnyValue")),
    ("Real", Some("AnyValue")),
    ("Boolean", Some("AnyValue")),
    ("Array", Some("AnyRef")),
    ("List", Some("AnyRef")),
];

struct HierarchyEntry {
    base: Option<Rc<str>>,
    /// `None` for built-in classes, which have no AST declaration.
    declaration: Option<Rc<ClassDeclaration>>,
}

/// Returned by [`ClassHierarchy::register`] on a name collision; the first
/// registration wins and stays in the table (spec.md §4.5 "first-wins").
/// `existing_position` is the prior registration's source position, or
/// [`SourcePosition::synthetic`] when the collision is with a built-in
/// class (which has no AST declaration to point at).
pub struct DuplicateRegistration {
    pub existing_position: SourcePosition,
}

pub enum MethodLookup<'a> {
    Found { owner: Rc<str>, method: &'a MethodDeclaration },
    /// One of the intrinsic arithmetic methods on a primitive class; no
    /// `MethodDeclaration` backs it.
    Intrinsic { owner: Rc<str>, method_name: Rc<str>, return_type: TypeSymbol },
    NotFound,
    Ambiguous,
}

/// Result of resolving a `ConstructorInvocation` (or a pre-normalization
/// `FunctionalCall` the checker treats as one, see DESIGN.md).
pub enum ConstructorLookup {
    Found { parameter_types: Vec<TypeSymbol> },
    /// SPEC_FULL.md §9 Open Question resolution: a class with no declared
    /// constructor has an implicit zero-argument one.
    ImplicitDefault,
    Ambiguous,
    NotFound,
}

#[derive(Default)]
pub struct ClassHierarchy {
    entries: IndexMap<Rc<str>, HierarchyEntry>,
}

impl ClassHierarchy {
    /// An empty hierarchy with no built-ins registered, for type-system unit
    /// tests that only need the universal-supertype names.
    pub fn with_builtins() -> Self {
        let mut hierarchy = Self::default();
        for (name, base) in BUILTIN_CLASSES {
            hierarchy.entries.insert(
                Rc::from(*name),
                HierarchyEntry {
                    base: base.map(Rc::from),
                    declaration: None,
                },
            );
        }
        hierarchy
    }

    /// Adds a user class declaration. On a duplicate name — including a
    /// collision with a built-in, which occupies the same table (spec.md
    /// §4.5 "Built-ins are registered before user classes") — the existing
    /// registration is kept and the caller gets back its position to build
    /// a `DuplicateClass` diagnostic from (spec.md §4.5 "first-wins on
    /// duplicate, but also records a duplicate-class diagnostic").
    pub fn register(&mut self, declaration: Rc<ClassDeclaration>) -> Option<DuplicateRegistration> {
        let name = declaration.name.name.text.clone();
        if let Some(existing) = self.entries.get(&name) {
            let existing_position = match &existing.declaration {
                Some(existing_declaration) => existing_declaration.position.clone(),
                None => SourcePosition::synthetic(),
            };
            return Some(DuplicateRegistration { existing_position });
        }

        let base = declaration.base_name.as_ref().map(|ident| ident.text.clone());
        self.entries.insert(name, HierarchyEntry { base, declaration: Some(declaration) });
        None
    }

    pub fn resolve(&self, name: &str) -> Option<Rc<ClassDeclaration>> {
        self.entries.get(name).and_then(|entry| entry.declaration.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn base_of(&self, name: &str) -> Option<Rc<str>> {
        self.entries.get(name)?.base.clone()
    }

    /// User classes only (built-ins have no declaration), in registration
    /// order.
    pub fn declared_classes(&self) -> impl Iterator<Item = (&Rc<str>, &Rc<ClassDeclaration>)> {
        self.entries
            .iter()
            .filter_map(|(name, entry)| entry.declaration.as_ref().map(|declaration| (name, declaration)))
    }

    /// Ancestors from `name` upward, including `name` itself. Terminates at
    /// a root or upon revisiting a class name (a cycle is diagnosed by the
    /// dedicated cycle-check pass, not silently looped over here).
    pub fn ancestors_of(&self, name: &str) -> Vec<Rc<str>> {
        let mut chain = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut current = self.entries.get_key_value(name).map(|(key, _)| key.clone());

        while let Some(class_name) = current {
            if !seen.insert(class_name.clone()) {
                break;
            }
            chain.push(class_name.clone());
            current = self.base_of(&class_name).and_then(|base| self.entries.get_key_value(&*base).map(|(key, _)| key.clone()));
        }

        chain
    }

    /// True if `ancestor` appears in `descendant`'s base chain (reflexive).
    pub fn is_ancestor(&self, descendant: &str, ancestor: &str) -> bool {
        self.ancestors_of(descendant).iter().any(|name| name.as_ref() == ancestor)
    }

    /// Walks ancestors from `class_name` upward; first class that declares
    /// `field_name` wins (spec.md §4.5 "FindField").
    pub fn find_field(&self, class_name: &str, field_name: &str) -> Option<(Rc<str>, FieldDeclaration)> {
        for ancestor in self.ancestors_of(class_name) {
            let Some(declaration) = self.resolve(&ancestor) else { continue };
            for member in &declaration.members {
                if let Member::Field(field) = member {
                    if field.name.text.as_ref() == field_name {
                        return Some((ancestor, field.clone()));
                    }
                }
            }
        }
        None
    }

    /// Walks ancestors from `class_name` upward; the nearest ancestor that
    /// declares a matching-arity, matching-name method is selected, and
    /// ambiguity is reported only among candidates at that same level
    /// (spec.md §4.5 "FindMethod").
    pub fn find_method(&self, class_name: &str, method_name: &str, argument_types: &[TypeSymbol], factory: &TypeFactory) -> MethodLookup<'_> {
        if let Some(lookup) = self.find_intrinsic_method(class_name, method_name, argument_types) {
            return lookup;
        }

        for ancestor in self.ancestors_of(class_name) {
            let Some(entry) = self.entries.get(&ancestor) else { continue };
            let Some(declaration) = &entry.declaration else { continue };
            let candidates: Vec<&MethodDeclaration> = declaration
                .members
                .iter()
                .filter_map(|member| match member {
                    Member::Method(method) => Some(method),
                    _ => None,
                })
                .filter(|method| method.header.name.text.as_ref() == method_name && method.header.parameters.len() == argument_types.len())
                .filter(|method| {
                    method
                        .header
                        .parameters
                        .iter()
                        .zip(argument_types.iter())
                        .all(|(parameter, argument)| argument.is_assignable_to(&factory.resolve_class_name(&parameter.type_name), self))
                })
                .collect();

            match candidates.len() {
                0 => continue,
                1 => return MethodLookup::Found { owner: ancestor, method: candidates[0] },
                _ => return MethodLookup::Ambiguous,
            }
        }
        MethodLookup::NotFound
    }

    fn find_intrinsic_method(&self, class_name: &str, method_name: &str, argument_types: &[TypeSymbol]) -> Option<MethodLookup<'_>> {
        let receiver = match class_name {
            "Integer" => TypeSymbol::Primitive(PrimitiveType::Integer),
            "Real" => TypeSymbol::Primitive(PrimitiveType::Real),
            _ => return None,
        };

        if !INTRINSIC_ARITHMETIC_METHODS.contains(&method_name) {
            return None;
        }

        if argument_types.len() != 1 || !argument_types[0].is_assignable_to(&receiver, self) {
            return Some(MethodLookup::NotFound);
        }

        Some(MethodLookup::Intrinsic {
            owner: Rc::from(class_name),
            method_name: Rc::from(method_name),
            return_type: receiver,
        })
    }

    /// Resolves a `ConstructorInvocation`'s (or call-normalized
    /// `FunctionalCall`'s) constructor: the intrinsic single-argument
    /// constructors on `Integer`/`Real`/`Boolean`/`Array`/`List`, otherwise a
    /// declared constructor on `class_name` exactly (constructors are not
    /// inherited).
    pub fn find_constructor(&self, class_name: &str, argument_types: &[TypeSymbol], factory: &TypeFactory) -> ConstructorLookup {
        if let Some(lookup) = self.find_intrinsic_constructor(class_name, argument_types) {
            return lookup;
        }

        let Some(declaration) = self.resolve(class_name) else {
            return ConstructorLookup::NotFound;
        };

        let constructors: Vec<_> = declaration
            .members
            .iter()
            .filter_map(|member| match member {
                Member::Constructor(ctor) => Some(ctor),
                _ => None,
            })
            .collect();

        if constructors.is_empty() {
            return if argument_types.is_empty() {
                ConstructorLookup::ImplicitDefault
            } else {
                ConstructorLookup::NotFound
            };
        }

        let candidates: Vec<_> = constructors
            .into_iter()
            .filter(|ctor| ctor.parameters.len() == argument_types.len())
            .filter(|ctor| {
                ctor.parameters
                    .iter()
                    .zip(argument_types.iter())
                    .all(|(parameter, argument)| argument.is_assignable_to(&factory.resolve_class_name(&parameter.type_name), self))
            })
            .collect();

        match candidates.len() {
            0 => ConstructorLookup::NotFound,
            1 => ConstructorLookup::Found {
                parameter_types: candidates[0].parameters.iter().map(|p| factory.resolve_class_name(&p.type_name)).collect(),
            },
            _ => ConstructorLookup::Ambiguous,
        }
    }

    /// `Integer`/`Real`/`Boolean` accept exactly one argument assignable to
    /// the wrapped primitive; `Array`/`List` accept zero arguments or one
    /// `Integer` length hint. None of these classes carry a declaration to
    /// walk.
    fn find_intrinsic_constructor(&self, class_name: &str, argument_types: &[TypeSymbol]) -> Option<ConstructorLookup> {
        match class_name {
            "Integer" | "Real" | "Boolean" => {
                let expected = match class_name {
                    "Integer" => TypeSymbol::Primitive(PrimitiveType::Integer),
                    "Real" => TypeSymbol::Primitive(PrimitiveType::Real),
                    _ => TypeSymbol::Primitive(PrimitiveType::Boolean),
                };
                if argument_types.len() == 1 && argument_types[0].is_assignable_to(&expected, self) {
                    Some(ConstructorLookup::Found { parameter_types: vec![expected] })
                } else {
                    Some(ConstructorLookup::NotFound)
                }
            }
            "Array" | "List" => match argument_types {
                [] => Some(ConstructorLookup::ImplicitDefault),
                [single] if matches!(single, TypeSymbol::Primitive(PrimitiveType::Integer)) => {
                    Some(ConstructorLookup::Found { parameter_types: vec![single.clone()] })
                }
                _ => Some(ConstructorLookup::NotFound),
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_form_the_documented_chain() {
        let hierarchy = ClassHierarchy::with_builtins();
        assert!(hierarchy.is_ancestor("Integer", "AnyValue"));
        assert!(hierarchy.is_ancestor("Integer", "Class"));
        assert!(hierarchy.is_ancestor("Array", "AnyRef"));
        assert!(!hierarchy.is_ancestor("Integer", "AnyRef"));
    }

    #[test]
    fn ancestors_of_includes_self_first() {
        let hierarchy = ClassHierarchy::with_builtins();
        let chain: Vec<String> = hierarchy.ancestors_of("Boolean").iter().map(|n| n.to_string()).collect();
        assert_eq!(chain, vec!["Boolean", "AnyValue", "Class"]);
    }
}
