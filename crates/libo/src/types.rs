//! Type symbols, the Type Factory, and subtyping (spec.md §3 "Type symbols",
//! "Subtyping rules (IsAssignableTo)", §4.4).
//!
//! Symbols are value-equal by structural identity rather than by pointer:
//! two requests for the class `Point` yield `TypeSymbol::Reference`s that
//! compare equal, the same guarantee the teacher's `TypeValue::is_same_type`
//! (`tir/object_signature.rs`) gives for its richer variant set.

use std::rc::Rc;

use crate::ast::ClassName;
use crate::hierarchy::ClassHierarchy;

/// `AnyRef` by name, used as the universal reference supertype (spec.md §3).
pub const ANY_REF: &str = "AnyRef";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Integer,
    Real,
    Boolean,
    AnyValue,
}

impl PrimitiveType {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Integer => "Integer",
            PrimitiveType::Real => "Real",
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::AnyValue => "AnyValue",
        }
    }
}

/// A type symbol, interned by the [`TypeFactory`] so repeated lookups of the
/// same class return structurally equal symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSymbol {
    Primitive(PrimitiveType),
    /// A named class reference, by class name. `AnyRef` is the universal
    /// reference supertype.
    Reference(Rc<str>),
    Array(Box<TypeSymbol>),
    List(Box<TypeSymbol>),
    /// The "unit" marker spec.md §4.6 assigns a `FunctionalCall` whose
    /// resolved method declares no return type. Assignable only to itself.
    Unit,
}

impl TypeSymbol {
    pub fn reference(name: impl Into<Rc<str>>) -> Self {
        TypeSymbol::Reference(name.into())
    }

    pub fn any_ref() -> Self {
        TypeSymbol::Reference(Rc::from(ANY_REF))
    }

    pub fn name(&self) -> String {
        match self {
            TypeSymbol::Primitive(primitive) => primitive.name().to_string(),
            TypeSymbol::Reference(name) => name.to_string(),
            TypeSymbol::Array(element) => format!("Array[{}]", element.name()),
            TypeSymbol::List(element) => format!("List[{}]", element.name()),
            TypeSymbol::Unit => "unit".to_string(),
        }
    }

    /// Reflexive, widening, and reference/container assignability rules
    /// (spec.md §3 "Subtyping rules"). The checker uses one-sided
    /// assignability only; joins are not required (spec.md §4.4).
    pub fn is_assignable_to(&self, target: &TypeSymbol, hierarchy: &ClassHierarchy) -> bool {
        if self == target {
            return true;
        }

        match (self, target) {
            (TypeSymbol::Primitive(PrimitiveType::Integer), TypeSymbol::Primitive(PrimitiveType::Real)) => true,
            (TypeSymbol::Primitive(_), TypeSymbol::Primitive(PrimitiveType::AnyValue)) => true,
            (TypeSymbol::Reference(source), TypeSymbol::Reference(target_name)) => {
                target_name.as_ref() == ANY_REF || hierarchy.is_ancestor(source, target_name)
            }
            (TypeSymbol::Array(_) | TypeSymbol::List(_), TypeSymbol::Reference(target_name)) => target_name.as_ref() == ANY_REF,
            (TypeSymbol::Array(source_element), TypeSymbol::Array(target_element)) => source_element.is_assignable_to(target_element, hierarchy),
            (TypeSymbol::List(source_element), TypeSymbol::List(target_element)) => source_element.is_assignable_to(target_element, hierarchy),
            _ => false,
        }
    }
}

impl std::fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Interns reference type symbols by class name so repeated requests for the
/// same class return the same (structurally equal) symbol, mirroring the
/// teacher's `TirContext::create_tmp_type`/type-interning pattern
/// (`tir/context.rs`) without its temp-variable bookkeeping, which O has no
/// use for.
#[derive(Debug, Default)]
pub struct TypeFactory {
    references: std::cell::RefCell<indexmap::IndexSet<Rc<str>>>,
}

impl TypeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn integer() -> TypeSymbol {
        TypeSymbol::Primitive(PrimitiveType::Integer)
    }

    pub fn real() -> TypeSymbol {
        TypeSymbol::Primitive(PrimitiveType::Real)
    }

    pub fn boolean() -> TypeSymbol {
        TypeSymbol::Primitive(PrimitiveType::Boolean)
    }

    pub fn any_value() -> TypeSymbol {
        TypeSymbol::Primitive(PrimitiveType::AnyValue)
    }

    pub fn reference(&self, name: &str) -> TypeSymbol {
        let interned = match self.references.borrow().get(name) {
            Some(existing) => existing.clone(),
            None => Rc::from(name),
        };
        self.references.borrow_mut().insert(interned.clone());
        TypeSymbol::Reference(interned)
    }

    pub fn array(&self, element: TypeSymbol) -> TypeSymbol {
        TypeSymbol::Array(Box::new(element))
    }

    pub fn list(&self, element: TypeSymbol) -> TypeSymbol {
        TypeSymbol::List(Box::new(element))
    }

    /// Resolves a parsed `ClassName` type reference to a `TypeSymbol`.
    /// `Array`/`List` bind their generic parameter as the element type
    /// (SPEC_FULL.md §9 Open Question 2); every other name, generic or not,
    /// becomes a plain class reference.
    pub fn resolve_class_name(&self, name: &ClassName) -> TypeSymbol {
        let base = name.name.text.as_ref();
        match base {
            "Integer" => TypeFactory::integer(),
            "Real" => TypeFactory::real(),
            "Boolean" => TypeFactory::boolean(),
            "AnyValue" => TypeFactory::any_value(),
            "Array" => self.array(
                name.generic_parameter
                    .as_deref()
                    .map(|inner| self.resolve_class_name(inner))
                    .unwrap_or_else(TypeFactory::any_value),
            ),
            "List" => self.list(
                name.generic_parameter
                    .as_deref()
                    .map(|inner| self.resolve_class_name(inner))
                    .unwrap_or_else(TypeFactory::any_value),
            ),
            other => self.reference(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::ClassHierarchy;
    use rstest::rstest;

    #[test]
    fn repeated_reference_lookups_are_structurally_equal() {
        let factory = TypeFactory::new();
        assert_eq!(factory.reference("Point"), factory.reference("Point"));
    }

    #[rstest]
    #[case(TypeFactory::integer(), TypeFactory::real(), true)]
    #[case(TypeFactory::real(), TypeFactory::integer(), false)]
    #[case(TypeFactory::boolean(), TypeFactory::any_value(), true)]
    fn primitive_widening(#[case] from: TypeSymbol, #[case] to: TypeSymbol, #[case] expected: bool) {
        let hierarchy = ClassHierarchy::with_builtins();
        assert_eq!(from.is_assignable_to(&to, &hierarchy), expected);
    }

    #[test]
    fn any_reference_is_assignable_to_any_ref() {
        let hierarchy = ClassHierarchy::with_builtins();
        let factory = TypeFactory::new();
        assert!(factory.reference("Integer").is_assignable_to(&TypeSymbol::any_ref(), &hierarchy));
        assert!(factory.array(TypeFactory::integer()).is_assignable_to(&TypeSymbol::any_ref(), &hierarchy));
    }

    #[test]
    fn arrays_are_covariant() {
        let hierarchy = ClassHierarchy::with_builtins();
        let factory = TypeFactory::new();
        let integers = factory.array(TypeFactory::integer());
        let reals = factory.array(TypeFactory::real());
        assert!(integers.is_assignable_to(&reals, &hierarchy));
        assert!(!reals.is_assignable_to(&integers, &hierarchy));
    }
}
