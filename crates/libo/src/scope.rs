//! Lexical scope stack for method/constructor bodies (spec.md §4.6 pass 4
//! "Scope & type annotation").
//!
//! Outermost to innermost: class fields (including inherited), parameters,
//! then locals introduced by field-declaration body elements in the order
//! they appear. Parameters are visible but not assignable (spec.md §4.6:
//! "An Assignment's target must name a visible local ... or field", with
//! parameters explicitly denied).

use std::rc::Rc;

use indexmap::IndexMap;

use crate::types::TypeSymbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Field,
    Parameter,
    Local,
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub kind: BindingKind,
    pub ty: TypeSymbol,
}

/// One level of the scope stack; a flat map is enough since each level's
/// names are independently unique (fields already deduplicated by the
/// member-uniqueness pass, parameters by the parser, locals by insertion
/// order as they are introduced).
#[derive(Debug, Default)]
struct Level {
    bindings: IndexMap<Rc<str>, Binding>,
}

/// A method or constructor's lexical scope, built bottom space-up: push the
/// field level first, then parameters, then locals are added to the scope's
/// top level as the body is walked statement by statement.
#[derive(Debug)]
pub struct Scope {
    levels: Vec<Level>,
}

impl Scope {
    /// Starts a new scope with the field level pre-populated (spec.md §4.6:
    /// "outermost = class fields (including inherited)").
    pub fn new(fields: impl IntoIterator<Item = (Rc<str>, TypeSymbol)>) -> Self {
        let mut field_level = Level::default();
        for (name, ty) in fields {
            field_level.bindings.insert(name, Binding { kind: BindingKind::Field, ty });
        }

        let mut scope = Self { levels: vec![field_level] };
        scope.levels.push(Level::default());
        scope
    }

    pub fn push_parameter(&mut self, name: Rc<str>, ty: TypeSymbol) {
        self.levels
            .last_mut()
            .expect("scope always has a parameter level")
            .bindings
            .insert(name, Binding { kind: BindingKind::Parameter, ty });
    }

    /// Locals are introduced one at a time, in declaration order, and are
    /// visible to every statement that follows within the same body
    /// (spec.md §4.6: "innermost = locals introduced by field-declaration
    /// body elements in order").
    pub fn declare_local(&mut self, name: Rc<str>, ty: TypeSymbol) {
        if self.levels.len() == 2 {
            self.levels.push(Level::default());
        }
        self.levels
            .last_mut()
            .expect("local level exists after declare_local pushes it")
            .bindings
            .insert(name, Binding { kind: BindingKind::Local, ty });
    }

    /// Looks up a name from innermost to outermost level.
    pub fn resolve(&self, name: &str) -> Option<&Binding> {
        self.levels.iter().rev().find_map(|level| level.bindings.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeFactory;

    #[test]
    fn innermost_binding_shadows_outer() {
        let mut scope = Scope::new([(Rc::from("x"), TypeFactory::integer())]);
        scope.push_parameter(Rc::from("y"), TypeFactory::integer());
        scope.declare_local(Rc::from("x"), TypeFactory::real());

        let resolved = scope.resolve("x").unwrap();
        assert_eq!(resolved.kind, BindingKind::Local);
        assert_eq!(scope.resolve("y").unwrap().kind, BindingKind::Parameter);
        assert!(scope.resolve("z").is_none());
    }
}
