//! Abstract syntax tree node kinds (spec.md §3 "AST node kinds").
//!
//! Closed, tagged-variant enums per category (Member, Statement, Expression)
//! rather than a polymorphic object hierarchy with virtual `print` methods —
//! see spec.md §9 "Deep polymorphic AST": presentation is a separate
//! `Display`/visitor function, not a method on every node, so that
//! exhaustive `match`es are machine-checked by the compiler.
//!
//! Every node that the Back-end Interface (§4.8) needs to annotate with a
//! resolved type carries an [`AstIndex`], the same identity-tagging pattern
//! the teacher's `ast.rs` uses for its `FunctionDefinitionAst`/`ClassDefinitionAst`.

use std::rc::Rc;

use strum_macros::EnumIs;

use crate::position::SourcePosition;

/// A stable identity for an AST node, used as the key into the Semantic
/// Checker's annotation maps (resolved type, resolved method/constructor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AstIndex(pub usize);

/// Monotonically increasing [`AstIndex`] generator, one per parse.
#[derive(Debug, Default)]
pub struct AstIndexer(std::cell::Cell<usize>);

impl AstIndexer {
    pub fn next(&self) -> AstIndex {
        let value = self.0.get();
        self.0.set(value + 1);
        AstIndex(value)
    }
}

/// Program: ordered sequence of class declarations (spec.md §3).
#[derive(Debug, Clone)]
pub struct Program {
    pub classes: Vec<Rc<ClassDeclaration>>,
}

/// A class name, optionally parameterized (spec.md §4.3 grammar `ClassName`,
/// `Generic`). Only `Array`/`List` meaningfully use the parameter — see
/// SPEC_FULL.md §9 Open Question 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassName {
    pub name: Ident,
    pub generic_parameter: Option<Box<ClassName>>,
}

/// An identifier with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub text: Rc<str>,
    pub position: SourcePosition,
}

#[derive(Debug, Clone)]
pub struct ClassDeclaration {
    pub index: AstIndex,
    pub name: ClassName,
    pub base_name: Option<Ident>,
    pub members: Vec<Member>,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, EnumIs)]
pub enum Member {
    Field(FieldDeclaration),
    Method(MethodDeclaration),
    Constructor(ConstructorDeclaration),
}

impl Member {
    pub fn position(&self) -> &SourcePosition {
        match self {
            Member::Field(field) => &field.name.position,
            Member::Method(method) => &method.header.name.position,
            Member::Constructor(ctor) => &ctor.position,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldDeclaration {
    pub name: Ident,
    pub initializer: Expression,
}

#[derive(Debug, Clone)]
pub struct MethodDeclaration {
    pub header: MethodHeader,
    pub body: Body,
}

#[derive(Debug, Clone)]
pub struct ConstructorDeclaration {
    pub parameters: Vec<Parameter>,
    pub body: Body,
    pub position: SourcePosition,
}

#[derive(Debug, Clone)]
pub struct MethodHeader {
    pub name: Ident,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<ClassName>,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: Ident,
    pub type_name: ClassName,
}

/// Ordered sequence of body elements (spec.md §3 "Body").
#[derive(Debug, Clone, Default)]
pub struct Body {
    pub elements: Vec<BodyElement>,
}

#[derive(Debug, Clone, EnumIs)]
pub enum BodyElement {
    LocalField(FieldDeclaration),
    Statement(Statement),
    Expression(Expression),
}

#[derive(Debug, Clone, EnumIs)]
pub enum Statement {
    Assignment(Assignment),
    WhileLoop(WhileLoop),
    IfStatement(IfStatement),
    Return(ReturnStatement),
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub target: Ident,
    pub expression: Expression,
}

#[derive(Debug, Clone)]
pub struct WhileLoop {
    pub condition: Expression,
    pub body: Body,
}

#[derive(Debug, Clone)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_body: Body,
    pub else_body: Option<Body>,
}

#[derive(Debug, Clone)]
pub struct ReturnStatement {
    pub expression: Option<Expression>,
    pub position: SourcePosition,
}

/// Expression variants (spec.md §3). No infix operators exist in this
/// grammar — arithmetic/comparison is expressed via `FunctionalCall` on the
/// fixed intrinsic method set (SPEC_FULL.md §9 Open Question 3).
#[derive(Debug, Clone, EnumIs)]
pub enum Expression {
    IntegerLiteral(IntegerLiteral),
    RealLiteral(RealLiteral),
    BooleanLiteral(BooleanLiteral),
    ThisExpression { index: AstIndex, position: SourcePosition },
    IdentifierExpression(IdentifierExpression),
    MemberAccess(MemberAccess),
    ConstructorInvocation(ConstructorInvocation),
    FunctionalCall(FunctionalCall),
}

impl Expression {
    pub fn index(&self) -> AstIndex {
        match self {
            Expression::IntegerLiteral(literal) => literal.index,
            Expression::RealLiteral(literal) => literal.index,
            Expression::BooleanLiteral(literal) => literal.index,
            Expression::ThisExpression { index, .. } => *index,
            Expression::IdentifierExpression(identifier) => identifier.index,
            Expression::MemberAccess(access) => access.index,
            Expression::ConstructorInvocation(invocation) => invocation.index,
            Expression::FunctionalCall(call) => call.index,
        }
    }

    pub fn position(&self) -> &SourcePosition {
        match self {
            Expression::IntegerLiteral(literal) => &literal.position,
            Expression::RealLiteral(literal) => &literal.position,
            Expression::BooleanLiteral(literal) => &literal.position,
            Expression::ThisExpression { position, .. } => position,
            Expression::IdentifierExpression(identifier) => &identifier.name.position,
            Expression::MemberAccess(access) => &access.position,
            Expression::ConstructorInvocation(invocation) => &invocation.position,
            Expression::FunctionalCall(call) => &call.position,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntegerLiteral {
    pub index: AstIndex,
    pub value: i64,
    pub position: SourcePosition,
}

#[derive(Debug, Clone)]
pub struct RealLiteral {
    pub index: AstIndex,
    pub value: f64,
    pub position: SourcePosition,
}

#[derive(Debug, Clone)]
pub struct BooleanLiteral {
    pub index: AstIndex,
    pub value: bool,
    pub position: SourcePosition,
}

#[derive(Debug, Clone)]
pub struct IdentifierExpression {
    pub index: AstIndex,
    pub name: Ident,
}

#[derive(Debug, Clone)]
pub struct MemberAccess {
    pub index: AstIndex,
    pub target: Box<Expression>,
    pub member: Ident,
    pub position: SourcePosition,
}

#[derive(Debug, Clone)]
pub struct ConstructorInvocation {
    pub index: AstIndex,
    pub class_name: ClassName,
    pub arguments: Vec<Expression>,
    pub position: SourcePosition,
}

/// The callee of a `FunctionalCall`: either a bare identifier or a member
/// access (spec.md §4.3 `FunCall := (MemberAccess | IDENT) Arguments`).
#[derive(Debug, Clone, EnumIs)]
pub enum CallCallee {
    Identifier(IdentifierExpression),
    MemberAccess(MemberAccess),
}

#[derive(Debug, Clone)]
pub struct FunctionalCall {
    pub index: AstIndex,
    pub callee: Box<CallCallee>,
    pub arguments: Vec<Expression>,
    pub position: SourcePosition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ast_index_increments() {
        let indexer = AstIndexer::default();
        let first = indexer.next();
        let second = indexer.next();
        assert_eq!(first, AstIndex(0));
        assert_eq!(second, AstIndex(1));
    }
}
