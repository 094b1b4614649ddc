//! Expression nodes inside routine bodies
//!
//! Only the shapes the metrics need are modelled precisely; everything else
//! is a [`ExprKind::Compound`] whose children are still traversed.

use crate::{TraversalError, TypeRef};
use serde::{Deserialize, Serialize};

/// An expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// Function or method call: `foo(...)`
    Invocation { name: String, args: Vec<Expr> },

    /// Member access: `$a->b()`, `A::b()`. The receiver is the first child.
    MemberPrefix {
        operator: String,
        receiver: Box<Expr>,
        member: Box<Expr>,
    },

    /// Variable: `$user`
    Variable(String),

    /// Bare identifier: a property or constant name
    Identifier(String),

    /// Static class reference: `User::`, `instanceof User`
    ClassReference(TypeRef),

    /// Object creation: `new User(...)`
    Allocation { class: TypeRef, args: Vec<Expr> },

    /// Literal value
    Literal(String),

    /// Any other construct
    Compound { label: String, children: Vec<Expr> },
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self { kind, line: 0 }
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    pub fn invocation(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Invocation {
            name: name.into(),
            args,
        })
    }

    pub fn member(operator: impl Into<String>, receiver: Expr, member: Expr) -> Self {
        Self::new(ExprKind::MemberPrefix {
            operator: operator.into(),
            receiver: Box::new(receiver),
            member: Box::new(member),
        })
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Variable(name.into()))
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Identifier(name.into()))
    }

    pub fn class_reference(name: impl Into<String>) -> Self {
        Self::new(ExprKind::ClassReference(TypeRef::new(name)))
    }

    pub fn allocation(class: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Allocation {
            class: TypeRef::new(class),
            args,
        })
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(ExprKind::Literal(text.into()))
    }

    pub fn compound(label: impl Into<String>, children: Vec<Expr>) -> Self {
        Self::new(ExprKind::Compound {
            label: label.into(),
            children,
        })
    }

    /// Source image of the node
    pub fn image(&self) -> &str {
        match &self.kind {
            ExprKind::Invocation { name, .. } => name,
            ExprKind::MemberPrefix { operator, .. } => operator,
            ExprKind::Variable(name) | ExprKind::Identifier(name) => name,
            ExprKind::ClassReference(r) => &r.name,
            ExprKind::Allocation { class, .. } => &class.name,
            ExprKind::Literal(text) => text,
            ExprKind::Compound { label, .. } => label,
        }
    }

    /// Direct children in evaluation order
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Invocation { args, .. } | ExprKind::Allocation { args, .. } => {
                args.iter().collect()
            }
            ExprKind::MemberPrefix {
                receiver, member, ..
            } => vec![receiver.as_ref(), member.as_ref()],
            ExprKind::Compound { children, .. } => children.iter().collect(),
            ExprKind::Variable(_)
            | ExprKind::Identifier(_)
            | ExprKind::ClassReference(_)
            | ExprKind::Literal(_) => Vec::new(),
        }
    }

    /// Collect class references and allocated types in this subtree
    ///
    /// `self` is at depth 1; fails once a node lies deeper than
    /// `max_nesting`.
    pub fn collect_type_references<'a>(
        &'a self,
        max_nesting: usize,
        out: &mut Vec<&'a TypeRef>,
    ) -> Result<(), TraversalError> {
        collect_types(self, 1, max_nesting, out)
    }

    /// Collect the call signature of every invocation in this subtree.
    ///
    /// A signature is the receiver image of every enclosing member prefix,
    /// outermost first, each followed by `.`, then the invoked name and `()`.
    /// A prefix whose receiver is the invocation itself contributes nothing.
    /// Depth is bounded the same way as [`Expr::collect_type_references`].
    pub fn collect_call_signatures(
        &self,
        max_nesting: usize,
        out: &mut Vec<String>,
    ) -> Result<(), TraversalError> {
        let mut receivers = Vec::new();
        collect_calls(self, 1, max_nesting, &mut receivers, out)
    }
}

fn check_depth(depth: usize, max_nesting: usize) -> Result<(), TraversalError> {
    if depth > max_nesting {
        return Err(TraversalError::NestingLimit { limit: max_nesting });
    }
    Ok(())
}

fn collect_types<'a>(
    expr: &'a Expr,
    depth: usize,
    max_nesting: usize,
    out: &mut Vec<&'a TypeRef>,
) -> Result<(), TraversalError> {
    check_depth(depth, max_nesting)?;
    match &expr.kind {
        ExprKind::ClassReference(r) => out.push(r),
        ExprKind::Allocation { class, .. } => out.push(class),
        _ => {}
    }
    for child in expr.children() {
        collect_types(child, depth + 1, max_nesting, out)?;
    }
    Ok(())
}

fn collect_calls<'a>(
    expr: &'a Expr,
    depth: usize,
    max_nesting: usize,
    receivers: &mut Vec<&'a Expr>,
    out: &mut Vec<String>,
) -> Result<(), TraversalError> {
    check_depth(depth, max_nesting)?;
    match &expr.kind {
        ExprKind::Invocation { name, args } => {
            let mut image = String::new();
            for receiver in receivers.iter() {
                if !std::ptr::eq(*receiver, expr) {
                    image.push_str(receiver.image());
                    image.push('.');
                }
            }
            image.push_str(name);
            image.push_str("()");
            out.push(image);

            for arg in args {
                collect_calls(arg, depth + 1, max_nesting, receivers, out)?;
            }
        }
        ExprKind::MemberPrefix {
            receiver, member, ..
        } => {
            receivers.push(receiver.as_ref());
            let result = collect_calls(receiver, depth + 1, max_nesting, receivers, out)
                .and_then(|_| collect_calls(member, depth + 1, max_nesting, receivers, out));
            receivers.pop();
            result?;
        }
        _ => {
            for child in expr.children() {
                collect_calls(child, depth + 1, max_nesting, receivers, out)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signatures(expr: &Expr) -> Vec<String> {
        let mut out = Vec::new();
        expr.collect_call_signatures(crate::DEFAULT_NESTING_LIMIT, &mut out)
            .unwrap();
        out
    }

    #[test]
    fn test_plain_function_call() {
        let call = Expr::invocation("foo", vec![]);
        assert_eq!(signatures(&call), vec!["foo()"]);
    }

    #[test]
    fn test_method_call_on_variable() {
        // $this->save()
        let call = Expr::member("->", Expr::variable("$this"), Expr::invocation("save", vec![]));
        assert_eq!(signatures(&call), vec!["$this.save()"]);
    }

    #[test]
    fn test_chained_member_access() {
        // $a->b->c()
        let call = Expr::member(
            "->",
            Expr::variable("$a"),
            Expr::member("->", Expr::identifier("b"), Expr::invocation("c", vec![])),
        );
        assert_eq!(signatures(&call), vec!["$a.b.c()"]);
    }

    #[test]
    fn test_invocation_as_receiver_skips_itself() {
        // foo()->bar()
        let call = Expr::member(
            "->",
            Expr::invocation("foo", vec![]),
            Expr::invocation("bar", vec![]),
        );
        assert_eq!(signatures(&call), vec!["foo()", "foo.bar()"]);
    }

    #[test]
    fn test_type_references_include_allocations() {
        let expr = Expr::compound(
            "block",
            vec![
                Expr::allocation("app\\User", vec![]),
                Expr::member("::", Expr::class_reference("app\\Db"), Expr::invocation("open", vec![])),
            ],
        );
        let mut refs = Vec::new();
        expr.collect_type_references(crate::DEFAULT_NESTING_LIMIT, &mut refs)
            .unwrap();
        let names: Vec<&str> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["app\\User", "app\\Db"]);
    }

    #[test]
    fn test_collectors_stop_at_nesting_limit() {
        // Five compounds around an allocation: the allocation is at depth 6
        let mut expr = Expr::allocation("app\\User", vec![]);
        for _ in 0..5 {
            expr = Expr::compound("block", vec![expr]);
        }

        let mut refs = Vec::new();
        assert!(matches!(
            expr.collect_type_references(5, &mut refs),
            Err(TraversalError::NestingLimit { limit: 5 })
        ));
        let mut refs = Vec::new();
        expr.collect_type_references(6, &mut refs).unwrap();
        assert_eq!(refs.len(), 1);

        let mut calls = Vec::new();
        assert!(expr.collect_call_signatures(5, &mut calls).is_err());
        assert!(expr.collect_call_signatures(6, &mut calls).is_ok());
    }
}
