//! Depth-first traversal of the code model
//!
//! Every analyzer is a [`Visitor`]. The default methods walk
//! namespace -> types -> members -> routine bodies, so an implementation
//! overrides only the node kinds it cares about. An override that still
//! wants the children visited calls the matching `walk_*` function.
//!
//! Artifacts rejected by the scope's filter are skipped together with
//! everything below them.

use crate::{ArtifactId, ArtifactKind, CodeModel, Expr, Scope, TraversalError};

/// A node handed to the start/end hooks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    Namespace(ArtifactId),
    Class(ArtifactId),
    Interface(ArtifactId),
    Trait(ArtifactId),
    Method(ArtifactId),
    Function(ArtifactId),
    Property(ArtifactId),
    Expr(&'a Expr),
}

impl<'a> Node<'a> {
    /// Node for an artifact, `None` if the id is unknown
    pub fn of(model: &CodeModel, id: ArtifactId) -> Option<Node<'a>> {
        let node = match model.get(id)?.kind() {
            ArtifactKind::Namespace => Node::Namespace(id),
            ArtifactKind::Class => Node::Class(id),
            ArtifactKind::Interface => Node::Interface(id),
            ArtifactKind::Trait => Node::Trait(id),
            ArtifactKind::Method => Node::Method(id),
            ArtifactKind::Function => Node::Function(id),
            ArtifactKind::Property => Node::Property(id),
        };
        Some(node)
    }

    pub fn artifact(&self) -> Option<ArtifactId> {
        match *self {
            Node::Namespace(id)
            | Node::Class(id)
            | Node::Interface(id)
            | Node::Trait(id)
            | Node::Method(id)
            | Node::Function(id)
            | Node::Property(id) => Some(id),
            Node::Expr(_) => None,
        }
    }
}

/// A visitor over the code model
pub trait Visitor<'m> {
    type Error: From<TraversalError>;

    /// Fired before a node is visited
    fn start_visit(&mut self, _scope: Scope<'m>, _node: Node<'m>) {}

    /// Fired after a node and its children were visited
    fn end_visit(&mut self, _scope: Scope<'m>, _node: Node<'m>) {}

    fn visit_namespace(&mut self, scope: Scope<'m>, id: ArtifactId) -> Result<(), Self::Error> {
        walk_namespace(self, scope, id)
    }

    fn visit_class(&mut self, scope: Scope<'m>, id: ArtifactId) -> Result<(), Self::Error> {
        walk_type(self, scope, id)
    }

    fn visit_interface(&mut self, scope: Scope<'m>, id: ArtifactId) -> Result<(), Self::Error> {
        walk_type(self, scope, id)
    }

    fn visit_trait(&mut self, scope: Scope<'m>, id: ArtifactId) -> Result<(), Self::Error> {
        walk_type(self, scope, id)
    }

    fn visit_method(&mut self, scope: Scope<'m>, id: ArtifactId) -> Result<(), Self::Error> {
        walk_routine(self, scope, id)
    }

    fn visit_function(&mut self, scope: Scope<'m>, id: ArtifactId) -> Result<(), Self::Error> {
        walk_routine(self, scope, id)
    }

    fn visit_property(&mut self, _scope: Scope<'m>, _id: ArtifactId) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_expr(
        &mut self,
        scope: Scope<'m>,
        expr: &'m Expr,
        depth: usize,
    ) -> Result<(), Self::Error> {
        walk_expr(self, scope, expr, depth)
    }
}

/// Visit an artifact: filter check, start hook, kind dispatch, end hook
pub fn accept<'m, V: Visitor<'m> + ?Sized>(
    visitor: &mut V,
    scope: Scope<'m>,
    id: ArtifactId,
) -> Result<(), V::Error> {
    if !scope.accepts(id) {
        return Ok(());
    }
    let node = Node::of(scope.model, id).ok_or(TraversalError::Model(
        crate::ModelError::UnknownArtifact(id),
    ))?;

    visitor.start_visit(scope, node);
    match node {
        Node::Namespace(id) => visitor.visit_namespace(scope, id)?,
        Node::Class(id) => visitor.visit_class(scope, id)?,
        Node::Interface(id) => visitor.visit_interface(scope, id)?,
        Node::Trait(id) => visitor.visit_trait(scope, id)?,
        Node::Method(id) => visitor.visit_method(scope, id)?,
        Node::Function(id) => visitor.visit_function(scope, id)?,
        Node::Property(id) => visitor.visit_property(scope, id)?,
        Node::Expr(expr) => visitor.visit_expr(scope, expr, 1)?,
    }
    visitor.end_visit(scope, node);
    Ok(())
}

/// Visit an expression at the given nesting depth
pub fn accept_expr<'m, V: Visitor<'m> + ?Sized>(
    visitor: &mut V,
    scope: Scope<'m>,
    expr: &'m Expr,
    depth: usize,
) -> Result<(), V::Error> {
    if depth > scope.max_nesting {
        return Err(TraversalError::NestingLimit {
            limit: scope.max_nesting,
        }
        .into());
    }
    let node = Node::Expr(expr);
    visitor.start_visit(scope, node);
    visitor.visit_expr(scope, expr, depth)?;
    visitor.end_visit(scope, node);
    Ok(())
}

/// Visit every namespace in the given order
pub fn walk_namespaces<'m, V: Visitor<'m> + ?Sized>(
    visitor: &mut V,
    scope: Scope<'m>,
    namespaces: &[ArtifactId],
) -> Result<(), V::Error> {
    for &ns in namespaces {
        accept(visitor, scope, ns)?;
    }
    Ok(())
}

/// Types in declaration order, then functions
pub fn walk_namespace<'m, V: Visitor<'m> + ?Sized>(
    visitor: &mut V,
    scope: Scope<'m>,
    id: ArtifactId,
) -> Result<(), V::Error> {
    let namespace = scope
        .model
        .namespace_data(id)
        .map_err(TraversalError::from)?;
    for &ty in &namespace.types {
        accept(visitor, scope, ty)?;
    }
    for &function in &namespace.functions {
        accept(visitor, scope, function)?;
    }
    Ok(())
}

/// Methods and properties in declaration order
pub fn walk_type<'m, V: Visitor<'m> + ?Sized>(
    visitor: &mut V,
    scope: Scope<'m>,
    id: ArtifactId,
) -> Result<(), V::Error> {
    let data = scope.model.type_data(id).map_err(TraversalError::from)?;
    for &member in &data.members {
        accept(visitor, scope, member)?;
    }
    Ok(())
}

/// Body expressions of a method or function
pub fn walk_routine<'m, V: Visitor<'m> + ?Sized>(
    visitor: &mut V,
    scope: Scope<'m>,
    id: ArtifactId,
) -> Result<(), V::Error> {
    let routine = scope.model.routine(id).map_err(TraversalError::from)?;
    for expr in &routine.body {
        accept_expr(visitor, scope, expr, 1)?;
    }
    Ok(())
}

pub fn walk_expr<'m, V: Visitor<'m> + ?Sized>(
    visitor: &mut V,
    scope: Scope<'m>,
    expr: &'m Expr,
    depth: usize,
) -> Result<(), V::Error> {
    for child in expr.children() {
        accept_expr(visitor, scope, child, depth + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NamespaceFilter;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl<'m> Visitor<'m> for Recorder {
        type Error = TraversalError;

        fn start_visit(&mut self, scope: Scope<'m>, node: Node<'m>) {
            let label = match node {
                Node::Expr(expr) => expr.image().to_string(),
                other => other
                    .artifact()
                    .and_then(|id| scope.model.get(id))
                    .map(|a| a.name.clone())
                    .unwrap_or_default(),
            };
            self.events.push(format!("start {}", label));
        }

        fn end_visit(&mut self, _scope: Scope<'m>, node: Node<'m>) {
            if let Node::Expr(_) = node {
                return;
            }
            self.events.push("end".to_string());
        }
    }

    fn sample() -> CodeModel {
        let mut model = CodeModel::new();
        let ns = model.add_namespace("app");
        let user = model.add_class(ns, "User").unwrap();
        let save = model.add_method(user, "save").unwrap();
        model.add_property(user, "name").unwrap();
        model.routine_mut(save).unwrap().body = vec![Expr::invocation(
            "persist",
            vec![Expr::variable("$this")],
        )];
        model.add_function(ns, "helper").unwrap();
        model
    }

    #[test]
    fn test_default_walk_order() {
        let model = sample();
        let scope = Scope::unfiltered(&model);
        let mut recorder = Recorder::default();
        walk_namespaces(&mut recorder, scope, model.namespaces()).unwrap();

        assert_eq!(
            recorder.events,
            vec![
                "start app",
                "start User",
                "start save",
                "start persist",
                "start $this",
                "end",
                "start name",
                "end",
                "end",
                "start helper",
                "end",
                "end",
            ]
        );
    }

    #[test]
    fn test_filtered_namespace_is_skipped() {
        let model = sample();
        let filter = NamespaceFilter::new(["app"]).unwrap();
        let scope = Scope::new(&model, &filter);
        let mut recorder = Recorder::default();
        walk_namespaces(&mut recorder, scope, model.namespaces()).unwrap();
        assert!(recorder.events.is_empty());
    }

    #[test]
    fn test_override_can_prune() {
        struct NoTypes(usize);
        impl<'m> Visitor<'m> for NoTypes {
            type Error = TraversalError;
            fn visit_class(&mut self, _: Scope<'m>, _: ArtifactId) -> Result<(), Self::Error> {
                Ok(())
            }
            fn visit_method(&mut self, _: Scope<'m>, _: ArtifactId) -> Result<(), Self::Error> {
                self.0 += 1;
                Ok(())
            }
        }

        let model = sample();
        let mut visitor = NoTypes(0);
        walk_namespaces(&mut visitor, Scope::unfiltered(&model), model.namespaces()).unwrap();
        assert_eq!(visitor.0, 0);
    }

    #[test]
    fn test_nesting_limit() {
        let mut model = CodeModel::new();
        let ns = model.add_namespace("app");
        let f = model.add_function(ns, "deep").unwrap();
        let mut expr = Expr::literal("1");
        for _ in 0..5 {
            expr = Expr::compound("paren", vec![expr]);
        }
        model.routine_mut(f).unwrap().body = vec![expr];

        let scope = Scope::unfiltered(&model).with_max_nesting(4);
        let mut recorder = Recorder::default();
        let err = walk_namespaces(&mut recorder, scope, model.namespaces()).unwrap_err();
        assert!(matches!(err, TraversalError::NestingLimit { limit: 4 }));

        let scope = Scope::unfiltered(&model).with_max_nesting(6);
        let mut recorder = Recorder::default();
        assert!(walk_namespaces(&mut recorder, scope, model.namespaces()).is_ok());
    }
}
