//! Hierarchy resolution across the model and hierarchy crates

mod common;

use common::Fixture;
use depend::ast::{
    ConstantValue, Constant, FilterChain, NamespaceFilter, Scope, TraitAlias, TraitPrecedence,
    TraitUse, TypeRef,
};
use depend::hierarchy::{Hierarchy, HierarchyError};

#[test]
fn subtype_follows_the_parent_chain() {
    let mut f = Fixture::new("app");
    let a = f.class("A");
    let b = f.class("B");
    let c = f.class("C");
    f.extends(b, "app\\A");
    f.extends(c, "app\\B");

    let hierarchy = Hierarchy::new(Scope::unfiltered(&f.model));
    assert_eq!(hierarchy.parent_chain(c).unwrap(), vec![b, a]);
    assert!(hierarchy.is_subtype_of(c, a).unwrap());
    assert!(!hierarchy.is_subtype_of(a, c).unwrap());
    assert!(hierarchy.is_subtype_of(c, c).unwrap());
}

#[test]
fn interfaces_of_ancestors_and_interface_parents_are_collected() {
    let mut f = Fixture::new("app");
    let countable = f.interface("Countable");
    let collection = f.interface("Collection");
    let base = f.class("Base");
    let list = f.class("List");
    f.implements(collection, "app\\Countable");
    f.implements(base, "app\\Collection");
    f.extends(list, "app\\Base");

    let hierarchy = Hierarchy::new(Scope::unfiltered(&f.model));
    let interfaces = hierarchy.all_interfaces(list).unwrap();
    assert!(interfaces.contains(&collection));
    assert!(interfaces.contains(&countable));
    assert_eq!(interfaces.len(), 2);
    assert!(hierarchy.is_subtype_of(list, countable).unwrap());
}

#[test]
fn cyclic_parents_are_reported() {
    let mut f = Fixture::new("app");
    let a = f.class("A");
    let b = f.class("B");
    f.extends(a, "app\\B");
    f.extends(b, "app\\A");

    let hierarchy = Hierarchy::new(Scope::unfiltered(&f.model));
    let err = hierarchy.parent_chain(a).unwrap_err();
    assert!(matches!(err, HierarchyError::RecursiveInheritance { .. }));
}

#[test]
fn filtered_supertypes_are_skipped_silently() {
    let mut f = Fixture::new("app");
    let vendor = f.model.add_namespace("vendor");
    f.model.add_class(vendor, "Base").unwrap();
    f.model.add_interface(vendor, "Marker").unwrap();
    let user = f.class("User");
    f.extends(user, "vendor\\Base");
    f.implements(user, "vendor\\Marker");

    let filter = FilterChain::new().with(NamespaceFilter::new(["vendor"]).unwrap());
    let hierarchy = Hierarchy::new(Scope::new(&f.model, &filter));
    assert!(hierarchy.parent_chain(user).unwrap().is_empty());
    assert!(hierarchy.all_interfaces(user).unwrap().is_empty());
}

#[test]
fn precedence_picks_the_winning_trait() {
    let mut f = Fixture::new("app");
    let t1 = f.trait_("T1");
    let t2 = f.trait_("T2");
    let class = f.class("Subject");
    let foo1 = f.method(t1, "foo");
    f.method(t2, "foo");

    let mut trait_use = TraitUse::new([TypeRef::new("app\\T1"), TypeRef::new("app\\T2")]);
    trait_use.precedences.push(TraitPrecedence {
        trait_ref: TypeRef::new("app\\T1"),
        method: "foo".into(),
        instead_of: vec![TypeRef::new("app\\T2")],
    });
    f.uses(class, trait_use);

    let hierarchy = Hierarchy::new(Scope::unfiltered(&f.model));
    let methods = hierarchy.all_methods(class).unwrap();
    let foo = methods.get("foo").unwrap();
    assert_eq!(foo.method, foo1);
    assert_eq!(foo.origin, t1);
}

#[test]
fn unresolved_trait_conflict_is_a_collision() {
    let mut f = Fixture::new("app");
    let t1 = f.trait_("T1");
    let t2 = f.trait_("T2");
    let class = f.class("Subject");
    f.method(t1, "foo");
    f.method(t2, "foo");
    f.uses(
        class,
        TraitUse::new([TypeRef::new("app\\T1"), TypeRef::new("app\\T2")]),
    );

    let hierarchy = Hierarchy::new(Scope::unfiltered(&f.model));
    match hierarchy.all_methods(class) {
        Err(HierarchyError::MethodCollision { method, .. }) => assert_eq!(method, "foo"),
        other => panic!("expected a collision, got {:?}", other),
    }
}

#[test]
fn alias_binds_a_second_name_to_the_trait_method() {
    let mut f = Fixture::new("app");
    let t = f.trait_("T");
    let class = f.class("Subject");
    let foo = f.method(t, "foo");

    let mut trait_use = TraitUse::new([TypeRef::new("app\\T")]);
    trait_use.aliases.push(TraitAlias {
        trait_ref: Some(TypeRef::new("app\\T")),
        method: "foo".into(),
        alias: Some("bar".into()),
        visibility: None,
    });
    f.uses(class, trait_use);

    let hierarchy = Hierarchy::new(Scope::unfiltered(&f.model));
    let methods = hierarchy.all_methods(class).unwrap();
    assert_eq!(methods.get("foo").unwrap().method, foo);
    assert_eq!(methods.get("bar").unwrap().method, foo);
    assert_eq!(methods.get("bar").unwrap().origin, t);
}

#[test]
fn own_methods_win_over_traits_and_parents() {
    let mut f = Fixture::new("app");
    let base = f.class("Base");
    let t = f.trait_("T");
    let class = f.class("Subject");
    f.method(base, "save");
    f.method(t, "save");
    let own = f.method(class, "SAVE");
    f.extends(class, "app\\Base");
    f.uses(class, TraitUse::new([TypeRef::new("app\\T")]));

    let hierarchy = Hierarchy::new(Scope::unfiltered(&f.model));
    let methods = hierarchy.all_methods(class).unwrap();
    assert_eq!(methods.len(), 1);
    assert_eq!(methods.get("save").unwrap().method, own);
    assert_eq!(methods.get("save").unwrap().origin, class);
}

#[test]
fn null_constant_is_declared_but_missing_is_not() {
    let mut f = Fixture::new("app");
    let base = f.class("Base");
    let child = f.class("Child");
    f.extends(child, "app\\Base");
    f.model
        .type_data_mut(base)
        .unwrap()
        .constants
        .push(Constant::new("X", ConstantValue::Null));

    let hierarchy = Hierarchy::new(Scope::unfiltered(&f.model));
    assert!(hierarchy.has_constant(child, "X").unwrap());
    assert_eq!(hierarchy.constant(child, "X").unwrap(), Some(&ConstantValue::Null));
    assert!(!hierarchy.has_constant(child, "Y").unwrap());
    assert_eq!(hierarchy.constant(child, "Y").unwrap(), None);
}
