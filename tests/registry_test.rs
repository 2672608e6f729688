mod common;

use nsregistry::registry::Dependencies;
use nsregistry::{Function, NamespaceError, NamespaceRef, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use common::bare_registry;

#[test]
fn test_second_create_fails_with_same_name() {
    let registry = bare_registry();
    registry.create_namespace("App.Models").unwrap();

    match registry.create_namespace("App.Models") {
        Err(NamespaceError::AlreadyExists { fqn }) => assert_eq!(fqn, "App.Models"),
        other => panic!("expected AlreadyExists, got {:?}", other),
    }
}

#[test]
fn test_cache_matches_tree_walk() {
    let registry = bare_registry();
    registry.create_namespace("a.b.c").unwrap();

    for fqn in ["a", "a.b", "a.b.c"] {
        let resolved = registry.resolve(fqn).unwrap();
        let walked = registry.walk(fqn).unwrap();
        assert_eq!(walked, Value::Namespace(resolved.clone()));
        assert_eq!(resolved.self_namespace(), Some(fqn));
    }
}

#[test]
fn test_depends_returns_created_namespace() {
    let registry = bare_registry();
    let created = registry.create_namespace("a.b.c").unwrap();

    let deps = registry.depends(["a.b.c"]).unwrap();
    assert_eq!(deps, Dependencies::One(created));

    let err = registry.depends(["a.b.missing"]).unwrap_err();
    assert!(matches!(err, NamespaceError::Dependency { .. }));
}

#[test]
fn test_is_loaded_success_value_is_the_namespace() {
    let registry = bare_registry();
    assert!(registry.is_loaded(["Lib.Core"]).is_none());

    let core = registry.create_namespace("Lib.Core").unwrap();
    let util = registry.create_namespace("Lib.Util").unwrap();

    assert_eq!(
        registry.is_loaded(["Lib.Core"]),
        Some(Dependencies::One(core.clone()))
    );
    assert_eq!(
        registry.is_loaded(["Lib.Core", "Lib.Util"]),
        Some(Dependencies::Many(vec![core, util]))
    );
    assert!(registry.is_loaded(["Lib.Core", "Lib.Gone"]).is_none());
}

#[test]
fn test_using_unknown_member_is_export_error() {
    let registry = bare_registry();
    registry.create_namespace("App.Models").unwrap();

    let err = registry
        .using("App.Models", &["Foo"], |exports| exports.values())
        .unwrap_err();
    assert!(matches!(err, NamespaceError::Export { ref name, .. } if name == "Foo"));
}

#[test]
fn test_create_with_then_package_preserves_identity() {
    let registry = bare_registry();
    let mut created: Option<NamespaceRef> = None;

    let answer = registry
        .create_namespace_with("App.Service", |ns| {
            created = Some(ns.clone());
            42
        })
        .unwrap();
    assert_eq!(answer, 42);

    let packaged = registry.package("App.Service", |ns| ns.clone()).unwrap();
    assert!(packaged.ptr_eq(&created.unwrap()));
}

#[test]
fn test_using_exports_class_and_constructs_it() {
    let registry = bare_registry();
    registry
        .package("App.Models", |ns| {
            let user = NamespaceRef::constructible(Function::new("initialize", |args| {
                Value::data(format!("user:{}", args.len()))
            }));
            ns.set("User", user).unwrap();
        })
        .unwrap();

    let built = registry
        .using("App.Models", &["User"], |exports| {
            let user = exports.get("User").unwrap();
            user.as_namespace()
                .unwrap()
                .initialize(&[Value::data("alice")])
        })
        .unwrap();
    assert_eq!(built, Some(Value::data("user:1")));
}

#[test]
fn test_nested_namespaces_under_constructible_are_resolvable() {
    let registry = bare_registry();
    let class = NamespaceRef::constructible(Function::new("initialize", |_| Value::data(0)));
    registry.root().set("Widget", class.clone()).unwrap();

    let child = registry.create_namespace("Widget.Parts").unwrap();
    assert!(registry.resolve("Widget").unwrap().ptr_eq(&class));
    assert!(registry.depends(["Widget.Parts"]).unwrap().single().unwrap().ptr_eq(&child));
}

fn fqn_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[A-Za-z_][A-Za-z0-9_]{0,6}", 1..5)
}

proptest! {
    #[test]
    fn prop_create_twice_always_already_exists(segments in fqn_strategy()) {
        let registry = bare_registry();
        let fqn = segments.join(".");
        prop_assert!(registry.create_namespace(&fqn).is_ok());
        match registry.create_namespace(&fqn) {
            Err(NamespaceError::AlreadyExists { fqn: reported }) => prop_assert_eq!(reported, fqn),
            other => prop_assert!(false, "expected AlreadyExists, got {:?}", other),
        }
    }

    #[test]
    fn prop_every_prefix_is_cache_consistent(segments in fqn_strategy()) {
        let registry = bare_registry();
        let fqn = segments.join(".");
        let leaf = registry.create_namespace(&fqn).unwrap();

        for i in 0..segments.len() {
            let prefix = segments[..=i].join(".");
            prop_assert!(registry.is_cached(&prefix));
            let resolved = registry.resolve(&prefix).unwrap();
            prop_assert_eq!(registry.walk(&prefix), Some(Value::Namespace(resolved.clone())));
            prop_assert_eq!(resolved.self_namespace(), Some(prefix.as_str()));
        }
        prop_assert!(registry.resolve(&fqn).unwrap().ptr_eq(&leaf));
    }
}
