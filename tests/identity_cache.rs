//! Integration tests for graph identity, caching and session binding.
//!
//! The load-bearing invariant: object-identical inputs always bind to reference-equal
//! graph instances, and any change to a reference list - a different build of a same-named
//! assembly included - yields fresh, never aliased, symbol trees.

use std::sync::Arc;

use symres::prelude::*;

fn identity(display: &str) -> AssemblyIdentity {
    AssemblyIdentity::parse(display).unwrap()
}

fn mscorlib() -> Arc<RawAssembly> {
    RawAssembly::build(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::class("System", "Object").finish())
        .ty(RawType::class("System", "ValueType")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .finish())
        .finish()
}

fn library(name: &str, corlib_name: &str) -> Arc<RawAssembly> {
    RawAssembly::build(identity(&format!("{name}, Version=1.0.0.0")))
        .reference(identity(&format!("{corlib_name}, Version=4.0.0.0")))
        .ty(RawType::class(name, "C1")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .finish())
        .finish()
}

#[test]
fn test_identical_sessions_share_graph_instances() {
    let corlib = mscorlib();
    let lib = library("StableLib", "mscorlib");

    let first = Resolver::new()
        .metadata(lib.clone())
        .metadata(corlib.clone())
        .resolve()
        .unwrap();
    let second = Resolver::new()
        .metadata(lib)
        .metadata(corlib)
        .resolve()
        .unwrap();

    for (a, b) in first.assemblies().iter().zip(second.assemblies()) {
        assert!(Arc::ptr_eq(a.underlying_graph(), b.underlying_graph()));
    }
}

#[test]
fn test_different_build_of_dependency_rebinds() {
    // Two builds of the corlib under the same identity: structurally indistinguishable,
    // but the dependent library's graph must never alias across them.
    let corlib_build1 = mscorlib();
    let corlib_build2 = mscorlib();
    let lib = library("RebindLib", "mscorlib");

    let against_build1 = Resolver::new()
        .metadata(lib.clone())
        .metadata(corlib_build1)
        .resolve()
        .unwrap();
    let against_build2 = Resolver::new()
        .metadata(lib)
        .metadata(corlib_build2)
        .resolve()
        .unwrap();

    let lib_graph1 = against_build1.assembly("RebindLib").unwrap().underlying_graph();
    let lib_graph2 = against_build2.assembly("RebindLib").unwrap().underlying_graph();
    assert!(!Arc::ptr_eq(lib_graph1, lib_graph2));

    // The type symbols inside follow suit: same names, distinct identities.
    let c1_first = against_build1
        .assembly("RebindLib")
        .unwrap()
        .lookup_top_level_type("RebindLib.C1")
        .unwrap();
    let c1_second = against_build2
        .assembly("RebindLib")
        .unwrap()
        .lookup_top_level_type("RebindLib.C1")
        .unwrap();
    assert_eq!(c1_first.full_name(), c1_second.full_name());
    assert!(!c1_first.ptr_eq(&c1_second));
}

#[test]
fn test_compilation_graph_is_stable() {
    let corlib = mscorlib();
    let lib = library("DepLib", "mscorlib");
    let raw = RawAssembly::build(identity("App, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .reference(identity("DepLib, Version=1.0.0.0"))
        .ty(RawType::class("App", "Main")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .finish())
        .finish();
    let compilation = Compilation::new(
        raw,
        vec![Reference::metadata(corlib), Reference::metadata(lib)],
    );

    let first = compilation.graph();
    let second = compilation.graph();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_compilation_reused_under_identical_bindings() {
    let corlib = mscorlib();
    let lib = library("ReuseDep", "mscorlib");
    let raw = RawAssembly::build(identity("ReuseApp, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .reference(identity("ReuseDep, Version=1.0.0.0"))
        .ty(RawType::class("ReuseApp", "Main")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .finish())
        .finish();
    let compilation = Compilation::new(
        raw,
        vec![
            Reference::metadata(corlib.clone()),
            Reference::metadata(lib.clone()),
        ],
    );

    // Same reference objects (explicitly listed): reused as-is.
    let resolution = Resolver::new()
        .compilation(compilation.clone())
        .metadata(lib)
        .metadata(corlib)
        .resolve()
        .unwrap();
    let binding = resolution.assembly("ReuseApp").unwrap();
    assert!(!binding.is_retargeting());
    assert!(Arc::ptr_eq(binding.underlying_graph(), &compilation.graph()));

    // A substituted build of the dependency: observed through retargeting instead.
    let other_build = library("ReuseDep", "mscorlib");
    let substituted = Resolver::new()
        .compilation(compilation.clone())
        .metadata(other_build)
        .resolve()
        .unwrap();
    let substituted_binding = substituted.assembly("ReuseApp").unwrap();
    assert!(substituted_binding.is_retargeting());
    assert!(Arc::ptr_eq(
        substituted_binding.underlying_graph(),
        &compilation.graph()
    ));
}

#[test]
fn test_transitive_references_appended_in_order() {
    let corlib = mscorlib();
    let lib_a = library("TransA", "mscorlib");
    let lib_b = library("TransB", "mscorlib");
    let raw = RawAssembly::build(identity("TransApp, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::class("TransApp", "Main")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .finish())
        .finish();
    let compilation = Compilation::new(
        raw,
        vec![
            Reference::metadata(lib_a),
            Reference::metadata(lib_b),
            Reference::metadata(corlib),
        ],
    );

    let resolution = Resolver::new().compilation(compilation).resolve().unwrap();
    let names: Vec<&str> = resolution
        .assemblies()
        .iter()
        .map(|symbol| symbol.identity().name.as_str())
        .collect();
    assert_eq!(names, vec!["TransApp", "TransA", "TransB", "mscorlib"]);
    assert_eq!(resolution.input_assemblies().len(), 1);
}

#[test]
fn test_empty_session_is_rejected() {
    match Resolver::new().resolve() {
        Err(symres::Error::Empty) => {}
        Err(other) => panic!("expected Empty, got {other:?}"),
        Ok(_) => panic!("expected Empty, session resolved"),
    }
}

#[test]
fn test_duplicate_input_identities_are_rejected() {
    let build1 = mscorlib();
    let build2 = mscorlib();
    match Resolver::new().metadata(build1).metadata(build2).resolve() {
        Err(symres::Error::DuplicateAssembly(name)) => {
            assert!(name.starts_with("mscorlib"));
        }
        Err(other) => panic!("expected DuplicateAssembly, got {other:?}"),
        Ok(_) => panic!("expected DuplicateAssembly, session resolved"),
    }
}

#[test]
fn test_corlib_detection_and_hint() {
    let corlib = mscorlib();
    let lib = library("HintLib", "mscorlib");

    let detected = Resolver::new()
        .metadata(lib.clone())
        .metadata(corlib.clone())
        .resolve()
        .unwrap();
    assert_eq!(detected.corlib().unwrap().identity().name, "mscorlib");

    // A second System.Object definer; the hint picks the winner.
    let alt_corlib = RawAssembly::build(identity("System.Runtime, Version=4.0.0.0"))
        .ty(RawType::class("System", "Object").finish())
        .finish();
    let hinted = Resolver::new()
        .metadata(lib)
        .metadata(corlib)
        .metadata(alt_corlib)
        .corlib_hint(identity("System.Runtime, Version=4.0.0.0"))
        .resolve()
        .unwrap();
    assert_eq!(hinted.corlib().unwrap().identity().name, "System.Runtime");
}
