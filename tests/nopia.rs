//! Integration tests for embedded interop ("no-PIA") type unification.
//!
//! The fixtures mirror the classic shape of the problem: `Pia1` is a Primary Interop
//! Assembly declaring canonical interop types, and `LocalTypes1`/`LocalTypes2` are
//! consumers that embedded local copies of those types instead of referencing `Pia1` at
//! runtime. Unification must bind the local copies back to whatever canonical definitions
//! the *current* reference set supplies - and degrade to typed error symbols, never
//! panics, when it supplies none or several.

use std::sync::Arc;

use symres::prelude::*;
use uguid::{guid, Guid};

const PIA1_SCOPE: Guid = guid!("f9c2d51d-4f44-45f0-9eda-c9d599b58257");
const I1_GUID: Guid = guid!("27e3e649-994b-4f58-b3c6-f8089a5f2c01");
const I2_GUID: Guid = guid!("27e3e649-994b-4f58-b3c6-f8089a5f2c02");

fn identity(display: &str) -> AssemblyIdentity {
    AssemblyIdentity::parse(display).unwrap()
}

fn mscorlib() -> Arc<RawAssembly> {
    RawAssembly::build(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::class("System", "Object").finish())
        .ty(RawType::class("System", "ValueType")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .finish())
        .ty(RawType::class("System", "Enum")
            .base(RawTypeRef::primitive(SpecialType::ValueType))
            .finish())
        .ty(RawType::structure("System", "Int32")
            .base(RawTypeRef::primitive(SpecialType::ValueType))
            .finish())
        .ty(RawType::structure("System", "Void")
            .base(RawTypeRef::primitive(SpecialType::ValueType))
            .finish())
        .finish()
}

/// The Primary Interop Assembly: canonical `I1`/`I2` interfaces and struct `S1`.
fn pia1() -> Arc<RawAssembly> {
    RawAssembly::build(identity("Pia1, Version=1.0.0.0"))
        .guid(PIA1_SCOPE)
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::interface("Pia1", "I1").guid(I1_GUID).finish())
        .ty(RawType::interface("Pia1", "I2").guid(I2_GUID).finish())
        .ty(RawType::structure("Pia1", "S1")
            .base(RawTypeRef::primitive(SpecialType::ValueType))
            .finish())
        .finish()
}

/// A consumer that embedded local copies of `I1`/`I2` and uses them in a signature.
fn local_types_1() -> Arc<RawAssembly> {
    RawAssembly::build(identity("LocalTypes1, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::class("LocalTypes1", "LocalTypes1")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .method(
                RawMethod::new("Test1", RawTypeRef::primitive(SpecialType::Void))
                    .param("x", RawTypeRef::named(None, "Pia1", "I1"))
                    .param("y", RawTypeRef::named(None, "Pia1", "I2"))
                    .finish(),
            )
            .finish())
        .ty(RawType::interface("Pia1", "I1")
            .guid(I1_GUID)
            .identifier(TypeIdentifier::Guid(I1_GUID))
            .finish())
        .ty(RawType::interface("Pia1", "I2")
            .guid(I2_GUID)
            .identifier(TypeIdentifier::Guid(I2_GUID))
            .finish())
        .finish()
}

/// A consumer that embedded a local copy of the struct `S1` (scope+name identified).
fn local_types_2() -> Arc<RawAssembly> {
    RawAssembly::build(identity("LocalTypes2, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::class("LocalTypes2", "LocalTypes2")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .method(
                RawMethod::new("Test2", RawTypeRef::primitive(SpecialType::Void))
                    .param("x", RawTypeRef::named(None, "Pia1", "S1"))
                    .finish(),
            )
            .finish())
        .ty(RawType::structure("Pia1", "S1")
            .base(RawTypeRef::primitive(SpecialType::ValueType))
            .identifier(TypeIdentifier::ScopeName {
                scope: PIA1_SCOPE,
                identifier: "Pia1.S1".to_string(),
            })
            .finish())
        .finish()
}

fn test1_param_types(binding: &AssemblySymbol) -> Vec<TypeSymbol> {
    let class = binding
        .lookup_top_level_type("LocalTypes1.LocalTypes1")
        .expect("consumer class is visible");
    let method = class
        .methods()
        .into_iter()
        .find(|method| method.name() == "Test1")
        .expect("Test1 exists");
    method.parameter_types()
}

#[test]
fn test_local_copies_unify_to_pia_definitions() {
    let pia = pia1();
    let resolution = Resolver::new()
        .metadata(local_types_1())
        .metadata(pia)
        .metadata(mscorlib())
        .resolve()
        .unwrap();

    let locals = resolution.assembly("LocalTypes1").unwrap();
    let pia = resolution.assembly("Pia1").unwrap();

    let expected_i1 = pia.lookup_top_level_type("Pia1.I1").unwrap();
    let expected_i2 = pia.lookup_top_level_type("Pia1.I2").unwrap();

    let params = test1_param_types(locals);
    assert_eq!(params.len(), 2);
    let bound_i1 = params[0].named().expect("resolved to a named type");
    let bound_i2 = params[1].named().expect("resolved to a named type");
    assert!(bound_i1.ptr_eq(&expected_i1), "x binds to Pia1's I1 exactly");
    assert!(bound_i2.ptr_eq(&expected_i2), "y binds to Pia1's I2 exactly");
}

#[test]
fn test_embedded_local_definitions_are_hidden() {
    let resolution = Resolver::new()
        .metadata(local_types_1())
        .metadata(pia1())
        .metadata(mscorlib())
        .resolve()
        .unwrap();

    let locals = resolution.assembly("LocalTypes1").unwrap();

    // Not visible through top-level lookup.
    assert!(locals.lookup_top_level_type("Pia1.I1").is_none());
    assert!(locals.lookup_top_level_type("Pia1.I2").is_none());

    // Not present in the namespace tree at all.
    assert!(locals.global_namespace().get_namespace("Pia1").is_none());
    let visible: Vec<String> = locals
        .underlying_graph()
        .top_level_types()
        .iter()
        .map(|ty| ty.full_name())
        .collect();
    assert_eq!(visible, vec!["LocalTypes1.LocalTypes1".to_string()]);

    // Still reachable for canonical resolution.
    assert!(locals.canonical_resolution("Pia1.I1").is_some());
}

#[test]
fn test_missing_struct_candidate_without_corlib() {
    // Pia1 syntactically defines S1, but without mscorlib its base type cannot be
    // resolved, so struct classification is inconclusive and the result is Missing.
    let resolution = Resolver::new()
        .metadata(local_types_2())
        .metadata(pia1())
        .resolve()
        .unwrap();

    let locals = resolution.assembly("LocalTypes2").unwrap();
    match locals.canonical_resolution("Pia1.S1").unwrap() {
        CanonicalResolution::Missing {
            guid,
            scope,
            identifier,
            full_name,
            ..
        } => {
            assert_eq!(guid, None);
            assert_eq!(scope, Some(PIA1_SCOPE));
            assert_eq!(identifier.as_deref(), Some("Pia1.S1"));
            assert_eq!(full_name, "Pia1.S1");
        }
        other => panic!("expected Missing, got {other:?}"),
    }
}

#[test]
fn test_struct_candidate_resolves_with_corlib() {
    let resolution = Resolver::new()
        .metadata(local_types_2())
        .metadata(pia1())
        .metadata(mscorlib())
        .resolve()
        .unwrap();

    let locals = resolution.assembly("LocalTypes2").unwrap();
    let pia = resolution.assembly("Pia1").unwrap();
    let expected = pia.lookup_top_level_type("Pia1.S1").unwrap();

    match locals.canonical_resolution("Pia1.S1").unwrap() {
        CanonicalResolution::Resolved(found) => assert!(found.ptr_eq(&expected)),
        other => panic!("expected Resolved, got {other:?}"),
    }
}

#[test]
fn test_missing_when_name_matches_but_guid_differs() {
    // An alternate assembly exposes a type of the same qualified name without the shared
    // GUID; that is not a canonical match, and the Missing result carries the marker GUID.
    let impostor = RawAssembly::build(identity("Pia1Copy, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::interface("Pia1", "I1")
            .guid(guid!("99999999-9999-9999-9999-999999999999"))
            .finish())
        .finish();

    let resolution = Resolver::new()
        .metadata(local_types_1())
        .metadata(impostor)
        .metadata(mscorlib())
        .resolve()
        .unwrap();

    let locals = resolution.assembly("LocalTypes1").unwrap();
    match locals.canonical_resolution("Pia1.I1").unwrap() {
        CanonicalResolution::Missing { guid, scope, .. } => {
            assert_eq!(guid, Some(I1_GUID));
            assert_eq!(scope, None);
        }
        other => panic!("expected Missing, got {other:?}"),
    }

    // The signature position carries the same outcome as a typed error symbol.
    let params = test1_param_types(locals);
    match params[0].error() {
        Some(ErrorType::MissingCanonicalType { embedding, .. }) => {
            assert_eq!(embedding.name, "LocalTypes1");
        }
        other => panic!("expected MissingCanonicalType, got {other:?}"),
    }
}

#[test]
fn test_ambiguous_candidates_kept_in_reference_order() {
    let pia_a = RawAssembly::build(identity("PiaA, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::interface("Pia1", "I1").guid(I1_GUID).finish())
        .ty(RawType::interface("Pia1", "I2").guid(I2_GUID).finish())
        .finish();
    let pia_b = RawAssembly::build(identity("PiaB, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::interface("Pia1", "I1").guid(I1_GUID).finish())
        .ty(RawType::interface("Pia1", "I2").guid(I2_GUID).finish())
        .finish();

    let resolution = Resolver::new()
        .metadata(local_types_1())
        .metadata(pia_a)
        .metadata(pia_b)
        .metadata(mscorlib())
        .resolve()
        .unwrap();

    let locals = resolution.assembly("LocalTypes1").unwrap();
    match locals.canonical_resolution("Pia1.I1").unwrap() {
        CanonicalResolution::Ambiguous { first, second, .. } => {
            assert_eq!(first.assembly_identity().unwrap().name, "PiaA");
            assert_eq!(second.assembly_identity().unwrap().name, "PiaB");
        }
        other => panic!("expected Ambiguous, got {other:?}"),
    }
}

#[test]
fn test_determinism_across_reference_set_changes() {
    // The same consumer object flips between Resolved, Missing and Ambiguous purely as a
    // function of the reference set it is resolved with.
    let locals = local_types_1();
    let corlib = mscorlib();
    let pia = pia1();
    let second_pia = RawAssembly::build(identity("PiaDup, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::interface("Pia1", "I1").guid(I1_GUID).finish())
        .finish();

    let with_one = Resolver::new()
        .metadata(locals.clone())
        .metadata(pia.clone())
        .metadata(corlib.clone())
        .resolve()
        .unwrap();
    assert!(with_one
        .assembly("LocalTypes1")
        .unwrap()
        .canonical_resolution("Pia1.I1")
        .unwrap()
        .is_resolved());

    let with_none = Resolver::new()
        .metadata(locals.clone())
        .metadata(corlib.clone())
        .resolve()
        .unwrap();
    assert!(matches!(
        with_none
            .assembly("LocalTypes1")
            .unwrap()
            .canonical_resolution("Pia1.I1")
            .unwrap(),
        CanonicalResolution::Missing { .. }
    ));

    let with_two = Resolver::new()
        .metadata(locals)
        .metadata(pia)
        .metadata(second_pia)
        .metadata(corlib)
        .resolve()
        .unwrap();
    assert!(matches!(
        with_two
            .assembly("LocalTypes1")
            .unwrap()
            .canonical_resolution("Pia1.I1")
            .unwrap(),
        CanonicalResolution::Ambiguous { .. }
    ));
}

#[test]
fn test_illegal_generic_instantiation_over_embedded_type() {
    // A method returning I31<I1> where I1 is an embedded local copy: closing a generic
    // over an embedded type makes canonical identity ill-defined.
    let generics = RawAssembly::build(identity("GenericsLib, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::interface("GenericsLib", "I31").generic_param("T").finish())
        .ty(RawType::interface("GenericsLib", "I32").generic_param("T").finish())
        .finish();
    let generics_identity = identity("GenericsLib, Version=1.0.0.0");

    let i31 = |arg: RawTypeRef| {
        RawTypeRef::generic(
            RawTypeRef::named_arity(Some(generics_identity.clone()), "GenericsLib", "I31", 1),
            vec![arg],
        )
    };
    let i32_of = |arg: RawTypeRef| {
        RawTypeRef::generic(
            RawTypeRef::named_arity(Some(generics_identity.clone()), "GenericsLib", "I32", 1),
            vec![arg],
        )
    };

    let consumer = RawAssembly::build(identity("Consumer, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .reference(generics_identity.clone())
        .ty(RawType::class("Consumer", "C1")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .method(
                // Deeply nested: I31<I32<I1>>.
                RawMethod::new(
                    "Deep",
                    i31(i32_of(RawTypeRef::named(None, "Pia1", "I1"))),
                )
                .finish(),
            )
            .method(
                // Control: the same shape over an ordinary type is legal.
                RawMethod::new(
                    "Plain",
                    i31(i32_of(RawTypeRef::primitive(SpecialType::Int32))),
                )
                .finish(),
            )
            .finish())
        .ty(RawType::interface("Pia1", "I1")
            .guid(I1_GUID)
            .identifier(TypeIdentifier::Guid(I1_GUID))
            .finish())
        .finish();

    let resolution = Resolver::new()
        .metadata(consumer)
        .metadata(generics)
        .metadata(pia1())
        .metadata(mscorlib())
        .resolve()
        .unwrap();

    let class = resolution
        .assembly("Consumer")
        .unwrap()
        .lookup_top_level_type("Consumer.C1")
        .unwrap();

    let deep = class
        .methods()
        .into_iter()
        .find(|method| method.name() == "Deep")
        .unwrap();
    match deep.return_type().error() {
        Some(ErrorType::IllegalGenericInstantiation { display }) => {
            assert_eq!(display, "GenericsLib.I31<GenericsLib.I32<Pia1.I1>>");
        }
        other => panic!("expected IllegalGenericInstantiation, got {other:?}"),
    }

    let plain = class
        .methods()
        .into_iter()
        .find(|method| method.name() == "Plain")
        .unwrap();
    assert!(plain.return_type().error().is_none());
}

#[test]
fn test_generic_types_cannot_be_embedded() {
    // A generic type in a signature position of an embedded interface blocks embedding,
    // including positions inherited from a base interface.
    let _generics = RawAssembly::build(identity("GenericsLib, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::interface("GenericsLib", "I31").generic_param("T").finish())
        .finish();
    let generics_identity = identity("GenericsLib, Version=1.0.0.0");

    let generic_ref = RawTypeRef::generic(
        RawTypeRef::named_arity(Some(generics_identity.clone()), "GenericsLib", "I31", 1),
        vec![RawTypeRef::primitive(SpecialType::Int32)],
    );

    let consumer = RawAssembly::build(identity("Consumer2, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .reference(generics_identity)
        .ty(RawType::interface("Pia1", "IBase")
            .guid(guid!("27e3e649-994b-4f58-b3c6-f8089a5f2c10"))
            .identifier(TypeIdentifier::Guid(guid!(
                "27e3e649-994b-4f58-b3c6-f8089a5f2c10"
            )))
            .method(
                RawMethod::new("M", RawTypeRef::primitive(SpecialType::Void))
                    .param("value", generic_ref)
                    .finish(),
            )
            .finish())
        .finish();

    let resolution = Resolver::new()
        .metadata(consumer)
        .metadata(mscorlib())
        .resolve()
        .unwrap();

    let consumer = resolution.assembly("Consumer2").unwrap();
    let embedded = consumer.embedded_local_types();
    let base = embedded
        .iter()
        .find(|ty| ty.full_name() == "Pia1.IBase")
        .expect("embedded copy is reachable for diagnostics");

    let method = base
        .methods()
        .into_iter()
        .find(|method| method.name() == "M")
        .unwrap();
    match method.parameter_types()[0].error() {
        Some(ErrorType::EmbeddedGeneric { display }) => {
            assert_eq!(display, "GenericsLib.I31<System.Int32>");
        }
        other => panic!("expected EmbeddedGeneric, got {other:?}"),
    }
}

#[test]
fn test_nested_type_with_unresolved_parent_is_unsupported() {
    // S1.S2 embedded as a nested pair: when S1 itself fails to unify, S2's identity
    // cannot even be determined, which is a different failure from Missing.
    let locals = RawAssembly::build(identity("LocalTypes3, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::class("LocalTypes3", "LocalTypes3")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .method(
                RawMethod::new("Test3", RawTypeRef::primitive(SpecialType::Void))
                    .param(
                        "x",
                        RawTypeRef::named(None, "Pia1", "S1").nested_member("S2", 0),
                    )
                    .finish(),
            )
            .finish())
        .ty(RawType::structure("Pia1", "S1")
            .base(RawTypeRef::primitive(SpecialType::ValueType))
            .identifier(TypeIdentifier::ScopeName {
                scope: PIA1_SCOPE,
                identifier: "Pia1.S1".to_string(),
            })
            .nested(
                RawType::structure("", "S2")
                    .base(RawTypeRef::primitive(SpecialType::ValueType))
                    .identifier(TypeIdentifier::ScopeName {
                        scope: PIA1_SCOPE,
                        identifier: "Pia1.S1.S2".to_string(),
                    })
                    .finish(),
            )
            .finish())
        .finish();

    // No Pia1 in the reference set: the parent does not unify.
    let resolution = Resolver::new()
        .metadata(locals)
        .metadata(mscorlib())
        .resolve()
        .unwrap();

    let class = resolution
        .assembly("LocalTypes3")
        .unwrap()
        .lookup_top_level_type("LocalTypes3.LocalTypes3")
        .unwrap();
    let method = class
        .methods()
        .into_iter()
        .find(|method| method.name() == "Test3")
        .unwrap();
    match method.parameter_types()[0].error() {
        Some(ErrorType::UnsupportedMetadataType { display }) => {
            assert_eq!(display, "Pia1.S1.S2");
        }
        other => panic!("expected UnsupportedMetadataType, got {other:?}"),
    }
}
