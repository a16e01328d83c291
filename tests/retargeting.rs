//! Integration tests for the retargeting layer.
//!
//! A compilation built against one set of reference builds is observed by a session that
//! substitutes a different build of the same logical assembly. The compilation's symbols
//! must come back as retargeting wrappers: structurally identical (names, flags, display
//! strings), but with every type-valued property re-pointed into the substituted build -
//! including explicit interface implementation links, custom attributes and custom
//! modifiers - and with special-type intent preserved where the new reference set cannot
//! resolve a predefined type at all.

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
        .ty(RawType::class("System", "Enum")
            .base(RawTypeRef::primitive(SpecialType::ValueType))
            .finish())
        .ty(RawType::class("System", "String")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .finish())
        .ty(RawType::structure("System", "Int16")
            .base(RawTypeRef::primitive(SpecialType::ValueType))
            .finish())
        .ty(RawType::structure("System", "Void")
            .base(RawTypeRef::primitive(SpecialType::ValueType))
            .finish())
        .finish()
}

/// One build of the interface library: `I` declares `M(S)` and `N(S)`.
fn ilib_v1() -> Arc<RawAssembly> {
    RawAssembly::build(identity("ILib, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::class("ILib", "S")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .finish())
        .ty(RawType::class("ILib", "T")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .finish())
        .ty(RawType::interface("ILib", "I")
            .method(
                RawMethod::new("M", RawTypeRef::primitive(SpecialType::Void))
                    .param("s", RawTypeRef::named(None, "ILib", "S"))
                    .finish(),
            )
            .method(
                RawMethod::new("N", RawTypeRef::primitive(SpecialType::Void))
                    .param("s", RawTypeRef::named(None, "ILib", "S"))
                    .finish(),
            )
            .finish())
        .finish()
}

/// Another build of the same identity: `M` is unchanged, `N` now takes `T` instead of `S`.
fn ilib_v2() -> Arc<RawAssembly> {
    RawAssembly::build(identity("ILib, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::class("ILib", "S")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .finish())
        .ty(RawType::class("ILib", "T")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .finish())
        .ty(RawType::interface("ILib", "I")
            .method(
                RawMethod::new("M", RawTypeRef::primitive(SpecialType::Void))
                    .param("s", RawTypeRef::named(None, "ILib", "S"))
                    .finish(),
            )
            .method(
                RawMethod::new("N", RawTypeRef::primitive(SpecialType::Void))
                    .param("t", RawTypeRef::named(None, "ILib", "T"))
                    .finish(),
            )
            .finish())
        .finish()
}

fn ilib_ref() -> AssemblyIdentity {
    identity("ILib, Version=1.0.0.0")
}

/// A compilation implementing `ILib.I`, built against the v1 build.
fn consumer(ilib: Arc<RawAssembly>, corlib: Arc<RawAssembly>) -> Arc<Compilation> {
    let iface = RawTypeRef::named(Some(ilib_ref()), "ILib", "I");
    let raw = RawAssembly::build(identity("CLib, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .reference(ilib_ref())
        .ty(RawType::class("CLib", "C")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .implements(iface.clone())
            .method(
                RawMethod::new("M", RawTypeRef::primitive(SpecialType::Void))
                    .param("s", RawTypeRef::named(Some(ilib_ref()), "ILib", "S"))
                    .implements(iface.clone(), "M")
                    .finish(),
            )
            .method(
                RawMethod::new("N", RawTypeRef::primitive(SpecialType::Void))
                    .param("s", RawTypeRef::named(Some(ilib_ref()), "ILib", "S"))
                    .implements(iface, "N")
                    .finish(),
            )
            .finish())
        .finish();
    Compilation::new(
        raw,
        vec![Reference::metadata(corlib), Reference::metadata(ilib)],
    )
}

fn method(class: &NamedType, name: &str) -> MethodSymbol {
    class
        .methods()
        .into_iter()
        .find(|method| method.name() == name)
        .expect("method exists")
}

#[test]
fn test_substituted_build_produces_retargeting_view() {
    let corlib = mscorlib();
    let compilation = consumer(ilib_v1(), corlib.clone());

    // Same reference objects: the compilation's own graph is reused as-is.
    let same = Resolver::new()
        .compilation(compilation.clone())
        .resolve()
        .unwrap();
    assert!(!same.assembly("CLib").unwrap().is_retargeting());

    // A different build of ILib under the same identity: observed through retargeting.
    let substituted = Resolver::new()
        .compilation(compilation)
        .metadata(ilib_v2())
        .metadata(corlib)
        .resolve()
        .unwrap();
    assert!(substituted.assembly("CLib").unwrap().is_retargeting());
}

#[test]
fn test_display_round_trip_through_retargeting() {
    let corlib = mscorlib();
    let compilation = consumer(ilib_v1(), corlib.clone());
    let native_class = compilation
        .graph()
        .lookup_top_level_type("CLib.C")
        .unwrap();

    let substituted = Resolver::new()
        .compilation(compilation.clone())
        .metadata(ilib_v2())
        .metadata(corlib)
        .resolve()
        .unwrap();
    let retargeted_class = substituted
        .assembly("CLib")
        .unwrap()
        .lookup_top_level_type("CLib.C")
        .unwrap();

    // Distinct symbols, identical rendering.
    assert!(!retargeted_class.ptr_eq(&native_class));
    assert_eq!(
        retargeted_class.to_display_string(),
        native_class.to_display_string()
    );

    let native_m = method(&native_class, "M");
    let retargeted_m = method(&retargeted_class, "M");
    assert_eq!(
        retargeted_m.to_display_string(),
        native_m.to_display_string()
    );

    // The parameter types render identically but live in different builds.
    let native_param = &native_m.parameter_types()[0];
    let retargeted_param = &retargeted_m.parameter_types()[0];
    assert_eq!(
        retargeted_param.to_display_string(),
        native_param.to_display_string()
    );
    assert_ne!(native_param, retargeted_param);
}

#[test]
fn test_retargeted_symbols_are_interned() {
    let corlib = mscorlib();
    let compilation = consumer(ilib_v1(), corlib.clone());
    let resolution = Resolver::new()
        .compilation(compilation)
        .metadata(ilib_v2())
        .metadata(corlib)
        .resolve()
        .unwrap();

    let binding = resolution.assembly("CLib").unwrap();
    let first = binding.lookup_top_level_type("CLib.C").unwrap();
    let second = binding.lookup_top_level_type("CLib.C").unwrap();
    assert!(first.ptr_eq(&second));

    let first_m = method(&first, "M");
    let second_m = method(&second, "M");
    assert!(first_m.ptr_eq(&second_m));
}

#[test]
fn test_explicit_impls_relink_against_current_interface_version() {
    let corlib = mscorlib();
    let compilation = consumer(ilib_v1(), corlib.clone());

    // Against its own references, both entries link.
    let native_class = compilation
        .graph()
        .lookup_top_level_type("CLib.C")
        .unwrap();
    assert_eq!(
        method(&native_class, "M")
            .explicit_interface_implementations()
            .len(),
        1
    );
    assert_eq!(
        method(&native_class, "N")
            .explicit_interface_implementations()
            .len(),
        1
    );

    // Against v2, M still matches and re-points; N's signature changed and drops.
    let substituted = Resolver::new()
        .compilation(compilation)
        .metadata(ilib_v2())
        .metadata(corlib)
        .resolve()
        .unwrap();
    let retargeted_class = substituted
        .assembly("CLib")
        .unwrap()
        .lookup_top_level_type("CLib.C")
        .unwrap();

    let m_impls = method(&retargeted_class, "M").explicit_interface_implementations();
    assert_eq!(m_impls.len(), 1);
    let v2_interface = substituted
        .assembly("ILib")
        .unwrap()
        .lookup_top_level_type("ILib.I")
        .unwrap();
    let v2_m = method(&v2_interface, "M");
    assert!(m_impls[0].ptr_eq(&v2_m), "re-pointed at the current build's member");

    let n_impls = method(&retargeted_class, "N").explicit_interface_implementations();
    assert!(n_impls.is_empty(), "changed signature drops the link");
}

#[test]
fn test_structural_queries_pass_through() {
    let corlib = mscorlib();
    let compilation = consumer(ilib_v1(), corlib.clone());
    let native_class = compilation
        .graph()
        .lookup_top_level_type("CLib.C")
        .unwrap();

    let substituted = Resolver::new()
        .compilation(compilation)
        .metadata(ilib_v2())
        .metadata(corlib)
        .resolve()
        .unwrap();
    let retargeted_class = substituted
        .assembly("CLib")
        .unwrap()
        .lookup_top_level_type("CLib.C")
        .unwrap();

    assert_eq!(retargeted_class.name(), native_class.name());
    assert_eq!(retargeted_class.metadata_name(), native_class.metadata_name());
    assert_eq!(retargeted_class.arity(), native_class.arity());
    assert_eq!(retargeted_class.type_kind(), native_class.type_kind());

    let native_m = method(&native_class, "M");
    let retargeted_m = method(&retargeted_class, "M");
    assert_eq!(retargeted_m.flags(), native_m.flags());
    assert_eq!(retargeted_m.accessibility(), native_m.accessibility());
}

#[test]
fn test_enum_keeps_special_type_intent_without_corlib() {
    // UtilLib stands in for any reference whose build can change; the compilation never
    // references a corlib, so System.Enum and the underlying Int16 are unresolvable both
    // natively and after retargeting.
    let util_v1 = RawAssembly::build(identity("UtilLib, Version=1.0.0.0"))
        .ty(RawType::class("UtilLib", "Helper").finish())
        .finish();
    let util_v2 = RawAssembly::build(identity("UtilLib, Version=1.0.0.0"))
        .ty(RawType::class("UtilLib", "Helper").finish())
        .finish();

    let raw = RawAssembly::build(identity("EnumLib, Version=1.0.0.0"))
        .reference(identity("UtilLib, Version=1.0.0.0"))
        .ty(RawType::enumeration("EnumLib", "E")
            .base(RawTypeRef::primitive(SpecialType::Enum))
            .underlying(SpecialType::Int16)
            .finish())
        .finish();
    let compilation = Compilation::new(raw, vec![Reference::metadata(util_v1)]);

    let substituted = Resolver::new()
        .compilation(compilation)
        .metadata(util_v2)
        .resolve()
        .unwrap();
    let binding = substituted.assembly("EnumLib").unwrap();
    assert!(binding.is_retargeting());

    let enum_type = binding.lookup_top_level_type("EnumLib.E").unwrap();
    assert_eq!(enum_type.type_kind(), TypeKind::Enum);

    let base = enum_type.base().expect("base reference present");
    assert!(base.is_error());
    assert_eq!(base.special(), Some(SpecialType::Enum));
    assert_eq!(base.named().unwrap().type_kind(), TypeKind::Error);

    let underlying = enum_type.enum_underlying().expect("underlying declared");
    assert!(underlying.is_error());
    assert_eq!(underlying.special(), Some(SpecialType::Int16));
}

#[test]
fn test_attributes_and_modifiers_retarget() {
    let corlib = mscorlib();
    let alib_v1 = RawAssembly::build(identity("ALib, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::class("ALib", "MarkerAttribute")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .method(
                RawMethod::new(".ctor", RawTypeRef::primitive(SpecialType::Void))
                    .param("name", RawTypeRef::primitive(SpecialType::String))
                    .param("types", RawTypeRef::array(RawTypeRef::primitive(SpecialType::String)))
                    .finish(),
            )
            .finish())
        .ty(RawType::class("ALib", "Mod")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .finish())
        .ty(RawType::class("ALib", "Payload")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .finish())
        .finish();
    let alib_v2 = RawAssembly::build(identity("ALib, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::class("ALib", "MarkerAttribute")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .method(
                RawMethod::new(".ctor", RawTypeRef::primitive(SpecialType::Void))
                    .param("name", RawTypeRef::primitive(SpecialType::String))
                    .param("types", RawTypeRef::array(RawTypeRef::primitive(SpecialType::String)))
                    .finish(),
            )
            .finish())
        .ty(RawType::class("ALib", "Mod")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .finish())
        .ty(RawType::class("ALib", "Payload")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .finish())
        .finish();

    let alib_identity = identity("ALib, Version=1.0.0.0");
    let attribute = RawAttribute::new(RawTypeRef::named(
        Some(alib_identity.clone()),
        "ALib",
        "MarkerAttribute",
    ))
    .arg(RawConstant::new(
        RawTypeRef::primitive(SpecialType::String),
        RawConstantValue::String("marked".to_string()),
    ))
    // A null argument keeps its static array type through retargeting.
    .arg(RawConstant::new(
        RawTypeRef::array(RawTypeRef::primitive(SpecialType::String)),
        RawConstantValue::Null,
    ))
    .named_arg(
        "Target",
        false,
        RawConstant::new(
            RawTypeRef::primitive(SpecialType::Object),
            RawConstantValue::Type(RawTypeRef::named(
                Some(alib_identity.clone()),
                "ALib",
                "Payload",
            )),
        ),
    );

    let raw = RawAssembly::build(identity("Annotated, Version=1.0.0.0"))
        .reference(identity("mscorlib, Version=4.0.0.0"))
        .reference(alib_identity.clone())
        .ty(RawType::class("Annotated", "Subject")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .attribute(attribute)
            .method(
                RawMethod::new("Run", RawTypeRef::primitive(SpecialType::Void))
                    .param_modified(
                        "p",
                        RawTypeRef::primitive(SpecialType::String),
                        vec![RawModifier {
                            required: true,
                            modifier: RawTypeRef::named(Some(alib_identity), "ALib", "Mod"),
                        }],
                    )
                    .finish(),
            )
            .finish())
        .finish();
    let compilation = Compilation::new(
        raw,
        vec![
            Reference::metadata(corlib.clone()),
            Reference::metadata(alib_v1),
        ],
    );

    let substituted = Resolver::new()
        .compilation(compilation)
        .metadata(alib_v2)
        .metadata(corlib)
        .resolve()
        .unwrap();
    let binding = substituted.assembly("Annotated").unwrap();
    assert!(binding.is_retargeting());

    let subject = binding.lookup_top_level_type("Annotated.Subject").unwrap();
    let attributes = subject.attributes();
    assert_eq!(attributes.len(), 1);
    let data = &attributes[0];

    // The attribute class and constructor re-point into the substituted build.
    let v2_marker = substituted
        .assembly("ALib")
        .unwrap()
        .lookup_top_level_type("ALib.MarkerAttribute")
        .unwrap();
    assert!(data.class.named().unwrap().ptr_eq(&v2_marker));
    let constructor = data.constructor.as_ref().expect("two-argument ctor found");
    assert_eq!(constructor.name(), ".ctor");
    assert_eq!(constructor.parameters().len(), 2);

    // Values are preserved; the null argument keeps its array static type.
    assert_eq!(data.positional[0].value, ConstantData::String("marked".to_string()));
    assert_eq!(data.positional[1].value, ConstantData::Null);
    assert_eq!(data.positional[1].ty.to_display_string(), "System.String[]");

    // The typeof argument re-points at the substituted build's type.
    let v2_payload = substituted
        .assembly("ALib")
        .unwrap()
        .lookup_top_level_type("ALib.Payload")
        .unwrap();
    match &data.named[0].value.value {
        ConstantData::Type(ty) => assert!(ty.named().unwrap().ptr_eq(&v2_payload)),
        other => panic!("expected a type constant, got {other:?}"),
    }

    // Custom modifiers keep their flag and re-point their modifier type.
    let run = method(&subject, "Run");
    let modifiers = run.parameters()[0].custom_modifiers().to_vec();
    assert_eq!(modifiers.len(), 1);
    assert!(modifiers[0].required);
    let v2_mod = substituted
        .assembly("ALib")
        .unwrap()
        .lookup_top_level_type("ALib.Mod")
        .unwrap();
    assert!(modifiers[0].modifier.named().unwrap().ptr_eq(&v2_mod));

    // Re-fetching yields a distinct-but-equal application.
    let again = subject.attributes();
    assert_eq!(again[0], attributes[0]);
}
