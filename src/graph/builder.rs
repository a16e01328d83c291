//! Realization of raw descriptors into symbol graphs.
//!
//! Construction is structure-eager and type-lazy: the full namespace/type/member tree is
//! materialized up front so that names and identities are stable, while every type-valued
//! property stays behind a `OnceLock` until first dereference. Locally embedded interop
//! copies (marker-carrying definitions) are routed into the graph's hidden side table
//! instead of the namespace tree, which is what keeps them out of all public lookups.

use std::sync::{Arc, OnceLock, Weak};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::{
    graph::{NamespaceSymbol, SymbolGraph, SymbolGraphRc},
    metadata::provider::{RawAssembly, RawType, RawTypeKind},
    resolve::AssemblySymbol,
    symbols::{
        members::{
            EventDefSymbol, FieldDefSymbol, MethodDefSymbol, PropertyDefSymbol,
            TypeParameterSymbol,
        },
        SpecialType, TypeDefRc, TypeDefSymbol, TypeKind,
    },
};

/// Whether any definition in the descriptor, at any nesting depth, carries an embedded
/// interop marker.
pub(crate) fn has_local_types(raw: &RawAssembly) -> bool {
    fn any_marked(types: &[RawType]) -> bool {
        types
            .iter()
            .any(|ty| ty.type_identifier.is_some() || any_marked(&ty.nested))
    }
    any_marked(&raw.types)
}

/// Realize a raw assembly against an already-resolved, ordered reference environment.
///
/// Never fails: provider gaps surface later, as typed error symbols during lazy type
/// resolution, not as construction errors.
pub(crate) fn build(source: Arc<RawAssembly>, references: Vec<AssemblySymbol>) -> SymbolGraphRc {
    Arc::new_cyclic(|weak| {
        let global_namespace = Arc::new(NamespaceSymbol::root());
        let visible = SkipMap::new();
        let hidden = DashMap::new();
        let mut defines_system_object = false;

        for raw in &source.types {
            let ty = build_type(raw, weak, None);
            if ty.is_embedded() {
                hidden.insert(ty.qualified_metadata_name(), ty);
            } else {
                if ty.special() == Some(SpecialType::Object) {
                    defines_system_object = true;
                }
                insert_into_namespace(&global_namespace, &ty);
                visible.insert(ty.qualified_metadata_name(), ty);
            }
        }

        let has_local_types = has_local_types(&source);
        SymbolGraph {
            source: source.clone(),
            references,
            global_namespace,
            visible,
            hidden,
            canonicals: DashMap::new(),
            defines_system_object,
            has_local_types,
            embedding_env: OnceLock::new(),
        }
    })
}

fn insert_into_namespace(global: &Arc<NamespaceSymbol>, ty: &TypeDefRc) {
    let mut current = global.clone();
    if !ty.namespace().is_empty() {
        for segment in ty.namespace().split('.') {
            current = current.ensure_namespace(segment);
        }
    }
    current.add_type(ty.clone());
}

fn type_kind(kind: RawTypeKind) -> TypeKind {
    match kind {
        RawTypeKind::Class => TypeKind::Class,
        RawTypeKind::Interface => TypeKind::Interface,
        RawTypeKind::Struct => TypeKind::Struct,
        RawTypeKind::Enum => TypeKind::Enum,
        RawTypeKind::Delegate => TypeKind::Delegate,
    }
}

fn build_type(
    raw: &RawType,
    owner: &Weak<SymbolGraph>,
    containing: Option<&TypeDefRc>,
) -> TypeDefRc {
    // Special-type tags only apply to non-nested, non-generic System definitions.
    let special = if containing.is_none() && raw.arity == 0 {
        SpecialType::from_name(&raw.namespace, &raw.name)
    } else {
        None
    };

    let ty = Arc::new(TypeDefSymbol {
        name: raw.name.clone(),
        namespace: raw.namespace.clone(),
        arity: raw.arity,
        kind: type_kind(raw.kind),
        accessibility: raw.accessibility,
        flags: raw.flags,
        guid: raw.guid,
        type_identifier: raw.type_identifier.clone(),
        special,
        base_ref: raw.base.clone(),
        enum_underlying_kind: raw.enum_underlying,
        interface_refs: raw.interfaces.clone(),
        attribute_raws: raw.attributes.clone(),
        owner: owner.clone(),
        containing: containing.map(Arc::downgrade),
        type_params: boxcar::Vec::new(),
        nested: boxcar::Vec::new(),
        fields: boxcar::Vec::new(),
        methods: boxcar::Vec::new(),
        properties: boxcar::Vec::new(),
        events: boxcar::Vec::new(),
        base: OnceLock::new(),
        interfaces: OnceLock::new(),
        enum_underlying: OnceLock::new(),
        attributes: OnceLock::new(),
    });

    for (ordinal, param) in raw.generic_params.iter().enumerate() {
        ty.type_params.push(Arc::new(TypeParameterSymbol {
            name: param.name.clone(),
            ordinal: ordinal as u16,
            from_method: false,
            constraint_refs: param.constraints.clone(),
            owner: owner.clone(),
            containing: Some(Arc::downgrade(&ty)),
            constraints: OnceLock::new(),
        }));
    }

    for field in &raw.fields {
        ty.fields.push(Arc::new(FieldDefSymbol {
            name: field.name.clone(),
            accessibility: field.accessibility,
            flags: field.flags,
            ty_ref: field.ty.clone(),
            modifier_raws: field.modifiers.clone(),
            attribute_raws: field.attributes.clone(),
            owner: owner.clone(),
            containing: Arc::downgrade(&ty),
            ty: OnceLock::new(),
            modifiers: OnceLock::new(),
            attributes: OnceLock::new(),
        }));
    }

    for method in &raw.methods {
        let method_symbol = Arc::new(MethodDefSymbol {
            name: method.name.clone(),
            accessibility: method.accessibility,
            flags: method.flags,
            return_ref: method.return_type.clone(),
            param_raws: method.params.clone(),
            explicit_impl_raws: method.explicit_impls.clone(),
            attribute_raws: method.attributes.clone(),
            type_params: method
                .generic_params
                .iter()
                .enumerate()
                .map(|(ordinal, param)| {
                    Arc::new(TypeParameterSymbol {
                        name: param.name.clone(),
                        ordinal: ordinal as u16,
                        from_method: true,
                        constraint_refs: param.constraints.clone(),
                        owner: owner.clone(),
                        containing: Some(Arc::downgrade(&ty)),
                        constraints: OnceLock::new(),
                    })
                })
                .collect(),
            owner: owner.clone(),
            containing: Arc::downgrade(&ty),
            return_type: OnceLock::new(),
            params: OnceLock::new(),
            explicit_impls: OnceLock::new(),
            attributes: OnceLock::new(),
        });
        ty.methods.push(method_symbol);
    }

    for property in &raw.properties {
        ty.properties.push(Arc::new(PropertyDefSymbol {
            name: property.name.clone(),
            ty_ref: property.ty.clone(),
            getter: property.getter.clone(),
            setter: property.setter.clone(),
            attribute_raws: property.attributes.clone(),
            owner: owner.clone(),
            containing: Arc::downgrade(&ty),
            ty: OnceLock::new(),
            attributes: OnceLock::new(),
        }));
    }

    for event in &raw.events {
        ty.events.push(Arc::new(EventDefSymbol {
            name: event.name.clone(),
            ty_ref: event.ty.clone(),
            attribute_raws: event.attributes.clone(),
            owner: owner.clone(),
            containing: Arc::downgrade(&ty),
            ty: OnceLock::new(),
            attributes: OnceLock::new(),
        }));
    }

    for nested in &raw.nested {
        ty.nested.push(build_type(nested, owner, Some(&ty)));
    }

    ty
}
