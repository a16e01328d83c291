#![allow(unused)]
extern crate symres;

use criterion::{criterion_group, criterion_main, Criterion};
use std::{hint::black_box, sync::Arc};
use symres::prelude::*;

fn identity(display: &str) -> AssemblyIdentity {
    AssemblyIdentity::parse(display).unwrap()
}

fn corlib() -> Arc<RawAssembly> {
    RawAssembly::build(identity("mscorlib, Version=4.0.0.0"))
        .ty(RawType::class("System", "Object").finish())
        .ty(RawType::class("System", "ValueType")
            .base(RawTypeRef::primitive(SpecialType::Object))
            .finish())
        .finish()
}

/// A library with a spread of types and members, enough to exercise graph construction
/// and lazy signature resolution without dominating on allocation noise.
fn library(name: &str, types: usize) -> Arc<RawAssembly> {
    let mut builder = RawAssembly::build(identity(&format!("{name}, Version=1.0.0.0")))
        .reference(identity("mscorlib, Version=4.0.0.0"));
    for index in 0..types {
        builder = builder.ty(
            RawType::class(name, &format!("C{index}"))
                .base(RawTypeRef::primitive(SpecialType::Object))
                .method(
                    RawMethod::new("Run", RawTypeRef::primitive(SpecialType::Void))
                        .param("other", RawTypeRef::named(None, name, &format!("C{index}")))
                        .finish(),
                )
                .finish(),
        );
    }
    builder.finish()
}

/// Benchmark a full session over fresh descriptors (cache misses every iteration).
fn bench_resolve_fresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_fresh");
    group.bench_function("three_assemblies_64_types", |b| {
        b.iter(|| {
            let resolution = Resolver::new()
                .metadata(library("LibA", 64))
                .metadata(library("LibB", 64))
                .metadata(corlib())
                .resolve()
                .unwrap();
            black_box(resolution.assemblies().len())
        });
    });
    group.finish();
}

/// Benchmark re-resolution over object-identical inputs (cache hits every iteration).
fn bench_resolve_cached(c: &mut Criterion) {
    let lib_a = library("CachedA", 64);
    let lib_b = library("CachedB", 64);
    let core = corlib();

    let mut group = c.benchmark_group("resolve_cached");
    group.bench_function("three_assemblies_64_types", |b| {
        b.iter(|| {
            let resolution = Resolver::new()
                .metadata(lib_a.clone())
                .metadata(lib_b.clone())
                .metadata(core.clone())
                .resolve()
                .unwrap();
            black_box(resolution.assemblies().len())
        });
    });
    group.finish();
}

/// Benchmark lazy member type resolution on a shared graph.
fn bench_member_resolution(c: &mut Criterion) {
    let lib = library("Members", 256);
    let core = corlib();
    let resolution = Resolver::new()
        .metadata(lib)
        .metadata(core)
        .resolve()
        .unwrap();
    let binding = resolution.assembly("Members").unwrap().clone();

    let mut group = c.benchmark_group("member_resolution");
    group.bench_function("method_parameters_256_types", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for ty in binding.underlying_graph().top_level_types() {
                for method in ty.methods() {
                    total += method.parameters().len();
                }
            }
            black_box(total)
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_resolve_fresh,
    bench_resolve_cached,
    bench_member_resolution
);
criterion_main!(benches);
