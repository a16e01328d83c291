//! # symres
//!
//! A framework for cross-assembly symbol retargeting and embedded interop ("no-PIA") type
//! unification over .NET metadata. `symres` answers one question for a compiler front end:
//! given a set of assembly references that may contain different builds of the same logical
//! assembly and multiple locally embedded copies of the same COM interop type, *which
//! symbol is which type*?
//!
//! ## Architecture
//!
//! - **[`metadata`]** - inputs: assembly identity ([`metadata::identity`]), embedded
//!   interop markers ([`metadata::marker`]) and the raw descriptor model an external
//!   metadata provider supplies per assembly ([`metadata::provider`]). No PE parsing
//!   happens here; descriptors arrive already decoded.
//! - **[`graph`]** - one immutable [`graph::SymbolGraph`] per (assembly, ordered reference
//!   set), interned in a process-wide weak cache: object-identical inputs always yield the
//!   same graph instance, any difference in the reference list yields a distinct one.
//! - **[`symbols`]** - the symbol model. Structural data is eager; every type-valued
//!   property resolves lazily against the owning reference environment and memoizes.
//!   Unresolvable references become typed error symbols ([`symbols::ErrorType`]), never
//!   exceptions, so graph walks keep going and diagnostics accumulate.
//! - **[`retarget`]** - wrappers presenting one assembly's symbols through another
//!   assembly's reference set: names and shapes pass through, types re-resolve, wrappers
//!   intern per (underlying symbol, retargeting assembly).
//! - **[`resolve`]** - sessions binding an ordered reference list to assembly symbols,
//!   including the canonical resolution engine that unifies embedded interop types against
//!   their Primary Interop Assembly definitions or reports
//!   missing/ambiguous/illegal-generic outcomes ([`resolve::CanonicalResolution`]).
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use symres::metadata::identity::{AssemblyIdentity, AssemblyVersion};
//! use symres::metadata::provider::{RawAssembly, RawType};
//! use symres::resolve::Resolver;
//!
//! let mscorlib = RawAssembly::build(AssemblyIdentity::new(
//!     "mscorlib",
//!     AssemblyVersion::new(4, 0, 0, 0),
//! ))
//! .ty(RawType::class("System", "Object").finish())
//! .finish();
//!
//! let resolution = Resolver::new().metadata(mscorlib).resolve()?;
//! let corlib = resolution.corlib().expect("defines System.Object");
//! assert!(corlib.lookup_top_level_type("System.Object").is_some());
//! # Ok::<(), symres::Error>(())
//! ```
//!
//! ## Identity guarantees
//!
//! Symbols are `Arc`-held and reference-comparable. Within one graph, the same type is
//! always the same object; retargeting the same symbol twice through the same retargeting
//! assembly yields reference-equal wrappers; and two resolution sessions over
//! object-identical reference lists converge on the same graph instances through the
//! process-wide cache. Any change to a reference list - an added, removed, reordered
//! reference, or a different build of a same-named assembly - produces fresh, never
//! aliased, symbol trees.
//!
//! ## Threading
//!
//! Graphs are write-once, read-many: construction happens at most once per cache key
//! (concurrent builders race, losers adopt the winner's instance), lookups after
//! construction are lock-free or read-only, and lazy fields memoize behind `OnceLock`.
//! Sessions build independent graphs in parallel.

#![warn(missing_docs)]

#[macro_use]
pub(crate) mod error;

/// Metadata-facing inputs: identity, interop markers and raw descriptors.
pub mod metadata;

/// Per-assembly symbol graphs and the process-wide identity cache.
pub mod graph;

/// The symbol model: types, members, attributes and error placeholders.
pub mod symbols;

/// Retargeting wrappers presenting symbols through another reference set.
pub mod retarget;

/// Resolution sessions and embedded interop type unification.
pub mod resolve;

/// Convenient re-exports of the most commonly used types.
pub mod prelude;

/// `symres` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. Used for the crate's fallible surface: identity parsing and session setup.
pub type Result<T> = std::result::Result<T, Error>;

/// `symres` Error type
///
/// Covers malformed identity strings and invalid session inputs. Resolution failures
/// inside a graph are represented as typed error symbols instead - see
/// [`symbols::ErrorType`].
pub use error::Error;
