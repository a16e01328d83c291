//! Metadata-facing types: assembly identity, interop markers and raw descriptors.
//!
//! Everything in this module is *input* to the resolution engine. The identity types key the
//! graph cache and reference matching, the marker types carry embedded interop identity, and
//! the provider module defines the raw descriptor model an external metadata reader (or a
//! test fixture) supplies per assembly.

/// Assembly identity and strong-name handling.
pub mod identity;
/// Embedded interop type identity markers.
pub mod marker;
/// Raw metadata descriptors and fixture builders.
pub mod provider;
