//! Assembly identity for cross-assembly symbol resolution.
//!
//! This module provides [`AssemblyIdentity`] and the supporting version and strong-name types
//! used to identify .NET assemblies according to ECMA-335. Identity is the primary key of the
//! whole resolution engine: symbol graphs are built and cached per identity plus reference
//! set, and references between assemblies are matched by identity compatibility.
//!
//! # Key Types
//! - [`AssemblyIdentity`] - Complete assembly identification with name, version, culture,
//!   strong name and the retargetable flag
//! - [`AssemblyVersion`] - Four-part version numbering (major.minor.build.revision)
//! - [`StrongName`] - Either a full public key or an 8-byte token, with MD5/SHA1 token
//!   derivation as specified by the ECMA-335 standard
//!
//! # Identity Equality
//!
//! Unlike loose runtime binding, this engine compares identities on *all* fields: name,
//! version, culture, strong name (by derived token) and the retargetable flag. Two
//! identities that differ in any component are distinct keys. Reference *matching* is the
//! looser operation: [`AssemblyIdentity::is_compatible_with`] ignores the version when either
//! side is marked retargetable, so a reference compiled against one build can still bind to
//! another - while the graphs built for the two builds never alias.
//!
//! # Example
//! ```rust
//! use symres::metadata::identity::AssemblyIdentity;
//!
//! let id = AssemblyIdentity::parse(
//!     "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
//! )?;
//! assert_eq!(id.name, "mscorlib");
//! assert_eq!(id.version.major, 4);
//! # Ok::<(), symres::Error>(())
//! ```

use std::fmt;

use md5::{Digest, Md5};
use sha1::Sha1;

use crate::Result;

/// Hash algorithm used to derive a strong-name token from a full public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// MD5 as permitted by legacy metadata.
    Md5,
    /// SHA1, the default for strong-name tokens.
    Sha1,
}

/// Cryptographic strong-name identity of an assembly.
///
/// Can be either the full RSA public key or the 8-byte token derived from it. Two strong
/// names are considered equal when their derived tokens are equal, so an identity carrying a
/// full key compares equal to one carrying only the token of that key.
#[derive(Debug, Clone)]
pub enum StrongName {
    /// The full RSA public key.
    PubKey(Vec<u8>),
    /// The 8-byte tail of the hash of the public key.
    Token([u8; 8]),
}

impl StrongName {
    /// Derive the 8-byte token using the given hash algorithm.
    ///
    /// The token is the last 8 bytes of the hash of the public key. For a [`StrongName::Token`]
    /// the stored bytes are returned unchanged regardless of the algorithm.
    #[must_use]
    pub fn token_with(&self, algo: HashAlgorithm) -> [u8; 8] {
        match self {
            StrongName::PubKey(data) => {
                let digest: Vec<u8> = match algo {
                    HashAlgorithm::Md5 => {
                        let mut hasher = Md5::new();
                        hasher.update(data);
                        hasher.finalize().to_vec()
                    }
                    HashAlgorithm::Sha1 => {
                        let mut hasher = Sha1::new();
                        hasher.update(data);
                        hasher.finalize().to_vec()
                    }
                };

                let mut token = [0u8; 8];
                token.copy_from_slice(&digest[digest.len() - 8..]);
                token
            }
            StrongName::Token(token) => *token,
        }
    }

    /// Derive the 8-byte token with the default SHA1 algorithm.
    #[must_use]
    pub fn token(&self) -> [u8; 8] {
        self.token_with(HashAlgorithm::Sha1)
    }
}

impl PartialEq for StrongName {
    fn eq(&self, other: &Self) -> bool {
        self.token() == other.token()
    }
}

impl Eq for StrongName {}

/// Four-part version numbering for .NET assemblies.
///
/// Versions are compared component-wise in order: major, minor, build, revision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssemblyVersion {
    /// Major version component.
    pub major: u16,
    /// Minor version component.
    pub minor: u16,
    /// Build version component.
    pub build: u16,
    /// Revision version component.
    pub revision: u16,
}

impl AssemblyVersion {
    /// Create a version from its four components.
    #[must_use]
    pub fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        AssemblyVersion {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parse a `major.minor.build.revision` string; missing trailing components default to 0.
    ///
    /// # Errors
    /// Returns an error if a component is not a 16-bit decimal number or more than four
    /// components are present.
    pub fn parse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.split('.').collect();
        if parts.is_empty() || parts.len() > 4 {
            return Err(malformed_error!("Invalid version string '{}'", version_str));
        }

        let mut components = [0u16; 4];
        for (i, part) in parts.iter().enumerate() {
            components[i] = part.parse::<u16>().map_err(|_| {
                malformed_error!("Invalid version component '{}' in '{}'", part, version_str)
            })?;
        }

        Ok(AssemblyVersion::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// Complete identity information for a .NET assembly.
///
/// # Identity Components
///
/// - **Name**: simple assembly name used for basic identification
/// - **Version**: four-part version for binding and compatibility decisions
/// - **Culture**: localization culture (`None` for culture-neutral assemblies)
/// - **Strong name**: cryptographic identity, compared by derived token
/// - **Retargetable**: whether references to this assembly may bind across versions
///
/// Two `AssemblyIdentity` instances are equal if and only if all five components are equal.
/// Version-tolerant matching for reference binding goes through [`Self::is_compatible_with`]
/// instead of `==`.
#[derive(Debug, Clone)]
pub struct AssemblyIdentity {
    /// Simple assembly name (e.g. "mscorlib", "Pia1").
    pub name: String,
    /// Four-part version number.
    pub version: AssemblyVersion,
    /// Culture for localized assemblies, `None` when culture-neutral.
    pub culture: Option<String>,
    /// Strong-name identity, `None` for simply named assemblies.
    pub strong_name: Option<StrongName>,
    /// Whether references to this assembly are version-retargetable.
    pub retargetable: bool,
}

impl AssemblyIdentity {
    /// Create a culture-neutral, simply named identity.
    #[must_use]
    pub fn new(name: &str, version: AssemblyVersion) -> Self {
        AssemblyIdentity {
            name: name.to_string(),
            version,
            culture: None,
            strong_name: None,
            retargetable: false,
        }
    }

    /// Set the culture component.
    #[must_use]
    pub fn with_culture(mut self, culture: &str) -> Self {
        self.culture = Some(culture.to_string());
        self
    }

    /// Set the strong-name component.
    #[must_use]
    pub fn with_strong_name(mut self, strong_name: StrongName) -> Self {
        self.strong_name = Some(strong_name);
        self
    }

    /// Mark the identity as retargetable.
    #[must_use]
    pub fn retargetable(mut self) -> Self {
        self.retargetable = true;
        self
    }

    /// Parse an assembly display name.
    ///
    /// Accepts the standard .NET format: `Name, Version=1.2.3.4, Culture=neutral,
    /// PublicKeyToken=b77a5c561934e089, Retargetable=Yes`. All components after the name are
    /// optional; `Culture=neutral` and `PublicKeyToken=null` are treated as absent.
    ///
    /// # Errors
    /// Returns an error for an empty name, an invalid version string, or a public key token
    /// that is not exactly 16 hex characters.
    pub fn parse(display_name: &str) -> Result<Self> {
        let mut version = AssemblyVersion::default();
        let mut culture = None;
        let mut strong_name = None;
        let mut retargetable = false;

        let parts: Vec<&str> = display_name.split(',').map(str::trim).collect();

        let name = parts[0].to_string();
        if name.is_empty() {
            return Err(malformed_error!("Assembly name cannot be empty"));
        }

        for part in parts.iter().skip(1) {
            if let Some(value) = part.strip_prefix("Version=") {
                version = AssemblyVersion::parse(value)?;
            } else if let Some(value) = part.strip_prefix("Culture=") {
                if value != "neutral" {
                    culture = Some(value.to_string());
                }
            } else if let Some(value) = part.strip_prefix("PublicKeyToken=") {
                if value != "null" && !value.is_empty() {
                    strong_name = Some(StrongName::Token(parse_token(value)?));
                }
            } else if let Some(value) = part.strip_prefix("Retargetable=") {
                retargetable = value.eq_ignore_ascii_case("yes");
            }
        }

        Ok(AssemblyIdentity {
            name,
            version,
            culture,
            strong_name,
            retargetable,
        })
    }

    /// Generate the .NET-compatible display name string for this identity.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut result = format!("{}, Version={}", self.name, self.version);

        result.push_str(", Culture=");
        match &self.culture {
            Some(culture) => result.push_str(culture),
            None => result.push_str("neutral"),
        }

        result.push_str(", PublicKeyToken=");
        match &self.strong_name {
            Some(strong_name) => {
                for byte in strong_name.token() {
                    result.push_str(&format!("{byte:02x}"));
                }
            }
            None => result.push_str("null"),
        }

        if self.retargetable {
            result.push_str(", Retargetable=Yes");
        }

        result
    }

    /// Whether a reference requesting `requested` can bind to this assembly.
    ///
    /// Name, culture and strong name must match exactly. The version must match unless
    /// either side carries the retargetable flag, in which case any version is accepted.
    /// Compatibility is a binding decision only - two compatible but different builds still
    /// produce distinct symbol graphs.
    #[must_use]
    pub fn is_compatible_with(&self, requested: &AssemblyIdentity) -> bool {
        if self.name != requested.name || self.culture != requested.culture {
            return false;
        }

        // A requested token must be satisfied; an unsigned request binds to anything.
        if let Some(requested_name) = &requested.strong_name {
            match &self.strong_name {
                Some(own) => {
                    if own != requested_name {
                        return false;
                    }
                }
                None => return false,
            }
        }

        self.version == requested.version || self.retargetable || requested.retargetable
    }
}

impl PartialEq for AssemblyIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.version == other.version
            && self.culture == other.culture
            && self.strong_name == other.strong_name
            && self.retargetable == other.retargetable
    }
}

impl Eq for AssemblyIdentity {}

impl std::hash::Hash for AssemblyIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
        self.culture.hash(state);
        if let Some(strong_name) = &self.strong_name {
            strong_name.token().hash(state);
        }
        self.retargetable.hash(state);
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Decode a 16-hex-character public key token.
fn parse_token(value: &str) -> Result<[u8; 8]> {
    if value.len() != 16 {
        return Err(malformed_error!(
            "PublicKeyToken must be exactly 8 bytes (16 hex characters), got '{}'",
            value
        ));
    }

    let mut token = [0u8; 8];
    for (i, chunk) in value.as_bytes().chunks(2).enumerate() {
        let pair = std::str::from_utf8(chunk)
            .map_err(|_| malformed_error!("Invalid hex in PublicKeyToken '{}'", value))?;
        token[i] = u8::from_str_radix(pair, 16)
            .map_err(|_| malformed_error!("Invalid hex in PublicKeyToken '{}'", value))?;
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_name() {
        let identity = AssemblyIdentity::parse("MDTestLib1").unwrap();
        assert_eq!(identity.name, "MDTestLib1");
        assert_eq!(identity.version, AssemblyVersion::default());
        assert!(identity.culture.is_none());
        assert!(identity.strong_name.is_none());
        assert!(!identity.retargetable);
    }

    #[test]
    fn test_parse_full_display_name() {
        let identity = AssemblyIdentity::parse(
            "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
        )
        .unwrap();
        assert_eq!(identity.name, "mscorlib");
        assert_eq!(identity.version, AssemblyVersion::new(4, 0, 0, 0));
        assert!(identity.culture.is_none());
        assert_eq!(
            identity.strong_name,
            Some(StrongName::Token([0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89]))
        );
    }

    #[test]
    fn test_parse_retargetable() {
        let identity =
            AssemblyIdentity::parse("Pia1, Version=1.0.0.0, Retargetable=Yes").unwrap();
        assert!(identity.retargetable);
    }

    #[test]
    fn test_display_name_round_trip() {
        let original = AssemblyIdentity::parse(
            "System.Core, Version=3.5.0.0, Culture=en-US, PublicKeyToken=b77a5c561934e089",
        )
        .unwrap();
        let reparsed = AssemblyIdentity::parse(&original.display_name()).unwrap();
        assert_eq!(original, reparsed);
    }

    #[test]
    fn test_parse_invalid_version_component() {
        assert!(AssemblyIdentity::parse("Lib, Version=1.x.0.0").is_err());
    }

    #[test]
    fn test_parse_invalid_token_length() {
        assert!(AssemblyIdentity::parse("Lib, PublicKeyToken=b77a").is_err());
    }

    #[test]
    fn test_equality_considers_version() {
        let v1 = AssemblyIdentity::new("Lib", AssemblyVersion::new(1, 0, 0, 0));
        let v2 = AssemblyIdentity::new("Lib", AssemblyVersion::new(2, 0, 0, 0));
        assert_ne!(v1, v2);
        assert_eq!(v1, v1.clone());
    }

    #[test]
    fn test_pubkey_and_token_compare_equal() {
        let key = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];
        let full = StrongName::PubKey(key.clone());
        let token = StrongName::Token(full.token());
        assert_eq!(full, token);
    }

    #[test]
    fn test_token_derivation_differs_by_algorithm() {
        let key = StrongName::PubKey((0..64).collect());
        assert_ne!(
            key.token_with(HashAlgorithm::Sha1),
            key.token_with(HashAlgorithm::Md5)
        );
    }

    #[test]
    fn test_compatibility_exact_version() {
        let own = AssemblyIdentity::new("Lib", AssemblyVersion::new(1, 0, 0, 0));
        let requested = AssemblyIdentity::new("Lib", AssemblyVersion::new(1, 0, 0, 0));
        assert!(own.is_compatible_with(&requested));
    }

    #[test]
    fn test_compatibility_version_mismatch() {
        let own = AssemblyIdentity::new("Lib", AssemblyVersion::new(1, 0, 0, 0));
        let requested = AssemblyIdentity::new("Lib", AssemblyVersion::new(2, 0, 0, 0));
        assert!(!own.is_compatible_with(&requested));
    }

    #[test]
    fn test_compatibility_retargetable_ignores_version() {
        let own = AssemblyIdentity::new("Lib", AssemblyVersion::new(1, 0, 0, 0));
        let requested =
            AssemblyIdentity::new("Lib", AssemblyVersion::new(2, 0, 0, 0)).retargetable();
        assert!(own.is_compatible_with(&requested));
    }

    #[test]
    fn test_compatibility_requires_matching_name() {
        let own = AssemblyIdentity::new("Lib1", AssemblyVersion::default());
        let requested = AssemblyIdentity::new("Lib2", AssemblyVersion::default());
        assert!(!own.is_compatible_with(&requested));
    }

    #[test]
    fn test_compatibility_unsigned_request_binds_to_signed() {
        let own = AssemblyIdentity::new("Lib", AssemblyVersion::default())
            .with_strong_name(StrongName::Token([1; 8]));
        let requested = AssemblyIdentity::new("Lib", AssemblyVersion::default());
        assert!(own.is_compatible_with(&requested));
        assert!(!requested.is_compatible_with(&own));
    }
}
