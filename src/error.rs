use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Resolution itself never fails through this type: unresolvable types, missing canonical
/// definitions and ambiguous matches are all materialized as typed error *symbols* inside the
/// graph (see [`crate::symbols::ErrorType`]) so that consumers can keep walking the symbol tree
/// and accumulate diagnostics. `Error` covers the remaining fallible surface: malformed
/// identity strings and invalid session inputs.
///
/// # Examples
///
/// ```rust
/// use symres::{metadata::identity::AssemblyIdentity, Error};
///
/// match AssemblyIdentity::parse("mscorlib, Version=not.a.version") {
///     Ok(identity) => println!("parsed {}", identity),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("malformed identity: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input is damaged and could not be parsed.
    ///
    /// Raised for assembly display names and version strings that do not conform to the
    /// .NET identity format. The error includes the source location where the malformation
    /// was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Provided input was empty.
    ///
    /// This error occurs when a resolution session is started without any references.
    #[error("Provided input was empty")]
    Empty,

    /// Two session inputs carry the same assembly identity.
    ///
    /// A resolution session binds references by identity, so two inputs with equal
    /// identities would shadow each other. The associated value is the duplicated
    /// display name.
    #[error("Duplicate assembly in reference set - {0}")]
    DuplicateAssembly(String),
}
