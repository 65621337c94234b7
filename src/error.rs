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
/// Every variant is unrecoverable for a trimming run: the batch driver logs the failing
/// assembly's key and propagates the error to the caller. No partial output is produced for the
/// assembly that failed.
///
/// # Error Categories
///
/// ## Policy Errors
/// - [`Error::PolicyParse`] - The policy document is structurally invalid
/// - [`Error::Condition`] - A `Condition` expression inside the policy document is invalid
/// - [`Error::Xml`] / [`Error::XmlAttribute`] - Low level XML failures from `quick-xml`
///
/// ## Trimming Errors
/// - [`Error::AssemblyLoad`] - The metadata host failed to load an input binary
/// - [`Error::AssemblyIdentityMismatch`] - The loaded binary is not the one the policy expects
/// - [`Error::UnsupportedMemberKind`] - A member reference that is neither a method nor a field
/// - [`Error::UnknownAssembly`] - An assembly handed to the engine that the policy does not list
///
/// ## Internal Errors
/// - [`Error::Malformed`] - An internal invariant was violated
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// # Examples
///
/// ```rust
/// use dottrim::{Error, policy::PolicyModel};
///
/// match PolicyModel::from_xml("<ThinModel><Member Name=\"x\"/></ThinModel>") {
///     Ok(_) => unreachable!(),
///     Err(Error::PolicyParse(message)) => println!("bad policy: {}", message),
///     Err(e) => println!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An internal invariant was violated.
    ///
    /// The error includes the source location where the problem was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while reading policy documents or writing
    /// trimmed binaries.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Error from the `quick-xml` reader while tokenizing a policy document.
    #[error("Xml - {0}")]
    Xml(#[from] quick_xml::Error),

    /// An attribute inside a policy document could not be parsed.
    #[error("Xml attribute - {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// The policy document is malformed.
    ///
    /// Raised for unknown elements, missing required attributes, unparsable status values,
    /// members whose status resolves to `Inherit`, and duplicate keys.
    #[error("Policy parse error - {0}")]
    PolicyParse(String),

    /// A build `Condition` expression could not be evaluated.
    #[error("{message}: '{expression}'")]
    Condition {
        /// The full condition text being evaluated
        expression: String,
        /// A short description of the problem
        message: String,
    },

    /// The metadata host could not load an input binary.
    #[error("Failed to load assembly '{assembly}' - {message}")]
    AssemblyLoad {
        /// The policy key of the assembly that failed to load
        assembly: String,
        /// The reason reported by the host
        message: String,
    },

    /// The loaded binary does not carry the assembly name the policy expects.
    #[error("Assembly name mismatch - expected '{expected}', loaded '{actual}'")]
    AssemblyIdentityMismatch {
        /// The name under which the policy model lists the assembly
        expected: String,
        /// The name found in the loaded binary
        actual: String,
    },

    /// A member reference whose signature describes neither a method nor a field.
    #[error("Unsupported member kind - {0}")]
    UnsupportedMemberKind(String),

    /// The assembly being rewritten is not listed in the policy model.
    #[error("Assembly '{0}' is not part of the policy")]
    UnknownAssembly(String),
}
