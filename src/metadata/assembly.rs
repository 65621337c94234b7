//! Assemblies, modules and assembly identities.
//!
//! An [`Assembly`] is the unit the trim engine processes: its identity, the identities of the
//! assemblies it references, and its manifest [`Module`] holding types, exported types and
//! resources.

use std::fmt::{self, Write};

use crate::{
    metadata::{
        customattributes::CustomAttribute,
        security::SecurityDeclaration,
        signatures::{qualified_name, TypeRef},
        typedef::TypeDef,
    },
    Result,
};

/// Four-part version numbering for .NET assemblies.
///
/// Versions are compared component-wise in order: major, minor, build, revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
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
    /// Create a version from its four components
    #[must_use]
    pub fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        AssemblyVersion {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parse a dotted version string. Missing trailing components default to zero.
    ///
    /// # Errors
    /// Returns an error if the version string has an invalid format.
    pub fn parse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.split('.').collect();

        if parts.is_empty() || parts.len() > 4 {
            return Err(malformed_error!("Invalid version format: {}", version_str));
        }

        let mut components = [0u16; 4];

        for (i, part) in parts.iter().enumerate() {
            components[i] = part
                .parse::<u16>()
                .map_err(|_| malformed_error!("Invalid version component: {}", part))?;
        }

        Ok(Self::new(
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

/// Identity of an assembly: simple name, version, culture and public key token.
///
/// Two identities are equal when all four components match. References are retargeted by
/// identity, see [`crate::trim::Trimmer::update_assembly_references`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssemblyIdentity {
    /// Simple assembly name (e.g., "mscorlib", "System.Core").
    pub name: String,
    /// Four-part version number for compatibility and binding.
    pub version: AssemblyVersion,
    /// Culture for satellite assemblies; `None` for culture-neutral assemblies.
    pub culture: Option<String>,
    /// The 8-byte public key token of strong-named assemblies.
    pub public_key_token: Option<[u8; 8]>,
}

impl AssemblyIdentity {
    /// A culture-neutral identity without strong name
    pub fn new(name: impl Into<String>, version: AssemblyVersion) -> Self {
        AssemblyIdentity {
            name: name.into(),
            version,
            culture: None,
            public_key_token: None,
        }
    }

    /// Parse an assembly display name.
    ///
    /// ```text
    /// AssemblyName[, Version=Major.Minor.Build.Revision][, Culture=culture][, PublicKeyToken=token]
    /// ```
    ///
    /// Unknown components are ignored.
    ///
    /// ```rust
    /// use dottrim::metadata::AssemblyIdentity;
    ///
    /// let mscorlib = AssemblyIdentity::parse(
    ///     "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
    /// )?;
    /// assert_eq!(mscorlib.name, "mscorlib");
    /// assert!(mscorlib.culture.is_none());
    /// # Ok::<(), dottrim::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns an error if the display name cannot be parsed.
    pub fn parse(display_name: &str) -> Result<Self> {
        let mut parts = display_name.split(',').map(str::trim);

        let name = match parts.next() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(malformed_error!("Assembly name cannot be empty")),
        };

        let mut identity = AssemblyIdentity::new(name, AssemblyVersion::default());
        for part in parts {
            if let Some(value) = part.strip_prefix("Version=") {
                identity.version = AssemblyVersion::parse(value)?;
            } else if let Some(value) = part.strip_prefix("Culture=") {
                if value != "neutral" {
                    identity.culture = Some(value.to_string());
                }
            } else if let Some(value) = part.strip_prefix("PublicKeyToken=") {
                if value != "null" && !value.is_empty() {
                    identity.public_key_token = Some(parse_token(value)?);
                }
            }
        }

        Ok(identity)
    }

    /// Display name containing all identity components.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut result = String::with_capacity(self.name.len() + 80);

        result.push_str(&self.name);
        let _ = write!(result, ", Version={}", self.version);
        let _ = write!(
            result,
            ", Culture={}",
            self.culture.as_deref().unwrap_or("neutral")
        );

        result.push_str(", PublicKeyToken=");
        match &self.public_key_token {
            Some(token) => {
                for byte in token {
                    let _ = write!(result, "{:02x}", byte);
                }
            }
            None => result.push_str("null"),
        }

        result
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

fn parse_token(value: &str) -> Result<[u8; 8]> {
    if value.len() != 16 || !value.is_ascii() {
        return Err(malformed_error!(
            "PublicKeyToken must be exactly 8 bytes (16 hex characters), got '{}'",
            value
        ));
    }

    let mut token = [0u8; 8];
    for (i, byte) in token.iter_mut().enumerate() {
        let digits = &value[i * 2..i * 2 + 2];
        *byte = u8::from_str_radix(digits, 16)
            .map_err(|e| malformed_error!("Invalid hex in PublicKeyToken '{}': {}", value, e))?;
    }

    Ok(token)
}

/// An exported type: a type that is declared in another module or, when `forwarded_to` is set,
/// forwarded to another assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedType {
    /// Namespace of the exported type
    pub namespace: String,
    /// Name of the exported type
    pub name: String,
    /// Simple name of the assembly the type is forwarded to
    pub forwarded_to: Option<String>,
    /// Exported nested types
    pub nested: Vec<ExportedType>,
}

impl ExportedType {
    /// A forwarder for `namespace.name` to `assembly`
    pub fn forwarder(
        namespace: impl Into<String>,
        name: impl Into<String>,
        assembly: impl Into<String>,
    ) -> Self {
        ExportedType {
            namespace: namespace.into(),
            name: name.into(),
            forwarded_to: Some(assembly.into()),
            nested: Vec::new(),
        }
    }

    /// Fully qualified name of the exported type
    #[must_use]
    pub fn full_name(&self) -> String {
        qualified_name(&self.namespace, &self.name)
    }
}

/// A manifest resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestResource {
    /// Resource name
    pub name: String,
    /// Visible outside the assembly
    pub public: bool,
    /// Embedded data
    pub data: Vec<u8>,
}

/// The manifest module of an assembly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    /// Module file name
    pub name: String,
    /// Namespace-level types, including `<Module>`
    pub types: Vec<TypeDef>,
    /// Qualified names of every type in the module, nested types included.
    ///
    /// Writers rely on this list; it is not recomputed after structural edits.
    pub all_types: Vec<String>,
    /// Exported and forwarded types
    pub exported_types: Vec<ExportedType>,
    /// Manifest resources
    pub resources: Vec<ManifestResource>,
    /// Referenced native modules
    pub module_refs: Vec<String>,
    /// User string heap contents
    pub user_strings: Vec<String>,
}

impl Module {
    /// Recompute [`Module::all_types`] from the type forest, parents before their nested types.
    pub fn refresh_all_types(&mut self) {
        fn walk(type_def: &TypeDef, enclosing: Option<&str>, out: &mut Vec<String>) {
            let name = type_def.qualified_name(enclosing);
            out.push(name.clone());
            for nested in &type_def.nested_types {
                walk(nested, Some(&name), out);
            }
        }

        let mut all_types = Vec::new();
        for type_def in &self.types {
            walk(type_def, None, &mut all_types);
        }
        self.all_types = all_types;
    }

    /// Find the definition of `type_ref` in this module, ignoring its assembly name.
    #[must_use]
    pub fn find_type(&self, type_ref: &TypeRef) -> Option<&TypeDef> {
        match &type_ref.enclosing {
            Some(enclosing) => self
                .find_type(enclosing)?
                .nested_types
                .iter()
                .find(|nested| nested.name == type_ref.name),
            None => self
                .types
                .iter()
                .find(|t| t.namespace == type_ref.namespace && t.name == type_ref.name),
        }
    }
}

/// A loaded assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    /// The assembly's identity
    pub identity: AssemblyIdentity,
    /// Referenced assemblies
    pub references: Vec<AssemblyIdentity>,
    /// The manifest module
    pub module: Module,
    /// Assembly-level custom attributes
    pub custom_attributes: Vec<CustomAttribute>,
    /// Assembly-level declarative security
    pub security: Vec<SecurityDeclaration>,
}

impl Assembly {
    /// An empty assembly with a manifest module named `<name>.dll`
    #[must_use]
    pub fn new(identity: AssemblyIdentity) -> Self {
        let module = Module {
            name: format!("{}.dll", identity.name),
            ..Module::default()
        };

        Assembly {
            identity,
            references: Vec::new(),
            module,
            custom_attributes: Vec::new(),
            security: Vec::new(),
        }
    }

    /// Simple name of the assembly
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }
}
