//! The generic, as-written form of a policy document.
//!
//! A [`ModelDocument`] keeps the elements of a document in document order and performs no
//! validation beyond what the reader enforces while streaming. Duplicate keys survive here and
//! are rejected when the document is copied into a [`crate::policy::PolicyModel`] with
//! [`crate::policy::PolicyModel::load_from`].

use std::path::Path;

use crate::{
    policy::{
        reader::{ModelBuilder, ModelReader},
        IncludeStatus, MemberKind, SecurityTransparencyStatus, VisibilityOverride,
    },
    Result,
};

/// A `<Member>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMember {
    /// `MemberType`
    pub kind: MemberKind,
    /// `Name`
    pub name: String,
    /// `ReturnType`
    pub return_type: Option<String>,
    /// `Status`, after inheritance from the enclosing type
    pub status: IncludeStatus,
    /// `VO`
    pub visibility: VisibilityOverride,
    /// `SecurityTransparencyStatus`
    pub security: SecurityTransparencyStatus,
}

impl DocumentMember {
    /// A member without return type or overrides
    pub fn new(kind: MemberKind, name: impl Into<String>, status: IncludeStatus) -> Self {
        DocumentMember {
            kind,
            name: name.into(),
            return_type: None,
            status,
            visibility: VisibilityOverride::None,
            security: SecurityTransparencyStatus::Undefined,
        }
    }
}

/// A `<Type>` element and its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentType {
    /// `Name`
    pub name: String,
    /// `Status`, after inheritance from the assembly
    pub status: IncludeStatus,
    /// `VO`
    pub visibility: VisibilityOverride,
    /// `SecurityTransparencyStatus`
    pub security: SecurityTransparencyStatus,
    /// Nested `<Member>` elements
    pub members: Vec<DocumentMember>,
}

impl DocumentType {
    /// A transparent type without members
    pub fn new(name: impl Into<String>, status: IncludeStatus) -> Self {
        DocumentType {
            name: name.into(),
            status,
            visibility: VisibilityOverride::None,
            security: SecurityTransparencyStatus::Transparent,
            members: Vec::new(),
        }
    }
}

/// A `<TypeForwarder>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTypeForwarder {
    /// `AssemblyName`
    pub assembly_name: String,
    /// `TypeName`
    pub type_name: String,
    /// `Status`, after inheritance from the assembly
    pub status: IncludeStatus,
}

impl DocumentTypeForwarder {
    /// A forwarder element
    pub fn new(
        assembly_name: impl Into<String>,
        type_name: impl Into<String>,
        status: IncludeStatus,
    ) -> Self {
        DocumentTypeForwarder {
            assembly_name: assembly_name.into(),
            type_name: type_name.into(),
            status,
        }
    }
}

/// An `<Assembly>` element and everything below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentAssembly {
    /// `Name`
    pub name: String,
    /// `Status`
    pub status: IncludeStatus,
    /// Nested `<Type>` elements
    pub types: Vec<DocumentType>,
    /// Nested `<TypeForwarder>` elements
    pub type_forwarders: Vec<DocumentTypeForwarder>,
}

/// A parsed policy document.
///
/// # Examples
///
/// ```rust
/// use dottrim::policy::{ModelDocument, PolicyModel};
///
/// let document = ModelDocument::from_xml(
///     r#"<ThinModel>
///          <Assembly Name="A" Status="ImplRoot">
///            <Type Name="A.Foo"/>
///          </Assembly>
///        </ThinModel>"#,
/// )?;
/// assert_eq!(document.assemblies[0].types[0].name, "A.Foo");
///
/// let mut policy = PolicyModel::new();
/// policy.load_from(&document)?;
/// # Ok::<(), dottrim::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelDocument {
    /// `<Assembly>` elements in document order
    pub assemblies: Vec<DocumentAssembly>,
}

impl ModelDocument {
    /// Read a policy document from a string, without build filtering.
    ///
    /// # Errors
    /// Returns [`crate::Error::PolicyParse`] or an XML error if the document is malformed.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut document = ModelDocument::default();
        ModelReader::new().read(xml, &mut document)?;
        Ok(document)
    }

    /// Read a policy document from a file, without build filtering.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read, and the errors of
    /// [`ModelDocument::from_xml`] otherwise.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut document = ModelDocument::default();
        ModelReader::new().read_file(path, &mut document)?;
        Ok(document)
    }

    fn assembly_mut(&mut self, name: &str) -> Result<&mut DocumentAssembly> {
        self.assemblies
            .iter_mut()
            .rev()
            .find(|assembly| assembly.name == name)
            .ok_or_else(|| malformed_error!("Assembly \"{}\" has not been created", name))
    }
}

impl ModelBuilder for ModelDocument {
    fn create_assembly(&mut self, name: &str, status: IncludeStatus) -> Result<()> {
        self.assemblies.push(DocumentAssembly {
            name: name.to_string(),
            status,
            types: Vec::new(),
            type_forwarders: Vec::new(),
        });
        Ok(())
    }

    fn create_type(&mut self, assembly: &str, node: DocumentType) -> Result<()> {
        self.assembly_mut(assembly)?.types.push(node);
        Ok(())
    }

    fn create_type_forwarder(&mut self, assembly: &str, node: DocumentTypeForwarder) -> Result<()> {
        self.assembly_mut(assembly)?.type_forwarders.push(node);
        Ok(())
    }

    fn create_member(&mut self, assembly: &str, type_name: &str, node: DocumentMember) -> Result<()> {
        self.assembly_mut(assembly)?
            .types
            .iter_mut()
            .rev()
            .find(|document_type| document_type.name == type_name)
            .ok_or_else(|| malformed_error!("Type \"{}\" has not been created", type_name))?
            .members
            .push(node);
        Ok(())
    }
}
