//! Streaming reader for policy documents.
//!
//! The reader walks the XML once and reports every element it accepts to a [`ModelBuilder`].
//! It owns the concerns that are the same for every builder:
//!
//! - the element structure (`ThinModel` / `Assembly` / `Type` / `Member`, `TypeForwarder`)
//! - required attributes and the spelling of include statuses
//! - status inheritance from the enclosing element
//! - build filtering through an [`IncludePredicate`], which skips an element with its subtree
//!
//! ```xml
//! <ThinModel>
//!   <Assembly Name="System.Runtime" Status="ImplRoot">
//!     <Type Name="System.Object" Status="ApiRoot" SecurityTransparencyStatus="SafeCritical">
//!       <Member MemberType="Method" Name="#ctor" Status="ApiRoot"/>
//!       <Member Name="GetHashCode" Platform="win" Condition="FEATURE_X and not FEATURE_Y"/>
//!     </Type>
//!     <TypeForwarder AssemblyName="System.Private.CoreLib" TypeName="System.Action"/>
//!   </Assembly>
//! </ThinModel>
//! ```

use std::path::Path;

use log::debug;
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

use crate::{
    file::Physical,
    policy::{
        document::{DocumentMember, DocumentType, DocumentTypeForwarder},
        filter::{into_policy_error, IncludeAll, IncludePredicate},
        IncludeStatus, MemberKind, SecurityTransparencyStatus, VisibilityOverride,
    },
    Error, Result,
};

/// Receives the elements of a policy document in document order.
///
/// Statuses passed in have already been inherited from the enclosing element. A builder is only
/// told about an element after its parent has been created.
pub trait ModelBuilder {
    /// An `<Assembly>` element
    ///
    /// # Errors
    /// Implementations reject elements they cannot store, e.g. duplicates.
    fn create_assembly(&mut self, name: &str, status: IncludeStatus) -> Result<()>;

    /// A `<Type>` element of `assembly`
    ///
    /// # Errors
    /// Implementations reject elements they cannot store, e.g. duplicates.
    fn create_type(&mut self, assembly: &str, node: DocumentType) -> Result<()>;

    /// A `<TypeForwarder>` element of `assembly`
    ///
    /// # Errors
    /// Implementations reject elements they cannot store, e.g. duplicates.
    fn create_type_forwarder(&mut self, assembly: &str, node: DocumentTypeForwarder) -> Result<()>;

    /// A `<Member>` element of type `type_name` in `assembly`
    ///
    /// # Errors
    /// Implementations reject elements they cannot store, e.g. duplicates.
    fn create_member(&mut self, assembly: &str, type_name: &str, node: DocumentMember) -> Result<()>;
}

#[derive(Debug)]
enum Scope {
    Document,
    Model,
    Assembly {
        name: String,
        status: IncludeStatus,
    },
    Type {
        assembly: String,
        name: String,
        status: IncludeStatus,
    },
    Leaf,
    Skipped,
}

/// Attribute values of one element
struct ElementAttributes<'e> {
    element: &'e str,
    values: Vec<(String, String)>,
}

impl<'e> ElementAttributes<'e> {
    fn read(element: &'e str, start: &BytesStart<'_>) -> Result<Self> {
        let mut values = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            values.push((key, value));
        }

        Ok(ElementAttributes { element, values })
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn required(&self, name: &str) -> Result<&str> {
        self.get(name).ok_or_else(|| {
            Error::PolicyParse(format!(
                "Element <{}> is missing required attribute \"{}\"",
                self.element, name
            ))
        })
    }

    /// `Status`, falling back to the status of the enclosing element
    fn status(&self, inherited: IncludeStatus) -> Result<IncludeStatus> {
        match self.get("Status") {
            Some(value) => value
                .parse()
                .map_err(|_| Error::PolicyParse(format!("Unknown include status '{}'", value))),
            None => Ok(inherited),
        }
    }

    fn visibility(&self) -> VisibilityOverride {
        VisibilityOverride::parse(self.get("VO"))
    }

    fn security(&self, default: SecurityTransparencyStatus) -> SecurityTransparencyStatus {
        self.get("SecurityTransparencyStatus")
            .map_or(default, SecurityTransparencyStatus::parse)
    }

    fn applies<P: IncludePredicate>(&self, predicate: &P) -> Result<bool> {
        predicate
            .include(
                self.get("Platform"),
                self.get("Architecture"),
                self.get("Flavor"),
                self.get("Condition"),
            )
            .map_err(into_policy_error)
    }
}

/// Reads policy documents, filtering elements through a predicate.
///
/// # Examples
///
/// ```rust
/// use dottrim::policy::{BuildFilter, ModelReader, PolicyModel};
///
/// let xml = r#"<ThinModel>
///     <Assembly Name="A" Status="ImplRoot">
///       <Type Name="A.Everywhere"/>
///       <Type Name="A.UnixOnly" Platform="unix"/>
///     </Assembly>
///   </ThinModel>"#;
///
/// let mut policy = PolicyModel::new();
/// ModelReader::with_predicate(BuildFilter::new().platform("win")).read(xml, &mut policy)?;
///
/// let assembly = policy.get_assembly("A").unwrap();
/// assert!(assembly.get_type("A.Everywhere").is_some());
/// assert!(assembly.get_type("A.UnixOnly").is_none());
/// # Ok::<(), dottrim::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelReader<P = IncludeAll> {
    predicate: P,
}

impl ModelReader<IncludeAll> {
    /// A reader that accepts every element
    #[must_use]
    pub fn new() -> Self {
        ModelReader {
            predicate: IncludeAll,
        }
    }
}

impl<P: IncludePredicate> ModelReader<P> {
    /// A reader that skips elements `predicate` rejects
    pub fn with_predicate(predicate: P) -> Self {
        ModelReader { predicate }
    }

    /// Read the policy document at `path` into `builder`.
    ///
    /// # Errors
    /// Returns [`Error::FileError`] if the file cannot be read, and the errors of
    /// [`ModelReader::read`] otherwise.
    pub fn read_file<B: ModelBuilder>(&self, path: impl AsRef<Path>, builder: &mut B) -> Result<()> {
        let file = Physical::new(path)?;
        self.read(file.text()?, builder)
    }

    /// Read the policy document `xml` into `builder`.
    ///
    /// # Errors
    /// Returns [`Error::PolicyParse`] for unknown or misplaced elements, missing required
    /// attributes, unknown statuses, members without a status, and invalid conditions. XML
    /// syntax errors are returned as [`Error::Xml`]. Errors raised by `builder` are passed on.
    pub fn read<B: ModelBuilder>(&self, xml: &str, builder: &mut B) -> Result<()> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut scopes = vec![Scope::Document];
        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    let scope = self.open(&scopes, &start, builder)?;
                    scopes.push(scope);
                }
                Event::Empty(start) => {
                    self.open(&scopes, &start, builder)?;
                }
                Event::End(_) => {
                    if scopes.len() < 2 {
                        return Err(Error::PolicyParse("Unbalanced end tag".to_string()));
                    }
                    scopes.pop();
                }
                Event::Text(text) => {
                    return Err(Error::PolicyParse(format!(
                        "Unexpected text \"{}\" at position {}",
                        String::from_utf8_lossy(text.as_ref()),
                        reader.buffer_position()
                    )))
                }
                Event::CData(_) => {
                    return Err(Error::PolicyParse(format!(
                        "Unexpected CDATA section at position {}",
                        reader.buffer_position()
                    )))
                }
                Event::Eof => break,
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }

        if scopes.len() != 1 {
            return Err(Error::PolicyParse(
                "Unexpected end of document inside an element".to_string(),
            ));
        }

        Ok(())
    }

    /// Handle an opening tag inside `scopes` and return the scope it opens
    fn open<B: ModelBuilder>(
        &self,
        scopes: &[Scope],
        start: &BytesStart<'_>,
        builder: &mut B,
    ) -> Result<Scope> {
        let element = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let parent = scopes
            .last()
            .ok_or_else(|| malformed_error!("Reader scope stack is empty"))?;

        match (element.as_str(), parent) {
            ("xml" | "ThinModel", Scope::Document | Scope::Model) => Ok(Scope::Model),
            ("Assembly", Scope::Document | Scope::Model) => {
                let attributes = ElementAttributes::read(&element, start)?;
                let name = attributes.required("Name")?.to_string();
                let status = attributes.status(IncludeStatus::Inherit)?;

                if !attributes.applies(&self.predicate)? {
                    debug!("Skipping Assembly \"{}\" for this build", name);
                    return Ok(Scope::Skipped);
                }

                builder.create_assembly(&name, status)?;
                Ok(Scope::Assembly { name, status })
            }
            ("Type", Scope::Assembly { name: assembly, status: inherited }) => {
                let attributes = ElementAttributes::read(&element, start)?;
                let name = attributes.required("Name")?.to_string();
                let status = attributes.status(*inherited)?;

                if !attributes.applies(&self.predicate)? {
                    debug!("Skipping Type \"{}\" for this build", name);
                    return Ok(Scope::Skipped);
                }

                builder.create_type(
                    assembly,
                    DocumentType {
                        visibility: attributes.visibility(),
                        security: attributes.security(SecurityTransparencyStatus::Transparent),
                        ..DocumentType::new(&name, status)
                    },
                )?;
                Ok(Scope::Type {
                    assembly: assembly.clone(),
                    name,
                    status,
                })
            }
            ("TypeForwarder", Scope::Assembly { name: assembly, status: inherited }) => {
                let attributes = ElementAttributes::read(&element, start)?;
                let assembly_name = attributes.required("AssemblyName")?;
                let type_name = attributes.required("TypeName")?;
                let status = attributes.status(*inherited)?;

                if !attributes.applies(&self.predicate)? {
                    debug!("Skipping TypeForwarder \"{}\" for this build", type_name);
                    return Ok(Scope::Skipped);
                }

                builder.create_type_forwarder(
                    assembly,
                    DocumentTypeForwarder::new(assembly_name, type_name, status),
                )?;
                Ok(Scope::Leaf)
            }
            (
                "Member",
                Scope::Type {
                    assembly,
                    name: type_name,
                    status: inherited,
                },
            ) => {
                let attributes = ElementAttributes::read(&element, start)?;
                let name = attributes.required("Name")?;
                let status = attributes.status(*inherited)?;
                if status == IncludeStatus::Inherit {
                    return Err(Error::PolicyParse(format!(
                        "Specify include status for Member \"{}\" in Type \"{}\"",
                        name, type_name
                    )));
                }

                if !attributes.applies(&self.predicate)? {
                    debug!("Skipping Member \"{}\" of \"{}\" for this build", name, type_name);
                    return Ok(Scope::Skipped);
                }

                builder.create_member(
                    assembly,
                    type_name,
                    DocumentMember {
                        return_type: attributes.get("ReturnType").map(str::to_string),
                        visibility: attributes.visibility(),
                        security: attributes.security(SecurityTransparencyStatus::Undefined),
                        ..DocumentMember::new(MemberKind::parse(attributes.get("MemberType")), name, status)
                    },
                )?;
                Ok(Scope::Leaf)
            }
            ("Type" | "TypeForwarder" | "Member", Scope::Skipped) => Ok(Scope::Skipped),
            ("xml" | "ThinModel" | "Assembly" | "Type" | "TypeForwarder" | "Member", _) => Err(
                Error::PolicyParse(format!("Element <{}> is not allowed here", element)),
            ),
            _ => Err(Error::PolicyParse(format!("Unknown element <{}>", element))),
        }
    }
}
