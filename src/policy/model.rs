//! The policy model consulted by the trim engine.
//!
//! A [`PolicyModel`] owns one [`AssemblyEntry`] per assembly in the trim run. Each assembly
//! owns its [`TypeEntry`]s and [`TypeForwarderEntry`]s, and each type owns its
//! [`MemberEntry`]s. All maps are keyed by the strings produced in [`crate::policy::keys`].
//!
//! The model is built once, either directly through the `add_*` methods, by streaming a policy
//! document through a [`ModelReader`], or by copying a [`ModelDocument`] with
//! [`PolicyModel::load_from`]. It is read-only afterwards.
//!
//! Lookups never fail: a missing entry is the signal to drop the item. Entries whose status is
//! [`IncludeStatus::Exclude`] are reported as missing by every lookup.

use std::{collections::HashMap, path::Path};

use crate::{
    metadata::TypeMember,
    policy::{
        document::{DocumentMember, DocumentType, DocumentTypeForwarder, ModelDocument},
        keys,
        reader::{ModelBuilder, ModelReader},
        IncludeStatus, MemberKind, SecurityTransparencyStatus, VisibilityOverride,
    },
    Error, Result,
};

/// Decision for one member of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberEntry {
    /// Field, method, property or event
    pub kind: MemberKind,
    /// Key of the declaring type
    pub declaring_type: String,
    /// Member name as written in the policy
    pub name: String,
    /// Return type fragment, part of the key when present
    pub return_type: Option<String>,
    /// Inclusion decision
    pub status: IncludeStatus,
    /// Requested visibility
    pub visibility: VisibilityOverride,
    /// Requested transparency
    pub security: SecurityTransparencyStatus,
}

impl MemberEntry {
    /// A member entry without overrides. The declaring type is assigned when the entry is added
    /// to a [`TypeEntry`].
    pub fn new(kind: MemberKind, name: impl Into<String>, status: IncludeStatus) -> Self {
        MemberEntry {
            kind,
            declaring_type: String::new(),
            name: name.into(),
            return_type: None,
            status,
            visibility: VisibilityOverride::None,
            security: SecurityTransparencyStatus::Undefined,
        }
    }

    /// Placeholder for members of types that have no policy entry of their own
    pub(crate) fn placeholder(kind: MemberKind, declaring_type: &str, name: &str) -> Self {
        MemberEntry {
            declaring_type: declaring_type.to_string(),
            security: SecurityTransparencyStatus::Transparent,
            ..MemberEntry::new(kind, name, IncludeStatus::ImplRoot)
        }
    }

    /// Sets the return type fragment.
    #[must_use]
    pub fn returns(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    /// Sets the visibility override.
    #[must_use]
    pub fn visibility(mut self, visibility: VisibilityOverride) -> Self {
        self.visibility = visibility;
        self
    }

    /// Sets the requested transparency.
    #[must_use]
    pub fn security(mut self, security: SecurityTransparencyStatus) -> Self {
        self.security = security;
        self
    }

    /// The key this entry is stored under
    #[must_use]
    pub fn key(&self) -> String {
        keys::member_key_from_parts(self.kind, &self.name, self.return_type.as_deref())
    }
}

/// Decision for one type, and the members it keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    /// Qualified type name; the key of the entry
    pub name: String,
    /// Inclusion decision
    pub status: IncludeStatus,
    /// Requested visibility
    pub visibility: VisibilityOverride,
    /// Requested transparency
    pub security: SecurityTransparencyStatus,
    members: HashMap<String, MemberEntry>,
}

impl TypeEntry {
    /// A transparent type entry without visibility override
    pub fn new(name: impl Into<String>, status: IncludeStatus) -> Self {
        TypeEntry {
            name: name.into(),
            status,
            visibility: VisibilityOverride::None,
            security: SecurityTransparencyStatus::Transparent,
            members: HashMap::new(),
        }
    }

    /// Sets the visibility override.
    #[must_use]
    pub fn visibility(mut self, visibility: VisibilityOverride) -> Self {
        self.visibility = visibility;
        self
    }

    /// Sets the requested transparency.
    #[must_use]
    pub fn security(mut self, security: SecurityTransparencyStatus) -> Self {
        self.security = security;
        self
    }

    /// Add a member, taking ownership of it as its declaring type.
    ///
    /// # Errors
    /// Returns [`Error::PolicyParse`] if a member with the same key exists.
    pub fn add_member(&mut self, mut member: MemberEntry) -> Result<&mut MemberEntry> {
        let key = member.key();
        if self.members.contains_key(&key) {
            return Err(Error::PolicyParse(format!(
                "Duplicate member \"{}\" in Type \"{}\"",
                key, self.name
            )));
        }

        member.declaring_type.clone_from(&self.name);
        Ok(self.members.entry(key).or_insert(member))
    }

    /// Look up the entry for a member of the type this entry describes.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedMemberKind`] if no key can be derived for `member`.
    pub fn get_member(&self, member: TypeMember<'_>) -> Result<Option<&MemberEntry>> {
        let key = keys::member_key(member)?;
        Ok(self.get_member_by_key(&key))
    }

    /// Look up a member by key
    #[must_use]
    pub fn get_member_by_key(&self, key: &str) -> Option<&MemberEntry> {
        self.members
            .get(key)
            .filter(|member| !member.status.is_excluded())
    }

    /// All member entries, excluded ones included
    pub fn members(&self) -> impl Iterator<Item = &MemberEntry> {
        self.members.values()
    }
}

/// Decision for a type forwarder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeForwarderEntry {
    /// Assembly the type is forwarded to
    pub assembly_name: String,
    /// Qualified name of the forwarded type
    pub type_name: String,
    /// Inclusion decision
    pub status: IncludeStatus,
}

impl TypeForwarderEntry {
    /// A forwarder entry
    pub fn new(
        assembly_name: impl Into<String>,
        type_name: impl Into<String>,
        status: IncludeStatus,
    ) -> Self {
        TypeForwarderEntry {
            assembly_name: assembly_name.into(),
            type_name: type_name.into(),
            status,
        }
    }

    /// The key this entry is stored under
    #[must_use]
    pub fn key(&self) -> String {
        keys::type_forwarder_key(&self.assembly_name, &self.type_name)
    }
}

/// Decisions for one assembly of the trim run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyEntry {
    /// Simple assembly name; the key of the entry
    pub name: String,
    /// Status of the assembly itself, inherited by types without one
    pub status: IncludeStatus,
    types: HashMap<String, TypeEntry>,
    type_forwarders: HashMap<String, TypeForwarderEntry>,
}

impl AssemblyEntry {
    /// An assembly entry without types
    pub fn new(name: impl Into<String>, status: IncludeStatus) -> Self {
        AssemblyEntry {
            name: name.into(),
            status,
            types: HashMap::new(),
            type_forwarders: HashMap::new(),
        }
    }

    /// Add a type.
    ///
    /// # Errors
    /// Returns [`Error::PolicyParse`] if the type is already listed, as a type or as the target
    /// of a forwarder.
    pub fn add_type(&mut self, entry: TypeEntry) -> Result<&mut TypeEntry> {
        if self.types.contains_key(&entry.name) {
            return Err(Error::PolicyParse(format!(
                "Duplicate Type \"{}\" in Assembly \"{}\"",
                entry.name, self.name
            )));
        }
        if self
            .type_forwarders
            .values()
            .any(|forwarder| forwarder.type_name == entry.name)
        {
            return Err(Error::PolicyParse(format!(
                "Type \"{}\" in Assembly \"{}\" is also forwarded",
                entry.name, self.name
            )));
        }

        Ok(self.types.entry(entry.name.clone()).or_insert(entry))
    }

    /// Add a type forwarder.
    ///
    /// # Errors
    /// Returns [`Error::PolicyParse`] if the forwarder is already listed, or if its target is
    /// also listed as a type of this assembly.
    pub fn add_type_forwarder(
        &mut self,
        entry: TypeForwarderEntry,
    ) -> Result<&mut TypeForwarderEntry> {
        let key = entry.key();
        if self.type_forwarders.contains_key(&key) {
            return Err(Error::PolicyParse(format!(
                "Duplicate TypeForwarder \"{}\" in Assembly \"{}\"",
                key, self.name
            )));
        }
        if self.types.contains_key(&entry.type_name) {
            return Err(Error::PolicyParse(format!(
                "TypeForwarder \"{}\" in Assembly \"{}\" targets a type defined there",
                key, self.name
            )));
        }

        Ok(self.type_forwarders.entry(key).or_insert(entry))
    }

    /// Look up a type by key
    #[must_use]
    pub fn get_type(&self, key: &str) -> Option<&TypeEntry> {
        self.types.get(key).filter(|entry| !entry.status.is_excluded())
    }

    /// Mutable access to a type by key, excluded ones included
    pub fn get_type_mut(&mut self, key: &str) -> Option<&mut TypeEntry> {
        self.types.get_mut(key)
    }

    /// Look up the forwarder for `type_name` to `assembly`
    #[must_use]
    pub fn get_type_forwarder(&self, assembly: &str, type_name: &str) -> Option<&TypeForwarderEntry> {
        self.type_forwarders
            .get(&keys::type_forwarder_key(assembly, type_name))
            .filter(|entry| !entry.status.is_excluded())
    }

    /// All type entries, excluded ones included
    pub fn types(&self) -> impl Iterator<Item = &TypeEntry> {
        self.types.values()
    }

    /// All forwarder entries, excluded ones included
    pub fn type_forwarders(&self) -> impl Iterator<Item = &TypeForwarderEntry> {
        self.type_forwarders.values()
    }
}

/// Any entry of the policy tree.
///
/// The trim engine asks the same questions of every kind of entry; this is the one place that
/// answers them.
#[derive(Debug, Clone, Copy)]
pub enum PolicyElement<'a> {
    /// An assembly
    Assembly(&'a AssemblyEntry),
    /// A type
    Type(&'a TypeEntry),
    /// A member of a type
    Member(&'a MemberEntry),
    /// A type forwarder
    TypeForwarder(&'a TypeForwarderEntry),
}

impl PolicyElement<'_> {
    /// Key of the entry
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            PolicyElement::Assembly(assembly) => assembly.name.clone(),
            PolicyElement::Type(entry) => entry.name.clone(),
            PolicyElement::Member(member) => member.key(),
            PolicyElement::TypeForwarder(forwarder) => forwarder.key(),
        }
    }

    /// Inclusion decision
    #[must_use]
    pub fn status(&self) -> IncludeStatus {
        match self {
            PolicyElement::Assembly(assembly) => assembly.status,
            PolicyElement::Type(entry) => entry.status,
            PolicyElement::Member(member) => member.status,
            PolicyElement::TypeForwarder(forwarder) => forwarder.status,
        }
    }

    /// Requested visibility; assemblies and forwarders never carry one
    #[must_use]
    pub fn visibility(&self) -> VisibilityOverride {
        match self {
            PolicyElement::Type(entry) => entry.visibility,
            PolicyElement::Member(member) => member.visibility,
            PolicyElement::Assembly(_) | PolicyElement::TypeForwarder(_) => {
                VisibilityOverride::None
            }
        }
    }

    /// Requested transparency; assemblies and forwarders never carry one
    #[must_use]
    pub fn security(&self) -> SecurityTransparencyStatus {
        match self {
            PolicyElement::Type(entry) => entry.security,
            PolicyElement::Member(member) => member.security,
            PolicyElement::Assembly(_) | PolicyElement::TypeForwarder(_) => {
                SecurityTransparencyStatus::Undefined
            }
        }
    }

    /// The element must be narrowed to assembly visibility
    #[must_use]
    pub fn should_make_internal(&self) -> bool {
        self.visibility() == VisibilityOverride::ForceInternal
            || self.status() == IncludeStatus::ApiFxInternal
    }

    /// Friend assemblies may use the element despite it being internal
    #[must_use]
    pub fn is_friend_access_allowed(&self) -> bool {
        self.status() == IncludeStatus::ApiFxInternal
    }

    /// Part of the public surface
    #[must_use]
    pub fn is_visible_externally(&self) -> bool {
        self.status().is_visible_externally()
    }
}

/// The complete set of decisions for a trim run.
///
/// # Examples
///
/// ```rust
/// use dottrim::policy::{AssemblyEntry, IncludeStatus, MemberEntry, MemberKind, PolicyModel, TypeEntry};
///
/// let mut policy = PolicyModel::new();
/// let assembly = policy.add_assembly(AssemblyEntry::new("A", IncludeStatus::ApiRoot))?;
/// let foo = assembly.add_type(TypeEntry::new("A.Foo", IncludeStatus::ApiRoot))?;
/// foo.add_member(MemberEntry::new(MemberKind::Method, "ToString", IncludeStatus::ApiRoot))?;
///
/// let foo = policy.get_assembly("A").and_then(|a| a.get_type("A.Foo")).unwrap();
/// assert!(foo.get_member_by_key("Method : ToString").is_some());
/// assert!(foo.get_member_by_key("Method : Bar").is_none());
/// # Ok::<(), dottrim::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyModel {
    assemblies: HashMap<String, AssemblyEntry>,
}

impl PolicyModel {
    /// An empty model
    #[must_use]
    pub fn new() -> Self {
        PolicyModel {
            assemblies: HashMap::new(),
        }
    }

    /// Read a policy document from a string, without build filtering.
    ///
    /// # Errors
    /// Returns [`Error::PolicyParse`] or an XML error if the document is malformed.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut model = PolicyModel::new();
        ModelReader::new().read(xml, &mut model)?;
        Ok(model)
    }

    /// Read a policy document from a file, without build filtering.
    ///
    /// # Errors
    /// Returns [`Error::FileError`] if the file cannot be read, and the errors of
    /// [`PolicyModel::from_xml`] otherwise.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut model = PolicyModel::new();
        ModelReader::new().read_file(path, &mut model)?;
        Ok(model)
    }

    /// Copy every entry of `document` into this model.
    ///
    /// # Errors
    /// Returns [`Error::PolicyParse`] on duplicate keys, members whose status is still
    /// `Inherit`, and forwarders whose target is also a type of the same assembly.
    pub fn load_from(&mut self, document: &ModelDocument) -> Result<()> {
        for assembly in &document.assemblies {
            let entry = self.add_assembly(AssemblyEntry::new(&assembly.name, assembly.status))?;

            for forwarder in &assembly.type_forwarders {
                entry.add_type_forwarder(TypeForwarderEntry::new(
                    &forwarder.assembly_name,
                    &forwarder.type_name,
                    forwarder.status,
                ))?;
            }

            // Types may stay `Inherit`: only members carry a keep decision of their own, and a
            // listed type is kept whatever its status unless it is `Exclude`.
            for document_type in &assembly.types {
                let type_entry = entry.add_type(type_entry_from(document_type))?;
                for member in &document_type.members {
                    if member.status == IncludeStatus::Inherit {
                        return Err(unresolved_member(&member.name, &type_entry.name));
                    }
                    type_entry.add_member(member_entry_from(member))?;
                }
            }
        }

        Ok(())
    }

    /// Add an assembly.
    ///
    /// # Errors
    /// Returns [`Error::PolicyParse`] if the assembly is already listed.
    pub fn add_assembly(&mut self, entry: AssemblyEntry) -> Result<&mut AssemblyEntry> {
        if self.assemblies.contains_key(&entry.name) {
            return Err(Error::PolicyParse(format!(
                "Duplicate Assembly \"{}\"",
                entry.name
            )));
        }

        Ok(self.assemblies.entry(entry.name.clone()).or_insert(entry))
    }

    /// Look up an assembly by name.
    ///
    /// Unlike the type and member lookups, this returns excluded assemblies too: an assembly
    /// listed in the model is part of the trim run whatever its own status.
    #[must_use]
    pub fn get_assembly(&self, name: &str) -> Option<&AssemblyEntry> {
        self.assemblies.get(name)
    }

    /// `true` if the assembly is part of the trim run
    #[must_use]
    pub fn contains_assembly(&self, name: &str) -> bool {
        self.assemblies.contains_key(name)
    }

    /// All assemblies in name order
    #[must_use]
    pub fn assemblies(&self) -> Vec<&AssemblyEntry> {
        let mut assemblies: Vec<&AssemblyEntry> = self.assemblies.values().collect();
        assemblies.sort_by(|a, b| a.name.cmp(&b.name));
        assemblies
    }

    /// Number of assemblies in the run
    #[must_use]
    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    /// `true` if no assembly is listed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }

    fn assembly_mut(&mut self, name: &str) -> Result<&mut AssemblyEntry> {
        self.assemblies
            .get_mut(name)
            .ok_or_else(|| malformed_error!("Assembly \"{}\" has not been created", name))
    }
}

impl ModelBuilder for PolicyModel {
    fn create_assembly(&mut self, name: &str, status: IncludeStatus) -> Result<()> {
        self.add_assembly(AssemblyEntry::new(name, status))?;
        Ok(())
    }

    fn create_type(&mut self, assembly: &str, node: DocumentType) -> Result<()> {
        self.assembly_mut(assembly)?.add_type(type_entry_from(&node))?;
        Ok(())
    }

    fn create_type_forwarder(&mut self, assembly: &str, node: DocumentTypeForwarder) -> Result<()> {
        self.assembly_mut(assembly)?
            .add_type_forwarder(TypeForwarderEntry::new(
                node.assembly_name,
                node.type_name,
                node.status,
            ))?;
        Ok(())
    }

    fn create_member(&mut self, assembly: &str, type_name: &str, node: DocumentMember) -> Result<()> {
        if node.status == IncludeStatus::Inherit {
            return Err(unresolved_member(&node.name, type_name));
        }

        let type_entry = self
            .assembly_mut(assembly)?
            .get_type_mut(type_name)
            .ok_or_else(|| malformed_error!("Type \"{}\" has not been created", type_name))?;
        type_entry.add_member(member_entry_from(&node))?;
        Ok(())
    }
}

fn type_entry_from(node: &DocumentType) -> TypeEntry {
    TypeEntry::new(&node.name, node.status)
        .visibility(node.visibility)
        .security(node.security)
}

fn member_entry_from(node: &DocumentMember) -> MemberEntry {
    let entry = MemberEntry::new(node.kind, &node.name, node.status)
        .visibility(node.visibility)
        .security(node.security);

    match &node.return_type {
        Some(return_type) => entry.returns(return_type),
        None => entry,
    }
}

fn unresolved_member(member: &str, type_name: &str) -> Error {
    Error::PolicyParse(format!(
        "Specify include status for Member \"{}\" in Type \"{}\"",
        member, type_name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{MethodDefBuilder, TypeSignature},
        policy::document::DocumentAssembly,
    };

    fn document() -> ModelDocument {
        ModelDocument {
            assemblies: vec![DocumentAssembly {
                name: "A".to_string(),
                status: IncludeStatus::ApiRoot,
                types: vec![DocumentType {
                    members: vec![
                        DocumentMember::new(MemberKind::Method, "ToString", IncludeStatus::ApiRoot),
                        DocumentMember::new(MemberKind::Field, "_gone", IncludeStatus::Exclude),
                    ],
                    ..DocumentType::new("A.Foo", IncludeStatus::ApiRoot)
                }],
                type_forwarders: vec![DocumentTypeForwarder::new(
                    "B",
                    "B.Moved",
                    IncludeStatus::ApiRoot,
                )],
            }],
        }
    }

    #[test]
    fn load_from() {
        let mut model = PolicyModel::new();
        model.load_from(&document()).unwrap();

        let assembly = model.get_assembly("A").unwrap();
        let foo = assembly.get_type("A.Foo").unwrap();
        assert_eq!(foo.members().count(), 2);
        assert_eq!(
            foo.get_member_by_key("Method : ToString").unwrap().declaring_type,
            "A.Foo"
        );
        assert!(assembly.get_type_forwarder("B", "B.Moved").is_some());
        assert!(assembly.get_type_forwarder("B", "B.Other").is_none());
    }

    #[test]
    fn excluded_entries_are_missing() {
        let mut model = PolicyModel::new();
        model.load_from(&document()).unwrap();

        let foo = model.get_assembly("A").unwrap().get_type("A.Foo").unwrap();
        assert!(foo.get_member_by_key("Field : _gone").is_none());

        let mut model = PolicyModel::new();
        let assembly = model
            .add_assembly(AssemblyEntry::new("A", IncludeStatus::Exclude))
            .unwrap();
        assembly
            .add_type(TypeEntry::new("A.Hidden", IncludeStatus::Exclude))
            .unwrap();

        // The assembly still belongs to the run
        let assembly = model.get_assembly("A").unwrap();
        assert!(assembly.get_type("A.Hidden").is_none());
        assert!(model.contains_assembly("A"));
    }

    #[test]
    fn load_from_rejects_duplicates() {
        let mut doubled = document();
        let first = doubled.assemblies[0].clone();
        doubled.assemblies.push(first);
        assert!(matches!(
            PolicyModel::new().load_from(&doubled),
            Err(Error::PolicyParse(_))
        ));

        let mut doubled = document();
        let member = doubled.assemblies[0].types[0].members[0].clone();
        doubled.assemblies[0].types[0].members.push(member);
        assert!(matches!(
            PolicyModel::new().load_from(&doubled),
            Err(Error::PolicyParse(_))
        ));
    }

    #[test]
    fn load_from_rejects_inherit() {
        let mut document = document();
        document.assemblies[0].types[0]
            .members
            .push(DocumentMember::new(MemberKind::Method, "Bar", IncludeStatus::Inherit));

        match PolicyModel::new().load_from(&document) {
            Err(Error::PolicyParse(message)) => {
                assert_eq!(
                    message,
                    "Specify include status for Member \"Bar\" in Type \"A.Foo\""
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn types_may_inherit() {
        let mut document = document();
        document.assemblies[0].status = IncludeStatus::Inherit;
        document.assemblies[0]
            .types
            .push(DocumentType::new("A.Unspecified", IncludeStatus::Inherit));

        let mut model = PolicyModel::new();
        model.load_from(&document).unwrap();

        let unspecified = model
            .get_assembly("A")
            .and_then(|assembly| assembly.get_type("A.Unspecified"))
            .unwrap();
        assert_eq!(unspecified.status, IncludeStatus::Inherit);
    }

    #[test]
    fn forwarder_type_collision() {
        let mut document = document();
        document.assemblies[0]
            .type_forwarders
            .push(DocumentTypeForwarder::new("B", "A.Foo", IncludeStatus::ApiRoot));
        assert!(matches!(
            PolicyModel::new().load_from(&document),
            Err(Error::PolicyParse(_))
        ));

        let mut assembly = AssemblyEntry::new("A", IncludeStatus::ApiRoot);
        assembly
            .add_type_forwarder(TypeForwarderEntry::new("B", "A.Foo", IncludeStatus::ApiRoot))
            .unwrap();
        assert!(assembly
            .add_type(TypeEntry::new("A.Foo", IncludeStatus::ApiRoot))
            .is_err());
    }

    #[test]
    fn member_lookup_through_graph() {
        let mut foo = TypeEntry::new("A.Foo", IncludeStatus::ApiRoot);
        foo.add_member(MemberEntry::new(MemberKind::Method, "#ctor", IncludeStatus::ApiRoot))
            .unwrap();
        foo.add_member(
            MemberEntry::new(MemberKind::Method, "op_Implicit", IncludeStatus::ApiRoot)
                .returns("System.Int32"),
        )
        .unwrap();

        let ctor = MethodDefBuilder::constructor().build();
        assert!(foo.get_member(TypeMember::Method(&ctor)).unwrap().is_some());

        let widening = MethodDefBuilder::new("op_Implicit")
            .static_method()
            .returns(TypeSignature::I4)
            .build();
        assert!(foo.get_member(TypeMember::Method(&widening)).unwrap().is_some());

        let narrowing = MethodDefBuilder::new("op_Implicit")
            .static_method()
            .returns(TypeSignature::I2)
            .build();
        assert!(foo.get_member(TypeMember::Method(&narrowing)).unwrap().is_none());
    }

    #[test]
    fn elements() {
        let assembly = AssemblyEntry::new("A", IncludeStatus::ApiRoot);
        let internal = TypeEntry::new("A.Foo", IncludeStatus::ApiRoot)
            .visibility(VisibilityOverride::ForceInternal);
        let friend = MemberEntry::new(MemberKind::Field, "_x", IncludeStatus::ApiFxInternal);
        let forwarder = TypeForwarderEntry::new("B", "B.T", IncludeStatus::ImplRoot);

        assert!(!PolicyElement::Assembly(&assembly).should_make_internal());
        assert!(PolicyElement::Type(&internal).should_make_internal());
        assert!(!PolicyElement::Type(&internal).is_friend_access_allowed());
        assert!(PolicyElement::Member(&friend).should_make_internal());
        assert!(PolicyElement::Member(&friend).is_friend_access_allowed());
        assert!(PolicyElement::Member(&friend).is_visible_externally());
        assert!(!PolicyElement::TypeForwarder(&forwarder).is_visible_externally());

        assert_eq!(PolicyElement::Member(&friend).key(), "Field : _x");
        assert_eq!(PolicyElement::TypeForwarder(&forwarder).key(), "B B.T");
        assert_eq!(
            PolicyElement::Type(&internal).security(),
            SecurityTransparencyStatus::Transparent
        );
        assert_eq!(
            PolicyElement::Member(&friend).security(),
            SecurityTransparencyStatus::Undefined
        );
    }

    #[test]
    fn placeholder() {
        let member = MemberEntry::placeholder(MemberKind::Method, "<Module>", "Init");
        assert_eq!(member.status, IncludeStatus::ImplRoot);
        assert_eq!(member.security, SecurityTransparencyStatus::Transparent);
        assert!(!PolicyElement::Member(&member).should_make_internal());
    }

    #[test]
    fn assemblies_sorted() {
        let mut model = PolicyModel::new();
        for name in ["System.Xml", "mscorlib", "System"] {
            model
                .add_assembly(AssemblyEntry::new(name, IncludeStatus::ImplRoot))
                .unwrap();
        }

        let names: Vec<&str> = model.assemblies().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["System", "System.Xml", "mscorlib"]);
        assert_eq!(model.len(), 3);
        assert!(model
            .add_assembly(AssemblyEntry::new("System", IncludeStatus::ImplRoot))
            .is_err());
    }
}
