//! Traversal state threaded through the rewriter.
//!
//! Policy lookups are flat per assembly while the metadata graph is nested. A [`TrimContext`]
//! carries what is fixed for one assembly; a [`TypeScope`] describes the type currently being
//! rewritten and is handed down explicitly to everything below it.

use std::{borrow::Cow, sync::OnceLock};

use log::warn;

use crate::{
    metadata::{MemberRefSignature, MetadataHost, TypeMember, TypeRef, TypeSignature},
    policy::{AssemblyEntry, MemberEntry, MemberKind, PolicyModel, TypeEntry},
    trim::TrimOptions,
    Error, Result,
};

/// Name of the module pseudo-type holding global members
pub(crate) const MODULE_TYPE: &str = "<Module>";
/// Prefix of compiler generated types holding static data
pub(crate) const PRIVATE_IMPLEMENTATION_DETAILS: &str = "<PrivateImplementationDetails>";

/// Per-assembly state of a rewrite.
pub(crate) struct TrimContext<'a> {
    /// The full model, to ask whether an assembly is part of the run
    pub policy: &'a PolicyModel,
    /// Entry of the assembly being rewritten
    pub assembly: &'a AssemblyEntry,
    /// Enabled mutation policies
    pub options: &'a TrimOptions,
    /// Resolves types outside the module and knows the core library
    pub host: &'a dyn MetadataHost,
    friend_access: &'a OnceLock<Option<TypeRef>>,
    /// Qualified names of the emitted types, in emission order
    pub emitted: Vec<String>,
}

impl<'a> TrimContext<'a> {
    pub(crate) fn new(
        policy: &'a PolicyModel,
        assembly: &'a AssemblyEntry,
        options: &'a TrimOptions,
        host: &'a dyn MetadataHost,
        friend_access: &'a OnceLock<Option<TypeRef>>,
    ) -> Self {
        TrimContext {
            policy,
            assembly,
            options,
            host,
            friend_access,
            emitted: Vec::new(),
        }
    }

    /// `true` if `assembly` is listed in the model, whatever its status
    pub(crate) fn is_in_run(&self, assembly: &str) -> bool {
        self.policy.contains_assembly(assembly)
    }

    /// Entry for a type of the current assembly
    pub(crate) fn type_entry(&self, key: &str) -> Option<&'a TypeEntry> {
        self.assembly.get_type(key)
    }

    /// `FriendAccessAllowedAttribute` of the core library, looked up on first use
    pub(crate) fn friend_access_attribute(&self) -> Option<&'a TypeRef> {
        self.friend_access
            .get_or_init(|| {
                let attribute = self.host.find_core_type("FriendAccessAllowedAttribute");
                if attribute.is_none() {
                    warn!(
                        "FriendAccessAllowedAttribute not found in '{}', friend access will not be annotated",
                        self.host.core_assembly_name()
                    );
                }
                attribute
            })
            .as_ref()
    }
}

/// Where the decisions for the current type come from.
#[derive(Debug)]
pub(crate) enum TypeContext<'a> {
    /// The type's own policy entry
    Entry(&'a TypeEntry),
    /// A special type without entry; every member is kept
    Special,
}

/// The type currently being rewritten.
#[derive(Debug)]
pub(crate) struct TypeScope<'a> {
    /// Policy key of the type
    pub key: String,
    /// Reference to the type
    pub type_ref: TypeRef,
    /// The type as seen from its own members, instantiated over its generic parameters
    pub signature: TypeSignature,
    /// Source of member decisions
    pub context: TypeContext<'a>,
}

impl<'a> TypeScope<'a> {
    pub(crate) fn is_special(&self) -> bool {
        matches!(self.context, TypeContext::Special)
    }

    /// The type's own entry; `None` for special types
    pub(crate) fn entry(&self) -> Option<&'a TypeEntry> {
        match self.context {
            TypeContext::Entry(entry) => Some(entry),
            TypeContext::Special => None,
        }
    }

    /// Decision for a member of this type; `None` drops the member.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedMemberKind`] for member references that are neither methods
    /// nor fields.
    pub(crate) fn member(&self, member: TypeMember<'_>) -> Result<Option<Cow<'a, MemberEntry>>> {
        match self.context {
            TypeContext::Entry(entry) => Ok(entry.get_member(member)?.map(Cow::Borrowed)),
            TypeContext::Special => Ok(Some(Cow::Owned(MemberEntry::placeholder(
                member_kind(member)?,
                &self.key,
                member.name(),
            )))),
        }
    }
}

/// `<Module>`, or a `<PrivateImplementationDetails>` type
pub(crate) fn is_special_type_name(key: &str) -> bool {
    key == MODULE_TYPE || key.starts_with(PRIVATE_IMPLEMENTATION_DETAILS)
}

fn member_kind(member: TypeMember<'_>) -> Result<MemberKind> {
    match member {
        TypeMember::Field(_) => Ok(MemberKind::Field),
        TypeMember::Method(_) => Ok(MemberKind::Method),
        TypeMember::Property(_) => Ok(MemberKind::Property),
        TypeMember::Event(_) => Ok(MemberKind::Event),
        TypeMember::Reference(reference) => match reference.signature {
            MemberRefSignature::Method(_) => Ok(MemberKind::Method),
            MemberRefSignature::Field(_) => Ok(MemberKind::Field),
            MemberRefSignature::Other(_) => Err(Error::UnsupportedMemberKind(reference.to_string())),
        },
    }
}
