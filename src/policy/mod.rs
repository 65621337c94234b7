//! The policy model and everything that builds it.
//!
//! A policy assigns every assembly, type, member and type forwarder of a trim run an
//! [`IncludeStatus`], optionally a [`VisibilityOverride`] and a [`SecurityTransparencyStatus`].
//! Entries are addressed by string keys derived in [`keys`]; an item without an entry is
//! removed by the trim engine.
//!
//! # Building a model
//!
//! - [`PolicyModel::from_xml`] / [`PolicyModel::from_file`] read a policy document directly
//! - [`ModelReader::with_predicate`] adds build filtering through a [`BuildFilter`]
//! - [`ModelDocument`] keeps a document in its as-written form, to be loaded later with
//!   [`PolicyModel::load_from`]
//! - The `add_*` methods of [`PolicyModel`], [`AssemblyEntry`] and [`TypeEntry`] build a model
//!   programmatically
//!
//! # Example
//!
//! ```rust
//! use dottrim::policy::{BuildFilter, IncludeStatus, ModelReader, PolicyModel};
//!
//! let xml = r##"<ThinModel>
//!     <Assembly Name="System.Runtime" Status="ImplRoot">
//!       <Type Name="System.Object" Status="ApiRoot">
//!         <Member Name="#ctor" Status="ApiRoot"/>
//!         <Member Name="Finalize" Status="ImplRoot" Condition="FEATURE_FINALIZERS"/>
//!       </Type>
//!     </Assembly>
//!   </ThinModel>"##;
//!
//! let mut policy = PolicyModel::new();
//! ModelReader::with_predicate(BuildFilter::new().defines("FEATURE_CORECLR")).read(xml, &mut policy)?;
//!
//! let object = policy.get_assembly("System.Runtime").unwrap().get_type("System.Object").unwrap();
//! assert_eq!(object.status, IncludeStatus::ApiRoot);
//! assert!(object.get_member_by_key("Method : #ctor").is_some());
//! assert!(object.get_member_by_key("Method : Finalize").is_none());
//! # Ok::<(), dottrim::Error>(())
//! ```

mod condition;
mod document;
mod filter;
pub mod keys;
mod model;
mod reader;
mod status;

pub use condition::ConditionEvaluator;
pub use document::{
    DocumentAssembly, DocumentMember, DocumentType, DocumentTypeForwarder, ModelDocument,
};
pub use filter::{BuildFilter, IncludeAll, IncludePredicate};
pub use model::{
    AssemblyEntry, MemberEntry, PolicyElement, PolicyModel, TypeEntry, TypeForwarderEntry,
};
pub use reader::{ModelBuilder, ModelReader};
pub use status::{IncludeStatus, MemberKind, SecurityTransparencyStatus, VisibilityOverride};
