//! In-memory metadata graph of a .NET assembly.
//!
//! This is the graph the trim engine walks and rewrites. It is an owned tree: an [`Assembly`]
//! owns its manifest [`Module`], the module owns its namespace-level [`TypeDef`]s, and every type
//! owns its nested types and members. Cross-references between nodes (base types, implemented
//! interfaces, method implementation targets, attribute classes) are by name through
//! [`TypeRef`] and [`MemberRef`], never by pointer, so nodes can be removed without leaving
//! dangling references in the structure itself.
//!
//! Binaries enter and leave through a [`MetadataHost`]. Hosts also answer the questions the
//! engine cannot answer from the assembly alone: what a type in a referenced assembly looks like,
//! and which types the core library defines.
//!
//! # Module Structure
//!
//! - [`assembly`] - Assemblies, identities, modules, exported types and resources
//! - [`typedef`] - Type definitions and [`TypeDefBuilder`]
//! - [`members`] - Methods, fields, properties, events, method implementations
//! - [`signatures`] - Type references and signatures
//! - [`customattributes`] - Custom attributes
//! - [`security`] - Declarative security
//! - [`flags`] - Attribute flags and the visibility narrowing lattice
//! - [`host`] - The [`MetadataHost`] seam and [`MemoryHost`]
//!
//! # Examples
//!
//! ```rust
//! use dottrim::metadata::{
//!     Assembly, AssemblyIdentity, AssemblyVersion, MethodDefBuilder, TypeDefBuilder,
//! };
//!
//! let mut assembly = Assembly::new(AssemblyIdentity::new("Contoso", AssemblyVersion::new(1, 0, 0, 0)));
//! assembly.module.types.push(TypeDefBuilder::new("<Module>").build());
//! assembly.module.types.push(
//!     TypeDefBuilder::new("Widget")
//!         .namespace("Contoso")
//!         .public()
//!         .method(MethodDefBuilder::constructor().public().build())
//!         .build(),
//! );
//! assembly.module.refresh_all_types();
//!
//! assert_eq!(assembly.module.all_types, vec!["<Module>", "Contoso.Widget"]);
//! ```

pub mod assembly;
pub mod customattributes;
pub mod flags;
pub mod host;
pub mod members;
pub mod security;
pub mod signatures;
pub mod typedef;

pub use assembly::{
    Assembly, AssemblyIdentity, AssemblyVersion, ExportedType, ManifestResource, Module,
};
pub use customattributes::{
    has_attribute, CustomAttribute, CustomAttributeArgument, CustomAttributeNamedArgument,
};
pub use flags::{
    is_nested_visibility, narrow_type_visibility, type_visibility_rank, FieldAttributes,
    MemberAccessFlags, MethodModifiers, TypeAttributes,
};
pub use host::{DebugSymbols, LoadedUnit, MemoryHost, MetadataHost};
pub use members::{
    EventDef, FieldDef, MethodBody, MethodDef, MethodDefBuilder, MethodImpl, PropertyDef,
    TypeMember, CCTOR, CTOR,
};
pub use security::{SecurityAction, SecurityDeclaration};
pub use signatures::{MemberRef, MemberRefSignature, MethodSignature, TypeRef, TypeSignature};
pub use typedef::{TypeDef, TypeDefBuilder};
