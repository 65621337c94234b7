//! # dottrim Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dottrim library. Import this module to get quick access to everything needed to
//! load a policy and trim assemblies with it.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dottrim operations
pub use crate::Error;

/// The result type used throughout dottrim
pub use crate::Result;

// ================================================================================================
// Trim Engine
// ================================================================================================

/// The engine and its switches
pub use crate::trim::{TrimOptions, Trimmer};

// ================================================================================================
// Policy Model
// ================================================================================================

/// The decision tree and its entries
pub use crate::policy::{
    AssemblyEntry, MemberEntry, PolicyElement, PolicyModel, TypeEntry, TypeForwarderEntry,
};

/// Per-symbol decisions
pub use crate::policy::{IncludeStatus, MemberKind, SecurityTransparencyStatus, VisibilityOverride};

/// Reading policy documents
pub use crate::policy::{BuildFilter, IncludePredicate, ModelDocument, ModelReader};

// ================================================================================================
// Metadata Graph
// ================================================================================================

/// Assemblies and their identity
pub use crate::metadata::{Assembly, AssemblyIdentity, AssemblyVersion, ExportedType, Module};

/// Types and members
pub use crate::metadata::{
    EventDef, FieldDef, MethodDef, MethodDefBuilder, MethodImpl, PropertyDef, TypeDef,
    TypeDefBuilder,
};

/// References, signatures and attributes
pub use crate::metadata::{
    CustomAttribute, MemberAccessFlags, MemberRef, MethodSignature, TypeRef, TypeSignature,
};

/// Loading and writing binaries
pub use crate::metadata::{LoadedUnit, MemoryHost, MetadataHost};
