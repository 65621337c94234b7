// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
// - 'file.rs' uses mmap to map policy documents into memory

//! # dottrim
//!
//! Policy-driven trimming of .NET assembly metadata. Given an externally produced policy
//! document that decides, symbol by symbol, what survives, `dottrim` walks an in-memory
//! metadata graph, drops everything the policy does not keep, and repairs the cross-references
//! between the nodes that remain: implemented interfaces, explicit method implementations, type
//! forwarders, visibility, and security annotations.
//!
//! Reading and writing PE files is not done here. Binaries enter and leave through the
//! [`metadata::MetadataHost`] trait, which a PE reader/writer implements. The crate ships a
//! [`metadata::MemoryHost`] that keeps assemblies in memory, which is what the tests use.
//!
//! ## Features
//!
//! - **Policy model** - Per assembly, type, member and type forwarder decisions, keyed by stable
//!   names that are derived the same way when reading the policy and when walking the graph
//! - **Policy document reader** - Streaming XML reader with status inheritance and build filters
//!   (`Platform`, `Architecture`, `Flavor`, `Condition`)
//! - **Trim engine** - Depth-first rewriter with interface, method-impl and forwarder repair
//! - **Mutation policies** - Visibility demotion with explicit interface implementation
//!   synthesis, security transparency reconciliation, friend-access annotation, legacy security
//!   and serializability stripping, default constructor synthesis, resource stripping
//!
//! ## Quick Start
//!
//! ```rust
//! use dottrim::prelude::*;
//!
//! let policy = PolicyModel::from_xml(
//!     r#"<ThinModel>
//!          <Assembly Name="Contoso" Status="ApiRoot">
//!            <Type Name="Contoso.Widget">
//!              <Member MemberType="Method" Name="Spin" Status="ApiRoot"/>
//!            </Type>
//!          </Assembly>
//!        </ThinModel>"#,
//! )?;
//!
//! let mut assembly = Assembly::new(AssemblyIdentity::new("Contoso", AssemblyVersion::new(1, 0, 0, 0)));
//! assembly.module.types.push(
//!     TypeDefBuilder::new("Widget")
//!         .namespace("Contoso")
//!         .public()
//!         .method(MethodDefBuilder::new("Spin").public().build())
//!         .method(MethodDefBuilder::new("Wobble").public().build())
//!         .build(),
//! );
//!
//! let host = MemoryHost::new();
//! let trimmer = Trimmer::new(&policy, TrimOptions::default());
//! trimmer.rewrite_assembly(&host, &mut assembly)?;
//!
//! let widget = &assembly.module.types[0];
//! assert_eq!(widget.methods.len(), 1);
//! assert_eq!(widget.methods[0].name, "Spin");
//! # Ok::<(), dottrim::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - The mutable metadata graph the engine operates on, and the host seam
//! - [`policy`] - The policy model, its key derivation, the document reader and build filters
//! - [`trim`] - The trim engine and its options
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade and never installs a logger
//! itself. Loading and writing each assembly is reported at `info`, pruning decisions at `debug`.

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dottrim::prelude::*;
///
/// let options = TrimOptions::default().ensure_constructors_present(true);
/// assert!(options.change_visibility);
/// ```
pub mod prelude;

/// The in-memory metadata graph and the host seam used to load and write binaries.
///
/// # Key Components
///
/// - [`metadata::Assembly`] / [`metadata::Module`] - Root of a loaded binary
/// - [`metadata::TypeDef`] and its members ([`metadata::MethodDef`], [`metadata::FieldDef`],
///   [`metadata::PropertyDef`], [`metadata::EventDef`], [`metadata::MethodImpl`])
/// - [`metadata::TypeSignature`] / [`metadata::TypeRef`] - Type references across assemblies
/// - [`metadata::MetadataHost`] / [`metadata::MemoryHost`] - Loading, writing and resolving
pub mod metadata;

/// The policy model: keep/drop, visibility and security decisions addressed by derived keys.
///
/// # Key Components
///
/// - [`policy::PolicyModel`] - The read-only decision tree consulted while trimming
/// - [`policy::ModelDocument`] - Generic parsed form of a policy document
/// - [`policy::ModelReader`] - Streaming reader feeding any [`policy::ModelBuilder`]
/// - [`policy::BuildFilter`] - Platform, architecture, flavor and condition filtering
pub mod policy;

/// The trim engine.
///
/// See [`trim::Trimmer`] for the batch driver and [`trim::TrimOptions`] for the mutation
/// policy switches.
pub mod trim;

/// `dottrim` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dottrim` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use dottrim::{Error, policy::PolicyModel};
///
/// match PolicyModel::from_xml("<ThinModel><Assembly/></ThinModel>") {
///     Ok(_) => println!("parsed"),
///     Err(Error::PolicyParse(message)) => println!("Malformed policy: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;
