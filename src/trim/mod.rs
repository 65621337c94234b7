//! The trim engine.
//!
//! A [`Trimmer`] applies a [`PolicyModel`] to assemblies. For every assembly it walks the
//! metadata graph depth first, removes every type and member the policy does not keep, repairs
//! the edges between the nodes that remain, and applies the mutation policies enabled in
//! [`TrimOptions`].
//!
//! # Pruning
//!
//! Types and members are looked up by the keys of [`crate::policy::keys`]. A missing or
//! excluded entry removes the node and everything below it. The module pseudo-type `<Module>`,
//! `<PrivateImplementationDetails>` types and the types nested in them never have entries and
//! are always kept with all their members.
//!
//! # Repair
//!
//! - Implemented interfaces survive if the policy keeps them, or if they come from an assembly
//!   outside the run
//! - Explicit method implementations survive if both sides survive
//! - Type forwarders survive if the policy lists them
//!
//! # Example
//!
//! ```rust
//! use dottrim::prelude::*;
//! use std::path::Path;
//!
//! let policy = PolicyModel::from_xml(
//!     r#"<ThinModel><Assembly Name="Contoso" Status="ImplRoot"/></ThinModel>"#,
//! )?;
//!
//! let mut host = MemoryHost::new();
//! let contoso = Assembly::new(AssemblyIdentity::new("Contoso", AssemblyVersion::new(1, 0, 0, 0)));
//! host.add_unit("in/Contoso.dll", LoadedUnit::new(contoso));
//!
//! Trimmer::new(&policy, TrimOptions::default()).trim_binaries(&mut host, "in", "out")?;
//! assert!(host.written(Path::new("out/Contoso.dll")).is_some());
//! # Ok::<(), dottrim::Error>(())
//! ```

mod annotations;
mod context;
mod interfaces;
mod mutate;
mod options;
mod rewriter;

pub use options::TrimOptions;

use std::{path::Path, sync::OnceLock};

use log::{error, info};

use crate::{
    metadata::{Assembly, AssemblyIdentity, MetadataHost, TypeRef},
    policy::{AssemblyEntry, PolicyModel},
    trim::context::TrimContext,
    Error, Result,
};

/// Applies a policy to the assemblies of a trim run.
///
/// The trimmer borrows the policy read-only and holds no per-assembly state, so one instance
/// processes a whole run. `FriendAccessAllowedAttribute` is resolved from the host's core
/// library the first time it is needed and reused afterwards.
pub struct Trimmer<'p> {
    policy: &'p PolicyModel,
    options: TrimOptions,
    friend_access: OnceLock<Option<TypeRef>>,
}

impl<'p> Trimmer<'p> {
    /// Create a trimmer applying `policy` with the given options
    #[must_use]
    pub fn new(policy: &'p PolicyModel, options: TrimOptions) -> Self {
        Trimmer {
            policy,
            options,
            friend_access: OnceLock::new(),
        }
    }

    /// The options this trimmer applies
    #[must_use]
    pub fn options(&self) -> &TrimOptions {
        &self.options
    }

    /// Trim every assembly of the policy.
    ///
    /// Assemblies are processed one at a time in name order: `<source_dir>/<name>.dll` is loaded
    /// through `host`, rewritten, and written to `<output_dir>/<name>.dll`. Debug symbols travel
    /// with the unit.
    ///
    /// # Arguments
    /// * `host` - Loads and writes the binaries and resolves types outside the current assembly.
    /// * `source_dir` - Directory holding the input binaries.
    /// * `output_dir` - Directory receiving the trimmed binaries.
    ///
    /// # Errors
    /// The first failure aborts the run after logging the assembly it happened in. Binaries
    /// written before the failure stay; nothing is written for the failing assembly.
    /// - [`Error::AssemblyLoad`] if an input binary cannot be loaded
    /// - [`Error::AssemblyIdentityMismatch`] if a binary is not the assembly the policy lists
    /// - [`Error::UnsupportedMemberKind`] for member references the policy cannot address
    pub fn trim_binaries(
        &self,
        host: &mut dyn MetadataHost,
        source_dir: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Result<()> {
        let (source_dir, output_dir) = (source_dir.as_ref(), output_dir.as_ref());

        for entry in self.policy.assemblies() {
            if let Err(e) = self.trim_binary(host, entry, source_dir, output_dir) {
                error!("{}: {}", entry.name, e);
                return Err(e);
            }
        }

        Ok(())
    }

    fn trim_binary(
        &self,
        host: &mut dyn MetadataHost,
        entry: &AssemblyEntry,
        source_dir: &Path,
        output_dir: &Path,
    ) -> Result<()> {
        let file_name = format!("{}.dll", entry.name);

        let input = source_dir.join(&file_name);
        info!("Loading {}", input.display());
        let mut unit = host.load_unit(&input)?;

        self.rewrite(entry, &*host, &mut unit.assembly)?;

        let output = output_dir.join(&file_name);
        info!("Writing {}", output.display());
        host.write_unit(&unit, &output)
    }

    /// Rewrite a single assembly in place, without loading or writing anything.
    ///
    /// # Arguments
    /// * `host` - Resolves types outside the assembly, and provides the core library.
    /// * `assembly` - The assembly to trim. It must be listed in the policy.
    ///
    /// # Errors
    /// - [`Error::UnknownAssembly`] if the policy does not list the assembly
    /// - [`Error::UnsupportedMemberKind`] for member references the policy cannot address
    pub fn rewrite_assembly(&self, host: &dyn MetadataHost, assembly: &mut Assembly) -> Result<()> {
        let entry = self
            .policy
            .get_assembly(assembly.name())
            .ok_or_else(|| Error::UnknownAssembly(assembly.name().to_string()))?;

        self.rewrite(entry, host, assembly)
    }

    fn rewrite(
        &self,
        entry: &AssemblyEntry,
        host: &dyn MetadataHost,
        assembly: &mut Assembly,
    ) -> Result<()> {
        if assembly.name() != entry.name {
            return Err(Error::AssemblyIdentityMismatch {
                expected: entry.name.clone(),
                actual: assembly.name().to_string(),
            });
        }

        let mut cx = TrimContext::new(self.policy, entry, &self.options, host, &self.friend_access);
        rewriter::rewrite_assembly(&mut cx, assembly)
    }

    /// Retarget the references of `assembly` that match `old` exactly to `new`.
    ///
    /// Only the assembly reference list changes; type references name assemblies by simple name
    /// and are left alone. Returns the number of references rewritten.
    ///
    /// ```rust
    /// use dottrim::prelude::*;
    ///
    /// let old = AssemblyIdentity::new("mscorlib", AssemblyVersion::new(2, 0, 0, 0));
    /// let new = AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0));
    ///
    /// let mut assembly = Assembly::new(AssemblyIdentity::new("Contoso", AssemblyVersion::default()));
    /// assembly.references.push(old.clone());
    ///
    /// assert_eq!(Trimmer::update_assembly_references(&mut assembly, &old, &new), 1);
    /// assert_eq!(assembly.references, vec![new]);
    /// ```
    pub fn update_assembly_references(
        assembly: &mut Assembly,
        old: &AssemblyIdentity,
        new: &AssemblyIdentity,
    ) -> usize {
        let mut updated = 0;
        for reference in assembly.references.iter_mut().filter(|r| **r == *old) {
            reference.clone_from(new);
            updated += 1;
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{
        metadata::{AssemblyVersion, LoadedUnit, MemoryHost, TypeDefBuilder},
        policy::{IncludeStatus, TypeEntry},
    };

    fn policy() -> PolicyModel {
        let mut policy = PolicyModel::new();
        for name in ["B", "A"] {
            let assembly = policy
                .add_assembly(AssemblyEntry::new(name, IncludeStatus::ImplRoot))
                .unwrap();
            assembly
                .add_type(TypeEntry::new(format!("{}.Kept", name), IncludeStatus::ImplRoot))
                .unwrap();
        }
        policy
    }

    fn unit(name: &str) -> LoadedUnit {
        let mut assembly = Assembly::new(AssemblyIdentity::new(name, AssemblyVersion::default()));
        for type_name in ["Kept", "Dropped"] {
            assembly
                .module
                .types
                .push(TypeDefBuilder::new(type_name).namespace(name).build());
        }
        LoadedUnit::new(assembly)
    }

    #[test]
    fn batch() {
        let policy = policy();
        let mut host = MemoryHost::new();
        host.add_unit("in/A.dll", unit("A"));
        host.add_unit("in/B.dll", unit("B"));

        Trimmer::new(&policy, TrimOptions::default())
            .trim_binaries(&mut host, "in", "out")
            .unwrap();

        assert_eq!(host.written_count(), 2);
        for name in ["A", "B"] {
            let written = host
                .written(&Path::new("out").join(format!("{}.dll", name)))
                .unwrap();
            assert_eq!(written.assembly.module.all_types, vec![format!("{}.Kept", name)]);
        }
    }

    #[test]
    fn batch_stops_at_first_failure() {
        let policy = policy();
        let mut host = MemoryHost::new();
        // "A" sorts first and succeeds, "B" is missing
        host.add_unit("in/A.dll", unit("A"));

        let result = Trimmer::new(&policy, TrimOptions::default()).trim_binaries(&mut host, "in", "out");
        assert!(matches!(result, Err(Error::AssemblyLoad { .. })));
        assert_eq!(host.written_count(), 1);
    }

    #[test]
    fn identity_mismatch() {
        let policy = policy();
        let mut host = MemoryHost::new();
        host.add_unit("in/A.dll", unit("Impostor"));

        match Trimmer::new(&policy, TrimOptions::default()).trim_binaries(&mut host, "in", "out") {
            Err(Error::AssemblyIdentityMismatch { expected, actual }) => {
                assert_eq!(expected, "A");
                assert_eq!(actual, "Impostor");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(host.written_count(), 0);
    }

    #[test]
    fn unknown_assembly() {
        let policy = policy();
        let mut assembly = unit("C").assembly;
        let result = Trimmer::new(&policy, TrimOptions::default())
            .rewrite_assembly(&MemoryHost::new(), &mut assembly);
        assert!(matches!(result, Err(Error::UnknownAssembly(name)) if name == "C"));
    }

    #[test]
    fn reference_retargeting() {
        let old = AssemblyIdentity::new("mscorlib", AssemblyVersion::new(2, 0, 0, 0));
        let new = AssemblyIdentity::new("System.Runtime", AssemblyVersion::new(4, 2, 0, 0));
        let other = AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0));

        let mut assembly = unit("A").assembly;
        assembly.references = vec![old.clone(), other.clone()];

        assert_eq!(Trimmer::update_assembly_references(&mut assembly, &old, &new), 1);
        assert_eq!(assembly.references, vec![new.clone(), other]);
        assert_eq!(Trimmer::update_assembly_references(&mut assembly, &old, &new), 0);
    }
}
